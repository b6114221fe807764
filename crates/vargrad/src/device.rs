//! Device tagging and scoped device-context switching.

use std::cell::Cell;

/// Placement of a tensor's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Device {
    /// Host memory.
    #[default]
    Cpu,
    /// CUDA device with the given ordinal.
    Cuda(usize),
}

impl Device {
    /// Whether this device is a CUDA device.
    pub fn is_cuda(&self) -> bool {
        matches!(self, Device::Cuda(_))
    }
}

thread_local! {
    static CURRENT_DEVICE: Cell<Device> = const { Cell::new(Device::Cpu) };
}

/// Current device for the calling thread.
pub fn current_device() -> Device {
    CURRENT_DEVICE.with(|d| d.get())
}

/// Guard that switches the thread's current device and restores the
/// previous one on drop.
///
/// Gradient accumulation scopes one of these around each incoming
/// gradient so element-wise work runs against the gradient's device.
/// On a CPU-only build this is semantically a no-op.
#[derive(Debug)]
pub struct DeviceGuard {
    prev: Device,
}

impl DeviceGuard {
    /// Switch the calling thread to `device` until the guard drops.
    pub fn new(device: Device) -> Self {
        let prev = CURRENT_DEVICE.with(|d| d.replace(device));
        Self { prev }
    }
}

impl Drop for DeviceGuard {
    fn drop(&mut self) {
        CURRENT_DEVICE.with(|d| d.set(self.prev));
    }
}
