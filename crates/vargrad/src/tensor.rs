//! Minimal dense tensor backing the bookkeeping core.
//!
//! This is the crate's rendition of the external tensor collaborator:
//! exactly the surface gradient accumulation and the save/unpack
//! protocol need, and nothing else. Storage is a flat row-major buffer
//! behind `Rc`, so [`DenseTensor::clone_shallow`] is a refcount bump
//! while [`Clone`] makes an independent deep copy.

use crate::device::Device;
use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::strides::{cartesian_to_linear, compute_strides};
use std::rc::Rc;

/// A dense n-dimensional tensor with row-major layout.
///
/// # Examples
///
/// ```
/// use vargrad::DenseTensor;
///
/// let t: DenseTensor<f64> = DenseTensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
/// assert_eq!(t.shape(), &[2, 2]);
/// assert_eq!(t.get(&[1, 0]), Some(&3.0));
/// ```
#[derive(Debug, PartialEq)]
pub struct DenseTensor<T: Scalar> {
    storage: Rc<Vec<T>>,
    shape: Vec<usize>,
    strides: Vec<usize>,
    device: Device,
}

impl<T: Scalar> DenseTensor<T> {
    /// Create a zero-initialized tensor with the given shape.
    ///
    /// An empty shape yields a scalar holding one element.
    pub fn zeros(shape: &[usize]) -> Self {
        let len: usize = shape.iter().product::<usize>().max(1);
        Self {
            storage: Rc::new(vec![T::zero(); len]),
            shape: shape.to_vec(),
            strides: compute_strides(shape),
            device: Device::default(),
        }
    }

    /// Create a one-initialized tensor with the given shape.
    pub fn ones(shape: &[usize]) -> Self {
        let len: usize = shape.iter().product::<usize>().max(1);
        Self {
            storage: Rc::new(vec![T::one(); len]),
            shape: shape.to_vec(),
            strides: compute_strides(shape),
            device: Device::default(),
        }
    }

    /// Create a tensor from data in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::ShapeMismatch`] if the data length does
    /// not match the shape.
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self, TensorError> {
        let expected: usize = shape.iter().product::<usize>().max(1);
        if data.len() != expected {
            return Err(TensorError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            storage: Rc::new(data),
            shape: shape.to_vec(),
            strides: compute_strides(shape),
            device: Device::default(),
        })
    }

    /// Tag this tensor with a device.
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Shape of the tensor.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if the tensor has zero elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Immutable view of the underlying buffer.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.storage
    }

    /// Mutable view of the underlying buffer.
    ///
    /// Unshares storage first if any shallow clone still aliases it.
    /// In-place mutation through this handle must be recorded on the
    /// owning variable's version counter for the save/unpack protocol
    /// to stay sound.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        Rc::make_mut(&mut self.storage).as_mut_slice()
    }

    /// Get an element, or `None` if the indices are invalid.
    pub fn get(&self, indices: &[usize]) -> Option<&T> {
        let offset = self.offset_of(indices).ok()?;
        self.storage.get(offset)
    }

    /// Set an element.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::WrongNumberOfIndices`] or
    /// [`TensorError::IndexOutOfBounds`] for invalid indices.
    pub fn set(&mut self, indices: &[usize], value: T) -> Result<(), TensorError> {
        let offset = self.offset_of(indices)?;
        self.data_mut()[offset] = value;
        Ok(())
    }

    /// Device this tensor is placed on.
    #[inline]
    pub fn device(&self) -> Device {
        self.device
    }

    /// Whether this tensor lives on a CUDA device.
    #[inline]
    pub fn is_cuda(&self) -> bool {
        self.device.is_cuda()
    }

    /// Create a new descriptor sharing this tensor's storage.
    ///
    /// Cheap (a refcount bump). The handle's validity for backward
    /// computation is governed by the version-counter protocol, not by
    /// the storage aliasing itself.
    pub fn clone_shallow(&self) -> Self {
        Self {
            storage: Rc::clone(&self.storage),
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            device: self.device,
        }
    }

    /// Whether two tensors alias the same underlying storage.
    pub fn shares_storage(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }

    /// Element-wise in-place add: `self += other`.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::ShapeMismatch`] if shapes differ.
    pub fn add_assign(&mut self, other: &Self) -> Result<(), TensorError> {
        if self.shape != other.shape {
            return Err(TensorError::ShapeMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        for (dst, &src) in self.data_mut().iter_mut().zip(other.data()) {
            *dst += src;
        }
        Ok(())
    }

    fn offset_of(&self, indices: &[usize]) -> Result<usize, TensorError> {
        if indices.len() != self.shape.len() {
            return Err(TensorError::WrongNumberOfIndices {
                expected: self.shape.len(),
                actual: indices.len(),
            });
        }
        for (&idx, &size) in indices.iter().zip(&self.shape) {
            if idx >= size {
                return Err(TensorError::IndexOutOfBounds {
                    index: idx,
                    dim_size: size,
                });
            }
        }
        Ok(cartesian_to_linear(indices, &self.strides))
    }
}

impl<T: Scalar> Clone for DenseTensor<T> {
    /// Deep copy: later mutation of the original never shows through.
    fn clone(&self) -> Self {
        Self {
            storage: Rc::new(self.storage.as_ref().clone()),
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            device: self.device,
        }
    }
}
