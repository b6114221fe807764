//! Saved snapshot of a variable for backward computation.

use crate::error::AutogradError;
use crate::scalar::Scalar;
use crate::tensor::DenseTensor;
use crate::version::SavedRef;

/// Snapshot of a variable's data captured during the forward pass.
///
/// Holds a shallow clone of the data as seen at save time, the version
/// observed then, and a read-only alias of the source counter. Once
/// the version read through the alias diverges from the recorded one,
/// the snapshot is invalidated and [`unpack`](Self::unpack) refuses to
/// hand it out. That turns a silent numerical-correctness bug (stale
/// data feeding a gradient computation) into an immediate, localized
/// failure at the point of use.
#[derive(Debug)]
pub struct SavedVariable<T: Scalar> {
    data: Option<DenseTensor<T>>,
    expected_version: u64,
    version: Option<SavedRef>,
}

impl<T: Scalar> SavedVariable<T> {
    pub(crate) fn new(data: DenseTensor<T>, expected_version: u64, version: SavedRef) -> Self {
        Self {
            data: Some(data),
            expected_version,
            version: Some(version),
        }
    }

    /// The "nothing was saved" snapshot.
    ///
    /// Unpacks to `None` without validation.
    pub fn empty() -> Self {
        Self {
            data: None,
            expected_version: 0,
            version: None,
        }
    }

    /// Whether this snapshot holds data.
    pub fn is_some(&self) -> bool {
        self.data.is_some()
    }

    /// Version of the source variable recorded at save time.
    pub fn expected_version(&self) -> u64 {
        self.expected_version
    }

    /// Retrieve the saved data for backward computation.
    ///
    /// # Errors
    ///
    /// [`AutogradError::InplaceModified`] if the source variable was
    /// mutated in place after this snapshot was taken.
    pub fn unpack(&self) -> Result<Option<&DenseTensor<T>>, AutogradError> {
        let Some(data) = &self.data else {
            return Ok(None);
        };
        if let Some(version) = &self.version {
            if version.read() != self.expected_version {
                return Err(AutogradError::InplaceModified);
            }
        }
        Ok(Some(data))
    }
}

impl<T: Scalar> Default for SavedVariable<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionCounter;

    #[test]
    fn test_empty_unpacks_to_none() {
        let saved: SavedVariable<f64> = SavedVariable::empty();
        assert!(!saved.is_some());
        assert!(saved.unpack().unwrap().is_none());
    }

    #[test]
    fn test_default_is_empty() {
        let saved: SavedVariable<f32> = SavedVariable::default();
        assert!(saved.unpack().unwrap().is_none());
    }

    #[test]
    fn test_unpack_fresh_snapshot() {
        let counter = VersionCounter::new();
        let data = DenseTensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
        let saved = SavedVariable::new(data.clone_shallow(), counter.read(), counter.saved_ref());

        let unpacked = saved.unpack().unwrap().unwrap();
        assert_eq!(unpacked.data(), data.data());
    }

    #[test]
    fn test_unpack_after_mutation_fails() {
        let counter = VersionCounter::new();
        let data: DenseTensor<f64> = DenseTensor::zeros(&[2]);
        let saved = SavedVariable::new(data.clone_shallow(), counter.read(), counter.saved_ref());

        counter.increment();
        assert_eq!(saved.unpack().unwrap_err(), AutogradError::InplaceModified);
    }
}
