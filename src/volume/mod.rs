//! This module defines the voxel volume API, as well as data
//! types for reading volumes from files.
//! Volumes are converted to `ndarray` arrays for any real processing.

pub mod element;
pub mod inmem;
mod util;

pub use self::element::DataElement;
pub use self::inmem::InMemVolume;

use crate::error::Result;
use crate::typedef::NiftiType;

/// Public API for NIfTI volume data, exposed as a multi-dimensional
/// voxel array.
pub trait NiftiVolume {
    /// Get the dimensions of the volume. Unlike how NIfTI stores
    /// dimensions, the returned slice does not include `dim[0]` and is
    /// clipped to the effective number of dimensions.
    fn dim(&self) -> &[u64];

    /// Get the volume's number of dimensions.
    fn dimensionality(&self) -> usize {
        self.dim().len()
    }

    /// Get this volume's data type.
    fn data_type(&self) -> NiftiType;

    /// Fetch a single voxel's value in the given voxel index coordinates
    /// as a double precision floating point value.
    /// Scaling is applied. Note that using this function continuously to
    /// traverse the volume is inefficient; prefer the `ndarray` API.
    ///
    /// # Errors
    ///
    /// - `CitrixError::InvalidArgument` if the given coordinates surpass this
    /// volume's boundaries.
    fn get_f64(&self, coords: &[u64]) -> Result<f64>;
}
