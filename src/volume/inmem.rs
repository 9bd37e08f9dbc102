//! Module holding an in-memory implementation of a NIfTI volume.

use super::element::{check_raw_len, linear_transform, read_values_f64, DataElement};
use super::util::coords_to_index;
use super::NiftiVolume;
use crate::error::{CitrixError, Result};
use crate::header::NiftiHeader;
use crate::typedef::NiftiType;
use byteordered::{ByteOrdered, Endianness};
use ndarray::{Array, ArrayBase, Data, Dimension, IxDyn, ShapeBuilder};
use std::convert::TryFrom;
use std::io::Read;

/// A data type for a NIfTI volume contained in memory.
/// Objects of this type contain raw image data, which
/// is converted automatically when using reading methods
/// or converting it to an `ndarray`.
#[derive(Debug, PartialEq, Clone)]
pub struct InMemVolume {
    dim: Vec<u64>,
    datatype: NiftiType,
    scl_slope: f64,
    scl_inter: f64,
    raw_data: Vec<u8>,
    endianness: Endianness,
}

impl InMemVolume {
    /// Read a NIfTI volume from a stream of data. The header must be known
    /// in advance. It it also expected that the following bytes represent
    /// the first voxels of the volume (and not part of the extensions).
    pub fn from_reader<R: Read>(source: R, header: &NiftiHeader) -> Result<Self> {
        let dim = header.dim()?.to_vec();
        let datatype = header.data_type()?;
        let nbytes = dim
            .iter()
            .try_fold(datatype.size_of(), |acc, d| {
                usize::try_from(*d).ok().and_then(|d| acc.checked_mul(d))
            })
            .ok_or(CitrixError::InvalidFormat)?;
        // the header may claim more bytes than the source holds
        let mut raw_data = Vec::new();
        let _ = source.take(nbytes as u64).read_to_end(&mut raw_data)?;
        if raw_data.len() != nbytes {
            return Err(CitrixError::IncompatibleLength(raw_data.len(), nbytes));
        }

        Ok(InMemVolume {
            dim,
            datatype,
            scl_slope: header.scl_slope,
            scl_inter: header.scl_inter,
            raw_data,
            endianness: header.endianness,
        })
    }

    /// Build a volume from an array, laying it out in column-major order
    /// with no value scaling.
    pub fn from_array<A, S, D>(data: &ArrayBase<S, D>, endianness: Endianness) -> Result<Self>
    where
        A: DataElement,
        S: Data<Elem = A>,
        D: Dimension,
    {
        let mut raw_data = Vec::with_capacity(data.len() * A::DATA_TYPE.size_of());
        {
            let mut out = ByteOrdered::runtime(&mut raw_data, endianness);
            // the transposed view iterates the original in Fortran order
            for v in data.t().iter() {
                v.write_raw(&mut out)?;
            }
        }
        Ok(InMemVolume {
            dim: data.shape().iter().map(|s| *s as u64).collect(),
            datatype: A::DATA_TYPE,
            scl_slope: 1.,
            scl_inter: 0.,
            raw_data,
            endianness,
        })
    }

    /// Retrieve a reference to the raw data.
    pub fn raw_data(&self) -> &[u8] {
        &self.raw_data
    }

    /// Byte order of the raw data.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Number of voxels in the volume.
    pub fn len(&self) -> usize {
        self.dim.iter().map(|d| *d as usize).product()
    }

    /// Whether the volume has no voxels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All voxel values, scaled, in the order they are stored on disk.
    pub fn to_f64_vec(&self) -> Result<Vec<f64>> {
        check_raw_len(self.raw_data.len(), self.datatype, self.len())?;
        let mut src = ByteOrdered::runtime(&self.raw_data[..], self.endianness);
        let mut values = read_values_f64(&mut src, self.datatype, self.len())?;
        for v in values.iter_mut() {
            *v = linear_transform(*v, self.scl_slope, self.scl_inter);
        }
        Ok(values)
    }

    /// Consume the volume into an ndarray with the same number of dimensions
    /// and the given target element type `T`. The resulting array is in
    /// column-major order, like the data on disk.
    pub fn into_ndarray<T: DataElement>(self) -> Result<Array<T, IxDyn>> {
        let values: Vec<T> = self.to_f64_vec()?.into_iter().map(T::from_f64).collect();
        let shape: Vec<usize> = self.dim.iter().map(|d| *d as usize).collect();
        Ok(Array::from_shape_vec(IxDyn(&shape).f(), values)?)
    }
}

impl NiftiVolume for InMemVolume {
    fn dim(&self) -> &[u64] {
        &self.dim
    }

    fn data_type(&self) -> NiftiType {
        self.datatype
    }

    fn get_f64(&self, coords: &[u64]) -> Result<f64> {
        let index = coords_to_index(coords, self.dim())?;
        let size = self.datatype.size_of();
        let start = index * size;
        check_raw_len(self.raw_data.len(), self.datatype, self.len())?;
        let mut src = ByteOrdered::runtime(&self.raw_data[start..start + size], self.endianness);
        let value = read_values_f64(&mut src, self.datatype, 1)?[0];
        Ok(linear_transform(value, self.scl_slope, self.scl_inter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Ix2};

    #[test]
    fn array_roundtrip_keeps_logical_order() {
        let data = array![[1.0f32, 2., 3.], [4., 5., 6.]];
        let volume = InMemVolume::from_array(&data, Endianness::Big).unwrap();
        assert_eq!(volume.dim(), &[2, 3]);
        assert_eq!(volume.data_type(), NiftiType::Float32);
        assert_eq!(volume.get_f64(&[1, 0]).unwrap(), 4.);
        assert_eq!(volume.get_f64(&[0, 2]).unwrap(), 3.);
        // column-major on disk
        assert_eq!(volume.to_f64_vec().unwrap(), vec![1., 4., 2., 5., 3., 6.]);

        let back = volume
            .into_ndarray::<f32>()
            .unwrap()
            .into_dimensionality::<Ix2>()
            .unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn scaled_read() {
        let header = NiftiHeader {
            dim: [1, 2, 1, 1, 1, 1, 1, 1],
            datatype: NiftiType::Uint8 as i16,
            bitpix: 8,
            scl_slope: 2.,
            scl_inter: 1.,
            ..NiftiHeader::default()
        };
        let volume = InMemVolume::from_reader(&[3u8, 10][..], &header).unwrap();
        let values = volume.into_ndarray::<f64>().unwrap();
        assert_eq!(values.as_slice_memory_order().unwrap(), &[7., 21.]);
    }
}
