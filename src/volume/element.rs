//! This module defines the data element API, which enables the volume
//! implementation to read, write and convert data elements.
use crate::error::{CitrixError, Result};
use crate::typedef::NiftiType;
use byteordered::{ByteOrdered, Endian};
use num_traits::AsPrimitive;
use std::io::{Read, Result as IoResult, Write};

/// Trait type for characterizing a NIfTI data element, implemented for
/// primitive numeric types which are used by the crate to represent voxel
/// values.
pub trait DataElement: 'static + Sized + Copy + AsPrimitive<f64> {
    /// The `datatype` mapped to the type T
    const DATA_TYPE: NiftiType;

    /// Cast a double precision value into this type, saturating when the
    /// type is an integer.
    fn from_f64(value: f64) -> Self;

    /// Write a single element to the given byte sink.
    fn write_raw<W, E>(self, dst: &mut ByteOrdered<W, E>) -> IoResult<()>
    where
        W: Write,
        E: Endian;
}

macro_rules! impl_data_element {
    ($t:ty, $code:ident, $write:ident) => {
        impl DataElement for $t {
            const DATA_TYPE: NiftiType = NiftiType::$code;

            fn from_f64(value: f64) -> Self {
                value.as_()
            }

            fn write_raw<W, E>(self, dst: &mut ByteOrdered<W, E>) -> IoResult<()>
            where
                W: Write,
                E: Endian,
            {
                dst.$write(self)
            }
        }
    };
}

impl_data_element!(u8, Uint8, write_u8);
impl_data_element!(i8, Int8, write_i8);
impl_data_element!(u16, Uint16, write_u16);
impl_data_element!(i16, Int16, write_i16);
impl_data_element!(u32, Uint32, write_u32);
impl_data_element!(i32, Int32, write_i32);
impl_data_element!(u64, Uint64, write_u64);
impl_data_element!(i64, Int64, write_i64);
impl_data_element!(f32, Float32, write_f32);
impl_data_element!(f64, Float64, write_f64);

/// Read `count` values of the given data type from a byte source,
/// widening them to `f64`. Wide integers beyond 2^53 lose precision.
pub(crate) fn read_values_f64<R, E>(
    src: &mut ByteOrdered<R, E>,
    datatype: NiftiType,
    count: usize,
) -> Result<Vec<f64>>
where
    R: Read,
    E: Endian,
{
    macro_rules! read_all {
        ($read:ident) => {{
            let mut out = Vec::with_capacity(count);
            for _ in 0..count {
                out.push(src.$read()? as f64);
            }
            out
        }};
    }

    let values = match datatype {
        NiftiType::Uint8 => read_all!(read_u8),
        NiftiType::Int8 => read_all!(read_i8),
        NiftiType::Uint16 => read_all!(read_u16),
        NiftiType::Int16 => read_all!(read_i16),
        NiftiType::Uint32 => read_all!(read_u32),
        NiftiType::Int32 => read_all!(read_i32),
        NiftiType::Uint64 => read_all!(read_u64),
        NiftiType::Int64 => read_all!(read_i64),
        NiftiType::Float32 => read_all!(read_f32),
        NiftiType::Float64 => read_all!(read_f64),
    };
    Ok(values)
}

/// Apply the header's value scaling. A zero slope disables scaling.
pub(crate) fn linear_transform(value: f64, slope: f64, intercept: f64) -> f64 {
    if slope == 0. {
        value
    } else {
        value * slope + intercept
    }
}

/// Check that the byte length of a raw buffer fits the given shape.
pub(crate) fn check_raw_len(raw_len: usize, datatype: NiftiType, count: usize) -> Result<()> {
    let expected = count * datatype.size_of();
    if raw_len != expected {
        return Err(CitrixError::IncompatibleLength(raw_len, expected));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteordered::Endianness;

    #[test]
    fn read_big_endian_i16() {
        let raw: Vec<u8> = vec![0x01, 0x00, 0xFF, 0xFE];
        let mut src = ByteOrdered::runtime(&raw[..], Endianness::Big);
        let values = read_values_f64(&mut src, NiftiType::Int16, 2).unwrap();
        assert_eq!(values, vec![256., -2.]);
    }

    #[test]
    fn write_then_read_f32() {
        let mut raw = Vec::new();
        {
            let mut dst = ByteOrdered::runtime(&mut raw, Endianness::Little);
            for v in &[1.5f32, -3.25] {
                v.write_raw(&mut dst).unwrap();
            }
        }
        let mut src = ByteOrdered::runtime(&raw[..], Endianness::Little);
        let values = read_values_f64(&mut src, f32::DATA_TYPE, 2).unwrap();
        assert_eq!(values, vec![1.5, -3.25]);
    }

    #[test]
    fn scaling() {
        assert_eq!(linear_transform(100., 2., -1024.), -824.);
        assert_eq!(linear_transform(100., 0., -1024.), 100.);
        assert_eq!(u8::from_f64(300.), 255);
        assert!(check_raw_len(8, NiftiType::Float32, 2).is_ok());
        assert!(check_raw_len(7, NiftiType::Float32, 2).is_err());
    }
}
