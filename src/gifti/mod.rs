//! GIFTI surface and function documents.
//!
//! Arrays may be stored as ASCII, base64 or zlib-compressed base64, in
//! either byte order and either indexing order. They are decoded into
//! row-major [`ArrayData`] on read.
pub mod array;
pub mod build;
pub mod image;

pub use self::array::{ArrayData, ArrayOrdering, CoordinateSystem, DataArray, Encoding};
pub use self::image::{GiftiFunction, GiftiImage, ANATOMICAL_STRUCTURE_PRIMARY};
