//! GIFTI data arrays and their on-disk encodings.
use crate::cifti::model::MetaData;
use crate::cifti::xml::{metadata_from_element, metadata_to_element};
use crate::error::{CitrixError, Result};
use crate::typedef::{Intent, NiftiType};
use crate::xmltree::Element;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use byteordered::{ByteOrdered, Endianness};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use ndarray::{Array2, ArrayD, IxDyn, ShapeBuilder};
use std::io::{Read, Write};
use std::str::FromStr;

/// How the content of a `Data` element is encoded.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Encoding {
    /// Whitespace separated numbers.
    Ascii,
    /// Raw bytes in base64.
    Base64Binary,
    /// zlib-deflated bytes in base64.
    GZipBase64Binary,
}

impl Encoding {
    /// The `Encoding` attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Ascii => "ASCII",
            Encoding::Base64Binary => "Base64Binary",
            Encoding::GZipBase64Binary => "GZipBase64Binary",
        }
    }
}

impl FromStr for Encoding {
    type Err = CitrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ASCII" => Ok(Encoding::Ascii),
            "Base64Binary" => Ok(Encoding::Base64Binary),
            "GZipBase64Binary" => Ok(Encoding::GZipBase64Binary),
            "ExternalFileBinary" => Err(malformed("external file data is not supported")),
            other => Err(malformed(format!("unknown encoding {}", other))),
        }
    }
}

/// Memory layout of a multi-dimensional array.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ArrayOrdering {
    /// The last index varies fastest.
    RowMajor,
    /// The first index varies fastest.
    ColumnMajor,
}

impl ArrayOrdering {
    /// The `ArrayIndexingOrder` attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            ArrayOrdering::RowMajor => "RowMajorOrder",
            ArrayOrdering::ColumnMajor => "ColumnMajorOrder",
        }
    }
}

impl FromStr for ArrayOrdering {
    type Err = CitrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RowMajorOrder" => Ok(ArrayOrdering::RowMajor),
            "ColumnMajorOrder" => Ok(ArrayOrdering::ColumnMajor),
            other => Err(malformed(format!("unknown array ordering {}", other))),
        }
    }
}

/// The decoded values of a data array, in row-major order.
#[derive(Debug, PartialEq, Clone)]
pub enum ArrayData {
    /// `NIFTI_TYPE_FLOAT32`
    F32(Vec<f32>),
    /// `NIFTI_TYPE_INT32`
    I32(Vec<i32>),
    /// `NIFTI_TYPE_UINT8`
    U8(Vec<u8>),
}

impl ArrayData {
    /// Number of values.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::F32(v) => v.len(),
            ArrayData::I32(v) => v.len(),
            ArrayData::U8(v) => v.len(),
        }
    }

    /// Whether there are no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The NIfTI type of the values.
    pub fn datatype(&self) -> NiftiType {
        match self {
            ArrayData::F32(_) => NiftiType::Float32,
            ArrayData::I32(_) => NiftiType::Int32,
            ArrayData::U8(_) => NiftiType::Uint8,
        }
    }

    /// All values converted to `f32`.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self {
            ArrayData::F32(v) => v.clone(),
            ArrayData::I32(v) => v.iter().map(|x| *x as f32).collect(),
            ArrayData::U8(v) => v.iter().map(|x| *x as f32).collect(),
        }
    }

    fn from_bytes(bytes: &[u8], datatype: NiftiType, endian: Endianness, count: usize) -> Result<Self> {
        let expected = count
            .checked_mul(datatype.size_of())
            .ok_or_else(|| malformed(format!("{} values do not fit in memory", count)))?;
        if bytes.len() != expected {
            return Err(CitrixError::IncompatibleLength(bytes.len(), expected));
        }
        let mut src = ByteOrdered::runtime(bytes, endian);
        Ok(match datatype {
            NiftiType::Float32 => ArrayData::F32(
                (0..count)
                    .map(|_| src.read_f32())
                    .collect::<std::io::Result<_>>()?,
            ),
            NiftiType::Int32 => ArrayData::I32(
                (0..count)
                    .map(|_| src.read_i32())
                    .collect::<std::io::Result<_>>()?,
            ),
            NiftiType::Uint8 => ArrayData::U8(bytes.to_vec()),
            other => return Err(CitrixError::UnsupportedDataType(other)),
        })
    }

    fn from_ascii(text: &str, datatype: NiftiType, count: usize) -> Result<Self> {
        fn tokens<T: FromStr>(text: &str) -> Result<Vec<T>>
        where
            CitrixError: From<T::Err>,
        {
            text.split_whitespace()
                .map(|t| t.parse::<T>().map_err(CitrixError::from))
                .collect()
        }

        let data = match datatype {
            NiftiType::Float32 => ArrayData::F32(tokens(text)?),
            NiftiType::Int32 => ArrayData::I32(tokens(text)?),
            NiftiType::Uint8 => ArrayData::U8(tokens(text)?),
            other => return Err(CitrixError::UnsupportedDataType(other)),
        };
        if data.len() != count {
            return Err(CitrixError::IncompatibleLength(data.len(), count));
        }
        Ok(data)
    }

    fn to_le_bytes(&self) -> Result<Vec<u8>> {
        let mut out = ByteOrdered::le(Vec::with_capacity(self.len() * 4));
        match self {
            ArrayData::F32(v) => {
                for x in v {
                    out.write_f32(*x)?;
                }
            }
            ArrayData::I32(v) => {
                for x in v {
                    out.write_i32(*x)?;
                }
            }
            ArrayData::U8(v) => out.write_all(v)?,
        }
        Ok(out.into_inner())
    }

    fn to_ascii(&self) -> String {
        fn join<T: ToString>(values: &[T]) -> String {
            values
                .iter()
                .map(T::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        }
        match self {
            ArrayData::F32(v) => join(v),
            ArrayData::I32(v) => join(v),
            ArrayData::U8(v) => join(v),
        }
    }

    /// Reorder a column-major buffer of shape `dims` to row-major.
    fn into_row_major(self, dims: &[usize]) -> Result<Self> {
        fn reorder<T: Copy>(v: Vec<T>, dims: &[usize]) -> Result<Vec<T>> {
            let array = ArrayD::from_shape_vec(IxDyn(dims).f(), v)?;
            // logical iteration order is row-major
            Ok(array.iter().copied().collect())
        }
        Ok(match self {
            ArrayData::F32(v) => ArrayData::F32(reorder(v, dims)?),
            ArrayData::I32(v) => ArrayData::I32(reorder(v, dims)?),
            ArrayData::U8(v) => ArrayData::U8(reorder(v, dims)?),
        })
    }
}

/// The `CoordinateSystemTransformMatrix` of a data array.
#[derive(Debug, PartialEq, Clone)]
pub struct CoordinateSystem {
    /// Space of the array coordinates, such as `NIFTI_XFORM_UNKNOWN`.
    pub data_space: String,
    /// Space the transform maps into.
    pub transformed_space: String,
    /// Row-major 4x4 transform.
    pub transform: [[f64; 4]; 4],
}

/// One `DataArray` of a GIFTI document.
///
/// Whatever the ordering on disk, `data` is held in row-major order, and
/// `ordering` is `RowMajor` once the array is read.
#[derive(Debug, PartialEq, Clone)]
pub struct DataArray {
    /// What the values represent.
    pub intent: Intent,
    /// Type of the values.
    pub datatype: NiftiType,
    /// Size of each dimension.
    pub dims: Vec<usize>,
    /// Encoding used when the array is written.
    pub encoding: Encoding,
    /// Byte order of the binary encodings in the source document.
    pub endian: Endianness,
    /// Layout of `data`.
    pub ordering: ArrayOrdering,
    /// Array-level metadata.
    pub meta: MetaData,
    /// Optional transform attached to the array.
    pub coordinate_system: Option<CoordinateSystem>,
    /// The values.
    pub data: ArrayData,
}

impl DataArray {
    /// A row-major, base64 encoded array. The product of `dims` must
    /// match the number of values.
    pub fn new(intent: Intent, dims: Vec<usize>, data: ArrayData) -> Result<Self> {
        let count = element_count(&dims).ok_or_else(|| {
            CitrixError::InvalidArgument(format!("array dimensions {:?} are too large", dims))
        })?;
        if count != data.len() {
            return Err(CitrixError::IncompatibleLength(data.len(), count));
        }
        Ok(DataArray {
            intent,
            datatype: data.datatype(),
            dims,
            encoding: Encoding::Base64Binary,
            endian: Endianness::Little,
            ordering: ArrayOrdering::RowMajor,
            meta: MetaData::default(),
            coordinate_system: None,
            data,
        })
    }

    /// The values as a matrix. One-dimensional arrays become a single
    /// column.
    pub fn to_array2_f32(&self) -> Result<Array2<f32>> {
        let shape = self.matrix_shape()?;
        Ok(Array2::from_shape_vec(shape, self.data.to_f32_vec())?)
    }

    /// Integer values as a matrix of indices, such as mesh triangles.
    pub fn to_array2_u32(&self) -> Result<Array2<u32>> {
        let shape = self.matrix_shape()?;
        let values = match &self.data {
            ArrayData::I32(v) => v
                .iter()
                .map(|x| {
                    if *x < 0 {
                        Err(malformed(format!("negative index {}", x)))
                    } else {
                        Ok(*x as u32)
                    }
                })
                .collect::<Result<Vec<_>>>()?,
            ArrayData::U8(v) => v.iter().map(|x| u32::from(*x)).collect(),
            ArrayData::F32(_) => {
                return Err(CitrixError::UnsupportedDataType(NiftiType::Float32));
            }
        };
        Ok(Array2::from_shape_vec(shape, values)?)
    }

    fn matrix_shape(&self) -> Result<(usize, usize)> {
        match self.dims.as_slice() {
            [n] => Ok((*n, 1)),
            [rows, cols] => Ok((*rows, *cols)),
            dims => Err(CitrixError::InvalidArgument(format!(
                "expected a 1D or 2D array, got dimensions {:?}",
                dims
            ))),
        }
    }

    pub(crate) fn from_element(element: &Element) -> Result<DataArray> {
        let intent_name = required(element, "Intent")?;
        let intent = Intent::from_gifti_name(intent_name)
            .ok_or_else(|| malformed(format!("unknown intent {}", intent_name)))?;
        let type_name = required(element, "DataType")?;
        let datatype = NiftiType::from_gifti_name(type_name)
            .ok_or_else(|| malformed(format!("unknown data type {}", type_name)))?;
        let ordering: ArrayOrdering = element
            .attr("ArrayIndexingOrder")
            .unwrap_or("RowMajorOrder")
            .parse()?;
        let encoding: Encoding = required(element, "Encoding")?.parse()?;
        let endian = match element.attr("Endian").unwrap_or("LittleEndian") {
            "LittleEndian" => Endianness::Little,
            "BigEndian" => Endianness::Big,
            other => return Err(malformed(format!("unknown byte order {}", other))),
        };
        if element.attr("ExternalFileName").map_or(false, |f| !f.is_empty()) {
            return Err(malformed("external file data is not supported"));
        }

        let dimensionality: usize = required(element, "Dimensionality")?.parse()?;
        let dims = (0..dimensionality)
            .map(|d| Ok(required(element, &format!("Dim{}", d))?.parse::<usize>()?))
            .collect::<Result<Vec<_>>>()?;
        let count = element_count(&dims)
            .ok_or_else(|| malformed(format!("array dimensions {:?} are too large", dims)))?;

        let text = element.child("Data").map_or("", |d| d.text.as_str());
        let mut data = match encoding {
            Encoding::Ascii => ArrayData::from_ascii(text, datatype, count)?,
            Encoding::Base64Binary => {
                ArrayData::from_bytes(&decode_base64(text)?, datatype, endian, count)?
            }
            Encoding::GZipBase64Binary => {
                let mut bytes = Vec::new();
                let _ = ZlibDecoder::new(&decode_base64(text)?[..]).read_to_end(&mut bytes)?;
                ArrayData::from_bytes(&bytes, datatype, endian, count)?
            }
        };
        if ordering == ArrayOrdering::ColumnMajor && dims.len() > 1 {
            data = data.into_row_major(&dims)?;
        }

        let coordinate_system = match element.child("CoordinateSystemTransformMatrix") {
            Some(cs) => Some(coordinate_system_from_element(cs)?),
            None => None,
        };

        Ok(DataArray {
            intent,
            datatype,
            dims,
            encoding,
            endian,
            ordering: ArrayOrdering::RowMajor,
            meta: element
                .child("MetaData")
                .map(metadata_from_element)
                .unwrap_or_default(),
            coordinate_system,
            data,
        })
    }

    pub(crate) fn to_element(&self) -> Result<Element> {
        let datatype = self
            .data
            .datatype()
            .gifti_name()
            .ok_or(CitrixError::UnsupportedDataType(self.datatype))?;
        let mut element = Element::new("DataArray")
            .with_attr("Intent", self.intent.gifti_name())
            .with_attr("DataType", datatype)
            .with_attr("ArrayIndexingOrder", ArrayOrdering::RowMajor.as_str())
            .with_attr("Dimensionality", self.dims.len());
        for (d, size) in self.dims.iter().enumerate() {
            element = element.with_attr(format!("Dim{}", d), size);
        }
        element = element
            .with_attr("Encoding", self.encoding.as_str())
            .with_attr("Endian", "LittleEndian")
            .with_attr("ExternalFileName", "")
            .with_attr("ExternalFileOffset", "")
            .with_child(metadata_to_element(&self.meta));

        if let Some(cs) = &self.coordinate_system {
            element = element.with_child(coordinate_system_to_element(cs));
        }

        let text = match self.encoding {
            Encoding::Ascii => self.data.to_ascii(),
            Encoding::Base64Binary => STANDARD.encode(self.data.to_le_bytes()?),
            Encoding::GZipBase64Binary => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&self.data.to_le_bytes()?)?;
                STANDARD.encode(encoder.finish()?)
            }
        };
        Ok(element.with_child(Element::new("Data").with_text(text)))
    }
}

fn coordinate_system_from_element(element: &Element) -> Result<CoordinateSystem> {
    let text_of = |name: &str| element.child(name).map(|e| e.text.trim().to_string());
    let values = text_of("MatrixData")
        .unwrap_or_default()
        .split_whitespace()
        .map(|v| v.parse::<f64>().map_err(CitrixError::from))
        .collect::<Result<Vec<_>>>()?;
    if values.len() != 16 {
        return Err(malformed(format!(
            "MatrixData should have 16 values, got {}",
            values.len()
        )));
    }
    let mut transform = [[0.; 4]; 4];
    for (i, v) in values.into_iter().enumerate() {
        transform[i / 4][i % 4] = v;
    }
    Ok(CoordinateSystem {
        data_space: text_of("DataSpace").unwrap_or_default(),
        transformed_space: text_of("TransformedSpace").unwrap_or_default(),
        transform,
    })
}

fn coordinate_system_to_element(cs: &CoordinateSystem) -> Element {
    let matrix = cs
        .transform
        .iter()
        .map(|row| {
            row.iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n");
    Element::new("CoordinateSystemTransformMatrix")
        .with_child(Element::new("DataSpace").with_text(cs.data_space.as_str()))
        .with_child(Element::new("TransformedSpace").with_text(cs.transformed_space.as_str()))
        .with_child(Element::new("MatrixData").with_text(matrix))
}

fn decode_base64(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

/// Number of values in an array of shape `dims`, if it fits in a `usize`.
fn element_count(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, d| acc.checked_mul(*d))
}

pub(crate) fn malformed<S: Into<String>>(msg: S) -> CitrixError {
    CitrixError::MalformedGifti(msg.into())
}

pub(crate) fn required<'a>(element: &'a Element, key: &str) -> Result<&'a str> {
    element.attr(key).ok_or_else(|| {
        malformed(format!("{} is missing attribute {}", element.name, key))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn array_element(encoding: &str, ordering: &str, endian: &str, data: &str) -> Element {
        Element::new("DataArray")
            .with_attr("Intent", "NIFTI_INTENT_POINTSET")
            .with_attr("DataType", "NIFTI_TYPE_FLOAT32")
            .with_attr("ArrayIndexingOrder", ordering)
            .with_attr("Dimensionality", 2)
            .with_attr("Dim0", 2)
            .with_attr("Dim1", 3)
            .with_attr("Encoding", encoding)
            .with_attr("Endian", endian)
            .with_child(Element::new("Data").with_text(data))
    }

    #[test]
    fn ascii_column_major_is_transposed() {
        let element = array_element("ASCII", "ColumnMajorOrder", "LittleEndian", "1 4 2 5 3 6");
        let array = DataArray::from_element(&element).unwrap();
        assert_eq!(array.ordering, ArrayOrdering::RowMajor);
        assert_eq!(array.data, ArrayData::F32(vec![1., 2., 3., 4., 5., 6.]));
        let m = array.to_array2_f32().unwrap();
        assert_eq!(m[[1, 0]], 4.);
    }

    #[test]
    fn column_major_volume_is_reordered() {
        // a 2x3x2 array stored with the first index varying fastest
        let column_major: Vec<String> = (0..12).map(|n| n.to_string()).collect();
        let element = Element::new("DataArray")
            .with_attr("Intent", "NIFTI_INTENT_NONE")
            .with_attr("DataType", "NIFTI_TYPE_INT32")
            .with_attr("ArrayIndexingOrder", "ColumnMajorOrder")
            .with_attr("Dimensionality", 3)
            .with_attr("Dim0", 2)
            .with_attr("Dim1", 3)
            .with_attr("Dim2", 2)
            .with_attr("Encoding", "ASCII")
            .with_child(Element::new("Data").with_text(column_major.join(" ")));
        let array = DataArray::from_element(&element).unwrap();
        assert_eq!(array.ordering, ArrayOrdering::RowMajor);
        // value at (i, j, k) is i + 2j + 6k
        assert_eq!(
            array.data,
            ArrayData::I32(vec![0, 6, 2, 8, 4, 10, 1, 7, 3, 9, 5, 11])
        );
    }

    #[test]
    fn oversized_dimensions_are_malformed() {
        let element = Element::new("DataArray")
            .with_attr("Intent", "NIFTI_INTENT_POINTSET")
            .with_attr("DataType", "NIFTI_TYPE_FLOAT32")
            .with_attr("Dimensionality", 2)
            .with_attr("Dim0", 4294967296u64)
            .with_attr("Dim1", 4294967296u64)
            .with_attr("Encoding", "Base64Binary")
            .with_child(Element::new("Data").with_text("AAAAAA=="));
        match DataArray::from_element(&element) {
            Err(CitrixError::MalformedGifti(_)) => {}
            other => panic!("expected a malformed GIFTI error, got {:?}", other),
        }

        let huge = vec![usize::MAX, 2];
        assert!(DataArray::new(Intent::Normal, huge, ArrayData::F32(vec![])).is_err());
    }

    #[test]
    fn binary_encodings_agree() {
        let values: Vec<f32> = vec![0.5, -1., 2., 3.25, 4., 1e3];
        let mut big = ByteOrdered::be(Vec::new());
        for v in &values {
            big.write_f32(*v).unwrap();
        }
        let big = big.into_inner();
        let plain = STANDARD.encode(&big);
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&big).unwrap();
        let zipped = STANDARD.encode(encoder.finish().unwrap());

        let a = DataArray::from_element(&array_element(
            "Base64Binary",
            "RowMajorOrder",
            "BigEndian",
            &plain,
        ))
        .unwrap();
        let b = DataArray::from_element(&array_element(
            "GZipBase64Binary",
            "RowMajorOrder",
            "BigEndian",
            &zipped,
        ))
        .unwrap();
        assert_eq!(a.data, ArrayData::F32(values));
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn written_arrays_read_back() {
        for encoding in &[Encoding::Ascii, Encoding::Base64Binary, Encoding::GZipBase64Binary] {
            let mut array =
                DataArray::new(Intent::Triangle, vec![2, 3], ArrayData::I32(vec![0, 1, 2, 1, 2, 3]))
                    .unwrap();
            array.encoding = *encoding;
            let back = DataArray::from_element(&array.to_element().unwrap()).unwrap();
            assert_eq!(back, array);
            assert_eq!(back.to_array2_u32().unwrap().row(1).to_vec(), vec![1, 2, 3]);
        }
    }

    #[test]
    fn rejects_bad_arrays() {
        let short = array_element("ASCII", "RowMajorOrder", "LittleEndian", "1 2 3");
        assert!(DataArray::from_element(&short).is_err());
        let external = array_element("ExternalFileBinary", "RowMajorOrder", "LittleEndian", "");
        assert!(DataArray::from_element(&external).is_err());
        assert!(DataArray::new(Intent::Normal, vec![3], ArrayData::F32(vec![1.])).is_err());
    }
}
