//! GIFTI documents and the functional-data view over them.
use super::array::{malformed, DataArray};
use crate::cifti::model::{Label, MetaData};
use crate::cifti::structure::BrainStructure;
use crate::cifti::xml::{
    label_table_from_element, label_table_to_element, metadata_from_element, metadata_to_element,
};
use crate::error::{CitrixError, Result};
use crate::typedef::Intent;
use crate::util::is_gz_file;
use crate::xmltree::{self, Element};
use flate2::bufread::GzDecoder;
use ndarray::Array1;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str;
use tracing::warn;

const GIFTI_DOCTYPE: &str = r#"GIFTI SYSTEM "http://www.nitrc.org/frs/download.php/115/gifti.dtd""#;

/// Metadata key naming the structure a GIFTI file describes.
pub const ANATOMICAL_STRUCTURE_PRIMARY: &str = "AnatomicalStructurePrimary";

/// A GIFTI document held in memory.
#[derive(Debug, PartialEq, Clone)]
pub struct GiftiImage {
    /// The `Version` attribute.
    pub version: String,
    /// File-level metadata.
    pub meta: MetaData,
    /// Label table, empty when absent.
    pub label_table: Vec<Label>,
    /// The data arrays in document order.
    pub data_arrays: Vec<DataArray>,
}

impl Default for GiftiImage {
    fn default() -> Self {
        GiftiImage {
            version: "1.0".to_string(),
            meta: MetaData::default(),
            label_table: Vec::new(),
            data_arrays: Vec::new(),
        }
    }
}

impl GiftiImage {
    /// Read a `.gii` file, gzipped or not.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<GiftiImage> {
        let mut file = BufReader::new(File::open(&path)?);
        let mut bytes = Vec::new();
        if is_gz_file(&path) {
            let _ = GzDecoder::new(file).read_to_end(&mut bytes)?;
        } else {
            let _ = file.read_to_end(&mut bytes)?;
        }
        GiftiImage::from_xml(str::from_utf8(&bytes)?)
    }

    /// Parse a GIFTI document.
    pub fn from_xml(xml: &str) -> Result<GiftiImage> {
        let root = xmltree::parse(xml)?;
        if root.name != "GIFTI" {
            return Err(malformed(format!("root element is {}", root.name)));
        }

        let data_arrays = root
            .children_named("DataArray")
            .map(DataArray::from_element)
            .collect::<Result<Vec<_>>>()?;
        if let Some(declared) = root.attr("NumberOfDataArrays") {
            if declared.parse::<usize>().ok() != Some(data_arrays.len()) {
                warn!(
                    "GIFTI declares {} data arrays but holds {}",
                    declared,
                    data_arrays.len()
                );
            }
        }

        Ok(GiftiImage {
            version: root.attr("Version").unwrap_or("1.0").to_string(),
            meta: root
                .child("MetaData")
                .map(metadata_from_element)
                .unwrap_or_default(),
            label_table: match root.child("LabelTable") {
                Some(table) => label_table_from_element(table)?,
                None => Vec::new(),
            },
            data_arrays,
        })
    }

    /// Serialise the document. Binary arrays are written little-endian
    /// in row-major order.
    pub fn to_xml(&self) -> Result<String> {
        let mut root = Element::new("GIFTI")
            .with_attr("Version", self.version.as_str())
            .with_attr("NumberOfDataArrays", self.data_arrays.len())
            .with_child(metadata_to_element(&self.meta))
            .with_child(label_table_to_element(&self.label_table));
        for array in &self.data_arrays {
            root.children.push(array.to_element()?);
        }
        xmltree::write(&root, Some(GIFTI_DOCTYPE))
    }

    /// Write the document to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_xml()?)?;
        Ok(())
    }

    /// The first data array with the given intent.
    pub fn data_array(&self, intent: Intent) -> Option<&DataArray> {
        self.data_arrays.iter().find(|a| a.intent == intent)
    }

    /// The cortex this document describes, from the
    /// `AnatomicalStructurePrimary` metadata of the file or of any of
    /// its arrays.
    pub fn principal_structure(&self) -> Result<BrainStructure> {
        let name = std::iter::once(&self.meta)
            .chain(self.data_arrays.iter().map(|a| &a.meta))
            .find_map(|meta| meta.get(ANATOMICAL_STRUCTURE_PRIMARY))
            .ok_or_else(|| CitrixError::NotFound(ANATOMICAL_STRUCTURE_PRIMARY.to_string()))?;
        match name {
            "CortexLeft" => Ok(BrainStructure::CortexLeft),
            "CortexRight" => Ok(BrainStructure::CortexRight),
            other => Err(malformed(format!("unsupported principal structure {}", other))),
        }
    }
}

/// A GIFTI document holding per-vertex function values (`.func.gii`).
#[derive(Debug, PartialEq, Clone)]
pub struct GiftiFunction {
    image: GiftiImage,
}

impl GiftiFunction {
    /// Wrap a document. It must hold at least one data array.
    pub fn from_image(image: GiftiImage) -> Result<GiftiFunction> {
        if image.data_arrays.is_empty() {
            return Err(malformed("function file without data arrays"));
        }
        Ok(GiftiFunction { image })
    }

    /// Read a `.func.gii` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<GiftiFunction> {
        GiftiFunction::from_image(GiftiImage::from_file(path)?)
    }

    /// Values of the first data array, flattened in row-major order.
    pub fn function_data(&self) -> Array1<f32> {
        Array1::from(self.image.data_arrays[0].data.to_f32_vec())
    }

    /// The underlying document.
    pub fn image(&self) -> &GiftiImage {
        &self.image
    }

    /// Take the underlying document.
    pub fn into_image(self) -> GiftiImage {
        self.image
    }

    /// Write the document to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gifti::array::ArrayData;
    use pretty_assertions::assert_eq;

    const SURFACE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE GIFTI SYSTEM "http://www.nitrc.org/frs/download.php/115/gifti.dtd">
<GIFTI Version="1.0" NumberOfDataArrays="2">
  <MetaData>
    <MD><Name><![CDATA[AnatomicalStructurePrimary]]></Name><Value><![CDATA[CortexRight]]></Value></MD>
  </MetaData>
  <LabelTable/>
  <DataArray Intent="NIFTI_INTENT_POINTSET" DataType="NIFTI_TYPE_FLOAT32" ArrayIndexingOrder="RowMajorOrder" Dimensionality="2" Dim0="3" Dim1="3" Encoding="ASCII" Endian="LittleEndian" ExternalFileName="" ExternalFileOffset="">
    <MetaData/>
    <CoordinateSystemTransformMatrix>
      <DataSpace><![CDATA[NIFTI_XFORM_TALAIRACH]]></DataSpace>
      <TransformedSpace><![CDATA[NIFTI_XFORM_TALAIRACH]]></TransformedSpace>
      <MatrixData>1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1</MatrixData>
    </CoordinateSystemTransformMatrix>
    <Data>0 0 0 1 0 0 0 1 0</Data>
  </DataArray>
  <DataArray Intent="NIFTI_INTENT_TRIANGLE" DataType="NIFTI_TYPE_INT32" ArrayIndexingOrder="RowMajorOrder" Dimensionality="2" Dim0="1" Dim1="3" Encoding="ASCII" Endian="LittleEndian" ExternalFileName="" ExternalFileOffset="">
    <Data>0 1 2</Data>
  </DataArray>
</GIFTI>"#;

    #[test]
    fn parse_surface_document() {
        let image = GiftiImage::from_xml(SURFACE).unwrap();
        assert_eq!(image.data_arrays.len(), 2);
        assert_eq!(image.principal_structure().unwrap(), BrainStructure::CortexRight);
        let points = image.data_array(Intent::Pointset).unwrap();
        assert_eq!(points.dims, vec![3, 3]);
        let cs = points.coordinate_system.as_ref().unwrap();
        assert_eq!(cs.data_space, "NIFTI_XFORM_TALAIRACH");
        assert_eq!(cs.transform[3][3], 1.);
        let triangles = image.data_array(Intent::Triangle).unwrap();
        assert_eq!(triangles.data, ArrayData::I32(vec![0, 1, 2]));
    }

    #[test]
    fn document_roundtrip() {
        let image = GiftiImage::from_xml(SURFACE).unwrap();
        let xml = image.to_xml().unwrap();
        assert!(xml.contains("<!DOCTYPE GIFTI"));
        assert_eq!(GiftiImage::from_xml(&xml).unwrap(), image);
    }

    #[test]
    fn principal_structure_errors() {
        let mut image = GiftiImage::default();
        assert!(image.principal_structure().is_err());
        image.meta.set(ANATOMICAL_STRUCTURE_PRIMARY, "Cerebellum");
        assert!(image.principal_structure().is_err());
        image.meta.set(ANATOMICAL_STRUCTURE_PRIMARY, "CortexLeft");
        assert_eq!(image.principal_structure().unwrap(), BrainStructure::CortexLeft);
    }

    #[test]
    fn function_needs_an_array() {
        assert!(GiftiFunction::from_image(GiftiImage::default()).is_err());
    }
}
