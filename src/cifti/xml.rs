//! Reading and writing the CIFTI-2 XML document.
use super::model::{
    BrainModel, CiftiHeader, Label, Matrix, MatrixIndicesMap, MetaData, NamedMap, Parcel,
    ParcelVertices, Surface, Volume,
};
use super::structure::{BrainStructure, IndexType, ModelType};
use crate::error::{CitrixError, Result};
use crate::xmltree::{self, Element};
use std::str::{self, FromStr};

/// Parse whitespace-separated vertex indices.
pub fn text_to_indices(text: &str) -> Result<Vec<u64>> {
    text.split_whitespace()
        .map(|t| t.parse::<u64>().map_err(CitrixError::from))
        .collect()
}

/// Write vertex indices separated by single spaces.
pub fn indices_to_text(indices: &[u64]) -> String {
    join(indices.iter())
}

/// Parse whitespace-separated voxel triples.
pub fn text_to_voxels(text: &str) -> Result<Vec<[u64; 3]>> {
    let flat = text_to_indices(text)?;
    if flat.len() % 3 != 0 {
        return Err(CitrixError::MalformedCifti(format!(
            "voxel index list of length {} is not made of triples",
            flat.len()
        )));
    }
    Ok(flat.chunks(3).map(|c| [c[0], c[1], c[2]]).collect())
}

/// Write voxel triples separated by single spaces.
pub fn voxels_to_text(voxels: &[[u64; 3]]) -> String {
    join(voxels.iter().flat_map(|v| v.iter()))
}

fn join<T: ToString, I: Iterator<Item = T>>(it: I) -> String {
    it.map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

impl CiftiHeader {
    /// Parse a CIFTI-2 XML document.
    pub fn from_xml(xml: &str) -> Result<CiftiHeader> {
        let root = xmltree::parse(xml)?;
        header_from_element(&root)
    }

    /// Parse the raw content of a NIfTI extension. Trailing NUL padding
    /// is ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<CiftiHeader> {
        let end = bytes
            .iter()
            .rposition(|b| *b != 0)
            .map(|p| p + 1)
            .unwrap_or(0);
        CiftiHeader::from_xml(str::from_utf8(&bytes[..end])?)
    }

    /// Serialise the header as a CIFTI-2 XML document.
    pub fn to_xml(&self) -> Result<String> {
        xmltree::write(&header_to_element(self), None)
    }
}

fn malformed<S: Into<String>>(msg: S) -> CitrixError {
    CitrixError::MalformedCifti(msg.into())
}

fn required<'a>(element: &'a Element, key: &str) -> Result<&'a str> {
    element.attr(key).ok_or_else(|| {
        malformed(format!(
            "element {} lacks attribute {}",
            element.name, key
        ))
    })
}

fn parse_attr<T>(element: &Element, key: &str) -> Result<T>
where
    T: FromStr,
    CitrixError: From<T::Err>,
{
    Ok(required(element, key)?.trim().parse::<T>()?)
}

fn optional_attr<T>(element: &Element, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    CitrixError: From<T::Err>,
{
    match element.attr(key) {
        Some(v) => Ok(Some(v.trim().parse::<T>()?)),
        None => Ok(None),
    }
}

fn header_from_element(root: &Element) -> Result<CiftiHeader> {
    if root.name != "CIFTI" {
        return Err(malformed(format!("root element is {}, not CIFTI", root.name)));
    }
    let version = root.attr("Version").unwrap_or("2").to_string();
    let matrix = root
        .child("Matrix")
        .ok_or_else(|| malformed("no Matrix element"))?;

    let metadata = match matrix.child("MetaData") {
        Some(m) => metadata_from_element(m),
        None => MetaData::default(),
    };
    let maps = matrix
        .children_named("MatrixIndicesMap")
        .map(map_from_element)
        .collect::<Result<Vec<_>>>()?;

    Ok(CiftiHeader {
        version,
        matrix: Matrix { metadata, maps },
    })
}

pub(crate) fn metadata_from_element(element: &Element) -> MetaData {
    MetaData(
        element
            .children_named("MD")
            .map(|md| {
                let name = md.child("Name").map(|n| n.text.clone()).unwrap_or_default();
                let value = md.child("Value").map(|v| v.text.clone()).unwrap_or_default();
                (name, value)
            })
            .collect(),
    )
}

pub(crate) fn metadata_to_element(metadata: &MetaData) -> Element {
    let mut element = Element::new("MetaData");
    for (name, value) in &metadata.0 {
        element.children.push(
            Element::new("MD")
                .with_child(Element::new("Name").with_text(name.as_str()))
                .with_child(Element::new("Value").with_text(value.as_str())),
        );
    }
    element
}

fn map_from_element(element: &Element) -> Result<MatrixIndicesMap> {
    let applies_to = required(element, "AppliesToMatrixDimension")?
        .split(',')
        .map(|d| d.trim().parse::<usize>().map_err(CitrixError::from))
        .collect::<Result<Vec<_>>>()?;
    let indices_type: IndexType = required(element, "IndicesMapToDataType")?.parse()?;

    let mut map = MatrixIndicesMap::new(applies_to, indices_type);
    map.number_of_series_points = optional_attr(element, "NumberOfSeriesPoints")?;
    map.series_exponent = optional_attr(element, "SeriesExponent")?;
    map.series_start = optional_attr(element, "SeriesStart")?;
    map.series_step = optional_attr(element, "SeriesStep")?;
    map.series_unit = element.attr("SeriesUnit").map(String::from);

    for child in &element.children {
        match child.name.as_str() {
            "NamedMap" => map.named_maps.push(named_map_from_element(child)?),
            "Surface" => map.surfaces.push(Surface {
                structure: BrainStructure::from_name(required(child, "BrainStructure")?),
                number_of_vertices: parse_attr(child, "SurfaceNumberOfVertices")?,
            }),
            "Volume" => map.volume = Some(volume_from_element(child)?),
            "Parcel" => map.parcels.push(parcel_from_element(child)?),
            "BrainModel" => map.brain_models.push(brain_model_from_element(child)?),
            _ => {}
        }
    }
    Ok(map)
}

fn named_map_from_element(element: &Element) -> Result<NamedMap> {
    let map_name = element
        .child("MapName")
        .map(|m| m.text.clone())
        .ok_or_else(|| malformed("NamedMap without MapName"))?;
    let metadata = element
        .child("MetaData")
        .map(metadata_from_element)
        .unwrap_or_default();
    let label_table = match element.child("LabelTable") {
        Some(table) => Some(label_table_from_element(table)?),
        None => None,
    };
    Ok(NamedMap {
        map_name,
        metadata,
        label_table,
    })
}

pub(crate) fn label_table_from_element(element: &Element) -> Result<Vec<Label>> {
    element
        .children_named("Label")
        .map(|l| {
            Ok(Label {
                key: parse_attr(l, "Key")?,
                name: l.text.clone(),
                red: optional_attr(l, "Red")?.unwrap_or(0.),
                green: optional_attr(l, "Green")?.unwrap_or(0.),
                blue: optional_attr(l, "Blue")?.unwrap_or(0.),
                alpha: optional_attr(l, "Alpha")?.unwrap_or(0.),
            })
        })
        .collect()
}

pub(crate) fn label_table_to_element(labels: &[Label]) -> Element {
    let mut table = Element::new("LabelTable");
    for l in labels {
        table.children.push(
            Element::new("Label")
                .with_attr("Key", l.key)
                .with_attr("Red", l.red)
                .with_attr("Green", l.green)
                .with_attr("Blue", l.blue)
                .with_attr("Alpha", l.alpha)
                .with_text(l.name.as_str()),
        );
    }
    table
}

fn volume_from_element(element: &Element) -> Result<Volume> {
    let dims = required(element, "VolumeDimensions")?
        .split(',')
        .map(|d| d.trim().parse::<u64>().map_err(CitrixError::from))
        .collect::<Result<Vec<_>>>()?;
    if dims.len() != 3 {
        return Err(malformed("VolumeDimensions must have 3 values"));
    }

    let transform = element
        .child("TransformationMatrixVoxelIndicesIJKtoXYZ")
        .ok_or_else(|| malformed("Volume without TransformationMatrixVoxelIndicesIJKtoXYZ"))?;
    let values = transform
        .text
        .split_whitespace()
        .map(|v| v.parse::<f64>().map_err(CitrixError::from))
        .collect::<Result<Vec<_>>>()?;
    if values.len() != 16 {
        return Err(malformed(format!(
            "transformation matrix has {} values, expected 16",
            values.len()
        )));
    }
    let mut rows = [[0.; 4]; 4];
    for (i, v) in values.into_iter().enumerate() {
        rows[i / 4][i % 4] = v;
    }

    Ok(Volume {
        dimensions: [dims[0], dims[1], dims[2]],
        transform: rows,
        meters_to_unit_exponent: optional_attr(transform, "MeterExponent")?.unwrap_or(-3),
    })
}

fn parcel_from_element(element: &Element) -> Result<Parcel> {
    let vertices = element
        .children_named("Vertices")
        .map(|v| {
            Ok(ParcelVertices {
                structure: BrainStructure::from_name(required(v, "BrainStructure")?),
                indices: text_to_indices(&v.text)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let voxel_indices_ijk = match element.child("VoxelIndicesIJK") {
        Some(v) => text_to_voxels(&v.text)?,
        None => Vec::new(),
    };
    Ok(Parcel {
        name: required(element, "Name")?.to_string(),
        vertices,
        voxel_indices_ijk,
    })
}

fn brain_model_from_element(element: &Element) -> Result<BrainModel> {
    let model_type: ModelType = required(element, "ModelType")?.parse()?;
    let structure = BrainStructure::from_name(required(element, "BrainStructure")?);

    let (vertex_indices, voxel_indices_ijk) = match model_type {
        ModelType::Surface => {
            let text = element
                .child("VertexIndices")
                .map(|v| v.text.as_str())
                .unwrap_or("");
            (text_to_indices(text)?, Vec::new())
        }
        ModelType::Voxels => {
            let text = element
                .child("VoxelIndicesIJK")
                .map(|v| v.text.as_str())
                .unwrap_or("");
            (Vec::new(), text_to_voxels(text)?)
        }
    };

    Ok(BrainModel {
        index_offset: parse_attr(element, "IndexOffset")?,
        index_count: parse_attr(element, "IndexCount")?,
        model_type,
        structure,
        surface_number_of_vertices: optional_attr(element, "SurfaceNumberOfVertices")?,
        vertex_indices,
        voxel_indices_ijk,
    })
}

fn header_to_element(header: &CiftiHeader) -> Element {
    let mut matrix = Element::new("Matrix");
    if !header.matrix.metadata.is_empty() {
        matrix.children.push(metadata_to_element(&header.matrix.metadata));
    }
    for map in &header.matrix.maps {
        matrix.children.push(map_to_element(map));
    }
    Element::new("CIFTI")
        .with_attr("Version", header.version.as_str())
        .with_child(matrix)
}

fn map_to_element(map: &MatrixIndicesMap) -> Element {
    let applies_to = map
        .applies_to
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let mut element = Element::new("MatrixIndicesMap")
        .with_attr("AppliesToMatrixDimension", applies_to)
        .with_attr("IndicesMapToDataType", map.indices_type.as_str());
    if let Some(n) = map.number_of_series_points {
        element = element.with_attr("NumberOfSeriesPoints", n);
    }
    if let Some(e) = map.series_exponent {
        element = element.with_attr("SeriesExponent", e);
    }
    if let Some(s) = map.series_start {
        element = element.with_attr("SeriesStart", s);
    }
    if let Some(s) = map.series_step {
        element = element.with_attr("SeriesStep", s);
    }
    if let Some(u) = &map.series_unit {
        element = element.with_attr("SeriesUnit", u.as_str());
    }

    for named_map in &map.named_maps {
        let mut e = Element::new("NamedMap");
        if !named_map.metadata.is_empty() {
            e.children.push(metadata_to_element(&named_map.metadata));
        }
        if let Some(labels) = &named_map.label_table {
            e.children.push(label_table_to_element(labels));
        }
        e.children
            .push(Element::new("MapName").with_text(named_map.map_name.as_str()));
        element.children.push(e);
    }
    for surface in &map.surfaces {
        element.children.push(
            Element::new("Surface")
                .with_attr("BrainStructure", surface.structure.as_str())
                .with_attr("SurfaceNumberOfVertices", surface.number_of_vertices),
        );
    }
    if let Some(volume) = &map.volume {
        element.children.push(volume_to_element(volume));
    }
    for parcel in &map.parcels {
        let mut e = Element::new("Parcel").with_attr("Name", parcel.name.as_str());
        for v in &parcel.vertices {
            e.children.push(
                Element::new("Vertices")
                    .with_attr("BrainStructure", v.structure.as_str())
                    .with_text(indices_to_text(&v.indices)),
            );
        }
        if !parcel.voxel_indices_ijk.is_empty() {
            e.children.push(
                Element::new("VoxelIndicesIJK").with_text(voxels_to_text(&parcel.voxel_indices_ijk)),
            );
        }
        element.children.push(e);
    }
    for model in &map.brain_models {
        element.children.push(brain_model_to_element(model));
    }
    element
}

fn volume_to_element(volume: &Volume) -> Element {
    let dims = volume
        .dimensions
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let matrix = volume
        .transform
        .iter()
        .map(|row| join(row.iter()))
        .collect::<Vec<_>>()
        .join("\n");
    Element::new("Volume")
        .with_attr("VolumeDimensions", dims)
        .with_child(
            Element::new("TransformationMatrixVoxelIndicesIJKtoXYZ")
                .with_attr("MeterExponent", volume.meters_to_unit_exponent)
                .with_text(matrix),
        )
}

fn brain_model_to_element(model: &BrainModel) -> Element {
    let mut element = Element::new("BrainModel")
        .with_attr("IndexOffset", model.index_offset)
        .with_attr("IndexCount", model.index_count)
        .with_attr("ModelType", model.model_type.as_str())
        .with_attr("BrainStructure", model.structure.as_str());
    if let Some(n) = model.surface_number_of_vertices {
        element = element.with_attr("SurfaceNumberOfVertices", n);
    }
    match model.model_type {
        ModelType::Surface => element
            .children
            .push(Element::new("VertexIndices").with_text(indices_to_text(&model.vertex_indices))),
        ModelType::Voxels => element.children.push(
            Element::new("VoxelIndicesIJK").with_text(voxels_to_text(&model.voxel_indices_ijk)),
        ),
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cifti::structure::Direction;
    use pretty_assertions::assert_eq;

    const DCONN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CIFTI Version="2">
  <Matrix>
    <MetaData><MD><Name>Provenance</Name><Value>test</Value></MD></MetaData>
    <MatrixIndicesMap AppliesToMatrixDimension="0,1" IndicesMapToDataType="CIFTI_INDEX_TYPE_BRAIN_MODELS">
      <Volume VolumeDimensions="4,5,6">
        <TransformationMatrixVoxelIndicesIJKtoXYZ MeterExponent="-3">
          -2 0 0 90
          0 2 0 -126
          0 0 2 -72
          0 0 0 1
        </TransformationMatrixVoxelIndicesIJKtoXYZ>
      </Volume>
      <BrainModel IndexOffset="0" IndexCount="3" ModelType="CIFTI_MODEL_TYPE_SURFACE"
                  BrainStructure="CIFTI_STRUCTURE_CORTEX_LEFT" SurfaceNumberOfVertices="10">
        <VertexIndices>0 4 7</VertexIndices>
      </BrainModel>
      <BrainModel IndexOffset="3" IndexCount="2" ModelType="CIFTI_MODEL_TYPE_VOXELS"
                  BrainStructure="CIFTI_STRUCTURE_BRAIN_STEM">
        <VoxelIndicesIJK>1 2 3
        1 2 4</VoxelIndicesIJK>
      </BrainModel>
    </MatrixIndicesMap>
  </Matrix>
</CIFTI>"#;

    #[test]
    fn index_text() {
        assert_eq!(text_to_indices(" 1  2\n3 ").unwrap(), vec![1, 2, 3]);
        assert_eq!(indices_to_text(&[4, 5]), "4 5");
        assert_eq!(
            text_to_voxels("1 2 3 4 5 6").unwrap(),
            vec![[1, 2, 3], [4, 5, 6]]
        );
        assert!(text_to_voxels("1 2 3 4").is_err());
        assert_eq!(voxels_to_text(&[[1, 2, 3], [4, 5, 6]]), "1 2 3 4 5 6");
        assert!(text_to_indices("1 x").is_err());
    }

    #[test]
    fn parse_dense_header() {
        let header = CiftiHeader::from_xml(DCONN).unwrap();
        assert_eq!(header.version, "2");
        assert_eq!(header.matrix.metadata.get("Provenance"), Some("test"));
        assert_eq!(header.matrix.maps.len(), 1);

        let map = &header.matrix.maps[0];
        assert!(map.applies_to(Direction::Row));
        assert!(map.applies_to(Direction::Column));
        assert_eq!(map.brain_models.len(), 2);
        assert_eq!(map.brain_models[0].vertex_indices, vec![0, 4, 7]);
        assert_eq!(map.brain_models[0].surface_number_of_vertices, Some(10));
        assert_eq!(
            map.brain_models[1].voxel_indices_ijk,
            vec![[1, 2, 3], [1, 2, 4]]
        );
        let volume = map.volume.as_ref().unwrap();
        assert_eq!(volume.dimensions, [4, 5, 6]);
        assert_eq!(volume.transform[0], [-2., 0., 0., 90.]);
        assert_eq!(volume.meters_to_unit_exponent, -3);
    }

    #[test]
    fn xml_roundtrip() {
        let header = CiftiHeader::from_xml(DCONN).unwrap();
        let again = CiftiHeader::from_xml(&header.to_xml().unwrap()).unwrap();
        assert_eq!(again, header);
    }

    #[test]
    fn nul_padding_is_ignored() {
        let mut bytes = DCONN.as_bytes().to_vec();
        bytes.extend_from_slice(&[0; 13]);
        let header = CiftiHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.matrix.maps[0].brain_models.len(), 2);
    }

    #[test]
    fn rejects_unknown_model_type() {
        let bad = DCONN.replace("CIFTI_MODEL_TYPE_VOXELS", "CIFTI_MODEL_TYPE_BLOBS");
        assert!(CiftiHeader::from_xml(&bad).is_err());
        assert!(CiftiHeader::from_xml("<GIFTI/>").is_err());
    }
}
