//! The in-memory form of a CIFTI-2 XML document.
use super::structure::{BrainStructure, Direction, IndexType, ModelType};
use crate::affine::{from_rows, Affine4};

/// Name/value metadata pairs, as found in `MetaData` elements of both
/// CIFTI-2 and GIFTI documents. Order is preserved.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct MetaData(pub Vec<(String, String)>);

impl MetaData {
    /// Value of the first entry named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set `name` to `value`, replacing an existing entry.
    pub fn set<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A parsed CIFTI-2 XML header.
#[derive(Debug, PartialEq, Clone)]
pub struct CiftiHeader {
    /// The `Version` attribute, `"2"` for CIFTI-2.
    pub version: String,
    /// The single `Matrix` element.
    pub matrix: Matrix,
}

impl Default for CiftiHeader {
    fn default() -> Self {
        CiftiHeader {
            version: "2".to_string(),
            matrix: Matrix::default(),
        }
    }
}

/// The `Matrix` element: metadata and one map per dimension (or per
/// group of dimensions).
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Matrix {
    /// Matrix-level metadata.
    pub metadata: MetaData,
    /// The `MatrixIndicesMap` children, in document order.
    pub maps: Vec<MatrixIndicesMap>,
}

/// Describes what the indices along one or more matrix dimensions
/// refer to.
#[derive(Debug, PartialEq, Clone)]
pub struct MatrixIndicesMap {
    /// `AppliesToMatrixDimension`, which may list several dimensions.
    pub applies_to: Vec<usize>,
    /// `IndicesMapToDataType`.
    pub indices_type: IndexType,
    /// `NumberOfSeriesPoints`, series maps only.
    pub number_of_series_points: Option<u64>,
    /// `SeriesExponent`, series maps only.
    pub series_exponent: Option<i32>,
    /// `SeriesStart`, series maps only.
    pub series_start: Option<f64>,
    /// `SeriesStep`, series maps only.
    pub series_step: Option<f64>,
    /// `SeriesUnit`, series maps only.
    pub series_unit: Option<String>,
    /// `NamedMap` children (scalar and label maps).
    pub named_maps: Vec<NamedMap>,
    /// `Surface` children (parcel maps).
    pub surfaces: Vec<Surface>,
    /// The `Volume` child, if any voxels are referenced.
    pub volume: Option<Volume>,
    /// `Parcel` children, in document order.
    pub parcels: Vec<Parcel>,
    /// `BrainModel` children, in document order.
    pub brain_models: Vec<BrainModel>,
}

impl MatrixIndicesMap {
    /// An empty map for the given dimensions.
    pub fn new(applies_to: Vec<usize>, indices_type: IndexType) -> Self {
        MatrixIndicesMap {
            applies_to,
            indices_type,
            number_of_series_points: None,
            series_exponent: None,
            series_start: None,
            series_step: None,
            series_unit: None,
            named_maps: Vec::new(),
            surfaces: Vec::new(),
            volume: None,
            parcels: Vec::new(),
            brain_models: Vec::new(),
        }
    }

    /// Whether this map describes the given direction.
    pub fn applies_to(&self, direction: Direction) -> bool {
        self.applies_to.contains(&direction.dimension())
    }

    /// Rewrite `IndexOffset` of every brain model as the running sum of
    /// `IndexCount`, in document order.
    pub fn recompute_offsets(&mut self) {
        let mut offset = 0;
        for model in &mut self.brain_models {
            model.index_offset = offset;
            offset += model.index_count;
        }
    }
}

/// The indices a brain model maps to.
#[derive(Debug, PartialEq, Clone)]
pub enum ModelIndices {
    /// Surface vertex indices.
    Vertices(Vec<u64>),
    /// Voxel `(i, j, k)` triples.
    Voxels(Vec<[u64; 3]>),
}

impl ModelIndices {
    /// Number of indices.
    pub fn len(&self) -> usize {
        match self {
            ModelIndices::Vertices(v) => v.len(),
            ModelIndices::Voxels(v) => v.len(),
        }
    }

    /// Whether there are no indices.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A contiguous run of matrix indices mapped to one brain structure.
#[derive(Debug, PartialEq, Clone)]
pub struct BrainModel {
    /// First matrix index of this model.
    pub index_offset: u64,
    /// Number of matrix indices of this model.
    pub index_count: u64,
    /// Surface or voxels.
    pub model_type: ModelType,
    /// The structure this model covers.
    pub structure: BrainStructure,
    /// `SurfaceNumberOfVertices`, surface models only.
    pub surface_number_of_vertices: Option<u64>,
    /// `VertexIndices`, surface models only.
    pub vertex_indices: Vec<u64>,
    /// `VoxelIndicesIJK`, voxel models only.
    pub voxel_indices_ijk: Vec<[u64; 3]>,
}

impl BrainModel {
    /// A surface model over the given vertices of a mesh of
    /// `number_of_vertices` vertices. Offset is left at 0.
    pub fn surface(structure: BrainStructure, number_of_vertices: u64, vertices: Vec<u64>) -> Self {
        BrainModel {
            index_offset: 0,
            index_count: vertices.len() as u64,
            model_type: ModelType::Surface,
            structure,
            surface_number_of_vertices: Some(number_of_vertices),
            vertex_indices: vertices,
            voxel_indices_ijk: Vec::new(),
        }
    }

    /// A voxel model over the given voxels. Offset is left at 0.
    pub fn voxels(structure: BrainStructure, voxels: Vec<[u64; 3]>) -> Self {
        BrainModel {
            index_offset: 0,
            index_count: voxels.len() as u64,
            model_type: ModelType::Voxels,
            structure,
            surface_number_of_vertices: None,
            vertex_indices: Vec::new(),
            voxel_indices_ijk: voxels,
        }
    }

    /// The index list matching the model type.
    pub fn indices(&self) -> ModelIndices {
        match self.model_type {
            ModelType::Surface => ModelIndices::Vertices(self.vertex_indices.clone()),
            ModelType::Voxels => ModelIndices::Voxels(self.voxel_indices_ijk.clone()),
        }
    }

    /// Length of the index list matching the model type.
    pub fn indices_len(&self) -> usize {
        match self.model_type {
            ModelType::Surface => self.vertex_indices.len(),
            ModelType::Voxels => self.voxel_indices_ijk.len(),
        }
    }
}

/// The vertices of one surface that belong to a parcel.
#[derive(Debug, PartialEq, Clone)]
pub struct ParcelVertices {
    /// `BrainStructure` attribute.
    pub structure: BrainStructure,
    /// Vertex indices.
    pub indices: Vec<u64>,
}

/// A named group of vertices and voxels, occupying one matrix index.
#[derive(Debug, PartialEq, Clone)]
pub struct Parcel {
    /// `Name` attribute.
    pub name: String,
    /// `Vertices` children.
    pub vertices: Vec<ParcelVertices>,
    /// `VoxelIndicesIJK` child.
    pub voxel_indices_ijk: Vec<[u64; 3]>,
}

/// A surface referenced by a parcel map.
#[derive(Debug, PartialEq, Clone)]
pub struct Surface {
    /// `BrainStructure` attribute.
    pub structure: BrainStructure,
    /// `SurfaceNumberOfVertices` attribute.
    pub number_of_vertices: u64,
}

/// A named map: one scalar or label map along a dimension.
#[derive(Debug, PartialEq, Clone)]
pub struct NamedMap {
    /// `MapName` text.
    pub map_name: String,
    /// Map metadata.
    pub metadata: MetaData,
    /// `LabelTable`, label maps only.
    pub label_table: Option<Vec<Label>>,
}

/// One entry of a label table. Colour channels are in `[0, 1]`.
#[derive(Debug, PartialEq, Clone)]
pub struct Label {
    /// Value in the data that carries this label.
    pub key: i32,
    /// Label text.
    pub name: String,
    /// Red channel.
    pub red: f32,
    /// Green channel.
    pub green: f32,
    /// Blue channel.
    pub blue: f32,
    /// Alpha channel.
    pub alpha: f32,
}

/// The voxel grid referenced by voxel models and parcels.
#[derive(Debug, PartialEq, Clone)]
pub struct Volume {
    /// `VolumeDimensions`.
    pub dimensions: [u64; 3],
    /// `TransformationMatrixVoxelIndicesIJKtoXYZ`, row-major.
    pub transform: [[f64; 4]; 4],
    /// `MeterExponent` of the transform, usually -3 (millimetres).
    pub meters_to_unit_exponent: i32,
}

impl Volume {
    /// The voxel-to-world transform.
    pub fn affine(&self) -> Affine4 {
        from_rows(&self.transform)
    }
}
