//! Fixtures shared by the integration tests, built in code.
#![allow(dead_code)]

use citrix::cifti::{
    BrainModel, BrainStructure, CiftiHeader, IndexType, MatrixIndicesMap, ModelType, NamedMap,
    Parcel, ParcelVertices, Surface, Volume,
};
use citrix::gifti::{ArrayData, DataArray, GiftiImage, ANATOMICAL_STRUCTURE_PRIMARY};
use citrix::Intent;

/// A 2 mm grid of 10x10x10 voxels.
pub fn volume() -> Volume {
    Volume {
        dimensions: [10, 10, 10],
        transform: [
            [2., 0., 0., -10.],
            [0., 2., 0., -10.],
            [0., 0., 2., -10.],
            [0., 0., 0., 1.],
        ],
        meters_to_unit_exponent: -3,
    }
}

/// A brain models map over `models`, with offsets recomputed.
pub fn dense_map(applies_to: Vec<usize>, models: Vec<BrainModel>) -> MatrixIndicesMap {
    let mut map = MatrixIndicesMap::new(applies_to, IndexType::BrainModels);
    map.brain_models = models;
    map.recompute_offsets();
    if map
        .brain_models
        .iter()
        .any(|m| m.model_type == ModelType::Voxels)
    {
        map.volume = Some(volume());
    }
    map
}

/// A dense connectivity header, with the same models on both dimensions.
pub fn dconn_header(models: Vec<BrainModel>) -> CiftiHeader {
    let mut header = CiftiHeader::default();
    header.matrix.maps.push(dense_map(vec![0, 1], models));
    header
}

/// A dense time series header with `timepoints` rows.
pub fn dtseries_header(timepoints: usize, models: Vec<BrainModel>) -> CiftiHeader {
    let mut series = MatrixIndicesMap::new(vec![0], IndexType::Series);
    series.number_of_series_points = Some(timepoints as u64);
    series.series_exponent = Some(0);
    series.series_start = Some(0.);
    series.series_step = Some(0.72);
    series.series_unit = Some("SECOND".to_string());

    let mut header = CiftiHeader::default();
    header.matrix.maps.push(series);
    header.matrix.maps.push(dense_map(vec![1], models));
    header
}

/// A dense scalar header with one row per map name.
pub fn dscalar_header(names: &[&str], models: Vec<BrainModel>) -> CiftiHeader {
    let mut scalars = MatrixIndicesMap::new(vec![0], IndexType::Scalars);
    scalars.named_maps = names
        .iter()
        .map(|n| NamedMap {
            map_name: n.to_string(),
            metadata: Default::default(),
            label_table: None,
        })
        .collect();

    let mut header = CiftiHeader::default();
    header.matrix.maps.push(scalars);
    header.matrix.maps.push(dense_map(vec![1], models));
    header
}

/// A parcel connectivity header. Parcel `i` holds left cortex vertex `i`.
pub fn pconn_header(names: &[&str]) -> CiftiHeader {
    let mut map = MatrixIndicesMap::new(vec![0, 1], IndexType::Parcels);
    map.surfaces = vec![Surface {
        structure: BrainStructure::CortexLeft,
        number_of_vertices: names.len() as u64,
    }];
    map.parcels = names
        .iter()
        .enumerate()
        .map(|(i, n)| Parcel {
            name: n.to_string(),
            vertices: vec![ParcelVertices {
                structure: BrainStructure::CortexLeft,
                indices: vec![i as u64],
            }],
            voxel_indices_ijk: vec![],
        })
        .collect();

    let mut header = CiftiHeader::default();
    header.matrix.maps.push(map);
    header
}

/// Left cortex vertices and a small left thalamus.
pub fn subject_a_models() -> Vec<BrainModel> {
    vec![
        BrainModel::surface(BrainStructure::CortexLeft, 4, vec![0, 1, 2, 3]),
        BrainModel::voxels(BrainStructure::ThalamusLeft, vec![[5, 5, 5], [5, 5, 6]]),
    ]
}

/// Fewer left cortex vertices, the same thalamus and a right cortex.
pub fn subject_b_models() -> Vec<BrainModel> {
    vec![
        BrainModel::surface(BrainStructure::CortexLeft, 4, vec![1, 3]),
        BrainModel::surface(BrainStructure::CortexRight, 4, vec![0]),
        BrainModel::voxels(BrainStructure::ThalamusLeft, vec![[5, 5, 6], [5, 5, 5]]),
    ]
}

/// A four-vertex square mesh lying in the z = 0 plane, with 2 mm sides,
/// as a GIFTI surface document.
pub fn square_surface(structure: &str) -> GiftiImage {
    let points = DataArray::new(
        Intent::Pointset,
        vec![4, 3],
        ArrayData::F32(vec![
            0., 0., 0., //
            2., 0., 0., //
            2., 2., 0., //
            0., 2., 0.,
        ]),
    )
    .unwrap();
    let triangles = DataArray::new(
        Intent::Triangle,
        vec![2, 3],
        ArrayData::I32(vec![0, 1, 2, 0, 2, 3]),
    )
    .unwrap();

    let mut image = GiftiImage::default();
    image.meta.set(ANATOMICAL_STRUCTURE_PRIMARY, structure);
    image.data_arrays = vec![points, triangles];
    image
}
