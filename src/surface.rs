//! Cortical surface meshes and neighbourhood constraints.
use crate::cifti::model::CiftiHeader;
use crate::cifti::structure::{BrainStructure, Direction, ModelType};
use crate::error::{CitrixError, Result};
use crate::gifti::GiftiImage;
use crate::typedef::Intent;
use ndarray::Array2;
use std::collections::HashSet;
use std::path::Path;

/// A triangulated cortical surface.
#[derive(Debug, PartialEq, Clone)]
pub struct CiftiMesh {
    structure: BrainStructure,
    vertices: Array2<f32>,
    triangles: Array2<u32>,
}

impl CiftiMesh {
    /// Assemble a mesh from `N x 3` vertex coordinates and `M x 3` vertex
    /// indices. Only the left and right cortex are accepted.
    pub fn new(
        structure: BrainStructure,
        vertices: Array2<f32>,
        triangles: Array2<u32>,
    ) -> Result<CiftiMesh> {
        if !structure.is_cortex() {
            return Err(CitrixError::InvalidArgument(
                "structure should be CortexLeft or CortexRight".to_string(),
            ));
        }
        if vertices.ncols() != 3 || triangles.ncols() != 3 {
            return Err(CitrixError::InvalidArgument(
                "vertices and triangles must have 3 columns".to_string(),
            ));
        }
        let nverts = vertices.nrows();
        if let Some(bad) = triangles.iter().find(|&&v| v as usize >= nverts) {
            return Err(CitrixError::InvalidArgument(format!(
                "triangle refers to vertex {} of a mesh with {} vertices",
                bad, nverts
            )));
        }
        Ok(CiftiMesh {
            structure,
            vertices,
            triangles,
        })
    }

    /// Read a `.surf.gii` file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<CiftiMesh> {
        CiftiMesh::from_gifti(&GiftiImage::from_file(path)?)
    }

    /// Build a mesh from the point set and triangle arrays of a GIFTI
    /// document.
    pub fn from_gifti(image: &GiftiImage) -> Result<CiftiMesh> {
        let vertices = image
            .data_array(Intent::Pointset)
            .ok_or_else(|| CitrixError::NotFound("NIFTI_INTENT_POINTSET array".to_string()))?
            .to_array2_f32()?;
        let triangles = image
            .data_array(Intent::Triangle)
            .ok_or_else(|| CitrixError::NotFound("NIFTI_INTENT_TRIANGLE array".to_string()))?
            .to_array2_u32()?;
        CiftiMesh::new(image.principal_structure()?, vertices, triangles)
    }

    /// The cortex this mesh covers.
    pub fn structure(&self) -> &BrainStructure {
        &self.structure
    }

    /// Surface meshes are always surface models.
    pub fn model_type(&self) -> ModelType {
        ModelType::Surface
    }

    /// Vertex coordinates, one per row.
    pub fn vertices(&self) -> &Array2<f32> {
        &self.vertices
    }

    /// Vertex indices of each triangle, one per row.
    pub fn triangles(&self) -> &Array2<u32> {
        &self.triangles
    }
}

/// Position of the pair `(i, j)`, `i != j`, in the condensed upper
/// triangle of an `n x n` symmetric matrix.
pub fn mat2cond_index(n: usize, i: usize, j: usize) -> usize {
    let (i, j) = if i < j { (i, j) } else { (j, i) };
    debug_assert!(i != j && j < n);
    n * i - i * (i + 1) / 2 + (j - i - 1)
}

/// Condensed adjacency between mesh vertices: 1 when two vertices share
/// a triangle edge. When `vertices` is given, only those vertices are
/// considered, and their order defines the matrix order.
pub fn constraint_from_surface(mesh: &CiftiMesh, vertices: Option<&[usize]>) -> Result<Vec<i8>> {
    let size = mesh.vertices.nrows();
    let mut edges_map: Vec<Option<usize>> = vec![None; size];
    let n = match vertices {
        Some(vertices) => {
            for (position, v) in vertices.iter().enumerate() {
                let slot = edges_map.get_mut(*v).ok_or_else(|| {
                    CitrixError::InvalidArgument(format!(
                        "vertex {} out of a mesh with {} vertices",
                        v, size
                    ))
                })?;
                *slot = Some(position);
            }
            vertices.len()
        }
        None => {
            for (v, slot) in edges_map.iter_mut().enumerate() {
                *slot = Some(v);
            }
            size
        }
    };

    let mut neighbors = vec![0i8; n * n.saturating_sub(1) / 2];
    for triangle in mesh.triangles.outer_iter() {
        let corners = [
            edges_map[triangle[0] as usize],
            edges_map[triangle[1] as usize],
            edges_map[triangle[2] as usize],
        ];
        for &(a, b) in &[(0, 1), (0, 2), (2, 1)] {
            if let (Some(i), Some(j)) = (corners[a], corners[b]) {
                if i != j {
                    neighbors[mat2cond_index(n, i, j)] = 1;
                }
            }
        }
    }
    Ok(neighbors)
}

/// Condensed adjacency between the voxels of all voxel models along
/// `direction`, in document order. Two voxels are neighbours when none
/// of their coordinates differ by more than one. When `filter` is given,
/// only voxels in it are kept.
pub fn constraint_from_voxels(
    header: &CiftiHeader,
    direction: Direction,
    filter: Option<&[[u64; 3]]>,
) -> Result<Vec<i8>> {
    let keep: Option<HashSet<&[u64; 3]>> = filter.map(|f| f.iter().collect());

    let mut voxels = Vec::new();
    for model in header.brain_models(direction, Some(ModelType::Voxels), None)? {
        voxels.extend(
            model
                .voxel_indices_ijk
                .iter()
                .copied()
                .filter(|v| keep.as_ref().map_or(true, |k| k.contains(v))),
        );
    }

    let n = voxels.len();
    let mut neighbors = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for (i, a) in voxels.iter().enumerate() {
        for b in &voxels[i + 1..] {
            let adjacent = a.iter().zip(b).all(|(x, y)| x.max(y) - x.min(y) <= 1);
            neighbors.push(adjacent as i8);
        }
    }
    Ok(neighbors)
}
