//! Command-line tools, exposed as library operations.
use crate::affine::{apply_affine, Affine4};
use crate::cifti::{BrainModel, CiftiImage, Direction};
use crate::error::{CitrixError, Result};
use crate::object::ReaderOptions;
use crate::surface::CiftiMesh;
use crate::util::has_suffix;
use ndarray::{Array2, Axis};
use std::path::Path;

pub mod average;
pub mod dlabel;
pub mod dtseries;
pub mod logodds;

pub use self::average::cifti_average;
pub use self::dlabel::dlabel_to_nifti;
pub use self::dtseries::dtseries_to_nifti;

fn check_suffix<P: AsRef<Path>>(path: P, suffix: &str, msg: &str) -> Result<()> {
    if has_suffix(path, suffix) {
        Ok(())
    } else {
        Err(CitrixError::InvalidArgument(msg.to_string()))
    }
}

fn check_exist<P: AsRef<Path>>(files: &[P]) -> Result<()> {
    for file in files {
        if !file.as_ref().exists() {
            return Err(CitrixError::InvalidArgument(format!(
                "The file {} does not exist",
                file.as_ref().display()
            )));
        }
    }
    Ok(())
}

fn load_surfaces<P: AsRef<Path>>(files: &[P]) -> Result<Vec<CiftiMesh>> {
    files.iter().map(CiftiMesh::load).collect()
}

/// Grid size and voxel-to-world transform of the dense column volume.
fn column_volume(image: &CiftiImage) -> Result<Option<([usize; 3], Affine4)>> {
    Ok(image
        .cifti_header()
        .volume_attributes(Direction::Column)?
        .map(|(dims, affine)| ([dims[0] as usize, dims[1] as usize, dims[2] as usize], affine)))
}

/// Grid size and affine of a plain NIfTI image.
fn reference_volume<P: AsRef<Path>>(path: P) -> Result<([usize; 3], Affine4)> {
    let (header, _) = ReaderOptions::new().read_header_file(path)?;
    let dim = header.dim()?;
    let mut shape = [1usize; 3];
    for (s, d) in shape.iter_mut().zip(dim) {
        *s = *d as usize;
    }
    Ok((shape, header.affine()))
}

/// Continuous voxel coordinates of the vertices of a surface model,
/// using the mesh of the same structure.
fn surface_voxels(
    meshes: &[CiftiMesh],
    model: &BrainModel,
    inverse: &Affine4,
    source: &str,
) -> Result<Array2<f64>> {
    if meshes.is_empty() {
        return Err(CitrixError::InvalidArgument(format!(
            "There are surface models in the {}, but no surface was given as input",
            source
        )));
    }
    let mesh = meshes
        .iter()
        .find(|m| *m.structure() == model.structure)
        .ok_or_else(|| CitrixError::NotFound(format!("surface for {}", model.structure)))?;

    let nverts = mesh.vertices().nrows();
    let indices = model
        .vertex_indices
        .iter()
        .map(|&v| {
            if (v as usize) < nverts {
                Ok(v as usize)
            } else {
                Err(CitrixError::InvalidArgument(format!(
                    "vertex {} out of a surface with {} vertices",
                    v, nverts
                )))
            }
        })
        .collect::<Result<Vec<_>>>()?;
    let vertices = mesh.vertices().select(Axis(0), &indices);
    apply_affine(inverse, vertices.view())
}

/// The grid index of a voxel coordinate, if it lies in the grid.
fn grid_index(ijk: [f64; 3], shape: [usize; 3]) -> Option<(usize, usize, usize)> {
    let mut out = [0usize; 3];
    for ((o, c), s) in out.iter_mut().zip(&ijk).zip(&shape) {
        if *c < 0. || *c >= *s as f64 {
            return None;
        }
        *o = *c as usize;
    }
    Some((out[0], out[1], out[2]))
}

/// The grid index of an integer voxel from a CIFTI voxel list.
fn voxel_index(voxel: &[u64; 3], shape: [usize; 3]) -> Result<(usize, usize, usize)> {
    grid_index(
        [voxel[0] as f64, voxel[1] as f64, voxel[2] as f64],
        shape,
    )
    .ok_or_else(|| {
        CitrixError::InvalidArgument(format!(
            "voxel {:?} out of a volume of shape {:?}",
            voxel, shape
        ))
    })
}
