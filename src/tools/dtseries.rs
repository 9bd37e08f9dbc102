//! Projecting dense time series into a 4D NIfTI volume.
use super::{
    check_exist, check_suffix, column_volume, grid_index, load_surfaces, surface_voxels,
    voxel_index,
};
use crate::affine::inverse;
use crate::cifti::{CiftiImage, Direction, ModelType};
use crate::error::{CitrixError, Result};
use crate::header::NiftiVersion;
use ndarray::{s, Array4};
use std::path::Path;
use tracing::{debug, info, warn};

fn check_input<P: AsRef<Path>>(infile: &P, outfile: &P, surfaces: &[P]) -> Result<()> {
    check_suffix(
        infile,
        ".dtseries.nii",
        "dtseries file should end with 'dtseries.nii' or 'dtseries.nii.gz'",
    )?;
    check_suffix(
        outfile,
        ".nii",
        "outfile should end with '.nii' or '.nii.gz'",
    )?;
    check_exist(surfaces)
}

/// Write the time series of a `.dtseries.nii` file as a 4D NIfTI-2
/// volume `(x, y, z, t)` on the grid of its volume. Surface vertices
/// land in the voxel containing them.
pub fn dtseries_to_nifti<P: AsRef<Path>>(dtseries: P, outfile: P, surfaces: &[P]) -> Result<()> {
    check_input(&dtseries, &outfile, surfaces)?;

    let image = CiftiImage::from_file(&dtseries)?;
    let meshes = load_surfaces(surfaces)?;
    let (shape, affine) = column_volume(&image)?.ok_or_else(|| {
        CitrixError::InvalidArgument("The dtseries has no volume information".to_string())
    })?;
    let inverse = inverse(&affine)?;

    let series = image.data();
    let (timepoints, columns) = series.dim();
    let mut nifti = Array4::<f32>::zeros((shape[0], shape[1], shape[2], timepoints));

    for model in image.brain_models(Direction::Column)? {
        let offset = model.index_offset as usize;
        let count = model.index_count as usize;
        if offset + count > columns {
            return Err(CitrixError::IncompatibleLength(offset + count, columns));
        }

        let voxels = match model.model_type {
            ModelType::Surface => {
                let points = surface_voxels(&meshes, model, &inverse, "dtseries")?;
                points
                    .outer_iter()
                    .map(|p| grid_index([p[0].floor(), p[1].floor(), p[2].floor()], shape))
                    .collect::<Vec<_>>()
            }
            ModelType::Voxels => model
                .voxel_indices_ijk
                .iter()
                .map(|v| voxel_index(v, shape).map(Some))
                .collect::<Result<Vec<_>>>()?,
        };

        if voxels.len() != count {
            return Err(CitrixError::IncompatibleLength(voxels.len(), count));
        }

        let mut outside = 0;
        for (o, voxel) in voxels.into_iter().enumerate() {
            match voxel {
                Some((x, y, z)) => nifti
                    .slice_mut(s![x, y, z, ..])
                    .assign(&series.column(offset + o)),
                None => outside += 1,
            }
        }
        if outside > 0 {
            warn!("{} vertices of {} fall outside the volume", outside, model.structure);
        }
        debug!("projected {} ({} indices)", model.structure, count);
    }

    info!("writing {}", outfile.as_ref().display());
    crate::save(&outfile, &nifti, None, Some(&affine), NiftiVersion::Nifti2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_names() {
        assert!(check_input(&"a.dtseries.nii.gz", &"out.nii", &[]).is_ok());
        let err = check_input(&"a.dconn.nii", &"out.nii", &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "dtseries file should end with 'dtseries.nii' or 'dtseries.nii.gz'"
        );
        assert!(check_input(&"a.dtseries.nii", &"out.nii", &["missing.surf.gii"]).is_err());
    }
}
