//! Painting dense labels into a NIfTI volume.
use super::{
    check_exist, check_suffix, column_volume, grid_index, load_surfaces, reference_volume,
    surface_voxels, voxel_index,
};
use crate::affine::inverse;
use crate::cifti::{CiftiImage, Direction, ModelType};
use crate::error::{CitrixError, Result};
use crate::header::NiftiVersion;
use ndarray::Array3;
use std::path::Path;
use tracing::{debug, info};

fn check_input<P: AsRef<Path>>(
    infile: &P,
    outfile: &P,
    reference: Option<&P>,
    surfaces: &[P],
) -> Result<()> {
    check_suffix(
        infile,
        ".dlabel.nii",
        "dlabel file should end with 'dlabel.nii' or 'dlabel.nii.gz'",
    )?;
    if let Some(reference) = reference {
        check_suffix(
            reference,
            ".nii",
            "reference_file should end with '.nii' or '.nii.gz'",
        )?;
    }
    check_suffix(
        outfile,
        ".nii",
        "outfile should end with '.nii' or '.nii.gz'",
    )?;
    check_exist(surfaces)
}

/// Turn the first label map of a `.dlabel.nii` file into a labelled
/// NIfTI-2 volume.
///
/// Voxel models are copied to their voxels. Surface models need the
/// matching mesh in `surfaces`: each vertex is mapped into the volume and
/// its label painted over the 2x2x2 block of voxels around it. The grid
/// comes from the dlabel's volume or, when it has none, from `reference`.
pub fn dlabel_to_nifti<P: AsRef<Path>>(
    dlabel: P,
    outfile: P,
    reference: Option<P>,
    surfaces: &[P],
) -> Result<()> {
    check_input(&dlabel, &outfile, reference.as_ref(), surfaces)?;

    let image = CiftiImage::from_file(&dlabel)?;
    if image.data().nrows() == 0 {
        return Err(CitrixError::MalformedCifti("dlabel without label maps".to_string()));
    }
    let labels = image.data().row(0);
    let meshes = load_surfaces(surfaces)?;

    let (shape, affine) = match column_volume(&image)? {
        Some(volume) => volume,
        None => match &reference {
            Some(reference) => reference_volume(reference)?,
            None => {
                return Err(CitrixError::InvalidArgument(
                    "The dlabel has no volume information, and no reference volume was given"
                        .to_string(),
                ))
            }
        },
    };
    let inverse = inverse(&affine)?;
    let label_at = |i: usize| {
        labels
            .get(i)
            .copied()
            .ok_or(CitrixError::IncompatibleLength(i + 1, labels.len()))
    };

    let mut nifti = Array3::<f32>::zeros(shape);
    for model in image.brain_models(Direction::Column)? {
        let offset = model.index_offset as usize;
        match model.model_type {
            ModelType::Surface => {
                let voxels = surface_voxels(&meshes, model, &inverse, "dlabel")?;
                for (o, point) in voxels.outer_iter().enumerate() {
                    let label = label_at(offset + o)?;
                    for &i in &[-1., 0.] {
                        for &j in &[-1., 0.] {
                            for &k in &[-1., 0.] {
                                let ijk = [
                                    (point[0] + i).round(),
                                    (point[1] + j).round(),
                                    (point[2] + k).round(),
                                ];
                                if let Some(index) = grid_index(ijk, shape) {
                                    nifti[index] = label;
                                }
                            }
                        }
                    }
                }
            }
            ModelType::Voxels => {
                for (o, voxel) in model.voxel_indices_ijk.iter().enumerate() {
                    nifti[voxel_index(voxel, shape)?] = label_at(offset + o)?;
                }
            }
        }
        debug!("painted {} ({} indices)", model.structure, model.index_count);
    }

    info!("writing {}", outfile.as_ref().display());
    crate::save(&outfile, &nifti, None, Some(&affine), NiftiVersion::Nifti2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_names() {
        let none: Option<&&str> = None;
        assert!(check_input(&"a.dlabel.nii", &"out.nii.gz", none, &[]).is_ok());
        let err = check_input(&"a.dscalar.nii", &"out.nii", none, &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "dlabel file should end with 'dlabel.nii' or 'dlabel.nii.gz'"
        );
        let err = check_input(&"a.dlabel.nii", &"out.mgz", none, &[]).unwrap_err();
        assert_eq!(err.to_string(), "outfile should end with '.nii' or '.nii.gz'");
        let err = check_input(&"a.dlabel.nii", &"out.nii", Some(&"ref.mgz"), &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "reference_file should end with '.nii' or '.nii.gz'"
        );
    }
}
