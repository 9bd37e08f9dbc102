//! Averaging of CIFTI matrices over subjects.
use super::logodds::{from_logodds, to_logodds};
use crate::cifti::{extract_cifti_header, retrieve_common_data, CiftiHeader, CiftiImage};
use crate::error::{CitrixError, Result};
use crate::object::ReaderOptions;
use crate::util::compound_extension;
use ndarray::Array2;
use std::path::Path;
use tracing::{debug, info};

fn check_input<P: AsRef<Path>, Q: AsRef<Path>>(files: &[P], outfile: Q) -> Result<()> {
    let first = files
        .first()
        .ok_or_else(|| CitrixError::InvalidArgument("No input files were given".to_string()))?;
    let conn_type = compound_extension(first);

    if !files.iter().all(|f| compound_extension(f) == conn_type) {
        return Err(CitrixError::InvalidArgument(
            "All the input files MUST be of the same type".to_string(),
        ));
    }
    if compound_extension(outfile) != conn_type {
        return Err(CitrixError::InvalidArgument(
            "The output file MUST be of the same type as inputs".to_string(),
        ));
    }
    Ok(())
}

/// The header describing what all `files` have in common.
fn common_header<P: AsRef<Path>>(files: &[P]) -> Result<CiftiHeader> {
    let options = ReaderOptions::new();
    let mut common: Option<CiftiHeader> = None;
    for file in files {
        let (_, extensions) = options.read_header_file(file)?;
        let header = extract_cifti_header(&extensions)?;
        common = Some(match common {
            Some(c) => c.intersection(&header),
            None => header,
        });
    }
    common.ok_or_else(|| CitrixError::InvalidArgument("No input files were given".to_string()))
}

/// Average CIFTI matrices of the same type over the structures and
/// indices they all share, and save the result to `outfile`. With
/// `in_logodds`, the average is taken in log-odds space.
pub fn cifti_average<P, Q>(files: &[P], outfile: Q, in_logodds: bool) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    check_input(files, &outfile)?;

    let common = common_header(files)?;
    let [rows, cols] = common.matrix_size()?;
    info!("averaging {} matrices over a {}x{} common matrix", files.len(), rows, cols);

    let mut average = Array2::<f32>::zeros((rows, cols));
    let mut reference = None;
    for file in files {
        debug!("adding {}", file.as_ref().display());
        let image = CiftiImage::from_file(file)?;
        let subject = retrieve_common_data(&common, image.cifti_header(), image.data().view())?;
        if in_logodds {
            average += &to_logodds(&subject);
        } else {
            average += &subject;
        }
        if reference.is_none() {
            reference = Some((image.kind(), image.nifti_header().clone()));
        }
    }

    average /= files.len() as f32;
    if in_logodds {
        average = from_logodds(&average);
    }

    let (kind, nifti_header) = reference
        .ok_or_else(|| CitrixError::InvalidArgument("No input files were given".to_string()))?;
    CiftiImage::from_parts(kind, nifti_header, common, average).save(outfile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_types_must_agree() {
        assert!(check_input(&["a.dconn.nii", "b.dconn.nii"], "avg.dconn.nii").is_ok());
        let err = check_input(&["a.dconn.nii", "b.dtseries.nii"], "avg.dconn.nii").unwrap_err();
        assert_eq!(err.to_string(), "All the input files MUST be of the same type");
        let err = check_input(&["a.dconn.nii"], "avg.dtseries.nii").unwrap_err();
        assert_eq!(
            err.to_string(),
            "The output file MUST be of the same type as inputs"
        );
        assert!(check_input::<&str, _>(&[], "avg.dconn.nii").is_err());
    }
}
