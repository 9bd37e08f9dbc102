//! Typed CIFTI-2 images: a NIfTI-2 header, the CIFTI document and the
//! data matrix.
use super::header::extract_cifti_header;
use super::model::{BrainModel, CiftiHeader, MatrixIndicesMap, Volume};
use super::structure::Direction;
use crate::error::{CitrixError, Result};
use crate::header::NiftiHeader;
use crate::object::{NiftiObject, ReaderOptions};
use crate::typedef::Intent;
use crate::util::{base_file_name, compound_extension};
use crate::volume::NiftiVolume;
use crate::writer::WriterOptions;
use ndarray::Array2;
use std::path::Path;
use tracing::debug;

/// The CIFTI file types this crate knows how to handle, chosen from the
/// compound file suffix.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum CiftiKind {
    /// `.dconn.nii`: brain models by brain models.
    DenseConnectivity,
    /// `.dtseries.nii`: series by brain models.
    DenseTimeSeries,
    /// `.dscalar.nii`: scalar maps by brain models.
    DenseScalar,
    /// `.dlabel.nii`: label maps by brain models.
    DenseLabels,
    /// `.pconn.nii`: parcels by parcels.
    ParcelConnectivity,
    /// `.ptseries.nii`: series by parcels.
    ParcelTimeSeries,
    /// `.pscalar.nii`: scalar maps by parcels.
    ParcelScalar,
}

impl CiftiKind {
    const ALL: [CiftiKind; 7] = [
        CiftiKind::DenseConnectivity,
        CiftiKind::DenseTimeSeries,
        CiftiKind::DenseScalar,
        CiftiKind::DenseLabels,
        CiftiKind::ParcelConnectivity,
        CiftiKind::ParcelTimeSeries,
        CiftiKind::ParcelScalar,
    ];

    /// The compound extension without dots, such as `"dconn"`.
    pub fn extension(self) -> &'static str {
        match self {
            CiftiKind::DenseConnectivity => "dconn",
            CiftiKind::DenseTimeSeries => "dtseries",
            CiftiKind::DenseScalar => "dscalar",
            CiftiKind::DenseLabels => "dlabel",
            CiftiKind::ParcelConnectivity => "pconn",
            CiftiKind::ParcelTimeSeries => "ptseries",
            CiftiKind::ParcelScalar => "pscalar",
        }
    }

    /// The NIfTI intent code written for this kind.
    pub fn intent(self) -> Intent {
        match self {
            CiftiKind::DenseConnectivity => Intent::ConnectivityDense,
            CiftiKind::DenseTimeSeries => Intent::ConnectivityDenseSeries,
            CiftiKind::DenseScalar => Intent::ConnectivityDenseScalars,
            CiftiKind::DenseLabels => Intent::ConnectivityDenseLabels,
            CiftiKind::ParcelConnectivity => Intent::ConnectivityParcellated,
            CiftiKind::ParcelTimeSeries => Intent::ConnectivityParcellatedSeries,
            CiftiKind::ParcelScalar => Intent::ConnectivityParcellatedScalar,
        }
    }

    /// Guess the kind from a file name such as `sub.dtseries.nii.gz`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<CiftiKind> {
        if !base_file_name(&path).ends_with(".nii") {
            return None;
        }
        let extension = compound_extension(&path)?;
        CiftiKind::ALL
            .iter()
            .copied()
            .find(|k| k.extension() == extension)
    }
}

/// A CIFTI-2 image held in memory. The data is the 2D CIFTI matrix:
/// rows follow dimension 0 (`Direction::Row`), columns dimension 1.
#[derive(Debug, PartialEq, Clone)]
pub struct CiftiImage {
    kind: CiftiKind,
    nifti_header: NiftiHeader,
    cifti_header: CiftiHeader,
    data: Array2<f32>,
}

impl CiftiImage {
    /// Assemble an image with a default NIfTI-2 header.
    pub fn new(kind: CiftiKind, cifti_header: CiftiHeader, data: Array2<f32>) -> Self {
        CiftiImage {
            kind,
            nifti_header: NiftiHeader::default(),
            cifti_header,
            data,
        }
    }

    /// Assemble an image keeping the fields of an existing NIfTI header,
    /// such as the one of an input image.
    pub fn from_parts(
        kind: CiftiKind,
        nifti_header: NiftiHeader,
        cifti_header: CiftiHeader,
        data: Array2<f32>,
    ) -> Self {
        CiftiImage {
            kind,
            nifti_header,
            cifti_header,
            data,
        }
    }

    /// Read a CIFTI file with the default options. The kind is taken from
    /// the file name.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<CiftiImage> {
        CiftiImage::from_file_with_options(path, &ReaderOptions::new())
    }

    /// Read a CIFTI file with the given options.
    pub fn from_file_with_options<P: AsRef<Path>>(
        path: P,
        options: &ReaderOptions,
    ) -> Result<CiftiImage> {
        let kind = CiftiKind::from_path(&path).ok_or_else(|| {
            CitrixError::InvalidArgument(format!(
                "{} is not a known CIFTI file type",
                path.as_ref().display()
            ))
        })?;
        let object = options.read_file(&path)?;
        CiftiImage::from_object(kind, object, options)
    }

    /// Interpret a NIfTI object as a CIFTI image of the given kind.
    pub fn from_object(
        kind: CiftiKind,
        object: NiftiObject,
        options: &ReaderOptions,
    ) -> Result<CiftiImage> {
        let cifti_header = extract_cifti_header(object.extensions())?;
        let (nifti_header, _, volume) = object.into_parts();

        let dims: Vec<usize> = volume.dim().iter().map(|d| *d as usize).collect();
        let (leading, rows, cols) = match dims.len() {
            1 => (1, 1, dims[0]),
            n => (
                dims[..n - 2].iter().product::<usize>(),
                dims[n - 2],
                dims[n - 1],
            ),
        };
        if leading != 1 {
            return Err(CitrixError::MalformedCifti(format!(
                "data of shape {:?} is not a matrix",
                dims
            )));
        }

        let values = volume.to_f64_vec()?;
        // column-major on disk
        let data = Array2::from_shape_fn((rows, cols), |(i, j)| values[i + j * rows] as f32);

        if options.checks_cifti_shape() {
            let size = cifti_header.matrix_size()?;
            if size != [rows, cols] {
                return Err(CitrixError::MalformedCifti(format!(
                    "header describes a {}x{} matrix, data is {}x{}",
                    size[0], size[1], rows, cols
                )));
            }
        }
        debug!("read {:?} of {}x{}", kind, rows, cols);

        Ok(CiftiImage {
            kind,
            nifti_header,
            cifti_header,
            data,
        })
    }

    /// The kind of CIFTI file.
    pub fn kind(&self) -> CiftiKind {
        self.kind
    }

    /// The NIfTI-2 header the image was read with.
    pub fn nifti_header(&self) -> &NiftiHeader {
        &self.nifti_header
    }

    /// The CIFTI document.
    pub fn cifti_header(&self) -> &CiftiHeader {
        &self.cifti_header
    }

    /// The CIFTI matrix.
    pub fn data(&self) -> &Array2<f32> {
        &self.data
    }

    /// Take the CIFTI matrix, discarding the headers.
    pub fn into_data(self) -> Array2<f32> {
        self.data
    }

    /// The map of dimension 0.
    pub fn row(&self) -> Result<&MatrixIndicesMap> {
        self.cifti_header.matrix_indices_map(Direction::Row)
    }

    /// The map of dimension 1.
    pub fn column(&self) -> Result<&MatrixIndicesMap> {
        self.cifti_header.matrix_indices_map(Direction::Column)
    }

    /// All brain models along `direction`.
    pub fn brain_models(&self, direction: Direction) -> Result<&[BrainModel]> {
        Ok(&self.cifti_header.matrix_indices_map(direction)?.brain_models)
    }

    /// The volume along `direction`, if any.
    pub fn volume(&self, direction: Direction) -> Result<Option<&Volume>> {
        self.cifti_header.volume(direction)
    }

    /// Write the image as NIfTI-2, with the CIFTI document as extension
    /// 32 and the intent of the image kind. The matrix is stored in the
    /// fifth and sixth dimensions.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let intent = self.kind.intent();
        let mut header = self.nifti_header.clone();
        header.intent_code = intent as i32;
        header.set_intent_name(intent.cifti_intent_name().unwrap_or(""));

        let (rows, cols) = self.data.dim();
        let data = self.data.as_standard_layout();
        let data = data.view().into_shape((1, 1, 1, 1, rows, cols))?;

        WriterOptions::new(path)
            .reference_header(&header)
            .cifti(&self.cifti_header)
            .write_nifti(&data)
    }
}
