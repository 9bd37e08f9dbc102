//! Convenience layer for CIFTI-2 and GIFTI neuroimaging files.
//!
//! CIFTI-2 files are NIfTI-2 files holding a matrix, whose rows and
//! columns are described by an XML document in header extension 32. This
//! crate reads and writes those files, gives typed access to the XML
//! (brain models, parcels, label tables, volumes), and implements the
//! header algebra needed to combine files from different subjects:
//! intersecting headers, locating indices and reprojecting data onto a
//! common header.
//!
//! GIFTI surfaces and function files are supported as well, along with
//! the neighbourhood constraints of surface meshes and voxel sets.
//!
//! # Example
//!
//! ```no_run
//! use citrix::{load, Image};
//! # use citrix::Result;
//!
//! # fn run() -> Result<()> {
//! match load("sub-01.dtseries.nii")? {
//!     Image::Cifti(cifti) => println!("{:?}", cifti.data().dim()),
//!     Image::Surface(mesh) => println!("{} vertices", mesh.vertices().nrows()),
//!     _ => {}
//! }
//! # Ok(())
//! # }
//! ```
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts, unused_results)]

#[macro_use]
extern crate quick_error;
#[macro_use]
extern crate num_derive;

pub mod affine;
pub mod cifti;
pub mod error;
pub mod extension;
pub mod gifti;
pub mod header;
pub mod object;
pub mod surface;
pub mod tools;
pub mod typedef;
mod util;
pub mod volume;
pub mod writer;
mod xmltree;

pub use crate::affine::Affine4;
pub use crate::cifti::{CiftiHeader, CiftiImage, CiftiKind, Direction};
pub use crate::error::{CitrixError, Result};
pub use crate::extension::{Extension, ExtensionSequence, NIFTI_ECODE_CIFTI};
pub use crate::gifti::{GiftiFunction, GiftiImage};
pub use crate::header::{NiftiHeader, NiftiVersion};
pub use crate::object::{NiftiObject, ReaderOptions};
pub use crate::surface::CiftiMesh;
pub use crate::typedef::{Intent, NiftiType};
pub use crate::volume::{DataElement, InMemVolume, NiftiVolume};
pub use crate::writer::WriterOptions;
pub use byteordered::Endianness;

use crate::util::has_suffix;
use ndarray::{ArrayBase, Data, Dimension};
use std::path::Path;
use tracing::warn;

/// Any file `load` knows how to open.
#[derive(Debug, Clone)]
pub enum Image {
    /// A NIfTI-2 file with a CIFTI-2 extension and a known compound
    /// suffix.
    Cifti(CiftiImage),
    /// A GIFTI file of a type without a dedicated view.
    Gifti(GiftiImage),
    /// A `.func.gii` file.
    GiftiFunction(GiftiFunction),
    /// A `.surf.gii` file.
    Surface(CiftiMesh),
    /// Any other NIfTI file.
    Nifti(NiftiObject),
}

/// Open a NIfTI, CIFTI or GIFTI file, choosing the representation from
/// the file name and, for NIfTI files, from the presence of a CIFTI
/// extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Image> {
    let path = path.as_ref();
    if has_suffix(path, ".gii") {
        return if has_suffix(path, ".surf.gii") {
            Ok(Image::Surface(CiftiMesh::load(path)?))
        } else if has_suffix(path, ".func.gii") {
            Ok(Image::GiftiFunction(GiftiFunction::from_file(path)?))
        } else {
            warn!("unknown GIFTI file type {}, loading as a plain GIFTI", path.display());
            Ok(Image::Gifti(GiftiImage::from_file(path)?))
        };
    }

    if has_suffix(path, ".nii") {
        let options = ReaderOptions::new();
        let object = options.read_file(path)?;
        if !object.is_cifti() {
            return Ok(Image::Nifti(object));
        }
        return match CiftiKind::from_path(path) {
            Some(kind) => Ok(Image::Cifti(CiftiImage::from_object(kind, object, &options)?)),
            None => {
                warn!(
                    "unknown CIFTI file type {}, loading as a plain NIfTI",
                    path.display()
                );
                Ok(Image::Nifti(object))
            }
        };
    }

    Err(CitrixError::InvalidArgument(
        "We can only load NIFTI (nii) or GIFTI (gii) files".to_string(),
    ))
}

/// Check whether the NIfTI file at `path` carries a CIFTI extension.
/// Only the header and extensions are read.
pub fn is_cifti<P: AsRef<Path>>(path: P) -> Result<bool> {
    let (_, extensions) = ReaderOptions::new().read_header_file(path)?;
    Ok(extensions.find(NIFTI_ECODE_CIFTI).is_some())
}

/// Write `data` as a NIfTI-1 or NIfTI-2 file, optionally based on an
/// existing header and with the given voxel-to-world transform.
pub fn save<P, A, S, D>(
    path: P,
    data: &ArrayBase<S, D>,
    header: Option<&NiftiHeader>,
    affine: Option<&Affine4>,
    version: NiftiVersion,
) -> Result<()>
where
    P: AsRef<Path>,
    S: Data<Elem = A>,
    A: DataElement,
    D: Dimension,
{
    let mut options = WriterOptions::new(path).version(version);
    if let Some(header) = header {
        options = options.reference_header(header);
    }
    if let Some(affine) = affine {
        options = options.affine(affine);
    }
    options.write_nifti(data)
}
