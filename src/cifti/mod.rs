//! CIFTI-2 support: the XML document model, queries and set operations
//! over it, and typed images.
//!
//! A CIFTI-2 file is a NIfTI-2 file whose data is a matrix, with an XML
//! document in header extension 32 describing what each row and column
//! of the matrix refers to: surface vertices and voxels grouped into
//! *brain models*, named *parcels*, time points, or named maps.
//!
//! # Example
//!
//! ```no_run
//! use citrix::cifti::{CiftiImage, Direction};
//! # use citrix::Result;
//!
//! # fn run() -> Result<()> {
//! let a = CiftiImage::from_file("sub-01.dconn.nii")?;
//! let b = CiftiImage::from_file("sub-02.dconn.nii")?;
//! let common = a.cifti_header().intersection(b.cifti_header());
//! for model in common.brain_models(Direction::Row, None, None)? {
//!     println!("{} {}", model.structure, model.index_count);
//! }
//! # Ok(())
//! # }
//! ```
pub mod build;
pub mod header;
pub mod image;
pub mod model;
pub mod structure;
pub mod xml;

pub use self::header::{
    create_label_header, extract_cifti_header, pos_in_array, retrieve_common_data,
    soft_colors_label_map,
};
pub use self::image::{CiftiImage, CiftiKind};
pub use self::model::{
    BrainModel, CiftiHeader, Label, Matrix, MatrixIndicesMap, MetaData, ModelIndices, NamedMap,
    Parcel, ParcelVertices, Surface, Volume,
};
pub use self::structure::{BrainStructure, Direction, FeatureType, IndexType, ModelType};
