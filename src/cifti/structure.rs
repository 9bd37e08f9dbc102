//! Enumerations of the CIFTI-2 vocabulary: matrix directions, model
//! types, index types and brain structures.
use crate::error::{CitrixError, Result};
use std::fmt;
use std::str::FromStr;

/// One of the two dimensions of a CIFTI matrix.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Direction {
    /// Dimension 0.
    Row,
    /// Dimension 1.
    Column,
}

impl Direction {
    /// Both directions, in dimension order.
    pub const ALL: [Direction; 2] = [Direction::Row, Direction::Column];

    /// The matrix dimension this direction refers to.
    pub fn dimension(self) -> usize {
        match self {
            Direction::Row => 0,
            Direction::Column => 1,
        }
    }

    /// `"ROW"` or `"COLUMN"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Row => "ROW",
            Direction::Column => "COLUMN",
        }
    }
}

impl FromStr for Direction {
    type Err = CitrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ROW" => Ok(Direction::Row),
            "COLUMN" => Ok(Direction::Column),
            _ => Err(CitrixError::InvalidArgument(
                "direction should be ROW or COLUMN".to_string(),
            )),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a brain model maps matrix indices to the brain.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ModelType {
    /// `CIFTI_MODEL_TYPE_SURFACE`: indices are surface vertices.
    Surface,
    /// `CIFTI_MODEL_TYPE_VOXELS`: indices are voxel triples.
    Voxels,
}

impl ModelType {
    /// The XML attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelType::Surface => "CIFTI_MODEL_TYPE_SURFACE",
            ModelType::Voxels => "CIFTI_MODEL_TYPE_VOXELS",
        }
    }
}

impl FromStr for ModelType {
    type Err = CitrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CIFTI_MODEL_TYPE_SURFACE" => Ok(ModelType::Surface),
            "CIFTI_MODEL_TYPE_VOXELS" => Ok(ModelType::Voxels),
            _ => Err(CitrixError::MalformedCifti(format!("unknown ModelType `{}`", s))),
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of features along one direction, from its brain models.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum FeatureType {
    /// Only surface models.
    Surface,
    /// Only voxel models.
    Voxels,
    /// Both surface and voxel models.
    Mixed,
}

impl FeatureType {
    /// The CIFTI-style name, `CIFTI_MODEL_TYPE_MIXED` for mixed features.
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureType::Surface => ModelType::Surface.as_str(),
            FeatureType::Voxels => ModelType::Voxels.as_str(),
            FeatureType::Mixed => "CIFTI_MODEL_TYPE_MIXED",
        }
    }
}

impl From<ModelType> for FeatureType {
    fn from(model: ModelType) -> Self {
        match model {
            ModelType::Surface => FeatureType::Surface,
            ModelType::Voxels => FeatureType::Voxels,
        }
    }
}

/// What the indices of a matrix dimension map to.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum IndexType {
    /// `CIFTI_INDEX_TYPE_BRAIN_MODELS`
    BrainModels,
    /// `CIFTI_INDEX_TYPE_PARCELS`
    Parcels,
    /// `CIFTI_INDEX_TYPE_SERIES`
    Series,
    /// `CIFTI_INDEX_TYPE_SCALARS`
    Scalars,
    /// `CIFTI_INDEX_TYPE_LABELS`
    Labels,
}

impl IndexType {
    /// The XML attribute value.
    pub fn as_str(self) -> &'static str {
        match self {
            IndexType::BrainModels => "CIFTI_INDEX_TYPE_BRAIN_MODELS",
            IndexType::Parcels => "CIFTI_INDEX_TYPE_PARCELS",
            IndexType::Series => "CIFTI_INDEX_TYPE_SERIES",
            IndexType::Scalars => "CIFTI_INDEX_TYPE_SCALARS",
            IndexType::Labels => "CIFTI_INDEX_TYPE_LABELS",
        }
    }
}

impl FromStr for IndexType {
    type Err = CitrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CIFTI_INDEX_TYPE_BRAIN_MODELS" => Ok(IndexType::BrainModels),
            "CIFTI_INDEX_TYPE_PARCELS" => Ok(IndexType::Parcels),
            "CIFTI_INDEX_TYPE_SERIES" => Ok(IndexType::Series),
            "CIFTI_INDEX_TYPE_SCALARS" => Ok(IndexType::Scalars),
            "CIFTI_INDEX_TYPE_LABELS" => Ok(IndexType::Labels),
            _ => Err(CitrixError::MalformedCifti(format!(
                "unknown IndicesMapToDataType `{}`",
                s
            ))),
        }
    }
}

macro_rules! brain_structures {
    ($($(#[$doc:meta])* $variant:ident => $name:literal,)*) => {
        /// A CIFTI-2 brain structure. Names outside the standard list are
        /// kept verbatim in `Other`.
        #[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
        pub enum BrainStructure {
            $($(#[$doc])* $variant,)*
            /// A structure name not in the CIFTI-2 list.
            Other(String),
        }

        impl BrainStructure {
            /// All standard structures, in alphabetical order.
            pub const STANDARD: &'static [BrainStructure] = &[$(BrainStructure::$variant,)*];

            /// The `CIFTI_STRUCTURE_*` name.
            pub fn as_str(&self) -> &str {
                match self {
                    $(BrainStructure::$variant => $name,)*
                    BrainStructure::Other(name) => name.as_str(),
                }
            }

            /// Parse a structure name. Unknown names become `Other`.
            pub fn from_name(name: &str) -> BrainStructure {
                match name {
                    $($name => BrainStructure::$variant,)*
                    other => BrainStructure::Other(other.to_string()),
                }
            }
        }
    };
}

brain_structures! {
    AccumbensLeft => "CIFTI_STRUCTURE_ACCUMBENS_LEFT",
    AccumbensRight => "CIFTI_STRUCTURE_ACCUMBENS_RIGHT",
    AllWhiteMatter => "CIFTI_STRUCTURE_ALL_WHITE_MATTER",
    AllGreyMatter => "CIFTI_STRUCTURE_ALL_GREY_MATTER",
    AmygdalaLeft => "CIFTI_STRUCTURE_AMYGDALA_LEFT",
    AmygdalaRight => "CIFTI_STRUCTURE_AMYGDALA_RIGHT",
    BrainStem => "CIFTI_STRUCTURE_BRAIN_STEM",
    CaudateLeft => "CIFTI_STRUCTURE_CAUDATE_LEFT",
    CaudateRight => "CIFTI_STRUCTURE_CAUDATE_RIGHT",
    CerebellarWhiteMatterLeft => "CIFTI_STRUCTURE_CEREBELLAR_WHITE_MATTER_LEFT",
    CerebellarWhiteMatterRight => "CIFTI_STRUCTURE_CEREBELLAR_WHITE_MATTER_RIGHT",
    Cerebellum => "CIFTI_STRUCTURE_CEREBELLUM",
    CerebellumLeft => "CIFTI_STRUCTURE_CEREBELLUM_LEFT",
    CerebellumRight => "CIFTI_STRUCTURE_CEREBELLUM_RIGHT",
    CerebralWhiteMatterLeft => "CIFTI_STRUCTURE_CEREBRAL_WHITE_MATTER_LEFT",
    CerebralWhiteMatterRight => "CIFTI_STRUCTURE_CEREBRAL_WHITE_MATTER_RIGHT",
    Cortex => "CIFTI_STRUCTURE_CORTEX",
    /// Left cortical surface.
    CortexLeft => "CIFTI_STRUCTURE_CORTEX_LEFT",
    /// Right cortical surface.
    CortexRight => "CIFTI_STRUCTURE_CORTEX_RIGHT",
    DiencephalonVentralLeft => "CIFTI_STRUCTURE_DIENCEPHALON_VENTRAL_LEFT",
    DiencephalonVentralRight => "CIFTI_STRUCTURE_DIENCEPHALON_VENTRAL_RIGHT",
    HippocampusLeft => "CIFTI_STRUCTURE_HIPPOCAMPUS_LEFT",
    HippocampusRight => "CIFTI_STRUCTURE_HIPPOCAMPUS_RIGHT",
    OtherStructure => "CIFTI_STRUCTURE_OTHER",
    OtherGreyMatter => "CIFTI_STRUCTURE_OTHER_GREY_MATTER",
    OtherWhiteMatter => "CIFTI_STRUCTURE_OTHER_WHITE_MATTER",
    PallidumLeft => "CIFTI_STRUCTURE_PALLIDUM_LEFT",
    PallidumRight => "CIFTI_STRUCTURE_PALLIDUM_RIGHT",
    PutamenLeft => "CIFTI_STRUCTURE_PUTAMEN_LEFT",
    PutamenRight => "CIFTI_STRUCTURE_PUTAMEN_RIGHT",
    ThalamusLeft => "CIFTI_STRUCTURE_THALAMUS_LEFT",
    ThalamusRight => "CIFTI_STRUCTURE_THALAMUS_RIGHT",
}

impl BrainStructure {
    /// Whether this is one of the two cortical surfaces.
    pub fn is_cortex(&self) -> bool {
        matches!(self, BrainStructure::CortexLeft | BrainStructure::CortexRight)
    }
}

impl fmt::Display for BrainStructure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrainStructure {
    type Err = CitrixError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(BrainStructure::from_name(s))
    }
}
