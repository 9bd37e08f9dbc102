//! This module contains multiple types defined by the NIfTI and CIFTI-2
//! standards. Primitive integer codes can be converted to these types
//! through `num_traits::FromPrimitive`, and vice-versa with a cast.

/// Data type for representing a NIFTI value type in a volume.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum NiftiType {
    /// unsigned char.
    // NIFTI_TYPE_UINT8           2
    Uint8 = 2,
    /// signed short.
    // NIFTI_TYPE_INT16           4
    Int16 = 4,
    /// signed int.
    // NIFTI_TYPE_INT32           8
    Int32 = 8,
    /// 32 bit float.
    // NIFTI_TYPE_FLOAT32        16
    Float32 = 16,
    /// 64 bit float = double.
    // NIFTI_TYPE_FLOAT64        64
    Float64 = 64,
    /// signed char.
    // NIFTI_TYPE_INT8          256
    Int8 = 256,
    /// unsigned short.
    // NIFTI_TYPE_UINT16        512
    Uint16 = 512,
    /// unsigned int.
    // NIFTI_TYPE_UINT32        768
    Uint32 = 768,
    /// signed long long.
    // NIFTI_TYPE_INT64        1024
    Int64 = 1024,
    /// unsigned long long.
    // NIFTI_TYPE_UINT64       1280
    Uint64 = 1280,
}

impl NiftiType {
    /// Retrieve the size of an element of this data type, in bytes.
    pub fn size_of(self) -> usize {
        use NiftiType::*;
        match self {
            Int8 | Uint8 => 1,
            Int16 | Uint16 => 2,
            Int32 | Uint32 | Float32 => 4,
            Int64 | Uint64 | Float64 => 8,
        }
    }

    /// The GIFTI name of this type, where one exists.
    pub fn gifti_name(self) -> Option<&'static str> {
        match self {
            NiftiType::Uint8 => Some("NIFTI_TYPE_UINT8"),
            NiftiType::Int32 => Some("NIFTI_TYPE_INT32"),
            NiftiType::Float32 => Some("NIFTI_TYPE_FLOAT32"),
            _ => None,
        }
    }

    /// Parse a GIFTI `DataType` attribute. GIFTI only allows three types.
    pub fn from_gifti_name(name: &str) -> Option<Self> {
        match name {
            "NIFTI_TYPE_UINT8" => Some(NiftiType::Uint8),
            "NIFTI_TYPE_INT32" => Some(NiftiType::Int32),
            "NIFTI_TYPE_FLOAT32" => Some(NiftiType::Float32),
            _ => None,
        }
    }
}

/// An enum type for representing a NIFTI intent code.
///
/// Only the intents which this crate reads or writes are listed: the
/// ones found in GIFTI surfaces and functional files, and the CIFTI-2
/// connectivity intents.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum Intent {
    /// default: no intention is indicated in the header.
    None = 0,
    /// Normal distribution (2 params): p1 = mean, p2 = standard deviation.
    Normal = 11,
    /// Value at each location is an index into some set of labels.
    Label = 1002,
    /// Generic vector.
    Vector = 1007,
    /// Spatial coordinates, such as the vertices of a surface mesh.
    Pointset = 1008,
    /// Triples of indexes into a pointset, forming triangles.
    Triangle = 1009,
    /// Value at each location is from a time series.
    TimeSeries = 2001,
    /// Value at each location is a node index into a complete surface.
    NodeIndex = 2002,
    /// Value at each location is a shape value, such as the curvature.
    Shape = 2005,
    /// CIFTI-2 dense connectivity with unknown layout.
    ConnectivityUnknown = 3000,
    /// `.dconn.nii`
    ConnectivityDense = 3001,
    /// `.dtseries.nii`
    ConnectivityDenseSeries = 3002,
    /// `.pconn.nii`
    ConnectivityParcellated = 3003,
    /// `.ptseries.nii`
    ConnectivityParcellatedSeries = 3004,
    /// `.dtraj.nii`
    ConnectivityDenseTrajectory = 3005,
    /// `.dscalar.nii`
    ConnectivityDenseScalars = 3006,
    /// `.dlabel.nii`
    ConnectivityDenseLabels = 3007,
    /// `.pscalar.nii`
    ConnectivityParcellatedScalar = 3008,
    /// `.pdconn.nii`
    ConnectivityParcellatedDense = 3009,
    /// `.dpconn.nii`
    ConnectivityDenseParcellated = 3010,
    /// `.pconnseries.nii`
    ConnectivityParcellatedParcellatedSeries = 3011,
    /// `.pconnscalar.nii`
    ConnectivityParcellatedParcellatedScalar = 3012,
}

impl Intent {
    /// Check whether this intent is one of the CIFTI-2 connectivity intents.
    pub fn is_cifti(self) -> bool {
        self as i32 >= 3000 && self as i32 <= 3012
    }

    /// The GIFTI `Intent` attribute for this code.
    pub fn gifti_name(self) -> &'static str {
        match self {
            Intent::None => "NIFTI_INTENT_NONE",
            Intent::Normal => "NIFTI_INTENT_NORMAL",
            Intent::Label => "NIFTI_INTENT_LABEL",
            Intent::Vector => "NIFTI_INTENT_VECTOR",
            Intent::Pointset => "NIFTI_INTENT_POINTSET",
            Intent::Triangle => "NIFTI_INTENT_TRIANGLE",
            Intent::TimeSeries => "NIFTI_INTENT_TIME_SERIES",
            Intent::NodeIndex => "NIFTI_INTENT_NODE_INDEX",
            Intent::Shape => "NIFTI_INTENT_SHAPE",
            Intent::ConnectivityUnknown => "NIFTI_INTENT_CONNECTIVITY_UNKNOWN",
            Intent::ConnectivityDense => "NIFTI_INTENT_CONNECTIVITY_DENSE",
            Intent::ConnectivityDenseSeries => "NIFTI_INTENT_CONNECTIVITY_DENSE_SERIES",
            Intent::ConnectivityParcellated => "NIFTI_INTENT_CONNECTIVITY_PARCELLATED",
            Intent::ConnectivityParcellatedSeries => {
                "NIFTI_INTENT_CONNECTIVITY_PARCELLATED_SERIES"
            }
            Intent::ConnectivityDenseTrajectory => "NIFTI_INTENT_CONNECTIVITY_DENSE_TRAJECTORY",
            Intent::ConnectivityDenseScalars => "NIFTI_INTENT_CONNECTIVITY_DENSE_SCALARS",
            Intent::ConnectivityDenseLabels => "NIFTI_INTENT_CONNECTIVITY_DENSE_LABELS",
            Intent::ConnectivityParcellatedScalar => {
                "NIFTI_INTENT_CONNECTIVITY_PARCELLATED_SCALAR"
            }
            Intent::ConnectivityParcellatedDense => "NIFTI_INTENT_CONNECTIVITY_PARCELLATED_DENSE",
            Intent::ConnectivityDenseParcellated => "NIFTI_INTENT_CONNECTIVITY_DENSE_PARCELLATED",
            Intent::ConnectivityParcellatedParcellatedSeries => {
                "NIFTI_INTENT_CONNECTIVITY_PARCELLATED_PARCELLATED_SERIES"
            }
            Intent::ConnectivityParcellatedParcellatedScalar => {
                "NIFTI_INTENT_CONNECTIVITY_PARCELLATED_PARCELLATED_SCALAR"
            }
        }
    }

    /// Parse a GIFTI `Intent` attribute.
    pub fn from_gifti_name(name: &str) -> Option<Self> {
        use Intent::*;
        [
            None,
            Normal,
            Label,
            Vector,
            Pointset,
            Triangle,
            TimeSeries,
            NodeIndex,
            Shape,
        ]
        .iter()
        .copied()
        .find(|intent| intent.gifti_name() == name)
    }

    /// The short `intent_name` written to the NIfTI header by
    /// connectivity tools for CIFTI-2 intents.
    pub fn cifti_intent_name(self) -> Option<&'static str> {
        match self {
            Intent::ConnectivityDense => Some("ConnDense"),
            Intent::ConnectivityDenseSeries => Some("ConnDenseSeries"),
            Intent::ConnectivityParcellated => Some("ConnParcels"),
            Intent::ConnectivityParcellatedSeries => Some("ConnParcelSries"),
            Intent::ConnectivityDenseScalars => Some("ConnDenseScalar"),
            Intent::ConnectivityDenseLabels => Some("ConnDenseLabel"),
            Intent::ConnectivityParcellatedScalar => Some("ConnParcelScalr"),
            Intent::ConnectivityParcellatedDense => Some("ConnParcelDense"),
            Intent::ConnectivityDenseParcellated => Some("ConnDenseParcel"),
            _ => None,
        }
    }
}

/// An enum type for representing a NIFTI XForm.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, FromPrimitive)]
pub enum XForm {
    /// Arbitrary coordinates (Method 1).
    Unknown = 0,
    /// Scanner-based anatomical coordinates
    ScannerAnat = 1,
    /// Coordinates aligned to another file's,
    /// or to anatomical "truth".
    AlignedAnat = 2,
    /// Coordinates aligned to Talairach-Tournoux
    /// Atlas; (0,0,0)=AC, etc.
    Talairach = 3,
    /// MNI 152 normalized coordinates.
    Mni152 = 4,
}
