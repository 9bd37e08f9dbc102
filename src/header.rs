//! This module defines the `NiftiHeader` struct, which is used
//! to provide important information about NIfTI-1 and NIfTI-2 volumes.
//!
//! Both versions are read into the same structure. Field types follow
//! NIfTI-2, the wider of the two, so that no information is lost when a
//! NIfTI-1 header is read. CIFTI-2 files are always NIfTI-2.

use crate::affine::{quaternion_to_affine, shape_zoom_affine, Affine4};
use crate::error::{CitrixError, Result};
use crate::typedef::{Intent, NiftiType, XForm};
use crate::util::is_gz_file;
use byteordered::{ByteOrdered, Endianness};
use flate2::bufread::GzDecoder;
use nalgebra::{Quaternion, Vector3};
use num_traits::FromPrimitive;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::ops::Deref;
use std::path::Path;

/// Magic code for full NIFTI-1 files (extention ".nii[.gz]").
pub const MAGIC_CODE_NIP1: &[u8; 4] = b"n+1\0";
/// Magic code for full NIFTI-2 files.
pub const MAGIC_CODE_NIP2: &[u8; 8] = b"n+2\0\r\n\x1a\n";

/// The two versions of the NIfTI header layout.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NiftiVersion {
    /// 348-byte header with 16-bit dimensions.
    Nifti1,
    /// 540-byte header with 64-bit dimensions.
    Nifti2,
}

impl NiftiVersion {
    /// Size of the header in bytes, the `sizeof_hdr` field.
    pub fn header_size(self) -> usize {
        match self {
            NiftiVersion::Nifti1 => 348,
            NiftiVersion::Nifti2 => 540,
        }
    }

    /// Offset of the first byte after the header and the extender code.
    pub fn min_vox_offset(self) -> usize {
        self.header_size() + 4
    }

    /// Interpret the integer form used by the writer options and the CLI.
    pub fn from_number(version: u8) -> Result<Self> {
        match version {
            1 => Ok(NiftiVersion::Nifti1),
            2 => Ok(NiftiVersion::Nifti2),
            v => Err(CitrixError::InvalidArgument(format!(
                "NIfTI version must be 1 or 2, got {}",
                v
            ))),
        }
    }
}

/// The NIfTI header data type.
/// All fields are public and named after the standard's header file.
/// Fields which only exist in NIfTI-1 for ANALYZE compatibility are
/// dropped on read and zero-filled on write.
///
/// # Examples
///
/// ```no_run
/// use citrix::NiftiHeader;
/// # use citrix::Result;
///
/// # fn run() -> Result<()> {
/// let hdr = NiftiHeader::from_file("subject.dconn.nii")?;
/// println!("{:?}", hdr.dim());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NiftiHeader {
    /// Header layout version
    pub version: NiftiVersion,
    /// MRI slice ordering
    pub dim_info: u8,
    /// Data array dimensions
    pub dim: [u64; 8],
    /// 1st intent parameter
    pub intent_p1: f64,
    /// 2nd intent parameter
    pub intent_p2: f64,
    /// 3rd intent parameter
    pub intent_p3: f64,
    /// NIFTI_INTENT_* code
    pub intent_code: i32,
    /// Defines the data type!
    pub datatype: i16,
    /// Number of bits per voxel
    pub bitpix: i16,
    /// First slice index
    pub slice_start: i64,
    /// Grid spacings
    pub pixdim: [f64; 8],
    /// Offset into .nii file to reach the volume
    pub vox_offset: u64,
    /// Data scaling: slope
    pub scl_slope: f64,
    /// Data scaling: offset
    pub scl_inter: f64,
    /// Last slice index
    pub slice_end: i64,
    /// Slice timing order
    pub slice_code: i32,
    /// Units of pixdim[1..4]
    pub xyzt_units: i32,
    /// Max display intensity
    pub cal_max: f64,
    /// Min display intensity
    pub cal_min: f64,
    /// Time for 1 slice
    pub slice_duration: f64,
    /// Time axis shift
    pub toffset: f64,
    /// Any text you like
    pub descrip: Vec<u8>,
    /// Auxiliary filename
    pub aux_file: [u8; 24],
    /// NIFTI_XFORM_* code
    pub qform_code: i32,
    /// NIFTI_XFORM_* code
    pub sform_code: i32,
    /// Quaternion b param
    pub quatern_b: f64,
    /// Quaternion c param
    pub quatern_c: f64,
    /// Quaternion d param
    pub quatern_d: f64,
    /// Quaternion x shift
    pub quatern_x: f64,
    /// Quaternion y shift
    pub quatern_y: f64,
    /// Quaternion z shift
    pub quatern_z: f64,
    /// 1st row affine transform
    pub srow_x: [f64; 4],
    /// 2nd row affine transform
    pub srow_y: [f64; 4],
    /// 3rd row affine transform
    pub srow_z: [f64; 4],
    /// 'name' or meaning of data
    pub intent_name: [u8; 16],
    /// Original data Endianness
    pub endianness: Endianness,
}

impl Default for NiftiHeader {
    fn default() -> NiftiHeader {
        NiftiHeader {
            version: NiftiVersion::Nifti2,
            dim_info: 0,
            dim: [1, 0, 0, 0, 0, 0, 0, 0],
            intent_p1: 0.,
            intent_p2: 0.,
            intent_p3: 0.,
            intent_code: 0,
            datatype: 0,
            bitpix: 0,
            slice_start: 0,
            pixdim: [1.; 8],
            vox_offset: 544,
            scl_slope: 1.,
            scl_inter: 0.,
            slice_end: 0,
            slice_code: 0,
            xyzt_units: 0,
            cal_max: 0.,
            cal_min: 0.,
            slice_duration: 0.,
            toffset: 0.,
            descrip: vec![0; 80],
            aux_file: [0; 24],
            qform_code: 0,
            sform_code: 0,
            quatern_b: 0.,
            quatern_c: 0.,
            quatern_d: 0.,
            quatern_x: 0.,
            quatern_y: 0.,
            quatern_z: 0.,
            srow_x: [0.; 4],
            srow_y: [0.; 4],
            srow_z: [0.; 4],
            intent_name: [0; 16],
            endianness: Endianness::Little,
        }
    }
}

impl NiftiHeader {
    /// Retrieve a NIfTI header, along with its byte order, from a file in the file system.
    /// If the file's name ends with ".gz", the file is assumed to need GZip decoding.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<NiftiHeader> {
        let gz = is_gz_file(&path);
        let file = BufReader::new(File::open(path)?);
        if gz {
            NiftiHeader::from_reader(GzDecoder::new(file))
        } else {
            NiftiHeader::from_reader(file)
        }
    }

    /// Read a NIfTI-1 or NIfTI-2 header, along with its byte order, from
    /// the given byte source. It is assumed that the input is currently at
    /// the start of the NIFTI header.
    pub fn from_reader<S: Read>(mut input: S) -> Result<NiftiHeader> {
        let mut sizeof_hdr = [0u8; 4];
        input.read_exact(&mut sizeof_hdr)?;
        let (version, endianness) = detect_layout(sizeof_hdr)?;
        let input = ByteOrdered::runtime(input, endianness);
        let mut h = match version {
            NiftiVersion::Nifti1 => parse_header_1(input)?,
            NiftiVersion::Nifti2 => parse_header_2(input)?,
        };
        h.endianness = endianness;
        Ok(h)
    }

    /// Write this header in its own version and byte order.
    pub fn write_to<W: Write>(&self, output: W) -> Result<()> {
        let output = ByteOrdered::runtime(output, self.endianness);
        match self.version {
            NiftiVersion::Nifti1 => write_header_1(output, self),
            NiftiVersion::Nifti2 => write_header_2(output, self),
        }
    }

    /// The effective dimensions, without `dim[0]` and clipped to it.
    pub fn dim(&self) -> Result<&[u64]> {
        let ndim = self.dim[0] as usize;
        if ndim == 0 || ndim > 7 {
            return Err(CitrixError::InvalidFormat);
        }
        Ok(&self.dim[1..=ndim])
    }

    /// Set the effective dimensions, updating `dim[0]`.
    pub fn set_dim(&mut self, shape: &[usize]) -> Result<()> {
        if shape.is_empty() || shape.len() > 7 {
            return Err(CitrixError::InvalidArgument(format!(
                "a NIfTI volume has 1 to 7 dimensions, got {}",
                shape.len()
            )));
        }
        self.dim = [1; 8];
        self.dim[0] = shape.len() as u64;
        for (d, s) in self.dim[1..].iter_mut().zip(shape) {
            *d = *s as u64;
        }
        Ok(())
    }

    /// Get the data type as a validated enum.
    pub fn data_type(&self) -> Result<NiftiType> {
        FromPrimitive::from_i16(self.datatype)
            .ok_or_else(|| CitrixError::InvalidCode("datatype", self.datatype as i32))
    }

    /// Get the intent as a validated enum.
    pub fn intent(&self) -> Result<Intent> {
        FromPrimitive::from_i32(self.intent_code)
            .ok_or(CitrixError::InvalidCode("intent", self.intent_code))
    }

    /// Get the qform coordinate mapping method as a validated enum.
    pub fn qform(&self) -> Result<XForm> {
        FromPrimitive::from_i32(self.qform_code)
            .ok_or(CitrixError::InvalidCode("qform", self.qform_code))
    }

    /// Get the sform coordinate mapping method as a validated enum.
    pub fn sform(&self) -> Result<XForm> {
        FromPrimitive::from_i32(self.sform_code)
            .ok_or(CitrixError::InvalidCode("sform", self.sform_code))
    }

    /// Get the best voxel-to-world affine available: the sform if
    /// set, otherwise the qform, otherwise one implied by the grid
    /// spacings and the volume shape.
    pub fn affine(&self) -> Affine4 {
        if self.sform_code > 0 {
            return Affine4::new(
                self.srow_x[0], self.srow_x[1], self.srow_x[2], self.srow_x[3],
                self.srow_y[0], self.srow_y[1], self.srow_y[2], self.srow_y[3],
                self.srow_z[0], self.srow_z[1], self.srow_z[2], self.srow_z[3],
                0.0, 0.0, 0.0, 1.0,
            );
        }
        if self.qform_code > 0 {
            let b = self.quatern_b;
            let c = self.quatern_c;
            let d = self.quatern_d;
            let a = (1.0 - (b * b + c * c + d * d)).max(0.0).sqrt();
            let rotation = quaternion_to_affine(Quaternion::new(a, b, c, d));
            let qfac = if self.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
            let zooms = Vector3::new(self.pixdim[1], self.pixdim[2], self.pixdim[3] * qfac);
            let mut affine = Affine4::identity();
            for r in 0..3 {
                for c in 0..3 {
                    affine[(r, c)] = rotation[(r, c)] * zooms[c];
                }
            }
            affine[(0, 3)] = self.quatern_x;
            affine[(1, 3)] = self.quatern_y;
            affine[(2, 3)] = self.quatern_z;
            return affine;
        }
        let shape = [self.dim[1], self.dim[2], self.dim[3]];
        shape_zoom_affine(&shape, &self.pixdim[1..4])
    }

    /// Store the given affine in the sform rows, marking it as aligned
    /// to anatomical coordinates.
    pub fn set_affine(&mut self, affine: &Affine4) {
        for c in 0..4 {
            self.srow_x[c] = affine[(0, c)];
            self.srow_y[c] = affine[(1, c)];
            self.srow_z[c] = affine[(2, c)];
        }
        self.sform_code = XForm::AlignedAnat as i32;
        for (i, p) in self.pixdim[1..4].iter_mut().enumerate() {
            let column = affine.fixed_view::<3, 1>(0, i);
            *p = column.norm();
        }
    }

    /// Safely set the `descrip` field using a buffer.
    pub fn set_description<D>(&mut self, description: D) -> Result<()>
    where
        D: Into<Vec<u8>>,
        D: Deref<Target = [u8]>,
    {
        let len = description.len();
        if len < 80 {
            let mut descrip = vec![0; 80];
            descrip[..len].copy_from_slice(&description);
            self.descrip = descrip;
            Ok(())
        } else if len == 80 {
            self.descrip = description.into();
            Ok(())
        } else {
            Err(CitrixError::IncorrectDescriptionLength(len))
        }
    }

    /// Safely set the `descrip` field using a  &str.
    pub fn set_description_str<T>(&mut self, description: T) -> Result<()>
    where
        T: Into<String>,
    {
        self.set_description(description.into().as_bytes())
    }

    /// Safely set the `intent_name` field, truncating to 16 bytes.
    pub fn set_intent_name(&mut self, name: &str) {
        self.intent_name = [0; 16];
        let bytes = name.as_bytes();
        let len = bytes.len().min(16);
        self.intent_name[..len].copy_from_slice(&bytes[..len]);
    }
}

fn detect_layout(sizeof_hdr: [u8; 4]) -> Result<(NiftiVersion, Endianness)> {
    let le = i32::from_le_bytes(sizeof_hdr);
    let be = i32::from_be_bytes(sizeof_hdr);
    match (le, be) {
        (348, _) => Ok((NiftiVersion::Nifti1, Endianness::Little)),
        (_, 348) => Ok((NiftiVersion::Nifti1, Endianness::Big)),
        (540, _) => Ok((NiftiVersion::Nifti2, Endianness::Little)),
        (_, 540) => Ok((NiftiVersion::Nifti2, Endianness::Big)),
        _ => Err(CitrixError::InvalidFormat),
    }
}

/// Remainder of a NIfTI-1 header, after `sizeof_hdr`.
fn parse_header_1<S: Read>(mut input: ByteOrdered<S, Endianness>) -> Result<NiftiHeader> {
    let mut h = NiftiHeader {
        version: NiftiVersion::Nifti1,
        ..NiftiHeader::default()
    };

    // data_type, db_name, extents, session_error, regular
    let mut unused = [0u8; 35];
    input.read_exact(&mut unused)?;
    h.dim_info = input.read_u8()?;
    for v in &mut h.dim {
        *v = input.read_i16()?.max(0) as u64;
    }
    h.intent_p1 = input.read_f32()? as f64;
    h.intent_p2 = input.read_f32()? as f64;
    h.intent_p3 = input.read_f32()? as f64;
    h.intent_code = input.read_i16()? as i32;
    h.datatype = input.read_i16()?;
    h.bitpix = input.read_i16()?;
    h.slice_start = input.read_i16()? as i64;
    for v in &mut h.pixdim {
        *v = input.read_f32()? as f64;
    }
    h.vox_offset = input.read_f32()?.max(0.) as u64;
    h.scl_slope = input.read_f32()? as f64;
    h.scl_inter = input.read_f32()? as f64;
    h.slice_end = input.read_i16()? as i64;
    h.slice_code = input.read_u8()? as i32;
    h.xyzt_units = input.read_u8()? as i32;
    h.cal_max = input.read_f32()? as f64;
    h.cal_min = input.read_f32()? as f64;
    h.slice_duration = input.read_f32()? as f64;
    h.toffset = input.read_f32()? as f64;
    // glmax, glmin
    let _ = input.read_i32()?;
    let _ = input.read_i32()?;
    input.read_exact(h.descrip.as_mut_slice())?;
    input.read_exact(&mut h.aux_file)?;
    h.qform_code = input.read_i16()? as i32;
    h.sform_code = input.read_i16()? as i32;
    h.quatern_b = input.read_f32()? as f64;
    h.quatern_c = input.read_f32()? as f64;
    h.quatern_d = input.read_f32()? as f64;
    h.quatern_x = input.read_f32()? as f64;
    h.quatern_y = input.read_f32()? as f64;
    h.quatern_z = input.read_f32()? as f64;
    for row in [&mut h.srow_x, &mut h.srow_y, &mut h.srow_z].iter_mut() {
        for v in row.iter_mut() {
            *v = input.read_f32()? as f64;
        }
    }
    input.read_exact(&mut h.intent_name)?;
    let mut magic = [0u8; 4];
    input.read_exact(&mut magic)?;

    // header/image pairs are not supported
    if &magic != MAGIC_CODE_NIP1 {
        return Err(CitrixError::InvalidFormat);
    }
    Ok(h)
}

/// Remainder of a NIfTI-2 header, after `sizeof_hdr`.
fn parse_header_2<S: Read>(mut input: ByteOrdered<S, Endianness>) -> Result<NiftiHeader> {
    let mut h = NiftiHeader {
        version: NiftiVersion::Nifti2,
        ..NiftiHeader::default()
    };

    let mut magic = [0u8; 8];
    input.read_exact(&mut magic)?;
    if &magic != MAGIC_CODE_NIP2 {
        return Err(CitrixError::InvalidFormat);
    }
    h.datatype = input.read_i16()?;
    h.bitpix = input.read_i16()?;
    for v in &mut h.dim {
        *v = input.read_i64()?.max(0) as u64;
    }
    h.intent_p1 = input.read_f64()?;
    h.intent_p2 = input.read_f64()?;
    h.intent_p3 = input.read_f64()?;
    for v in &mut h.pixdim {
        *v = input.read_f64()?;
    }
    h.vox_offset = input.read_i64()?.max(0) as u64;
    h.scl_slope = input.read_f64()?;
    h.scl_inter = input.read_f64()?;
    h.cal_max = input.read_f64()?;
    h.cal_min = input.read_f64()?;
    h.slice_duration = input.read_f64()?;
    h.toffset = input.read_f64()?;
    h.slice_start = input.read_i64()?;
    h.slice_end = input.read_i64()?;
    input.read_exact(h.descrip.as_mut_slice())?;
    input.read_exact(&mut h.aux_file)?;
    h.qform_code = input.read_i32()?;
    h.sform_code = input.read_i32()?;
    h.quatern_b = input.read_f64()?;
    h.quatern_c = input.read_f64()?;
    h.quatern_d = input.read_f64()?;
    h.quatern_x = input.read_f64()?;
    h.quatern_y = input.read_f64()?;
    h.quatern_z = input.read_f64()?;
    for row in [&mut h.srow_x, &mut h.srow_y, &mut h.srow_z].iter_mut() {
        for v in row.iter_mut() {
            *v = input.read_f64()?;
        }
    }
    h.slice_code = input.read_i32()?;
    h.xyzt_units = input.read_i32()?;
    h.intent_code = input.read_i32()?;
    input.read_exact(&mut h.intent_name)?;
    h.dim_info = input.read_u8()?;
    let mut unused_str = [0u8; 15];
    input.read_exact(&mut unused_str)?;
    Ok(h)
}

fn write_header_1<W: Write>(mut out: ByteOrdered<W, Endianness>, h: &NiftiHeader) -> Result<()> {
    for d in &h.dim {
        if *d > i16::MAX as u64 {
            return Err(CitrixError::InvalidArgument(format!(
                "dimension {} does not fit in a NIfTI-1 header",
                d
            )));
        }
    }
    out.write_i32(348)?;
    out.write_all(&[0u8; 35])?;
    out.write_u8(h.dim_info)?;
    for d in &h.dim {
        out.write_i16(*d as i16)?;
    }
    out.write_f32(h.intent_p1 as f32)?;
    out.write_f32(h.intent_p2 as f32)?;
    out.write_f32(h.intent_p3 as f32)?;
    out.write_i16(h.intent_code as i16)?;
    out.write_i16(h.datatype)?;
    out.write_i16(h.bitpix)?;
    out.write_i16(h.slice_start as i16)?;
    for p in &h.pixdim {
        out.write_f32(*p as f32)?;
    }
    out.write_f32(h.vox_offset as f32)?;
    out.write_f32(h.scl_slope as f32)?;
    out.write_f32(h.scl_inter as f32)?;
    out.write_i16(h.slice_end as i16)?;
    out.write_u8(h.slice_code as u8)?;
    out.write_u8(h.xyzt_units as u8)?;
    out.write_f32(h.cal_max as f32)?;
    out.write_f32(h.cal_min as f32)?;
    out.write_f32(h.slice_duration as f32)?;
    out.write_f32(h.toffset as f32)?;
    out.write_i32(0)?;
    out.write_i32(0)?;
    out.write_all(&h.descrip)?;
    out.write_all(&h.aux_file)?;
    out.write_i16(h.qform_code as i16)?;
    out.write_i16(h.sform_code as i16)?;
    for f in &[
        h.quatern_b, h.quatern_c, h.quatern_d, h.quatern_x, h.quatern_y, h.quatern_z,
    ] {
        out.write_f32(*f as f32)?;
    }
    for f in h.srow_x.iter().chain(&h.srow_y).chain(&h.srow_z) {
        out.write_f32(*f as f32)?;
    }
    out.write_all(&h.intent_name)?;
    out.write_all(MAGIC_CODE_NIP1)?;
    Ok(())
}

fn write_header_2<W: Write>(mut out: ByteOrdered<W, Endianness>, h: &NiftiHeader) -> Result<()> {
    out.write_i32(540)?;
    out.write_all(MAGIC_CODE_NIP2)?;
    out.write_i16(h.datatype)?;
    out.write_i16(h.bitpix)?;
    for d in &h.dim {
        out.write_i64(*d as i64)?;
    }
    out.write_f64(h.intent_p1)?;
    out.write_f64(h.intent_p2)?;
    out.write_f64(h.intent_p3)?;
    for p in &h.pixdim {
        out.write_f64(*p)?;
    }
    out.write_i64(h.vox_offset as i64)?;
    out.write_f64(h.scl_slope)?;
    out.write_f64(h.scl_inter)?;
    out.write_f64(h.cal_max)?;
    out.write_f64(h.cal_min)?;
    out.write_f64(h.slice_duration)?;
    out.write_f64(h.toffset)?;
    out.write_i64(h.slice_start)?;
    out.write_i64(h.slice_end)?;
    out.write_all(&h.descrip)?;
    out.write_all(&h.aux_file)?;
    out.write_i32(h.qform_code)?;
    out.write_i32(h.sform_code)?;
    for f in &[
        h.quatern_b, h.quatern_c, h.quatern_d, h.quatern_x, h.quatern_y, h.quatern_z,
    ] {
        out.write_f64(*f)?;
    }
    for f in h.srow_x.iter().chain(&h.srow_y).chain(&h.srow_z) {
        out.write_f64(*f)?;
    }
    out.write_i32(h.slice_code)?;
    out.write_i32(h.xyzt_units)?;
    out.write_i32(h.intent_code)?;
    out.write_all(&h.intent_name)?;
    out.write_u8(h.dim_info)?;
    out.write_all(&[0u8; 15])?;
    Ok(())
}
