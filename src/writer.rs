//! Utility functions to write NIfTI images.

use crate::affine::Affine4;
use crate::cifti::CiftiHeader;
use crate::error::Result;
use crate::extension::{Extension, ExtensionSequence, NIFTI_ECODE_CIFTI};
use crate::header::{NiftiHeader, NiftiVersion};
use crate::util::is_gz_file;
use crate::volume::{DataElement, InMemVolume};
use byteordered::ByteOrdered;
use flate2::write::GzEncoder;
use flate2::Compression;
use ndarray::{ArrayBase, Data, Dimension};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Options and flags which can be used to configure how a NIfTI image
/// is written.
#[derive(Debug, Clone, PartialEq)]
pub struct WriterOptions {
    /// Where to write the output file.
    path: PathBuf,
    /// Header layout to write.
    version: NiftiVersion,
    /// Gzip the whole file. Inferred from the file name when unset.
    compress: Option<bool>,
    /// Used as a template for all header fields which do not depend on
    /// the data.
    header_reference: Option<NiftiHeader>,
    /// Voxel-to-world transform to store in the sform rows.
    affine: Option<Affine4>,
    /// Extensions to write between the header and the data.
    extensions: ExtensionSequence,
    /// CIFTI-2 document, written as extension 32.
    cifti: Option<CiftiHeader>,
}

impl WriterOptions {
    /// Creates a new set of options for writing to `path`, as NIfTI-2.
    pub fn new<P>(path: P) -> WriterOptions
    where
        P: AsRef<Path>,
    {
        WriterOptions {
            path: path.as_ref().to_owned(),
            version: NiftiVersion::Nifti2,
            compress: None,
            header_reference: None,
            affine: None,
            extensions: ExtensionSequence::default(),
            cifti: None,
        }
    }

    /// Write a NIfTI-1 or NIfTI-2 file.
    pub fn version(mut self, version: NiftiVersion) -> WriterOptions {
        self.version = version;
        self
    }

    /// Force (or disable) gzip compression, regardless of the file name.
    pub fn compress(mut self, compress: bool) -> WriterOptions {
        self.compress = Some(compress);
        self
    }

    /// Use `header` as a template. `dim`, `datatype`, `bitpix`,
    /// `vox_offset` and the scaling fields always depend on the written
    /// data, not on the reference.
    pub fn reference_header(mut self, header: &NiftiHeader) -> WriterOptions {
        self.header_reference = Some(header.clone());
        self
    }

    /// Store `affine` as the sform of the written header.
    pub fn affine(mut self, affine: &Affine4) -> WriterOptions {
        self.affine = Some(*affine);
        self
    }

    /// Add (or replace, by code) an extension.
    pub fn extension(mut self, extension: Extension) -> WriterOptions {
        self.extensions.set(extension);
        self
    }

    /// Embed a CIFTI-2 XML document as extension 32.
    pub fn cifti(mut self, header: &CiftiHeader) -> WriterOptions {
        self.cifti = Some(header.clone());
        self
    }

    /// Write a nifti file (.nii or .nii.gz).
    pub fn write_nifti<A, S, D>(&self, data: &ArrayBase<S, D>) -> Result<()>
    where
        S: Data<Elem = A>,
        A: DataElement,
        D: Dimension,
    {
        let mut extensions = self.extensions.clone();
        if let Some(cifti) = &self.cifti {
            let xml = cifti.to_xml()?.into_bytes();
            extensions.set(Extension::from_content(NIFTI_ECODE_CIFTI, xml));
        }
        let header = self.prepare_header(data.shape(), &extensions)?;
        let header = NiftiHeader {
            datatype: A::DATA_TYPE as i16,
            bitpix: (A::DATA_TYPE.size_of() * 8) as i16,
            ..header
        };
        let volume = InMemVolume::from_array(data, header.endianness)?;

        let f = File::create(&self.path)?;
        let writer = BufWriter::new(f);
        let compress = self.compress.unwrap_or_else(|| is_gz_file(&self.path));
        if compress {
            let mut e = GzEncoder::new(writer, Compression::default());
            write_all(&mut e, &header, &extensions, &volume)?;
            let _ = e.finish()?;
        } else {
            let mut writer = writer;
            write_all(&mut writer, &header, &extensions, &volume)?;
            writer.flush()?;
        }
        Ok(())
    }

    fn prepare_header(&self, shape: &[usize], extensions: &ExtensionSequence) -> Result<NiftiHeader> {
        let mut header = match &self.header_reference {
            Some(r) => r.clone(),
            None => NiftiHeader::default(),
        };
        header.version = self.version;
        header.set_dim(shape)?;
        header.scl_slope = 1.;
        header.scl_inter = 0.;
        header.vox_offset = (self.version.min_vox_offset() + extensions.bytes_len()) as u64;
        if let Some(affine) = &self.affine {
            header.set_affine(affine);
        }
        Ok(header)
    }
}

fn write_all<W: Write>(
    writer: &mut W,
    header: &NiftiHeader,
    extensions: &ExtensionSequence,
    volume: &InMemVolume,
) -> Result<()> {
    header.write_to(&mut *writer)?;
    extensions.write_to(ByteOrdered::runtime(&mut *writer, header.endianness))?;
    writer.write_all(volume.raw_data())?;
    Ok(())
}
