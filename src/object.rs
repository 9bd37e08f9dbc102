//! Module for handling and retrieving complete NIfTI objects.

use crate::error::{CitrixError, Result};
use crate::extension::{Extender, ExtensionSequence, NIFTI_ECODE_CIFTI};
use crate::header::NiftiHeader;
use crate::util::is_gz_file;
use crate::volume::InMemVolume;
use byteordered::ByteOrdered;
use flate2::bufread::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Options and flags which can be used to configure how a NIfTI image
/// is read.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderOptions {
    /// Compare the matrix size described by a CIFTI document with the
    /// dimensions of the data.
    check_cifti_shape: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            check_cifti_shape: true,
        }
    }
}

impl ReaderOptions {
    /// Creates a blank new set of options ready for configuration.
    pub fn new() -> ReaderOptions {
        ReaderOptions::default()
    }

    /// Whether the size of CIFTI matrices is validated against their
    /// XML document when reading.
    pub fn check_cifti_shape(&mut self, check: bool) -> &mut Self {
        self.check_cifti_shape = check;
        self
    }

    /// Whether CIFTI matrix sizes are validated.
    pub fn checks_cifti_shape(&self) -> bool {
        self.check_cifti_shape
    }

    /// Retrieve the full contents of a NIfTI object.
    /// If the file's name ends with ".gz", it is decoded as a Gzip stream.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use citrix::ReaderOptions;
    /// # use citrix::Result;
    ///
    /// # fn run() -> Result<()> {
    /// let obj = ReaderOptions::new().read_file("minimal.nii.gz")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn read_file<P>(&self, path: P) -> Result<NiftiObject>
    where
        P: AsRef<Path>,
    {
        let gz = is_gz_file(&path);
        let file = BufReader::new(File::open(&path)?);
        if gz {
            NiftiObject::from_reader(GzDecoder::new(file))
        } else {
            NiftiObject::from_reader(file)
        }
    }

    /// Read only the header and extensions of a NIfTI file, skipping the
    /// volume data.
    pub fn read_header_file<P>(&self, path: P) -> Result<(NiftiHeader, ExtensionSequence)>
    where
        P: AsRef<Path>,
    {
        let gz = is_gz_file(&path);
        let file = BufReader::new(File::open(&path)?);
        if gz {
            read_header_and_extensions(GzDecoder::new(file))
        } else {
            read_header_and_extensions(file)
        }
    }
}

/// Data type for a NIfTI object that is fully contained in memory.
/// Objects contain a NIfTI header, a volume, and a possibly empty
/// extension sequence.
#[derive(Debug, PartialEq, Clone)]
pub struct NiftiObject {
    header: NiftiHeader,
    extensions: ExtensionSequence,
    volume: InMemVolume,
}

impl NiftiObject {
    /// Retrieve a single-file NIfTI object from a stream of data.
    pub fn from_reader<R: Read>(mut source: R) -> Result<NiftiObject> {
        let (header, extensions) = read_header_and_extensions(&mut source)?;
        let volume = InMemVolume::from_reader(source, &header)?;

        Ok(NiftiObject {
            header,
            extensions,
            volume,
        })
    }

    /// Obtain a reference to the NIfTI header.
    pub fn header(&self) -> &NiftiHeader {
        &self.header
    }

    /// Obtain a reference to the object's extensions.
    pub fn extensions(&self) -> &ExtensionSequence {
        &self.extensions
    }

    /// Obtain a reference to the object's volume.
    pub fn volume(&self) -> &InMemVolume {
        &self.volume
    }

    /// Whether the object carries a CIFTI-2 XML extension.
    pub fn is_cifti(&self) -> bool {
        self.extensions.find(NIFTI_ECODE_CIFTI).is_some()
    }

    /// Move the volume out of the object, discarding the
    /// header and extensions.
    pub fn into_volume(self) -> InMemVolume {
        self.volume
    }

    /// Split the object into its parts.
    pub fn into_parts(self) -> (NiftiHeader, ExtensionSequence, InMemVolume) {
        (self.header, self.extensions, self.volume)
    }
}

/// Read a header, the extender, and the extensions, leaving the source
/// positioned at the first byte of the volume.
fn read_header_and_extensions<R: Read>(mut source: R) -> Result<(NiftiHeader, ExtensionSequence)> {
    let header = NiftiHeader::from_reader(&mut source)?;
    let min_offset = header.version.min_vox_offset();
    let vox_offset = header.vox_offset as usize;
    if vox_offset < min_offset {
        return Err(CitrixError::InvalidFormat);
    }

    let extender = Extender::from_reader(&mut source)?;
    let len = vox_offset - min_offset;
    let extensions = ExtensionSequence::from_reader(
        extender,
        ByteOrdered::runtime(&mut source, header.endianness),
        len,
    )?;

    // skip any padding between the last extension and the volume
    let consumed = if extender.has_extensions() {
        extensions.bytes_len()
    } else {
        0
    };
    if consumed < len {
        let padding = (len - consumed) as u64;
        let skipped = io::copy(&mut Read::take(&mut source, padding), &mut io::sink())?;
        if skipped != padding {
            return Err(CitrixError::IncompatibleLength(skipped as usize, padding as usize));
        }
    }
    Ok((header, extensions))
}
