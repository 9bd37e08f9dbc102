//! This module contains definitions for the extension and related types.
//! Extensions are optional data frames sitting before the voxel data.
//! When present, an extender frame of 4 bytes is also present at the
//! end of the NIfTI header, with the first byte set to something
//! other than 0.
//!
//! CIFTI-2 stores its XML document in an extension with code 32.

use crate::error::{CitrixError, Result};
use byteordered::{ByteOrdered, Endian};
use std::io::{Read, Write};

/// Extension code of the CIFTI-2 XML document.
pub const NIFTI_ECODE_CIFTI: i32 = 32;

/// Data type for the extender code.
#[derive(Debug, Default, PartialEq, Clone, Copy)]
pub struct Extender([u8; 4]);

impl Extender {
    /// Fetch the extender code from the given source, while expecting it to exist.
    pub fn from_reader<S: Read>(mut source: S) -> Result<Self> {
        let mut extension = [0u8; 4];
        source.read_exact(&mut extension)?;
        Ok(extension.into())
    }

    /// Whether extensions should exist upon this extender code.
    pub fn has_extensions(&self) -> bool {
        self.0[0] != 0
    }

    /// Get the extender's bytes
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<[u8; 4]> for Extender {
    fn from(extender: [u8; 4]) -> Self {
        Extender(extender)
    }
}

/// Data type for the raw contents of an extension.
/// Users of this type have to reinterpret the data
/// to suit their needs.
#[derive(Debug, PartialEq, Clone)]
pub struct Extension {
    esize: i32,
    ecode: i32,
    edata: Vec<u8>,
}

impl Extension {
    /// Create an extension out of its main components.
    ///
    /// # Errors
    /// If `esize` does not correspond to the full size
    /// of the extension in bytes: `8 + edata.len()`
    pub fn new(esize: i32, ecode: i32, edata: Vec<u8>) -> Result<Self> {
        if esize < 8 || esize as usize != 8 + edata.len() {
            return Err(CitrixError::IncompatibleLength(esize.max(0) as usize, 8 + edata.len()));
        }

        Ok(Extension {
            esize,
            ecode,
            edata,
        })
    }

    /// Create an extension from its code and content. The content is
    /// padded with zeros so that the full size is a multiple of 16 bytes,
    /// as the NIfTI standard requires.
    pub fn from_content(ecode: i32, mut edata: Vec<u8>) -> Self {
        let padded = (edata.len() + 8 + 15) / 16 * 16;
        edata.resize(padded - 8, 0);
        Extension {
            esize: padded as i32,
            ecode,
            edata,
        }
    }

    /// Obtain the claimed extension raw size (`esize` field).
    pub fn size(&self) -> i32 {
        self.esize
    }

    /// Obtain the extension's code (`ecode` field).
    pub fn code(&self) -> i32 {
        self.ecode
    }

    /// Obtain the extension's data (`edata` field).
    pub fn data(&self) -> &[u8] {
        &self.edata
    }
}

/// Data type for aggregating the extender code and
/// all extensions.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct ExtensionSequence {
    extender: Extender,
    extensions: Vec<Extension>,
}

impl IntoIterator for ExtensionSequence {
    type Item = Extension;
    type IntoIter = ::std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.extensions.into_iter()
    }
}

impl<'a> IntoIterator for &'a ExtensionSequence {
    type Item = &'a Extension;
    type IntoIter = ::std::slice::Iter<'a, Extension>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl ExtensionSequence {
    /// Create a sequence out of the given extensions. The extender code
    /// is set according to whether the sequence is empty.
    pub fn new(extensions: Vec<Extension>) -> Self {
        let extender = if extensions.is_empty() {
            Extender::default()
        } else {
            Extender([1, 0, 0, 0])
        };
        ExtensionSequence {
            extender,
            extensions,
        }
    }

    /// Read a sequence of extensions from a source, up until `len` bytes.
    pub fn from_reader<S, E>(
        extender: Extender,
        mut source: ByteOrdered<S, E>,
        len: usize,
    ) -> Result<Self>
    where
        S: Read,
        E: Endian,
    {
        let mut extensions = Vec::new();
        if extender.has_extensions() {
            let mut offset = 0;
            while offset < len {
                let esize = source.read_i32()?;
                let ecode = source.read_i32()?;
                if esize < 8 || offset + esize as usize > len {
                    return Err(CitrixError::InvalidFormat);
                }
                let data_size = esize as usize - 8;
                let mut edata = Vec::new();
                let _ = Read::take(&mut source, data_size as u64).read_to_end(&mut edata)?;
                if edata.len() != data_size {
                    return Err(CitrixError::IncompatibleLength(edata.len(), data_size));
                }
                extensions.push(Extension::new(esize, ecode, edata)?);
                offset += esize as usize;
            }
        }

        Ok(ExtensionSequence {
            extender,
            extensions,
        })
    }

    /// Write the extender code followed by every extension.
    pub fn write_to<W, E>(&self, mut output: ByteOrdered<W, E>) -> Result<()>
    where
        W: Write,
        E: Endian,
    {
        output.write_all(self.extender.as_bytes())?;
        for extension in &self.extensions {
            output.write_i32(extension.esize)?;
            output.write_i32(extension.ecode)?;
            output.write_all(&extension.edata)?;
        }
        Ok(())
    }

    /// Obtain an iterator to the extensions.
    pub fn iter(&self) -> ::std::slice::Iter<Extension> {
        self.extensions.iter()
    }

    /// Whether the sequence of extensions is empty.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Obtain the number of extensions available.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Sum of all extension sizes, in bytes, without the extender.
    pub fn bytes_len(&self) -> usize {
        self.extensions.iter().map(|e| e.esize as usize).sum()
    }

    /// Get the extender code from this extension sequence.
    pub fn extender(&self) -> Extender {
        self.extender
    }

    /// The first extension with the given code.
    pub fn find(&self, ecode: i32) -> Option<&Extension> {
        self.extensions.iter().find(|e| e.ecode == ecode)
    }

    /// Replace the first extension with the same code, or append it.
    pub fn set(&mut self, extension: Extension) {
        match self.extensions.iter_mut().find(|e| e.ecode == extension.ecode) {
            Some(e) => *e = extension,
            None => self.extensions.push(extension),
        }
        self.extender = Extender([1, 0, 0, 0]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteordered::Endianness;

    #[test]
    fn padded_content() {
        let ext = Extension::from_content(NIFTI_ECODE_CIFTI, b"<CIFTI/>".to_vec());
        assert_eq!(ext.size(), 16);
        assert_eq!(ext.data().len(), 8);

        let ext = Extension::from_content(NIFTI_ECODE_CIFTI, vec![1; 9]);
        assert_eq!(ext.size(), 32);
        assert_eq!(&ext.data()[..9], &[1; 9]);
        assert!(ext.data()[9..].iter().all(|b| *b == 0));
    }

    #[test]
    fn bad_size() {
        assert!(Extension::new(12, 32, vec![0; 8]).is_err());
    }

    #[test]
    fn write_and_read_sequence() {
        let mut seq = ExtensionSequence::default();
        assert!(!seq.extender().has_extensions());
        seq.set(Extension::from_content(NIFTI_ECODE_CIFTI, b"first".to_vec()));
        seq.set(Extension::from_content(4, b"afni".to_vec()));
        seq.set(Extension::from_content(NIFTI_ECODE_CIFTI, b"second".to_vec()));
        assert_eq!(seq.len(), 2);

        let mut buffer = Vec::new();
        seq.write_to(ByteOrdered::runtime(&mut buffer, Endianness::Big))
            .unwrap();
        assert_eq!(buffer.len(), 4 + seq.bytes_len());

        let mut source = &buffer[..];
        let extender = Extender::from_reader(&mut source).unwrap();
        let read = ExtensionSequence::from_reader(
            extender,
            ByteOrdered::runtime(source, Endianness::Big),
            seq.bytes_len(),
        )
        .unwrap();
        assert_eq!(read, seq);
        let cifti = read.find(NIFTI_ECODE_CIFTI).unwrap();
        assert_eq!(&cifti.data()[..6], b"second");
    }
}
