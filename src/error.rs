//! Types for error handling go here.
use crate::typedef::NiftiType;
use quick_xml::events::attributes::AttrError;
use std::io::Error as IOError;
use std::num::{ParseFloatError, ParseIntError};
use std::str::Utf8Error;

quick_error! {
    /// Error type for all error variants originated by this crate.
    #[derive(Debug)]
    pub enum CitrixError {
        /// An invalid NIfTI-1 or NIfTI-2 file was read.
        InvalidFormat {
            display("Invalid NIfTI file")
        }
        /// A field holds an invalid enum code.
        InvalidCode(typename: &'static str, code: i32) {
            display("invalid code `{}` for header field {}", code, typename)
        }
        /// The header's data type is not handled by this crate.
        UnsupportedDataType(t: NiftiType) {
            display("unsupported data type {:?}", t)
        }
        /// The number of bytes or elements does not match the header.
        IncompatibleLength(got: usize, expected: usize) {
            display("data length ({}) incompatible with the expected size ({})", got, expected)
        }
        /// Attempted to set a description longer than 80 bytes.
        IncorrectDescriptionLength(len: usize) {
            display("description must be at most 80 bytes, got {}", len)
        }
        /// The NIfTI file carries no CIFTI extension (code 32).
        MissingCiftiExtension {
            display("no CIFTI extension (code 32) in NIfTI header")
        }
        /// The CIFTI XML document is well-formed but structurally wrong.
        MalformedCifti(msg: String) {
            display("malformed CIFTI header: {}", msg)
        }
        /// The GIFTI XML document is well-formed but structurally wrong.
        MalformedGifti(msg: String) {
            display("malformed GIFTI document: {}", msg)
        }
        /// A queried element does not exist.
        NotFound(what: String) {
            display("{} not found", what)
        }
        /// An argument given to an operation is invalid.
        InvalidArgument(msg: String) {
            display("{}", msg)
        }
        /// The XML document has no single closed root element.
        XmlStructure(msg: String) {
            display("malformed XML document: {}", msg)
        }
        /// XML syntax error.
        Xml(err: quick_xml::Error) {
            from()
            source(err)
            display("XML error: {}", err)
        }
        /// XML attribute syntax error.
        XmlAttribute(err: AttrError) {
            from()
            source(err)
            display("XML attribute error: {}", err)
        }
        /// Invalid base64 payload in a GIFTI data array.
        Base64(err: base64::DecodeError) {
            from()
            source(err)
            display("base64 decoding error: {}", err)
        }
        /// Text that should be UTF-8 is not.
        Utf8(err: Utf8Error) {
            from()
            source(err)
            display("invalid UTF-8: {}", err)
        }
        /// An integer token could not be parsed.
        ParseInt(err: ParseIntError) {
            from()
            source(err)
            display("invalid integer: {}", err)
        }
        /// A float token could not be parsed.
        ParseFloat(err: ParseFloatError) {
            from()
            source(err)
            display("invalid number: {}", err)
        }
        /// Array shape mismatch.
        Shape(err: ndarray::ShapeError) {
            from()
            source(err)
            display("invalid array shape: {}", err)
        }
        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
            display("I/O error: {}", err)
        }
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, CitrixError>;
