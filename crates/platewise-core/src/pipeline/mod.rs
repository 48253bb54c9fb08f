//! Input side of an estimate.
//!
//! - **decode**: content-sniffed decoding to RGB8 with a timeout
//! - **validate**: size limits, content types and magic bytes

pub mod decode;
pub mod validate;

pub use decode::{DecodedImage, ImageDecoder};
pub use validate::Validator;
