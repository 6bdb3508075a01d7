//! Mesh file decoding and encoding.

pub mod errors;
pub mod stl;

pub use errors::FormatError;
pub use stl::encode::{encode_binary, encode_binary_colored};
pub use stl::{Encoding, RawMeshData, detect_encoding, parse};
