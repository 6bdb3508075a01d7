/// Errors while decoding a mesh buffer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("buffer of {len} bytes is too short for the {required}-byte header")]
    TooShort { len: usize, required: usize },

    #[error("binary mesh declares {triangles} triangles ({expected} bytes) but the buffer holds {actual}")]
    Truncated {
        triangles: u32,
        expected: u64,
        actual: usize,
    },

    #[error("text mesh contains no well-formed facet blocks ({skipped} skipped)")]
    NoFacets { skipped: usize },
}
