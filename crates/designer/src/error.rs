use insole_file_format::FormatError;
use insole_tessellation::{ExtrudeError, SweepError};

use crate::frame::Axis;

/// An anthropometric parameter outside its accepted range.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("parameter {field} out of range: {value}")]
pub struct ParamRangeError {
    pub field: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum AlignError {
    #[error("degenerate scan geometry: {axis} extent is {extent}")]
    DegenerateGeometry { axis: Axis, extent: f64 },
}

/// Any failure while turning parameters (and an optional scan) into a model.
#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    #[error(transparent)]
    Params(#[from] ParamRangeError),

    #[error("layer extrusion failed: {0}")]
    Extrude(#[from] ExtrudeError),

    #[error("element generation failed: {0}")]
    Sweep(#[from] SweepError),

    #[error(transparent)]
    Align(#[from] AlignError),

    #[error("scan could not be decoded: {0}")]
    Format(#[from] FormatError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{layer} contour does not close")]
    OpenContour { layer: &'static str },
}
