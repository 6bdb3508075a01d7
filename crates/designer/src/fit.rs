use insole_kernel::m_to_mm;
use insole_tessellation::TriangleMesh;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::AlignError;
use crate::frame::Axis;
use crate::params::AnthropometricParams;

/// Heel width as a fraction of the measured foot width.
pub const HEEL_TO_WIDTH: f64 = 0.7;

/// Bounding-box measurements of an aligned scan, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanMeasurements {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// Measure a scan already in the scene frame: length along Z, width along
/// X, height along Y.
pub fn measure_scan(aligned: &TriangleMesh) -> Result<ScanMeasurements, AlignError> {
    let size = aligned.bounding_box().size();
    for axis in Axis::ALL {
        let extent = axis.component(&size);
        if !extent.is_finite() {
            return Err(AlignError::DegenerateGeometry { axis, extent });
        }
    }
    Ok(ScanMeasurements {
        length: m_to_mm(size.z),
        width: m_to_mm(size.x),
        height: m_to_mm(size.y),
    })
}

/// Copy of `params` with length, width and heel width taken from an aligned
/// scan, rounded to whole millimeters.
#[instrument(skip(params, aligned))]
pub fn fit_params_to_scan(
    params: &AnthropometricParams,
    aligned: &TriangleMesh,
) -> Result<AnthropometricParams, AlignError> {
    let m = measure_scan(aligned)?;
    let fitted = AnthropometricParams {
        foot_length: m.length.round(),
        foot_width: m.width.round(),
        heel_width: (m.width * HEEL_TO_WIDTH).round(),
        ..params.clone()
    };
    info!(
        length = fitted.foot_length,
        width = fitted.foot_width,
        heel = fitted.heel_width,
        "fitted parameters to scan"
    );
    Ok(fitted)
}
