//! Bring a scanned foot into the scene frame on top of the layer stack.
//!
//! The scan's longest bounding-box axis becomes scene Z (along the foot),
//! its length is scaled toward the target foot length and its sole is
//! placed at the stack height.

use std::f64::consts::FRAC_PI_2;

use insole_kernel::geometry::transform::{BoundingBox, Transform};
use insole_kernel::geometry::vector::Vec3;
use insole_tessellation::TriangleMesh;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::AlignError;
use crate::frame::Axis;

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 10.0;

/// How a scan was moved. Recomputed on every alignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentTransform {
    pub dominant_axis: Axis,
    pub scale: f64,
    pub rotation: Transform,
    pub translation: Vec3,
    /// Scale, then rotation, then translation.
    pub matrix: Transform,
}

impl AlignmentTransform {
    pub fn identity() -> Self {
        Self {
            dominant_axis: Axis::Z,
            scale: 1.0,
            rotation: Transform::identity(),
            translation: Vec3::ZERO,
            matrix: Transform::identity(),
        }
    }
}

/// Axis with the largest extent. Axes are compared X, Y, Z and only a
/// strictly greater extent replaces the current pick, so ties go to the
/// earlier axis.
pub fn dominant_axis(size: &Vec3) -> Axis {
    let mut best = Axis::X;
    for axis in [Axis::Y, Axis::Z] {
        if axis.component(size) > best.component(size) {
            best = axis;
        }
    }
    best
}

/// Rotation carrying `axis` onto scene Z.
pub fn rotation_to_length_axis(axis: Axis) -> Transform {
    match axis {
        Axis::X => Transform::rotation_y(FRAC_PI_2),
        Axis::Y => Transform::rotation_x(-FRAC_PI_2),
        Axis::Z => Transform::identity(),
    }
}

fn check_extents(bounds: &BoundingBox) -> Result<Vec3, AlignError> {
    let size = bounds.size();
    for axis in Axis::ALL {
        let extent = axis.component(&size);
        if !extent.is_finite() || extent <= 0.0 {
            return Err(AlignError::DegenerateGeometry { axis, extent });
        }
    }
    Ok(size)
}

/// Scale, rotate and translate `scan` so its long axis runs along scene Z,
/// its lowest point sits at `stack_height` (m) and it is centered in X/Z.
///
/// `target_foot_length` is in millimeters.
#[instrument(skip(scan), fields(vertices = scan.vertex_count()))]
pub fn align(
    scan: &TriangleMesh,
    target_foot_length: f64,
    stack_height: f64,
) -> Result<(TriangleMesh, AlignmentTransform), AlignError> {
    let size = check_extents(&scan.bounding_box())?;
    let axis = dominant_axis(&size);
    let scale = (target_foot_length / 1000.0 / axis.component(&size)).clamp(MIN_SCALE, MAX_SCALE);

    let rotation = rotation_to_length_axis(axis);
    let oriented = Transform::uniform_scaling(scale).then(&rotation);
    let mut mesh = scan.transformed(&oriented);

    let bounds = mesh.bounding_box();
    let center = bounds.center();
    let translation = Vec3::new(-center.x, stack_height - bounds.min.y, -center.z);
    mesh.apply_transform(&Transform::translation(translation.x, translation.y, translation.z));

    let matrix = oriented.then(&Transform::translation(translation.x, translation.y, translation.z));
    info!(dominant = %axis, scale, "aligned scan");
    Ok((
        mesh,
        AlignmentTransform {
            dominant_axis: axis,
            scale,
            rotation,
            translation,
            matrix,
        },
    ))
}

/// Like [`align`], but a degenerate scan comes back unchanged with an
/// identity transform.
pub fn align_or_passthrough(
    scan: &TriangleMesh,
    target_foot_length: f64,
    stack_height: f64,
) -> (TriangleMesh, AlignmentTransform) {
    match align(scan, target_foot_length, stack_height) {
        Ok(aligned) => aligned,
        Err(err) => {
            warn!(%err, "keeping scan in its own frame");
            (scan.clone(), AlignmentTransform::identity())
        }
    }
}
