//! Inserts placed on top of the layer stack.

use std::f64::consts::FRAC_PI_2;

use insole_kernel::geometry::curves::CatmullRom3d;
use insole_kernel::geometry::point::Point3d;
use insole_kernel::geometry::transform::Transform;
use insole_kernel::mm_to_m;
use insole_tessellation::primitives::{cylinder, frustum, wedge_prism};
use insole_tessellation::{TriangleMesh, TubeConfig, tube_along_spline};
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::GeometryConfig;
use crate::error::DesignError;
use crate::frame::{insole_to_scene, transform_from_isometry};
use crate::params::AnthropometricParams;

/// Length fractions of the arch tube's control points.
pub const ARCH_STATIONS: [f64; 6] = [0.02, 0.06, 0.10, 0.14, 0.18, 0.22];
/// Height profile of the arch tube, as fractions of the supported arch height.
pub const ARCH_PROFILE: [f64; 6] = [0.0, 0.5, 1.0, 0.8, 0.4, 0.0];

/// Height of the wedge's raised side (m).
const WEDGE_HEIGHT: f64 = 0.002;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementRole {
    ArchSupport,
    HeelCup,
    MetatarsalPad,
    HeelWedge,
}

impl ElementRole {
    pub fn name(self) -> &'static str {
        match self {
            ElementRole::ArchSupport => "arch_support",
            ElementRole::HeelCup => "heel_cup",
            ElementRole::MetatarsalPad => "metatarsal_pad",
            ElementRole::HeelWedge => "heel_wedge",
        }
    }
}

/// An insert mesh in its own local frame plus where it goes in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalElement {
    pub role: ElementRole,
    pub mesh: TriangleMesh,
    /// Element-local to scene.
    pub placement: Transform,
}

impl FunctionalElement {
    fn placed(role: ElementRole, mesh: TriangleMesh, local: Isometry3<f64>) -> Self {
        let placement = transform_from_isometry(&local).then(&insole_to_scene());
        debug!(role = role.name(), triangles = mesh.triangle_count(), "placed element");
        Self { role, mesh, placement }
    }

    pub fn to_scene(&self) -> TriangleMesh {
        self.mesh.transformed(&self.placement)
    }
}

fn isometry(translation: [f64; 3], axis: Vector3<f64>, angle: f64) -> Isometry3<f64> {
    Isometry3::from_parts(
        Translation3::new(translation[0], translation[1], translation[2]),
        UnitQuaternion::from_scaled_axis(axis * angle),
    )
}

/// Control points of the arch tube before placement: `x` runs along the
/// tube, `z` is the lift and `y` follows it.
pub fn arch_control_points(params: &AnthropometricParams) -> Vec<Point3d> {
    let length = mm_to_m(params.foot_length);
    let peak = mm_to_m(params.arch_height) * params.strength();
    ARCH_STATIONS
        .iter()
        .zip(ARCH_PROFILE)
        .map(|(station, f)| {
            let h = peak * f;
            Point3d::new(station * length, h, h)
        })
        .collect()
}

fn arch_support(
    params: &AnthropometricParams,
    config: &GeometryConfig,
    stack_height: f64,
) -> Result<FunctionalElement, DesignError> {
    let spline = CatmullRom3d::new(arch_control_points(params));
    let tube = TubeConfig::default()
        .with_radius(mm_to_m(config.tube_radius_mm))
        .with_radial_segments(config.tube_radial_segments);
    let mesh = tube_along_spline(&spline, config.tube_segments, &tube)?;
    // quarter turn about the vertical so the sweep runs across the foot
    let local = isometry([0.0, 0.0, stack_height], Vector3::z(), FRAC_PI_2);
    Ok(FunctionalElement::placed(ElementRole::ArchSupport, mesh, local))
}

fn heel_x(length: f64) -> f64 {
    -length / 2.0 + 0.02 * length
}

fn heel_cup(
    params: &AnthropometricParams,
    config: &GeometryConfig,
    stack_height: f64,
) -> Result<FunctionalElement, DesignError> {
    let (length, _, heel_width) = params.outline_m();
    let height = mm_to_m(params.heel_cup_height);
    let mesh = frustum(heel_width / 3.0, heel_width / 2.0, height, config.heel_cup_segments)?;
    let local = isometry(
        [heel_x(length), 0.0, stack_height + height / 2.0],
        Vector3::zeros(),
        0.0,
    );
    Ok(FunctionalElement::placed(ElementRole::HeelCup, mesh, local))
}

fn metatarsal_pad(
    params: &AnthropometricParams,
    config: &GeometryConfig,
    stack_height: f64,
) -> Result<FunctionalElement, DesignError> {
    let (length, _, _) = params.outline_m();
    let diameter = mm_to_m(params.metatarsal_pad_height);
    let mesh = cylinder(diameter / 2.0, 0.06 * length, config.pad_segments)?;
    // the cylinder axis (local z) is laid along the foot
    let local = isometry(
        [length / 4.0, 0.0, stack_height + diameter / 2.0],
        Vector3::y(),
        FRAC_PI_2,
    );
    Ok(FunctionalElement::placed(ElementRole::MetatarsalPad, mesh, local))
}

fn heel_wedge(params: &AnthropometricParams, stack_height: f64) -> Result<FunctionalElement, DesignError> {
    let (length, _, heel_width) = params.outline_m();
    let mesh = wedge_prism(heel_width, 0.04 * length, WEDGE_HEIGHT)?;
    let local = isometry(
        [heel_x(length), 0.0, stack_height],
        Vector3::x(),
        params.heel_wedge_angle.to_radians(),
    );
    Ok(FunctionalElement::placed(ElementRole::HeelWedge, mesh, local))
}

/// Arch tube, then heel cup, metatarsal pad and heel wedge when their
/// parameters call for them. The heel inserts need a nonzero heel width.
/// `stack_height` is in meters.
#[instrument(skip(params, config))]
pub fn place_elements(
    params: &AnthropometricParams,
    config: &GeometryConfig,
    stack_height: f64,
) -> Result<Vec<FunctionalElement>, DesignError> {
    let mut elements = vec![arch_support(params, config, stack_height)?];
    let has_heel = params.heel_width > 0.0;
    if has_heel && params.heel_cup_height > 0.0 {
        elements.push(heel_cup(params, config, stack_height)?);
    }
    if params.metatarsal_pad_height > 0.0 {
        elements.push(metatarsal_pad(params, config, stack_height)?);
    }
    if has_heel && params.heel_wedge_angle != 0.0 {
        elements.push(heel_wedge(params, stack_height)?);
    }
    info!(
        count = elements.len(),
        roles = ?elements.iter().map(|e| e.role).collect::<Vec<_>>(),
        "placed functional elements"
    );
    Ok(elements)
}
