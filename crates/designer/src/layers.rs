//! The base, support and cushion slabs.

use insole_kernel::geometry::transform::Transform;
use insole_kernel::mm_to_m;
use insole_tessellation::{TriangleMesh, extrude_path};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::{GeometryConfig, LayerConfig};
use crate::contour::ContourCurve;
use crate::deform::{self, ArchSupport, BaseCurvature, CushionContour, DeformationField};
use crate::error::DesignError;
use crate::frame::insole_to_scene;
use crate::params::AnthropometricParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerKind {
    Base,
    Support,
    Cushion,
}

impl LayerKind {
    /// Bottom to top.
    pub const STACK: [LayerKind; 3] = [LayerKind::Base, LayerKind::Support, LayerKind::Cushion];

    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Base => "base",
            LayerKind::Support => "support",
            LayerKind::Cushion => "cushion",
        }
    }

    fn thickness_mm(self, params: &AnthropometricParams) -> f64 {
        match self {
            LayerKind::Base => params.base_thickness,
            LayerKind::Support => params.support_thickness,
            LayerKind::Cushion => params.cushion_thickness,
        }
    }

    fn config(self, config: &GeometryConfig) -> &LayerConfig {
        match self {
            LayerKind::Base => &config.base,
            LayerKind::Support => &config.support,
            LayerKind::Cushion => &config.cushion,
        }
    }

    /// The height field each layer is shaped with.
    pub fn field(self, params: &AnthropometricParams) -> Box<dyn DeformationField> {
        match self {
            LayerKind::Base => Box::new(BaseCurvature::new(params)),
            LayerKind::Support => Box::new(ArchSupport::new(params)),
            LayerKind::Cushion => Box::new(CushionContour::new(params)),
        }
    }
}

/// One deformed slab of the stack.
///
/// `mesh` is in the insole frame with the slab resting on `z = 0`;
/// `placement` lifts it by `offset` and maps it into the scene frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSolid {
    pub kind: LayerKind,
    pub mesh: TriangleMesh,
    /// Meters.
    pub thickness: f64,
    /// Height of the slab's bottom above the insole base, in meters.
    pub offset: f64,
    pub contour: ContourCurve,
    pub placement: Transform,
}

impl LayerSolid {
    pub fn to_scene(&self) -> TriangleMesh {
        self.mesh.transformed(&self.placement)
    }
}

/// Build one layer: outline, extrusion, deformation.
#[instrument(skip(params, config))]
pub fn build_layer(
    kind: LayerKind,
    offset: f64,
    params: &AnthropometricParams,
    config: &GeometryConfig,
) -> Result<LayerSolid, DesignError> {
    let layer_config = kind.config(config);
    let contour = ContourCurve::build(params, layer_config.contour_offset_mm);
    if !contour.is_closed() {
        return Err(DesignError::OpenContour { layer: kind.name() });
    }

    let thickness = mm_to_m(kind.thickness_mm(params));
    let settings = layer_config.extrude_settings(thickness, config.curve_segments);
    let mut mesh = extrude_path(&contour.path, &settings)?;
    deform::apply(kind.field(params).as_ref(), &mut mesh);

    let placement = Transform::translation(0.0, 0.0, offset).then(&insole_to_scene());
    debug!(
        layer = kind.name(),
        thickness,
        offset,
        triangles = mesh.triangle_count(),
        "built layer"
    );
    Ok(LayerSolid {
        kind,
        mesh,
        thickness,
        offset,
        contour,
        placement,
    })
}

/// Base, support and cushion in stacking order; each offset is the sum of
/// the thicknesses below it.
#[instrument(skip(params, config))]
pub fn build_layer_stack(
    params: &AnthropometricParams,
    config: &GeometryConfig,
) -> Result<Vec<LayerSolid>, DesignError> {
    let mut layers = Vec::with_capacity(LayerKind::STACK.len());
    let mut offset = 0.0;
    for kind in LayerKind::STACK {
        let layer = build_layer(kind, offset, params, config)?;
        offset += layer.thickness;
        layers.push(layer);
    }
    info!(
        layers = layers.len(),
        stack_height = offset,
        triangles = layers.iter().map(|l| l.mesh.triangle_count()).sum::<usize>(),
        "built layer stack"
    );
    Ok(layers)
}
