//! One-shot generation of the full insole model.

use insole_file_format::parse;
use insole_tessellation::TriangleMesh;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::align::{AlignmentTransform, align_or_passthrough};
use crate::config::GeometryConfig;
use crate::elements::{FunctionalElement, place_elements};
use crate::error::DesignError;
use crate::layers::{LayerSolid, build_layer_stack};
use crate::params::AnthropometricParams;
use crate::preview::{PlacedMesh, foot_preview, support_grid};

/// A scan moved into the scene frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedScan {
    /// Scene-frame mesh.
    pub mesh: TriangleMesh,
    pub transform: AlignmentTransform,
}

/// Everything generated from one set of parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsoleModel {
    pub params: AnthropometricParams,
    /// Base, support, cushion.
    pub layers: Vec<LayerSolid>,
    pub elements: Vec<FunctionalElement>,
    pub support_grid: Option<PlacedMesh>,
    /// Present only when no scan was given and the config asks for it.
    pub foot_preview: Option<PlacedMesh>,
    pub scan: Option<AlignedScan>,
    /// Meters.
    pub stack_height: f64,
}

impl InsoleModel {
    /// Every part in the scene frame, named for export.
    pub fn scene_meshes(&self) -> Vec<(String, TriangleMesh)> {
        let mut parts: Vec<(String, TriangleMesh)> = self
            .layers
            .iter()
            .map(|l| (format!("layer_{}", l.kind.name()), l.to_scene()))
            .collect();
        parts.extend(
            self.elements
                .iter()
                .map(|e| (e.role.name().to_string(), e.to_scene())),
        );
        if let Some(grid) = &self.support_grid {
            parts.push(("support_grid".to_string(), grid.to_scene()));
        }
        if let Some(foot) = &self.foot_preview {
            parts.push(("foot_preview".to_string(), foot.to_scene()));
        }
        if let Some(scan) = &self.scan {
            parts.push(("scan".to_string(), scan.mesh.clone()));
        }
        parts
    }

    pub fn triangle_count(&self) -> usize {
        self.scene_meshes().iter().map(|(_, m)| m.triangle_count()).sum()
    }
}

/// Decode an STL buffer into a mesh ready for [`generate`].
pub fn load_scan(bytes: &[u8]) -> Result<TriangleMesh, DesignError> {
    Ok(parse(bytes)?.to_triangle_mesh())
}

/// Validate `params`, then build the layers, inserts, optional aids and the
/// aligned scan. Nothing is returned unless every part succeeds.
#[instrument(skip_all, fields(scan = scan.is_some()))]
pub fn generate(
    params: &AnthropometricParams,
    config: &GeometryConfig,
    scan: Option<&TriangleMesh>,
) -> Result<InsoleModel, DesignError> {
    params.validate()?;
    let stack_height = params.stack_height();

    let layers = build_layer_stack(params, config)?;
    let elements = place_elements(params, config, stack_height)?;
    let support_grid = if config.support_grid {
        Some(support_grid(params, config, stack_height)?)
    } else {
        None
    };
    let foot_preview = if config.foot_preview && scan.is_none() {
        Some(foot_preview(params, config, stack_height)?)
    } else {
        None
    };
    let scan = scan.map(|mesh| {
        let (mesh, transform) = align_or_passthrough(mesh, params.foot_length, stack_height);
        AlignedScan { mesh, transform }
    });

    let model = InsoleModel {
        params: params.clone(),
        layers,
        elements,
        support_grid,
        foot_preview,
        scan,
        stack_height,
    };
    info!(
        layers = model.layers.len(),
        elements = model.elements.len(),
        stack_height,
        "generated insole model"
    );
    Ok(model)
}
