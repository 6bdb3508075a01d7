//! Parametric orthotic insole design: outline, layer stack, deformation,
//! functional inserts and scan alignment.
//!
//! Parameters are millimeters; generated geometry is meters. See
//! [`frame`] for the two coordinate frames.

pub mod align;
pub mod config;
pub mod contour;
pub mod deform;
pub mod elements;
pub mod error;
pub mod fit;
pub mod frame;
pub mod layers;
pub mod model;
pub mod params;
pub mod preview;

pub use align::{AlignmentTransform, align, align_or_passthrough};
pub use config::{GeometryConfig, LayerConfig};
pub use contour::ContourCurve;
pub use deform::DeformationField;
pub use elements::{ElementRole, FunctionalElement, place_elements};
pub use error::{AlignError, DesignError, ParamRangeError};
pub use fit::{ScanMeasurements, fit_params_to_scan, measure_scan};
pub use frame::Axis;
pub use layers::{LayerKind, LayerSolid, build_layer_stack};
pub use model::{AlignedScan, InsoleModel, generate, load_scan};
pub use params::{AnthropometricParams, ArchType, SupportLevel};
pub use preview::PlacedMesh;
