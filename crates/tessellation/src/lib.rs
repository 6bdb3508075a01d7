//! Triangle meshes and the generators that build them: slab extrusion,
//! tube sweeps, lathes and a few closed primitives.

pub mod error;
pub mod extrude;
pub mod mesh;
pub mod primitives;
pub mod revolve;
pub mod sweep;
pub mod triangulate;

pub use error::{ExtrudeError, SweepError};
pub use extrude::{ExtrudeSettings, extrude_path, extrude_polygon};
pub use mesh::TriangleMesh;
pub use sweep::{TubeConfig, tube_along_spline, tube_from_polyline};
