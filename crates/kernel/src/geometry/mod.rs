pub mod curves;
pub mod point;
pub mod transform;
pub mod vector;
