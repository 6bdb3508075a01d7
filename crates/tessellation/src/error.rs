/// Errors while extruding a planar outline into a slab.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtrudeError {
    #[error("profile needs at least {min} points, got {actual}")]
    InsufficientProfile { min: usize, actual: usize },

    #[error("invalid {name}: {value}")]
    InvalidDimension { name: &'static str, value: f64 },

    #[error("curve segments must be positive, got {actual}")]
    InsufficientSegments { actual: usize },
}

/// Errors while sweeping or revolving a profile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SweepError {
    #[error("path needs at least {min} points, got {actual}")]
    InsufficientPath { min: usize, actual: usize },

    #[error("need at least {min} segments, got {actual}")]
    InsufficientSegments { min: usize, actual: usize },

    #[error("invalid {name}: {value}")]
    InvalidDimension { name: &'static str, value: f64 },
}

pub(crate) fn check_dimension<E>(
    name: &'static str,
    value: f64,
    err: impl FnOnce(&'static str, f64) -> E,
) -> Result<f64, E> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(err(name, value))
    }
}
