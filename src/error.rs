use thiserror::Error;

/// Caller-misuse and degenerate-input failures of the grid core. These abort
/// the requesting flow; the [5, 50] px zoom clamp is handled silently and
/// never surfaces here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid already built")]
    AlreadyBuilt,

    #[error("grid not built yet")]
    NotBuilt,

    #[error("source region has no area")]
    EmptySource,
}
