//! Error types. Capacity overflow is not an error: it is counted in
//! [`OverflowCounts`](crate::finder::OverflowCounts) instead.

/// The input batch is malformed. Runs fail fast on the first problem found.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("input ended early: expected {expected} at token {position}")]
    UnexpectedEnd { expected: String, position: usize },
    #[error("invalid token {token:?} at position {position}: expected {expected}")]
    InvalidToken {
        token: String,
        expected: String,
        position: usize,
    },
    #[error("event has {found} layers, expected {expected}")]
    LayerCount { expected: usize, found: usize },
    #[error("level {level} has {inner} inner ids but {outer} outer ids")]
    UnevenLevel {
        level: usize,
        inner: usize,
        outer: usize,
    },
    #[error("level {level} doublet {doublet}: point {point} not in layer {layer} ({len} points)")]
    PointOutOfRange {
        level: usize,
        doublet: usize,
        point: u32,
        layer: usize,
        len: usize,
    },
}

/// The finder cannot run with the requested configuration or dispatch setup.
#[derive(Debug, thiserror::Error)]
pub enum FinderError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("event does not match configuration: {0}")]
    Input(#[from] InputError),
    #[error("cannot allocate {what} of {bytes} bytes")]
    Allocation {
        what: &'static str,
        bytes: usize,
        #[source]
        source: Option<std::collections::TryReserveError>,
    },
    #[error("failed to start worker pool: {0}")]
    Dispatch(#[from] rayon::ThreadPoolBuildError),
}
