use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalError {
    #[error("interval low endpoint is above its high endpoint")]
    InvertedBounds,

    #[error("a degenerate interval must include both of its endpoints")]
    DegeneratePoint,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionError {
    #[error("the collection is empty")]
    Empty,

    #[error("the collection is read-only")]
    ReadOnly,
}
