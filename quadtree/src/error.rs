use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum QuadtreeError {
    #[error("tree bounds must have positive width and height (width: {width}, height: {height})")]
    InvalidBounds { width: i32, height: i32 },
}

pub type QuadtreeResult<T> = Result<T, QuadtreeError>;
