use crate::catalog::LayerKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown layer: {0}")]
    UnknownLayer(String),

    #[error("layer {0} is filtered by the municipality boundary, which is not available yet")]
    MissingBoundary(LayerKind),

    #[error("municipality boundary has no usable polygon geometry")]
    UnusableBoundary,
}
