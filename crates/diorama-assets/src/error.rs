use std::path::PathBuf;

/// Errors that can occur while fetching a single asset.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to load glTF file '{0}': {1}")]
    GltfLoadFailed(PathBuf, String),

    #[error("I/O error loading '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("unsupported asset source '{0}'")]
    UnsupportedSource(String),

    #[error("unknown light kind '{0}'")]
    UnknownLightKind(String),
}

impl AssetError {
    /// Classify an I/O failure on `path`, keeping missing files distinct.
    pub(crate) fn from_io(path: PathBuf, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            AssetError::NotFound(path)
        } else {
            AssetError::Io(path, err)
        }
    }
}

/// A required asset of a batch failed to load. Fatal to scene composition.
#[derive(Debug, thiserror::Error)]
#[error("failed to load asset '{identifier}': {cause}")]
pub struct AssetLoadError {
    pub identifier: String,
    #[source]
    pub cause: AssetError,
}
