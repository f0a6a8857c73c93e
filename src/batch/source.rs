//! Image acquisition

use image::DynamicImage;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to acquire a source image
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("Unable to read the image file: {path:?} does not exist")]
    NotFound { path: PathBuf },

    #[error("Unable to read the image file: {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Source of images keyed by identifier
pub trait ImageSource: Send + Sync {
    /// Load one image
    fn load(&self, id: &str) -> Result<DynamicImage, AcquireError>;
}

/// Loads images from the filesystem, treating identifiers as paths
#[derive(Debug, Clone, Default)]
pub struct FsImageSource {
    /// Directory that relative identifiers are resolved against
    base_dir: Option<PathBuf>,
}

impl FsImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative identifiers against a base directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, id: &str) -> PathBuf {
        match &self.base_dir {
            Some(base) => base.join(id),
            None => PathBuf::from(id),
        }
    }
}

impl ImageSource for FsImageSource {
    fn load(&self, id: &str) -> Result<DynamicImage, AcquireError> {
        let path = self.resolve(id);
        if !path.is_file() {
            return Err(AcquireError::NotFound { path });
        }
        image::open(&path).map_err(|source| AcquireError::Decode { path, source })
    }
}
