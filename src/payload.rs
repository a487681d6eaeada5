//! The detection payload exchanged with the detector and written back on save.
//!
//! ```json
//! { "filename": "uploads/parts.jpg", "rects": [[12, 40, 33, 31], ...] }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::geometry::Rect;

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed payload {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("rect #{index} has a negative or non-finite value: {detection:?}")]
    InvalidRect { index: usize, detection: Detection },
}

/// `(x, y, w, h)` in image pixels, serialized as a 4-element array.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection(pub f32, pub f32, pub f32, pub f32);

impl Detection {
    pub fn to_rect(self) -> Rect {
        Rect::from_detection(self.0, self.1, self.2, self.3)
    }

    fn is_valid(&self) -> bool {
        let Self(x, y, w, h) = *self;
        [x, y, w, h].iter().all(|v| v.is_finite()) && w >= 0.0 && h >= 0.0
    }
}

impl From<Rect> for Detection {
    fn from(r: Rect) -> Self {
        Self(r.x, r.y, r.width, r.height)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionPayload {
    #[serde(default)]
    pub filename: PathBuf,
    #[serde(default)]
    pub rects: Vec<Detection>,
}

impl DetectionPayload {
    pub fn new(filename: impl Into<PathBuf>, rects: Vec<Detection>) -> Self {
        Self {
            filename: filename.into(),
            rects,
        }
    }

    /// Checks every rect, reporting the first bad one.
    pub fn validate(&self) -> Result<(), PayloadError> {
        match self.rects.iter().position(|d| !d.is_valid()) {
            Some(index) => Err(PayloadError::InvalidRect {
                index,
                detection: self.rects[index],
            }),
            None => Ok(()),
        }
    }
}

/// Where the detector writes its results for `image_path`: same directory and
/// stem, `.json` extension.
pub fn detections_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("json")
}

pub fn parse(json: &str, path: &Path) -> Result<DetectionPayload, PayloadError> {
    let payload: DetectionPayload =
        serde_json::from_str(json).map_err(|source| PayloadError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    payload.validate()?;
    Ok(payload)
}

pub fn load(path: &Path) -> Result<DetectionPayload, PayloadError> {
    let data = std::fs::read_to_string(path).map_err(|source| PayloadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let payload = parse(&data, path)?;
    log::info!(
        "loaded {} detections from {}",
        payload.rects.len(),
        path.display()
    );
    Ok(payload)
}

pub fn save(path: &Path, payload: &DetectionPayload) -> Result<(), PayloadError> {
    let data = serde_json::to_string_pretty(payload).map_err(|source| PayloadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(|source| PayloadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("saved {} rects to {}", payload.rects.len(), path.display());
    Ok(())
}
