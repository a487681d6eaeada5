//! Review and correct detected part rectangles over a photo.
//!
//! The [`engine`] module is the interaction core and has no UI dependency;
//! [`app`] wires it to an eframe window.

pub mod app;
pub mod camera;
pub mod cli;
pub mod config;
pub mod detector;
pub mod engine;
pub mod geometry;
pub mod gesture;
pub mod payload;
pub mod stats;
pub mod store;
pub mod warning;

pub use app::{AnnotateApp, SessionPaths};
pub use config::AnnotatorConfig;
pub use engine::{AnnotationEngine, CornerOutcome, EngineEvent, InteractionMode, KeyCommand};
pub use geometry::{normalize_rect, Point, Rect};
pub use payload::{Detection, DetectionPayload};
pub use store::{RectId, RectangleStore};
