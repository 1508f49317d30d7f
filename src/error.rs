use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the resources a run needs before any image is processed.
///
/// These are fatal: the whole batch is aborted.
#[derive(Debug, Error)]
pub enum ResourceLoadError {
    #[error("failed to read config file {path:?}: {source}")]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("failed to parse config file {path:?}: {source}")]
    ConfigParse { path: PathBuf, source: serde_json::Error },

    #[error("failed to read class list {path:?}: {source}")]
    ClassList { path: PathBuf, source: io::Error },

    #[error("class list {0:?} contains no class names")]
    EmptyClassList(PathBuf),

    #[error("class name {name:?} appears more than once (indices {first} and {second})")]
    DuplicateClass { name: String, first: usize, second: usize },

    #[error("model path does not exist, or cannot be read: {0:?}")]
    ModelMissing(PathBuf),

    #[error("failed to create inference session from {path:?}: {message}")]
    Model { path: PathBuf, message: String },

    #[error("failed to read font {path:?}: {source}")]
    FontRead { path: PathBuf, source: io::Error },

    #[error("font {0:?} is not a valid TrueType/OpenType font")]
    FontParse(PathBuf),

    #[error("failed to list input directory {path:?}: {source}")]
    InputListing { path: PathBuf, source: walkdir::Error },

    #[error("invalid config value for {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}

/// Failures when building a `Detection` from raw values.
#[derive(Debug, Error, PartialEq)]
pub enum AnnotationError {
    #[error("box size must be non-negative, got {w}x{h}")]
    NegativeSize { w: i32, h: i32 },

    #[error("confidence must be within [0, 1], got {0}")]
    ConfidenceOutOfRange(f32),
}

/// Failures raised by an object detection model.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("unexpected model output shape {0:?}")]
    OutputShape(Vec<i64>),

    #[error("inference session lock was poisoned")]
    SessionPoisoned,

    #[error(transparent)]
    Annotation(#[from] AnnotationError),
}

/// Failures while drawing the detections of one image.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("detection label {0:?} does not match any known class")]
    UnresolvedClass(String),

    #[error("no palette color for class index {0}")]
    MissingColor(usize),
}

/// Failures local to one image. These are reported per image and never stop the batch.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to decode {path:?}: {source}")]
    Decode { path: PathBuf, source: image::ImageError },

    #[error("detection failed for {path:?}: {source}")]
    Detection { path: PathBuf, source: DetectionError },

    #[error("rendering failed for {path:?}: {source}")]
    Render { path: PathBuf, source: RenderError },

    #[error("failed to create output directory {path:?}: {source}")]
    OutputDir { path: PathBuf, source: io::Error },

    #[error("failed to save {path:?}: {source}")]
    Encode { path: PathBuf, source: image::ImageError },

    #[error("processing of {0:?} was cancelled")]
    Cancelled(PathBuf),
}
