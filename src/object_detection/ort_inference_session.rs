use crate::error::ResourceLoadError;
use ort::session::Session;
use std::path::Path;

/// An onnxruntime inference session.
///
/// The object detection models in this project are wrappers around an ONNX inference
/// session that handles running the model on hardware.
pub struct OrtInferenceSession {
    pub session: Session,
}

impl OrtInferenceSession {
    pub fn new(model_path: &Path) -> Result<Self, ResourceLoadError> {
        if !model_path.exists() {
            return Err(ResourceLoadError::ModelMissing(model_path.to_path_buf()));
        }
        let to_error = |e: &dyn std::fmt::Display| ResourceLoadError::Model {
            path: model_path.to_path_buf(),
            message: e.to_string(),
        };
        let session = Session::builder()
            .map_err(|e| to_error(&e))?
            .commit_from_file(model_path)
            .map_err(|e| to_error(&e))?;
        Ok(Self { session })
    }
}
