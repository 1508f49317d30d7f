use crate::annotations::detection::Detection;
use crate::error::DetectionError;
use image::RgbImage;

/// Defines a trait that all object detection models must follow.
///
/// Models are shared by the pipelines of a batch, which may run on several threads at once.
/// Detections are returned in the order the model produced them, with boxes in the pixel
/// coordinates of `image`.
pub trait ObjectDetectionModel: Sync {
    fn run_inference(&self, image: &RgbImage) -> Result<Vec<Detection>, DetectionError>;
}
