use crate::annotations::bounding_box::CenterBox;
use crate::error::AnnotationError;
use std::fmt;

/// A detection is what is produced as output from an object detection model.
///
/// It pairs a class label and a center-form box with a confidence score: a probability value
/// that encodes the model's belief that the detection is true. Renderers only read detections.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    label: String,
    confidence: f32,
    bbox: CenterBox,
}

impl Detection {
    /// Checks the box size and confidence before constructing.
    pub fn new(label: String, confidence: f32, bbox: CenterBox) -> Result<Self, AnnotationError> {
        if bbox.w < 0 || bbox.h < 0 {
            return Err(AnnotationError::NegativeSize { w: bbox.w, h: bbox.h });
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(AnnotationError::ConfidenceOutOfRange(confidence));
        }
        Ok(Detection { label, confidence, bbox })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn bbox(&self) -> &CenterBox {
        &self.bbox
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}) at {}", self.label, self.confidence, self.bbox)
    }
}
