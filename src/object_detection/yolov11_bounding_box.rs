use crate::annotations::bounding_box::CenterBox;
use crate::annotations::class_registry::{ClassIndex, ClassRegistry};
use crate::annotations::detection::Detection;
use crate::error::{DetectionError, ResourceLoadError};
use crate::image_utils::image_conversion::convert_rgb_image_to_model_input;
use crate::object_detection::object_detection_model::ObjectDetectionModel;
use crate::object_detection::ort_inference_session::OrtInferenceSession;
use image::RgbImage;
use ndarray::{ArrayView2, Axis};
use ort::inputs;
use ort::value::Tensor;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// A YOLOv11 detector exported to ONNX.
///
/// The session is guarded by a mutex since running it needs exclusive access, so concurrent
/// pipelines take turns on inference.
pub struct Yolov11BoundingBox {
    ort_session: Mutex<OrtInferenceSession>,
    class_registry: Arc<ClassRegistry>,
    input_width: u32,
    input_height: u32,
    confidence: f32,
}

impl Yolov11BoundingBox {
    pub fn new(
        model_path: &Path,
        class_registry: Arc<ClassRegistry>,
        input_width: u32,
        input_height: u32,
        confidence: f32,
    ) -> Result<Self, ResourceLoadError> {
        let ort_session = OrtInferenceSession::new(model_path)?;
        Ok(Yolov11BoundingBox {
            ort_session: Mutex::new(ort_session),
            class_registry,
            input_width,
            input_height,
            confidence,
        })
    }
}

impl ObjectDetectionModel for Yolov11BoundingBox {
    fn run_inference(&self, image: &RgbImage) -> Result<Vec<Detection>, DetectionError> {
        let input_array =
            convert_rgb_image_to_model_input(image, self.input_width, self.input_height);
        let (data, _offset) = input_array.into_raw_vec_and_offset();
        let input_tensor = Tensor::from_array((
            [1_usize, 3, self.input_height as usize, self.input_width as usize],
            data,
        ))
        .map_err(|e| DetectionError::Inference(e.to_string()))?;

        let mut ort_session = self
            .ort_session
            .lock()
            .map_err(|_| DetectionError::SessionPoisoned)?;
        let outputs = ort_session
            .session
            .run(inputs!["images" => input_tensor])
            .map_err(|e| DetectionError::Inference(e.to_string()))?;
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectionError::Inference(e.to_string()))?;

        // Expected shape: (1, 4 + number of classes, number of anchors).
        let dims: Vec<i64> = shape.iter().copied().collect();
        if dims.len() != 3 || dims[0] != 1 || dims[1] < 5 {
            return Err(DetectionError::OutputShape(dims));
        }
        let output = ArrayView2::from_shape((dims[1] as usize, dims[2] as usize), data)
            .map_err(|_| DetectionError::OutputShape(dims.clone()))?;
        let scale = (
            image.width() as f32 / self.input_width as f32,
            image.height() as f32 / self.input_height as f32,
        );
        decode_predictions(output, &self.class_registry, self.confidence, scale)
    }
}

/// Turns raw YOLO output into detections in source image pixels.
///
/// `output` has one row per attribute (`x, y, w, h`, then one score per class) and one column
/// per anchor. Each anchor keeps its best class if that score reaches `confidence`. NaN
/// scores never win, and anchors with a non-finite box are dropped.
pub fn decode_predictions(
    output: ArrayView2<f32>,
    class_registry: &ClassRegistry,
    confidence: f32,
    (scale_x, scale_y): (f32, f32),
) -> Result<Vec<Detection>, DetectionError> {
    let mut detections: Vec<Detection> = Vec::new();
    let output = output.t();
    for row in output.axis_iter(Axis(0)) {
        let best = row
            .iter()
            .skip(4) // skips bounding box coords.
            .copied()
            .enumerate()
            .filter(|(_, score)| !score.is_nan())
            .reduce(|accum, score| if score.1 > accum.1 { score } else { accum });
        let Some((class_id, prob)) = best else {
            continue;
        };
        if prob < confidence || !row.iter().take(4).all(|v| v.is_finite()) {
            continue;
        }
        let label = match class_registry.name(ClassIndex(class_id)) {
            Some(name) => name.to_string(),
            None => class_id.to_string(),
        };
        let bbox = CenterBox::new(
            (row[0] * scale_x).round() as i32,
            (row[1] * scale_y).round() as i32,
            (row[2] * scale_x).round().max(0.0) as i32,
            (row[3] * scale_y).round().max(0.0) as i32,
        );
        detections.push(Detection::new(label, prob.clamp(0.0, 1.0), bbox)?);
    }
    Ok(detections)
}
