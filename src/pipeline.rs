use crate::error::PipelineError;
use crate::image_utils::image_io::{read_image_as_rgb8, write_annotated_image};
use crate::object_detection::object_detection_model::ObjectDetectionModel;
use crate::rendering::renderer::{AnnotationRenderer, RenderSummary};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shared flag that stops pipelines at their next stage boundary.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One image to annotate and where to save the result.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug)]
pub struct SavedImage {
    pub path: PathBuf,
    pub summary: RenderSummary,
}

/// The result of one job. Failures stay local to their image.
#[derive(Debug)]
pub struct ImageOutcome {
    pub job: ImageJob,
    pub result: Result<SavedImage, PipelineError>,
}

/// Decode, detect, render and encode, one image at a time per call.
pub struct ImagePipeline<M: ObjectDetectionModel> {
    model: M,
    renderer: AnnotationRenderer,
    debug: bool,
}

impl<M: ObjectDetectionModel> ImagePipeline<M> {
    pub fn new(model: M, renderer: AnnotationRenderer, debug: bool) -> Self {
        ImagePipeline { model, renderer, debug }
    }

    /// Runs every job, in parallel, and returns the outcomes in job order.
    ///
    /// Each outcome is logged as it completes.
    pub fn run_batch(&self, jobs: &[ImageJob], cancel: &CancellationToken) -> Vec<ImageOutcome> {
        jobs.par_iter()
            .map(|job| {
                let result = self.process(job, cancel);
                match &result {
                    Ok(saved) => log::info!("Image saved at {}", saved.path.display()),
                    Err(e) => log::error!("{}", e),
                }
                ImageOutcome { job: job.clone(), result }
            })
            .collect()
    }

    /// Annotates one image. The pixel buffer lives only for the duration of this call.
    pub fn process(
        &self,
        job: &ImageJob,
        cancel: &CancellationToken,
    ) -> Result<SavedImage, PipelineError> {
        check_cancelled(job, cancel)?;
        let mut image = read_image_as_rgb8(&job.input)?;

        check_cancelled(job, cancel)?;
        let detections = self
            .model
            .run_inference(&image)
            .map_err(|source| PipelineError::Detection { path: job.input.clone(), source })?;
        if self.debug {
            log::info!("Predictions for {}:", job.input.display());
            for detection in &detections {
                log::info!("  {}", detection);
            }
        } else {
            log::debug!("{} predictions for {}", detections.len(), job.input.display());
        }

        check_cancelled(job, cancel)?;
        let summary = self
            .renderer
            .render(&mut image, &detections)
            .map_err(|source| PipelineError::Render { path: job.input.clone(), source })?;

        check_cancelled(job, cancel)?;
        let path = write_annotated_image(&image, &job.output)?;
        Ok(SavedImage { path, summary })
    }
}

fn check_cancelled(job: &ImageJob, cancel: &CancellationToken) -> Result<(), PipelineError> {
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled(job.input.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::bounding_box::CenterBox;
    use crate::annotations::class_registry::{ClassIndex, ClassRegistry};
    use crate::annotations::detection::Detection;
    use crate::error::{DetectionError, RenderError};
    use crate::rendering::color::Color;
    use crate::rendering::palette::Palette;
    use crate::rendering::style::{AnnotationStyle, UnresolvedClassPolicy};
    use image::{Rgb, RgbImage};
    use std::fs;
    use std::path::Path;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const GREEN: Color = Color { r: 0, g: 255, b: 0 };

    /// Returns the same detections for every image, and fails on images 13 pixels wide.
    struct FixedDetections(Vec<Detection>);

    impl ObjectDetectionModel for FixedDetections {
        fn run_inference(&self, image: &RgbImage) -> Result<Vec<Detection>, DetectionError> {
            if image.width() == 13 {
                return Err(DetectionError::Inference("model exploded".to_string()));
            }
            Ok(self.0.clone())
        }
    }

    fn pipeline(label: &str, style: AnnotationStyle) -> ImagePipeline<FixedDetections> {
        let registry = ClassRegistry::new(vec!["cat".to_string(), "dog".to_string()]).unwrap();
        let palette = Palette::from_assignments([
            (ClassIndex(0), Color::new(255, 0, 0)),
            (ClassIndex(1), GREEN),
        ]);
        let renderer = AnnotationRenderer::new(Arc::new(registry), palette, style, None);
        let detection =
            Detection::new(label.to_string(), 0.9, CenterBox::new(50, 50, 20, 20)).unwrap();
        ImagePipeline::new(FixedDetections(vec![detection]), renderer, false)
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("detection_annotator_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_blank(path: &Path, width: u32) {
        RgbImage::from_pixel(width, 100, WHITE).save(path).unwrap();
    }

    #[test]
    fn bad_image_does_not_stop_the_batch() {
        let dir = scratch_dir("batch_decode_test");
        write_blank(&dir.join("sample1.png"), 100);
        fs::write(dir.join("sample2.png"), b"not an image").unwrap();
        write_blank(&dir.join("sample3.png"), 100);
        let jobs: Vec<ImageJob> = (1..=3)
            .map(|i| ImageJob {
                input: dir.join(format!("sample{}.png", i)),
                output: dir.join("out").join(format!("predicted{}", i)),
            })
            .collect();

        let outcomes = pipeline("dog ", AnnotationStyle::default())
            .run_batch(&jobs, &CancellationToken::new());

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[1].result, Err(PipelineError::Decode { .. })));
        for i in [0, 2] {
            let saved = outcomes[i].result.as_ref().unwrap();
            assert_eq!(saved.path, dir.join("out").join(format!("predicted{}.png", i + 1)));
            assert_eq!(saved.summary.drawn, 1);
            let annotated = read_image_as_rgb8(&saved.path).unwrap();
            assert_eq!(*annotated.get_pixel(40, 50), GREEN.to_rgb());
            assert_eq!(*annotated.get_pixel(50, 50), WHITE);
        }
        assert!(!dir.join("out").join("predicted2.png").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn detection_failure_is_reported_per_image() {
        let dir = scratch_dir("batch_detect_test");
        write_blank(&dir.join("small.png"), 13);
        write_blank(&dir.join("large.png"), 100);
        let jobs = vec![
            ImageJob { input: dir.join("small.png"), output: dir.join("small_out") },
            ImageJob { input: dir.join("large.png"), output: dir.join("large_out") },
        ];

        let outcomes =
            pipeline("cat", AnnotationStyle::default()).run_batch(&jobs, &CancellationToken::new());

        assert!(matches!(outcomes[0].result, Err(PipelineError::Detection { .. })));
        assert!(outcomes[1].result.is_ok());
        assert!(dir.join("large_out.png").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unresolved_class_fails_the_image_when_configured() {
        let dir = scratch_dir("batch_unresolved_test");
        write_blank(&dir.join("sample.png"), 100);
        let job = ImageJob { input: dir.join("sample.png"), output: dir.join("predicted") };
        let style = AnnotationStyle {
            unresolved_class: UnresolvedClassPolicy::Fail,
            ..AnnotationStyle::default()
        };

        let result = pipeline("horse", style).process(&job, &CancellationToken::new());

        match result {
            Err(PipelineError::Render { source, .. }) => {
                assert_eq!(source, RenderError::UnresolvedClass("horse".to_string()));
            }
            other => panic!("expected a render error, got {:?}", other),
        }
        assert!(!dir.join("predicted.png").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn cancelled_jobs_do_nothing() {
        let dir = scratch_dir("batch_cancel_test");
        write_blank(&dir.join("sample.png"), 100);
        let jobs = vec![ImageJob { input: dir.join("sample.png"), output: dir.join("predicted") }];
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcomes = pipeline("cat", AnnotationStyle::default()).run_batch(&jobs, &cancel);

        assert!(matches!(outcomes[0].result, Err(PipelineError::Cancelled(_))));
        assert!(!dir.join("predicted.png").exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
