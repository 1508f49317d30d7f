use clap::Parser;
use detection_annotator::annotations::class_registry::ClassRegistry;
use detection_annotator::config::AppConfig;
use detection_annotator::logging::setup_logger;
use detection_annotator::object_detection::yolov11_bounding_box::Yolov11BoundingBox;
use detection_annotator::pipeline::{CancellationToken, ImagePipeline};
use detection_annotator::rendering::palette::Palette;
use detection_annotator::rendering::renderer::{AnnotationRenderer, load_font};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

/// Draws object detections onto images.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// JSON file listing the images, model and class names.
    #[arg(short, long, default_value = "annotate.json")]
    config: PathBuf,

    /// Log every prediction.
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    setup_logger();

    let mut config = AppConfig::load(&args.config)?;
    config.debug |= args.debug;

    let class_registry = Arc::new(ClassRegistry::load(&config.classes_path)?);
    let font = config.font_path.as_deref().map(load_font).transpose()?;
    if font.is_none() {
        log::warn!("No font_path configured, labels will be drawn without text");
    }
    let model = Yolov11BoundingBox::new(
        &config.model_path,
        Arc::clone(&class_registry),
        config.input_width,
        config.input_height,
        config.confidence_threshold,
    )?;
    let palette = Palette::for_registry(&class_registry, config.palette_seed);
    let renderer = AnnotationRenderer::new(class_registry, palette, config.style.clone(), font);
    let pipeline = ImagePipeline::new(model, renderer, config.debug);

    let jobs = config.jobs()?;
    log::info!("Annotating {} images", jobs.len());
    let outcomes = pipeline.run_batch(&jobs, &CancellationToken::new());

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        return Err(format!("{} of {} images failed", failed, outcomes.len()).into());
    }
    Ok(())
}
