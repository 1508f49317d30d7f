use crate::error::ResourceLoadError;
use crate::pipeline::ImageJob;
use crate::rendering::style::AnnotationStyle;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_INPUT_WIDTH: u32 = 640;
pub const DEFAULT_INPUT_HEIGHT: u32 = 640;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
pub const DEFAULT_OUTPUT_DIR: &str = "./data/samples";
pub const DEFAULT_OUTPUT_PREFIX: &str = "predicted";

/// File extensions picked up when an input entry is a directory.
const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Settings for one annotation run, read from a JSON file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Image files, or directories to search for images.
    pub images: Vec<PathBuf>,
    pub model_path: PathBuf,
    pub classes_path: PathBuf,
    /// Font for the label text. Labels are left out when unset.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
    #[serde(default = "default_input_width")]
    pub input_width: u32,
    #[serde(default = "default_input_height")]
    pub input_height: u32,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    /// Fixes which hue each class gets. A fresh assignment is drawn every run when unset.
    #[serde(default)]
    pub palette_seed: Option<u64>,
    /// Log every prediction.
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub style: AnnotationStyle,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_output_prefix() -> String {
    DEFAULT_OUTPUT_PREFIX.to_string()
}

fn default_input_width() -> u32 {
    DEFAULT_INPUT_WIDTH
}

fn default_input_height() -> u32 {
    DEFAULT_INPUT_HEIGHT
}

fn default_confidence_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

impl AppConfig {
    pub fn load(filepath: &Path) -> Result<Self, ResourceLoadError> {
        let contents = fs::read_to_string(filepath).map_err(|source| {
            ResourceLoadError::ConfigRead { path: filepath.to_path_buf(), source }
        })?;
        let config: AppConfig =
            serde_json::from_str(&contents).map_err(|source| ResourceLoadError::ConfigParse {
                path: filepath.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ResourceLoadError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ResourceLoadError::InvalidSetting {
                field: "confidence_threshold",
                reason: format!("must be within [0, 1], got {}", self.confidence_threshold),
            });
        }
        if self.input_width == 0 || self.input_height == 0 {
            return Err(ResourceLoadError::InvalidSetting {
                field: "input_width/input_height",
                reason: format!("must be non-zero, got {}x{}", self.input_width, self.input_height),
            });
        }
        self.style.validate()
    }

    /// Expands the configured inputs into image files, keeping the configured order.
    ///
    /// Directories are searched recursively and their images sorted by file name.
    pub fn input_images(&self) -> Result<Vec<PathBuf>, ResourceLoadError> {
        let mut images = Vec::new();
        for entry in &self.images {
            if !entry.is_dir() {
                images.push(entry.clone());
                continue;
            }
            for item in WalkDir::new(entry).sort_by_file_name() {
                let item = item.map_err(|source| ResourceLoadError::InputListing {
                    path: entry.clone(),
                    source,
                })?;
                if item.file_type().is_file() && has_image_extension(item.path()) {
                    images.push(item.into_path());
                }
            }
        }
        Ok(images)
    }

    /// One job per input image, written to `<output_dir>/<output_prefix><n>.png`.
    pub fn jobs(&self) -> Result<Vec<ImageJob>, ResourceLoadError> {
        Ok(self
            .input_images()?
            .into_iter()
            .enumerate()
            .map(|(i, input)| ImageJob {
                input,
                output: self
                    .output_dir
                    .join(format!("{}{}.png", self.output_prefix, i + 1)),
            })
            .collect())
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::style::UnresolvedClassPolicy;

    fn minimal_config() -> AppConfig {
        serde_json::from_str(
            r#"{
                "images": ["./data/samples/sample1.png", "./data/samples/sample2.png"],
                "model_path": "./data/models/yolo11n.onnx",
                "classes_path": "./data/classes/coco.names"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn defaults_are_filled_in() {
        let config = minimal_config();
        assert_eq!(config.output_dir, PathBuf::from("./data/samples"));
        assert_eq!(config.output_prefix, "predicted");
        assert_eq!((config.input_width, config.input_height), (640, 640));
        assert_eq!(config.confidence_threshold, 0.5);
        assert_eq!(config.palette_seed, None);
        assert!(!config.debug);
        assert_eq!(config.style, AnnotationStyle::default());
    }

    #[test]
    fn jobs_use_numbered_outputs() {
        let jobs = minimal_config().jobs().unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].input, PathBuf::from("./data/samples/sample1.png"));
        assert_eq!(jobs[0].output, PathBuf::from("./data/samples/predicted1.png"));
        assert_eq!(jobs[1].output, PathBuf::from("./data/samples/predicted2.png"));
    }

    #[test]
    fn style_section_is_parsed() {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "images": [],
                "model_path": "m.onnx",
                "classes_path": "c.names",
                "palette_seed": 7,
                "style": {"tag_width": 150, "unresolved_class": "fail"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.palette_seed, Some(7));
        assert_eq!(config.style.tag_width, 150);
        assert_eq!(config.style.unresolved_class, UnresolvedClassPolicy::Fail);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<AppConfig, _> = serde_json::from_str(
            r#"{"images": [], "model_path": "m", "classes_path": "c", "weights": "w"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn directories_are_expanded() {
        let dir = std::env::temp_dir().join("detection_annotator_config_inputs_test");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("b.png"), b"").unwrap();
        fs::write(dir.join("a.JPG"), b"").unwrap();
        fs::write(dir.join("notes.txt"), b"").unwrap();
        fs::write(dir.join("nested").join("c.bmp"), b"").unwrap();

        let mut config = minimal_config();
        config.images = vec![dir.clone()];
        let images = config.input_images().unwrap();
        fs::remove_dir_all(&dir).unwrap();

        let names: Vec<String> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.bmp"]);
    }

    #[test]
    fn sample_config_loads() {
        let config = AppConfig::load(Path::new("./annotate.json")).unwrap();
        assert_eq!(config.font_path, Some(PathBuf::from("./data/fonts/DejaVuSans.ttf")));
        assert_eq!(config.images.len(), 2);
    }

    #[test]
    fn zero_thickness_divisor_fails_to_load() {
        let path = std::env::temp_dir().join("detection_annotator_bad_style_test.json");
        fs::write(
            &path,
            r#"{
                "images": [],
                "model_path": "m.onnx",
                "classes_path": "c.names",
                "style": {"thickness_divisor": 0}
            }"#,
        )
        .unwrap();
        let result = AppConfig::load(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(
            result,
            Err(ResourceLoadError::InvalidSetting { field: "style.thickness_divisor", .. })
        ));
    }

    #[test]
    fn confidence_threshold_must_be_a_probability() {
        let mut config = minimal_config();
        config.confidence_threshold = f32::NAN;
        assert!(config.validate().is_err());
        config.confidence_threshold = 1.5;
        assert!(config.validate().is_err());
        config.confidence_threshold = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_is_a_load_error() {
        let result = AppConfig::load(Path::new("./does/not/exist.json"));
        assert!(matches!(result, Err(ResourceLoadError::ConfigRead { .. })));
    }
}
