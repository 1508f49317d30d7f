use crate::error::PipelineError;
use image::{self, ImageFormat, RgbImage};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Decodes an image file into an RGB8 pixel buffer.
pub fn read_image_as_rgb8(filepath: &Path) -> Result<RgbImage, PipelineError> {
    image::open(filepath)
        .map(|img| img.into_rgb8())
        .map_err(|source| PipelineError::Decode { path: filepath.to_path_buf(), source })
}

/// Appends `.png` unless the path already ends with it.
pub fn with_png_extension(filepath: &Path) -> PathBuf {
    if filepath.to_string_lossy().ends_with(".png") {
        return filepath.to_path_buf();
    }
    let mut name = OsString::from(filepath.as_os_str());
    name.push(".png");
    PathBuf::from(name)
}

/// Encodes the annotated image as PNG, creating the parent directory when needed.
///
/// Returns the path actually written.
pub fn write_annotated_image(image: &RgbImage, save_path: &Path) -> Result<PathBuf, PipelineError> {
    let save_path = with_png_extension(save_path);
    if let Some(parent) = save_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PipelineError::OutputDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    image
        .save_with_format(&save_path, ImageFormat::Png)
        .map_err(|source| PipelineError::Encode { path: save_path.clone(), source })?;
    Ok(save_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn png_extension_is_appended_once() {
        assert_eq!(
            with_png_extension(Path::new("./data/samples/predicted1")),
            PathBuf::from("./data/samples/predicted1.png")
        );
        assert_eq!(
            with_png_extension(Path::new("out/predicted1.png")),
            PathBuf::from("out/predicted1.png")
        );
        assert_eq!(
            with_png_extension(Path::new("out/photo.jpg")),
            PathBuf::from("out/photo.jpg.png")
        );
    }

    #[test]
    fn write_then_read_keeps_pixels() {
        let dir = std::env::temp_dir().join("detection_annotator_image_io_test");
        let mut img = RgbImage::from_pixel(3, 3, Rgb([255, 255, 255]));
        img.put_pixel(0, 1, Rgb([255, 0, 0]));
        img.put_pixel(1, 1, Rgb([0, 255, 0]));
        img.put_pixel(2, 1, Rgb([0, 0, 255]));

        let written = write_annotated_image(&img, &dir.join("annotated")).unwrap();
        assert_eq!(written, dir.join("annotated.png"));
        let read_back = read_image_as_rgb8(&written).unwrap();
        fs::remove_dir_all(&dir).unwrap();
        assert_eq!(read_back, img);
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let path = std::env::temp_dir().join("detection_annotator_corrupt_test.png");
        fs::write(&path, b"definitely not a png").unwrap();
        let result = read_image_as_rgb8(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(PipelineError::Decode { .. })));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let result = read_image_as_rgb8(Path::new("./data/does_not_exist.png"));
        assert!(matches!(result, Err(PipelineError::Decode { .. })));
    }
}
