use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;

/// Resizes an image to the model input size and lays it out as a `(1, 3, height, width)`
/// tensor with channel values scaled to `[0, 1]`.
pub fn convert_rgb_image_to_model_input(
    rgb_image: &RgbImage,
    input_width: u32,
    input_height: u32,
) -> Array4<f32> {
    let resized = if rgb_image.dimensions() == (input_width, input_height) {
        rgb_image.clone()
    } else {
        imageops::resize(rgb_image, input_width, input_height, FilterType::Triangle)
    };
    let mut image_array =
        Array4::zeros((1, 3, input_height as usize, input_width as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        let [r, g, b] = pixel.0;
        image_array[[0, 0, y, x]] = (r as f32) / 255.;
        image_array[[0, 1, y, x]] = (g as f32) / 255.;
        image_array[[0, 2, y, x]] = (b as f32) / 255.;
    }
    image_array
}
