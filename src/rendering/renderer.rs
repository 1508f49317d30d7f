use crate::annotations::bounding_box::BoxCorners;
use crate::annotations::class_registry::{ClassLookup, ClassRegistry};
use crate::annotations::detection::Detection;
use crate::error::{RenderError, ResourceLoadError};
use crate::rendering::color::Color;
use crate::rendering::palette::Palette;
use crate::rendering::style::{AnnotationStyle, UnresolvedClassPolicy};
use ab_glyph::{FontArc, PxScale};
use image::RgbImage;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Pixel height of the label face at a font scale of 1.
const BASE_FACE_HEIGHT: f32 = 22.0;

/// Reads a TrueType/OpenType font for label text.
pub fn load_font(filepath: &Path) -> Result<FontArc, ResourceLoadError> {
    let bytes = fs::read(filepath).map_err(|source| ResourceLoadError::FontRead {
        path: filepath.to_path_buf(),
        source,
    })?;
    FontArc::try_from_vec(bytes).map_err(|_| ResourceLoadError::FontParse(filepath.to_path_buf()))
}

/// The text drawn in a detection's tag, e.g. `"dog: 0.87"`.
pub fn label_text(detection: &Detection) -> String {
    format!("{}: {:.2}", detection.label(), detection.confidence())
}

/// What a call to `render` did.
#[derive(Debug, Default, PartialEq)]
pub struct RenderSummary {
    pub drawn: usize,
    /// Labels of detections left out because they matched no class.
    pub skipped: Vec<String>,
}

struct PlannedAnnotation<'a> {
    detection: &'a Detection,
    color: Color,
}

/// Draws detections onto images: a box outline plus a filled tag with the label text.
///
/// Each class is drawn in its palette color. Detections are drawn in input order, so later
/// detections cover earlier ones where they overlap.
pub struct AnnotationRenderer {
    registry: Arc<ClassRegistry>,
    palette: Palette,
    style: AnnotationStyle,
    font: Option<FontArc>,
}

impl AnnotationRenderer {
    /// Without a font, boxes and tags are drawn but the label text is not.
    pub fn new(
        registry: Arc<ClassRegistry>,
        palette: Palette,
        style: AnnotationStyle,
        font: Option<FontArc>,
    ) -> Self {
        AnnotationRenderer { registry, palette, style, font }
    }

    /// Stroke thickness, scaled with the image resolution.
    pub fn stroke_thickness(&self, image_width: u32, image_height: u32) -> f32 {
        self.style.thickness_factor * (image_height + image_width) as f32
            / self.style.thickness_divisor
    }

    /// Annotates `image` in place.
    ///
    /// Every label is resolved before anything is drawn, so a failing image is never left
    /// half annotated.
    pub fn render(
        &self,
        image: &mut RgbImage,
        detections: &[Detection],
    ) -> Result<RenderSummary, RenderError> {
        let (plan, skipped) = self.plan(detections)?;
        // Rings further out than this never touch the canvas.
        let max_stroke = image.width().saturating_add(image.height()).max(1);
        let stroke = stroke_pixels(self.stroke_thickness(image.width(), image.height()))
            .min(max_stroke);
        for annotation in &plan {
            let corners = annotation.detection.bbox().corners();
            self.draw_outline(image, &corners, annotation.color, stroke);
            self.draw_tag(image, &corners, annotation.color);
            self.draw_label(image, &corners, &label_text(annotation.detection));
        }
        Ok(RenderSummary { drawn: plan.len(), skipped })
    }

    fn plan<'a>(
        &self,
        detections: &'a [Detection],
    ) -> Result<(Vec<PlannedAnnotation<'a>>, Vec<String>), RenderError> {
        let mut plan = Vec::with_capacity(detections.len());
        let mut skipped = Vec::new();
        for detection in detections {
            let index = match self.registry.resolve(detection.label()) {
                ClassLookup::Found(index) => index,
                ClassLookup::NotFound => match self.style.unresolved_class {
                    UnresolvedClassPolicy::Skip => {
                        log::warn!(
                            "Skipping detection with unknown class {:?}",
                            detection.label()
                        );
                        skipped.push(detection.label().to_string());
                        continue;
                    }
                    UnresolvedClassPolicy::Fail => {
                        return Err(RenderError::UnresolvedClass(detection.label().to_string()));
                    }
                },
            };
            let color = self
                .palette
                .get(index)
                .ok_or(RenderError::MissingColor(index.0))?;
            plan.push(PlannedAnnotation { detection, color });
        }
        Ok((plan, skipped))
    }

    /// Draws nested one pixel outlines centred on the box edge.
    fn draw_outline(&self, image: &mut RgbImage, corners: &BoxCorners, color: Color, stroke: u32) {
        let (width, height) = (image.width() as i64, image.height() as i64);
        let inset = (stroke as i64 - 1) / 2;
        for ring in 0..stroke as i64 {
            let grow = ring - inset;
            let left = corners.top_left.x as i64 - grow;
            let top = corners.top_left.y as i64 - grow;
            let right = corners.bottom_right.x as i64 + grow;
            let bottom = corners.bottom_right.y as i64 + grow;
            if right < left || bottom < top {
                continue;
            }
            if right < 0 || bottom < 0 || left >= width || top >= height {
                continue;
            }
            // Edges past the canvas are pulled in to just outside it, which keeps them hidden.
            let (left, top) = (left.max(-1), top.max(-1));
            let (right, bottom) = (right.min(width), bottom.min(height));
            let rect = Rect::at(left as i32, top as i32)
                .of_size((right - left + 1) as u32, (bottom - top + 1) as u32);
            draw_hollow_rect_mut(image, rect, color.to_rgb());
        }
    }

    /// Fills the fixed size tag sitting on the box's top-left corner.
    fn draw_tag(&self, image: &mut RgbImage, corners: &BoxCorners, color: Color) {
        let left = (corners.top_left.x as i64).max(0);
        let top = (corners.top_left.y as i64 - self.style.tag_height as i64).max(0);
        let right = (corners.top_left.x as i64 + self.style.tag_width as i64)
            .min(image.width() as i64 - 1);
        let bottom = (corners.top_left.y as i64).min(image.height() as i64 - 1);
        if right < left || bottom < top {
            return;
        }
        let rect = Rect::at(left as i32, top as i32)
            .of_size((right - left + 1) as u32, (bottom - top + 1) as u32);
        draw_filled_rect_mut(image, rect, color.to_rgb());
    }

    fn draw_label(&self, image: &mut RgbImage, corners: &BoxCorners, text: &str) {
        let Some(font) = &self.font else {
            log::debug!("No font configured, label {:?} not drawn", text);
            return;
        };
        let text_height = self.style.font_scale * BASE_FACE_HEIGHT;
        let scale = PxScale::from(text_height);
        let passes = (self.style.text_weight.round() as i64).max(1);
        let (text_w, text_h) = text_size(scale, font, text);
        let x = corners.top_left.x as i64;
        let baseline = corners.top_left.y as i64 - self.style.text_baseline_offset as i64;
        let top = baseline - text_height.round() as i64;
        if x >= image.width() as i64
            || top >= image.height() as i64
            || x + text_w as i64 + passes + 1 < 0
            || top + (text_h as i64).max(text_height.ceil() as i64) + 1 < 0
        {
            log::trace!("Label {:?} falls outside the image", text);
            return;
        }
        for dx in 0..passes {
            draw_text_mut(
                image,
                self.style.text_color.to_rgb(),
                (x + dx) as i32,
                top as i32,
                scale,
                font,
                text,
            );
        }
    }
}

/// Whole pixels for a stroke thickness, never less than one.
pub fn stroke_pixels(thickness: f32) -> u32 {
    (thickness.trunc() as u32).max(1)
}
