use crate::error::ResourceLoadError;
use crate::rendering::color::Color;
use serde::{Deserialize, Serialize};

/// What to do with a detection whose label matches no known class.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedClassPolicy {
    /// Leave the detection out and log a warning.
    #[default]
    Skip,
    /// Fail the whole image.
    Fail,
}

/// Drawing parameters shared by every detection of a run.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct AnnotationStyle {
    /// Text size relative to the base face height.
    pub font_scale: f32,
    pub text_color: Color,
    /// Horizontal stroke weight of the label text.
    pub text_weight: f32,
    /// Width of the filled label tag. The tag does not grow with the label text.
    pub tag_width: u32,
    pub tag_height: u32,
    /// Distance between the box top and the text baseline.
    pub text_baseline_offset: i32,
    /// Stroke thickness is `thickness_factor * (height + width) / thickness_divisor`.
    pub thickness_factor: f32,
    pub thickness_divisor: f32,
    pub unresolved_class: UnresolvedClassPolicy,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        AnnotationStyle {
            font_scale: 0.5,
            text_color: Color::BLACK,
            text_weight: 1.5,
            tag_width: 110,
            tag_height: 15,
            text_baseline_offset: 2,
            thickness_factor: 0.6,
            thickness_divisor: 600.0,
            unresolved_class: UnresolvedClassPolicy::Skip,
        }
    }
}

impl AnnotationStyle {
    /// Rejects values that would make the stroke thickness or text size meaningless.
    pub fn validate(&self) -> Result<(), ResourceLoadError> {
        let positive = [
            ("style.font_scale", self.font_scale),
            ("style.text_weight", self.text_weight),
            ("style.thickness_factor", self.thickness_factor),
            ("style.thickness_divisor", self.thickness_divisor),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ResourceLoadError::InvalidSetting {
                    field,
                    reason: format!("must be a finite number above zero, got {}", value),
                });
            }
        }
        Ok(())
    }
}
