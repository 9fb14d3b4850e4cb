//! Viewer settings

use serde::{Deserialize, Serialize};
use shared::Color;

/// Camera defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Initial distance from the target
    pub distance: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.01,
            far: 100.0,
            distance: 10.0,
        }
    }
}

/// Highlight colors for the two selection modes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSettings {
    pub click: Color,
    #[serde(rename = "box")]
    pub box_select: Color,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            click: Color::CLICK_HIGHLIGHT,
            box_select: Color::BOX_HIGHLIGHT,
        }
    }
}

/// Viewport appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub background_color: Color,
    /// Draw mesh name labels
    pub labels_visible: bool,
    /// Fraction of the view the model fills after loading
    pub fit_fill: f32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            background_color: Color::from_hex(0xDAE3E6),
            labels_visible: true,
            fit_fill: 0.8,
        }
    }
}

/// Model auto-rotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationSettings {
    /// Radians per frame around the Y axis
    pub speed: f32,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self { speed: 0.01 }
    }
}

/// All viewer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ViewerSettings {
    pub camera: CameraSettings,
    pub highlight: HighlightSettings,
    pub viewport: ViewportSettings,
    pub rotation: RotationSettings,
}

impl ViewerSettings {
    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
