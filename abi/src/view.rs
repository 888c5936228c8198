use serde::{Deserialize, Serialize};

use crate::draw::Color32;
use crate::entry::Entry;
use crate::flags::WheelFlags;

/// Fill and label color of one wedge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SliceColor {
    pub fill: Color32,
    pub text: Color32,
}

/// Everything the presentation layer needs to draw one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WheelView {
    pub visible_batch: Vec<Entry>,
    pub colors: Vec<SliceColor>,
    /// Unbounded rotation in degrees.
    pub rotation: f64,
    pub pointer_color: Color32,
    pub center_image: Option<String>,
    #[serde(skip)]
    pub flags: WheelFlags,
}

impl WheelView {
    pub fn is_spinning(&self) -> bool {
        self.flags.contains(WheelFlags::SPINNING)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Night,
    #[default]
    Normal,
    Light,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "night" | "dark" => Some(Theme::Night),
            "normal" => Some(Theme::Normal),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}

/// Center image size preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    S,
    #[default]
    M,
    L,
}

impl ImageSize {
    /// Diameter as a share of the wheel radius.
    pub fn radius_share(self) -> f64 {
        match self {
            ImageSize::S => 0.25,
            ImageSize::M => 0.35,
            ImageSize::L => 0.5,
        }
    }
}
