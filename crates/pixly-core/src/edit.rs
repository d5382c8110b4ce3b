//! Edit parameters shared by the edit, preview and upload pages.
//!
//! Values travel between pages as plain form/query strings (`tone=sepia`),
//! so every enum round-trips through [`FromStr`] and [`fmt::Display`]
//! using its lowercase form value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Color treatment applied to the whole image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Original,
    Grayscale,
    Sepia,
    Warm,
    Cool,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Original,
        Tone::Grayscale,
        Tone::Sepia,
        Tone::Warm,
        Tone::Cool,
    ];

    /// Form value used in selects and query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Original => "original",
            Tone::Grayscale => "grayscale",
            Tone::Sepia => "sepia",
            Tone::Warm => "warm",
            Tone::Cool => "cool",
        }
    }

    /// Human-readable label for select options.
    pub fn label(&self) -> &'static str {
        match self {
            Tone::Original => "Original",
            Tone::Grayscale => "Black & White",
            Tone::Sepia => "Sepia",
            Tone::Warm => "Warm",
            Tone::Cool => "Cool",
        }
    }
}

/// Frame drawn around the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Border {
    #[default]
    None,
    Thin,
    Thick,
}

impl Border {
    pub const ALL: [Border; 3] = [Border::None, Border::Thin, Border::Thick];

    /// Border width in pixels on each side.
    pub fn width_px(&self) -> u32 {
        match self {
            Border::None => 0,
            Border::Thin => 10,
            Border::Thick => 30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Border::None => "none",
            Border::Thin => "thin",
            Border::Thick => "thick",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Border::None => "No border",
            Border::Thin => "Thin",
            Border::Thick => "Thick",
        }
    }
}

/// Output size variant chosen on the preview page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    Small,
    Medium,
    Large,
    #[default]
    Original,
}

impl ImageSize {
    pub const ALL: [ImageSize; 4] = [
        ImageSize::Small,
        ImageSize::Medium,
        ImageSize::Large,
        ImageSize::Original,
    ];

    /// Target width in pixels for this variant, or `None` for original.
    pub fn target_width(&self) -> Option<u32> {
        match self {
            ImageSize::Small => Some(300),
            ImageSize::Medium => Some(600),
            ImageSize::Large => Some(1200),
            ImageSize::Original => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Small => "small",
            ImageSize::Medium => "medium",
            ImageSize::Large => "large",
            ImageSize::Original => "original",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImageSize::Small => "Small (300px)",
            ImageSize::Medium => "Medium (600px)",
            ImageSize::Large => "Large (1200px)",
            ImageSize::Original => "Original size",
        }
    }
}

macro_rules! form_value_impls {
    ($($ty:ident => $what:literal),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl FromStr for $ty {
                type Err = Error;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    let wanted = s.trim().to_lowercase();
                    Self::ALL
                        .iter()
                        .copied()
                        .find(|v| v.as_str() == wanted)
                        .ok_or_else(|| Error::Validation(format!("Unknown {} '{}'", $what, s)))
                }
            }
        )+
    };
}

form_value_impls! {
    Tone => "tone",
    Border => "border",
    ImageSize => "image size",
}

/// The full set of adjustments for one edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EditParams {
    pub tone: Tone,
    pub border: Border,
    pub size: ImageSize,
}

impl EditParams {
    /// Parse optional form/query values; absent or blank values fall back
    /// to the "no adjustment" default.
    pub fn parse(
        tone: Option<&str>,
        border: Option<&str>,
        size: Option<&str>,
    ) -> crate::Result<Self> {
        fn field<T: FromStr<Err = Error> + Default>(v: Option<&str>) -> crate::Result<T> {
            match v.map(str::trim) {
                None | Some("") => Ok(T::default()),
                Some(s) => s.parse(),
            }
        }

        Ok(Self {
            tone: field(tone)?,
            border: field(border)?,
            size: field(size)?,
        })
    }

    /// Whether applying these parameters leaves the image untouched.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Query string carrying these parameters, without the leading `?`.
    pub fn to_query(&self) -> String {
        format!("tone={}&border={}&size={}", self.tone, self.border, self.size)
    }
}
