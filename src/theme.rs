//! Theme Module — the overlay palette.
//!
//! Responsibilities:
//! - Built-in dark (default) and light palettes
//! - JSON loading, with `#RRGGBB` strings or packed color integers
//! - Missing fields fall back to the dark palette

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;
use crate::types::rgb;

/// Colors every element draws with. Values use the packed color encoding
/// from [`crate::types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    #[serde(with = "hex_color")]
    pub primary: u32,
    #[serde(with = "hex_color")]
    pub secondary: u32,
    #[serde(with = "hex_color")]
    pub primary_text: u32,
    #[serde(with = "hex_color")]
    pub secondary_text: u32,
    #[serde(with = "hex_color")]
    pub border_light: u32,
    #[serde(with = "hex_color")]
    pub border_dark: u32,
    #[serde(with = "hex_color")]
    pub highlight: u32,
    #[serde(with = "hex_color")]
    pub error: u32,
    #[serde(with = "hex_color")]
    pub focus_ring: u32,
}

impl Theme {
    pub const fn dark() -> Self {
        Self {
            primary: rgb(76, 88, 68),
            secondary: rgb(62, 70, 55),
            primary_text: rgb(255, 255, 255),
            secondary_text: rgb(216, 222, 211),
            border_light: rgb(136, 145, 128),
            border_dark: rgb(40, 46, 34),
            highlight: rgb(150, 135, 50),
            error: rgb(255, 64, 64),
            focus_ring: rgb(255, 255, 255),
        }
    }

    pub const fn light() -> Self {
        Self {
            primary: rgb(236, 236, 228),
            secondary: rgb(250, 250, 246),
            primary_text: rgb(20, 20, 20),
            secondary_text: rgb(80, 84, 76),
            border_light: rgb(255, 255, 255),
            border_dark: rgb(140, 140, 132),
            highlight: rgb(246, 222, 120),
            error: rgb(200, 30, 30),
            focus_ring: rgb(0, 0, 0),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

mod hex_color {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Packed(u32),
        Hex(String),
    }

    pub fn serialize<S: Serializer>(color: &u32, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&format!("#{:06X}", color & 0x00FF_FFFF))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u32, D::Error> {
        match Repr::deserialize(d)? {
            Repr::Packed(v) => Ok(v),
            Repr::Hex(s) => {
                let digits = s.strip_prefix('#').unwrap_or(&s);
                if digits.len() != 6 {
                    return Err(serde::de::Error::custom(format!(
                        "expected #RRGGBB, got {s:?}"
                    )));
                }
                u32::from_str_radix(digits, 16)
                    .map(|v| 0x0100_0000 | v)
                    .map_err(serde::de::Error::custom)
            }
        }
    }
}
