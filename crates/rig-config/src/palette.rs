//! Named display colours.
//!
//! Hosts that can only set indexed colours share this table; it is the least
//! common denominator across hosts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PaletteColor {
    /// Host colour index, 1..=31.
    pub index: u8,
    pub rgb: [f64; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ColorPalette {
    colors: BTreeMap<String, PaletteColor>,
}

impl ColorPalette {
    pub fn empty() -> Self {
        Self {
            colors: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<PaletteColor> {
        self.colors.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, color: PaletteColor) {
        self.colors.insert(name.into(), color);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PaletteColor)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

const STOCK_COLORS: [(&str, u8, [f64; 3]); 31] = [
    ("black", 1, [0.00, 0.00, 0.0]),
    ("lightGrey", 2, [0.75, 0.75, 0.75]),
    ("darkGrey", 3, [0.50, 0.50, 0.50]),
    ("fusia", 4, [0.80, 0.00, 0.20]),
    ("blueDark", 5, [0.00, 0.00, 0.40]),
    ("blue", 6, [0.00, 0.00, 1.00]),
    ("green", 7, [0.00, 0.30, 0.00]),
    ("purpleDark", 8, [0.20, 0.00, 0.30]),
    ("magenta", 9, [0.80, 0.00, 0.80]),
    ("brownLight", 10, [0.60, 0.30, 0.20]),
    ("brownDark", 11, [0.25, 0.13, 0.13]),
    ("orange", 12, [0.70, 0.20, 0.00]),
    ("red", 13, [1.00, 0.00, 0.00]),
    ("greenBright", 14, [0.00, 1.00, 0.00]),
    ("blueMedium", 15, [0.00, 0.30, 0.60]),
    ("white", 16, [1.00, 1.00, 1.00]),
    ("yellow", 17, [1.00, 1.00, 0.00]),
    ("greenBlue", 18, [0.00, 1.00, 1.00]),
    ("turqoise", 19, [0.00, 1.00, 0.80]),
    ("pink", 20, [1.00, 0.70, 0.70]),
    ("peach", 21, [0.90, 0.70, 0.50]),
    ("yellowLight", 22, [1.00, 1.00, 0.40]),
    ("turqoiseDark", 23, [0.00, 0.70, 0.40]),
    ("brownMuted", 24, [0.60, 0.40, 0.20]),
    ("yellowMuted", 25, [0.63, 0.63, 0.17]),
    ("greenMuted", 26, [0.40, 0.60, 0.20]),
    ("turqoiseMuted", 27, [0.20, 0.63, 0.35]),
    ("blueLightMuted", 28, [0.18, 0.63, 0.63]),
    ("blueDarkMuted", 29, [0.18, 0.40, 0.63]),
    ("purpleLight", 30, [0.43, 0.18, 0.63]),
    ("mutedMagenta", 31, [0.63, 0.18, 0.40]),
];

impl Default for ColorPalette {
    fn default() -> Self {
        let colors = STOCK_COLORS
            .iter()
            .map(|&(name, index, rgb)| (name.to_string(), PaletteColor { index, rgb }))
            .collect();
        Self { colors }
    }
}
