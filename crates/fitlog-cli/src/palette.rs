use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde::Deserialize;

static CONFIG: OnceLock<PaletteConfig> = OnceLock::new();

const DEFAULT_CYCLE: &[&str] = &[
    "#4F46E5", "#2563EB", "#0EA5E9", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaletteConfig {
    #[serde(default)]
    pub colors: ColorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColorsConfig {
    /// Lowercased category display name -> hex color.
    #[serde(default)]
    pub categories: HashMap<String, String>,
    /// Colors handed out by series position when a category has no entry above.
    #[serde(default = "default_cycle")]
    pub cycle: Vec<String>,
}

fn default_cycle() -> Vec<String> {
    DEFAULT_CYCLE.iter().map(|s| s.to_string()).collect()
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            categories: HashMap::new(),
            cycle: default_cycle(),
        }
    }
}

impl PaletteConfig {
    fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".fitlog.toml"))
    }

    pub fn load() -> &'static PaletteConfig {
        CONFIG.get_or_init(|| {
            Self::config_path()
                .and_then(|path| fs::read_to_string(path).ok())
                .and_then(|content| Self::from_toml(&content))
                .unwrap_or_default()
        })
    }

    pub fn from_toml(content: &str) -> Option<PaletteConfig> {
        match toml::from_str(content) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable ~/.fitlog.toml");
                None
            }
        }
    }

    /// Color for the category drawn at `series_index`.
    pub fn category_color(&self, display_name: &str, series_index: usize) -> Rgb {
        if let Some(color) = self
            .colors
            .categories
            .get(&display_name.to_lowercase())
            .and_then(|hex| parse_hex_color(hex))
        {
            return color;
        }

        let cycle: Vec<Rgb> = self
            .colors
            .cycle
            .iter()
            .filter_map(|hex| parse_hex_color(hex))
            .collect();
        if cycle.is_empty() {
            return Rgb(255, 255, 255);
        }
        cycle[series_index % cycle.len()]
    }
}

pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
    Some(Rgb(r, g, b))
}
