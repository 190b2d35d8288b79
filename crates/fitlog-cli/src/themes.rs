use fitlog_core::IntensityTier;

use crate::palette::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeName {
    Green,
    Blue,
    Orange,
    Purple,
    Monochrome,
}

impl ThemeName {
    pub fn all() -> &'static [ThemeName] {
        &[
            ThemeName::Green,
            ThemeName::Blue,
            ThemeName::Orange,
            ThemeName::Purple,
            ThemeName::Monochrome,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Green => "green",
            ThemeName::Blue => "blue",
            ThemeName::Orange => "orange",
            ThemeName::Purple => "purple",
            ThemeName::Monochrome => "monochrome",
        }
    }
}

impl std::str::FromStr for ThemeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeName::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s.to_lowercase())
            .ok_or_else(|| {
                let names: Vec<&str> = ThemeName::all().iter().map(|t| t.as_str()).collect();
                format!("unknown theme '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

/// Heatmap colors, one per intensity tier.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    pub tiers: [Rgb; 5],
    pub muted: Rgb,
}

impl Theme {
    pub fn from_name(name: ThemeName) -> Self {
        let tiers = match name {
            ThemeName::Green => [
                Rgb(22, 27, 34),
                Rgb(14, 68, 41),
                Rgb(0, 109, 50),
                Rgb(38, 166, 65),
                Rgb(57, 211, 83),
            ],
            ThemeName::Blue => [
                Rgb(22, 27, 34),
                Rgb(14, 41, 68),
                Rgb(0, 50, 109),
                Rgb(38, 65, 166),
                Rgb(57, 83, 211),
            ],
            ThemeName::Orange => [
                Rgb(22, 27, 34),
                Rgb(68, 41, 14),
                Rgb(109, 50, 0),
                Rgb(166, 65, 38),
                Rgb(211, 83, 57),
            ],
            ThemeName::Purple => [
                Rgb(22, 27, 34),
                Rgb(41, 14, 68),
                Rgb(50, 0, 109),
                Rgb(65, 38, 166),
                Rgb(83, 57, 211),
            ],
            ThemeName::Monochrome => [
                Rgb(22, 27, 34),
                Rgb(50, 55, 62),
                Rgb(80, 85, 92),
                Rgb(140, 145, 152),
                Rgb(200, 205, 212),
            ],
        };

        Self {
            name,
            tiers,
            muted: Rgb(139, 148, 158),
        }
    }

    pub fn tier_color(&self, tier: IntensityTier) -> Rgb {
        self.tiers[tier.level() as usize]
    }
}
