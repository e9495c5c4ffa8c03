use rand::Rng;
use serde::{Deserialize, Serialize};

/// Base colour of each theme band, left to right across the grid.
pub const NEON_THEMES: [Rgb; 3] = [
    Rgb::from_hex(0xc692ff), // lilac
    Rgb::from_hex(0x98fce8), // aqua
    Rgb::from_hex(0x4d8dff), // sky blue
];

/// Edge colour of the special entity.
pub const SPECIAL_EDGE: Rgb = Rgb::from_hex(0xab49e3);
pub const BACKGROUND: Rgb = Rgb::from_hex(0x050510);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: (hex >> 16) as u8,
            g: (hex >> 8) as u8,
            b: hex as u8,
        }
    }

    pub fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Linear `[0, 1]` components for shader uniforms.
    pub fn to_linear(self) -> [f32; 3] {
        [self.r, self.g, self.b].map(|c| c as f32 / 255.0)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

/// Colours and opacity of one building material variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    pub primary: Rgb,
    /// Accent colours drawn from the other themes.
    pub secondary: Rgb,
    pub tertiary: Rgb,
    pub edge: Rgb,
    pub edge_opacity: f32,
}

/// Material variants bucketed by theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    themes: Vec<Vec<MaterialSpec>>,
}

impl Palette {
    /// Build `variants` materials per theme. Each variant takes the theme's
    /// colour as primary and two distinct other theme colours, in random
    /// order, as accents.
    pub fn generate<R: Rng + ?Sized>(theme_count: u32, variants: u32, rng: &mut R) -> Self {
        let base = |i: usize| NEON_THEMES[i % NEON_THEMES.len()];
        let themes = (0..theme_count as usize)
            .map(|theme| {
                (0..variants)
                    .map(|_| {
                        let mut others: Vec<usize> =
                            (0..theme_count as usize).filter(|&i| i != theme).collect();
                        let mut accent = || {
                            if others.is_empty() {
                                base(theme)
                            } else {
                                base(others.swap_remove(rng.gen_range(0..others.len())))
                            }
                        };
                        let secondary = accent();
                        let tertiary = accent();
                        MaterialSpec {
                            primary: base(theme),
                            secondary,
                            tertiary,
                            edge: base(theme),
                            edge_opacity: 0.4,
                        }
                    })
                    .collect()
            })
            .collect();
        Self { themes }
    }

    pub fn material(&self, theme: u32, variant: u32) -> Option<&MaterialSpec> {
        self.themes.get(theme as usize)?.get(variant as usize)
    }

    pub fn theme_count(&self) -> usize {
        self.themes.len()
    }

    /// Material for the special entity: its cell's colours with the special
    /// edge highlight.
    pub fn special(&self, theme: u32, variant: u32) -> Option<MaterialSpec> {
        self.material(theme, variant).map(|m| MaterialSpec {
            edge: SPECIAL_EDGE,
            edge_opacity: 0.8,
            ..*m
        })
    }
}
