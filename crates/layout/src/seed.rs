//! The shared positional seed.
//!
//! `seed(x, z) = fract(sin(x * 12.9898 + z * 78.233) * 43758.5453)`
//!
//! Placement of the special entity and the renderer's choice of face
//! behaviour both key off this value for the same world position, so every
//! layout-affecting decision must call [`seed`] rather than re-deriving it.
//!
//! # Numeric tolerance
//! The CPU evaluates in `f64`. A GPU evaluating the same expression in
//! single precision (or another runtime using a different `sin`) can differ
//! by a few ULPs before the large multiplier amplifies the gap, so values
//! very close to a threshold may classify differently on the two sides. This
//! is an accepted fidelity risk; the CPU result is authoritative for
//! placement.

const DOT_X: f64 = 12.9898;
const DOT_Z: f64 = 78.233;
const SCALE: f64 = 43758.5453;

/// Deterministic pseudo-random value in `[0, 1)` for a world position.
///
/// Not cryptographic. Non-finite inputs produce `0.0`.
pub fn seed(x: f32, z: f32) -> f64 {
    let dot = f64::from(x) * DOT_X + f64::from(z) * DOT_Z;
    let product = dot.sin() * SCALE;
    let fract = product - product.floor();
    // A tiny negative product rounds to exactly 1.0 after the subtraction,
    // and NaN falls through both comparisons.
    if (0.0..1.0).contains(&fract) {
        fract
    } else {
        0.0
    }
}

/// Behaviour class the renderer picks for a building face from its seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceMode {
    /// Static text with a pulsing glow.
    Pulse,
    /// Static text with blinking selection rows.
    Select,
    /// Scrolling text, fast.
    ScrollFast,
    /// Scrolling text, slow.
    ScrollSlow,
}

impl FaceMode {
    pub fn from_seed(value: f64) -> Self {
        if value < 0.20 {
            Self::Pulse
        } else if value < 0.45 {
            Self::Select
        } else if value < 0.65 {
            Self::ScrollFast
        } else {
            Self::ScrollSlow
        }
    }

    pub fn at(x: f32, z: f32) -> Self {
        Self::from_seed(seed(x, z))
    }

    /// Static faces never scroll; the special entity must carry one.
    pub fn is_static(self) -> bool {
        matches!(self, Self::Pulse | Self::Select)
    }
}
