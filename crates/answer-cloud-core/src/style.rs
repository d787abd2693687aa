//! Font sizing, style tiers, colors, and per-rank rotation.
//!
//! Every function here is pure and deterministic: the same frequency and rank
//! always produce the same size, tier, color, and angle.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default font size range in pixels, `[min, max]`.
pub const DEFAULT_SIZE_RANGE: [f64; 2] = [20.0, 56.0];

/// Default relative-scaling coefficient (α).
pub const DEFAULT_RELATIVE_SCALING: f64 = 0.5;

/// Maximum rotation magnitude in degrees.
pub const MAX_ROTATION_DEGREES: f64 = 10.0;

/// Seconds between successive words in the staggered reveal.
pub const ANIMATION_STEP_SECONDS: f64 = 0.05;

/// Grayscale palette: four high-frequency, four mid, four low.
pub const PALETTE: [&str; 12] = [
    "#121212", "#2A2A2A", "#3D3D3D", "#4F4F4F", // high
    "#696969", "#808080", "#A9A9A9", "#C0C0C0", // mid
    "#D3D3D3", "#DCDCDC", "#E8E8E8", "#F0F0F0", // low
];

/// Font size for a word with normalized frequency `ratio`.
///
/// `size = min + r·α·(max − min) + (1 − α)·(max − min)·(1 − r)`
///
/// The first term follows frequency and the second its complement; α weights
/// the two. At the default α = 0.5 the terms balance and every word gets the
/// midpoint of the range.
pub fn font_size(ratio: f64, size_range: [f64; 2], relative_scaling: f64) -> f64 {
    let [min, max] = size_range;
    let span = max - min;
    let r = ratio.clamp(0.0, 1.0);
    let alpha = relative_scaling;
    (1.0 - alpha).mul_add(span * (1.0 - r), (r * alpha).mul_add(span, min))
}

/// Visual weight class of a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StyleTier {
    /// Normalized frequency ≥ 0.8.
    Large,
    /// Normalized frequency ≥ 0.5.
    Medium,
    /// Everything else.
    Small,
}

impl StyleTier {
    /// Tier for a normalized frequency.
    pub fn from_frequency(ratio: f64) -> Self {
        if ratio >= 0.8 {
            Self::Large
        } else if ratio >= 0.5 {
            Self::Medium
        } else {
            Self::Small
        }
    }

    /// CSS class name used by the presentation layer.
    pub const fn class_name(&self) -> &'static str {
        match self {
            Self::Large => "word-tag-large",
            Self::Medium => "word-tag-medium",
            Self::Small => "word-tag-small",
        }
    }

    const fn palette_offset(self) -> usize {
        match self {
            Self::Large => 0,
            Self::Medium => 4,
            Self::Small => 8,
        }
    }
}

/// Color for a word: the tier's four-color band, cycled by rank.
pub fn word_color(ratio: f64, rank: usize) -> &'static str {
    PALETTE[StyleTier::from_frequency(ratio).palette_offset() + rank % 4]
}

/// Rotation in degrees for the word at `rank`.
///
/// `sin(rank × 2.3) × 10`, so angles stay within ±10° and never repeat in a
/// short run. Rank 0 is always upright.
pub fn rotation_for_rank(rank: usize) -> f64 {
    if rank == 0 {
        return 0.0;
    }
    (rank as f64 * 2.3).sin() * MAX_ROTATION_DEGREES
}

/// Reveal delay in seconds for the word at `rank`.
pub fn animation_delay(rank: usize) -> f64 {
    rank as f64 * ANIMATION_STEP_SECONDS
}
