//! Spiral placement of sized words inside a container.
//!
//! Words are placed in rank order, each against everything placed before it,
//! so rank decides who gets the central positions. The first word sits at the
//! exact container center without a fit test. Every later word searches an
//! outward rectangular spiral around the center and takes the first lattice
//! point that fits (first-fit, not best-fit).
//!
//! The lattice step follows the word's own aspect ratio: the longer side
//! advances one unit per step and the shorter side `short / long` units, which
//! keeps the search front from stretching along one axis.
//!
//! Fit is an axis-aligned test on the word's rotated footprint: the
//! margin-expanded box must stay inside the container, and against each placed
//! word the centers must be separated on at least one axis by the sum of the
//! half extents plus the margin.
//!
//! The search gives up when its front moves further from the center than
//! [`SEARCH_EXTENT_FACTOR`] times the word's rotated size on either axis, or
//! after [`MAX_SPIRAL_RINGS`] rings. A word that finds no spot is placed at
//! the center anyway and may overlap earlier words. No word is ever dropped.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::metrics::BoundingBox;

/// Hard cap on spiral rings per word.
pub const MAX_SPIRAL_RINGS: usize = 10_000;

/// How far (in multiples of the word's rotated size) the spiral may wander
/// under [`SearchBound::WordRelative`].
pub const SEARCH_EXTENT_FACTOR: f64 = 1.5;

/// Default spacing kept between words and around the container edge.
pub const DEFAULT_MARGIN: f64 = 40.0;

/// Axis-aligned footprint of a box rotated by some angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RotatedBounds {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl RotatedBounds {
    /// Footprint of `size` rotated by `degrees`, rounded up to whole pixels.
    ///
    /// Never smaller than the unrotated box on either axis.
    pub fn of(size: BoundingBox, degrees: f64) -> Self {
        if degrees == 0.0 {
            return Self {
                width: size.width,
                height: size.height,
            };
        }
        let rad = degrees.to_radians();
        let (sin, cos) = (rad.sin().abs(), rad.cos().abs());
        let width = size.width.mul_add(cos, size.height * sin).ceil();
        let height = size.width.mul_add(sin, size.height * cos).ceil();
        Self {
            width: width.max(size.width),
            height: height.max(size.height),
        }
    }
}

/// A word ready for placement: unrotated size plus its rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SizedWord {
    /// Unrotated width.
    pub width: f64,
    /// Unrotated height.
    pub height: f64,
    /// Rotation in degrees.
    pub rotation: f64,
}

impl SizedWord {
    /// Rotated footprint of this word.
    pub fn bounds(&self) -> RotatedBounds {
        RotatedBounds::of(BoundingBox::new(self.width, self.height), self.rotation)
    }
}

/// A committed word: center plus rotated footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlacedWord {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Rotated footprint width.
    pub width: f64,
    /// Rotated footprint height.
    pub height: f64,
    /// Rotation in degrees.
    pub rotation: f64,
}

/// Where a word ended up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WordPosition {
    /// Center x in container pixels.
    pub x: f64,
    /// Center y in container pixels.
    pub y: f64,
    /// Rotation in degrees.
    pub rotation: f64,
}

/// When the spiral search stops looking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SearchBound {
    /// Stop once the front passes 1.5x the word's own rotated size.
    ///
    /// Small words in large containers can give up well before reaching the
    /// container edge.
    #[default]
    WordRelative,
    /// Keep going until the front has swept the whole container.
    ///
    /// The ring cap still applies. The short axis advances only
    /// `short / long` per ring, so a very thin word (say 400x2 in an
    /// 800x500 container) can spend all [`MAX_SPIRAL_RINGS`] rings within
    /// a few dozen pixels of the center line and fall back with
    /// [`FallbackReason::RingLimit`] before reaching free space.
    Container,
}

/// Container geometry and search limits for one placement pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementOptions {
    /// Container width.
    pub container_width: f64,
    /// Container height.
    pub container_height: f64,
    /// Spacing between words and around the container edge.
    pub margin: f64,
    /// Search termination policy.
    pub search_bound: SearchBound,
    /// Ring cap per word.
    pub max_rings: usize,
}

impl PlacementOptions {
    /// Options for a container with the default search limits.
    pub const fn new(container_width: f64, container_height: f64, margin: f64) -> Self {
        Self {
            container_width,
            container_height,
            margin,
            search_bound: SearchBound::WordRelative,
            max_rings: MAX_SPIRAL_RINGS,
        }
    }

    /// Use a different termination policy.
    pub const fn with_search_bound(mut self, search_bound: SearchBound) -> Self {
        self.search_bound = search_bound;
        self
    }

    /// Container center.
    pub fn center(&self) -> (f64, f64) {
        (self.container_width / 2.0, self.container_height / 2.0)
    }
}

/// Why a word was forced to the center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackReason {
    /// The margin-expanded word is larger than the container.
    DoesNotFit,
    /// The search front left the allowed extent.
    OutOfRange,
    /// The ring cap was reached.
    RingLimit,
}

impl FallbackReason {
    /// Returns the reason as a kebab-case string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DoesNotFit => "does-not-fit",
            Self::OutOfRange => "out-of-range",
            Self::RingLimit => "ring-limit",
        }
    }
}

/// A word that could not be placed without overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlacementFallback {
    /// Rank (input index) of the word.
    pub rank: usize,
    /// Spiral rings searched before giving up.
    pub rings: usize,
    /// Why the search stopped.
    pub reason: FallbackReason,
}

/// Result of a placement pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementOutcome {
    /// One position per input word, in input order.
    pub positions: Vec<WordPosition>,
    /// Committed footprints, in input order.
    pub placed: Vec<PlacedWord>,
    /// Words that were forced to the center.
    pub fallbacks: Vec<PlacementFallback>,
}

/// Whether a word with footprint `bounds` fits centered at `(x, y)`.
pub fn can_fit(
    bounds: RotatedBounds,
    (x, y): (f64, f64),
    placed: &[PlacedWord],
    options: &PlacementOptions,
) -> bool {
    let margin = options.margin;
    let half_w = bounds.width / 2.0;
    let half_h = bounds.height / 2.0;

    if x - half_w < margin
        || x + half_w > options.container_width - margin
        || y - half_h < margin
        || y + half_h > options.container_height - margin
    {
        return false;
    }

    placed.iter().all(|other| {
        let dx = (x - other.x).abs();
        let dy = (y - other.y).abs();
        let min_dx = (bounds.width + other.width) / 2.0 + margin;
        let min_dy = (bounds.height + other.height) / 2.0 + margin;
        dx >= min_dx || dy >= min_dy
    })
}

/// Lattice step per axis: the longer side moves one unit, the shorter side
/// proportionally less.
fn spiral_steps(bounds: RotatedBounds) -> (f64, f64) {
    let (w, h) = (bounds.width, bounds.height);
    if w > h {
        (1.0, h / w)
    } else if h > w {
        (w / h, 1.0)
    } else {
        (1.0, 1.0)
    }
}

/// Search outward from the center. Returns the first fitting point, or the
/// reason the search stopped and the number of rings it covered.
fn spiral_search(
    bounds: RotatedBounds,
    placed: &[PlacedWord],
    options: &PlacementOptions,
) -> Result<(f64, f64), (FallbackReason, usize)> {
    let (cx, cy) = options.center();

    if bounds.width + 2.0 * options.margin > options.container_width
        || bounds.height + 2.0 * options.margin > options.container_height
    {
        return Err((FallbackReason::DoesNotFit, 0));
    }

    if can_fit(bounds, (cx, cy), placed, options) {
        return Ok((cx, cy));
    }

    let (step_x, step_y) = spiral_steps(bounds);
    let point = |i: i64, j: i64| (cx + i as f64 * step_x, cy + j as f64 * step_y);

    // Lattice cursor. Ring r starts at (-(r-1), -(r-1)) and ends at (-r, -r).
    let (mut i, mut j) = (0_i64, 0_i64);

    for ring in 1..=options.max_rings {
        let r = ring as i64;
        let legs = [(1, 0, 2 * r - 1), (0, 1, 2 * r - 1), (-1, 0, 2 * r), (0, -1, 2 * r)];
        for (di, dj, len) in legs {
            for _ in 0..len {
                i += di;
                j += dj;
                let candidate = point(i, j);
                if can_fit(bounds, candidate, placed, options) {
                    return Ok(candidate);
                }
            }
        }

        let reach_x = ring as f64 * step_x;
        let reach_y = ring as f64 * step_y;
        let exhausted = match options.search_bound {
            SearchBound::WordRelative => {
                reach_x > bounds.width * SEARCH_EXTENT_FACTOR
                    || reach_y > bounds.height * SEARCH_EXTENT_FACTOR
            }
            SearchBound::Container => {
                reach_x > options.container_width / 2.0 && reach_y > options.container_height / 2.0
            }
        };
        if exhausted {
            return Err((FallbackReason::OutOfRange, ring));
        }
    }

    Err((FallbackReason::RingLimit, options.max_rings))
}

/// Place `words` in a container, returning one position per word.
pub fn place(
    words: &[SizedWord],
    container_width: f64,
    container_height: f64,
    margin: f64,
) -> Vec<WordPosition> {
    place_detailed(
        words,
        &PlacementOptions::new(container_width, container_height, margin),
    )
    .positions
}

/// Place `words` and report which ones had to fall back to the center.
#[tracing::instrument(skip_all, fields(words = words.len(), width = options.container_width, height = options.container_height))]
pub fn place_detailed(words: &[SizedWord], options: &PlacementOptions) -> PlacementOutcome {
    let mut outcome = PlacementOutcome {
        positions: Vec::with_capacity(words.len()),
        placed: Vec::with_capacity(words.len()),
        fallbacks: Vec::new(),
    };
    let (cx, cy) = options.center();

    for (rank, word) in words.iter().enumerate() {
        if rank == 0 {
            let bounds = RotatedBounds::of(BoundingBox::new(word.width, word.height), 0.0);
            outcome.placed.push(PlacedWord {
                x: cx,
                y: cy,
                width: bounds.width,
                height: bounds.height,
                rotation: 0.0,
            });
            outcome.positions.push(WordPosition {
                x: cx,
                y: cy,
                rotation: 0.0,
            });
            continue;
        }

        let bounds = word.bounds();
        let (x, y) = match spiral_search(bounds, &outcome.placed, options) {
            Ok(point) => point,
            Err((reason, rings)) => {
                tracing::warn!(
                    rank,
                    rings,
                    reason = reason.as_str(),
                    "no free position for word, placing at center"
                );
                outcome.fallbacks.push(PlacementFallback {
                    rank,
                    rings,
                    reason,
                });
                (cx, cy)
            }
        };

        outcome.placed.push(PlacedWord {
            x,
            y,
            width: bounds.width,
            height: bounds.height,
            rotation: word.rotation,
        });
        outcome.positions.push(WordPosition {
            x,
            y,
            rotation: word.rotation,
        });
    }

    tracing::debug!(
        placed = outcome.positions.len(),
        fallbacks = outcome.fallbacks.len(),
        "placement complete"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(width: f64, height: f64, rotation: f64) -> SizedWord {
        SizedWord {
            width,
            height,
            rotation,
        }
    }

    /// No two margin-expanded footprints overlap on both axes.
    fn assert_separated(placed: &[PlacedWord], margin: f64) {
        for (a_idx, a) in placed.iter().enumerate() {
            for b in &placed[a_idx + 1..] {
                let dx = (a.x - b.x).abs();
                let dy = (a.y - b.y).abs();
                let apart_x = dx >= (a.width + b.width) / 2.0 + margin;
                let apart_y = dy >= (a.height + b.height) / 2.0 + margin;
                assert!(apart_x || apart_y, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn single_word_lands_at_center() {
        let positions = place(&[word(50.0, 20.0, 0.0)], 800.0, 500.0, 40.0);
        assert_eq!(
            positions,
            vec![WordPosition {
                x: 400.0,
                y: 250.0,
                rotation: 0.0
            }]
        );
    }

    #[test]
    fn empty_input_places_nothing() {
        assert!(place(&[], 800.0, 500.0, 40.0).is_empty());
    }

    #[test]
    fn first_word_is_centered_and_upright() {
        let words = [word(120.0, 40.0, 7.5), word(30.0, 10.0, 3.0)];
        let positions = place(&words, 640.0, 480.0, 5.0);
        assert_eq!(positions[0].x, 320.0);
        assert_eq!(positions[0].y, 240.0);
        assert_eq!(positions[0].rotation, 0.0);
    }

    #[test]
    fn rotated_bounds_grow() {
        let size = BoundingBox::new(100.0, 20.0);
        assert_eq!(
            RotatedBounds::of(size, 0.0),
            RotatedBounds {
                width: 100.0,
                height: 20.0
            }
        );
        let tilted = RotatedBounds::of(size, 10.0);
        assert!(tilted.width >= 100.0);
        assert!(tilted.height > 20.0);
        // 100·sin10° + 20·cos10° ≈ 37.06
        assert_eq!(tilted.height, 38.0);

        let sideways = RotatedBounds::of(size, 90.0);
        assert_eq!(sideways.width, 100.0);
        assert_eq!(sideways.height, 100.0);
    }

    #[test]
    fn rotated_bounds_never_shrink_for_wide_words() {
        let size = BoundingBox::new(400.0, 10.0);
        for degrees in [-10.0, -3.0, 1.0, 5.0, 10.0] {
            let bounds = RotatedBounds::of(size, degrees);
            assert!(bounds.width >= size.width);
            assert!(bounds.height >= size.height);
        }
    }

    #[test]
    fn fit_rejects_out_of_bounds() {
        let options = PlacementOptions::new(200.0, 100.0, 10.0);
        let bounds = RotatedBounds {
            width: 40.0,
            height: 20.0,
        };
        assert!(can_fit(bounds, (100.0, 50.0), &[], &options));
        assert!(can_fit(bounds, (30.0, 20.0), &[], &options));
        assert!(!can_fit(bounds, (29.0, 50.0), &[], &options));
        assert!(!can_fit(bounds, (100.0, 85.0), &[], &options));
    }

    #[test]
    fn fit_requires_overlap_on_both_axes_to_reject() {
        let options = PlacementOptions::new(1000.0, 1000.0, 10.0);
        let bounds = RotatedBounds {
            width: 40.0,
            height: 20.0,
        };
        let placed = [PlacedWord {
            x: 500.0,
            y: 500.0,
            width: 40.0,
            height: 20.0,
            rotation: 0.0,
        }];
        // Same row, separated horizontally by exactly width + margin.
        assert!(can_fit(bounds, (550.0, 500.0), &placed, &options));
        // Same column, separated vertically by height + margin.
        assert!(can_fit(bounds, (500.0, 530.0), &placed, &options));
        // Overlapping on both axes.
        assert!(!can_fit(bounds, (540.0, 520.0), &placed, &options));
    }

    #[test]
    fn second_word_finds_a_free_spot() {
        let words = [word(20.0, 10.0, 0.0), word(20.0, 10.0, 0.0)];
        let outcome = place_detailed(&words, &PlacementOptions::new(800.0, 500.0, 2.0));
        assert!(outcome.fallbacks.is_empty());
        assert_ne!(outcome.positions[1].x, 400.0);
        assert_separated(&outcome.placed, 2.0);
    }

    #[test]
    fn small_words_do_not_overlap_in_roomy_container() {
        let words: Vec<SizedWord> = (0..6).map(|_| word(20.0, 10.0, 0.0)).collect();
        let options = PlacementOptions::new(800.0, 500.0, 0.0);
        let outcome = place_detailed(&words, &options);

        assert_eq!(outcome.positions.len(), 6);
        assert!(outcome.fallbacks.is_empty(), "{:?}", outcome.fallbacks);
        assert_separated(&outcome.placed, 0.0);
    }

    #[test]
    fn container_bound_searches_further() {
        // A wide first word leaves no room within 1.5x of a tiny word.
        let words = [word(300.0, 60.0, 0.0), word(10.0, 10.0, 0.0)];

        let relative = place_detailed(&words, &PlacementOptions::new(800.0, 500.0, 20.0));
        assert_eq!(relative.fallbacks.len(), 1);
        assert_eq!(relative.fallbacks[0].reason, FallbackReason::OutOfRange);

        let options =
            PlacementOptions::new(800.0, 500.0, 20.0).with_search_bound(SearchBound::Container);
        let container = place_detailed(&words, &options);
        assert!(container.fallbacks.is_empty());
        assert_separated(&container.placed, 20.0);
    }

    #[test]
    fn oversized_word_falls_back_to_center() {
        let words = [word(50.0, 20.0, 0.0), word(900.0, 900.0, 0.0)];
        let outcome = place_detailed(&words, &PlacementOptions::new(800.0, 500.0, 40.0));

        assert_eq!(outcome.positions.len(), 2);
        assert_eq!(outcome.positions[1].x, 400.0);
        assert_eq!(outcome.positions[1].y, 250.0);
        assert_eq!(outcome.fallbacks.len(), 1);
        assert_eq!(outcome.fallbacks[0].rank, 1);
        assert_eq!(outcome.fallbacks[0].reason, FallbackReason::DoesNotFit);
    }

    #[test]
    fn degenerate_container_still_places_every_word() {
        let words: Vec<SizedWord> = (0..25).map(|i| word(30.0, 12.0, i as f64)).collect();
        let positions = place(&words, 1.0, 1.0, 40.0);

        assert_eq!(positions.len(), words.len());
        for (pos, input) in positions.iter().zip(&words).skip(1) {
            assert_eq!((pos.x, pos.y), (0.5, 0.5));
            assert_eq!(pos.rotation, input.rotation);
        }
    }

    #[test]
    fn crowded_container_reports_fallbacks() {
        let words: Vec<SizedWord> = (0..12).map(|_| word(60.0, 30.0, 0.0)).collect();
        let outcome = place_detailed(&words, &PlacementOptions::new(200.0, 120.0, 5.0));

        assert_eq!(outcome.positions.len(), 12);
        assert!(!outcome.fallbacks.is_empty());
        for fallback in &outcome.fallbacks {
            let pos = outcome.positions[fallback.rank];
            assert_eq!((pos.x, pos.y), (100.0, 60.0));
        }
    }

    #[test]
    fn ring_cap_is_respected() {
        let words = [word(300.0, 60.0, 0.0), word(10.0, 10.0, 0.0)];
        let mut options =
            PlacementOptions::new(800.0, 500.0, 20.0).with_search_bound(SearchBound::Container);
        options.max_rings = 3;

        let outcome = place_detailed(&words, &options);
        assert_eq!(outcome.fallbacks[0].reason, FallbackReason::RingLimit);
        assert_eq!(outcome.fallbacks[0].rings, 3);
    }

    #[test]
    fn thin_word_exhausts_rings_before_container_edge() {
        // Clearing the first word needs |dy| > 20.5, but a 100x1 word moves
        // 0.01 px per ring vertically.
        let words = [word(300.0, 20.0, 0.0), word(100.0, 1.0, 0.0)];
        let mut options = PlacementOptions::new(400.0, 300.0, 10.0);
        options.max_rings = 500;

        let relative = place_detailed(&words, &options);
        assert_eq!(relative.fallbacks[0].reason, FallbackReason::OutOfRange);

        let options = options.with_search_bound(SearchBound::Container);
        let container = place_detailed(&words, &options);
        assert_eq!(container.fallbacks[0].reason, FallbackReason::RingLimit);
        assert_eq!(container.fallbacks[0].rings, 500);
        assert_eq!(
            (container.positions[1].x, container.positions[1].y),
            (200.0, 150.0)
        );
    }

    #[test]
    fn placement_is_deterministic() {
        let words: Vec<SizedWord> = (0..15)
            .map(|i| word(20.0 + i as f64 * 3.0, 14.0, (i as f64 * 2.3).sin() * 10.0))
            .collect();
        let options = PlacementOptions::new(800.0, 500.0, 4.0);
        let first = place_detailed(&words, &options);
        let second = place_detailed(&words, &options);
        assert_eq!(first, second);
    }
}
