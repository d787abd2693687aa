//! Text measurement.
//!
//! [`TextMetrics`] is the boundary to whatever renders the words: a native
//! font API, a layout library, or the headless [`ApproximateMetrics`] used by
//! the CLI and tests. The layout engine never assumes a particular backend.

use std::cell::RefCell;
use std::num::NonZeroUsize;

use lru::LruCache;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

/// Unrotated rendered extent of a word, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl BoundingBox {
    /// Box with the given size; negative inputs clamp to zero.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }
}

/// Measures text at a font size.
pub trait TextMetrics {
    /// Rendered extent of `text` at `font_size` pixels.
    fn measure(&self, text: &str, font_size: f64) -> BoundingBox;
}

impl<T: TextMetrics + ?Sized> TextMetrics for &T {
    fn measure(&self, text: &str, font_size: f64) -> BoundingBox {
        (**self).measure(text, font_size)
    }
}

/// Fixed-ratio approximation of a sans-serif face.
///
/// Narrow glyphs advance `narrow_advance` em, wide (CJK) glyphs
/// `wide_advance` em, and the line is `line_height` em tall. Results are
/// rounded up to whole pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproximateMetrics {
    /// Advance of a single-column glyph, in em.
    pub narrow_advance: f64,
    /// Advance of a double-column glyph, in em.
    pub wide_advance: f64,
    /// Line box height, in em.
    pub line_height: f64,
}

impl Default for ApproximateMetrics {
    fn default() -> Self {
        Self {
            narrow_advance: 0.6,
            wide_advance: 1.0,
            line_height: 1.0,
        }
    }
}

impl TextMetrics for ApproximateMetrics {
    fn measure(&self, text: &str, font_size: f64) -> BoundingBox {
        let ems: f64 = text
            .chars()
            .map(|c| match c.width() {
                Some(0) | None => 0.0,
                Some(1) => self.narrow_advance,
                Some(_) => self.wide_advance,
            })
            .sum();
        BoundingBox::new(
            (ems * font_size).ceil(),
            (self.line_height * font_size).ceil(),
        )
    }
}

/// Entries kept by [`CachedMetrics::new`].
pub const DEFAULT_CACHE_ENTRIES: usize = 4096;

/// Memoizing wrapper around another measurer.
///
/// This is a stateful, reusable measurement context. It is not `Sync`:
/// share it sequentially, and give each thread its own instance when
/// measuring in parallel. The cache is bounded; once full, the least
/// recently used measurement is evicted, so one instance can serve any
/// number of clouds.
#[derive(Debug)]
pub struct CachedMetrics<M> {
    inner: M,
    cache: RefCell<LruCache<(String, u64), BoundingBox>>,
}

impl<M: TextMetrics> CachedMetrics<M> {
    /// Wrap `inner` with room for [`DEFAULT_CACHE_ENTRIES`] measurements.
    pub fn new(inner: M) -> Self {
        Self::with_capacity(inner, DEFAULT_CACHE_ENTRIES)
    }

    /// Wrap `inner` with room for `capacity` measurements (at least one).
    pub fn with_capacity(inner: M, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: RefCell::new(LruCache::new(capacity)),
        }
    }

    /// Number of memoized measurements.
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Most measurements kept at once.
    pub fn capacity(&self) -> usize {
        self.cache.borrow().cap().get()
    }

    /// Drop all memoized measurements.
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl<M: TextMetrics + Default> Default for CachedMetrics<M> {
    fn default() -> Self {
        Self::new(M::default())
    }
}

impl<M: TextMetrics> TextMetrics for CachedMetrics<M> {
    fn measure(&self, text: &str, font_size: f64) -> BoundingBox {
        let key = (text.to_string(), font_size.to_bits());
        if let Some(hit) = self.cache.borrow_mut().get(&key) {
            return *hit;
        }
        let measured = self.inner.measure(text, font_size);
        self.cache.borrow_mut().put(key, measured);
        measured
    }
}
