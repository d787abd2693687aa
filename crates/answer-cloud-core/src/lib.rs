//! Core library for answer-cloud.
//!
//! Turns free-text answers into a ranked word-frequency table and lays the
//! words out as a non-overlapping word cloud. Layout is deterministic: the
//! same answers and configuration always give the same cloud.
//!
//! # Modules
//!
//! - [`stopwords`] - Stopword vocabulary and filtering
//! - [`segment`] - Word segmentation backends and their lifecycle
//! - [`frequency`] - Word-frequency analysis
//! - [`style`] - Font sizing, tiers, colors, rotation
//! - [`metrics`] - Text measurement
//! - [`placement`] - Spiral placement of sized words
//! - [`layout`] - The engine tying it all together
//! - [`events`] - Typed notifications about degraded work
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```no_run
//! use answer_cloud_core::{Answer, LayoutConfig, WordCloudEngine};
//!
//! let engine = WordCloudEngine::new(LayoutConfig::default());
//! let cloud = engine.generate(&[Answer::new("light water light"), Answer::new("chlorophyll")]);
//!
//! for item in &cloud.items {
//!     println!("{} at ({:.1}%, {:.1}%)", item.word, item.x_percent, item.y_percent);
//! }
//! ```
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod events;
pub mod frequency;
pub mod layout;
pub mod metrics;
pub mod placement;
pub mod segment;
pub mod stopwords;
pub mod style;

pub use config::{Config, ConfigLoader, LayoutConfig, LogLevel};
pub use error::{ConfigError, ConfigResult, SegmentError, SegmentResult};
pub use events::{CloudEvent, EventBus};
pub use frequency::{Answer, FrequencyReport, WordFrequencyEntry, analyze};
pub use layout::{RenderItem, WordCloud, WordCloudEngine};
pub use metrics::{ApproximateMetrics, BoundingBox, CachedMetrics, DEFAULT_CACHE_ENTRIES, TextMetrics};
pub use placement::{SearchBound, SizedWord, WordPosition, place};
pub use segment::{Segmenter, SegmenterBackend, SegmenterService};
pub use stopwords::{Stopwords, filter_stopwords, is_stopword};
pub use style::StyleTier;

/// Default maximum input size: 5 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 5 * 1024 * 1024;
