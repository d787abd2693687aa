//! The word-cloud engine: answers in, positioned and styled words out.
//!
//! [`WordCloudEngine::generate`] runs the whole pipeline:
//!
//! 1. frequency analysis ([`crate::frequency`])
//! 2. font size per word ([`crate::style::font_size`])
//! 3. measurement through the injected [`TextMetrics`]
//! 4. rotation per rank
//! 5. spiral placement ([`crate::placement`])
//! 6. tier, color, and reveal delay per word
//!
//! The engine owns its collaborators explicitly: a [`SegmenterService`], a
//! [`Stopwords`] vocabulary, a measurer, and an [`EventBus`]. Nothing here
//! returns an error. Missing segmentation and unplaceable words degrade the
//! result and are reported as [`CloudEvent`]s.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::{Config, LayoutConfig};
use crate::events::{CloudEvent, EventBus};
use crate::frequency::{Answer, FrequencyReport, WordFrequencyEntry, analyze_detailed};
use crate::metrics::{ApproximateMetrics, TextMetrics};
use crate::placement::{PlacementOutcome, SizedWord, place_detailed};
use crate::segment::{Segmenter, SegmenterService};
use crate::stopwords::Stopwords;
use crate::style::{self, StyleTier};

/// One word, ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RenderItem {
    /// The word.
    pub word: String,
    /// Position in the ranking, 0 for the most frequent word.
    pub rank: usize,
    /// Occurrences.
    pub count: usize,
    /// Count relative to the top word, in `(0, 1]`.
    pub normalized_frequency: f64,
    /// Center x in container pixels.
    pub x: f64,
    /// Center y in container pixels.
    pub y: f64,
    /// Center x as a percentage of the container width.
    pub x_percent: f64,
    /// Center y as a percentage of the container height.
    pub y_percent: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Font size in pixels.
    pub font_size: f64,
    /// Hex color.
    pub color: String,
    /// Visual weight class.
    pub tier: StyleTier,
    /// Reveal delay in seconds.
    pub animation_delay: f64,
}

impl RenderItem {
    /// Inline CSS for an absolutely positioned element centered on the word.
    pub fn css_style(&self) -> String {
        format!(
            "font-size: {}px; color: {}; left: {}%; top: {}%; \
             transform: translate(-50%, -50%) rotate({}deg); \
             --word-index: {}; --animation-delay: {}s;",
            self.font_size,
            self.color,
            self.x_percent,
            self.y_percent,
            self.rotation,
            self.rank,
            self.animation_delay,
        )
    }
}

/// A generated word cloud.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WordCloud {
    /// Words in rank order.
    pub items: Vec<RenderItem>,
    /// Container width in pixels.
    pub container_width: f64,
    /// Container height in pixels.
    pub container_height: f64,
    /// Words that found no free spot and sit at the center.
    pub fallbacks: usize,
    /// Whether whitespace splitting stood in for the segmenter.
    pub segmentation_fallback: bool,
}

impl WordCloud {
    /// Number of words.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cloud has no words.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn percent(value: f64, extent: f64) -> f64 {
    if extent > 0.0 {
        value / extent * 100.0
    } else {
        50.0
    }
}

/// Generates word clouds from answers.
pub struct WordCloudEngine<M = ApproximateMetrics> {
    segmenter: SegmenterService,
    stopwords: Stopwords,
    metrics: M,
    layout: LayoutConfig,
    events: Arc<EventBus>,
}

impl WordCloudEngine<ApproximateMetrics> {
    /// Engine with the default segmenter, built-in stopwords, and approximate metrics.
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            segmenter: SegmenterService::default(),
            stopwords: Stopwords::builtin(),
            metrics: ApproximateMetrics::default(),
            layout,
            events: Arc::new(EventBus::new()),
        }
    }

    /// Engine wired from loaded configuration.
    ///
    /// A configured stopword file that cannot be read falls back to the
    /// built-in vocabulary. The segmenter is built lazily on first use.
    pub fn from_config(config: &Config) -> Self {
        let stopwords = config
            .stopwords_file
            .as_deref()
            .map_or_else(Stopwords::builtin, Stopwords::load_or_builtin);
        Self::new(config.layout.clone())
            .with_segmenter(SegmenterService::new(
                config.segmenter,
                config.user_dict.clone(),
            ))
            .with_stopwords(stopwords)
    }
}

impl<M: TextMetrics> WordCloudEngine<M> {
    /// Replace the measurer.
    pub fn with_metrics<N: TextMetrics>(self, metrics: N) -> WordCloudEngine<N> {
        WordCloudEngine {
            segmenter: self.segmenter,
            stopwords: self.stopwords,
            metrics,
            layout: self.layout,
            events: self.events,
        }
    }

    /// Replace the segmenter service.
    pub fn with_segmenter(mut self, segmenter: SegmenterService) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// Replace the stopword vocabulary.
    pub fn with_stopwords(mut self, stopwords: Stopwords) -> Self {
        self.stopwords = stopwords;
        self
    }

    /// Share an event bus with other components.
    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = events;
        self
    }

    /// Layout parameters.
    pub const fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Stopword vocabulary.
    pub const fn stopwords(&self) -> &Stopwords {
        &self.stopwords
    }

    /// Event bus; subscribe here to observe degradations.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Segmenter service.
    pub const fn segmenter_service(&self) -> &SegmenterService {
        &self.segmenter
    }

    /// Drop the segmenter; the next call rebuilds it.
    pub fn shutdown(&mut self) {
        self.segmenter.shutdown();
    }

    /// The segmenter, or `None` when it cannot be initialized right now.
    fn segmenter(&self) -> Option<Arc<dyn Segmenter>> {
        match self.segmenter.initialize() {
            Ok(segmenter) => Some(segmenter),
            Err(err) => {
                tracing::warn!(error = %err, "segmenter unavailable, splitting on whitespace");
                self.events.publish(&CloudEvent::SegmenterUnavailable {
                    error: err.to_string(),
                });
                None
            }
        }
    }

    /// Rank the words in `answers`.
    pub fn frequencies(&self, answers: &[Answer]) -> FrequencyReport {
        self.frequencies_with(answers, &self.layout)
    }

    /// Rank the words in `answers` under a different layout.
    pub fn frequencies_with(&self, answers: &[Answer], layout: &LayoutConfig) -> FrequencyReport {
        let segmenter = if answers.is_empty() {
            None
        } else {
            self.segmenter()
        };
        let report = analyze_detailed(answers, segmenter.as_deref(), &self.stopwords, layout);
        if !answers.is_empty() && report.segmentation_fallback {
            self.events.publish(&CloudEvent::SegmentationFallback);
        }
        report
    }

    /// Font size and measured, rotated geometry for each ranked word.
    pub fn size_words(&self, entries: &[WordFrequencyEntry]) -> Vec<(f64, SizedWord)> {
        self.size_words_with(entries, &self.layout)
    }

    fn size_words_with(
        &self,
        entries: &[WordFrequencyEntry],
        layout: &LayoutConfig,
    ) -> Vec<(f64, SizedWord)> {
        let [min, max] = layout.size_range;
        entries
            .iter()
            .enumerate()
            .map(|(rank, entry)| {
                let font_size = style::font_size(
                    entry.normalized_frequency,
                    [min, max],
                    layout.relative_scaling,
                );
                let size = self.metrics.measure(&entry.word, font_size);
                let sized = SizedWord {
                    width: size.width,
                    height: size.height,
                    rotation: style::rotation_for_rank(rank),
                };
                (font_size, sized)
            })
            .collect()
    }

    /// Generate a word cloud from `answers`.
    pub fn generate(&self, answers: &[Answer]) -> WordCloud {
        self.generate_with(answers, &self.layout)
    }

    /// Generate a word cloud under a different layout.
    #[tracing::instrument(skip_all, fields(answers = answers.len(), max_words = layout.max_words))]
    pub fn generate_with(&self, answers: &[Answer], layout: &LayoutConfig) -> WordCloud {
        let report = self.frequencies_with(answers, layout);
        let sized = self.size_words_with(&report.entries, layout);
        let words: Vec<SizedWord> = sized.iter().map(|(_, word)| *word).collect();

        let PlacementOutcome {
            positions,
            fallbacks,
            ..
        } = place_detailed(&words, &layout.placement_options());

        for fallback in &fallbacks {
            self.events.publish(&CloudEvent::PlacementFallback {
                word: report.entries[fallback.rank].word.clone(),
                rank: fallback.rank,
                rings: fallback.rings,
                reason: fallback.reason,
            });
        }

        let (width, height) = (layout.container_width, layout.container_height);
        let items: Vec<RenderItem> = report
            .entries
            .into_iter()
            .zip(sized)
            .zip(positions)
            .enumerate()
            .map(|(rank, ((entry, (font_size, _)), position))| RenderItem {
                rank,
                count: entry.count,
                normalized_frequency: entry.normalized_frequency,
                x: position.x,
                y: position.y,
                x_percent: percent(position.x, width),
                y_percent: percent(position.y, height),
                rotation: position.rotation,
                font_size,
                color: style::word_color(entry.normalized_frequency, rank).to_string(),
                tier: StyleTier::from_frequency(entry.normalized_frequency),
                animation_delay: style::animation_delay(rank),
                word: entry.word,
            })
            .collect();

        tracing::info!(
            words = items.len(),
            fallbacks = fallbacks.len(),
            segmentation_fallback = report.segmentation_fallback,
            "word cloud generated"
        );
        self.events.publish(&CloudEvent::CloudGenerated {
            words: items.len(),
            fallbacks: fallbacks.len(),
        });

        WordCloud {
            items,
            container_width: width,
            container_height: height,
            fallbacks: fallbacks.len(),
            segmentation_fallback: report.segmentation_fallback,
        }
    }
}

impl<M> std::fmt::Debug for WordCloudEngine<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordCloudEngine")
            .field("segmenter", &self.segmenter)
            .field("custom_stopwords", &self.stopwords.is_custom())
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}
