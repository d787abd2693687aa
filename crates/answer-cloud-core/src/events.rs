//! Typed notifications about degraded or completed work.
//!
//! The engine never fails on bad input or a missing segmenter; it degrades
//! and reports what it did through [`CloudEvent`]s on an [`EventBus`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use crate::placement::FallbackReason;

/// Something the engine wants observers to know about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CloudEvent {
    /// The segmenter could not be initialized; whitespace splitting is used
    /// for this call and initialization is retried on the next one.
    SegmenterUnavailable {
        /// Initialization error message.
        error: String,
    },
    /// Frequency analysis split on whitespace instead of segmenting.
    SegmentationFallback,
    /// A word found no free spot and was placed at the container center.
    PlacementFallback {
        /// The word.
        word: String,
        /// Its rank.
        rank: usize,
        /// Spiral rings searched.
        rings: usize,
        /// Why the search stopped.
        reason: FallbackReason,
    },
    /// A cloud was generated.
    CloudGenerated {
        /// Words in the cloud.
        words: usize,
        /// Words forced to the center.
        fallbacks: usize,
    },
}

impl CloudEvent {
    /// Event name, matching the serialized `type` tag.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SegmenterUnavailable { .. } => "segmenter_unavailable",
            Self::SegmentationFallback => "segmentation_fallback",
            Self::PlacementFallback { .. } => "placement_fallback",
            Self::CloudGenerated { .. } => "cloud_generated",
        }
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Handler = Arc<dyn Fn(&CloudEvent) + Send + Sync>;

/// Synchronous fan-out of [`CloudEvent`]s to subscribers.
///
/// Handlers run on the publishing thread in subscription order. A handler
/// may subscribe or unsubscribe others; the change applies from the next
/// publish.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<Vec<(Subscription, Handler)>>,
    next_id: AtomicU64,
}

impl EventBus {
    /// An empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every subsequent event.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&CloudEvent) + Send + Sync + 'static,
    {
        let id = Subscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|(id, _)| *id != subscription);
        handlers.len() != before
    }

    /// Deliver `event` to every current subscriber.
    pub fn publish(&self, event: &CloudEvent) {
        let handlers: Vec<Handler> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        tracing::trace!(event = event.name(), subscribers = handlers.len(), "publishing event");
        for handler in handlers {
            handler(event);
        }
    }

    /// Number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
