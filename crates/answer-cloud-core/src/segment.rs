//! Word segmentation backends and their lifecycle.
//!
//! Segmentation (splitting raw text into candidate word tokens) is an
//! injected capability. [`Segmenter`] is the seam; [`WhitespaceSegmenter`] is
//! always available, and [`JiebaSegmenter`] is compiled in with the `jieba`
//! feature.
//!
//! [`SegmenterService`] owns the process-wide handle. Initialization is
//! coalesced: concurrent callers wait on the same in-flight setup and the
//! factory runs once. A failed setup is reported to the caller that ran it
//! and leaves the service uninitialized, so the next call retries.

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{SegmentError, SegmentResult};

/// Splits cleaned text into candidate tokens.
pub trait Segmenter: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Cut `text` into tokens. `hmm` enables statistical discovery of words
    /// missing from the dictionary, where the backend supports it.
    fn cut(&self, text: &str, hmm: bool) -> SegmentResult<Vec<String>>;
}

/// Splits on Unicode whitespace. Also the fallback for every other backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceSegmenter;

impl Segmenter for WhitespaceSegmenter {
    fn name(&self) -> &'static str {
        "whitespace"
    }

    fn cut(&self, text: &str, _hmm: bool) -> SegmentResult<Vec<String>> {
        Ok(split_whitespace(text))
    }
}

/// Whitespace tokenization used when segmentation is unavailable or fails.
pub fn split_whitespace(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Chinese word segmentation backed by `jieba-rs`.
#[cfg(feature = "jieba")]
pub struct JiebaSegmenter {
    inner: jieba_rs::Jieba,
}

#[cfg(feature = "jieba")]
impl JiebaSegmenter {
    /// Create a segmenter with the bundled dictionary.
    pub fn new() -> Self {
        Self {
            inner: jieba_rs::Jieba::new(),
        }
    }

    /// Create a segmenter and merge a user dictionary into it.
    ///
    /// The file uses jieba's dictionary format (`word [freq] [tag]` per line).
    pub fn with_user_dict(path: &Utf8Path) -> SegmentResult<Self> {
        let file = std::fs::File::open(path.as_std_path()).map_err(|source| {
            SegmentError::UserDict {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let mut reader = std::io::BufReader::new(file);
        let mut segmenter = Self::new();
        segmenter
            .inner
            .load_dict(&mut reader)
            .map_err(|e| SegmentError::Init(format!("invalid user dictionary {path}: {e}")))?;
        Ok(segmenter)
    }
}

#[cfg(feature = "jieba")]
impl Default for JiebaSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "jieba")]
impl fmt::Debug for JiebaSegmenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiebaSegmenter").finish_non_exhaustive()
    }
}

#[cfg(feature = "jieba")]
impl Segmenter for JiebaSegmenter {
    fn name(&self) -> &'static str {
        "jieba"
    }

    fn cut(&self, text: &str, hmm: bool) -> SegmentResult<Vec<String>> {
        Ok(self
            .inner
            .cut(text, hmm)
            .into_iter()
            .map(str::to_string)
            .collect())
    }
}

/// Which segmentation backend to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SegmenterBackend {
    /// Dictionary + HMM Chinese segmentation (requires the `jieba` feature).
    #[default]
    Jieba,
    /// Plain whitespace splitting.
    Whitespace,
}

impl SegmenterBackend {
    /// Returns the backend name as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Jieba => "jieba",
            Self::Whitespace => "whitespace",
        }
    }
}

impl fmt::Display for SegmenterBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build a segmenter for `backend`, loading `user_dict` where supported.
pub fn build_segmenter(
    backend: SegmenterBackend,
    user_dict: Option<&Utf8Path>,
) -> SegmentResult<Arc<dyn Segmenter>> {
    match backend {
        SegmenterBackend::Whitespace => Ok(Arc::new(WhitespaceSegmenter)),
        #[cfg(feature = "jieba")]
        SegmenterBackend::Jieba => {
            let segmenter = match user_dict {
                Some(path) => JiebaSegmenter::with_user_dict(path)?,
                None => JiebaSegmenter::new(),
            };
            Ok(Arc::new(segmenter))
        }
        #[cfg(not(feature = "jieba"))]
        SegmenterBackend::Jieba => {
            let _ = user_dict;
            Err(SegmentError::Unsupported("jieba"))
        }
    }
}

type Factory = Box<dyn Fn() -> SegmentResult<Arc<dyn Segmenter>> + Send + Sync>;

/// Owns the shared segmenter handle and its initialize/shutdown lifecycle.
pub struct SegmenterService {
    factory: Factory,
    handle: OnceLock<Arc<dyn Segmenter>>,
    init_lock: Mutex<()>,
}

impl SegmenterService {
    /// Service that builds `backend` on first use.
    pub fn new(backend: SegmenterBackend, user_dict: Option<Utf8PathBuf>) -> Self {
        Self::with_factory(move || build_segmenter(backend, user_dict.as_deref()))
    }

    /// Service with a custom factory. The factory runs once per successful
    /// initialization and again after a failure or [`shutdown`](Self::shutdown).
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> SegmentResult<Arc<dyn Segmenter>> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            handle: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Return the segmenter, initializing it if needed.
    ///
    /// Concurrent callers block on the same initialization. An error is
    /// returned only to the caller whose attempt failed; the service stays
    /// uninitialized and the next call tries again.
    pub fn initialize(&self) -> SegmentResult<Arc<dyn Segmenter>> {
        if let Some(handle) = self.handle.get() {
            return Ok(Arc::clone(handle));
        }

        let _guard = self
            .init_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Another caller may have finished while we waited.
        if let Some(handle) = self.handle.get() {
            return Ok(Arc::clone(handle));
        }

        tracing::debug!("initializing segmenter");
        let segmenter = (self.factory)()?;
        tracing::info!(backend = segmenter.name(), "segmenter initialized");
        Ok(Arc::clone(self.handle.get_or_init(|| segmenter)))
    }

    /// The segmenter, if already initialized. Never triggers initialization.
    pub fn get(&self) -> Option<Arc<dyn Segmenter>> {
        self.handle.get().cloned()
    }

    /// Whether a segmenter is ready.
    pub fn is_initialized(&self) -> bool {
        self.handle.get().is_some()
    }

    /// Drop the segmenter. The next [`initialize`](Self::initialize) rebuilds it.
    pub fn shutdown(&mut self) {
        if self.handle.take().is_some() {
            tracing::debug!("segmenter shut down");
        }
    }
}

impl Default for SegmenterService {
    fn default() -> Self {
        Self::new(SegmenterBackend::default(), None)
    }
}

impl fmt::Debug for SegmenterService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmenterService")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn whitespace_segmenter_splits_on_any_whitespace() {
        let tokens = WhitespaceSegmenter.cut("cat  dog\tbird\n", true).unwrap();
        assert_eq!(tokens, vec!["cat", "dog", "bird"]);
    }

    #[test]
    fn backend_names() {
        assert_eq!(SegmenterBackend::Jieba.as_str(), "jieba");
        assert_eq!(SegmenterBackend::Whitespace.to_string(), "whitespace");
    }

    #[test]
    fn whitespace_backend_always_builds() {
        let segmenter = build_segmenter(SegmenterBackend::Whitespace, None).unwrap();
        assert_eq!(segmenter.name(), "whitespace");
    }

    #[cfg(not(feature = "jieba"))]
    #[test]
    fn jieba_backend_unsupported_without_feature() {
        let err = build_segmenter(SegmenterBackend::Jieba, None).err().unwrap();
        assert!(matches!(err, SegmentError::Unsupported("jieba")));
    }

    #[cfg(feature = "jieba")]
    #[test]
    fn jieba_segments_chinese_text() {
        let tokens = JiebaSegmenter::new().cut("我们学习光合作用", true).unwrap();
        assert!(tokens.len() > 1);
        assert_eq!(tokens.concat(), "我们学习光合作用");
    }

    #[cfg(feature = "jieba")]
    #[test]
    fn jieba_missing_user_dict_is_an_error() {
        let err = build_segmenter(
            SegmenterBackend::Jieba,
            Some(Utf8Path::new("/nonexistent/user.dict")),
        )
        .err()
        .unwrap();
        assert!(matches!(err, SegmentError::UserDict { .. }));
    }

    #[test]
    fn concurrent_initialization_runs_factory_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let service = SegmenterService::with_factory(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            Ok(Arc::new(WhitespaceSegmenter) as Arc<dyn Segmenter>)
        });

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    service.initialize().unwrap();
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(service.is_initialized());
    }

    #[test]
    fn failed_initialization_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let service = SegmenterService::with_factory(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(SegmentError::Init("dictionary not ready".to_string()))
            } else {
                Ok(Arc::new(WhitespaceSegmenter) as Arc<dyn Segmenter>)
            }
        });

        assert!(service.initialize().is_err());
        assert!(!service.is_initialized());
        assert!(service.get().is_none());

        assert!(service.initialize().is_ok());
        assert!(service.is_initialized());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn shutdown_forces_rebuild() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut service = SegmenterService::with_factory(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(WhitespaceSegmenter) as Arc<dyn Segmenter>)
        });

        service.initialize().unwrap();
        service.initialize().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        service.shutdown();
        assert!(!service.is_initialized());

        service.initialize().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
