//! Layered settings for the engine and the CLI.
//!
//! Settings are merged from these layers, weakest first:
//!
//! | Layer | Where |
//! |-------|-------|
//! | built-in | [`Config::default`] |
//! | user | `config.<ext>` in [`user_config_dir`] |
//! | project | `.answer-cloud.<ext>` then `answer-cloud.<ext>` in the nearest directory that has one |
//! | explicit | files passed to [`ConfigLoader::with_file`], in order |
//! | environment | `ANSWER_CLOUD_*`, with `__` between nested keys |
//!
//! `<ext>` is `toml`, `yaml`, `yml` or `json`; in one directory later
//! extensions win. The project walk starts at the search root and stops at
//! the first directory holding a `.git` entry, after checking that directory.
//!
//! ```no_run
//! use answer_cloud_core::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (config, sources) = ConfigLoader::new()
//!     .with_project_search("answers/week1")
//!     .load()?;
//! println!("{} words from {:?}", config.layout.max_words, sources.primary_file());
//! # Ok(())
//! # }
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::placement::{DEFAULT_MARGIN, PlacementOptions, SearchBound};
use crate::segment::SegmenterBackend;
use crate::style::{DEFAULT_RELATIVE_SCALING, DEFAULT_SIZE_RANGE};

const APP_NAME: &str = "answer-cloud";
const ENV_PREFIX: &str = "ANSWER_CLOUD_";
const EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];
/// Project file stems, weakest first.
const PROJECT_STEMS: [&str; 2] = [".answer-cloud", "answer-cloud"];
const REPO_MARKER: &str = ".git";

/// Parameters for one word-cloud generation.
///
/// Immutable for the duration of a call. Every field has a default, so a
/// config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LayoutConfig {
    /// Keep at most this many words.
    pub max_words: usize,
    /// Drop tokens shorter than this many characters.
    pub min_word_length: usize,
    /// Drop words counted fewer times than this.
    pub min_frequency: usize,
    /// Count purely numeric tokens.
    pub include_numbers: bool,
    /// Font size range in pixels, `[min, max]`.
    pub size_range: [f64; 2],
    /// Spacing between words and around the container edge, in pixels.
    pub margin: f64,
    /// Container width in pixels.
    pub container_width: f64,
    /// Container height in pixels.
    pub container_height: f64,
    /// Weight (α) of frequency against its complement in font sizing.
    pub relative_scaling: f64,
    /// When the spiral search gives up on a word.
    pub search_bound: SearchBound,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_words: 50,
            min_word_length: 1,
            min_frequency: 1,
            include_numbers: false,
            size_range: DEFAULT_SIZE_RANGE,
            margin: DEFAULT_MARGIN,
            container_width: 800.0,
            container_height: 500.0,
            relative_scaling: DEFAULT_RELATIVE_SCALING,
            search_bound: SearchBound::WordRelative,
        }
    }
}

impl LayoutConfig {
    /// Placement options for this layout's container.
    pub const fn placement_options(&self) -> PlacementOptions {
        PlacementOptions::new(self.container_width, self.container_height, self.margin)
            .with_search_bound(self.search_bound)
    }
}

/// Everything a run of answer-cloud can be told, from any layer.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Default verbosity when neither `-q`/`-v` nor `RUST_LOG` is given.
    pub log_level: LogLevel,
    /// Directory for JSONL log files. No log file is written when unset.
    pub log_dir: Option<Utf8PathBuf>,
    /// Word-cloud layout parameters.
    pub layout: LayoutConfig,
    /// Newline-separated stopword file replacing the built-in vocabulary.
    pub stopwords_file: Option<Utf8PathBuf>,
    /// Word segmentation backend.
    pub segmenter: SegmenterBackend,
    /// User dictionary merged into the segmenter, where supported.
    pub user_dict: Option<Utf8PathBuf>,
    /// Largest answer file or MCP payload accepted, in bytes.
    ///
    /// Unset means [`crate::DEFAULT_MAX_INPUT_BYTES`].
    pub max_input_bytes: Option<usize>,
    /// Accept input of any size; `max_input_bytes` is then ignored.
    pub disable_input_limit: bool,
}

impl Config {
    /// Effective input size limit, or `None` when the limit is disabled.
    pub fn input_limit(&self) -> Option<usize> {
        (!self.disable_input_limit)
            .then(|| self.max_input_bytes.unwrap_or(crate::DEFAULT_MAX_INPUT_BYTES))
    }
}

/// Default log verbosity.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-word placement and segmentation detail.
    Debug,
    /// One line per generated cloud.
    #[default]
    Info,
    /// Degradations only: fallbacks and unreadable vocabularies.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// Name understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// The files that went into a loaded [`Config`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigSources {
    /// Project files from the nearest directory that had any, weakest first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub project_files: Vec<Utf8PathBuf>,
    /// The user-level config file, if one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_file: Option<Utf8PathBuf>,
    /// Files passed with `--config`, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigSources {
    /// The strongest file that was merged, for display.
    pub fn primary_file(&self) -> Option<&Utf8Path> {
        self.explicit_files
            .last()
            .or(self.project_files.last())
            .map(Utf8PathBuf::as_path)
            .or(self.user_file.as_deref())
    }
}

/// Builds a [`Config`] from every layer.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    search_root: Option<Utf8PathBuf>,
    files: Vec<Utf8PathBuf>,
}

impl ConfigLoader {
    /// A loader that reads only the user layer and the environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for project files starting at `dir` and walking up.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, dir: P) -> Self {
        self.search_root = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Merge `path` above the discovered files. Later calls win.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.files.push(path.as_ref().to_path_buf());
        self
    }

    /// Merge every layer and deserialize the result.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Deserialize`] when a file cannot be parsed or a value
    /// has the wrong type, e.g. an unknown `segmenter`.
    #[tracing::instrument(skip(self), fields(search_root = ?self.search_root))]
    pub fn load(self) -> ConfigResult<(Config, ConfigSources)> {
        let sources = ConfigSources {
            user_file: user_config_file(),
            project_files: self
                .search_root
                .as_deref()
                .map(project_config_files)
                .unwrap_or_default(),
            explicit_files: self.files,
        };
        tracing::debug!(?sources, "merging configuration");

        let figment = sources
            .user_file
            .iter()
            .chain(&sources.project_files)
            .chain(&sources.explicit_files)
            .fold(
                Figment::new().merge(Serialized::defaults(Config::default())),
                |figment, path| merge_file(figment, path),
            )
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::info!(
            segmenter = config.segmenter.as_str(),
            max_words = config.layout.max_words,
            search_bound = ?config.layout.search_bound,
            "configuration loaded"
        );
        Ok((config, sources))
    }
}

fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
    match path.extension() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => figment.merge(Toml::file_exact(path)),
    }
}

/// Project files from the nearest directory at or above `start` that has any.
fn project_config_files(start: &Utf8Path) -> Vec<Utf8PathBuf> {
    for dir in start.ancestors() {
        let found: Vec<Utf8PathBuf> = PROJECT_STEMS
            .iter()
            .flat_map(|stem| EXTENSIONS.iter().map(move |ext| dir.join(format!("{stem}.{ext}"))))
            .filter(|path| path.is_file())
            .collect();
        if !found.is_empty() {
            return found;
        }
        if dir.join(REPO_MARKER).exists() {
            tracing::debug!(%dir, "no project config inside repository");
            break;
        }
    }
    Vec::new()
}

fn user_config_file() -> Option<Utf8PathBuf> {
    let dir = user_config_dir()?;
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("config.{ext}")))
        .find(|path| path.is_file())
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// Per-user config directory, e.g. `~/.config/answer-cloud` on Linux.
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(project_dirs()?.config_dir().to_path_buf()).ok()
}

/// Per-user local data directory. A good place to point `log_dir` at.
pub fn user_data_local_dir() -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(project_dirs()?.data_local_dir().to_path_buf()).ok()
}
