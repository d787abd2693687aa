//! Command implementations.

use anyhow::Context;
use answer_cloud_core::config::Config;
use answer_cloud_core::placement::SearchBound;
use answer_cloud_core::segment::SegmenterBackend;
use answer_cloud_core::Answer;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;

pub mod frequencies;
pub mod generate;
pub mod info;
#[cfg(feature = "mcp")]
pub mod serve;

/// Read a file and validate its size against the configured limit.
pub fn read_input_file(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<String> {
    // Preflight: check file size via metadata before reading into memory.
    let metadata =
        std::fs::metadata(path.as_std_path()).with_context(|| format!("failed to read {path}"))?;
    if let Some(max) = max_bytes {
        let size = metadata.len() as usize;
        if size > max {
            anyhow::bail!("input too large: {path} is {size} bytes (limit: {max} bytes)");
        }
    }

    let content = std::fs::read_to_string(path.as_std_path())
        .with_context(|| format!("failed to read {path}"))?;
    Ok(content)
}

/// Parse answers from file content.
///
/// JSON content is an array of `{"content": ...}` records; anything else is
/// one answer per non-empty line.
pub fn parse_answers(content: &str, json: bool) -> anyhow::Result<Vec<Answer>> {
    if json {
        return serde_json::from_str(content).context("expected a JSON array of answer records");
    }
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Answer::from)
        .collect())
}

/// Read and parse an answer file. `.json` files hold answer records.
pub fn load_answers(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<Vec<Answer>> {
    let content = read_input_file(path, max_bytes)?;
    let json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    parse_answers(&content, json).with_context(|| format!("failed to parse answers in {path}"))
}

/// Word selection flags shared by `generate` and `frequencies`.
#[derive(Args, Debug, Default)]
pub struct AnalysisArgs {
    /// Segmentation backend.
    #[arg(long, value_enum)]
    pub segmenter: Option<SegmenterBackend>,

    /// Stopword file (one word per line) replacing the built-in list.
    #[arg(long, value_name = "FILE")]
    pub stopwords: Option<Utf8PathBuf>,

    /// Keep at most this many words.
    #[arg(long)]
    pub max_words: Option<usize>,

    /// Drop words counted fewer times than this.
    #[arg(long)]
    pub min_frequency: Option<usize>,

    /// Drop tokens shorter than this many characters.
    #[arg(long)]
    pub min_word_length: Option<usize>,

    /// Count purely numeric tokens.
    #[arg(long)]
    pub include_numbers: bool,
}

impl AnalysisArgs {
    /// Overlay these flags on the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(segmenter) = self.segmenter {
            config.segmenter = segmenter;
        }
        if let Some(ref path) = self.stopwords {
            config.stopwords_file = Some(path.clone());
        }
        let layout = &mut config.layout;
        if let Some(n) = self.max_words {
            layout.max_words = n;
        }
        if let Some(n) = self.min_frequency {
            layout.min_frequency = n;
        }
        if let Some(n) = self.min_word_length {
            layout.min_word_length = n;
        }
        if self.include_numbers {
            layout.include_numbers = true;
        }
    }
}

/// Container flags for `generate`.
#[derive(Args, Debug, Default)]
pub struct LayoutArgs {
    /// Container width in pixels.
    #[arg(long)]
    pub width: Option<f64>,

    /// Container height in pixels.
    #[arg(long)]
    pub height: Option<f64>,

    /// Spacing between words, in pixels.
    #[arg(long)]
    pub margin: Option<f64>,

    /// When the spiral search gives up on a word.
    #[arg(long, value_enum)]
    pub search_bound: Option<SearchBound>,

    /// Weight of frequency in font sizing, 0 to 1.
    #[arg(long)]
    pub relative_scaling: Option<f64>,
}

impl LayoutArgs {
    /// Overlay these flags on the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        let layout = &mut config.layout;
        if let Some(w) = self.width {
            layout.container_width = w;
        }
        if let Some(h) = self.height {
            layout.container_height = h;
        }
        if let Some(m) = self.margin {
            layout.margin = m;
        }
        if let Some(bound) = self.search_bound {
            layout.search_bound = bound;
        }
        if let Some(alpha) = self.relative_scaling {
            layout.relative_scaling = alpha;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_become_answers() {
        let answers = parse_answers("light\n\n  water and light \n", false).unwrap();
        assert_eq!(
            answers,
            vec![Answer::new("light"), Answer::new("water and light")]
        );
    }

    #[test]
    fn json_records_become_answers() {
        let answers =
            parse_answers(r#"[{"content": "光合作用", "student": 7}, {"content": "sun"}]"#, true)
                .unwrap();
        assert_eq!(answers, vec![Answer::new("光合作用"), Answer::new("sun")]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_answers("not json", true).is_err());
    }

    #[test]
    fn load_answers_enforces_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().join("answers.txt")).unwrap();
        std::fs::write(&path, "one answer that is long enough").unwrap();

        let err = load_answers(&path, Some(4)).unwrap_err();
        assert!(err.to_string().contains("input too large"));
        assert_eq!(load_answers(&path, None).unwrap().len(), 1);
    }

    #[test]
    fn load_answers_detects_json_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().join("answers.JSON")).unwrap();
        std::fs::write(&path, r#"[{"content": "a b"}]"#).unwrap();
        assert_eq!(load_answers(&path, None).unwrap(), vec![Answer::new("a b")]);
    }

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        AnalysisArgs {
            segmenter: Some(SegmenterBackend::Whitespace),
            max_words: Some(5),
            include_numbers: true,
            ..AnalysisArgs::default()
        }
        .apply(&mut config);
        LayoutArgs {
            width: Some(320.0),
            search_bound: Some(SearchBound::Container),
            ..LayoutArgs::default()
        }
        .apply(&mut config);

        assert_eq!(config.segmenter, SegmenterBackend::Whitespace);
        assert_eq!(config.layout.max_words, 5);
        assert!(config.layout.include_numbers);
        assert_eq!(config.layout.container_width, 320.0);
        assert_eq!(config.layout.container_height, 500.0);
        assert_eq!(config.layout.search_bound, SearchBound::Container);
    }
}
