//! Frequencies command: rank the words in a file of answers.

use answer_cloud_core::config::Config;
use answer_cloud_core::{FrequencyReport, WordCloudEngine};
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use super::{AnalysisArgs, load_answers};

/// Arguments for the `frequencies` subcommand.
#[derive(Args, Debug)]
pub struct FrequenciesArgs {
    /// Answer file: `.json` array of `{"content": ...}` records, or one answer per line.
    pub file: Utf8PathBuf,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

/// Rank words and print the table.
#[instrument(name = "cmd_frequencies", skip_all, fields(file = %args.file))]
pub fn cmd_frequencies(
    args: FrequenciesArgs,
    global_json: bool,
    config: &Config,
    max_input: Option<usize>,
) -> anyhow::Result<()> {
    debug!(file = %args.file, "executing frequencies command");

    let answers = load_answers(&args.file, max_input)?;
    let mut config = config.clone();
    args.analysis.apply(&mut config);

    let report = WordCloudEngine::from_config(&config).frequencies(&answers);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &FrequencyReport) {
    println!(
        "{} {} of {} distinct words ({} candidate tokens)",
        "Words:".bold(),
        report.entries.len(),
        report.distinct_words,
        report.candidates,
    );
    if report.segmentation_fallback {
        println!("{}", "segmenter unavailable; split on whitespace".yellow());
    }
    for (rank, entry) in report.entries.iter().enumerate() {
        let bar = "#".repeat(((entry.normalized_frequency * 20.0).round() as usize).max(1));
        println!(
            "{:>4}  {:>5}  {:<20}  {}",
            rank + 1,
            entry.count,
            bar.green(),
            entry.word,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use answer_cloud_core::segment::SegmenterBackend;

    fn write_answers(content: &str, name: &str) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().join(name)).unwrap();
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn args(file: Utf8PathBuf) -> FrequenciesArgs {
        FrequenciesArgs {
            file,
            analysis: AnalysisArgs {
                segmenter: Some(SegmenterBackend::Whitespace),
                ..AnalysisArgs::default()
            },
        }
    }

    #[test]
    fn text_output_succeeds() {
        let (_dir, path) = write_answers("sun water\nsun\n", "answers.txt");
        assert!(cmd_frequencies(args(path), false, &Config::default(), None).is_ok());
    }

    #[test]
    fn json_output_succeeds() {
        let (_dir, path) = write_answers(r#"[{"content": "sun water sun"}]"#, "answers.json");
        assert!(cmd_frequencies(args(path), true, &Config::default(), None).is_ok());
    }

    #[test]
    fn oversized_input_is_rejected() {
        let (_dir, path) = write_answers("sun water sun", "answers.txt");
        let err = cmd_frequencies(args(path), false, &Config::default(), Some(3)).unwrap_err();
        assert!(err.to_string().contains("input too large"));
    }
}
