//! Generate command: lay out a word cloud from a file of answers.

use std::fmt::Write as _;

use answer_cloud_core::config::Config;
use answer_cloud_core::{RenderItem, StyleTier, WordCloud, WordCloudEngine};
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use super::{AnalysisArgs, LayoutArgs, load_answers};

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Answer file: `.json` array of `{"content": ...}` records, or one answer per line.
    pub file: Utf8PathBuf,

    /// Print an HTML fragment instead of a table (`--json` takes precedence).
    #[arg(long)]
    pub html: bool,

    #[command(flatten)]
    pub analysis: AnalysisArgs,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

/// Generate a word cloud and print it.
#[instrument(name = "cmd_generate", skip_all, fields(file = %args.file))]
pub fn cmd_generate(
    args: GenerateArgs,
    global_json: bool,
    config: &Config,
    max_input: Option<usize>,
) -> anyhow::Result<()> {
    debug!(file = %args.file, html = args.html, "executing generate command");

    let answers = load_answers(&args.file, max_input)?;
    let mut config = config.clone();
    args.analysis.apply(&mut config);
    args.layout.apply(&mut config);

    let engine = WordCloudEngine::from_config(&config);
    let cloud = engine.generate(&answers);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&cloud)?);
    } else if args.html {
        print!("{}", render_html(&cloud));
    } else {
        print_table(&cloud, answers.len());
    }

    Ok(())
}

fn print_table(cloud: &WordCloud, answers: usize) {
    println!(
        "{} {} words from {} answers in {}x{}",
        "Cloud:".bold(),
        cloud.len(),
        answers,
        cloud.container_width,
        cloud.container_height,
    );
    if cloud.segmentation_fallback {
        println!("{}", "segmenter unavailable; split on whitespace".yellow());
    }
    if cloud.fallbacks > 0 {
        println!(
            "{}",
            format!("{} word(s) found no free spot and sit at the center", cloud.fallbacks)
                .yellow()
        );
    }
    if cloud.is_empty() {
        return;
    }

    println!();
    println!(
        "{}",
        format!(
            "{:>4}  {:>5}  {:>5}  {:>6}  {:>6}  {:>6}  {:>5}  {}",
            "#", "COUNT", "FREQ", "X%", "Y%", "ROT", "SIZE", "WORD"
        )
        .dimmed()
    );
    for item in &cloud.items {
        println!(
            "{:>4}  {:>5}  {:>5.2}  {:>6.1}  {:>6.1}  {:>6.1}  {:>5.1}  {}",
            item.rank + 1,
            item.count,
            item.normalized_frequency,
            item.x_percent,
            item.y_percent,
            item.rotation,
            item.font_size,
            styled_word(item),
        );
    }
}

fn styled_word(item: &RenderItem) -> String {
    match item.tier {
        StyleTier::Large => item.word.bold().to_string(),
        StyleTier::Medium => item.word.clone(),
        StyleTier::Small => item.word.dimmed().to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Absolutely positioned spans inside a fixed-size container.
pub fn render_html(cloud: &WordCloud) -> String {
    let mut html = format!(
        "<div class=\"word-cloud\" style=\"position: relative; width: {}px; height: {}px;\">\n",
        cloud.container_width, cloud.container_height,
    );
    for item in &cloud.items {
        // Writing to a String cannot fail.
        let _ = writeln!(
            html,
            "  <span class=\"word-tag {}\" style=\"position: absolute; {}\">{}</span>",
            item.tier.class_name(),
            item.css_style(),
            escape_html(&item.word),
        );
    }
    html.push_str("</div>\n");
    html
}
