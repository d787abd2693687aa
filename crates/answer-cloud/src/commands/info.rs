//! Info command implementation

use answer_cloud_core::config::{self, Config, ConfigSources};
use answer_cloud_core::LayoutConfig;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    // No subcommand-specific arguments; uses global --json flag
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    repository: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    homepage: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
    features: Vec<&'static str>,
}

impl PackageInfo {
    fn new() -> Self {
        let features = [
            ("mcp", cfg!(feature = "mcp")),
            ("jieba", cfg!(feature = "jieba")),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect();
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
            homepage: env!("CARGO_PKG_HOMEPAGE"),
            license: env!("CARGO_PKG_LICENSE"),
            features,
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_config_dir: Option<String>,
    log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggested_log_dir: Option<String>,
    segmenter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_dict: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stopwords_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_input_bytes: Option<usize>,
    layout: LayoutConfig,
}

impl ConfigInfo {
    fn from_config(config: &Config, sources: &ConfigSources) -> Self {
        Self {
            config_file: sources.primary_file().map(|p| p.to_string()),
            user_config_dir: config::user_config_dir().map(|p| p.to_string()),
            log_level: config.log_level.as_str().to_string(),
            log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
            suggested_log_dir: config
                .log_dir
                .is_none()
                .then(config::user_data_local_dir)
                .flatten()
                .map(|p| p.join("logs").to_string()),
            segmenter: config.segmenter.to_string(),
            user_dict: config.user_dict.as_ref().map(|p| p.to_string()),
            stopwords_file: config.stopwords_file.as_ref().map(|p| p.to_string()),
            max_input_bytes: config.input_limit(),
            layout: config.layout.clone(),
        }
    }
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
}

/// Print package information
///
/// # Arguments
/// * `global_json` - Global `--json` flag from CLI
/// * `config` - Loaded configuration
/// * `sources` - Config source metadata from loading
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    sources: &ConfigSources,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing info command");

    let full_info = FullInfo {
        package: PackageInfo::new(),
        config: ConfigInfo::from_config(config, sources),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&full_info)?);
        return Ok(());
    }

    let package = &full_info.package;
    println!("{} {}", package.name.bold(), package.version.green());
    if !package.description.is_empty() {
        println!("{}", package.description);
    }
    if !package.license.is_empty() {
        println!("{}: {}", "License".dimmed(), package.license);
    }
    if !package.repository.is_empty() {
        println!("{}: {}", "Repository".dimmed(), package.repository.cyan());
    }
    println!("{}: {}", "Features".dimmed(), package.features.join(", "));

    let cfg = &full_info.config;
    println!();
    println!("{}", "Configuration".bold().underline());
    match cfg.config_file {
        Some(ref path) => println!("{}: {}", "Config file".dimmed(), path.cyan()),
        None => println!("{}: {}", "Config file".dimmed(), "none loaded".yellow()),
    }
    print_opt("User config dir", &cfg.user_config_dir);
    println!("{}: {}", "Log level".dimmed(), cfg.log_level);
    match (&cfg.log_dir, &cfg.suggested_log_dir) {
        (Some(dir), _) => println!("{}: {}", "Log directory".dimmed(), dir),
        (None, Some(hint)) => println!(
            "{}: {} {}",
            "Log directory".dimmed(),
            "(not set)".dimmed(),
            format!("try {hint}").dimmed()
        ),
        (None, None) => print_opt::<String>("Log directory", &None),
    }
    println!("{}: {}", "Segmenter".dimmed(), cfg.segmenter);
    print_opt("User dictionary", &cfg.user_dict);
    match cfg.stopwords_file {
        Some(ref path) => println!("{}: {}", "Stopwords".dimmed(), path),
        None => println!("{}: {}", "Stopwords".dimmed(), "built-in".dimmed()),
    }
    match cfg.max_input_bytes {
        Some(max) => println!("{}: {} bytes", "Input limit".dimmed(), max),
        None => println!("{}: {}", "Input limit".dimmed(), "disabled".yellow()),
    }

    let layout = &cfg.layout;
    println!();
    println!("{}", "Layout".bold().underline());
    println!(
        "{}: {}x{} px, margin {}",
        "Container".dimmed(),
        layout.container_width,
        layout.container_height,
        layout.margin
    );
    println!(
        "{}: {}-{} px, relative scaling {}",
        "Font size".dimmed(),
        layout.size_range[0],
        layout.size_range[1],
        layout.relative_scaling
    );
    println!(
        "{}: max {}, min frequency {}, min length {}, numbers {}",
        "Words".dimmed(),
        layout.max_words,
        layout.min_frequency,
        layout.min_word_length,
        if layout.include_numbers { "kept" } else { "dropped" }
    );
    println!(
        "{}: {}",
        "Search bound".dimmed(),
        serde_json::to_value(layout.search_bound)?
            .as_str()
            .unwrap_or_default()
    );

    Ok(())
}

/// Print an optional value or "(not set)".
fn print_opt<T: std::fmt::Display>(label: &str, value: &Option<T>) {
    match value {
        Some(v) => println!("{}: {}", label.dimmed(), v),
        None => println!("{}: {}", label.dimmed(), "(not set)".dimmed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::default()
    }

    fn test_sources() -> ConfigSources {
        ConfigSources::default()
    }

    #[test]
    fn test_cmd_info_text_succeeds() {
        assert!(cmd_info(InfoArgs::default(), false, &test_config(), &test_sources()).is_ok());
    }

    #[test]
    fn test_cmd_info_json_via_global() {
        assert!(cmd_info(InfoArgs::default(), true, &test_config(), &test_sources()).is_ok());
    }

    #[test]
    fn test_config_info_no_file() {
        let info = ConfigInfo::from_config(&test_config(), &test_sources());
        assert!(info.config_file.is_none());
        assert_eq!(info.log_level, "info");
        assert_eq!(info.segmenter, "jieba");
        assert_eq!(info.max_input_bytes, Some(answer_cloud_core::DEFAULT_MAX_INPUT_BYTES));
        assert_eq!(info.layout.max_words, 50);
    }

    #[test]
    fn test_config_info_disabled_limit() {
        let config = Config {
            disable_input_limit: true,
            ..Config::default()
        };
        let info = ConfigInfo::from_config(&config, &test_sources());
        assert!(info.max_input_bytes.is_none());
    }
}
