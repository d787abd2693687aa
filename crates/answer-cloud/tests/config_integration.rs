//! Configuration as seen by the compiled binary.
//!
//! Each test lays out config files in a temp directory, runs the binary there
//! with `-C`, and checks the resolved word-cloud settings reported by
//! `info --json` or their effect on `generate` / `frequencies`.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

/// Run the binary from `dir` with `--json` and parse stdout.
fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = cmd()
        .args(["-C", dir.to_str().unwrap(), "--json"])
        .args(args)
        .output()
        .expect("failed to run command");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("invalid JSON output")
}

/// Resolved configuration reported by `info`.
fn resolved(dir: &Path) -> Value {
    run_json(dir, &["info"])["config"].clone()
}

fn config_file(config: &Value) -> &str {
    config["config_file"].as_str().unwrap_or_default()
}

// =============================================================================
// Discovery
// =============================================================================

#[test]
fn defaults_apply_without_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = resolved(tmp.path());

    assert!(config["config_file"].is_null());
    assert_eq!(config["segmenter"], "jieba");
    assert_eq!(config["layout"]["max_words"], 50);
    assert_eq!(config["layout"]["container_width"], 800.0);
    assert_eq!(config["layout"]["search_bound"], "word-relative");
    assert!(config["stopwords_file"].is_null());
}

#[test]
fn dotfile_in_working_dir_is_found() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".answer-cloud.toml"), "[layout]\nmax_words = 12\n").unwrap();

    let config = resolved(tmp.path());

    assert_eq!(config["layout"]["max_words"], 12);
    assert!(config_file(&config).ends_with(".answer-cloud.toml"));
}

#[test]
fn regular_name_in_working_dir_is_found() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("answer-cloud.toml"), r#"segmenter = "whitespace""#).unwrap();

    let config = resolved(tmp.path());

    assert_eq!(config["segmenter"], "whitespace");
    assert!(config_file(&config).ends_with("answer-cloud.toml"));
}

#[test]
fn course_config_applies_to_nested_answer_folders() {
    let tmp = TempDir::new().unwrap();
    let week = tmp.path().join("answers").join("week3");
    fs::create_dir_all(&week).unwrap();
    fs::write(
        tmp.path().join(".answer-cloud.toml"),
        "[layout]\ncontainer_height = 320\n",
    )
    .unwrap();

    let config = resolved(&week);

    assert_eq!(config["layout"]["container_height"], 320.0);
    assert_eq!(config["layout"]["container_width"], 800.0);
}

#[test]
fn every_format_sets_layout() {
    let cases = [
        (".answer-cloud.toml", "[layout]\nmargin = 11\n"),
        (".answer-cloud.yaml", "layout:\n  margin: 12\n"),
        (".answer-cloud.yml", "layout:\n  margin: 13\n"),
        (".answer-cloud.json", r#"{"layout": {"margin": 14}}"#),
    ];
    for (expected, (name, body)) in (11..).zip(cases) {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(name), body).unwrap();

        let config = resolved(tmp.path());

        assert_eq!(config["layout"]["margin"], f64::from(expected), "{name}");
        assert!(config_file(&config).ends_with(name));
    }
}

#[test]
fn yaml_sets_search_bound_and_keeps_other_defaults() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".answer-cloud.yaml"),
        "layout:\n  container_width: 640\n  search_bound: container\n",
    )
    .unwrap();

    let layout = resolved(tmp.path())["layout"].clone();

    assert_eq!(layout["container_width"], 640.0);
    assert_eq!(layout["search_bound"], "container");
    assert_eq!(layout["container_height"], 500.0);
    assert_eq!(layout["size_range"], serde_json::json!([20.0, 56.0]));
}

// =============================================================================
// Precedence
// =============================================================================

#[test]
fn regular_name_outranks_dotfile_key_by_key() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".answer-cloud.toml"),
        "stopwords_file = \"common.txt\"\n[layout]\nmin_frequency = 2\n",
    )
    .unwrap();
    fs::write(
        tmp.path().join("answer-cloud.toml"),
        "stopwords_file = \"biology.txt\"\n",
    )
    .unwrap();

    let config = resolved(tmp.path());

    assert_eq!(config["stopwords_file"], "biology.txt");
    assert_eq!(config["layout"]["min_frequency"], 2);
}

#[test]
fn json_outranks_toml_in_one_directory() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("answer-cloud.toml"),
        "user_dict = \"terms.txt\"\n[layout]\nmax_words = 30\n",
    )
    .unwrap();
    fs::write(
        tmp.path().join("answer-cloud.json"),
        r#"{"layout": {"max_words": 35}}"#,
    )
    .unwrap();

    let config = resolved(tmp.path());

    assert_eq!(config["layout"]["max_words"], 35);
    assert_eq!(config["user_dict"], "terms.txt");
}

#[test]
fn nearer_directory_replaces_course_config() {
    let tmp = TempDir::new().unwrap();
    let class = tmp.path().join("class-b");
    fs::create_dir_all(&class).unwrap();
    fs::write(
        tmp.path().join(".answer-cloud.toml"),
        "segmenter = \"whitespace\"\n[layout]\nmargin = 10\n",
    )
    .unwrap();
    fs::write(class.join(".answer-cloud.toml"), "[layout]\nmargin = 24\n").unwrap();

    let config = resolved(&class);

    assert_eq!(config["layout"]["margin"], 24.0);
    assert_eq!(config["segmenter"], "jieba", "outer files are not merged");
}

#[test]
fn config_flag_outranks_discovered_files() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".answer-cloud.toml"),
        "[layout]\ncontainer_width = 640\ncontainer_height = 400\n",
    )
    .unwrap();
    let projector = tmp.path().join("projector.toml");
    fs::write(&projector, "[layout]\ncontainer_width = 1920\n").unwrap();

    let json = run_json(tmp.path(), &["--config", projector.to_str().unwrap(), "info"]);
    let config = &json["config"];

    assert_eq!(config["layout"]["container_width"], 1920.0);
    assert_eq!(config["layout"]["container_height"], 400.0);
    assert!(config_file(config).ends_with("projector.toml"));
}

#[test]
fn env_var_overrides_config_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".answer-cloud.toml"), "[layout]\nmax_words = 12\n").unwrap();

    let output = cmd()
        .env("ANSWER_CLOUD_LAYOUT__MAX_WORDS", "7")
        .env("ANSWER_CLOUD_SEGMENTER", "whitespace")
        .args(["-C", tmp.path().to_str().unwrap(), "info", "--json"])
        .output()
        .expect("failed to run command");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["config"]["layout"]["max_words"], 7);
    assert_eq!(json["config"]["segmenter"], "whitespace");
}

#[test]
fn disabled_input_limit_is_reported() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".answer-cloud.toml"),
        "disable_input_limit = true\n",
    )
    .unwrap();

    assert!(resolved(tmp.path())["max_input_bytes"].is_null());
}

// =============================================================================
// Effect on Commands
// =============================================================================

#[test]
fn project_layout_applies_to_generate() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".answer-cloud.toml"),
        "segmenter = \"whitespace\"\n\n[layout]\nmax_words = 2\ncontainer_width = 400\n",
    )
    .unwrap();
    fs::write(tmp.path().join("answers.txt"), "cat dog cat bird cat dog\n").unwrap();

    let json = run_json(tmp.path(), &["generate", "answers.txt"]);

    assert_eq!(json["items"].as_array().unwrap().len(), 2);
    assert_eq!(json["container_width"], 400.0);
    assert_eq!(json["items"][0]["x"], 200.0);
}

#[test]
fn project_stopwords_file_applies_to_frequencies() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".answer-cloud.toml"),
        "segmenter = \"whitespace\"\nstopwords_file = \"class-stopwords.txt\"\n",
    )
    .unwrap();
    fs::write(tmp.path().join("class-stopwords.txt"), "cat\n").unwrap();
    fs::write(tmp.path().join("answers.txt"), "cat dog cat bird cat dog\n").unwrap();

    let json = run_json(tmp.path(), &["frequencies", "answers.txt"]);

    let words: Vec<&str> = json["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["word"].as_str().unwrap())
        .collect();
    assert_eq!(words, vec!["dog", "bird"]);
}

// =============================================================================
// Errors and Tolerance
// =============================================================================

#[test]
fn malformed_files_fail_with_config_error() {
    let cases = [
        (".answer-cloud.toml", "[layout\nmax_words = "),
        (".answer-cloud.yaml", "layout:\n  max_words: [\n"),
        (".answer-cloud.json", "{\"layout\": }"),
    ];
    for (name, body) in cases {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(name), body).unwrap();

        cmd()
            .args(["-C", tmp.path().to_str().unwrap(), "info"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("configuration"));
    }
}

#[test]
fn invalid_search_bound_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".answer-cloud.toml"),
        "[layout]\nsearch_bound = \"everywhere\"\n",
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}

#[test]
fn unknown_layout_key_is_ignored() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".answer-cloud.toml"),
        "[layout]\nmax_words = 9\nfont_family = \"serif\"\n",
    )
    .unwrap();

    assert_eq!(resolved(tmp.path())["layout"]["max_words"], 9);
}

// =============================================================================
// Repository Boundary
// =============================================================================

#[test]
fn search_stops_at_repository_root() {
    let tmp = TempDir::new().unwrap();
    let repo = tmp.path().join("gradebook");
    let answers = repo.join("answers");
    fs::create_dir_all(&answers).unwrap();
    fs::create_dir(repo.join(".git")).unwrap();
    fs::write(tmp.path().join(".answer-cloud.toml"), "[layout]\nmax_words = 3\n").unwrap();

    let config = resolved(&answers);

    assert!(config["config_file"].is_null());
    assert_eq!(config["layout"]["max_words"], 50);
}

#[test]
fn config_at_repository_root_is_found() {
    let tmp = TempDir::new().unwrap();
    let answers = tmp.path().join("answers");
    fs::create_dir_all(&answers).unwrap();
    fs::create_dir(tmp.path().join(".git")).unwrap();
    fs::write(
        tmp.path().join(".answer-cloud.toml"),
        "[layout]\nrelative_scaling = 0.8\n",
    )
    .unwrap();

    let config = resolved(&answers);

    assert_eq!(config["layout"]["relative_scaling"], 0.8);
    assert!(config_file(&config).ends_with(".answer-cloud.toml"));
}
