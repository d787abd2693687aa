//! MCP (Model Context Protocol) server implementation.
//!
//! Exposes word-frequency analysis and word-cloud layout to AI assistants
//! over stdio. The server holds one [`WordCloudEngine`] built from the loaded
//! configuration, so the segmenter is initialized once and shared by every
//! call. Per-call parameters override the configured layout for that call
//! only.

use std::sync::Arc;

use answer_cloud_core::config::{Config, LayoutConfig};
use answer_cloud_core::placement::SearchBound;
use answer_cloud_core::{Answer, WordCloudEngine};
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};

use crate::commands::generate::render_html;

/// Parameters for the `get_info` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetInfoParams {
    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "text".to_string()
}

/// Parameters for the `word_frequencies` tool.
#[derive(Debug, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct WordFrequenciesParams {
    /// Answer texts, one per student.
    pub answers: Vec<String>,
    /// Keep at most this many words.
    pub max_words: Option<usize>,
    /// Drop words counted fewer times than this.
    pub min_frequency: Option<usize>,
    /// Count purely numeric tokens.
    pub include_numbers: Option<bool>,
}

/// Parameters for the `generate_word_cloud` tool.
#[derive(Debug, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct GenerateWordCloudParams {
    /// Answer texts, one per student.
    pub answers: Vec<String>,
    /// Keep at most this many words.
    pub max_words: Option<usize>,
    /// Container width in pixels.
    pub container_width: Option<f64>,
    /// Container height in pixels.
    pub container_height: Option<f64>,
    /// "word-relative" (default) or "container".
    pub search_bound: Option<SearchBound>,
    /// Return an HTML fragment instead of JSON.
    #[serde(default)]
    pub html: bool,
}

/// MCP server exposing word-cloud tools.
#[derive(Clone)]
pub struct WordCloudServer {
    engine: Arc<WordCloudEngine>,
    max_input: Option<usize>,
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
}

impl Default for WordCloudServer {
    fn default() -> Self {
        let config = Config::default();
        Self::new(&config, config.input_limit())
    }
}

fn to_answers(texts: Vec<String>) -> Vec<Answer> {
    texts.into_iter().map(Answer::from).collect()
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))
}

#[tool_router]
impl WordCloudServer {
    /// Create a server from loaded configuration.
    pub fn new(config: &Config, max_input: Option<usize>) -> Self {
        Self {
            engine: Arc::new(WordCloudEngine::from_config(config)),
            max_input,
            tool_router: Self::tool_router(),
        }
    }

    fn check_input(&self, answers: &[String]) -> Result<(), McpError> {
        let Some(max) = self.max_input else {
            return Ok(());
        };
        let size: usize = answers.iter().map(String::len).sum();
        if size > max {
            return Err(McpError::invalid_params(
                format!("input too large: {size} bytes (limit: {max} bytes)"),
                None,
            ));
        }
        Ok(())
    }

    fn layout(&self) -> LayoutConfig {
        self.engine.layout().clone()
    }

    /// Get project information.
    #[tool(description = "Get project name, version, and description")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn get_info(
        &self,
        Parameters(params): Parameters<GetInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "get_info", format = %params.format, "executing MCP tool");

        let info = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "layout": self.engine.layout(),
        });

        let text = if params.format == "json" {
            to_json(&info)?
        } else {
            format!(
                "{} v{}\n{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION"),
            )
        };

        tracing::info!(tool = "get_info", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Rank the words in a set of answers.
    #[tool(
        description = "Count word frequencies across student answers. Returns ranked words with counts and frequencies normalized to the top word."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn word_frequencies(
        &self,
        Parameters(params): Parameters<WordFrequenciesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "word_frequencies", max_words = ?params.max_words, "executing MCP tool");
        self.check_input(&params.answers)?;

        let mut layout = self.layout();
        if let Some(n) = params.max_words {
            layout.max_words = n;
        }
        if let Some(n) = params.min_frequency {
            layout.min_frequency = n;
        }
        if let Some(on) = params.include_numbers {
            layout.include_numbers = on;
        }

        let report = self
            .engine
            .frequencies_with(&to_answers(params.answers), &layout);
        let json = to_json(&report)?;

        tracing::info!(
            tool = "word_frequencies",
            words = report.entries.len(),
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Lay out a word cloud.
    #[tool(
        description = "Generate a word cloud from student answers. Returns positioned, sized, rotated, and colored words as JSON, or an HTML fragment."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn generate_word_cloud(
        &self,
        Parameters(params): Parameters<GenerateWordCloudParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "generate_word_cloud", html = params.html, "executing MCP tool");
        self.check_input(&params.answers)?;

        let mut layout = self.layout();
        if let Some(n) = params.max_words {
            layout.max_words = n;
        }
        if let Some(w) = params.container_width {
            layout.container_width = w;
        }
        if let Some(h) = params.container_height {
            layout.container_height = h;
        }
        if let Some(bound) = params.search_bound {
            layout.search_bound = bound;
        }

        let cloud = self
            .engine
            .generate_with(&to_answers(params.answers), &layout);
        let text = if params.html {
            render_html(&cloud)
        } else {
            to_json(&cloud)?
        };

        tracing::info!(
            tool = "generate_word_cloud",
            words = cloud.len(),
            fallbacks = cloud.fallbacks,
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for WordCloudServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "{} MCP server. Pass student answers to word_frequencies or generate_word_cloud.",
                env!("CARGO_PKG_NAME"),
            )),
        }
    }
}
