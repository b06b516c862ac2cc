// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands:
//   extract — send a PDF to the backend, then review it
//   open    — review a previous extraction from disk
//   export  — export a previous extraction without reviewing
//
// Backend settings can come from a JSON config file; flags
// given on the command line win over the file.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::application::review_use_case::ReviewConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract exercises and figures from a PDF, then review them
    Extract(ExtractArgs),

    /// Review exercises.json/figures.json left by a previous extraction
    Open(OpenArgs),

    /// Export a previous extraction straight to JSON
    Export(ExportArgs),
}

/// Settings shared by the commands that talk to the backend
#[derive(Args, Debug, Default)]
pub struct BackendArgs {
    /// JSON file with default settings
    #[arg(long)]
    pub config: Option<String>,

    /// Base URL of the extraction backend
    #[arg(long)]
    pub api_url: Option<String>,

    /// API credential forwarded to the extraction backend
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Seconds to wait for a backend answer (extraction can take minutes)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Directory exports are written to
    #[arg(long)]
    pub export_dir: Option<String>,
}

impl BackendArgs {
    /// Build the application config: file (or defaults), then flags.
    /// The application layer never sees clap types.
    pub fn into_config(self) -> Result<ReviewConfig> {
        let mut cfg = match &self.config {
            Some(path) => ReviewConfig::from_file(path)?,
            None       => ReviewConfig::default(),
        };

        if let Some(url) = self.api_url       { cfg.api_base_url = url; }
        if let Some(key) = self.api_key       { cfg.api_key = Some(key); }
        if let Some(t)   = self.timeout_secs  { cfg.request_timeout_secs = t; }
        if let Some(dir) = self.export_dir    { cfg.export_dir = dir; }
        Ok(cfg)
    }
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// PDF with the exercises (figures marked with red boxes)
    #[arg(long)]
    pub pdf: String,

    #[command(flatten)]
    pub backend: BackendArgs,
}

#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Directory holding exercises.json and figures.json
    #[arg(long, default_value = "extracted_data")]
    pub data_dir: String,

    #[command(flatten)]
    pub backend: BackendArgs,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Directory holding exercises.json and figures.json
    #[arg(long, default_value = "extracted_data")]
    pub data_dir: String,

    /// Directory the export file is written to
    #[arg(long, default_value = ".")]
    pub out_dir: String,
}
