use crate::app::report::OutputFormat;
use crate::config::toml_config::AppConfig;
use crate::domain::model::Query;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_range, Validate};
use clap::{Parser, Subcommand};
use std::path::Path;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "bookrec.toml";

#[derive(Debug, Clone, Parser)]
#[command(name = "bookrec")]
#[command(about = "Hybrid book recommendations from two precomputed models")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory or .zip bundle with the catalog and model files
    #[arg(long)]
    pub assets: Option<String>,

    /// Override the latent factor model weight
    #[arg(long)]
    pub weight_a: Option<f64>,

    /// Override the neighbourhood model weight
    #[arg(long)]
    pub weight_b: Option<f64>,

    /// Output format for results
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Log process CPU and memory usage")]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Recommend unread books for a user
    User {
        user_id: String,
        /// Number of recommendations
        #[arg(short = 'n', long)]
        top_n: Option<usize>,
    },
    /// Find books similar to a title
    Similar {
        title: String,
        /// Number of similar books
        #[arg(short = 'n', long)]
        top_n: Option<usize>,
    },
    /// List known user ids
    Users {
        #[arg(long, default_value = "50")]
        limit: usize,
    },
}

impl CliConfig {
    /// Loads the TOML config (if any), applies CLI overrides and validates.
    pub fn load_app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => AppConfig::from_file(DEFAULT_CONFIG_FILE)?,
            None => AppConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(assets) = &self.assets {
            config.assets.path = assets.clone();
            tracing::info!("🔧 Assets path overridden to: {}", assets);
        }
        if let Some(weight_a) = self.weight_a {
            config.scoring.weight_a = weight_a;
        }
        if let Some(weight_b) = self.weight_b {
            config.scoring.weight_b = weight_b;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
    }

    /// Builds the engine query for the chosen subcommand. `Users` has none.
    ///
    /// The 5–20 style bound on user recommendations is enforced here, not in
    /// the engine.
    pub fn query<C: ConfigProvider>(&self, config: &C) -> Result<Option<Query>> {
        match &self.command {
            Command::User { user_id, top_n } => {
                let top_n = top_n.unwrap_or_else(|| config.default_top_n());
                let (min, max) = config.top_n_bounds();
                validate_range("top_n", top_n, min, max)?;
                Ok(Some(Query::User {
                    user_id: user_id.clone(),
                    top_n,
                }))
            }
            Command::Similar { title, top_n } => {
                let top_n = top_n.unwrap_or_else(|| config.similar_top_n());
                validate_positive_number("top_n", top_n, 1)?;
                Ok(Some(Query::Title {
                    text: title.clone(),
                    top_n,
                }))
            }
            Command::Users { .. } => Ok(None),
        }
    }
}
