pub mod diff;
pub mod knowledge;
pub mod parse;
pub mod transform;
pub mod version;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use recast_core::model::RecipeInput;
use recast_core::{KnowledgeBase, RecastConfig};

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a recipe record and print the structured recipe
    Parse(parse::ParseArgs),
    /// Apply transformations and print the recipe and its diff
    Transform(transform::TransformArgs),
    /// Apply transformations and print only the diff
    Diff(diff::DiffArgs),
    /// List known styles, primary methods, and diets
    Knowledge,
    /// Print version information
    Version,
}

/// Flags that override the config file.
#[derive(Args)]
pub struct SettingsArgs {
    /// Config file (defaults to ./recast.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Knowledge-base JSON replacing the built-in tables
    #[arg(long, global = true)]
    pub knowledge_base: Option<PathBuf>,

    /// Seed for operations that pick substitutes at random
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

/// Resolved configuration plus the loaded knowledge base.
pub struct Session {
    pub config: RecastConfig,
    pub kb: Arc<KnowledgeBase>,
}

impl Session {
    pub fn load(settings: &SettingsArgs) -> Result<Self> {
        let mut config = RecastConfig::load(settings.config.as_deref())
            .context("Failed to load configuration")?;
        if let Some(path) = &settings.knowledge_base {
            config.knowledge_base = Some(path.clone());
        }
        if let Some(seed) = settings.seed {
            config.seed = Some(seed);
        }
        let kb = config
            .knowledge_base()
            .context("Failed to load knowledge base")?;
        debug!(?config, "session ready");
        Ok(Self {
            config,
            kb: Arc::new(kb),
        })
    }

    pub fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Read a recipe record from `path`, or stdin for `-`.
pub fn read_input(path: &Path) -> Result<RecipeInput> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read recipe from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&text)
        .with_context(|| format!("Malformed recipe record in {}", path.display()))
}
