use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use truthguard_config::{ClientMode, TruthGuardConfig};

#[derive(Debug, Parser)]
#[command(
    name = "truthguard",
    version,
    about = "Check text, images and videos for misinformation and manipulation"
)]
pub struct Cli {
    /// YAML configuration file (defaults to the user config dir and ./truthguard.yaml)
    #[arg(long, env = "TRUTHGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Analysis backend to use
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Base URL of the analysis service, e.g. http://127.0.0.1:8000/analyze
    #[arg(long)]
    pub base_url: Option<String>,

    /// Fixed seed for the simulated backend
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the canonical result as JSON instead of a report
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a piece of text ("-" reads stdin)
    Text { text: String },
    /// Analyze an image file (PNG, JPG up to 10MB)
    Image { path: PathBuf },
    /// Analyze a video file (MP4, MOV up to 50MB)
    Video { path: PathBuf },
    /// Check whether the configured backend is reachable
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Remote,
    Simulated,
}

impl From<ModeArg> for ClientMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Remote => ClientMode::Remote,
            ModeArg::Simulated => ClientMode::Simulated,
        }
    }
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut TruthGuardConfig) {
        if let Some(mode) = self.mode {
            config.client.mode = mode.into();
        }
        if let Some(base_url) = &self.base_url {
            config.client.base_url = base_url.clone();
        }
        if let Some(seed) = self.seed {
            config.client.seed = Some(seed);
        }
    }
}
