use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "droid-explorer",
    version,
    about = "Unattended Android UI explorer for forensic artifact discovery"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Device serial (adb -s)
    #[arg(long, global = true)]
    pub serial: Option<String>,

    /// Path to config file (default: droid-explorer.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Explore an installed app for a fixed time budget
    Explore {
        /// Target package name
        #[arg(long)]
        package: String,

        /// Session duration in seconds (default 600, config file can override)
        #[arg(long)]
        duration: Option<u64>,

        /// Output directory for session artifacts
        #[arg(short, long, default_value = "artifacts_output")]
        output_dir: String,

        /// Seed for the deterministic action picker
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Archive every raw hierarchy dump under <output>/ui_xml/
        #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
        save_ui_xml: bool,
    },

    /// Probe the device and target app without exploring
    Check {
        /// Target package name
        #[arg(long)]
        package: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `droid-explorer.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub explore: ExploreConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExploreConfig {
    #[serde(default = "default_duration")]
    pub duration_secs: u64,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub save_ui_xml: bool,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            duration_secs: 600,
            output_dir: "artifacts_output".to_string(),
            seed: 1,
            save_ui_xml: false,
        }
    }
}

/// Optional vision classifier endpoint; absent means the layer is skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisionConfig {
    pub endpoint: Option<String>,
}

/// Optional instrumentation agent host command; absent disables the
/// collaborator entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    pub program: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

// Serde default helpers
fn default_duration() -> u64 { 600 }
fn default_output_dir() -> String { "artifacts_output".to_string() }
fn default_seed() -> u64 { 1 }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("droid-explorer.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}
