// twrpgen/src/cli.rs
use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub const RULES_FILE_DEFAULT: &str = "twrp-rules.toml";

#[derive(Parser, Debug)]
#[command(name = "twrpgen", version, about = "TWRP recovery fstab and device tree generator")]
pub struct Cli {
    /// Source device fstab
    #[arg(short = 'f', long = "fstab")]
    pub fstab: Option<PathBuf>,
    /// Destination recovery fstab
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Partition rules file (TOML), replacing the built-in tables
    #[arg(short = 'r', long = "rules")]
    pub rules: Option<PathBuf>,
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the built-in partition rules to a TOML file
    GenRules {
        #[arg(short = 'o', long = "output", default_value = RULES_FILE_DEFAULT)]
        output: PathBuf,
    },
    /// Print the active partition rules in JSON format
    ShowRules,
    /// Detect a device binary's CPU architecture
    Arch { binary: PathBuf },
    /// Render device-tree makefiles into a target directory
    Render {
        #[arg(short = 'd', long = "out-dir")]
        out_dir: PathBuf,
        #[arg(short = 'c', long = "codename")]
        codename: String,
        #[arg(short = 'm', long = "manufacturer")]
        manufacturer: String,
        /// Target architecture (arm64, arm, x86_64, x86)
        #[arg(short = 'a', long = "arch")]
        arch: Option<String>,
        /// Detect the architecture from this binary instead
        #[arg(long = "probe", conflicts_with = "arch")]
        probe: Option<PathBuf>,
        /// Device fstab to derive partition facts from
        #[arg(short = 'f', long = "fstab")]
        fstab: Option<PathBuf>,
    },
}
