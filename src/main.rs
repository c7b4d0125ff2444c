use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use redmod_installer::config::AppConfig;
use redmod_installer::context::{InstallContext, InstallingDir, ModInfo, ModVersion};
use redmod_installer::host::TracingHost;
use redmod_installer::pipeline;
use redmod_installer::scan::scan_tree;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "redmod-installer")]
#[command(author, version, about = "Classify and plan an unpacked Cyberpunk 2077 mod archive")]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether the pipeline recognizes an unpacked archive's layout
    Test {
        /// Directory containing the unpacked archive
        dir: PathBuf,
        /// Game identifier the host is installing for
        #[arg(long, default_value = "cyberpunk2077")]
        game_id: String,
    },
    /// Run the pipeline against an unpacked archive and print its instructions
    Install {
        /// Directory containing the unpacked archive
        dir: PathBuf,
        /// The mod's name, as the host's `ModInfo` would supply it
        #[arg(long, default_value = "Mod")]
        mod_name: String,
        /// The mod's version string
        #[arg(long, default_value = "1.0")]
        mod_version: String,
        /// Enable REDmod autoconversion for canonical archive-only mods
        #[arg(long)]
        autoconvert: bool,
    },
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "redmod_installer=info",
        1 => "redmod_installer=debug",
        _ => "trace",
    };

    let log_dir = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".redmod-installer");
    std::fs::create_dir_all(&log_dir).ok();
    let log_file = log_dir.join("redmod-installer.log");

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .expect("failed to open log file");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());
    let file_layer = tracing_subscriber::fmt::layer().with_target(false).with_writer(std::sync::Arc::new(file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = AppConfig::load().unwrap_or_default();

    match cli.command {
        Commands::Test { dir, game_id } => {
            let files = scan_tree(&dir)?;
            let result = pipeline::test_supported(&files, &game_id);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Install { dir, mod_name, mod_version, autoconvert } => {
            let files = scan_tree(&dir)?;
            let host = TracingHost;
            let mod_info = ModInfo {
                name: mod_name,
                version: ModVersion { v: mod_version },
                installing_dir: InstallingDir { path_on_disk: dir.clone() },
            };
            let mut features = config.to_features();
            if autoconvert {
                features.redmod_autoconvert_archives = redmod_installer::context::AutoconvertPolicy::Enabled;
            }
            let ctx = InstallContext { host: &host, staging_dir: &dir, mod_info: &mod_info, features: &features };
            let instructions = pipeline::install(&files, &ctx)?;
            println!("{}", serde_json::to_string_pretty(&instructions)?);
        }
    }

    Ok(())
}
