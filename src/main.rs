use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use goalpatch::patch::{patch_goal_card, DEFAULT_TARGET};

/// One-shot patcher for the weekly goal card component
#[derive(Parser, Debug)]
#[command(name = "goalpatch", version, about)]
struct Cli {
    /// Target file to patch in place
    #[arg(default_value = DEFAULT_TARGET)]
    target: PathBuf,

    /// Print the per-step outcome report as JSON instead of the fixed
    /// completion message
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    goalpatch::init().context("Failed to initialize goalpatch")?;

    let cli = Cli::parse();
    info!(
        "Starting goalpatch v{} against {}",
        goalpatch::version(),
        cli.target.display()
    );

    let report = patch_goal_card(&cli.target)
        .with_context(|| format!("Failed to patch {}", cli.target.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("patch complete: close button and layout fixes applied");
    }

    Ok(())
}
