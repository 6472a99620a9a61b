//! rigbridge - glTF skeleton transcoder
//!
//! Imports glTF skins as armatures and exports actions as glTF animations.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rigbridge_scene::Scene;
use std::path::PathBuf;

use rigbridge::{config, export, import};

#[derive(Parser)]
#[command(name = "rigbridge")]
#[command(about = "glTF skeleton transcoder")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import skins from a glTF file and print a summary
    Import {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Config file (defaults to ./rigbridge.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the import report as JSON
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Export actions from an animation source file to GLB
    Export {
        /// Input animation source (.json)
        input: PathBuf,

        /// Output .glb file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file (defaults to ./rigbridge.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import {
            input,
            config,
            report,
        } => {
            let config = config::resolve_config(config.as_deref())?;
            tracing::info!("Importing {:?}", input);

            let mut scene = Scene::new("Scene");
            let summary = import::import_gltf(&input, &mut scene, &config.import)?;
            for skin in &summary.skins {
                tracing::info!(
                    "  skin {}: {} ({} bones, {} weights{})",
                    skin.skin,
                    skin.armature.as_deref().unwrap_or("<shared joints, skipped>"),
                    skin.bones.len(),
                    skin.weights,
                    if skin.bound { ", bound" } else { "" }
                );
            }

            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&summary)
                    .context("Failed to serialize import report")?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write report: {:?}", path))?;
                tracing::info!("Report written to {:?}", path);
            }
            tracing::info!("Done!");
        }

        Commands::Export {
            input,
            output,
            config,
        } => {
            let config = config::resolve_config(config.as_deref())?;
            let output = output.unwrap_or_else(|| input.with_extension("glb"));
            tracing::info!("Exporting {:?} -> {:?}", input, output);
            export::export_glb(&input, &output, &config.export)?;
            tracing::info!("Done!");
        }
    }

    Ok(())
}
