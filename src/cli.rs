use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use crate::core::{Engine, RunOptions};

#[derive(Parser)]
#[command(name = "modelmind")]
#[command(about = "Maps the model classes of a source tree into a mind map")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default modelmind.toml
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Print the discovered model outline
    Scan {
        /// Source tree to scan
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Print the module map as JSON instead of an outline
        #[arg(long)]
        json: bool,
    },

    /// Build the mind map and save it
    Export {
        /// Source tree to scan
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Project name, used as the sheet's root topic
        #[arg(short, long)]
        name: Option<String>,

        /// Output document path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Visit directories in name order for reproducible output
        #[arg(long)]
        sorted: bool,

        /// Attach each class's base expression as a note
        #[arg(long)]
        base_notes: bool,
    },
}

impl Cli {
    pub fn execute(self, mut engine: Engine) -> Result<()> {
        match self.command {
            Commands::Init { path, force } => engine.init(path, force),
            Commands::Scan { source, json } => {
                let rendered = engine.scan(source, json)?;
                print!("{}", rendered);
                if json {
                    println!();
                }
                Ok(())
            }
            Commands::Export { source, name, output, sorted, base_notes } => {
                engine.export(RunOptions { source, name, output, sorted, base_notes })?;
                Ok(())
            }
        }
    }
}
