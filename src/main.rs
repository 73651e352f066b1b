//! `bspmerge` — command-line front end over the `bsp::merge` engine.

use std::path::PathBuf;
use std::process::ExitCode;

use bsp::error::{BspError, MergeError};
use bsp::merge::merge_all_with;
use bsp::Bsp;
use clap::{Parser, Subcommand};
use glam::Vec3;
use log::{error, info};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct BspMergeCli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Merge two or more compiled BSP maps into a single map.
    Merge {
        /// Gap, in units, left between packed maps on each axis.
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], default_values_t = [64.0, 64.0, 64.0])]
        gap: Vec<f32>,
        /// Where to write the merged map.
        #[arg(short, long)]
        output: PathBuf,
        /// Input .bsp files, in the order they should be packed.
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Bsp(#[from] BspError),
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error("need at least two input maps to merge, got {0}")]
    NotEnoughInputs(usize),
    #[error("failed to write merged map: {0}")]
    Write(#[from] eyre::Report),
}

impl CliError {
    /// Exit code convention: 2 for a merge that was genuinely rejected
    /// (unpackable/unseparable inputs), 1 for everything else.
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Merge(MergeError::NotSeparable | MergeError::InsufficientRoom { .. }) => 2,
            _ => 1,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = BspMergeCli::parse();

    let result = match cli.command {
        Commands::Merge {
            gap,
            output,
            inputs,
        } => run_merge(gap, output, inputs),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run_merge(gap: Vec<f32>, output: PathBuf, inputs: Vec<PathBuf>) -> Result<(), CliError> {
    if inputs.len() < 2 {
        return Err(CliError::NotEnoughInputs(inputs.len()));
    }

    let gap = Vec3::new(gap[0], gap[1], gap[2]);

    let maps = inputs
        .iter()
        .map(Bsp::from_file)
        .collect::<Result<Vec<_>, _>>()?;

    info!("loaded {} maps, packing with gap {gap}", maps.len());

    let (merged, diagnostics) = merge_all_with(maps, gap, &mut log_progress, &|| false)?;

    for diagnostic in &diagnostics {
        log::warn!("{diagnostic}");
    }

    merged.write_to_file(output.clone())?;
    info!("wrote merged map to {}", output.display());

    Ok(())
}

fn log_progress(stage: &str, completed: usize, total: usize) {
    info!("{stage}: {completed}/{total}");
}
