#![forbid(unsafe_code)]

mod adt;
mod lookup;

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{error, info, warn};
use rayon::prelude::*;
use walkdir::WalkDir;

use adt::{AdtError, AdtResult};
use lookup::{load_config, load_listfile, LookupContext};

#[derive(Debug, Parser)]
#[command(
    name = "texadt",
    version,
    about = "Adds MTXP texture parameter chunks to split-tex terrain tiles"
)]
struct Cli {
    /// Directory of *_tex0.adt input tiles.
    #[arg(long, default_value = "Input")]
    input: PathBuf,

    /// Output directory for rewritten tiles.
    #[arg(long, default_value = "Output")]
    output: PathBuf,

    /// Texture parameter config directory (global.cfg plus per-tile overrides).
    #[arg(long, default_value = "config")]
    config: PathBuf,

    /// File id manifest ("id;path" lines).
    #[arg(long, default_value = "listfile.csv")]
    listfile: PathBuf,

    /// Minimum macro-cell alpha average for ground-effect placement.
    #[arg(long, default_value_t = 80)]
    cutoff: u32,

    /// Also patch the sibling root .adt files with the computed placement maps.
    #[arg(long, default_value_t = false)]
    patch_root: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> AdtResult<()> {
    // Config and listfile failures halt before any tile is touched.
    let lookup = LookupContext {
        textures: load_config(&cli.config)?,
        listfile: load_listfile(&cli.listfile)?,
    };

    fs::create_dir_all(&cli.output)?;

    let files: Vec<PathBuf> = WalkDir::new(&cli.input)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with("_tex0.adt"))
        })
        .collect();

    info!("processing {} tile(s)", files.len());

    // Each tile is an isolated unit of work; failures are collected and
    // reported after the barrier instead of aborting sibling tiles.
    let failed = files
        .par_iter()
        .map(|path| {
            process_file(path, cli, &lookup)
                .map_err(|e| error!("{}: {e}", path.display()))
        })
        .filter(Result::is_err)
        .count();

    info!(
        "all done, {} tile(s) processed, {failed} failed",
        files.len() - failed
    );

    if failed > 0 {
        return Err(AdtError::Batch { failed });
    }
    Ok(())
}

fn process_file(path: &Path, cli: &Cli, lookup: &LookupContext) -> AdtResult<()> {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return Err(AdtError::Malformed(format!(
            "unusable file name: {}",
            path.display()
        )));
    };
    let tile = name
        .strip_suffix("_tex0.adt")
        .unwrap_or(name)
        .to_lowercase();

    let input = fs::read(path)?;
    let out = adt::transcode_tex(&input, &tile, lookup, cli.cutoff)?;
    fs::write(cli.output.join(name), &out.bytes)?;
    info!("{tile} done");

    if cli.patch_root {
        match adt::rewrite_companion_file(path, &cli.output, &out.ground_effect_maps) {
            Err(AdtError::CompanionMissing(p)) => {
                warn!("companion file missing, skipping root patch: {}", p.display());
            }
            other => other?,
        }
    }

    Ok(())
}
