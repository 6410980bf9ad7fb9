use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use des_core::to_canonical_json_bytes;
use des_load::{Loader, SimulationLoader};

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// YAML simulation description to snapshot.
    #[arg(long)]
    pub description: PathBuf,
    /// Output file for the canonical snapshot.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &SnapshotArgs) -> Result<(), Box<dyn Error>> {
    let loader =
        SimulationLoader::load(&args.description).map_err(|err| Box::new(err) as Box<dyn Error>)?;
    let snapshot = loader.snapshot().map_err(|err| Box::new(err) as Box<dyn Error>)?;
    let bytes =
        to_canonical_json_bytes(&snapshot).map_err(|err| Box::new(err) as Box<dyn Error>)?;
    if let Some(parent) = args.out.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&args.out, bytes)?;
    Ok(())
}
