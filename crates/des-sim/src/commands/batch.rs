use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use des_core::to_canonical_json_bytes;
use des_exp::{batch, BatchReport};
use des_load::SimulationLoader;

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// YAML simulation description whose domains drive the expansion.
    #[arg(long)]
    pub description: PathBuf,
    /// Output directory for batch artefacts.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &BatchArgs) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.out)?;
    let loader =
        SimulationLoader::load(&args.description).map_err(|err| Box::new(err) as Box<dyn Error>)?;
    let report = batch(loader.catalog(), loader.description().seed)
        .map_err(|err| Box::new(err) as Box<dyn Error>)?;
    persist_report(&args.out, &report)?;
    Ok(())
}

fn persist_report(out: &Path, report: &BatchReport) -> Result<(), Box<dyn Error>> {
    let bytes = to_canonical_json_bytes(report).map_err(|err| Box::new(err) as Box<dyn Error>)?;
    fs::write(out.join("batch_report.json"), bytes)?;
    for job in &report.jobs {
        let job_dir = out.join(&job.out_dir);
        fs::create_dir_all(&job_dir)?;
        let params_bytes =
            to_canonical_json_bytes(&job.bindings).map_err(|err| Box::new(err) as Box<dyn Error>)?;
        fs::write(job_dir.join("params.json"), params_bytes)?;
        let status = format!("{}\nseed={}", job.status, job.seed);
        fs::write(job_dir.join("STATUS"), status)?;
    }
    Ok(())
}
