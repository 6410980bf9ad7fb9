use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use des_load::{resolve_remote_dependencies, Loader, SimulationLoader};
use serde_json::json;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// YAML simulation description to validate.
    #[arg(long)]
    pub description: PathBuf,
    /// Also verify that declared remote dependencies exist and match digests.
    #[arg(long)]
    pub check_remotes: bool,
}

pub fn run(args: &ValidateArgs) -> Result<(), Box<dyn Error>> {
    let loader =
        SimulationLoader::load(&args.description).map_err(|err| Box::new(err) as Box<dyn Error>)?;

    if args.check_remotes {
        let base = args
            .description
            .parent()
            .unwrap_or_else(|| Path::new("."));
        resolve_remote_dependencies(loader.remote_dependencies(), base)
            .map_err(|err| Box::new(err) as Box<dyn Error>)?;
    }

    let summary = json!({
        "name": loader.description().name,
        "input_hash": loader.input_hash(),
        "variables": loader.variables().len(),
        "dependent_variables": loader.dependent_variables().len(),
        "constants": loader.constants().len(),
        "remote_dependencies": loader
            .remote_dependencies()
            .iter()
            .map(|dep| dep.path.clone())
            .collect::<Vec<_>>(),
        "launcher": loader.launcher().name(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
