use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use des_core::{to_canonical_json_bytes, Euclidean2D};
use des_load::{Loader, SimulationLoader};
use serde_json::Value;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML simulation description to resolve.
    #[arg(long)]
    pub description: PathBuf,
    /// Variable overrides as `name=value`; values parse as JSON, falling
    /// back to plain strings.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub sets: Vec<String>,
    /// YAML file with a name/value override mapping; `--set` entries win on
    /// conflict.
    #[arg(long)]
    pub bindings: Option<PathBuf>,
    /// Output directory for environment artefacts.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.out)?;
    let loader =
        SimulationLoader::load(&args.description).map_err(|err| Box::new(err) as Box<dyn Error>)?;
    let mut overrides = BTreeMap::new();
    if let Some(path) = &args.bindings {
        let text = fs::read_to_string(path)?;
        let file_overrides: BTreeMap<String, Value> = serde_yaml::from_str(&text)?;
        overrides.extend(file_overrides);
    }
    overrides.extend(parse_overrides(&args.sets)?);

    let environment = loader
        .environment_with::<Value, Euclidean2D>(&overrides)
        .map_err(|err| Box::new(err) as Box<dyn Error>)?;

    let bytes =
        to_canonical_json_bytes(&environment).map_err(|err| Box::new(err) as Box<dyn Error>)?;
    fs::write(args.out.join("environment.json"), bytes)?;

    let mut provenance = environment.provenance.clone();
    provenance.created_at = Utc::now().to_rfc3339();
    let json = serde_json::to_string_pretty(&provenance)?;
    fs::write(args.out.join("provenance.json"), json)?;

    Ok(())
}

fn parse_overrides(sets: &[String]) -> Result<BTreeMap<String, Value>, Box<dyn Error>> {
    let mut overrides = BTreeMap::new();
    for entry in sets {
        let (name, raw) = entry
            .split_once('=')
            .ok_or_else(|| format!("override `{entry}` is not of the form name=value"))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        overrides.insert(name.to_string(), value);
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overrides_parse_json_then_fall_back_to_strings() {
        let parsed = parse_overrides(&[
            "n=5".to_string(),
            "ratio=0.25".to_string(),
            "label=baseline".to_string(),
            "flag=true".to_string(),
        ])
        .expect("parse");
        assert_eq!(parsed["n"], json!(5));
        assert_eq!(parsed["ratio"], json!(0.25));
        assert_eq!(parsed["label"], json!("baseline"));
        assert_eq!(parsed["flag"], json!(true));
    }

    #[test]
    fn malformed_override_is_rejected() {
        assert!(parse_overrides(&["n".to_string()]).is_err());
    }
}
