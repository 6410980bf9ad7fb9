//! Remote dependency resolution: existence and digest checks.

use std::fs;
use std::path::{Path, PathBuf};

use des_core::errors::{DesError, ErrorInfo};
use sha2::{Digest, Sha256};

use crate::description::RemoteDependency;

/// Resolves declared remote dependencies against a base directory.
///
/// Returns the absolute paths in declaration order. Each path must exist;
/// when a digest is declared the file content must hash to it. Resolution is
/// deliberately separate from parsing so descriptions can be validated on
/// hosts that do not carry the data files.
pub fn resolve_remote_dependencies(
    dependencies: &[RemoteDependency],
    base_dir: &Path,
) -> Result<Vec<PathBuf>, DesError> {
    let mut resolved = Vec::with_capacity(dependencies.len());
    for dependency in dependencies {
        let path = base_dir.join(&dependency.path);
        if !path.is_file() {
            return Err(DesError::Io(
                ErrorInfo::new("missing-remote", "declared dependency file not found")
                    .with_context("path", path.display().to_string()),
            ));
        }
        if let Some(expected) = &dependency.sha256 {
            let bytes = fs::read(&path).map_err(|err| {
                DesError::Io(
                    ErrorInfo::new("remote-read", err.to_string())
                        .with_context("path", path.display().to_string()),
                )
            })?;
            let actual = hex::encode(Sha256::digest(&bytes));
            if actual != expected.to_lowercase() {
                return Err(DesError::Io(
                    ErrorInfo::new("checksum-mismatch", "dependency content digest drifted")
                        .with_context("path", path.display().to_string())
                        .with_context("expected", expected.clone())
                        .with_context("actual", actual),
                ));
            }
        }
        resolved.push(path);
    }
    Ok(resolved)
}
