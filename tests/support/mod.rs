use anyhow::{Context, Result, bail};
use component_manifest::find_repo_root;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn repo_root() -> PathBuf {
    find_repo_root().expect("tests require repository root")
}

pub fn support_manifest_path() -> PathBuf {
    repo_root().join("components/support/metadata.json")
}

/// Copies of the shipped support manifest, tweaked per test.
pub fn support_manifest_value() -> Value {
    let raw = fs::read_to_string(support_manifest_path()).expect("support manifest readable");
    serde_json::from_str(&raw).expect("support manifest is JSON")
}

pub fn write_manifest(dir: &Path, component: &str, value: &Value) -> Result<PathBuf> {
    let component_dir = dir.join(component);
    fs::create_dir_all(&component_dir)?;
    let path = component_dir.join("metadata.json");
    fs::write(&path, serde_json::to_string_pretty(value)?)?;
    Ok(path)
}

pub fn helper_binary(name: &str) -> PathBuf {
    let path = match name {
        "manifest-lint" => PathBuf::from(env!("CARGO_BIN_EXE_manifest-lint")),
        "manifest-render" => PathBuf::from(env!("CARGO_BIN_EXE_manifest-render")),
        other => panic!("unknown helper {other}"),
    };
    assert!(path.is_file(), "helper {} missing at {}", name, path.display());
    path
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}
