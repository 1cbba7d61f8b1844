//! Validates component manifests.
//!
//! With no inputs, every `metadata.json` under the repository's `components/`
//! directory is checked. Valid components print `ok <name>@<version>` on
//! stdout; each failure is printed on stderr and the exit status becomes 1.

use anyhow::{Context, Result, bail};
use component_manifest::{
    ComponentCatalog, ComponentIndex, ManifestSchema, default_components_dir,
    default_schema_path, parse_manifest_stream,
};
use std::collections::BTreeSet;
use std::env;
use std::io::{self, Read};
use std::path::PathBuf;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<bool> {
    let args = CliArgs::parse()?;
    let schema_path = args.schema.clone().unwrap_or_else(default_schema_path);
    let schema = if args.schema_versions.is_empty() {
        ManifestSchema::load(&schema_path)?
    } else {
        ManifestSchema::load_pinned(&schema_path, &args.schema_versions)?
    };
    let mut catalog = ComponentCatalog::default();
    let mut clean = true;

    let mut dirs = args.catalog_dirs.clone();
    if dirs.is_empty() && args.files.is_empty() && !args.stdin {
        dirs.push(default_components_dir()?);
    }

    for dir in &dirs {
        let report = catalog.load_dir(dir, &schema)?;
        for key in &report.loaded {
            println!("ok {key}");
        }
        for (path, reason) in &report.failures {
            eprintln!("{}: {reason}", path.display());
        }
        clean &= report.is_clean();
    }

    for file in &args.files {
        let outcome = ComponentIndex::load_with_schema(file, &schema)
            .and_then(|component| {
                let key = component.key().clone();
                catalog.register(component).map(|()| key)
            });
        match outcome {
            Ok(key) => println!("ok {key}"),
            Err(err) => {
                eprintln!("{}: {err:#}", file.display());
                clean = false;
            }
        }
    }

    if args.stdin {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("reading stdin")?;
        for (idx, value) in parse_manifest_stream(&input)?.into_iter().enumerate() {
            let origin = format!("stdin manifest {}", idx + 1);
            let outcome = ComponentIndex::from_value(value, &origin, &schema)
                .and_then(|component| {
                    let key = component.key().clone();
                    catalog.register(component).map(|()| key)
                });
            match outcome {
                Ok(key) => println!("ok {key}"),
                Err(err) => {
                    eprintln!("{origin}: {err:#}");
                    clean = false;
                }
            }
        }
    }

    Ok(clean)
}

struct CliArgs {
    catalog_dirs: Vec<PathBuf>,
    files: Vec<PathBuf>,
    schema: Option<PathBuf>,
    schema_versions: BTreeSet<String>,
    stdin: bool,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut catalog_dirs = Vec::new();
        let mut files = Vec::new();
        let mut schema = None;
        let mut schema_versions = BTreeSet::new();
        let mut stdin = false;

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--catalog-dir" => {
                    catalog_dirs.push(PathBuf::from(next_value(&mut args, "--catalog-dir")?));
                }
                "--schema" => {
                    if schema.is_some() {
                        bail!("--schema may only be provided once");
                    }
                    schema = Some(PathBuf::from(next_value(&mut args, "--schema")?));
                }
                "--schema-version" => {
                    schema_versions.insert(next_value(&mut args, "--schema-version")?);
                }
                "--stdin" | "-" => stdin = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other if other.starts_with("--") => bail!("unknown flag: {other}"),
                other => files.push(PathBuf::from(other)),
            }
        }

        Ok(Self {
            catalog_dirs,
            files,
            schema,
            schema_versions,
            stdin,
        })
    }
}

fn next_value(args: &mut impl Iterator<Item = std::ffi::OsString>, flag: &str) -> Result<String> {
    let value = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("{flag} requires a value"))?;
    value
        .into_string()
        .map_err(|_| anyhow::anyhow!("{flag} value is not valid UTF-8"))
}

fn print_usage() {
    eprintln!(
        "Usage: manifest-lint [--schema PATH] [--schema-version V]... [--catalog-dir DIR]... [--stdin] [FILE...]\n\n\
         Validates component manifests. Without inputs, lints components/ under the repository root.\n\
         --schema-version refuses a schema whose schema_version is not one of the given values."
    );
}
