//! Prints a validated manifest in one of the shapes the console consumes.
//!
//! `--defaults` emits the attribute defaults, `--form` the category sections
//! in display order, and `--normalized` (the default) the manifest itself
//! with optional fields filled in from disk.

use anyhow::{Result, bail};
use component_manifest::ComponentIndex;
use serde_json::{Value, json};
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse()?;
    let component = ComponentIndex::load(&args.file)?;

    let output: Value = match args.view {
        View::Normalized => serde_json::to_value(component.manifest())?,
        View::Defaults => serde_json::to_value(component.defaults())?,
        View::Form => json!({
            "component": component.key().to_string(),
            "sections": component.form_sections(),
        }),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Normalized,
    Defaults,
    Form,
}

struct CliArgs {
    view: View,
    file: PathBuf,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut view: Option<View> = None;
        let mut file: Option<PathBuf> = None;

        for arg_os in env::args_os().skip(1) {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
            let selected = match arg.as_str() {
                "--normalized" => View::Normalized,
                "--defaults" => View::Defaults,
                "--form" => View::Form,
                "--help" | "-h" => {
                    eprintln!("Usage: manifest-render [--normalized|--defaults|--form] FILE");
                    std::process::exit(0);
                }
                other if other.starts_with("--") => bail!("unknown flag: {other}"),
                other => {
                    if file.is_some() {
                        bail!("only one manifest file may be rendered at a time");
                    }
                    file = Some(PathBuf::from(other));
                    continue;
                }
            };
            if view.replace(selected).is_some() {
                bail!("--normalized/--defaults/--form are mutually exclusive");
            }
        }

        let Some(file) = file else {
            bail!("missing manifest file argument");
        };
        Ok(Self {
            view: view.unwrap_or(View::Normalized),
            file,
        })
    }
}
