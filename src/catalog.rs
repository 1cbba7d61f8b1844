//! Holds validated components for lookup by name and version.
//!
//! Registration is strict about identity (one entry per name+version) and
//! loading is lenient about neighbours: a broken manifest is reported and
//! skipped while the rest of the directory still loads.

use crate::MANIFEST_FILE;
use crate::manifest::{CatalogKey, ComponentIndex, ComponentName};
use crate::validation::ManifestSchema;
use anyhow::{Result, bail};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
/// In-memory store of component indexes keyed by `CatalogKey`.
pub struct ComponentCatalog {
    components: BTreeMap<CatalogKey, ComponentIndex>,
}

#[derive(Debug, Default)]
/// Outcome of loading a directory of manifests.
pub struct CatalogLoadReport {
    pub loaded: Vec<CatalogKey>,
    pub failures: Vec<(PathBuf, String)>,
}

impl CatalogLoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl ComponentCatalog {
    /// Register a component; a second entry with the same name and version
    /// is rejected.
    pub fn register(&mut self, component: ComponentIndex) -> Result<()> {
        let key = component.key().clone();
        if self.components.contains_key(&key) {
            bail!("component {key} is already registered");
        }
        self.components.insert(key, component);
        Ok(())
    }

    pub fn get(&self, key: &CatalogKey) -> Option<&ComponentIndex> {
        self.components.get(key)
    }

    /// Highest registered version of `name`.
    pub fn latest(&self, name: &ComponentName) -> Option<&ComponentIndex> {
        self.components
            .iter()
            .filter(|(key, _)| &key.name == name)
            .max_by(|(a, _), (b, _)| compare_versions(&a.version, &b.version))
            .map(|(_, component)| component)
    }

    /// Registered keys in stable order.
    pub fn keys(&self) -> impl Iterator<Item = &CatalogKey> {
        self.components.keys()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Load every `metadata.json` below `dir` and register the valid ones.
    ///
    /// Errors reading the directory itself are returned; errors in individual
    /// manifests land in the report.
    pub fn load_dir(&mut self, dir: &Path, schema: &ManifestSchema) -> Result<CatalogLoadReport> {
        let mut report = CatalogLoadReport::default();
        for path in find_manifest_files(dir)? {
            let outcome = ComponentIndex::load_with_schema(&path, schema)
                .and_then(|component| {
                    let key = component.key().clone();
                    self.register(component).map(|()| key)
                });
            match outcome {
                Ok(key) => report.loaded.push(key),
                Err(err) => report.failures.push((path, format!("{err:#}"))),
            }
        }
        Ok(report)
    }
}

/// Compare dotted versions segment by segment, numerically where both
/// segments are numbers (`0.10` sorts after `0.9`).
///
/// A `-` suffix marks a pre-release: `1.0-rc1` sorts before `1.0`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (left_core, left_pre) = split_pre_release(a);
    let (right_core, right_pre) = split_pre_release(b);
    compare_segments(left_core, right_core).then_with(|| match (left_pre, right_pre) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(l), Some(r)) => compare_segments(l, r),
    })
}

fn split_pre_release(version: &str) -> (&str, Option<&str>) {
    match version.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (version, None),
    }
}

fn compare_segments(a: &str, b: &str) -> Ordering {
    let mut left = a.split(['.', '-']);
    let mut right = b.split(['.', '-']);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(ln), Ok(rn)) => ln.cmp(&rn),
                    _ => l.cmp(r),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn find_manifest_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("component directory not found: {}", dir.display());
    }
    let mut files = Vec::new();
    collect_manifests(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_manifests(dir: &Path, acc: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_manifests(&path, acc)?;
        } else if path.file_name().and_then(|name| name.to_str()) == Some(MANIFEST_FILE) {
            acc.push(path);
        }
    }
    Ok(())
}
