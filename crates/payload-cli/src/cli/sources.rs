//! Building a payload from files on disk.

use super::args::SourceArgs;
use anyhow::{Context, Result};
use payload_core::{Payload, PayloadConfig};
use std::fs;
use std::path::{Component, Path};
use walkdir::WalkDir;

pub fn load_config(source: &SourceArgs) -> Result<PayloadConfig> {
    let mut config = match &source.config {
        Some(path) => PayloadConfig::load(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => PayloadConfig::default(),
    };
    if let Some(prefix) = &source.prefix {
        config.prefix = prefix.clone();
    }
    Ok(config)
}

/// Read every input and add it to `payload`.
///
/// Input roots are read in parallel; entries are then inserted in argument
/// order so a later input deterministically overrides an earlier one with
/// the same name. Explicit `--file` entries go last.
pub fn populate(payload: &Payload, source: &SourceArgs) -> Result<usize> {
    let trees: Vec<Result<Vec<(String, Vec<u8>)>>> = std::thread::scope(|scope| {
        let workers: Vec<_> = source
            .inputs
            .iter()
            .map(|root| scope.spawn(move || read_tree(root)))
            .collect();
        workers
            .into_iter()
            .map(|w| {
                w.join()
                    .unwrap_or_else(|_| Err(anyhow::anyhow!("input reader panicked")))
            })
            .collect()
    });

    let mut count = 0;
    for tree in trees {
        for (name, data) in tree? {
            payload.get_file(&name).set(data);
            count += 1;
        }
    }

    for (name, path) in &source.files {
        let data = fs::read(path)
            .with_context(|| format!("failed to read input file: {}", path.display()))?;
        payload.get_file(name).set(data);
        count += 1;
    }

    tracing::info!(files = count, entries = payload.store().len(), "payload populated");
    Ok(count)
}

fn read_tree(root: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let meta = fs::metadata(root)
        .with_context(|| format!("input does not exist: {}", root.display()))?;
    if meta.is_file() {
        let name = root
            .file_name()
            .context("input file has no name")?
            .to_string_lossy()
            .into_owned();
        let data =
            fs::read(root).with_context(|| format!("failed to read: {}", root.display()))?;
        return Ok(vec![(name, data)]);
    }

    let mut out = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk: {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .context("walked outside input root")?;
        let data = fs::read(entry.path())
            .with_context(|| format!("failed to read: {}", entry.path().display()))?;
        out.push((entry_name(rel), data));
    }
    Ok(out)
}

/// Relative path joined with `/` regardless of platform.
fn entry_name(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn source(inputs: Vec<PathBuf>) -> SourceArgs {
        SourceArgs {
            prefix: Some("out/".into()),
            inputs,
            files: Vec::new(),
            config: None,
        }
    }

    #[test]
    fn directory_tree_becomes_relative_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        fs::write(dir.path().join("sub/b.o"), [1u8, 2]).unwrap();

        let args = source(vec![dir.path().to_path_buf()]);
        let payload = Payload::new(load_config(&args).unwrap());
        assert_eq!(populate(&payload, &args).unwrap(), 2);
        assert_eq!(payload.ordered_file_names(), ["out/a.txt", "out/sub/b.o"]);
    }

    #[test]
    fn later_inputs_override_earlier_ones() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("x.txt"), "first").unwrap();
        fs::write(second.path().join("x.txt"), "second").unwrap();

        let args = source(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
        let payload = Payload::with_prefix("out/");
        populate(&payload, &args).unwrap();
        assert_eq!(payload.get_file("x.txt").contents(), b"second");
    }

    #[test]
    fn missing_input_is_an_error() {
        let args = source(vec![PathBuf::from("/definitely/not/here")]);
        let payload = Payload::with_prefix("");
        let err = populate(&payload, &args).unwrap_err();
        assert!(err.to_string().contains("input does not exist"));
    }

    #[test]
    fn entry_names_use_forward_slashes() {
        let rel: PathBuf = ["a", "b", "c.txt"].iter().collect();
        assert_eq!(entry_name(&rel), "a/b/c.txt");
    }
}
