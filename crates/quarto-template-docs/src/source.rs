//! Template source discovery
//!
//! Finds template files in a directory and parses them into one tree set.

use std::fs;
use std::path::{Path, PathBuf};

use quarto_gotemplate::TreeSet;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Extensions picked up when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["gohtml"];

/// List the files directly inside `dir` whose extension is one of
/// `extensions`, sorted by path.
pub fn discover_sources(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::Discovery {
            path: dir.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| Error::Discovery {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext));
        if matches {
            debug!(path = %path.display(), "Discovered template source");
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Parse `(unit name, source)` pairs into one set.
///
/// Units are added in order; the first unit that fails to parse aborts the
/// whole build.
pub fn build_tree_index<'a>(units: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<TreeSet> {
    let mut set = TreeSet::new();
    for (unit, source) in units {
        set.parse(unit, source).map_err(|source| Error::Parse {
            unit: unit.to_string(),
            source,
        })?;
    }
    Ok(set)
}

/// Discover, read and parse every template source in `dir`.
///
/// Each file is parsed as a unit named after its base name.
pub fn load_source_dir(dir: &Path, extensions: &[String]) -> Result<TreeSet> {
    let paths = discover_sources(dir, extensions)?;

    let mut units = Vec::with_capacity(paths.len());
    for path in &paths {
        let source = fs::read_to_string(path).map_err(|source| Error::ReadSource {
            path: path.clone(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        units.push((name, source));
    }

    build_tree_index(units.iter().map(|(name, source)| (name.as_str(), source.as_str())))
}
