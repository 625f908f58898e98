//! Index command - scan a data directory and write file-index.json.
//!
//! The data directory layout is `<data>/<domain>/<facility>/...`, with
//! category subdirectories below each facility. Every `.json`/`.geojson`
//! file below a facility is indexed with its facility-relative path.

use std::fs;
use std::path::Path;

use atclayer::loader::FileIndex;

use crate::error::CliError;

/// Run the index command.
pub fn run(data: &Path, output: Option<&Path>) -> Result<(), CliError> {
    let mut index = FileIndex::new();

    for domain_entry in sorted_dirs(data)? {
        let domain = domain_entry.0;
        for facility_entry in sorted_dirs(&domain_entry.1)? {
            let facility = facility_entry.0;
            let mut paths = Vec::new();
            collect_geo_files(&facility_entry.1, &facility_entry.1, &mut paths)?;
            paths.sort();
            for path in paths {
                index.insert(&domain, &facility, path);
            }
        }
    }

    let default_output = data.join("file-index.json");
    let output = output.unwrap_or(&default_output);
    fs::write(output, serde_json::to_string_pretty(&index)?)?;
    println!(
        "Indexed {} files into {}",
        index.file_count(),
        output.display()
    );
    Ok(())
}

/// Immediate subdirectories of `dir` as `(name, path)`, name-sorted.
fn sorted_dirs(dir: &Path) -> Result<Vec<(String, std::path::PathBuf)>, CliError> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push((entry.file_name().to_string_lossy().to_string(), path));
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Recursively collect `.json`/`.geojson` files, relative to `base`.
fn collect_geo_files(
    dir: &Path,
    base: &Path,
    paths: &mut Vec<String>,
) -> Result<(), CliError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_geo_files(&path, base, paths)?;
            continue;
        }
        let is_geo = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("geojson"))
            .unwrap_or(false);
        if !is_geo {
            continue;
        }
        if let Ok(relative) = path.strip_prefix(base) {
            // Forward slashes regardless of platform: these paths travel
            // through the index and the URL-facing layer names.
            let rel = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            paths.push(rel);
        }
    }
    Ok(())
}
