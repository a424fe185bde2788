use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use dyno_merge::{ColumnNaming, EngineConfig, ParseEngine, SourceFile};

/// Environment variable naming a JSON [`EngineConfig`] file.
const CONFIG_ENV: &str = "DYNO_CONFIG";

fn load_config() -> Result<EngineConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path.to_string_lossy()))?;
            EngineConfig::from_json_str(&text).context("parsing engine config")
        }
        None => Ok(EngineConfig::default()),
    }
}

fn read_source(path: &Path) -> Result<SourceFile> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SourceFile::new(filename, bytes))
}

/// Read every path, keeping the readable files in input order. A path that
/// cannot be read is returned with its error instead of ending the run.
fn read_sources(paths: &[OsString]) -> (Vec<SourceFile>, Vec<(String, anyhow::Error)>) {
    let mut files = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for path in paths.iter().map(Path::new) {
        match read_source(path) {
            Ok(file) => files.push(file),
            Err(e) => unreadable.push((path.display().to_string(), e)),
        }
    }
    (files, unreadable)
}

fn run() -> Result<bool> {
    let mut json = false;
    let mut paths = Vec::new();
    for arg in std::env::args_os().skip(1) {
        if arg == "--json" {
            json = true;
        } else {
            paths.push(arg);
        }
    }
    if paths.is_empty() {
        bail!("usage: dyno-merge [--json] FILE...");
    }

    let engine = ParseEngine::new(load_config()?);
    let (files, unreadable) = read_sources(&paths);
    for (path, e) in &unreadable {
        eprintln!("There was an error processing {path}: {e:#}");
    }

    let report = engine.parse(&files);

    if json {
        let tables: Vec<_> = report
            .dataset
            .series
            .iter()
            .map(|s| {
                serde_json::json!({
                    "label": s.label,
                    "source": s.source,
                    "records": s.table(ColumnNaming::Canonical).to_records(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&tables)?);
    } else {
        for series in &report.dataset.series {
            println!("{}", series.table(ColumnNaming::Overlay));
        }
    }

    for series in &report.dataset.series {
        for rejection in &series.rejected {
            eprintln!("{}: skipped {rejection}", series.source);
        }
    }
    for failure in &report.failures {
        eprintln!("There was an error processing {failure}");
    }

    Ok(unreadable.is_empty() && report.is_complete())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_path_does_not_stop_the_others() {
        let dir = std::env::temp_dir().join(format!("dyno-merge-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let good = dir.join("good.csv");
        std::fs::write(&good, "rpm,hp,tq\n1000,50,35\n").unwrap();
        let missing = dir.join("none.txt");

        let paths = vec![missing.into_os_string(), good.into_os_string()];
        let (files, unreadable) = read_sources(&paths);

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "good.csv");
        assert_eq!(unreadable.len(), 1);
        assert!(unreadable[0].0.ends_with("none.txt"));
        assert!(format!("{:#}", unreadable[0].1).starts_with("reading "));

        let report = ParseEngine::default().parse(&files);
        assert_eq!(report.dataset.len(), 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
