//! Rewrites `tests/golden/*/expected_report.json` from each `input.txt`.
//!
//! With `--check`, nothing is written and the exit code reports whether any
//! fixture is stale.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bitpacket_core::{AnalysisOptions, analyze_file};

fn main() -> ExitCode {
    let check = std::env::args().skip(1).any(|arg| arg == "--check");
    match run(check) {
        Ok(stale) if check && !stale.is_empty() => {
            for path in stale {
                eprintln!("stale: {}", path.display());
            }
            ExitCode::from(1)
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(1)
        }
    }
}

fn run(check: bool) -> Result<Vec<PathBuf>, String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    let mut cases = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|err| format!("failed to read entry: {}", err))?
            .path();
        if path.is_dir() && path.join("input.txt").exists() {
            cases.push(path);
        }
    }
    cases.sort();

    let mut stale = Vec::new();
    for case in cases {
        let output = case.join("expected_report.json");
        let json = render_report(&case.join("input.txt"))?;
        let current = fs::read_to_string(&output).unwrap_or_default();
        if current == json {
            continue;
        }
        if check {
            stale.push(output);
        } else {
            fs::write(&output, json)
                .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
        }
    }
    Ok(stale)
}

fn render_report(input: &Path) -> Result<String, String> {
    let options = AnalysisOptions { include_tree: true };
    let report = analyze_file(input, options)
        .map_err(|err| format!("analysis failed for {}: {}", input.display(), err))?;
    serde_json::to_string(&report).map_err(|err| format!("JSON serialization failed: {}", err))
}
