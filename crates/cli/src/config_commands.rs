use std::path::Path;

use anyhow::{Context, Result};

use {
    hush_config::{HushConfig, LoadedConfig, Severity, validate},
    hush_silence::TopicRegistry,
};

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

pub fn check(loaded: &LoadedConfig, data_dir: Option<&Path>, verbose: bool) -> Result<()> {
    let result = validate(&loaded.config);

    // Print which file we're checking
    if let Some(ref path) = loaded.path {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults and environment.\n");
    }

    let mut shown = 0;
    for d in &result.diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }

        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
            Severity::Info => (CYAN, "info"),
        };
        eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
        shown += 1;
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if shown > 0 {
        eprintln!();
    }

    eprintln!(
        "Registry: {}",
        hush_config::resolve_registry_path(&loaded.config, data_dir).display()
    );
    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

pub async fn topics(config: &HushConfig, data_dir: Option<&Path>) -> Result<()> {
    for line in topic_lines(config, data_dir).await? {
        println!("{line}");
    }
    Ok(())
}

async fn topic_lines(config: &HushConfig, data_dir: Option<&Path>) -> Result<Vec<String>> {
    let path = hush_config::resolve_registry_path(config, data_dir);
    let topics = TopicRegistry::peek(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    if topics.is_empty() {
        return Ok(vec![format!("No silenced topics in {}", path.display())]);
    }
    Ok(topics.iter().map(ToString::to_string).collect())
}
