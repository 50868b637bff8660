// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Send `tracing` output to `file`. The terminal belongs to the TUI, so
/// nothing is written to stdout or stderr. `RUST_LOG` overrides `level`.
pub fn init(level: &str, file: &Path) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level_filter(level)?.into())
        .from_env_lossy();
    let log_file = open_log_file(file)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;
    Ok(())
}

fn level_filter(level: &str) -> Result<LevelFilter> {
    level
        .parse::<LevelFilter>()
        .with_context(|| format!("invalid log level {level:?}"))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].file to a writable path",
                path.display()
            )
        })
}

#[cfg(test)]
mod tests {
    use super::{level_filter, open_log_file};
    use anyhow::Result;
    use std::io::Write;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn level_filter_accepts_known_levels_only() -> Result<()> {
        assert_eq!(level_filter("debug")?, LevelFilter::DEBUG);
        assert_eq!(level_filter("warn")?, LevelFilter::WARN);
        let error = level_filter("loud").expect_err("unknown level should fail");
        assert!(error.to_string().contains("invalid log level"));
        Ok(())
    }

    #[test]
    fn open_log_file_creates_parents_and_appends() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("rentadmin.log");

        writeln!(open_log_file(&path)?, "first")?;
        writeln!(open_log_file(&path)?, "second")?;

        assert_eq!(std::fs::read_to_string(&path)?, "first\nsecond\n");
        Ok(())
    }
}
