//! Filesystem surface of one booth cycle: the capture timestamp, the
//! working/output/log directories, and the diagnostic transcript written
//! when a cycle fails.

use std::{
    error::Error as _,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{config::BoothConfig, error::BoothResult};

/// Timestamp that names the cycle, e.g. `2026_08_30-02:15:09_PM`. Taken at
/// capture start and reused for the upload name and the transcript.
pub fn capture_stamp() -> String {
    chrono::Local::now()
        .format("%Y_%m_%d-%I:%M:%S_%p")
        .to_string()
}

/// Create `img/`, `output/` and `logs/` under the configured root.
pub fn ensure_layout(cfg: &BoothConfig) -> BoothResult<()> {
    for dir in [cfg.img_dir(), cfg.output_dir(), cfg.log_dir()] {
        fs::create_dir_all(&dir)
            .with_context(|| format!("create booth directory '{}'", dir.display()))?;
    }
    Ok(())
}

pub fn ensure_parent_dir(path: &Path) -> BoothResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Regular files in `dir`, in directory-listing order (not sorted).
pub fn list_files(dir: &Path) -> BoothResult<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("read directory '{}'", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in '{}'", dir.display()))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

/// Delete every regular file in `dir`, leaving the directory itself.
pub fn clean_dir(dir: &Path) -> BoothResult<()> {
    for file in list_files(dir)? {
        fs::remove_file(&file).with_context(|| format!("remove '{}'", file.display()))?;
    }
    Ok(())
}

/// Persist a transcript under `logs/<stamp>.log`.
pub fn write_transcript(log_dir: &Path, stamp: &str, body: &str) -> BoothResult<PathBuf> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("create log directory '{}'", log_dir.display()))?;
    let path = log_dir.join(format!("{stamp}.log"));
    fs::write(&path, body).with_context(|| format!("write transcript '{}'", path.display()))?;
    Ok(path)
}

/// Failure transcript: the failing stage plus the full error chain.
pub fn write_diagnostic(
    log_dir: &Path,
    stamp: &str,
    stage: &str,
    err: &crate::BoothError,
) -> BoothResult<PathBuf> {
    let mut body = format!("cycle {stamp}\nfailed stage: {stage}\nerror: {err}\n");
    let mut source = err.source();
    while let Some(cause) = source {
        body.push_str(&format!("caused by: {cause}\n"));
        source = cause.source();
    }
    write_transcript(log_dir, stamp, &body)
}
