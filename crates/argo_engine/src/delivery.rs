use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use argo_core::{Artifact, Category};
use argo_logging::argo_info;
use chrono::NaiveDateTime;
use tempfile::NamedTempFile;
use thiserror::Error;

pub const CSV_MIME: &str = "text/csv; charset=utf-8";
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const MAX_STEM_LEN: usize = 80;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// File ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// UTF-8 bytes with exactly one leading BOM, under a safe filename.
pub fn prepare_download(artifact: &Artifact, now: NaiveDateTime) -> Download {
    let body = artifact.csv.strip_prefix('\u{FEFF}').unwrap_or(&artifact.csv);
    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + body.len());
    bytes.extend_from_slice(UTF8_BOM);
    bytes.extend_from_slice(body.as_bytes());

    let filename = artifact
        .filename
        .as_deref()
        .and_then(sanitize_filename)
        .unwrap_or_else(|| synthesized_filename(artifact.category, now));

    Download {
        filename,
        mime: CSV_MIME,
        bytes,
    }
}

/// `argo_<category>_<YYYYMMDD_HHMMSS>.csv`
pub fn synthesized_filename(category: Category, now: NaiveDateTime) -> String {
    format!("argo_{}_{}.csv", category.as_str(), now.format("%Y%m%d_%H%M%S"))
}

/// Strips path components and characters unusable in filenames. Returns
/// `None` when nothing usable remains.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();

    let mut compacted = String::with_capacity(cleaned.len());
    for c in cleaned.chars() {
        if c == '_' && compacted.ends_with('_') {
            continue;
        }
        compacted.push(c);
    }
    let trimmed = compacted.trim_matches(&['_', ' ', '.'][..]);
    if trimmed.is_empty() {
        return None;
    }

    let stem = match trimmed.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case("csv") && !stem.is_empty() => stem,
        _ => trimmed,
    };
    let mut stem: String = stem.chars().take(MAX_STEM_LEN).collect();
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    Some(format!("{stem}.csv"))
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}')
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

/// Create the directory if needed and check it accepts new files.
pub fn ensure_output_dir(dir: &Path) -> Result<(), DeliveryError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| DeliveryError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(DeliveryError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| DeliveryError::OutputDir(e.to_string()))?;
    }
    NamedTempFile::new_in(dir).map_err(|e| DeliveryError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Writes the download into `dir` via a temp file and rename. An existing
/// file of the same name is kept; the new one gets a numeric suffix.
pub fn write_download(download: &Download, dir: &Path) -> Result<PathBuf, DeliveryError> {
    ensure_output_dir(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&download.bytes)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;

    let mut attempt = 0;
    loop {
        let target = dir.join(numbered_name(&download.filename, attempt));
        match tmp.persist_noclobber(&target) {
            Ok(_) => return Ok(target),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists && attempt < 1000 => {
                tmp = err.file;
                attempt += 1;
            }
            Err(err) => return Err(DeliveryError::Io(err.error)),
        }
    }
}

/// Prepare and write in one go.
pub fn deliver(
    artifact: &Artifact,
    dir: &Path,
    now: NaiveDateTime,
) -> Result<PathBuf, DeliveryError> {
    let download = prepare_download(artifact, now);
    let path = write_download(&download, dir)?;
    argo_info!(
        "Delivered {} ({} bytes, {}) to {}",
        download.filename,
        download.bytes.len(),
        download.mime,
        path.display()
    );
    Ok(path)
}

fn numbered_name(filename: &str, attempt: u32) -> String {
    if attempt == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{attempt}.{ext}"),
        None => format!("{filename}_{attempt}"),
    }
}
