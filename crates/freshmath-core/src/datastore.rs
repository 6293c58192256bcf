use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::relay::{SHEET_HEADERS, SheetRow, SubmissionSheet};

/// Append-only contact sheet: a header line followed by one JSON array
/// per submission, matching `SHEET_HEADERS` column for column.
#[derive(Debug)]
pub struct SheetStore {
    pub data_dir: PathBuf,
    pub sheet_path: PathBuf,
}

impl SheetStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path, sheet_name: &str) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let sheet_path = data_dir.join(format!("{}.sheet", file_stem(sheet_name)?));
        if !sheet_path.exists() {
            write_header(&sheet_path)?;
            info!(sheet = %sheet_path.display(), "created contact sheet");
        }

        info!(
            data_dir = %data_dir.display(),
            sheet = %sheet_path.display(),
            "opened sheet store"
        );

        Ok(Self {
            data_dir,
            sheet_path,
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn load_rows(&self) -> anyhow::Result<Vec<Vec<String>>> {
        load_jsonl_rows(&self.sheet_path)
            .with_context(|| format!("failed to load {}", self.sheet_path.display()))
    }

    #[tracing::instrument(skip(self, row))]
    pub fn append_row(&self, row: &SheetRow) -> anyhow::Result<()> {
        let serialized = serde_json::to_string(&row.cells())?;
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.sheet_path)
            .with_context(|| format!("failed to open {}", self.sheet_path.display()))?;
        writeln!(file, "{serialized}")
            .with_context(|| format!("failed to append to {}", self.sheet_path.display()))?;
        debug!(sheet = %self.sheet_path.display(), "appended submission row");
        Ok(())
    }
}

impl SubmissionSheet for SheetStore {
    fn append(&mut self, row: &SheetRow) -> anyhow::Result<()> {
        self.append_row(row)
    }
}

fn file_stem(sheet_name: &str) -> anyhow::Result<String> {
    let stem: String = sheet_name
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let stem = stem.trim_matches('-').to_string();
    if stem.is_empty() {
        return Err(anyhow!("sheet name cannot be empty"));
    }
    Ok(stem)
}

#[tracing::instrument(skip(path))]
fn write_header(path: &Path) -> anyhow::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    writeln!(temp, "{}", serde_json::to_string(&SHEET_HEADERS)?)?;
    temp.flush()?;
    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;
    Ok(())
}

#[tracing::instrument(skip(path))]
fn load_jsonl_rows(path: &Path) -> anyhow::Result<Vec<Vec<String>>> {
    debug!(file = %path.display(), "loading sheet rows");
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let row: Vec<String> = serde_json::from_str(trimmed)
            .with_context(|| format!("failed parsing {} line {}", path.display(), idx + 1))?;
        if idx == 0 && row == SHEET_HEADERS {
            continue;
        }
        out.push(row);
    }

    debug!(count = out.len(), "loaded sheet rows");
    Ok(out)
}
