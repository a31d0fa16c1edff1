//! Append-only JSONL file writer.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use parking_lot::Mutex;

use super::entry::JournalEntry;

const FILE_PREFIX: &str = "runecast-";

fn journal_file_name(date: NaiveDate) -> String {
    format!("{FILE_PREFIX}{}.jsonl", date.format("%Y-%m-%d"))
}

/// Writes journal entries to `<dir>/runecast-<date>.jsonl`.
///
/// Each entry is flushed as it is written so a crash loses at most the
/// line in progress.
pub struct JournalWriter {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JournalWriter {
    /// Open today's journal file (local date), creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        Self::open_for(dir, chrono::Local::now().date_naive())
    }

    pub fn open_for(dir: impl AsRef<Path>, date: NaiveDate) -> std::io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(journal_file_name(date));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, entry: &JournalEntry) -> std::io::Result<()> {
        let line = entry
            .to_line()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{line}")?;
        writer.flush()
    }
}

impl Drop for JournalWriter {
    fn drop(&mut self) {
        let _ = self.writer.lock().flush();
    }
}

/// Read one day's journal. Unparseable lines are skipped.
pub fn read_journal(dir: impl AsRef<Path>, date: NaiveDate) -> std::io::Result<Vec<JournalEntry>> {
    let path = dir.as_ref().join(journal_file_name(date));
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| JournalEntry::from_line(line).ok())
        .collect())
}
