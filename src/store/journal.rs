//! Append-only JSON-lines journal backing durable storage.
//!
//! Every mutation is one line. A line is acknowledged only once it has been
//! fully written (and synced when `fsync` is on); a write that fails midway is
//! truncated away again so the next record starts on a clean line.
//!
//! Payloads are embedded as JSON strings, so a record parses at the nesting
//! depth of its envelope whatever the payload's own depth.
//!
//! On open the journal is replayed. An incomplete trailing line is the
//! signature of a crash during append and is cut off; any other unreadable
//! line is reported as corruption.

use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::model::{ConfigScope, ConfigVersion, Payload, ValidationReport, VersionId, VersionStatus};
use crate::store::{StoreError, StoreResult};

/// A single journal record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JournalEvent {
    /// A new draft was allocated.
    Created { draft: DraftRecord },
    /// `version_id` became the published version of `scope`.
    Published {
        scope: ConfigScope,
        version_id: VersionId,
        actor: String,
        at: u64,
    },
    /// A validation report was attached to a version.
    Report {
        version_id: VersionId,
        report: ValidationReport,
    },
}

/// The creation-time fields of a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRecord {
    pub id: VersionId,
    pub scope: ConfigScope,
    pub version_number: u64,
    /// Payload JSON text, verbatim.
    pub payload: String,
    pub created_at: u64,
    pub created_by: String,
}

impl From<&ConfigVersion> for DraftRecord {
    fn from(version: &ConfigVersion) -> Self {
        Self {
            id: version.id,
            scope: version.scope.clone(),
            version_number: version.version_number,
            payload: version.payload.json().into_owned(),
            created_at: version.created_at,
            created_by: version.created_by.clone(),
        }
    }
}

impl DraftRecord {
    /// Rebuild the draft this record created.
    pub fn into_version(self) -> Result<ConfigVersion, serde_json::Error> {
        Ok(ConfigVersion {
            id: self.id,
            scope: self.scope,
            version_number: self.version_number,
            payload: Payload::from_json(self.payload)?,
            status: VersionStatus::Draft,
            created_at: self.created_at,
            created_by: self.created_by,
            published_at: None,
            published_by: None,
            superseded_at: None,
            validation_report: None,
        })
    }
}

/// Writer half of the journal.
pub struct Journal {
    path: PathBuf,
    fsync: bool,
    writer: Mutex<JournalWriter>,
}

struct JournalWriter {
    file: File,
    /// Length of the acknowledged prefix.
    len: u64,
}

impl JournalWriter {
    fn write_record(&mut self, line: &[u8], fsync: bool) -> std::io::Result<()> {
        self.file.write_all(line)?;
        self.file.flush()?;
        if fsync {
            self.file.sync_data()?;
        }
        Ok(())
    }
}

impl Journal {
    /// Open (creating if missing) the journal at `path` and replay it.
    ///
    /// Returns the writer and every acknowledged record with its 1-based
    /// line number.
    pub fn open(path: &Path, fsync: bool) -> StoreResult<(Self, Vec<(usize, JournalEvent)>)> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let file_len = file.metadata()?.len();

        let (events, good_len) = replay(path)?;
        if good_len < file_len {
            tracing::warn!(
                path = ?path,
                discarded_bytes = file_len - good_len,
                "Discarding torn trailing journal record"
            );
            file.set_len(good_len)?;
            if fsync {
                file.sync_data()?;
            }
        }

        tracing::info!(path = ?path, records = events.len(), "Journal replayed");

        Ok((
            Self {
                path: path.to_path_buf(),
                fsync,
                writer: Mutex::new(JournalWriter {
                    file,
                    len: good_len,
                }),
            },
            events,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    pub fn append(&self, event: &JournalEvent) -> StoreResult<()> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| StoreError::Invariant("journal lock poisoned".to_string()))?;

        let start = writer.len;
        if let Err(e) = writer.write_record(&line, self.fsync) {
            if let Err(rollback) = writer.file.set_len(start) {
                tracing::error!(
                    path = ?self.path,
                    error = %rollback,
                    "Failed to truncate partially written journal record"
                );
            }
            return Err(StoreError::Io(e));
        }
        writer.len = start + line.len() as u64;
        Ok(())
    }

    /// Swap the writer's handle for a read-only one (or back), making
    /// appends fail the way a lost disk does.
    #[cfg(test)]
    pub(crate) fn set_writable(&self, writable: bool) -> std::io::Result<()> {
        let file = if writable {
            OpenOptions::new().append(true).open(&self.path)?
        } else {
            File::open(&self.path)?
        };
        self.writer.lock().unwrap().file = file;
        Ok(())
    }
}

/// Read every acknowledged record; returns them and the byte length of the
/// acknowledged prefix.
fn replay(path: &Path) -> StoreResult<(Vec<(usize, JournalEvent)>, u64)> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut events = Vec::new();
    let mut buf = Vec::new();
    let mut offset = 0u64;
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }
        line_no += 1;

        let complete = buf.last() == Some(&b'\n');
        if !complete {
            // Crash during append: the record was never acknowledged.
            break;
        }

        let body = trim_line(&buf);
        if body.is_empty() {
            offset += n as u64;
            continue;
        }

        match serde_json::from_slice::<JournalEvent>(body) {
            Ok(event) => {
                events.push((line_no, event));
                offset += n as u64;
            }
            Err(e) => {
                return Err(StoreError::Corrupt {
                    line: line_no,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok((events, offset))
}

fn trim_line(buf: &[u8]) -> &[u8] {
    let mut end = buf.len();
    while end > 0 && matches!(buf[end - 1], b'\n' | b'\r' | b' ' | b'\t') {
        end -= 1;
    }
    &buf[..end]
}
