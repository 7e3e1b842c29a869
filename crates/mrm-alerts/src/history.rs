//! Class-A trigger history.
//!
//! On disk: a JSON array of timestamps, loaded fully and rewritten fully.
//! Entries are written as RFC 3339 UTC. Naive ISO-8601 timestamps (no
//! offset) are accepted on read and taken as UTC.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Ordered sequence of class-A trigger timestamps. Old entries are retained;
/// the regime monitor only looks at the trailing window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriggerHistory {
    entries: Vec<DateTime<Utc>>,
}

impl TriggerHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<DateTime<Utc>>) -> Self {
        Self { entries }
    }

    /// Append `count` entries stamped `at`.
    pub fn record(&mut self, at: DateTime<Utc>, count: usize) {
        self.entries.extend(std::iter::repeat(at).take(count));
    }

    pub fn entries(&self) -> &[DateTime<Utc>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc())
}

/// Parse a history document. Unparseable entries are dropped with a warning.
pub fn parse_history_json(src: &str) -> Result<TriggerHistory> {
    let raw: Vec<String> = serde_json::from_str(src).context("parse trigger history")?;
    let mut entries = Vec::with_capacity(raw.len());
    for s in raw {
        match parse_timestamp(&s) {
            Some(ts) => entries.push(ts),
            None => tracing::warn!(entry = %s, "trigger history entry ignored"),
        }
    }
    Ok(TriggerHistory { entries })
}

pub fn render_history_json(history: &TriggerHistory) -> Result<String> {
    let raw: Vec<String> = history
        .entries
        .iter()
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
        .collect();
    serde_json::to_string_pretty(&raw).context("serialize trigger history")
}

/// The history file next to the ledger store.
#[derive(Clone, Debug)]
pub struct TriggerHistoryFile {
    path: PathBuf,
}

impl TriggerHistoryFile {
    pub const FILE_NAME: &'static str = "trigger_history.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/trigger_history.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Where an unparseable history file is copied before it can be
    /// overwritten.
    pub fn corrupt_copy_path(&self) -> PathBuf {
        self.sibling(".corrupt")
    }

    /// Missing or unreadable file → empty history (with a warning when the
    /// file exists but cannot be used). A corrupt file is first copied to
    /// [`Self::corrupt_copy_path`].
    pub fn load(&self) -> TriggerHistory {
        let src = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return TriggerHistory::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "trigger history unreadable; starting empty");
                return TriggerHistory::new();
            }
        };
        match parse_history_json(&src) {
            Ok(h) => h,
            Err(e) => {
                let copy = self.corrupt_copy_path();
                if let Err(copy_err) = fs::copy(&self.path, &copy) {
                    tracing::warn!(path = %copy.display(), error = %copy_err, "corrupt trigger history not copied");
                }
                tracing::warn!(
                    path = %self.path.display(),
                    copy = %copy.display(),
                    error = %e,
                    "trigger history corrupt; starting empty"
                );
                TriggerHistory::new()
            }
        }
    }

    /// Full rewrite through a temp file + rename; an interrupted save leaves
    /// the previous file intact.
    pub fn save(&self, history: &TriggerHistory) -> Result<()> {
        let body = render_history_json(history)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create dir failed: {}", parent.display()))?;
            }
        }
        let tmp = self.sibling(".tmp");
        fs::write(&tmp, body)
            .with_context(|| format!("write trigger history failed: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace trigger history failed: {}", self.path.display()))?;
        Ok(())
    }
}
