use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::Serialize;

const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Sent,
    Received,
}

#[derive(Debug, Serialize)]
struct UsageEntry<'a> {
    timestamp: String,
    direction: Direction,
    chat_id: Option<i64>,
    text_preview: &'a str,
}

/// Append-only JSONL record of chat traffic. Write failures are ignored.
#[derive(Debug, Clone, Default)]
pub struct UsageLog {
    path: Option<PathBuf>,
}

impl UsageLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn record(&self, direction: Direction, text: &str, chat_id: Option<i64>) {
        let Some(path) = &self.path else {
            return;
        };
        let preview = preview(text);
        let entry = UsageEntry {
            timestamp: Utc::now().to_rfc3339(),
            direction,
            chat_id,
            text_preview: &preview,
        };
        if let Err(error) = append_line(path, &entry) {
            tracing::debug!(target = "agent_responder::usage", path = %path.display(), error = %error, "usage log write failed");
        }
    }
}

fn append_line(path: &Path, entry: &UsageEntry<'_>) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut line = serde_json::to_string(entry)?;
    line.push('\n');
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

pub(crate) fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let cut: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{preview, Direction, UsageLog};

    #[test]
    fn long_text_is_truncated_on_char_boundary() {
        let text = "é".repeat(150);
        let cut = preview(&text);
        assert_eq!(cut.chars().count(), 103);
        assert!(cut.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn appends_one_json_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("usage.log");
        let log = UsageLog::new(&path);

        log.record(Direction::Sent, "hello", Some(42));
        log.record(Direction::Received, "@1 y", None);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["direction"], "sent");
        assert_eq!(lines[0]["chat_id"], 42);
        assert_eq!(lines[0]["text_preview"], "hello");
        assert_eq!(lines[1]["direction"], "received");
        assert!(lines[1]["chat_id"].is_null());
    }

    #[test]
    fn disabled_log_writes_nothing() {
        let log = UsageLog::disabled();
        assert!(log.path().is_none());
        log.record(Direction::Sent, "ignored", None);
    }
}
