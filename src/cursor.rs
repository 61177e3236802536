//! Update cursor, its persistence, and the polling step that advances it.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::transport::{FetchedBatch, InboundMessage, MessagingTransport};

/// Highest update id already processed. Never moves backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCursor {
    #[serde(rename = "last_update_id", alias = "lastSeenId", default)]
    pub last_seen_id: i64,
}

impl UpdateCursor {
    pub fn new(last_seen_id: i64) -> Self {
        Self { last_seen_id }
    }

    /// Offset to request so only unseen updates come back.
    pub fn offset(&self) -> Option<i64> {
        (self.last_seen_id > 0).then(|| self.last_seen_id + 1)
    }

    pub fn advance(self, batch: &FetchedBatch) -> Self {
        match batch.highest_update_id {
            Some(highest) if highest > self.last_seen_id => Self::new(highest),
            _ => self,
        }
    }
}

pub trait CursorStore {
    /// Missing or unreadable state loads as the zero cursor.
    fn load(&self) -> UpdateCursor;

    fn save(&self, cursor: &UpdateCursor) -> Result<()>;
}

/// JSON file store, compatible with `{"last_update_id": N}` state files.
#[derive(Debug, Clone)]
pub struct JsonCursorStore {
    path: PathBuf,
}

impl JsonCursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CursorStore for JsonCursorStore {
    fn load(&self) -> UpdateCursor {
        let Ok(data) = fs::read(&self.path) else {
            return UpdateCursor::default();
        };
        match serde_json::from_slice(&data) {
            Ok(cursor) => cursor,
            Err(error) => {
                tracing::warn!(target = "agent_responder::cursor", path = %self.path.display(), error = %error, "cursor file unreadable, starting from zero");
                UpdateCursor::default()
            }
        }
    }

    /// Written to a sibling temp file and renamed over the old state, so a
    /// crash mid-write never leaves a torn cursor behind.
    fn save(&self, cursor: &UpdateCursor) -> Result<()> {
        let body = serde_json::to_vec_pretty(cursor)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("failed creating temp file in {}", dir.display()))?;
        tmp.write_all(&body)
            .with_context(|| "failed writing to temp cursor file")?;
        tmp.persist(&self.path)
            .with_context(|| format!("failed persisting cursor file to {}", self.path.display()))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryCursorStore {
    cursor: Mutex<UpdateCursor>,
}

impl MemoryCursorStore {
    pub fn new(cursor: UpdateCursor) -> Self {
        Self {
            cursor: Mutex::new(cursor),
        }
    }
}

impl CursorStore for MemoryCursorStore {
    fn load(&self) -> UpdateCursor {
        *self.cursor.lock()
    }

    fn save(&self, cursor: &UpdateCursor) -> Result<()> {
        *self.cursor.lock() = *cursor;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polled {
    pub cursor: UpdateCursor,
    pub messages: Vec<InboundMessage>,
}

/// Fetch one batch. With `only_new` the request starts after the cursor and
/// the returned cursor covers the batch; otherwise everything the provider
/// still holds is returned and the cursor is left alone.
pub async fn poll<T: MessagingTransport>(
    transport: &T,
    cursor: UpdateCursor,
    only_new: bool,
    limit: u32,
) -> Polled {
    let since = if only_new { cursor.offset() } else { None };
    let batch = transport.fetch_updates(since, limit).await;
    let cursor = if only_new {
        cursor.advance(&batch)
    } else {
        cursor
    };
    Polled {
        cursor,
        messages: batch.messages,
    }
}
