//! Discovery of agents from their per-agent state files.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::tmux::TerminalBackend;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRecord {
    pub identifier: String,
    pub session_name: String,
    pub display_name: String,
}

#[derive(Debug, Error)]
#[error("malformed agent record {}: {reason}", .path.display())]
pub struct RecordError {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortField {
    Number(u64),
    Text(String),
}

/// On-disk shape written by the agent launcher. Extra fields are ignored.
#[derive(Debug, Deserialize)]
struct AgentStateFile {
    port: Option<PortField>,
    session_name: Option<String>,
    name: Option<String>,
}

pub fn load_record(path: &Path) -> Result<AgentRecord, RecordError> {
    let malformed = |reason: String| RecordError {
        path: path.to_path_buf(),
        reason,
    };

    let data = fs::read(path).map_err(|e| malformed(e.to_string()))?;
    let state: AgentStateFile =
        serde_json::from_slice(&data).map_err(|e| malformed(e.to_string()))?;

    let identifier = match state.port {
        Some(PortField::Number(port)) => port.to_string(),
        Some(PortField::Text(port)) if !port.trim().is_empty() => port.trim().to_string(),
        _ => return Err(malformed("missing port".to_string())),
    };
    let session_name = state
        .session_name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| malformed("missing session_name".to_string()))?;

    Ok(AgentRecord {
        identifier,
        session_name,
        display_name: state.name.unwrap_or_else(|| "Unknown".to_string()),
    })
}

/// Reads agent state records and filters them by terminal liveness.
#[derive(Debug, Clone)]
pub struct SessionRegistry<B> {
    state_dir: PathBuf,
    backend: B,
}

impl<B: TerminalBackend> SessionRegistry<B> {
    pub fn new(state_dir: impl Into<PathBuf>, backend: B) -> Self {
        Self {
            state_dir: state_dir.into(),
            backend,
        }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Every parseable record, live or not. Bad files are logged and skipped.
    pub fn records(&self) -> Vec<AgentRecord> {
        let entries = match fs::read_dir(&self.state_dir) {
            Ok(entries) => entries,
            Err(error) => {
                tracing::debug!(target = "agent_responder::registry", dir = %self.state_dir.display(), error = %error, "agent state dir unreadable");
                return Vec::new();
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        paths
            .iter()
            .filter_map(|path| match load_record(path) {
                Ok(record) => Some(record),
                Err(error) => {
                    tracing::warn!(target = "agent_responder::registry", error = %error, "skipping agent record");
                    None
                }
            })
            .collect()
    }

    /// Records whose terminal session exists right now, keyed by identifier.
    /// Queries the backend once per record on every call.
    pub fn list_running_agents(&self) -> BTreeMap<String, AgentRecord> {
        self.records()
            .into_iter()
            .filter(|record| self.backend.session_exists(&record.session_name))
            .map(|record| (record.identifier.clone(), record))
            .collect()
    }
}
