use std::path::PathBuf;

use clap::Parser;

use crate::responder::{ResponderSettings, DEFAULT_FETCH_LIMIT};

/// Everything lives under `~/.claude/` unless overridden.
pub fn claude_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".claude")
}

pub fn default_state_dir() -> PathBuf {
    claude_home().join("agent-terminals")
}

pub fn default_cursor_file() -> PathBuf {
    claude_home().join("telegram-state.json")
}

pub fn default_usage_log() -> PathBuf {
    claude_home().join("telegram-usage.log")
}

#[derive(Debug, Parser, Clone)]
#[command(name = "agent-responder")]
#[command(about = "Polls Telegram for replies and routes `@<port> <text>` to agent tmux sessions")]
pub struct Config {
    /// Directory holding one JSON state file per agent.
    #[arg(long, env = "AGENT_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Where the last processed update id is kept.
    #[arg(long, env = "TELEGRAM_STATE_FILE")]
    pub cursor_file: Option<PathBuf>,

    /// JSONL log of sent and received chat messages.
    #[arg(long, env = "TELEGRAM_USAGE_LOG")]
    pub usage_log: Option<PathBuf>,

    #[arg(long, env = "RESPONDER_POLL_INTERVAL_SECS", default_value_t = 15)]
    pub poll_interval_secs: u64,

    #[arg(long, env = "RESPONDER_FETCH_LIMIT", default_value_t = DEFAULT_FETCH_LIMIT)]
    pub limit: u32,
}

impl Config {
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(default_state_dir)
    }

    pub fn cursor_file(&self) -> PathBuf {
        self.cursor_file.clone().unwrap_or_else(default_cursor_file)
    }

    pub fn usage_log(&self) -> PathBuf {
        self.usage_log.clone().unwrap_or_else(default_usage_log)
    }

    pub fn settings(&self) -> ResponderSettings {
        ResponderSettings {
            poll_interval: std::time::Duration::from_secs(self.poll_interval_secs),
            fetch_limit: self.limit,
        }
    }
}
