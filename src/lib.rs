//! Route chat replies from a human operator to running coding-agent
//! terminal sessions, and push notifications the other way.

pub mod config;
pub mod cursor;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod notify;
pub mod parser;
pub mod registry;
pub mod responder;
pub mod tmux;
pub mod transport;
pub mod usage_log;
