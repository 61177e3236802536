use thiserror::Error;

use crate::tmux::{BackendError, TerminalBackend};

/// Terminal sessions for agents are named `agent-<identifier>`.
pub const SESSION_PREFIX: &str = "agent-";

pub fn session_name_for(identifier: &str) -> String {
    format!("{SESSION_PREFIX}{identifier}")
}

/// Payloads that mean "press Escape" rather than "type this".
pub fn is_cancel_payload(payload: &str) -> bool {
    let payload = payload.trim();
    payload.eq_ignore_ascii_case("esc") || payload.eq_ignore_ascii_case("escape")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Text,
    Cancel,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("session {0} not found")]
    SessionNotFound(String),

    #[error("delivery to {session} failed: {source}")]
    Backend {
        session: String,
        #[source]
        source: BackendError,
    },
}

/// Delivers payloads to a single agent's terminal session.
#[derive(Debug, Clone)]
pub struct Dispatcher<B> {
    backend: B,
}

impl<B: TerminalBackend> Dispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Liveness is checked first and a missing session fails without retry.
    /// Backend failures come back as errors for the caller to report.
    pub fn deliver(&self, identifier: &str, payload: &str) -> Result<Delivery, DispatchError> {
        let session = session_name_for(identifier);
        if !self.backend.session_exists(&session) {
            tracing::info!(target = "agent_responder::dispatch", session = %session, "session does not exist");
            return Err(DispatchError::SessionNotFound(session));
        }

        let (delivery, result) = if is_cancel_payload(payload) {
            (Delivery::Cancel, self.backend.send_cancel(&session))
        } else {
            (Delivery::Text, self.backend.send_text(&session, payload))
        };

        match result {
            Ok(()) => {
                tracing::info!(target = "agent_responder::dispatch", session = %session, kind = ?delivery, "delivered");
                Ok(delivery)
            }
            Err(source) => {
                tracing::warn!(target = "agent_responder::dispatch", session = %session, error = %source, "delivery failed");
                Err(DispatchError::Backend { session, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use parking_lot::Mutex;

    use super::{is_cancel_payload, session_name_for, Delivery, DispatchError, Dispatcher};
    use crate::tmux::{BackendError, TerminalBackend};

    #[derive(Default)]
    struct ScriptedBackend {
        live: HashSet<String>,
        broken: bool,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedBackend {
        fn with_live(names: &[&str]) -> Self {
            Self {
                live: names.iter().map(|n| n.to_string()).collect(),
                ..Default::default()
            }
        }
    }

    impl TerminalBackend for ScriptedBackend {
        fn session_exists(&self, name: &str) -> bool {
            self.live.contains(name)
        }

        fn send_text(&self, name: &str, text: &str) -> Result<(), BackendError> {
            if self.broken {
                return Err(BackendError::CommandFailed {
                    command: "tmux send-keys".into(),
                    stderr: "no server running".into(),
                });
            }
            self.sent.lock().push((name.to_string(), text.to_string()));
            Ok(())
        }

        fn send_cancel(&self, name: &str) -> Result<(), BackendError> {
            self.sent.lock().push((name.to_string(), "<Escape>".to_string()));
            Ok(())
        }
    }

    #[test]
    fn session_names_use_prefix() {
        assert_eq!(session_name_for("7681"), "agent-7681");
        assert_eq!(session_name_for("007"), "agent-007");
    }

    #[test]
    fn cancel_payload_detection() {
        assert!(is_cancel_payload("esc"));
        assert!(is_cancel_payload("ESCAPE"));
        assert!(is_cancel_payload(" Esc "));
        assert!(!is_cancel_payload("escape now"));
        assert!(!is_cancel_payload("y"));
    }

    #[test]
    fn text_payload_is_typed_and_submitted() {
        let backend = ScriptedBackend::with_live(&["agent-7681"]);
        let dispatcher = Dispatcher::new(&backend);

        assert_eq!(dispatcher.deliver("7681", "yes please").unwrap(), Delivery::Text);
        assert_eq!(
            backend.sent.lock().as_slice(),
            &[("agent-7681".to_string(), "yes please".to_string())]
        );
    }

    #[test]
    fn escape_sends_cancel_only() {
        let backend = ScriptedBackend::with_live(&["agent-1"]);
        let dispatcher = Dispatcher::new(&backend);

        assert_eq!(dispatcher.deliver("1", "Escape").unwrap(), Delivery::Cancel);
        assert_eq!(
            backend.sent.lock().as_slice(),
            &[("agent-1".to_string(), "<Escape>".to_string())]
        );
    }

    #[test]
    fn missing_session_fails_without_sending() {
        let backend = ScriptedBackend::with_live(&[]);
        let dispatcher = Dispatcher::new(&backend);

        let err = dispatcher.deliver("9999", "hi").unwrap_err();
        assert!(matches!(err, DispatchError::SessionNotFound(ref s) if s == "agent-9999"));
        assert!(backend.sent.lock().is_empty());
    }

    #[test]
    fn backend_failure_becomes_error_result() {
        let backend = ScriptedBackend {
            broken: true,
            ..ScriptedBackend::with_live(&["agent-2"])
        };
        let dispatcher = Dispatcher::new(&backend);

        let err = dispatcher.deliver("2", "y").unwrap_err();
        assert!(matches!(err, DispatchError::Backend { .. }));
        assert!(err.to_string().contains("no server running"));
    }
}
