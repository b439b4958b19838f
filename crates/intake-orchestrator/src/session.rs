//! Identity of one phone call.

use uuid::Uuid;
use voice_core::ToolRequestMeta;

/// A call's session id and, when the connection was authenticated, the
/// caller's customer id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSession {
    pub session_id: String,
    pub customer_id: Option<String>,
}

impl CallSession {
    /// A session with a fresh random id.
    pub fn new(customer_id: Option<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), customer_id)
    }

    /// A session with a transport-assigned id.
    pub fn with_id(session_id: impl Into<String>, customer_id: Option<String>) -> Self {
        Self {
            session_id: session_id.into(),
            customer_id,
        }
    }

    /// Metadata attached to every tool call made in this session.
    pub fn meta(&self) -> ToolRequestMeta {
        ToolRequestMeta::for_session(self.session_id.clone(), self.customer_id.clone())
    }
}
