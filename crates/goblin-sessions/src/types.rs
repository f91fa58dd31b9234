/// Per-user conversation continuation state.
///
/// Tracks the backend identifiers that chain one turn to the next. Created
/// lazily on a user's first contact and cleared in place on reset; never
/// evicted, so a session lives for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Stable identifier of the requester (the Discord user id).
    pub user_id: String,
    /// Backend token identifying the logical thread; `None` until the first
    /// successful exchange.
    pub conversation_id: Option<String>,
    /// Backend token for the last turn, chained into the next request.
    pub parent_message_id: Option<String>,
    /// True until the first successful exchange completes. Governs whether
    /// the priming prompt is sent.
    pub is_new: bool,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            conversation_id: None,
            parent_message_id: None,
            is_new: true,
        }
    }

    /// Store the continuation identifiers from a completed exchange.
    ///
    /// The pair is only ever written together, from the same backend reply;
    /// a successful exchange also ends the session's "new" phase.
    pub fn record_exchange(&mut self, conversation_id: String, message_id: String) {
        self.conversation_id = Some(conversation_id);
        self.parent_message_id = Some(message_id);
        self.is_new = false;
    }

    /// Drop the conversation identifiers and return to the "new" phase.
    pub fn clear(&mut self) {
        self.conversation_id = None;
        self.parent_message_id = None;
        self.is_new = true;
    }
}
