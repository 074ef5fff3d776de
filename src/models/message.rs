use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::MessageRole;
use crate::cost::CostRecord;

/// One transcript entry. The transcript is append-only; insertion order is
/// the sole ordering guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Optional quick-reply chips attached to an assistant message.
    pub follow_up_options: Option<Vec<String>>,
    /// Token usage and estimated cost of the request that produced this
    /// message. Observability only — never read back by the engine.
    pub cost: Option<CostRecord>,
}

impl Message {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now().timestamp_millis(),
            follow_up_options: None,
            cost: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn with_follow_up_options(mut self, options: Vec<String>) -> Self {
        self.follow_up_options = Some(options);
        self
    }

    pub fn with_cost(mut self, cost: Option<CostRecord>) -> Self {
        self.cost = cost;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::Usage;

    #[test]
    fn user_message_has_role_and_content() {
        let m = Message::user("Headache since Tuesday");
        assert_eq!(m.role, MessageRole::User);
        assert_eq!(m.content, "Headache since Tuesday");
        assert!(m.follow_up_options.is_none());
        assert!(m.cost.is_none());
    }

    #[test]
    fn messages_get_unique_ids() {
        let a = Message::user("one");
        let b = Message::user("two");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn timestamp_is_recent_epoch_millis() {
        let m = Message::assistant("hello");
        let now = Utc::now().timestamp_millis();
        assert!(m.timestamp <= now);
        assert!(now - m.timestamp < 5_000);
    }

    #[test]
    fn builder_attaches_options_and_cost() {
        let cost = CostRecord {
            usage: Usage {
                prompt_tokens: 100,
                completion_tokens: 50,
            },
            cost_usd: 0.001,
        };
        let m = Message::assistant("Any fever?")
            .with_follow_up_options(vec!["Yes".into(), "No".into()])
            .with_cost(Some(cost.clone()));
        assert_eq!(m.follow_up_options.as_ref().unwrap().len(), 2);
        assert_eq!(m.cost.unwrap(), cost);
    }
}
