//! Conversation sessions.
//!
//! One session per customer phone number, held in memory behind an async
//! `RwLock`. Each session carries the conversation state-machine step,
//! the conversation status (who is attending), and a short message log.
//! Closed conversations are replaced on the customer's next contact.

use chrono::{DateTime, Utc};
use common::types::{ConversationId, RecordedMessageId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// State-machine step of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// First contact, no menu shown yet.
    Start,

    /// Main menu displayed, waiting for a selection.
    MainMenu,

    /// Customer asked for a human agent, waiting for pickup.
    AwaitingAgent,
}

/// Who is currently attending a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationStatus {
    /// Waiting for a human agent.
    Waiting,

    /// A human agent is attending; the bot stays silent.
    Active,

    /// The bot is handling the conversation.
    BotHandling,

    /// Conversation closed.
    Closed,
}

/// Originator of a recorded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Customer,
    Agent,
    Bot,
    System,
}

/// One message recorded in a conversation log.
#[derive(Debug, Clone)]
pub struct RecordedMessage {
    pub id: RecordedMessageId,
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A customer conversation session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Stable identifier of this conversation.
    pub conversation_id: ConversationId,

    /// Customer phone number (store key).
    pub phone_number: String,

    /// Patient name, from the WhatsApp profile or later data capture.
    pub patient_name: Option<String>,

    /// Current state-machine step.
    pub step: Step,

    /// Who is attending.
    pub status: ConversationStatus,

    /// Message log, oldest first.
    pub messages: Vec<RecordedMessage>,

    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    fn new(phone_number: &str, patient_name: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            conversation_id: ConversationId::new(),
            phone_number: phone_number.to_string(),
            patient_name: patient_name.map(str::to_string),
            step: Step::Start,
            status: ConversationStatus::BotHandling,
            messages: Vec::new(),
            created_at: now,
            last_activity: now,
        }
    }

    /// Display name suggested to the video client: the patient name when
    /// known, otherwise a generic label with the last four digits of the
    /// phone number.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.patient_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }

        let tail = self
            .phone_number
            .get(self.phone_number.len().saturating_sub(4)..)
            .unwrap_or_default();
        format!("Paciente {tail}")
    }
}

/// In-memory session store keyed by phone number.
///
/// Cheap to clone; all clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the session for a phone number, creating one when missing or
    /// when the previous conversation was closed. A profile name provided
    /// by the channel fills in the patient name if it is still unknown.
    ///
    /// Returns a snapshot of the session.
    pub async fn get_or_create(&self, phone_number: &str, profile_name: Option<&str>) -> Session {
        let mut sessions = self.inner.write().await;

        let replace = match sessions.get(phone_number) {
            Some(session) => session.status == ConversationStatus::Closed,
            None => true,
        };

        if replace {
            tracing::info!(
                target: "bot.session",
                phone_number = %phone_number,
                "New conversation"
            );
            sessions.insert(
                phone_number.to_string(),
                Session::new(phone_number, profile_name),
            );
        }

        match sessions.get_mut(phone_number) {
            Some(session) => {
                if session.patient_name.is_none() {
                    session.patient_name = profile_name.map(str::to_string);
                }
                session.last_activity = Utc::now();
                session.clone()
            }
            // Unreachable: inserted above under the same write lock
            None => Session::new(phone_number, profile_name),
        }
    }

    /// Snapshot the session for a phone number, if any.
    pub async fn snapshot(&self, phone_number: &str) -> Option<Session> {
        self.inner.read().await.get(phone_number).cloned()
    }

    /// Set the state-machine step of an existing session.
    pub async fn set_step(&self, phone_number: &str, step: Step) {
        if let Some(session) = self.inner.write().await.get_mut(phone_number) {
            session.step = step;
            session.last_activity = Utc::now();
        }
    }

    /// Set the conversation status of an existing session.
    pub async fn set_status(&self, phone_number: &str, status: ConversationStatus) {
        if let Some(session) = self.inner.write().await.get_mut(phone_number) {
            session.status = status;
            session.last_activity = Utc::now();
        }
    }

    /// Append a message to the conversation log.
    pub async fn record_message(&self, phone_number: &str, sender: Sender, content: &str) {
        if let Some(session) = self.inner.write().await.get_mut(phone_number) {
            session.messages.push(RecordedMessage {
                id: RecordedMessageId::new(),
                sender,
                content: content.to_string(),
                timestamp: Utc::now(),
            });
            session.last_activity = Utc::now();
        }
    }

    /// Whether a human agent is attending this conversation.
    ///
    /// The bot must not reply while an agent is active.
    pub async fn is_agent_active(&self, phone_number: &str) -> bool {
        self.inner
            .read()
            .await
            .get(phone_number)
            .is_some_and(|session| session.status == ConversationStatus::Active)
    }
}
