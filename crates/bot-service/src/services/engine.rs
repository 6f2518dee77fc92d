//! Bot engine: conversation state machine.
//!
//! Dispatches each inbound message to a flow:
//!
//! - interactive replies route by element ID (video call, scheduling,
//!   agent handoff),
//! - text messages get keyword auto-replies or a default prompt,
//! - conversations attended by a human agent get no bot replies at all.
//!
//! Send failures never fail the webhook: they are logged and the
//! remaining sends of a flow are still attempted, since the Cloud API
//! would otherwise redeliver the event and duplicate the replies.

use crate::errors::BotError;
use crate::meeting::{build_meeting_link, RoomSlug};
use crate::models::IncomingMessage;
use crate::observability::metrics;
use crate::services::wa_client::{ListMenu, ListRow, ListSection, WaClientTrait};
use crate::session::{ConversationStatus, Sender, SessionStore, Step};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Interactive element ID that starts a video call.
pub const VIDEO_CALL_BUTTON_ID: &str = "c_videollamada";

/// Interactive element ID for appointment scheduling.
pub const MENU_SCHEDULE_ID: &str = "m_agendar";

/// Interactive element ID for human-agent handoff.
pub const MENU_AGENT_ID: &str = "m_agente";

/// Keywords that trigger a human-agent handoff.
const HANDOFF_KEYWORDS: &[&str] = &["agente", "operador", "persona", "humano", "queja", "reclamo"];

/// Keyword auto-replies, checked in order with substring matching.
const AUTO_REPLIES: &[(&str, &str)] = &[
    (
        "hola",
        "¡Hola! 👋 Bienvenido al consultorio. ¿En qué puedo ayudarte hoy?",
    ),
    (
        "horario",
        "📅 Nuestro horario de atención es:\n🕐 Lunes a Viernes: 8:00 AM - 6:00 PM\n🕐 Sábados: 9:00 AM - 2:00 PM",
    ),
    (
        "ubicaci",
        "📍 Nos encontramos en:\nAv. Principal #123, Ciudad",
    ),
    (
        "gracias",
        "¡De nada! 😊 ¿Hay algo más en que pueda ayudarte?",
    ),
];

const TRANSFER_TEXT: &str =
    "🔄 Te estoy conectando con un agente humano. Por favor espera un momento...";

const SCHEDULE_TEXT: &str =
    "📅 Para agendar una cita, un agente confirmará el horario contigo en breve.";

const DEFAULT_TEXT: &str =
    "Entiendo que necesitas ayuda. Elige una opción del menú o escribe 'agente' para hablar con una persona.";

/// Build the main menu shown after most flows.
pub fn main_menu() -> ListMenu {
    ListMenu {
        header: "Consultorio".to_string(),
        body: "¿Qué deseas hacer?".to_string(),
        button: "Ver opciones".to_string(),
        sections: vec![ListSection {
            title: "Opciones".to_string(),
            rows: vec![
                ListRow {
                    id: MENU_SCHEDULE_ID.to_string(),
                    title: "Agendar cita".to_string(),
                    description: Some("Reserva un turno con el especialista".to_string()),
                },
                ListRow {
                    id: VIDEO_CALL_BUTTON_ID.to_string(),
                    title: "Videollamada".to_string(),
                    description: Some("Inicia una consulta por video".to_string()),
                },
                ListRow {
                    id: MENU_AGENT_ID.to_string(),
                    title: "Hablar con un agente".to_string(),
                    description: None,
                },
            ],
        }],
    }
}

/// The conversation engine.
pub struct BotEngine {
    wa: Arc<dyn WaClientTrait>,
    sessions: SessionStore,
    video_base_url: String,
    video_call_subject: String,
}

impl BotEngine {
    pub fn new(
        wa: Arc<dyn WaClientTrait>,
        sessions: SessionStore,
        video_base_url: String,
        video_call_subject: String,
    ) -> Self {
        Self {
            wa,
            sessions,
            video_base_url,
            video_call_subject,
        }
    }

    /// Handle one inbound message end to end.
    ///
    /// # Errors
    ///
    /// Only non-messaging failures (e.g. RNG) propagate; send failures
    /// are logged and swallowed so the webhook can still acknowledge.
    #[instrument(skip_all, name = "bot.engine.handle", fields(from = %message.from, kind = %message.kind))]
    pub async fn handle_message(
        &self,
        message: &IncomingMessage,
        profile_name: Option<&str>,
    ) -> Result<(), BotError> {
        let from = message.from.as_str();
        self.sessions.get_or_create(from, profile_name).await;

        let content = message
            .text_body()
            .or_else(|| message.reply_id())
            .unwrap_or(message.kind.as_str());
        self.sessions
            .record_message(from, Sender::Customer, content)
            .await;

        // A human agent owns the conversation: the bot stays silent
        if self.sessions.is_agent_active(from).await {
            debug!(
                target: "bot.engine",
                from = %from,
                "Agent active, bot reply suppressed"
            );
            return Ok(());
        }

        match message.reply_id() {
            Some(VIDEO_CALL_BUTTON_ID) => self.start_video_call(from).await,
            Some(MENU_AGENT_ID) => {
                self.handoff_to_agent(from).await;
                Ok(())
            }
            Some(MENU_SCHEDULE_ID) => {
                self.start_scheduling(from).await;
                Ok(())
            }
            Some(other) => {
                warn!(target: "bot.engine", element_id = %other, "Unknown interactive element");
                self.send_default_prompt(from).await;
                Ok(())
            }
            None => {
                self.handle_text(from, message.text_body().unwrap_or_default())
                    .await;
                Ok(())
            }
        }
    }

    /// The video-call flow.
    ///
    /// Creates a room, builds the meeting link, returns the session to
    /// the menu state, then sends the CTA button, a plain-text fallback
    /// with the same link, and finally the menu again.
    async fn start_video_call(&self, from: &str) -> Result<(), BotError> {
        // 1. Fresh room per request, no reuse
        let room = RoomSlug::generate()?;

        // 2. Patient name when known, phone-tail label otherwise
        let display_name = match self.sessions.snapshot(from).await {
            Some(session) => session.display_name(),
            None => String::new(),
        };

        // 3. Ready-to-share link with subject, pre-join and suggested name
        let link = build_meeting_link(
            &self.video_base_url,
            room.as_str(),
            Some(&display_name),
            Some(&self.video_call_subject),
        );

        // 4. Back to the menu state before any send can fail
        self.sessions.set_step(from, Step::MainMenu).await;

        // 5. CTA button, plain-text fallback, then the menu again
        if let Err(e) = self
            .wa
            .send_cta_url(
                from,
                "Abrir sala de videollamada segura.",
                &link,
                "Unirme a la videollamada",
            )
            .await
        {
            warn!(target: "bot.engine", error = %e, "Failed to send video-call CTA");
        }

        self.send_text_logged(from, &format!("🔗 Enlace directo: {link}"))
            .await;
        self.send_main_menu(from).await;

        metrics::record_video_call_link();
        info!(
            target: "bot.engine",
            from = %from,
            room_slug = %room,
            "Video call link issued"
        );

        Ok(())
    }

    /// Hand the conversation to a human agent.
    async fn handoff_to_agent(&self, from: &str) {
        self.sessions
            .set_status(from, ConversationStatus::Waiting)
            .await;
        self.sessions.set_step(from, Step::AwaitingAgent).await;
        self.send_text_logged(from, TRANSFER_TEXT).await;

        info!(target: "bot.engine", from = %from, "Handoff to human agent requested");
    }

    /// Scheduling request: an agent follows up with the customer.
    async fn start_scheduling(&self, from: &str) {
        self.sessions
            .set_status(from, ConversationStatus::Waiting)
            .await;
        self.sessions.set_step(from, Step::AwaitingAgent).await;
        self.send_text_logged(from, SCHEDULE_TEXT).await;
    }

    /// Keyword auto-replies, handoff keywords, or the default prompt.
    async fn handle_text(&self, from: &str, body: &str) {
        let lower = body.trim().to_lowercase();

        for (keyword, reply) in AUTO_REPLIES {
            if lower.contains(keyword) {
                self.send_text_logged(from, reply).await;
                return;
            }
        }

        if HANDOFF_KEYWORDS.iter().any(|k| lower.contains(k)) {
            self.handoff_to_agent(from).await;
            return;
        }

        self.send_default_prompt(from).await;
    }

    async fn send_default_prompt(&self, from: &str) {
        self.send_text_logged(from, DEFAULT_TEXT).await;
        self.send_main_menu(from).await;
        self.sessions.set_step(from, Step::MainMenu).await;
    }

    /// Send a text message, recording it in the conversation log.
    async fn send_text_logged(&self, to: &str, body: &str) {
        match self.wa.send_text(to, body).await {
            Ok(()) => self.sessions.record_message(to, Sender::Bot, body).await,
            Err(e) => warn!(target: "bot.engine", error = %e, "Failed to send text message"),
        }
    }

    async fn send_main_menu(&self, to: &str) {
        if let Err(e) = self.wa.send_list_menu(to, &main_menu()).await {
            warn!(target: "bot.engine", error = %e, "Failed to send main menu");
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::models::{InteractivePayload, InteractiveReply, TextBody};
    use crate::services::wa_client::mock::{MockWaClient, SentMessage};

    const PHONE: &str = "5215551234567";

    fn text_message(body: &str) -> IncomingMessage {
        IncomingMessage {
            from: PHONE.to_string(),
            id: "wamid.test".to_string(),
            timestamp: None,
            kind: "text".to_string(),
            text: Some(TextBody {
                body: body.to_string(),
            }),
            interactive: None,
        }
    }

    fn button_message(id: &str) -> IncomingMessage {
        IncomingMessage {
            from: PHONE.to_string(),
            id: "wamid.test".to_string(),
            timestamp: None,
            kind: "interactive".to_string(),
            text: None,
            interactive: Some(InteractivePayload {
                kind: "button_reply".to_string(),
                button_reply: Some(InteractiveReply {
                    id: id.to_string(),
                    title: None,
                }),
                list_reply: None,
            }),
        }
    }

    fn engine_with(wa: Arc<MockWaClient>) -> (BotEngine, SessionStore) {
        let sessions = SessionStore::new();
        let engine = BotEngine::new(
            wa,
            sessions.clone(),
            "https://meet.jit.si".to_string(),
            "Videollamada Consulta".to_string(),
        );
        (engine, sessions)
    }

    #[tokio::test]
    async fn test_video_call_flow_sends_cta_text_and_menu() {
        let wa = Arc::new(MockWaClient::accepting());
        let (engine, sessions) = engine_with(wa.clone());

        engine
            .handle_message(&button_message(VIDEO_CALL_BUTTON_ID), Some("Maria"))
            .await
            .unwrap();

        let sent = wa.sent();
        assert_eq!(sent.len(), 3);

        let link = match &sent[0] {
            SentMessage::CtaUrl {
                body,
                url,
                display_text,
                ..
            } => {
                assert_eq!(body, "Abrir sala de videollamada segura.");
                assert_eq!(display_text, "Unirme a la videollamada");
                url.clone()
            }
            other => panic!("Expected CTA first, got {other:?}"),
        };

        // The plain-text fallback carries the same link
        match &sent[1] {
            SentMessage::Text { body, .. } => {
                assert!(body.contains(&link));
                assert!(body.starts_with("🔗 Enlace directo:"));
            }
            other => panic!("Expected text fallback second, got {other:?}"),
        }

        assert!(matches!(sent[2], SentMessage::ListMenu { .. }));

        // Link shape: base, slug, subject, pre-join, display name
        assert!(link.starts_with("https://meet.jit.si/cita-"));
        assert!(link.contains("config.subject=Videollamada%20Consulta"));
        assert!(link.contains("config.prejoinConfig.enabled=true"));
        assert!(link.contains("userInfo.displayName=Maria"));

        // Session returned to the menu state
        let session = sessions.snapshot(PHONE).await.unwrap();
        assert_eq!(session.step, Step::MainMenu);
    }

    #[tokio::test]
    async fn test_video_call_uses_phone_tail_without_profile_name() {
        let wa = Arc::new(MockWaClient::accepting());
        let (engine, _sessions) = engine_with(wa.clone());

        engine
            .handle_message(&button_message(VIDEO_CALL_BUTTON_ID), None)
            .await
            .unwrap();

        let sent = wa.sent();
        match &sent[0] {
            SentMessage::CtaUrl { url, .. } => {
                assert!(url.contains("userInfo.displayName=Paciente%204567"));
            }
            other => panic!("Expected CTA first, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_agent_active_suppresses_bot_replies() {
        let wa = Arc::new(MockWaClient::accepting());
        let (engine, sessions) = engine_with(wa.clone());

        sessions.get_or_create(PHONE, None).await;
        sessions.set_status(PHONE, ConversationStatus::Active).await;

        engine
            .handle_message(&text_message("hola"), None)
            .await
            .unwrap();

        assert!(wa.sent().is_empty());
    }

    #[tokio::test]
    async fn test_greeting_keyword_auto_reply() {
        let wa = Arc::new(MockWaClient::accepting());
        let (engine, _sessions) = engine_with(wa.clone());

        engine
            .handle_message(&text_message("Hola, buenos días"), None)
            .await
            .unwrap();

        let sent = wa.sent();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            SentMessage::Text { body, .. } => assert!(body.starts_with("¡Hola!")),
            other => panic!("Expected text reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handoff_keyword_marks_conversation_waiting() {
        let wa = Arc::new(MockWaClient::accepting());
        let (engine, sessions) = engine_with(wa.clone());

        engine
            .handle_message(&text_message("quiero hablar con un agente"), None)
            .await
            .unwrap();

        let session = sessions.snapshot(PHONE).await.unwrap();
        assert_eq!(session.status, ConversationStatus::Waiting);
        assert_eq!(session.step, Step::AwaitingAgent);

        let sent = wa.sent();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            SentMessage::Text { body, .. } => assert_eq!(body, TRANSFER_TEXT),
            other => panic!("Expected transfer text, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_text_gets_default_prompt_and_menu() {
        let wa = Arc::new(MockWaClient::accepting());
        let (engine, sessions) = engine_with(wa.clone());

        engine
            .handle_message(&text_message("asdf qwerty"), None)
            .await
            .unwrap();

        let sent = wa.sent();
        assert_eq!(sent.len(), 2);
        assert!(matches!(sent[0], SentMessage::Text { .. }));
        assert!(matches!(sent[1], SentMessage::ListMenu { .. }));

        let session = sessions.snapshot(PHONE).await.unwrap();
        assert_eq!(session.step, Step::MainMenu);
    }

    #[tokio::test]
    async fn test_video_call_flow_survives_send_failures() {
        let wa = Arc::new(MockWaClient::failing());
        let (engine, sessions) = engine_with(wa.clone());

        // Send failures are logged, not propagated
        engine
            .handle_message(&button_message(VIDEO_CALL_BUTTON_ID), None)
            .await
            .unwrap();

        // All three sends were still attempted
        assert_eq!(wa.sent().len(), 3);

        let session = sessions.snapshot(PHONE).await.unwrap();
        assert_eq!(session.step, Step::MainMenu);
    }

    #[tokio::test]
    async fn test_video_call_links_are_unique_per_request() {
        let wa = Arc::new(MockWaClient::accepting());
        let (engine, _sessions) = engine_with(wa.clone());

        engine
            .handle_message(&button_message(VIDEO_CALL_BUTTON_ID), None)
            .await
            .unwrap();
        engine
            .handle_message(&button_message(VIDEO_CALL_BUTTON_ID), None)
            .await
            .unwrap();

        let urls: Vec<String> = wa
            .sent()
            .into_iter()
            .filter_map(|m| match m {
                SentMessage::CtaUrl { url, .. } => Some(url),
                _ => None,
            })
            .collect();

        assert_eq!(urls.len(), 2);
        assert_ne!(urls[0], urls[1]);
    }

    #[tokio::test]
    async fn test_main_menu_contains_video_call_row() {
        let menu = main_menu();
        let rows = &menu.sections[0].rows;

        assert!(rows.iter().any(|r| r.id == VIDEO_CALL_BUTTON_ID));
        assert!(rows.iter().any(|r| r.id == MENU_SCHEDULE_ID));
        assert!(rows.iter().any(|r| r.id == MENU_AGENT_ID));
    }
}
