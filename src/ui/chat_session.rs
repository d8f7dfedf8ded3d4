use crate::common::{
    ChatEndpoint, ChatMessage, ChatRequest, Identity, Record, SessionToken, UserRole,
};
use crate::network::{ApiError, ApiReply};

const CONNECT_TROUBLE: &str = "I'm having trouble connecting right now";
const SERVICE_UNREACHABLE: &str = "Failed to connect to the AyurTrace AI service.";
const NO_RESPONSE: &str = "Failed to get a response.";

/// Greeting shown as the first message of every session.
pub fn greeting(identity: &Identity) -> String {
    let name = identity.display_name();
    match identity.role {
        UserRole::Producer => format!(
            "Hello {name}! How can I assist you with your cultivation, soil health, or harvesting today?"
        ),
        UserRole::Processor => format!(
            "Hello {name}! Do you have questions regarding batch tracking or processing standards?"
        ),
        UserRole::Customer => {
            format!("Welcome {name}! How can I help you learn about Ayurvedic herbs today?")
        }
    }
}

/// Turn a finished request into the bot's line in the transcript.
pub fn reply_text(outcome: Result<ApiReply, ApiError>) -> String {
    match outcome {
        Ok(reply) if reply.is_success() => reply
            .response
            .unwrap_or_else(|| format!("{CONNECT_TROUBLE}: {NO_RESPONSE}")),
        Ok(reply) => format!(
            "{CONNECT_TROUBLE}: {}",
            reply.message.as_deref().unwrap_or(NO_RESPONSE)
        ),
        Err(ApiError::Status { .. }) => format!("{CONNECT_TROUBLE}: {SERVICE_UNREACHABLE}"),
        Err(err) => format!("{CONNECT_TROUBLE}: {err}"),
    }
}

/// State of the floating chat widget.
///
/// At most one request is in flight. Each open/close starts a new generation;
/// replies tagged with an older generation are dropped.
pub struct ChatSession {
    identity: Identity,
    location_name: String,
    is_open: bool,
    messages: Vec<ChatMessage>,
    pub input_text: String,
    is_loading: bool,
    generation: SessionToken,
    herb_context: Option<String>,
    scroll_to_latest: bool,
}

impl ChatSession {
    pub fn new(identity: Identity, location_name: impl Into<String>) -> Self {
        Self {
            identity,
            location_name: location_name.into(),
            is_open: false,
            messages: Vec::new(),
            input_text: String::new(),
            is_loading: false,
            generation: SessionToken::default(),
            herb_context: None,
            scroll_to_latest: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn herb_context(&self) -> Option<&str> {
        self.herb_context.as_deref()
    }

    pub fn toggle(&mut self) {
        if self.is_open {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn open(&mut self) {
        self.is_open = true;
        self.restart();
    }

    pub fn close(&mut self) {
        self.is_open = false;
        self.generation = self.generation.next();
        self.is_loading = false;
        self.herb_context = None;
    }

    /// Host-supplied identity refresh. An open session greets again.
    pub fn set_identity(&mut self, identity: Identity) {
        if identity == self.identity {
            return;
        }
        self.identity = identity;
        if self.is_open {
            self.restart();
        }
    }

    /// Start a conversation about a map record.
    pub fn open_for_record(&mut self, record: &Record) {
        if !self.is_open {
            self.open();
        }
        self.herb_context = Some(record.name.clone());
        self.input_text = format!("Tell me about {}.", record.name);
    }

    /// Take the typed input and turn it into a request.
    ///
    /// Returns `None` when the input is blank or a reply is still pending; in
    /// that case nothing is appended.
    pub fn submit(&mut self) -> Option<ChatRequest> {
        if self.input_text.trim().is_empty() || self.is_loading {
            return None;
        }

        let query = std::mem::take(&mut self.input_text);
        self.push(ChatMessage::user(query.clone()));
        self.is_loading = true;

        Some(ChatRequest {
            token: self.generation,
            endpoint: ChatEndpoint::for_role(self.identity.role, &self.location_name),
            query,
            herb_name: self.herb_context.clone(),
        })
    }

    /// Apply a finished request. Returns `false` when the reply belongs to an
    /// earlier session and was dropped.
    pub fn apply_reply(&mut self, token: SessionToken, outcome: Result<ApiReply, ApiError>) -> bool {
        if token != self.generation {
            log::warn!(
                "Dropping reply for stale chat session {} (current {})",
                token.0,
                self.generation.0
            );
            return false;
        }
        self.is_loading = false;
        self.push(ChatMessage::bot(reply_text(outcome)));
        true
    }

    /// True once after each transcript change.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_latest)
    }

    fn restart(&mut self) {
        self.generation = self.generation.next();
        self.is_loading = false;
        self.herb_context = None;
        self.messages.clear();
        self.push(ChatMessage::bot(greeting(&self.identity)));
    }

    fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.scroll_to_latest = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Sender;

    fn session(role: UserRole) -> ChatSession {
        ChatSession::new(
            Identity {
                role,
                email: Some("meera@ayurtrace.in".to_string()),
            },
            "India",
        )
    }

    fn success(text: &str) -> Result<ApiReply, ApiError> {
        Ok(ApiReply {
            status: "success".to_string(),
            response: Some(text.to_string()),
            message: None,
        })
    }

    fn type_and_submit(chat: &mut ChatSession, text: &str) -> Option<ChatRequest> {
        chat.input_text = text.to_string();
        chat.submit()
    }

    #[test]
    fn opening_greets_once_per_role() {
        let mut texts = Vec::new();
        for role in [UserRole::Customer, UserRole::Producer, UserRole::Processor] {
            let mut chat = session(role);
            chat.open();
            assert_eq!(chat.messages().len(), 1);
            assert_eq!(chat.messages()[0].sender, Sender::Bot);
            assert!(chat.messages()[0].text.contains("meera"));
            texts.push(chat.messages()[0].text.clone());
        }
        assert!(texts[0].starts_with("Welcome meera!"));
        assert!(texts[1].contains("cultivation"));
        assert!(texts[2].contains("batch tracking"));
    }

    #[test]
    fn reopening_discards_previous_transcript() {
        let mut chat = session(UserRole::Customer);
        chat.open();
        let request = type_and_submit(&mut chat, "hi").unwrap();
        chat.apply_reply(request.token, success("hello"));
        assert_eq!(chat.messages().len(), 3);

        chat.toggle();
        chat.toggle();
        assert!(chat.is_open());
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut chat = session(UserRole::Customer);
        chat.open();
        assert!(type_and_submit(&mut chat, "").is_none());
        assert!(type_and_submit(&mut chat, "  \t\n").is_none());
        assert_eq!(chat.messages().len(), 1);
        assert!(!chat.is_loading());
    }

    #[test]
    fn submit_is_rejected_while_loading() {
        let mut chat = session(UserRole::Customer);
        chat.open();
        let first = type_and_submit(&mut chat, "first").unwrap();
        assert!(chat.is_loading());
        assert!(chat.input_text.is_empty());

        assert!(type_and_submit(&mut chat, "second").is_none());
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.input_text, "second");

        chat.apply_reply(first.token, success("ok"));
        assert!(!chat.is_loading());
        assert!(chat.submit().is_some());
    }

    #[test]
    fn successful_exchange_adds_user_then_bot() {
        let mut chat = session(UserRole::Customer);
        chat.open();
        let before = chat.messages().len();

        let request = type_and_submit(&mut chat, "What is Tulsi?").unwrap();
        assert!(chat.apply_reply(request.token, success("**Holy basil.**")));

        let messages = chat.messages();
        assert_eq!(messages.len(), before + 2);
        assert_eq!(messages[before].sender, Sender::User);
        assert_eq!(messages[before].text, "What is Tulsi?");
        assert_eq!(messages[before + 1].sender, Sender::Bot);
        assert_eq!(messages[before + 1].text, "**Holy basil.**");
    }

    #[test]
    fn transport_failure_becomes_a_bot_message() {
        let mut chat = session(UserRole::Customer);
        chat.open();
        let request = type_and_submit(&mut chat, "hi").unwrap();
        chat.apply_reply(
            request.token,
            Err(ApiError::Transport("connection refused".to_string())),
        );

        let last = chat.messages().last().unwrap();
        assert_eq!(last.sender, Sender::Bot);
        assert!(last.text.starts_with("I'm having trouble connecting right now"));
        assert!(last.text.contains("connection refused"));
        assert!(!chat.is_loading());
    }

    #[test]
    fn failure_texts_follow_the_reply_shape() {
        assert_eq!(
            reply_text(Err(ApiError::Status { status: 502 })),
            "I'm having trouble connecting right now: Failed to connect to the AyurTrace AI service."
        );
        assert_eq!(
            reply_text(Ok(ApiReply {
                status: "error".to_string(),
                response: None,
                message: Some("AI Error: quota".to_string()),
            })),
            "I'm having trouble connecting right now: AI Error: quota"
        );
        assert_eq!(
            reply_text(Ok(ApiReply {
                status: "error".to_string(),
                response: None,
                message: None,
            })),
            "I'm having trouble connecting right now: Failed to get a response."
        );
        assert_eq!(
            reply_text(Ok(ApiReply {
                status: "success".to_string(),
                response: None,
                message: None,
            })),
            "I'm having trouble connecting right now: Failed to get a response."
        );
    }

    #[test]
    fn producer_requests_carry_location() {
        let mut chat = session(UserRole::Producer);
        chat.open();
        let request = type_and_submit(&mut chat, "Soil pH for ashwagandha?").unwrap();
        assert_eq!(
            request.endpoint,
            ChatEndpoint::FarmerAdvice {
                location_name: "India".to_string()
            }
        );

        let mut chat = session(UserRole::Processor);
        chat.open();
        let request = type_and_submit(&mut chat, "Drying temperature?").unwrap();
        assert_eq!(request.endpoint, ChatEndpoint::ConsumerChat);
    }

    #[test]
    fn late_reply_from_previous_session_is_dropped() {
        let mut chat = session(UserRole::Customer);
        chat.open();
        let stale = type_and_submit(&mut chat, "slow question").unwrap();

        chat.close();
        chat.open();
        assert!(!chat.is_loading());

        assert!(!chat.apply_reply(stale.token, success("late answer")));
        assert_eq!(chat.messages().len(), 1);
        assert!(type_and_submit(&mut chat, "fresh question").is_some());
    }

    #[test]
    fn identity_change_regreets_open_session() {
        let mut chat = session(UserRole::Customer);
        chat.open();
        let pending = type_and_submit(&mut chat, "hi").unwrap();

        chat.set_identity(Identity {
            role: UserRole::Producer,
            email: None,
        });
        assert!(!chat.is_loading());
        assert_eq!(chat.messages().len(), 1);
        assert!(chat.messages()[0].text.starts_with("Hello there!"));
        assert!(!chat.apply_reply(pending.token, success("for the old role")));
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn record_handoff_sets_context_and_prefills_input() {
        let record = Record {
            id: 1,
            name: "Tulsi".to_string(),
            latitude: 20.0,
            longitude: 77.0,
            verified_species: Some("Ocimum tenuiflorum".to_string()),
            confidence_score: Some(0.97),
            timestamp: None,
            farmer: None,
        };
        let mut chat = session(UserRole::Customer);
        chat.open_for_record(&record);

        assert!(chat.is_open());
        assert_eq!(chat.input_text, "Tell me about Tulsi.");
        let request = chat.submit().unwrap();
        assert_eq!(request.herb_name.as_deref(), Some("Tulsi"));
    }

    #[test]
    fn every_append_requests_a_scroll() {
        let mut chat = session(UserRole::Customer);
        chat.open();
        assert!(chat.take_scroll_request());
        assert!(!chat.take_scroll_request());

        let request = type_and_submit(&mut chat, "hi").unwrap();
        assert!(chat.take_scroll_request());
        chat.apply_reply(request.token, success("hello"));
        assert!(chat.take_scroll_request());
    }
}
