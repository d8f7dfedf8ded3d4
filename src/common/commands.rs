use super::types::{RecordId, UserRole};

/// Identifies the chat session a request was issued from. Bumped on every
/// open/close so replies to an abandoned session can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SessionToken(pub u64);

impl SessionToken {
    pub fn next(self) -> Self {
        SessionToken(self.0 + 1)
    }
}

/// Which backend route a chat query goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEndpoint {
    /// `/farmer_advice/`, producers only. Always carries a location.
    FarmerAdvice { location_name: String },
    /// `/consumer_chat/`, everyone else.
    ConsumerChat,
}

impl ChatEndpoint {
    pub fn for_role(role: UserRole, location_name: &str) -> Self {
        match role {
            UserRole::Producer => ChatEndpoint::FarmerAdvice {
                location_name: location_name.to_string(),
            },
            UserRole::Customer | UserRole::Processor => ChatEndpoint::ConsumerChat,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ChatEndpoint::FarmerAdvice { .. } => "/farmer_advice/",
            ChatEndpoint::ConsumerChat => "/consumer_chat/",
        }
    }
}

/// One outbound chat query, built by the chat session on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub token: SessionToken,
    pub endpoint: ChatEndpoint,
    pub query: String,
    /// Set when the conversation was started from a map record.
    pub herb_name: Option<String>,
}

impl ChatRequest {
    /// Multipart form fields in the order they are sent.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("query", self.query.clone())];
        if let ChatEndpoint::FarmerAdvice { location_name } = &self.endpoint {
            fields.push(("location_name", location_name.clone()));
        }
        if let Some(herb_name) = &self.herb_name {
            fields.push(("herb_name", herb_name.clone()));
        }
        fields
    }
}

/// Commands the UI sends down to the backend worker.
#[derive(Debug, Clone)]
pub enum BackendCommand {
    SendQuery(ChatRequest),
    /// Fetch the dashboard record list (`GET /dashboard/`).
    LoadRecords,
    /// Fetch the processing history of one record (`GET /trace_herb/{id}`).
    TraceRecord(RecordId),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: UserRole, herb_name: Option<&str>) -> ChatRequest {
        ChatRequest {
            token: SessionToken(1),
            endpoint: ChatEndpoint::for_role(role, "India"),
            query: "When should I harvest?".to_string(),
            herb_name: herb_name.map(str::to_string),
        }
    }

    #[test]
    fn producer_routes_to_farmer_advice_with_location() {
        let req = request(UserRole::Producer, None);
        assert_eq!(req.endpoint.path(), "/farmer_advice/");
        assert_eq!(
            req.form_fields(),
            vec![
                ("query", "When should I harvest?".to_string()),
                ("location_name", "India".to_string()),
            ]
        );
    }

    #[test]
    fn other_roles_never_send_location() {
        for role in [UserRole::Customer, UserRole::Processor] {
            let req = request(role, None);
            assert_eq!(req.endpoint.path(), "/consumer_chat/");
            assert!(req.form_fields().iter().all(|(name, _)| *name != "location_name"));
        }
    }

    #[test]
    fn herb_context_adds_herb_name_field() {
        let req = request(UserRole::Customer, Some("Tulsi"));
        assert_eq!(
            req.form_fields().last(),
            Some(&("herb_name", "Tulsi".to_string()))
        );
    }
}
