use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One entry of the chat transcript. Never mutated after it is appended.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text.into())
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text.into())
    }

    fn new(sender: Sender, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text,
            timestamp: Utc::now().timestamp(),
        }
    }
}

/// Role of the signed-in user. Selects both the greeting and the chat endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum UserRole {
    #[default]
    Customer,
    Producer,
    Processor,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Customer, UserRole::Producer, UserRole::Processor];

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Customer => "Customer",
            UserRole::Producer => "Producer",
            UserRole::Processor => "Processor",
        }
    }

    /// Parse a role identifier. Anything unrecognised is treated as a customer.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "producer" => UserRole::Producer,
            "processor" => UserRole::Processor,
            "customer" => UserRole::Customer,
            other => {
                log::warn!("Unknown role `{other}`; falling back to Customer");
                UserRole::Customer
            }
        }
    }
}

impl From<String> for UserRole {
    fn from(label: String) -> Self {
        UserRole::from_label(&label)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller identity handed in by the host. Not derived or authenticated here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    pub role: UserRole,
    pub email: Option<String>,
}

impl Identity {
    /// Local part of the email, or `"there"` when there is nothing usable.
    pub fn display_name(&self) -> &str {
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|name| !name.is_empty())
            .unwrap_or("there")
    }
}

pub type RecordId = i64;

/// A geo-tagged herb batch as listed by the dashboard endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub verified_species: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub farmer: Option<String>,
}

/// Origin block of a trace report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceOrigin {
    pub name: String,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub farmer: Option<String>,
}

/// One processing action recorded against a herb batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStep {
    pub action: String,
    pub batch_number: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub processor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceReport {
    pub origin: TraceOrigin,
    #[serde(default)]
    pub processing_history: Vec<ProcessingStep>,
}
