use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    New,
    Read,
}

impl MessageStatus {
    pub fn parse(s: &str) -> Option<MessageStatus> {
        match s {
            "new" => Some(MessageStatus::New),
            "read" => Some(MessageStatus::Read),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageStatus::New => "new",
            MessageStatus::Read => "read",
        }
    }
}

/// A visitor request sent through `/contact`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub nom: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sujet: Option<String>,
    #[serde(alias = "projet")]
    pub message: String,
    #[serde(default)]
    pub fichiers: Vec<String>,
    #[serde(default)]
    pub status: MessageStatus,
    pub timestamp: DateTime<Utc>,
}

impl ContactMessage {
    pub fn new(
        nom: &str,
        email: &str,
        sujet: Option<&str>,
        message: &str,
        fichiers: Vec<String>,
    ) -> Self {
        ContactMessage {
            nom: nom.trim().to_string(),
            email: email.trim().to_string(),
            sujet: sujet
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            message: message.trim().to_string(),
            fichiers,
            status: MessageStatus::New,
            timestamp: Utc::now(),
        }
    }

    /// Plain-text rendering used for notification mails and download bundles.
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "From: {}\nContact: {}\nDate: {}\n",
            self.nom,
            self.email,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );
        if let Some(ref sujet) = self.sujet {
            out.push_str(&format!("Subject: {}\n", sujet));
        }
        out.push('\n');
        out.push_str(&self.message);
        out.push('\n');
        if !self.fichiers.is_empty() {
            out.push_str("\nAttachments:\n");
            for f in &self.fichiers {
                out.push_str(&format!("  - {}\n", f));
            }
        }
        out
    }
}
