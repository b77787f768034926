//! Audit delivery to a chat webhook as a single embed.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use modgate_core::audit::{AuditRecord, AuditSink};

const GREEN: u32 = 0x2ecc71;
const RED: u32 = 0xe74c3c;

#[derive(Debug, Serialize)]
struct WebhookMessage {
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    color: u32,
    fields: Vec<EmbedField>,
    footer: EmbedFooter,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct EmbedField {
    name: &'static str,
    value: String,
    inline: bool,
}

#[derive(Debug, Serialize)]
struct EmbedFooter {
    text: String,
}

impl EmbedField {
    fn new(name: &'static str, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name,
            value: value.into(),
            inline,
        }
    }
}

fn embed_for(record: &AuditRecord) -> Embed {
    let mark = if record.succeeded { "✅" } else { "❌" };
    let mut fields = vec![
        EmbedField::new("Administrator", &record.requestor.name, true),
        EmbedField::new("Target", record.target_label(), true),
        EmbedField::new(
            "Status",
            if record.succeeded { "Success" } else { "Failed" },
            true,
        ),
    ];
    if let Some(reason) = &record.reason {
        fields.push(EmbedField::new("Reason", reason, false));
    }
    if let Some(minutes) = record.duration_minutes {
        fields.push(EmbedField::new("Duration", format!("{minutes} minutes"), true));
    }
    if let Some(error) = &record.error_detail {
        fields.push(EmbedField::new("Error", format!("```{error}```"), false));
    }

    Embed {
        title: format!("{mark} {}", record.action.as_str().to_uppercase()),
        color: if record.succeeded { GREEN } else { RED },
        fields,
        footer: EmbedFooter {
            text: format!("Admin ID: {}", record.requestor.id),
        },
        timestamp: record.timestamp.to_rfc3339(),
    }
}

/// Posts each audit record to a webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    http: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl AuditSink for WebhookSink {
    async fn deliver(&self, record: &AuditRecord) -> anyhow::Result<()> {
        let message = WebhookMessage {
            embeds: vec![embed_for(record)],
        };
        self.http
            .post(&self.url)
            .json(&message)
            .send()
            .await?
            .error_for_status()?;
        tracing::info!(
            action = %record.action,
            requestor = %record.requestor.name,
            target = record.target_label(),
            "logged audit record"
        );
        Ok(())
    }
}
