//! Inbound event model and normalizer.
//!
//! Meta delivers two near-duplicate payload shapes, discriminated by the
//! top-level `object` field: `page` (Messenger) carries `entry[].messaging[]`
//! sub-events, `instagram` carries `entry[].changes[]` records. Both flatten
//! into zero or more [`NormalizedMessage`]s.

use serde::Deserialize;
use serde_json::Value;

/// Platform a message originated from. Decides the outbound channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Messenger,
    Instagram,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Messenger => "messenger",
            Origin::Instagram => "instagram",
        }
    }
}

/// One inbound user message in platform-independent form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMessage {
    pub sender_id: String,
    pub text: String,
    pub origin: Origin,
}

/// Raw webhook payload, classified by the `object` discriminant.
///
/// Entries stay as raw JSON: each sub-event is deserialized on its own so a
/// malformed one is skipped without aborting the rest of the batch.
#[derive(Debug, Deserialize)]
#[serde(tag = "object", rename_all = "lowercase")]
pub enum InboundEvent {
    Page {
        #[serde(default)]
        entry: Vec<Value>,
    },
    Instagram {
        #[serde(default)]
        entry: Vec<Value>,
    },
    #[serde(other)]
    Unrecognized,
}

/// A `page` messaging sub-event. Sub-events without a `message` (delivery
/// receipts, read marks) are skipped by the normalizer.
#[derive(Debug, Deserialize)]
struct MessagingEvent {
    sender: Party,
    #[serde(default)]
    message: Option<MessagePayload>,
}

#[derive(Debug, Deserialize)]
struct Party {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    is_echo: bool,
}

/// An `instagram` change record; only `field == "messages"` carries a message.
#[derive(Debug, Deserialize)]
struct ChangeRecord {
    field: String,
    value: ChangeValue,
}

#[derive(Debug, Deserialize)]
struct ChangeValue {
    from: Party,
    #[serde(default)]
    message: Option<String>,
}

impl InboundEvent {
    /// Classify a payload. Anything that does not match a recognized shape
    /// (unknown or missing `object`, non-array `entry`) is `Unrecognized`
    /// and normalizes to zero messages.
    pub fn classify(payload: &Value) -> Self {
        Self::deserialize(payload).unwrap_or(Self::Unrecognized)
    }

    /// Flatten the event into normalized messages.
    ///
    /// Echo messages (sent by the page account itself) are suppressed. A
    /// malformed sub-event fails only itself: it is logged and skipped while
    /// its siblings are still processed.
    pub fn normalize(&self) -> Vec<NormalizedMessage> {
        match self {
            Self::Page { entry } => entry
                .iter()
                .flat_map(|e| sub_events(e, "messaging"))
                .filter_map(normalize_messaging_event)
                .collect(),
            Self::Instagram { entry } => entry
                .iter()
                .flat_map(|e| sub_events(e, "changes"))
                .filter_map(normalize_change_record)
                .collect(),
            Self::Unrecognized => Vec::new(),
        }
    }
}

/// Sub-event array of one entry, or empty when the key is missing/mistyped.
fn sub_events<'a>(entry: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    entry
        .get(key)
        .and_then(Value::as_array)
        .map(|a| a.as_slice())
        .unwrap_or_default()
        .iter()
}

fn normalize_messaging_event(raw: &Value) -> Option<NormalizedMessage> {
    let event = match MessagingEvent::deserialize(raw) {
        Ok(ev) => ev,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping malformed messaging sub-event");
            return None;
        }
    };

    let message = event.message?;
    if message.is_echo {
        tracing::info!("Skipping echo message");
        return None;
    }

    Some(NormalizedMessage {
        sender_id: event.sender.id,
        text: message.text.unwrap_or_default(),
        origin: Origin::Messenger,
    })
}

fn normalize_change_record(raw: &Value) -> Option<NormalizedMessage> {
    let record = match ChangeRecord::deserialize(raw) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping malformed change record");
            return None;
        }
    };

    if record.field != "messages" {
        return None;
    }

    Some(NormalizedMessage {
        sender_id: record.value.from.id,
        text: record.value.message.unwrap_or_default(),
        origin: Origin::Instagram,
    })
}
