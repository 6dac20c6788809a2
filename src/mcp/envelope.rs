//! The envelope record exchanged between agents

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::payload::{MessageType, Payload, PayloadContent};
use crate::agent::{AgentError, AgentResult};

/// Keys every serialized envelope must carry.
pub const REQUIRED_KEYS: [&str; 6] = ["type", "sender", "receiver", "trace_id", "timestamp", "payload"];

/// Immutable message between two agents.
///
/// Built once by [`create_mcp`] (or parsed from JSON) and never changed;
/// a stage transition always produces a fresh envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    sender: String,
    receiver: String,
    trace_id: String,
    timestamp: DateTime<Utc>,
    payload: Payload,
}

/// Create a new envelope with a fresh trace id and the current time.
pub fn create_mcp(sender: impl Into<String>, receiver: impl Into<String>, payload: Payload) -> Envelope {
    Envelope {
        sender: sender.into(),
        receiver: receiver.into(),
        trace_id: Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        payload,
    }
}

/// Check a typed envelope: non-blank routing fields and, when given, the
/// expected type tag.
pub fn validate_mcp(envelope: &Envelope, expected: Option<MessageType>) -> bool {
    let filled = [&envelope.sender, &envelope.receiver, &envelope.trace_id]
        .iter()
        .all(|s| !s.trim().is_empty());
    if !filled {
        return false;
    }
    expected.map_or(true, |t| envelope.message_type() == t)
}

/// Check an untyped JSON envelope for the six required keys and,
/// when given, an exact type string.
pub fn validate_raw(value: &Value, expected: Option<&str>) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    if !REQUIRED_KEYS.iter().all(|k| obj.contains_key(*k)) {
        return false;
    }
    match expected {
        Some(t) => obj.get("type").and_then(Value::as_str) == Some(t),
        None => true,
    }
}

impl Envelope {
    pub fn message_type(&self) -> MessageType {
        self.payload.message_type()
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    /// Parse an untyped JSON envelope, naming any missing key.
    pub fn from_value(value: Value) -> AgentResult<Self> {
        if let Some(obj) = value.as_object() {
            let missing: Vec<&str> = REQUIRED_KEYS
                .iter()
                .copied()
                .filter(|k| !obj.contains_key(*k))
                .collect();
            if !missing.is_empty() {
                return Err(AgentError::Protocol(format!(
                    "Envelope missing required field(s): {}",
                    missing.join(", ")
                )));
            }
        } else {
            return Err(AgentError::Protocol("Envelope must be a JSON object".to_string()));
        }

        serde_json::from_value(value).map_err(|e| AgentError::Protocol(format!("Malformed envelope: {}", e)))
    }

    pub fn to_value(&self) -> AgentResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Serialize for Envelope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Envelope", 6)?;
        s.serialize_field("type", &self.message_type())?;
        s.serialize_field("sender", &self.sender)?;
        s.serialize_field("receiver", &self.receiver)?;
        s.serialize_field("trace_id", &self.trace_id)?;
        s.serialize_field("timestamp", &self.timestamp)?;
        s.serialize_field("payload", &PayloadContent(&self.payload))?;
        s.end()
    }
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    msg_type: MessageType,
    sender: String,
    receiver: String,
    trace_id: String,
    timestamp: DateTime<Utc>,
    payload: Value,
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawEnvelope::deserialize(deserializer)?;
        let payload = Payload::from_content(raw.msg_type, raw.payload).map_err(serde::de::Error::custom)?;
        Ok(Envelope {
            sender: raw.sender,
            receiver: raw.receiver,
            trace_id: raw.trace_id,
            timestamp: raw.timestamp,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::ProjectBrief;

    fn request() -> Envelope {
        let brief = ProjectBrief {
            client_name: Some("Acme".into()),
            ..Default::default()
        };
        create_mcp("UserInterface", "Orchestrator", Payload::ProposalRequest(brief))
    }

    #[test]
    fn test_create_assigns_unique_trace_ids() {
        let a = request();
        let b = request();
        assert_ne!(a.trace_id(), b.trace_id());
        assert!(Uuid::parse_str(a.trace_id()).is_ok());
        assert_eq!(a.message_type(), MessageType::ProposalRequest);
    }

    #[test]
    fn test_created_envelope_validates_against_own_type_only() {
        let env = request();
        assert!(validate_mcp(&env, None));
        assert!(validate_mcp(&env, Some(MessageType::ProposalRequest)));
        for other in MessageType::ALL.into_iter().filter(|t| *t != MessageType::ProposalRequest) {
            assert!(!validate_mcp(&env, Some(other)));
        }
    }

    #[test]
    fn test_serialized_envelope_validates_raw() {
        let value = request().to_value().unwrap();
        assert!(validate_raw(&value, None));
        assert!(validate_raw(&value, Some("PROPOSAL_REQUEST")));
        assert!(!validate_raw(&value, Some("PRICING_CALCULATED")));
        assert!(!validate_raw(&value, Some("proposal_request")));
    }

    #[test]
    fn test_blank_sender_fails_validation() {
        let env = create_mcp("  ", "Orchestrator", Payload::ProposalRequest(ProjectBrief::default()));
        assert!(!validate_mcp(&env, None));
    }

    #[test]
    fn test_json_round_trip_preserves_envelope() {
        let env = request();
        let back = Envelope::from_value(env.to_value().unwrap()).unwrap();
        assert_eq!(back, env);
    }

    #[test]
    fn test_from_value_names_missing_fields() {
        let mut value = request().to_value().unwrap();
        value.as_object_mut().unwrap().remove("trace_id");
        assert!(!validate_raw(&value, None));

        let err = Envelope::from_value(value).unwrap_err();
        assert!(matches!(err, AgentError::Protocol(ref m) if m.contains("trace_id")));
    }

    #[test]
    fn test_from_value_rejects_unknown_type() {
        let mut value = request().to_value().unwrap();
        value["type"] = Value::from("SOMETHING_ELSE");
        assert!(matches!(Envelope::from_value(value), Err(AgentError::Protocol(_))));
    }
}
