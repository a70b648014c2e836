use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::clock::{format_create_time, Clock, SystemClock};
use crate::error::CoreError;
use crate::ids::{IdGenerator, MessageId, UuidIds};
use crate::operation::Operation;
use crate::value::Value;

/// Extension key that overrides the generated message id.
pub const MID_KEY: &str = "mid";

/// Keys that `fields` may never use to replace an established value.
const PROTECTED_KEYS: [&str; 3] = ["source", "receiver", "body"];

/// Key of the creation timestamp; always generated, never taken from `fields`.
const CREATE_TIME_KEY: &str = "createTime";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Body {
    Single(Operation),
    Batch(Vec<Operation>),
}

impl Body {
    pub fn operations(&self) -> &[Operation] {
        match self {
            Body::Single(op) => std::slice::from_ref(op),
            Body::Batch(ops) => ops,
        }
    }

    pub fn len(&self) -> usize {
        self.operations().len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations().is_empty()
    }
}

impl From<Operation> for Body {
    fn from(op: Operation) -> Self {
        Body::Single(op)
    }
}

impl From<Vec<Operation>> for Body {
    fn from(ops: Vec<Operation>) -> Self {
        Body::Batch(ops)
    }
}

/// A routed, timestamped envelope around one or more operations.
///
/// Extensions sit next to the fixed fields on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMessage")]
pub struct Message {
    #[serde(rename = "mid")]
    id: MessageId,
    #[serde(rename = "createTime")]
    create_time: String,
    source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    receiver: Option<Vec<String>>,
    body: Body,
    #[serde(flatten)]
    extensions: BTreeMap<String, Value>,
}

/// Decoded form of a [`Message`] before its envelope has been checked.
#[derive(Deserialize)]
pub(crate) struct RawMessage {
    mid: MessageId,
    #[serde(rename = "createTime")]
    create_time: String,
    source: String,
    #[serde(default)]
    receiver: Option<Vec<String>>,
    body: Body,
    #[serde(flatten)]
    extensions: BTreeMap<String, Value>,
}

impl TryFrom<RawMessage> for Message {
    type Error = CoreError;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        if raw.source.is_empty() {
            return Err(CoreError::MissingSender);
        }
        Ok(Self {
            id: raw.mid,
            create_time: raw.create_time,
            source: raw.source,
            receiver: raw.receiver.filter(|r| !r.is_empty()),
            body: raw.body,
            extensions: raw.extensions,
        })
    }
}

impl Message {
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn create_time(&self) -> &str {
        &self.create_time
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn receiver(&self) -> Option<&[String]> {
        self.receiver.as_deref()
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn extensions(&self) -> &BTreeMap<String, Value> {
        &self.extensions
    }

    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }
}

/// Builds envelopes, stamping each with a fresh timestamp and id.
pub struct MessageFactory {
    clock: Box<dyn Clock + Send + Sync>,
    ids: Box<dyn IdGenerator + Send + Sync>,
}

impl Default for MessageFactory {
    fn default() -> Self {
        Self::new(SystemClock, UuidIds)
    }
}

impl MessageFactory {
    pub fn new(
        clock: impl Clock + Send + Sync + 'static,
        ids: impl IdGenerator + Send + Sync + 'static,
    ) -> Self {
        Self {
            clock: Box::new(clock),
            ids: Box::new(ids),
        }
    }

    /// Wraps `body` in an envelope from `source`.
    ///
    /// `fields` may carry `mid` to fix the message id and any number of extra
    /// envelope fields. Entries for `source`, `receiver` and `body` only apply
    /// when that field is still unset; `createTime` is always generated.
    pub fn build_message(
        &self,
        body: impl Into<Body>,
        source: &str,
        receiver: Option<Vec<String>>,
        mut fields: BTreeMap<String, Value>,
    ) -> Result<Message, CoreError> {
        if source.is_empty() {
            return Err(CoreError::MissingSender);
        }

        let create_time = format_create_time(self.clock.now())?;
        let id = match fields.remove(MID_KEY) {
            Some(Value::Text(mid)) => MessageId::new(mid),
            Some(other) => {
                return Err(CoreError::InvalidData(format!("mid must be text, got {other:?}")));
            }
            None => self.ids.next_id(),
        };

        let mut receiver = receiver.filter(|r| !r.is_empty());
        let mut extensions = BTreeMap::new();
        for (key, value) in fields {
            match key.as_str() {
                "receiver" if receiver.is_none() => {
                    let list = value.to_text_list().ok_or_else(|| {
                        CoreError::InvalidData(format!("receiver must be text, got {value:?}"))
                    })?;
                    receiver = Some(list).filter(|r| !r.is_empty());
                }
                k if PROTECTED_KEYS.contains(&k) || k == CREATE_TIME_KEY => {}
                _ => {
                    extensions.insert(key, value);
                }
            }
        }

        Ok(Message {
            id,
            create_time,
            source: source.to_string(),
            receiver,
            body: body.into(),
            extensions,
        })
    }
}

/// [`MessageFactory::build_message`] with the system clock and UUID ids.
pub fn build_message(
    body: impl Into<Body>,
    source: &str,
    receiver: Option<Vec<String>>,
    fields: BTreeMap<String, Value>,
) -> Result<Message, CoreError> {
    MessageFactory::default().build_message(body, source, receiver, fields)
}
