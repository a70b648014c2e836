pub mod config;
pub mod error;

pub use config::ClientConfig;
pub use error::ClientError;

use std::collections::BTreeMap;

use miro_core::{Body, Fragment, Message, MessageFactory, Operation, OperationParts, Value};
use miro_transport::NextHop;
use tracing::{debug, info, warn};

/// Extra envelope fields (`mid`, `ReplyTo`, `ErrorTo`, ...).
pub type Fields = BTreeMap<String, Value>;

/// What happened to a message handed to [`Client::apply`].
#[derive(Debug)]
pub enum Outcome {
    /// The nexthop acknowledged the envelope.
    Delivered,
    /// The nexthop refused the envelope or could not be reached.
    Rejected,
    /// No nexthop is configured; the built message is returned untouched.
    Held(Message),
}

impl Outcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Outcome::Delivered)
    }

    pub fn held(self) -> Option<Message> {
        match self {
            Outcome::Held(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Application-facing handle: builds operations, wraps them in envelopes
/// from the configured sender and pushes them to the nexthop.
pub struct Client {
    sender: String,
    receiver: Vec<String>,
    nexthop: Option<Box<dyn NextHop>>,
    factory: MessageFactory,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let nexthop = match &config.nexthop {
            Some(uri) => Some(miro_transport::connect(uri, config.tls.as_ref())?),
            None => None,
        };
        Ok(Self::with_parts(config, nexthop, MessageFactory::default()))
    }

    /// Uses the given transport and message factory instead of the ones the
    /// configuration would produce. `config.nexthop` and `config.tls` are ignored.
    pub fn with_parts(
        config: ClientConfig,
        nexthop: Option<Box<dyn NextHop>>,
        factory: MessageFactory,
    ) -> Self {
        Self {
            sender: config.sender,
            receiver: config.receiver,
            nexthop,
            factory,
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &[String] {
        &self.receiver
    }

    pub fn has_nexthop(&self) -> bool {
        self.nexthop.is_some()
    }

    /// Wraps `body` in an envelope from this client's sender.
    pub fn message(&self, body: impl Into<Body>, fields: Fields) -> Result<Message, ClientError> {
        let receiver = (!self.receiver.is_empty()).then(|| self.receiver.clone());
        let msg = self
            .factory
            .build_message(body, &self.sender, receiver, fields)?;
        debug!(mid = %msg.id(), operations = msg.body().len(), "built message");
        Ok(msg)
    }

    /// Serializes `msg` and hands it to the nexthop.
    pub fn apply(&self, msg: Message) -> Result<Outcome, ClientError> {
        let Some(hop) = &self.nexthop else {
            return Ok(Outcome::Held(msg));
        };
        let payload = msg.to_msgpack()?;
        if hop.deliver(&payload) {
            info!(mid = %msg.id(), nexthop = %hop.describe(), "message delivered");
            Ok(Outcome::Delivered)
        } else {
            warn!(mid = %msg.id(), nexthop = %hop.describe(), "message rejected");
            Ok(Outcome::Rejected)
        }
    }

    fn send(&self, op: Operation, fields: Fields) -> Result<Outcome, ClientError> {
        debug!(construct = op.construct_string(), affected = ?op.affected_identities(), "sending operation");
        let msg = self.message(op, fields)?;
        self.apply(msg)
    }

    /// Adds `object` as a new object (`O`).
    pub fn add(&self, object: Fragment, fields: Fields) -> Result<Outcome, ClientError> {
        self.send(Operation::add(object)?, fields)
    }

    /// Deletes the object `object` names (`M`). With no properties the whole
    /// object goes; otherwise only the listed properties.
    pub fn delete(&self, object: Fragment, fields: Fields) -> Result<Outcome, ClientError> {
        self.send(Operation::delete(object)?, fields)
    }

    /// Removes the asserted properties of `part` from its object (`M`).
    pub fn remove(&self, part: Fragment, fields: Fields) -> Result<Outcome, ClientError> {
        if part.is_identity_only() {
            debug!(about = part.about(), "remove without properties deletes the whole object");
        }
        self.send(Operation::delete(part)?, fields)
    }

    /// Adds the properties of `object` to the existing object with the same
    /// identifier (`MI`). With `create`, the object is added instead when it
    /// does not exist yet (`MIO`).
    pub fn insert(&self, mut object: Fragment, create: bool, fields: Fields) -> Result<Outcome, ClientError> {
        let matching = object.same_type_identity();
        let op = if create {
            object.clear_about();
            Operation::insert_or_add(matching, object.clone(), object)?
        } else {
            Operation::insert(object, Some(matching))?
        };
        self.send(op, fields)
    }

    /// Replaces the matched properties with those of `replace` (`MR`).
    pub fn replace(&self, matching: Fragment, mut replace: Fragment, fields: Fields) -> Result<Outcome, ClientError> {
        require_identity(&matching)?;
        detach_identity(&matching, &mut replace)?;
        self.send(Operation::replace(matching, replace)?, fields)
    }

    /// Inserts `insert` and replaces with `replace` on one matched object (`MIR`).
    pub fn insert_replace(
        &self,
        matching: Fragment,
        mut insert: Fragment,
        mut replace: Fragment,
        fields: Fields,
    ) -> Result<Outcome, ClientError> {
        require_identity(&matching)?;
        if insert.has_identity() {
            detach_identity(&matching, &mut insert)?;
            if insert.object_type() != matching.object_type() {
                return Err(ClientError::MismatchedType {
                    matching: matching.object_type().to_string(),
                    other: insert.object_type().to_string(),
                });
            }
        }
        detach_identity(&matching, &mut replace)?;
        let op = Operation::build(
            OperationParts::new()
                .with_match(matching)
                .with_insert(insert)
                .with_replace(replace),
        )?;
        self.send(op, fields)
    }
}

fn require_identity(matching: &Fragment) -> Result<(), ClientError> {
    if matching.has_identity() {
        Ok(())
    } else {
        Err(ClientError::MatchWithoutIdentity)
    }
}

/// A part that names an object must name the matched one; its identifier
/// is then dropped so only the match carries it.
fn detach_identity(matching: &Fragment, part: &mut Fragment) -> Result<(), ClientError> {
    if !part.has_identity() {
        return Ok(());
    }
    if part.about() != matching.about() {
        return Err(ClientError::MismatchedIdentity {
            matching: matching.about().to_string(),
            other: part.about().to_string(),
        });
    }
    part.clear_about();
    Ok(())
}
