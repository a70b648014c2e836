//! MessagePack wire encoding with named fields.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CoreError;
use crate::message::{Message, RawMessage};
use crate::operation::Operation;

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CoreError> {
    rmp_serde::to_vec_named(value).map_err(|e| CoreError::Serialization(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CoreError> {
    rmp_serde::from_slice(bytes).map_err(|e| CoreError::Serialization(e.to_string()))
}

impl Operation {
    pub fn to_msgpack(&self) -> Result<Vec<u8>, CoreError> {
        encode(self)
    }

    /// Decoding rejects slot combinations that are not legal constructs.
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, CoreError> {
        decode(bytes)
    }
}

impl Message {
    pub fn to_msgpack(&self) -> Result<Vec<u8>, CoreError> {
        encode(self)
    }

    /// Decoding rejects envelopes without a sender.
    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, CoreError> {
        Message::try_from(decode::<RawMessage>(bytes)?)
    }
}
