pub mod classify;
pub mod clock;
pub mod codec;
pub mod error;
pub mod fragment;
pub mod ids;
pub mod message;
pub mod operation;
pub mod schema;
pub mod value;

pub use clock::{Clock, SystemClock};
pub use error::CoreError;
pub use fragment::Fragment;
pub use ids::{IdGenerator, MessageId, UuidIds};
pub use message::{build_message, Body, Message, MessageFactory};
pub use operation::{Construct, Operation, OperationParts, Slot};
pub use schema::{ClassSchema, Restrictions, Unrestricted};
pub use value::Value;
