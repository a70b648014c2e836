use std::sync::atomic::{AtomicU64, Ordering};

use miro_core::{Clock, IdGenerator, MessageId};
use time::PrimitiveDateTime;
use time::macros::datetime;

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(PrimitiveDateTime);

impl FixedClock {
    pub fn at(instant: PrimitiveDateTime) -> Self {
        Self(instant)
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self(datetime!(2009-08-28 12:00:00))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> PrimitiveDateTime {
        self.0
    }
}

/// Hands out `<prefix>-1`, `<prefix>-2`, ...
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> MessageId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        MessageId::new(format!("{}-{n}", self.prefix))
    }
}
