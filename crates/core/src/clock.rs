use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::CoreError;

/// Source of the wall-clock instant stamped on new messages.
pub trait Clock {
    fn now(&self) -> PrimitiveDateTime;
}

/// Reads the local wall clock, falling back to UTC when the local offset
/// cannot be determined.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> PrimitiveDateTime {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        PrimitiveDateTime::new(now.date(), now.time())
    }
}

/// `createTime` layout: local time, second precision, no offset.
pub fn format_create_time(instant: PrimitiveDateTime) -> Result<String, CoreError> {
    instant
        .format(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))
        .map_err(|e| CoreError::InvalidData(format!("cannot format createTime: {e}")))
}
