use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use miro_core::{CoreError, Message};
use miro_transport::NextHop;

#[derive(Debug, Default)]
struct Inbox {
    payloads: Mutex<Vec<Vec<u8>>>,
    refuse: AtomicBool,
}

/// In-memory nexthop that keeps every payload it is given.
///
/// Clones share the same inbox, so a test can keep one handle while the
/// client owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingHop {
    inbox: Arc<Inbox>,
}

impl RecordingHop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent deliveries fail (payloads are still recorded).
    pub fn refuse(&self, refuse: bool) {
        self.inbox.refuse.store(refuse, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Vec<u8>>> {
        self.inbox
            .payloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Decodes every recorded payload as a message envelope.
    pub fn messages(&self) -> Result<Vec<Message>, CoreError> {
        self.lock()
            .iter()
            .map(|bytes| Message::from_msgpack(bytes))
            .collect()
    }
}

impl NextHop for RecordingHop {
    fn deliver(&self, payload: &[u8]) -> bool {
        self.lock().push(payload.to_vec());
        !self.inbox.refuse.load(Ordering::SeqCst)
    }

    fn describe(&self) -> String {
        "recording".to_string()
    }
}
