pub mod fakes;
pub mod recording;

pub use fakes::{FixedClock, SequentialIds};
pub use recording::RecordingHop;

use miro_client::{Client, ClientConfig};
use miro_core::MessageFactory;
use tracing_subscriber::EnvFilter;

pub const TEST_SENDER: &str = "tester@example.com";
pub const TEST_RECEIVER: &str = "repo@example.com";

/// Routes `tracing` output through the test harness; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A message factory with a fixed clock and `msg-N` ids.
pub fn deterministic_factory() -> MessageFactory {
    MessageFactory::new(FixedClock::default(), SequentialIds::new("msg"))
}

/// A client sending as [`TEST_SENDER`] to [`TEST_RECEIVER`] through `hop`,
/// with deterministic timestamps and ids. Without a hop, messages are held.
pub fn test_client(hop: Option<RecordingHop>) -> Client {
    init_tracing();
    let config = ClientConfig {
        sender: TEST_SENDER.to_string(),
        receiver: vec![TEST_RECEIVER.to_string()],
        ..ClientConfig::default()
    };
    let hop = hop.map(|h| Box::new(h) as Box<dyn miro_transport::NextHop>);
    Client::with_parts(config, hop, deterministic_factory())
}
