pub mod error;
pub mod file;
pub mod http;
pub mod nexthop;
pub mod traits;
pub mod uds;

pub use error::TransportError;
pub use file::FileHop;
pub use http::{HttpHop, TlsConfig};
pub use nexthop::connect;
pub use traits::NextHop;
pub use uds::UdsHop;
