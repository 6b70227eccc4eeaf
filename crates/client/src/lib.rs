pub mod cache;
pub mod executor;
pub mod monitor;
pub mod request;
pub mod response;
pub mod transport;

pub use cache::ConnectionCacheEntry;
pub use executor::{ExecutorConfig, RequestExecutor};
pub use monitor::{CommunicationMonitor, LoadMonitor};
pub use request::{Request, SUPPORTED_METHODS};
pub use response::Response;
pub use transport::{DnsOverride, Transport, TransportAttempt, TransportFailure, TransportOutcome};
