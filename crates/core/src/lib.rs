pub mod clock;
pub mod config;
pub mod error;
pub mod metrics;
pub mod sampler;
pub mod trail;

pub use clock::{FakeClock, MonotonicClock, SystemMonotonicClock};
pub use config::{PoolConfig, TimeoutConfig};
pub use error::ExecutorError;
pub use metrics::{Metrics, RemoteIpTable};
pub use sampler::InterarrivalSampler;
pub use trail::TrailId;
