//! Queue broker seam - consumer trait, embedded driver, and connection pool

pub mod memory;
pub mod pool;
pub mod traits;

pub use memory::MemoryBroker;
pub use pool::BrokerPool;
pub use traits::{EnqueueOptions, Job, JobBroker, JobCounts, JobHandle, JobOutcome, JobResult};
