//! The relay core
//!
//! - SubscriberRegistry: concurrency-safe membership set for live clients
//! - Broadcaster: serialize-once fan-out of a batch to every subscriber
//! - PollScheduler: the refresh/fetch/broadcast control loop

pub mod dispatcher;
pub mod registry;
pub mod scheduler;

pub use dispatcher::Broadcaster;
pub use registry::{SubscriberId, SubscriberRegistry};
pub use scheduler::PollScheduler;
