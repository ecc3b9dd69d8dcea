//! Request dispatch core - admission control and orchestration

pub mod admission;
pub mod orchestrator;

pub use admission::AdmissionController;
pub use orchestrator::{Dispatcher, GenerateReply};
