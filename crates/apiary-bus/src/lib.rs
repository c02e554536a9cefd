//! Apiary Bus - message bus plumbing
//!
//! This crate provides:
//! - Queue names and JSON message shapes shared with the ingestion side
//! - `EventPublisher`, the fire-and-forget publisher used by HTTP handlers
//! - `Reconciler`, which applies sensor, reading and delete events to the store
//! - `BusWorker`, one AMQP consumer task per queue with manual acknowledgement

pub mod error;
pub mod message;
pub mod publisher;
pub mod queue;
pub mod reconciler;
pub mod worker;

pub use error::BusError;
pub use message::{DeleteSensorMessage, HiveSensorMessage};
pub use publisher::{AmqpPublisher, EventPublisher, publish_json};
pub use reconciler::{Disposition, Reconciler};
pub use worker::BusWorker;
