//! Fire-and-forget publishing
//!
//! HTTP handlers publish after the store write has succeeded; a failed publish
//! is logged by the caller and never fails the request.

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions, QueueDeclareOptions};
use lapin::publisher_confirm::Confirmation;
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::BusError;
use crate::queue::ALL_QUEUES;

const CONTENT_TYPE_JSON: &str = "application/json";
const PERSISTENT_DELIVERY: u8 = 2;

#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a JSON body on the default exchange with `queue` as routing key
    async fn publish(&self, queue: &str, body: Vec<u8>) -> Result<(), BusError>;
}

/// Serialize `message` and publish it, recording the outcome in metrics
pub async fn publish_json<P, T>(publisher: &P, queue: &str, message: &T) -> Result<(), BusError>
where
    P: EventPublisher + ?Sized,
    T: Serialize + Sync,
{
    let body = serde_json::to_vec(message)?;
    match publisher.publish(queue, body).await {
        Ok(()) => {
            metrics::counter!("apiary_bus_published_total", "queue" => queue.to_string())
                .increment(1);
            Ok(())
        }
        Err(e) => {
            metrics::counter!("apiary_bus_publish_errors_total", "queue" => queue.to_string())
                .increment(1);
            Err(e)
        }
    }
}

/// Declare a queue as durable. Safe to repeat.
pub(crate) async fn declare_queue(channel: &Channel, queue: &str) -> Result<(), BusError> {
    channel
        .queue_declare(
            queue,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;
    Ok(())
}

/// Check the broker's answer to a publish on a confirm-mode channel
fn check_confirmation(queue: &str, confirmation: &Confirmation) -> Result<(), BusError> {
    match confirmation {
        Confirmation::Ack(_) => Ok(()),
        Confirmation::Nack(_) | Confirmation::NotRequested => {
            Err(BusError::NotConfirmed(queue.to_string()))
        }
    }
}

/// Publisher over a single AMQP channel in confirm mode.
///
/// Channels are not safe for concurrent writers, so publishes are serialised
/// behind an async mutex. The broker confirmation is awaited after the lock
/// is released.
pub struct AmqpPublisher {
    channel: Mutex<Channel>,
}

impl AmqpPublisher {
    /// Open a channel and declare every queue the service uses
    pub async fn new(connection: &Connection) -> Result<Self, BusError> {
        let channel = connection.create_channel().await?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await?;
        for queue in ALL_QUEUES {
            declare_queue(&channel, queue).await?;
        }
        Ok(Self {
            channel: Mutex::new(channel),
        })
    }

    pub async fn close(&self) -> Result<(), BusError> {
        let channel = self.channel.lock().await;
        channel.close(200, "publisher closed").await?;
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for AmqpPublisher {
    async fn publish(&self, queue: &str, body: Vec<u8>) -> Result<(), BusError> {
        let confirm = {
            let channel = self.channel.lock().await;
            channel
                .basic_publish(
                    "",
                    queue,
                    BasicPublishOptions::default(),
                    &body,
                    BasicProperties::default()
                        .with_content_type(CONTENT_TYPE_JSON.into())
                        .with_delivery_mode(PERSISTENT_DELIVERY),
                )
                .await?
        };
        check_confirmation(queue, &confirm.await?)?;

        debug!(queue, bytes = body.len(), "Published message");
        Ok(())
    }
}
