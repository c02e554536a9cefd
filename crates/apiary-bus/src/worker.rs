//! AMQP consumer tasks
//!
//! One task per consumed queue. Each task takes a delivery, reconciles it and
//! acknowledges before taking the next, and checks the cancellation token
//! between deliveries.

use std::future::Future;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions};
use lapin::types::FieldTable;
use lapin::{Channel, Connection};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::BusError;
use crate::publisher::declare_queue;
use crate::queue::CONSUMED_QUEUES;
use crate::reconciler::{Disposition, Reconciler};

pub struct BusWorker {
    connection: Arc<Connection>,
    reconciler: Arc<Reconciler>,
}

impl BusWorker {
    pub fn new(connection: Arc<Connection>, reconciler: Reconciler) -> Self {
        Self {
            connection,
            reconciler: Arc::new(reconciler),
        }
    }

    /// Consume every queue until the token is cancelled or a consumer fails.
    pub async fn run(self, token: CancellationToken) -> Result<(), BusError> {
        let mut tasks = JoinSet::new();

        for queue in CONSUMED_QUEUES {
            let channel = self.connection.create_channel().await?;
            declare_queue(&channel, queue).await?;
            channel.basic_qos(1, BasicQosOptions::default()).await?;

            let reconciler = self.reconciler.clone();
            let token = token.clone();
            tasks.spawn(async move { consume_queue(channel, queue, reconciler, token).await });
        }

        info!(queues = ?CONSUMED_QUEUES, "Bus worker started");

        let mut result = Ok(());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!("Bus consumer stopped with error: {}", e);
                    token.cancel();
                    if result.is_ok() {
                        result = Err(e);
                    }
                }
                Err(e) => {
                    error!("Bus consumer task panicked: {}", e);
                    token.cancel();
                }
            }
        }

        info!("Bus worker stopped");
        result
    }
}

async fn consume_queue(
    channel: Channel,
    queue: &'static str,
    reconciler: Arc<Reconciler>,
    token: CancellationToken,
) -> Result<(), BusError> {
    let consumer_tag = format!("apiary-{}", queue);
    let mut consumer = channel
        .basic_consume(
            queue,
            &consumer_tag,
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;

    info!(queue, "Consuming");

    let result = pump(queue, &mut consumer, &token, |delivery: Delivery| {
        let reconciler = reconciler.clone();
        async move {
            let disposition = reconciler.process(queue, &delivery.data).await;
            settle(&delivery, disposition).await
        }
    })
    .await;

    if let Err(e) = channel.close(200, "worker shutdown").await {
        warn!(queue, "Failed to close consumer channel: {}", e);
    }
    result
}

/// Hand each delivery to `handle`, one at a time, until the token is
/// cancelled. A stream that ends before cancellation means the broker closed
/// the consumer, which is an error.
async fn pump<S, T, F, Fut>(
    queue: &'static str,
    mut deliveries: S,
    token: &CancellationToken,
    mut handle: F,
) -> Result<(), BusError>
where
    S: Stream<Item = Result<T, lapin::Error>> + Unpin,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<(), BusError>>,
{
    loop {
        let next = tokio::select! {
            _ = token.cancelled() => return Ok(()),
            next = deliveries.next() => next,
        };

        match next {
            Some(Ok(delivery)) => handle(delivery).await?,
            Some(Err(e)) => return Err(e.into()),
            None if token.is_cancelled() => return Ok(()),
            None => {
                warn!(queue, "Consumer stream ended");
                return Err(BusError::ConsumerClosed(queue.to_string()));
            }
        }
    }
}

async fn settle(delivery: &Delivery, disposition: Disposition) -> Result<(), BusError> {
    match disposition {
        Disposition::Ack => delivery.acker.ack(BasicAckOptions::default()).await?,
        Disposition::Reject => {
            delivery
                .acker
                .nack(BasicNackOptions {
                    requeue: false,
                    ..Default::default()
                })
                .await?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;
    use crate::queue::SENSOR_QUEUE;

    #[tokio::test]
    async fn test_pump_fails_when_broker_ends_stream() {
        let token = CancellationToken::new();
        let mut handled = Vec::new();

        let result = pump(
            SENSOR_QUEUE,
            stream::iter([Ok::<_, lapin::Error>(1), Ok(2)]),
            &token,
            |n| {
                handled.push(n);
                async { Ok(()) }
            },
        )
        .await;

        assert_eq!(handled, vec![1, 2]);
        assert!(matches!(result, Err(BusError::ConsumerClosed(ref q)) if q == SENSOR_QUEUE));
    }

    #[tokio::test]
    async fn test_pump_stops_cleanly_on_cancel() {
        let token = CancellationToken::new();
        token.cancel();

        let result = pump(
            SENSOR_QUEUE,
            stream::pending::<Result<u32, lapin::Error>>(),
            &token,
            |_| async { Ok(()) },
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_pump_propagates_handler_errors() {
        let token = CancellationToken::new();

        let result = pump(
            SENSOR_QUEUE,
            stream::iter([Ok::<_, lapin::Error>(1), Ok(2)]),
            &token,
            |_| async { Err(BusError::NotConfirmed(SENSOR_QUEUE.to_string())) },
        )
        .await;
        assert!(matches!(result, Err(BusError::NotConfirmed(_))));
    }
}
