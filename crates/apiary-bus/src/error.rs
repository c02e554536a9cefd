use thiserror::Error;

/// Errors raised by the bus client
#[derive(Error, Debug)]
pub enum BusError {
    #[error("amqp error: {0}")]
    Amqp(#[from] lapin::Error),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("broker did not confirm publish to {0}")]
    NotConfirmed(String),

    #[error("broker closed the consumer on {0}")]
    ConsumerClosed(String),
}
