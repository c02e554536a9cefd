//! Queue names. These are shared with the ingestion process and must not
//! change.

pub const HIVE_QUEUE: &str = "hive_queue";
pub const SENSOR_QUEUE: &str = "sensor_queue";
pub const SENSOR_READING_QUEUE: &str = "sensor_reading_queue";
pub const SENSOR_DELETE_QUEUE: &str = "sensor_delete_queue";
pub const INCIDENT_QUEUE: &str = "incident_queue";

/// Every queue the service declares
pub const ALL_QUEUES: [&str; 5] = [
    HIVE_QUEUE,
    SENSOR_QUEUE,
    SENSOR_READING_QUEUE,
    SENSOR_DELETE_QUEUE,
    INCIDENT_QUEUE,
];

/// Queues this process consumes
pub const CONSUMED_QUEUES: [&str; 3] = [SENSOR_QUEUE, SENSOR_READING_QUEUE, SENSOR_DELETE_QUEUE];
