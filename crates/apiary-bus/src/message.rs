use apiary_persistence::Sensor;
use serde::{Deserialize, Serialize};

/// Published on `hive_queue` when sensors are attached to a hive.
///
/// Field names are capitalised on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiveSensorMessage {
    #[serde(rename = "HiveID")]
    pub hive_id: i32,
    #[serde(rename = "Sensors")]
    pub sensors: Vec<Sensor>,
}

/// Published on `sensor_delete_queue` when a sensor row goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteSensorMessage {
    pub hive_id: i32,
    pub sensor_id: i32,
}
