//! Domain records.
//!
//! Entity models double as the JSON representation of each record: field names
//! are snake_case, nullable timestamps are `Option` and travel as `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity;

pub type AllowedRegion = entity::allowed_region::Model;
pub type Apiary = entity::apiary::Model;
pub type BeeCommunity = entity::bee_community::Model;
pub type Hive = entity::hive::Model;
pub type HoneyHarvest = entity::honey_harvest::Model;
pub type Incident = entity::incident::Model;
pub type MaintenancePlan = entity::maintenance_plan::Model;
pub type ObservationLog = entity::observation_log::Model;
pub type ProductionReport = entity::production_report::Model;
pub type Region = entity::region::Model;
pub type RegionApiary = entity::region_apiary::Model;
pub type Sensor = entity::sensor::Model;
pub type SensorReading = entity::sensor_reading::Model;
pub type User = entity::user::Model;
pub type VeterinaryPassport = entity::veterinary_passport::Model;
pub type VeterinaryRecord = entity::veterinary_record::Model;
pub type WeatherData = entity::weather_data::Model;
pub type WorkerGroup = entity::worker_group::Model;
pub type WorkerGroupMember = entity::worker_group_member::Model;

/// Input for creating a worker group together with its initial members.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewWorkerGroup {
    pub manager_id: i32,
    pub group_name: String,
    #[serde(default)]
    pub worker_ids: Vec<i32>,
}

/// Row produced by the `get_latest_sensor_reading` store function.
///
/// Readings may be stored without a timestamp, so it stays optional.
#[derive(Clone, Debug, PartialEq)]
pub struct LatestSensorReading {
    pub value: Vec<u8>,
    pub timestamp: Option<DateTime<Utc>>,
}
