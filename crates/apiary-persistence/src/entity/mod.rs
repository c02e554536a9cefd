//! sea-orm entities, one module per table.

pub mod allowed_region;
pub mod apiary;
pub mod bee_community;
pub mod hive;
pub mod honey_harvest;
pub mod incident;
pub mod maintenance_plan;
pub mod observation_log;
pub mod production_report;
pub mod region;
pub mod region_apiary;
pub mod sensor;
pub mod sensor_reading;
pub mod user;
pub mod veterinary_passport;
pub mod veterinary_record;
pub mod weather_data;
pub mod worker_group;
pub mod worker_group_member;
