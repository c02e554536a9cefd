//! HTTP routes
//!
//! `/auth/*` and the operational endpoints are public. Everything under
//! `/api` requires a bearer token, and each resource scope is additionally
//! gated by a role set.

use actix_web::web;
use apiary_common::Role;

use crate::error::{json_config, path_config, query_config};
use crate::middleware::{Authentication, RequireRole};

pub mod activity;
pub mod apiary;
pub mod auth;
pub mod health;
pub mod iot;
pub mod model;
pub mod region;
pub mod report;
pub mod user;
pub mod veterinary;
pub mod worker_group;

/// Register every route on an app
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .service(auth::routes())
        .service(health::livez)
        .service(health::readyz)
        .service(health::metrics)
        .service(
            web::scope("/api")
                .wrap(Authentication)
                // Open to every role
                .service(apiary::apiary_routes().wrap(RequireRole::new(&Role::ALL)))
                .service(apiary::hive_routes().wrap(RequireRole::new(&Role::ALL)))
                .service(apiary::bee_community_routes().wrap(RequireRole::new(&Role::ALL)))
                .service(apiary::honey_harvest_routes().wrap(RequireRole::new(&Role::ALL)))
                .service(region::region_routes().wrap(RequireRole::new(&Role::ALL)))
                .service(activity::observation_routes().wrap(RequireRole::new(&Role::ALL)))
                .service(activity::maintenance_routes().wrap(RequireRole::new(&Role::ALL)))
                .service(activity::incident_routes().wrap(RequireRole::new(&Role::ALL)))
                .service(iot::sensor_reading_routes().wrap(RequireRole::new(&Role::ALL)))
                .service(iot::sensor_routes().wrap(RequireRole::new(&Role::ALL)))
                .service(region::weather_routes().wrap(RequireRole::new(&Role::ALL)))
                .service(report::routes().wrap(RequireRole::new(&Role::ALL)))
                .service(veterinary::passport_routes().wrap(RequireRole::new(&Role::ALL)))
                .service(veterinary::record_routes().wrap(RequireRole::new(&Role::ALL)))
                // Managers and admins only
                .service(region::allowed_region_routes().wrap(RequireRole::new(&Role::STAFF)))
                .service(region::region_apiary_routes().wrap(RequireRole::new(&Role::STAFF)))
                .service(worker_group::routes().wrap(RequireRole::new(&Role::STAFF)))
                .service(user::routes().wrap(RequireRole::new(&Role::STAFF))),
        );
}
