//! Apiary Persistence - database entities and persistence layer
//!
//! This crate provides:
//! - SeaORM entity definitions, one per table
//! - Persistence trait abstractions grouped by domain
//! - The PostgreSQL implementation (`ExternalDbPersistService`)

pub mod entity;
pub mod model;
pub mod sql;
pub mod traits;

// Re-export sea-orm for convenience
pub use sea_orm;

// Re-export persistence traits
pub use traits::{
    ActivityPersistence, ApiaryPersistence, IotPersistence, PersistenceService,
    ProcedurePersistence, RegionPersistence, ReportPersistence, UserPersistence,
    VeterinaryPersistence,
};

// Re-export SQL backend
pub use sql::ExternalDbPersistService;

// Re-export model types
pub use model::*;
