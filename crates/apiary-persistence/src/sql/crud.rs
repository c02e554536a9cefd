//! Generic helpers shared by every per-domain implementation.
//!
//! They funnel sea-orm errors through [`store_error`] so each failure carries
//! an operation-identifying message plus, where it applies, an `ApiaryError`
//! kind.

use apiary_common::ApiaryError;
use sea_orm::sqlx::postgres::PgDatabaseError;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    PrimaryKeyTrait, RuntimeErr, SqlErr,
};

/// SQLSTATE raised by the store procedures when the target row is missing
const NO_DATA_FOUND: &str = "P0002";

fn pg_error(err: &DbErr) -> Option<&PgDatabaseError> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db_err)))
        | DbErr::Query(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db_err))) => {
            db_err.try_downcast_ref::<PgDatabaseError>()
        }
        _ => None,
    }
}

/// Error kind for a SQLSTATE the store functions raise on purpose.
fn sqlstate_kind(code: &str, message: &str) -> Option<ApiaryError> {
    match code {
        NO_DATA_FOUND => Some(ApiaryError::NotFound(
            message.trim_end_matches(" not found").to_string(),
        )),
        _ => None,
    }
}

/// Wrap a store error with the failing operation, classifying constraint
/// violations as conflicts and `no_data_found` raised by a procedure as not
/// found. The original `DbErr` stays at the bottom of the chain.
pub(crate) fn store_error(err: DbErr, operation: impl Into<String>) -> anyhow::Error {
    let kind = match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            Some(ApiaryError::Conflict("unique constraint violated".to_string()))
        }
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => Some(ApiaryError::Conflict(
            "foreign key constraint violated".to_string(),
        )),
        _ => pg_error(&err).and_then(|pg| sqlstate_kind(pg.code(), pg.message())),
    };

    let err = anyhow::Error::new(err);
    let err = match kind {
        Some(kind) => err.context(kind),
        None => err,
    };
    err.context(operation.into())
}

pub(crate) async fn find_by_id<C, E>(db: &C, entity: &str, id: i32) -> anyhow::Result<E::Model>
where
    C: ConnectionTrait,
    E: EntityTrait,
    i32: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    E::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| store_error(e, format!("failed to get {} {}", entity, id)))?
        .ok_or_else(|| ApiaryError::not_found(entity, id).into())
}

pub(crate) async fn find_all<C, E>(db: &C, entity: &str) -> anyhow::Result<Vec<E::Model>>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    E::find()
        .all(db)
        .await
        .map_err(|e| store_error(e, format!("failed to list {}", entity)))
}

pub(crate) async fn insert<C, A>(
    db: &C,
    entity: &str,
    active: A,
) -> anyhow::Result<<A::Entity as EntityTrait>::Model>
where
    C: ConnectionTrait,
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    active
        .insert(db)
        .await
        .map_err(|e| store_error(e, format!("failed to create {}", entity)))
}

pub(crate) async fn update<C, A>(
    db: &C,
    entity: &str,
    id: i32,
    active: A,
) -> anyhow::Result<<A::Entity as EntityTrait>::Model>
where
    C: ConnectionTrait,
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    match active.update(db).await {
        Ok(model) => Ok(model),
        Err(DbErr::RecordNotUpdated) | Err(DbErr::RecordNotFound(_)) => {
            Err(ApiaryError::not_found(entity, id).into())
        }
        Err(e) => Err(store_error(e, format!("failed to update {} {}", entity, id))),
    }
}

pub(crate) async fn delete_by_id<C, E>(db: &C, entity: &str, id: i32) -> anyhow::Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
    i32: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    let result = E::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| store_error(e, format!("failed to delete {} {}", entity, id)))?;

    if result.rows_affected == 0 {
        return Err(ApiaryError::not_found(entity, id).into());
    }
    Ok(())
}
