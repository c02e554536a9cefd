use async_trait::async_trait;
use sea_orm::*;

use super::{ExternalDbPersistService, crud, store_error};
use crate::entity::{veterinary_passport, veterinary_record};
use crate::model::{VeterinaryPassport, VeterinaryRecord};
use crate::traits::VeterinaryPersistence;

#[async_trait]
impl VeterinaryPersistence for ExternalDbPersistService {
    async fn passport_get(&self, passport_id: i32) -> anyhow::Result<VeterinaryPassport> {
        crud::find_by_id::<_, veterinary_passport::Entity>(
            &self.db,
            "veterinary passport",
            passport_id,
        )
        .await
    }

    async fn passport_list(&self) -> anyhow::Result<Vec<VeterinaryPassport>> {
        crud::find_all::<_, veterinary_passport::Entity>(&self.db, "veterinary passports").await
    }

    async fn passport_create(
        &self,
        passport: VeterinaryPassport,
    ) -> anyhow::Result<VeterinaryPassport> {
        let mut active = passport.into_active_model().reset_all();
        active.passport_id = NotSet;
        crud::insert(&self.db, "veterinary passport", active).await
    }

    async fn passport_update(
        &self,
        passport: VeterinaryPassport,
    ) -> anyhow::Result<VeterinaryPassport> {
        let id = passport.passport_id;
        crud::update(
            &self.db,
            "veterinary passport",
            id,
            passport.into_active_model().reset_all(),
        )
        .await
    }

    async fn passport_delete(&self, passport_id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, veterinary_passport::Entity>(
            &self.db,
            "veterinary passport",
            passport_id,
        )
        .await
    }

    async fn veterinary_record_get(&self, record_id: i32) -> anyhow::Result<VeterinaryRecord> {
        crud::find_by_id::<_, veterinary_record::Entity>(&self.db, "veterinary record", record_id)
            .await
    }

    async fn veterinary_record_list(&self) -> anyhow::Result<Vec<VeterinaryRecord>> {
        crud::find_all::<_, veterinary_record::Entity>(&self.db, "veterinary records").await
    }

    async fn veterinary_record_list_by_passport(
        &self,
        passport_id: i32,
    ) -> anyhow::Result<Vec<VeterinaryRecord>> {
        veterinary_record::Entity::find()
            .filter(veterinary_record::Column::PassportId.eq(passport_id))
            .order_by_desc(veterinary_record::Column::RecordDate)
            .all(&self.db)
            .await
            .map_err(|e| {
                store_error(
                    e,
                    format!("failed to list records of passport {}", passport_id),
                )
            })
    }

    async fn veterinary_record_create(
        &self,
        record: VeterinaryRecord,
    ) -> anyhow::Result<VeterinaryRecord> {
        let mut active = record.into_active_model().reset_all();
        active.record_id = NotSet;
        crud::insert(&self.db, "veterinary record", active).await
    }

    async fn veterinary_record_update(
        &self,
        record: VeterinaryRecord,
    ) -> anyhow::Result<VeterinaryRecord> {
        let id = record.record_id;
        crud::update(
            &self.db,
            "veterinary record",
            id,
            record.into_active_model().reset_all(),
        )
        .await
    }

    async fn veterinary_record_delete(&self, record_id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, veterinary_record::Entity>(&self.db, "veterinary record", record_id)
            .await
    }
}
