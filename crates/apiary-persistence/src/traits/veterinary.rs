use async_trait::async_trait;

use crate::model::{VeterinaryPassport, VeterinaryRecord};

/// Veterinary passports and their dated records
#[async_trait]
pub trait VeterinaryPersistence: Send + Sync {
    // ==================== Passport Operations ====================

    async fn passport_get(&self, passport_id: i32) -> anyhow::Result<VeterinaryPassport>;

    async fn passport_list(&self) -> anyhow::Result<Vec<VeterinaryPassport>>;

    async fn passport_create(
        &self,
        passport: VeterinaryPassport,
    ) -> anyhow::Result<VeterinaryPassport>;

    async fn passport_update(
        &self,
        passport: VeterinaryPassport,
    ) -> anyhow::Result<VeterinaryPassport>;

    async fn passport_delete(&self, passport_id: i32) -> anyhow::Result<()>;

    // ==================== Record Operations ====================

    async fn veterinary_record_get(&self, record_id: i32) -> anyhow::Result<VeterinaryRecord>;

    async fn veterinary_record_list(&self) -> anyhow::Result<Vec<VeterinaryRecord>>;

    async fn veterinary_record_list_by_passport(
        &self,
        passport_id: i32,
    ) -> anyhow::Result<Vec<VeterinaryRecord>>;

    async fn veterinary_record_create(
        &self,
        record: VeterinaryRecord,
    ) -> anyhow::Result<VeterinaryRecord>;

    async fn veterinary_record_update(
        &self,
        record: VeterinaryRecord,
    ) -> anyhow::Result<VeterinaryRecord>;

    async fn veterinary_record_delete(&self, record_id: i32) -> anyhow::Result<()>;
}
