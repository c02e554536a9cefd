use async_trait::async_trait;

use crate::model::ProductionReport;

/// Production report persistence operations
#[async_trait]
pub trait ReportPersistence: Send + Sync {
    async fn production_report_get(&self, report_id: i32) -> anyhow::Result<ProductionReport>;

    async fn production_report_list(&self) -> anyhow::Result<Vec<ProductionReport>>;

    /// Reports ordered by `end_date` descending, at most `limit`
    async fn production_report_recent(&self, limit: u64) -> anyhow::Result<Vec<ProductionReport>>;

    async fn production_report_list_by_curator(
        &self,
        user_id: i32,
    ) -> anyhow::Result<Vec<ProductionReport>>;

    async fn production_report_create(
        &self,
        report: ProductionReport,
    ) -> anyhow::Result<ProductionReport>;

    async fn production_report_update(
        &self,
        report: ProductionReport,
    ) -> anyhow::Result<ProductionReport>;

    async fn production_report_delete(&self, report_id: i32) -> anyhow::Result<()>;
}
