use async_trait::async_trait;
use sea_orm::*;

use super::{ExternalDbPersistService, crud, store_error};
use crate::entity::production_report;
use crate::model::ProductionReport;
use crate::traits::ReportPersistence;

#[async_trait]
impl ReportPersistence for ExternalDbPersistService {
    async fn production_report_get(&self, report_id: i32) -> anyhow::Result<ProductionReport> {
        crud::find_by_id::<_, production_report::Entity>(&self.db, "production report", report_id)
            .await
    }

    async fn production_report_list(&self) -> anyhow::Result<Vec<ProductionReport>> {
        crud::find_all::<_, production_report::Entity>(&self.db, "production reports").await
    }

    async fn production_report_recent(&self, limit: u64) -> anyhow::Result<Vec<ProductionReport>> {
        production_report::Entity::find()
            .order_by_desc(production_report::Column::EndDate)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| store_error(e, "failed to list recent production reports"))
    }

    async fn production_report_list_by_curator(
        &self,
        user_id: i32,
    ) -> anyhow::Result<Vec<ProductionReport>> {
        production_report::Entity::find()
            .filter(production_report::Column::CuratedBy.eq(user_id))
            .order_by_desc(production_report::Column::EndDate)
            .all(&self.db)
            .await
            .map_err(|e| {
                store_error(
                    e,
                    format!("failed to list production reports curated by {}", user_id),
                )
            })
    }

    async fn production_report_create(
        &self,
        report: ProductionReport,
    ) -> anyhow::Result<ProductionReport> {
        let mut active = report.into_active_model().reset_all();
        active.report_id = NotSet;
        crud::insert(&self.db, "production report", active).await
    }

    async fn production_report_update(
        &self,
        report: ProductionReport,
    ) -> anyhow::Result<ProductionReport> {
        let id = report.report_id;
        crud::update(
            &self.db,
            "production report",
            id,
            report.into_active_model().reset_all(),
        )
        .await
    }

    async fn production_report_delete(&self, report_id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, production_report::Entity>(&self.db, "production report", report_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;

    #[tokio::test]
    async fn test_recent_reports_orders_by_end_date_and_limits() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<ProductionReport>::new()])
            .into_connection();
        let service = ExternalDbPersistService::new(db);

        let reports = service.production_report_recent(50).await.unwrap();
        assert!(reports.is_empty());

        let log = format!("{:?}", service.into_db().into_transaction_log());
        assert!(log.contains("ORDER BY"), "{}", log);
        assert!(log.contains("end_date"), "{}", log);
        assert!(log.contains("DESC LIMIT"), "{}", log);
    }
}
