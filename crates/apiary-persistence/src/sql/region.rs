use async_trait::async_trait;
use sea_orm::*;

use super::{ExternalDbPersistService, crud, store_error};
use crate::entity::{allowed_region, region, region_apiary, weather_data};
use crate::model::{AllowedRegion, Region, RegionApiary, WeatherData};
use crate::traits::RegionPersistence;

#[async_trait]
impl RegionPersistence for ExternalDbPersistService {
    // ==================== Region Operations ====================

    async fn region_get(&self, region_id: i32) -> anyhow::Result<Region> {
        crud::find_by_id::<_, region::Entity>(&self.db, "region", region_id).await
    }

    async fn region_list(&self) -> anyhow::Result<Vec<Region>> {
        crud::find_all::<_, region::Entity>(&self.db, "regions").await
    }

    async fn region_create(&self, region: Region) -> anyhow::Result<Region> {
        let mut active = region.into_active_model().reset_all();
        active.region_id = NotSet;
        crud::insert(&self.db, "region", active).await
    }

    async fn region_update(&self, region: Region) -> anyhow::Result<Region> {
        let id = region.region_id;
        crud::update(&self.db, "region", id, region.into_active_model().reset_all()).await
    }

    async fn region_delete(&self, region_id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, region::Entity>(&self.db, "region", region_id).await
    }

    // ==================== Region Apiary Operations ====================

    async fn region_apiary_get(&self, id: i32) -> anyhow::Result<RegionApiary> {
        crud::find_by_id::<_, region_apiary::Entity>(&self.db, "region apiary", id).await
    }

    async fn region_apiary_list(&self) -> anyhow::Result<Vec<RegionApiary>> {
        crud::find_all::<_, region_apiary::Entity>(&self.db, "region apiaries").await
    }

    async fn region_apiary_create(&self, link: RegionApiary) -> anyhow::Result<RegionApiary> {
        let mut active = link.into_active_model().reset_all();
        active.id = NotSet;
        crud::insert(&self.db, "region apiary", active).await
    }

    async fn region_apiary_update(&self, link: RegionApiary) -> anyhow::Result<RegionApiary> {
        let id = link.id;
        crud::update(&self.db, "region apiary", id, link.into_active_model().reset_all()).await
    }

    async fn region_apiary_delete(&self, id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, region_apiary::Entity>(&self.db, "region apiary", id).await
    }

    // ==================== Allowed Region Operations ====================

    async fn allowed_region_get(&self, id: i32) -> anyhow::Result<AllowedRegion> {
        crud::find_by_id::<_, allowed_region::Entity>(&self.db, "allowed region", id).await
    }

    async fn allowed_region_list(&self) -> anyhow::Result<Vec<AllowedRegion>> {
        crud::find_all::<_, allowed_region::Entity>(&self.db, "allowed regions").await
    }

    async fn allowed_region_list_by_user(
        &self,
        user_id: i32,
    ) -> anyhow::Result<Vec<AllowedRegion>> {
        allowed_region::Entity::find()
            .filter(allowed_region::Column::UserId.eq(user_id))
            .order_by_asc(allowed_region::Column::RegionId)
            .all(&self.db)
            .await
            .map_err(|e| {
                store_error(
                    e,
                    format!("failed to list allowed regions of user {}", user_id),
                )
            })
    }

    async fn allowed_region_create(&self, link: AllowedRegion) -> anyhow::Result<AllowedRegion> {
        let mut active = link.into_active_model().reset_all();
        active.id = NotSet;
        crud::insert(&self.db, "allowed region", active).await
    }

    async fn allowed_region_update(&self, link: AllowedRegion) -> anyhow::Result<AllowedRegion> {
        let id = link.id;
        crud::update(&self.db, "allowed region", id, link.into_active_model().reset_all()).await
    }

    async fn allowed_region_delete(&self, id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, allowed_region::Entity>(&self.db, "allowed region", id).await
    }

    // ==================== Weather Operations ====================

    async fn weather_get(&self, weather_id: i32) -> anyhow::Result<WeatherData> {
        crud::find_by_id::<_, weather_data::Entity>(&self.db, "weather data", weather_id).await
    }

    async fn weather_list(&self) -> anyhow::Result<Vec<WeatherData>> {
        crud::find_all::<_, weather_data::Entity>(&self.db, "weather data").await
    }

    async fn weather_create(&self, sample: WeatherData) -> anyhow::Result<WeatherData> {
        let mut active = sample.into_active_model().reset_all();
        active.weather_id = NotSet;
        crud::insert(&self.db, "weather data", active).await
    }

    async fn weather_update(&self, sample: WeatherData) -> anyhow::Result<WeatherData> {
        let id = sample.weather_id;
        crud::update(&self.db, "weather data", id, sample.into_active_model().reset_all()).await
    }

    async fn weather_delete(&self, weather_id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, weather_data::Entity>(&self.db, "weather data", weather_id).await
    }
}
