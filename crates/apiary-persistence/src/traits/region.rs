//! Region persistence trait
//!
//! Regions, their M:N links to apiaries and users, and weather samples.

use async_trait::async_trait;

use crate::model::{AllowedRegion, Region, RegionApiary, WeatherData};

#[async_trait]
pub trait RegionPersistence: Send + Sync {
    // ==================== Region Operations ====================

    async fn region_get(&self, region_id: i32) -> anyhow::Result<Region>;

    async fn region_list(&self) -> anyhow::Result<Vec<Region>>;

    async fn region_create(&self, region: Region) -> anyhow::Result<Region>;

    async fn region_update(&self, region: Region) -> anyhow::Result<Region>;

    async fn region_delete(&self, region_id: i32) -> anyhow::Result<()>;

    // ==================== Region-Apiary Operations ====================

    async fn region_apiary_get(&self, id: i32) -> anyhow::Result<RegionApiary>;

    async fn region_apiary_list(&self) -> anyhow::Result<Vec<RegionApiary>>;

    async fn region_apiary_create(&self, link: RegionApiary) -> anyhow::Result<RegionApiary>;

    async fn region_apiary_update(&self, link: RegionApiary) -> anyhow::Result<RegionApiary>;

    async fn region_apiary_delete(&self, id: i32) -> anyhow::Result<()>;

    // ==================== Allowed Region Operations ====================

    async fn allowed_region_get(&self, id: i32) -> anyhow::Result<AllowedRegion>;

    async fn allowed_region_list(&self) -> anyhow::Result<Vec<AllowedRegion>>;

    /// Regions the given user may access
    async fn allowed_region_list_by_user(&self, user_id: i32)
    -> anyhow::Result<Vec<AllowedRegion>>;

    async fn allowed_region_create(&self, link: AllowedRegion) -> anyhow::Result<AllowedRegion>;

    async fn allowed_region_update(&self, link: AllowedRegion) -> anyhow::Result<AllowedRegion>;

    async fn allowed_region_delete(&self, id: i32) -> anyhow::Result<()>;

    // ==================== Weather Operations ====================

    async fn weather_get(&self, weather_id: i32) -> anyhow::Result<WeatherData>;

    async fn weather_list(&self) -> anyhow::Result<Vec<WeatherData>>;

    async fn weather_create(&self, sample: WeatherData) -> anyhow::Result<WeatherData>;

    async fn weather_update(&self, sample: WeatherData) -> anyhow::Result<WeatherData>;

    async fn weather_delete(&self, weather_id: i32) -> anyhow::Result<()>;
}
