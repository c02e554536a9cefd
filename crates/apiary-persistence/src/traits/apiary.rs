//! Apiary persistence trait
//!
//! Apiaries, hives, bee communities and honey harvests.

use async_trait::async_trait;

use crate::model::{Apiary, BeeCommunity, Hive, HoneyHarvest};

#[async_trait]
pub trait ApiaryPersistence: Send + Sync {
    // ==================== Apiary Operations ====================

    async fn apiary_get(&self, apiary_id: i32) -> anyhow::Result<Apiary>;

    async fn apiary_list(&self) -> anyhow::Result<Vec<Apiary>>;

    async fn apiary_create(&self, apiary: Apiary) -> anyhow::Result<Apiary>;

    async fn apiary_update(&self, apiary: Apiary) -> anyhow::Result<Apiary>;

    async fn apiary_delete(&self, apiary_id: i32) -> anyhow::Result<()>;

    // ==================== Hive Operations ====================

    async fn hive_get(&self, hive_id: i32) -> anyhow::Result<Hive>;

    async fn hive_list(&self) -> anyhow::Result<Vec<Hive>>;

    /// Hives located in the given apiary
    async fn hive_list_by_apiary(&self, apiary_id: i32) -> anyhow::Result<Vec<Hive>>;

    async fn hive_create(&self, hive: Hive) -> anyhow::Result<Hive>;

    async fn hive_update(&self, hive: Hive) -> anyhow::Result<Hive>;

    async fn hive_delete(&self, hive_id: i32) -> anyhow::Result<()>;

    // ==================== Bee Community Operations ====================

    async fn bee_community_get(&self, community_id: i32) -> anyhow::Result<BeeCommunity>;

    async fn bee_community_list(&self) -> anyhow::Result<Vec<BeeCommunity>>;

    /// Communities living in the given hive
    async fn bee_community_list_by_hive(&self, hive_id: i32) -> anyhow::Result<Vec<BeeCommunity>>;

    async fn bee_community_create(&self, community: BeeCommunity) -> anyhow::Result<BeeCommunity>;

    async fn bee_community_update(&self, community: BeeCommunity) -> anyhow::Result<BeeCommunity>;

    async fn bee_community_delete(&self, community_id: i32) -> anyhow::Result<()>;

    // ==================== Honey Harvest Operations ====================

    async fn honey_harvest_get(&self, harvest_id: i32) -> anyhow::Result<HoneyHarvest>;

    async fn honey_harvest_list(&self) -> anyhow::Result<Vec<HoneyHarvest>>;

    async fn honey_harvest_create(&self, harvest: HoneyHarvest) -> anyhow::Result<HoneyHarvest>;

    async fn honey_harvest_update(&self, harvest: HoneyHarvest) -> anyhow::Result<HoneyHarvest>;

    async fn honey_harvest_delete(&self, harvest_id: i32) -> anyhow::Result<()>;
}
