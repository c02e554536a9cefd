use async_trait::async_trait;
use sea_orm::*;

use super::{ExternalDbPersistService, crud, store_error};
use crate::entity::{apiary, bee_community, hive, honey_harvest};
use crate::model::{Apiary, BeeCommunity, Hive, HoneyHarvest};
use crate::traits::ApiaryPersistence;

#[async_trait]
impl ApiaryPersistence for ExternalDbPersistService {
    // ==================== Apiary Operations ====================

    async fn apiary_get(&self, apiary_id: i32) -> anyhow::Result<Apiary> {
        crud::find_by_id::<_, apiary::Entity>(&self.db, "apiary", apiary_id).await
    }

    async fn apiary_list(&self) -> anyhow::Result<Vec<Apiary>> {
        crud::find_all::<_, apiary::Entity>(&self.db, "apiaries").await
    }

    async fn apiary_create(&self, apiary: Apiary) -> anyhow::Result<Apiary> {
        let mut active = apiary.into_active_model().reset_all();
        active.apiary_id = NotSet;
        crud::insert(&self.db, "apiary", active).await
    }

    async fn apiary_update(&self, apiary: Apiary) -> anyhow::Result<Apiary> {
        let id = apiary.apiary_id;
        crud::update(&self.db, "apiary", id, apiary.into_active_model().reset_all()).await
    }

    async fn apiary_delete(&self, apiary_id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, apiary::Entity>(&self.db, "apiary", apiary_id).await
    }

    // ==================== Hive Operations ====================

    async fn hive_get(&self, hive_id: i32) -> anyhow::Result<Hive> {
        crud::find_by_id::<_, hive::Entity>(&self.db, "hive", hive_id).await
    }

    async fn hive_list(&self) -> anyhow::Result<Vec<Hive>> {
        crud::find_all::<_, hive::Entity>(&self.db, "hives").await
    }

    async fn hive_list_by_apiary(&self, apiary_id: i32) -> anyhow::Result<Vec<Hive>> {
        hive::Entity::find()
            .filter(hive::Column::ApiaryId.eq(apiary_id))
            .order_by_asc(hive::Column::HiveId)
            .all(&self.db)
            .await
            .map_err(|e| store_error(e, format!("failed to list hives of apiary {}", apiary_id)))
    }

    async fn hive_create(&self, hive: Hive) -> anyhow::Result<Hive> {
        let mut active = hive.into_active_model().reset_all();
        active.hive_id = NotSet;
        crud::insert(&self.db, "hive", active).await
    }

    async fn hive_update(&self, hive: Hive) -> anyhow::Result<Hive> {
        let id = hive.hive_id;
        crud::update(&self.db, "hive", id, hive.into_active_model().reset_all()).await
    }

    async fn hive_delete(&self, hive_id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, hive::Entity>(&self.db, "hive", hive_id).await
    }

    // ==================== Bee Community Operations ====================

    async fn bee_community_get(&self, community_id: i32) -> anyhow::Result<BeeCommunity> {
        crud::find_by_id::<_, bee_community::Entity>(&self.db, "bee community", community_id)
            .await
    }

    async fn bee_community_list(&self) -> anyhow::Result<Vec<BeeCommunity>> {
        crud::find_all::<_, bee_community::Entity>(&self.db, "bee communities").await
    }

    async fn bee_community_list_by_hive(&self, hive_id: i32) -> anyhow::Result<Vec<BeeCommunity>> {
        bee_community::Entity::find()
            .filter(bee_community::Column::HiveId.eq(hive_id))
            .order_by_asc(bee_community::Column::CommunityId)
            .all(&self.db)
            .await
            .map_err(|e| {
                store_error(e, format!("failed to list bee communities of hive {}", hive_id))
            })
    }

    async fn bee_community_create(&self, community: BeeCommunity) -> anyhow::Result<BeeCommunity> {
        let mut active = community.into_active_model().reset_all();
        active.community_id = NotSet;
        crud::insert(&self.db, "bee community", active).await
    }

    async fn bee_community_update(&self, community: BeeCommunity) -> anyhow::Result<BeeCommunity> {
        let id = community.community_id;
        crud::update(
            &self.db,
            "bee community",
            id,
            community.into_active_model().reset_all(),
        )
        .await
    }

    async fn bee_community_delete(&self, community_id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, bee_community::Entity>(&self.db, "bee community", community_id)
            .await
    }

    // ==================== Honey Harvest Operations ====================

    async fn honey_harvest_get(&self, harvest_id: i32) -> anyhow::Result<HoneyHarvest> {
        crud::find_by_id::<_, honey_harvest::Entity>(&self.db, "honey harvest", harvest_id).await
    }

    async fn honey_harvest_list(&self) -> anyhow::Result<Vec<HoneyHarvest>> {
        crud::find_all::<_, honey_harvest::Entity>(&self.db, "honey harvests").await
    }

    async fn honey_harvest_create(&self, harvest: HoneyHarvest) -> anyhow::Result<HoneyHarvest> {
        let mut active = harvest.into_active_model().reset_all();
        active.harvest_id = NotSet;
        crud::insert(&self.db, "honey harvest", active).await
    }

    async fn honey_harvest_update(&self, harvest: HoneyHarvest) -> anyhow::Result<HoneyHarvest> {
        let id = harvest.harvest_id;
        crud::update(
            &self.db,
            "honey harvest",
            id,
            harvest.into_active_model().reset_all(),
        )
        .await
    }

    async fn honey_harvest_delete(&self, harvest_id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, honey_harvest::Entity>(&self.db, "honey harvest", harvest_id).await
    }
}
