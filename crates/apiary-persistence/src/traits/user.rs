//! User persistence trait
//!
//! Users, their region allow-list, and worker groups.

use async_trait::async_trait;

use apiary_common::Role;

use crate::model::{AllowedRegion, NewWorkerGroup, User, WorkerGroup};

#[async_trait]
pub trait UserPersistence: Send + Sync {
    // ==================== User Operations ====================

    async fn user_get(&self, user_id: i32) -> anyhow::Result<User>;

    async fn user_list(&self) -> anyhow::Result<Vec<User>>;

    async fn user_find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    async fn user_find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;

    /// Insert a user; the role label is stored uppercase
    async fn user_create(&self, user: User) -> anyhow::Result<User>;

    async fn user_update(&self, user: User) -> anyhow::Result<User>;

    async fn user_update_role(&self, user_id: i32, role: Role) -> anyhow::Result<User>;

    /// Stamp `last_login` with the current time
    async fn user_touch_last_login(&self, user_id: i32) -> anyhow::Result<()>;

    async fn user_delete(&self, user_id: i32) -> anyhow::Result<()>;

    /// WORKER users that belong to no worker group
    async fn user_list_free_workers(&self) -> anyhow::Result<Vec<User>>;

    /// Replace the user's allowed regions with `region_ids` and return the new set
    async fn user_replace_allowed_regions(
        &self,
        user_id: i32,
        region_ids: &[i32],
    ) -> anyhow::Result<Vec<AllowedRegion>>;

    // ==================== Worker Group Operations ====================

    async fn worker_group_get(&self, group_id: i32) -> anyhow::Result<WorkerGroup>;

    async fn worker_group_list(&self) -> anyhow::Result<Vec<WorkerGroup>>;

    async fn worker_group_list_by_manager(&self, manager_id: i32)
    -> anyhow::Result<Vec<WorkerGroup>>;

    /// Groups the given worker belongs to
    async fn worker_group_list_by_worker(&self, worker_id: i32) -> anyhow::Result<Vec<WorkerGroup>>;

    async fn worker_group_create(&self, group: NewWorkerGroup) -> anyhow::Result<WorkerGroup>;

    async fn worker_group_update(
        &self,
        group_id: i32,
        manager_id: i32,
        group_name: &str,
    ) -> anyhow::Result<WorkerGroup>;

    /// Remove the member rows, then the group, atomically
    async fn worker_group_delete(&self, group_id: i32) -> anyhow::Result<()>;

    async fn worker_group_add_member(&self, group_id: i32, worker_id: i32) -> anyhow::Result<()>;

    async fn worker_group_remove_member(&self, group_id: i32, worker_id: i32)
    -> anyhow::Result<()>;

    async fn worker_group_members(&self, group_id: i32) -> anyhow::Result<Vec<User>>;
}
