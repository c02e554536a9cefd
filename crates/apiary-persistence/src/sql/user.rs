use apiary_common::{ApiaryError, Role};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::*;

use super::{ExternalDbPersistService, crud, store_error};
use crate::entity::{allowed_region, user, worker_group, worker_group_member};
use crate::model::{AllowedRegion, NewWorkerGroup, User, WorkerGroup};
use crate::traits::UserPersistence;

#[async_trait]
impl UserPersistence for ExternalDbPersistService {
    // ==================== User Operations ====================

    async fn user_get(&self, user_id: i32) -> anyhow::Result<User> {
        crud::find_by_id::<_, user::Entity>(&self.db, "user", user_id).await
    }

    async fn user_list(&self) -> anyhow::Result<Vec<User>> {
        crud::find_all::<_, user::Entity>(&self.db, "users").await
    }

    async fn user_find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| store_error(e, "failed to find user by email"))
    }

    async fn user_find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| store_error(e, "failed to find user by username"))
    }

    async fn user_create(&self, user: User) -> anyhow::Result<User> {
        let mut active = user.into_active_model().reset_all();
        active.user_id = NotSet;
        if let ActiveValue::Set(role) = &active.role {
            active.role = Set(Role::normalize(role));
        }
        crud::insert(&self.db, "user", active).await
    }

    async fn user_update(&self, user: User) -> anyhow::Result<User> {
        let id = user.user_id;
        let keep_password = user.password.is_empty();
        let mut active = user.into_active_model().reset_all();
        if let ActiveValue::Set(role) = &active.role {
            active.role = Set(Role::normalize(role));
        }
        // The hash is never serialized, so an empty password means "unchanged".
        if keep_password {
            active.password = NotSet;
        }
        crud::update(&self.db, "user", id, active).await
    }

    async fn user_update_role(&self, user_id: i32, role: Role) -> anyhow::Result<User> {
        let active = user::ActiveModel {
            user_id: Unchanged(user_id),
            role: Set(role.as_str().to_string()),
            ..Default::default()
        };
        crud::update(&self.db, "user", user_id, active).await
    }

    async fn user_touch_last_login(&self, user_id: i32) -> anyhow::Result<()> {
        user::Entity::update_many()
            .col_expr(user::Column::LastLogin, Expr::value(Utc::now()))
            .filter(user::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| store_error(e, format!("failed to stamp last login of user {}", user_id)))?;
        Ok(())
    }

    async fn user_delete(&self, user_id: i32) -> anyhow::Result<()> {
        crud::delete_by_id::<_, user::Entity>(&self.db, "user", user_id).await
    }

    async fn user_list_free_workers(&self) -> anyhow::Result<Vec<User>> {
        let grouped = Query::select()
            .column(worker_group_member::Column::WorkerId)
            .from(worker_group_member::Entity)
            .to_owned();

        user::Entity::find()
            .filter(user::Column::Role.eq(Role::Worker.as_str()))
            .filter(user::Column::UserId.not_in_subquery(grouped))
            .order_by_asc(user::Column::UserId)
            .all(&self.db)
            .await
            .map_err(|e| store_error(e, "failed to list free workers"))
    }

    async fn user_replace_allowed_regions(
        &self,
        user_id: i32,
        region_ids: &[i32],
    ) -> anyhow::Result<Vec<AllowedRegion>> {
        let context = format!("failed to replace allowed regions of user {}", user_id);
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| store_error(e, context.clone()))?;

        allowed_region::Entity::delete_many()
            .filter(allowed_region::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(|e| store_error(e, context.clone()))?;

        for region_id in region_ids {
            let link = allowed_region::ActiveModel {
                id: NotSet,
                user_id: Set(user_id),
                region_id: Set(*region_id),
            };
            crud::insert(&txn, "allowed region", link).await?;
        }

        let regions = allowed_region::Entity::find()
            .filter(allowed_region::Column::UserId.eq(user_id))
            .order_by_asc(allowed_region::Column::RegionId)
            .all(&txn)
            .await
            .map_err(|e| store_error(e, context.clone()))?;

        txn.commit().await.map_err(|e| store_error(e, context))?;
        Ok(regions)
    }

    // ==================== Worker Group Operations ====================

    async fn worker_group_get(&self, group_id: i32) -> anyhow::Result<WorkerGroup> {
        crud::find_by_id::<_, worker_group::Entity>(&self.db, "worker group", group_id).await
    }

    async fn worker_group_list(&self) -> anyhow::Result<Vec<WorkerGroup>> {
        crud::find_all::<_, worker_group::Entity>(&self.db, "worker groups").await
    }

    async fn worker_group_list_by_manager(
        &self,
        manager_id: i32,
    ) -> anyhow::Result<Vec<WorkerGroup>> {
        worker_group::Entity::find()
            .filter(worker_group::Column::ManagerId.eq(manager_id))
            .order_by_asc(worker_group::Column::GroupId)
            .all(&self.db)
            .await
            .map_err(|e| {
                store_error(
                    e,
                    format!("failed to list worker groups of manager {}", manager_id),
                )
            })
    }

    async fn worker_group_list_by_worker(&self, worker_id: i32) -> anyhow::Result<Vec<WorkerGroup>> {
        let memberships = Query::select()
            .column(worker_group_member::Column::GroupId)
            .from(worker_group_member::Entity)
            .and_where(worker_group_member::Column::WorkerId.eq(worker_id))
            .to_owned();

        worker_group::Entity::find()
            .filter(worker_group::Column::GroupId.in_subquery(memberships))
            .order_by_asc(worker_group::Column::GroupId)
            .all(&self.db)
            .await
            .map_err(|e| {
                store_error(
                    e,
                    format!("failed to list worker groups of worker {}", worker_id),
                )
            })
    }

    async fn worker_group_create(&self, group: NewWorkerGroup) -> anyhow::Result<WorkerGroup> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| store_error(e, "failed to create worker group"))?;

        let now = Utc::now();
        let created = crud::insert(
            &txn,
            "worker group",
            worker_group::ActiveModel {
                group_id: NotSet,
                manager_id: Set(group.manager_id),
                group_name: Set(group.group_name),
                created_at: Set(Some(now)),
                updated_at: Set(Some(now)),
            },
        )
        .await?;

        for worker_id in group.worker_ids {
            let member = worker_group_member::ActiveModel {
                group_id: Set(created.group_id),
                worker_id: Set(worker_id),
                joined_at: Set(Some(now)),
            };
            crud::insert(&txn, "worker group member", member).await?;
        }

        txn.commit()
            .await
            .map_err(|e| store_error(e, "failed to create worker group"))?;
        Ok(created)
    }

    async fn worker_group_update(
        &self,
        group_id: i32,
        manager_id: i32,
        group_name: &str,
    ) -> anyhow::Result<WorkerGroup> {
        let active = worker_group::ActiveModel {
            group_id: Unchanged(group_id),
            manager_id: Set(manager_id),
            group_name: Set(group_name.to_string()),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        crud::update(&self.db, "worker group", group_id, active).await
    }

    async fn worker_group_delete(&self, group_id: i32) -> anyhow::Result<()> {
        let context = format!("failed to delete worker group {}", group_id);
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| store_error(e, context.clone()))?;

        worker_group_member::Entity::delete_many()
            .filter(worker_group_member::Column::GroupId.eq(group_id))
            .exec(&txn)
            .await
            .map_err(|e| store_error(e, context.clone()))?;

        // Dropping the transaction on NotFound rolls the member delete back.
        crud::delete_by_id::<_, worker_group::Entity>(&txn, "worker group", group_id).await?;

        txn.commit().await.map_err(|e| store_error(e, context))
    }

    async fn worker_group_add_member(&self, group_id: i32, worker_id: i32) -> anyhow::Result<()> {
        let member = worker_group_member::ActiveModel {
            group_id: Set(group_id),
            worker_id: Set(worker_id),
            joined_at: Set(Some(Utc::now())),
        };
        crud::insert(&self.db, "worker group member", member).await?;
        Ok(())
    }

    async fn worker_group_remove_member(
        &self,
        group_id: i32,
        worker_id: i32,
    ) -> anyhow::Result<()> {
        let result = worker_group_member::Entity::delete_many()
            .filter(worker_group_member::Column::GroupId.eq(group_id))
            .filter(worker_group_member::Column::WorkerId.eq(worker_id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                store_error(
                    e,
                    format!("failed to remove worker {} from group {}", worker_id, group_id),
                )
            })?;

        if result.rows_affected == 0 {
            return Err(ApiaryError::not_found(
                "worker group member",
                format!("{}/{}", group_id, worker_id),
            )
            .into());
        }
        Ok(())
    }

    async fn worker_group_members(&self, group_id: i32) -> anyhow::Result<Vec<User>> {
        let members = Query::select()
            .column(worker_group_member::Column::WorkerId)
            .from(worker_group_member::Entity)
            .and_where(worker_group_member::Column::GroupId.eq(group_id))
            .to_owned();

        user::Entity::find()
            .filter(user::Column::UserId.in_subquery(members))
            .order_by_asc(user::Column::UserId)
            .all(&self.db)
            .await
            .map_err(|e| store_error(e, format!("failed to list members of group {}", group_id)))
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;

    fn worker(id: i32, role: &str) -> User {
        User {
            user_id: id,
            username: format!("user{}", id),
            full_name: "Worker Bee".to_string(),
            role: role.to_string(),
            email: format!("user{}@apiary.test", id),
            password: "hash".to_string(),
            last_login: None,
        }
    }

    #[tokio::test]
    async fn test_user_create_uppercases_role() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![worker(1, "MANAGER")]])
            .into_connection();
        let service = ExternalDbPersistService::new(db);

        service.user_create(worker(0, "manager")).await.unwrap();

        let log = format!("{:?}", service.into_db().into_transaction_log());
        assert!(log.contains(r#"String(Some("MANAGER"))"#), "{}", log);
        assert!(!log.contains(r#"String(Some("manager"))"#), "{}", log);
    }

    #[tokio::test]
    async fn test_free_workers_excludes_grouped_users() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![worker(2, "WORKER")]])
            .into_connection();
        let service = ExternalDbPersistService::new(db);

        let free = service.user_list_free_workers().await.unwrap();
        assert_eq!(free.len(), 1);

        let log = format!("{:?}", service.into_db().into_transaction_log());
        assert!(log.contains("NOT IN (SELECT"), "{}", log);
        assert!(log.contains("worker_group_member"), "{}", log);
    }

    #[tokio::test]
    async fn test_remove_missing_member_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let service = ExternalDbPersistService::new(db);

        let err = service.worker_group_remove_member(3, 9).await.unwrap_err();
        assert_eq!(err.to_string(), "worker group member 3/9 not found");
    }

    #[tokio::test]
    async fn test_replace_allowed_regions_runs_in_one_transaction() {
        let links = vec![
            AllowedRegion {
                id: 10,
                user_id: 4,
                region_id: 1,
            },
            AllowedRegion {
                id: 11,
                user_id: 4,
                region_id: 2,
            },
        ];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .append_query_results([
                vec![links[0].clone()],
                vec![links[1].clone()],
                links.clone(),
            ])
            .into_connection();
        let service = ExternalDbPersistService::new(db);

        let regions = service
            .user_replace_allowed_regions(4, &[1, 2])
            .await
            .unwrap();
        assert_eq!(regions, links);

        let log = format!("{:?}", service.into_db().into_transaction_log());
        assert!(log.contains("DELETE FROM"), "{}", log);
        assert!(log.contains("allowed_region"), "{}", log);
    }
}
