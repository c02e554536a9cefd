//! Request and response bodies that are not plain entity records

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

/// `PUT /maintenance/{id}/status`
#[derive(Debug, Clone, Deserialize)]
pub struct MaintenanceStatusRequest {
    pub status: String,
}

/// `PUT /incident/{id}/status`
#[derive(Debug, Clone, Deserialize)]
pub struct IncidentStatusRequest {
    pub severity: String,
}

/// `PUT /user/role`
#[derive(Debug, Clone, Deserialize)]
pub struct UserRoleRequest {
    pub user_id: i32,
    pub role: String,
}

/// `PUT /user/allowed-regions`
#[derive(Debug, Clone, Deserialize)]
pub struct UserRegionsRequest {
    pub user_id: i32,
    pub region_ids: Vec<i32>,
}

/// `PUT /worker-group/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerGroupUpdateRequest {
    pub manager_id: i32,
    pub group_name: String,
}

/// `POST /worker-group/{group_id}/members`
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerGroupMemberRequest {
    pub worker_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u64>,
}
