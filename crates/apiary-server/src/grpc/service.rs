//! `BeeManagementService` implementation
//!
//! Each call validates its arguments, invokes one store-side function or
//! procedure and maps the error kind to a gRPC status.

use std::sync::Arc;

use apiary_common::{ApiaryError, find_apiary_error};
use apiary_persistence::ProcedurePersistence;
use chrono::{DateTime, SecondsFormat, Utc};
use tonic::{Code, Request, Response, Status};

use super::proto::bee_management_service_server::BeeManagementService;
use super::proto::{
    AddObservationRequest, AssignMaintenancePlanRequest, CreateProductionReportRequest,
    GetAvgTemperatureRequest, GetAvgTemperatureResponse, GetCommunityHealthStatusRequest,
    GetCommunityHealthStatusResponse, GetLatestSensorReadingRequest,
    GetLatestSensorReadingResponse, GetTotalHoneyHarvestedRequest,
    GetTotalHoneyHarvestedResponse, HasRegionAccessRequest, HasRegionAccessResponse,
    RegisterIncidentRequest, UpdateHiveStatusRequest,
};
use crate::metrics::record_grpc_request;

pub const NO_SENSOR_READING_MESSAGE: &str =
    "No sensor reading found for the specified hive and sensor type.";

/// Map an error chain to a status, keeping the full chain as the message
pub fn to_status(err: anyhow::Error) -> Status {
    let message = format!("{:#}", err);
    match find_apiary_error(&err) {
        Some(ApiaryError::InvalidInput(_)) => Status::invalid_argument(message),
        Some(ApiaryError::NotFound(_)) => Status::not_found(message),
        Some(ApiaryError::Conflict(_)) => Status::already_exists(message),
        Some(ApiaryError::Unauthenticated(_)) => Status::unauthenticated(message),
        Some(ApiaryError::Forbidden(_)) => Status::permission_denied(message),
        Some(ApiaryError::Internal(_)) | None => {
            tracing::error!("gRPC call failed: {}", message);
            Status::internal(message)
        }
    }
}

fn parse_date(field: &str, value: &str) -> Result<DateTime<Utc>, Status> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| Status::invalid_argument(format!("invalid {}: {}", field, e)))
}

fn parse_range(start: &str, end: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), Status> {
    let start = parse_date("start_date", start)?;
    let end = parse_date("end_date", end)?;
    if end < start {
        return Err(Status::invalid_argument("end_date is before start_date"));
    }
    Ok((start, end))
}

fn require(field: &str, value: &str) -> Result<(), Status> {
    if value.trim().is_empty() {
        return Err(Status::invalid_argument(format!("{} is required", field)));
    }
    Ok(())
}

fn finish<T>(method: &'static str, result: Result<T, Status>) -> Result<Response<T>, Status> {
    let code = result.as_ref().map_or_else(Status::code, |_| Code::Ok);
    record_grpc_request(method, code);
    result.map(Response::new)
}

pub struct BeeManagementGrpc {
    store: Arc<dyn ProcedurePersistence>,
}

impl BeeManagementGrpc {
    pub fn new(store: Arc<dyn ProcedurePersistence>) -> Self {
        Self { store }
    }

    async fn total_honey(
        &self,
        req: GetTotalHoneyHarvestedRequest,
    ) -> Result<GetTotalHoneyHarvestedResponse, Status> {
        let (start, end) = parse_range(&req.start_date, &req.end_date)?;
        let total_honey = self
            .store
            .total_honey_harvested(req.hive_id, start, end)
            .await
            .map_err(to_status)?;
        Ok(GetTotalHoneyHarvestedResponse { total_honey })
    }

    async fn record_observation(&self, req: AddObservationRequest) -> Result<(), Status> {
        let date = parse_date("observation_date", &req.observation_date)?;
        require("description", &req.description)?;
        self.store
            .add_observation(req.hive_id, date, &req.description, &req.recommendations)
            .await
            .map_err(to_status)
    }

    async fn record_incident(&self, req: RegisterIncidentRequest) -> Result<(), Status> {
        let date = parse_date("incident_date", &req.incident_date)?;
        require("severity", &req.severity)?;
        self.store
            .register_incident(req.hive_id, date, &req.description, &req.severity)
            .await
            .map_err(to_status)
    }

    async fn latest_reading(
        &self,
        req: GetLatestSensorReadingRequest,
    ) -> Result<GetLatestSensorReadingResponse, Status> {
        require("sensor_type", &req.sensor_type)?;
        let reading = self
            .store
            .latest_sensor_reading(req.hive_id, &req.sensor_type)
            .await
            .map_err(to_status)?
            .ok_or_else(|| Status::not_found(NO_SENSOR_READING_MESSAGE))?;

        Ok(GetLatestSensorReadingResponse {
            value: reading.value,
            timestamp: reading
                .timestamp
                .map(|ts| ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
                .unwrap_or_default(),
        })
    }

    async fn production_report(&self, req: CreateProductionReportRequest) -> Result<(), Status> {
        let (start, end) = parse_range(&req.start_date, &req.end_date)?;
        self.store
            .create_production_report(req.apiary_id, start, end)
            .await
            .map_err(to_status)
    }
}

#[tonic::async_trait]
impl BeeManagementService for BeeManagementGrpc {
    async fn get_total_honey_harvested(
        &self,
        request: Request<GetTotalHoneyHarvestedRequest>,
    ) -> Result<Response<GetTotalHoneyHarvestedResponse>, Status> {
        let result = self.total_honey(request.into_inner()).await;
        finish("GetTotalHoneyHarvested", result)
    }

    async fn add_observation(
        &self,
        request: Request<AddObservationRequest>,
    ) -> Result<Response<()>, Status> {
        let result = self.record_observation(request.into_inner()).await;
        finish("AddObservation", result)
    }

    async fn get_community_health_status(
        &self,
        request: Request<GetCommunityHealthStatusRequest>,
    ) -> Result<Response<GetCommunityHealthStatusResponse>, Status> {
        let req = request.into_inner();
        let result = self
            .store
            .community_health_status(req.community_id)
            .await
            .map(|health_status| GetCommunityHealthStatusResponse { health_status })
            .map_err(to_status);
        finish("GetCommunityHealthStatus", result)
    }

    async fn update_hive_status(
        &self,
        request: Request<UpdateHiveStatusRequest>,
    ) -> Result<Response<()>, Status> {
        let req = request.into_inner();
        let result = match require("new_status", &req.new_status) {
            Ok(()) => self
                .store
                .update_hive_status(req.hive_id, &req.new_status)
                .await
                .map_err(to_status),
            Err(status) => Err(status),
        };
        finish("UpdateHiveStatus", result)
    }

    async fn get_avg_temperature(
        &self,
        request: Request<GetAvgTemperatureRequest>,
    ) -> Result<Response<GetAvgTemperatureResponse>, Status> {
        let req = request.into_inner();
        let result = if req.days <= 0 {
            Err(Status::invalid_argument("days must be positive"))
        } else {
            self.store
                .avg_temperature(req.region_id, req.days)
                .await
                .map(|avg_temperature| GetAvgTemperatureResponse { avg_temperature })
                .map_err(to_status)
        };
        finish("GetAvgTemperature", result)
    }

    async fn assign_maintenance_plan(
        &self,
        request: Request<AssignMaintenancePlanRequest>,
    ) -> Result<Response<()>, Status> {
        let req = request.into_inner();
        let result = self
            .store
            .assign_maintenance_plan(req.plan_id, req.user_id)
            .await
            .map_err(to_status);
        finish("AssignMaintenancePlan", result)
    }

    async fn has_region_access(
        &self,
        request: Request<HasRegionAccessRequest>,
    ) -> Result<Response<HasRegionAccessResponse>, Status> {
        let req = request.into_inner();
        let result = self
            .store
            .has_region_access(req.user_id, req.region_id)
            .await
            .map(|has_access| HasRegionAccessResponse { has_access })
            .map_err(to_status);
        finish("HasRegionAccess", result)
    }

    async fn register_incident(
        &self,
        request: Request<RegisterIncidentRequest>,
    ) -> Result<Response<()>, Status> {
        let result = self.record_incident(request.into_inner()).await;
        finish("RegisterIncident", result)
    }

    async fn get_latest_sensor_reading(
        &self,
        request: Request<GetLatestSensorReadingRequest>,
    ) -> Result<Response<GetLatestSensorReadingResponse>, Status> {
        let result = self.latest_reading(request.into_inner()).await;
        finish("GetLatestSensorReading", result)
    }

    async fn create_production_report(
        &self,
        request: Request<CreateProductionReportRequest>,
    ) -> Result<Response<()>, Status> {
        let result = self.production_report(request.into_inner()).await;
        finish("CreateProductionReport", result)
    }
}
