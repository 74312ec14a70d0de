use crate::app::recovery_service::RecoveryService;
use crate::domain::error::ApiError;
use crate::domain::operation::Operation;
use crate::infrastructure::logger::Logger;
use actix_web::web::{Data, Json};
use actix_web::{post, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Deserialize)]
pub struct OperationRequest {
    pub operation: String,
    #[serde(default)]
    pub params: Value,
}

/// Run one named recovery operation
///
/// Params are never logged; they may carry a secret.
#[post("/api/v1/operations")]
pub async fn run_operation(
    req: Json<OperationRequest>,
    service: Data<Arc<RecoveryService>>,
) -> Result<HttpResponse, ApiError> {
    let request_id = uuid::Uuid::new_v4().to_string();
    let started = Instant::now();
    let OperationRequest { operation: name, params } = req.into_inner();
    Logger::operation_received(&request_id, &name);

    let result = match Operation::parse(&name, params) {
        Ok(operation) => service.execute(operation).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(result) => {
            Logger::operation_completed(&request_id, &name, started.elapsed().as_millis());
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "requestId": request_id,
                "operation": name,
                "result": result,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })))
        }
        Err(e) => {
            Logger::operation_failed(&request_id, &name, &e.to_string());
            Err(ApiError(e))
        }
    }
}
