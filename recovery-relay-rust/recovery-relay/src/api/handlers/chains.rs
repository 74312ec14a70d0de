use crate::app::recovery_service::RecoveryService;
use crate::domain::error::ApiError;
use actix_web::web::{Data, Json, Path};
use actix_web::{get, put, HttpResponse, Responder};
use recovery_wallet_core::Chain;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChainRequest {
    pub rpc_url: String,
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "message": "Recovery relay is running"
    }))
}

#[get("/api/v1/chains")]
pub async fn list_chains(service: Data<Arc<RecoveryService>>) -> impl Responder {
    let endpoints = service.list_chain_endpoints().await;
    HttpResponse::Ok().json(json!({
        "success": true,
        "chains": endpoints,
    }))
}

#[put("/api/v1/chains/{chain}")]
pub async fn update_chain(
    path: Path<String>,
    req: Json<UpdateChainRequest>,
    service: Data<Arc<RecoveryService>>,
) -> Result<HttpResponse, ApiError> {
    let chain: Chain = path.into_inner().parse().map_err(ApiError)?;
    let endpoint = service.update_chain_endpoint(chain, &req.rpc_url).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "chain": endpoint,
    })))
}
