pub mod handlers;

use crate::domain::error::ApiError;
use actix_web::{error, web};
use recovery_wallet_core::RecoveryError;

/// Register every route; malformed JSON bodies answer with the shared error body
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        error::InternalError::from_response(
            err,
            actix_web::ResponseError::error_response(&ApiError(RecoveryError::validation(message))),
        )
        .into()
    }))
    .service(handlers::chains::health)
    .service(handlers::chains::list_chains)
    .service(handlers::chains::update_chain)
    .service(handlers::operations::run_operation);
}
