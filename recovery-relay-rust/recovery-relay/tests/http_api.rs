mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use common::{address, service, Script, ScriptedFactory, TEST_KEY};
use ethers::types::U256;
use recovery_relay::api;
use recovery_wallet_core::{ArchanovaDirectory, Chain};
use serde_json::{json, Value};
use std::sync::Arc;

fn app_service(factory: ScriptedFactory) -> web::Data<Arc<recovery_relay::app::recovery_service::RecoveryService>> {
    web::Data::new(Arc::new(service(Arc::new(factory), ArchanovaDirectory::empty())))
}

#[actix_web::test]
async fn health_reports_version() {
    let app = test::init_service(App::new().app_data(app_service(ScriptedFactory::default())).configure(api::configure)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[actix_web::test]
async fn operation_success_envelope() {
    let app = test::init_service(
        App::new()
            .app_data(app_service(ScriptedFactory::default()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/operations")
        .set_json(json!({ "operation": "deriveEOA", "params": { "secret": TEST_KEY } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["operation"], "deriveEOA");
    assert_eq!(body["result"], common::TEST_EOA);
    assert!(body["requestId"].as_str().is_some());
    assert!(body["timestamp"].as_str().is_some());
}

#[actix_web::test]
async fn error_kinds_map_to_status_codes() {
    let app = test::init_service(
        App::new()
            .app_data(app_service(ScriptedFactory::default()))
            .configure(api::configure),
    )
    .await;

    let cases = [
        (json!({ "operation": "deriveEOA", "params": { "secret": "zz" } }), StatusCode::BAD_REQUEST, "SecretParse"),
        (json!({ "operation": "frobnicate" }), StatusCode::BAD_REQUEST, "Validation"),
        (
            json!({ "operation": "deriveArchanovaAddress", "params": { "eoa": format!("{:?}", address(0x99)) } }),
            StatusCode::NOT_FOUND,
            "NotFound",
        ),
    ];

    for (payload, status, kind) in cases {
        let req = test::TestRequest::post()
            .uri("/api/v1/operations")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["kind"], kind);
    }
}

#[actix_web::test]
async fn insufficient_gas_is_payment_required() {
    let eoa = common::TEST_EOA.parse().unwrap();
    let factory = ScriptedFactory::default().with(
        Chain::Xdai,
        Script {
            gas: U256::from(100_000u64),
            gas_price: U256::from(20_000_000_000u64),
            native_balances: [(eoa, U256::exp10(15))].into_iter().collect(),
            ..Script::default()
        },
    );
    let app = test::init_service(App::new().app_data(app_service(factory)).configure(api::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/operations")
        .set_json(json!({
            "operation": "transferAsset",
            "params": {
                "scheme": "archanova",
                "source": format!("{:?}", address(0x11)),
                "asset": "0x0000000000000000000000000000000000000000",
                "recipient": format!("{:?}", address(0x22)),
                "amount": "1",
                "chain": "xdai",
                "secret": TEST_KEY
            }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["kind"], "Insufficient");
}

#[actix_web::test]
async fn lost_confirmation_is_distinct_from_rpc_failure() {
    let eoa = common::TEST_EOA.parse().unwrap();
    let factory = ScriptedFactory::default().with(
        Chain::Polygon,
        Script {
            gas: U256::from(21_000u64),
            gas_price: U256::from(30_000_000_000u64),
            native_balances: [(eoa, U256::exp10(18))].into_iter().collect(),
            receipt_lost: true,
            ..Script::default()
        },
    );
    let app = test::init_service(App::new().app_data(app_service(factory)).configure(api::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/operations")
        .set_json(json!({
            "operation": "transferAsset",
            "params": {
                "scheme": "archanova",
                "source": format!("{:?}", address(0x11)),
                "asset": "0x0000000000000000000000000000000000000000",
                "recipient": format!("{:?}", address(0x22)),
                "amount": "0.1",
                "chain": "polygon",
                "secret": TEST_KEY
            }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["kind"], "ConfirmationUnknown");
    assert_eq!(body["error"]["txHash"], format!("0x{}", "42".repeat(32)));
}

#[actix_web::test]
async fn malformed_json_is_validation_error() {
    let app = test::init_service(
        App::new()
            .app_data(app_service(ScriptedFactory::default()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/operations")
        .insert_header(("content-type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["kind"], "Validation");
}

#[actix_web::test]
async fn chain_routes_list_and_update() {
    let app = test::init_service(
        App::new()
            .app_data(app_service(ScriptedFactory::default()))
            .configure(api::configure),
    )
    .await;

    let req = test::TestRequest::put()
        .uri("/api/v1/chains/gnosis")
        .set_json(json!({ "rpcUrl": "https://gnosis.example.org" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["chain"]["chain"], "xdai");
    assert_eq!(body["chain"]["rpcUrl"], "https://gnosis.example.org");

    let req = test::TestRequest::get().uri("/api/v1/chains").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let chains = body["chains"].as_array().unwrap();
    assert_eq!(chains.len(), 6);
    assert!(chains
        .iter()
        .any(|c| c["chain"] == "xdai" && c["rpcUrl"] == "https://gnosis.example.org"));

    let req = test::TestRequest::put()
        .uri("/api/v1/chains/fantom")
        .set_json(json!({ "rpcUrl": "https://fantom.example.org" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
