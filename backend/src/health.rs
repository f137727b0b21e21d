use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde::Serialize;
use shared::timezone::format_with_timezone;

use crate::settlement::service::SettlementService;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct SettlementHealth {
    pub timezone: String,
    pub rules_loaded: usize,
    pub latest_rule_year: Option<i32>,
    pub today: String,
    pub local_time: String,
}

#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().timestamp(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Reports which rule table and timezone the calendar is running with.
#[get("/health/settlement")]
pub async fn settlement_health_check(service: web::Data<SettlementService>) -> impl Responder {
    HttpResponse::Ok().json(SettlementHealth {
        timezone: service.timezone().name().to_string(),
        rules_loaded: service.rules().rules().count(),
        latest_rule_year: service.rules().latest_year(),
        today: service.today().to_string(),
        local_time: format_with_timezone(Utc::now(), &service.timezone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use pretty_assertions::assert_eq;
    use shared::settlement::bundled;
    use shared::timezone::business_timezone;
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().service(health_check)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn test_settlement_health_check() {
        let service = SettlementService::new(Arc::new(bundled().clone()), business_timezone());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .service(settlement_health_check),
        )
        .await;
        let req = test::TestRequest::get().uri("/health/settlement").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["timezone"], "Asia/Shanghai");
        assert_eq!(body["rules_loaded"], 2);
        assert_eq!(body["latest_rule_year"], 2026);
        assert!(body["local_time"].as_str().unwrap().ends_with("(CST)"));
    }
}
