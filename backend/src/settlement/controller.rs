use actix_web::{get, web, HttpResponse};
use log::debug;
use shared::{CurrentQuery, MonthQuery, WeekQuery};
use validator::Validate;

use super::service::SettlementService;
use crate::error::ApiError;

/// Mount the settlement calendar under `/api/settlement`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, service: web::Data<SettlementService>) {
    cfg.service(
        web::scope("/api/settlement")
            .app_data(service)
            .service(get_season_rule_handler)
            .service(get_week_handler)
            .service(get_month_handler)
            .service(get_current_handler),
    );
}

#[get("/rules/{year}")]
pub async fn get_season_rule_handler(
    path: web::Path<i32>,
    service: web::Data<SettlementService>,
) -> Result<HttpResponse, ApiError> {
    let year = path.into_inner();
    Ok(HttpResponse::Ok().json(service.season_rule(year)))
}

#[get("/week")]
pub async fn get_week_handler(
    query: web::Query<WeekQuery>,
    service: web::Data<SettlementService>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;
    let selection = query.selection();
    debug!("Resolving settlement week {:?}", selection);
    let week = service.week(selection, service.today())?;
    Ok(HttpResponse::Ok().json(week))
}

#[get("/month")]
pub async fn get_month_handler(
    query: web::Query<MonthQuery>,
    service: web::Data<SettlementService>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;
    let month = service.month(query.year, query.month, service.today())?;
    Ok(HttpResponse::Ok().json(month))
}

#[get("/current")]
pub async fn get_current_handler(
    query: web::Query<CurrentQuery>,
    service: web::Data<SettlementService>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;
    let today = query.date.unwrap_or_else(|| service.today());
    Ok(HttpResponse::Ok().json(service.current(today)))
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
