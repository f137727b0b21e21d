use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::HttpMessage;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use log::Level;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Instant;
use uuid::Uuid;

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Counter-based IDs under test, UUID v4 otherwise.
fn generate_request_id() -> String {
    let is_test = cfg!(test)
        || std::env::var("RUST_ENV")
            .unwrap_or_default()
            .eq_ignore_ascii_case("test");

    if is_test {
        format!("test-{}", REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed))
    } else {
        Uuid::new_v4().to_string()
    }
}

/// Log level for a finished request: errors for 5xx, warnings for 4xx.
fn level_for_status(status_code: u16) -> Level {
    match status_code {
        500..=u16::MAX => Level::Error,
        400..=499 => Level::Warn,
        _ => Level::Info,
    }
}

/// Request logger: one line per request with method, path, status and latency,
/// plus an `x-request-id` response header.
pub struct Logger;

impl<S, B> Transform<S, ServiceRequest> for Logger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggerMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let start_time = Instant::now();
        let method = req.method().clone();
        let uri = req.uri().clone();

        let request_id = generate_request_id();
        req.extensions_mut().insert(request_id.clone());

        Box::pin(async move {
            let mut res = svc.call(req).await?;
            let duration = start_time.elapsed();

            if let Ok(header_value) = HeaderValue::try_from(request_id.as_str()) {
                res.headers_mut()
                    .insert(HeaderName::from_static("x-request-id"), header_value);
            }

            let status_code = res.status().as_u16();
            log::log!(
                level_for_status(status_code),
                "request_id={} {} {} {} {}ms",
                request_id,
                method,
                uri,
                status_code,
                duration.as_millis()
            );

            Ok(res)
        })
    }
}

/// CORS for the dashboard frontends; read-only API, so GET and OPTIONS only.
pub fn cors_middleware(allowed_origins: &[String]) -> actix_cors::Cors {
    allowed_origins.iter().fold(
        actix_cors::Cors::default()
            .allowed_methods(vec!["GET", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .max_age(3600),
        |cors, origin| cors.allowed_origin(origin),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{
        http::{header, StatusCode},
        test as atest, web, App, HttpResponse,
    };

    #[test]
    fn test_level_for_status() {
        assert_eq!(level_for_status(200), Level::Info);
        assert_eq!(level_for_status(304), Level::Info);
        assert_eq!(level_for_status(404), Level::Warn);
        assert_eq!(level_for_status(503), Level::Error);
    }

    #[test]
    fn test_request_ids_are_unique_under_test() {
        let first = generate_request_id();
        let second = generate_request_id();
        assert!(first.starts_with("test-"));
        assert_ne!(first, second);
    }

    #[actix_web::test]
    async fn test_logger_sets_request_id_header() {
        let app = atest::init_service(
            App::new()
                .wrap(Logger)
                .route("/test", web::get().to(|| async { "test" })),
        )
        .await;

        let req = atest::TestRequest::get().uri("/test").to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key("x-request-id"));
    }

    #[actix_web::test]
    async fn test_logger_passes_errors_through() {
        let app = atest::init_service(
            App::new()
                .wrap(Logger)
                .route("/error", web::get().to(|| async { HttpResponse::InternalServerError().finish() })),
        )
        .await;

        let req = atest::TestRequest::get().uri("/error").to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_cors_allows_configured_origin() {
        let origins = vec!["http://localhost:50003".to_string()];
        let app = atest::init_service(
            App::new()
                .wrap(cors_middleware(&origins))
                .route("/test", web::get().to(|| async { "test" })),
        )
        .await;

        let req = atest::TestRequest::get()
            .uri("/test")
            .insert_header((header::ORIGIN, "http://localhost:50003"))
            .to_request();
        let resp = atest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:50003"
        );
    }
}
