use crate::{
    api::{attendance, employee},
    config::Config,
    error::AppError,
    models::ApiResponse,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, KeyExtractor, PeerIpKeyExtractor, SimpleKeyExtractionError,
    governor::{
        NotUntil,
        clock::{Clock, DefaultClock, QuantaInstant},
        middleware::NoOpMiddleware,
    },
};
use actix_web::{HttpResponse, HttpResponseBuilder, dev::ServiceRequest, web};
use std::{net::IpAddr, sync::Arc};

/// Peer-IP keys, with the rejection rendered as the usual JSON envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KioskIpKeyExtractor;

impl KeyExtractor for KioskIpKeyExtractor {
    type Key = IpAddr;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        PeerIpKeyExtractor.extract(req)
    }

    fn exceed_rate_limit_response(
        &self,
        negative: &NotUntil<QuantaInstant>,
        mut response: HttpResponseBuilder,
    ) -> HttpResponse {
        let wait_time = negative
            .wait_time_from(DefaultClock::default().now())
            .as_secs();
        response.json(ApiResponse::<()>::error(format!(
            "Too many requests, retry in {wait_time}s"
        )))
    }
}

// Per-IP limiter; `requests_per_min` of 0 is treated as 1.
fn build_limiter(requests_per_min: u32) -> Governor<KioskIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = 60_000 / requests_per_min as u64;
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms.max(1))
        .burst_size(requests_per_min)
        .key_extractor(KioskIpKeyExtractor)
        .finish()
        .expect("non-zero period and burst size");
    Governor::new(&cfg)
}

/// Fallback for paths no route matches.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error("Not found"))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let attendance_limiter = Arc::new(build_limiter(config.rate_attendance_per_min));

    // Extractor failures answer with the same {ok:false, error} envelope
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid JSON body: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid query string: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid path: {err}")).into()
    }));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .wrap(attendance_limiter)
                            .route(web::post().to(attendance::mark_attendance))
                            .route(web::get().to(attendance::monthly_matrix)),
                    )
                    // /attendance/today
                    .service(web::resource("/today").route(web::get().to(attendance::today))),
            )
            .default_service(web::to(not_found)),
    );
}
