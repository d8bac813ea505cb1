#![allow(dead_code)]
use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::test::TestRequest;
use attendance_kiosk::clock::FixedClock;
use attendance_kiosk::state::AppState;
use attendance_kiosk::store::MemoryStore;
use chrono::TimeZone;
use chrono_tz::Asia::Kolkata;

pub const KIOSK_IP: &str = "10.0.0.7:40000";

/// Clock pinned to a wall-clock time in Asia/Kolkata
pub fn kolkata(y: i32, m: u32, d: u32, h: u32, min: u32) -> FixedClock {
    FixedClock::new(Kolkata.with_ymd_and_hms(y, m, d, h, min, 0).unwrap())
}

/// Fresh in-memory state; the store handle is returned for direct inspection.
pub fn state_at(clock: FixedClock) -> (Arc<MemoryStore>, AppState) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), Arc::new(clock), "reception");
    (store, state)
}

/// Requests carry a peer address so the per-IP limiter can key them.
pub fn with_peer(req: TestRequest) -> TestRequest {
    req.peer_addr(KIOSK_IP.parse::<SocketAddr>().unwrap())
}

/// Builds the routed service the way `main` does, minus logging and docs.
#[allow(unused_macros)]
macro_rules! init_app {
    ($state:expr) => {
        init_app!($state, attendance_kiosk::config::Config::local())
    };
    ($state:expr, $config:expr) => {{
        let config: attendance_kiosk::config::Config = $config;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .wrap(actix_web::middleware::from_fn(
                    attendance_kiosk::middleware::cors_middleware,
                ))
                .configure(|cfg| attendance_kiosk::routes::configure(cfg, &config))
                .default_service(actix_web::web::to(attendance_kiosk::routes::not_found)),
        )
        .await
    }};
}
