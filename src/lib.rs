//! Attendance kiosk service: employees and daily arrival records kept in a
//! spreadsheet (or MySQL), served as a small JSON API.

pub mod api;
pub mod client;
pub mod clock;
pub mod config;
pub mod core;
pub mod docs;
pub mod error;
pub mod middleware;
pub mod model;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
