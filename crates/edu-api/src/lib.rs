//! # edu-api
//!
//! REST API server for the academic resource platform, built with Axum.
//!
//! Everything lives under `/api`; `/health` and `/health/ready` sit at the
//! root for load balancers.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run, run_server};
pub use state::AppState;
