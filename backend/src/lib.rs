//! # Gym Admin Backend
//!
//! Membership administration service behind the gym's admin dashboard.
//! A single action-dispatched endpoint records members, activations,
//! extensions, daily passes and payments, and reports dashboard statistics.
//!
//! ## Layers
//!
//! - **config**: YAML configuration with environment overrides
//! - **domain**: membership rules and dashboard aggregation
//! - **storage**: the member table (CSV sheet or in-memory)
//! - **io**: the REST endpoint

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{AppConfig, MembershipRules};
use crate::domain::{Clock, DashboardService, MembershipService, SystemClock};
use crate::storage::{open_member_storage, MemberStorage};

#[derive(Clone)]
pub struct AppState {
    pub membership_service: MembershipService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    /// Wire the services over an already opened store
    pub fn new(storage: Arc<dyn MemberStorage>, clock: Arc<dyn Clock>, rules: MembershipRules) -> Self {
        Self {
            membership_service: MembershipService::new(storage.clone(), clock.clone(), rules.clone()),
            dashboard_service: DashboardService::new(storage, clock, rules),
        }
    }
}

pub fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up member storage");
    let storage = open_member_storage(&config.storage)?;

    info!("Setting up domain services");
    let app_state = AppState::new(storage, Arc::new(SystemClock), config.membership.clone());

    Ok(app_state)
}

pub fn create_router(app_state: AppState, allowed_origin: &str) -> Result<Router> {
    let origin = allowed_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin '{}'", allowed_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let router = Router::new()
        .route("/", get(io::handle_action).post(io::handle_action))
        .route("/exec", get(io::handle_action).post(io::handle_action))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    Ok(router)
}
