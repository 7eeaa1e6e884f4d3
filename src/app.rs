/*
 * Responsibility
 * - Config読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (gate / CSRF / security headers / CORS / HTTP)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::gate::{Gate, RoutePolicy, reference_policy};
use crate::middleware::{self, csrf::CsrfPolicy};
use crate::repos::{PgUserDirectory, UserDirectory};
use crate::services::auth::build_auth_services;
use crate::{api, state::AppState};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,request_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    // before tracing so RUST_LOG from .env applies
    dotenvy::dotenv().ok();
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting request gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let db = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(config.user_lookup_timeout)
        .connect_lazy(&config.database_url)
        .context("invalid DATABASE_URL")?;
    let directory: Arc<dyn UserDirectory> = Arc::new(PgUserDirectory::new(db));

    let policy = reference_policy(config.strict_route_policy)?;
    report_policy(&policy, &config);

    let auth = build_auth_services(&config, directory.clone())?;
    let gate = Gate::new(policy, auth.resolver, config.user_lookup_timeout);
    let state = AppState::new(directory, auth.passwords, auth.issuer);

    let app = build_router(state, gate, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Full middleware stack around the API routes.
///
/// The gate wraps the routes directly, so it runs after CORS/CSRF and before
/// any handler.
pub fn build_router(state: AppState, gate: Gate, config: &Config) -> Router {
    let app = api::routes().with_state(state);

    let app = middleware::auth::access::apply(app, gate);
    let app = if config.csrf_protection {
        let origins = middleware::cors::allowed_origins(&config.cors_allowed_origins);
        middleware::csrf::apply(app, CsrfPolicy::new(origins))
    } else {
        app
    };
    let app = middleware::security_headers::apply(app, config.frame_options);
    let app = middleware::cors::apply(app, config);
    middleware::http::apply(app)
}

fn report_policy(policy: &RoutePolicy, config: &Config) {
    tracing::info!(rules = policy.rules().len(), "route policy loaded");

    for rule in policy.flagged() {
        tracing::warn!(
            methods = %rule.methods,
            pattern = %rule.pattern,
            reason = rule.flag.unwrap_or_default(),
            "security defect: route exempted from authentication (set STRICT_ROUTE_POLICY=true to protect it)"
        );
    }
    if !config.csrf_protection {
        tracing::warn!("CSRF protection is disabled (CSRF_PROTECTION=false)");
    }
    if !config.frame_options {
        tracing::warn!("clickjacking frame blocking is disabled (FRAME_OPTIONS=false)");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
