//! Stateless request-authentication gateway.
//!
//! Every request is classified by a [`gate::RoutePolicy`]; protected routes
//! need a valid bearer token, which is resolved to an identity through the
//! user directory before any handler runs.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod gate;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
