/*
 * Responsibility
 * - routes() の re-export と handler / dto / extractor の公開
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
