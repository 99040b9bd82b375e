//! Dealership CRM Core Library
//!
//! Lead qualification scoring and session permission resolution for the
//! dealership management application, plus the thin HTTP service that
//! exposes them.
//!
//! # Modules
//!
//! - `api`: HTTP routing.
//! - `core`: Domain logic re-exports.
//! - `integrations`: Backend auth service integration.
//! - `access_policy`: Swappable strategies deciding a session's grants.
//! - `auth_client`: Session lookup against the hosted backend.
//! - `circuit_breaker`: Circuit breaker for auth calls.
//! - `config`: Configuration management.
//! - `docs`: OpenAPI document.
//! - `engagement`: Engagement signal detection over transcripts.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Request and response models.
//! - `permissions`: Module/permission pairs and access queries.
//! - `qualification`: Qualification answers and the data score.
//! - `resolver`: Permission resolution with per-token caching.
//! - `scoring`: Lead score and hot/warm/cold classification.
//! - `session`: Session values and token helpers.

pub mod api;
pub mod core;
pub mod integrations;

pub mod access_policy;
pub mod auth_client;
pub mod circuit_breaker;
pub mod config;
pub mod docs;
pub mod engagement;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod permissions;
pub mod qualification;
pub mod resolver;
pub mod scoring;
pub mod session;
