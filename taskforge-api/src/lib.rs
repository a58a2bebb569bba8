//! # TaskForge API Server Library
//!
//! This library provides the core functionality for the TaskForge API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers
//! - `ai`: Completion backends for the assist endpoint

pub mod ai;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
