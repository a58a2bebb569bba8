/// Middleware modules for the API server
///
/// This module contains custom middleware for:
/// - Security headers
pub mod security;
