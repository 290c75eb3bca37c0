//! Warden Server
//!
//! Role hierarchy, permission evaluation and session validation for
//! multi-tenant organizations.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod permissions;
pub mod roles;
pub mod session;
pub mod tags;
