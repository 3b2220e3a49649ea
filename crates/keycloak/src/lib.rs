//! # keycloak
//!
//! `afm-keycloak` talks to the admin REST API of the Keycloak instance
//! that backs AfroMarket. It only covers what provisioning needs: a
//! password-grant admin session, user lookup/creation/password reset and
//! realm roles with their user mappings.
//!
//! In the development environment Keycloak runs at <http://localhost:8080>.
//!
//! Default admin username/password: `admin`/`admin123`
mod client;

pub use client::*;
pub mod config;
pub mod session;
