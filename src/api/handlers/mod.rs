//! Route handlers for the portfolio API.

pub mod auth;
pub mod contact;
pub mod health;
pub mod projects;
pub mod root;
pub mod upload;
