//! eventgate web server.
//!
//! Serves the screens and actions of the event booking app: every screen
//! runs the route gate before it renders, and every action runs it before
//! it mutates anything.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod pages;
pub mod types;
