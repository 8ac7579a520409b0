//! EV charging content server library
//!
//! The binary in main.rs wires these modules into an axum server.
//!
//! # Modules
//!
//! - `locale`: locales, fallback chains and per-locale document file resolution
//! - `richtext`: rich-text JSON documents rendered to escaped HTML
//! - `html`: post-processing of rendered HTML
//! - `db`: SQLite persistence for documents and articles
//! - `routes`: HTTP handlers

pub mod config;
pub mod db;
pub mod error;
pub mod html;
pub mod locale;
pub mod richtext;
pub mod routes;
pub mod state;
pub mod storage;
