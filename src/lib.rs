//! Headcounts - course enrollment headcounts
//!
//! Scrapes the public course-search site, keeps a cumulative enrollment
//! table, and serves filtered reports over it.
//!
//! # Architecture
//! - `scrape`: course-search scraper
//! - `update`: merges a scrape into the cumulative table and publishes it
//! - `report`: filters and statistics over the published table
//! - `api`: HTTP services and middleware
//! - `runtime`: server and batch execution modes
//! - `config`: configuration management
//! - `system`: logging setup

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod model;
pub mod report;
pub mod runtime;
pub mod scrape;
pub mod system;
pub mod update;
pub mod utils;
