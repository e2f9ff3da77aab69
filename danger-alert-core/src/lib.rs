//! Danger Alert Core Library
//!
//! Core functionality for Danger Alert - community reporting of road
//! dangers with proximity notifications. This crate provides the Rust
//! implementation of the danger registry, geodesic distance and the
//! notification gate; the host application supplies device location and
//! notification delivery.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

mod api;
pub mod config;
pub mod danger;
pub mod geo;
pub mod notification;
pub mod storage;

pub use api::{BackgroundTasks, DangerAlertCore};
pub use config::CoreConfig;
