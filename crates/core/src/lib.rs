//! # Appointly Core
//!
//! Domain layer of the Appointly booking service: appointment and notification
//! models, the scheduling rules, the cancellation policy, availability
//! computation and the background job queue that delivers cancellation mail.
//!
//! Persistence, the user directory and mail transport are reached through the
//! ports in [`repositories`], [`queue`] and [`mail`]. The [`memory`] module
//! provides in-process implementations of every port.

pub mod availability;
pub mod clock;
pub mod errors;
pub mod jobs;
pub mod mail;
pub mod memory;
pub mod models;
pub mod queue;
pub mod repositories;
pub mod services;
pub mod time;
