//! Pure view-model logic, one module per screen concern.
//!
//! Nothing here performs I/O except [`weight::fetch_animal_data`], which only
//! talks to the injected client.
//!
//! # Modules
//!
//! - [`activity`]: activity feed normalisation and merge
//! - [`chart`]: weight chart coordinates
//! - [`chat`]: assistant transcript and reply sections
//! - [`dashboard`]: headline counters
//! - [`filters`]: weight-board filters
//! - [`herd_stats`]: average/max/min reducer
//! - [`notifications`]: notification mapping and read state
//! - [`weight`]: history normalisation and per-animal fetch

pub mod activity;
pub mod chart;
pub mod chat;
pub mod dashboard;
pub mod filters;
pub mod herd_stats;
pub mod notifications;
pub mod weight;
