#![warn(missing_docs)]
//! streamwatch is the live alert engine of a stream monitoring console. It
//! subscribes to the backend's detection feeds, keeps short-lived overlay
//! alerts per stream and turns flagged detections into session
//! notifications and throttled toasts.

pub mod aggregator;
pub mod api;
pub mod cmd;
pub mod config;
pub mod console;
pub mod http_client;
pub mod ingestion;
pub mod models;
pub mod overlay;
pub mod sinks;
pub mod store;
pub mod test_helpers;
