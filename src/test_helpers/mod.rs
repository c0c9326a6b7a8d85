//! A set of helpers for testing

mod detection;
mod event_source;
mod http_client;
mod stream;

pub use detection::DetectionEventBuilder;
pub use event_source::ScriptedEventSource;
pub use http_client::create_test_http_client;
pub use stream::StreamInfoBuilder;
