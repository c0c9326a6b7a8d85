use crate::{
    models::{StdoutSinkConfig, Toast},
    sinks::{AlertSink, AlertSinkError},
};

/// A sink that prints toasts to standard output.
pub struct StdoutSink {
    config: StdoutSinkConfig,
}

impl StdoutSink {
    /// Creates a new `StdoutSink` with the given configuration.
    pub fn new(config: StdoutSinkConfig) -> Self {
        Self { config }
    }

    fn format(&self, toast: &Toast) -> Result<String, AlertSinkError> {
        if self.config.json {
            return Ok(serde_json::to_string(toast)?);
        }
        let notification = &toast.notification;
        let mut text = format!("=== {} ===\n{}", toast.title, notification.message);
        if let Some(image_url) = &notification.image_url {
            text.push_str(&format!("\n{image_url}"));
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl AlertSink for StdoutSink {
    fn name(&self) -> String {
        "stdout".to_string()
    }

    async fn deliver(&self, toast: &Toast) -> Result<(), AlertSinkError> {
        println!("{}\n", self.format(toast)?);
        Ok(())
    }
}
