/// Sink for the brief, dismissable notifications the stores emit. The view
/// layer renders these as toasts; the default implementation routes them
/// through `tracing` so headless use still records every outcome.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        tracing::info!(message, "notification");
    }

    fn error(&self, message: &str) {
        tracing::warn!(message, "notification");
    }
}
