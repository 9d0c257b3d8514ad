use log::{error, info};

/// User-facing notices. Per-tick failures never go through here.
pub trait Notifier: Send + Sync + 'static {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Prints notices to stderr so they show even with logging filtered out.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn info(&self, message: &str) {
        info!("{message}");
        eprintln!("{message}");
    }

    fn error(&self, message: &str) {
        error!("{message}");
        eprintln!("error: {message}");
    }
}
