//! Side-effect capabilities used by the response interceptor.
//!
//! A browser front end would navigate and pop a toast directly. Here both
//! are injected so the client runs (and is tested) without a UI.

use tracing::{error, info};

/// Moves the user to another view
pub trait Navigator: Send + Sync {
    fn redirect(&self, location: &str);
}

/// Surfaces a transient, user-visible error message
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn redirect(&self, location: &str) {
        self(location)
    }
}

impl<F> Notifier for F
where
    F: Fn(&str) + Send + Sync,
{
    fn error(&self, message: &str) {
        self(message)
    }
}

/// Navigator that only logs the requested location
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, location: &str) {
        info!("Redirect requested: {}", location);
    }
}

/// Notifier that reports through tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        error!("{}", message);
    }
}
