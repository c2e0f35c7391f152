use log::{debug, info, warn};

/// Component-tagged logger; the component name becomes the log target.
pub struct LogManager {
    component: &'static str,
}

impl LogManager {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn record(&self, message: &str) {
        info!(target: self.component, "{}", message);
    }

    pub fn detail(&self, message: &str) {
        debug!(target: self.component, "{}", message);
    }

    pub fn caution(&self, message: &str) {
        warn!(target: self.component, "{}", message);
    }
}
