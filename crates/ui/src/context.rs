use std::sync::Arc;

use services::{ClickOutput, PracticeService};

pub trait UiApp: Send + Sync {
    fn practice(&self) -> Arc<PracticeService>;
    fn click_output(&self) -> Arc<dyn ClickOutput>;
}

#[derive(Clone)]
pub struct AppContext {
    practice: Arc<PracticeService>,
    click_output: Arc<dyn ClickOutput>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            practice: app.practice(),
            click_output: app.click_output(),
        }
    }

    #[must_use]
    pub fn practice(&self) -> Arc<PracticeService> {
        Arc::clone(&self.practice)
    }

    #[must_use]
    pub fn click_output(&self) -> Arc<dyn ClickOutput> {
        Arc::clone(&self.click_output)
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
