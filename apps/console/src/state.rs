use crate::engine::EngineEvent;
use crate::render;
use anyhow::{Context, Result};
use finconsole_core::ConsoleError;
use finconsole_core::config::ConsoleConfig;
use finconsole_core::pages::PageCatalog;
use finconsole_core::session::PageSession;

pub struct AppState {
    pub catalog: PageCatalog,
    pub session: PageSession,
    /// Generation of the page view with a submission in flight.
    submitting: Option<u64>,
    /// Generation of the page view with an auto-fill in flight.
    filling: Option<u64>,
}

impl AppState {
    pub fn new(catalog: PageCatalog, config: &ConsoleConfig) -> Result<Self> {
        let page = catalog
            .default_page()
            .cloned()
            .context("Page catalog is empty")?;
        let session = PageSession::new(page, config.environment, config.max_records);
        Ok(Self {
            catalog,
            session,
            submitting: None,
            filling: None,
        })
    }

    pub fn open(&mut self, key: &str) -> Result<(), ConsoleError> {
        let page = self
            .catalog
            .get(key)
            .cloned()
            .ok_or_else(|| ConsoleError::UnknownPage(key.to_string()))?;
        self.session.open(page);
        Ok(())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting == Some(self.session.generation())
    }

    pub fn is_filling(&self) -> bool {
        self.filling == Some(self.session.generation())
    }

    pub fn mark_submitting(&mut self) {
        self.submitting = Some(self.session.generation());
    }

    pub fn mark_filling(&mut self) {
        self.filling = Some(self.session.generation());
    }

    /// Folds a finished request back into the session and describes it.
    pub fn apply_event(&mut self, event: EngineEvent) -> String {
        match event {
            EngineEvent::Executed(pending, record) => {
                if self.submitting == Some(pending.generation) {
                    self.submitting = None;
                }
                let line = render::record_line(&record);
                if self.session.complete_submission(&pending, record) {
                    line
                } else {
                    "(a result for a page that is no longer open was discarded)".to_string()
                }
            }
            EngineEvent::Suggested(pending, suggestion) => {
                if self.filling == Some(pending.generation) {
                    self.filling = None;
                }
                match self.session.complete_suggestion(&pending, suggestion) {
                    Some(0) => "AI auto-fill: no fields changed".to_string(),
                    Some(n) => format!(
                        "AI auto-fill updated {} field(s)\n{}",
                        n,
                        render::page(&self.session)
                    ),
                    None => "(a suggestion for a page that is no longer open was discarded)"
                        .to_string(),
                }
            }
        }
    }
}
