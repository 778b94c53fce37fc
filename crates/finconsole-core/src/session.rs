use crate::autofill::Suggestion;
use crate::environment::Environment;
use crate::error::ConsoleError;
use crate::execution::{ExecutionPort, ExecutionRecord, ExecutionRequest};
use crate::history::ExecutionHistory;
use crate::view::{HistoryRow, RecordDetail};
use finconsole_form::{FieldSpec, FormController, PageSpec};

/// A submission whose payload is resolved but whose call has not finished.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub generation: u64,
    pub request: ExecutionRequest,
}

/// An auto-fill request captured against the page view that asked for it.
#[derive(Debug, Clone)]
pub struct PendingSuggestion {
    pub generation: u64,
    pub fields: Vec<FieldSpec>,
}

/// State of the currently open page view.
///
/// Opening a page resets the form and discards the history. Work started
/// against an earlier view carries its generation and is dropped when it
/// completes late.
#[derive(Debug)]
pub struct PageSession {
    page: PageSpec,
    form: FormController,
    history: ExecutionHistory,
    environment: Environment,
    generation: u64,
}

impl PageSession {
    pub fn new(page: PageSpec, environment: Environment, max_records: Option<usize>) -> Self {
        Self {
            form: FormController::new(page.fields.clone()),
            page,
            history: ExecutionHistory::new(max_records),
            environment,
            generation: 0,
        }
    }

    pub fn open(&mut self, page: PageSpec) {
        self.generation += 1;
        self.form = FormController::new(page.fields.clone());
        self.history.clear();
        tracing::info!(page = %page.key, endpoint = %page.endpoint, "Opened page");
        self.page = page;
    }

    pub fn page(&self) -> &PageSpec {
        &self.page
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController {
        &mut self.form
    }

    pub fn history(&self) -> &ExecutionHistory {
        &self.history
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_environment(&mut self, environment: Environment) {
        if environment != self.environment {
            tracing::info!(from = %self.environment, to = %environment, "Environment switched");
        }
        self.environment = environment;
    }

    /// Resolves the payload for a submission. Malformed raw JSON aborts here,
    /// before any backend is contacted.
    pub fn begin_submission(&self) -> Result<PendingSubmission, ConsoleError> {
        let payload = self.form.resolve_payload()?;
        Ok(PendingSubmission {
            generation: self.generation,
            request: ExecutionRequest {
                endpoint: self.page.endpoint.clone(),
                method: self.page.method,
                payload,
                environment: self.environment,
            },
        })
    }

    /// Appends the record unless the page view changed meanwhile.
    /// Returns whether it was kept.
    pub fn complete_submission(
        &mut self,
        pending: &PendingSubmission,
        record: ExecutionRecord,
    ) -> bool {
        if pending.generation != self.generation {
            tracing::debug!(record_id = %record.id, "Dropping record from a closed page view");
            return false;
        }
        self.history.push(record);
        true
    }

    /// Resolves, executes and records in one step.
    pub async fn submit(
        &mut self,
        port: &dyn ExecutionPort,
    ) -> Result<ExecutionRecord, ConsoleError> {
        let pending = self.begin_submission()?;
        let record = port.execute(pending.request.clone()).await;
        self.complete_submission(&pending, record.clone());
        Ok(record)
    }

    pub fn begin_suggestion(&self) -> PendingSuggestion {
        PendingSuggestion {
            generation: self.generation,
            fields: self.page.fields.clone(),
        }
    }

    /// Merges a suggestion into the form. `None` when the page view changed
    /// meanwhile, otherwise the number of fields changed.
    pub fn complete_suggestion(
        &mut self,
        pending: &PendingSuggestion,
        suggestion: Suggestion,
    ) -> Option<usize> {
        if pending.generation != self.generation {
            return None;
        }
        Some(self.form.merge_suggestion(&suggestion.into_map()))
    }

    pub fn select_record(&self, selector: &str) -> Result<&ExecutionRecord, ConsoleError> {
        self.history
            .resolve(selector)
            .ok_or_else(|| ConsoleError::UnknownRecord(selector.to_string()))
    }

    pub fn detail(&self, selector: &str) -> Result<RecordDetail, ConsoleError> {
        self.select_record(selector).map(RecordDetail::from)
    }

    pub fn rows(&self) -> Vec<HistoryRow> {
        HistoryRow::rows(&self.history)
    }
}
