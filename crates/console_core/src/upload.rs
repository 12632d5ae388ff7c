use std::path::PathBuf;

use crate::{infer_transport_type, TransportType};

/// Identifies one upload or create submission. A result carrying an older
/// ticket than the latest one issued is ignored.
pub type Ticket = u64;

/// File upload feeding the create form's path field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadSession {
    source: Option<PathBuf>,
    uploading: bool,
    resolved_path: Option<String>,
    ticket: Ticket,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Resolved(String),
    Failed(String),
    /// A newer upload was started after this one.
    Superseded,
}

impl UploadSession {
    pub fn begin(&mut self, source: PathBuf) -> Ticket {
        self.ticket += 1;
        self.source = Some(source);
        self.uploading = true;
        self.resolved_path = None;
        self.ticket
    }

    pub fn finish(&mut self, ticket: Ticket, result: Result<String, String>) -> UploadOutcome {
        if ticket != self.ticket || !self.uploading {
            return UploadOutcome::Superseded;
        }
        self.uploading = false;
        match result {
            Ok(path) if !path.trim().is_empty() => {
                let path = path.trim().to_string();
                self.resolved_path = Some(path.clone());
                UploadOutcome::Resolved(path)
            }
            Ok(_) => {
                self.source = None;
                UploadOutcome::Failed("upload returned no path".to_string())
            }
            Err(message) => {
                self.source = None;
                UploadOutcome::Failed(message)
            }
        }
    }

    pub fn reset(&mut self) {
        self.source = None;
        self.uploading = false;
        self.resolved_path = None;
    }

    pub fn source(&self) -> Option<&PathBuf> {
        self.source.as_ref()
    }

    pub fn uploading(&self) -> bool {
        self.uploading
    }

    pub fn resolved_path(&self) -> Option<&str> {
        self.resolved_path.as_deref()
    }
}

/// Edits to a single create-form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    Name(String),
    Description(String),
    Path(String),
    ScenarioId(Option<i64>),
    AlgoId(Option<i64>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateForm {
    pub name: String,
    pub description: String,
    pub path: String,
    pub scenario_id: Option<i64>,
    pub algo_id: Option<i64>,
}

/// Validated payload for the create endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub name: String,
    pub description: Option<String>,
    pub algo_id: Option<i64>,
    pub scenario_id: i64,
    pub stream_type: TransportType,
    pub stream_path: String,
}

impl CreateForm {
    pub fn apply(&mut self, field: FormField) {
        match field {
            FormField::Name(name) => self.name = name,
            FormField::Description(description) => self.description = description,
            FormField::Path(path) => self.path = path,
            FormField::ScenarioId(id) => self.scenario_id = id,
            FormField::AlgoId(id) => self.algo_id = id,
        }
    }

    /// Check required fields. On failure returns every missing field name.
    pub fn validate(&self) -> Result<CreateRequest, Vec<&'static str>> {
        let name = self.name.trim();
        let path = self.path.trim();

        let mut missing = Vec::new();
        if name.is_empty() {
            missing.push("name");
        }
        if path.is_empty() {
            missing.push("path");
        }
        let Some(scenario_id) = self.scenario_id else {
            missing.push("scenario");
            return Err(missing);
        };
        if !missing.is_empty() {
            return Err(missing);
        }

        let description = Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(ToOwned::to_owned);

        Ok(CreateRequest {
            name: name.to_string(),
            description,
            algo_id: self.algo_id,
            scenario_id,
            stream_type: infer_transport_type(path),
            stream_path: path.to_string(),
        })
    }
}
