//! Browser-side form wiring: validate, serialize, post, and drive the
//! button and banners while the request is in flight.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use thiserror::Error;

pub const BUSY_LABEL: &str = "Submitting…";
pub const DEFAULT_LABEL: &str = "Submit";

/// Flat mapping posted to the gateway.
pub type Submission = Map<String, Value>;

/// Successful controls of a form in document order, as `(name, value)`.
/// Unchecked boxes and unselected radios are simply absent.
pub type FormEntries = Vec<(String, String)>;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Url,
    Number,
    Date,
    Select,
    Radio,
    Checkbox,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub pattern: Option<&'static str>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            pattern: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn pattern(mut self, pattern: &'static str) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Names ending in `[]` collect every submitted value.
    pub fn is_multi(&self) -> bool {
        self.name.ends_with("[]")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Missing,
    TypeMismatch,
    PatternMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub kind: ViolationKind,
}

/// The known field list of one form.
#[derive(Debug)]
pub struct FormSchema {
    pub fields: &'static [FieldSpec],
}

impl FormSchema {
    pub fn validate(&self, entries: &FormEntries) -> Vec<Violation> {
        let mut violations = Vec::new();
        for field in self.fields {
            let values = values_of(entries, field.name);
            let filled: Vec<&str> = values.iter().copied().filter(|v| !v.is_empty()).collect();

            if filled.is_empty() {
                if field.required {
                    violations.push(Violation {
                        field: field.name,
                        kind: ViolationKind::Missing,
                    });
                }
                continue;
            }

            for value in filled {
                if let Some(kind) = check_value(field, value) {
                    violations.push(Violation {
                        field: field.name,
                        kind,
                    });
                    break;
                }
            }
        }
        violations
    }

    pub fn serialize(&self, entries: &FormEntries) -> Submission {
        let mut data = Submission::new();
        for field in self.fields {
            let values = values_of(entries, field.name);
            let value = if field.is_multi() {
                json!(values)
            } else if field.kind == FieldKind::Checkbox {
                Value::Bool(!values.is_empty())
            } else {
                match values.last() {
                    Some(v) => Value::String(v.to_string()),
                    None => continue,
                }
            };
            data.insert(field.name.to_string(), value);
        }
        data
    }
}

fn values_of<'a>(entries: &'a FormEntries, name: &str) -> Vec<&'a str> {
    entries
        .iter()
        .filter(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
        .collect()
}

fn check_value(field: &FieldSpec, value: &str) -> Option<ViolationKind> {
    let type_ok = match field.kind {
        FieldKind::Email => EMAIL_RE.is_match(value),
        FieldKind::Url => reqwest::Url::parse(value).is_ok(),
        FieldKind::Number => value.trim().parse::<f64>().is_ok(),
        FieldKind::Date => chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        _ => true,
    };
    if !type_ok {
        return Some(ViolationKind::TypeMismatch);
    }

    // Same as the HTML attribute: whole value must match, bad patterns are ignored.
    let pattern = field.pattern?;
    match Regex::new(&format!("^(?:{})$", pattern)) {
        Ok(re) if !re.is_match(value) => Some(ViolationKind::PatternMismatch),
        _ => None,
    }
}

/// Element ids one submitter is wired to.
#[derive(Debug, Clone)]
pub struct FormSpec {
    pub form_id: String,
    pub endpoint: String,
    pub submit_button_id: String,
    pub success_id: String,
    pub error_id: String,
}

impl FormSpec {
    pub fn new(
        form_id: impl Into<String>,
        endpoint: impl Into<String>,
        submit_button_id: impl Into<String>,
        success_id: impl Into<String>,
        error_id: impl Into<String>,
    ) -> Self {
        Self {
            form_id: form_id.into(),
            endpoint: endpoint.into(),
            submit_button_id: submit_button_id.into(),
            success_id: success_id.into(),
            error_id: error_id.into(),
        }
    }
}

/// The page the form lives on.
pub trait FormView: Send {
    fn has_form(&self, form_id: &str) -> bool;
    fn entries(&self, form_id: &str) -> FormEntries;
    /// Re-surfaces native validation messages.
    fn report_validity(&mut self, form_id: &str, violations: &[Violation]);
    fn reset(&mut self, form_id: &str);
    fn label(&self, control_id: &str) -> Option<String>;
    fn set_label(&mut self, control_id: &str, label: &str);
    fn set_disabled(&mut self, control_id: &str, disabled: bool);
    fn set_visible(&mut self, element_id: &str, visible: bool);
    fn scroll_into_view(&mut self, element_id: &str);
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("gateway answered {status}")]
    Rejected { status: u16, body: Value },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid(Vec<Violation>),
    Submitted,
    Failed(SubmitError),
}

pub struct FormSubmitter {
    spec: FormSpec,
    schema: &'static FormSchema,
    client: reqwest::Client,
    label: String,
}

impl FormSubmitter {
    /// Wires a form to its endpoint. Returns `None` when the page has no such form.
    pub fn bind<V: FormView>(spec: FormSpec, schema: &'static FormSchema, view: &V) -> Option<Self> {
        if !view.has_form(&spec.form_id) {
            return None;
        }
        let label = view
            .label(&spec.submit_button_id)
            .unwrap_or_else(|| DEFAULT_LABEL.to_string());
        Some(Self {
            spec,
            schema,
            client: reqwest::Client::new(),
            label,
        })
    }

    pub async fn submit<V: FormView>(&self, view: &mut V) -> SubmitOutcome {
        let spec = &self.spec;
        view.set_visible(&spec.success_id, false);
        view.set_visible(&spec.error_id, false);

        let entries = view.entries(&spec.form_id);
        let violations = self.schema.validate(&entries);
        if !violations.is_empty() {
            view.report_validity(&spec.form_id, &violations);
            return SubmitOutcome::Invalid(violations);
        }
        let submission = self.schema.serialize(&entries);

        view.set_disabled(&spec.submit_button_id, true);
        view.set_label(&spec.submit_button_id, BUSY_LABEL);

        let result = self.post(&submission).await;

        // Restored on every path, before the result is looked at.
        view.set_disabled(&spec.submit_button_id, false);
        view.set_label(&spec.submit_button_id, &self.label);

        match result {
            Ok(()) => {
                view.reset(&spec.form_id);
                view.set_visible(&spec.success_id, true);
                view.scroll_into_view(&spec.success_id);
                SubmitOutcome::Submitted
            }
            Err(err) => {
                match &err {
                    SubmitError::Rejected { body, .. } => tracing::error!("Submission error: {}", body),
                    SubmitError::Network(e) => tracing::error!("Network error: {}", e),
                }
                view.set_visible(&spec.error_id, true);
                view.scroll_into_view(&spec.error_id);
                SubmitOutcome::Failed(err)
            }
        }
    }

    async fn post(&self, submission: &Submission) -> Result<(), SubmitError> {
        let resp = self
            .client
            .post(&self.spec.endpoint)
            .json(submission)
            .send()
            .await?;

        if resp.status().is_success() {
            return Ok(());
        }
        let status = resp.status().as_u16();
        let body = resp.json::<Value>().await.unwrap_or_else(|_| json!({}));
        Err(SubmitError::Rejected { status, body })
    }
}
