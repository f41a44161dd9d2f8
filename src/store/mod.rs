pub mod airtable;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use airtable::AirtableStore;

pub const LEADS_TABLE: &str = "Leads";
pub const AARS_TABLE: &str = "AARs";
pub const QUIZ_RESULTS_TABLE: &str = "Quiz Results";

/// Field set written to a store table, keyed by the store's own column names.
pub type Fields = Map<String, Value>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The store answered, but not with a success status.
    #[error("store responded with status {status}")]
    Rejected { status: u16, detail: Value },
    /// The request never produced a response.
    #[error("store request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}

/// The external tabular store, as seen by the record handlers.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the id of the first Lead whose email matches, ignoring case.
    async fn find_lead_by_email(&self, email: &str) -> Result<Option<String>, StoreError>;

    /// Inserts one record. Any success status means the record exists; the
    /// assigned id is returned when the store's reply carries one.
    async fn create_record(&self, table: &str, fields: Fields) -> Result<Option<String>, StoreError>;
}
