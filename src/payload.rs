//! Ticket payloads and responses
//!
//! Requests arrive as a Power BI export: the description rows live at
//! `records[0].entity["Power BI values"]`, one object per ticket. Responses
//! carry the base64 PNG, the ranked terms and bookkeeping fields.

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;

use crate::config::OutputConfig;
use crate::errors::{Result, WordCloudError};
use crate::pipeline::artifacts::BatchOutput;
use crate::terms::frequency::FrequencyEntry;

const RECORDS_FIELD: &str = "records";
const ENTITY_FIELD: &str = "entity";
const ROWS_FIELD: &str = "Power BI values";

/// Pull the description column out of a ticket payload.
///
/// Strings are taken verbatim, numbers and booleans are stringified and
/// `null` cells are skipped. Every row must carry `column`.
pub fn extract_descriptions(payload: &Value, column: &str) -> Result<Vec<String>> {
    let rows = rows(payload)?;

    let mut descriptions = Vec::with_capacity(rows.len());
    for row in rows {
        let cell = match row.as_object().and_then(|fields| fields.get(column)) {
            Some(cell) => cell,
            None => {
                tracing::warn!(column, "payload row is missing the description column");
                return Err(WordCloudError::MissingColumn(column.to_string()));
            }
        };
        match cell {
            Value::Null => {}
            Value::String(text) => descriptions.push(text.clone()),
            Value::Number(n) => descriptions.push(n.to_string()),
            Value::Bool(b) => descriptions.push(b.to_string()),
            other => descriptions.push(other.to_string()),
        }
    }

    Ok(descriptions)
}

fn rows(payload: &Value) -> Result<&Vec<Value>> {
    let records = payload
        .get(RECORDS_FIELD)
        .and_then(Value::as_array)
        .ok_or_else(|| missing(RECORDS_FIELD))?;
    let entity = records
        .first()
        .and_then(|record| record.get(ENTITY_FIELD))
        .ok_or_else(|| missing("records[0].entity"))?;
    entity
        .get(ROWS_FIELD)
        .and_then(Value::as_array)
        .ok_or_else(|| missing(ROWS_FIELD))
}

fn missing(field: &str) -> WordCloudError {
    tracing::warn!(field, "payload is missing a required field");
    WordCloudError::MissingField(field.to_string())
}

/// Successful response body.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub image_base64: String,
    /// `[term, count]` pairs, highest count first
    pub word_freq: Vec<FrequencyEntry>,
    pub status: &'static str,
    pub ticket_type: String,
    #[serde(rename = "image_Url")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Local>,
}

impl BatchResponse {
    /// Encode `output` into a response; the image URL is filled in by the
    /// caller once the image has been hosted.
    pub fn from_output(output: &BatchOutput, config: &OutputConfig) -> Result<Self> {
        Ok(Self {
            image_base64: output.image.to_base64_png()?,
            word_freq: output.ranked_terms.clone(),
            status: "success",
            ticket_type: config.ticket_type.clone(),
            image_url: None,
            created_at: Local::now(),
        })
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// Failure response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn from_error(err: &WordCloudError) -> Self {
        let details = std::error::Error::source(err).map(|source| source.to_string());
        Self {
            error: err.to_string(),
            kind: err.kind().as_str(),
            details,
        }
    }
}
