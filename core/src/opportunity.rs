//! Opportunity records and the single-field updates a turn can request.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::slots::{self, Slot};

/// An opportunity as read from the data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    /// Stable record id (`sfid`)
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub close_date: NaiveDate,
    pub stage: String,
    pub next_steps: Option<String>,
}

/// User input that could not be turned into a field value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInputError {
    #[error("unparseable closing date '{0}'")]
    Date(String),
    #[error("unparseable amount '{0}'")]
    Amount(String),
}

/// Field an update turn can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateField {
    Amount,
    ClosingDate,
    Stage,
    NextSteps,
}

impl UpdateField {
    pub const ALL: [UpdateField; 4] = [
        UpdateField::Amount,
        UpdateField::Stage,
        UpdateField::ClosingDate,
        UpdateField::NextSteps,
    ];

    /// Slot carrying this field's value in `UpdateOpportunity`.
    pub fn slot_name(self) -> &'static str {
        match self {
            UpdateField::Amount => "amount",
            UpdateField::ClosingDate => "closingDate",
            UpdateField::Stage => "stage",
            UpdateField::NextSteps => "nextSteps",
        }
    }

    /// Parse the canonical value of the `updateOption` selector slot.
    pub fn from_selector(value: &str) -> Option<Self> {
        match value {
            "amount" => Some(UpdateField::Amount),
            "closingDate" => Some(UpdateField::ClosingDate),
            "stage" => Some(UpdateField::Stage),
            "nextSteps" => Some(UpdateField::NextSteps),
            _ => None,
        }
    }

    /// Question asked when the user picked this field but gave no value yet.
    pub fn prompt(self) -> &'static str {
        match self {
            UpdateField::Amount => "What's the new opportunity size?",
            UpdateField::ClosingDate => "What's the new date?",
            UpdateField::Stage => "What's the new stage?",
            UpdateField::NextSteps => "What are the next steps?",
        }
    }
}

/// Slot holding the field selector of `UpdateOpportunity`.
pub const UPDATE_OPTION_SLOT: &str = "updateOption";

/// What an `UpdateOpportunity` turn asks for, resolved once from its slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateRequest {
    Amount(String),
    ClosingDate(String),
    Stage(String),
    NextSteps(String),
    FieldSelector(UpdateField),
    Empty,
}

impl UpdateRequest {
    /// Resolve the turn's slots into one request.
    ///
    /// Concrete values beat the selector. Among values the first present one
    /// in the order amount, closing date, stage, next steps wins. A selector
    /// naming an unknown field counts as no input.
    pub fn from_slots(slots: &HashMap<String, Slot>) -> Self {
        let value = |field: UpdateField| slots::resolve(slots.get(field.slot_name()));

        if let Some(amount) = value(UpdateField::Amount) {
            return UpdateRequest::Amount(amount);
        }
        if let Some(date) = value(UpdateField::ClosingDate) {
            return UpdateRequest::ClosingDate(date);
        }
        if let Some(stage) = value(UpdateField::Stage) {
            return UpdateRequest::Stage(stage);
        }
        if let Some(next_steps) = value(UpdateField::NextSteps) {
            return UpdateRequest::NextSteps(next_steps);
        }

        slots::resolve(slots.get(UPDATE_OPTION_SLOT))
            .and_then(|selector| UpdateField::from_selector(&selector))
            .map(UpdateRequest::FieldSelector)
            .unwrap_or(UpdateRequest::Empty)
    }
}

/// A validated single-field change.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Amount(f64),
    CloseDate(NaiveDate),
    Stage(String),
    NextSteps(String),
}

impl FieldChange {
    pub fn field(&self) -> UpdateField {
        match self {
            FieldChange::Amount(_) => UpdateField::Amount,
            FieldChange::CloseDate(_) => UpdateField::ClosingDate,
            FieldChange::Stage(_) => UpdateField::Stage,
            FieldChange::NextSteps(_) => UpdateField::NextSteps,
        }
    }
}

/// Parse a spoken amount such as `5000`, `12,500` or `$7500.50`.
pub fn parse_amount(text: &str) -> Result<f64, MalformedInputError> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ','))
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
        .ok_or_else(|| MalformedInputError::Amount(text.to_string()))
}

/// Parse a date slot value into a calendar date.
///
/// Accepts full dates (`2018-03-08`), months (`2018-03`, first day) and years
/// (`2018`, January 1st). Anything else, such as week (`2018-W10`) or season
/// values, is malformed.
pub fn parse_date(text: &str) -> Result<NaiveDate, MalformedInputError> {
    let text = text.trim();
    let malformed = || MalformedInputError::Date(text.to_string());

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }

    let parts: Vec<&str> = text.split('-').collect();
    let number = |s: &str| -> Option<u32> {
        (!s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
            .then(|| s.parse().ok())
            .flatten()
    };
    match parts.as_slice() {
        [year, month] if year.len() == 4 => {
            let year = number(year).ok_or_else(malformed)?;
            let month = number(month).ok_or_else(malformed)?;
            NaiveDate::from_ymd_opt(year as i32, month, 1).ok_or_else(malformed)
        }
        [year] if year.len() == 4 => {
            let year = number(year).ok_or_else(malformed)?;
            NaiveDate::from_ymd_opt(year as i32, 1, 1).ok_or_else(malformed)
        }
        _ => Err(malformed()),
    }
}

/// Canonical ISO calendar form used for storage and speech.
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
