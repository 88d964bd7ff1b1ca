//! Validation of the user-list response body.
//!
//! The endpoint is trusted for shape only. Every record must carry `id`,
//! `name`, `email`, and `company.name` with the right JSON types, and ids must
//! be unique because they key the rendered rows. The first violation fails the
//! whole payload; partial lists are never produced.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use roster_types::{User, UserId};

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("response is not valid JSON: {0}")]
    NotJson(#[source] serde_json::Error),
    #[error("expected a JSON array of users, found {found}")]
    NotArray { found: &'static str },
    #[error("record {index} is malformed: {reason}")]
    Malformed { index: usize, reason: String },
    #[error("records {first} and {second} share id {id}")]
    DuplicateId {
        id: UserId,
        first: usize,
        second: usize,
    },
}

/// Parse and validate a response body into users, preserving order.
pub fn parse_users(body: &[u8]) -> Result<Vec<User>, PayloadError> {
    let value: Value = serde_json::from_slice(body).map_err(PayloadError::NotJson)?;
    let records = match value {
        Value::Array(records) => records,
        other => {
            return Err(PayloadError::NotArray {
                found: json_kind(&other),
            });
        }
    };

    let mut seen: HashMap<UserId, usize> = HashMap::with_capacity(records.len());
    let mut users = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        if !record.is_object() {
            return Err(PayloadError::Malformed {
                index,
                reason: format!("expected an object, found {}", json_kind(&record)),
            });
        }
        let user: User = serde_json::from_value(record).map_err(|e| PayloadError::Malformed {
            index,
            reason: e.to_string(),
        })?;
        if let Some(first) = seen.insert(user.id, index) {
            return Err(PayloadError::DuplicateId {
                id: user.id,
                first,
                second: index,
            });
        }
        users.push(user);
    }

    Ok(users)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
