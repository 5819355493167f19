//! GitLab Project Variables
//!
//! Operations on project-level CI/CD variables. Every operation is one or two
//! requests and each checks for the exact status code GitLab returns on
//! success.
//!
//! Increment and decrement are a client-side read-modify-write, not an atomic
//! remote operation. Two jobs changing the same key at once can lose an
//! update; the tool is meant for sequential pipeline stages.

use super::client::GitlabClient;
use super::http::RawResponse;
use crate::error::{Result, VarsError};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use serde::Deserialize;

/// Default format for `timestamp`, e.g. `20240305142501`
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const STATUS_OK: u16 = 200;
const STATUS_CREATED: u16 = 201;

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Wall-clock time in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Variable as returned by `GET /projects/:id/variables/:key`
#[derive(Debug, Deserialize)]
struct VariableResponse {
    #[serde(default)]
    value: Option<String>,
}

fn expect_status(response: &RawResponse, expected: u16) -> Result<()> {
    if response.status == expected {
        Ok(())
    } else {
        Err(VarsError::UnexpectedStatus {
            expected,
            actual: response.status,
        })
    }
}

/// Read a variable's value
pub async fn get_variable(client: &GitlabClient, project: &str, key: &str) -> Result<String> {
    let response = client.get(&client.variable_url(project, key)).await?;
    expect_status(&response, STATUS_OK)?;

    if response.body.trim().is_empty() {
        return Err(VarsError::not_set(project, key));
    }

    let variable: VariableResponse = serde_json::from_str(&response.body)?;
    variable
        .value
        .ok_or_else(|| VarsError::not_set(project, key))
}

/// Create a new variable; fails if GitLab does not answer 201
pub async fn create_variable(
    client: &GitlabClient,
    project: &str,
    key: &str,
    value: &str,
) -> Result<()> {
    let form = [("key", key), ("value", value)];
    let response = client
        .post_form(&client.variables_url(project), &form)
        .await?;
    expect_status(&response, STATUS_CREATED)?;

    tracing::info!("Created variable {} in project {}", key, project);
    Ok(())
}

/// Replace an existing variable's value
pub async fn update_variable(
    client: &GitlabClient,
    project: &str,
    key: &str,
    value: &str,
) -> Result<()> {
    let form = [("key", key), ("value", value)];
    let response = client
        .put_form(&client.variable_url(project, key), &form)
        .await?;
    expect_status(&response, STATUS_OK)?;

    tracing::info!("Updated variable {} in project {}", key, project);
    Ok(())
}

/// Add one to an integer variable, returning the new value
pub async fn increment_variable(client: &GitlabClient, project: &str, key: &str) -> Result<i64> {
    adjust_variable(client, project, key, 1).await
}

/// Subtract one from an integer variable, returning the new value
pub async fn decrement_variable(client: &GitlabClient, project: &str, key: &str) -> Result<i64> {
    adjust_variable(client, project, key, -1).await
}

async fn adjust_variable(
    client: &GitlabClient,
    project: &str,
    key: &str,
    delta: i64,
) -> Result<i64> {
    let url = client.variable_url(project, key);

    let response = client.get(&url).await?;
    expect_status(&response, STATUS_OK)?;

    let variable: VariableResponse = serde_json::from_str(&response.body)?;
    let current = variable.value.unwrap_or_default();
    let new_value = apply_delta(&current, delta)?;

    tracing::debug!("{}: {} -> {}", key, current, new_value);

    let value = new_value.to_string();
    let form = [("key", key), ("value", value.as_str())];
    let response = client.put_form(&url, &form).await?;
    expect_status(&response, STATUS_OK)?;

    Ok(new_value)
}

/// Parse `current` as a base-10 integer and add `delta`
fn apply_delta(current: &str, delta: i64) -> Result<i64> {
    current
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|n| n.checked_add(delta))
        .ok_or_else(|| VarsError::NotAnInteger {
            value: current.to_string(),
        })
}

/// Check a strftime format string before it is used
pub fn validate_timestamp_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(VarsError::InvalidTimestampFormat(format.to_string()));
    }
    Ok(())
}

/// Set a variable to the current time, returning the stored value
pub async fn stamp_variable(
    client: &GitlabClient,
    project: &str,
    key: &str,
    format: &str,
    clock: &impl Clock,
) -> Result<String> {
    validate_timestamp_format(format)?;

    let value = clock.now().format(format).to_string();
    update_variable(client, project, key, &value).await?;

    Ok(value)
}
