//! Field-level rules shared by the storage backends and request DTOs.

use crate::error::CoreError;

/// Require a non-blank value for `field`.
pub fn require_not_blank(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Reject values with leading or trailing whitespace.
pub fn require_unpadded(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim() != value {
        return Err(CoreError::Validation(format!(
            "{field} must not have leading or trailing whitespace"
        )));
    }
    Ok(())
}

/// A rollout request must name services for at least one environment.
pub fn validate_request_services(
    bau_services: Option<&str>,
    uat_services: Option<&str>,
) -> Result<(), CoreError> {
    let present = |s: Option<&str>| s.is_some_and(|v| !v.trim().is_empty());
    if present(bau_services) || present(uat_services) {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "At least one of bauServices or uatServices must be provided".to_string(),
        ))
    }
}

/// An epic link, when given, must be an absolute http(s) URL.
pub fn validate_epic_link(link: &str) -> Result<(), CoreError> {
    let link = link.trim();
    if link.is_empty() || link.starts_with("http://") || link.starts_with("https://") {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "jiraEpicLink must start with http:// or https:// (got '{link}')"
        )))
    }
}
