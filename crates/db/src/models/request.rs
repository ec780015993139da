//! Rollout request (ticket) model and DTOs.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};
use vtrack_core::types::Timestamp;
use vtrack_core::validation::{
    require_not_blank, require_unpadded, validate_epic_link, validate_request_services,
};

use super::{double_option, not_blank};
use crate::error::StorageResult;

/// A row from the `requests` table. The id is chosen by the caller.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    pub request_name: String,
    /// One service per line.
    pub bau_services: Option<String>,
    /// One service per line.
    pub uat_services: Option<String>,
    pub bau_delivery_date: Option<NaiveDate>,
    pub uat_delivery_date: Option<NaiveDate>,
    pub production_date: Option<NaiveDate>,
    pub jira_epic_link: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a request.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "services_present"))]
pub struct CreateRequest {
    #[validate(custom(function = "request_id"))]
    pub id: String,
    #[validate(custom(function = "not_blank"))]
    pub request_name: String,
    pub bau_services: Option<String>,
    pub uat_services: Option<String>,
    pub bau_delivery_date: Option<NaiveDate>,
    pub uat_delivery_date: Option<NaiveDate>,
    pub production_date: Option<NaiveDate>,
    #[validate(custom(function = "epic_link"))]
    pub jira_epic_link: Option<String>,
    pub notes: Option<String>,
}

/// DTO for a partial update.
///
/// Nullable fields accept an explicit `null` to clear the stored value; an
/// absent key leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[validate(custom(function = "not_blank"))]
    pub request_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub bau_services: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub uat_services: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub bau_delivery_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub uat_delivery_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub production_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub jira_epic_link: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

fn request_id(id: &str) -> Result<(), ValidationError> {
    not_blank(id)?;
    require_unpadded("id", id).map_err(|_| {
        ValidationError::new("padded")
            .with_message(Cow::Borrowed("must not have leading or trailing whitespace"))
    })
}

fn services_present(input: &CreateRequest) -> Result<(), ValidationError> {
    validate_request_services(input.bau_services.as_deref(), input.uat_services.as_deref())
        .map_err(|e| ValidationError::new("services_required").with_message(Cow::Owned(e.to_string())))
}

fn epic_link(link: &str) -> Result<(), ValidationError> {
    validate_epic_link(link)
        .map_err(|e| ValidationError::new("url").with_message(Cow::Owned(e.to_string())))
}

fn merge<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

impl Request {
    pub fn from_create(input: &CreateRequest, now: Timestamp) -> StorageResult<Request> {
        let request = Request {
            id: input.id.clone(),
            request_name: input.request_name.clone(),
            bau_services: input.bau_services.clone(),
            uat_services: input.uat_services.clone(),
            bau_delivery_date: input.bau_delivery_date,
            uat_delivery_date: input.uat_delivery_date,
            production_date: input.production_date,
            jira_epic_link: input.jira_epic_link.clone(),
            notes: input.notes.clone(),
            created_at: now,
        };
        require_not_blank("id", &request.id)?;
        require_unpadded("id", &request.id)?;
        request.check()?;
        Ok(request)
    }

    /// Merge a partial update and re-check the record's invariants.
    pub fn apply_update(&mut self, input: &UpdateRequest) -> StorageResult<()> {
        merge(&mut self.request_name, &input.request_name);
        merge(&mut self.bau_services, &input.bau_services);
        merge(&mut self.uat_services, &input.uat_services);
        merge(&mut self.bau_delivery_date, &input.bau_delivery_date);
        merge(&mut self.uat_delivery_date, &input.uat_delivery_date);
        merge(&mut self.production_date, &input.production_date);
        merge(&mut self.jira_epic_link, &input.jira_epic_link);
        merge(&mut self.notes, &input.notes);
        self.check()
    }

    fn check(&self) -> StorageResult<()> {
        require_not_blank("requestName", &self.request_name)?;
        validate_request_services(self.bau_services.as_deref(), self.uat_services.as_deref())?;
        if let Some(link) = &self.jira_epic_link {
            validate_epic_link(link)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use vtrack_core::types::now;

    use super::*;
    use crate::error::StorageError;

    fn sample() -> Request {
        Request::from_create(
            &CreateRequest {
                id: "REQ-1".into(),
                request_name: "Q3 auth rollout".into(),
                bau_services: Some("auth-service".into()),
                ..Default::default()
            },
            now(),
        )
        .unwrap()
    }

    #[test]
    fn create_requires_a_service_list() {
        let result = Request::from_create(
            &CreateRequest {
                id: "REQ-2".into(),
                request_name: "empty".into(),
                bau_services: Some("   ".into()),
                ..Default::default()
            },
            now(),
        );
        assert_matches!(result, Err(StorageError::Validation(_)));
    }

    #[test]
    fn update_cannot_clear_the_last_service_list() {
        let mut request = sample();
        let result = request.apply_update(&UpdateRequest {
            bau_services: Some(None),
            ..Default::default()
        });
        assert_matches!(result, Err(StorageError::Validation(_)));
    }

    #[test]
    fn explicit_null_clears_and_absent_key_keeps() {
        let mut request = sample();
        request.notes = Some("keep me".into());
        request.jira_epic_link = Some("https://jira.example.com/OPS-1".into());

        let update: UpdateRequest =
            serde_json::from_str(r#"{"jiraEpicLink": null, "uatServices": "user-service"}"#).unwrap();
        request.apply_update(&update).unwrap();

        assert_eq!(request.jira_epic_link, None);
        assert_eq!(request.notes.as_deref(), Some("keep me"));
        assert_eq!(request.uat_services.as_deref(), Some("user-service"));
    }

    #[test]
    fn padded_id_is_rejected_not_rewritten() {
        let input = CreateRequest {
            id: " REQ-4".into(),
            request_name: "padded".into(),
            bau_services: Some("auth-service".into()),
            ..Default::default()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("id"));
        assert_matches!(Request::from_create(&input, now()), Err(StorageError::Validation(_)));
    }

    #[test]
    fn dto_validation_reports_missing_services() {
        let input = CreateRequest {
            id: "REQ-3".into(),
            request_name: "no services".into(),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }
}
