//! Request-body extractor that validates before the handler runs.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body that has been deserialized and passed [`Validate`].
///
/// Unlike [`Json`], malformed bodies and unknown enum literals are rejected
/// with 400 rather than 422, and field validation failures carry per-field
/// details.
///
/// ```ignore
/// async fn create(ValidatedJson(input): ValidatedJson<CreateService>) -> AppResult<..> {
///     // input.name is guaranteed non-blank here
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
