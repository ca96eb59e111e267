//! Request extractors that fail in the response envelope.

use axum::extract::{rejection::JsonRejection, FromRequest, Request};

use crate::error::ApiError;

/// JSON extractor whose rejections answer as envelope validation errors.
///
/// Axum's stock `Json` rejects malformed bodies with a plain-text 4xx.
/// This wrapper turns the same rejection into a 422 envelope carrying
/// the parser's explanation under `data.detail`, matching how handler
/// level validation failures are reported.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::validation(rejection.body_text())),
        }
    }
}
