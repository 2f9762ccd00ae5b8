use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::response::AppError;

/// JSON body extractor whose rejections use the API error envelope.
///
/// Shape errors (missing field, wrong type) keep serde's message so clients
/// can see which field was wrong; everything else gets a generic message.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_string();
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(value)| JsonBody(value))
            .map_err(|rejection| rejection_to_app_error(&path, rejection))
    }
}

fn rejection_to_app_error(path: &str, rejection: JsonRejection) -> AppError {
    let (kind, message) = match &rejection {
        JsonRejection::JsonDataError(e) => ("data", e.body_text()),
        JsonRejection::JsonSyntaxError(_) => ("syntax", "Request body is not valid JSON".to_string()),
        JsonRejection::MissingJsonContentType(_) => (
            "content_type",
            "Expected a request body with content-type application/json".to_string(),
        ),
        _ => ("body", "Request body could not be read".to_string()),
    };
    tracing::warn!(path, kind, error = %rejection, "rejected JSON body");
    AppError::bad_request("INVALID_REQUEST_BODY", &message)
}
