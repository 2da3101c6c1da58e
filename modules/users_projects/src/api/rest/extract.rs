use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;

use crate::api::rest::error::{map_json_rejection, map_path_rejection};
use crate::api::rest::problem::ProblemResponse;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Where a request landed: its path (Problem `instance`) and request id.
#[derive(Debug, Clone, Default)]
pub struct RequestCtx {
    pub instance: String,
    pub request_id: Option<String>,
}

impl RequestCtx {
    fn from_head(path: &str, headers: &HeaderMap) -> Self {
        Self {
            instance: path.to_owned(),
            request_id: headers
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
        }
    }
}

impl<S> FromRequestParts<S> for RequestCtx
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_head(parts.uri.path(), &parts.headers))
    }
}

/// `Json<T>` whose rejections render as Problem Details.
///
/// Missing required fields, unknown fields, wrong types and explicit `null`
/// on a patch field all fail deserialization and come back as 422.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = RequestCtx::from_head(req.uri().path(), req.headers());
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(map_json_rejection(&rejection, &ctx)),
        }
    }
}


/// `Path<T>` whose rejections render as Problem Details.
#[derive(Debug, Clone)]
pub struct ValidPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => {
                let ctx = RequestCtx::from_head(parts.uri.path(), &parts.headers);
                Err(map_path_rejection(&rejection, &ctx))
            }
        }
    }
}
