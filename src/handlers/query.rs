//! `data` query parameter decoding.
//!
//! List endpoints take their filter as a JSON document in a single `data`
//! query parameter (`?data={"status":"INVITED"}`). [`DataQuery`] decodes it
//! into a typed filter and rejects malformed input with a 400.

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::{ApiError, validation_error};

#[derive(Debug, Deserialize)]
struct RawDataQuery {
    data: Option<String>,
}

/// Typed filter decoded from the `data` query parameter. An absent or empty
/// parameter yields `T::default()`.
#[derive(Debug, Clone, Default)]
pub struct DataQuery<T>(pub T);

impl<T> DataQuery<T>
where
    T: DeserializeOwned + Default,
{
    fn decode(raw: Option<&str>) -> Result<T, ApiError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(T::default()),
            Some(raw) => serde_json::from_str(raw).map_err(|err| {
                validation_error(
                    "Invalid data query parameter",
                    json!({ "data": err.to_string() }),
                )
            }),
        }
    }
}

impl<S, T> FromRequestParts<S> for DataQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<RawDataQuery>::try_from_uri(&parts.uri).map_err(|err| {
            validation_error(
                "Invalid query string",
                json!({ "query": err.body_text() }),
            )
        })?;

        Self::decode(raw.data.as_deref()).map(DataQuery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Filter {
        status: Option<String>,
        limit: Option<u32>,
    }

    async fn extract(uri: &str) -> Result<Filter, ApiError> {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        DataQuery::<Filter>::from_request_parts(&mut parts, &())
            .await
            .map(|DataQuery(filter)| filter)
    }

    #[tokio::test]
    async fn missing_data_yields_default() {
        assert_eq!(extract("/api/invite").await.unwrap(), Filter::default());
        assert_eq!(extract("/api/invite?data=").await.unwrap(), Filter::default());
    }

    #[tokio::test]
    async fn data_is_decoded_into_the_filter() {
        let filter = extract("/api/invite?data=%7B%22status%22%3A%22INVITED%22%2C%22limit%22%3A5%7D")
            .await
            .unwrap();
        assert_eq!(filter.status.as_deref(), Some("INVITED"));
        assert_eq!(filter.limit, Some(5));
    }

    #[tokio::test]
    async fn malformed_data_is_a_validation_error() {
        let err = extract("/api/invite?data=%7Bnot-json").await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(&*err.code, "VALIDATION_FAILED");
        assert!(err.details.is_some());
    }
}
