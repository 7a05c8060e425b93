//! HTTP transport for GraphQL requests.
//!
//! The client talks to AniList only through [`Transport`], so every request
//! cycle (with or without a bearer token) goes through one function.

use std::future::Future;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::error::AniListError;

pub const API_URL: &str = "https://graphql.anilist.co";

/// A GraphQL request body: `{"query": ..., "variables": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest<'a> {
    /// Name used in logs only, not sent.
    #[serde(skip)]
    pub operation: &'a str,
    pub query: &'a str,
    pub variables: Value,
}

/// Sends one GraphQL request and returns the decoded JSON body.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: &GraphQLRequest<'_>,
        access_token: Option<&str>,
    ) -> impl Future<Output = Result<Value, AniListError>> + Send;
}

/// reqwest-backed transport posting to a single GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            endpoint: API_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Use a different GraphQL endpoint (must be an absolute URL).
    pub fn with_endpoint(endpoint: &str) -> Result<Self, AniListError> {
        let url = Url::parse(endpoint)?;
        Ok(Self {
            endpoint: url.into(),
            http: Client::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    async fn execute(
        &self,
        request: &GraphQLRequest<'_>,
        access_token: Option<&str>,
    ) -> Result<Value, AniListError> {
        let operation = request.operation;
        tracing::debug!(operation, "AniList GraphQL request");

        let mut builder = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(request);
        if let Some(token) = access_token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;

        tracing::debug!(operation, status, "AniList response received");
        classify_response(operation, status, &body)
    }
}

/// Turn a raw HTTP status and body into a JSON document or an error.
///
/// AniList reports a single-object miss as HTTP 404 with a GraphQL `errors`
/// body where every entry has `status: 404`. That body is passed through so
/// the client can treat it as not-found. Any other non-2xx status is an error.
pub(crate) fn classify_response(
    operation: &str,
    status: u16,
    body: &str,
) -> Result<Value, AniListError> {
    if (200..300).contains(&status) {
        return serde_json::from_str(body).map_err(|e| AniListError::Parse(e.to_string()));
    }

    if status == 404 {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            if is_not_found_payload(&value) {
                tracing::debug!(operation, "AniList reported not found");
                return Ok(value);
            }
        }
    }

    tracing::warn!(operation, status, "AniList API error");
    Err(AniListError::Api {
        status,
        message: body.to_string(),
    })
}

fn is_not_found_payload(value: &Value) -> bool {
    value
        .get("errors")
        .and_then(Value::as_array)
        .is_some_and(|errors| {
            !errors.is_empty()
                && errors
                    .iter()
                    .all(|e| e.get("status").and_then(Value::as_u64) == Some(404))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_body_is_parsed() {
        let value = classify_response("Test", 200, r#"{"data":{"User":{"id":7}}}"#).unwrap();
        assert_eq!(value["data"]["User"]["id"], 7);
    }

    #[test]
    fn test_malformed_success_body_is_parse_error() {
        let err = classify_response("Test", 200, "<html>").unwrap_err();
        assert!(matches!(err, AniListError::Parse(_)));
    }

    #[test]
    fn test_graphql_not_found_passes_through() {
        let body = r#"{"errors":[{"message":"Not Found.","status":404}],"data":{"Media":null}}"#;
        let value = classify_response("Test", 404, body).unwrap();
        assert!(value["data"]["Media"].is_null());
    }

    #[test]
    fn test_plain_404_is_api_error() {
        let err = classify_response("Test", 404, "Not Found").unwrap_err();
        assert!(matches!(err, AniListError::Api { status: 404, .. }));
    }

    #[test]
    fn test_mixed_errors_on_404_is_api_error() {
        let body = r#"{"errors":[{"message":"Not Found.","status":404},{"message":"boom","status":500}]}"#;
        let err = classify_response("Test", 404, body).unwrap_err();
        assert!(matches!(err, AniListError::Api { status: 404, .. }));
    }

    #[test]
    fn test_server_error_keeps_body() {
        let err = classify_response("Test", 500, "oops").unwrap_err();
        match err {
            AniListError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_request_serializes_without_operation() {
        let req = GraphQLRequest {
            operation: "User",
            query: "query { x }",
            variables: serde_json::json!({ "name": "a" }),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "query": "query { x }", "variables": { "name": "a" } })
        );
    }

    #[test]
    fn test_endpoint_validation() {
        assert!(HttpTransport::with_endpoint("not a url").is_err());
        let transport = HttpTransport::with_endpoint("http://localhost:8080/graphql").unwrap();
        assert_eq!(transport.endpoint(), "http://localhost:8080/graphql");
        assert_eq!(HttpTransport::new().endpoint(), API_URL);
    }
}
