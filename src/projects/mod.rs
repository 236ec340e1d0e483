pub mod aggregate;
pub mod error;
pub mod introspect;
pub mod normalize;
pub mod query;
pub mod snapshot;
pub mod views;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

pub use error::ProjectError;
pub use snapshot::{FetchOptions, SnapshotAssembler};

pub const DEFAULT_API_URL: &str = "https://api.github.com/graphql";

/// Sends one GraphQL document and returns its `data` member.
///
/// Implementations fail on transport errors and on a non-empty `errors`
/// array. Callers never retry.
#[async_trait]
pub trait GraphqlExecutor: Send + Sync {
    async fn execute(&self, query: &str, variables: Option<Value>) -> Result<Value>;
}

/// Executes and decodes `data` into `T`.
pub async fn execute_as<T: DeserializeOwned>(
    executor: &dyn GraphqlExecutor,
    query: &str,
    variables: Option<Value>,
) -> Result<T> {
    let data = executor.execute(query, variables).await?;
    serde_json::from_value(data).context("Failed to decode GraphQL data")
}

#[derive(Deserialize)]
struct GqlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GqlError>,
}

#[derive(Deserialize)]
struct GqlError {
    message: String,
}

/// Executor posting to the GitHub GraphQL endpoint with a bearer token.
pub struct HttpExecutor {
    api_url: String,
    token: String,
    client: reqwest::Client,
}

impl HttpExecutor {
    pub fn new(api_url: String, token: String) -> Self {
        Self {
            api_url,
            token,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl GraphqlExecutor for HttpExecutor {
    async fn execute(&self, query: &str, variables: Option<Value>) -> Result<Value> {
        let mut body = serde_json::json!({ "query": query });
        if let Some(vars) = variables {
            body["variables"] = vars;
        }

        let resp = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", concat!("project-lens/", env!("CARGO_PKG_VERSION")))
            .json(&body)
            .send()
            .await
            .context("GraphQL request failed")?;

        let status = resp.status();
        let gql: GqlResponse = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse GraphQL response (HTTP {status})"))?;

        into_data(gql)
    }
}

fn into_data(gql: GqlResponse) -> Result<Value> {
    if !gql.errors.is_empty() {
        let messages: Vec<String> = gql.errors.into_iter().map(|e| e.message).collect();
        return Err(ProjectError::Graphql(messages.join("; ")).into());
    }
    gql.data.ok_or_else(|| ProjectError::EmptyResponse.into())
}


#[cfg(test)]
mod executor_tests {
    use super::*;

    #[test]
    fn errors_array_becomes_graphql_error() {
        let gql: GqlResponse = serde_json::from_str(
            r#"{"data":null,"errors":[{"message":"a"},{"message":"b"}]}"#,
        )
        .unwrap();
        let err = into_data(gql).unwrap_err();
        assert_eq!(err.to_string(), "GraphQL error: a; b");
    }

    #[test]
    fn missing_data_is_empty_response() {
        let gql: GqlResponse = serde_json::from_str("{}").unwrap();
        let err = into_data(gql).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ProjectError>().map(ProjectError::code),
            Some("EMPTY_RESPONSE")
        );
    }

    struct FixedExecutor(Value);

    #[async_trait]
    impl GraphqlExecutor for FixedExecutor {
        async fn execute(&self, _query: &str, _variables: Option<Value>) -> Result<Value> {
            Ok(self.0.clone())
        }
    }

    #[derive(Deserialize)]
    struct Viewer {
        login: String,
    }

    #[tokio::test]
    async fn execute_as_decodes_data() {
        let executor = FixedExecutor(serde_json::json!({ "login": "octo" }));
        let viewer: Viewer = execute_as(&executor, "query { viewer { login } }", None)
            .await
            .unwrap();
        assert_eq!(viewer.login, "octo");

        let bad: Result<Vec<String>> = execute_as(&executor, "query {}", None).await;
        assert!(bad.is_err());
    }

    #[test]
    fn data_passes_through() {
        let gql: GqlResponse = serde_json::from_str(r#"{"data":{"x":1}}"#).unwrap();
        assert_eq!(into_data(gql).unwrap()["x"], 1);
    }
}
