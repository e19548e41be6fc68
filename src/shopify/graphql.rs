use crate::http::{HttpSettings, build_client};
use crate::shopify::ShopifyError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct GraphqlClient {
    http: Client,
    endpoint: String,
    access_token: String,
}

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a, V> {
    query: &'a str,
    variables: V,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// Field-level validation error returned by a mutation payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(path) if !path.is_empty() => write!(f, "{}: {}", path.join("."), self.message),
            _ => f.write_str(&self.message),
        }
    }
}

impl<T> GraphqlResponse<T> {
    /// Top-level `errors` win over any partial `data`.
    pub fn into_data(self, operation: &'static str) -> Result<T, ShopifyError> {
        if !self.errors.is_empty() {
            let joined = self
                .errors
                .iter()
                .map(|err| err.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ShopifyError::Graphql(joined));
        }
        self.data.ok_or(ShopifyError::MissingData(operation))
    }
}

/// Fails when the mutation reported any `userErrors`.
pub fn reject_user_errors(errors: Vec<UserError>) -> Result<(), ShopifyError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ShopifyError::UserErrors(errors))
    }
}

impl GraphqlClient {
    pub fn new(endpoint: String, access_token: String, http: &HttpSettings) -> Self {
        Self {
            http: build_client(http),
            endpoint,
            access_token,
        }
    }

    pub async fn execute<V, T>(
        &self,
        operation: &'static str,
        query: &str,
        variables: V,
    ) -> Result<T, ShopifyError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", &self.access_token)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|err| ShopifyError::Request(err.to_string()))?;

        if !response.status().is_success() {
            return Err(ShopifyError::Http(response.status().as_u16()));
        }

        let payload: GraphqlResponse<T> = response
            .json()
            .await
            .map_err(|err| ShopifyError::Decode(err.to_string()))?;
        payload.into_data(operation)
    }
}
