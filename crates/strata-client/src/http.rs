//! JSON-over-HTTP gateway transport.
//!
//! Opening a session is two steps, mirroring how callers report failures:
//! [`HttpConnector::probe`] only checks that the gateway answers, and
//! [`HttpConnector::login`] exchanges credentials for a session token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::connection::{Connection, ErrorStack};
use crate::error::{ClientError, ClientResult};
use crate::model::{
    AdminArgs, ErrorMessage, GeneralQueryReply, GridValue, ReplicaModification, SimpleQueryReply,
    SimpleQueryRequest, UserIdentity,
};
use crate::status::Status;

/// Header carrying the session token on every authenticated request.
pub const HEADER_SESSION: &str = "x-strata-session";
/// Header carrying the per-process request identifier.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// Where and as whom to connect.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Gateway base URL, e.g. `http://catalog.example.org:1247`.
    pub base_url: Url,
    /// User to authenticate as.
    pub user: String,
    /// Zone of that user.
    pub zone: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Gateway version information returned by the probe.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerInfo {
    /// Server release string.
    #[serde(default)]
    pub version: String,
}

/// Reachable but not yet authenticated gateway.
#[derive(Debug)]
pub struct HttpConnector {
    client: Client,
    config: ConnectionConfig,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    user: &'a str,
    zone: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginReply {
    token: String,
}

#[derive(Serialize)]
struct GeneralQueryRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    zone_hint: Option<&'a str>,
}

#[derive(Deserialize)]
struct StatusReply {
    status: Status,
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(flatten)]
    body: T,
    #[serde(default)]
    errors: Vec<ErrorMessage>,
}

impl HttpConnector {
    /// Build the HTTP client used for the whole session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connect`] if the HTTP client cannot be built.
    pub fn new(config: ConnectionConfig) -> ClientResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = Uuid::new_v4().to_string();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            default_headers.insert(HEADER_REQUEST_ID, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|source| ClientError::Connect {
                endpoint: config.base_url.to_string(),
                source,
            })?;

        Ok(Self { client, config })
    }

    /// Check that the gateway answers.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connect`] when the gateway is unreachable and
    /// [`ClientError::Protocol`] when it answers with a failure.
    pub async fn probe(&self) -> ClientResult<ServerInfo> {
        let url = endpoint(&self.config.base_url, "/v1/server")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ClientError::Connect {
                endpoint: self.config.base_url.to_string(),
                source,
            })?;
        if !response.status().is_success() {
            return Err(ClientError::Protocol {
                operation: "server probe",
                status: response.status().as_u16(),
            });
        }
        response
            .json::<ServerInfo>()
            .await
            .map_err(|source| ClientError::Decode {
                operation: "server probe",
                source,
            })
    }

    /// Exchange credentials for an authenticated session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Authentication`] when the gateway rejects the
    /// credentials, or a transport error when the exchange fails.
    pub async fn login(self, password: &str) -> ClientResult<HttpConnection> {
        let url = endpoint(&self.config.base_url, "/v1/session")?;
        let response = self
            .client
            .post(url)
            .json(&LoginRequest {
                user: &self.config.user,
                zone: &self.config.zone,
                password,
            })
            .send()
            .await
            .map_err(|source| ClientError::Connect {
                endpoint: self.config.base_url.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ClientError::Authentication {
                    user: self.config.user,
                    zone: self.config.zone,
                });
            }
            status if !status.is_success() => {
                return Err(ClientError::Protocol {
                    operation: "login",
                    status: status.as_u16(),
                });
            }
            _ => {}
        }

        let reply = response
            .json::<LoginReply>()
            .await
            .map_err(|source| ClientError::Decode {
                operation: "login",
                source,
            })?;
        tracing::debug!(user = %self.config.user, zone = %self.config.zone, "session established");

        Ok(HttpConnection {
            client: self.client,
            base_url: self.config.base_url,
            session: reply.token,
            user: UserIdentity {
                name: self.config.user,
                zone: self.config.zone,
            },
            errors: ErrorStack::default(),
        })
    }
}

/// Authenticated gateway session.
#[derive(Debug)]
pub struct HttpConnection {
    client: Client,
    base_url: Url,
    session: String,
    user: UserIdentity,
    errors: ErrorStack,
}

impl HttpConnection {
    async fn post<B, T>(&mut self, operation: &'static str, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let url = endpoint(&self.base_url, path)?;
        tracing::trace!(operation, %url, "issuing request");
        let response = self
            .client
            .post(url)
            .header(HEADER_SESSION, &self.session)
            .json(body)
            .send()
            .await
            .map_err(|source| ClientError::Transport { operation, source })?;
        self.decode(operation, response).await
    }

    async fn get<T: DeserializeOwned + Send>(
        &mut self,
        operation: &'static str,
        path: &str,
    ) -> ClientResult<T> {
        let url = endpoint(&self.base_url, path)?;
        tracing::trace!(operation, %url, "issuing request");
        let response = self
            .client
            .get(url)
            .header(HEADER_SESSION, &self.session)
            .send()
            .await
            .map_err(|source| ClientError::Transport { operation, source })?;
        self.decode(operation, response).await
    }

    async fn decode<T: DeserializeOwned + Send>(
        &mut self,
        operation: &'static str,
        response: Response,
    ) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Protocol {
                operation,
                status: status.as_u16(),
            });
        }
        let envelope = response
            .json::<Envelope<T>>()
            .await
            .map_err(|source| ClientError::Decode { operation, source })?;
        self.errors.extend(envelope.errors);
        Ok(envelope.body)
    }
}

#[async_trait]
impl Connection for HttpConnection {
    fn client_user(&self) -> &UserIdentity {
        &self.user
    }

    async fn general_admin(&mut self, args: &AdminArgs) -> ClientResult<Status> {
        let reply: StatusReply = self
            .post("general admin", "/v1/admin/general", &AdminCall { args })
            .await?;
        Ok(reply.status)
    }

    async fn user_admin(&mut self, args: &AdminArgs) -> ClientResult<Status> {
        let reply: StatusReply = self
            .post("user admin", "/v1/admin/user", &AdminCall { args })
            .await?;
        Ok(reply.status)
    }

    async fn simple_query(
        &mut self,
        request: &SimpleQueryRequest,
    ) -> ClientResult<SimpleQueryReply> {
        self.post("simple query", "/v1/query/simple", request).await
    }

    async fn general_query(
        &mut self,
        query: &str,
        zone_hint: Option<&str>,
    ) -> ClientResult<GeneralQueryReply> {
        self.post(
            "general query",
            "/v1/query/general",
            &GeneralQueryRequest { query, zone_hint },
        )
        .await
    }

    async fn modify_replica(&mut self, request: &ReplicaModification) -> ClientResult<Status> {
        let reply: StatusReply = self
            .post("modify replica", "/v1/replicas/modify", request)
            .await?;
        Ok(reply.status)
    }

    async fn grid_configuration_value(
        &mut self,
        namespace: &str,
        option: &str,
    ) -> ClientResult<GridValue> {
        let path = format!("/v1/grid-configuration/{namespace}/{option}");
        self.get("grid configuration", &path).await
    }

    fn error_stack(&self) -> &ErrorStack {
        &self.errors
    }

    fn clear_error_stack(&mut self) {
        self.errors.clear();
    }

    async fn disconnect(&mut self) -> ClientResult<()> {
        let url = endpoint(&self.base_url, "/v1/session")?;
        let response = self
            .client
            .delete(url)
            .header(HEADER_SESSION, &self.session)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                operation: "disconnect",
                source,
            })?;
        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(user = %self.user, "session closed");
            Ok(())
        } else {
            Err(ClientError::Protocol {
                operation: "disconnect",
                status: response.status().as_u16(),
            })
        }
    }
}

#[derive(Serialize)]
struct AdminCall<'a> {
    args: &'a AdminArgs,
}

fn endpoint(base: &Url, path: &str) -> ClientResult<Url> {
    base.join(path).map_err(|source| ClientError::Endpoint {
        endpoint: format!("{base}{}", path.trim_start_matches('/')),
        source,
    })
}
