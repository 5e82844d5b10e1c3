//! Conversions from external infrastructure errors into domain errors.

use redis::{ErrorKind as RedisErrorKind, RedisError};
use reqwest::Error as HttpError;
use sessiongate_common::auth::OAuthClientError;
use sessiongate_domain::SessionGateError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SessionGateError);

impl From<InfraError> for SessionGateError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SessionGateError> for InfraError {
    fn from(value: SessionGateError) -> Self {
        InfraError(value)
    }
}

trait IntoSessionGateError {
    fn into_session_gate(self) -> SessionGateError;
}

/// Whether a store error means the current connection can no longer be used.
///
/// Callers mark the connection as disconnected so the next operation dials
/// again.
#[must_use]
pub fn is_disconnect(err: &RedisError) -> bool {
    err.is_io_error()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
        || err.is_timeout()
}

/* -------------------------------------------------------------------------- */
/* redis::RedisError → SessionGateError */
/* -------------------------------------------------------------------------- */

impl IntoSessionGateError for RedisError {
    fn into_session_gate(self) -> SessionGateError {
        if is_disconnect(&self) {
            return SessionGateError::StoreUnavailable(format!("connection lost: {self}"));
        }

        match self.kind() {
            RedisErrorKind::AuthenticationFailed => {
                SessionGateError::StoreUnavailable("authentication rejected by store".into())
            }
            RedisErrorKind::TypeError => {
                SessionGateError::Serialization(format!("unexpected store reply: {self}"))
            }
            RedisErrorKind::InvalidClientConfig => {
                SessionGateError::StoreUnavailable(format!("invalid store address: {self}"))
            }
            RedisErrorKind::BusyLoadingError | RedisErrorKind::TryAgain => {
                SessionGateError::StoreUnavailable(format!("store not ready: {self}"))
            }
            _ => SessionGateError::StoreUnavailable(self.to_string()),
        }
    }
}

impl From<RedisError> for InfraError {
    fn from(value: RedisError) -> Self {
        InfraError(value.into_session_gate())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SessionGateError */
/* -------------------------------------------------------------------------- */

impl IntoSessionGateError for HttpError {
    fn into_session_gate(self) -> SessionGateError {
        if self.is_timeout() {
            return SessionGateError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return SessionGateError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => SessionGateError::InteractionRequired(message),
                _ => SessionGateError::Network(message),
            };
        }

        if self.is_decode() {
            return SessionGateError::Serialization(self.to_string());
        }

        SessionGateError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_session_gate())
    }
}

/* -------------------------------------------------------------------------- */
/* OAuthClientError → SessionGateError */
/* -------------------------------------------------------------------------- */

impl IntoSessionGateError for OAuthClientError {
    fn into_session_gate(self) -> SessionGateError {
        if self.requires_interaction() {
            return SessionGateError::InteractionRequired(self.to_string());
        }

        match self {
            OAuthClientError::RequestFailed(err) => err.into_session_gate(),
            OAuthClientError::ConfigError(message) => SessionGateError::Config(message),
            other => SessionGateError::TokenAcquisition(other.to_string()),
        }
    }
}

impl From<OAuthClientError> for InfraError {
    fn from(value: OAuthClientError) -> Self {
        InfraError(value.into_session_gate())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use sessiongate_common::auth::OAuthError;
    use tokio::runtime::Runtime;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn oauth_error(code: &str) -> OAuthClientError {
        OAuthClientError::OAuth(OAuthError {
            error: code.to_string(),
            error_description: Some("from test".to_string()),
        })
    }

    #[test]
    fn redis_io_error_maps_to_store_unavailable() {
        let err = RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        ));
        assert!(is_disconnect(&err));

        let mapped: SessionGateError = InfraError::from(err).into();
        match mapped {
            SessionGateError::StoreUnavailable(msg) => assert!(msg.contains("connection lost")),
            other => panic!("expected store unavailable, got {:?}", other),
        }
    }

    #[test]
    fn redis_auth_failure_maps_to_store_unavailable() {
        let err = RedisError::from((RedisErrorKind::AuthenticationFailed, "WRONGPASS"));
        assert!(!is_disconnect(&err));

        let mapped: SessionGateError = InfraError::from(err).into();
        assert!(matches!(mapped, SessionGateError::StoreUnavailable(msg) if msg.contains("authentication")));
    }

    #[test]
    fn redis_type_error_maps_to_serialization() {
        let err = RedisError::from((RedisErrorKind::TypeError, "response was nil"));
        let mapped: SessionGateError = InfraError::from(err).into();
        assert!(matches!(mapped, SessionGateError::Serialization(_)));
    }

    #[test]
    fn redis_invalid_client_config_maps_to_store_unavailable() {
        let err = RedisError::from((RedisErrorKind::InvalidClientConfig, "bad port"));
        let mapped: SessionGateError = InfraError::from(err).into();
        assert!(matches!(mapped, SessionGateError::StoreUnavailable(msg) if msg.contains("invalid store address")));
    }

    #[test]
    fn oauth_invalid_grant_maps_to_interaction_required() {
        let mapped: SessionGateError = InfraError::from(oauth_error("invalid_grant")).into();
        assert!(matches!(mapped, SessionGateError::InteractionRequired(_)));
        assert!(mapped.is_unauthenticated());

        let mapped: SessionGateError = InfraError::from(OAuthClientError::NoRefreshToken).into();
        assert!(matches!(mapped, SessionGateError::InteractionRequired(_)));
    }

    #[test]
    fn oauth_server_error_maps_to_token_acquisition() {
        let mapped: SessionGateError = InfraError::from(oauth_error("temporarily_unavailable")).into();
        assert!(matches!(mapped, SessionGateError::TokenAcquisition(_)));

        let mapped: SessionGateError =
            InfraError::from(OAuthClientError::ParseError("missing access_token".into())).into();
        assert!(matches!(mapped, SessionGateError::TokenAcquisition(_)));
    }

    #[test]
    fn http_status_503_maps_to_network_error() {
        Runtime::new().unwrap().block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(StatusCode::SERVICE_UNAVAILABLE))
                .mount(&server)
                .await;

            let client = Client::builder().no_proxy().build().unwrap();
            let error =
                client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

            let mapped: SessionGateError = InfraError::from(error).into();
            match mapped {
                SessionGateError::Network(msg) => assert!(msg.contains("503")),
                other => panic!("expected network error, got {:?}", other),
            }
        });
    }

    #[test]
    fn http_status_404_maps_to_network_error() {
        Runtime::new().unwrap().block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(StatusCode::NOT_FOUND))
                .mount(&server)
                .await;

            let client = Client::builder().no_proxy().build().unwrap();
            let error =
                client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

            let mapped: SessionGateError = InfraError::from(error).into();
            assert!(matches!(mapped, SessionGateError::Network(msg) if msg.contains("404")));
        });
    }
}
