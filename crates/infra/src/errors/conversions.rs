//! Conversions from external infrastructure errors into domain errors.

use calgentic_domain::CalgenticError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CalgenticError);

impl From<InfraError> for CalgenticError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CalgenticError> for InfraError {
    fn from(value: CalgenticError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoCalgenticError {
    fn into_calgentic(self) -> CalgenticError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CalgenticError */
/* -------------------------------------------------------------------------- */

impl IntoCalgenticError for HttpError {
    fn into_calgentic(self) -> CalgenticError {
        if self.is_timeout() {
            return CalgenticError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return CalgenticError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return CalgenticError::Config(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => CalgenticError::Auth(message),
                400..=499 => CalgenticError::InvalidInput(message),
                _ => CalgenticError::Network(message),
            };
        }

        if self.is_decode() {
            return CalgenticError::Network(format!("undecodable HTTP response: {self}"));
        }

        CalgenticError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_calgentic())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn http_status_401_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: CalgenticError = InfraError::from(error).into();
        match mapped {
            CalgenticError::Auth(msg) => assert!(msg.contains("401")),
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_refused_maps_to_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let mapped: CalgenticError = InfraError::from(error).into();
        match mapped {
            CalgenticError::Network(msg) => assert!(msg.contains("connection")),
            other => panic!("expected network error, got {other:?}"),
        }
    }
}
