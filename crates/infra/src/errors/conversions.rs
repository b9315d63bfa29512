//! Conversions from external infrastructure errors into domain errors.

use confluence_domain::ConfluenceError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use toml::de::Error as TomlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ConfluenceError);

impl From<InfraError> for ConfluenceError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ConfluenceError> for InfraError {
    fn from(value: ConfluenceError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoConfluenceError {
    fn into_confluence(self) -> ConfluenceError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ConfluenceError */
/* -------------------------------------------------------------------------- */

impl IntoConfluenceError for HttpError {
    fn into_confluence(self) -> ConfluenceError {
        let url = self.url().map(|url| format!(" ({url})")).unwrap_or_default();

        if self.is_timeout() {
            return ConfluenceError::Transport(format!("HTTP request timed out{url}"));
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return ConfluenceError::Transport(format!("HTTP connection failure{url}: {self}"));
        }

        if self.is_builder() {
            return ConfluenceError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        ConfluenceError::Transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_confluence())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / toml → ConfluenceError (configuration files) */
/* -------------------------------------------------------------------------- */

impl IntoConfluenceError for JsonError {
    fn into_confluence(self) -> ConfluenceError {
        ConfluenceError::Config(format!("Invalid JSON format: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_confluence())
    }
}

impl IntoConfluenceError for TomlError {
    fn into_confluence(self) -> ConfluenceError {
        ConfluenceError::Config(format!("Invalid TOML format: {self}"))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(value.into_confluence())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::Client;

    use super::*;

    #[tokio::test]
    async fn connection_refused_maps_to_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let mapped: ConfluenceError = InfraError::from(error).into();
        match mapped {
            ConfluenceError::Transport(msg) => assert!(msg.contains("connection")),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_json_maps_to_config_error() {
        let error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let mapped: ConfluenceError = InfraError::from(error).into();
        assert!(matches!(mapped, ConfluenceError::Config(msg) if msg.contains("JSON")));
    }

    #[test]
    fn invalid_toml_maps_to_config_error() {
        let error = toml::from_str::<toml::Table>("= broken").unwrap_err();
        let mapped: ConfluenceError = InfraError::from(error).into();
        assert!(matches!(mapped, ConfluenceError::Config(msg) if msg.contains("TOML")));
    }
}
