#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod error;
mod request;
pub mod route;

use http_body_util::{BodyExt, Full};
use hyper::{body::Bytes, http::response::Parts, Request as HyperRequest, StatusCode};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client as HyperClient},
    rt::TokioExecutor,
};
use lemonsqueezy_license_models::{
    ErrorResponse, LicenseActivation, LicenseDeactivation, LicenseResponse, LicenseValidation,
};

use crate::{
    error::{DeserializeBodyError, ErrorKind, LicenseError},
    request::Request,
    route::{Route, DEFAULT_BASE_URL},
};

pub use lemonsqueezy_license_models as model;

/// Client for the Lemon Squeezy license API.
///
/// Cloning is cheap and clones share the connection pool. The client holds no
/// other state between calls, so calls can run concurrently.
#[derive(Clone)]
pub struct LicenseClient {
    client: HyperClient<HttpsConnector<HttpConnector>, Full<Bytes>>,
    base_url: String,
    api_key: Option<String>,
}

pub struct LicenseClientBuilder {
    base_url: String,
    api_key: Option<String>,
}

impl LicenseClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }

    /// Override the `.../v1/licenses` base, e.g. to point at a mock server.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Send `Authorization: Bearer <api_key>` with every request.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn build(self) -> LicenseClient {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let client = HyperClient::builder(TokioExecutor::new()).build(connector);
        LicenseClient {
            client,
            base_url: self.base_url,
            api_key: self.api_key,
        }
    }
}

impl Default for LicenseClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LicenseClient {
    #[must_use]
    pub fn new() -> Self {
        LicenseClientBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> LicenseClientBuilder {
        LicenseClientBuilder::new()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Activate a license key and receive an instance id in return.
    ///
    /// `instance_name` is the label the instance gets in Lemon Squeezy.
    ///
    /// # Errors
    ///
    /// See [`LicenseError`] for details.
    #[tracing::instrument(skip_all, fields(route = %Route::Activate))]
    pub async fn activate(
        &self,
        license_key: &str,
        instance_name: &str,
    ) -> Result<LicenseActivation, LicenseError> {
        let request = Request::new()
            .param("license_key", license_key)
            .param("instance_name", instance_name);
        self.execute(Route::Activate, request).await
    }

    /// Deactivate the instance `instance_id` of a license key.
    ///
    /// # Errors
    ///
    /// See [`LicenseError`] for details.
    #[tracing::instrument(skip_all, fields(route = %Route::Deactivate))]
    pub async fn deactivate(
        &self,
        license_key: &str,
        instance_id: &str,
    ) -> Result<LicenseDeactivation, LicenseError> {
        let request = Request::new()
            .param("license_key", license_key)
            .param("instance_id", instance_id);
        self.execute(Route::Deactivate, request).await
    }

    /// Validate a license key, or one instance of it when `instance_id` is given.
    ///
    /// Without an instance id the key itself is validated and the response
    /// carries no instance.
    ///
    /// # Errors
    ///
    /// See [`LicenseError`] for details.
    #[tracing::instrument(skip_all, fields(route = %Route::Validate))]
    pub async fn validate(
        &self,
        license_key: &str,
        instance_id: Option<&str>,
    ) -> Result<LicenseValidation, LicenseError> {
        let request = Request::new()
            .param("license_key", license_key)
            .optional_param("instance_id", instance_id);
        self.execute(Route::Validate, request).await
    }

    async fn execute<T: LicenseResponse>(
        &self,
        route: Route,
        mut request: Request,
    ) -> Result<T, LicenseError> {
        request = request.uri(route.url(&self.base_url));
        if let Some(api_key) = &self.api_key {
            request = request.bearer(api_key).map_err(|source| LicenseError {
                source: Some(Box::new(source)),
                kind: ErrorKind::BuildingRequest,
            })?;
        }
        let request = request.build().map_err(|source| LicenseError {
            source: Some(Box::new(source)),
            kind: ErrorKind::BuildingRequest,
        })?;

        tracing::debug!("sending license request");
        let (parts, bytes) = self.request(request).await?;
        tracing::debug!(status = %parts.status, len = bytes.len(), "received license response");

        let res = decode_response::<T>(Some(parts.status), bytes);
        if let Ok(res) = &res {
            tracing::debug!(outcome = res.outcome(), "license request completed");
        }
        res
    }

    async fn request(
        &self,
        request: HyperRequest<Full<Bytes>>,
    ) -> Result<(Parts, Vec<u8>), LicenseError> {
        let res = self
            .client
            .request(request)
            .await
            .map_err(|source| LicenseError {
                source: Some(Box::new(source)),
                kind: ErrorKind::Sending,
            })?;

        let (parts, body) = res.into_parts();
        let bytes = body
            .collect()
            .await
            .map_err(|source| LicenseError {
                source: Some(Box::new(source)),
                kind: ErrorKind::ChunkingResponse,
            })?
            .to_bytes();

        Ok((parts, bytes.into()))
    }
}

impl Default for LicenseClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify a complete response into a decoded body or a [`LicenseError`].
///
/// A 2xx body must match `T`. Any other status is a server-reported error,
/// carrying the `error` field of the body when there is one.
fn decode_response<T: LicenseResponse>(
    status: Option<StatusCode>,
    bytes: Vec<u8>,
) -> Result<T, LicenseError> {
    let Some(status) = status else {
        return Err(LicenseError {
            source: None,
            kind: ErrorKind::MalformedResponse,
        });
    };

    if status.is_success() {
        return serde_json::from_slice::<T>(&bytes).map_err(|source| LicenseError {
            source: Some(Box::new(DeserializeBodyError {
                source: Some(Box::new(source)),
                bytes,
            })),
            kind: ErrorKind::MalformedResponse,
        });
    }

    let message = serde_json::from_slice::<ErrorResponse>(&bytes)
        .ok()
        .map(|body| body.error);
    Err(LicenseError {
        source: None,
        kind: ErrorKind::Response { status, message },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lemonsqueezy_license_models::LicenseKeyStatus;

    const VALIDATION: &str = r#"{
        "valid": true,
        "license_key": {
            "id": 1,
            "status": "active",
            "key": "test-key",
            "activation_limit": 1,
            "activation_usage": 1,
            "created_at": "2021-04-06T14:15:07.000000Z",
            "expires_at": null
        },
        "instance": null,
        "meta": null
    }"#;

    #[test]
    fn success_test() {
        let res =
            decode_response::<LicenseValidation>(Some(StatusCode::OK), VALIDATION.into()).unwrap();
        assert!(res.valid);
        assert_eq!(
            res.license_key.map(|key| key.status),
            Some(LicenseKeyStatus::Active)
        );
        assert!(res.instance.is_none());
    }

    #[test]
    fn missing_status_is_malformed() {
        let err = decode_response::<LicenseValidation>(None, VALIDATION.into()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedResponse));
    }

    #[test]
    fn bad_success_body_is_malformed() {
        let body = VALIDATION.replace("\"active\"", "\"unknown_value\"");
        let err =
            decode_response::<LicenseValidation>(Some(StatusCode::OK), body.into()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedResponse));
        assert!(!err.is_transport());

        let err = decode_response::<LicenseValidation>(Some(StatusCode::CREATED), b"<html>".to_vec())
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedResponse));
    }

    #[test]
    fn server_error_with_message() {
        let err = decode_response::<LicenseActivation>(
            Some(StatusCode::BAD_REQUEST),
            br#"{"error": "Invalid license key"}"#.to_vec(),
        )
        .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.message(), Some("Invalid license key"));
    }

    #[test]
    fn server_error_without_message() {
        let err = decode_response::<LicenseDeactivation>(
            Some(StatusCode::INTERNAL_SERVER_ERROR),
            b"<html>oops</html>".to_vec(),
        )
        .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(err.message(), None);

        // A redirect is outside 2xx too, and a success-shaped body is not an error message.
        let err = decode_response::<LicenseValidation>(
            Some(StatusCode::MOVED_PERMANENTLY),
            VALIDATION.into(),
        )
        .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::MOVED_PERMANENTLY));
        assert_eq!(err.message(), None);
    }

    #[test]
    fn builder_test() {
        let client = LicenseClient::new();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);

        let client = LicenseClient::builder()
            .base_url("http://127.0.0.1:3000/v1/licenses/")
            .api_key("secret")
            .build();
        assert_eq!(client.base_url(), "http://127.0.0.1:3000/v1/licenses");
    }
}
