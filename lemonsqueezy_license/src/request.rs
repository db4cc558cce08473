use http_body_util::Full;
use hyper::{
    body::Bytes,
    header::{HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE},
    HeaderMap, Method, Request as HyperRequest,
};

/// Builder for the form-encoded POST requests the license endpoints accept.
pub struct Request {
    uri: Option<String>,
    method: Method,
    headers: HeaderMap,
    form: Vec<(&'static str, String)>,
}

impl Request {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uri: None,
            method: Method::POST,
            headers: HeaderMap::new(),
            form: Vec::new(),
        }
    }

    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<HeaderName>, value: impl Into<HeaderValue>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn bearer(self, token: &str) -> Result<Self, hyper::http::Error> {
        let mut value = HeaderValue::try_from(format!("Bearer {token}"))?;
        value.set_sensitive(true);
        Ok(self.header(AUTHORIZATION, value))
    }

    #[must_use]
    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.form.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn optional_param(self, name: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }

    /// The `key=value&...` body, percent-encoded, in insertion order.
    pub fn encoded_form(&self) -> Result<String, serde_urlencoded::ser::Error> {
        serde_urlencoded::to_string(&self.form)
    }

    pub fn build(self) -> Result<HyperRequest<Full<Bytes>>, BuildError> {
        let body = self.encoded_form()?;

        let mut builder = HyperRequest::builder()
            .uri(self.uri.unwrap_or_default())
            .method(self.method)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .header(CONTENT_LENGTH, body.len());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(self.headers);
        }

        Ok(builder.body(Full::new(Bytes::from(body)))?)
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub enum BuildError {
    Encoding(serde_urlencoded::ser::Error),
    Http(hyper::http::Error),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Encoding(err) => write!(f, "Encoding Error - {err}"),
            BuildError::Http(err) => write!(f, "Http Error - {err}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Encoding(err) => Some(err),
            BuildError::Http(err) => Some(err),
        }
    }
}

impl From<serde_urlencoded::ser::Error> for BuildError {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        BuildError::Encoding(err)
    }
}

impl From<hyper::http::Error> for BuildError {
    fn from(err: hyper::http::Error) -> Self {
        BuildError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_order_test() {
        let request = Request::new()
            .param("license_key", "test-key")
            .param("instance_name", "Test Instance");
        assert_eq!(
            request.encoded_form().unwrap(),
            "license_key=test-key&instance_name=Test+Instance"
        );
    }

    #[test]
    fn form_escapes_separators() {
        let request = Request::new().param("license_key", "a&b=c");
        assert_eq!(request.encoded_form().unwrap(), "license_key=a%26b%3Dc");
    }

    #[test]
    fn optional_param_test() {
        let without = Request::new()
            .param("license_key", "test-key")
            .optional_param("instance_id", None::<&str>);
        let with = Request::new()
            .param("license_key", "test-key")
            .optional_param("instance_id", Some("x"));
        assert_eq!(without.encoded_form().unwrap(), "license_key=test-key");
        assert_eq!(
            with.encoded_form().unwrap(),
            "license_key=test-key&instance_id=x"
        );
    }

    #[test]
    fn build_test() {
        let request = Request::new()
            .uri("https://api.lemonsqueezy.com/v1/licenses/validate")
            .param("license_key", "test-key")
            .bearer("secret")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(
            request.uri(),
            "https://api.lemonsqueezy.com/v1/licenses/validate"
        );
        let headers = request.headers();
        assert_eq!(headers[ACCEPT], "application/json");
        assert_eq!(headers[CONTENT_TYPE], "application/x-www-form-urlencoded");
        assert_eq!(headers[CONTENT_LENGTH], "20");
        assert_eq!(headers[AUTHORIZATION], "Bearer secret");
        assert!(headers[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn bad_uri_fails() {
        let result = Request::new().uri("not a uri").build();
        assert!(matches!(result, Err(BuildError::Http(_))));
    }
}
