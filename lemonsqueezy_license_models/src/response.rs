use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::license::{LicenseInstance, LicenseKey, LicenseMeta};

/// Common view over the bodies of the three license endpoints.
pub trait LicenseResponse: DeserializeOwned {
    /// The `activated`, `deactivated` or `valid` flag.
    fn outcome(&self) -> bool;

    fn license_key(&self) -> Option<&LicenseKey>;

    fn instance(&self) -> Option<&LicenseInstance>;

    fn meta(&self) -> Option<&LicenseMeta>;

    /// Message the server sometimes sends alongside a `false` outcome.
    fn error(&self) -> Option<&str>;
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LicenseActivation {
    pub activated: bool,
    #[serde(default)]
    pub error: Option<String>,
    pub license_key: Option<LicenseKey>,
    pub instance: Option<LicenseInstance>,
    pub meta: Option<LicenseMeta>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LicenseDeactivation {
    pub deactivated: bool,
    #[serde(default)]
    pub error: Option<String>,
    pub license_key: Option<LicenseKey>,
    pub instance: Option<LicenseInstance>,
    pub meta: Option<LicenseMeta>,
}

/// Response of the validate endpoint.
///
/// `instance` is `None` when the key was validated without an instance id.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LicenseValidation {
    pub valid: bool,
    #[serde(default)]
    pub error: Option<String>,
    pub license_key: Option<LicenseKey>,
    pub instance: Option<LicenseInstance>,
    pub meta: Option<LicenseMeta>,
}

/// Body of a non-2xx response.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl LicenseResponse for LicenseActivation {
    fn outcome(&self) -> bool {
        self.activated
    }

    fn license_key(&self) -> Option<&LicenseKey> {
        self.license_key.as_ref()
    }

    fn instance(&self) -> Option<&LicenseInstance> {
        self.instance.as_ref()
    }

    fn meta(&self) -> Option<&LicenseMeta> {
        self.meta.as_ref()
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl LicenseResponse for LicenseDeactivation {
    fn outcome(&self) -> bool {
        self.deactivated
    }

    fn license_key(&self) -> Option<&LicenseKey> {
        self.license_key.as_ref()
    }

    fn instance(&self) -> Option<&LicenseInstance> {
        self.instance.as_ref()
    }

    fn meta(&self) -> Option<&LicenseMeta> {
        self.meta.as_ref()
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl LicenseResponse for LicenseValidation {
    fn outcome(&self) -> bool {
        self.valid
    }

    fn license_key(&self) -> Option<&LicenseKey> {
        self.license_key.as_ref()
    }

    fn instance(&self) -> Option<&LicenseInstance> {
        self.instance.as_ref()
    }

    fn meta(&self) -> Option<&LicenseMeta> {
        self.meta.as_ref()
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
