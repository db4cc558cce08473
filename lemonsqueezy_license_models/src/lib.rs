#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod license;
pub mod response;
pub mod timestamp;

pub use license::{LicenseInstance, LicenseKey, LicenseKeyStatus, LicenseMeta, UnknownStatus};
pub use response::{
    ErrorResponse, LicenseActivation, LicenseDeactivation, LicenseResponse, LicenseValidation,
};
