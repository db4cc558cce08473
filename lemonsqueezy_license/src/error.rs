use hyper::StatusCode;
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
};

#[derive(Debug)]
pub enum ErrorKind {
    BuildingRequest,
    /// The transport could not deliver the request or get a response.
    Sending,
    /// The transport failed while reading the response body.
    ChunkingResponse,
    /// The response had no usable status or the success body did not match the schema.
    MalformedResponse,
    /// The server answered with a non-2xx status.
    ///
    /// `message` is the `error` field of the body when the body could be decoded.
    Response {
        status: StatusCode,
        message: Option<String>,
    },
}

#[derive(Debug)]
pub struct LicenseError {
    pub(super) source: Option<Box<dyn StdError + Send + Sync>>,
    pub(super) kind: ErrorKind,
}

#[derive(Debug)]
pub struct DeserializeBodyError {
    pub(super) source: Option<Box<dyn StdError + Send + Sync>>,
    pub(super) bytes: Vec<u8>,
}

impl LicenseError {
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_source(self) -> Option<Box<dyn StdError + Send + Sync>> {
        self.source
    }

    pub fn into_parts(self) -> (ErrorKind, Option<Box<dyn StdError + Send + Sync>>) {
        (self.kind, self.source)
    }

    /// Status of a server-reported error.
    pub const fn status(&self) -> Option<StatusCode> {
        match &self.kind {
            ErrorKind::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message of a server-reported error, if the server sent one.
    pub fn message(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Response { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether the request never produced a complete response.
    pub const fn is_transport(&self) -> bool {
        matches!(self.kind, ErrorKind::Sending | ErrorKind::ChunkingResponse)
    }
}

impl Display for LicenseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.kind() {
            ErrorKind::BuildingRequest => write!(f, "failed to build the request"),
            ErrorKind::Sending => write!(f, "sending the request failed"),
            ErrorKind::ChunkingResponse => write!(f, "chunking the response failed"),
            ErrorKind::MalformedResponse => write!(f, "received a malformed response"),
            ErrorKind::Response {
                status,
                message: Some(message),
            } => write!(f, "failed with {status}: {message}"),
            ErrorKind::Response {
                status,
                message: None,
            } => write!(f, "failed with {status}"),
        }
    }
}

impl StdError for LicenseError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| &**source as &(dyn StdError + 'static))
    }
}

impl DeserializeBodyError {
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Display for DeserializeBodyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let display = String::from_utf8_lossy(&self.bytes);
        write!(f, "bytes: {display}")
    }
}

impl StdError for DeserializeBodyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| &**source as &(dyn StdError + 'static))
    }
}
