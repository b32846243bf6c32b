/// DID resolution error codes
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The DID method is not supported.
    #[error("method not supported: {0}")]
    MethodNotSupported(String),

    /// The DID supplied does not conform to valid syntax.
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    /// No controller document is available for the DID, either locally or
    /// from the network.
    #[error("controller not found: {0}")]
    ControllerNotFound(String),

    /// The controller document breaks a structural invariant.
    #[error("invalid controller document: {0}")]
    InvalidDocument(String),

    /// Other, unspecified errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MethodNotSupported(_) => "method_not_supported",
            Self::InvalidDid(_) => "invalid_did",
            Self::ControllerNotFound(_) => "controller_not_found",
            Self::InvalidDocument(_) => "invalid_document",
            Self::Other(_) => "other",
        }
    }

    /// Returns the associated error message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::MethodNotSupported(msg)
            | Self::InvalidDid(msg)
            | Self::ControllerNotFound(msg)
            | Self::InvalidDocument(msg) => msg.clone(),
            Self::Other(err) => err.to_string(),
        }
    }
}
