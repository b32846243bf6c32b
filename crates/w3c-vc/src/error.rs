use crate::schema::SchemaError;

/// Errors raised while issuing or verifying credentials.
///
/// Every failure aborts the operation that raised it; there is no partially
/// verified result.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The signed object or one of its JSON segments cannot be parsed.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The payload names no issuer (or, for presentations, no holder).
    #[error("missing issuer: {0}")]
    MissingIssuer(String),

    /// The signing key does not belong to the issuer named in the payload.
    #[error("key {kid} is not controlled by issuer {issuer}")]
    IssuerKeyMismatch {
        /// Issuer (or holder) DID from the payload.
        issuer: String,
        /// Key identifier from the header.
        kid: String,
    },

    /// No controller document could be found for the key's DID.
    #[error("controller not found: {0}")]
    ControllerNotFound(String),

    /// The controller does not authorize the key for the relationship.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// The token was signed by a different key than the one resolved.
    #[error("key mismatch: expected {expected}, got {actual}")]
    KeyMismatch {
        /// The resolved key identifier.
        expected: String,
        /// The key identifier in the header.
        actual: String,
    },

    /// The signature does not verify.
    #[error("signature invalid: {0}")]
    SignatureInvalid(String),

    /// No schema is registered under the id.
    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    /// The registered schema does not compile.
    #[error("schema invalid: {0}")]
    SchemaInvalid(String),

    /// The payload fails one or more schemas.
    #[error("schema validation failed with {} error(s)", .0.len())]
    SchemaValidation(Vec<SchemaError>),

    /// The algorithm or curve is not ES256/P-256 or ES384/P-384.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Key material is malformed or inconsistent.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The `exp` claim has passed.
    #[error("expired: {0}")]
    Expired(String),

    /// The `nbf` claim is in the future.
    #[error("not yet valid: {0}")]
    NotYetValid(String),

    /// A credential or presentation is missing required members.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// Other, unspecified errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "malformed_input",
            Self::MissingIssuer(_) => "missing_issuer",
            Self::IssuerKeyMismatch { .. } => "issuer_key_mismatch",
            Self::ControllerNotFound(_) => "controller_not_found",
            Self::KeyNotFound(_) => "key_not_found",
            Self::KeyMismatch { .. } => "key_mismatch",
            Self::SignatureInvalid(_) => "signature_invalid",
            Self::SchemaNotFound(_) => "schema_not_found",
            Self::SchemaInvalid(_) => "schema_invalid",
            Self::SchemaValidation(_) => "schema_validation",
            Self::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            Self::InvalidKey(_) => "invalid_key",
            Self::Expired(_) => "expired",
            Self::NotYetValid(_) => "not_yet_valid",
            Self::InvalidCredential(_) => "invalid_credential",
            Self::Other(_) => "other",
        }
    }

    /// Returns the associated error message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::MalformedInput(msg)
            | Self::MissingIssuer(msg)
            | Self::ControllerNotFound(msg)
            | Self::KeyNotFound(msg)
            | Self::SignatureInvalid(msg)
            | Self::SchemaNotFound(msg)
            | Self::SchemaInvalid(msg)
            | Self::UnsupportedAlgorithm(msg)
            | Self::InvalidKey(msg)
            | Self::Expired(msg)
            | Self::NotYetValid(msg)
            | Self::InvalidCredential(msg) => msg.clone(),
            Self::SchemaValidation(errors) => {
                errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
            }
            Self::IssuerKeyMismatch { .. } | Self::KeyMismatch { .. } | Self::Other(_) => {
                self.to_string()
            }
        }
    }
}

impl From<attest_infosec::Error> for Error {
    fn from(err: attest_infosec::Error) -> Self {
        use attest_infosec::Error as E;

        match err {
            E::MalformedInput(msg) => Self::MalformedInput(msg),
            E::UnsupportedAlgorithm(msg) => Self::UnsupportedAlgorithm(msg),
            E::InvalidKey(msg) => Self::InvalidKey(msg),
            E::KeyNotFound(msg) => Self::KeyNotFound(msg),
            E::KeyMismatch { expected, actual } => Self::KeyMismatch { expected, actual },
            E::SignatureInvalid(msg) => Self::SignatureInvalid(msg),
            E::Other(err) => Self::Other(err),
        }
    }
}

impl From<attest_did::Error> for Error {
    fn from(err: attest_did::Error) -> Self {
        use attest_did::Error as E;

        match err {
            E::Other(err) => Self::Other(err),
            E::MethodNotSupported(msg)
            | E::InvalidDid(msg)
            | E::ControllerNotFound(msg)
            | E::InvalidDocument(msg) => Self::ControllerNotFound(msg),
        }
    }
}
