/// Signing and verification error codes
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The signed object is not a three-segment compact JWS, or a JSON
    /// segment cannot be decoded.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The algorithm or curve is not one of ES256/P-256 or ES384/P-384.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Key material cannot be decoded into a usable key.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The key identifier is not in the verifier set.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// The token header names a different key than the one the verifier was
    /// resolved for.
    #[error("key mismatch: verifier is bound to {expected} but token names {actual}")]
    KeyMismatch {
        /// Key identifier the verifier was resolved for.
        expected: String,

        /// Key identifier found in the token header.
        actual: String,
    },

    /// The signature does not verify against the public key.
    #[error("signature invalid: {0}")]
    SignatureInvalid(String),

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
            Self::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            Self::InvalidKey(_) => "invalid_key",
            Self::KeyNotFound(_) => "key_not_found",
            Self::KeyMismatch { .. } => "key_mismatch",
            Self::SignatureInvalid(_) => "signature_invalid",
            Self::Other(_) => "other",
        }
    }

    /// Returns the associated error message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::MalformedInput(msg)
            | Self::UnsupportedAlgorithm(msg)
            | Self::InvalidKey(msg)
            | Self::KeyNotFound(msg)
            | Self::SignatureInvalid(msg) => msg.clone(),
            Self::KeyMismatch { expected, actual } => format!("expected {expected}, got {actual}"),
            Self::Other(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn error_code() {
        let err = Error::KeyNotFound("did:web:a.com#key-1".into());
        assert_eq!(err.code(), "key_not_found");
        assert_eq!(err.message(), "did:web:a.com#key-1");
    }
}
