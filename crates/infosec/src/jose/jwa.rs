//! # JSON Web Algorithms (JWA)
//!
//! JWA [RFC7518] defines a set of cryptographic algorithms for use with
//! JWS ([RFC7515]), JWE ([RFC7516]), and JWK ([RFC7517]).
//!
//! Only the two NIST ECDSA algorithms are supported. Anything else is
//! rejected when the identifier is parsed, never at signing or verification
//! time.
//!
//! [RFC7515]: https://www.rfc-editor.org/rfc/rfc7515
//! [RFC7516]: https://www.rfc-editor.org/rfc/rfc7516
//! [RFC7517]: https://www.rfc-editor.org/rfc/rfc7517
//! [RFC7518]: https://www.rfc-editor.org/rfc/rfc7518

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::jose::jwk::Curve;
use crate::Error;

/// Algorithm is used to specify the signing algorithm used by the signer.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// ECDSA using P-256 and SHA-256
    #[default]
    ES256,

    /// ECDSA using P-384 and SHA-384
    ES384,
}

impl Algorithm {
    /// The curve the algorithm signs with.
    #[must_use]
    pub const fn curve(self) -> Curve {
        match self {
            Self::ES256 => Curve::P256,
            Self::ES384 => Curve::P384,
        }
    }

    /// Length of a signature in fixed-size `r || s` form.
    #[must_use]
    pub const fn signature_len(self) -> usize {
        self.curve().coordinate_len() * 2
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ES256" => Ok(Self::ES256),
            "ES384" => Ok(Self::ES384),
            _ => Err(Error::UnsupportedAlgorithm(format!("{s} is not supported"))),
        }
    }
}
