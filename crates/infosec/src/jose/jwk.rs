//! # JSON Web Key (JWK)
//!
//! A JWK ([RFC7517]) is a JSON representation of a cryptographic key.
//!
//! Keys are elliptic curve keys on P-256 or P-384. The key identifier is the
//! JWK Thumbprint ([RFC7638]): the SHA-256 hash of the UTF-8 JSON built from
//! the required members `{crv,kty,x,y}` in lexicographic order, base64url
//! encoded without padding.
//!
//! [RFC7517]: https://www.rfc-editor.org/rfc/rfc7517
//! [RFC7638]: https://www.rfc-editor.org/rfc/rfc7638

use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::jose::jwa::Algorithm;
use crate::{Error, Result};

/// Cryptographic key type.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub enum KeyType {
    /// Elliptic curve key pair
    #[default]
    #[serde(rename = "EC")]
    Ec,
}

impl Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ec => write!(f, "EC"),
        }
    }
}

/// Cryptographic curve type.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq, Hash)]
pub enum Curve {
    /// NIST P-256 curve
    #[default]
    #[serde(rename = "P-256")]
    P256,

    /// NIST P-384 curve
    #[serde(rename = "P-384")]
    P384,
}

impl Curve {
    /// The signing algorithm bound to the curve.
    #[must_use]
    pub const fn algorithm(self) -> Algorithm {
        match self {
            Self::P256 => Algorithm::ES256,
            Self::P384 => Algorithm::ES384,
        }
    }

    /// Byte length of a single affine coordinate (and of the private scalar).
    #[must_use]
    pub const fn coordinate_len(self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
        }
    }
}

impl Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::P256 => write!(f, "P-256"),
            Self::P384 => write!(f, "P-384"),
        }
    }
}

impl FromStr for Curve {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "P-256" => Ok(Self::P256),
            "P-384" => Ok(Self::P384),
            _ => Err(Error::UnsupportedAlgorithm(format!("curve {s} is not supported"))),
        }
    }
}

/// The intended usage of the public `KeyType`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum KeyUse {
    /// Public key is to be used for signature verification
    #[default]
    #[serde(rename = "sig")]
    Signature,
}

/// Simplified JSON Web Key (JWK) public key structure.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[allow(clippy::module_name_repetitions)]
pub struct PublicKeyJwk {
    /// Key identifier, usually the key's thumbprint.
    /// For example, "_Qq0UL2Fq651Q0Fjd6TvnYE-faHiOpRlPVQcY_-tA4A".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Key type.
    pub kty: KeyType,

    /// Cryptographic curve type.
    pub crv: Curve,

    /// Algorithm intended for use with the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<Algorithm>,

    /// X coordinate.
    pub x: String,

    /// Y coordinate.
    pub y: String,

    /// Use of the key.
    #[serde(rename = "use")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_: Option<KeyUse>,
}

impl PublicKeyJwk {
    /// RFC 7638 thumbprint of the key. Optional members (`kid`, `alg`,
    /// `use`) do not contribute.
    #[must_use]
    pub fn thumbprint(&self) -> String {
        let canonical = format!(
            r#"{{"crv":"{}","kty":"{}","x":"{}","y":"{}"}}"#,
            self.crv, self.kty, self.x, self.y
        );
        Base64UrlUnpadded::encode_string(&Sha256::digest(canonical.as_bytes()))
    }

    /// The algorithm implied by the key's curve.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.crv.algorithm()
    }

    /// Uncompressed SEC1 encoding (`0x04 || x || y`) of the public point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if a coordinate is not valid base64url or
    /// has the wrong length for the curve.
    pub fn to_sec1(&self) -> Result<Vec<u8>> {
        let len = self.crv.coordinate_len();
        let x = decode_coordinate("x", &self.x, len)?;
        let y = decode_coordinate("y", &self.y, len)?;

        let mut sec1 = Vec::with_capacity(1 + 2 * len);
        sec1.push(0x04);
        sec1.extend_from_slice(&x);
        sec1.extend_from_slice(&y);
        Ok(sec1)
    }
}

/// A private key: the public JWK members plus the secret scalar `d`.
///
/// The secret never appears in `Debug` output.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct PrivateKeyJwk {
    /// Public members of the key pair.
    #[serde(flatten)]
    pub public: PublicKeyJwk,

    /// Private scalar, base64url encoded.
    pub d: String,
}

impl PrivateKeyJwk {
    /// Generate a fresh key pair for the algorithm. The `kid` is set to the
    /// key's thumbprint.
    #[must_use]
    pub fn generate(alg: Algorithm) -> Self {
        let (secret, sec1) = match alg.curve() {
            Curve::P256 => {
                let signing_key = p256::ecdsa::SigningKey::random(&mut OsRng);
                let point = signing_key.verifying_key().to_encoded_point(false);
                (signing_key.to_bytes().to_vec(), point.as_bytes().to_vec())
            }
            Curve::P384 => {
                let signing_key = p384::ecdsa::SigningKey::random(&mut OsRng);
                let point = signing_key.verifying_key().to_encoded_point(false);
                (signing_key.to_bytes().to_vec(), point.as_bytes().to_vec())
            }
        };

        let len = alg.curve().coordinate_len();
        let mut public = PublicKeyJwk {
            kid: None,
            kty: KeyType::Ec,
            crv: alg.curve(),
            alg: Some(alg),
            x: Base64UrlUnpadded::encode_string(&sec1[1..=len]),
            y: Base64UrlUnpadded::encode_string(&sec1[len + 1..]),
            use_: Some(KeyUse::Signature),
        };
        public.kid = Some(public.thumbprint());

        Self {
            public,
            d: Base64UrlUnpadded::encode_string(&secret),
        }
    }

    /// The public half of the key pair.
    #[must_use]
    pub fn to_public(&self) -> PublicKeyJwk {
        self.public.clone()
    }

    /// The key identifier: the supplied `kid`, or the thumbprint when unset.
    #[must_use]
    pub fn kid(&self) -> String {
        self.public.kid.clone().unwrap_or_else(|| self.public.thumbprint())
    }

    /// The algorithm implied by the key's curve.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.public.algorithm()
    }

    pub(crate) fn secret(&self) -> Result<Vec<u8>> {
        decode_coordinate("d", &self.d, self.public.crv.coordinate_len())
    }
}

impl Debug for PrivateKeyJwk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeyJwk")
            .field("public", &self.public)
            .field("d", &"[redacted]")
            .finish()
    }
}

/// Persisted key material for an issuer or holder: one key for issuing
/// credentials and one for authenticating as a holder.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Keyring {
    /// Key used to sign credentials (`assertionMethod`).
    pub assertion: PrivateKeyJwk,

    /// Key used to sign presentations (`authentication`).
    pub authentication: PrivateKeyJwk,
}

impl Keyring {
    /// Generate both keys for the algorithm.
    #[must_use]
    pub fn generate(alg: Algorithm) -> Self {
        Self {
            assertion: PrivateKeyJwk::generate(alg),
            authentication: PrivateKeyJwk::generate(alg),
        }
    }
}

fn decode_coordinate(name: &str, value: &str, len: usize) -> Result<Vec<u8>> {
    let bytes = Base64UrlUnpadded::decode_vec(value)
        .map_err(|e| Error::InvalidKey(format!("issue decoding '{name}': {e}")))?;
    if bytes.len() != len {
        return Err(Error::InvalidKey(format!(
            "'{name}' is {} bytes, expected {len}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
mod test {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(Algorithm::ES256)]
    #[case(Algorithm::ES384)]
    fn generate(#[case] alg: Algorithm) {
        let key = PrivateKeyJwk::generate(alg);
        let public = key.to_public();

        assert_eq!(public.crv, alg.curve());
        assert_eq!(public.kid.as_deref(), Some(public.thumbprint().as_str()));
        let sec1 = public.to_sec1().expect("should encode");
        assert_eq!(sec1.len(), 1 + 2 * alg.curve().coordinate_len());
        assert_eq!(key.secret().expect("should decode").len(), alg.curve().coordinate_len());

        let json = serde_json::to_value(&public).expect("should serialize");
        assert!(json.get("d").is_none());
    }

    #[test]
    fn distinct_kids() {
        let one = PrivateKeyJwk::generate(Algorithm::ES256);
        let two = PrivateKeyJwk::generate(Algorithm::ES256);
        assert_ne!(one.kid(), two.kid());
    }

    #[test]
    fn thumbprint_ignores_optional_members() {
        let key = PrivateKeyJwk::generate(Algorithm::ES256).to_public();
        let bare = PublicKeyJwk {
            kid: None,
            alg: None,
            use_: None,
            ..key.clone()
        };
        assert_eq!(key.thumbprint(), bare.thumbprint());
    }

    #[test]
    fn debug_redacts_secret() {
        let key = PrivateKeyJwk::generate(Algorithm::ES384);
        let debug = format!("{key:?}");
        assert!(!debug.contains(&key.d));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn unsupported_curve() {
        let res = serde_json::from_value::<PublicKeyJwk>(json!({
            "kty": "EC",
            "crv": "secp256k1",
            "x": "AAAA",
            "y": "AAAA"
        }));
        assert!(res.is_err());

        let err = "P-521".parse::<Curve>().expect_err("should reject");
        assert!(matches!(err, Error::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn keyring_round_trips_json() {
        let keyring = Keyring::generate(Algorithm::ES256);
        let json = serde_json::to_string(&keyring).expect("should serialize");
        let parsed: Keyring = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(parsed, keyring);
    }
}
