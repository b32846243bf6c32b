//! # JSON Web Signature (JWS)
//!
//! JWS ([RFC7515]) represents content secured with digital signatures using
//! JSON-based data structures. Cryptographic algorithms and identifiers for
//! use with this specification are described in the JWA ([RFC7518])
//! specification.
//!
//! Only the compact serialization is supported:
//! `base64url(header) "." base64url(payload) "." base64url(signature)`.
//!
//! [RFC7515]: https://www.rfc-editor.org/rfc/rfc7515
//! [RFC7518]: https://www.rfc-editor.org/rfc/rfc7518

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::jose::jwa::Algorithm;
use crate::jose::jwk::{Curve, PublicKeyJwk};
use crate::{Error, Result, Signer};

/// Represents the JWS protected header.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Header {
    /// Digital signature algorithm identifier as per IANA "JSON Web Signature
    /// and Encryption Algorithms" registry.
    pub alg: Algorithm,

    /// The DID URL of the verification method used to sign. For example,
    /// `did:web:demo.example.com#key-0`.
    pub kid: String,

    /// Media type of the complete JWS, e.g. `vc+jwt`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

/// A parsed compact JWS. Verification never mutates it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Jws {
    /// The protected header.
    pub header: Header,

    /// The decoded payload.
    pub payload: Value,

    signing_input: String,
    signature: String,
}

impl Jws {
    /// Parse a compact JWS into its header and payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if the token is not three segments or
    /// a JSON segment cannot be decoded, and [`Error::UnsupportedAlgorithm`]
    /// if the header names an algorithm other than ES256 or ES384.
    pub fn parse(token: &str) -> Result<Self> {
        let parts: Vec<&str> = token.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(Error::MalformedInput("invalid Compact JWS format".into()));
        }

        let header = decode_segment(parts[0], "header")?;
        if let Some(alg) = header.get("alg").and_then(Value::as_str) {
            alg.parse::<Algorithm>()?;
        }
        let header: Header = serde_json::from_value(header)
            .map_err(|e| Error::MalformedInput(format!("issue deserializing header: {e}")))?;
        if header.kid.is_empty() {
            return Err(Error::MalformedInput("'kid' is empty".into()));
        }

        let payload = decode_segment(parts[1], "payload")?;

        Ok(Self {
            header,
            payload,
            signing_input: format!("{}.{}", parts[0], parts[1]),
            signature: parts[2].to_string(),
        })
    }

    /// The bytes the signature was computed over.
    #[must_use]
    pub fn signing_input(&self) -> &str {
        &self.signing_input
    }

    /// Decoded signature bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SignatureInvalid`] if the segment is not base64url.
    pub fn signature(&self) -> Result<Vec<u8>> {
        Base64UrlUnpadded::decode_vec(&self.signature)
            .map_err(|e| Error::SignatureInvalid(format!("issue decoding signature: {e}")))
    }

    /// Verify the signature against the public key, using the algorithm named
    /// in the header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SignatureInvalid`] if the header algorithm does not
    /// match the key or the signature does not verify.
    pub fn verify(&self, jwk: &PublicKeyJwk) -> Result<()> {
        if self.header.alg != jwk.algorithm() {
            return Err(Error::SignatureInvalid(format!(
                "'alg' {} cannot be used with a {} key",
                self.header.alg, jwk.crv
            )));
        }
        verify(jwk, self.signing_input.as_bytes(), &self.signature()?)
    }
}

/// Produce the compact serialization from its parts.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if the header or payload cannot be
/// serialized.
pub fn serialize<T: Serialize>(header: &Header, payload: &T, signature: &[u8]) -> Result<String> {
    let header = encode_segment(header)?;
    let payload = encode_segment(payload)?;
    let signature = Base64UrlUnpadded::encode_string(signature);
    Ok(format!("{header}.{payload}.{signature}"))
}

/// Encode the claims with a `{alg, kid[, typ]}` header and sign, returning a
/// compact JWS.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if the signer has no key identifier or
/// the claims cannot be serialized, or the signer's error if signing fails.
pub async fn encode<T>(typ: Option<&str>, claims: &T, signer: &impl Signer) -> Result<String>
where
    T: Serialize + Send + Sync,
{
    let header = Header {
        alg: signer.algorithm(),
        kid: signer.verification_method(),
        typ: typ.map(ToString::to_string),
    };
    if header.kid.is_empty() {
        return Err(Error::MalformedInput("'kid' is empty".into()));
    }
    tracing::debug!(kid = %header.kid, alg = %header.alg, "encode");

    let signing_input = format!("{}.{}", encode_segment(&header)?, encode_segment(claims)?);
    let sig = signer.try_sign(signing_input.as_bytes()).await?;
    let sig = fixed_length(header.alg, &sig)?;

    Ok(format!("{signing_input}.{}", Base64UrlUnpadded::encode_string(&sig)))
}

/// Verify the signature of the provided message using the JWK.
///
/// # Errors
///
/// Returns [`Error::InvalidKey`] if the JWK cannot be decoded and
/// [`Error::SignatureInvalid`] if the signature is not in fixed-length form or
/// does not verify.
pub fn verify(jwk: &PublicKeyJwk, msg: &[u8], sig: &[u8]) -> Result<()> {
    let expected = jwk.algorithm().signature_len();
    if sig.len() != expected {
        return Err(Error::SignatureInvalid(format!(
            "signature is {} bytes, expected {expected}",
            sig.len()
        )));
    }

    match jwk.crv {
        Curve::P256 => verify_es256(jwk, msg, sig),
        Curve::P384 => verify_es384(jwk, msg, sig),
    }
}

// Verify the signature of the provided message using the ES256 algorithm.
fn verify_es256(jwk: &PublicKeyJwk, msg: &[u8], sig: &[u8]) -> Result<()> {
    use p256::ecdsa::signature::Verifier as _;
    use p256::ecdsa::{Signature, VerifyingKey};

    let verifying_key = VerifyingKey::from_sec1_bytes(&jwk.to_sec1()?)
        .map_err(|e| Error::InvalidKey(format!("unable to build verifying key: {e}")))?;
    let signature = Signature::from_slice(sig)
        .map_err(|e| Error::SignatureInvalid(format!("unable to build signature: {e}")))?;

    verifying_key
        .verify(msg, &signature)
        .map_err(|e| Error::SignatureInvalid(format!("unable to verify signature: {e}")))
}

// Verify the signature of the provided message using the ES384 algorithm.
fn verify_es384(jwk: &PublicKeyJwk, msg: &[u8], sig: &[u8]) -> Result<()> {
    use p384::ecdsa::signature::Verifier as _;
    use p384::ecdsa::{Signature, VerifyingKey};

    let verifying_key = VerifyingKey::from_sec1_bytes(&jwk.to_sec1()?)
        .map_err(|e| Error::InvalidKey(format!("unable to build verifying key: {e}")))?;
    let signature = Signature::from_slice(sig)
        .map_err(|e| Error::SignatureInvalid(format!("unable to build signature: {e}")))?;

    verifying_key
        .verify(msg, &signature)
        .map_err(|e| Error::SignatureInvalid(format!("unable to verify signature: {e}")))
}

// Signers backed by hardware or remote key stores often return ASN.1 DER;
// convert those to the fixed-length form JWS requires.
fn fixed_length(alg: Algorithm, sig: &[u8]) -> Result<Vec<u8>> {
    if sig.len() == alg.signature_len() {
        return Ok(sig.to_vec());
    }

    let converted = match alg {
        Algorithm::ES256 => {
            p256::ecdsa::Signature::from_der(sig).map(|s| s.to_bytes().to_vec())
        }
        Algorithm::ES384 => {
            p384::ecdsa::Signature::from_der(sig).map(|s| s.to_bytes().to_vec())
        }
    };
    converted.map_err(|_| {
        Error::SignatureInvalid(format!(
            "signer returned {} bytes, expected {} byte r||s or DER",
            sig.len(),
            alg.signature_len()
        ))
    })
}

fn encode_segment<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| Error::MalformedInput(format!("issue serializing segment: {e}")))?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

fn decode_segment(segment: &str, name: &str) -> Result<Value> {
    let decoded = Base64UrlUnpadded::decode_vec(segment)
        .map_err(|e| Error::MalformedInput(format!("issue decoding {name}: {e}")))?;
    serde_json::from_slice(&decoded)
        .map_err(|e| Error::MalformedInput(format!("issue deserializing {name}: {e}")))
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::jose::jwk::PrivateKeyJwk;
    use crate::KeySigner;

    fn signer(alg: Algorithm) -> KeySigner {
        let key = PrivateKeyJwk::generate(alg);
        KeySigner::new(key, "did:web:example.com#key-0").expect("should create signer")
    }

    #[tokio::test]
    async fn encode_and_parse() {
        let signer = signer(Algorithm::ES256);
        let claims = json!({"issuer": "did:web:example.com", "type": ["VerifiableCredential"]});

        let token = encode(Some("vc+jwt"), &claims, &signer).await.expect("should encode");
        let jws = Jws::parse(&token).expect("should parse");

        assert_eq!(jws.header.alg, Algorithm::ES256);
        assert_eq!(jws.header.kid, "did:web:example.com#key-0");
        assert_eq!(jws.header.typ.as_deref(), Some("vc+jwt"));
        assert_eq!(jws.payload, claims);
        assert_eq!(jws.signature().expect("should decode").len(), 64);
        jws.verify(&signer.public_key()).expect("should verify");
    }

    #[tokio::test]
    async fn es384_signature_length() {
        let signer = signer(Algorithm::ES384);
        let token = encode(None, &json!({"a": 1}), &signer).await.expect("should encode");
        let jws = Jws::parse(&token).expect("should parse");
        assert_eq!(jws.signature().expect("should decode").len(), 96);
        jws.verify(&signer.public_key()).expect("should verify");
    }

    #[test]
    fn serialize_round_trip() {
        let header = Header {
            alg: Algorithm::ES384,
            kid: "did:web:example.com#key-1".into(),
            typ: None,
        };
        let token = serialize(&header, &json!({"a": "b"}), &[1, 2, 3]).expect("should serialize");
        let jws = Jws::parse(&token).expect("should parse");
        assert_eq!(jws.header, header);
        assert_eq!(jws.payload, json!({"a": "b"}));
        assert_eq!(jws.signature().expect("should decode"), vec![1, 2, 3]);
    }

    #[test]
    fn wrong_segment_count() {
        let err = Jws::parse("a.b").expect_err("should fail");
        assert!(matches!(err, Error::MalformedInput(_)));
        let err = Jws::parse("a.b.c.d").expect_err("should fail");
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn undecodable_payload() {
        let header =
            Base64UrlUnpadded::encode_string(br#"{"alg":"ES256","kid":"did:web:a.com#k"}"#);
        let err = Jws::parse(&format!("{header}.not-json.sig")).expect_err("should fail");
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn unsupported_header_alg() {
        let header =
            Base64UrlUnpadded::encode_string(br#"{"alg":"HS256","kid":"did:web:a.com#k"}"#);
        let payload = Base64UrlUnpadded::encode_string(b"{}");
        let err = Jws::parse(&format!("{header}.{payload}.sig")).expect_err("should fail");
        assert!(matches!(err, Error::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn empty_kid() {
        let header = Base64UrlUnpadded::encode_string(br#"{"alg":"ES256","kid":""}"#);
        let payload = Base64UrlUnpadded::encode_string(b"{}");
        let err = Jws::parse(&format!("{header}.{payload}.sig")).expect_err("should fail");
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[tokio::test]
    async fn algorithm_key_mismatch() {
        let signer = signer(Algorithm::ES256);
        let token = encode(None, &json!({}), &signer).await.expect("should encode");
        let other = PrivateKeyJwk::generate(Algorithm::ES384).to_public();

        let err =
            Jws::parse(&token).expect("should parse").verify(&other).expect_err("should fail");
        assert!(matches!(err, Error::SignatureInvalid(_)));
    }

    #[test]
    fn der_signature_is_reformatted() {
        use p256::ecdsa::signature::Signer as _;

        let signing_key = p256::ecdsa::SigningKey::random(&mut rand::rngs::OsRng);
        let sig: p256::ecdsa::Signature = signing_key.sign(b"msg");
        let der = sig.to_der();

        let fixed = fixed_length(Algorithm::ES256, der.as_bytes()).expect("should convert");
        assert_eq!(fixed, sig.to_bytes().to_vec());
        assert!(fixed_length(Algorithm::ES256, &[0u8; 10]).is_err());
    }
}
