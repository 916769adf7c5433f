// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A list of error types which are produced during an execution of the protocol
use displaydoc::Display;
use thiserror::Error;

/// Represents a failure to configure one of the protocol's primitives
#[derive(Debug, Display, Error)]
pub enum ConfigError {
    /// Unknown OPRF ciphersuite: {0}
    UnknownCiphersuite(String),
    /// Invalid key length for {name}: expected {len}, but is actually {actual_len}.
    InvalidKeyLength {
        /// name
        name: &'static str,
        /// length
        len: usize,
        /// actual
        actual_len: usize,
    },
}

/// Represents an error in the execution of the OPRF primitive
#[derive(Debug, Display, Error)]
pub enum OprfError {
    /// Hashing the input to a group element failed
    HashToCurve,
    /// An identity group element was encountered
    IdentityElement,
    /// A zero scalar was encountered
    ZeroScalar,
    /// Could not decode the evaluator secret key
    KeyDecode,
    /// Evaluator returned {actual} elements for {expected} blinded inputs
    EvaluationLength {
        /// expected
        expected: usize,
        /// actual
        actual: usize,
    },
}

/// Represents an authentication or primitive failure
#[derive(Debug, Display, Error)]
pub enum CryptoError {
    /// AEAD authentication tag verification failed
    AeadTag,
    /// RSA-OAEP encryption or decryption failed
    RsaOaep,
    /// Field element does not fit the required width
    FieldInvalid,
    /// Key derivation produced an output of the wrong length
    Hkdf,
}

/// Represents a broken recovery invariant
#[derive(Debug, Display, Error)]
pub enum ProtocolError {
    /// Mismatched length between envelope ciphertexts and encrypted payloads
    MismatchedLength,
    /// Decrypted envelope carries data for the wrong recipient role
    NonMatchingLocType,
    /// Fewer than two distinct shares are available for recovery
    InsufficientShares,
    /// Polynomial interpolation failed
    InterpolationFailed,
    /// The recovered polynomial constant is zero
    ZeroConstant,
}

/// Represents a structured encode or decode failure
#[derive(Debug, Display, Error)]
pub enum EncodingError {
    /// Failed to encode {0}
    Encode(&'static str),
    /// Failed to decode {0}
    Decode(&'static str),
}

/// The error surfaced at the API boundary of the protocol core
#[derive(Debug, Display, Error)]
pub enum CallistoError {
    /// Configuration failure: {0}
    Config(ConfigError),
    /// The system randomness source failed
    Randomness,
    /// OPRF failure: {0}
    Oprf(OprfError),
    /// Encoding failure: {0}
    Encoding(EncodingError),
    /// Cryptographic failure: {0}
    Crypto(CryptoError),
    /// Protocol invariant broken: {0}
    Protocol(ProtocolError),
    /// Invalid input: {name} must be present and non-empty
    InvalidInput {
        /// name
        name: &'static str,
    },
}

impl From<ConfigError> for CallistoError {
    fn from(e: ConfigError) -> CallistoError {
        CallistoError::Config(e)
    }
}

impl From<OprfError> for CallistoError {
    fn from(e: OprfError) -> CallistoError {
        CallistoError::Oprf(e)
    }
}

impl From<EncodingError> for CallistoError {
    fn from(e: EncodingError) -> CallistoError {
        CallistoError::Encoding(e)
    }
}

impl From<CryptoError> for CallistoError {
    fn from(e: CryptoError) -> CallistoError {
        CallistoError::Crypto(e)
    }
}

impl From<ProtocolError> for CallistoError {
    fn from(e: ProtocolError) -> CallistoError {
        CallistoError::Protocol(e)
    }
}

pub(crate) mod utils {
    use super::*;

    pub fn check_key_length<'a>(
        key: &'a [u8],
        expected_len: usize,
        arg_name: &'static str,
    ) -> Result<&'a [u8], ConfigError> {
        if key.len() != expected_len {
            return Err(ConfigError::InvalidKeyLength {
                name: arg_name,
                len: expected_len,
                actual_len: key.len(),
            });
        }
        Ok(key)
    }
}
