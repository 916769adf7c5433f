// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The two ciphertext layers of the protocol: AES-256-GCM with associated
//! data for everything key- and payload-shaped, and RSA-OAEP for the
//! envelopes addressed to the offline trustees

use crate::errors::{utils::check_key_length, CallistoError, CryptoError};
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::{CryptoRng, RngCore};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// Symmetric keys are 256 bits throughout
pub const KEY_LEN: usize = 32;
/// AES-GCM nonces are 96 bits
pub const NONCE_LEN: usize = 12;
/// Modulus size of the trustee RSA keys
pub const RSA_KEY_BITS: usize = 4096;

/// An AES-GCM ciphertext together with the nonce it was produced under and
/// the associated data bound into its authentication tag.
///
/// The only way to obtain one is through [GcmCiphertext::new] (directly or
/// via deserialization), so a value of this type is always structurally
/// valid: a 12-byte nonce and non-empty ciphertext and associated data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GcmCiphertext {
    #[serde(with = "serde_bytes")]
    nonce: Vec<u8>,
    #[serde(with = "serde_bytes")]
    ciphertext: Vec<u8>,
    #[serde(with = "serde_bytes")]
    associated_data: Vec<u8>,
}

impl GcmCiphertext {
    /// Validating constructor; rejects records that could not have been
    /// produced by [encrypt_aes]
    pub fn new(
        nonce: Vec<u8>,
        ciphertext: Vec<u8>,
        associated_data: Vec<u8>,
    ) -> Result<Self, CallistoError> {
        if nonce.len() != NONCE_LEN {
            return Err(CallistoError::InvalidInput { name: "nonce" });
        }
        if ciphertext.is_empty() {
            return Err(CallistoError::InvalidInput { name: "ciphertext" });
        }
        if associated_data.is_empty() {
            return Err(CallistoError::InvalidInput {
                name: "associatedData",
            });
        }
        Ok(Self {
            nonce,
            ciphertext,
            associated_data,
        })
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    /// Ciphertext with the authentication tag appended
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn associated_data(&self) -> &[u8] {
        &self.associated_data
    }
}

impl<'de> Deserialize<'de> for GcmCiphertext {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "PascalCase")]
        struct GcmCiphertextWire {
            #[serde(with = "serde_bytes")]
            nonce: Vec<u8>,
            #[serde(with = "serde_bytes")]
            ciphertext: Vec<u8>,
            #[serde(with = "serde_bytes")]
            associated_data: Vec<u8>,
        }

        let wire = GcmCiphertextWire::deserialize(deserializer)?;
        GcmCiphertext::new(wire.nonce, wire.ciphertext, wire.associated_data)
            .map_err(serde::de::Error::custom)
    }
}

/// Encrypts the given plaintext under a 256-bit key, binding the associated
/// data into the authentication tag. A fresh nonce is drawn for every call.
pub fn encrypt_aes<R: RngCore + CryptoRng>(
    key: &[u8],
    plaintext: &[u8],
    associated_data: &[u8],
    rng: &mut R,
) -> Result<GcmCiphertext, CallistoError> {
    check_key_length(key, KEY_LEN, "AES key")?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut nonce = [0u8; NONCE_LEN];
    rng.try_fill_bytes(&mut nonce)
        .map_err(|_| CallistoError::Randomness)?;

    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad: associated_data,
            },
        )
        .map_err(|_| CryptoError::AeadTag)?;

    GcmCiphertext::new(nonce.to_vec(), ciphertext, associated_data.to_vec())
}

/// Decrypts a [GcmCiphertext] under the provided key, authenticating against
/// the associated data carried by the record
pub fn decrypt_aes(key: &[u8], gcm_ciphertext: &GcmCiphertext) -> Result<Vec<u8>, CallistoError> {
    check_key_length(key, KEY_LEN, "AES key")?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(gcm_ciphertext.nonce()),
            Payload {
                msg: gcm_ciphertext.ciphertext(),
                aad: gcm_ciphertext.associated_data(),
            },
        )
        .map_err(|_| CryptoError::AeadTag)?;

    Ok(plaintext)
}

/// An RSA key pair for one of the trustees
pub struct RsaKeyPair {
    pub private_key: RsaPrivateKey,
    pub public_key: RsaPublicKey,
}

impl RsaKeyPair {
    /// Generates a fresh key pair with a [RSA_KEY_BITS]-bit modulus
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, CallistoError> {
        let private_key =
            RsaPrivateKey::new(rng, RSA_KEY_BITS).map_err(|_| CryptoError::RsaOaep)?;
        let public_key = RsaPublicKey::from(&private_key);
        Ok(Self {
            private_key,
            public_key,
        })
    }
}

/// Encrypts the given message using RSA-OAEP with SHA-256 and an empty label
pub fn encrypt_rsa<R: RngCore + CryptoRng>(
    msg: &[u8],
    public_key: &RsaPublicKey,
    rng: &mut R,
) -> Result<Vec<u8>, CallistoError> {
    let ciphertext = public_key
        .encrypt(rng, Oaep::new::<Sha256>(), msg)
        .map_err(|_| CryptoError::RsaOaep)?;
    Ok(ciphertext)
}

/// Decrypts an RSA-OAEP ciphertext using the provided private key
pub fn decrypt_rsa(ciphertext: &[u8], private_key: &RsaPrivateKey) -> Result<Vec<u8>, CallistoError> {
    let plaintext = private_key
        .decrypt(Oaep::new::<Sha256>(), ciphertext)
        .map_err(|_| CryptoError::RsaOaep)?;
    Ok(plaintext)
}
