// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! An oblivious pseudorandom function evaluated jointly by a client holding
//! the input and an evaluator holding the key
//!
//! This file contains the multiplicative blinding version of DH-OPRF: the
//! client hashes its input to a group element and masks it with a random
//! blind (`blind`), the evaluator applies its secret scalar (`evaluate`), and
//! the client strips the blind (`unblind`) and hashes the result down to a
//! fixed-length byte string (`finalize`). Neither party learns the other's
//! contribution.

use crate::errors::{ConfigError, OprfError};
use p521::elliptic_curve::group::Group;
use p521::elliptic_curve::hash2curve::{ExpandMsgXmd, GroupDigest};
use p521::elliptic_curve::sec1::ToEncodedPoint;
use p521::elliptic_curve::{Field, PrimeField};
use p521::{FieldBytes, NistP521, ProjectivePoint, Scalar};
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha512};

/// The ciphersuite used for the OPRF protocol
pub const OPRF_CIPHERSUITE: &str = "OPRF-P521-HKDF-SHA512-SSWU-RO";

/// Length in bytes of the finalized OPRF output
pub const P_HAT_LEN: usize = 64;

const SCALAR_LEN: usize = 66;

// Domain separators for the two hashing steps
const STR_HASH_TO_GROUP: &[u8] = b"HashToGroup-OPRF-P521-HKDF-SHA512-SSWU-RO";
const STR_FINALIZE: &[u8] = b"Finalize-OPRF-P521-HKDF-SHA512-SSWU-RO";

fn check_ciphersuite(ciphersuite: &str) -> Result<(), ConfigError> {
    if ciphersuite != OPRF_CIPHERSUITE {
        return Err(ConfigError::UnknownCiphersuite(ciphersuite.to_string()));
    }
    Ok(())
}

fn random_nonzero_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    loop {
        let scalar = Scalar::random(&mut *rng);
        if !bool::from(scalar.is_zero()) {
            return scalar;
        }
    }
}

fn element_to_bytes(point: &ProjectivePoint) -> Vec<u8> {
    point.to_affine().to_encoded_point(true).as_bytes().to_vec()
}

/// Blinded representation of a client input, together with the blind that
/// must be kept to undo the masking after evaluation
pub struct BlindedElement {
    m: ProjectivePoint,
    r: Scalar,
}

impl BlindedElement {
    /// The masked group element `M`, safe to hand to the evaluator
    pub fn element(&self) -> &ProjectivePoint {
        &self.m
    }
}

/// The secret scalar held by an OPRF evaluator
#[derive(Clone)]
pub struct SecretKey(Scalar);

impl SecretKey {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        SecretKey(random_nonzero_scalar(rng))
    }

    /// Hex encoding of the big-endian scalar bytes
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_repr())
    }

    /// Decodes a key previously written with [SecretKey::to_hex]. Shorter
    /// encodings are interpreted left-padded.
    pub fn from_hex(encoded: &str) -> Result<Self, OprfError> {
        let bytes = hex::decode(encoded).map_err(|_| OprfError::KeyDecode)?;
        if bytes.is_empty() || bytes.len() > SCALAR_LEN {
            return Err(OprfError::KeyDecode);
        }

        let mut repr = [0u8; SCALAR_LEN];
        repr[SCALAR_LEN - bytes.len()..].copy_from_slice(&bytes);

        let scalar = Option::<Scalar>::from(Scalar::from_repr(FieldBytes::clone_from_slice(&repr)))
            .ok_or(OprfError::KeyDecode)?;
        if bool::from(scalar.is_zero()) {
            return Err(OprfError::ZeroScalar);
        }
        Ok(SecretKey(scalar))
    }
}

/// Client-side operations of the OPRF protocol
pub struct OprfClient {
    ciphersuite: String,
}

impl OprfClient {
    pub fn new(ciphersuite: &str) -> Result<Self, ConfigError> {
        check_ciphersuite(ciphersuite)?;
        Ok(Self {
            ciphersuite: ciphersuite.to_string(),
        })
    }

    pub fn ciphersuite(&self) -> &str {
        &self.ciphersuite
    }

    /// Hashes the input onto the group and masks it with a fresh random blind
    pub fn blind<R: RngCore + CryptoRng>(
        &self,
        input: &[u8],
        rng: &mut R,
    ) -> Result<BlindedElement, OprfError> {
        let hashed =
            NistP521::hash_from_bytes::<ExpandMsgXmd<Sha512>>(&[input], &[STR_HASH_TO_GROUP])
                .map_err(|_| OprfError::HashToCurve)?;
        if bool::from(hashed.is_identity()) {
            return Err(OprfError::IdentityElement);
        }

        let blind = random_nonzero_scalar(rng);
        Ok(BlindedElement {
            m: hashed * blind,
            r: blind,
        })
    }

    /// Strips the blind from an evaluated element
    pub fn unblind(
        &self,
        blinded: &BlindedElement,
        z_value: &ProjectivePoint,
    ) -> Result<ProjectivePoint, OprfError> {
        if bool::from(z_value.is_identity()) {
            return Err(OprfError::IdentityElement);
        }
        let blind_inv = Option::<Scalar>::from(blinded.r.invert()).ok_or(OprfError::ZeroScalar)?;
        Ok(*z_value * blind_inv)
    }

    /// Hashes the unblinded element together with the original input down to
    /// [P_HAT_LEN] bytes
    pub fn finalize(&self, n_value: &ProjectivePoint, input: &[u8]) -> Result<Vec<u8>, OprfError> {
        if bool::from(n_value.is_identity()) {
            return Err(OprfError::IdentityElement);
        }

        let element_bytes = element_to_bytes(n_value);
        let mut hasher = Sha512::new();
        hasher.update((input.len() as u64).to_be_bytes());
        hasher.update(input);
        hasher.update((element_bytes.len() as u64).to_be_bytes());
        hasher.update(&element_bytes);
        hasher.update(STR_FINALIZE);
        Ok(hasher.finalize().to_vec())
    }
}

/// The holder of the OPRF key, able to evaluate arbitrary blinded inputs
pub trait OprfEvaluator {
    /// Applies the secret key to each blinded element
    fn evaluate(
        &self,
        blinded_elements: &[ProjectivePoint],
    ) -> Result<Vec<ProjectivePoint>, OprfError>;
}

impl<E: OprfEvaluator + ?Sized> OprfEvaluator for &E {
    fn evaluate(
        &self,
        blinded_elements: &[ProjectivePoint],
    ) -> Result<Vec<ProjectivePoint>, OprfError> {
        (**self).evaluate(blinded_elements)
    }
}

/// An in-process OPRF evaluator
pub struct OprfServer {
    ciphersuite: String,
    secret_key: SecretKey,
}

impl OprfServer {
    pub fn new(ciphersuite: &str, secret_key: SecretKey) -> Result<Self, ConfigError> {
        check_ciphersuite(ciphersuite)?;
        Ok(Self {
            ciphersuite: ciphersuite.to_string(),
            secret_key,
        })
    }

    pub fn ciphersuite(&self) -> &str {
        &self.ciphersuite
    }

    /// Hex encoding of the secret key, for operator persistence
    pub fn key_to_hex(&self) -> String {
        self.secret_key.to_hex()
    }
}

impl OprfEvaluator for OprfServer {
    fn evaluate(
        &self,
        blinded_elements: &[ProjectivePoint],
    ) -> Result<Vec<ProjectivePoint>, OprfError> {
        blinded_elements
            .iter()
            .map(|m| {
                if bool::from(m.is_identity()) {
                    return Err(OprfError::IdentityElement);
                }
                Ok(*m * self.secret_key.0)
            })
            .collect()
    }
}

/// Composition of an OPRF client with an evaluator, turning a low-entropy
/// perpetrator identifier into the pseudorandom value all submitters of the
/// same perpetrator agree on
pub struct PHatComputer<E> {
    oprf_client: OprfClient,
    evaluator: E,
}

impl<E: OprfEvaluator> PHatComputer<E> {
    pub fn new(evaluator: E) -> Result<Self, ConfigError> {
        Ok(Self {
            oprf_client: OprfClient::new(OPRF_CIPHERSUITE)?,
            evaluator,
        })
    }

    /// Runs one full blind-evaluate-unblind-finalize round
    pub fn get_p_hat<R: RngCore + CryptoRng>(
        &self,
        input: &[u8],
        rng: &mut R,
    ) -> Result<Vec<u8>, OprfError> {
        let blinded = self.oprf_client.blind(input, rng)?;

        let z_values = self
            .evaluator
            .evaluate(std::slice::from_ref(blinded.element()))?;
        if z_values.len() != 1 {
            return Err(OprfError::EvaluationLength {
                expected: 1,
                actual: z_values.len(),
            });
        }

        let n_value = self.oprf_client.unblind(&blinded, &z_values[0])?;
        self.oprf_client.finalize(&n_value, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn server() -> OprfServer {
        let key = SecretKey::generate(&mut OsRng);
        OprfServer::new(OPRF_CIPHERSUITE, key).unwrap()
    }

    #[test]
    fn output_is_deterministic_per_key_and_input() {
        let server = server();
        let computer = PHatComputer::new(&server).unwrap();

        let one = computer.get_p_hat(b"some perpetrator", &mut OsRng).unwrap();
        let two = computer.get_p_hat(b"some perpetrator", &mut OsRng).unwrap();

        assert_eq!(one.len(), P_HAT_LEN);
        assert_eq!(one, two);
    }

    #[test]
    fn two_clients_agree_through_one_evaluator() {
        let server = server();
        let computer_one = PHatComputer::new(&server).unwrap();
        let computer_two = PHatComputer::new(&server).unwrap();

        let one = computer_one.get_p_hat(b"perpID", &mut OsRng).unwrap();
        let two = computer_two.get_p_hat(b"perpID", &mut OsRng).unwrap();
        assert_eq!(one, two);
    }

    #[test]
    fn output_differs_across_inputs() {
        let server = server();
        let computer = PHatComputer::new(&server).unwrap();

        let one = computer.get_p_hat(b"first", &mut OsRng).unwrap();
        let two = computer.get_p_hat(b"second", &mut OsRng).unwrap();
        assert_ne!(one, two);
    }

    #[test]
    fn output_differs_across_keys() {
        let computer_one = PHatComputer::new(server()).unwrap();
        let computer_two = PHatComputer::new(server()).unwrap();

        let one = computer_one.get_p_hat(b"perpID", &mut OsRng).unwrap();
        let two = computer_two.get_p_hat(b"perpID", &mut OsRng).unwrap();
        assert_ne!(one, two);
    }

    #[test]
    fn blinding_is_randomized() {
        let client = OprfClient::new(OPRF_CIPHERSUITE).unwrap();
        let one = client.blind(b"input", &mut OsRng).unwrap();
        let two = client.blind(b"input", &mut OsRng).unwrap();
        assert_ne!(
            element_to_bytes(one.element()),
            element_to_bytes(two.element())
        );
    }

    #[test]
    fn key_hex_round_trip() {
        let key = SecretKey::generate(&mut OsRng);
        let decoded = SecretKey::from_hex(&key.to_hex()).unwrap();
        assert_eq!(key.to_hex(), decoded.to_hex());
    }

    #[test]
    fn bad_key_hex_is_rejected() {
        assert!(SecretKey::from_hex("not hex").is_err());
        assert!(SecretKey::from_hex("").is_err());
        assert!(SecretKey::from_hex(&"00".repeat(SCALAR_LEN)).is_err());
    }

    #[test]
    fn unknown_ciphersuite_is_rejected() {
        assert!(OprfClient::new("OPRF-P256-HKDF-SHA256-SSWU-RO").is_err());
        let key = SecretKey::generate(&mut OsRng);
        assert!(OprfServer::new("bogus", key).is_err());
    }
}
