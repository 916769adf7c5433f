// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Arithmetic in the prime field underlying the secret-sharing scheme

use crate::errors::CryptoError;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;

/// The length of the canonical big-endian serialization of a field element,
/// the minimum width able to represent `p - 1`
pub const ELEMENT_LEN: usize = 33;

/// The prime modulus mentioned in the Callisto paper: 2^256 + 297
static CALLISTO_PRIME: Lazy<BigUint> = Lazy::new(|| {
    BigUint::parse_bytes(
        b"115792089237316195423570985008687907853269984665640564039457584007913129640233",
        10,
    )
    .unwrap()
});

/// An element of the integers modulo the Callisto prime. Always holds the
/// canonical representative in `[0, p)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldElement(BigUint);

impl FieldElement {
    /// Constructs an element by reading arbitrary bytes big-endian and
    /// reducing modulo the prime
    pub fn from_bytes(bytes: &[u8]) -> Self {
        FieldElement(BigUint::from_bytes_be(bytes) % &*CALLISTO_PRIME)
    }

    /// The canonical representative as [ELEMENT_LEN] big-endian bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let raw = self.0.to_bytes_be();
        let mut out = vec![0u8; ELEMENT_LEN - raw.len()];
        out.extend_from_slice(&raw);
        out
    }

    /// Reinterprets the element as a 256-bit symmetric key. Fails for the
    /// negligible fraction of elements that do not fit into 32 bytes.
    pub fn to_aead_key(&self) -> Result<[u8; 32], CryptoError> {
        let raw = self.0.to_bytes_be();
        if raw.len() > 32 {
            return Err(CryptoError::FieldInvalid);
        }
        let mut key = [0u8; 32];
        key[32 - raw.len()..].copy_from_slice(&raw);
        Ok(key)
    }

    pub fn zero() -> Self {
        FieldElement(BigUint::zero())
    }

    pub fn one() -> Self {
        FieldElement(BigUint::one())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn add(&self, rhs: &Self) -> Self {
        FieldElement((&self.0 + &rhs.0) % &*CALLISTO_PRIME)
    }

    pub fn sub(&self, rhs: &Self) -> Self {
        FieldElement((&self.0 + &*CALLISTO_PRIME - &rhs.0) % &*CALLISTO_PRIME)
    }

    pub fn mul(&self, rhs: &Self) -> Self {
        FieldElement((&self.0 * &rhs.0) % &*CALLISTO_PRIME)
    }

    /// Multiplicative inverse by Fermat's little theorem. Returns `None` for
    /// the zero element.
    pub fn invert(&self) -> Option<Self> {
        if self.0.is_zero() {
            return None;
        }
        let exponent = &*CALLISTO_PRIME - BigUint::one() - BigUint::one();
        Some(FieldElement(self.0.modpow(&exponent, &CALLISTO_PRIME)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::OsRng, RngCore};

    fn random_element() -> FieldElement {
        let mut bytes = [0u8; ELEMENT_LEN];
        OsRng.fill_bytes(&mut bytes);
        FieldElement::from_bytes(&bytes)
    }

    #[test]
    fn serialization_round_trip() {
        for _ in 0..10 {
            let x = random_element();
            let bytes = x.to_bytes();
            assert_eq!(bytes.len(), ELEMENT_LEN);
            assert_eq!(FieldElement::from_bytes(&bytes), x);
        }
    }

    #[test]
    fn reduction_on_construction() {
        // p itself reduces to zero
        let p_bytes = CALLISTO_PRIME.to_bytes_be();
        assert!(FieldElement::from_bytes(&p_bytes).is_zero());
    }

    #[test]
    fn inverse_property() {
        for _ in 0..10 {
            let x = random_element();
            if x.is_zero() {
                continue;
            }
            let one = x.mul(&x.invert().unwrap());
            assert_eq!(one, FieldElement::from_bytes(&[1]));
        }
    }

    #[test]
    fn zero_has_no_inverse() {
        assert!(FieldElement::from_bytes(&[]).invert().is_none());
    }

    #[test]
    fn sub_is_inverse_of_add() {
        let x = random_element();
        let y = random_element();
        assert_eq!(x.add(&y).sub(&y), x);
    }

    #[test]
    fn aead_key_pads_to_32_bytes() {
        let x = FieldElement::from_bytes(&[0x42]);
        let key = x.to_aead_key().unwrap();
        assert_eq!(key[31], 0x42);
        assert!(key[..31].iter().all(|&b| b == 0));
    }

    #[test]
    fn aead_key_rejects_oversized_element() {
        // p - 1 needs 33 bytes
        let p_minus_one = &*CALLISTO_PRIME - num_bigint::BigUint::from(1u8);
        let x = FieldElement::from_bytes(&p_minus_one.to_bytes_be());
        assert!(x.to_aead_key().is_err());
    }
}
