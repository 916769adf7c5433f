// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Two-out-of-n secret sharing on the line `y = a*x + k`
//!
//! Every submitter reporting a given perpetrator derives the same `(a, k)`
//! pair, evaluates the line at the point determined by their own identity,
//! and escrows the resulting share. Any two shares from distinct submitters
//! determine the line, and with it the y-intercept `k` that unlocks the
//! escrowed keys.

use crate::errors::ProtocolError;
use crate::field::FieldElement;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// A point `(x, y)` on the sharing polynomial, with `x` derived from the
/// submitter identity and `y` the polynomial evaluated there
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShamirShare {
    x: FieldElement,
    y: FieldElement,
}

impl ShamirShare {
    pub fn new(x: FieldElement, y: FieldElement) -> Self {
        Self { x, y }
    }

    /// The `U` value: SHA-256 of the submitter identity as a field element
    pub fn x(&self) -> &FieldElement {
        &self.x
    }

    /// The `s` value: `a*U + k` modulo the prime
    pub fn y(&self) -> &FieldElement {
        &self.y
    }
}

/// Computes a `(U, s)` share given a submitter identity and the KDF-derived
/// values `a` and `k`
pub fn compute_share(a_value: &[u8], k_value: &[u8], user_id: &[u8]) -> ShamirShare {
    let user_id_hash = Sha256::digest(user_id);

    let a = FieldElement::from_bytes(a_value);
    let k = FieldElement::from_bytes(k_value);
    let u = FieldElement::from_bytes(user_id_hash.as_slice());

    // s = a*U + k
    let s = a.mul(&u).add(&k);

    ShamirShare { x: u, y: s }
}

/// Recovers the y-intercept `k` of the polynomial through the given shares.
///
/// Interpolation breaks down when two shares sit on the same abscissa, which
/// happens exactly when one submitter reported the same perpetrator more than
/// once. Only one representative per `x` value participates; if fewer than
/// two remain, there is nothing to interpolate.
pub fn recover_constant(shares: &[ShamirShare]) -> Result<FieldElement, ProtocolError> {
    let mut seen = HashSet::new();
    let unique: Vec<&ShamirShare> = shares
        .iter()
        .filter(|share| seen.insert(share.x.clone()))
        .collect();

    if unique.len() < 2 {
        return Err(ProtocolError::InsufficientShares);
    }

    // Lagrange interpolation evaluated at zero
    let mut constant = FieldElement::zero();
    for (i, share_i) in unique.iter().enumerate() {
        let mut numerator = FieldElement::one();
        let mut denominator = FieldElement::one();
        for (j, share_j) in unique.iter().enumerate() {
            if i == j {
                continue;
            }
            numerator = numerator.mul(share_j.x());
            denominator = denominator.mul(&share_j.x().sub(share_i.x()));
        }
        let denominator_inv = denominator
            .invert()
            .ok_or(ProtocolError::InterpolationFailed)?;
        constant = constant.add(&share_i.y().mul(&numerator).mul(&denominator_inv));
    }

    if constant.is_zero() {
        return Err(ProtocolError::ZeroConstant);
    }
    Ok(constant)
}
