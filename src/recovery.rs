// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Trustee-side decryption of a matched set of tuples
//!
//! Recovery runs bottom-up: the trustee opens every envelope addressed to
//! it, pools the shares contributed by distinct submitters to reconstruct
//! `k`, peels the encrypted-key layer with `k`, and only then decrypts the
//! payloads themselves. Shares are taken from the distinct-submitter subset
//! of a match; payloads are decrypted for the full matched set.

use crate::encoding;
use crate::encryption::{self, GcmCiphertext, KEY_LEN};
use crate::errors::{CallistoError, ProtocolError};
use crate::shamir;
use crate::types::{AssignmentData, EntryData, LocData, LocType};
use rsa::RsaPrivateKey;

fn decrypt_loc_ciphertext(
    loc_ciphertext: &[u8],
    private_key: &RsaPrivateKey,
) -> Result<LocData, CallistoError> {
    let decrypted = encryption::decrypt_rsa(loc_ciphertext, private_key)?;
    encoding::decode_loc_data(&decrypted)
}

/// Opens a batch of envelopes and insists every one of them was addressed to
/// the expected trustee role. A mislabeled envelope poisons the whole batch.
fn decrypt_loc_ciphertexts_and_validate(
    loc_ciphertexts: &[Vec<u8>],
    private_key: &RsaPrivateKey,
    expected_loc_type: LocType,
) -> Result<Vec<LocData>, CallistoError> {
    let loc_data = loc_ciphertexts
        .iter()
        .map(|ciphertext| decrypt_loc_ciphertext(ciphertext, private_key))
        .collect::<Result<Vec<LocData>, CallistoError>>()?;

    if loc_data.iter().any(|d| d.loc_type() != expected_loc_type) {
        return Err(ProtocolError::NonMatchingLocType.into());
    }
    Ok(loc_data)
}

/// Pools the shares carried by the given envelopes and reconstructs the
/// symmetric key they jointly escrow
fn find_k_value_from_loc_data(loc_data: &[LocData]) -> Result<[u8; KEY_LEN], CallistoError> {
    let shares: Vec<shamir::ShamirShare> = loc_data.iter().map(|d| d.shamir_share()).collect();
    let k = shamir::recover_constant(&shares)?;
    Ok(k.to_aead_key()?)
}

/// Decrypts a list of encrypted assignment data records.
///
/// `dloc_ciphertexts_for_shares` are the envelopes of the distinct-submitter
/// subset, which supply the shares `k` is reconstructed from;
/// `dloc_ciphertexts` and `encrypted_assignment_data` are the envelope and
/// payload of every tuple being decrypted, in matching order.
pub fn decrypt_assignment_data(
    dloc_ciphertexts_for_shares: &[Vec<u8>],
    dloc_ciphertexts: &[Vec<u8>],
    encrypted_assignment_data: &[GcmCiphertext],
    dloc_private_key: &RsaPrivateKey,
) -> Result<Vec<AssignmentData>, CallistoError> {
    if dloc_ciphertexts.len() != encrypted_assignment_data.len() {
        return Err(ProtocolError::MismatchedLength.into());
    }

    let envelopes_to_decrypt = decrypt_loc_ciphertexts_and_validate(
        dloc_ciphertexts,
        dloc_private_key,
        LocType::Director,
    )?;
    let share_sources = decrypt_loc_ciphertexts_and_validate(
        dloc_ciphertexts_for_shares,
        dloc_private_key,
        LocType::Director,
    )?;

    let k = find_k_value_from_loc_data(&share_sources)?;

    envelopes_to_decrypt
        .iter()
        .zip(encrypted_assignment_data)
        .map(|(envelope, encrypted)| {
            let assignment_key = encryption::decrypt_aes(&k, envelope.encrypted_key())?;
            let encoded = encryption::decrypt_aes(&assignment_key, encrypted)?;
            encoding::decode_assignment_data(&encoded)
        })
        .collect()
}

/// Decrypts a list of encrypted entry data records; the Counselor-side
/// mirror of [decrypt_assignment_data]
pub fn decrypt_entry_data(
    loc_ciphertexts_for_shares: &[Vec<u8>],
    loc_ciphertexts: &[Vec<u8>],
    encrypted_entry_data: &[GcmCiphertext],
    loc_private_key: &RsaPrivateKey,
) -> Result<Vec<EntryData>, CallistoError> {
    if loc_ciphertexts.len() != encrypted_entry_data.len() {
        return Err(ProtocolError::MismatchedLength.into());
    }

    let envelopes_to_decrypt = decrypt_loc_ciphertexts_and_validate(
        loc_ciphertexts,
        loc_private_key,
        LocType::Counselor,
    )?;
    let share_sources = decrypt_loc_ciphertexts_and_validate(
        loc_ciphertexts_for_shares,
        loc_private_key,
        LocType::Counselor,
    )?;

    let k = find_k_value_from_loc_data(&share_sources)?;

    envelopes_to_decrypt
        .iter()
        .zip(encrypted_entry_data)
        .map(|(envelope, encrypted)| {
            let entry_key = encryption::decrypt_aes(&k, envelope.encrypted_key())?;
            let encoded = encryption::decrypt_aes(&entry_key, encrypted)?;
            encoding::decode_entry_data(&encoded)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::NONCE_LEN;

    #[test]
    fn mismatched_list_lengths_are_rejected() {
        let payload =
            GcmCiphertext::new(vec![0u8; NONCE_LEN], vec![1u8; 32], vec![2u8; 32]).unwrap();

        let result = decrypt_assignment_data(
            &[],
            &[vec![1u8; 16]],
            &[payload.clone(), payload],
            &crate::tests::dloc_keys().private_key,
        );
        assert!(matches!(
            result,
            Err(CallistoError::Protocol(ProtocolError::MismatchedLength))
        ));
    }

    #[test]
    fn garbage_envelope_fails_closed() {
        let payload =
            GcmCiphertext::new(vec![0u8; NONCE_LEN], vec![1u8; 32], vec![2u8; 32]).unwrap();

        // not an RSA ciphertext at all
        let result = decrypt_entry_data(
            &[vec![7u8; 64]],
            &[vec![7u8; 64]],
            &[payload],
            &crate::tests::loc_keys().private_key,
        );
        assert!(result.is_err());
    }
}
