// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A full protocol run through the public API surface

use callisto_core::types::{AssignmentData, EntryData};
use callisto_core::{
    decrypt_assignment_data, decrypt_entry_data, find_matches, CallistoClient, CallistoEntry,
    GcmCiphertext, LocPublicKeys, OprfServer, RsaKeyPair, SecretKey, OPRF_CIPHERSUITE,
};
use rand::rngs::OsRng;

fn sample_entry() -> CallistoEntry {
    CallistoEntry {
        entry_data: EntryData {
            perpetrator_name: "Foo".to_string(),
            perpetrator_twitter_user_name: "@foo".to_string(),
            victim_name: "Bar".to_string(),
            victim_phone_number: "111-111-1111".to_string(),
            victim_email: "victim@email.com".to_string(),
        },
        assignment_data: AssignmentData {
            victim_state_of_current_residence: "AA".to_string(),
            categorization_of_sexual_misconduct: "Baz".to_string(),
            industry_of_perpetrator: "Z".to_string(),
        },
    }
}

#[test]
fn submit_match_and_recover() {
    let mut rng = OsRng;

    // The evaluator key survives an operator-style hex round trip
    let key = SecretKey::generate(&mut rng);
    let key = SecretKey::from_hex(&key.to_hex()).unwrap();
    let oprf_server = OprfServer::new(OPRF_CIPHERSUITE, key).unwrap();

    let loc_keys = RsaKeyPair::generate(&mut rng).unwrap();
    let dloc_keys = RsaKeyPair::generate(&mut rng).unwrap();
    let pub_keys = LocPublicKeys {
        loc_public_key: loc_keys.public_key.clone(),
        dloc_public_key: dloc_keys.public_key.clone(),
    };

    let client_one = CallistoClient::new(&oprf_server, &mut rng).unwrap();
    let client_two = CallistoClient::new(&oprf_server, &mut rng).unwrap();

    let entry_one = sample_entry();
    let mut entry_two = sample_entry();
    entry_two.entry_data.perpetrator_twitter_user_name = "@bar".to_string();
    entry_two.assignment_data.victim_state_of_current_residence = "BB".to_string();

    let perp_id = b"perpID";
    let tuples = vec![
        client_one
            .create_tuple(perp_id, &entry_one, &pub_keys, &mut rng)
            .unwrap(),
        client_two
            .create_tuple(perp_id, &entry_two, &pub_keys, &mut rng)
            .unwrap(),
    ];

    let matches = find_matches(&tuples);
    assert_eq!(matches.len(), 1);
    let found = &matches[0];
    assert_eq!(found.matched_entries.len(), 2);

    let dloc_for_shares: Vec<Vec<u8>> = found
        .matched_entries_with_distinct_user_ids
        .iter()
        .map(|t| t.dloc_ciphertext().to_vec())
        .collect();
    let dloc_envelopes: Vec<Vec<u8>> = found
        .matched_entries
        .iter()
        .map(|t| t.dloc_ciphertext().to_vec())
        .collect();
    let assignment_payloads: Vec<GcmCiphertext> = found
        .matched_entries
        .iter()
        .map(|t| t.encrypted_assignment_data().clone())
        .collect();

    let assignments = decrypt_assignment_data(
        &dloc_for_shares,
        &dloc_envelopes,
        &assignment_payloads,
        &dloc_keys.private_key,
    )
    .unwrap();
    assert_eq!(
        assignments,
        vec![entry_one.assignment_data.clone(), entry_two.assignment_data.clone()]
    );

    let loc_for_shares: Vec<Vec<u8>> = found
        .matched_entries_with_distinct_user_ids
        .iter()
        .map(|t| t.loc_ciphertext().to_vec())
        .collect();
    let loc_envelopes: Vec<Vec<u8>> = found
        .matched_entries
        .iter()
        .map(|t| t.loc_ciphertext().to_vec())
        .collect();
    let entry_payloads: Vec<GcmCiphertext> = found
        .matched_entries
        .iter()
        .map(|t| t.encrypted_entry_data().clone())
        .collect();

    let entries = decrypt_entry_data(
        &loc_for_shares,
        &loc_envelopes,
        &entry_payloads,
        &loc_keys.private_key,
    )
    .unwrap();
    assert_eq!(
        entries,
        vec![entry_one.entry_data, entry_two.entry_data]
    );
}
