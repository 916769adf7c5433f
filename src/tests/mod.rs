// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.


use crate::encryption::RsaKeyPair;
use crate::types::{AssignmentData, CallistoEntry, EntryData, LocPublicKeys};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;

// Trustee keys are expensive to generate; share one set across the test
// binary
static LOC_KEYS: Lazy<RsaKeyPair> = Lazy::new(|| RsaKeyPair::generate(&mut OsRng).unwrap());
static DLOC_KEYS: Lazy<RsaKeyPair> = Lazy::new(|| RsaKeyPair::generate(&mut OsRng).unwrap());
static TRUSTEE_PUBLIC_KEYS: Lazy<LocPublicKeys> = Lazy::new(|| LocPublicKeys {
    loc_public_key: LOC_KEYS.public_key.clone(),
    dloc_public_key: DLOC_KEYS.public_key.clone(),
});

pub(crate) fn loc_keys() -> &'static RsaKeyPair {
    &LOC_KEYS
}

pub(crate) fn dloc_keys() -> &'static RsaKeyPair {
    &DLOC_KEYS
}

pub(crate) fn trustee_public_keys() -> &'static LocPublicKeys {
    &TRUSTEE_PUBLIC_KEYS
}

pub(crate) fn sample_entry() -> CallistoEntry {
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
