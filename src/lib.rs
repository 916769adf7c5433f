// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! An implementation of the cryptographic core of the Callisto protocol
//!
//! Callisto lets multiple victims independently encrypt a report about an
//! alleged perpetrator such that no single report can be read by anyone,
//! including the servers storing it, but as soon as two reports name the
//! same perpetrator, a pair of designated offline trustees — the Legal
//! Options Counselor (LOC) and the Director LOC (DLOC) — can jointly
//! decrypt exactly the matched set.
//!
//! # Overview
//!
//! A submitter runs their low-entropy perpetrator identifier through an
//! OPRF held by an evaluator, expands the pseudorandom result into the
//! triple `(a, k, pi)`, escrows a point on the line `y = a*x + k` for each
//! trustee, and nests the report payloads under fresh data keys so that
//! each audience can open exactly its own layer. The database server only
//! ever sees `pi`: tuples carrying the same tag from at least two distinct
//! submitters form a match, and the shares inside the matched envelopes
//! reconstruct `k` and with it the escrowed keys.
//!
//! ```no_run
//! use callisto_core::{
//!     decrypt_assignment_data, find_matches, CallistoClient, CallistoEntry, LocPublicKeys,
//!     OprfServer, RsaKeyPair, SecretKey, OPRF_CIPHERSUITE,
//! };
//! use callisto_core::types::{AssignmentData, EntryData};
//! use rand::rngs::OsRng;
//!
//! # fn main() -> Result<(), callisto_core::CallistoError> {
//! let mut rng = OsRng;
//!
//! // One OPRF evaluator shared by every submitter
//! let server = OprfServer::new(OPRF_CIPHERSUITE, SecretKey::generate(&mut rng))?;
//!
//! // The trustee key pairs; the private halves live offline
//! let loc_keys = RsaKeyPair::generate(&mut rng)?;
//! let dloc_keys = RsaKeyPair::generate(&mut rng)?;
//! let pub_keys = LocPublicKeys {
//!     loc_public_key: loc_keys.public_key.clone(),
//!     dloc_public_key: dloc_keys.public_key.clone(),
//! };
//!
//! // Two submitters report the same perpetrator
//! let entry = CallistoEntry {
//!     entry_data: EntryData {
//!         perpetrator_name: "Foo".into(),
//!         perpetrator_twitter_user_name: "@foo".into(),
//!         victim_name: "Bar".into(),
//!         victim_phone_number: "111-111-1111".into(),
//!         victim_email: "victim@email.com".into(),
//!     },
//!     assignment_data: AssignmentData {
//!         victim_state_of_current_residence: "AA".into(),
//!         categorization_of_sexual_misconduct: "Baz".into(),
//!         industry_of_perpetrator: "Z".into(),
//!     },
//! };
//! let alice = CallistoClient::new(&server, &mut rng)?;
//! let bob = CallistoClient::new(&server, &mut rng)?;
//! let tuples = vec![
//!     alice.create_tuple(b"perpID", &entry, &pub_keys, &mut rng)?,
//!     bob.create_tuple(b"perpID", &entry, &pub_keys, &mut rng)?,
//! ];
//!
//! // The database server groups submissions by match tag
//! let matches = find_matches(&tuples);
//! assert_eq!(matches.len(), 1);
//!
//! // The Director recovers the routing metadata of the matched set
//! let found = &matches[0];
//! let for_shares: Vec<Vec<u8>> = found
//!     .matched_entries_with_distinct_user_ids
//!     .iter()
//!     .map(|t| t.dloc_ciphertext().to_vec())
//!     .collect();
//! let envelopes: Vec<Vec<u8>> = found
//!     .matched_entries
//!     .iter()
//!     .map(|t| t.dloc_ciphertext().to_vec())
//!     .collect();
//! let payloads: Vec<_> = found
//!     .matched_entries
//!     .iter()
//!     .map(|t| t.encrypted_assignment_data().clone())
//!     .collect();
//! let recovered =
//!     decrypt_assignment_data(&for_shares, &envelopes, &payloads, &dloc_keys.private_key)?;
//! assert_eq!(recovered.len(), 2);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

// Error types
pub mod errors;

// Primitives
pub mod encoding;
pub mod encryption;
pub mod field;
pub mod oprf;
pub mod shamir;

// Records
pub mod types;

// High-level API
pub mod client;
pub mod matching;
pub mod recovery;

#[cfg(test)]
mod tests;

// Exports

pub use crate::client::CallistoClient;
pub use crate::encryption::{GcmCiphertext, RsaKeyPair};
pub use crate::errors::CallistoError;
pub use crate::matching::{find_matches, Matchable, PiMatch};
pub use crate::oprf::{OprfEvaluator, OprfServer, PHatComputer, SecretKey, OPRF_CIPHERSUITE};
pub use crate::recovery::{decrypt_assignment_data, decrypt_entry_data};
pub use crate::types::{
    AssignmentData, CallistoEntry, CallistoTuple, EntryData, LocPublicKeys, LocType,
};
