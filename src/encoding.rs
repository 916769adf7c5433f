// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Canonical MessagePack encoding of the protocol's structured records
//!
//! Everything that gets encrypted is first encoded as a map of named fields,
//! so a single deterministic byte string stands for each logical record.

use crate::errors::{CallistoError, EncodingError};
use crate::types::{AssignmentData, EntryData, LocData};
use serde::Serialize;

fn encode<T: Serialize>(value: &T, name: &'static str) -> Result<Vec<u8>, CallistoError> {
    rmp_serde::to_vec_named(value).map_err(|_| EncodingError::Encode(name).into())
}

/// Returns the canonical encoding of entry data
pub fn encode_entry_data(entry_data: &EntryData) -> Result<Vec<u8>, CallistoError> {
    encode(entry_data, "entry data")
}

/// Decodes entry data previously written with [encode_entry_data]
pub fn decode_entry_data(encoded: &[u8]) -> Result<EntryData, CallistoError> {
    rmp_serde::from_slice(encoded).map_err(|_| EncodingError::Decode("entry data").into())
}

/// Returns the canonical encoding of assignment data
pub fn encode_assignment_data(assignment_data: &AssignmentData) -> Result<Vec<u8>, CallistoError> {
    encode(assignment_data, "assignment data")
}

/// Decodes assignment data previously written with [encode_assignment_data]
pub fn decode_assignment_data(encoded: &[u8]) -> Result<AssignmentData, CallistoError> {
    rmp_serde::from_slice(encoded).map_err(|_| EncodingError::Decode("assignment data").into())
}

/// Returns the canonical encoding of a trustee envelope
pub fn encode_loc_data(loc_data: &LocData) -> Result<Vec<u8>, CallistoError> {
    encode(loc_data, "LOC data")
}

/// Decodes a trustee envelope previously written with [encode_loc_data].
/// Rejects envelopes with an unknown recipient tag or empty share components.
pub fn decode_loc_data(encoded: &[u8]) -> Result<LocData, CallistoError> {
    rmp_serde::from_slice(encoded).map_err(|_| EncodingError::Decode("LOC data").into())
}
