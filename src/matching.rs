// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Grouping of submitted entries by their match tag
//!
//! The matcher sees nothing but the tag and the submitter identifier, so it
//! is written against exactly that capability rather than the full tuple.

use std::collections::BTreeMap;

/// The two accessors the matcher needs from an entry
pub trait Matchable {
    /// The match tag this entry was submitted under
    fn pi(&self) -> &[u8];

    /// The identifier of the submitter
    fn user_id(&self) -> &[u8];
}

/// A group of entries sharing one match tag, contributed by at least two
/// distinct submitters
pub struct PiMatch<'a, M> {
    /// The tag shared by every entry in the group
    pub shared_pi_value: Vec<u8>,
    /// All entries carrying the shared tag, in input order
    pub matched_entries: Vec<&'a M>,
    /// One representative per distinct submitter; the input to share recovery
    pub matched_entries_with_distinct_user_ids: Vec<&'a M>,
}

/// Scans the given entries for common match tags. A group qualifies only if
/// it holds at least two entries from at least two distinct submitters: a
/// single submitter reporting the same perpetrator repeatedly yields shares
/// on one abscissa, which can never be interpolated.
pub fn find_matches<M: Matchable>(entries: &[M]) -> Vec<PiMatch<'_, M>> {
    let mut pi_map: BTreeMap<&[u8], Vec<&M>> = BTreeMap::new();
    for entry in entries {
        pi_map.entry(entry.pi()).or_default().push(entry);
    }

    let mut matches = Vec::new();
    for (pi, group) in pi_map {
        if group.len() < 2 {
            continue;
        }

        let mut distinct: Vec<&M> = Vec::new();
        for &entry in &group {
            if !distinct
                .iter()
                .any(|chosen| chosen.user_id() == entry.user_id())
            {
                distinct.push(entry);
            }
        }
        if distinct.len() < 2 {
            continue;
        }

        matches.push(PiMatch {
            shared_pi_value: pi.to_vec(),
            matched_entries: group,
            matched_entries_with_distinct_user_ids: distinct,
        });
    }
    matches
}
