// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The records exchanged between submitters, the database and the trustees

use crate::encryption::GcmCiphertext;
use crate::errors::{CallistoError, EncodingError};
use crate::field::FieldElement;
use crate::matching::Matchable;
use crate::shamir::ShamirShare;
use rsa::RsaPublicKey;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Length in bytes of the match tag carried by every tuple
pub const PI_LEN: usize = 32;

/// Information about the perpetrator and the victim. Only meant to be viewed
/// by Counselors once a match is found.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntryData {
    pub perpetrator_name: String,
    pub perpetrator_twitter_user_name: String,
    pub victim_name: String,
    pub victim_phone_number: String,
    pub victim_email: String,
}

/// The routing metadata Directors need to assign matched submitters to
/// Counselors
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssignmentData {
    pub victim_state_of_current_residence: String,
    pub categorization_of_sexual_misconduct: String,
    pub industry_of_perpetrator: String,
}

/// One report as entered by a submitter, before any encryption
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallistoEntry {
    pub entry_data: EntryData,
    pub assignment_data: AssignmentData,
}

/// The public halves of the two trustee key pairs
#[derive(Clone)]
pub struct LocPublicKeys {
    pub loc_public_key: RsaPublicKey,
    pub dloc_public_key: RsaPublicKey,
}

/// The intended recipient of a trustee envelope
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocType {
    /// Also known as DLOC
    Director = 1,
    /// Also known as LOC
    Counselor = 2,
}

impl TryFrom<u8> for LocType {
    type Error = CallistoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(LocType::Director),
            2 => Ok(LocType::Counselor),
            _ => Err(EncodingError::Decode("locType").into()),
        }
    }
}

impl Serialize for LocType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for LocType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        LocType::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// The plaintext escrowed for one trustee: the submitter's secret share and
/// the key that unlocks the corresponding payload once enough shares meet
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocData {
    loc_type: LocType,
    #[serde(with = "serde_bytes")]
    u: Vec<u8>,
    #[serde(with = "serde_bytes")]
    s: Vec<u8>,
    encrypted_key: GcmCiphertext,
}

impl LocData {
    pub fn new(loc_type: LocType, share: &ShamirShare, encrypted_key: GcmCiphertext) -> Self {
        Self {
            loc_type,
            u: share.x().to_bytes(),
            s: share.y().to_bytes(),
            encrypted_key,
        }
    }

    pub fn loc_type(&self) -> LocType {
        self.loc_type
    }

    /// The encrypted entry key (Counselor) or assignment key (Director)
    pub fn encrypted_key(&self) -> &GcmCiphertext {
        &self.encrypted_key
    }

    /// The `(U, s)` share carried by this envelope
    pub fn shamir_share(&self) -> ShamirShare {
        ShamirShare::new(
            FieldElement::from_bytes(&self.u),
            FieldElement::from_bytes(&self.s),
        )
    }
}

impl<'de> Deserialize<'de> for LocData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "PascalCase")]
        struct LocDataWire {
            loc_type: LocType,
            #[serde(with = "serde_bytes")]
            u: Vec<u8>,
            #[serde(with = "serde_bytes")]
            s: Vec<u8>,
            encrypted_key: GcmCiphertext,
        }

        let wire = LocDataWire::deserialize(deserializer)?;
        if wire.u.is_empty() || wire.s.is_empty() {
            return Err(serde::de::Error::custom("share component is empty"));
        }
        Ok(LocData {
            loc_type: wire.loc_type,
            u: wire.u,
            s: wire.s,
            encrypted_key: wire.encrypted_key,
        })
    }
}

/// The six-field record a submitter sends to the database server
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallistoTuple {
    user_id: Vec<u8>,
    pi: Vec<u8>,
    loc_ciphertext: Vec<u8>,
    dloc_ciphertext: Vec<u8>,
    encrypted_entry_data_key_under_user_key: GcmCiphertext,
    encrypted_entry_data: GcmCiphertext,
    encrypted_assignment_data: GcmCiphertext,
}

impl CallistoTuple {
    /// Validating constructor; the only way to obtain a tuple
    pub fn new(
        user_id: Vec<u8>,
        pi: Vec<u8>,
        loc_ciphertext: Vec<u8>,
        dloc_ciphertext: Vec<u8>,
        encrypted_entry_data_key_under_user_key: GcmCiphertext,
        encrypted_entry_data: GcmCiphertext,
        encrypted_assignment_data: GcmCiphertext,
    ) -> Result<Self, CallistoError> {
        if user_id.is_empty() {
            return Err(CallistoError::InvalidInput { name: "userId" });
        }
        if pi.len() != PI_LEN {
            return Err(CallistoError::InvalidInput { name: "pi" });
        }
        if loc_ciphertext.is_empty() {
            return Err(CallistoError::InvalidInput {
                name: "locCiphertext",
            });
        }
        if dloc_ciphertext.is_empty() {
            return Err(CallistoError::InvalidInput {
                name: "dlocCiphertext",
            });
        }
        Ok(Self {
            user_id,
            pi,
            loc_ciphertext,
            dloc_ciphertext,
            encrypted_entry_data_key_under_user_key,
            encrypted_entry_data,
            encrypted_assignment_data,
        })
    }

    /// The submitter identifier of this tuple
    pub fn user_id(&self) -> &[u8] {
        &self.user_id
    }

    /// The match tag derived from P-Hat. Lets a database server find
    /// perpetrator matches between submitters.
    pub fn pi(&self) -> &[u8] {
        &self.pi
    }

    /// The envelope to be decrypted by a Counselor
    pub fn loc_ciphertext(&self) -> &[u8] {
        &self.loc_ciphertext
    }

    /// The envelope to be decrypted by a Director
    pub fn dloc_ciphertext(&self) -> &[u8] {
        &self.dloc_ciphertext
    }

    /// The entry data key, readable only with the submitter's own key
    pub fn encrypted_entry_data_key_under_user_key(&self) -> &GcmCiphertext {
        &self.encrypted_entry_data_key_under_user_key
    }

    /// The entry data encrypted under `k_e`
    pub fn encrypted_entry_data(&self) -> &GcmCiphertext {
        &self.encrypted_entry_data
    }

    /// The assignment data encrypted under `k_a`
    pub fn encrypted_assignment_data(&self) -> &GcmCiphertext {
        &self.encrypted_assignment_data
    }
}

impl Matchable for CallistoTuple {
    fn pi(&self) -> &[u8] {
        &self.pi
    }

    fn user_id(&self) -> &[u8] {
        &self.user_id
    }
}
