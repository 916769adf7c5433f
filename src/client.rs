// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The submitter-side construction of the six-field tuple
//!
//! One tuple is built per report. The perpetrator identifier is run through
//! the OPRF to obtain P-Hat, P-Hat is expanded into `(a, k, pi)`, and the
//! report payloads are nested under fresh data keys so that each audience
//! (the submitter, the Counselor, the Director) can open exactly its own
//! layer once the protocol allows it.

use crate::encoding;
use crate::encryption::{self, GcmCiphertext, KEY_LEN};
use crate::errors::{CallistoError, CryptoError};
use crate::oprf::{OprfEvaluator, PHatComputer};
use crate::shamir::{self, ShamirShare};
use crate::types::{
    AssignmentData, CallistoEntry, CallistoTuple, EntryData, LocData, LocPublicKeys, LocType,
};
use hkdf::Hkdf;
use rand::{CryptoRng, RngCore};
use rsa::RsaPublicKey;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

const USER_ID_LEN: usize = 16;

/// The triple derived from P-Hat: the line coefficients `a` and `k`, and the
/// public match tag `pi`
#[derive(Zeroize, ZeroizeOnDrop)]
struct AkPiValues {
    a: [u8; KEY_LEN],
    k: [u8; KEY_LEN],
    pi: [u8; KEY_LEN],
}

/// Expands P-Hat into three 256-bit pseudorandom values, with empty salt and
/// empty info
fn derive_akpi_values(p_hat: &[u8]) -> Result<AkPiValues, CallistoError> {
    let hkdf = Hkdf::<Sha256>::new(None, p_hat);
    let mut okm = [0u8; 3 * KEY_LEN];
    hkdf.expand(&[], &mut okm).map_err(|_| CryptoError::Hkdf)?;

    let mut values = AkPiValues {
        a: [0u8; KEY_LEN],
        k: [0u8; KEY_LEN],
        pi: [0u8; KEY_LEN],
    };
    values.a.copy_from_slice(&okm[..KEY_LEN]);
    values.k.copy_from_slice(&okm[KEY_LEN..2 * KEY_LEN]);
    values.pi.copy_from_slice(&okm[2 * KEY_LEN..]);
    okm.zeroize();
    Ok(values)
}

/// A client capable of performing the submitter-side responsibilities of the
/// protocol. The identity and user key are drawn once and remain stable
/// across every report this client submits.
pub struct CallistoClient<E> {
    user_id: [u8; USER_ID_LEN],
    user_key: Zeroizing<[u8; KEY_LEN]>,
    p_hat_computer: PHatComputer<E>,
}

impl<E: OprfEvaluator> CallistoClient<E> {
    /// Creates a client with a fresh random identity and user key
    pub fn new<R: RngCore + CryptoRng>(evaluator: E, rng: &mut R) -> Result<Self, CallistoError> {
        let mut user_key = Zeroizing::new([0u8; KEY_LEN]);
        rng.try_fill_bytes(&mut user_key[..])
            .map_err(|_| CallistoError::Randomness)?;

        let mut uuid_bytes = [0u8; USER_ID_LEN];
        rng.try_fill_bytes(&mut uuid_bytes)
            .map_err(|_| CallistoError::Randomness)?;
        let user_id = uuid::Builder::from_random_bytes(uuid_bytes).into_uuid();

        Ok(Self {
            user_id: user_id.into_bytes(),
            user_key,
            p_hat_computer: PHatComputer::new(evaluator)?,
        })
    }

    /// The stable identifier this client submits under
    pub fn user_id(&self) -> &[u8] {
        &self.user_id
    }

    /// Performs the entire client-side encryption of one entry and returns
    /// the six-field tuple to be sent to a database server
    pub fn create_tuple<R: RngCore + CryptoRng>(
        &self,
        perp_id: &[u8],
        entry: &CallistoEntry,
        pub_keys: &LocPublicKeys,
        rng: &mut R,
    ) -> Result<CallistoTuple, CallistoError> {
        if perp_id.is_empty() {
            return Err(CallistoError::InvalidInput { name: "perpID" });
        }

        let p_hat = self.p_hat_computer.get_p_hat(perp_id, rng)?;
        let akpi = derive_akpi_values(&p_hat)?;

        // Evaluate the sharing polynomial y = a*x + k at x = U
        let share = shamir::compute_share(&akpi.a, &akpi.k, &self.user_id);

        let encrypted = self.encrypt_entry(entry, &akpi, rng)?;

        let loc_ciphertext = encrypt_loc_data(
            LocType::Counselor,
            &share,
            encrypted.entry_key_by_k.clone(),
            &pub_keys.loc_public_key,
            rng,
        )?;
        let dloc_ciphertext = encrypt_loc_data(
            LocType::Director,
            &share,
            encrypted.assignment_key_by_k.clone(),
            &pub_keys.dloc_public_key,
            rng,
        )?;

        CallistoTuple::new(
            self.user_id.to_vec(),
            akpi.pi.to_vec(),
            loc_ciphertext,
            dloc_ciphertext,
            encrypted.entry_key_by_user_key,
            encrypted.entry_data,
            encrypted.assignment_data,
        )
    }

    /// The symmetric layers of the construction
    fn encrypt_entry<R: RngCore + CryptoRng>(
        &self,
        entry: &CallistoEntry,
        akpi: &AkPiValues,
        rng: &mut R,
    ) -> Result<EncryptedCallistoEntry, CallistoError> {
        // eEntry under a fresh k_e
        let (entry_data, entry_key) = encrypt_entry_data(&entry.entry_data, &akpi.pi, rng)?;

        // c_e
        let entry_key_by_k = encryption::encrypt_aes(&akpi.k, &entry_key[..], &akpi.pi, rng)?;

        // c_u, the submitter's self-addressed copy of k_e
        let entry_key_by_user_key =
            encryption::encrypt_aes(&self.user_key[..], &entry_key[..], &akpi.pi, rng)?;

        // eAssign under a fresh k_a
        let (assignment_data, assignment_key) =
            encrypt_assignment_data(&entry.assignment_data, &akpi.pi, rng)?;

        // c_a
        let assignment_key_by_k =
            encryption::encrypt_aes(&akpi.k, &assignment_key[..], &akpi.pi, rng)?;

        Ok(EncryptedCallistoEntry {
            entry_data,
            entry_key_by_k,
            entry_key_by_user_key,
            assignment_data,
            assignment_key_by_k,
        })
    }
}

struct EncryptedCallistoEntry {
    entry_data: GcmCiphertext,            // eEntry
    entry_key_by_k: GcmCiphertext,        // c_e
    entry_key_by_user_key: GcmCiphertext, // c_u
    assignment_data: GcmCiphertext,       // eAssign
    assignment_key_by_k: GcmCiphertext,   // c_a
}

fn generate_data_key<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<Zeroizing<[u8; KEY_LEN]>, CallistoError> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    rng.try_fill_bytes(&mut key[..])
        .map_err(|_| CallistoError::Randomness)?;
    Ok(key)
}

/// Encodes and encrypts entry data under a freshly generated key, returning
/// both the ciphertext and the key
fn encrypt_entry_data<R: RngCore + CryptoRng>(
    data: &EntryData,
    pi: &[u8],
    rng: &mut R,
) -> Result<(GcmCiphertext, Zeroizing<[u8; KEY_LEN]>), CallistoError> {
    let encoded = encoding::encode_entry_data(data)?;
    let key = generate_data_key(rng)?;
    let ciphertext = encryption::encrypt_aes(&key[..], &encoded, pi, rng)?;
    Ok((ciphertext, key))
}

/// Encodes and encrypts assignment data under a freshly generated key,
/// returning both the ciphertext and the key
fn encrypt_assignment_data<R: RngCore + CryptoRng>(
    data: &AssignmentData,
    pi: &[u8],
    rng: &mut R,
) -> Result<(GcmCiphertext, Zeroizing<[u8; KEY_LEN]>), CallistoError> {
    let encoded = encoding::encode_assignment_data(data)?;
    let key = generate_data_key(rng)?;
    let ciphertext = encryption::encrypt_aes(&key[..], &encoded, pi, rng)?;
    Ok((ciphertext, key))
}

/// Forms the envelope for one trustee and seals it to that trustee's key
fn encrypt_loc_data<R: RngCore + CryptoRng>(
    loc_type: LocType,
    share: &ShamirShare,
    encrypted_key: GcmCiphertext,
    public_key: &RsaPublicKey,
    rng: &mut R,
) -> Result<Vec<u8>, CallistoError> {
    let loc_data = LocData::new(loc_type, share, encrypted_key);
    let encoded = encoding::encode_loc_data(&loc_data)?;
    encryption::encrypt_rsa(&encoded, public_key, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oprf::{OprfServer, SecretKey, OPRF_CIPHERSUITE};
    use rand::rngs::OsRng;

    fn server() -> OprfServer {
        OprfServer::new(OPRF_CIPHERSUITE, SecretKey::generate(&mut OsRng)).unwrap()
    }

    #[test]
    fn triple_derivation_is_deterministic_and_disjoint() {
        let p_hat = [7u8; 64];
        let one = derive_akpi_values(&p_hat).unwrap();
        let two = derive_akpi_values(&p_hat).unwrap();

        assert_eq!(one.a, two.a);
        assert_eq!(one.k, two.k);
        assert_eq!(one.pi, two.pi);

        assert_ne!(one.a, one.k);
        assert_ne!(one.k, one.pi);
        assert_ne!(one.a, one.pi);
    }

    #[test]
    fn clients_draw_distinct_identities() {
        let server = server();
        let one = CallistoClient::new(&server, &mut OsRng).unwrap();
        let two = CallistoClient::new(&server, &mut OsRng).unwrap();

        assert_eq!(one.user_id().len(), USER_ID_LEN);
        assert_ne!(one.user_id(), two.user_id());
    }

    #[test]
    fn empty_perpetrator_id_is_rejected() {
        let server = server();
        let client = CallistoClient::new(&server, &mut OsRng).unwrap();
        let entry = crate::tests::sample_entry();

        let err = client
            .create_tuple(b"", &entry, crate::tests::trustee_public_keys(), &mut OsRng)
            .unwrap_err();
        assert!(matches!(err, CallistoError::InvalidInput { name: "perpID" }));
    }
}
