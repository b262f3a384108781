//! Decoding of binary-packed genotype blobs.
//!
//! A blob is a sequence of base-128 variable-length unsigned integers: the
//! high bit of each byte signals continuation, the low seven bits carry
//! payload, accumulated little-endian (least significant group first).  The
//! decoded integers pair up as `(individual_id, genotype_code_id)`.

use std::collections::HashMap;

use crate::common::{GenotypeCodeId, IndividualId};
use crate::db::GenotypeBlob;

/// Ways a packed genotype blob can be malformed.
///
/// Fatal for the blob at hand only; aggregation skips the blob and keeps
/// going (see [`crate::freqs`]).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CorruptEncoding {
    /// Blob ends inside a multi-byte integer.
    #[error("packed blob ends inside a multi-byte integer (offset {0})")]
    TruncatedInt(usize),
    /// A single integer does not fit into 64 bits.
    #[error("packed integer at offset {0} overflows 64 bits")]
    IntOverflow(usize),
    /// The integer sequence does not split into pairs.
    #[error("packed blob decodes to an odd number of integers ({0})")]
    OddLength(usize),
}

/// Decode a packed blob into the raw integer sequence.
///
/// An empty blob yields an empty vector; a variation with no genotyped
/// individuals is a valid terminal state, not an error.
pub fn decode_uints(blob: &[u8]) -> Result<Vec<u64>, CorruptEncoding> {
    let mut result = Vec::new();
    let mut value = 0u64;
    let mut shift = 0u32;
    let mut start = 0usize;
    let mut in_int = false;

    for (offset, &byte) in blob.iter().enumerate() {
        if !in_int {
            start = offset;
            in_int = true;
        }
        if shift >= 64 || (shift == 63 && (byte & 0x7f) > 1) {
            return Err(CorruptEncoding::IntOverflow(start));
        }
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            result.push(value);
            value = 0;
            shift = 0;
            in_int = false;
        } else {
            shift += 7;
        }
    }

    if in_int {
        return Err(CorruptEncoding::TruncatedInt(start));
    }

    Ok(result)
}

/// Decode a packed blob into `(individual_id, genotype_code_id)` pairs.
pub fn decode(blob: &[u8]) -> Result<Vec<(IndividualId, GenotypeCodeId)>, CorruptEncoding> {
    let uints = decode_uints(blob)?;
    if uints.len() % 2 != 0 {
        return Err(CorruptEncoding::OddLength(uints.len()));
    }
    Ok(uints
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect())
}

/// Encode integer pairs with the packed variable-length scheme.
///
/// Inverse of [`decode`]; used for fixture building.
pub fn encode(pairs: &[(u64, u64)]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(pairs.len() * 4);
    for &(individual_id, genotype_code_id) in pairs {
        push_uint(&mut buf, individual_id);
        push_uint(&mut buf, genotype_code_id);
    }
    buf
}

fn push_uint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        }
        buf.push(byte | 0x80);
    }
}

/// Per-request memoization of decoded blobs, keyed by blob id.
///
/// Scoped to one aggregation call; never shared across concurrent calls.
/// Corrupt outcomes are cached too so a bad blob is not re-decoded by
/// sibling lookups.
#[derive(Debug, Default)]
pub struct BlobCache {
    decoded: HashMap<u64, Result<Vec<(IndividualId, GenotypeCodeId)>, CorruptEncoding>>,
}

impl BlobCache {
    /// Decode `blob`, reusing the memoized result on repeat calls.
    pub fn decode(
        &mut self,
        blob: &GenotypeBlob,
    ) -> Result<&[(IndividualId, GenotypeCodeId)], CorruptEncoding> {
        match self
            .decoded
            .entry(blob.blob_id)
            .or_insert_with(|| decode(&blob.bytes))
        {
            Ok(pairs) => Ok(pairs.as_slice()),
            Err(e) => Err(e.clone()),
        }
    }

    /// Number of distinct blobs decoded so far.
    pub fn len(&self) -> usize {
        self.decoded.len()
    }

    /// Whether any blob has been decoded yet.
    pub fn is_empty(&self) -> bool {
        self.decoded.is_empty()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{decode, decode_uints, encode, BlobCache, CorruptEncoding};
    use crate::db::GenotypeBlob;

    #[rstest]
    #[case(&[])]
    #[case(&[(0, 0)])]
    #[case(&[(1, 2), (3, 4)])]
    #[case(&[(127, 128), (129, 16383)])]
    #[case(&[(16384, 2097151), (2097152, 268435455)])]
    #[case(&[(u64::from(u32::MAX), u64::MAX), (1, 300)])]
    fn round_trip(#[case] pairs: &[(u64, u64)]) -> Result<(), anyhow::Error> {
        let blob = encode(pairs);
        assert_eq!(decode(&blob)?, pairs.to_vec());
        Ok(())
    }

    #[test]
    fn known_encoding() -> Result<(), anyhow::Error> {
        // 1 is a single byte, 300 = 0b10101100 (low 7 bits, cont.) 0b00000010.
        assert_eq!(encode(&[(1, 300)]), vec![0x01, 0xac, 0x02]);
        assert_eq!(decode_uints(&[0x01, 0xac, 0x02])?, vec![1, 300]);
        Ok(())
    }

    #[test]
    fn empty_blob_is_empty_sequence() -> Result<(), anyhow::Error> {
        assert_eq!(decode(&[])?, vec![]);
        Ok(())
    }

    #[test]
    fn odd_length_is_corrupt() {
        // Three single-byte integers.
        assert_eq!(
            decode(&[0x01, 0x02, 0x03]),
            Err(CorruptEncoding::OddLength(3))
        );
    }

    #[test]
    fn truncated_int_is_corrupt() {
        // Continuation bit set on the final byte.
        assert_eq!(decode(&[0x01, 0xac]), Err(CorruptEncoding::TruncatedInt(1)));
    }

    #[test]
    fn overlong_int_is_corrupt() {
        // Eleven continuation groups cannot fit into 64 bits.
        let blob = [0xff; 10]
            .iter()
            .copied()
            .chain(std::iter::once(0x01))
            .collect::<Vec<u8>>();
        assert_eq!(decode(&blob), Err(CorruptEncoding::IntOverflow(0)));
    }

    #[test]
    fn cache_decodes_each_blob_once() -> Result<(), anyhow::Error> {
        let blob = GenotypeBlob::new(7, encode(&[(1, 2)]));
        let mut cache = BlobCache::default();

        assert_eq!(cache.decode(&blob)?, &[(1, 2)]);
        assert_eq!(cache.decode(&blob)?, &[(1, 2)]);
        assert_eq!(cache.len(), 1);

        Ok(())
    }

    #[test]
    fn cache_remembers_corrupt_blobs() {
        let blob = GenotypeBlob::new(8, vec![0x01]);
        let mut cache = BlobCache::default();

        assert_eq!(cache.decode(&blob), Err(CorruptEncoding::OddLength(1)));
        assert_eq!(cache.decode(&blob), Err(CorruptEncoding::OddLength(1)));
        assert_eq!(cache.len(), 1);
    }
}
