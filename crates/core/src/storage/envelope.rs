//! Binary layout of a `.btcv` vault file.
//!
//! ```text
//! [BTCV: 4B] [version: 2B LE] [memory_cost: 4B LE] [time_cost: 4B LE]
//! [parallelism: 4B LE] [salt: 16B] [nonce: 12B] [ciphertext_len: 8B LE]
//! [ciphertext: variable]
//! ```

use super::crypto::{KdfParams, SealedPayload, NONCE_LEN, SALT_LEN};
use crate::errors::CoreError;

pub const MAGIC: &[u8; 4] = b"BTCV";

pub const CURRENT_VERSION: u16 = 1;

/// Size of everything before the ciphertext.
pub const HEADER_LEN: usize = 4 + 2 + 12 + SALT_LEN + NONCE_LEN + 8;

/// Serialize a sealed payload and the parameters it was sealed with.
pub fn encode(params: &KdfParams, payload: &SealedPayload) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + payload.ciphertext.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&CURRENT_VERSION.to_le_bytes());
    buf.extend_from_slice(&params.memory_cost.to_le_bytes());
    buf.extend_from_slice(&params.time_cost.to_le_bytes());
    buf.extend_from_slice(&params.parallelism.to_le_bytes());
    buf.extend_from_slice(&payload.salt);
    buf.extend_from_slice(&payload.nonce);
    buf.extend_from_slice(&(payload.ciphertext.len() as u64).to_le_bytes());
    buf.extend_from_slice(&payload.ciphertext);
    buf
}

/// Parse vault bytes back into parameters and payload.
///
/// KDF parameters are bounds-checked so a crafted file cannot make key
/// derivation allocate unbounded memory.
pub fn decode(data: &[u8]) -> Result<(KdfParams, SealedPayload), CoreError> {
    if data.len() < HEADER_LEN {
        return Err(CoreError::InvalidVaultFormat(format!(
            "File too small to be a vault: {} bytes",
            data.len()
        )));
    }

    let mut r = Reader { data, pos: 0 };
    if r.take(4)? != MAGIC {
        return Err(CoreError::InvalidVaultFormat("Bad magic bytes, not a BTCV vault".into()));
    }

    let version = r.u16()?;
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let params = KdfParams {
        memory_cost: r.u32()?,
        time_cost: r.u32()?,
        parallelism: r.u32()?,
    };
    check_bounds("memory_cost", params.memory_cost, 8, 1_048_576)?;
    check_bounds("time_cost", params.time_cost, 1, 20)?;
    check_bounds("parallelism", params.parallelism, 1, 16)?;

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(r.take(SALT_LEN)?);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(r.take(NONCE_LEN)?);

    let len = usize::try_from(r.u64()?)
        .map_err(|_| CoreError::InvalidVaultFormat("Ciphertext length overflows".into()))?;
    let ciphertext = r.take(len)?.to_vec();

    Ok((
        params,
        SealedPayload {
            salt,
            nonce,
            ciphertext,
        },
    ))
}

fn check_bounds(name: &str, value: u32, min: u32, max: u32) -> Result<(), CoreError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::InvalidVaultFormat(format!(
            "KDF {name} out of safe range: {value} (expected {min}..={max})"
        )))
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], CoreError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                CoreError::InvalidVaultFormat(format!(
                    "Vault truncated: wanted {n} bytes at offset {}, only {} left",
                    self.pos,
                    self.data.len() - self.pos
                ))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u16(&mut self) -> Result<u16, CoreError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, CoreError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64, CoreError> {
        let b = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(b);
        Ok(u64::from_le_bytes(arr))
    }
}
