//! Versioned secret codec.
//!
//! Writes always produce the current versioned JSON record. Reads try an
//! ordered list of format parsers, first success wins:
//!
//! 1. the versioned JSON record,
//! 2. the legacy unversioned layout, `IV ‖ ciphertext` with PKCS7 padding,
//! 3. the same layout as written by the previous cryptographic library,
//!    which zero-padded the final block instead.
//!
//! Both legacy layouts prefixed the plaintext with `length|` before
//! encryption so the exact secret can be recovered after padding removal.
//! New formats slot into [`decrypt`] without touching callers.

use aes::cipher::{
    block_padding::{NoPadding, Pkcs7},
    BlockDecryptMut, BlockEncryptMut, KeyIvInit,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use generic_array::GenericArray;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{CryptoError, SecretKey};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Version tag written into every new secret record.
pub const SECRET_FORMAT_VERSION: u32 = 1;

const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;

/// The at-rest representation of an encrypted secret.
///
/// The IV length and cipher parameters are fixed by `version`; the two
/// legacy layouts carry no tag and are recognized structurally instead.
#[derive(Serialize, Deserialize)]
struct StoredSecret {
    version: u32,
    iv: String,
    ciphertext: String,
}

/// Encrypt a secret under AES-256-CBC with a fresh random IV, producing
/// the current versioned record as compact JSON.
pub fn encrypt(plaintext: &str, key: &SecretKey) -> Result<String, CryptoError> {
    encrypt_internal(rand::thread_rng(), plaintext, key)
}

fn encrypt_internal(
    mut rng: impl CryptoRng + RngCore,
    plaintext: &str,
    key: &SecretKey,
) -> Result<String, CryptoError> {
    let mut iv = [0u8; IV_LEN];
    rng.fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(key.material(), GenericArray::from_slice(&iv))
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let record = StoredSecret {
        version: SECRET_FORMAT_VERSION,
        iv: STANDARD.encode(iv),
        ciphertext: STANDARD.encode(ciphertext),
    };
    Ok(serde_json::to_string(&record)?)
}

/// Decrypt a stored secret blob.
///
/// Returns `None` for anything that does not decrypt to a plausible secret
/// under `key`, including corrupt input and blobs written under a foreign
/// key. Callers must treat `None` as "secret not available" and drive the
/// user toward re-enrollment; it is not a distinct error.
pub fn decrypt(blob: &str, key: &SecretKey) -> Option<String> {
    decrypt_versioned(blob, key)
        .or_else(|| decrypt_legacy(blob, key, LegacyPadding::Pkcs7))
        .or_else(|| decrypt_legacy(blob, key, LegacyPadding::Zero))
}

fn decrypt_versioned(blob: &str, key: &SecretKey) -> Option<String> {
    let record: StoredSecret = serde_json::from_str(blob).ok()?;
    if record.version != SECRET_FORMAT_VERSION {
        return None;
    }
    let iv = STANDARD.decode(&record.iv).ok()?;
    let ciphertext = STANDARD.decode(&record.ciphertext).ok()?;
    if iv.len() != IV_LEN || ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return None;
    }

    let plaintext = Aes256CbcDec::new(key.material(), GenericArray::from_slice(&iv))
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .ok()?;
    String::from_utf8(plaintext).ok()
}

/// Padding discipline of the library that wrote a legacy blob.
enum LegacyPadding {
    Pkcs7,
    Zero,
}

/// Decrypt the unversioned `IV ‖ ciphertext` layout, stored base64 encoded.
///
/// Read-only compatibility for blobs written before the format gained a
/// version tag; [`encrypt`] never produces this layout.
fn decrypt_legacy(blob: &str, key: &SecretKey, padding: LegacyPadding) -> Option<String> {
    let raw = STANDARD.decode(blob).ok()?;
    if raw.len() <= IV_LEN || (raw.len() - IV_LEN) % BLOCK_LEN != 0 {
        return None;
    }
    let (iv, ciphertext) = raw.split_at(IV_LEN);

    let cipher = Aes256CbcDec::new(key.material(), GenericArray::from_slice(iv));
    let padded = match padding {
        LegacyPadding::Pkcs7 => cipher.decrypt_padded_vec_mut::<Pkcs7>(ciphertext).ok()?,
        LegacyPadding::Zero => cipher.decrypt_padded_vec_mut::<NoPadding>(ciphertext).ok()?,
    };
    recover_exact_length(&padded)
}

/// Strip the `length|` prefix legacy writers embedded ahead of the secret.
///
/// A candidate only counts as a successful parse when the prefix is a
/// decimal length, the delimiter is present, at least `length` bytes follow
/// and the payload is valid UTF-8. Anything else falls through to the next
/// format parser.
fn recover_exact_length(plaintext: &[u8]) -> Option<String> {
    let delimiter = plaintext.iter().position(|&b| b == b'|')?;
    if delimiter == 0 || !plaintext[..delimiter].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let length: usize = std::str::from_utf8(&plaintext[..delimiter])
        .ok()?
        .parse()
        .ok()?;
    let start = delimiter + 1;
    let end = start.checked_add(length)?;
    let payload = plaintext.get(start..end)?;
    String::from_utf8(payload.to_vec()).ok()
}
