use std::pin::Pin;

use generic_array::{typenum::U32, GenericArray};
use zeroize::Zeroize;

use crate::CryptoError;

/// A 32-byte AES-256 key supplied by the host.
///
/// The material is pinned to the heap so the compiler cannot leave stack
/// copies behind when the key is moved, and it is zeroized on drop. This
/// crate never derives or generates key material; lifecycle and rotation
/// are the host's concern.
pub struct SecretKey {
    material: Pin<Box<GenericArray<u8, U32>>>,
}

impl SecretKey {
    /// Wrap fixed-length key material.
    pub fn new(bytes: [u8; 32]) -> Self {
        let material = Box::pin(GenericArray::clone_from_slice(&bytes));
        Self { material }
    }

    pub(crate) fn material(&self) -> &GenericArray<u8, U32> {
        &self.material
    }
}

impl TryFrom<&[u8]> for SecretKey {
    type Error = CryptoError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; 32] = value.try_into().map_err(|_| CryptoError::InvalidKeyLength)?;
        Ok(Self::new(bytes))
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.material.zeroize();
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey").finish_non_exhaustive()
    }
}
