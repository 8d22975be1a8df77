//! AEAD layer — AES-256-GCM с detached tag поверх сжатого payload.
//!
//! - AAD = 7 фиксированных байт заголовка (magic, version, flags): любое
//!   изменение этих байт ломает тег при decrypt, хотя хранятся они открыто.
//! - Nonce — 12 случайных байт (OsRng) на каждую запись. Повтор пары
//!   (key, nonce) катастрофичен; ключ и так свежий per-write (соль), nonce
//!   рандомизируется дополнительно.
//! - Ошибка decrypt — единый сигнал "wrong password OR tampered".

use aes_gcm::{
    aead::{generic_array::GenericArray, AeadInPlace, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::consts::{NONCE_LEN, TAG_LEN};
use crate::errors::{StoreError, StoreResult};
use crate::kdf::DerivedKey;

/// Fresh random nonce for one write.
pub fn fresh_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypt `buf` in place, returning the detached tag.
pub fn seal(
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    aad: &[u8],
    buf: &mut Vec<u8>,
) -> StoreResult<[u8; TAG_LEN]> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(nonce), aad, buf)
        .map_err(|e| StoreError::Crypto(format!("aes-gcm encrypt: {e}")))?;

    let mut out = [0u8; TAG_LEN];
    out.copy_from_slice(tag.as_slice());
    Ok(out)
}

/// Decrypt `buf` in place, verifying the detached tag against the AAD.
/// Tag mismatch maps to `Authentication` — wrong password and tampering are
/// deliberately indistinguishable (no oracle).
pub fn open(
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    tag: &[u8; TAG_LEN],
    aad: &[u8],
    buf: &mut Vec<u8>,
) -> StoreResult<()> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(nonce),
            aad,
            buf,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| StoreError::Authentication)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SALT_LEN;
    use crate::kdf::derive_key;

    fn test_key() -> DerivedKey {
        derive_key("test-password", &[0x33u8; SALT_LEN]).unwrap()
    }

    #[test]
    fn seal_open_roundtrip() {
        let key = test_key();
        let nonce = [0x01u8; NONCE_LEN];
        let aad = b"OGMA\x03\x00\x01";

        let mut buf = b"payload bytes".to_vec();
        let tag = seal(&key, &nonce, aad, &mut buf).unwrap();
        assert_ne!(buf.as_slice(), b"payload bytes");

        open(&key, &nonce, &tag, aad, &mut buf).unwrap();
        assert_eq!(buf.as_slice(), b"payload bytes");
    }

    #[test]
    fn flipped_ciphertext_fails_authentication() {
        let key = test_key();
        let nonce = [0x01u8; NONCE_LEN];
        let aad = b"aad";

        let mut buf = b"payload bytes".to_vec();
        let tag = seal(&key, &nonce, aad, &mut buf).unwrap();
        buf[0] ^= 0x01;

        let err = open(&key, &nonce, &tag, aad, &mut buf).unwrap_err();
        assert!(matches!(err, StoreError::Authentication));
    }

    #[test]
    fn mutated_aad_fails_authentication() {
        let key = test_key();
        let nonce = [0x01u8; NONCE_LEN];

        let mut buf = b"payload bytes".to_vec();
        let tag = seal(&key, &nonce, b"header-a", &mut buf).unwrap();

        let err = open(&key, &nonce, &tag, b"header-b", &mut buf).unwrap_err();
        assert!(matches!(err, StoreError::Authentication));
    }
}
