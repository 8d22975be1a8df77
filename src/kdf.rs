//! Key derivation — пароль + случайная соль -> 32-байтный ключ (Argon2id).
//!
//! Правила:
//! - Fresh random salt per write: один и тот же ключ для одного пароля в
//!   разных файлах структурно невозможен.
//! - Параметры Argon2id зафиксированы константами: апгрейд crate не должен
//!   молча поменять смысл байтов на диске.
//! - Derived key живёт в DerivedKey и стирается (Zeroize) в Drop.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::consts::{KEY_LEN, SALT_LEN};
use crate::errors::{StoreError, StoreResult};

/// Argon2id memory cost, KiB (19 MiB).
pub const ARGON2_M_COST_KIB: u32 = 19 * 1024;
/// Argon2id iteration count.
pub const ARGON2_T_COST: u32 = 2;
/// Argon2id parallelism (lanes).
pub const ARGON2_P_COST: u32 = 1;

/// 32-байтный материал ключа. Стирается из памяти в Drop.
pub struct DerivedKey {
    key: [u8; KEY_LEN],
}

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive a symmetric key from a UTF-8 password and a per-file salt.
pub fn derive_key(password: &str, salt: &[u8; SALT_LEN]) -> StoreResult<DerivedKey> {
    let params = Params::new(ARGON2_M_COST_KIB, ARGON2_T_COST, ARGON2_P_COST, Some(KEY_LEN))
        .map_err(|e| StoreError::Kdf(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| {
            key.zeroize();
            StoreError::Kdf(e.to_string())
        })?;
    Ok(DerivedKey { key })
}

/// Fresh random salt for one write.
pub fn fresh_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}
