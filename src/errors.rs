//! Error taxonomy for store reads/writes.
//!
//! Callers need to tell apart "not an Ogma file" from "wrong password or
//! tampered" from "silently corrupted", so the codec returns a closed enum
//! instead of stringly-typed errors:
//! - `Format` / `UnsupportedVersion` — fatal parse failures, never retried;
//! - `PasswordRequired` — raised before any KDF work is spent;
//! - `Authentication` — AEAD tag mismatch; deliberately does NOT say whether
//!   the password was wrong or the file was tampered with;
//! - `Integrity` — checksum mismatch after decompression (corruption that an
//!   unencrypted file cannot report any other way);
//! - `Io` — filesystem errors, propagated unchanged (retry is caller policy).

use std::io;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Bad magic, unknown flag bits, truncated or malformed fields,
    /// undecodable document bytes.
    #[error("invalid store file: {0}")]
    Format(String),

    /// The version field is not the single version this codec implements.
    /// No forward/backward compatibility is attempted.
    #[error("unsupported format version {found} (this library supports only version {supported})")]
    UnsupportedVersion { found: u16, supported: u16 },

    /// The file is encrypted but no password was supplied.
    #[error("store file is encrypted, a password is required to open it")]
    PasswordRequired,

    /// AEAD tag mismatch: wrong password OR corrupted/tampered ciphertext.
    /// The two are indistinguishable on purpose.
    #[error("authentication failed: wrong password or corrupted file")]
    Authentication,

    /// Integrity checksum mismatch on the decompressed document bytes.
    #[error("integrity checksum mismatch: store file is corrupted")]
    Integrity,

    /// Key derivation setup failed (bad Argon2 parameters).
    #[error("key derivation failed: {0}")]
    Kdf(String),

    /// Cipher setup or encryption failed (decryption failures are
    /// `Authentication`).
    #[error("encryption failed: {0}")]
    Crypto(String),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
