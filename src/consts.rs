//! Общие константы формата store-файла (Ogma v3).
//
// File layout (LE):
// [MAGIC4="OGMA"][version u16=3][flags u8]
// -- if flags bit0 (encrypted) --
// [salt 16][nonce 12][tag 16]
// -- common --
// [checksum 32]      -- SHA-256 over serialized, pre-compression bytes
// [payload_len u32]
// [payload bytes]    -- ciphertext if encrypted, else zstd bytes
//
// AAD for the AEAD layer = the 7 fixed header bytes (magic, version, flags).

// -------- Header --------
pub const MAGIC: &[u8; 4] = b"OGMA";

/// The single format version this codec reads and writes.
/// Exact-match gate: any other value is a breaking, unsupported format.
pub const VERSION: u16 = 3;

/// Fixed header: magic (4) + version (2) + flags (1).
pub const HEADER_LEN: usize = 7;

// -------- Flags --------
pub const FLAG_ENCRYPTED: u8 = 0x1;

/// All flag bits this version knows about. Anything else fails the read.
pub const FLAG_MASK: u8 = FLAG_ENCRYPTED;

// -------- Crypto field sizes --------
pub const SALT_LEN: usize = 16; // Argon2id salt
pub const NONCE_LEN: usize = 12; // AES-256-GCM nonce (96 bit)
pub const TAG_LEN: usize = 16; // AES-256-GCM tag (128 bit, detached)
pub const KEY_LEN: usize = 32; // derived symmetric key (AES-256)

// -------- Integrity --------
pub const CHECKSUM_LEN: usize = 32; // SHA-256
