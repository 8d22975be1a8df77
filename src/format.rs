// src/format.rs — Ogma store file codec (v3)
//
// Формат файла (LE):
// [MAGIC4="OGMA"][version u16=3][flags u8]
// -- if flags bit0 (encrypted) --
// [salt 16][nonce 12][tag 16]
// -- common --
// [checksum 32]      (SHA-256 над сериализованными байтами ДО сжатия)
// [payload_len u32]
// [payload bytes]    (ciphertext если encrypted, иначе zstd)
//
// Политика:
// - Атомарная запись: tmp+rename, затем fsync родительского каталога
//   (best-effort на Windows).
// - Чтение — единственная точка решения "валидный ли это файл": magic ->
//   version -> flags проверяются строго в этом порядке, до любой криптографии.
// - Encrypted: AAD = 7 байт заголовка; decrypt-ошибка не различает
//   "wrong password" и "tampered".
// - Checksum сверяется после декомпрессии; расхождение -> Integrity.

use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::aead;
use crate::codec;
use crate::consts::{
    CHECKSUM_LEN, FLAG_ENCRYPTED, FLAG_MASK, HEADER_LEN, MAGIC, NONCE_LEN, SALT_LEN, TAG_LEN,
    VERSION,
};
use crate::document::Document;
use crate::errors::{StoreError, StoreResult};
use crate::kdf;
use crate::options::StoreOptions;
use crate::util::{atomic_replace, tmp_path};

/// Fixed header bytes: magic || version (LE) || flags.
/// Doubles as the AEAD associated data, so these bytes cannot be altered
/// after write without invalidating the tag.
#[inline]
fn build_header(flags: u8) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[0..4].copy_from_slice(MAGIC);
    LittleEndian::write_u16(&mut header[4..6], VERSION);
    header[6] = flags;
    header
}

/// Serialize, checksum, compress, optionally encrypt, and atomically write
/// the document to `options.path`.
pub fn write_store_file<K, V>(document: &Document<K, V>, options: &StoreOptions) -> StoreResult<()>
where
    K: Serialize,
    V: Serialize,
{
    let flags = if options.password.is_some() {
        FLAG_ENCRYPTED
    } else {
        0
    };
    let header = build_header(flags);

    // Serialize and checksum the pre-compression bytes.
    let mut serialized = document.to_bytes()?;
    let checksum: [u8; CHECKSUM_LEN] = Sha256::digest(&serialized).into();

    let mut payload = codec::compress(&serialized, options.compression)?;
    serialized.zeroize(); // plaintext scratch, wipe before any crypto work

    let mut crypto_fields: Option<([u8; SALT_LEN], [u8; NONCE_LEN], [u8; TAG_LEN])> = None;
    if let Some(password) = options.password.as_deref() {
        // Fresh salt AND fresh nonce per write: the (key, nonce) pair can
        // never repeat across files.
        let salt = kdf::fresh_salt();
        let nonce = aead::fresh_nonce();
        let key = kdf::derive_key(password, &salt)?;
        let tag = aead::seal(&key, &nonce, &header, &mut payload)?;
        crypto_fields = Some((salt, nonce, tag));
    }

    if payload.len() > u32::MAX as usize {
        return Err(StoreError::Format(format!(
            "payload too large for the format ({} bytes)",
            payload.len()
        )));
    }

    let dest = options.path();
    let tmp = tmp_path(dest);
    if tmp.exists() {
        warn!("format: replacing leftover temp file {}", tmp.display());
        let _ = fs::remove_file(&tmp);
    }

    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)?;

    f.write_all(&header)?;
    if let Some((salt, nonce, tag)) = crypto_fields.as_mut() {
        f.write_all(&salt[..])?;
        f.write_all(&nonce[..])?;
        f.write_all(&tag[..])?;
        // Written out; wipe the local copies.
        salt.zeroize();
        nonce.zeroize();
        tag.zeroize();
    }
    f.write_all(&checksum)?;
    f.write_u32::<LittleEndian>(payload.len() as u32)?;
    f.write_all(&payload)?;
    f.sync_all()?; // flush tmp to disk before it can replace dest

    atomic_replace(&tmp, dest)?;

    debug!(
        "format: wrote {} ({} payload bytes, encrypted={})",
        dest.display(),
        payload.len(),
        flags & FLAG_ENCRYPTED != 0
    );
    Ok(())
}

/// Parse, optionally decrypt, decompress, checksum-verify, and deserialize a
/// store file.
pub fn read_store_file<K, V>(path: &Path, password: Option<&str>) -> StoreResult<Document<K, V>>
where
    K: DeserializeOwned,
    V: DeserializeOwned,
{
    let mut f = OpenOptions::new().read(true).open(path)?;

    // 1) magic + version + flags, strictly before any crypto material.
    let mut header = [0u8; HEADER_LEN];
    read_exact_or_truncated(&mut f, &mut header, "header")?;

    if &header[0..4] != MAGIC {
        return Err(StoreError::Format("bad magic, not an Ogma store".into()));
    }
    let version = LittleEndian::read_u16(&header[4..6]);
    if version != VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: version,
            supported: VERSION,
        });
    }
    let flags = header[6];
    if flags & !FLAG_MASK != 0 {
        return Err(StoreError::Format(format!(
            "unknown flag bits 0x{:02x}",
            flags & !FLAG_MASK
        )));
    }
    let encrypted = flags & FLAG_ENCRYPTED != 0;
    if encrypted && password.is_none() {
        // Checked before the salt is even read: no KDF cost is spent on a
        // file we cannot decrypt anyway.
        return Err(StoreError::PasswordRequired);
    }

    // 2) crypto fields (if any), checksum, length-prefixed payload.
    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    let mut tag = [0u8; TAG_LEN];
    if encrypted {
        read_exact_or_truncated(&mut f, &mut salt, "salt")?;
        read_exact_or_truncated(&mut f, &mut nonce, "nonce")?;
        read_exact_or_truncated(&mut f, &mut tag, "tag")?;
    }

    let mut checksum = [0u8; CHECKSUM_LEN];
    read_exact_or_truncated(&mut f, &mut checksum, "checksum")?;

    let mut len_buf = [0u8; 4];
    read_exact_or_truncated(&mut f, &mut len_buf, "payload length")?;
    let payload_len = LittleEndian::read_u32(&len_buf) as usize;

    // Sanity-check the length prefix against the file size before trusting
    // it with an allocation (up to 4 GiB from one corrupted field).
    let consumed = HEADER_LEN
        + if encrypted {
            SALT_LEN + NONCE_LEN + TAG_LEN
        } else {
            0
        }
        + CHECKSUM_LEN
        + 4;
    let remaining = f.metadata()?.len().saturating_sub(consumed as u64);
    if payload_len as u64 > remaining {
        return Err(StoreError::Format(format!(
            "payload length {payload_len} exceeds remaining file size {remaining}"
        )));
    }

    let mut payload = vec![0u8; payload_len];
    read_exact_or_truncated(&mut f, &mut payload, "payload")?;
    if f.read(&mut [0u8; 1])? != 0 {
        return Err(StoreError::Format("trailing bytes after payload".into()));
    }

    // 3) decrypt -> decompress -> verify -> deserialize.
    if encrypted {
        let key = kdf::derive_key(password.unwrap_or_default(), &salt)?;
        aead::open(&key, &nonce, &tag, &header, &mut payload)?;
    }

    let mut serialized = codec::decompress(&payload)?;
    if encrypted {
        // Decrypted-but-still-compressed plaintext is scratch too; wipe it
        // like the write path wipes its serialized copy.
        payload.zeroize();
    }

    let computed: [u8; CHECKSUM_LEN] = Sha256::digest(&serialized).into();
    if computed != checksum {
        serialized.zeroize();
        return Err(StoreError::Integrity);
    }

    let document = Document::from_bytes(&serialized);
    serialized.zeroize();

    debug!(
        "format: read {} ({} payload bytes, encrypted={})",
        path.display(),
        payload_len,
        encrypted
    );
    document
}

/// `read_exact` with EOF mapped to a Format error: a short field means a
/// truncated/malformed file, not an environment failure.
fn read_exact_or_truncated(f: &mut impl Read, buf: &mut [u8], what: &str) -> StoreResult<()> {
    f.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            StoreError::Format(format!("truncated store file ({what})"))
        } else {
            StoreError::Io(e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Record;
    use std::path::PathBuf;

    fn unique_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("ogma-format-{tag}-{nanos}.ogma"))
    }

    #[test]
    fn header_layout() {
        let h = build_header(FLAG_ENCRYPTED);
        assert_eq!(&h[0..4], b"OGMA");
        assert_eq!(LittleEndian::read_u16(&h[4..6]), VERSION);
        assert_eq!(h[6], FLAG_ENCRYPTED);
    }

    #[test]
    fn plain_roundtrip() {
        let path = unique_path("plain");
        let opts = StoreOptions::new(&path);
        let doc = Document::new(vec![Record {
            key: 1u32,
            value: "John|Doe|25".to_string(),
        }]);

        write_store_file(&doc, &opts).unwrap();
        let back: Document<u32, String> = read_store_file(&path, None).unwrap();
        assert_eq!(back, doc);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn plain_file_has_no_crypto_fields() {
        let path = unique_path("layout");
        let opts = StoreOptions::new(&path);
        let doc: Document<u32, String> = Document::empty();
        write_store_file(&doc, &opts).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // header + checksum + len + payload; crypto block absent
        let payload_len =
            LittleEndian::read_u32(&bytes[HEADER_LEN + CHECKSUM_LEN..HEADER_LEN + CHECKSUM_LEN + 4])
                as usize;
        assert_eq!(bytes.len(), HEADER_LEN + CHECKSUM_LEN + 4 + payload_len);

        let _ = std::fs::remove_file(&path);
    }
}
