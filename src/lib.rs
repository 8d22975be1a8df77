// Базовые модули
pub mod consts;
pub mod errors;
pub mod options;

// Модель данных и кодеки
pub mod codec; // zstd compress/decompress
pub mod document; // Record/Document + canonical byte encoding

// Криптография
pub mod aead; // AES-256-GCM, detached tag, header-as-AAD
pub mod kdf; // Argon2id password -> key

// Формат файла и фасад
pub mod format; // store file codec (write/read, tmp+rename)
pub mod store; // Store<K, V>

// Утилиты (tmp_path, fsync_dir, atomic_replace)
mod util;

// Удобные реэкспорты
pub use document::{Document, Record};
pub use errors::{StoreError, StoreResult};
pub use format::{read_store_file, write_store_file};
pub use options::StoreOptions;
pub use store::Store;
