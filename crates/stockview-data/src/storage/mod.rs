//! 로컬 영속 저장소.

pub mod kv;

pub use kv::{get_json, set_json, FileKvStore, KvStore, MemoryKvStore};
