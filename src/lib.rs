// Базовые модули формата
pub mod consts;
pub mod cursor;
pub mod error;
pub mod header;

// Сегмент extra2: tag/raw/read/write/scan
pub mod extra2;

// Движки и legacy fallback
pub mod engine;
pub mod legacy;

// Источники байтов, конфигурация и классификация
pub mod source;
pub mod config;
pub mod classify;

// Утилиты (hex_dump, ...) и CLI
pub mod util;
pub mod cli;

// Удобные реэкспорты
pub use classify::{classify, classify_path, Classification, Sniffer, TableKind, Want};
pub use config::SnifferConfig;
pub use engine::{EngineName, EngineRegistry, EngineResolver};
pub use error::CodecError;
pub use extra2::{Extra2Metadata, Extra2Record, Extra2Tag};
pub use header::{FixedHeader, TableVersion};
pub use source::{ByteSource, FileSource, SliceSource};
