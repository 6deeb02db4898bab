//! engine — имена движков и резолвер legacy id → имя.
//!
//! Реестр движков сервера — внешняя сущность; кодеку нужен только `EngineResolver`.
//! `EngineRegistry` — встроенная реализация с исторической таблицей legacy id.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::consts::{
    DB_TYPE_ARCHIVE_DB, DB_TYPE_ARIA, DB_TYPE_BLACKHOLE_DB, DB_TYPE_CSV_DB, DB_TYPE_EXAMPLE_DB,
    DB_TYPE_FEDERATED_DB, DB_TYPE_FIRST_DYNAMIC, DB_TYPE_HEAP, DB_TYPE_INNODB, DB_TYPE_MRG_MYISAM,
    DB_TYPE_MYISAM, DB_TYPE_PARTITION_DB, DB_TYPE_PERFORMANCE_SCHEMA, DB_TYPE_S3,
    DB_TYPE_SEQUENCE, NAME_CHAR_LEN,
};
use crate::error::{CodecError, Result};

/// Имя движка: UTF-8, не длиннее `NAME_CHAR_LEN` байт.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EngineName(String);

impl EngineName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.len() > NAME_CHAR_LEN {
            return Err(CodecError::malformed(format!(
                "engine name is {} bytes (max {})",
                name.len(),
                NAME_CHAR_LEN
            )));
        }
        Ok(Self(name))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| CodecError::malformed(format!("engine name is not UTF-8: {}", e)))?;
        Self::new(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EngineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// True, если id относится к исторической нумерации (а не к динамическому плагину).
#[inline]
pub fn is_legacy_id(id: u8) -> bool {
    id < DB_TYPE_FIRST_DYNAMIC
}

/// Injected capability: the server's engine registry as seen by the codec.
///
/// Implementations must tolerate concurrent read-only lookups.
pub trait EngineResolver {
    fn resolve_engine(&self, id: u8) -> Option<EngineName>;

    /// Used for the partition sub-engine id stored at header offset 61.
    fn resolve_engine_by_legacy_id(&self, id: u8) -> Option<EngineName> {
        self.resolve_engine(id)
    }
}

impl<R: EngineResolver + ?Sized> EngineResolver for &R {
    fn resolve_engine(&self, id: u8) -> Option<EngineName> {
        (**self).resolve_engine(id)
    }

    fn resolve_engine_by_legacy_id(&self, id: u8) -> Option<EngineName> {
        (**self).resolve_engine_by_legacy_id(id)
    }
}

const BUILTIN_ENGINES: &[(u8, &str)] = &[
    (DB_TYPE_HEAP, "MEMORY"),
    (DB_TYPE_MYISAM, "MyISAM"),
    (DB_TYPE_MRG_MYISAM, "MRG_MyISAM"),
    (DB_TYPE_INNODB, "InnoDB"),
    (DB_TYPE_EXAMPLE_DB, "EXAMPLE"),
    (DB_TYPE_ARCHIVE_DB, "ARCHIVE"),
    (DB_TYPE_CSV_DB, "CSV"),
    (DB_TYPE_FEDERATED_DB, "FEDERATED"),
    (DB_TYPE_BLACKHOLE_DB, "BLACKHOLE"),
    (DB_TYPE_PARTITION_DB, "partition"),
    (DB_TYPE_PERFORMANCE_SCHEMA, "PERFORMANCE_SCHEMA"),
    (DB_TYPE_S3, "S3"),
    (DB_TYPE_ARIA, "Aria"),
    (DB_TYPE_SEQUENCE, "SEQUENCE"),
];

/// Таблица legacy id → имя. Заполняется до использования, дальше только читается.
#[derive(Debug, Clone, Default)]
pub struct EngineRegistry {
    by_id: HashMap<u8, EngineName>,
}

impl EngineRegistry {
    /// Пустой реестр: ни один id не резолвится.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Реестр с историческими движками.
    pub fn builtin() -> Self {
        let mut r = Self::empty();
        for &(id, name) in BUILTIN_ENGINES {
            r.by_id.insert(id, EngineName(name.to_string()));
        }
        r
    }

    /// Зарегистрировать (или переопределить) движок для legacy id.
    ///
    /// Динамические id (>= `DB_TYPE_FIRST_DYNAMIC`) резолвер никогда не спрашивает,
    /// поэтому они отклоняются.
    pub fn register(&mut self, id: u8, name: &str) -> Result<()> {
        if !is_legacy_id(id) {
            return Err(CodecError::EngineResolutionFailed(id));
        }
        self.by_id.insert(id, EngineName::new(name)?);
        Ok(())
    }

    pub fn unregister(&mut self, id: u8) -> Option<EngineName> {
        self.by_id.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl EngineResolver for EngineRegistry {
    fn resolve_engine(&self, id: u8) -> Option<EngineName> {
        if !is_legacy_id(id) {
            return None;
        }
        self.by_id.get(&id).cloned()
    }
}
