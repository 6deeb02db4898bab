//! classify — определение типа объекта по дескриптору без полного открытия таблицы.
//!
//! Состояния:
//!   Opening → Unreadable (Err / TableKind::Unknown)
//!   Opened  → View                         (маркер "TYPE=VIEW\n")
//!           → Normal                       (чужая сигнатура — «скорее всего таблица»)
//!           → Normal|Sequence + метаданные (best effort)
//!
//! Ошибки внутри extra2 и при поиске движка не ломают классификацию: они кладутся в
//! `engine_error` / `metadata_error` рядом с уже определённым `TableKind`.
//! Источник байтов принимается по значению и освобождается на любом пути выхода.

use log::{debug, warn};
use serde::Serialize;
use std::borrow::Cow;
use std::io;
use std::path::Path;

use crate::config::SnifferConfig;
use crate::consts::{DB_TYPE_PARTITION_DB, FRM_HEADER_SIZE, SNIFF_HEADER_SIZE};
use crate::engine::{is_legacy_id, EngineName, EngineResolver};
use crate::error::{CodecError, Result};
use crate::extra2::Extra2Metadata;
use crate::header::{is_binary_header, is_view_header, FixedHeader, TableVersion};
use crate::legacy;
use crate::source::{ByteSource, FileSource};

/// Kind of object a descriptor describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    /// The descriptor could not be opened or read.
    Unknown,
    Normal,
    View,
    Sequence,
}

/// What the caller wants extracted besides the kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Want {
    pub engine_name: bool,
    pub partition_engine: bool,
    pub version: bool,
}

impl Want {
    pub fn all() -> Self {
        Self {
            engine_name: true,
            partition_engine: true,
            version: true,
        }
    }

    /// Только тип (view или нет).
    pub fn kind_only() -> Self {
        Self::default()
    }
}

/// Result of sniffing one descriptor.
#[derive(Debug)]
pub struct Classification {
    pub kind: TableKind,
    /// Legacy engine id from header offset 3 (binary descriptors only).
    pub legacy_db_type: Option<u8>,
    pub engine: Option<EngineName>,
    pub partition_engine: Option<EngineName>,
    pub version: Option<TableVersion>,
    pub metadata: Option<Extra2Metadata>,
    pub engine_error: Option<CodecError>,
    pub metadata_error: Option<CodecError>,
}

impl Classification {
    fn new(kind: TableKind) -> Self {
        Self {
            kind,
            legacy_db_type: None,
            engine: None,
            partition_engine: None,
            version: None,
            metadata: None,
            engine_error: None,
            metadata_error: None,
        }
    }

    pub fn unknown() -> Self {
        Self::new(TableKind::Unknown)
    }
}

/// Sniffer with an injected engine resolver.
#[derive(Debug, Clone)]
pub struct Sniffer<R> {
    cfg: SnifferConfig,
    resolver: R,
}

impl<R: EngineResolver> Sniffer<R> {
    pub fn new(resolver: R) -> Self {
        Self::with_config(resolver, SnifferConfig::default())
    }

    pub fn with_config(resolver: R, cfg: SnifferConfig) -> Self {
        Self { cfg, resolver }
    }

    pub fn config(&self) -> &SnifferConfig {
        &self.cfg
    }

    /// Классифицировать дескриптор из произвольного источника.
    ///
    /// `Err` только если не удалось прочитать минимальный заголовок (`Unreadable`).
    pub fn classify<S: ByteSource>(&self, mut source: S, want: Want) -> Result<Classification> {
        let header = source.read_exact_at(0, SNIFF_HEADER_SIZE)?;

        if is_view_header(&header) {
            debug!("classify: view marker");
            return Ok(Classification::new(TableKind::View));
        }

        // Файл открылся — дальше по умолчанию «таблица», чтобы её можно было удалить.
        let mut out = Classification::new(TableKind::Normal);

        if !is_binary_header(&header) {
            debug!(
                "classify: foreign signature {:02x} {:02x} {:02x}, assuming table",
                header[0], header[1], header[2]
            );
            return Ok(out);
        }

        let hdr = FixedHeader::parse(&header)?;
        let dbt = hdr.legacy_db_type;
        out.legacy_db_type = Some(dbt);

        if hdr.is_sequence() {
            debug!("classify: sequence flag set");
            out.kind = TableKind::Sequence;
        }

        if want.version {
            out.version = TableVersion::sniff(&header);
        }

        let mut image: Option<Vec<u8>> = None;
        if want.engine_name || want.partition_engine {
            self.resolve_engines(&mut source, &hdr, want, &mut out, &mut image);
        }

        if self.cfg.decode_extra2 {
            match self.decode_metadata(&mut source, &header, &hdr, image.as_deref()) {
                Ok(m) => out.metadata = Some(m),
                Err(e) => {
                    if e.is_corruption() {
                        warn!("classify: extra2 segment damaged: {}", e);
                    } else {
                        warn!("classify: extra2 segment not decoded: {}", e);
                    }
                    out.metadata_error = Some(e);
                }
            }
        }

        debug!(
            "classify: kind={:?} db_type={} engine={:?}",
            out.kind, dbt, out.engine
        );
        Ok(out)
    }

    /// Открыть файл и классифицировать; любая ошибка чтения → `TableKind::Unknown`.
    pub fn classify_path(&self, path: &Path, want: Want) -> Classification {
        let source = match FileSource::open(path) {
            Ok(s) => s,
            Err(e) => {
                debug!("classify: cannot open {}: {}", path.display(), e);
                return Classification::unknown();
            }
        };
        match self.classify(source, want) {
            Ok(c) => c,
            Err(e) => {
                debug!("classify: {} unreadable: {}", path.display(), e);
                Classification::unknown()
            }
        }
    }

    fn resolve_engines<S: ByteSource>(
        &self,
        source: &mut S,
        hdr: &FixedHeader,
        want: Want,
        out: &mut Classification,
        image: &mut Option<Vec<u8>>,
    ) {
        let dbt = hdr.legacy_db_type;
        let mut need_name = false;
        let mut need_part = false;

        if is_legacy_id(dbt) {
            match self.resolver.resolve_engine(dbt) {
                Some(name) => {
                    if want.engine_name {
                        out.engine = Some(name);
                    }
                    if want.partition_engine && dbt == DB_TYPE_PARTITION_DB {
                        let sub = hdr.part_db_type;
                        if !is_legacy_id(sub) {
                            need_part = true;
                        } else {
                            match self.resolver.resolve_engine_by_legacy_id(sub) {
                                Some(p) => out.partition_engine = Some(p),
                                None => {
                                    warn!("classify: partition sub-engine {} not resolved", sub);
                                    out.engine_error = Some(CodecError::EngineResolutionFailed(sub));
                                }
                            }
                        }
                    }
                }
                None => {
                    warn!("classify: legacy engine id {} not resolved", dbt);
                    out.engine_error = Some(CodecError::EngineResolutionFailed(dbt));
                }
            }
        } else {
            need_name = want.engine_name;
        }

        if !(need_name || need_part) {
            return;
        }
        if !self.cfg.legacy_fallback {
            debug!("classify: legacy fallback disabled, engine name left empty");
            return;
        }

        let img = match load_image(source, self.cfg.max_image_bytes) {
            Ok(img) => img,
            Err(e) => {
                warn!("classify: cannot load descriptor image: {}", e);
                out.engine_error = Some(e);
                return;
            }
        };

        if need_name {
            match legacy::engine_name_from_image(&img, hdr) {
                Ok(name) => out.engine = name,
                Err(e) => {
                    warn!("classify: engine name not found in record region: {}", e);
                    out.engine_error = Some(e);
                }
            }
        }
        if need_part {
            match legacy::partition_engine_from_image(&img) {
                Ok(name) => out.partition_engine = name,
                Err(e) => {
                    warn!("classify: partition engine not found in extra2: {}", e);
                    out.engine_error = Some(e);
                }
            }
        }
        *image = Some(img);
    }

    fn decode_metadata<S: ByteSource>(
        &self,
        source: &mut S,
        header: &[u8],
        hdr: &FixedHeader,
        image: Option<&[u8]>,
    ) -> Result<Extra2Metadata> {
        let need = FRM_HEADER_SIZE + hdr.extra2_len as usize;
        let buf: Cow<'_, [u8]> = match image {
            Some(img) => Cow::Borrowed(img),
            None if header.len() >= need => Cow::Borrowed(header),
            None => Cow::Owned(read_prefix(source, need)?),
        };
        Extra2Metadata::read(&buf)
    }
}

/// Классифицировать с конфигурацией по умолчанию.
pub fn classify<S, R>(source: S, resolver: &R, want: Want) -> Result<Classification>
where
    S: ByteSource,
    R: EngineResolver + ?Sized,
{
    Sniffer::new(resolver).classify(source, want)
}

/// `classify` по пути; нечитаемый файл → `TableKind::Unknown`.
pub fn classify_path<R>(path: &Path, resolver: &R, want: Want) -> Classification
where
    R: EngineResolver + ?Sized,
{
    Sniffer::new(resolver).classify_path(path, want)
}

fn load_image<S: ByteSource>(source: &mut S, limit: u64) -> Result<Vec<u8>> {
    let size = source.file_size()?;
    if size > limit {
        return Err(CodecError::ImageTooLarge { size, limit });
    }
    Ok(source.read_all()?)
}

/// Прочитать первые `need` байт; короткий файл — `Truncated`, а не `Unreadable`.
fn read_prefix<S: ByteSource>(source: &mut S, need: usize) -> Result<Vec<u8>> {
    let size = source.file_size()?;
    if size < need as u64 {
        return Err(CodecError::Truncated {
            offset: FRM_HEADER_SIZE,
            need: need - FRM_HEADER_SIZE,
            have: (size as usize).saturating_sub(FRM_HEADER_SIZE),
        });
    }
    source.read_exact_at(0, need).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => CodecError::Truncated {
            offset: FRM_HEADER_SIZE,
            need: need - FRM_HEADER_SIZE,
            have: 0,
        },
        _ => CodecError::Unreadable(e),
    })
}
