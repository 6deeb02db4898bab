//! Общие константы формата дескриптора таблицы (fixed header, extra2, legacy engine ids).

// -------- Fixed header --------

/// Размер фиксированного заголовка; сегмент extra2 начинается сразу за ним.
pub const FRM_HEADER_SIZE: usize = 64;

/// Ширина tabledef version (UUID).
pub const UUID_SIZE: usize = 16;

/// Минимум, который читает sniffer: заголовок + [tag u8][len u8] + UUID.
pub const SNIFF_HEADER_SIZE: usize = FRM_HEADER_SIZE + 2 + UUID_SIZE;

/// Текстовый маркер view-дескриптора (первые 10 байт файла).
pub const VIEW_MARKER: &[u8; 10] = b"TYPE=VIEW\n";

/// Сигнатура бинарного дескриптора: [0xFE][0x01][frm_version].
pub const FRM_MAGIC0: u8 = 0xFE;
pub const FRM_MAGIC1: u8 = 0x01;
pub const FRM_VER: u8 = 6;
pub const FRM_VER_CURRENT: u8 = FRM_VER + 5;

/// Старые файлы без extra2 хранят '/' в первом байте сегмента.
pub const OLD_FORMAT_MARKER: u8 = b'/';

/// Максимальная длина имени движка.
pub const NAME_CHAR_LEN: usize = 64;

/// Ширина номера поля в периодах (system_period = 2 номера).
pub const FRM_FIELDNO_SIZE: usize = 2;

/// Верхняя граница сегмента extra2 (u16 минус заголовок и 4-байтовый хвост).
pub const EXTRA2_MAX_SIZE: usize = 0xFFFF - FRM_HEADER_SIZE - 4;

// -------- Offsets (LE) --------
pub const OFF_FRM_VERSION: usize = 2;
pub const OFF_LEGACY_DB_TYPE: usize = 3;
pub const OFF_EXTRA2_LEN: usize = 4;
pub const OFF_RECORD_OFFSET: usize = 6;
/// 0xFFFF здесь означает, что настоящее смещение лежит по OFF_RECORD_OFFSET_EXT (u32).
pub const OFF_RECORD_OFFSET_HI: usize = 14;
pub const OFF_RECLENGTH: usize = 16;
pub const OFF_TABLE_OPTIONS: usize = 39;
pub const OFF_RECORD_OFFSET_EXT: usize = 47;
pub const OFF_EXTRA_NAME_LEN: usize = 55;
pub const OFF_PART_DB_TYPE: usize = 61;
pub const OFF_EXTRA2: usize = FRM_HEADER_SIZE;

pub const RECORD_OFFSET_OVERFLOW: u16 = 0xFFFF;

// -------- Sequence flag --------
pub const SEQUENCE_MASK: u8 = 0x30;
/// HA_CHOICE_YES, сдвинутый в нибл флага.
pub const HA_CHOICE_YES: u8 = 2;
pub const SEQUENCE_YES: u8 = HA_CHOICE_YES << 4;

// -------- Extra2 tag codes --------
// Коды совпадают с существующими файлами бит в бит; менять нельзя.
pub const EXTRA2_TABLEDEF_VERSION: u8 = 0;
pub const EXTRA2_DEFAULT_PART_ENGINE: u8 = 1;
pub const EXTRA2_GIS: u8 = 2;
pub const EXTRA2_APPLICATION_TIME_PERIOD: u8 = 3;
pub const EXTRA2_PERIOD_FOR_SYSTEM_TIME: u8 = 4;
pub const EXTRA2_INDEX_FLAGS: u8 = 5;

/// Неизвестные теги >= порога нельзя пропускать.
pub const EXTRA2_ENGINE_IMPORTANT: u8 = 128;

pub const EXTRA2_ENGINE_TABLEOPTS: u8 = 128;
pub const EXTRA2_FIELD_FLAGS: u8 = 129;
pub const EXTRA2_FIELD_DATA_TYPE_INFO: u8 = 130;
pub const EXTRA2_PERIOD_WITHOUT_OVERLAPS: u8 = 131;

/// Длины < 256 кодируются одним байтом; иначе [0][u16 LE].
pub const EXTRA2_LONG_LEN_MIN: usize = 256;

// -------- Legacy engine ids --------
pub const DB_TYPE_UNKNOWN: u8 = 0;
pub const DB_TYPE_HEAP: u8 = 6;
pub const DB_TYPE_MYISAM: u8 = 9;
pub const DB_TYPE_MRG_MYISAM: u8 = 10;
pub const DB_TYPE_INNODB: u8 = 12;
pub const DB_TYPE_EXAMPLE_DB: u8 = 15;
pub const DB_TYPE_ARCHIVE_DB: u8 = 16;
pub const DB_TYPE_CSV_DB: u8 = 17;
pub const DB_TYPE_FEDERATED_DB: u8 = 18;
pub const DB_TYPE_BLACKHOLE_DB: u8 = 19;
pub const DB_TYPE_PARTITION_DB: u8 = 20;
pub const DB_TYPE_PERFORMANCE_SCHEMA: u8 = 28;
pub const DB_TYPE_S3: u8 = 41;
pub const DB_TYPE_ARIA: u8 = 42;
pub const DB_TYPE_SEQUENCE: u8 = 44;
/// Ids >= этого значения — динамические плагины; имя движка хранится текстом.
pub const DB_TYPE_FIRST_DYNAMIC: u8 = 45;
pub const DB_TYPE_DEFAULT: u8 = 127;
