// Configuration module
// Centralized settings of the splitting pipeline

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{SplitError, SplitResult};

/// Диапазон длины секции, который предлагает интерфейс.
/// Сам нарезчик отвергает только ноль.
pub const SECTION_LENGTH_RANGE: RangeInclusive<u32> = 1..=60;

/// Длина секции по умолчанию в секундах
pub const DEFAULT_SECTION_LENGTH: u32 = 10;

/// Как переводить `f32` в 16-битный семпл, если значение вне [-1, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantizationMode {
    /// Значение переполняется по модулю 2^16 (историческое поведение)
    #[default]
    Wrap,
    /// Значение ограничивается диапазоном i16
    Saturate,
}

/// Метод сжатия записей в ZIP-архиве
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveCompression {
    #[default]
    Stored,
    Deflated,
}

impl ArchiveCompression {
    pub fn method(&self) -> zip::CompressionMethod {
        match self {
            Self::Stored => zip::CompressionMethod::Stored,
            Self::Deflated => zip::CompressionMethod::Deflated,
        }
    }
}

// Конфигурация нарезки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    pub section_length: u32,
    pub quantization: QuantizationMode,
    pub compression: ArchiveCompression,
    // None - размер пула rayon по умолчанию, Some(1) - без параллелизма
    pub max_workers: Option<usize>,
    pub entry_extension: String,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            section_length: DEFAULT_SECTION_LENGTH,
            quantization: QuantizationMode::default(),
            compression: ArchiveCompression::default(),
            max_workers: None,
            entry_extension: "wav".to_string(),
        }
    }
}

impl SplitterConfig {
    /// Загружает конфигурацию из JSON-файла. Отсутствующие поля берутся по умолчанию.
    pub fn load<P: AsRef<Path>>(path: P) -> SplitResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: SplitterConfig = serde_json::from_str(&raw)
            .map_err(|e| SplitError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        log::debug!("Loaded splitter config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn validate(&self) -> SplitResult<()> {
        if !SECTION_LENGTH_RANGE.contains(&self.section_length) {
            return Err(SplitError::InvalidParameter(format!(
                "section length {} is outside {}..={} seconds",
                self.section_length,
                SECTION_LENGTH_RANGE.start(),
                SECTION_LENGTH_RANGE.end()
            )));
        }
        if self.max_workers == Some(0) {
            return Err(SplitError::InvalidParameter(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if self.entry_extension.is_empty() || self.entry_extension.contains(['.', '/', '\\']) {
            return Err(SplitError::InvalidParameter(format!(
                "invalid entry extension '{}'",
                self.entry_extension
            )));
        }
        Ok(())
    }
}
