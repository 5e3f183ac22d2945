use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Одно окно плана нарезки, `[start_secs, end_secs)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// Порядковый номер окна, начиная с 0
    pub index: usize,
    /// Начало окна в секундах
    pub start_secs: f64,
    /// Конец окна в секундах
    pub end_secs: f64,
}

impl Window {
    pub fn length(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// Упорядоченный набор непересекающихся окон, покрывающих всю запись.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionPlan {
    /// Запрошенная длина секции в секундах
    pub section_length: u32,
    /// Полная длительность записи в секундах
    pub duration_secs: f64,
    pub windows: Vec<Window>,
}

impl SectionPlan {
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Window> {
        self.windows.iter()
    }
}

/// WAV-представление одной секции. Неизменяемо после создания.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSection {
    pub window: Window,
    /// Число фреймов (семплов на канал) в секции
    pub frames: usize,
    /// Полный WAV-файл: заголовок и данные
    pub data: Bytes,
}

/// Файл внутри архива.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    pub file_name: String,
    pub data: Bytes,
}

/// Готовый к скачиванию архив с секциями.
#[derive(Debug, Clone)]
pub struct Archive {
    /// Предлагаемое имя файла: `<base>_sections.zip`
    pub name: String,
    /// Записи в порядке окон
    pub entries: Vec<ArchiveEntry>,
    /// Байты ZIP-архива
    pub bytes: Bytes,
}

impl Archive {
    pub fn entry_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.file_name.as_str()).collect()
    }
}

/// Состояние обработки, которое видит пользовательский интерфейс.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    #[default]
    Idle,
    Processing,
    Ready,
    Error,
}
