//! Библиотека нарезки аудиофайла на секции фиксированной длины.
//!
//! Исходный файл (WAV, MP3, M4A или AAC) декодируется в PCM, делится на окна
//! по `section_length` секунд, каждое окно кодируется в 16-битный WAV, и все
//! секции упаковываются в один ZIP-архив `<base>_sections.zip`.
//!
//! Для разовой нарезки есть чистая функция [`split_audio`]. Для интерфейса,
//! который меняет источник и длину секции на лету, есть [`SplitSession`]:
//! она публикует только результат последнего запроса.

pub mod config;
pub mod errors;
pub mod events;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{ArchiveCompression, QuantizationMode, SplitterConfig};
pub use errors::{SplitError, SplitErrorKind, SplitResult};
pub use events::ProgressUpdate;
pub use models::{
    Archive, ArchiveEntry, DecodedAudio, EncodedSection, ProcessingStatus, RenderedSection,
    SectionPlan, SourceAudio, Window, SUPPORTED_MEDIA_TYPES,
};
pub use services::{split_audio, split_audio_with_progress, split_sections, SectionSet, SplitSession};
pub use utils::logger::init_logger;
