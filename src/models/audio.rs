//! # Audio Models
//!
//! Исходный файл, декодированный PCM и отрендеренная секция.

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{SplitError, SplitResult};
use crate::models::section::Window;

/// Медиа-типы, которые принимает внешний загрузчик файлов.
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/wav",
    "audio/mp4",
    "audio/x-m4a",
    // Поток AAC в кадрах ADTS
    "audio/aac",
    // Нестандартные синонимы, которые отдают некоторые браузеры
    "audio/mp3",
    "audio/x-wav",
    "audio/wave",
];

static EXTENSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.[^/.]+$").expect("extension pattern is valid"));

/// Исходная аудиозапись в том виде, в каком её передал загрузчик.
///
/// Неизменяема после принятия: байты хранятся в `Bytes`, поэтому клонирование
/// не копирует буфер.
#[derive(Debug, Clone)]
pub struct SourceAudio {
    data: Bytes,
    media_type: String,
    name: String,
}

impl SourceAudio {
    /// Принимает файл, если его медиа-тип входит в [`SUPPORTED_MEDIA_TYPES`].
    ///
    /// # Ошибки
    ///
    /// * `SplitError::UnsupportedFormat` - медиа-тип не из списка
    /// * `SplitError::InvalidParameter` - пустой буфер
    pub fn accept(data: impl Into<Bytes>, media_type: &str, name: &str) -> SplitResult<Self> {
        let media_type = media_type.trim().to_lowercase();
        if !SUPPORTED_MEDIA_TYPES.contains(&media_type.as_str()) {
            return Err(SplitError::UnsupportedFormat(format!(
                "media type '{}' is not accepted (expected MP3, WAV or M4A)",
                media_type
            )));
        }

        let data = data.into();
        if data.is_empty() {
            return Err(SplitError::InvalidParameter(format!("file '{}' is empty", name)));
        }

        Ok(Self {
            data,
            media_type,
            name: name.to_string(),
        })
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Имя файла без последнего расширения: `"talk.final.mp3"` -> `"talk.final"`.
    pub fn base_name(&self) -> String {
        EXTENSION_RE.replace(&self.name, "").into_owned()
    }
}

/// Декодированный линейный PCM: по одному массиву `f32` на канал.
///
/// Длительность и число каналов вычисляются, а не хранятся.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Частота дискретизации в Гц
    pub sample_rate: u32,
    /// Семплы по каналам, все массивы одной длины
    pub channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> SplitResult<Self> {
        let audio = Self { sample_rate, channels };
        audio.check_layout().map_err(SplitError::InvalidParameter)?;
        Ok(audio)
    }

    /// Проверяет инварианты и возвращает число фреймов на канал.
    pub fn check_layout(&self) -> Result<usize, String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".to_string());
        }
        let first = self
            .channels
            .first()
            .ok_or_else(|| "audio has no channels".to_string())?;
        let frames = first.len();
        if let Some((ch, samples)) = self
            .channels
            .iter()
            .enumerate()
            .find(|(_, samples)| samples.len() != frames)
        {
            return Err(format!(
                "channel {} has {} samples, channel 0 has {}",
                ch,
                samples.len(),
                frames
            ));
        }
        Ok(frames)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Число семплов в одном канале.
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Отрезок декодированного аудио, соответствующий одному окну плана.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSection {
    pub window: Window,
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl RenderedSection {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_checks_media_type() {
        let source = SourceAudio::accept(vec![1u8, 2, 3], "Audio/MPEG", "song.mp3").unwrap();
        assert_eq!(source.media_type(), "audio/mpeg");
        assert_eq!(source.size(), 3);

        let aac = SourceAudio::accept(vec![0xFFu8, 0xF1], "audio/aac", "voice.aac").unwrap();
        assert_eq!(aac.media_type(), "audio/aac");

        let err = SourceAudio::accept(vec![1u8], "video/mp4", "clip.mp4").unwrap_err();
        assert!(matches!(err, SplitError::UnsupportedFormat(_)));

        let err = SourceAudio::accept(Vec::<u8>::new(), "audio/wav", "empty.wav").unwrap_err();
        assert!(matches!(err, SplitError::InvalidParameter(_)));
    }

    #[test]
    fn test_base_name_strips_last_extension() {
        let base = |name: &str| SourceAudio::accept(vec![0u8], "audio/wav", name).unwrap().base_name();
        assert_eq!(base("lecture.wav"), "lecture");
        assert_eq!(base("talk.final.mp3"), "talk.final");
        assert_eq!(base("no_extension"), "no_extension");
        assert_eq!(base("dir.name/track"), "dir.name/track");
    }

    #[test]
    fn test_decoded_audio_layout() {
        let audio = DecodedAudio::new(4, vec![vec![0.0; 10], vec![0.5; 10]]).unwrap();
        assert_eq!(audio.frames(), 10);
        assert_eq!(audio.channel_count(), 2);
        assert!((audio.duration_secs() - 2.5).abs() < f64::EPSILON);

        assert!(DecodedAudio::new(44100, vec![vec![0.0; 3], vec![0.0; 2]]).is_err());
        assert!(DecodedAudio::new(0, vec![vec![0.0; 3]]).is_err());
        assert!(DecodedAudio::new(44100, vec![]).is_err());
    }
}
