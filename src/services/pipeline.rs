//! # Split Pipeline
//!
//! Чистая функция `(SourceAudio, section_length) -> Archive` без внутреннего
//! состояния: декодирование, план нарезки, рендеринг и кодирование каждой
//! секции, упаковка в архив.
//!
//! Рендеринг и кодирование окон независимы и могут идти в пуле rayon.
//! Результаты собираются в `Vec` в порядке окон, поэтому архив всегда
//! получает секции по возрастанию индекса.

use log::{debug, info};
use rayon::prelude::*;

use crate::config::SplitterConfig;
use crate::errors::{SplitError, SplitResult};
use crate::events::ProgressUpdate;
use crate::models::{Archive, DecodedAudio, EncodedSection, SectionPlan, SourceAudio, Window};
use crate::services::audio::archive::build_archive;
use crate::services::audio::decoder::decode_source;
use crate::services::audio::renderer::render_section;
use crate::services::audio::sectioner::plan_sections;
use crate::services::audio::wav::encode_wav;

/// Все секции одного запроса, готовые к упаковке.
#[derive(Debug, Clone)]
pub struct SectionSet {
    /// Имя исходного файла без расширения
    pub base_name: String,
    pub plan: SectionPlan,
    pub sample_rate: u32,
    pub channel_count: usize,
    /// Секции в порядке окон
    pub sections: Vec<EncodedSection>,
}

impl SectionSet {
    /// Собирает архив для скачивания. Каждый вызов строит новый архив.
    pub fn archive(&self, config: &SplitterConfig) -> SplitResult<Archive> {
        build_archive(
            &self.sections,
            &self.base_name,
            self.plan.section_length,
            &config.entry_extension,
            config.compression,
        )
    }
}

/// Полный конвейер: от исходного файла до архива.
pub fn split_audio(
    source: &SourceAudio,
    section_length: u32,
    config: &SplitterConfig,
) -> SplitResult<Archive> {
    split_audio_with_progress(source, section_length, config, &|_: ProgressUpdate| {})
}

pub fn split_audio_with_progress(
    source: &SourceAudio,
    section_length: u32,
    config: &SplitterConfig,
    progress: &(dyn Fn(ProgressUpdate) + Sync),
) -> SplitResult<Archive> {
    let set = split_sections_with_progress(source, section_length, config, progress)?;
    progress(ProgressUpdate::Archiving);
    set.archive(config)
}

/// Декодирует и нарезает источник, не собирая архив.
pub fn split_sections(
    source: &SourceAudio,
    section_length: u32,
    config: &SplitterConfig,
) -> SplitResult<SectionSet> {
    split_sections_with_progress(source, section_length, config, &|_: ProgressUpdate| {})
}

pub fn split_sections_with_progress(
    source: &SourceAudio,
    section_length: u32,
    config: &SplitterConfig,
    progress: &(dyn Fn(ProgressUpdate) + Sync),
) -> SplitResult<SectionSet> {
    // Длину проверяем до декодирования, чтобы не тратить на него время
    if section_length == 0 {
        return Err(SplitError::InvalidParameter(
            "section length must be greater than zero".to_string(),
        ));
    }

    info!(
        "Splitting '{}' into {}s sections",
        source.name(),
        section_length
    );

    progress(ProgressUpdate::Decoding);
    let audio = decode_source(source)?;

    let plan = plan_sections(audio.duration_secs(), section_length)?;
    progress(ProgressUpdate::Sectioning { count: plan.len() });

    let sections = encode_plan(&audio, &plan, config, progress)?;

    info!(
        "Encoded {} section(s) from '{}'",
        sections.len(),
        source.name()
    );

    Ok(SectionSet {
        base_name: source.base_name(),
        sample_rate: audio.sample_rate,
        channel_count: audio.channel_count(),
        plan,
        sections,
    })
}

/// Рендерит и кодирует все окна плана, сохраняя их порядок.
pub fn encode_plan(
    audio: &DecodedAudio,
    plan: &SectionPlan,
    config: &SplitterConfig,
    progress: &(dyn Fn(ProgressUpdate) + Sync),
) -> SplitResult<Vec<EncodedSection>> {
    let total = plan.len();
    let encode_one = |window: &Window| -> SplitResult<EncodedSection> {
        let rendered = render_section(audio, window)?;
        let data = encode_wav(&rendered, config.quantization)?;
        progress(ProgressUpdate::Encoding {
            index: window.index,
            total,
        });
        Ok(EncodedSection {
            window: *window,
            frames: rendered.frames(),
            data,
        })
    };

    match config.max_workers {
        Some(1) => {
            debug!("Encoding {} section(s) sequentially", total);
            plan.iter().map(encode_one).collect()
        }
        Some(workers) => {
            debug!("Encoding {} section(s) on {} worker(s)", total, workers);
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| SplitError::Render(format!("Failed to build worker pool: {}", e)))?;
            pool.install(|| plan.windows.par_iter().map(encode_one).collect())
        }
        None => plan.windows.par_iter().map(encode_one).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuantizationMode;
    use crate::models::RenderedSection;
    use std::sync::Mutex;

    fn wav_source(channels: Vec<Vec<f32>>, sample_rate: u32, name: &str) -> SourceAudio {
        let frames = channels[0].len();
        let section = RenderedSection {
            window: Window {
                index: 0,
                start_secs: 0.0,
                end_secs: frames as f64 / sample_rate as f64,
            },
            sample_rate,
            channels,
        };
        let data = encode_wav(&section, QuantizationMode::Wrap).unwrap();
        SourceAudio::accept(data, "audio/wav", name).unwrap()
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let samples: Vec<f32> = (0..8000 * 9).map(|i| ((i % 200) as f32 / 100.0) - 1.0).collect();
        let source = wav_source(vec![samples.clone(), samples], 8000, "loop.wav");

        let sequential = SplitterConfig {
            max_workers: Some(1),
            ..SplitterConfig::default()
        };
        let pooled = SplitterConfig {
            max_workers: Some(3),
            ..SplitterConfig::default()
        };

        let a = split_sections(&source, 2, &sequential).unwrap();
        let b = split_sections(&source, 2, &pooled).unwrap();
        let c = split_sections(&source, 2, &SplitterConfig::default()).unwrap();

        assert_eq!(a.sections.len(), 5);
        assert_eq!(a.sections, b.sections);
        assert_eq!(a.sections, c.sections);
        for (i, section) in c.sections.iter().enumerate() {
            assert_eq!(section.window.index, i);
        }
        assert_eq!(a.base_name, "loop");
        assert_eq!(a.channel_count, 2);
    }

    #[test]
    fn test_progress_reports_every_section() {
        let source = wav_source(vec![vec![0.1; 4000 * 7]], 4000, "p.wav");
        let updates = Mutex::new(Vec::new());
        let archive = split_audio_with_progress(&source, 3, &SplitterConfig::default(), &|u: ProgressUpdate| {
            updates.lock().unwrap().push(u)
        })
        .unwrap();

        let updates = updates.into_inner().unwrap();
        assert_eq!(updates.first(), Some(&ProgressUpdate::Decoding));
        assert!(updates.contains(&ProgressUpdate::Sectioning { count: 3 }));
        let encoded = updates
            .iter()
            .filter(|u| matches!(u, ProgressUpdate::Encoding { total: 3, .. }))
            .count();
        assert_eq!(encoded, 3);
        assert_eq!(updates.last(), Some(&ProgressUpdate::Archiving));
        assert_eq!(archive.entries.len(), 3);
    }

    #[test]
    fn test_zero_length_fails_before_decoding() {
        // Байты не являются аудио: ошибка параметра должна прийти раньше
        let source = SourceAudio::accept(vec![0u8; 16], "audio/wav", "junk.wav").unwrap();
        let err = split_audio(&source, 0, &SplitterConfig::default()).unwrap_err();
        assert!(matches!(err, SplitError::InvalidParameter(_)));

        let err = split_audio(&source, 5, &SplitterConfig::default()).unwrap_err();
        assert!(matches!(err, SplitError::UnsupportedFormat(_)));
    }
}
