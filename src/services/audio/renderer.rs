//! Рендеринг секции: точное копирование диапазона семплов.
//!
//! Без ресемплинга, микширования и фильтрации. Границы окон переводятся в
//! индексы одинаково для соседних окон, поэтому склейка всех секций по
//! порядку дает исходные массивы без потерь и повторов.

use log::debug;

use crate::errors::{SplitError, SplitResult};
use crate::models::{DecodedAudio, RenderedSection, Window};

/// Переводит время в индекс семпла: `round(seconds * sample_rate)`.
pub fn seconds_to_frame(seconds: f64, sample_rate: u32) -> usize {
    (seconds * sample_rate as f64).round().max(0.0) as usize
}

/// Полуоткрытый диапазон фреймов окна, ограниченный длиной записи.
pub fn frame_range(window: &Window, sample_rate: u32, total_frames: usize) -> SplitResult<(usize, usize)> {
    if !window.start_secs.is_finite() || !window.end_secs.is_finite() {
        return Err(SplitError::Render(format!(
            "window {} has non-finite bounds",
            window.index
        )));
    }
    if window.end_secs < window.start_secs {
        return Err(SplitError::Render(format!(
            "window {} ends before it starts ({} < {})",
            window.index, window.end_secs, window.start_secs
        )));
    }

    let start = seconds_to_frame(window.start_secs, sample_rate).min(total_frames);
    let end = seconds_to_frame(window.end_secs, sample_rate).min(total_frames);
    Ok((start, end))
}

/// Копирует семплы окна из каждого канала.
///
/// # Ошибки
///
/// `SplitError::Render`, если каналы разной длины, частота нулевая или
/// границы окна некорректны.
pub fn render_section(audio: &DecodedAudio, window: &Window) -> SplitResult<RenderedSection> {
    let total_frames = audio.check_layout().map_err(SplitError::Render)?;
    let (start, end) = frame_range(window, audio.sample_rate, total_frames)?;

    let channels: Vec<Vec<f32>> = audio
        .channels
        .iter()
        .map(|samples| samples[start..end].to_vec())
        .collect();

    debug!(
        "Rendered section {}: frames {}..{} ({} channel(s))",
        window.index,
        start,
        end,
        channels.len()
    );

    Ok(RenderedSection {
        window: *window,
        sample_rate: audio.sample_rate,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::audio::sectioner::plan_sections;

    fn ramp(frames: usize) -> Vec<f32> {
        (0..frames).map(|i| i as f32 / frames as f32).collect()
    }

    #[test]
    fn test_render_exact_range() {
        let audio = DecodedAudio::new(100, vec![ramp(1000), ramp(1000)]).unwrap();
        let window = Window {
            index: 1,
            start_secs: 2.0,
            end_secs: 4.0,
        };
        let section = render_section(&audio, &window).unwrap();
        assert_eq!(section.frames(), 200);
        assert_eq!(section.channel_count(), 2);
        assert_eq!(section.channels[0][..], audio.channels[0][200..400]);
        assert_eq!(section.sample_rate, 100);
    }

    #[test]
    fn test_end_is_clamped_to_audio_length() {
        let audio = DecodedAudio::new(10, vec![ramp(25)]).unwrap();
        let window = Window {
            index: 0,
            start_secs: 2.0,
            end_secs: 3.0,
        };
        assert_eq!(render_section(&audio, &window).unwrap().frames(), 5);
    }

    #[test]
    fn test_concatenation_reproduces_source() {
        // 44.1 кГц и дробная длительность: границы попадают между семплами
        let frames = 44_100 * 7 + 123;
        let audio = DecodedAudio::new(44_100, vec![ramp(frames), ramp(frames)]).unwrap();
        let plan = plan_sections(audio.duration_secs(), 2).unwrap();

        for ch in 0..2 {
            let joined: Vec<f32> = plan
                .iter()
                .map(|w| render_section(&audio, w).unwrap())
                .flat_map(|s| s.channels[ch].clone())
                .collect();
            assert_eq!(joined, audio.channels[ch]);
        }
    }

    #[test]
    fn test_inconsistent_channels_is_render_error() {
        let audio = DecodedAudio {
            sample_rate: 8000,
            channels: vec![vec![0.0; 10], vec![0.0; 9]],
        };
        let window = Window {
            index: 0,
            start_secs: 0.0,
            end_secs: 0.001,
        };
        assert!(matches!(render_section(&audio, &window), Err(SplitError::Render(_))));
    }

    #[test]
    fn test_reversed_window_is_render_error() {
        let audio = DecodedAudio::new(8000, vec![vec![0.0; 10]]).unwrap();
        let window = Window {
            index: 3,
            start_secs: 1.0,
            end_secs: 0.5,
        };
        assert!(matches!(render_section(&audio, &window), Err(SplitError::Render(_))));
    }
}
