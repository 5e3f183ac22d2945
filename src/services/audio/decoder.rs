//! # Audio Decoding
//!
//! Декодирование исходного файла в линейный PCM.
//!
//! Контейнер определяется по сигнатуре байтов, а не по заявленному медиа-типу:
//!
//! - WAV декодируется через hound (8/16/24/32 бит, целые и float)
//! - MP3, M4A/MP4 и ADTS AAC декодируются через Symphonia
//!
//! Каналы не сводятся в моно. Любая ошибка после распознавания сигнатуры
//! возвращается как `SplitError::Decode`, частичный результат не отдается.
//! Декодер и проба создаются заново на каждый вызов.

use std::io::{Cursor, ErrorKind};

use bytes::Bytes;
use hound::{SampleFormat, WavReader};
use log::{debug, info, warn};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::errors::{SplitError, SplitResult};
use crate::models::{DecodedAudio, SourceAudio};

/// Семейство контейнера, распознанное по первым байтам.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFamily {
    /// RIFF/WAVE, несжатый PCM
    Wav,
    /// MPEG audio (с ID3 или без)
    Mp3,
    /// ISO base media (M4A/MP4) с AAC внутри
    Mp4,
    /// Поток AAC в кадрах ADTS
    Adts,
}

impl ContainerFamily {
    /// Определяет контейнер по сигнатуре. `None`, если сигнатура неизвестна.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WAVE" {
            return Some(Self::Wav);
        }
        if data.len() >= 8 && &data[4..8] == b"ftyp" {
            return Some(Self::Mp4);
        }
        if data.len() >= 3 && &data[0..3] == b"ID3" {
            return Some(Self::Mp3);
        }
        if data.len() >= 2 && data[0] == 0xFF {
            let b1 = data[1];
            // 12 бит синхронизации и layer == 00
            if b1 & 0xF6 == 0xF0 {
                return Some(Self::Adts);
            }
            // 11 бит синхронизации MPEG и ненулевой layer
            if b1 & 0xE0 == 0xE0 && b1 & 0x06 != 0 {
                return Some(Self::Mp3);
            }
        }
        None
    }

    /// Семейство, которое обещает заявленный медиа-тип.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some(Self::Wav),
            "audio/mpeg" | "audio/mp3" => Some(Self::Mp3),
            "audio/mp4" | "audio/x-m4a" => Some(Self::Mp4),
            "audio/aac" => Some(Self::Adts),
            _ => None,
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Mp4 => "m4a",
            Self::Adts => "aac",
        }
    }
}

/// Декодирует принятый исходный файл.
pub fn decode_source(source: &SourceAudio) -> SplitResult<DecodedAudio> {
    debug!(
        "Decoding '{}' ({} bytes, {})",
        source.name(),
        source.size(),
        source.media_type()
    );
    decode_audio(source.data(), source.media_type())
}

/// Декодирует байты аудиофайла в PCM по каналам.
///
/// # Ошибки
///
/// * `SplitError::UnsupportedFormat` - сигнатура не распознана
/// * `SplitError::Decode` - сигнатура распознана, но извлечь семплы не удалось
pub fn decode_audio(data: &Bytes, media_type: &str) -> SplitResult<DecodedAudio> {
    let family = ContainerFamily::sniff(data).ok_or_else(|| {
        SplitError::UnsupportedFormat(format!(
            "unrecognized byte signature (declared type '{}')",
            media_type
        ))
    })?;

    match ContainerFamily::from_media_type(media_type) {
        Some(declared) if declared == family => {}
        // ADTS-поток часто приходит с типом audio/mp4
        Some(ContainerFamily::Mp4) if family == ContainerFamily::Adts => {}
        _ => warn!(
            "Declared media type '{}' does not match detected container {:?}",
            media_type, family
        ),
    }

    let audio = match family {
        ContainerFamily::Wav => decode_wav(data)?,
        _ => decode_with_symphonia(data, family)?,
    };

    info!(
        "Decoded {:?}: {} channel(s), {} frames at {} Hz ({:.3}s)",
        family,
        audio.channel_count(),
        audio.frames(),
        audio.sample_rate,
        audio.duration_secs()
    );
    Ok(audio)
}

/// Декодирует WAV через hound, сохраняя каналы раздельно.
fn decode_wav(data: &Bytes) -> SplitResult<DecodedAudio> {
    let reader = WavReader::new(Cursor::new(data.clone()))
        .map_err(|e| SplitError::Decode(format!("Invalid WAV header: {}", e)))?;

    let spec = reader.spec();
    let channel_count = spec.channels as usize;
    if channel_count == 0 {
        return Err(SplitError::Decode("WAV declares zero channels".to_string()));
    }

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, bits @ 1..=32) => {
            let scale = 1.0 / (1u64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 * scale))
                .collect::<Result<Vec<f32>, hound::Error>>()
                .map_err(|e| SplitError::Decode(format!("Failed to read WAV samples: {}", e)))?
        }
        (SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<f32>, hound::Error>>()
            .map_err(|e| SplitError::Decode(format!("Failed to read WAV samples: {}", e)))?,
        (format, bits) => {
            return Err(SplitError::Decode(format!(
                "Unsupported WAV sample format: {:?}, {} bits",
                format, bits
            )));
        }
    };

    if interleaved.len() % channel_count != 0 {
        return Err(SplitError::Decode(format!(
            "WAV data holds {} samples, not a multiple of {} channels",
            interleaved.len(),
            channel_count
        )));
    }

    let frames = interleaved.len() / channel_count;
    let mut channels = vec![Vec::with_capacity(frames); channel_count];
    for frame in interleaved.chunks_exact(channel_count) {
        for (out, &sample) in channels.iter_mut().zip(frame) {
            out.push(sample);
        }
    }

    finish(spec.sample_rate, channels)
}

/// Декодирует сжатые форматы через Symphonia.
fn decode_with_symphonia(data: &Bytes, family: ContainerFamily) -> SplitResult<DecodedAudio> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(data.clone())), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(family.extension());

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| SplitError::Decode(format!("Failed to probe {:?} stream: {}", family, e)))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| SplitError::Decode("No audio track found".to_string()))?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| SplitError::Decode(format!("Failed to create decoder: {}", e)))?;

    let mut channels: Vec<Vec<f32>> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => {
                return Err(SplitError::Decode(format!("Failed to read packet: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let ts = packet.ts();
        let decoded = decoder
            .decode(&packet)
            .map_err(|e| SplitError::Decode(format!("Corrupt packet at ts {}: {}", ts, e)))?;

        let spec = *decoded.spec();
        let count = spec.channels.count();
        if count == 0 {
            return Err(SplitError::Decode("Stream has no channels".to_string()));
        }
        if channels.is_empty() {
            channels = vec![Vec::new(); count];
        } else if channels.len() != count {
            return Err(SplitError::Decode(format!(
                "Channel count changed mid-stream: {} -> {}",
                channels.len(),
                count
            )));
        }
        match sample_rate {
            None => sample_rate = Some(spec.rate),
            Some(rate) if rate != spec.rate => {
                return Err(SplitError::Decode(format!(
                    "Sample rate changed mid-stream: {} -> {}",
                    rate, spec.rate
                )));
            }
            Some(_) => {}
        }

        if decoded.frames() == 0 {
            continue;
        }

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_planar_ref(decoded);

        // В планарном буфере каналы идут подряд
        let samples = sample_buf.samples();
        let frames = samples.len() / count;
        for (ch, out) in channels.iter_mut().enumerate() {
            out.extend_from_slice(&samples[ch * frames..(ch + 1) * frames]);
        }
    }

    let sample_rate =
        sample_rate.ok_or_else(|| SplitError::Decode("Unknown sample rate".to_string()))?;
    finish(sample_rate, channels)
}

fn finish(sample_rate: u32, channels: Vec<Vec<f32>>) -> SplitResult<DecodedAudio> {
    let audio = DecodedAudio {
        sample_rate,
        channels,
    };
    let frames = audio.check_layout().map_err(SplitError::Decode)?;
    if frames == 0 {
        return Err(SplitError::Decode("Stream contains no samples".to_string()));
    }
    Ok(audio)
}
