//! # WAV Encoding
//!
//! Кодирование отрендеренной секции в несжатый WAV (16 бит, little-endian).
//!
//! Заголовок всегда занимает ровно 44 байта: `RIFF`/`WAVE`, 16-байтный блок
//! `fmt ` с кодом формата 1 (линейный PCM) и блок `data`. Семплы идут
//! вперемежку по каналам: фрейм 0 всех каналов, затем фрейм 1 и т.д.
//!
//! ## Квантование
//!
//! Семпл переводится как `round(x * 32767)`. В режиме
//! [`QuantizationMode::Wrap`] (по умолчанию) значения вне [-1, 1]
//! переполняются по модулю 2^16 при приведении к i16.
//! [`QuantizationMode::Saturate`] ограничивает значения диапазоном i16.
//! NaN и бесконечности в обоих режимах дают 0.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use bytes::Bytes;

use crate::config::QuantizationMode;
use crate::errors::{SplitError, SplitResult};
use crate::models::RenderedSection;

/// Длина заголовка WAV в байтах
pub const WAV_HEADER_LEN: usize = 44;

const BYTES_PER_SAMPLE: u16 = 2;
const BITS_PER_SAMPLE: u16 = 16;
const FORMAT_PCM: u16 = 1;

/// Переводит семпл `f32` в 16-битное целое.
pub fn quantize(sample: f32, mode: QuantizationMode) -> i16 {
    let scaled = (sample as f64 * 32767.0).round();
    if !scaled.is_finite() {
        return 0;
    }
    match mode {
        QuantizationMode::Wrap => scaled.rem_euclid(65536.0) as u16 as i16,
        QuantizationMode::Saturate => scaled.clamp(i16::MIN as f64, i16::MAX as f64) as i16,
    }
}

/// Записывает 44-байтный заголовок WAV для `data_len` байт PCM-данных.
pub fn write_header<W: Write>(
    writer: &mut W,
    channels: u16,
    sample_rate: u32,
    data_len: u32,
) -> SplitResult<()> {
    let riff_len = data_len
        .checked_add(36)
        .ok_or_else(|| SplitError::Encode(format!("data size {} overflows RIFF size", data_len)))?;
    let block_align = channels
        .checked_mul(BYTES_PER_SAMPLE)
        .ok_or_else(|| SplitError::Encode(format!("block align overflows for {} channels", channels)))?;
    let byte_rate = sample_rate
        .checked_mul(block_align as u32)
        .ok_or_else(|| SplitError::Encode(format!("byte rate overflows at {} Hz", sample_rate)))?;

    writer.write_all(b"RIFF")?;
    writer.write_u32::<LittleEndian>(riff_len)?;
    writer.write_all(b"WAVE")?;

    writer.write_all(b"fmt ")?;
    writer.write_u32::<LittleEndian>(16)?;
    writer.write_u16::<LittleEndian>(FORMAT_PCM)?;
    writer.write_u16::<LittleEndian>(channels)?;
    writer.write_u32::<LittleEndian>(sample_rate)?;
    writer.write_u32::<LittleEndian>(byte_rate)?;
    writer.write_u16::<LittleEndian>(block_align)?;
    writer.write_u16::<LittleEndian>(BITS_PER_SAMPLE)?;

    writer.write_all(b"data")?;
    writer.write_u32::<LittleEndian>(data_len)?;
    Ok(())
}

/// Кодирует секцию в полный WAV-файл в памяти.
///
/// # Ошибки
///
/// `SplitError::Encode`, если секция без каналов, каналы разной длины, или
/// размеры не помещаются в 16/32-битные поля заголовка.
pub fn encode_wav(section: &RenderedSection, mode: QuantizationMode) -> SplitResult<Bytes> {
    let channel_count = section.channel_count();
    if channel_count == 0 {
        return Err(SplitError::Encode(format!(
            "section {} has no channels",
            section.window.index
        )));
    }
    let channels = u16::try_from(channel_count)
        .map_err(|_| SplitError::Encode(format!("{} channels do not fit in 16 bits", channel_count)))?;

    let frames = section.frames();
    if section.channels.iter().any(|ch| ch.len() != frames) {
        return Err(SplitError::Encode(format!(
            "section {} has channels of different length",
            section.window.index
        )));
    }

    let data_len = frames
        .checked_mul(channel_count * BYTES_PER_SAMPLE as usize)
        .and_then(|len| u32::try_from(len).ok())
        .ok_or_else(|| {
            SplitError::Encode(format!(
                "{} frames x {} channels exceed the 4 GiB WAV limit",
                frames, channel_count
            ))
        })?;

    let mut buf = Vec::with_capacity(WAV_HEADER_LEN + data_len as usize);
    write_header(&mut buf, channels, section.sample_rate, data_len)?;

    for frame in 0..frames {
        for samples in &section.channels {
            buf.write_i16::<LittleEndian>(quantize(samples[frame], mode))?;
        }
    }

    Ok(Bytes::from(buf))
}
