//! # Archive Building
//!
//! Упаковка закодированных секций в один ZIP-архив в памяти.
//!
//! Имя записи: `<base>_<MM_SS>-<MM_SS>.<ext>`, где время считается как
//! `index * len` и `(index + 1) * len`. Конец последней записи берется по
//! номинальной длине секции и может превышать реальную длительность
//! записи; сами данные при этом верны.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use bytes::Bytes;
use log::{debug, info};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::config::ArchiveCompression;
use crate::errors::{SplitError, SplitResult};
use crate::models::{Archive, ArchiveEntry, EncodedSection};
use crate::utils::common::format_time;

/// Имя архива для скачивания.
pub fn archive_name(base_name: &str) -> String {
    format!("{}_sections.zip", base_name)
}

/// Имя файла секции с номером `index`.
pub fn section_file_name(base_name: &str, index: usize, section_length: u32, extension: &str) -> String {
    let start = index as u64 * section_length as u64;
    let end = (index as u64 + 1) * section_length as u64;
    format!(
        "{}_{}-{}.{}",
        base_name,
        format_time(start),
        format_time(end),
        extension
    )
}

/// Собирает архив из секций в порядке окон.
///
/// # Ошибки
///
/// `SplitError::Archive`, если секций нет, имена совпали или не удалось
/// записать ZIP.
pub fn build_archive(
    sections: &[EncodedSection],
    base_name: &str,
    section_length: u32,
    extension: &str,
    compression: ArchiveCompression,
) -> SplitResult<Archive> {
    if sections.is_empty() {
        return Err(SplitError::Archive("no sections to package".to_string()));
    }

    let mut seen = HashSet::with_capacity(sections.len());
    let mut entries = Vec::with_capacity(sections.len());
    for section in sections {
        let file_name = section_file_name(base_name, section.window.index, section_length, extension);
        if !seen.insert(file_name.clone()) {
            return Err(SplitError::Archive(format!("duplicate entry name '{}'", file_name)));
        }
        entries.push(ArchiveEntry {
            file_name,
            data: section.data.clone(),
        });
    }

    let options = SimpleFileOptions::default().compression_method(compression.method());
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for entry in &entries {
        debug!("Adding {} ({} bytes)", entry.file_name, entry.data.len());
        zip.start_file(entry.file_name.as_str(), options)?;
        zip.write_all(&entry.data)?;
    }
    let bytes = zip.finish()?.into_inner();

    let name = archive_name(base_name);
    info!(
        "Built archive {} with {} entries ({} bytes)",
        name,
        entries.len(),
        bytes.len()
    );

    Ok(Archive {
        name,
        entries,
        bytes: Bytes::from(bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Window;
    use std::io::Read;
    use zip::ZipArchive;

    fn sections(count: usize) -> Vec<EncodedSection> {
        (0..count)
            .map(|index| EncodedSection {
                window: Window {
                    index,
                    start_secs: index as f64 * 10.0,
                    end_secs: (index + 1) as f64 * 10.0,
                },
                frames: 1,
                data: Bytes::from(vec![index as u8; 8]),
            })
            .collect()
    }

    #[test]
    fn test_file_names() {
        assert_eq!(archive_name("podcast"), "podcast_sections.zip");
        assert_eq!(section_file_name("podcast", 0, 10, "wav"), "podcast_00_00-00_10.wav");
        assert_eq!(section_file_name("podcast", 5, 15, "wav"), "podcast_01_15-01_30.wav");
        assert_eq!(section_file_name("x", 59, 60, "wav"), "x_59_00-60_00.wav");
    }

    #[test]
    fn test_archive_contents_in_order() {
        let archive = build_archive(&sections(3), "talk", 10, "wav", ArchiveCompression::Stored).unwrap();
        assert_eq!(archive.name, "talk_sections.zip");
        assert_eq!(
            archive.entry_names(),
            vec!["talk_00_00-00_10.wav", "talk_00_10-00_20.wav", "talk_00_20-00_30.wav"]
        );

        let mut zip = ZipArchive::new(Cursor::new(archive.bytes.to_vec())).unwrap();
        assert_eq!(zip.len(), 3);
        for i in 0..3 {
            let mut file = zip.by_index(i).unwrap();
            assert_eq!(file.name(), archive.entries[i].file_name);
            assert_eq!(file.compression(), zip::CompressionMethod::Stored);
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            assert_eq!(data, vec![i as u8; 8]);
        }
    }

    #[test]
    fn test_deflated_archive_round_trips() {
        let archive = build_archive(&sections(2), "a", 1, "wav", ArchiveCompression::Deflated).unwrap();
        let mut zip = ZipArchive::new(Cursor::new(archive.bytes.to_vec())).unwrap();
        let mut file = zip.by_name("a_00_01-00_02.wav").unwrap();
        assert_eq!(file.compression(), zip::CompressionMethod::Deflated);
        let mut data = Vec::new();
        file.read_to_end(&mut data).unwrap();
        assert_eq!(data, vec![1u8; 8]);
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(matches!(
            build_archive(&[], "a", 10, "wav", ArchiveCompression::Stored),
            Err(SplitError::Archive(_))
        ));

        let mut dup = sections(2);
        dup[1].window.index = 0;
        assert!(matches!(
            build_archive(&dup, "a", 10, "wav", ArchiveCompression::Stored),
            Err(SplitError::Archive(_))
        ));
    }
}
