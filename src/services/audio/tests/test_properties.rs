use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{ArchiveCompression, SplitterConfig};
use crate::events::ProgressUpdate;
use crate::models::{DecodedAudio, EncodedSection};
use crate::services::audio::archive::build_archive;
use crate::services::audio::renderer::render_section;
use crate::services::audio::sectioner::plan_sections;
use crate::services::pipeline::encode_plan;

fn random_audio(rng: &mut StdRng) -> DecodedAudio {
    let sample_rate = [8000, 11025, 22050, 44100][rng.gen_range(0..4)];
    let channels = rng.gen_range(1..=3);
    let frames = rng.gen_range(1..sample_rate as usize * 5);
    let samples = (0..channels)
        .map(|_| (0..frames).map(|_| rng.gen_range(-1.0f32..=1.0)).collect())
        .collect();
    DecodedAudio::new(sample_rate, samples).unwrap()
}

#[test]
fn test_rendered_sections_partition_audio() {
    let mut rng = StdRng::seed_from_u64(0xA0D1);
    for _ in 0..40 {
        let audio = random_audio(&mut rng);
        let length = rng.gen_range(1..=4);
        let plan = plan_sections(audio.duration_secs(), length).unwrap();

        let mut joined = vec![Vec::new(); audio.channel_count()];
        for window in plan.iter() {
            let section = render_section(&audio, window).unwrap();
            for (ch, samples) in section.channels.into_iter().enumerate() {
                joined[ch].extend(samples);
            }
        }
        assert_eq!(joined, audio.channels);
    }
}

#[test]
fn test_archive_entries_match_plan() {
    let mut rng = StdRng::seed_from_u64(0x21F);
    for _ in 0..10 {
        let audio = random_audio(&mut rng);
        let length = rng.gen_range(1..=3);
        let plan = plan_sections(audio.duration_secs(), length).unwrap();
        let sections: Vec<EncodedSection> =
            encode_plan(&audio, &plan, &SplitterConfig::default(), &|_: ProgressUpdate| {}).unwrap();

        let archive = build_archive(&sections, "clip", length, "wav", ArchiveCompression::Stored).unwrap();
        assert_eq!(archive.entries.len(), plan.len());

        let mut names = archive.entry_names();
        for name in &names {
            assert!(name.starts_with("clip_") && name.ends_with(".wav"), "{}", name);
            // clip_MM_SS-MM_SS.wav
            let stamp = &name["clip_".len()..name.len() - ".wav".len()];
            let parts: Vec<&str> = stamp.split('-').collect();
            assert_eq!(parts.len(), 2);
            for part in parts {
                let (mm, ss) = part.split_once('_').unwrap();
                assert!(mm.len() >= 2 && ss.len() == 2);
                assert!(ss.parse::<u32>().unwrap() < 60);
            }
        }
        names.sort();
        names.dedup();
        assert_eq!(names.len(), plan.len());

        let total: usize = sections.iter().map(|s| s.frames).sum();
        assert_eq!(total, audio.frames());
    }
}
