// Domain models module
// Contains core data structures used throughout the splitting pipeline

pub mod audio;
pub mod section;

pub use audio::{DecodedAudio, RenderedSection, SourceAudio, SUPPORTED_MEDIA_TYPES};
pub use section::{Archive, ArchiveEntry, EncodedSection, ProcessingStatus, SectionPlan, Window};
