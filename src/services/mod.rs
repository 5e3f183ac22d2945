// Services module
// Business logic of the splitter, from decoding to the session state

pub mod audio;     // Decoding, sectioning, rendering, WAV and ZIP
pub mod pipeline;  // Stateless split of one source
pub mod session;   // Last-request-wins processing state

pub use pipeline::{split_audio, split_audio_with_progress, split_sections, SectionSet};
pub use session::SplitSession;
