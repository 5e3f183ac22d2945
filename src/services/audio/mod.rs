//! # Audio модуль
//!
//! Этапы нарезки: декодирование, план окон, рендеринг секций,
//! кодирование в WAV и упаковка в архив.

pub mod decoder;
pub mod sectioner;
pub mod renderer;
pub mod wav;
pub mod archive;

pub use archive::{archive_name, build_archive, section_file_name};
pub use decoder::{decode_audio, decode_source, ContainerFamily};
pub use renderer::render_section;
pub use sectioner::plan_sections;
pub use wav::{encode_wav, quantize};

#[cfg(test)]
mod tests {
    mod test_scenarios;
    mod test_properties;
    mod test_compressed;
}
