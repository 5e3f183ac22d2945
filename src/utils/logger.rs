use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

const DEFAULT_FILTER: &str = "warn,audio_splitter=info";

/// Настраивает env_logger для библиотеки и демо-утилиты.
///
/// Фильтр берется из `RUST_LOG`, иначе используется `DEFAULT_FILTER`.
/// Повторный вызов ничего не делает.
pub fn init_logger() {
    let env = Env::default().filter_or("RUST_LOG", DEFAULT_FILTER);

    let mut builder = Builder::from_env(env);

    // Декодеры symphonia слишком многословны на уровне debug
    builder
        .filter_module("symphonia_core", LevelFilter::Warn)
        .filter_module("symphonia_bundle_mp3", LevelFilter::Warn)
        .filter_module("symphonia_codec_aac", LevelFilter::Warn)
        .filter_module("symphonia_format_isomp4", LevelFilter::Warn)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr);

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
