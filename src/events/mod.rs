// Events module
// Progress notifications emitted while a split request runs

use log::debug;
use serde::Serialize;
use tokio::sync::mpsc::Sender;

use crate::errors::SplitErrorKind;

/// Обновление прогресса для отправки клиенту
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressUpdate {
    /// Запрос принят в работу
    Started { generation: u64 },
    /// Декодирование исходного файла
    Decoding,
    /// План нарезки построен
    Sectioning { count: usize },
    /// Секция закодирована
    Encoding {
        /// Номер закодированной секции
        index: usize,
        /// Общее количество секций
        total: usize,
    },
    /// Упаковка в архив
    Archiving,
    /// Результат опубликован
    Finished { generation: u64, sections: usize },
    /// Результат отброшен, так как пришел более новый запрос
    Superseded { generation: u64 },
    /// Обработка завершилась ошибкой
    Failed { generation: u64, kind: SplitErrorKind },
}

/// Асинхронно отправляет обновление прогресса
pub async fn send_progress(sender: &Option<Sender<ProgressUpdate>>, update: ProgressUpdate) {
    if let Some(sender) = sender {
        let _ = sender.send(update).await;
    }
}

/// Отправка из синхронного кода без ожидания: при заполненном канале
/// обновление пропускается, чтобы не тормозить кодирование.
pub fn try_send_progress(sender: &Option<Sender<ProgressUpdate>>, update: ProgressUpdate) {
    if let Some(sender) = sender {
        if let Err(e) = sender.try_send(update) {
            debug!("Progress update dropped: {}", e);
        }
    }
}
