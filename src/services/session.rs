//! # Split Session
//!
//! Сессия хранит текущий источник, длину секции и последний результат.
//! Каждый запрос получает номер поколения; результат публикуется, только если
//! за время обработки не пришел более новый запрос. Устаревшие результаты
//! отбрасываются, так что в сессии всегда лежит ответ на последний запрос.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{error, info, warn};
use tokio::sync::mpsc::Sender;

use crate::config::SplitterConfig;
use crate::errors::{SplitError, SplitErrorKind, SplitResult};
use crate::events::{send_progress, try_send_progress, ProgressUpdate};
use crate::models::{Archive, ProcessingStatus, SourceAudio};
use crate::services::pipeline::{split_sections_with_progress, SectionSet};

#[derive(Debug, Default)]
struct SessionState {
    generation: u64,
    status: ProcessingStatus,
    source: Option<SourceAudio>,
    section_length: u32,
    result: Option<Arc<SectionSet>>,
    last_error: Option<SplitErrorKind>,
}

/// Номер запроса, выданный сессией
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket {
    generation: u64,
}

pub struct SplitSession {
    config: SplitterConfig,
    state: Mutex<SessionState>,
    progress_sender: Option<Sender<ProgressUpdate>>,
}

impl SplitSession {
    pub fn new(config: SplitterConfig) -> Self {
        let section_length = config.section_length;
        Self {
            config,
            state: Mutex::new(SessionState {
                section_length,
                ..SessionState::default()
            }),
            progress_sender: None,
        }
    }

    pub fn with_progress(config: SplitterConfig, sender: Sender<ProgressUpdate>) -> Self {
        Self {
            progress_sender: Some(sender),
            ..Self::new(config)
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    pub fn status(&self) -> ProcessingStatus {
        self.state().status
    }

    pub fn section_length(&self) -> u32 {
        self.state().section_length
    }

    pub fn source(&self) -> Option<SourceAudio> {
        self.state().source.clone()
    }

    /// Последний опубликованный результат
    pub fn current(&self) -> Option<Arc<SectionSet>> {
        self.state().result.clone()
    }

    /// Вид последней ошибки, если обработка завершилась неудачно
    pub fn last_error(&self) -> Option<SplitErrorKind> {
        self.state().last_error
    }

    /// Обрабатывает новый источник с текущей длиной секции.
    pub async fn set_source(&self, source: SourceAudio) -> SplitResult<Option<Arc<SectionSet>>> {
        let section_length = self.section_length();
        self.submit(source, section_length).await
    }

    /// Перезапускает обработку текущего источника с новой длиной секции.
    pub async fn set_section_length(&self, section_length: u32) -> SplitResult<Option<Arc<SectionSet>>> {
        let source = self.source().ok_or_else(|| {
            SplitError::InvalidParameter("no source audio has been loaded".to_string())
        })?;
        self.submit(source, section_length).await
    }

    /// Запускает обработку и ждет ее завершения.
    ///
    /// Возвращает `Ok(None)`, если пока шла обработка, пришел более новый
    /// запрос или сессию сбросили: такой результат никуда не публикуется.
    pub async fn submit(
        &self,
        source: SourceAudio,
        section_length: u32,
    ) -> SplitResult<Option<Arc<SectionSet>>> {
        let ticket = self.begin(&source, section_length);
        send_progress(
            &self.progress_sender,
            ProgressUpdate::Started {
                generation: ticket.generation,
            },
        )
        .await;

        let config = self.config.clone();
        let sender = self.progress_sender.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            split_sections_with_progress(&source, section_length, &config, &|update: ProgressUpdate| {
                try_send_progress(&sender, update)
            })
        })
        .await
        .map_err(|e| SplitError::Io(std::io::Error::other(format!("processing task failed: {}", e))))
        .and_then(|outcome| outcome);

        let (published, update) = self.finish(ticket, outcome);
        send_progress(&self.progress_sender, update).await;
        published
    }

    /// Собирает архив из текущего результата.
    pub fn archive(&self) -> SplitResult<Archive> {
        let current = self.current().ok_or_else(|| {
            SplitError::Archive("no processed sections are available".to_string())
        })?;
        current.archive(&self.config)
    }

    /// Сбрасывает сессию в исходное состояние. Запросы в работе будут отброшены.
    pub fn reset(&self) {
        let mut state = self.state();
        state.generation += 1;
        state.status = ProcessingStatus::Idle;
        state.source = None;
        state.section_length = self.config.section_length;
        state.result = None;
        state.last_error = None;
        info!("Session reset (generation {})", state.generation);
    }

    fn begin(&self, source: &SourceAudio, section_length: u32) -> Ticket {
        let mut state = self.state();
        state.generation += 1;
        state.status = ProcessingStatus::Processing;
        state.source = Some(source.clone());
        state.section_length = section_length;
        info!(
            "Request {}: '{}' with {}s sections",
            state.generation,
            source.name(),
            section_length
        );
        Ticket {
            generation: state.generation,
        }
    }

    /// Публикует результат, если запрос все еще последний.
    fn finish(
        &self,
        ticket: Ticket,
        outcome: SplitResult<SectionSet>,
    ) -> (SplitResult<Option<Arc<SectionSet>>>, ProgressUpdate) {
        let generation = ticket.generation;
        let mut state = self.state();

        if state.generation != generation {
            warn!(
                "Discarding result of request {} superseded by request {}",
                generation, state.generation
            );
            return (Ok(None), ProgressUpdate::Superseded { generation });
        }

        match outcome {
            Ok(set) => {
                let set = Arc::new(set);
                let sections = set.sections.len();
                state.result = Some(set.clone());
                state.status = ProcessingStatus::Ready;
                state.last_error = None;
                (Ok(Some(set)), ProgressUpdate::Finished { generation, sections })
            }
            Err(e) => {
                error!("Request {} failed: {}", generation, e);
                let kind = e.kind();
                state.result = None;
                state.status = ProcessingStatus::Error;
                state.last_error = Some(kind);
                (Err(e), ProgressUpdate::Failed { generation, kind })
            }
        }
    }
}
