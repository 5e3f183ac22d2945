//! Построение плана нарезки: непрерывные непересекающиеся окна
//! фиксированной длины, покрывающие всю запись.

use log::debug;

use crate::errors::{SplitError, SplitResult};
use crate::models::{SectionPlan, Window};

/// Разбивает длительность на окна по `section_length` секунд.
///
/// Количество окон равно `ceil(duration / section_length)`. Окно `i`
/// занимает `[i * len, min((i + 1) * len, duration))`, поэтому последнее окно
/// может быть короче, но никогда не бывает нулевым.
///
/// # Ошибки
///
/// `SplitError::InvalidParameter`, если длина секции равна нулю или
/// длительность не является конечным положительным числом.
pub fn plan_sections(duration_secs: f64, section_length: u32) -> SplitResult<SectionPlan> {
    if section_length == 0 {
        return Err(SplitError::InvalidParameter(
            "section length must be greater than zero".to_string(),
        ));
    }
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(SplitError::InvalidParameter(format!(
            "duration must be a positive number of seconds, got {}",
            duration_secs
        )));
    }

    let length = section_length as f64;
    let mut count = (duration_secs / length).ceil() as usize;
    // Деление может округлиться на одну единицу в любую сторону
    while (count as f64) * length < duration_secs {
        count += 1;
    }
    while count > 1 && ((count - 1) as f64) * length >= duration_secs {
        count -= 1;
    }

    let windows: Vec<Window> = (0..count)
        .map(|index| Window {
            index,
            start_secs: index as f64 * length,
            end_secs: ((index + 1) as f64 * length).min(duration_secs),
        })
        .collect();

    debug!(
        "Planned {} section(s) of {}s over {:.3}s",
        windows.len(),
        section_length,
        duration_secs
    );

    Ok(SectionPlan {
        section_length,
        duration_secs,
        windows,
    })
}
