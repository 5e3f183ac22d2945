//! Common utility functions used across the pipeline

/// Formats whole seconds as `MM_SS` for archive entry names.
///
/// Minutes are not capped, so one hour becomes `60_00`.
pub fn format_time(seconds: u64) -> String {
    let minutes = seconds / 60;
    let remaining_seconds = seconds % 60;
    format!("{:02}_{:02}", minutes, remaining_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00_00");
        assert_eq!(format_time(9), "00_09");
        assert_eq!(format_time(75), "01_15");
        assert_eq!(format_time(600), "10_00");
        assert_eq!(format_time(3600), "60_00");
        assert_eq!(format_time(6001), "100_01");
    }
}
