use chrono::{DateTime, Utc};

/// Returns the current epoch seconds.
pub fn current_epoch() -> i64 {
    Utc::now().timestamp()
}

/// Render epoch seconds in the display form used across the bot
/// (`DD.MM.YYYY HH:MM`).
pub fn format_epoch(epoch: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch, 0)
        .map(|dt| dt.format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_known_epoch() {
        // 2023-11-14 22:13:20 UTC
        assert_eq!(format_epoch(1_700_000_000), "14.11.2023 22:13");
    }

    #[test]
    fn out_of_range_epoch_is_empty() {
        assert_eq!(format_epoch(i64::MAX), "");
    }
}
