use chrono::NaiveDate;

/// This is the standard way of converting a date to a string in daybook.
/// Day files and any user-facing date output use this key.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
