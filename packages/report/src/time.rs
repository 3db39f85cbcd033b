//! Report time splitting.
//!
//! The feed's time column is `M/D/Y H:M:S` (24-hour clock); the downstream
//! create-report call wants a date plus separate 12-hour, minute, and
//! am/pm fields.

use std::sync::LazyLock;

use regex::Regex;

use crate::TransformError;

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}/\d{1,2}/\d{2,4}) (\d{1,2}):(\d{2}):(\d{2})$").expect("valid regex")
});

/// A feed time value split into the downstream request's fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitTime {
    /// Date in `M/D/Y` form, as written in the feed.
    pub date: String,
    /// Hour on a 12-hour clock, as a decimal string.
    pub hour: String,
    /// Minute, zero-padded as written in the feed.
    pub minute: String,
    /// `"am"` or `"pm"`.
    pub meridiem: String,
}

/// Splits a `M/D/Y H:M:S` time value.
///
/// Hours above 12 are shifted onto the 12-hour clock and marked `pm`;
/// everything else (including hour 12) is marked `am`, matching the
/// upstream feed's own display convention.
///
/// # Errors
///
/// Returns [`TransformError::UnparseableTimestamp`] if the value does not
/// match the pattern or the hour field is out of range.
pub fn split_report_time(raw: &str) -> Result<SplitTime, TransformError> {
    let unparseable = || TransformError::UnparseableTimestamp {
        value: raw.to_owned(),
    };

    let captures = TIME_RE.captures(raw.trim()).ok_or_else(unparseable)?;

    let hour: u32 = captures[2].parse().map_err(|_| unparseable())?;
    if hour > 23 {
        return Err(unparseable());
    }

    let (hour, meridiem) = if hour > 12 {
        (hour - 12, "pm")
    } else {
        (hour, "am")
    };

    Ok(SplitTime {
        date: captures[1].to_owned(),
        hour: hour.to_string(),
        minute: captures[3].to_owned(),
        meridiem: meridiem.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_afternoon_time() {
        let split = split_report_time("10/29/2012 14:05:00").unwrap();
        assert_eq!(split.date, "10/29/2012");
        assert_eq!(split.hour, "2");
        assert_eq!(split.minute, "05");
        assert_eq!(split.meridiem, "pm");
    }

    #[test]
    fn morning_hours_keep_their_value() {
        let split = split_report_time("8/28/2012 9:30:15").unwrap();
        assert_eq!(split.hour, "9");
        assert_eq!(split.meridiem, "am");
    }

    #[test]
    fn hour_twelve_is_not_shifted() {
        let split = split_report_time("8/28/2012 12:00:00").unwrap();
        assert_eq!(split.hour, "12");
        assert_eq!(split.meridiem, "am");
    }

    #[test]
    fn rejects_time_without_seconds() {
        assert!(split_report_time("10/29/2012 14:05").is_err());
    }

    #[test]
    fn rejects_non_time_value() {
        let err = split_report_time("around noon").unwrap_err();
        assert!(matches!(
            err,
            TransformError::UnparseableTimestamp { ref value } if value == "around noon"
        ));
    }

    #[test]
    fn rejects_hour_out_of_range() {
        assert!(split_report_time("10/29/2012 25:05:00").is_err());
    }
}
