use anyhow::{Context, Result, anyhow};
use time::{
    Date, OffsetDateTime, UtcOffset,
    format_description::{self, OwnedFormatItem, well_known::Rfc3339},
    macros::{date, format_description},
};

/// Long weekday, day, long month and year, e.g. `Sunday 1 January 2023`.
pub const DEFAULT_FORMAT: &str = "[weekday] [day padding:none] [month repr:long] [year]";

/// Formats post dates for display using a `time` format description.
#[derive(Debug, Clone)]
pub struct DateFormatter {
    format: OwnedFormatItem,
}

impl DateFormatter {
    pub fn new(format: &str) -> Result<Self> {
        let format = format_description::parse_owned::<2>(format)
            .with_context(|| format!("Invalid date format {:?}", format))?;
        let formatter = Self { format };
        // Components that need a time of day only fail once a date is formatted
        formatter.format(date!(2023 - 01 - 01))?;
        Ok(formatter)
    }

    pub fn format(&self, date: Date) -> Result<String> {
        date.format(&self.format).with_context(|| format!("Failed to format date {}", date))
    }
}

impl Default for DateFormatter {
    fn default() -> Self {
        let format = format_description!(
            version = 2,
            "[weekday] [day padding:none] [month repr:long] [year]"
        );
        Self { format: OwnedFormatItem::from(format) }
    }
}

/// Parses the date forms accepted in front matter:
/// `2023-01-01`, RFC 3339 timestamps and `1 Jan 2023` / `1 January 2023`.
pub fn parse_date(value: &str) -> Result<Date> {
    let value = value.trim();
    if let Ok(date) = Date::parse(value, format_description!("[year]-[month]-[day]")) {
        return Ok(date);
    }
    if let Ok(datetime) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(datetime.to_offset(UtcOffset::UTC).date());
    }
    if let Ok(date) = Date::parse(
        value,
        format_description!("[day padding:none] [month repr:short case_sensitive:false] [year]"),
    ) {
        return Ok(date);
    }
    Date::parse(
        value,
        format_description!("[day padding:none] [month repr:long case_sensitive:false] [year]"),
    )
    .map_err(|_| anyhow!("Unrecognized date {:?}", value))
}

/// Serde adapters for front matter dates.
pub mod serde_flexible {
    use serde::{Deserialize, Deserializer, de::Error};
    use time::Date;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where D: Deserializer<'de> {
        let value = String::deserialize(deserializer)?;
        super::parse_date(&value).map_err(D::Error::custom)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, de::Error};
        use time::Date;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
        where D: Deserializer<'de> {
            match Option::<String>::deserialize(deserializer)? {
                Some(value) => super::super::parse_date(&value).map(Some).map_err(D::Error::custom),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn test_parse_date() {
        let cases: &[(&str, Option<Date>)] = &[
            ("2023-01-01", Some(date!(2023 - 01 - 01))),
            (" 2023-06-15 ", Some(date!(2023 - 06 - 15))),
            ("2023-06-15T23:30:00Z", Some(date!(2023 - 06 - 15))),
            ("2023-06-16T01:00:00+02:00", Some(date!(2023 - 06 - 15))),
            ("13 Feb 2023", Some(date!(2023 - 02 - 13))),
            ("1 january 2024", Some(date!(2024 - 01 - 01))),
            ("yesterday", None),
            ("2023-13-01", None),
        ];
        for &(value, expected) in cases {
            assert_eq!(parse_date(value).ok(), expected, "{value}");
        }
    }

    #[test]
    fn test_default_format() {
        for formatter in [DateFormatter::new(DEFAULT_FORMAT).unwrap(), DateFormatter::default()] {
            assert_eq!(formatter.format(date!(2023 - 01 - 01)).unwrap(), "Sunday 1 January 2023");
            assert_eq!(formatter.format(date!(2024 - 11 - 22)).unwrap(), "Friday 22 November 2024");
        }
    }

    #[test]
    fn test_invalid_format() {
        assert!(DateFormatter::new("[nonsense]").is_err());
        assert!(DateFormatter::new("[hour]:[minute]").is_err());
    }
}
