//! Storage and retrieval of moisture readings.

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::models::{NewReading, Reading};

// ---

/// Dashboard time filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    #[default]
    All,
    Days(u32),
}

impl TimeRange {
    /// Interpret the `time_range` query parameter.
    ///
    /// A string of ASCII digits is a day count; `all`, an absent value and
    /// anything unrecognised mean no filter.
    pub fn parse(raw: Option<&str>) -> Self {
        // ---
        match raw {
            Some(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                s.parse().map(TimeRange::Days).unwrap_or(TimeRange::All)
            }
            _ => TimeRange::All,
        }
    }

    /// Interpret the first `time_range` pair of a decoded query string.
    ///
    /// Repeated keys are allowed; later values are ignored.
    pub fn from_query(params: &[(String, String)]) -> Self {
        let raw = params
            .iter()
            .find(|(key, _)| key == "time_range")
            .map(|(_, value)| value.as_str());
        Self::parse(raw)
    }

    /// Earliest timestamp included relative to `now`, if any.
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeRange::All => None,
            TimeRange::Days(days) => now.checked_sub_signed(Duration::days(i64::from(days))),
        }
    }

    pub fn as_param(self) -> String {
        match self {
            TimeRange::All => "all".to_string(),
            TimeRange::Days(days) => days.to_string(),
        }
    }
}

/// Store a new reading stamped with `timestamp`. Returns the new row id.
pub async fn insert_reading(
    pool: &SqlitePool,
    reading: &NewReading,
    timestamp: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    // ---
    let result = sqlx::query(
        r#"
        INSERT INTO plant_data (plant_name, location, moisture_value, timestamp)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&reading.plant_name)
    .bind(&reading.location)
    .bind(reading.moisture_value)
    .bind(timestamp)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// List readings newest-first, restricted to `range` as seen from `now`.
pub async fn list_readings(
    pool: &SqlitePool,
    range: TimeRange,
    now: DateTime<Utc>,
) -> Result<Vec<Reading>, sqlx::Error> {
    // ---
    let readings = match range.cutoff(now) {
        Some(cutoff) => {
            debug!("Listing readings since {}", cutoff);
            sqlx::query_as::<_, Reading>(
                r#"
                SELECT id, plant_name, location, moisture_value, timestamp
                FROM plant_data
                WHERE timestamp >= ?
                ORDER BY timestamp DESC, id DESC
                "#,
            )
            .bind(cutoff)
            .fetch_all(pool)
            .await?
        }
        None => {
            debug!("Listing all readings");
            sqlx::query_as::<_, Reading>(
                r#"
                SELECT id, plant_name, location, moisture_value, timestamp
                FROM plant_data
                ORDER BY timestamp DESC, id DESC
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(readings)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_time_range_parsing() {
        // ---
        assert_eq!(TimeRange::parse(None), TimeRange::All);
        assert_eq!(TimeRange::parse(Some("all")), TimeRange::All);
        assert_eq!(TimeRange::parse(Some("7")), TimeRange::Days(7));
        assert_eq!(TimeRange::parse(Some("0")), TimeRange::Days(0));
        assert_eq!(TimeRange::parse(Some("")), TimeRange::All);
        assert_eq!(TimeRange::parse(Some("-1")), TimeRange::All);
        assert_eq!(TimeRange::parse(Some("1.5")), TimeRange::All);
        assert_eq!(TimeRange::parse(Some("week")), TimeRange::All);
        assert_eq!(TimeRange::parse(Some("99999999999999")), TimeRange::All);
    }

    #[test]
    fn test_time_range_from_query() {
        // ---
        let pairs = |items: &[(&str, &str)]| -> Vec<(String, String)> {
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };

        assert_eq!(TimeRange::from_query(&[]), TimeRange::All);
        assert_eq!(
            TimeRange::from_query(&pairs(&[("time_range", "1"), ("time_range", "7")])),
            TimeRange::Days(1)
        );
        assert_eq!(
            TimeRange::from_query(&pairs(&[("other", "3"), ("time_range", "all")])),
            TimeRange::All
        );
        assert_eq!(
            TimeRange::from_query(&pairs(&[("page", "2"), ("time_range", "30")])),
            TimeRange::Days(30)
        );
    }

    #[test]
    fn test_cutoff() {
        // ---
        let now = Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 0).unwrap();

        assert_eq!(TimeRange::All.cutoff(now), None);
        assert_eq!(TimeRange::Days(0).cutoff(now), Some(now));
        assert_eq!(
            TimeRange::Days(2).cutoff(now),
            Some(Utc.with_ymd_and_hms(2025, 3, 24, 18, 45, 0).unwrap())
        );
        // Past the representable range there is nothing to cut
        assert_eq!(TimeRange::Days(u32::MAX).cutoff(now), None);
    }

    #[test]
    fn test_as_param() {
        assert_eq!(TimeRange::All.as_param(), "all");
        assert_eq!(TimeRange::Days(30).as_param(), "30");
    }
}
