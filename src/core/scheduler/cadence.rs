//! Cron cadences
//!
//! Expressions use the six or seven field syntax of the `cron` crate
//! (seconds first) and are evaluated in UTC.

use crate::domain::{JobKind, Result};
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;

/// A job bound to its trigger schedule
#[derive(Debug, Clone)]
pub struct Cadence {
    job: JobKind,
    expression: String,
    schedule: Schedule,
}

impl Cadence {
    /// Parse `expression` for `job`
    ///
    /// # Errors
    ///
    /// Returns an error if the expression is not valid cron syntax.
    pub fn parse(job: JobKind, expression: &str) -> Result<Self> {
        let schedule = Schedule::from_str(expression)?;
        Ok(Self {
            job,
            expression: expression.to_string(),
            schedule,
        })
    }

    pub fn job(&self) -> JobKind {
        self.job
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First fire time strictly after `now`
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&now).next()
    }

    /// The next `count` fire times after `now`
    pub fn upcoming(&self, now: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        self.schedule.after(&now).take(count).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_every_minute_on_the_minute() {
        let cadence = Cadence::parse(JobKind::Ingest, "0 * * * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 30).unwrap();
        assert_eq!(
            cadence.next_after(now),
            Some(Utc.with_ymd_and_hms(2025, 1, 1, 10, 1, 0).unwrap())
        );
    }

    #[test]
    fn test_every_three_minutes_at_thirty_seconds() {
        let cadence = Cadence::parse(JobKind::Export, "30 0/3 * * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 10, 1, 0).unwrap();
        let fires = cadence.upcoming(now, 3);
        assert_eq!(
            fires,
            vec![
                Utc.with_ymd_and_hms(2025, 1, 1, 10, 3, 30).unwrap(),
                Utc.with_ymd_and_hms(2025, 1, 1, 10, 6, 30).unwrap(),
                Utc.with_ymd_and_hms(2025, 1, 1, 10, 9, 30).unwrap(),
            ]
        );
    }

    #[test]
    fn test_invalid_expression() {
        assert!(Cadence::parse(JobKind::Ingest, "whenever").is_err());
    }
}
