//! Request-scoped dashboard filters.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Time range, channel and device selection applied to every KPI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardFilter {
    /// Inclusive lower bound
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub end: Option<DateTime<Utc>>,
    pub channel: Option<String>,
    pub device: Option<String>,
}

impl DashboardFilter {
    /// Filter that keeps everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Builds a filter from raw query values.
    ///
    /// Dates accept `YYYY-MM-DD` or RFC 3339. A bare end date covers the
    /// whole day.
    pub fn parse(
        start: Option<&str>,
        end: Option<&str>,
        channel: Option<&str>,
        device: Option<&str>,
    ) -> Result<Self> {
        let start = non_empty(start).map(|s| parse_bound(s, false)).transpose()?;
        let end = non_empty(end).map(|s| parse_bound(s, true)).transpose()?;

        let filter = Self {
            start,
            end,
            channel: non_empty(channel).map(str::to_string),
            device: non_empty(device).map(str::to_string),
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Rejects inverted ranges.
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(Error::filter(format!(
                    "start {} is after end {}",
                    start.to_rfc3339(),
                    end.to_rfc3339()
                )));
            }
        }
        Ok(())
    }

    pub fn with_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Whether `ts` falls inside the time range.
    pub fn contains_time(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| ts >= s) && self.end.map_or(true, |e| ts <= e)
    }

    /// Whether a channel or device restriction is active.
    pub fn has_segment(&self) -> bool {
        self.channel.is_some() || self.device.is_some()
    }

    /// Whether a session with this channel and device is selected.
    ///
    /// Comparison is case-insensitive.
    pub fn matches_segment(&self, channel: &str, device: &str) -> bool {
        let channel_ok = self
            .channel
            .as_deref()
            .map_or(true, |c| c.eq_ignore_ascii_case(channel));
        let device_ok = self
            .device
            .as_deref()
            .map_or(true, |d| d.eq_ignore_ascii_case(device));
        channel_ok && device_ok
    }

    /// Query-string pairs that reproduce this filter.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = self.start {
            pairs.push(("start", start.to_rfc3339()));
        }
        if let Some(end) = self.end {
            pairs.push(("end", end.to_rfc3339()));
        }
        if let Some(channel) = &self.channel {
            pairs.push(("channel", channel.clone()));
        }
        if let Some(device) = &self.device {
            pairs.push(("device", device.clone()));
        }
        pairs
    }
}

/// Bucket size for time trends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGranularity {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl TimeGranularity {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "daily" | "day" | "d" => Ok(Self::Daily),
            "weekly" | "week" | "w" => Ok(Self::Weekly),
            "monthly" | "month" | "m" => Ok(Self::Monthly),
            other => Err(Error::filter(format!("unknown frequency '{}'", other))),
        }
    }

    /// First day of the period containing `ts`.
    ///
    /// Weeks start on Monday.
    pub fn period_start(&self, ts: DateTime<Utc>) -> NaiveDate {
        let date = ts.date_naive();
        match self {
            Self::Daily => date,
            Self::Weekly => date - Duration::days(date.weekday().num_days_from_monday() as i64),
            Self::Monthly => date.with_day(1).unwrap_or(date),
        }
    }
}

/// Categorical session attribute used for conversion breakdowns.
///
/// Product category is not a session attribute; see
/// [`crate::breakdown::aov_by_category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Channel,
    Device,
}

impl Dimension {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "channel" => Ok(Self::Channel),
            "device" => Ok(Self::Device),
            other => Err(Error::filter(format!("unknown dimension '{}'", other))),
        }
    }
}

fn parse_bound(value: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| Error::filter(format!("invalid date '{}'", value)))?;

    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| Error::internal("invalid time of day"))?;

    Ok(Utc.from_utc_datetime(&date.and_time(time)))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
