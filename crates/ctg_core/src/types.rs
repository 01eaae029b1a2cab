use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Display-ready projection of one study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: String,
    pub organization: Option<String>,
    pub title: Option<String>,
    pub last_update: Option<String>,
    pub lead_sponsor: Option<String>,
    pub conditions: Vec<String>,
    pub locations: Vec<Location>,
    pub has_results: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub state: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl Location {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lon?))
    }
}

/// One geo-located location of a study, flattened for map rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
    pub organization: Option<String>,
    pub title: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Lightweight reference returned by the search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatch {
    pub id: String,
    pub last_update: Option<NaiveDate>,
}

/// Inclusive range over the last-update post date.
///
/// Fields are public so callers can build any range; [`DateRange::validate`]
/// is what rejects an inverted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(Error::InvalidArgument(format!(
                "date range start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Search term understood by the remote `query.term` parameter.
    pub fn to_query_term(&self) -> String {
        format!(
            "AREA[LastUpdatePostDate]RANGE[{},{}]",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        Error::InvalidArgument(format!("invalid date {:?} (expected YYYY-MM-DD): {}", value, e))
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub date_range: Option<DateRange>,
}

impl SearchFilter {
    pub fn unfiltered() -> Self {
        Self::default()
    }

    pub fn date_range(range: DateRange) -> Self {
        Self {
            date_range: Some(range),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match &self.date_range {
            Some(range) => range.validate(),
            None => Ok(()),
        }
    }

    pub fn query_term(&self) -> Option<String> {
        self.date_range.as_ref().map(DateRange::to_query_term)
    }

    /// Oldest last-update date a match may carry and still satisfy the filter.
    pub fn date_floor(&self) -> Option<NaiveDate> {
        self.date_range.map(|r| r.start)
    }
}
