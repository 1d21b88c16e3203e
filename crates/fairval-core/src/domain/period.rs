use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{format_description, Date, OffsetDateTime};

use crate::ValidationError;

const PERIOD_END_FORMAT: &str = "[year]-[month]-[day]";

/// Fiscal period end date labelling one column of a financial statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodEnd(Date);

impl PeriodEnd {
    pub const fn new(date: Date) -> Self {
        Self(date)
    }

    /// Parse a `YYYY-MM-DD` period label.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidPeriodEnd {
            value: input.to_owned(),
        };
        let format =
            format_description::parse_borrowed::<2>(PERIOD_END_FORMAT).map_err(|_| invalid())?;
        Date::parse(input.trim(), &format)
            .map(Self)
            .map_err(|_| invalid())
    }

    /// Build a period label from a unix timestamp (seconds), as statement
    /// providers report `endDate`.
    pub fn from_unix_timestamp(seconds: i64) -> Result<Self, ValidationError> {
        OffsetDateTime::from_unix_timestamp(seconds)
            .map(|value| Self(value.date()))
            .map_err(|_| ValidationError::InvalidPeriodEnd {
                value: seconds.to_string(),
            })
    }

    pub const fn date(self) -> Date {
        self.0
    }
}

impl Display for PeriodEnd {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl Serialize for PeriodEnd {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeriodEnd {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

/// Forecast bucket of a discounted-cash-flow projection.
///
/// `Terminal` stands in for every cash flow after `PlusFour` and sits one
/// period beyond it on the discounting axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProjectionPeriod {
    #[serde(rename = "0Y")]
    Current,
    #[serde(rename = "+1Y")]
    PlusOne,
    #[serde(rename = "+2Y")]
    PlusTwo,
    #[serde(rename = "+3Y")]
    PlusThree,
    #[serde(rename = "+4Y")]
    PlusFour,
    #[serde(rename = "terminalValue")]
    Terminal,
}

impl ProjectionPeriod {
    /// Explicit forecast periods, furthest future first.
    pub const EXPLICIT: [Self; 5] = [
        Self::PlusFour,
        Self::PlusThree,
        Self::PlusTwo,
        Self::PlusOne,
        Self::Current,
    ];

    /// Every bucket in discounting order, terminal value first.
    pub const BUCKETS: [Self; 6] = [
        Self::Terminal,
        Self::PlusFour,
        Self::PlusThree,
        Self::PlusTwo,
        Self::PlusOne,
        Self::Current,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Current => "0Y",
            Self::PlusOne => "+1Y",
            Self::PlusTwo => "+2Y",
            Self::PlusThree => "+3Y",
            Self::PlusFour => "+4Y",
            Self::Terminal => "terminalValue",
        }
    }

    /// Number of periods between today and this bucket.
    pub const fn discount_exponent(self) -> i32 {
        match self {
            Self::Current => 1,
            Self::PlusOne => 2,
            Self::PlusTwo => 3,
            Self::PlusThree => 4,
            Self::PlusFour => 5,
            Self::Terminal => 6,
        }
    }
}

impl Display for ProjectionPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Horizon of an analyst revenue estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EstimateHorizon {
    #[serde(rename = "0Y")]
    CurrentYear,
    #[serde(rename = "+1Y")]
    NextYear,
}

impl EstimateHorizon {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CurrentYear => "0Y",
            Self::NextYear => "+1Y",
        }
    }
}

impl Display for EstimateHorizon {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
