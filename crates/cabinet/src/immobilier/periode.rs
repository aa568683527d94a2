use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Calendar month a rent obligation refers to, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Periode {
    annee: i32,
    mois: u32,
}

impl Periode {
    pub fn new(annee: i32, mois: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(annee, mois, 1).map(|_| Self { annee, mois })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            annee: date.year(),
            mois: date.month(),
        }
    }

    pub fn annee(self) -> i32 {
        self.annee
    }

    pub fn mois(self) -> u32 {
        self.mois
    }

    pub fn first_day(self) -> NaiveDate {
        self.day(1)
    }

    pub fn last_day(self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    /// `day` of this month, clamped to the month length.
    pub fn day(self, day: u32) -> NaiveDate {
        let wanted = day.max(1);
        (1..=wanted)
            .rev()
            .find_map(|candidate| NaiveDate::from_ymd_opt(self.annee, self.mois, candidate))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn next(self) -> Self {
        if self.mois == 12 {
            Self {
                annee: self.annee + 1,
                mois: 1,
            }
        } else {
            Self {
                annee: self.annee,
                mois: self.mois + 1,
            }
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.annee && date.month() == self.mois
    }
}

impl fmt::Display for Periode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.annee, self.mois)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid period, expected YYYY-MM")]
pub struct PeriodeParseError(String);

impl FromStr for Periode {
    type Err = PeriodeParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let invalid = || PeriodeParseError(raw.to_string());
        let (annee, mois) = trimmed.split_once('-').ok_or_else(invalid)?;
        if annee.len() != 4 || mois.is_empty() || mois.len() > 2 {
            return Err(invalid());
        }
        let annee = annee.parse::<i32>().map_err(|_| invalid())?;
        let mois = mois.parse::<u32>().map_err(|_| invalid())?;
        Self::new(annee, mois).ok_or_else(invalid)
    }
}

impl Serialize for Periode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Periode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
