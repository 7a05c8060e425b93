//! Airing season inference.
//!
//! AniList tags every anime with a `(season, seasonYear)` pair. When all we
//! know is an approximate premiere date, the nominal season is derived from
//! the month, optionally nudged one season backwards or forwards.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::anilist::AniListError;

/// Season offsets accepted by [`SeasonGuess::from_date`].
pub const OFFSET_RANGE: RangeInclusive<i32> = -1..=1;

/// Anime season (quarter of the year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub const ALL: [Season; 4] = [Self::Winter, Self::Spring, Self::Summer, Self::Fall];

    /// Convert to AniList GraphQL `MediaSeason` enum value.
    pub fn to_anilist_str(self) -> &'static str {
        match self {
            Self::Winter => "WINTER",
            Self::Spring => "SPRING",
            Self::Summer => "SUMMER",
            Self::Fall => "FALL",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Winter => write!(f, "Winter"),
            Self::Spring => write!(f, "Spring"),
            Self::Summer => write!(f, "Summer"),
            Self::Fall => write!(f, "Fall"),
        }
    }
}

/// A season label paired with the year it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeasonGuess {
    pub season: Season,
    pub year: i32,
}

impl SeasonGuess {
    /// Compute the season a date falls in, shifted by `offset` seasons.
    ///
    /// The shifted index wraps into the adjacent year: one step before
    /// Winter is Fall of the previous year, one step after Fall is Winter
    /// of the next. Offsets outside [`OFFSET_RANGE`] are rejected.
    pub fn from_date(date: NaiveDate, offset: i32) -> Result<Self, AniListError> {
        if !OFFSET_RANGE.contains(&offset) {
            return Err(AniListError::InvalidOffset(offset));
        }

        let mut index = (date.month0() / 3) as i32 + offset;
        let mut year = date.year();

        if index < 0 {
            index = 3;
            year -= 1;
        } else if index > 3 {
            index = 0;
            year += 1;
        }

        Ok(Self {
            season: Season::ALL[index as usize],
            year,
        })
    }
}

impl std::fmt::Display for SeasonGuess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.season, self.year)
    }
}

/// Offset for the single retry after a season-filtered search misses.
///
/// Premieres in the first month of a season may be catalogued under the
/// previous one, premieres in the last month under the next. Mid-season
/// months get no retry.
pub fn retry_offset(month: u32) -> Option<i32> {
    match month {
        1 | 4 | 7 | 10 => Some(-1),
        3 | 6 | 9 | 12 => Some(1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_january_is_winter_of_same_year() {
        let guess = SeasonGuess::from_date(date(2013, 1, 10), 0).unwrap();
        assert_eq!(guess.season, Season::Winter);
        assert_eq!(guess.year, 2013);
    }

    #[test]
    fn test_january_previous_wraps_to_fall_of_last_year() {
        let guess = SeasonGuess::from_date(date(2013, 1, 10), -1).unwrap();
        assert_eq!(guess.season, Season::Fall);
        assert_eq!(guess.year, 2012);
    }

    #[test]
    fn test_december_next_wraps_to_winter_of_next_year() {
        let guess = SeasonGuess::from_date(date(2020, 12, 7), 1).unwrap();
        assert_eq!(guess.season, Season::Winter);
        assert_eq!(guess.year, 2021);
    }

    #[test]
    fn test_month_boundaries_at_offset_zero() {
        let expected = [
            (1, Season::Winter),
            (3, Season::Winter),
            (4, Season::Spring),
            (6, Season::Spring),
            (7, Season::Summer),
            (9, Season::Summer),
            (10, Season::Fall),
            (12, Season::Fall),
        ];
        for (month, season) in expected {
            let guess = SeasonGuess::from_date(date(2021, month, 1), 0).unwrap();
            assert_eq!(guess.season, season, "month {month}");
            assert_eq!(guess.year, 2021);
        }
    }

    #[test]
    fn test_shift_inside_year_keeps_year() {
        let guess = SeasonGuess::from_date(date(2013, 4, 7), -1).unwrap();
        assert_eq!(guess, SeasonGuess { season: Season::Winter, year: 2013 });

        let guess = SeasonGuess::from_date(date(2013, 9, 30), 1).unwrap();
        assert_eq!(guess, SeasonGuess { season: Season::Fall, year: 2013 });
    }

    #[test]
    fn test_offset_outside_one_season_is_rejected() {
        for offset in [2, -2, 5, -6, i32::MAX, i32::MIN] {
            let err = SeasonGuess::from_date(date(2021, 10, 10), offset).unwrap_err();
            assert!(matches!(err, AniListError::InvalidOffset(o) if o == offset));
        }
    }

    #[test]
    fn test_retry_offset_by_month() {
        for month in [1, 4, 7, 10] {
            assert_eq!(retry_offset(month), Some(-1));
        }
        for month in [3, 6, 9, 12] {
            assert_eq!(retry_offset(month), Some(1));
        }
        for month in [2, 5, 8, 11] {
            assert_eq!(retry_offset(month), None);
        }
    }

    #[test]
    fn test_anilist_names() {
        let names: Vec<_> = Season::ALL.iter().map(|s| s.to_anilist_str()).collect();
        assert_eq!(names, ["WINTER", "SPRING", "SUMMER", "FALL"]);
        assert_eq!(SeasonGuess::from_date(date(2021, 10, 10), 0).unwrap().to_string(), "Fall 2021");
    }
}
