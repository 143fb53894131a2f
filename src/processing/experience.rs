//! Total experience from free-text employment date ranges
//!
//! Ranges such as `Jan 2020 - Present` or `March 2018 – June 2021` are parsed
//! into intervals, overlapping intervals are merged, and the covered days are
//! converted to years.

use chrono::{Local, NaiveDate};
use log::debug;
use regex::Regex;
use std::sync::OnceLock;

const MONTH: &str = r"Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?";

const DAYS_PER_YEAR: f64 = 365.25;

fn date_range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r"(?i)({MONTH})\s+(\d{{4}})\s*[-–]\s*(Present|Current|Now|(?:{MONTH})\s+\d{{4}})"
        );
        Regex::new(&pattern).expect("Invalid date range regex")
    })
}

/// One detected employment span
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Interval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Interval {
    fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Total years of experience, measured against today's date for open ranges
pub fn calculate_experience_years(text: &str) -> f64 {
    calculate_experience_years_at(text, Local::now().date_naive())
}

/// Total years of experience with `Present`/`Current`/`Now` resolved to `today`
pub fn calculate_experience_years_at(text: &str, today: NaiveDate) -> f64 {
    let intervals = find_intervals(text, today);
    if intervals.is_empty() {
        return 0.0;
    }

    let total_days: i64 = merge_intervals(intervals).iter().map(Interval::days).sum();
    round_to(total_days as f64 / DAYS_PER_YEAR, 1)
}

/// All parseable date ranges in the text. Malformed matches are skipped.
pub fn find_intervals(text: &str, today: NaiveDate) -> Vec<Interval> {
    let mut intervals = Vec::new();

    for caps in date_range_regex().captures_iter(text) {
        let start = match parse_month_year(&caps[1], &caps[2]) {
            Some(date) => date,
            None => {
                debug!("Skipping unparseable range start: {}", &caps[0]);
                continue;
            }
        };

        let end_str = caps[3].trim();
        let end = match end_str.to_lowercase().as_str() {
            "present" | "current" | "now" => Some(today),
            _ => {
                let parts: Vec<&str> = end_str.split_whitespace().collect();
                match (parts.first(), parts.last()) {
                    (Some(month), Some(year)) if parts.len() >= 2 => parse_month_year(month, year),
                    _ => None,
                }
            }
        };

        match end {
            Some(end) => intervals.push(Interval { start, end }),
            None => debug!("Skipping unparseable range end: {}", &caps[0]),
        }
    }

    intervals
}

/// Sort by start and merge intervals whose start falls strictly before the
/// running interval's end
pub fn merge_intervals(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort();

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(current) if interval.start < current.end => {
                current.end = current.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }

    merged
}

fn parse_month_year(month: &str, year: &str) -> Option<NaiveDate> {
    let abbrev: String = month.chars().take(3).collect::<String>().to_lowercase();
    let month_num = match abbrev.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month_num, 1)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_no_ranges_is_zero() {
        let today = date(2024, 6, 1);
        assert_eq!(calculate_experience_years_at("Rust developer, loves Go", today), 0.0);
        assert_eq!(calculate_experience_years_at("", today), 0.0);
        assert_eq!(calculate_experience_years_at("Since 2019 at Acme", today), 0.0);
    }

    #[test]
    fn test_overlapping_ranges_are_merged() {
        let text = "Engineer, Acme Jan 2019 - Jan 2021. Consultant, Beta Jun 2020 – Jun 2022.";
        let years = calculate_experience_years_at(text, date(2024, 6, 1));

        // Jan 2019 .. Jun 2022 is 1247 days, the naive sum would be 4.0
        assert_eq!(years, 3.4);
    }

    #[test]
    fn test_disjoint_ranges_are_summed() {
        let text = "January 2015 - January 2016 and March 2017 - March 2018";
        let years = calculate_experience_years_at(text, date(2024, 6, 1));
        assert_eq!(years, 2.0);
    }

    #[test]
    fn test_present_uses_reference_date() {
        let text = "Senior Engineer Jan 2020 - Present";
        assert_eq!(calculate_experience_years_at(text, date(2022, 1, 1)), 2.0);
        assert_eq!(calculate_experience_years_at(text, date(2024, 1, 1)), 4.0);
    }

    #[test]
    fn test_case_insensitive_and_abbreviations() {
        let text = "DEC 2019 - current, feb 2015 – apr 2015";
        let intervals = find_intervals(text, date(2020, 12, 1));
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].start, date(2019, 12, 1));
        assert_eq!(intervals[0].end, date(2020, 12, 1));
        assert_eq!(intervals[1].end, date(2015, 4, 1));
    }

    #[test]
    fn test_touching_intervals_stay_separate() {
        let merged = merge_intervals(vec![
            Interval { start: date(2020, 1, 1), end: date(2021, 1, 1) },
            Interval { start: date(2021, 1, 1), end: date(2022, 1, 1) },
        ]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_contained_interval_is_absorbed() {
        let merged = merge_intervals(vec![
            Interval { start: date(2018, 1, 1), end: date(2023, 1, 1) },
            Interval { start: date(2019, 1, 1), end: date(2020, 1, 1) },
        ]);
        assert_eq!(
            merged,
            vec![Interval { start: date(2018, 1, 1), end: date(2023, 1, 1) }]
        );
    }
}
