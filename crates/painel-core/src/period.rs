//! Reference periods attached to fact rows and the parsers for the textual
//! forms they take in the source extracts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

/// When a measured quantity applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Period {
  Year { year: i32 },
  YearMonth { year: i32, month: u32 },
  Date { date: NaiveDate },
}

impl Period {
  pub fn year(year: i32) -> Self { Self::Year { year } }

  /// `None` when `month` is outside `1..=12`.
  pub fn year_month(year: i32, month: u32) -> Option<Self> {
    (1..=12).contains(&month).then_some(Self::YearMonth { year, month })
  }

  pub fn date(date: NaiveDate) -> Self { Self::Date { date } }
}

/// Textual period layouts found in the extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodFormat {
  /// `2024`, also `2024.0` as exported by spreadsheets.
  Year,
  /// `Janeiro/2024`.
  MonthNameYear,
  /// `2024/jan.`.
  YearMonthAbbrev,
}

impl PeriodFormat {
  /// Parse `raw`; `None` means the row carrying it should be dropped.
  pub fn parse(self, raw: &str) -> Option<Period> {
    match self {
      PeriodFormat::Year => parse_year(raw).map(Period::year),
      PeriodFormat::MonthNameYear => parse_month_year(raw),
      PeriodFormat::YearMonthAbbrev => parse_year_month(raw),
    }
  }
}

// ─── Month lookup ────────────────────────────────────────────────────────────

/// Full month name and its abbreviation, in calendar order.
const MONTHS: [(&str, &str); 12] = [
  ("janeiro", "jan."),
  ("fevereiro", "fev."),
  ("março", "mar."),
  ("abril", "abr."),
  ("maio", "mai."),
  ("junho", "jun."),
  ("julho", "jul."),
  ("agosto", "ago."),
  ("setembro", "set."),
  ("outubro", "out."),
  ("novembro", "nov."),
  ("dezembro", "dez."),
];

/// Month number for a full name or abbreviation, ignoring case and accents.
/// The trailing period of an abbreviation is optional.
pub fn month_number(name: &str) -> Option<u32> {
  let key = normalize(Some(name))?;
  let dotted = if key.ends_with('.') { key.clone() } else { format!("{key}.") };
  MONTHS
    .iter()
    .position(|(full, abbrev)| {
      normalize(Some(full)).as_deref() == Some(key.as_str()) || *abbrev == dotted
    })
    .map(|idx| idx as u32 + 1)
}

/// A year in `1..=9999`, written as an integer or an integral decimal.
pub fn parse_year(raw: &str) -> Option<i32> {
  let s = raw.trim();
  let year = match s.parse::<i32>() {
    Ok(y) => y,
    Err(_) => {
      let f = s.parse::<f64>().ok()?;
      if f.fract() != 0.0 {
        return None;
      }
      f as i32
    }
  };
  (1..=9999).contains(&year).then_some(year)
}

/// `"<Month-name>/<Year>"`, e.g. `MARÇO/2023`.
pub fn parse_month_year(raw: &str) -> Option<Period> {
  let (month, year) = raw.trim().split_once('/')?;
  Period::year_month(parse_year(year)?, month_number(month)?)
}

/// `"<Year>/<month-abbreviation>."`, e.g. `2023/mar.`.
pub fn parse_year_month(raw: &str) -> Option<Period> {
  let (year, month) = raw.trim().split_once('/')?;
  Period::year_month(parse_year(year)?, month_number(month)?)
}
