//! Wire types for the campus REST API.
//! Field names follow the backend's JSON exactly; nothing here is persisted locally.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{PortalError, PortalResult};

pub type EntryId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntryId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
}

fn default_true() -> bool { true }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

pub(crate) fn default_token_type() -> String { "bearer".to_string() }

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

// ---- Weekday ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// Today's weekday in local time.
    pub fn today() -> Self { Self::from_chrono(chrono::Local::now().weekday()) }

    pub fn from_chrono(d: chrono::Weekday) -> Self {
        Weekday::ALL[d.num_days_from_monday() as usize]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Weekday {
    type Err = PortalError;

    /// Accepts full names and three-letter abbreviations, case-insensitively.
    fn from_str(s: &str) -> PortalResult<Self> {
        let low = s.trim().to_ascii_lowercase();
        Weekday::ALL
            .iter()
            .copied()
            .find(|d| {
                let name = d.as_str().to_ascii_lowercase();
                name == low || (low.len() == 3 && name.starts_with(&low))
            })
            .ok_or_else(|| PortalError::validation(0, format!("unknown day '{}'", s.trim())))
    }
}

// ---- Menu category ----

/// Canteen category. Anything outside the fixed set lands in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MenuCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
    Other(String),
}

impl MenuCategory {
    pub const KNOWN: [MenuCategory; 4] = [MenuCategory::Breakfast, MenuCategory::Lunch, MenuCategory::Dinner, MenuCategory::Snacks];

    pub fn as_str(&self) -> &str {
        match self {
            MenuCategory::Breakfast => "breakfast",
            MenuCategory::Lunch => "lunch",
            MenuCategory::Dinner => "dinner",
            MenuCategory::Snacks => "snacks",
            MenuCategory::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for MenuCategory {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => MenuCategory::Breakfast,
            "lunch" => MenuCategory::Lunch,
            "dinner" => MenuCategory::Dinner,
            "snacks" => MenuCategory::Snacks,
            "" => MenuCategory::Other("other".to_string()),
            _ => MenuCategory::Other(s),
        }
    }
}

impl From<&str> for MenuCategory {
    fn from(s: &str) -> Self { MenuCategory::from(s.to_string()) }
}

impl From<MenuCategory> for String {
    fn from(c: MenuCategory) -> Self { c.as_str().to_string() }
}

impl fmt::Display for MenuCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

// ---- Time of day ----

/// Structured time of day used for ordering schedule entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Parses `H:MM`, `HH:MM` or `HH:MM:SS` (24-hour).
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split(':');
        let h: u32 = parse_field(parts.next()?, 2)?;
        let m: u32 = parse_field(parts.next()?, 2)?;
        let sec: u32 = match parts.next() { Some(p) => parse_field(p, 2)?, None => 0 };
        if parts.next().is_some() { return None; }
        NaiveTime::from_hms_opt(h, m, sec).map(ClockTime)
    }

    pub fn hour(&self) -> u32 { self.0.hour() }
    pub fn minute(&self) -> u32 { self.0.minute() }
}

fn parse_field(p: &str, max_len: usize) -> Option<u32> {
    if p.is_empty() || p.len() > max_len || !p.bytes().all(|b| b.is_ascii_digit()) { return None; }
    p.parse().ok()
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

/// Sort key for a wire time string: parsed times first in clock order,
/// then unparseable strings in plain lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeKey<'a> {
    Clock(ClockTime),
    Raw(&'a str),
}

impl<'a> TimeKey<'a> {
    pub fn of(s: &'a str) -> Self {
        match ClockTime::parse(s) { Some(t) => TimeKey::Clock(t), None => TimeKey::Raw(s) }
    }
}

impl Ord for TimeKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (TimeKey::Clock(a), TimeKey::Clock(b)) => a.cmp(b),
            (TimeKey::Clock(_), TimeKey::Raw(_)) => Ordering::Less,
            (TimeKey::Raw(_), TimeKey::Clock(_)) => Ordering::Greater,
            (TimeKey::Raw(a), TimeKey::Raw(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for TimeKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

// ---- Entries ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub id: EntryId,
    pub day: Weekday,
    pub time: String,
    pub subject: String,
    pub room: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableCreate {
    pub day: Weekday,
    pub time: String,
    pub subject: String,
    pub room: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimetableUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<Weekday>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusSchedule {
    pub id: EntryId,
    pub route: String,
    pub time: String,
    pub bus_no: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusScheduleCreate {
    pub route: String,
    pub time: String,
    pub bus_no: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusScheduleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_no: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanteenMenuItem {
    pub id: EntryId,
    pub day: Weekday,
    pub item: String,
    pub price: f64,
    #[serde(default = "default_category")]
    pub category: MenuCategory,
    #[serde(default)]
    pub created_at: String,
}

fn default_category() -> MenuCategory { MenuCategory::Other("other".to_string()) }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanteenMenuCreate {
    pub day: Weekday,
    pub item: String,
    pub price: f64,
    pub category: MenuCategory,
}

impl CanteenMenuCreate {
    pub fn new(day: Weekday, item: impl Into<String>, price: f64, category: MenuCategory) -> PortalResult<Self> {
        check_price(price)?;
        Ok(Self { day, item: item.into(), price, category })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanteenMenuUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<Weekday>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<MenuCategory>,
}

pub fn check_price(price: f64) -> PortalResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(PortalError::validation(0, format!("price must be a non-negative number, got {}", price)));
    }
    Ok(())
}
