use parking_lot::Mutex;

use crate::model::{TimetableEntry, Weekday};
use crate::present::{group_timetable, EmptyNotice, Grouped, ListView, ViewCell};
use crate::services::TimetableService;

pub type TimetableGroups = Grouped<Weekday, Vec<TimetableEntry>>;

/// Class timetable page: one day (default today) or the whole week.
pub struct TimetableView {
    service: TimetableService,
    day: Mutex<Option<Weekday>>,
    cell: ViewCell<TimetableGroups>,
}

impl TimetableView {
    pub fn new(service: TimetableService) -> Self { Self::with_day(service, Some(Weekday::today())) }

    pub fn with_day(service: TimetableService, day: Option<Weekday>) -> Self {
        Self { service, day: Mutex::new(day), cell: ViewCell::new() }
    }

    pub fn selected_day(&self) -> Option<Weekday> { *self.day.lock() }

    pub fn state(&self) -> ListView<TimetableGroups> { self.cell.snapshot() }

    /// `None` selects all days.
    pub async fn select_day(&self, day: Option<Weekday>) -> ListView<TimetableGroups> {
        *self.day.lock() = day;
        self.refresh().await
    }

    pub async fn refresh(&self) -> ListView<TimetableGroups> {
        let day = self.selected_day();
        let ticket = self.cell.begin();
        let next = match self.service.list(day).await {
            Ok(entries) if entries.is_empty() => ListView::Empty(empty_notice(day)),
            Ok(entries) => ListView::Ready(group_timetable(entries)),
            Err(e) => ListView::failed(&e),
        };
        self.cell.finish(ticket, next);
        self.state()
    }
}

pub fn empty_notice(day: Option<Weekday>) -> EmptyNotice {
    match day {
        Some(d) => EmptyNotice::new("No classes scheduled", format!("There are no classes scheduled for {}.", d)),
        None => EmptyNotice::new("No classes scheduled", "There are no classes scheduled this week."),
    }
}
