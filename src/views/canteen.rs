use parking_lot::Mutex;

use crate::model::{CanteenMenuItem, MenuCategory, Weekday};
use crate::present::{group_canteen, EmptyNotice, ListView, Nested, ViewCell};
use crate::services::{CanteenFilter, CanteenService};

pub type CanteenGroups = Nested<Weekday, MenuCategory, CanteenMenuItem>;

/// Canteen menu page: day (default today, `None` = all) and category filters.
/// Either change refetches.
pub struct CanteenView {
    service: CanteenService,
    filter: Mutex<CanteenFilter>,
    cell: ViewCell<CanteenGroups>,
}

impl CanteenView {
    pub fn new(service: CanteenService) -> Self {
        Self::with_filter(service, CanteenFilter { day: Some(Weekday::today()), category: None })
    }

    pub fn with_filter(service: CanteenService, filter: CanteenFilter) -> Self {
        Self { service, filter: Mutex::new(filter), cell: ViewCell::new() }
    }

    pub fn filter(&self) -> CanteenFilter { self.filter.lock().clone() }

    pub fn state(&self) -> ListView<CanteenGroups> { self.cell.snapshot() }

    pub async fn select_day(&self, day: Option<Weekday>) -> ListView<CanteenGroups> {
        self.filter.lock().day = day;
        self.refresh().await
    }

    /// `None` or an empty string clears the category filter.
    pub async fn select_category(&self, category: Option<&str>) -> ListView<CanteenGroups> {
        self.filter.lock().category = normalize_category(category);
        self.refresh().await
    }

    /// Change both filters with a single fetch.
    pub async fn select(&self, day: Option<Weekday>, category: Option<&str>) -> ListView<CanteenGroups> {
        *self.filter.lock() = CanteenFilter { day, category: normalize_category(category) };
        self.refresh().await
    }

    pub async fn refresh(&self) -> ListView<CanteenGroups> {
        let filter = self.filter();
        let ticket = self.cell.begin();
        let next = match self.service.list(&filter).await {
            Ok(items) if items.is_empty() => ListView::Empty(empty_notice(&filter)),
            Ok(items) => ListView::Ready(group_canteen(items)),
            Err(e) => ListView::failed(&e),
        };
        self.cell.finish(ticket, next);
        self.state()
    }
}

fn normalize_category(category: Option<&str>) -> Option<String> {
    category.map(str::trim).filter(|c| !c.is_empty()).map(str::to_string)
}

pub fn empty_notice(filter: &CanteenFilter) -> EmptyNotice {
    let day = filter.day.map(|d| d.to_string()).unwrap_or_else(|| "any day".to_string());
    let detail = match filter.category.as_deref() {
        Some(c) => format!("There are no {} items on the menu for {}.", c, day),
        None => format!("There are no menu items for {}.", day),
    };
    EmptyNotice::new("No menu items found", detail)
}
