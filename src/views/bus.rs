use parking_lot::Mutex;

use crate::model::BusSchedule;
use crate::present::{filter_by_route, group_bus, EmptyNotice, Grouped, ListView, ViewCell};
use crate::services::BusService;

pub type BusGroups = Grouped<String, Vec<BusSchedule>>;

/// Bus schedule page. Fetches every schedule once; the route search filters locally.
pub struct BusView {
    service: BusService,
    all: Mutex<Option<Vec<BusSchedule>>>,
    search: Mutex<String>,
    cell: ViewCell<BusGroups>,
}

impl BusView {
    pub fn new(service: BusService) -> Self {
        Self { service, all: Mutex::new(None), search: Mutex::new(String::new()), cell: ViewCell::new() }
    }

    pub fn search(&self) -> String { self.search.lock().clone() }

    pub fn state(&self) -> ListView<BusGroups> { self.cell.snapshot() }

    pub async fn refresh(&self) -> ListView<BusGroups> {
        let ticket = self.cell.begin();
        match self.service.list(None).await {
            Ok(list) => {
                let view = render(&list, &self.search());
                if self.cell.finish(ticket, view) {
                    *self.all.lock() = Some(list);
                }
            }
            Err(e) => { self.cell.finish(ticket, ListView::failed(&e)); }
        }
        self.state()
    }

    /// Re-filter the fetched schedules; no network call.
    pub fn set_search(&self, text: &str) -> ListView<BusGroups> {
        *self.search.lock() = text.to_string();
        let all = self.all.lock().clone();
        if let Some(list) = all {
            self.cell.set(render(&list, text));
        }
        self.state()
    }
}

fn render(all: &[BusSchedule], search: &str) -> ListView<BusGroups> {
    let filtered = filter_by_route(all, search);
    if filtered.is_empty() {
        return ListView::Empty(empty_notice(search));
    }
    ListView::Ready(group_bus(filtered))
}

pub fn empty_notice(search: &str) -> EmptyNotice {
    if search.is_empty() {
        EmptyNotice::new("No bus schedules available", "There are no bus schedules available at the moment.")
    } else {
        EmptyNotice::new("No routes found", format!("No routes match \"{}\". Try a different search term.", search))
    }
}
