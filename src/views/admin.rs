use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::error::{PortalError, PortalResult};
use crate::model::{
    BusSchedule, BusScheduleCreate, BusScheduleUpdate, CanteenMenuCreate, CanteenMenuItem, CanteenMenuUpdate, EntryId,
    TimetableCreate, TimetableEntry, TimetableUpdate, User,
};
use crate::services::{BusService, CanteenFilter, CanteenService, TimetableService};
use crate::session::{Access, AccessLevel, AuthSessionController};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminTab {
    Timetable,
    Bus,
    Canteen,
}

impl AdminTab {
    pub const ALL: [AdminTab; 3] = [AdminTab::Timetable, AdminTab::Bus, AdminTab::Canteen];

    pub fn label(&self) -> &'static str {
        match self {
            AdminTab::Timetable => "Timetable",
            AdminTab::Bus => "Bus Schedule",
            AdminTab::Canteen => "Canteen Menu",
        }
    }
}

impl fmt::Display for AdminTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl FromStr for AdminTab {
    type Err = PortalError;

    fn from_str(s: &str) -> PortalResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timetable" => Ok(AdminTab::Timetable),
            "bus" => Ok(AdminTab::Bus),
            "canteen" => Ok(AdminTab::Canteen),
            other => Err(PortalError::validation(0, format!("unknown admin tab '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminListing {
    Timetable(Vec<TimetableEntry>),
    Bus(Vec<BusSchedule>),
    Canteen(Vec<CanteenMenuItem>),
}

impl AdminListing {
    pub fn len(&self) -> usize {
        match self {
            AdminListing::Timetable(v) => v.len(),
            AdminListing::Bus(v) => v.len(),
            AdminListing::Canteen(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Admin dashboard. Every operation is gated on an authenticated admin session;
/// mutations pass straight through to the resource services.
pub struct AdminView {
    session: Arc<AuthSessionController>,
    timetable: TimetableService,
    bus: BusService,
    canteen: CanteenService,
}

impl AdminView {
    pub fn new(session: Arc<AuthSessionController>, timetable: TimetableService, bus: BusService, canteen: CanteenService) -> Self {
        Self { session, timetable, bus, canteen }
    }

    pub fn access(&self) -> Access { self.session.access(AccessLevel::Admin) }

    fn require_admin(&self) -> PortalResult<User> {
        match self.access() {
            Access::Granted(Some(u)) => Ok(u),
            Access::Pending => Err(PortalError::unauthorized("session check still in progress")),
            Access::Forbidden => Err(PortalError::unauthorized("admin access required")),
            Access::LoginRequired | Access::Granted(None) => Err(PortalError::unauthorized("login required")),
        }
    }

    pub async fn list(&self, tab: AdminTab) -> PortalResult<AdminListing> {
        self.require_admin()?;
        Ok(match tab {
            AdminTab::Timetable => AdminListing::Timetable(self.timetable.list(None).await?),
            AdminTab::Bus => AdminListing::Bus(self.bus.list(None).await?),
            AdminTab::Canteen => AdminListing::Canteen(self.canteen.list(&CanteenFilter::default()).await?),
        })
    }

    pub async fn add_timetable(&self, payload: &TimetableCreate) -> PortalResult<TimetableEntry> {
        let admin = self.require_admin()?;
        let created = self.timetable.create(payload).await?;
        info!(target: "campus_portal::admin", "{} added timetable entry {}", admin.username, created.id);
        Ok(created)
    }

    pub async fn update_timetable(&self, id: EntryId, patch: &TimetableUpdate) -> PortalResult<TimetableEntry> {
        self.require_admin()?;
        self.timetable.update(id, patch).await
    }

    pub async fn add_bus(&self, payload: &BusScheduleCreate) -> PortalResult<BusSchedule> {
        let admin = self.require_admin()?;
        let created = self.bus.create(payload).await?;
        info!(target: "campus_portal::admin", "{} added bus schedule {}", admin.username, created.id);
        Ok(created)
    }

    pub async fn update_bus(&self, id: EntryId, patch: &BusScheduleUpdate) -> PortalResult<BusSchedule> {
        self.require_admin()?;
        self.bus.update(id, patch).await
    }

    pub async fn add_canteen(&self, payload: &CanteenMenuCreate) -> PortalResult<CanteenMenuItem> {
        let admin = self.require_admin()?;
        let created = self.canteen.create(payload).await?;
        info!(target: "campus_portal::admin", "{} added menu item {}", admin.username, created.id);
        Ok(created)
    }

    pub async fn update_canteen(&self, id: EntryId, patch: &CanteenMenuUpdate) -> PortalResult<CanteenMenuItem> {
        self.require_admin()?;
        self.canteen.update(id, patch).await
    }

    pub async fn delete(&self, tab: AdminTab, id: EntryId) -> PortalResult<()> {
        let admin = self.require_admin()?;
        match tab {
            AdminTab::Timetable => self.timetable.delete(id).await?,
            AdminTab::Bus => self.bus.delete(id).await?,
            AdminTab::Canteen => self.canteen.delete(id).await?,
        }
        info!(target: "campus_portal::admin", "{} deleted {} entry {}", admin.username, tab, id);
        Ok(())
    }
}
