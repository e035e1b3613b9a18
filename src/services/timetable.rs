use crate::api::ApiClient;
use crate::error::PortalResult;
use crate::model::{EntryId, TimetableCreate, TimetableEntry, TimetableUpdate, Weekday};

use super::resource::{Resource, ResourceClient};

pub struct Timetable;

impl Resource for Timetable {
    const BASE: &'static str = "timetable";
    type Entry = TimetableEntry;
    type Create = TimetableCreate;
    type Update = TimetableUpdate;
}

#[derive(Clone)]
pub struct TimetableService {
    inner: ResourceClient<Timetable>,
}

impl TimetableService {
    pub fn new(api: ApiClient) -> Self { Self { inner: ResourceClient::new(api) } }

    /// All entries, or one day's entries.
    pub async fn list(&self, day: Option<Weekday>) -> PortalResult<Vec<TimetableEntry>> {
        self.inner.list(day.as_ref().map(Weekday::as_str), &[]).await
    }

    pub async fn create(&self, payload: &TimetableCreate) -> PortalResult<TimetableEntry> { self.inner.create(payload).await }

    pub async fn update(&self, id: EntryId, patch: &TimetableUpdate) -> PortalResult<TimetableEntry> { self.inner.update(id, patch).await }

    pub async fn delete(&self, id: EntryId) -> PortalResult<()> { self.inner.delete(id).await }
}
