use crate::api::ApiClient;
use crate::error::PortalResult;
use crate::model::{BusSchedule, BusScheduleCreate, BusScheduleUpdate, EntryId};

use super::resource::{Resource, ResourceClient};

pub struct Bus;

impl Resource for Bus {
    const BASE: &'static str = "bus";
    type Entry = BusSchedule;
    type Create = BusScheduleCreate;
    type Update = BusScheduleUpdate;
}

#[derive(Clone)]
pub struct BusService {
    inner: ResourceClient<Bus>,
}

impl BusService {
    pub fn new(api: ApiClient) -> Self { Self { inner: ResourceClient::new(api) } }

    /// All schedules, or those of one route (exact route name, server-side).
    pub async fn list(&self, route: Option<&str>) -> PortalResult<Vec<BusSchedule>> {
        self.inner.list(route.filter(|r| !r.trim().is_empty()), &[]).await
    }

    pub async fn create(&self, payload: &BusScheduleCreate) -> PortalResult<BusSchedule> { self.inner.create(payload).await }

    pub async fn update(&self, id: EntryId, patch: &BusScheduleUpdate) -> PortalResult<BusSchedule> { self.inner.update(id, patch).await }

    pub async fn delete(&self, id: EntryId) -> PortalResult<()> { self.inner.delete(id).await }
}
