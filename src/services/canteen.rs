use crate::api::ApiClient;
use crate::error::PortalResult;
use crate::model::{check_price, CanteenMenuCreate, CanteenMenuItem, CanteenMenuUpdate, EntryId, Weekday};

use super::resource::{Resource, ResourceClient};

pub struct Canteen;

impl Resource for Canteen {
    const BASE: &'static str = "canteen";
    type Entry = CanteenMenuItem;
    type Create = CanteenMenuCreate;
    type Update = CanteenMenuUpdate;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanteenFilter {
    pub day: Option<Weekday>,
    pub category: Option<String>,
}

impl CanteenFilter {
    /// Query parameters: `category` only when set and non-empty.
    pub fn query(&self) -> Vec<(&'static str, &str)> {
        match self.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => vec![("category", c)],
            _ => Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct CanteenService {
    inner: ResourceClient<Canteen>,
}

impl CanteenService {
    pub fn new(api: ApiClient) -> Self { Self { inner: ResourceClient::new(api) } }

    /// `/canteen/{day}` when a day is set, `/canteen/` otherwise; `?category=` when non-empty.
    pub async fn list(&self, filter: &CanteenFilter) -> PortalResult<Vec<CanteenMenuItem>> {
        self.inner.list(filter.day.as_ref().map(Weekday::as_str), &filter.query()).await
    }

    pub async fn create(&self, payload: &CanteenMenuCreate) -> PortalResult<CanteenMenuItem> {
        check_price(payload.price)?;
        self.inner.create(payload).await
    }

    pub async fn update(&self, id: EntryId, patch: &CanteenMenuUpdate) -> PortalResult<CanteenMenuItem> {
        if let Some(p) = patch.price { check_price(p)?; }
        self.inner.update(id, patch).await
    }

    pub async fn delete(&self, id: EntryId) -> PortalResult<()> { self.inner.delete(id).await }
}
