use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{ApiClient, AuthMode};
use crate::error::PortalResult;
use crate::model::EntryId;

/// One REST collection: `GET|POST /{base}/`, `GET /{base}/{segment}`, `PUT|DELETE /{base}/{id}`.
pub trait Resource {
    const BASE: &'static str;
    type Entry: DeserializeOwned + Send;
    type Create: Serialize + Sync;
    type Update: Serialize + Sync;
}

/// The four verbs shared by every resource service. Requests map 1:1 to REST calls;
/// errors come back unchanged with the HTTP status preserved.
pub struct ResourceClient<R> {
    api: ApiClient,
    _kind: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self { Self { api: self.api.clone(), _kind: PhantomData } }
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(api: ApiClient) -> Self { Self { api, _kind: PhantomData } }

    pub fn collection_path() -> String { format!("{}/", R::BASE) }

    pub fn item_path(segment: &str) -> String { format!("{}/{}", R::BASE, urlencoding::encode(segment)) }

    /// `segment` selects a sub-listing (a day, a route); `query` is sent only when non-empty.
    pub async fn list(&self, segment: Option<&str>, query: &[(&str, &str)]) -> PortalResult<Vec<R::Entry>> {
        let path = match segment {
            Some(s) => Self::item_path(s),
            None => Self::collection_path(),
        };
        self.api.get_json(&path, query, AuthMode::Optional).await
    }

    pub async fn create(&self, payload: &R::Create) -> PortalResult<R::Entry> {
        self.api.post_json(&Self::collection_path(), payload).await
    }

    pub async fn update(&self, id: EntryId, patch: &R::Update) -> PortalResult<R::Entry> {
        self.api.put_json(&Self::item_path(&id.to_string()), patch).await
    }

    pub async fn delete(&self, id: EntryId) -> PortalResult<()> {
        self.api.delete(&Self::item_path(&id.to_string())).await
    }
}
