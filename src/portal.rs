//! Wiring: one API client, the services over it and the session controller.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::PortalConfig;
use crate::error::PortalResult;
use crate::services::{AuthService, BusService, CanteenService, TimetableService};
use crate::session::{AuthSessionController, FileSessionStore, SessionStore};
use crate::views::{AdminView, BusView, CanteenView, TimetableView};

#[derive(Clone)]
pub struct Portal {
    pub config: PortalConfig,
    pub api: ApiClient,
    pub auth: AuthService,
    pub timetable: TimetableService,
    pub bus: BusService,
    pub canteen: CanteenService,
    pub session: Arc<AuthSessionController>,
}

impl Portal {
    /// Credential persisted in `config.session_file`.
    pub fn new(config: PortalConfig) -> PortalResult<Self> {
        let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(config.session_file.clone()));
        Self::with_store(config, store)
    }

    pub fn with_store(config: PortalConfig, store: Arc<dyn SessionStore>) -> PortalResult<Self> {
        let api = ApiClient::new(&config, store.clone())?;
        let auth = AuthService::new(api.clone());
        let session = Arc::new(AuthSessionController::new(store, Arc::new(auth.clone())));
        Ok(Self {
            timetable: TimetableService::new(api.clone()),
            bus: BusService::new(api.clone()),
            canteen: CanteenService::new(api.clone()),
            config,
            api,
            auth,
            session,
        })
    }

    pub fn timetable_view(&self) -> TimetableView { TimetableView::new(self.timetable.clone()) }

    pub fn bus_view(&self) -> BusView { BusView::new(self.bus.clone()) }

    pub fn canteen_view(&self) -> CanteenView { CanteenView::new(self.canteen.clone()) }

    pub fn admin_view(&self) -> AdminView {
        AdminView::new(self.session.clone(), self.timetable.clone(), self.bus.clone(), self.canteen.clone())
    }
}
