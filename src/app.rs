//! Application context.
//!
//! `App` owns every piece of shared state (session, restriction gate, API
//! client, navigator, cart) and hands borrows of it to command handlers.
//! The restriction watcher is installed once in `start` and stays
//! registered until `stop` or drop.

use crate::domain::models::SessionSnapshot;
use crate::services::cart::{Cart, CartBadge, CartEvents, CartStore};
use crate::services::config::Config;
use crate::services::http::{ApiClient, InterceptorGuard};
use crate::services::navigation::{NavigationError, Navigator, Route};
use crate::services::overlay;
use crate::services::restriction::RestrictionGate;
use crate::services::session::SessionStore;
use crate::services::storage::{DurableStorage, FileStorage};
use crate::services::watcher::RestrictionWatcher;
use std::io::{BufRead, Write};
use std::rc::Rc;

pub struct App {
    pub api: Rc<ApiClient>,
    pub session: Rc<SessionStore>,
    pub gate: Rc<RestrictionGate>,
    pub navigator: Navigator,
    pub cart_store: Rc<CartStore>,
    pub cart_badge: Rc<CartBadge>,
    pub cart_events: CartEvents,
    watcher: Option<InterceptorGuard>,
}

impl App {
    pub fn start(config: &Config) -> anyhow::Result<Self> {
        let api = ApiClient::new(config)?;
        let storage = FileStorage::for_origin(&api.origin()?)?;
        tracing::debug!(api = api.base_url(), dir = %storage.dir().display(), "durable storage");
        Self::with_storage(api, Box::new(storage.clone()), Box::new(storage))
    }

    pub fn with_storage(
        api: ApiClient,
        session_storage: Box<dyn DurableStorage>,
        cart_storage: Box<dyn DurableStorage>,
    ) -> anyhow::Result<Self> {
        let api = Rc::new(api);
        let session = Rc::new(SessionStore::new(session_storage));
        let gate = Rc::new(RestrictionGate::new());
        session.initialize();

        let watcher = RestrictionWatcher::install(&api, gate.clone())?;

        let cart_store = Rc::new(CartStore::load(cart_storage));
        let cart_badge = Rc::new(CartBadge::default());
        let cart_events = CartEvents::default();
        {
            let (api, session, store, badge) = (
                api.clone(),
                session.clone(),
                cart_store.clone(),
                cart_badge.clone(),
            );
            cart_events.subscribe(move || badge.refresh(&api, &session, &store));
        }

        Ok(Self {
            api,
            session,
            gate,
            navigator: Navigator::new(),
            cart_store,
            cart_badge,
            cart_events,
            watcher: Some(watcher),
        })
    }

    /// Releases the restriction watcher. Idempotent.
    pub fn stop(&mut self) {
        if let Some(guard) = self.watcher.take() {
            tracing::debug!(interceptor = guard.name(), "app stopped");
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Moves to `route` if the current session may see it.
    pub fn open(&self, route: Route) -> Result<(), NavigationError> {
        self.navigator.navigate(route, &self.session.snapshot())
    }

    pub fn cart(&self) -> Cart<'_> {
        Cart {
            api: &self.api,
            session: &self.session,
            store: &self.cart_store,
            badge: &self.cart_badge,
            events: &self.cart_events,
        }
    }

    /// Shows the restriction overlay if the gate is up and runs the
    /// acknowledgement flow. Returns whether anything was shown.
    pub fn resolve_restriction(
        &self,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> anyhow::Result<bool> {
        if !self.gate.is_restricted() {
            return Ok(false);
        }
        overlay::present(&self.gate.state(), input, out)?;
        overlay::acknowledge(&self.gate, &self.session, &self.navigator)?;
        Ok(true)
    }
}
