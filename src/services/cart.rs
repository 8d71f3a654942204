//! Shopping cart: backend calls, the optimistic local store, the
//! `cartUpdated` event and the badge count.
//!
//! Count policy: the optimistic quantities in [`CartStore`] are shown only
//! until the first successful backend fetch in this process. From then on the
//! latest fetch is the count, even when it is lower than the local total.

use crate::domain::constants::{CART_KEY, CART_UPDATED_EVENT};
use crate::domain::models::{
    CartCountReport, CartEnvelope, CartLine, MessageResponse, Product, ProductList,
};
use crate::services::account::{signed_in_email, InputError};
use crate::services::http::{ApiClient, ApiError};
use crate::services::session::SessionStore;
use crate::services::storage::DurableStorage;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Optimistic `product_id -> quantity` map persisted under the `cart` key.
pub struct CartStore {
    storage: RefCell<Box<dyn DurableStorage>>,
    items: RefCell<BTreeMap<String, u32>>,
}

impl CartStore {
    pub fn load(storage: Box<dyn DurableStorage>) -> Self {
        let items = match storage.get_item(CART_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored cart is unreadable; starting empty");
                BTreeMap::new()
            }),
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored cart");
                BTreeMap::new()
            }
        };
        Self {
            storage: RefCell::new(storage),
            items: RefCell::new(items),
        }
    }

    pub fn quantities(&self) -> BTreeMap<String, u32> {
        self.items.borrow().clone()
    }

    pub fn total(&self) -> u32 {
        self.items.borrow().values().sum()
    }

    pub fn add(&self, product_id: &str, quantity: u32) {
        *self
            .items
            .borrow_mut()
            .entry(product_id.to_string())
            .or_insert(0) += quantity;
        self.persist();
    }

    pub fn set(&self, product_id: &str, quantity: u32) {
        {
            let mut items = self.items.borrow_mut();
            if quantity == 0 {
                items.remove(product_id);
            } else {
                items.insert(product_id.to_string(), quantity);
            }
        }
        self.persist();
    }

    pub fn remove(&self, product_id: &str) {
        self.set(product_id, 0);
    }

    pub fn clear(&self) {
        self.items.borrow_mut().clear();
        self.persist();
    }

    /// Overwrites the local quantities with what the backend reported.
    pub fn replace_with(&self, lines: &[CartLine]) {
        let mut next = BTreeMap::new();
        for l in lines {
            *next.entry(l.product_id.clone()).or_insert(0) += l.quantity;
        }
        *self.items.borrow_mut() = next;
        self.persist();
    }

    fn persist(&self) {
        let raw = match serde_json::to_string(&*self.items.borrow()) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode cart");
                return;
            }
        };
        if let Err(e) = self.storage.borrow_mut().set_item(CART_KEY, &raw) {
            tracing::warn!(error = %e, "cart kept in memory only");
        }
    }
}

type Listener = Box<dyn Fn()>;

/// Same-process `cartUpdated` notifications.
#[derive(Default)]
pub struct CartEvents {
    listeners: RefCell<Vec<Listener>>,
}

impl CartEvents {
    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    pub fn emit(&self) {
        tracing::debug!(event = CART_UPDATED_EVENT, "emit");
        for l in self.listeners.borrow().iter() {
            l();
        }
    }
}

/// Cart badge state: the last successful backend count, if any.
#[derive(Default)]
pub struct CartBadge {
    fetched: Cell<Option<u32>>,
}

impl CartBadge {
    pub fn record_fetch(&self, lines: &[CartLine]) {
        self.fetched.set(Some(line_total(lines)));
    }

    pub fn fetched(&self) -> Option<u32> {
        self.fetched.get()
    }

    pub fn count(&self, store: &CartStore) -> CartCountReport {
        reconcile_cart_count(store.total(), self.fetched.get())
    }

    /// Re-reads the backend cart. Failures keep the previous count.
    pub fn refresh(&self, api: &ApiClient, session: &SessionStore, store: &CartStore) {
        let Some(id) = session.identity() else {
            return;
        };
        match fetch_lines(api, &id.email_address) {
            Ok(lines) => {
                self.record_fetch(&lines);
                store.replace_with(&lines);
            }
            Err(e) => tracing::warn!(error = %e, "cart count refresh failed"),
        }
    }
}

pub fn reconcile_cart_count(optimistic: u32, fetched: Option<u32>) -> CartCountReport {
    match fetched {
        Some(count) => CartCountReport {
            count,
            source: "backend",
        },
        None => CartCountReport {
            count: optimistic,
            source: "optimistic",
        },
    }
}

pub fn line_total(lines: &[CartLine]) -> u32 {
    lines.iter().map(|l| l.quantity).sum()
}

fn fetch_lines(api: &ApiClient, email: &str) -> Result<Vec<CartLine>, ApiError> {
    let env: CartEnvelope = api.post("/cart", &json!({"type": "display", "user_email": email}))?;
    Ok(env.cart)
}

/// Cart operations for the signed-in user.
pub struct Cart<'a> {
    pub api: &'a ApiClient,
    pub session: &'a SessionStore,
    pub store: &'a CartStore,
    pub badge: &'a CartBadge,
    pub events: &'a CartEvents,
}

impl Cart<'_> {
    fn email(&self) -> anyhow::Result<String> {
        Ok(signed_in_email(self.session)?)
    }

    pub fn display(&self) -> anyhow::Result<Vec<CartLine>> {
        let lines = fetch_lines(self.api, &self.email()?)?;
        self.badge.record_fetch(&lines);
        self.store.replace_with(&lines);
        Ok(lines)
    }

    pub fn add(&self, product_id: &str, quantity: u32) -> anyhow::Result<MessageResponse> {
        if quantity == 0 {
            anyhow::bail!(InputError("quantity must be at least 1".into()));
        }
        let resp: MessageResponse = self.api.post(
            "/addToCart/",
            &json!({
                "product_id": product_id,
                "user_email": self.email()?,
                "quantity": quantity,
            }),
        )?;
        self.store.add(product_id, quantity);
        self.events.emit();
        Ok(resp)
    }

    pub fn remove(&self, product_id: &str) -> anyhow::Result<MessageResponse> {
        let resp = self.mutate(json!({
            "type": "remove",
            "user_email": self.email()?,
            "product_id": product_id,
        }))?;
        self.store.remove(product_id);
        self.events.emit();
        Ok(resp)
    }

    pub fn remove_all(&self) -> anyhow::Result<MessageResponse> {
        let resp = self.mutate(json!({"type": "remove-all", "user_email": self.email()?}))?;
        self.store.clear();
        self.events.emit();
        Ok(resp)
    }

    pub fn update_quantity(
        &self,
        product_id: &str,
        quantity: u32,
    ) -> anyhow::Result<MessageResponse> {
        if quantity == 0 {
            return self.remove(product_id);
        }
        let resp = self.mutate(json!({
            "type": "update-quantity",
            "user_email": self.email()?,
            "product_id": product_id,
            "quantity": quantity,
        }))?;
        self.store.set(product_id, quantity);
        self.events.emit();
        Ok(resp)
    }

    pub fn related_items(&self) -> anyhow::Result<Vec<Product>> {
        let body = json!({"type": "display", "user_email": self.email()?});
        match self.api.post::<_, ProductList>("/cartRelatedItems", &body) {
            Ok(list) => Ok(list.products),
            Err(ApiError::Status {
                status: 404,
                restricted: false,
                ..
            }) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn count(&self) -> CartCountReport {
        self.badge.count(self.store)
    }

    fn mutate(&self, body: serde_json::Value) -> anyhow::Result<MessageResponse> {
        Ok(self.api.post("/cart", &body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{reconcile_cart_count, CartBadge, CartEvents, CartStore};
    use crate::domain::constants::CART_KEY;
    use crate::domain::models::CartLine;
    use crate::services::storage::testing::MemoryStorage;
    use std::cell::Cell;
    use std::rc::Rc;

    fn line(id: &str, quantity: u32) -> CartLine {
        serde_json::from_value(serde_json::json!({"product_id": id, "quantity": quantity})).unwrap()
    }

    #[test]
    fn optimistic_until_first_fetch_then_backend_even_if_lower() {
        assert_eq!(reconcile_cart_count(5, None).count, 5);
        let r = reconcile_cart_count(5, Some(2));
        assert_eq!((r.count, r.source), (2, "backend"));
        assert_eq!(reconcile_cart_count(0, Some(0)).count, 0);
    }

    #[test]
    fn badge_switches_to_fetched_count() {
        let store = CartStore::load(Box::new(MemoryStorage::default()));
        let badge = CartBadge::default();
        store.add("B01", 3);
        store.add("B02", 2);
        assert_eq!(badge.count(&store).count, 5);
        assert_eq!(badge.count(&store).source, "optimistic");

        badge.record_fetch(&[line("B01", 1)]);
        store.add("B03", 4);
        assert_eq!(badge.count(&store).count, 1);
    }

    #[test]
    fn store_survives_reload_and_tracks_mutations() {
        let mem = MemoryStorage::default();
        let store = CartStore::load(Box::new(mem.clone()));
        store.add("B01", 1);
        store.add("B01", 2);
        store.set("B02", 4);
        store.remove("B02");

        let again = CartStore::load(Box::new(mem.clone()));
        assert_eq!(again.total(), 3);
        assert_eq!(again.quantities().get("B01"), Some(&3));

        again.replace_with(&[line("B05", 1), line("B05", 2)]);
        assert_eq!(CartStore::load(Box::new(mem)).quantities().get("B05"), Some(&3));
    }

    #[test]
    fn unreadable_cart_starts_empty() {
        let mem = MemoryStorage::default();
        mem.set_raw(CART_KEY, "[oops");
        assert_eq!(CartStore::load(Box::new(mem)).total(), 0);
    }

    #[test]
    fn failed_cart_write_keeps_memory() {
        let mem = MemoryStorage::default();
        let store = CartStore::load(Box::new(mem.clone()));
        mem.failing_writes(true);
        store.add("B01", 2);
        assert_eq!(store.total(), 2);
        assert_eq!(mem.raw(CART_KEY), None);
    }

    #[test]
    fn events_reach_every_listener() {
        let events = CartEvents::default();
        let hits = Rc::new(Cell::new(0));
        for _ in 0..2 {
            let h = hits.clone();
            events.subscribe(move || h.set(h.get() + 1));
        }
        events.emit();
        assert_eq!(hits.get(), 2);
    }
}
