use crate::domain::constants::DEFAULT_RESTRICTION_MESSAGE;
use crate::domain::models::RestrictionState;
use std::cell::RefCell;

type Listener = Box<dyn Fn(&RestrictionState)>;

/// Process-wide "account blocked while signed in" flag.
///
/// Two states: clear and restricted. Only `hide_restriction_modal` leaves
/// the restricted state; repeated `show_restriction_modal` calls replace the
/// message in place.
#[derive(Default)]
pub struct RestrictionGate {
    state: RefCell<RestrictionState>,
    listeners: RefCell<Vec<Listener>>,
}

impl RestrictionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_restriction_modal(&self, message: Option<&str>) {
        let message = match message {
            Some(m) if !m.trim().is_empty() => m.to_string(),
            _ => DEFAULT_RESTRICTION_MESSAGE.to_string(),
        };
        tracing::warn!(%message, "account restricted");
        *self.state.borrow_mut() = RestrictionState {
            is_restricted: true,
            message,
        };
        self.notify();
    }

    pub fn hide_restriction_modal(&self) {
        if !self.state.borrow().is_restricted {
            return;
        }
        *self.state.borrow_mut() = RestrictionState::default();
        tracing::info!("restriction acknowledged");
        self.notify();
    }

    pub fn is_restricted(&self) -> bool {
        self.state.borrow().is_restricted
    }

    pub fn state(&self) -> RestrictionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self, listener: impl Fn(&RestrictionState) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    fn notify(&self) {
        let snap = self.state();
        for l in self.listeners.borrow().iter() {
            l(&snap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RestrictionGate;
    use crate::domain::constants::DEFAULT_RESTRICTION_MESSAGE;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn starts_clear() {
        let g = RestrictionGate::new();
        assert!(!g.is_restricted());
        assert_eq!(g.state().message, "");
    }

    #[test]
    fn show_without_message_uses_default() {
        let g = RestrictionGate::new();
        g.show_restriction_modal(None);
        assert!(g.is_restricted());
        assert_eq!(g.state().message, DEFAULT_RESTRICTION_MESSAGE);

        g.show_restriction_modal(Some("   "));
        assert_eq!(g.state().message, DEFAULT_RESTRICTION_MESSAGE);
    }

    #[test]
    fn retrigger_overwrites_without_passing_through_clear() {
        let g = RestrictionGate::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        g.subscribe(move |s| sink.borrow_mut().push(s.clone()));

        g.show_restriction_modal(Some("m1"));
        g.show_restriction_modal(Some("m2"));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|s| s.is_restricted));
        assert_eq!(seen[1].message, "m2");
        assert_eq!(g.state().message, "m2");
    }

    #[test]
    fn hide_when_clear_is_a_noop() {
        let g = RestrictionGate::new();
        let calls = Rc::new(RefCell::new(0));
        let c = calls.clone();
        g.subscribe(move |_| *c.borrow_mut() += 1);

        g.hide_restriction_modal();
        assert_eq!(*calls.borrow(), 0);
        assert!(!g.is_restricted());

        g.show_restriction_modal(Some("locked"));
        g.hide_restriction_modal();
        g.hide_restriction_modal();
        assert_eq!(*calls.borrow(), 2);
        assert_eq!(g.state().message, "");
    }
}
