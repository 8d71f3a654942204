use crate::domain::models::{NavLink, SessionSnapshot};
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    SignIn,
    SignUp,
    Products,
    ProductDetail,
    Cart,
    Checkout,
    Orders,
    Profile,
    AdminOverview,
    AdminUsers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Customer,
    Admin,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum NavigationError {
    #[error("sign in required for {0}; run `shopfront login`")]
    SignInRequired(&'static str),
    #[error("{0} is only available to administrators")]
    AdminOnly(&'static str),
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::SignIn => "/SignIn",
            Route::SignUp => "/SignUp",
            Route::Products => "/Product",
            Route::ProductDetail => "/Item",
            Route::Cart => "/Cart",
            Route::Checkout => "/Checkout",
            Route::Orders => "/Order",
            Route::Profile => "/User",
            Route::AdminOverview => "/admin",
            Route::AdminUsers => "/admin/users",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::SignIn => "Sign in",
            Route::SignUp => "Sign up",
            Route::Products => "Products",
            Route::ProductDetail => "Product",
            Route::Cart => "Cart",
            Route::Checkout => "Checkout",
            Route::Orders => "Orders",
            Route::Profile => "Profile",
            Route::AdminOverview => "Admin overview",
            Route::AdminUsers => "User management",
        }
    }

    pub fn access(self) -> Access {
        match self {
            Route::Home | Route::SignIn | Route::SignUp | Route::Products | Route::ProductDetail => {
                Access::Public
            }
            Route::Cart | Route::Checkout | Route::Orders | Route::Profile => Access::Customer,
            Route::AdminOverview | Route::AdminUsers => Access::Admin,
        }
    }

    pub fn check(self, session: &SessionSnapshot) -> Result<(), NavigationError> {
        match (self.access(), &session.identity) {
            (Access::Public, _) => Ok(()),
            (_, None) => Err(NavigationError::SignInRequired(self.label())),
            (Access::Admin, Some(id)) if !id.is_admin() => {
                Err(NavigationError::AdminOnly(self.label()))
            }
            _ => Ok(()),
        }
    }
}

const NAV_ORDER: [Route; 9] = [
    Route::Home,
    Route::Products,
    Route::Cart,
    Route::Orders,
    Route::Profile,
    Route::AdminOverview,
    Route::AdminUsers,
    Route::SignIn,
    Route::SignUp,
];

/// Links shown for the current session: signed-out users get the sign-in
/// entry points, admins additionally get the back-office pages.
pub fn nav_links(session: &SessionSnapshot) -> Vec<NavLink> {
    NAV_ORDER
        .iter()
        .filter(|r| match r {
            Route::SignIn | Route::SignUp => !session.is_authenticated,
            r => r.check(session).is_ok(),
        })
        .map(|r| NavLink {
            route: r.path(),
            label: r.label(),
        })
        .collect()
}

pub struct Navigator {
    current: RefCell<Route>,
    history: RefCell<Vec<Route>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            current: RefCell::new(Route::Home),
            history: RefCell::new(Vec::new()),
        }
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    pub fn history(&self) -> Vec<Route> {
        self.history.borrow().clone()
    }

    pub fn navigate(&self, route: Route, session: &SessionSnapshot) -> Result<(), NavigationError> {
        route.check(session)?;
        let prev = self.current.replace(route);
        self.history.borrow_mut().push(prev);
        tracing::debug!(from = prev.path(), to = route.path(), "navigate");
        Ok(())
    }
}
