pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Durable storage key holding the serialized identity.
pub const SESSION_KEY: &str = "user";
/// Durable storage key holding optimistic cart quantities.
pub const CART_KEY: &str = "cart";

pub const DEFAULT_RESTRICTION_MESSAGE: &str = "Your account has been restricted.";
pub const RESTRICTION_SUPPORT_HINT: &str = "Please contact support for assistance.";

/// Case-sensitive markers the backend puts in `detail` for blocked accounts.
pub const RESTRICTION_KEYWORDS: [&str; 3] = ["locked", "disabled", "not active"];

pub const CART_UPDATED_EVENT: &str = "cartUpdated";
