//! Response watcher that raises the restriction gate.
//!
//! Classification is loose: status 403 plus one of the
//! `RESTRICTION_KEYWORDS` anywhere in `detail` (case-sensitive). A 403 from
//! an unrelated endpoint whose text mentions "disabled" also trips it.

use crate::domain::constants::RESTRICTION_KEYWORDS;
use crate::services::http::{
    ApiClient, ApiError, ApiResponse, InterceptorGuard, ResponseInterceptor, Verdict,
};
use crate::services::restriction::RestrictionGate;
use std::rc::Rc;

pub const WATCHER_NAME: &str = "account-restriction";

/// Returns the restriction message when `status`/`detail` describe an
/// administratively blocked account.
pub fn classify(status: u16, detail: Option<&str>) -> Option<&str> {
    if status != 403 {
        return None;
    }
    detail.filter(|d| RESTRICTION_KEYWORDS.iter().any(|k| d.contains(k)))
}

pub struct RestrictionWatcher {
    gate: Rc<RestrictionGate>,
}

impl RestrictionWatcher {
    /// Registers the watcher on `api`. Fails if one is already installed;
    /// the returned guard removes it when dropped.
    pub fn install(
        api: &ApiClient,
        gate: Rc<RestrictionGate>,
    ) -> Result<InterceptorGuard, ApiError> {
        api.register(Rc::new(Self { gate }))
    }
}

impl ResponseInterceptor for RestrictionWatcher {
    fn name(&self) -> &'static str {
        WATCHER_NAME
    }

    fn on_response(&self, response: &ApiResponse) -> Verdict {
        match classify(response.status, response.detail()) {
            Some(message) => {
                tracing::debug!(
                    method = response.method,
                    path = %response.path,
                    "restriction response observed"
                );
                self.gate.show_restriction_modal(Some(message));
                Verdict::Flagged
            }
            None => Verdict::Pass,
        }
    }
}
