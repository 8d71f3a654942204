//! Back-office calls. Callers are expected to have passed the admin route
//! guard first; the backend itself does not check roles.

use crate::domain::models::{
    AdminOrder, AdminStats, AdminUser, AdminUserDetail, AdminUserOrders, AdminUserUpdate,
    BulkStatusReport, OrderStatusCounts, Page, StatusChange, TrendingProduct,
};
use crate::services::account::InputError;
use crate::services::http::ApiClient;
use serde_json::{json, Map, Value};

pub const ACCOUNT_STATUSES: [&str; 3] = ["active", "locked", "disabled"];
const EDITABLE_USER_FIELDS: [&str; 6] = [
    "user_name",
    "email_address",
    "phone_number",
    "age",
    "gender",
    "city",
];

pub fn stats(api: &ApiClient) -> anyhow::Result<AdminStats> {
    Ok(api.get("/admin/stats", &[])?)
}

pub fn order_status_counts(api: &ApiClient) -> anyhow::Result<OrderStatusCounts> {
    Ok(api.get("/admin/order-status-counts", &[])?)
}

/// `status_id` 0 means every status.
pub fn orders(
    api: &ApiClient,
    page: u32,
    per_page: u32,
    search: Option<&str>,
    status_id: u8,
) -> anyhow::Result<Page<AdminOrder>> {
    let mut q = paging(page, per_page);
    if let Some(s) = search {
        q.push(("search", s.to_string()));
    }
    q.push(("status", status_id.to_string()));
    Ok(api.get("/admin/orders", &q)?)
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub role: Option<u8>,
    pub sort_by: Option<String>,
    pub descending: bool,
    pub registered_from: Option<String>,
    pub registered_to: Option<String>,
    pub last_active_from: Option<String>,
    pub last_active_to: Option<String>,
}

impl UserFilter {
    fn query(&self) -> Result<Vec<(&'static str, String)>, InputError> {
        let mut q = Vec::new();
        let mut push = |k: &'static str, v: &Option<String>| {
            if let Some(v) = v.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                q.push((k, v.to_string()));
            }
        };
        push("search", &self.search);
        push("email_search", &self.email);
        push("phone_search", &self.phone);
        push("status", &self.status.as_deref().map(str::to_ascii_lowercase));
        push("sort_by", &self.sort_by);
        push("registered_from", &self.registered_from);
        push("registered_to", &self.registered_to);
        push("last_active_from", &self.last_active_from);
        push("last_active_to", &self.last_active_to);
        if let Some(s) = &self.status {
            check_status(s)?;
        }
        q.push(("role", self.role.unwrap_or(0).to_string()));
        q.push((
            "sort_order",
            if self.descending { "desc" } else { "asc" }.to_string(),
        ));
        Ok(q)
    }
}

pub fn users(
    api: &ApiClient,
    page: u32,
    per_page: u32,
    filter: &UserFilter,
) -> anyhow::Result<Page<AdminUser>> {
    let mut q = paging(page, per_page);
    q.extend(filter.query()?);
    Ok(api.get("/admin/users", &q)?)
}

pub fn user_detail(api: &ApiClient, user_id: i64) -> anyhow::Result<AdminUserDetail> {
    Ok(api.get(&format!("/admin/users/{}/detail", user_id), &[])?)
}

/// `period` is one of `day`, `week`, `month`, `year`; `None` means all time.
pub fn user_orders(
    api: &ApiClient,
    user_id: i64,
    period: Option<&str>,
    status: Option<&str>,
) -> anyhow::Result<AdminUserOrders> {
    let mut q = Vec::new();
    if let Some(p) = period {
        if !["day", "week", "month", "year"].contains(&p) {
            anyhow::bail!(InputError(format!("unknown period: {}", p)));
        }
        q.push(("period", p.to_string()));
    }
    if let Some(s) = status {
        q.push(("status", s.to_string()));
    }
    Ok(api.get(&format!("/admin/users/{}/orders", user_id), &q)?)
}

/// Admin accounts cannot be re-statused; the backend answers 403
/// "Cannot change admin user status".
pub fn set_user_status(api: &ApiClient, user_id: i64, status: &str) -> anyhow::Result<StatusChange> {
    let status = check_status(status)?;
    Ok(api.put(
        &format!("/admin/users/{}/status", user_id),
        &json!({ "status": status }),
    )?)
}

pub fn bulk_status(api: &ApiClient, user_ids: &[i64], status: &str) -> anyhow::Result<BulkStatusReport> {
    if user_ids.is_empty() {
        anyhow::bail!(InputError("no user ids given".into()));
    }
    let status = check_status(status)?;
    Ok(api.put(
        "/admin/users/bulk-status",
        &json!({ "user_ids": user_ids, "status": status }),
    )?)
}

/// Updates the editable profile fields of another user. Password and role
/// are not editable here.
pub fn update_user(
    api: &ApiClient,
    user_id: i64,
    fields: Map<String, Value>,
) -> anyhow::Result<AdminUserUpdate> {
    let body = editable_fields(fields)?;
    Ok(api.put(&format!("/admin/users/{}/update", user_id), &Value::Object(body))?)
}

fn editable_fields(fields: Map<String, Value>) -> Result<Map<String, Value>, InputError> {
    if let Some(bad) = fields
        .keys()
        .find(|k| !EDITABLE_USER_FIELDS.contains(&k.as_str()))
    {
        return Err(InputError(format!("field `{}` cannot be edited", bad)));
    }
    let body: Map<String, Value> = fields.into_iter().filter(|(_, v)| !v.is_null()).collect();
    if body.is_empty() {
        return Err(InputError("nothing to update".into()));
    }
    Ok(body)
}

pub fn trending(api: &ApiClient, page: u32, per_page: u32) -> anyhow::Result<Page<TrendingProduct>> {
    Ok(api.get("/admin/trending-products", &paging(page, per_page))?)
}

fn paging(page: u32, per_page: u32) -> Vec<(&'static str, String)> {
    vec![
        ("page", page.max(1).to_string()),
        ("per_page", per_page.max(1).to_string()),
    ]
}

fn check_status(status: &str) -> Result<String, InputError> {
    let s = status.trim().to_ascii_lowercase();
    if ACCOUNT_STATUSES.contains(&s.as_str()) {
        Ok(s)
    } else {
        Err(InputError(format!(
            "invalid status `{}`; expected one of {}",
            status,
            ACCOUNT_STATUSES.join(", ")
        )))
    }
}
