use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct JsonErr {
    pub ok: bool,
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// Capability tag carried by the identity. Numeric on the wire
/// (`1` admin, `2` user, `3` supplier, `4` delivery), but the admin
/// listing endpoints spell it out, so both forms are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RoleRepr", into = "u8")]
pub enum Role {
    Admin,
    #[default]
    User,
    Supplier,
    Delivery,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RoleRepr {
    Id(u8),
    Name(String),
    Null(()),
}

impl From<RoleRepr> for Role {
    fn from(r: RoleRepr) -> Self {
        match r {
            RoleRepr::Id(1) => Role::Admin,
            RoleRepr::Id(3) => Role::Supplier,
            RoleRepr::Id(4) => Role::Delivery,
            RoleRepr::Name(n) => match n.to_ascii_lowercase().as_str() {
                "admin" => Role::Admin,
                "supplier" => Role::Supplier,
                "delivery" => Role::Delivery,
                _ => Role::User,
            },
            _ => Role::User,
        }
    }
}

impl From<Role> for u8 {
    fn from(r: Role) -> u8 {
        match r {
            Role::Admin => 1,
            Role::User => 2,
            Role::Supplier => 3,
            Role::Delivery => 4,
        }
    }
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "User",
            Role::Supplier => "Supplier",
            Role::Delivery => "Delivery",
        }
    }
}

/// Account status. Values the client does not know are kept verbatim so
/// they are written back exactly as the backend sent them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserStatus {
    #[default]
    Active,
    Locked,
    Disabled,
    Other(String),
}

impl From<String> for UserStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "active" => UserStatus::Active,
            "locked" => UserStatus::Locked,
            "disabled" => UserStatus::Disabled,
            _ => UserStatus::Other(s),
        }
    }
}

impl From<UserStatus> for String {
    fn from(s: UserStatus) -> String {
        s.as_str().to_string()
    }
}

impl UserStatus {
    pub fn as_str(&self) -> &str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Locked => "locked",
            UserStatus::Disabled => "disabled",
            UserStatus::Other(s) => s,
        }
    }
}

/// The authenticated user as returned by `/login` and cached on disk.
///
/// Fields the client does not interpret are kept in `extra` so a
/// persisted identity round-trips without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_name: String,
    pub email_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub is_authenticated: bool,
    pub loading: bool,
    pub persisted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct RestrictionState {
    pub is_restricted: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: String,
    pub user: Value,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub user_name: String,
    pub email_address: String,
    pub phone_number: String,
    pub password: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub city: Option<String>,
    pub role: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
    pub user: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserProfile {
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub unit_number: Option<String>,
    #[serde(default)]
    pub street_number: Option<String>,
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileEnvelope {
    pub data: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_link: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub average_rating: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub no_of_ratings: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub discount_price_usd: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub actual_price_usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ProductList {
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryList {
    #[serde(default)]
    pub categories: Vec<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(default)]
    pub shopping_cart_id: Option<i64>,
    pub product_id: String,
    pub quantity: u32,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub price: Option<f64>,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub average_rating: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub discount_price_usd: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub actual_price_usd: Option<f64>,
}

impl CartLine {
    pub fn unit_price(&self) -> f64 {
        self.price.or(self.discount_price_usd).unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
pub struct CartEnvelope {
    #[serde(default)]
    pub cart: Vec<CartLine>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: String,
    pub qty: u32,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub price: Option<f64>,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    #[serde(default)]
    pub order_date: String,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub order_total: Option<f64>,
    #[serde(default)]
    pub payment_method_id: Option<i64>,
    #[serde(default)]
    pub shipping_method_id: Option<i64>,
    #[serde(default)]
    pub order_status_id: i64,
    #[serde(default)]
    pub items: Vec<OrderLine>,
}

impl Order {
    pub fn status_name(&self) -> &'static str {
        order_status_name(self.order_status_id)
    }
}

pub fn order_status_name(id: i64) -> &'static str {
    match id {
        1 => "Pending",
        2 => "Processing",
        3 => "Shipped",
        4 => "Delivered",
        5 => "Cancelled",
        6 => "Returned",
        _ => "Unknown",
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderHistory {
    #[serde(default)]
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CancelReceipt {
    #[serde(default)]
    pub message: String,
    pub order_id: i64,
    #[serde(default)]
    pub new_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingMethod {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentMethodList {
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethod>,
}

#[derive(Debug, Deserialize)]
pub struct ShippingMethodList {
    #[serde(default)]
    pub shipping_methods: Vec<ShippingMethod>,
}

#[derive(Serialize)]
pub struct CheckoutMethods {
    pub payment_methods: Vec<PaymentMethod>,
    pub shipping_methods: Vec<ShippingMethod>,
}

#[derive(Debug, Serialize)]
pub struct OrderItemRequest {
    pub product_id: String,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderRequest {
    pub user_email: String,
    pub payment_method_id: i64,
    pub shipping_method_id: i64,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderReceipt {
    #[serde(default)]
    pub message: String,
    pub order_id: i64,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub order_total: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub items_total: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub shipping_cost: Option<f64>,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub shipping_method: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct AdminStats {
    #[serde(default)]
    pub total_customers: u64,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub orders_today: u64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub revenue_today: f64,
    #[serde(default)]
    pub revenue_this_week: f64,
    #[serde(default)]
    pub revenue_this_month: f64,
    #[serde(default)]
    pub new_customers_today: u64,
    #[serde(default)]
    pub new_customers_this_week: u64,
    #[serde(default)]
    pub active_users_today: u64,
    #[serde(default)]
    pub users_ordered_today: u64,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct OrderStatusCounts {
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub processing: u64,
    #[serde(default)]
    pub shipped: u64,
    #[serde(default)]
    pub delivered: u64,
    #[serde(default)]
    pub cancelled: u64,
    #[serde(default)]
    pub returned: u64,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminOrder {
    pub order_id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub order_date: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub order_total: Option<f64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub user_id: i64,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub role_id: Option<u8>,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAddress {
    #[serde(default)]
    pub address_id: Option<i64>,
    #[serde(default)]
    pub unit_number: Option<String>,
    #[serde(default)]
    pub street_number: Option<String>,
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub is_default: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserDetail {
    #[serde(flatten)]
    pub user: AdminUser,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub addresses: Vec<AdminAddress>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserOrder {
    pub order_id: i64,
    #[serde(default)]
    pub order_date: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub order_total: Option<f64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub shipping_method: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminUserOrders {
    pub user_id: i64,
    #[serde(default)]
    pub orders: Vec<AdminUserOrder>,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_spent: f64,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub status_filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingProduct {
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub ratings: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub no_of_ratings: Option<u64>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Paged listing shape shared by the admin endpoints; the item array
/// is named differently per endpoint, hence the alias list.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(alias = "orders", alias = "users", alias = "products")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusChange {
    #[serde(default)]
    pub message: String,
    pub user_id: i64,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BulkStatusReport {
    #[serde(default)]
    pub message: String,
    pub updated_count: u64,
    pub skipped_count: u64,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminUserUpdate {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub user: Value,
}

#[derive(Serialize)]
pub struct CartCountReport {
    pub count: u32,
    pub source: &'static str,
}

#[derive(Serialize)]
pub struct NavLink {
    pub route: &'static str,
    pub label: &'static str,
}

#[derive(Serialize)]
pub struct WhoAmI {
    pub session: SessionSnapshot,
    pub links: Vec<NavLink>,
}

/// Prices arrive as JSON numbers from some endpoints and as decimal
/// strings from others.
fn de_opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => {
            let cleaned: String = s.chars().filter(|c| *c != ',' && *c != '$').collect();
            Ok(cleaned.trim().parse::<f64>().ok())
        }
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected number or numeric string, got {}",
            other
        ))),
    }
}

fn de_opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Ok(de_opt_f64(d)?.filter(|v| *v >= 0.0).map(|v| v as u64))
}
