use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "shopfront", version, about = "Storefront client CLI")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        help = "Backend base URL (overrides SHOPFRONT_API and config.toml)"
    )]
    pub api: Option<String>,
    #[arg(long, short, global = true, help = "Enable debug logging on stderr")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with an email address or phone number
    Login {
        identifier: String,
        #[arg(long)]
        password: String,
    },
    /// Create a customer account
    Register(RegisterArgs),
    /// End the current session
    Logout,
    /// Show the current session and reachable pages
    Whoami,
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// List products, optionally within one category
    Products {
        #[arg(long)]
        category: Option<String>,
    },
    Search {
        query: String,
    },
    Product {
        id: String,
    },
    Related {
        id: String,
    },
    TopRated,
    Categories,
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },
    Checkout {
        #[command(subcommand)]
        command: CheckoutCommands,
    },
    Orders {
        #[command(subcommand)]
        command: OrderCommands,
    },
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
    /// Interactive session; the restriction overlay blocks the next prompt
    Shell,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub age: Option<u32>,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    Show,
    Update(ProfileArgs),
}

#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub age: Option<u32>,
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub unit_number: Option<String>,
    #[arg(long)]
    pub street_number: Option<String>,
    #[arg(long)]
    pub address_line1: Option<String>,
    #[arg(long)]
    pub address_line2: Option<String>,
    #[arg(long)]
    pub region: Option<String>,
    #[arg(long)]
    pub postal_code: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum CartCommands {
    Show,
    Add {
        product: String,
        #[arg(long, default_value_t = 1)]
        qty: u32,
    },
    Remove {
        product: String,
    },
    /// Set the quantity of a line (0 removes it)
    Set {
        product: String,
        qty: u32,
    },
    Clear,
    Count,
    Related,
}

#[derive(Subcommand, Debug)]
pub enum CheckoutCommands {
    Methods,
    Place {
        #[arg(long)]
        payment: i64,
        #[arg(long)]
        shipping: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum OrderCommands {
    List {
        #[arg(long, value_enum)]
        status: Option<OrderStatus>,
    },
    Show {
        id: i64,
    },
    Cancel {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    Stats,
    Orders {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        per_page: u32,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        status: Option<OrderStatus>,
    },
    OrderCounts,
    Users(UserListArgs),
    User {
        id: i64,
    },
    UserOrders {
        id: i64,
        #[arg(long, value_enum)]
        period: Option<Period>,
        #[arg(long, value_enum)]
        status: Option<OrderStatus>,
    },
    SetStatus {
        id: i64,
        #[arg(value_enum)]
        status: AccountStatus,
    },
    BulkStatus {
        #[arg(long, value_enum)]
        status: AccountStatus,
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    UpdateUser {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },
    Trending {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 5)]
        per_page: u32,
    },
}

#[derive(Args, Debug)]
pub struct UserListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = 20)]
    pub per_page: u32,
    #[arg(long, help = "Match user name")]
    pub search: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long, value_enum)]
    pub status: Option<AccountStatus>,
    #[arg(long, value_enum)]
    pub role: Option<RoleArg>,
    #[arg(long, value_enum, default_value_t = SortField::UserId)]
    pub sort_by: SortField,
    #[arg(long, default_value_t = false)]
    pub asc: bool,
    #[arg(long, help = "YYYY-MM-DD")]
    pub registered_from: Option<String>,
    #[arg(long, help = "YYYY-MM-DD")]
    pub registered_to: Option<String>,
    #[arg(long, help = "YYYY-MM-DD")]
    pub last_active_from: Option<String>,
    #[arg(long, help = "YYYY-MM-DD")]
    pub last_active_to: Option<String>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Locked,
    Disabled,
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Locked => "locked",
            AccountStatus::Disabled => "disabled",
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

impl OrderStatus {
    pub fn id(self) -> u8 {
        self as u8 + 1
    }

    pub fn name(self) -> &'static str {
        crate::domain::models::order_status_name(self.id() as i64)
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum RoleArg {
    Admin,
    User,
    Supplier,
    Delivery,
}

impl RoleArg {
    pub fn id(self) -> u8 {
        self as u8 + 1
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum SortField {
    UserId,
    UserName,
    EmailAddress,
    CreatedAt,
    LastLoginAt,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::UserId => "user_id",
            SortField::UserName => "user_name",
            SortField::EmailAddress => "email_address",
            SortField::CreatedAt => "created_at",
            SortField::LastLoginAt => "last_login_at",
        }
    }
}
