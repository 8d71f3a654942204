use crate::*;
use serde_json::{Map, Value};

pub fn handle_admin_commands(cli: &Cli, app: &App) -> anyhow::Result<bool> {
    let Commands::Admin { command } = &cli.command else {
        return Ok(false);
    };

    match command {
        AdminCommands::Stats => {
            app.open(Route::AdminOverview)?;
            let s = admin::stats(&app.api)?;
            print_one(cli.json, s, |s| {
                format!(
                    "customers={} (+{} today) orders={} (today {}) revenue={} (today {}, week {}, month {}) active_today={}",
                    s.total_customers,
                    s.new_customers_today,
                    s.total_orders,
                    s.orders_today,
                    money(Some(s.total_revenue)),
                    money(Some(s.revenue_today)),
                    money(Some(s.revenue_this_week)),
                    money(Some(s.revenue_this_month)),
                    s.active_users_today
                )
            })?;
        }
        AdminCommands::Orders {
            page,
            per_page,
            search,
            status,
        } => {
            app.open(Route::AdminOverview)?;
            let p = admin::orders(
                &app.api,
                *page,
                *per_page,
                search.as_deref(),
                status.map(|s| s.id()).unwrap_or(0),
            )?;
            print_page(cli.json, p, |o| {
                format!(
                    "#{}\t{}\t{}\t{}\t{}",
                    o.order_id,
                    o.order_date.as_deref().unwrap_or("-"),
                    o.status,
                    money(o.order_total),
                    o.user_name
                )
            })?;
        }
        AdminCommands::OrderCounts => {
            app.open(Route::AdminOverview)?;
            let c = admin::order_status_counts(&app.api)?;
            print_one(cli.json, c, |c| {
                format!(
                    "pending={} processing={} shipped={} delivered={} cancelled={} returned={} total={}",
                    c.pending, c.processing, c.shipped, c.delivered, c.cancelled, c.returned, c.total
                )
            })?;
        }
        AdminCommands::Users(a) => {
            app.open(Route::AdminUsers)?;
            let filter = UserFilter {
                search: a.search.clone(),
                email: a.email.clone(),
                phone: a.phone.clone(),
                status: a.status.map(|s| s.as_str().to_string()),
                role: a.role.map(|r| r.id()),
                sort_by: Some(a.sort_by.as_str().to_string()),
                descending: !a.asc,
                registered_from: a.registered_from.clone(),
                registered_to: a.registered_to.clone(),
                last_active_from: a.last_active_from.clone(),
                last_active_to: a.last_active_to.clone(),
            };
            let p = admin::users(&app.api, a.page, a.per_page, &filter)?;
            print_page(cli.json, p, user_row)?;
        }
        AdminCommands::User { id } => {
            app.open(Route::AdminUsers)?;
            let d = admin::user_detail(&app.api, *id)?;
            print_one(cli.json, d, |d| {
                let mut out = vec![
                    user_row(&d.user),
                    format!(
                        "age={} gender={} city={}",
                        d.age.map(|a| a.to_string()).unwrap_or_else(|| "-".into()),
                        opt(&d.gender),
                        opt(&d.city)
                    ),
                ];
                out.extend(d.addresses.iter().map(|a| {
                    format!(
                        "  address {} {} {}{}",
                        opt(&a.address_line1),
                        opt(&a.region),
                        opt(&a.postal_code),
                        if a.is_default.unwrap_or(false) { " (default)" } else { "" }
                    )
                }));
                out.join("\n")
            })?;
        }
        AdminCommands::UserOrders { id, period, status } => {
            app.open(Route::AdminUsers)?;
            let h = admin::user_orders(
                &app.api,
                *id,
                period.map(|p| p.as_str()),
                status.map(|s| s.name()),
            )?;
            print_one(cli.json, h, |h| {
                let mut out = vec![format!(
                    "user {}: {} orders, spent {} (period {}, status {})",
                    h.user_id,
                    h.total_orders,
                    money(Some(h.total_spent)),
                    h.period,
                    h.status_filter
                )];
                out.extend(h.orders.iter().map(|o| {
                    format!(
                        "  #{}\t{}\t{}\t{}",
                        o.order_id,
                        o.order_date.as_deref().unwrap_or("-"),
                        o.status,
                        money(o.order_total)
                    )
                }));
                out.join("\n")
            })?;
        }
        AdminCommands::SetStatus { id, status } => {
            app.open(Route::AdminUsers)?;
            let r = admin::set_user_status(&app.api, *id, status.as_str())?;
            print_one(cli.json, r, |r| r.message.clone())?;
        }
        AdminCommands::BulkStatus { status, ids } => {
            app.open(Route::AdminUsers)?;
            let r = admin::bulk_status(&app.api, ids, status.as_str())?;
            print_one(cli.json, r, |r| {
                format!("{} (skipped {})", r.message, r.skipped_count)
            })?;
        }
        AdminCommands::UpdateUser {
            id,
            name,
            email,
            phone,
            age,
            gender,
            city,
        } => {
            app.open(Route::AdminUsers)?;
            let mut fields = Map::new();
            let mut put = |k: &str, v: Value| {
                if !v.is_null() {
                    fields.insert(k.to_string(), v);
                }
            };
            put("user_name", serde_json::json!(name));
            put("email_address", serde_json::json!(email));
            put("phone_number", serde_json::json!(phone));
            put("age", serde_json::json!(age));
            put("gender", serde_json::json!(gender));
            put("city", serde_json::json!(city));
            let r = admin::update_user(&app.api, *id, fields)?;
            print_one(cli.json, r, |r| r.message.clone())?;
        }
        AdminCommands::Trending { page, per_page } => {
            app.open(Route::AdminOverview)?;
            let p = admin::trending(&app.api, *page, *per_page)?;
            print_page(cli.json, p, |t| {
                format!(
                    "{}\t{}\t{}\t{}",
                    t.product_id,
                    t.ratings.map(|r| format!("{:.1}", r)).unwrap_or_else(|| "-".into()),
                    t.no_of_ratings.unwrap_or(0),
                    t.product_name
                )
            })?;
        }
    }

    Ok(true)
}

fn print_page<T: serde::Serialize>(
    json: bool,
    page: Page<T>,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    print_one(json, page, |p| {
        let mut out: Vec<String> = p.items.iter().map(&row).collect();
        out.push(format!(
            "page {}/{} ({} total)",
            p.page, p.total_pages, p.total
        ));
        out.join("\n")
    })
}

fn user_row(u: &AdminUser) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        u.user_id,
        u.user_name,
        u.email_address,
        u.role.label(),
        u.status.as_str(),
        u.last_login_at.as_deref().unwrap_or("never")
    )
}
