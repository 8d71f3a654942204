use crate::*;

pub fn handle_shop_commands(cli: &Cli, app: &App) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Login {
            identifier,
            password,
        } => {
            let identity = account::login(&app.api, &app.session, identifier, password)?;
            app.open(Route::Home)?;
            print_one(cli.json, identity, |i| {
                format!("signed in as {} <{}> ({})", i.user_name, i.email_address, i.role.label())
            })?;
        }
        Commands::Register(args) => {
            let req = RegisterRequest {
                user_name: args.name.clone(),
                email_address: args.email.clone(),
                phone_number: args.phone.clone(),
                password: args.password.clone(),
                age: args.age,
                gender: args.gender.clone(),
                city: args.city.clone(),
                role: Role::User.into(),
            };
            let resp = account::register(&app.api, &req)?;
            print_one(cli.json, resp, |_| {
                format!("registered {}; run `shopfront login {}`", req.email_address, req.email_address)
            })?;
        }
        Commands::Logout => {
            let was = app.session.is_authenticated();
            app.session.logout()?;
            app.open(Route::SignIn)?;
            print_one(cli.json, was, |was| {
                if *was { "signed out" } else { "not signed in" }.to_string()
            })?;
        }
        Commands::Whoami => {
            let session = app.snapshot();
            let links = nav_links(&session);
            print_one(cli.json, WhoAmI { session, links }, |w| {
                let who = match &w.session.identity {
                    Some(i) => format!("{} <{}> role={}", i.user_name, i.email_address, i.role.label()),
                    None => "not signed in".to_string(),
                };
                let links: Vec<&str> = w.links.iter().map(|l| l.route).collect();
                format!("{}\npages: {}", who, links.join(" "))
            })?;
        }
        Commands::Profile { command } => {
            app.open(Route::Profile)?;
            let profile = match command {
                ProfileCommands::Show => account::fetch_profile(&app.api, &app.session)?,
                ProfileCommands::Update(a) => {
                    let changes = ProfileChanges {
                        name: a.name.clone(),
                        phone: a.phone.clone(),
                        age: a.age,
                        gender: a.gender.clone(),
                        city: a.city.clone(),
                        unit_number: a.unit_number.clone(),
                        street_number: a.street_number.clone(),
                        address_line1: a.address_line1.clone(),
                        address_line2: a.address_line2.clone(),
                        region: a.region.clone(),
                        postal_code: a.postal_code.clone(),
                    };
                    account::update_profile(&app.api, &app.session, changes)?
                }
            };
            print_one(cli.json, profile, profile_text)?;
        }
        Commands::Products { category } => {
            app.open(Route::Products)?;
            let items = match category {
                Some(c) => catalog::by_category(&app.api, c)?,
                None => catalog::all_products(&app.api)?,
            };
            print_out(cli.json, &items, product_row)?;
        }
        Commands::Search { query } => {
            app.open(Route::Products)?;
            let items = catalog::search(&app.api, query)?;
            print_out(cli.json, &items, product_row)?;
        }
        Commands::Product { id } => {
            app.open(Route::ProductDetail)?;
            let p = catalog::product_detail(&app.api, id)?;
            print_one(cli.json, p, |p| {
                format!(
                    "{}\n{}\nprice: {} (was {})\nrating: {} ({} ratings)\ncategory: {} / {}",
                    p.product_id,
                    p.product_name,
                    money(p.discount_price_usd),
                    money(p.actual_price_usd),
                    p.average_rating.map(|r| r.to_string()).unwrap_or_else(|| "-".into()),
                    p.no_of_ratings.unwrap_or(0),
                    opt(&p.main_category),
                    opt(&p.sub_category)
                )
            })?;
        }
        Commands::Related { id } => {
            app.open(Route::ProductDetail)?;
            let items = catalog::related(&app.api, id)?;
            print_out(cli.json, &items, product_row)?;
        }
        Commands::TopRated => {
            app.open(Route::Home)?;
            let items = catalog::top_rated(&app.api)?;
            print_out(cli.json, &items, product_row)?;
        }
        Commands::Categories => {
            let items = catalog::categories(&app.api)?;
            print_out(cli.json, &items, |c| c.clone())?;
        }
        Commands::Cart { command } => {
            app.open(Route::Cart)?;
            handle_cart(cli.json, app, command)?;
        }
        Commands::Checkout { command } => {
            app.open(Route::Checkout)?;
            match command {
                CheckoutCommands::Methods => {
                    let m = orders::checkout_methods(&app.api)?;
                    print_one(cli.json, m, |m| {
                        let mut out = vec!["payment:".to_string()];
                        out.extend(m.payment_methods.iter().map(|p| format!("  {}\t{}", p.id, p.name)));
                        out.push("shipping:".to_string());
                        out.extend(
                            m.shipping_methods
                                .iter()
                                .map(|s| format!("  {}\t{}\t{}", s.id, s.kind, money(s.price))),
                        );
                        out.join("\n")
                    })?;
                }
                CheckoutCommands::Place { payment, shipping } => {
                    let receipt = orders::place_order(&app.cart(), *payment, *shipping)?;
                    print_one(cli.json, receipt, |r| {
                        format!(
                            "order {} placed: items {} + shipping {} = {} ({}, {})",
                            r.order_id,
                            money(r.items_total),
                            money(r.shipping_cost),
                            money(r.order_total),
                            r.payment_method,
                            r.shipping_method
                        )
                    })?;
                }
            }
        }
        Commands::Orders { command } => {
            app.open(Route::Orders)?;
            match command {
                OrderCommands::List { status } => {
                    let list = orders::history(&app.api, &app.session, status.map(|s| s.name()))?;
                    print_out(cli.json, &list, order_row)?;
                }
                OrderCommands::Show { id } => {
                    let o = orders::detail(&app.api, *id)?;
                    print_one(cli.json, o, |o| {
                        let mut out = vec![order_row(o)];
                        out.extend(o.items.iter().map(|l| {
                            format!("  {}\t{} x {}\t{}", l.product_id, l.qty, money(l.price), l.product_name)
                        }));
                        out.join("\n")
                    })?;
                }
                OrderCommands::Cancel { id } => {
                    let r = orders::cancel(&app.api, &app.session, *id)?;
                    print_one(cli.json, r, |r| format!("order {} {}", r.order_id, r.new_status.to_lowercase()))?;
                }
            }
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn handle_cart(json: bool, app: &App, command: &CartCommands) -> anyhow::Result<()> {
    let cart = app.cart();
    match command {
        CartCommands::Show => {
            let lines = cart.display()?;
            print_out(json, &lines, |l| {
                format!(
                    "{}\t{} x {}\t{}",
                    l.product_id,
                    l.quantity,
                    money(Some(l.unit_price())),
                    l.product_name
                )
            })?;
        }
        CartCommands::Add { product, qty } => {
            let r = cart.add(product, *qty)?;
            print_one(json, r, |r| r.message.clone())?;
        }
        CartCommands::Remove { product } => {
            let r = cart.remove(product)?;
            print_one(json, r, |r| r.message.clone())?;
        }
        CartCommands::Set { product, qty } => {
            let r = cart.update_quantity(product, *qty)?;
            print_one(json, r, |r| r.message.clone())?;
        }
        CartCommands::Clear => {
            let r = cart.remove_all()?;
            print_one(json, r, |r| r.message.clone())?;
        }
        CartCommands::Count => {
            app.cart_badge.refresh(&app.api, &app.session, &app.cart_store);
            print_one(json, cart.count(), |c| format!("{} ({})", c.count, c.source))?;
        }
        CartCommands::Related => {
            let items = cart.related_items()?;
            print_out(json, &items, product_row)?;
        }
    }
    Ok(())
}

fn product_row(p: &Product) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        p.product_id,
        money(p.discount_price_usd),
        p.average_rating.map(|r| format!("{:.1}", r)).unwrap_or_else(|| "-".into()),
        p.product_name
    )
}

fn order_row(o: &Order) -> String {
    format!(
        "#{}\t{}\t{}\t{}\t{} items",
        o.order_id,
        o.order_date,
        o.status_name(),
        money(o.order_total),
        o.items.len()
    )
}

fn profile_text(p: &UserProfile) -> String {
    let address: Vec<&str> = [
        &p.unit_number,
        &p.street_number,
        &p.address_line1,
        &p.address_line2,
        &p.region,
        &p.postal_code,
    ]
    .into_iter()
    .filter_map(|v| v.as_deref())
    .collect();
    format!(
        "name: {}\nemail: {}\nphone: {}\nage: {}\ngender: {}\ncity: {}\naddress: {}",
        opt(&p.name),
        p.email,
        opt(&p.phone),
        p.age.map(|a| a.to_string()).unwrap_or_else(|| "-".into()),
        opt(&p.gender),
        opt(&p.city),
        if address.is_empty() { "-".to_string() } else { address.join(", ") }
    )
}
