use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

fn run_help(home: &TempDir, args: &[&str]) {
    let mut cmd = cargo_bin_cmd!("shopfront");
    cmd.env("HOME", home.path())
        .args(args)
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn every_cli_command_has_help_path() {
    let home = TempDir::new().expect("temp home");

    // top-level
    run_help(&home, &[]);

    // account
    run_help(&home, &["login"]);
    run_help(&home, &["register"]);
    run_help(&home, &["logout"]);
    run_help(&home, &["whoami"]);
    run_help(&home, &["profile"]);
    run_help(&home, &["profile", "show"]);
    run_help(&home, &["profile", "update"]);

    // catalog
    run_help(&home, &["products"]);
    run_help(&home, &["search"]);
    run_help(&home, &["product"]);
    run_help(&home, &["related"]);
    run_help(&home, &["top-rated"]);
    run_help(&home, &["categories"]);

    // cart, checkout, orders
    run_help(&home, &["cart"]);
    run_help(&home, &["cart", "show"]);
    run_help(&home, &["cart", "add"]);
    run_help(&home, &["cart", "remove"]);
    run_help(&home, &["cart", "set"]);
    run_help(&home, &["cart", "clear"]);
    run_help(&home, &["cart", "count"]);
    run_help(&home, &["cart", "related"]);
    run_help(&home, &["checkout"]);
    run_help(&home, &["checkout", "methods"]);
    run_help(&home, &["checkout", "place"]);
    run_help(&home, &["orders"]);
    run_help(&home, &["orders", "list"]);
    run_help(&home, &["orders", "show"]);
    run_help(&home, &["orders", "cancel"]);

    // admin
    run_help(&home, &["admin"]);
    run_help(&home, &["admin", "stats"]);
    run_help(&home, &["admin", "orders"]);
    run_help(&home, &["admin", "order-counts"]);
    run_help(&home, &["admin", "users"]);
    run_help(&home, &["admin", "user"]);
    run_help(&home, &["admin", "user-orders"]);
    run_help(&home, &["admin", "set-status"]);
    run_help(&home, &["admin", "bulk-status"]);
    run_help(&home, &["admin", "update-user"]);
    run_help(&home, &["admin", "trending"]);

    run_help(&home, &["shell"]);
}

#[test]
fn invalid_values_are_rejected_by_the_parser() {
    let home = TempDir::new().expect("temp home");
    for args in [
        &["orders", "list", "--status", "lost"][..],
        &["admin", "set-status", "3", "frozen"][..],
        &["admin", "bulk-status", "--status", "locked"][..],
        &["admin", "user-orders", "3", "--period", "decade"][..],
    ] {
        cargo_bin_cmd!("shopfront")
            .env("HOME", home.path())
            .args(args)
            .assert()
            .failure();
    }
}
