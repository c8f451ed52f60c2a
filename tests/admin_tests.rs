mod common;

use common::{Harness, SentKind, ADMIN_A, ADMIN_B, CUSTOMER};
use orderbot::callback::Callback;
use orderbot::catalog::{CatalogStore, Price};
use orderbot::localization::{t, t_args};
use orderbot::shop::{AdminCommand, InboundEvent};
use tempfile::TempDir;

fn admin(command: AdminCommand) -> InboundEvent {
    InboundEvent::Admin(command)
}

fn remove(name: &str) -> InboundEvent {
    InboundEvent::Admin(AdminCommand::ConfirmRemoval(name.to_string()))
}

fn text(value: &str) -> InboundEvent {
    InboundEvent::TextInput(value.to_string())
}

#[tokio::test]
async fn test_add_product_dialogue() {
    let h = Harness::new();

    h.send(ADMIN_A, admin(AdminCommand::AddProduct)).await;
    assert_eq!(h.gateway.texts_to(ADMIN_A).last().unwrap(), &t("admin-ask-product-name"));

    h.send(ADMIN_A, text("Gourmand")).await;
    let prompt = t_args("admin-ask-prices", &[("product", "Gourmand")]);
    assert_eq!(h.gateway.texts_to(ADMIN_A).last().unwrap(), &prompt);

    h.send(ADMIN_A, text("pas de prix")).await;
    assert_eq!(h.gateway.texts_to(ADMIN_A).last().unwrap(), &t("admin-prices-invalid"));

    h.send(ADMIN_A, text("40€, 80€")).await;
    let saved = t_args("admin-product-saved", &[("product", "Gourmand")]);
    assert_eq!(h.gateway.texts_to(ADMIN_A).last().unwrap(), &saved);

    let products = h.shop.catalog().list_products().await;
    assert_eq!(products.len(), 3);
    assert_eq!(products[2].name, "Gourmand");
    assert_eq!(products[2].prices, vec![Price(40), Price(80)]);
}

#[tokio::test]
async fn test_add_product_duplicate_name() {
    let h = Harness::new();

    h.send(ADMIN_A, admin(AdminCommand::AddProduct)).await;
    h.send(ADMIN_A, text("Premium")).await;
    h.send(ADMIN_A, text("10€")).await;

    let duplicate = t_args("admin-product-duplicate", &[("product", "Premium")]);
    assert_eq!(h.gateway.texts_to(ADMIN_A).last().unwrap(), &duplicate);
    assert_eq!(h.shop.catalog().list_products().await.len(), 2);

    // The dialogue is over; further text goes to the customer flow
    h.send(ADMIN_A, text("Encore")).await;
    assert_eq!(h.gateway.texts_to(ADMIN_A).last().unwrap(), &t("start-first"));
}

#[tokio::test]
async fn test_cancel_aborts_add_product() {
    let h = Harness::new();

    h.send(ADMIN_A, admin(AdminCommand::AddProduct)).await;
    h.send(ADMIN_A, text("Gourmand")).await;
    h.send(ADMIN_A, InboundEvent::Cancel).await;

    assert_eq!(h.gateway.texts_to(ADMIN_A).last().unwrap(), &t("admin-add-cancelled"));
    assert_eq!(h.shop.catalog().list_products().await.len(), 2);
}

#[tokio::test]
async fn test_edit_product() {
    let h = Harness::new();

    h.send(ADMIN_A, admin(AdminCommand::EditProduct(1))).await;
    let prompt = t_args("admin-ask-new-name", &[("product", "Premium")]);
    assert_eq!(h.gateway.texts_to(ADMIN_A).last().unwrap(), &prompt);

    h.send(ADMIN_A, text("Premium+")).await;
    h.send(ADMIN_A, text("60 120")).await;

    let products = h.shop.catalog().list_products().await;
    assert_eq!(products.len(), 2);
    assert_eq!(products[1].name, "Premium+");
    assert_eq!(products[1].prices, vec![Price(60), Price(120)]);
}

#[tokio::test]
async fn test_edit_unknown_product() {
    let h = Harness::new();
    h.send(ADMIN_A, admin(AdminCommand::EditProduct(9))).await;
    assert_eq!(h.gateway.texts_to(ADMIN_A).last().unwrap(), &t("admin-product-not-found"));
}

#[tokio::test]
async fn test_list_and_remove_products() {
    let h = Harness::new();

    h.send(ADMIN_B, admin(AdminCommand::ListProducts)).await;
    let listing = t_args(
        "admin-catalog-listing",
        &[("products", "1. Classique : 30€, 50€, 70€\n2. Premium : 50€, 100€")],
    );
    assert_eq!(h.gateway.texts_to(ADMIN_B).last().unwrap(), &listing);

    h.send(ADMIN_B, admin(AdminCommand::RemoveProduct)).await;
    let sent = h.gateway.last_to(ADMIN_B).unwrap();
    let SentKind::Options(buttons) = sent.kind else {
        panic!("removal prompt should carry buttons");
    };
    assert_eq!(buttons[0].callback, Callback::RemoveProduct("Classique".to_string()));
    assert_eq!(buttons[1].callback, Callback::RemoveProduct("Premium".to_string()));

    h.send(ADMIN_B, remove("Classique")).await;
    let removed = t_args("admin-product-removed", &[("product", "Classique")]);
    assert_eq!(h.gateway.texts_to(ADMIN_B).last().unwrap(), &removed);

    // Pressing the same button again finds nothing to remove
    h.send(ADMIN_B, remove("Classique")).await;
    assert_eq!(h.gateway.texts_to(ADMIN_B).last().unwrap(), &t("admin-product-not-found"));

    let products = h.shop.catalog().list_products().await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Premium");
}

#[tokio::test]
async fn test_stale_removal_buttons_target_their_own_product() {
    let h = Harness::new();
    h.shop.catalog().add_product("Gourmand", vec![Price(40)]).await.unwrap();

    h.send(ADMIN_A, admin(AdminCommand::RemoveProduct)).await;
    h.send(ADMIN_B, admin(AdminCommand::RemoveProduct)).await;
    let SentKind::Options(buttons) = h.gateway.last_to(ADMIN_B).unwrap().kind else {
        panic!("removal prompt should carry buttons");
    };

    h.send(ADMIN_A, remove("Classique")).await;

    // Admin B presses "Premium" from the prompt shown before the removal
    let premium = buttons
        .iter()
        .find(|button| button.label.contains("Premium"))
        .unwrap();
    let Callback::RemoveProduct(name) = premium.callback.clone() else {
        panic!("removal button should carry a product name");
    };
    h.send(ADMIN_B, remove(&name)).await;

    let names: Vec<String> = h
        .shop
        .catalog()
        .list_products()
        .await
        .into_iter()
        .map(|product| product.name)
        .collect();
    assert_eq!(names, vec!["Gourmand".to_string()]);
}

#[tokio::test]
async fn test_edit_dialogue_survives_concurrent_removal() {
    let h = Harness::new();

    h.send(ADMIN_A, admin(AdminCommand::EditProduct(1))).await;
    h.send(ADMIN_A, text("Premium+")).await;

    // Admin B removes the first product while A is still typing prices
    h.send(ADMIN_B, remove("Classique")).await;
    h.send(ADMIN_A, text("60 120")).await;

    let products = h.shop.catalog().list_products().await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Premium+");
    assert_eq!(products[0].prices, vec![Price(60), Price(120)]);
}

#[tokio::test]
async fn test_edit_of_removed_product_reports_not_found() {
    let h = Harness::new();

    h.send(ADMIN_A, admin(AdminCommand::EditProduct(0))).await;
    h.send(ADMIN_A, text("Classique+")).await;
    h.send(ADMIN_B, remove("Classique")).await;
    h.send(ADMIN_A, text("35")).await;

    assert_eq!(h.gateway.texts_to(ADMIN_A).last().unwrap(), &t("admin-product-not-found"));
    let names: Vec<String> = h
        .shop
        .catalog()
        .list_products()
        .await
        .into_iter()
        .map(|product| product.name)
        .collect();
    assert_eq!(names, vec!["Premium".to_string()]);
}

#[tokio::test]
async fn test_overlong_product_name_is_refused() {
    let h = Harness::new();
    let long = "Bouquet de fleurs séchées édition spéciale été, grand format";

    h.send(ADMIN_A, admin(AdminCommand::AddProduct)).await;
    h.send(ADMIN_A, text(long)).await;
    assert_eq!(h.gateway.texts_to(ADMIN_A).last().unwrap(), &t("admin-name-too-long"));

    // The name fits on its own but not next to a ten-digit price
    let name = "Bouquet de fleurs séchées édition spéciale d'été";
    h.send(ADMIN_A, text(name)).await;
    h.send(ADMIN_A, text("4000000000")).await;
    assert_eq!(h.gateway.texts_to(ADMIN_A).last().unwrap(), &t("admin-name-too-long"));
    assert_eq!(h.shop.catalog().list_products().await.len(), 2);

    // Customers still get a working menu
    h.send(CUSTOMER, InboundEvent::Start).await;
    let SentKind::Options(buttons) = h.gateway.last_to(CUSTOMER).unwrap().kind else {
        panic!("menu should carry product buttons");
    };
    assert!(buttons.iter().all(|button| button.callback.fits()));
}

#[tokio::test]
async fn test_open_session_keeps_its_catalog_snapshot() {
    let h = Harness::new();
    h.send(CUSTOMER, InboundEvent::Start).await;

    h.send(ADMIN_A, remove("Premium")).await;

    h.add_item(CUSTOMER, "Premium", 100).await;
    let session = h.shop.sessions().lock(CUSTOMER).await.unwrap();
    assert_eq!(session.cart().total(), Price(100));
}

#[tokio::test]
async fn test_non_admin_commands_are_refused() {
    let h = Harness::new();

    h.send(CUSTOMER, admin(AdminCommand::AddProduct)).await;
    h.send(CUSTOMER, remove("Classique")).await;
    h.send(CUSTOMER, admin(AdminCommand::ToggleMaintenance)).await;

    assert_eq!(h.gateway.texts_to(CUSTOMER), vec![t("unauthorized"); 3]);
    assert_eq!(h.shop.catalog().list_products().await.len(), 2);
    assert!(!h.shop.in_maintenance());
}

#[tokio::test]
async fn test_maintenance_blocks_new_sessions() {
    let h = Harness::new();

    h.send(ADMIN_A, admin(AdminCommand::ToggleMaintenance)).await;
    assert!(h.shop.in_maintenance());
    assert_eq!(h.gateway.texts_to(ADMIN_A).last().unwrap(), &t("maintenance-on"));

    h.send(CUSTOMER, InboundEvent::Start).await;
    assert_eq!(h.gateway.texts_to(CUSTOMER), vec![t("maintenance-active")]);
    assert!(!h.shop.sessions().contains(CUSTOMER));

    h.send(ADMIN_A, admin(AdminCommand::ToggleMaintenance)).await;
    assert!(!h.shop.in_maintenance());
    assert_eq!(h.gateway.texts_to(ADMIN_A).last().unwrap(), &t("maintenance-off"));

    h.send(CUSTOMER, InboundEvent::Start).await;
    assert!(h.shop.sessions().contains(CUSTOMER));
}

#[tokio::test]
async fn test_catalog_changes_are_persisted() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("products.json");

    let store = CatalogStore::open(&path).await?;
    assert_eq!(store.list_products().await.len(), 2);
    assert!(!path.exists());

    store.add_product("Gourmand", vec![Price(40)]).await?;
    store.remove_product("Classique").await?;
    assert!(path.exists());

    let reopened = CatalogStore::open(&path).await?;
    let names: Vec<String> = reopened
        .list_products()
        .await
        .into_iter()
        .map(|product| product.name)
        .collect();
    assert_eq!(names, vec!["Premium".to_string(), "Gourmand".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_catalog_file_with_duplicates_is_an_error() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("products.json");
    let content = r#"[{"name":"Classique","prices":[30]},{"name":"Classique","prices":[50]}]"#;
    tokio::fs::write(&path, content).await?;

    assert!(CatalogStore::open(&path).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_corrupt_catalog_file_is_an_error() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("products.json");
    tokio::fs::write(&path, "{ pas du json").await?;

    assert!(CatalogStore::open(&path).await.is_err());
    Ok(())
}
