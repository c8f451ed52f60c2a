//! Message texts and button sets sent by the shop

use crate::callback::{AdminAction, Callback};
use crate::cart::Cart;
use crate::catalog::{Catalog, Product};
use crate::gateway::ChoiceButton;
use crate::ledger::PHONE_NOT_PROVIDED;
use crate::localization::{t, t_args};
use crate::session::{Decision, PendingOrder};
use crate::zone::MIN_OUT_OF_ZONE_TOTAL;

pub fn product_buttons(catalog: &Catalog) -> Vec<ChoiceButton> {
    catalog
        .products()
        .iter()
        .map(|product| ChoiceButton::new(product.name.clone(), Callback::Product(product.name.clone())))
        .collect()
}

pub fn price_buttons(product: &Product) -> Vec<ChoiceButton> {
    product
        .prices
        .iter()
        .map(|price| {
            ChoiceButton::new(
                price.to_string(),
                Callback::Price {
                    product: product.name.clone(),
                    price: *price,
                },
            )
        })
        .collect()
}

/// Product menu followed by the checkout and clear-cart buttons
pub fn cart_buttons(catalog: &Catalog) -> Vec<ChoiceButton> {
    let mut buttons = product_buttons(catalog);
    buttons.push(ChoiceButton::new(t("button-checkout"), Callback::Checkout));
    buttons.push(ChoiceButton::new(t("button-clear-cart"), Callback::ClearCart));
    buttons
}

/// One bullet per line item
pub fn format_cart_items(cart: &Cart) -> String {
    cart.items()
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn cart_summary(cart: &Cart) -> String {
    let items = format_cart_items(cart);
    let total = cart.total().to_string();
    t_args("cart-summary", &[("items", items.as_str()), ("total", total.as_str())])
}

pub fn minimum_not_met() -> String {
    let minimum = MIN_OUT_OF_ZONE_TOTAL.to_string();
    t_args("minimum-not-met", &[("minimum", minimum.as_str())])
}

pub fn admin_order_summary(order: &PendingOrder) -> String {
    let items = format_cart_items(&order.cart);
    let total = order.total().to_string();
    let user = order.user.to_string();
    t_args(
        "admin-new-order",
        &[
            ("items", items.as_str()),
            ("total", total.as_str()),
            ("address", order.address.as_str()),
            ("phone", order.phone.as_deref().unwrap_or(PHONE_NOT_PROVIDED)),
            ("user", user.as_str()),
        ],
    )
}

pub fn admin_decision_buttons(order: &PendingOrder) -> Vec<ChoiceButton> {
    vec![
        ChoiceButton::new(
            t("button-approve"),
            Callback::Admin(AdminAction {
                decision: Decision::Approve,
                target: order.user,
            }),
        ),
        ChoiceButton::new(
            t("button-reject"),
            Callback::Admin(AdminAction {
                decision: Decision::Reject,
                target: order.user,
            }),
        ),
    ]
}

/// Numbered listing, one-based as shown to administrators
pub fn catalog_listing(catalog: &Catalog) -> String {
    catalog
        .products()
        .iter()
        .enumerate()
        .map(|(i, product)| {
            let prices = product
                .prices
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}. {} : {}", i + 1, product.name, prices)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn removal_buttons(catalog: &Catalog) -> Vec<ChoiceButton> {
    catalog
        .products()
        .iter()
        .map(|product| {
            ChoiceButton::new(
                format!("🗑️ {}", product.name),
                Callback::RemoveProduct(product.name.clone()),
            )
        })
        .collect()
}
