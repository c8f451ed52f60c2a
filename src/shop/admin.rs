//! Administrator side of the shop: order decisions, catalog administration
//! and maintenance mode

use anyhow::Result;
use std::sync::atomic::Ordering;
use tracing::{error, info, warn};

use super::render::{catalog_listing, removal_buttons};
use super::{AdminCommand, Shop};
use crate::callback::{AdminAction, Callback};
use crate::catalog::parse_prices;
use crate::errors::CatalogError;
use crate::ledger::{LedgerRecord, OrderStatus};
use crate::localization::{t, t_args};
use crate::session::Decision;
use crate::UserId;

/// Progress of a two-step catalog edit; `editing` names the product being replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminDialogue {
    AwaitingName { editing: Option<String> },
    AwaitingPrices { name: String, editing: Option<String> },
}

impl Shop {
    /// Apply an approve/reject press to the target's pending order
    pub(super) async fn route_decision(&self, actor: UserId, action: AdminAction) -> Result<()> {
        let AdminAction { decision, target } = action;

        if !self.is_admin(actor) {
            warn!(user_id = %actor, target_id = %target, "Unauthorized order decision attempt");
            self.gateway.send_text(actor, &t("unauthorized")).await?;
            return Ok(());
        }

        let Some(mut session) = self.sessions.lock(target).await else {
            info!(admin_id = %actor, target_id = %target, "Decision on unknown or resolved order");
            self.gateway.send_text(actor, &t("admin-order-not-found")).await?;
            return Ok(());
        };

        let order = match session.resolve(decision) {
            Ok(order) => order,
            Err(e) => {
                info!(admin_id = %actor, target_id = %target, reason = %e, "No pending order for decision");
                self.gateway.send_text(actor, &t("admin-order-not-found")).await?;
                return Ok(());
            }
        };

        let (status, user_text, admin_text) = match decision {
            Decision::Approve => (
                OrderStatus::Validated,
                t("order-approved-user"),
                t("admin-order-approved"),
            ),
            Decision::Reject => (
                OrderStatus::Refused,
                t("order-rejected-user"),
                t("admin-order-rejected"),
            ),
        };
        info!(admin_id = %actor, user_id = %target, status = %status, "Order decided");

        // Delivery and ledger are independent; neither failure blocks the other
        let user_reached = self.notify(target, &user_text).await;

        let record = LedgerRecord::from_order(&order, self.clock.now(), status);
        let recorded = match self.ledger.append(&record).await {
            Ok(()) => true,
            Err(e) => {
                error!(user_id = %target, error = %e, "Failed to record decided order");
                false
            }
        };

        self.sessions.remove(target);
        drop(session);

        self.notify(actor, &admin_text).await;
        if !user_reached {
            self.notify(actor, &t("admin-user-unreachable")).await;
        }
        if !recorded {
            self.notify(actor, &t("admin-ledger-failed")).await;
        }
        Ok(())
    }

    pub(super) async fn admin_command(&self, actor: UserId, command: AdminCommand) -> Result<()> {
        if !self.is_admin(actor) {
            warn!(user_id = %actor, command = ?command, "Unauthorized admin command");
            self.gateway.send_text(actor, &t("unauthorized")).await?;
            return Ok(());
        }

        match command {
            AdminCommand::AddProduct => {
                self.admin_dialogues
                    .insert(actor, AdminDialogue::AwaitingName { editing: None });
                self.gateway.send_text(actor, &t("admin-ask-product-name")).await?;
            }
            AdminCommand::EditProduct(index) => {
                let snapshot = self.catalog.snapshot().await;
                match snapshot.products().get(index) {
                    Some(product) => {
                        self.admin_dialogues.insert(
                            actor,
                            AdminDialogue::AwaitingName {
                                editing: Some(product.name.clone()),
                            },
                        );
                        let text = t_args("admin-ask-new-name", &[("product", product.name.as_str())]);
                        self.gateway.send_text(actor, &text).await?;
                    }
                    None => {
                        self.gateway.send_text(actor, &t("admin-product-not-found")).await?;
                    }
                }
            }
            AdminCommand::ListProducts => {
                let snapshot = self.catalog.snapshot().await;
                if snapshot.is_empty() {
                    self.gateway.send_text(actor, &t("catalog-empty")).await?;
                } else {
                    let listing = catalog_listing(&snapshot);
                    let text = t_args("admin-catalog-listing", &[("products", listing.as_str())]);
                    self.gateway.send_text(actor, &text).await?;
                }
            }
            AdminCommand::RemoveProduct => {
                let snapshot = self.catalog.snapshot().await;
                if snapshot.is_empty() {
                    self.gateway.send_text(actor, &t("catalog-empty")).await?;
                } else {
                    let buttons = removal_buttons(&snapshot);
                    self.gateway
                        .send_options(actor, &t("admin-choose-removal"), &buttons)
                        .await?;
                }
            }
            AdminCommand::ConfirmRemoval(name) => match self.catalog.remove_product(&name).await {
                Ok(product) => {
                    info!(admin_id = %actor, product = %product.name, "Product removed");
                    let text = t_args("admin-product-removed", &[("product", product.name.as_str())]);
                    self.gateway.send_text(actor, &text).await?;
                }
                Err(e) => self.report_catalog_failure(actor, &e).await?,
            },
            AdminCommand::ToggleMaintenance => {
                let active = !self.maintenance.fetch_xor(true, Ordering::SeqCst);
                info!(admin_id = %actor, active, "Maintenance mode toggled");
                let key = if active { "maintenance-on" } else { "maintenance-off" };
                self.gateway.send_text(actor, &t(key)).await?;
            }
        }
        Ok(())
    }

    /// Next step of an `/addproduct` or `/editproduct` dialogue
    pub(super) async fn continue_admin_dialogue(&self, actor: UserId, text: &str) -> Result<()> {
        let Some((_, dialogue)) = self.admin_dialogues.remove(&actor) else {
            return Ok(());
        };

        match dialogue {
            AdminDialogue::AwaitingName { editing } => {
                let name = text.trim();
                if name.is_empty() {
                    self.admin_dialogues
                        .insert(actor, AdminDialogue::AwaitingName { editing });
                    self.gateway.send_text(actor, &t("admin-name-invalid")).await?;
                    return Ok(());
                }
                if !Callback::RemoveProduct(name.to_string()).fits() {
                    self.admin_dialogues
                        .insert(actor, AdminDialogue::AwaitingName { editing });
                    self.gateway.send_text(actor, &t("admin-name-too-long")).await?;
                    return Ok(());
                }
                self.admin_dialogues.insert(
                    actor,
                    AdminDialogue::AwaitingPrices {
                        name: name.to_string(),
                        editing,
                    },
                );
                let prompt = t_args("admin-ask-prices", &[("product", name)]);
                self.gateway.send_text(actor, &prompt).await?;
            }
            AdminDialogue::AwaitingPrices { name, editing } => {
                let prices = parse_prices(text);
                if prices.is_empty() {
                    self.admin_dialogues
                        .insert(actor, AdminDialogue::AwaitingPrices { name, editing });
                    self.gateway.send_text(actor, &t("admin-prices-invalid")).await?;
                    return Ok(());
                }

                let saved = match editing {
                    None => self.catalog.add_product(&name, prices).await,
                    Some(current) => self.catalog.edit_product(&current, &name, prices).await,
                };
                match saved {
                    Ok(()) => {
                        info!(admin_id = %actor, product = %name, "Catalog updated");
                        let text = t_args("admin-product-saved", &[("product", name.as_str())]);
                        self.gateway.send_text(actor, &text).await?;
                    }
                    Err(e) => self.report_catalog_failure(actor, &e).await?,
                }
            }
        }
        Ok(())
    }

    async fn report_catalog_failure(&self, actor: UserId, failure: &anyhow::Error) -> Result<()> {
        let text = match failure.downcast_ref::<CatalogError>() {
            Some(CatalogError::DuplicateName(name)) => {
                t_args("admin-product-duplicate", &[("product", name.as_str())])
            }
            Some(CatalogError::BadIndex(_) | CatalogError::UnknownProduct(_)) => {
                t("admin-product-not-found")
            }
            Some(CatalogError::NameTooLong(_)) => t("admin-name-too-long"),
            Some(CatalogError::EmptyName) => t("admin-name-invalid"),
            Some(CatalogError::NoPrices) => t("admin-prices-invalid"),
            None => {
                error!(admin_id = %actor, error = %failure, "Catalog update failed");
                t("admin-catalog-failed")
            }
        };
        self.gateway.send_text(actor, &text).await?;
        Ok(())
    }
}
