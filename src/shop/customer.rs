//! Customer side of the shop: browsing, cart and checkout

use anyhow::Result;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, error, info, warn};

use super::render::{
    admin_decision_buttons, admin_order_summary, cart_buttons, cart_summary, minimum_not_met,
    price_buttons, product_buttons,
};
use super::Shop;
use crate::catalog::Price;
use crate::errors::FlowError;
use crate::ledger::{LedgerRecord, OrderStatus};
use crate::localization::{t, t_args};
use crate::session::{is_skip_token, PendingOrder, Session, Step, Verdict};
use crate::UserId;

impl Shop {
    pub(super) async fn start(&self, user: UserId) -> Result<()> {
        if self.in_maintenance() {
            info!(user_id = %user, "Start refused, maintenance mode active");
            self.gateway.send_text(user, &t("maintenance-active")).await?;
            return Ok(());
        }

        let snapshot = self.catalog.snapshot().await;
        let now = self.clock.now();
        let mut session = self
            .sessions
            .lock_or_insert_with(user, || Session::new(user, snapshot.clone(), now))
            .await;

        if session.is_pending() {
            self.gateway.send_text(user, &t("order-already-pending")).await?;
            return Ok(());
        }
        *session = Session::new(user, snapshot, now);
        info!(user_id = %user, "Session started");

        self.gateway.send_text(user, &t("delivery-notice")).await?;
        if session.catalog().is_empty() {
            self.gateway.send_text(user, &t("catalog-empty")).await?;
        } else {
            let buttons = product_buttons(session.catalog());
            self.gateway.send_options(user, &t("welcome"), &buttons).await?;
        }
        Ok(())
    }

    /// Lock the live session of `user`, or point them to `/start`
    async fn live_session(&self, user: UserId) -> Result<Option<OwnedMutexGuard<Session>>> {
        match self.sessions.lock(user).await {
            Some(session) => Ok(Some(session)),
            None => {
                debug!(user_id = %user, "Event without a live session");
                self.gateway.send_text(user, &t("start-first")).await?;
                Ok(None)
            }
        }
    }

    pub(super) async fn select_product(&self, user: UserId, name: &str) -> Result<()> {
        let Some(mut session) = self.live_session(user).await? else {
            return Ok(());
        };

        let selected = session
            .select_product(name)
            .map(|product| (product.name.clone(), price_buttons(product)));
        match selected {
            Ok((product, buttons)) => {
                let text = t_args("choose-price", &[("product", product.as_str())]);
                self.gateway.send_options(user, &text, &buttons).await?;
            }
            Err(FlowError::UnknownProduct(name)) => {
                debug!(user_id = %user, product = %name, "Ignoring unknown product");
            }
            Err(e) => self.report_refusal(user, &e).await?,
        }
        Ok(())
    }

    pub(super) async fn select_price(&self, user: UserId, product: &str, price: Price) -> Result<()> {
        let Some(mut session) = self.live_session(user).await? else {
            return Ok(());
        };

        let added = session.select_price(product, price).map(ToString::to_string);
        match added {
            Ok(item) => {
                let total = session.cart().total().to_string();
                info!(user_id = %user, item = %item, total = %total, "Item added to cart");

                let text = t_args("item-added", &[("item", item.as_str()), ("total", total.as_str())]);
                let buttons = cart_buttons(session.catalog());
                self.gateway.send_options(user, &text, &buttons).await?;
            }
            Err(e) => self.report_refusal(user, &e).await?,
        }
        Ok(())
    }

    pub(super) async fn show_cart(&self, user: UserId) -> Result<()> {
        let Some(session) = self.live_session(user).await? else {
            return Ok(());
        };

        if session.cart().is_empty() {
            self.gateway.send_text(user, &t("cart-empty")).await?;
        } else {
            let buttons = cart_buttons(session.catalog());
            self.gateway
                .send_options(user, &cart_summary(session.cart()), &buttons)
                .await?;
        }
        Ok(())
    }

    pub(super) async fn clear_cart(&self, user: UserId) -> Result<()> {
        let Some(mut session) = self.live_session(user).await? else {
            return Ok(());
        };

        match session.clear_cart() {
            Ok(()) => {
                info!(user_id = %user, "Cart cleared");
                let buttons = product_buttons(session.catalog());
                self.gateway.send_options(user, &t("cart-cleared"), &buttons).await?;
            }
            Err(e) => self.report_refusal(user, &e).await?,
        }
        Ok(())
    }

    pub(super) async fn checkout(&self, user: UserId) -> Result<()> {
        let Some(mut session) = self.live_session(user).await? else {
            return Ok(());
        };

        match session.checkout(&self.cooldown, self.clock.now()) {
            Ok(()) => {
                info!(user_id = %user, total = %session.cart().total(), "Checkout started");
                self.gateway.send_text(user, &t("ask-address")).await?;
            }
            Err(e) => {
                info!(user_id = %user, reason = %e, "Checkout refused");
                self.report_refusal(user, &e).await?;
            }
        }
        Ok(())
    }

    pub(super) async fn cancel(&self, user: UserId) -> Result<()> {
        if self.admin_dialogues.remove(&user).is_some() {
            self.gateway.send_text(user, &t("admin-add-cancelled")).await?;
            return Ok(());
        }

        let Some(mut session) = self.sessions.lock(user).await else {
            self.gateway.send_text(user, &t("nothing-to-cancel")).await?;
            return Ok(());
        };

        match session.cancel() {
            Ok(()) => {
                info!(user_id = %user, "Order cancelled by user");
                let buttons = product_buttons(session.catalog());
                self.gateway.send_options(user, &t("order-cancelled"), &buttons).await?;
            }
            Err(e) => self.report_refusal(user, &e).await?,
        }
        Ok(())
    }

    pub(super) async fn text_input(&self, user: UserId, text: &str) -> Result<()> {
        let Some(mut session) = self.live_session(user).await? else {
            return Ok(());
        };

        let step = session.step().clone();
        match step {
            Step::AwaitingAddress => match session.submit_address(text) {
                Ok(()) => {
                    debug!(user_id = %user, "Address collected");
                    self.gateway.request_contact(user, &t("ask-phone")).await?;
                }
                Err(e) => self.report_refusal(user, &e).await?,
            },
            Step::AwaitingPhone => {
                let phone = if is_skip_token(text) { None } else { Some(text) };
                self.submit_order(&mut session, phone).await?;
            }
            Step::AwaitingAdminDecision(_) => {
                self.gateway.send_text(user, &t("order-already-pending")).await?;
            }
            _ => {
                self.gateway.send_text(user, &t("use-buttons")).await?;
            }
        }
        Ok(())
    }

    pub(super) async fn contact_shared(&self, user: UserId, phone: &str) -> Result<()> {
        let Some(mut session) = self.live_session(user).await? else {
            return Ok(());
        };

        if session.step() == &Step::AwaitingPhone {
            self.submit_order(&mut session, Some(phone)).await?;
        } else {
            debug!(user_id = %user, step = session.step().name(), "Contact outside phone step");
            self.gateway.send_text(user, &t("contact-not-expected")).await?;
        }
        Ok(())
    }

    /// Close the phone step and apply the zone rule
    async fn submit_order(&self, session: &mut Session, phone: Option<&str>) -> Result<()> {
        let user = session.user();
        let verdict = match session.submit_phone(phone, self.clock.now()) {
            Ok(verdict) => verdict,
            Err(e) => return self.report_refusal(user, &e).await,
        };

        match verdict {
            Verdict::AutoRejected(order) => self.auto_reject(order).await,
            Verdict::Forward(order) => {
                if self.broadcast_order(&order).await == 0 {
                    error!(user_id = %user, "No administrator reachable, order not submitted");
                    if let Some(stamp) = session.checkout_stamp() {
                        self.cooldown.withdraw(user, stamp);
                    }
                    session.reopen_cart();
                    self.gateway.send_text(user, &t("order-unavailable")).await?;
                    return Ok(());
                }

                let session_minutes = (order.submitted_at - session.started_at()).num_minutes();
                info!(
                    user_id = %user,
                    total = %order.total(),
                    session_minutes,
                    "Order awaiting administrator decision"
                );
                session.await_decision(order)?;
                self.gateway.send_text(user, &t("order-submitted")).await?;
                Ok(())
            }
        }
    }

    /// Out-of-zone order under the minimum: refused without bothering admins
    async fn auto_reject(&self, order: PendingOrder) -> Result<()> {
        let user = order.user;
        warn!(
            user_id = %user,
            total = %order.total(),
            address = %order.address,
            "Order below out-of-zone minimum, refused"
        );

        self.notify(user, &minimum_not_met()).await;

        let record = LedgerRecord::from_order(&order, self.clock.now(), OrderStatus::Refused);
        if let Err(e) = self.ledger.append(&record).await {
            error!(user_id = %user, error = %e, "Failed to record refused order");
        }

        self.sessions.remove(user);
        Ok(())
    }

    /// Send the order to every administrator; returns how many were reached
    async fn broadcast_order(&self, order: &PendingOrder) -> usize {
        let text = admin_order_summary(order);
        let buttons = admin_decision_buttons(order);

        let mut delivered = 0;
        for admin in self.admins() {
            if self.notify_with_options(admin, &text, &buttons).await {
                delivered += 1;
            } else {
                error!(admin_id = %admin, user_id = %order.user, "Failed to forward order to administrator");
            }
        }
        debug!(user_id = %order.user, delivered, "Order forwarded to administrators");
        delivered
    }

    async fn report_refusal(&self, user: UserId, refusal: &FlowError) -> Result<()> {
        let text = match refusal {
            FlowError::CooldownActive { remaining } => {
                let minutes = remaining.as_secs().div_ceil(60).max(1).to_string();
                t_args("cooldown-active", &[("minutes", minutes.as_str())])
            }
            FlowError::EmptyCart => t("cart-empty"),
            FlowError::AlreadyPending => t("order-already-pending"),
            FlowError::EmptyAddress => t("address-empty"),
            FlowError::UnknownProduct(_) | FlowError::UnknownPrice { .. } => t("selection-not-found"),
            FlowError::OutOfStep(step) => {
                debug!(user_id = %user, step, "Event out of step");
                t("use-buttons")
            }
        };
        self.gateway.send_text(user, &text).await?;
        Ok(())
    }
}
