//! # Shop Module
//!
//! Applies inbound chat events to the per-user sessions and performs the
//! messaging and ledger side effects. The module is split into:
//! - `customer`: browsing, cart and checkout for customers
//! - `admin`: order decisions, catalog administration and maintenance mode
//! - `render`: message texts and button sets

mod admin;
mod customer;
pub mod render;

use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::callback::AdminAction;
use crate::catalog::{CatalogStore, Price};
use crate::cooldown::{Clock, CooldownTracker, SystemClock};
use crate::gateway::{ChoiceButton, Gateway};
use crate::ledger::OrderLedger;
use crate::store::SessionStore;
use crate::UserId;

pub use admin::AdminDialogue;

/// Everything a user or administrator can send to the shop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Start,
    ProductSelected(String),
    PriceSelected { product: String, price: Price },
    CheckoutRequested,
    CartCleared,
    ShowCart,
    Cancel,
    TextInput(String),
    ContactShared(String),
    AdminDecision(AdminAction),
    Admin(AdminCommand),
}

/// Administrator-only commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    AddProduct,
    ListProducts,
    RemoveProduct,
    /// Product name carried by the removal button
    ConfirmRemoval(String),
    /// Zero-based catalog position
    EditProduct(usize),
    ToggleMaintenance,
}

pub struct Shop {
    catalog: Arc<CatalogStore>,
    sessions: SessionStore,
    cooldown: CooldownTracker,
    admin_dialogues: DashMap<UserId, AdminDialogue>,
    admins: BTreeSet<UserId>,
    gateway: Arc<dyn Gateway>,
    ledger: Arc<dyn OrderLedger>,
    clock: Arc<dyn Clock>,
    maintenance: AtomicBool,
}

impl Shop {
    pub fn new(
        catalog: Arc<CatalogStore>,
        gateway: Arc<dyn Gateway>,
        ledger: Arc<dyn OrderLedger>,
        admins: impl IntoIterator<Item = UserId>,
    ) -> Self {
        Self {
            catalog,
            sessions: SessionStore::new(),
            cooldown: CooldownTracker::default(),
            admin_dialogues: DashMap::new(),
            admins: admins.into_iter().collect(),
            gateway,
            ledger,
            clock: Arc::new(SystemClock),
            maintenance: AtomicBool::new(false),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_cooldown(mut self, window: Duration) -> Self {
        self.cooldown = CooldownTracker::new(window);
        self
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        self.admins.contains(&user)
    }

    pub fn admins(&self) -> impl Iterator<Item = UserId> + '_ {
        self.admins.iter().copied()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn in_maintenance(&self) -> bool {
        self.maintenance.load(Ordering::SeqCst)
    }

    /// Apply one inbound event from `sender`
    pub async fn handle(&self, sender: UserId, event: InboundEvent) -> anyhow::Result<()> {
        debug!(user_id = %sender, event = ?event, "Handling inbound event");

        match event {
            InboundEvent::Start => self.start(sender).await,
            InboundEvent::ProductSelected(name) => self.select_product(sender, &name).await,
            InboundEvent::PriceSelected { product, price } => {
                self.select_price(sender, &product, price).await
            }
            InboundEvent::CheckoutRequested => self.checkout(sender).await,
            InboundEvent::CartCleared => self.clear_cart(sender).await,
            InboundEvent::ShowCart => self.show_cart(sender).await,
            InboundEvent::Cancel => self.cancel(sender).await,
            InboundEvent::TextInput(text) => {
                if self.is_admin(sender) && self.admin_dialogues.contains_key(&sender) {
                    self.continue_admin_dialogue(sender, &text).await
                } else {
                    self.text_input(sender, &text).await
                }
            }
            InboundEvent::ContactShared(phone) => self.contact_shared(sender, &phone).await,
            InboundEvent::AdminDecision(action) => self.route_decision(sender, action).await,
            InboundEvent::Admin(command) => self.admin_command(sender, command).await,
        }
    }

    /// Best-effort text delivery; failures are logged and reported as `false`
    async fn notify(&self, recipient: UserId, text: &str) -> bool {
        match self.gateway.send_text(recipient, text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(user_id = %recipient, error = %e, "Failed to deliver message");
                false
            }
        }
    }

    async fn notify_with_options(&self, recipient: UserId, text: &str, options: &[ChoiceButton]) -> bool {
        match self.gateway.send_options(recipient, text, options).await {
            Ok(()) => true,
            Err(e) => {
                warn!(user_id = %recipient, error = %e, "Failed to deliver message with options");
                false
            }
        }
    }
}
