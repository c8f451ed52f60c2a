//! # Session Module
//!
//! The per-user order state machine. Every method is a pure transition: it
//! checks the current step, mutates the session, and reports a refusal as a
//! [`FlowError`] without touching any external service. The shop performs
//! the messaging and ledger side effects around these calls.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::cart::{Cart, CartItem};
use crate::catalog::{Catalog, Price, Product};
use crate::cooldown::CooldownTracker;
use crate::errors::FlowError;
use crate::zone;
use crate::UserId;

/// Tokens accepted in place of a phone number, compared case-insensitively
pub const SKIP_TOKENS: [&str; 3] = ["passer", "skip", "non"];

/// Final outcome of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected,
    AutoRejected,
}

/// Administrator verdict on a pending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Approve,
    Reject,
}

/// Snapshot of an order handed to the administrators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOrder {
    pub user: UserId,
    pub cart: Cart,
    pub address: String,
    pub phone: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl PendingOrder {
    pub fn total(&self) -> Price {
        self.cart.total()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Browsing,
    AwaitingPriceChoice { product: String },
    CartOpen,
    AwaitingCooldownCheck,
    AwaitingAddress,
    AwaitingPhone,
    AwaitingAdminDecision(PendingOrder),
    Terminal(Outcome),
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Browsing => "Browsing",
            Step::AwaitingPriceChoice { .. } => "AwaitingPriceChoice",
            Step::CartOpen => "CartOpen",
            Step::AwaitingCooldownCheck => "AwaitingCooldownCheck",
            Step::AwaitingAddress => "AwaitingAddress",
            Step::AwaitingPhone => "AwaitingPhone",
            Step::AwaitingAdminDecision(_) => "AwaitingAdminDecision",
            Step::Terminal(_) => "Terminal",
        }
    }
}

/// Result of evaluating a completed checkout against the zone rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Forward to the administrators, then call [`Session::await_decision`]
    Forward(PendingOrder),
    /// The session is already terminal
    AutoRejected(PendingOrder),
}

#[derive(Debug, Clone)]
pub struct Session {
    user: UserId,
    catalog: Arc<Catalog>,
    cart: Cart,
    step: Step,
    address: Option<String>,
    phone: Option<String>,
    started_at: DateTime<Utc>,
    checkout_stamp: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user: UserId, catalog: Arc<Catalog>, now: DateTime<Utc>) -> Self {
        Self {
            user,
            catalog,
            cart: Cart::new(),
            step: Step::Browsing,
            address: None,
            phone: None,
            started_at: now,
            checkout_stamp: None,
        }
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When this session's checkout passed the cooldown guard
    pub fn checkout_stamp(&self) -> Option<DateTime<Utc>> {
        self.checkout_stamp
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.step, Step::AwaitingAdminDecision(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.step, Step::Terminal(_))
    }

    pub fn pending_order(&self) -> Option<&PendingOrder> {
        match &self.step {
            Step::AwaitingAdminDecision(order) => Some(order),
            _ => None,
        }
    }

    /// Browsing, CartOpen or AwaitingPriceChoice: pick a product to price
    pub fn select_product(&mut self, name: &str) -> Result<&Product, FlowError> {
        match self.step {
            Step::Browsing | Step::CartOpen | Step::AwaitingPriceChoice { .. } => {}
            ref other => return Err(FlowError::OutOfStep(other.name())),
        }
        let product = self
            .catalog
            .get(name)
            .ok_or_else(|| FlowError::UnknownProduct(name.to_string()))?;
        self.step = Step::AwaitingPriceChoice {
            product: product.name.clone(),
        };
        Ok(product)
    }

    pub fn select_price(&mut self, product: &str, price: Price) -> Result<&CartItem, FlowError> {
        match &self.step {
            Step::AwaitingPriceChoice { product: awaited } if awaited == product => {}
            Step::AwaitingPriceChoice { .. } => {
                return Err(FlowError::UnknownProduct(product.to_string()))
            }
            other => return Err(FlowError::OutOfStep(other.name())),
        }
        let offered = self
            .catalog
            .get(product)
            .ok_or_else(|| FlowError::UnknownProduct(product.to_string()))?;
        if !offered.offers(price) {
            return Err(FlowError::UnknownPrice {
                product: product.to_string(),
                price: price.0,
            });
        }

        self.cart.add(CartItem {
            product: offered.name.clone(),
            price,
        });
        self.step = Step::CartOpen;
        Ok(&self.cart.items()[self.cart.items().len() - 1])
    }

    /// Empty the cart; the session stays open for more items
    pub fn clear_cart(&mut self) -> Result<(), FlowError> {
        match self.step {
            Step::Browsing | Step::CartOpen | Step::AwaitingPriceChoice { .. } => {
                self.cart.clear();
                self.step = Step::CartOpen;
                Ok(())
            }
            ref other => Err(Self::refusal_for(other)),
        }
    }

    /// Run the cooldown and empty-cart guards and move on to address entry.
    ///
    /// The cooldown stamp is recorded only when both guards pass.
    pub fn checkout(
        &mut self,
        cooldown: &CooldownTracker,
        now: DateTime<Utc>,
    ) -> Result<(), FlowError> {
        let resume = match self.step {
            Step::Browsing => Step::Browsing,
            Step::CartOpen | Step::AwaitingPriceChoice { .. } => Step::CartOpen,
            ref other => return Err(Self::refusal_for(other)),
        };

        if let Some(remaining) = cooldown.remaining(self.user, now) {
            return Err(FlowError::CooldownActive { remaining });
        }

        self.step = Step::AwaitingCooldownCheck;
        if self.cart.is_empty() {
            self.step = resume;
            return Err(FlowError::EmptyCart);
        }

        cooldown.record(self.user, now);
        self.checkout_stamp = Some(now);
        self.address = None;
        self.phone = None;
        self.step = Step::AwaitingAddress;
        Ok(())
    }

    pub fn submit_address(&mut self, text: &str) -> Result<(), FlowError> {
        if self.step != Step::AwaitingAddress {
            return Err(FlowError::OutOfStep(self.step.name()));
        }
        let address = text.trim();
        if address.is_empty() {
            return Err(FlowError::EmptyAddress);
        }
        self.address = Some(address.to_string());
        self.step = Step::AwaitingPhone;
        Ok(())
    }

    /// Record the phone (`None` when skipped) and apply the zone rule
    pub fn submit_phone(&mut self, phone: Option<&str>, now: DateTime<Utc>) -> Result<Verdict, FlowError> {
        if self.step != Step::AwaitingPhone {
            return Err(FlowError::OutOfStep(self.step.name()));
        }
        let address = self
            .address
            .clone()
            .ok_or(FlowError::OutOfStep(Step::AwaitingAddress.name()))?;

        self.phone = phone
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let order = PendingOrder {
            user: self.user,
            cart: self.cart.clone(),
            address,
            phone: self.phone.clone(),
            submitted_at: now,
        };

        if zone::accept(order.total(), &order.address) {
            Ok(Verdict::Forward(order))
        } else {
            self.step = Step::Terminal(Outcome::AutoRejected);
            Ok(Verdict::AutoRejected(order))
        }
    }

    /// Enter the pending state once the order reached the administrators
    pub fn await_decision(&mut self, order: PendingOrder) -> Result<(), FlowError> {
        if self.step != Step::AwaitingPhone {
            return Err(Self::refusal_for(&self.step));
        }
        self.step = Step::AwaitingAdminDecision(order);
        Ok(())
    }

    /// Back to the open cart when no administrator could be reached
    pub fn reopen_cart(&mut self) {
        self.address = None;
        self.phone = None;
        self.checkout_stamp = None;
        self.step = Step::CartOpen;
    }

    pub fn resolve(&mut self, decision: Decision) -> Result<PendingOrder, FlowError> {
        let Step::AwaitingAdminDecision(order) = &self.step else {
            return Err(FlowError::OutOfStep(self.step.name()));
        };
        let order = order.clone();
        self.step = Step::Terminal(match decision {
            Decision::Approve => Outcome::Accepted,
            Decision::Reject => Outcome::Rejected,
        });
        Ok(order)
    }

    /// Drop the cart and collected details and go back to browsing
    pub fn cancel(&mut self) -> Result<(), FlowError> {
        if self.is_pending() || self.is_terminal() {
            return Err(Self::refusal_for(&self.step));
        }
        self.cart.clear();
        self.address = None;
        self.phone = None;
        self.step = Step::Browsing;
        Ok(())
    }

    fn refusal_for(step: &Step) -> FlowError {
        match step {
            Step::AwaitingAdminDecision(_) => FlowError::AlreadyPending,
            other => FlowError::OutOfStep(other.name()),
        }
    }
}

/// Whether `text` asks to skip the phone step
pub fn is_skip_token(text: &str) -> bool {
    let text = text.trim();
    SKIP_TOKENS.iter().any(|token| token.eq_ignore_ascii_case(text))
}
