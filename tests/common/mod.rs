//! Shared test doubles for the shop integration tests
#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use orderbot::catalog::{Catalog, CatalogStore, Price};
use orderbot::cooldown::Clock;
use orderbot::gateway::{ChoiceButton, Gateway};
use orderbot::ledger::{LedgerRecord, OrderLedger};
use orderbot::shop::{InboundEvent, Shop};
use orderbot::UserId;

pub const ADMIN_A: UserId = UserId(1001);
pub const ADMIN_B: UserId = UserId(1002);
pub const CUSTOMER: UserId = UserId(42);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentKind {
    Text,
    Options(Vec<ChoiceButton>),
    ContactRequest,
}

#[derive(Debug, Clone)]
pub struct Sent {
    pub recipient: UserId,
    pub text: String,
    pub kind: SentKind,
}

/// Records every outbound message; recipients in `unreachable` fail
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<Sent>>,
    unreachable: Mutex<HashSet<UserId>>,
}

impl RecordingGateway {
    pub fn make_unreachable(&self, user: UserId) {
        self.unreachable.lock().unwrap().insert(user);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, user: UserId) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|sent| sent.recipient == user)
            .collect()
    }

    pub fn texts_to(&self, user: UserId) -> Vec<String> {
        self.sent_to(user).into_iter().map(|sent| sent.text).collect()
    }

    pub fn last_to(&self, user: UserId) -> Option<Sent> {
        self.sent_to(user).pop()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    fn record(&self, recipient: UserId, text: &str, kind: SentKind) -> Result<()> {
        if self.unreachable.lock().unwrap().contains(&recipient) {
            bail!("recipient {recipient} unreachable");
        }
        self.sent.lock().unwrap().push(Sent {
            recipient,
            text: text.to_string(),
            kind,
        });
        Ok(())
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    async fn send_text(&self, recipient: UserId, text: &str) -> Result<()> {
        self.record(recipient, text, SentKind::Text)
    }

    async fn send_options(&self, recipient: UserId, text: &str, options: &[ChoiceButton]) -> Result<()> {
        self.record(recipient, text, SentKind::Options(options.to_vec()))
    }

    async fn request_contact(&self, recipient: UserId, text: &str) -> Result<()> {
        self.record(recipient, text, SentKind::ContactRequest)
    }
}

#[derive(Default)]
pub struct MemoryLedger {
    records: Mutex<Vec<LedgerRecord>>,
    failing: AtomicBool,
}

impl MemoryLedger {
    pub fn records(&self) -> Vec<LedgerRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderLedger for MemoryLedger {
    async fn append(&self, record: &LedgerRecord) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("ledger unavailable");
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        *self.now.lock().unwrap() += chrono::Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub struct Harness {
    pub shop: Shop,
    pub gateway: Arc<RecordingGateway>,
    pub ledger: Arc<MemoryLedger>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_catalog(Catalog::default_products())
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        let gateway = Arc::new(RecordingGateway::default());
        let ledger = Arc::new(MemoryLedger::default());
        let clock = Arc::new(ManualClock::new());
        let shop = Shop::new(
            Arc::new(CatalogStore::in_memory(catalog)),
            gateway.clone(),
            ledger.clone(),
            [ADMIN_A, ADMIN_B],
        )
        .with_clock(clock.clone());

        Self {
            shop,
            gateway,
            ledger,
            clock,
        }
    }

    pub async fn send(&self, user: UserId, event: InboundEvent) {
        self.shop.handle(user, event).await.unwrap();
    }

    pub async fn add_item(&self, user: UserId, product: &str, price: u32) {
        self.send(user, InboundEvent::ProductSelected(product.to_string()))
            .await;
        self.send(
            user,
            InboundEvent::PriceSelected {
                product: product.to_string(),
                price: Price(price),
            },
        )
        .await;
    }

    /// `/start`, one item, checkout, address and phone (`None` to skip)
    pub async fn place_order(&self, user: UserId, product: &str, price: u32, address: &str, phone: Option<&str>) {
        self.send(user, InboundEvent::Start).await;
        self.add_item(user, product, price).await;
        self.send(user, InboundEvent::CheckoutRequested).await;
        self.send(user, InboundEvent::TextInput(address.to_string()))
            .await;
        match phone {
            Some(phone) => {
                self.send(user, InboundEvent::ContactShared(phone.to_string()))
                    .await
            }
            None => {
                self.send(user, InboundEvent::TextInput("passer".to_string()))
                    .await
            }
        }
    }
}
