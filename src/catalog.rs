//! # Catalog Module
//!
//! Products and their price options, plus the file-backed store the admin
//! commands mutate. Customer sessions only ever see an immutable snapshot.

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::callback::Callback;
use crate::errors::CatalogError;

lazy_static! {
    static ref AMOUNT_PATTERN: Regex = Regex::new(r"\d+").expect("valid amount regex");
}

/// A monetary amount in whole euros
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub u32);

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}€", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub prices: Vec<Price>,
}

impl Product {
    pub fn offers(&self, price: Price) -> bool {
        self.prices.contains(&price)
    }
}

/// Ordered list of products, unique by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Catalog used when no products file exists yet
    pub fn default_products() -> Self {
        Self::new(vec![
            Product {
                name: "Classique".to_string(),
                prices: vec![Price(30), Price(50), Price(70)],
            },
            Product {
                name: "Premium".to_string(),
                prices: vec![Price(50), Price(100)],
            },
        ])
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.products.iter().position(|p| p.name == name)
    }

    /// Check a loaded catalog against the rules `add` enforces
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (i, product) in self.products.iter().enumerate() {
            let name = validate_product(&product.name, &product.prices)?;
            if name != product.name || self.position(&name) != Some(i) {
                return Err(CatalogError::DuplicateName(name));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn add(&mut self, name: &str, prices: Vec<Price>) -> Result<(), CatalogError> {
        let name = validate_product(name, &prices)?;
        if self.get(&name).is_some() {
            return Err(CatalogError::DuplicateName(name));
        }
        self.products.push(Product { name, prices });
        Ok(())
    }

    pub fn edit(
        &mut self,
        index: usize,
        new_name: &str,
        new_prices: Vec<Price>,
    ) -> Result<(), CatalogError> {
        let name = validate_product(new_name, &new_prices)?;
        if index >= self.products.len() {
            return Err(CatalogError::BadIndex(index));
        }
        let clash = self
            .products
            .iter()
            .enumerate()
            .any(|(i, p)| i != index && p.name == name);
        if clash {
            return Err(CatalogError::DuplicateName(name));
        }
        self.products[index] = Product {
            name,
            prices: new_prices,
        };
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Product, CatalogError> {
        if index >= self.products.len() {
            return Err(CatalogError::BadIndex(index));
        }
        Ok(self.products.remove(index))
    }
}

fn validate_product(name: &str, prices: &[Price]) -> Result<String, CatalogError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CatalogError::EmptyName);
    }
    if prices.is_empty() || prices.iter().any(|p| p.0 == 0) {
        return Err(CatalogError::NoPrices);
    }

    // Every button naming the product must stay within Telegram's payload limit
    let fits = [
        Callback::Product(name.to_string()),
        Callback::RemoveProduct(name.to_string()),
    ]
    .into_iter()
    .chain(prices.iter().map(|price| Callback::Price {
        product: name.to_string(),
        price: *price,
    }))
    .all(|callback| callback.fits());
    if !fits {
        return Err(CatalogError::NameTooLong(name.to_string()));
    }
    Ok(name.to_string())
}

/// Extract every positive whole amount from free text such as `"30€, 50€"`
pub fn parse_prices(text: &str) -> Vec<Price> {
    let mut prices: Vec<Price> = AMOUNT_PATTERN
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .filter(|amount| *amount > 0)
        .map(Price)
        .collect();
    prices.dedup();
    prices
}

/// Shared catalog, optionally persisted as JSON after every mutation
pub struct CatalogStore {
    path: Option<PathBuf>,
    catalog: RwLock<Arc<Catalog>>,
}

impl CatalogStore {
    pub fn in_memory(catalog: Catalog) -> Self {
        Self {
            path: None,
            catalog: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Load the catalog from `path`, falling back to the default products
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let catalog = match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let catalog: Catalog = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse catalog file {}", path.display()))?;
                catalog
                    .validate()
                    .with_context(|| format!("Invalid catalog file {}", path.display()))?;
                catalog
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Catalog file not found, using default products");
                Catalog::default_products()
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read catalog file {}", path.display()))
            }
        };
        info!(path = %path.display(), products = catalog.len(), "Catalog loaded");

        Ok(Self {
            path: Some(path),
            catalog: RwLock::new(Arc::new(catalog)),
        })
    }

    /// Read-before-use snapshot handed to new sessions
    pub async fn snapshot(&self) -> Arc<Catalog> {
        Arc::clone(&*self.catalog.read().await)
    }

    pub async fn list_products(&self) -> Vec<Product> {
        self.snapshot().await.products().to_vec()
    }

    pub async fn add_product(&self, name: &str, prices: Vec<Price>) -> Result<()> {
        self.mutate(|catalog| catalog.add(name, prices)).await
    }

    /// Replace the product currently named `current`
    pub async fn edit_product(&self, current: &str, new_name: &str, new_prices: Vec<Price>) -> Result<()> {
        self.mutate(|catalog| {
            let index = catalog
                .position(current)
                .ok_or_else(|| CatalogError::UnknownProduct(current.to_string()))?;
            catalog.edit(index, new_name, new_prices)
        })
        .await
    }

    pub async fn remove_product(&self, name: &str) -> Result<Product> {
        let mut removed = None;
        self.mutate(|catalog| {
            let index = catalog
                .position(name)
                .ok_or_else(|| CatalogError::UnknownProduct(name.to_string()))?;
            removed = Some(catalog.remove(index)?);
            Ok(())
        })
        .await?;
        removed.ok_or_else(|| CatalogError::UnknownProduct(name.to_string()).into())
    }

    async fn mutate<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Catalog) -> Result<(), CatalogError>,
    {
        let mut guard = self.catalog.write().await;
        let mut next = Catalog::clone(&guard);
        change(&mut next)?;

        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(&next).context("Failed to serialize catalog")?;
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write catalog file {}", path.display()))?;
        }

        *guard = Arc::new(next);
        Ok(())
    }
}
