//! # Callback Payloads
//!
//! Typed contents of inline button payloads. Every button the bot renders is
//! built from a [`Callback`], and every press is parsed back into one before
//! it reaches the shop; anything that does not parse is dropped.

use std::str::FromStr;

use crate::catalog::Price;
use crate::errors::CallbackError;
use crate::session::Decision;
use crate::UserId;

/// Telegram rejects callback data longer than this many bytes
pub const MAX_CALLBACK_BYTES: usize = 64;

/// Approve/reject action carried on the administrator's order message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdminAction {
    pub decision: Decision,
    pub target: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Product(String),
    Price { product: String, price: Price },
    Checkout,
    ClearCart,
    Admin(AdminAction),
    RemoveProduct(String),
}

impl Callback {
    /// Wire form, at most [`MAX_CALLBACK_BYTES`] for catalog-valid names
    pub fn encode(&self) -> String {
        match self {
            Callback::Product(name) => format!("p:{name}"),
            Callback::Price { product, price } => format!("v:{}:{product}", price.0),
            Callback::Checkout => "checkout".to_string(),
            Callback::ClearCart => "clear".to_string(),
            Callback::Admin(AdminAction {
                decision: Decision::Approve,
                target,
            }) => format!("a:ok:{}", target.0),
            Callback::Admin(AdminAction {
                decision: Decision::Reject,
                target,
            }) => format!("a:no:{}", target.0),
            Callback::RemoveProduct(name) => format!("rm:{name}"),
        }
    }

    pub fn fits(&self) -> bool {
        self.encode().len() <= MAX_CALLBACK_BYTES
    }
}

impl std::fmt::Display for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

fn number<T: FromStr>(text: &str) -> Result<T, CallbackError> {
    text.parse()
        .map_err(|_| CallbackError::InvalidNumber(text.to_string()))
}

impl FromStr for Callback {
    type Err = CallbackError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        match data {
            "checkout" => return Ok(Callback::Checkout),
            "clear" => return Ok(Callback::ClearCart),
            _ => {}
        }

        let unrecognised = || CallbackError::Unrecognised(data.to_string());
        let (tag, rest) = data.split_once(':').ok_or_else(unrecognised)?;
        match tag {
            "p" if !rest.is_empty() => Ok(Callback::Product(rest.to_string())),
            "v" => {
                let (price, product) = rest.split_once(':').ok_or_else(unrecognised)?;
                if product.is_empty() {
                    return Err(unrecognised());
                }
                Ok(Callback::Price {
                    product: product.to_string(),
                    price: Price(number(price)?),
                })
            }
            "a" => {
                let (decision, target) = rest.split_once(':').ok_or_else(unrecognised)?;
                let decision = match decision {
                    "ok" => Decision::Approve,
                    "no" => Decision::Reject,
                    _ => return Err(unrecognised()),
                };
                Ok(Callback::Admin(AdminAction {
                    decision,
                    target: UserId(number(target)?),
                }))
            }
            "rm" if !rest.is_empty() => Ok(Callback::RemoveProduct(rest.to_string())),
            _ => Err(unrecognised()),
        }
    }
}
