//! # Delivery Zone Rule
//!
//! Orders delivered inside the sixteen city districts (postal codes 13001 to
//! 13016) are always accepted. Anywhere else the cart must reach a minimum
//! total.

use crate::catalog::Price;

/// Minimum total for deliveries outside the zone
pub const MIN_OUT_OF_ZONE_TOTAL: Price = Price(150);

const ZONE_PREFIX: &str = "130";
const FIRST_DISTRICT: u32 = 1;
const LAST_DISTRICT: u32 = 16;
const POSTAL_CODE_LEN: usize = 5;

/// Decimal digits of `address` in order of appearance
pub fn extract_digits(address: &str) -> String {
    address.chars().filter(char::is_ascii_digit).collect()
}

fn starts_with_zone_code(digits: &str) -> bool {
    (FIRST_DISTRICT..=LAST_DISTRICT)
        .any(|district| digits.starts_with(&format!("{ZONE_PREFIX}{district:02}")))
}

/// Whether the address carries one of the zone postal codes.
///
/// The full digit string is checked first. A street number in front of the
/// postal code ("12 Rue X 13007") would hide it, so the last five-digit group,
/// where a French address puts its postal code, is checked as well.
pub fn is_in_zone(address: &str) -> bool {
    starts_with_zone_code(&extract_digits(address))
        || postal_code(address).is_some_and(starts_with_zone_code)
}

/// Last run of exactly five digits
fn postal_code(address: &str) -> Option<&str> {
    address
        .split(|c: char| !c.is_ascii_digit())
        .rfind(|run| run.len() == POSTAL_CODE_LEN)
}

pub fn accept(cart_total: Price, address: &str) -> bool {
    is_in_zone(address) || cart_total >= MIN_OUT_OF_ZONE_TOTAL
}
