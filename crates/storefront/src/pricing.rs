//! Fixed checkout pricing policy.
//!
//! Shipping and tax are presentation-time figures quoted next to the cart
//! subtotal; the persisted order total is the subtotal itself. Single
//! currency, fixed percentages.

use clementine_core::Price;

/// Orders at or above this subtotal ship free.
pub const FREE_SHIPPING_THRESHOLD: Price = Price::from_minor_units(100_00);

/// Flat shipping fee below the free-shipping threshold.
pub const FLAT_SHIPPING_FEE: Price = Price::from_minor_units(9_99);

/// Sales tax, percent of the subtotal.
pub const TAX_RATE_PERCENT: i64 = 8;

/// A checkout quote derived from a cart subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutQuote {
    /// Sum of cart line totals.
    pub subtotal: Price,
    /// Shipping fee, zero at or above the threshold.
    pub shipping: Price,
    /// Tax on the subtotal, rounded down to a minor unit.
    pub tax: Price,
}

impl CheckoutQuote {
    /// Quote shipping and tax for a subtotal.
    #[must_use]
    pub fn for_subtotal(subtotal: Price) -> Self {
        let shipping = if subtotal >= FREE_SHIPPING_THRESHOLD {
            Price::ZERO
        } else {
            FLAT_SHIPPING_FEE
        };
        let tax = Price::from_minor_units(
            subtotal
                .minor_units()
                .saturating_mul(TAX_RATE_PERCENT)
                .div_euclid(100),
        );
        Self {
            subtotal,
            shipping,
            tax,
        }
    }

    /// Amount due at checkout.
    #[must_use]
    pub fn grand_total(&self) -> Price {
        self.subtotal + self.shipping + self.tax
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_fee_below_threshold() {
        let quote = CheckoutQuote::for_subtotal(Price::from_minor_units(50_00));
        assert_eq!(quote.shipping, FLAT_SHIPPING_FEE);
        assert_eq!(quote.tax, Price::from_minor_units(4_00));
        assert_eq!(quote.grand_total(), Price::from_minor_units(63_99));
    }

    #[test]
    fn test_free_shipping_at_threshold() {
        let quote = CheckoutQuote::for_subtotal(FREE_SHIPPING_THRESHOLD);
        assert_eq!(quote.shipping, Price::ZERO);
        assert_eq!(quote.tax, Price::from_minor_units(8_00));
        assert_eq!(quote.grand_total(), Price::from_minor_units(108_00));
    }

    #[test]
    fn test_tax_rounds_down() {
        // 8% of 0.07 is 0.0056, quoted as zero minor units.
        let quote = CheckoutQuote::for_subtotal(Price::from_minor_units(7));
        assert_eq!(quote.tax, Price::ZERO);
    }

    #[test]
    fn test_empty_cart_quote() {
        let quote = CheckoutQuote::for_subtotal(Price::ZERO);
        assert_eq!(quote.shipping, FLAT_SHIPPING_FEE);
        assert_eq!(quote.tax, Price::ZERO);
        assert_eq!(quote.grand_total(), FLAT_SHIPPING_FEE);
    }
}
