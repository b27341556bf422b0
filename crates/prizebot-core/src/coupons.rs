use rand::{seq::SliceRandom, Rng};

/// Rewards handed out for wins. Drawn with replacement, never exhausted.
pub const DEFAULT_COUPONS: &[&str] = &[
    "🎟 10% off at KFC 🍗",
    "🎟 15% off at Starbucks ☕",
    "🎟 20% off at Nike 👟",
    "🎟 Free dessert at McDonald's 🍰",
    "🎟 5% off at Burger King 🍔",
];

#[derive(Clone, Debug)]
pub struct CouponCatalog {
    entries: Vec<String>,
}

impl Default for CouponCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_COUPONS.iter().map(|s| s.to_string()).collect())
            .unwrap_or_else(|| unreachable!("default catalog is not empty"))
    }
}

impl CouponCatalog {
    /// Returns `None` for an empty list.
    pub fn new(entries: Vec<String>) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        Some(Self { entries })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Pick one coupon uniformly at random.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        self.entries
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_else(|| unreachable!("catalog is never empty"))
    }
}
