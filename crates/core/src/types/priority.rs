//! Wishlist item priority.

use serde::{Deserialize, Serialize};

/// How urgently a teacher needs an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "item_priority", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ItemPriority {
    High,
    #[default]
    Standard,
    Low,
}

impl ItemPriority {
    /// Sort rank, lowest first. High-priority items are listed first.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Standard => 1,
            Self::Low => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_standard() {
        assert_eq!(ItemPriority::default(), ItemPriority::Standard);
    }

    #[test]
    fn test_rank_orders_high_first() {
        let mut priorities = vec![ItemPriority::Low, ItemPriority::High, ItemPriority::Standard];
        priorities.sort_by_key(|p| p.rank());
        assert_eq!(
            priorities,
            vec![ItemPriority::High, ItemPriority::Standard, ItemPriority::Low]
        );
    }
}
