//! Gold balance, passive income and player health.

use std::time::Duration;

/// Ledger the world consults before accepting build orders.
#[derive(Debug)]
pub(crate) struct Economy {
    gold: u32,
    health: u32,
    tower_cost: u32,
    income_amount: u32,
    income_interval: Duration,
    income_elapsed: Duration,
    defeated: bool,
}

/// Change in player health caused by an escape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct HealthChange {
    pub(crate) health: u32,
    pub(crate) defeated_now: bool,
}

impl Economy {
    pub(crate) fn new(
        gold: u32,
        health: u32,
        tower_cost: u32,
        income_amount: u32,
        income_interval: Duration,
    ) -> Self {
        Self {
            gold,
            health,
            tower_cost,
            income_amount,
            income_interval,
            income_elapsed: Duration::ZERO,
            defeated: health == 0,
        }
    }

    pub(crate) const fn gold(&self) -> u32 {
        self.gold
    }

    pub(crate) const fn health(&self) -> u32 {
        self.health
    }

    pub(crate) const fn is_defeated(&self) -> bool {
        self.defeated
    }

    pub(crate) const fn can_afford_tower(&self) -> bool {
        self.gold >= self.tower_cost
    }

    /// Deducts the tower cost, returning the new balance.
    pub(crate) fn spend_on_tower(&mut self) -> u32 {
        self.gold = self.gold.saturating_sub(self.tower_cost);
        self.gold
    }

    pub(crate) fn reward(&mut self, gold: u32) -> u32 {
        self.gold = self.gold.saturating_add(gold);
        self.gold
    }

    pub(crate) fn damage(&mut self, amount: u32) -> HealthChange {
        self.health = self.health.saturating_sub(amount);
        let defeated_now = self.health == 0 && !self.defeated;
        if defeated_now {
            self.defeated = true;
        }
        HealthChange {
            health: self.health,
            defeated_now,
        }
    }

    /// Accrues passive income, returning the new balance if any was paid.
    pub(crate) fn accrue(&mut self, dt: Duration) -> Option<u32> {
        if self.income_interval.is_zero() || self.income_amount == 0 {
            return None;
        }
        self.income_elapsed = self.income_elapsed.saturating_add(dt);
        let interval = self.income_interval.as_nanos();
        let elapsed = self.income_elapsed.as_nanos();
        let payments = elapsed / interval;
        if payments == 0 {
            return None;
        }
        let remainder = u64::try_from(elapsed % interval).unwrap_or(u64::MAX);
        self.income_elapsed = Duration::from_nanos(remainder);
        let payments = u32::try_from(payments).unwrap_or(u32::MAX);
        self.gold = self
            .gold
            .saturating_add(self.income_amount.saturating_mul(payments));
        Some(self.gold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock() -> Economy {
        Economy::new(350, 100, 75, 1, Duration::from_secs(2))
    }

    #[test]
    fn income_pays_once_per_interval() {
        let mut economy = stock();
        assert_eq!(economy.accrue(Duration::from_millis(1500)), None);
        assert_eq!(economy.accrue(Duration::from_millis(500)), Some(351));
        assert_eq!(economy.accrue(Duration::from_secs(4)), Some(353));
    }

    #[test]
    fn huge_steps_pay_out_without_looping() {
        let mut economy = stock();
        assert_eq!(economy.accrue(Duration::from_secs(1)), None);
        assert_eq!(economy.accrue(Duration::MAX), Some(u32::MAX));
        assert_eq!(economy.accrue(Duration::MAX), Some(u32::MAX));
    }

    #[test]
    fn defeat_is_reported_once() {
        let mut economy = stock();
        let first = economy.damage(100);
        assert_eq!(
            first,
            HealthChange {
                health: 0,
                defeated_now: true
            }
        );
        let second = economy.damage(2);
        assert!(!second.defeated_now);
        assert!(economy.is_defeated());
    }

    #[test]
    fn tower_spending_tracks_affordability() {
        let mut economy = Economy::new(150, 100, 75, 1, Duration::ZERO);
        assert!(economy.can_afford_tower());
        assert_eq!(economy.spend_on_tower(), 75);
        assert_eq!(economy.spend_on_tower(), 0);
        assert!(!economy.can_afford_tower());
        assert_eq!(economy.accrue(Duration::from_secs(10)), None);
    }
}
