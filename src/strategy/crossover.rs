use super::Strategy;
use crate::indicators::calculate_sma;
use crate::models::Signal;

/// Moving-average crossover strategy
///
/// Compares a short-window and long-window SMA one observation ago against
/// the same averages including the newest observation:
/// - golden cross (short rises from at-or-below to strictly above) → Buy
/// - death cross (short falls from at-or-above to strictly below) → Sell
///
/// The two rules are not symmetric complements at the boundary: when the
/// prior averages are exactly equal, both first clauses hold and whichever
/// strict second clause is true wins.
#[derive(Debug, Clone)]
pub struct CrossoverStrategy {
    short_window: usize,
    long_window: usize,
}

impl CrossoverStrategy {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
        }
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }
}

impl Default for CrossoverStrategy {
    fn default() -> Self {
        Self::new(5, 20)
    }
}

impl Strategy for CrossoverStrategy {
    fn evaluate(&self, prices: &[f64]) -> Signal {
        // Need the long window plus one step of history to see a cross.
        if prices.len() < self.long_window + 1 {
            return Signal::Hold;
        }

        // Averages one observation before the newest price.
        let previous = &prices[..prices.len() - 1];
        let (short_old, long_old, short_new, long_new) = match (
            calculate_sma(previous, self.short_window),
            calculate_sma(previous, self.long_window),
            calculate_sma(prices, self.short_window),
            calculate_sma(prices, self.long_window),
        ) {
            (Some(so), Some(lo), Some(sn), Some(ln)) => (so, lo, sn, ln),
            _ => return Signal::Hold,
        };

        if short_old <= long_old && short_new > long_new {
            Signal::Buy
        } else if short_old >= long_old && short_new < long_new {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    fn name(&self) -> &str {
        "CrossoverStrategy"
    }

    fn min_prices_required(&self) -> usize {
        self.long_window + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_strategy() -> CrossoverStrategy {
        CrossoverStrategy::new(5, 20)
    }

    #[test]
    fn test_insufficient_history_always_holds() {
        let strategy = default_strategy();

        for len in 0..21 {
            let prices: Vec<f64> = (0..len).map(|i| 100.0 + i as f64).collect();
            assert_eq!(
                strategy.evaluate(&prices),
                Signal::Hold,
                "expected Hold with {} prices",
                len
            );
        }
    }

    #[test]
    fn test_golden_cross_buys() {
        let strategy = default_strategy();

        // 15 flat prices, a dip, then a sharp recovery through the long MA.
        let mut prices = vec![100.0; 15];
        prices.extend_from_slice(&[90.0, 88.0, 95.0, 105.0, 112.0, 120.0]);
        assert_eq!(prices.len(), 21);

        // short_old = 98.0, long_old = 99.5, short_new = 104.0, long_new = 100.5
        assert_eq!(strategy.evaluate(&prices), Signal::Buy);
    }

    #[test]
    fn test_death_cross_sells() {
        let strategy = default_strategy();

        // Mirror of the golden-cross series: rally, then a collapse through
        // the long MA.
        let mut prices = vec![100.0; 15];
        prices.extend_from_slice(&[110.0, 112.0, 105.0, 95.0, 88.0, 80.0]);

        // short_old = 102.0, long_old = 100.5, short_new = 96.0, long_new = 99.5
        assert_eq!(strategy.evaluate(&prices), Signal::Sell);
    }

    #[test]
    fn test_no_cross_holds() {
        let strategy = default_strategy();

        // Short already above long a step ago and still above: no new cross.
        let mut prices = vec![100.0; 15];
        prices.extend_from_slice(&[105.0, 106.0, 107.0, 108.0, 109.0, 110.0]);
        assert_eq!(strategy.evaluate(&prices), Signal::Hold);
    }

    #[test]
    fn test_flat_series_holds_at_equality_boundary() {
        let strategy = default_strategy();

        // All averages equal: both first clauses are satisfied but neither
        // strict second clause is, so the tie resolves to Hold.
        let prices = vec![100.0; 25];
        assert_eq!(strategy.evaluate(&prices), Signal::Hold);
    }

    #[test]
    fn test_equal_old_averages_with_rising_short_buys() {
        let strategy = default_strategy();

        // Flat history makes short_old == long_old; a single jump lifts the
        // short average strictly above the long one, so the buy clause wins
        // the boundary tie.
        let mut prices = vec![100.0; 20];
        prices.push(120.0);

        assert_eq!(strategy.evaluate(&prices), Signal::Buy);
    }

    #[test]
    fn test_equal_old_averages_with_falling_short_sells() {
        let strategy = default_strategy();

        let mut prices = vec![100.0; 20];
        prices.push(80.0);

        assert_eq!(strategy.evaluate(&prices), Signal::Sell);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let strategy = default_strategy();

        let mut prices = vec![100.0; 15];
        prices.extend_from_slice(&[90.0, 88.0, 95.0, 105.0, 112.0, 120.0]);

        let first = strategy.evaluate(&prices);
        for _ in 0..10 {
            assert_eq!(strategy.evaluate(&prices), first);
        }
    }

    #[test]
    fn test_longer_window_than_configured_uses_tail() {
        let strategy = default_strategy();

        // Extra leading history must not change the outcome: only the tail
        // windows matter.
        let mut prices = vec![50.0; 30];
        prices.extend(vec![100.0; 15]);
        prices.extend_from_slice(&[90.0, 88.0, 95.0, 105.0, 112.0, 120.0]);

        assert_eq!(strategy.evaluate(&prices[prices.len() - 21..]), Signal::Buy);
    }

    #[test]
    fn test_strategy_name_and_window_accessors() {
        let strategy = CrossoverStrategy::new(3, 7);
        assert_eq!(strategy.name(), "CrossoverStrategy");
        assert_eq!(strategy.short_window(), 3);
        assert_eq!(strategy.long_window(), 7);
        assert_eq!(strategy.min_prices_required(), 8);
    }
}
