//! Consolidation fee calculation
//!
//! Tier rules:
//! - `first-trial`: fixed 299, no percentage, no cap
//! - `regular`: 2% of the amount, capped at 999
//! - `volume`: 1.5% of the amount, capped at 699
//!
//! Amounts are `Decimal`, so anything above `Decimal::MAX` minus the applied
//! fee, or needing more than 28 decimal places, is `AmountOutOfRange`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Consolidation tier, selecting the fee schedule row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsolidationTier {
    FirstTrial,
    Regular,
    Volume,
}

impl ConsolidationTier {
    pub const ALL: [ConsolidationTier; 3] = [
        ConsolidationTier::FirstTrial,
        ConsolidationTier::Regular,
        ConsolidationTier::Volume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsolidationTier::FirstTrial => "first-trial",
            ConsolidationTier::Regular => "regular",
            ConsolidationTier::Volume => "volume",
        }
    }
}

impl std::fmt::Display for ConsolidationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConsolidationTier {
    type Err = FeeError;

    /// Tier names are matched exactly; an empty name counts as missing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(FeeError::MissingTier),
            "first-trial" => Ok(ConsolidationTier::FirstTrial),
            "regular" => Ok(ConsolidationTier::Regular),
            "volume" => Ok(ConsolidationTier::Volume),
            _ => Err(FeeError::InvalidTier),
        }
    }
}

/// Fee calculation failures. Messages are the wire error strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeError {
    #[error("Invalid amount")]
    InvalidAmount,
    #[error("Consolidation type is required")]
    MissingTier,
    #[error("Invalid consolidation type")]
    InvalidTier,
    #[error("Amount out of range")]
    AmountOutOfRange,
}

/// How a tier charges its fee
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeeRule {
    /// Flat fee independent of the amount
    Fixed(Decimal),
    /// Percentage of the amount (e.g. 2.0 for 2%)
    Percentage(Decimal),
}

/// One row of the fee schedule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierRule {
    pub rule: FeeRule,
    pub max_fee: Option<Decimal>,
}

/// Fee schedule for all tiers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule {
    pub first_trial: TierRule,
    pub regular: TierRule,
    pub volume: TierRule,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            first_trial: TierRule {
                rule: FeeRule::Fixed(dec!(299)),
                max_fee: None,
            },
            regular: TierRule {
                rule: FeeRule::Percentage(dec!(2)),
                max_fee: Some(dec!(999)),
            },
            volume: TierRule {
                rule: FeeRule::Percentage(dec!(1.5)),
                max_fee: Some(dec!(699)),
            },
        }
    }
}

impl FeeSchedule {
    pub fn rule_for(&self, tier: ConsolidationTier) -> &TierRule {
        match tier {
            ConsolidationTier::FirstTrial => &self.first_trial,
            ConsolidationTier::Regular => &self.regular,
            ConsolidationTier::Volume => &self.volume,
        }
    }
}

/// Result of a fee calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeBreakdown {
    pub tier: ConsolidationTier,
    pub original_amount: Decimal,
    /// Nominal percentage, zero for fixed-fee tiers
    pub fee_percentage: Decimal,
    /// Fee before the cap
    pub fee_amount: Decimal,
    pub max_fee: Option<Decimal>,
    /// Fee after the cap
    pub applied_fee: Decimal,
    pub total_amount: Decimal,
}

/// Fee calculator over a fee schedule
#[derive(Debug, Clone, Copy, Default)]
pub struct FeeCalculator {
    schedule: FeeSchedule,
}

impl FeeCalculator {
    pub fn new(schedule: FeeSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    /// Calculate the fee for an amount under a tier
    pub fn calculate(
        &self,
        amount: Decimal,
        tier: ConsolidationTier,
    ) -> Result<FeeBreakdown, FeeError> {
        if amount <= Decimal::ZERO {
            return Err(FeeError::InvalidAmount);
        }

        let tier_rule = self.schedule.rule_for(tier);

        let (fee_percentage, fee_amount) = match tier_rule.rule {
            FeeRule::Fixed(fee) => (Decimal::ZERO, fee),
            // Divide first so amounts near Decimal::MAX still get a (capped) fee
            FeeRule::Percentage(pct) => (
                pct,
                amount
                    .checked_div(dec!(100))
                    .and_then(|share| share.checked_mul(pct))
                    .ok_or(FeeError::AmountOutOfRange)?,
            ),
        };

        let applied_fee = match tier_rule.max_fee {
            Some(cap) if fee_amount > cap => {
                tracing::debug!(
                    tier = %tier,
                    fee_amount = %fee_amount,
                    cap = %cap,
                    "Capping consolidation fee"
                );
                cap
            }
            _ => fee_amount,
        };

        let total_amount = amount
            .checked_add(applied_fee)
            .ok_or(FeeError::AmountOutOfRange)?;

        Ok(FeeBreakdown {
            tier,
            original_amount: amount,
            fee_percentage,
            fee_amount,
            max_fee: tier_rule.max_fee,
            applied_fee,
            total_amount,
        })
    }

    /// Calculate from loosely-typed input, validating in order:
    /// amount, tier presence, tier name.
    pub fn calculate_raw(
        &self,
        amount: Option<Decimal>,
        tier: Option<&str>,
    ) -> Result<FeeBreakdown, FeeError> {
        let amount = match amount {
            Some(a) if a > Decimal::ZERO => a,
            _ => return Err(FeeError::InvalidAmount),
        };
        let tier: ConsolidationTier = tier.ok_or(FeeError::MissingTier)?.parse()?;

        self.calculate(amount, tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_fee_capped() {
        let calc = FeeCalculator::default();
        let fee = calc
            .calculate(dec!(50000), ConsolidationTier::Regular)
            .unwrap();

        assert_eq!(fee.fee_amount, dec!(1000));
        assert_eq!(fee.max_fee, Some(dec!(999)));
        assert_eq!(fee.applied_fee, dec!(999));
        assert_eq!(fee.total_amount, dec!(50999));
        assert_eq!(fee.fee_percentage, dec!(2));
    }

    #[test]
    fn test_volume_fee_under_cap() {
        let calc = FeeCalculator::default();
        let fee = calc
            .calculate(dec!(10000), ConsolidationTier::Volume)
            .unwrap();

        assert_eq!(fee.fee_amount, dec!(150));
        assert_eq!(fee.applied_fee, dec!(150));
        assert_eq!(fee.total_amount, dec!(10150));
    }

    #[test]
    fn test_volume_fee_capped() {
        let calc = FeeCalculator::default();
        let fee = calc
            .calculate(dec!(100000), ConsolidationTier::Volume)
            .unwrap();

        assert_eq!(fee.fee_amount, dec!(1500));
        assert_eq!(fee.applied_fee, dec!(699));
        assert_eq!(fee.total_amount, dec!(100699));
    }

    #[test]
    fn test_first_trial_is_fixed() {
        let calc = FeeCalculator::default();

        for amount in [dec!(0.01), dec!(1000), dec!(2500000)] {
            let fee = calc
                .calculate(amount, ConsolidationTier::FirstTrial)
                .unwrap();
            assert_eq!(fee.fee_percentage, Decimal::ZERO);
            assert_eq!(fee.fee_amount, dec!(299));
            assert_eq!(fee.applied_fee, dec!(299));
            assert_eq!(fee.max_fee, None);
            assert_eq!(fee.total_amount, amount + dec!(299));
        }
    }

    #[test]
    fn test_percentage_tiers_match_min_formula() {
        let calc = FeeCalculator::default();

        for amount in [dec!(1), dec!(123.45), dec!(49950), dec!(46600), dec!(46601), dec!(1000000)] {
            let regular = calc.calculate(amount, ConsolidationTier::Regular).unwrap();
            assert_eq!(regular.applied_fee, (amount * dec!(0.02)).min(dec!(999)));

            let volume = calc.calculate(amount, ConsolidationTier::Volume).unwrap();
            assert_eq!(volume.applied_fee, (amount * dec!(0.015)).min(dec!(699)));
        }
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let calc = FeeCalculator::default();

        for tier in ConsolidationTier::ALL {
            assert_eq!(calc.calculate(dec!(0), tier), Err(FeeError::InvalidAmount));
            assert_eq!(calc.calculate(dec!(-5), tier), Err(FeeError::InvalidAmount));
        }
    }

    #[test]
    fn test_amounts_near_decimal_max() {
        let calc = FeeCalculator::default();

        // Huge but representable: the fee is still capped
        let fee = calc
            .calculate(dec!(50000000000000000000000000000), ConsolidationTier::Regular)
            .unwrap();
        assert_eq!(fee.applied_fee, dec!(999));
        assert_eq!(fee.total_amount, dec!(50000000000000000000000000999));

        let max_regular = Decimal::MAX - dec!(999);
        assert_eq!(
            calc.calculate(max_regular, ConsolidationTier::Regular)
                .unwrap()
                .total_amount,
            Decimal::MAX
        );

        // No room left for the fee on top
        for tier in ConsolidationTier::ALL {
            assert_eq!(
                calc.calculate(Decimal::MAX, tier),
                Err(FeeError::AmountOutOfRange)
            );
        }
    }

    #[test]
    fn test_raw_validation_order() {
        let calc = FeeCalculator::default();

        assert_eq!(calc.calculate_raw(None, None), Err(FeeError::InvalidAmount));
        assert_eq!(
            calc.calculate_raw(Some(dec!(0)), Some("bogus")),
            Err(FeeError::InvalidAmount)
        );
        assert_eq!(calc.calculate_raw(Some(dec!(100)), None), Err(FeeError::MissingTier));
        assert_eq!(calc.calculate_raw(Some(dec!(100)), Some("")), Err(FeeError::MissingTier));
        assert_eq!(
            calc.calculate_raw(Some(dec!(100)), Some("unknown-tier")),
            Err(FeeError::InvalidTier)
        );
        assert_eq!(
            calc.calculate_raw(Some(dec!(100)), Some("Regular")),
            Err(FeeError::InvalidTier)
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(FeeError::InvalidAmount.to_string(), "Invalid amount");
        assert_eq!(FeeError::MissingTier.to_string(), "Consolidation type is required");
        assert_eq!(FeeError::InvalidTier.to_string(), "Invalid consolidation type");
        assert_eq!(FeeError::AmountOutOfRange.to_string(), "Amount out of range");
    }

    #[test]
    fn test_custom_schedule() {
        let mut schedule = FeeSchedule::default();
        schedule.regular.max_fee = None;
        let calc = FeeCalculator::new(schedule);

        let fee = calc
            .calculate(dec!(50000), ConsolidationTier::Regular)
            .unwrap();
        assert_eq!(fee.applied_fee, dec!(1000));
        assert_eq!(fee.max_fee, None);
    }
}
