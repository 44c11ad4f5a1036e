//! Odds-space arithmetic
//!
//! Two representations are used throughout the crate:
//!
//! - American odds: signed integer. `+150` profits 150 on a 100 stake,
//!   `-150` needs a 150 stake to profit 100.
//! - Decimal odds: total return per unit staked, always > 1.0.
//!
//! A parlay pays the product of its legs' decimal odds.

use crate::error::{validate_american_odds, ParlayError, Result};

/// Convert American odds to decimal odds
///
/// # Examples
/// ```
/// use parlay::core::odds::american_to_decimal;
/// assert!((american_to_decimal(150).unwrap() - 2.5).abs() < 1e-12);
/// assert!((american_to_decimal(-200).unwrap() - 1.5).abs() < 1e-12);
/// assert!(american_to_decimal(0).is_err());
/// ```
pub fn american_to_decimal(odds: i32) -> Result<f64> {
    validate_american_odds(odds)?;

    let odds = odds as f64;
    if odds > 0.0 {
        Ok(1.0 + odds / 100.0)
    } else {
        Ok(1.0 + 100.0 / odds.abs())
    }
}

/// Convert decimal odds to American odds
///
/// `d >= 2.0` maps to positive odds, `1.0 < d < 2.0` to negative odds.
pub fn decimal_to_american(decimal: f64) -> Result<i32> {
    if !decimal.is_finite() || decimal <= 1.0 {
        return Err(ParlayError::OddsComputation(format!(
            "Decimal odds must be finite and > 1.0, got {}",
            decimal
        )));
    }

    let american = if decimal >= 2.0 {
        ((decimal - 1.0) * 100.0).round()
    } else {
        (-100.0 / (decimal - 1.0)).round()
    };

    if american > i32::MAX as f64 || american < i32::MIN as f64 {
        return Err(ParlayError::OddsComputation(format!(
            "Decimal odds {} overflow American representation",
            decimal
        )));
    }

    Ok(american as i32)
}

/// Break-even win probability of an American price
pub fn implied_probability(odds: i32) -> Result<f64> {
    Ok(1.0 / american_to_decimal(odds)?)
}

/// Product of decimal odds for a list of American odds
pub fn combine_decimal(odds: &[i32]) -> Result<f64> {
    if odds.is_empty() {
        return Err(ParlayError::OddsComputation(
            "Cannot combine an empty odds list".to_string(),
        ));
    }

    let mut product = 1.0;
    for &o in odds {
        product *= american_to_decimal(o)?;
    }
    Ok(product)
}

/// Combined American odds of a multi-leg parlay
///
/// # Examples
/// ```
/// use parlay::core::odds::combine;
/// // 1.909 × 2.200 × 1.667 ≈ 7.00 decimal
/// assert_eq!(combine(&[-110, 120, -150]).unwrap(), 600);
/// ```
pub fn combine(odds: &[i32]) -> Result<i32> {
    decimal_to_american(combine_decimal(odds)?)
}

/// Total return (stake included) of a bet at the given American odds
pub fn payout(odds: i32, stake: f64) -> Result<f64> {
    Ok(stake * american_to_decimal(odds)?)
}

/// Joint probability of independent events
pub fn parlay_probability(probabilities: &[f64]) -> f64 {
    probabilities.iter().product()
}

/// American odds needed for `stake` to return `target_payout`
pub fn required_odds_for_payout(target_payout: f64, stake: f64) -> Result<i32> {
    if !(stake > 0.0) {
        return Err(ParlayError::Validation(format!(
            "Stake must be positive, got {}",
            stake
        )));
    }

    let decimal = target_payout / stake;
    if !(decimal > 1.0) {
        return Err(ParlayError::Validation(format!(
            "Target payout {} does not exceed stake {}",
            target_payout, stake
        )));
    }

    decimal_to_american(decimal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_american_to_decimal() {
        assert!((american_to_decimal(100).unwrap() - 2.0).abs() < 1e-12);
        assert!((american_to_decimal(-100).unwrap() - 2.0).abs() < 1e-12);
        assert!((american_to_decimal(-110).unwrap() - 1.909_090_909).abs() < 1e-6);
        assert!((american_to_decimal(2500).unwrap() - 26.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_odds_rejected() {
        assert!(matches!(
            american_to_decimal(0),
            Err(ParlayError::OddsComputation(_))
        ));
        assert!(implied_probability(0).is_err());
        assert!(combine(&[-110, 0, 150]).is_err());
    }

    #[test]
    fn test_decimal_to_american() {
        assert_eq!(decimal_to_american(2.0).unwrap(), 100);
        assert_eq!(decimal_to_american(3.5).unwrap(), 250);
        assert_eq!(decimal_to_american(1.5).unwrap(), -200);
        assert_eq!(decimal_to_american(1.909_090_909).unwrap(), -110);
    }

    #[test]
    fn test_decimal_to_american_invalid() {
        assert!(decimal_to_american(1.0).is_err());
        assert!(decimal_to_american(0.5).is_err());
        assert!(decimal_to_american(f64::NAN).is_err());
        assert!(decimal_to_american(f64::INFINITY).is_err());
    }

    #[test]
    fn test_round_trip() {
        // -100 and +100 are the same price; both come back as +100.
        for o in (-5000..=-101).chain(100..=5000) {
            let back = decimal_to_american(american_to_decimal(o).unwrap()).unwrap();
            assert!((back - o).abs() <= 1, "{} came back as {}", o, back);
        }
        assert_eq!(
            decimal_to_american(american_to_decimal(-100).unwrap()).unwrap(),
            100
        );
    }

    #[test]
    fn test_implied_probability() {
        assert!((implied_probability(100).unwrap() - 0.5).abs() < 1e-12);
        assert!((implied_probability(-150).unwrap() - 0.6).abs() < 1e-12);
        assert!((implied_probability(300).unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_combine_manual_calculation() {
        // 1.909 × 2.200 × 1.667 = 7.00 decimal
        let decimal = combine_decimal(&[-110, 120, -150]).unwrap();
        assert!((decimal - 7.0).abs() < 1e-9);
        assert_eq!(combine(&[-110, 120, -150]).unwrap(), 600);
    }

    #[test]
    fn test_combine_single_leg_is_identity() {
        for o in [-300, -110, 100, 150, 900] {
            assert!((combine(&[o]).unwrap() - o).abs() <= 1);
        }
    }

    #[test]
    fn test_combine_empty_rejected() {
        assert!(matches!(
            combine(&[]),
            Err(ParlayError::OddsComputation(_))
        ));
    }

    #[test]
    fn test_combine_order_independent() {
        let odds = [-110, 120, -150, 240, -105];
        let expected = combine(&odds).unwrap();

        // every rotation and its reverse
        for shift in 0..odds.len() {
            let mut rotated = odds.to_vec();
            rotated.rotate_left(shift);
            assert!((combine(&rotated).unwrap() - expected).abs() <= 1);
            rotated.reverse();
            assert!((combine(&rotated).unwrap() - expected).abs() <= 1);
        }

        // associativity: combine a prefix first, then fold in the rest
        let head = combine(&odds[..2]).unwrap();
        let mut regrouped = vec![head];
        regrouped.extend_from_slice(&odds[2..]);
        assert!((combine(&regrouped).unwrap() - expected).abs() <= 1);
    }

    #[test]
    fn test_payout() {
        assert!((payout(150, 10.0).unwrap() - 25.0).abs() < 1e-9);
        assert!((payout(-200, 10.0).unwrap() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_parlay_probability() {
        assert!((parlay_probability(&[0.5, 0.5, 0.5]) - 0.125).abs() < 1e-12);
        assert_eq!(parlay_probability(&[]), 1.0);
    }

    #[test]
    fn test_required_odds_for_payout() {
        // 260 back on a 10 stake = 26.0 decimal = +2500
        assert_eq!(required_odds_for_payout(260.0, 10.0).unwrap(), 2500);
        assert!(required_odds_for_payout(10.0, 10.0).is_err());
        assert!(required_odds_for_payout(100.0, 0.0).is_err());
    }
}
