//! Parlay construction
//!
//! Filter → rank → greedy fill → bounded substitution search → validate →
//! finalize. Everything is a pure function of the pool and the constraints;
//! the only loop without a natural bound (the substitution search) is capped
//! by `SearchConfig::max_attempts`.

use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::constraints::{band_distance, ConstraintSet, ResolvedConstraints};
use crate::core::odds::{combine, payout};
use crate::core::tier::TierClassifier;
use crate::error::{ParlayError, Result};
use crate::models::{LegKey, Parlay, ParlayLeg, ScoredProp, Tier};

/// Parlay plus search bookkeeping
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub parlay: Parlay,
    /// Substitution attempts spent; never above the configured cap
    pub attempts: usize,
    /// `None` when no target was requested
    pub target_met: Option<bool>,
}

/// Builds parlays from a confidence-scored pool
#[derive(Debug, Clone, Default)]
pub struct ParlayBuilder {
    config: EngineConfig,
    classifier: TierClassifier,
}

impl ParlayBuilder {
    pub fn new(config: EngineConfig) -> Self {
        let classifier = TierClassifier::new(config.tiers.clone());
        Self { config, classifier }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &TierClassifier {
        &self.classifier
    }

    /// Build one parlay
    pub fn build(&self, pool: &[ScoredProp], constraints: &ConstraintSet) -> Result<Parlay> {
        self.build_with_report(pool, constraints)
            .map(|outcome| outcome.parlay)
    }

    /// Build one parlay and report how the search went
    pub fn build_with_report(
        &self,
        pool: &[ScoredProp],
        constraints: &ConstraintSet,
    ) -> Result<BuildOutcome> {
        let resolved = constraints.resolve(&self.classifier, &self.config)?;
        self.build_resolved(pool.iter().collect(), &resolved)
    }

    /// Build up to `count` parlays for the same constraints.
    ///
    /// Each round excludes the top leg of every earlier parlay, so later
    /// parlays are anchored elsewhere; a parlay whose player overlap with an
    /// accepted one exceeds `slate_overlap` is dropped. The first build's
    /// error is returned when not even one parlay can be built.
    pub fn build_slate(
        &self,
        pool: &[ScoredProp],
        constraints: &ConstraintSet,
        count: usize,
    ) -> Result<Vec<Parlay>> {
        let resolved = constraints.resolve(&self.classifier, &self.config)?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let first = self.build_resolved(pool.iter().collect(), &resolved)?;
        let mut excluded: HashSet<LegKey> = HashSet::new();
        excluded.extend(anchor(&first.parlay));
        let mut accepted = vec![first.parlay];

        // Every round excludes one more key, so the pool size bounds the rounds.
        for _ in 0..pool.len() {
            if accepted.len() >= count {
                break;
            }

            let remaining: Vec<&ScoredProp> = pool
                .iter()
                .filter(|p| !excluded.contains(&p.key()))
                .collect();

            let outcome = match self.build_resolved(remaining, &resolved) {
                Ok(outcome) => outcome,
                Err(e) => {
                    debug!("Slate exhausted: {}", e);
                    break;
                }
            };

            excluded.extend(anchor(&outcome.parlay));
            if is_duplicate(
                &outcome.parlay,
                &accepted,
                self.config.search.slate_overlap,
            ) {
                debug!("Dropping slate candidate overlapping an accepted parlay");
                continue;
            }
            accepted.push(outcome.parlay);
        }

        if accepted.len() < count {
            warn!(
                "Built {} of {} requested {} parlays",
                accepted.len(),
                count,
                resolved
                    .tier
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "target".to_string())
            );
        }

        Ok(accepted)
    }

    fn build_resolved(
        &self,
        pool: Vec<&ScoredProp>,
        resolved: &ResolvedConstraints,
    ) -> Result<BuildOutcome> {
        // 1. Filter
        let pool_size = pool.len();
        let (valid, invalid): (Vec<&ScoredProp>, Vec<&ScoredProp>) =
            pool.into_iter().partition(|p| p.prop.validate().is_ok());
        if !invalid.is_empty() {
            warn!(
                "Skipping {} props with an invalid hit rate or zero odds",
                invalid.len()
            );
        }

        let mut candidates: Vec<&ScoredProp> = valid
            .into_iter()
            .filter(|p| {
                p.confidence >= resolved.min_confidence && p.hit_rate() >= resolved.min_hit_rate
            })
            .collect();

        debug!(
            "{} of {} props pass filters (confidence >= {}, hit rate >= {})",
            candidates.len(),
            pool_size,
            resolved.min_confidence,
            resolved.min_hit_rate
        );

        if candidates.is_empty() {
            return Err(ParlayError::NoViableLegs(format!(
                "none of {} {} props reach confidence {} and hit rate {}",
                pool_size, resolved.sport, resolved.min_confidence, resolved.min_hit_rate
            )));
        }

        // 2. Rank, keeping the best-ranked prop per (player, prop type)
        candidates.sort_by(|a, b| rank_order(a, b));
        let mut seen: HashSet<LegKey> = HashSet::new();
        candidates.retain(|p| seen.insert(p.key()));

        if candidates.len() < resolved.min_legs {
            return Err(ParlayError::InsufficientLegs {
                found: candidates.len(),
                required: resolved.min_legs,
            });
        }

        // 3-5. Select. A parlay without a requested tier is labelled by the
        // tier its confidence earns, so it is re-selected under that tier's
        // leg limit until it fits. The limit shrinks every round.
        let mut max_legs = resolved.max_legs;
        let mut attempts = 0;
        let (selected, target_met) = loop {
            let budget = resolved.max_attempts.saturating_sub(attempts);
            let selection = self.select(&candidates, resolved, max_legs, budget)?;
            attempts += selection.attempts;

            match self.earned_leg_limit(&candidates, &selection.selected, resolved) {
                Some(limit) if selection.selected.len() > limit => {
                    debug!(
                        "{} legs exceed the {}-leg limit of the tier they earn; reselecting",
                        selection.selected.len(),
                        limit
                    );
                    max_legs = limit;
                }
                _ => break (selection.selected, selection.target_met),
            }
        };

        if selected.len() < resolved.min_legs {
            return Err(ParlayError::InsufficientLegs {
                found: selected.len(),
                required: resolved.min_legs,
            });
        }

        // 6. Finalize
        let parlay = self.finalize(&candidates, selected, resolved, target_met)?;
        info!(
            "Built {} {} parlay: {} legs at {:+} ({:.1}% confidence)",
            parlay.sport(),
            parlay.tier(),
            parlay.legs().len(),
            parlay.total_odds(),
            parlay.overall_confidence()
        );

        Ok(BuildOutcome {
            parlay,
            attempts,
            target_met,
        })
    }

    /// Greedy fill up to `max_legs`, then the substitution search when a
    /// target is set
    fn select(
        &self,
        candidates: &[&ScoredProp],
        resolved: &ResolvedConstraints,
        max_legs: usize,
        budget: usize,
    ) -> Result<Selection> {
        let mut selected: Vec<usize> = Vec::with_capacity(max_legs);
        for index in 0..candidates.len() {
            if selected.len() >= max_legs {
                break;
            }
            selected.push(index);

            if let Some(target) = resolved.target_odds {
                if selected.len() >= resolved.min_legs {
                    let odds = combined_odds(candidates, &selected)?;
                    // Every leg multiplies the payout, so past the band only swaps help.
                    if resolved.within_band(odds, target) || odds > target {
                        break;
                    }
                }
            }
        }

        match resolved.target_odds {
            Some(target) => self.substitute(candidates, selected, target, resolved, budget),
            None => Ok(Selection {
                selected,
                attempts: 0,
                target_met: None,
            }),
        }
    }

    /// Max legs of the tier a tier-less selection would be labelled with
    fn earned_leg_limit(
        &self,
        candidates: &[&ScoredProp],
        selected: &[usize],
        resolved: &ResolvedConstraints,
    ) -> Option<usize> {
        if resolved.tier.is_some() || selected.is_empty() {
            return None;
        }
        let confidence = selected
            .iter()
            .map(|&i| candidates[i].confidence)
            .sum::<f64>()
            / selected.len() as f64;
        let tier = self.classifier.classify(confidence);
        self.classifier.bounds_for(tier).ok().map(|b| b.max_legs)
    }

    /// Swap out the weakest legs for unused candidates while that moves the
    /// combined odds toward the target. Each candidate tried is one attempt.
    fn substitute(
        &self,
        candidates: &[&ScoredProp],
        mut selected: Vec<usize>,
        target: i32,
        resolved: &ResolvedConstraints,
        budget: usize,
    ) -> Result<Selection> {
        let mut odds = combined_odds(candidates, &selected)?;
        let mut distance = band_distance(odds, target);
        let mut attempts = 0;

        if resolved.within_band(odds, target) {
            return Ok(Selection {
                selected,
                attempts,
                target_met: Some(true),
            });
        }

        let mut used = vec![false; candidates.len()];
        for &index in &selected {
            used[index] = true;
        }

        // Ranked order is descending confidence, so the last slot is the weakest leg.
        'slots: for slot in (0..selected.len()).rev() {
            for candidate in 0..candidates.len() {
                if used[candidate] {
                    continue;
                }
                if attempts >= budget {
                    break 'slots;
                }
                attempts += 1;

                let mut trial = selected.clone();
                trial[slot] = candidate;
                let trial_odds = combined_odds(candidates, &trial)?;
                let trial_distance = band_distance(trial_odds, target);

                if trial_distance < distance {
                    debug!(
                        "Swapped leg {} for {}: {:+} -> {:+}",
                        selected[slot], candidate, odds, trial_odds
                    );
                    used[candidate] = true;
                    selected = trial;
                    odds = trial_odds;
                    distance = trial_distance;

                    if resolved.within_band(odds, target) {
                        return Ok(Selection {
                            selected,
                            attempts,
                            target_met: Some(true),
                        });
                    }
                    continue 'slots;
                }
            }
        }

        warn!(
            "Target {:+} not met after {} attempts; closest combined odds {:+}",
            target, attempts, odds
        );

        Ok(Selection {
            selected,
            attempts,
            target_met: Some(false),
        })
    }

    fn finalize(
        &self,
        candidates: &[&ScoredProp],
        mut selected: Vec<usize>,
        resolved: &ResolvedConstraints,
        target_met: Option<bool>,
    ) -> Result<Parlay> {
        selected.sort_unstable();
        let legs: Vec<ParlayLeg> = selected
            .iter()
            .map(|&i| ParlayLeg::from_scored(candidates[i]))
            .collect();

        let odds: Vec<i32> = legs.iter().map(|leg| leg.odds).collect();
        let total_odds = combine(&odds)?;
        let expected_payout = payout(total_odds, self.config.payout.reference_stake)?;
        let overall_confidence =
            legs.iter().map(|leg| leg.confidence).sum::<f64>() / legs.len() as f64;

        let tier = match resolved.tier {
            Some(tier) => tier,
            None => self.classifier.classify(overall_confidence),
        };
        if tier == Tier::Unranked {
            return Err(ParlayError::NoViableLegs(format!(
                "selected legs average {:.1} confidence, below every ranked tier",
                overall_confidence
            )));
        }

        let note = match (target_met, resolved.target_odds) {
            (Some(false), Some(target)) => Some(format!(
                "Target {:+} not exactly met; closest combination found is {:+}",
                target, total_odds
            )),
            _ => None,
        };

        let description = describe(tier, legs.len());
        Ok(Parlay::new(
            tier,
            resolved.sport,
            legs,
            total_odds,
            expected_payout,
            overall_confidence,
            description,
            note,
        ))
    }
}

struct Selection {
    selected: Vec<usize>,
    attempts: usize,
    /// `None` when no target was requested
    target_met: Option<bool>,
}

/// Total order over candidates: confidence desc, hit rate desc, recent-form
/// variance asc, then identity, price, line, side and matchup so
/// equal-scoring props never tie.
pub fn rank_order(a: &ScoredProp, b: &ScoredProp) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| b.hit_rate().total_cmp(&a.hit_rate()))
        .then_with(|| {
            a.prop
                .recent_form_variance()
                .total_cmp(&b.prop.recent_form_variance())
        })
        .then_with(|| a.key().cmp(&b.key()))
        .then_with(|| b.prop.selected_odds().cmp(&a.prop.selected_odds()))
        .then_with(|| a.prop.line.total_cmp(&b.prop.line))
        .then_with(|| a.prop.side.cmp(&b.prop.side))
        .then_with(|| a.prop.team.cmp(&b.prop.team))
        .then_with(|| a.prop.opponent.cmp(&b.prop.opponent))
}

fn combined_odds(candidates: &[&ScoredProp], selected: &[usize]) -> Result<i32> {
    let odds: Vec<i32> = selected
        .iter()
        .map(|&i| candidates[i].prop.selected_odds())
        .collect();
    combine(&odds)
}

fn anchor(parlay: &Parlay) -> Option<LegKey> {
    parlay.legs().first().map(|leg| leg.key())
}

/// True when more than `max_overlap` of the new parlay's players already
/// appear together in one accepted parlay
fn is_duplicate(parlay: &Parlay, accepted: &[Parlay], max_overlap: f64) -> bool {
    let players: HashSet<&str> = parlay.players().collect();
    if players.is_empty() {
        return false;
    }

    accepted.iter().any(|existing| {
        let existing: HashSet<&str> = existing.players().collect();
        let overlap = players.intersection(&existing).count();
        overlap as f64 / players.len() as f64 > max_overlap
    })
}

fn describe(tier: Tier, legs: usize) -> String {
    match tier {
        Tier::Goat => format!("GOAT Tier: {}-Leg Lock Parlay", legs),
        Tier::Premium => format!("Premium: High-Confidence {}-Legger", legs),
        Tier::Free | Tier::Unranked => format!("Free Play: Solid {}-Leg Value Bet", legs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::core::confidence::ConfidenceScorer;
    use crate::models::fixtures::{prop, scored};
    use crate::models::{Side, Sport};

    /// Free-tier pool: hit rates 0.85 .. 0.55 at -110, perfect recent form
    fn scenario_a_pool() -> Vec<ScoredProp> {
        let scorer = ConfidenceScorer::default();
        let hit_rates = [0.85, 0.80, 0.78, 0.75, 0.72, 0.70, 0.68, 0.65, 0.60, 0.55];
        let props: Vec<_> = hit_rates
            .iter()
            .enumerate()
            .map(|(i, &h)| {
                let mut p = prop(&format!("Player {}", i), "passing_yards", h);
                p.recent_form = vec![true; 5];
                p
            })
            .collect();
        scorer.annotate_all(&props)
    }

    fn uniform_pool(n: usize, confidence: f64, odds: i32) -> Vec<ScoredProp> {
        (0..n)
            .map(|i| {
                let mut s = scored(&format!("Player {:04}", i), "hits", 0.8, confidence);
                s.prop.over_odds = odds;
                s
            })
            .collect()
    }

    fn assert_unique_keys(parlay: &Parlay) {
        let keys: HashSet<LegKey> = parlay.legs().iter().map(|l| l.key()).collect();
        assert_eq!(keys.len(), parlay.legs().len());
    }

    #[test]
    fn test_scenario_a_free_tier() {
        let builder = ParlayBuilder::default();
        let pool = scenario_a_pool();
        let constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Free).with_legs(5, 6);

        let parlay = builder.build(&pool, &constraints).unwrap();

        assert!((5..=6).contains(&parlay.legs().len()));
        assert_eq!(parlay.tier(), Tier::Free);
        assert!(parlay.overall_confidence() >= 70.0 && parlay.overall_confidence() <= 80.0);

        // the highest-hit-rate legs, in rank order
        let hit_rates: Vec<f64> = parlay.legs().iter().map(|l| l.hit_rate()).collect();
        assert_eq!(hit_rates, vec![0.85, 0.80, 0.78, 0.75, 0.72, 0.70]);
        assert_unique_keys(&parlay);
        assert!(parlay.note().is_none());
    }

    #[test]
    fn test_scenario_b_target_odds() {
        let builder = ParlayBuilder::default();
        let pool = uniform_pool(12, 85.0, -110);
        let constraints = ConstraintSet::for_target_odds(Sport::Nfl, 2500);

        let outcome = builder.build_with_report(&pool, &constraints).unwrap();

        let odds = outcome.parlay.total_odds();
        assert!((2250..=2750).contains(&odds), "combined odds {}", odds);
        assert_eq!(outcome.target_met, Some(true));
        assert!(outcome.parlay.note().is_none());
    }

    #[test]
    fn test_target_reached_by_substitution() {
        let builder = ParlayBuilder::default();
        // strong legs priced too long, weaker legs priced right
        let mut pool = uniform_pool(5, 90.0, 150);
        for i in 0..5 {
            let mut s = scored(&format!("Backup {}", i), "hits", 0.8, 85.0);
            s.prop.over_odds = -110;
            pool.push(s);
        }
        let constraints = ConstraintSet::for_target_odds(Sport::Nfl, 2500);

        let outcome = builder.build_with_report(&pool, &constraints).unwrap();

        assert!(outcome.attempts > 0);
        assert_eq!(outcome.target_met, Some(true));
        assert!((2250..=2750).contains(&outcome.parlay.total_odds()));
        assert_unique_keys(&outcome.parlay);
    }

    #[test]
    fn test_scenario_c_insufficient_legs() {
        let builder = ParlayBuilder::default();
        let mut pool = uniform_pool(3, 85.0, -110);
        pool.extend(uniform_pool(4, 50.0, -110).into_iter().map(|mut s| {
            s.prop.player_name.push_str(" (weak)");
            s
        }));
        let constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Free).with_legs(5, 6);

        match builder.build(&pool, &constraints) {
            Err(ParlayError::InsufficientLegs { found, required }) => {
                assert_eq!(found, 3);
                assert_eq!(required, 5);
            }
            other => panic!("expected InsufficientLegs, got {:?}", other),
        }
    }

    #[test]
    fn test_scenario_d_no_viable_legs() {
        let builder = ParlayBuilder::default();
        let pool = uniform_pool(10, 60.0, -110);
        let constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Free);

        assert!(matches!(
            builder.build(&pool, &constraints),
            Err(ParlayError::NoViableLegs(_))
        ));
        assert!(matches!(
            builder.build(&[], &constraints),
            Err(ParlayError::NoViableLegs(_))
        ));
    }

    #[test]
    fn test_duplicate_keys_count_once() {
        let builder = ParlayBuilder::default();
        // five copies of one (player, prop) plus four distinct props
        let mut pool: Vec<ScoredProp> = (0..5)
            .map(|i| scored("Same Guy", "hits", 0.9, 90.0 - i as f64))
            .collect();
        pool.extend(uniform_pool(4, 80.0, -110));

        let constraints = ConstraintSet::for_tier(Sport::Mlb, Tier::Free);
        let parlay = builder.build(&pool, &constraints).unwrap();

        assert_eq!(parlay.legs().len(), 5);
        assert_unique_keys(&parlay);
        assert_eq!(parlay.legs()[0].confidence, 90.0);

        // same player, different prop type is a different leg
        let mut pool = uniform_pool(4, 80.0, -110);
        pool.push(scored("Player 0000", "home_runs", 0.8, 80.0));
        assert_eq!(builder.build(&pool, &constraints).unwrap().legs().len(), 5);
    }

    #[test]
    fn test_backtracking_cap_bounds_attempts() {
        let config = EngineConfig {
            search: SearchConfig {
                max_attempts: 200,
                ..SearchConfig::default()
            },
            ..EngineConfig::default()
        };
        let builder = ParlayBuilder::new(config);

        for pool_size in [10, 100, 1000] {
            let pool = uniform_pool(pool_size, 85.0, -110);
            // unreachable with 8 legs at -110
            let constraints = ConstraintSet::for_target_odds(Sport::Nfl, 100_000);
            let outcome = builder.build_with_report(&pool, &constraints).unwrap();

            assert!(outcome.attempts <= 200, "{} attempts", outcome.attempts);
            assert_eq!(outcome.target_met, Some(false));
            // 85 confidence earns Premium, which caps the parlay at 7 legs
            assert_eq!(outcome.parlay.tier(), Tier::Premium);
            assert_eq!(outcome.parlay.legs().len(), 7);
            assert!(outcome.parlay.note().unwrap().contains("not exactly met"));
        }

        let pool = uniform_pool(1000, 85.0, -110);
        let constraints = ConstraintSet::for_target_odds(Sport::Nfl, 100_000);
        assert_eq!(
            builder.build_with_report(&pool, &constraints).unwrap().attempts,
            200
        );
    }

    #[test]
    fn test_build_is_deterministic_across_input_order() {
        let builder = ParlayBuilder::default();
        let mut pool = uniform_pool(12, 82.0, -110);
        for (i, s) in pool.iter_mut().enumerate() {
            // pairs share confidence and hit rate; variance and name break ties
            s.confidence = 80.0 + (i / 2) as f64;
            s.prop.recent_form = vec![i % 3 == 0, true, true];
        }
        let constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Premium);

        let expected = builder.build(&pool, &constraints).unwrap();
        for shift in 1..pool.len() {
            let mut shuffled = pool.clone();
            shuffled.rotate_left(shift);
            if shift % 2 == 0 {
                shuffled.reverse();
            }
            assert_eq!(builder.build(&shuffled, &constraints).unwrap(), expected);
        }
    }

    #[test]
    fn test_rank_order_tie_breaks() {
        let mut a = scored("A", "hits", 0.8, 80.0);
        let b = scored("B", "hits", 0.7, 80.0);
        assert_eq!(rank_order(&a, &b), Ordering::Less);

        let mut c = scored("C", "hits", 0.8, 80.0);
        a.prop.recent_form = vec![true, true, true, true];
        c.prop.recent_form = vec![true, false, true, false];
        assert_eq!(rank_order(&a, &c), Ordering::Less);
        assert_eq!(rank_order(&c, &a), Ordering::Greater);

        let higher = scored("Z", "hits", 0.1, 81.0);
        assert_eq!(rank_order(&higher, &a), Ordering::Less);
    }

    #[test]
    fn test_filters_apply() {
        let builder = ParlayBuilder::default();
        let mut pool = uniform_pool(6, 85.0, -110);
        pool[0].prop.prop_type = crate::models::PropType::new("rebounds");
        pool[0].prop.hit_rate = 0.5;

        let constraints = ConstraintSet::for_tier(Sport::Nba, Tier::Premium).with_min_hit_rate(0.6);
        let parlay = builder.build(&pool, &constraints).unwrap();

        assert_eq!(parlay.legs().len(), 5);
        assert!(parlay.legs().iter().all(|l| l.hit_rate() >= 0.6));
    }

    #[test]
    fn test_leg_odds_follow_selected_side() {
        let builder = ParlayBuilder::default();
        let mut pool = uniform_pool(5, 85.0, -110);
        for s in pool.iter_mut() {
            s.prop.side = Side::Under;
            s.prop.under_odds = 120;
        }
        let constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Premium);
        let parlay = builder.build(&pool, &constraints).unwrap();

        assert!(parlay
            .legs()
            .iter()
            .all(|l| l.selection == Side::Under && l.odds == 120));
        assert_eq!(parlay.total_odds(), combine(&[120; 5]).unwrap());
    }

    #[test]
    fn test_finalize_fields() {
        let builder = ParlayBuilder::default();
        let pool = uniform_pool(8, 96.0, -110);
        let constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Goat);

        let parlay = builder.build(&pool, &constraints).unwrap();
        assert_eq!(parlay.legs().len(), 8);
        assert_eq!(parlay.total_odds(), combine(&[-110; 8]).unwrap());
        assert!((parlay.overall_confidence() - 96.0).abs() < 1e-9);
        let expected_payout = payout(parlay.total_odds(), 10.0).unwrap();
        assert!((parlay.expected_payout() - expected_payout).abs() < 1e-9);
        assert_eq!(parlay.description(), "GOAT Tier: 8-Leg Lock Parlay");

        // rebuilding from the same legs gives the same odds
        let odds: Vec<i32> = parlay.legs().iter().map(|l| l.odds).collect();
        assert_eq!(combine(&odds).unwrap(), parlay.total_odds());
    }

    #[test]
    fn test_target_without_tier_is_classified() {
        let builder = ParlayBuilder::default();
        let pool = uniform_pool(10, 85.0, -110);
        let constraints = ConstraintSet::for_target_payout(Sport::Nfl, 260.0);

        let parlay = builder.build(&pool, &constraints).unwrap();
        assert_eq!(parlay.tier(), Tier::Premium);
    }

    #[test]
    fn test_tierless_parlay_fits_earned_tier() {
        let builder = ParlayBuilder::default();
        let classifier = builder.classifier();

        for (confidence, tier, legs) in [
            (75.0, Tier::Free, 6),
            (85.0, Tier::Premium, 7),
            (96.0, Tier::Goat, 8),
        ] {
            let pool = uniform_pool(20, confidence, -110);
            let constraints = ConstraintSet::for_target_odds(Sport::Nfl, 100_000);
            let outcome = builder.build_with_report(&pool, &constraints).unwrap();
            let parlay = &outcome.parlay;

            assert_eq!(parlay.tier(), tier);
            assert_eq!(parlay.legs().len(), legs);
            assert!(parlay.legs().len() <= classifier.bounds_for(tier).unwrap().max_legs);
            assert!(outcome.attempts <= builder.config().search.max_attempts);
            assert_unique_keys(parlay);
        }
    }

    #[test]
    fn test_invalid_props_are_skipped() {
        let builder = ParlayBuilder::default();
        let mut pool = uniform_pool(7, 85.0, -110);
        pool[0].prop.over_odds = 0;
        pool[1].prop.hit_rate = 1.4;
        pool[2].prop.under_odds = 0;
        let constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Premium);

        match builder.build(&pool, &constraints) {
            Err(ParlayError::InsufficientLegs { found, required }) => {
                assert_eq!(found, 4);
                assert_eq!(required, 5);
            }
            other => panic!("expected InsufficientLegs, got {:?}", other),
        }

        pool.extend(uniform_pool(8, 82.0, -110).into_iter().skip(7));
        let parlay = builder.build(&pool, &constraints).unwrap();
        assert_eq!(parlay.legs().len(), 5);
        assert!(parlay.legs().iter().all(|l| l.prop.validate().is_ok()));
    }

    #[test]
    fn test_same_key_tie_broken_by_side() {
        let builder = ParlayBuilder::default();
        let mut over = scored("Same Guy", "hits", 0.8, 90.0);
        over.prop.side = Side::Over;
        let mut under = over.clone();
        under.prop.side = Side::Under;
        assert_eq!(rank_order(&over, &under), Ordering::Less);

        let constraints = ConstraintSet::for_tier(Sport::Mlb, Tier::Free);
        let mut pool = uniform_pool(4, 80.0, -110);
        pool.push(under);
        pool.push(over);
        let forward = builder.build(&pool, &constraints).unwrap();
        pool.reverse();
        let backward = builder.build(&pool, &constraints).unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward.legs()[0].selection, Side::Over);
    }

    #[test]
    fn test_build_slate_is_deduplicated() {
        let builder = ParlayBuilder::default();
        let pool = uniform_pool(30, 85.0, -110);
        let constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Premium);

        let slate = builder.build_slate(&pool, &constraints, 3).unwrap();
        assert_eq!(slate.len(), 3);

        for (i, a) in slate.iter().enumerate() {
            assert_unique_keys(a);
            for b in &slate[i + 1..] {
                let pa: HashSet<&str> = a.players().collect();
                let pb: HashSet<&str> = b.players().collect();
                let overlap = pa.intersection(&pb).count() as f64 / pb.len() as f64;
                assert!(overlap <= 0.6, "overlap {}", overlap);
            }
        }
    }

    #[test]
    fn test_build_slate_small_pool() {
        let builder = ParlayBuilder::default();
        let pool = uniform_pool(7, 85.0, -110);
        let constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Premium);

        let slate = builder.build_slate(&pool, &constraints, 5).unwrap();
        assert_eq!(slate.len(), 1);

        assert!(builder.build_slate(&pool[..2], &constraints, 5).is_err());
        assert!(builder.build_slate(&pool, &constraints, 0).unwrap().is_empty());
    }

    #[test]
    fn test_is_duplicate() {
        let builder = ParlayBuilder::default();
        let pool = uniform_pool(10, 85.0, -110);
        let constraints = ConstraintSet::for_tier(Sport::Nfl, Tier::Free);
        let a = builder.build(&pool, &constraints).unwrap();

        assert!(is_duplicate(&a, &[a.clone()], 0.6));
        assert!(!is_duplicate(&a, &[], 0.6));
    }
}
