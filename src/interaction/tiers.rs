//! The three resolution tiers of the interaction cascade.
//!
//! Each tier is a [`ResolutionStrategy`]; the resolver tries them in
//! strict priority order (exact, then class, then similarity) and the
//! first tier that produces a finding wins outright.

use std::cmp::Ordering;

use crate::config::{CLASS_FALLBACK_CONFIDENCE, SIMILARITY_EVIDENCE_LEVEL, SIMILARITY_FLOOR};
use crate::models::{InteractionFinding, ResolutionTier};
use crate::rules::{InteractionRule, PairKey, RuleSnapshot};

pub trait ResolutionStrategy {
    fn try_resolve(
        &self,
        snapshot: &RuleSnapshot,
        a: &str,
        b: &str,
    ) -> Option<InteractionFinding>;
}

/// Rank rules within a tier: highest severity first, then strongest
/// evidence (level 1 beats level 2), then lexicographically first
/// source, then the rule's own pair key. The pair key makes the order
/// total over distinct rules, so candidate selection never depends on
/// hash-map iteration order.
pub(crate) fn rule_priority(x: &InteractionRule, y: &InteractionRule) -> Ordering {
    y.severity
        .cmp(&x.severity)
        .then_with(|| x.evidence_level.cmp(&y.evidence_level))
        .then_with(|| x.source.cmp(&y.source))
        .then_with(|| x.pair.cmp(&y.pair))
}

fn finding_from_rule(
    key: &PairKey,
    rule: &InteractionRule,
    tier: ResolutionTier,
    confidence: f64,
) -> InteractionFinding {
    InteractionFinding {
        ingredient_a: key.first().to_string(),
        ingredient_b: key.second().to_string(),
        severity: rule.severity,
        mechanism: rule.mechanism.clone(),
        clinical_effect: rule.clinical_effect.clone(),
        management: rule.management.clone(),
        evidence_level: rule.evidence_level,
        source: rule.source.clone(),
        confidence,
        tier,
        unconfirmed: false,
    }
}

/// Tier 1: verbatim lookup in the exact ingredient-pair table.
pub struct ExactTier;

impl ResolutionStrategy for ExactTier {
    fn try_resolve(
        &self,
        snapshot: &RuleSnapshot,
        a: &str,
        b: &str,
    ) -> Option<InteractionFinding> {
        let key = PairKey::new(a, b);
        let rule = snapshot.exact_rule(&key)?;
        Some(finding_from_rule(&key, rule, ResolutionTier::Exact, 1.0))
    }
}

/// Tier 2: therapeutic-class fallback.
///
/// Each ingredient contributes its class tokens plus its own name; the
/// class-rule table is probed with every cross pairing of the two token
/// sets. Severity is reported as the class rule states it, with no
/// downgrade.
pub struct ClassTier;

impl ResolutionStrategy for ClassTier {
    fn try_resolve(
        &self,
        snapshot: &RuleSnapshot,
        a: &str,
        b: &str,
    ) -> Option<InteractionFinding> {
        let tokens_a = tokens_for(snapshot, a);
        let tokens_b = tokens_for(snapshot, b);
        let raw = PairKey::new(a, b);

        let mut best: Option<&InteractionRule> = None;
        for ta in &tokens_a {
            for tb in &tokens_b {
                let key = PairKey::new(ta, tb);
                for rule in snapshot.class_rules_for(&key) {
                    let better = match best {
                        Some(current) => rule_priority(rule, current) == Ordering::Less,
                        None => true,
                    };
                    if better {
                        best = Some(rule);
                    }
                }
            }
        }

        let rule = best?;
        Some(finding_from_rule(
            &raw,
            rule,
            ResolutionTier::Class,
            CLASS_FALLBACK_CONFIDENCE,
        ))
    }
}

fn tokens_for(snapshot: &RuleSnapshot, ingredient: &str) -> Vec<String> {
    let normalized = ingredient.trim().to_lowercase();
    let mut tokens = snapshot.classes_of(&normalized).to_vec();
    tokens.push(normalized);
    tokens
}

/// Tier 3: similarity synthesis against the nearest known exact rule.
///
/// The analogue is the exact rule maximizing the best-orientation score
/// `min(cos(a, p), cos(b, q))` over both pair orientations, with the
/// score required to clear the similarity floor. The synthesized
/// finding is downgraded one severity level from its analogue, capped
/// at `Minor`, and always flagged unconfirmed.
pub struct SimilarityTier;

impl ResolutionStrategy for SimilarityTier {
    fn try_resolve(
        &self,
        snapshot: &RuleSnapshot,
        a: &str,
        b: &str,
    ) -> Option<InteractionFinding> {
        let key = PairKey::new(a, b);
        let va = snapshot.embedding(key.first())?;
        let vb = snapshot.embedding(key.second())?;

        let mut best: Option<(f64, &InteractionRule)> = None;
        for rule in snapshot.exact_rules() {
            let vp = match snapshot.embedding(rule.pair.first()) {
                Some(v) => v,
                None => continue,
            };
            let vq = match snapshot.embedding(rule.pair.second()) {
                Some(v) => v,
                None => continue,
            };
            let forward = pair_score(va, vp, vb, vq);
            let crossed = pair_score(va, vq, vb, vp);
            let score = match (forward, crossed) {
                (Some(f), Some(c)) => f.max(c),
                (Some(f), None) => f,
                (None, Some(c)) => c,
                (None, None) => continue,
            };
            if score < SIMILARITY_FLOOR {
                continue;
            }
            let better = match best {
                Some((best_score, best_rule)) => {
                    score > best_score
                        || (score == best_score
                            && rule_priority(rule, best_rule) == Ordering::Less)
                }
                None => true,
            };
            if better {
                best = Some((score, rule));
            }
        }

        let (score, analogue) = best?;
        let severity = analogue.severity.downgraded();
        Some(InteractionFinding {
            ingredient_a: key.first().to_string(),
            ingredient_b: key.second().to_string(),
            severity,
            mechanism: format!(
                "Possible interaction by analogy with {} + {}: {}",
                analogue.pair.first(),
                analogue.pair.second(),
                analogue.mechanism
            ),
            clinical_effect: analogue.clinical_effect.clone(),
            management: format!(
                "Unconfirmed finding; clinical review required. Reference management: {}",
                analogue.management
            ),
            evidence_level: SIMILARITY_EVIDENCE_LEVEL,
            source: format!("similarity:{}", analogue.source),
            confidence: score.clamp(0.0, 1.0),
            tier: ResolutionTier::Similarity,
            unconfirmed: true,
        })
    }
}

/// `min(cos(a, p), cos(b, q))` for one orientation, `None` when either
/// cosine is undefined (zero-magnitude vector).
fn pair_score(va: &[f64], vp: &[f64], vb: &[f64], vq: &[f64]) -> Option<f64> {
    Some(cosine(va, vp)?.min(cosine(vb, vq)?))
}

/// Cosine similarity; `None` for mismatched dimensions or a zero vector.
pub fn cosine(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.is_empty() {
        return None;
    }
    let mut dot = 0.0;
    let mut nx = 0.0;
    let mut ny = 0.0;
    for (a, b) in x.iter().zip(y) {
        dot += a * b;
        nx += a * a;
        ny += b * b;
    }
    if nx == 0.0 || ny == 0.0 {
        return None;
    }
    Some(dot / (nx.sqrt() * ny.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use crate::rules::RuleSnapshot;

    fn rule(a: &str, b: &str, severity: Severity, evidence: u8, source: &str) -> InteractionRule {
        InteractionRule {
            pair: PairKey::new(a, b),
            severity,
            mechanism: "mechanism".into(),
            clinical_effect: "effect".into(),
            management: "management".into(),
            evidence_level: evidence,
            source: source.into(),
        }
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine(&[1.0, 0.0], &[1.0, 0.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!(cosine(&[1.0, 0.0], &[0.0, 1.0]).unwrap().abs() < 1e-12);
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), None);
        assert_eq!(cosine(&[1.0], &[1.0, 0.0]), None);
    }

    #[test]
    fn rule_priority_orders_by_severity_then_evidence_then_source() {
        let major = rule("a", "b", Severity::Major, 3, "zzz");
        let moderate = rule("a", "b", Severity::Moderate, 1, "aaa");
        assert_eq!(rule_priority(&major, &moderate), Ordering::Less);

        let strong = rule("a", "b", Severity::Major, 1, "zzz");
        assert_eq!(rule_priority(&strong, &major), Ordering::Less);

        let early_source = rule("a", "b", Severity::Major, 3, "aaa");
        assert_eq!(rule_priority(&early_source, &major), Ordering::Less);
    }

    #[test]
    fn exact_tier_has_full_confidence() {
        let snapshot = RuleSnapshot::builder("t")
            .exact_rule(rule("warfarin", "aspirin", Severity::Major, 1, "kb"))
            .build();
        let finding = ExactTier.try_resolve(&snapshot, "aspirin", "warfarin").unwrap();
        assert_eq!(finding.confidence, 1.0);
        assert_eq!(finding.tier, ResolutionTier::Exact);
        assert!(!finding.unconfirmed);
        assert_eq!(finding.ingredient_a, "aspirin");
    }

    #[test]
    fn class_tier_keeps_rule_severity_and_uses_fixed_confidence() {
        let snapshot = RuleSnapshot::builder("t")
            .class_rule(rule("warfarin", "nsaid", Severity::Major, 1, "formulary"))
            .ingredient_class("ibuprofen", "nsaid")
            .build();
        let finding = ClassTier.try_resolve(&snapshot, "warfarin", "ibuprofen").unwrap();
        assert_eq!(finding.severity, Severity::Major);
        assert_eq!(finding.confidence, CLASS_FALLBACK_CONFIDENCE);
        assert_eq!(finding.tier, ResolutionTier::Class);
        assert_eq!(finding.ingredient_a, "ibuprofen");
    }

    #[test]
    fn similarity_below_floor_yields_nothing() {
        // Orthogonal vectors: every pairing scores 0.0, under the floor.
        let snapshot = RuleSnapshot::builder("t")
            .exact_rule(rule("p", "q", Severity::Major, 1, "kb"))
            .embedding("p", vec![1.0, 0.0, 0.0, 0.0])
            .embedding("q", vec![0.0, 1.0, 0.0, 0.0])
            .embedding("a", vec![0.0, 0.0, 1.0, 0.0])
            .embedding("b", vec![0.0, 0.0, 0.0, 1.0])
            .build();
        assert!(SimilarityTier.try_resolve(&snapshot, "a", "b").is_none());
    }

    #[test]
    fn similarity_downgrades_one_level_and_flags_unconfirmed() {
        let snapshot = RuleSnapshot::builder("t")
            .exact_rule(rule("p", "q", Severity::Major, 1, "kb"))
            .embedding("p", vec![1.0, 0.0])
            .embedding("q", vec![0.0, 1.0])
            .embedding("a", vec![1.0, 0.1])
            .embedding("b", vec![0.1, 1.0])
            .build();
        let finding = SimilarityTier.try_resolve(&snapshot, "a", "b").unwrap();
        assert_eq!(finding.severity, Severity::Moderate);
        assert!(finding.unconfirmed);
        assert_eq!(finding.tier, ResolutionTier::Similarity);
        assert_eq!(finding.evidence_level, SIMILARITY_EVIDENCE_LEVEL);
        assert!(finding.confidence >= SIMILARITY_FLOOR && finding.confidence < 1.0);
    }

    #[test]
    fn similarity_analogue_tie_breaks_on_pair_key() {
        // Two analogue rules with identical severity, evidence, and
        // source, and identical embeddings everywhere, so both score
        // exactly 1.0. The lexicographically first pair must win, no
        // matter the table's iteration order.
        let shared = vec![0.6, 0.8];
        let snapshot = RuleSnapshot::builder("t")
            .exact_rule(rule("p", "q", Severity::Major, 2, "kb"))
            .exact_rule(rule("r", "s", Severity::Major, 2, "kb"))
            .embedding("p", shared.clone())
            .embedding("q", shared.clone())
            .embedding("r", shared.clone())
            .embedding("s", shared.clone())
            .embedding("a", shared.clone())
            .embedding("b", shared)
            .build();
        for _ in 0..8 {
            let finding = SimilarityTier.try_resolve(&snapshot, "a", "b").unwrap();
            assert!(finding.mechanism.contains("p + q"), "{}", finding.mechanism);
        }
    }

    #[test]
    fn similarity_without_embeddings_yields_nothing() {
        let snapshot = RuleSnapshot::builder("t")
            .exact_rule(rule("p", "q", Severity::Major, 1, "kb"))
            .build();
        assert!(SimilarityTier.try_resolve(&snapshot, "a", "b").is_none());
    }
}
