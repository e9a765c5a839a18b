//! Pairwise drug-drug interaction detection.
//!
//! Every unordered ingredient pair is pushed through the resolution
//! cascade: the exact rule table first, the therapeutic-class fallback
//! second, embedding similarity last. The first tier that answers wins;
//! a pair no tier can place yields no finding at all.

pub mod tiers;

use std::collections::BTreeSet;

use crate::models::InteractionFinding;
use crate::rules::RuleSnapshot;
use tiers::{ClassTier, ExactTier, ResolutionStrategy, SimilarityTier};

pub struct InteractionResolver<'a> {
    snapshot: &'a RuleSnapshot,
    cascade: [&'a dyn ResolutionStrategy; 3],
}

static EXACT: ExactTier = ExactTier;
static CLASS: ClassTier = ClassTier;
static SIMILARITY: SimilarityTier = SimilarityTier;

impl<'a> InteractionResolver<'a> {
    pub fn new(snapshot: &'a RuleSnapshot) -> Self {
        Self {
            snapshot,
            cascade: [&EXACT, &CLASS, &SIMILARITY],
        }
    }

    /// Resolve one unordered pair. Symmetric in its arguments; an
    /// ingredient paired with itself never interacts.
    pub fn resolve_pair(&self, a: &str, b: &str) -> Option<InteractionFinding> {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();
        if a.is_empty() || b.is_empty() || a == b {
            return None;
        }
        for tier in &self.cascade {
            if let Some(finding) = tier.try_resolve(self.snapshot, &a, &b) {
                tracing::debug!(
                    pair = %finding.pair_label(),
                    tier = ?finding.tier,
                    severity = %finding.severity,
                    confidence = finding.confidence,
                    "interaction resolved"
                );
                return Some(finding);
            }
        }
        None
    }

    /// Resolve every pair of the ingredient set. Findings come back
    /// sorted by severity descending, then pair label ascending, so the
    /// same input always produces the same output order.
    pub fn resolve_all(&self, ingredients: &BTreeSet<String>) -> Vec<InteractionFinding> {
        let list: Vec<&String> = ingredients.iter().collect();
        let mut findings = Vec::new();
        for (i, a) in list.iter().enumerate() {
            for b in &list[i + 1..] {
                if let Some(finding) = self.resolve_pair(a, b) {
                    findings.push(finding);
                }
            }
        }
        findings.sort_by(|x, y| {
            y.severity
                .cmp(&x.severity)
                .then_with(|| x.pair_label().cmp(&y.pair_label()))
        });
        findings
    }
}
