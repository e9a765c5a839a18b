//! Immutable rule tables with hot reload.
//!
//! A [`RuleSnapshot`] is built once (by the external catalog loader or
//! from the [`builtin`] seed tables) and never mutated afterwards.
//! [`RuleStore`] hands out `Arc` handles to the current snapshot:
//! in-flight validations keep reading the snapshot they started with,
//! and `install` swaps in a replacement atomically — readers see either
//! the old tables or the new ones, never a partial mix.

pub mod builtin;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{ChildPugh, ContraSeverity, Severity};

// ═══════════════════════════════════════════════════════════════════
// Keys and rule records
// ═══════════════════════════════════════════════════════════════════

/// Unordered pair of ingredient names or class tokens, normalized to
/// lowercase and stored in lexicographic order so `(a, b)` and
/// `(b, a)` hash identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }
}

/// A DDI rule record, used by both the exact ingredient-pair table and
/// the class-level fallback table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRule {
    pub pair: PairKey,
    pub severity: Severity,
    pub mechanism: String,
    pub clinical_effect: String,
    pub management: String,
    /// 1 (label/trial) to 4 (theoretical).
    pub evidence_level: u8,
    pub source: String,
}

/// Renal dosing rule. Applies when the patient's GFR falls in
/// `[gfr_min, gfr_max)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenalRule {
    pub generic_name: String,
    pub gfr_min: f64,
    /// Exclusive upper bound; `f64::INFINITY` for unbounded.
    pub gfr_max: f64,
    pub adjusted_dose: String,
    pub reason: String,
    pub monitoring_required: bool,
    pub monitoring_parameters: Vec<String>,
    pub contraindicated: bool,
    pub source: String,
}

impl RenalRule {
    pub fn applies_to(&self, gfr: f64) -> bool {
        gfr >= self.gfr_min && gfr < self.gfr_max
    }
}

/// Hepatic dosing rule, keyed by Child-Pugh class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HepaticRule {
    pub generic_name: String,
    pub child_pugh: ChildPugh,
    pub adjusted_dose: String,
    pub reason: String,
    pub monitoring_required: bool,
    pub monitoring_parameters: Vec<String>,
    pub contraindicated: bool,
    pub source: String,
}

/// Condition-based contraindication rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContraindicationRule {
    pub generic_name: String,
    pub condition: String,
    pub severity: ContraSeverity,
    pub reason: String,
    pub alternatives: Vec<String>,
}

// ═══════════════════════════════════════════════════════════════════
// Snapshot
// ═══════════════════════════════════════════════════════════════════

/// Read-only, fully indexed rule tables. Shared across threads behind
/// an `Arc`; one validation only ever reads one snapshot.
#[derive(Debug, Default)]
pub struct RuleSnapshot {
    version: String,
    exact: HashMap<PairKey, InteractionRule>,
    class_rules: HashMap<PairKey, Vec<InteractionRule>>,
    classes: HashMap<String, Vec<String>>,
    renal: HashMap<String, Vec<RenalRule>>,
    hepatic: HashMap<String, Vec<HepaticRule>>,
    contraindications: HashMap<String, Vec<ContraindicationRule>>,
    embeddings: HashMap<String, Vec<f64>>,
}

impl RuleSnapshot {
    pub fn builder(version: impl Into<String>) -> RuleSnapshotBuilder {
        RuleSnapshotBuilder {
            version: version.into(),
            exact: Vec::new(),
            class_rules: Vec::new(),
            classes: HashMap::new(),
            renal: Vec::new(),
            hepatic: Vec::new(),
            contraindications: Vec::new(),
            embeddings: HashMap::new(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Exact ingredient-pair rule, if any. At most one per pair.
    pub fn exact_rule(&self, pair: &PairKey) -> Option<&InteractionRule> {
        self.exact.get(pair)
    }

    /// All exact rules, for the similarity tier's analogue search.
    pub fn exact_rules(&self) -> impl Iterator<Item = &InteractionRule> {
        self.exact.values()
    }

    /// Class-level rules for a token pair. A class-token pair may match
    /// many ingredient pairs.
    pub fn class_rules_for(&self, pair: &PairKey) -> &[InteractionRule] {
        self.class_rules.get(pair).map_or(&[], Vec::as_slice)
    }

    /// Therapeutic/pharmacologic class tokens of an ingredient.
    pub fn classes_of(&self, ingredient: &str) -> &[String] {
        self.classes
            .get(&ingredient.to_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    pub fn renal_rules(&self, generic_name: &str) -> &[RenalRule] {
        self.renal
            .get(&generic_name.to_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    pub fn hepatic_rule(&self, generic_name: &str, class: ChildPugh) -> Option<&HepaticRule> {
        self.hepatic
            .get(&generic_name.to_lowercase())?
            .iter()
            .find(|r| r.child_pugh == class)
    }

    pub fn contraindication_rules(&self, generic_name: &str) -> &[ContraindicationRule] {
        self.contraindications
            .get(&generic_name.to_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Precomputed similarity vector for an ingredient, if known.
    pub fn embedding(&self, ingredient: &str) -> Option<&[f64]> {
        self.embeddings
            .get(&ingredient.to_lowercase())
            .map(Vec::as_slice)
    }

    pub fn rule_counts(&self) -> (usize, usize, usize, usize, usize) {
        (
            self.exact.len(),
            self.class_rules.values().map(Vec::len).sum(),
            self.renal.values().map(Vec::len).sum(),
            self.hepatic.values().map(Vec::len).sum(),
            self.contraindications.values().map(Vec::len).sum(),
        )
    }
}

/// Accumulates rule records and builds the indexed snapshot.
///
/// The builder enforces the exact-table invariant: at most one rule per
/// unordered ingredient pair. A duplicate is dropped with a warning,
/// keeping the first-loaded rule, so one bad catalog row does not fail
/// an otherwise usable load.
#[derive(Debug)]
pub struct RuleSnapshotBuilder {
    version: String,
    exact: Vec<InteractionRule>,
    class_rules: Vec<InteractionRule>,
    classes: HashMap<String, Vec<String>>,
    renal: Vec<RenalRule>,
    hepatic: Vec<HepaticRule>,
    contraindications: Vec<ContraindicationRule>,
    embeddings: HashMap<String, Vec<f64>>,
}

impl RuleSnapshotBuilder {
    pub fn exact_rule(mut self, rule: InteractionRule) -> Self {
        self.exact.push(rule);
        self
    }

    pub fn class_rule(mut self, rule: InteractionRule) -> Self {
        self.class_rules.push(rule);
        self
    }

    pub fn ingredient_class(mut self, ingredient: &str, class: &str) -> Self {
        self.classes
            .entry(ingredient.trim().to_lowercase())
            .or_default()
            .push(class.trim().to_lowercase());
        self
    }

    pub fn renal_rule(mut self, rule: RenalRule) -> Self {
        self.renal.push(rule);
        self
    }

    pub fn hepatic_rule(mut self, rule: HepaticRule) -> Self {
        self.hepatic.push(rule);
        self
    }

    pub fn contraindication(mut self, rule: ContraindicationRule) -> Self {
        self.contraindications.push(rule);
        self
    }

    pub fn embedding(mut self, ingredient: &str, vector: Vec<f64>) -> Self {
        self.embeddings
            .insert(ingredient.trim().to_lowercase(), vector);
        self
    }

    pub fn build(self) -> RuleSnapshot {
        let mut exact: HashMap<PairKey, InteractionRule> = HashMap::new();
        for rule in self.exact {
            let key = rule.pair.clone();
            if let Some(existing) = exact.get(&key) {
                tracing::warn!(
                    pair = %format!("{} + {}", key.first(), key.second()),
                    kept_source = %existing.source,
                    dropped_source = %rule.source,
                    "Duplicate exact DDI rule dropped"
                );
                continue;
            }
            exact.insert(key, rule);
        }

        let mut class_rules: HashMap<PairKey, Vec<InteractionRule>> = HashMap::new();
        for rule in self.class_rules {
            class_rules.entry(rule.pair.clone()).or_default().push(rule);
        }

        let mut renal: HashMap<String, Vec<RenalRule>> = HashMap::new();
        for rule in self.renal {
            renal
                .entry(rule.generic_name.to_lowercase())
                .or_default()
                .push(rule);
        }

        let mut hepatic: HashMap<String, Vec<HepaticRule>> = HashMap::new();
        for rule in self.hepatic {
            hepatic
                .entry(rule.generic_name.to_lowercase())
                .or_default()
                .push(rule);
        }

        let mut contraindications: HashMap<String, Vec<ContraindicationRule>> = HashMap::new();
        for rule in self.contraindications {
            contraindications
                .entry(rule.generic_name.to_lowercase())
                .or_default()
                .push(rule);
        }

        let snapshot = RuleSnapshot {
            version: self.version,
            exact,
            class_rules,
            classes: self.classes,
            renal,
            hepatic,
            contraindications,
            embeddings: self.embeddings,
        };

        let (exact_n, class_n, renal_n, hepatic_n, contra_n) = snapshot.rule_counts();
        tracing::info!(
            version = %snapshot.version,
            exact = exact_n,
            class = class_n,
            renal = renal_n,
            hepatic = hepatic_n,
            contraindication = contra_n,
            embeddings = snapshot.embeddings.len(),
            "Rule snapshot built"
        );
        snapshot
    }
}

// ═══════════════════════════════════════════════════════════════════
// Store
// ═══════════════════════════════════════════════════════════════════

/// Versioned handle to the current rule snapshot.
///
/// Readers clone the `Arc` once per validation; `install` replaces the
/// handle under a short write lock. No reader ever blocks another, and
/// a reload is never observable mid-update.
#[derive(Debug, Default)]
pub struct RuleStore {
    current: RwLock<Option<Arc<RuleSnapshot>>>,
}

impl RuleStore {
    /// A store with no snapshot; `snapshot()` fails until `install`.
    pub fn empty() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    pub fn new(snapshot: RuleSnapshot) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(snapshot))),
        }
    }

    /// Atomically replace the active snapshot.
    pub fn install(&self, snapshot: RuleSnapshot) {
        let version = snapshot.version().to_string();
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Arc::new(snapshot));
        tracing::info!(version = %version, "Rule snapshot installed");
    }

    /// Handle to the current snapshot, or `RuleStoreUnavailable` when
    /// nothing has been installed yet.
    pub fn snapshot(&self) -> Result<Arc<RuleSnapshot>, EngineError> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(EngineError::RuleStoreUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(a: &str, b: &str, severity: Severity, source: &str) -> InteractionRule {
        InteractionRule {
            pair: PairKey::new(a, b),
            severity,
            mechanism: "test mechanism".into(),
            clinical_effect: "test effect".into(),
            management: "test management".into(),
            evidence_level: 1,
            source: source.into(),
        }
    }

    #[test]
    fn pair_key_is_order_insensitive() {
        assert_eq!(PairKey::new("warfarin", "aspirin"), PairKey::new("aspirin", "warfarin"));
        assert_eq!(PairKey::new("Warfarin ", "ASPIRIN").first(), "aspirin");
    }

    #[test]
    fn duplicate_exact_rule_keeps_first() {
        let snapshot = RuleSnapshot::builder("t1")
            .exact_rule(rule("a", "b", Severity::Major, "first"))
            .exact_rule(rule("b", "a", Severity::Minor, "second"))
            .build();
        let kept = snapshot.exact_rule(&PairKey::new("a", "b")).unwrap();
        assert_eq!(kept.source, "first");
        assert_eq!(kept.severity, Severity::Major);
    }

    #[test]
    fn class_rules_accumulate_per_pair() {
        let snapshot = RuleSnapshot::builder("t2")
            .class_rule(rule("nsaid", "lithium", Severity::Major, "s1"))
            .class_rule(rule("lithium", "nsaid", Severity::Moderate, "s2"))
            .build();
        assert_eq!(snapshot.class_rules_for(&PairKey::new("nsaid", "lithium")).len(), 2);
    }

    #[test]
    fn empty_store_reports_unavailable() {
        let store = RuleStore::empty();
        assert!(matches!(store.snapshot(), Err(EngineError::RuleStoreUnavailable)));
    }

    #[test]
    fn install_swaps_snapshot_without_disturbing_readers() {
        let store = RuleStore::new(RuleSnapshot::builder("v1").build());
        let held = store.snapshot().unwrap();
        store.install(RuleSnapshot::builder("v2").build());
        // In-flight reader keeps the snapshot it started with.
        assert_eq!(held.version(), "v1");
        assert_eq!(store.snapshot().unwrap().version(), "v2");
    }

    #[test]
    fn renal_rule_range_lower_inclusive_upper_exclusive() {
        let r = RenalRule {
            generic_name: "metformin".into(),
            gfr_min: 30.0,
            gfr_max: 45.0,
            adjusted_dose: String::new(),
            reason: String::new(),
            monitoring_required: false,
            monitoring_parameters: vec![],
            contraindicated: true,
            source: String::new(),
        };
        assert!(r.applies_to(30.0));
        assert!(r.applies_to(44.9));
        assert!(!r.applies_to(45.0));
        assert!(!r.applies_to(29.9));
    }

    #[test]
    fn lookups_are_case_insensitive() {
        let snapshot = RuleSnapshot::builder("t3")
            .ingredient_class("Ibuprofen", "NSAID")
            .embedding("Warfarin", vec![1.0, 0.0])
            .build();
        assert_eq!(snapshot.classes_of("IBUPROFEN"), ["nsaid"]);
        assert!(snapshot.embedding("warfarin").is_some());
    }
}
