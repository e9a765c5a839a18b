//! Core data model for prescription validation.
//!
//! Everything here is plain data: constructed per validation request,
//! never mutated after the engine returns it. Rule types live in
//! [`crate::rules`]; this module holds the patient-facing shapes.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pharmaceutical dosage form, parsed upstream from the drug catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DosageForm {
    Tablet,
    Capsule,
    Syrup,
    Injection,
    Ampoule,
    Cream,
    Gel,
    Ointment,
    Drop,
    Suspension,
    Solution,
    Suppository,
    Inhaler,
    Patch,
    Powder,
    #[default]
    Other,
}

/// Interaction severity. Variant order gives the total order used for
/// ranking: `Major > Moderate > Minor > Unknown`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Unknown,
    Minor,
    Moderate,
    Major,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Major => "major",
            Severity::Moderate => "moderate",
            Severity::Minor => "minor",
            Severity::Unknown => "unknown",
        }
    }

    /// One severity level below `self`. Bottoms out at `Minor`; an
    /// `Unknown` severity stays unknown rather than being promoted.
    pub fn downgraded(self) -> Severity {
        match self {
            Severity::Major => Severity::Moderate,
            Severity::Moderate | Severity::Minor => Severity::Minor,
            Severity::Unknown => Severity::Unknown,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renal function stage. Boundaries are inclusive on the lower bound,
/// exclusive on the upper bound; `Normal` is unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenalStage {
    /// GFR ≥ 90 mL/min.
    Normal,
    /// GFR 60–89 mL/min.
    Mild,
    /// GFR 30–59 mL/min.
    Moderate,
    /// GFR 15–29 mL/min.
    Severe,
    /// GFR < 15 mL/min.
    Failure,
}

impl RenalStage {
    pub fn from_gfr(gfr: f64) -> RenalStage {
        if gfr >= 90.0 {
            RenalStage::Normal
        } else if gfr >= 60.0 {
            RenalStage::Mild
        } else if gfr >= 30.0 {
            RenalStage::Moderate
        } else if gfr >= 15.0 {
            RenalStage::Severe
        } else {
            RenalStage::Failure
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RenalStage::Normal => "normal",
            RenalStage::Mild => "mild",
            RenalStage::Moderate => "moderate",
            RenalStage::Severe => "severe",
            RenalStage::Failure => "failure",
        }
    }
}

impl fmt::Display for RenalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Child-Pugh hepatic impairment class (A mild, B moderate, C severe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChildPugh {
    A,
    B,
    C,
}

impl fmt::Display for ChildPugh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildPugh::A => f.write_str("A"),
            ChildPugh::B => f.write_str("B"),
            ChildPugh::C => f.write_str("C"),
        }
    }
}

/// Biological sex, as used by the Cockcroft-Gault formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// A medication product from the external registry. Immutable once loaded.
///
/// A combination product carries more than one active ingredient;
/// every product carries at least one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: String,
    pub generic_name: String,
    pub active_ingredients: Vec<String>,
    #[serde(default)]
    pub dosage_form: DosageForm,
    #[serde(default)]
    pub is_otc: bool,
    #[serde(default)]
    pub is_controlled: bool,
    #[serde(default)]
    pub is_high_alert: bool,
}

/// Patient information for one validation request. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientContext {
    pub age: u32,
    pub weight_kg: f64,
    pub sex: Sex,
    /// Serum creatinine in mg/dL, used to estimate GFR when no
    /// explicit value is supplied.
    #[serde(default)]
    pub serum_creatinine: Option<f64>,
    /// Explicit GFR in mL/min. When present it is used verbatim and
    /// the Cockcroft-Gault estimate is never computed.
    #[serde(default)]
    pub gfr: Option<f64>,
    #[serde(default)]
    pub child_pugh: Option<ChildPugh>,
    /// Condition codes, e.g. "diabetes", "pregnancy", "asthma".
    /// Ordered set so downstream output is reproducible.
    #[serde(default)]
    pub conditions: BTreeSet<String>,
}

impl PatientContext {
    pub fn new(age: u32, weight_kg: f64, sex: Sex) -> Self {
        Self {
            age,
            weight_kg,
            sex,
            serum_creatinine: None,
            gfr: None,
            child_pugh: None,
            conditions: BTreeSet::new(),
        }
    }

    pub fn has_condition(&self, code: &str) -> bool {
        self.conditions.contains(code)
    }
}

/// One line of a prescription. Order is preserved for output stability
/// but carries no detection semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionItem {
    pub medication_id: String,
    pub dose: String,
    pub frequency: String,
}

/// Which tier of the resolution cascade produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    /// Verbatim match in the exact ingredient-pair table.
    Exact,
    /// Therapeutic-class fallback rule.
    Class,
    /// Embedding-similarity synthesis. Always unconfirmed.
    Similarity,
}

/// A detected drug-drug interaction for one unordered ingredient pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionFinding {
    /// Lexicographically first ingredient of the pair.
    pub ingredient_a: String,
    pub ingredient_b: String,
    pub severity: Severity,
    pub mechanism: String,
    pub clinical_effect: String,
    pub management: String,
    /// 1 (strongest, trial evidence) to 4 (weakest, theoretical).
    pub evidence_level: u8,
    pub source: String,
    /// 1.0 for exact rules, 0.7 for class fallback, the similarity
    /// score for synthesized findings.
    pub confidence: f64,
    pub tier: ResolutionTier,
    /// Similarity-derived findings require mandatory clinical review.
    pub unconfirmed: bool,
}

impl InteractionFinding {
    /// "warfarin + aspirin" — the stable label used in ordering,
    /// warnings, and recommendations.
    pub fn pair_label(&self) -> String {
        format!("{} + {}", self.ingredient_a, self.ingredient_b)
    }
}

/// Renal or hepatic context a dose adjustment was matched against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImpairmentKind {
    Renal { stage: RenalStage, gfr: f64 },
    Hepatic { child_pugh: ChildPugh },
}

/// One dose-adjustment directive from a renal or hepatic rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseAdjustment {
    pub impairment: ImpairmentKind,
    pub adjusted_dose: String,
    pub reason: String,
    pub monitoring_required: bool,
    pub monitoring_parameters: Vec<String>,
    pub contraindicated: bool,
    pub source: String,
}

/// Absolute contraindications block the medication; relative ones are
/// surfaced as warnings only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ContraSeverity {
    Relative,
    Absolute,
}

/// A condition-based contraindication matched for one medication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContraindicationFinding {
    pub medication_name: String,
    pub condition: String,
    pub severity: ContraSeverity,
    pub reason: String,
    pub alternatives: Vec<String>,
}

/// Dosing guidance for one medication. Empty advice means "no special
/// dosing guidance available", which is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosingAdvice {
    pub medication_id: String,
    pub medication_name: String,
    /// Renal and hepatic directives are separate entries, never merged.
    pub adjustments: Vec<DoseAdjustment>,
    pub contraindications: Vec<ContraindicationFinding>,
    /// True when any matched rule is contraindicated or any matched
    /// contraindication is absolute. Dominates the validity decision.
    pub contraindicated: bool,
}

impl DosingAdvice {
    pub fn empty(medication: &Medication) -> Self {
        Self {
            medication_id: medication.id.clone(),
            medication_name: medication.generic_name.clone(),
            adjustments: Vec::new(),
            contraindications: Vec::new(),
            contraindicated: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.adjustments.is_empty() && self.contraindications.is_empty()
    }
}

/// The single output of `validate`. Built fresh per call, never mutated
/// after return. Identical inputs against the same rule snapshot yield
/// identical results except for the two timing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub medications_validated: usize,
    pub interactions: Vec<InteractionFinding>,
    pub dosing_advice: Vec<DosingAdvice>,
    pub contraindications: Vec<ContraindicationFinding>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    pub validation_time_ms: f64,
    pub validated_at: DateTime<Utc>,
}

impl ValidationResult {
    pub fn has_major_interactions(&self) -> bool {
        self.interactions
            .iter()
            .any(|i| i.severity == Severity::Major)
    }

    /// (major, moderate, minor) interaction counts.
    pub fn interaction_counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for i in &self.interactions {
            match i.severity {
                Severity::Major => counts.0 += 1,
                Severity::Moderate => counts.1 += 1,
                Severity::Minor => counts.2 += 1,
                Severity::Unknown => {}
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_total_order() {
        assert!(Severity::Major > Severity::Moderate);
        assert!(Severity::Moderate > Severity::Minor);
        assert!(Severity::Minor > Severity::Unknown);
    }

    #[test]
    fn severity_downgrade_bottoms_out_at_minor() {
        assert_eq!(Severity::Major.downgraded(), Severity::Moderate);
        assert_eq!(Severity::Moderate.downgraded(), Severity::Minor);
        assert_eq!(Severity::Minor.downgraded(), Severity::Minor);
        assert_eq!(Severity::Unknown.downgraded(), Severity::Unknown);
    }

    #[test]
    fn renal_stage_boundaries_lower_inclusive() {
        assert_eq!(RenalStage::from_gfr(90.0), RenalStage::Normal);
        assert_eq!(RenalStage::from_gfr(89.9), RenalStage::Mild);
        assert_eq!(RenalStage::from_gfr(60.0), RenalStage::Mild);
        assert_eq!(RenalStage::from_gfr(30.0), RenalStage::Moderate);
        assert_eq!(RenalStage::from_gfr(29.9), RenalStage::Severe);
        assert_eq!(RenalStage::from_gfr(15.0), RenalStage::Severe);
        assert_eq!(RenalStage::from_gfr(14.9), RenalStage::Failure);
        assert_eq!(RenalStage::from_gfr(0.0), RenalStage::Failure);
    }

    #[test]
    fn contra_severity_absolute_outranks_relative() {
        assert!(ContraSeverity::Absolute > ContraSeverity::Relative);
    }

    #[test]
    fn finding_pair_label_format() {
        let finding = InteractionFinding {
            ingredient_a: "aspirin".into(),
            ingredient_b: "warfarin".into(),
            severity: Severity::Major,
            mechanism: String::new(),
            clinical_effect: String::new(),
            management: String::new(),
            evidence_level: 1,
            source: String::new(),
            confidence: 1.0,
            tier: ResolutionTier::Exact,
            unconfirmed: false,
        };
        assert_eq!(finding.pair_label(), "aspirin + warfarin");
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Major).unwrap();
        assert_eq!(json, "\"major\"");
    }
}
