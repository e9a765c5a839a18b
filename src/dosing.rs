//! Organ-impairment dose adjustment and condition contraindications.
//!
//! For each medication the resolver collects the renal rule bracketing
//! the patient's GFR, the hepatic rule for their Child-Pugh class, and
//! any condition contraindications, and folds them into a single
//! [`DosingAdvice`]. Renal and hepatic findings are reported separately
//! rather than merged; a medication with no matching rule yields empty
//! advice, not an error.

use std::collections::BTreeSet;

use crate::models::{
    ChildPugh, ContraSeverity, ContraindicationFinding, DoseAdjustment, DosingAdvice,
    ImpairmentKind, Medication, RenalStage,
};
use crate::rules::RuleSnapshot;

pub struct DosingResolver<'a> {
    snapshot: &'a RuleSnapshot,
}

impl<'a> DosingResolver<'a> {
    pub fn new(snapshot: &'a RuleSnapshot) -> Self {
        Self { snapshot }
    }

    /// Dosing advice for one medication, covering every active
    /// ingredient it carries. `gfr` is `None` when the patient record
    /// has neither an explicit GFR nor a serum creatinine; renal rules
    /// are skipped rather than guessed at in that case.
    pub fn resolve(
        &self,
        medication: &Medication,
        gfr: Option<f64>,
        child_pugh: Option<ChildPugh>,
        conditions: &BTreeSet<String>,
    ) -> DosingAdvice {
        let mut advice = DosingAdvice::empty(medication);

        for ingredient in &medication.active_ingredients {
            if let Some(gfr) = gfr {
                let stage = RenalStage::from_gfr(gfr);
                for rule in self.snapshot.renal_rules(ingredient) {
                    if !rule.applies_to(gfr) {
                        continue;
                    }
                    tracing::debug!(
                        ingredient = %ingredient,
                        gfr,
                        contraindicated = rule.contraindicated,
                        "renal rule matched"
                    );
                    advice.adjustments.push(DoseAdjustment {
                        impairment: ImpairmentKind::Renal { stage, gfr },
                        adjusted_dose: rule.adjusted_dose.clone(),
                        reason: rule.reason.clone(),
                        monitoring_required: rule.monitoring_required,
                        monitoring_parameters: rule.monitoring_parameters.clone(),
                        contraindicated: rule.contraindicated,
                        source: rule.source.clone(),
                    });
                }
            }

            if let Some(class) = child_pugh {
                if let Some(rule) = self.snapshot.hepatic_rule(ingredient, class) {
                    tracing::debug!(
                        ingredient = %ingredient,
                        child_pugh = %class,
                        contraindicated = rule.contraindicated,
                        "hepatic rule matched"
                    );
                    advice.adjustments.push(DoseAdjustment {
                        impairment: ImpairmentKind::Hepatic { child_pugh: class },
                        adjusted_dose: rule.adjusted_dose.clone(),
                        reason: rule.reason.clone(),
                        monitoring_required: rule.monitoring_required,
                        monitoring_parameters: rule.monitoring_parameters.clone(),
                        contraindicated: rule.contraindicated,
                        source: rule.source.clone(),
                    });
                }
            }

            for rule in self.snapshot.contraindication_rules(ingredient) {
                if !conditions.contains(&rule.condition) {
                    continue;
                }
                advice.contraindications.push(ContraindicationFinding {
                    medication_name: medication.generic_name.clone(),
                    condition: rule.condition.clone(),
                    severity: rule.severity,
                    reason: rule.reason.clone(),
                    alternatives: rule.alternatives.clone(),
                });
            }
        }

        advice.contraindicated = advice.adjustments.iter().any(|a| a.contraindicated)
            || advice
                .contraindications
                .iter()
                .any(|c| c.severity == ContraSeverity::Absolute);
        advice
    }
}
