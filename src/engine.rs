//! Validation orchestrator.
//!
//! Ties the registry, rule store, interaction resolver and dosing
//! resolver together into a single `validate` call. The call is pure
//! in-memory compute over one immutable rule snapshot, so it is safe to
//! run concurrently from many threads; the store can be reloaded at any
//! time without an in-flight validation observing a half-installed
//! table set.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::config::MAX_INGREDIENTS;
use crate::dosing::DosingResolver;
use crate::error::EngineError;
use crate::interaction::InteractionResolver;
use crate::models::{
    ContraSeverity, DosingAdvice, InteractionFinding, Medication, PatientContext,
    PrescriptionItem, Severity, ValidationResult,
};
use crate::registry::MedicationRegistry;
use crate::renal;
use crate::rules::RuleStore;

pub struct ClinicalEngine {
    registry: Arc<dyn MedicationRegistry>,
    rules: Arc<RuleStore>,
}

impl ClinicalEngine {
    pub fn new(registry: Arc<dyn MedicationRegistry>, rules: Arc<RuleStore>) -> Self {
        Self { registry, rules }
    }

    /// Engine over the seed catalog and seed rule snapshot.
    pub fn builtin() -> Self {
        Self::new(
            Arc::new(crate::registry::InMemoryRegistry::builtin()),
            Arc::new(RuleStore::new(crate::rules::builtin::snapshot())),
        )
    }

    pub fn rules(&self) -> &Arc<RuleStore> {
        &self.rules
    }

    /// Validate one prescription against one patient.
    ///
    /// Unknown medications are an error, never silently dropped. The
    /// result is deterministic for identical inputs against the same
    /// snapshot, except for `validated_at` and `validation_time_ms`.
    pub fn validate(
        &self,
        patient: &PatientContext,
        items: &[PrescriptionItem],
    ) -> Result<ValidationResult, EngineError> {
        let started = Instant::now();
        let snapshot = self.rules.snapshot()?;

        if patient.age == 0 || patient.age >= 140 {
            return Err(EngineError::InvalidInput(format!(
                "patient age {} out of range",
                patient.age
            )));
        }
        if !patient.weight_kg.is_finite() || patient.weight_kg <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "patient weight {} must be positive",
                patient.weight_kg
            )));
        }

        // GFR is only computable when the record carries renal data;
        // without it, renal dosing rules are skipped.
        let gfr = if patient.gfr.is_some() || patient.serum_creatinine.is_some() {
            Some(renal::estimate_gfr(patient)?)
        } else {
            None
        };

        // Resolve items, deduplicating repeated medication ids.
        let mut medications: Vec<Medication> = Vec::new();
        for item in items {
            let medication = self.registry.resolve(&item.medication_id).map_err(|e| {
                tracing::warn!(medication_id = %item.medication_id, "medication lookup failed");
                e
            })?;
            if !medications.iter().any(|m| m.id == medication.id) {
                medications.push(medication);
            }
        }

        let mut ingredients: BTreeSet<String> = BTreeSet::new();
        for medication in &medications {
            for ingredient in &medication.active_ingredients {
                ingredients.insert(ingredient.trim().to_lowercase());
            }
        }
        if ingredients.len() > MAX_INGREDIENTS {
            return Err(EngineError::TooManyMedications {
                count: ingredients.len(),
                max: MAX_INGREDIENTS,
            });
        }

        let interactions = InteractionResolver::new(&snapshot).resolve_all(&ingredients);

        let dosing = DosingResolver::new(&snapshot);
        let mut dosing_advice: Vec<DosingAdvice> = medications
            .iter()
            .map(|m| dosing.resolve(m, gfr, patient.child_pugh, &patient.conditions))
            .filter(|advice| !advice.is_empty())
            .collect();
        dosing_advice.sort_by(|x, y| {
            y.contraindicated
                .cmp(&x.contraindicated)
                .then_with(|| x.medication_name.cmp(&y.medication_name))
        });

        let mut contraindications: Vec<_> = dosing_advice
            .iter()
            .flat_map(|advice| advice.contraindications.iter().cloned())
            .collect();
        contraindications.sort_by(|x, y| {
            y.severity
                .cmp(&x.severity)
                .then_with(|| x.medication_name.cmp(&y.medication_name))
                .then_with(|| x.condition.cmp(&y.condition))
        });

        let has_absolute = contraindications
            .iter()
            .any(|c| c.severity == ContraSeverity::Absolute);
        let has_contraindicated_advice = dosing_advice.iter().any(|a| a.contraindicated);
        let has_major = interactions.iter().any(|i| i.severity == Severity::Major);
        let is_valid = !(has_major || has_contraindicated_advice || has_absolute);

        let warnings = build_warnings(
            patient,
            &medications,
            &interactions,
            &dosing_advice,
            gfr,
        );
        let recommendations = build_recommendations(&interactions, &dosing_advice);

        let result = ValidationResult {
            is_valid,
            medications_validated: medications.len(),
            interactions,
            dosing_advice,
            contraindications,
            warnings,
            recommendations,
            validation_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            validated_at: Utc::now(),
        };

        tracing::info!(
            engine = crate::config::ENGINE_VERSION,
            medications = result.medications_validated,
            interactions = result.interactions.len(),
            is_valid = result.is_valid,
            elapsed_ms = result.validation_time_ms,
            snapshot = %snapshot.version(),
            "prescription validated"
        );
        Ok(result)
    }

    /// Quick two-drug check without a patient record.
    pub fn check_pair(
        &self,
        a: &str,
        b: &str,
    ) -> Result<Option<InteractionFinding>, EngineError> {
        let snapshot = self.rules.snapshot()?;
        Ok(InteractionResolver::new(&snapshot).resolve_pair(a, b))
    }
}

fn build_warnings(
    patient: &PatientContext,
    medications: &[Medication],
    interactions: &[InteractionFinding],
    dosing_advice: &[DosingAdvice],
    gfr: Option<f64>,
) -> Vec<String> {
    let mut warnings = Vec::new();

    // Count summary ahead of the per-finding lines.
    let major = interactions
        .iter()
        .filter(|i| i.severity == Severity::Major)
        .count();
    let moderate = interactions
        .iter()
        .filter(|i| i.severity == Severity::Moderate)
        .count();
    if major > 0 {
        warnings.push(format!("{major} MAJOR interaction(s) detected"));
    }
    if moderate > 0 {
        warnings.push(format!("{moderate} moderate interaction(s) detected"));
    }

    for finding in interactions {
        match finding.severity {
            Severity::Major => warnings.push(format!(
                "[MAJOR] {}: {}",
                finding.pair_label(),
                finding.mechanism
            )),
            Severity::Moderate => warnings.push(format!(
                "[MODERATE] {}: {}",
                finding.pair_label(),
                finding.clinical_effect
            )),
            Severity::Minor | Severity::Unknown => {}
        }
    }

    for advice in dosing_advice {
        if advice.contraindicated {
            warnings.push(format!(
                "[CONTRAINDICATED] {} should not be used for this patient",
                advice.medication_name
            ));
        } else if advice.adjustments.iter().any(|a| a.monitoring_required) {
            warnings.push(format!(
                "[CAUTION] {} requires dose review and monitoring",
                advice.medication_name
            ));
        }
    }

    let mut high_alert: Vec<&str> = medications
        .iter()
        .filter(|m| m.is_high_alert)
        .map(|m| m.generic_name.as_str())
        .collect();
    high_alert.sort_unstable();
    for name in high_alert {
        warnings.push(format!(
            "[HIGH-ALERT] {name} is a high-alert medication; independent double-check recommended"
        ));
    }

    if patient.age >= 65 && !medications.is_empty() {
        warnings.push(
            "[ELDERLY] Patient is 65 or older; review doses against geriatric guidance".into(),
        );
    }
    if patient.age < 18 && !medications.is_empty() {
        warnings.push(
            "[PEDIATRIC] Patient is under 18; confirm weight-based pediatric dosing".into(),
        );
    }
    if gfr.is_none() && !medications.is_empty() {
        warnings.push(
            "[RENAL] No GFR or serum creatinine on record; renal dosing not assessed".into(),
        );
    }

    warnings
}

fn build_recommendations(
    interactions: &[InteractionFinding],
    dosing_advice: &[DosingAdvice],
) -> Vec<String> {
    let mut recommendations = Vec::new();

    for finding in interactions {
        if matches!(finding.severity, Severity::Major | Severity::Moderate) {
            recommendations.push(format!(
                "For {}: {}",
                finding.pair_label(),
                finding.management
            ));
        }
    }

    for advice in dosing_advice {
        for contra in &advice.contraindications {
            if contra.severity == ContraSeverity::Absolute {
                let mut line = format!(
                    "AVOID {} in {}: {}.",
                    advice.medication_name, contra.condition, contra.reason
                );
                if !contra.alternatives.is_empty() {
                    line.push_str(&format!(
                        " Consider: {}.",
                        contra.alternatives.join(", ")
                    ));
                }
                recommendations.push(line);
            }
        }
        for adjustment in &advice.adjustments {
            if adjustment.contraindicated {
                recommendations.push(format!(
                    "AVOID {}: {}",
                    advice.medication_name, adjustment.reason
                ));
            } else {
                recommendations.push(format!(
                    "ADJUST {}: {} ({})",
                    advice.medication_name, adjustment.adjusted_dose, adjustment.reason
                ));
            }
            if adjustment.monitoring_required && !adjustment.monitoring_parameters.is_empty() {
                recommendations.push(format!(
                    "MONITOR {}: {}",
                    advice.medication_name,
                    adjustment.monitoring_parameters.join(", ")
                ));
            }
        }
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sex;

    fn item(id: &str) -> PrescriptionItem {
        PrescriptionItem {
            medication_id: id.into(),
            dose: "1 tablet".into(),
            frequency: "daily".into(),
        }
    }

    fn adult() -> PatientContext {
        let mut p = PatientContext::new(45, 70.0, Sex::Male);
        p.gfr = Some(95.0);
        p
    }

    #[test]
    fn unknown_medication_is_an_error() {
        let engine = ClinicalEngine::builtin();
        let err = engine
            .validate(&adult(), &[item("med-nonexistent")])
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownMedication(_)));
    }

    #[test]
    fn empty_prescription_is_valid() {
        let engine = ClinicalEngine::builtin();
        let result = engine.validate(&adult(), &[]).unwrap();
        assert!(result.is_valid);
        assert_eq!(result.medications_validated, 0);
        assert!(result.interactions.is_empty());
    }

    #[test]
    fn duplicate_items_count_once() {
        let engine = ClinicalEngine::builtin();
        let result = engine
            .validate(&adult(), &[item("med-warfarin"), item("med-warfarin")])
            .unwrap();
        assert_eq!(result.medications_validated, 1);
        assert!(result.interactions.is_empty());
    }

    #[test]
    fn major_interaction_invalidates() {
        let engine = ClinicalEngine::builtin();
        let result = engine
            .validate(&adult(), &[item("med-warfarin"), item("med-aspirin")])
            .unwrap();
        assert!(!result.is_valid);
        assert!(result.has_major_interactions());
        assert!(result.warnings.iter().any(|w| w.starts_with("[MAJOR]")));
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.starts_with("For aspirin + warfarin:")));
    }

    #[test]
    fn warnings_open_with_interaction_count_summary() {
        let engine = ClinicalEngine::builtin();
        let result = engine
            .validate(
                &adult(),
                &[
                    item("med-warfarin"),
                    item("med-aspirin"),
                    item("med-fluconazole"),
                ],
            )
            .unwrap();
        // warfarin+aspirin and warfarin+fluconazole are Major;
        // aspirin+fluconazole has no rule at any tier.
        let (major, moderate, _) = result.interaction_counts();
        assert_eq!(major, 2);
        assert_eq!(result.warnings[0], "2 MAJOR interaction(s) detected");
        if moderate > 0 {
            assert_eq!(
                result.warnings[1],
                format!("{moderate} moderate interaction(s) detected")
            );
        }
    }

    #[test]
    fn store_without_snapshot_is_unavailable() {
        let engine = ClinicalEngine::new(
            Arc::new(crate::registry::InMemoryRegistry::builtin()),
            Arc::new(RuleStore::empty()),
        );
        let err = engine.validate(&adult(), &[]).unwrap_err();
        assert!(matches!(err, EngineError::RuleStoreUnavailable));
    }

    #[test]
    fn degenerate_patient_is_invalid_input() {
        let engine = ClinicalEngine::builtin();
        let patient = PatientContext::new(0, 70.0, Sex::Male);
        assert!(matches!(
            engine.validate(&patient, &[]),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
