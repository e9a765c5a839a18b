//! Medication catalog lookup.
//!
//! The engine resolves prescription items through a [`MedicationRegistry`]
//! trait object so deployments can plug in a national formulary service,
//! while tests and the seed catalog use the in-memory implementation.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::EngineError;
use crate::models::Medication;

/// Source of medication records, keyed by catalog id.
///
/// Lookups are also attempted by generic name and known brand alias so
/// callers can pass whatever identifier the prescription carries.
pub trait MedicationRegistry: Send + Sync {
    fn resolve(&self, id: &str) -> Result<Medication, EngineError>;
}

// Strength, package and form suffixes stripped when canonicalizing a
// free-text medication name, e.g. "Metformin 500mg tablets" -> "metformin".
static NAME_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        \b\d+(\.\d+)?\s*(mg|mcg|g|ml|iu|units?|%)(/\s*\d+(\.\d+)?\s*(mg|mcg|g|ml))?\b
        | \b(tablets?|tabs?|capsules?|caps?|syrup|suspension|injection|cream|ointment|
             gel|drops?|patch(es)?|er|xr|sr|cr|la|od|mr)\b
        ",
    )
    .unwrap_or_else(|e| panic!("invalid name-noise pattern: {e}"))
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").unwrap_or_else(|e| panic!("invalid whitespace pattern: {e}"))
});

/// Brand name → generic ingredient, for the common brands the seed
/// catalog covers. Keys and values are lowercase.
static BRAND_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("coumadin", "warfarin"),
        ("glucophage", "metformin"),
        ("zestril", "lisinopril"),
        ("prinivil", "lisinopril"),
        ("aldactone", "spironolactone"),
        ("zocor", "simvastatin"),
        ("lipitor", "atorvastatin"),
        ("biaxin", "clarithromycin"),
        ("cipro", "ciprofloxacin"),
        ("advil", "ibuprofen"),
        ("motrin", "ibuprofen"),
        ("nurofen", "ibuprofen"),
        ("lanoxin", "digoxin"),
        ("cordarone", "amiodarone"),
        ("ultram", "tramadol"),
        ("zoloft", "sertraline"),
        ("prozac", "fluoxetine"),
        ("lexapro", "escitalopram"),
        ("valium", "diazepam"),
        ("xanax", "alprazolam"),
        ("tylenol", "paracetamol"),
        ("panadol", "paracetamol"),
        ("diflucan", "fluconazole"),
        ("augmentin", "co-amoxiclav"),
        ("bactrim", "co-trimoxazole"),
        ("septra", "co-trimoxazole"),
    ])
});

/// Lowercase a medication name and strip strength/form/package noise.
pub fn canonical_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let stripped = NAME_NOISE.replace_all(&lowered, " ");
    WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}

/// Map a brand name to its generic, after canonicalization. Names that
/// are not known brands come back unchanged.
pub fn resolve_alias(name: &str) -> String {
    let canonical = canonical_name(name);
    match BRAND_ALIASES.get(canonical.as_str()) {
        Some(generic) => (*generic).to_string(),
        None => canonical,
    }
}

/// HashMap-backed registry used by the seed catalog and tests.
pub struct InMemoryRegistry {
    by_id: HashMap<String, Medication>,
    by_name: HashMap<String, String>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn with_medications(medications: impl IntoIterator<Item = Medication>) -> Self {
        let mut registry = Self::new();
        for medication in medications {
            registry.insert(medication);
        }
        registry
    }

    /// Seed catalog registry.
    pub fn builtin() -> Self {
        Self::with_medications(crate::rules::builtin::medications())
    }

    pub fn insert(&mut self, medication: Medication) {
        self.by_name
            .insert(canonical_name(&medication.generic_name), medication.id.clone());
        self.by_id.insert(medication.id.clone(), medication);
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MedicationRegistry for InMemoryRegistry {
    fn resolve(&self, id: &str) -> Result<Medication, EngineError> {
        if let Some(found) = self.by_id.get(id) {
            return Ok(found.clone());
        }
        // Fall back to generic-name and brand-alias lookup.
        let generic = resolve_alias(id);
        if let Some(mapped_id) = self.by_name.get(&generic) {
            if let Some(found) = self.by_id.get(mapped_id) {
                return Ok(found.clone());
            }
        }
        Err(EngineError::UnknownMedication(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DosageForm;

    fn sample(id: &str, name: &str) -> Medication {
        Medication {
            id: id.into(),
            generic_name: name.into(),
            active_ingredients: vec![name.into()],
            dosage_form: DosageForm::Tablet,
            is_otc: false,
            is_controlled: false,
            is_high_alert: false,
        }
    }

    #[test]
    fn canonical_name_strips_strength_and_form() {
        assert_eq!(canonical_name("Metformin 500mg tablets"), "metformin");
        assert_eq!(canonical_name("  Warfarin 5 mg  "), "warfarin");
        assert_eq!(canonical_name("Amoxicillin 250mg/5ml suspension"), "amoxicillin");
        assert_eq!(canonical_name("Paracetamol"), "paracetamol");
    }

    #[test]
    fn brand_alias_maps_to_generic() {
        assert_eq!(resolve_alias("Coumadin 5mg"), "warfarin");
        assert_eq!(resolve_alias("Glucophage"), "metformin");
        assert_eq!(resolve_alias("unheard-of-brand"), "unheard-of-brand");
    }

    #[test]
    fn resolves_by_id_name_and_brand() {
        let registry =
            InMemoryRegistry::with_medications([sample("med-1", "warfarin")]);
        assert_eq!(registry.resolve("med-1").unwrap().generic_name, "warfarin");
        assert_eq!(registry.resolve("Warfarin 5mg").unwrap().id, "med-1");
        assert_eq!(registry.resolve("Coumadin").unwrap().id, "med-1");
    }

    #[test]
    fn unknown_medication_errors() {
        let registry = InMemoryRegistry::new();
        let err = registry.resolve("med-x").unwrap_err();
        assert!(matches!(err, EngineError::UnknownMedication(_)));
    }

    #[test]
    fn builtin_catalog_resolves_seed_entries() {
        let registry = InMemoryRegistry::builtin();
        assert!(registry.resolve("med-metformin").is_ok());
        assert!(registry.resolve("augmentin").is_ok());
    }
}
