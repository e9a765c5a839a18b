//! Veridose: prescription validation for clinical decision support.
//!
//! The crate checks a prescription against a patient record in three
//! passes: pairwise drug-drug interaction detection through a
//! three-tier resolution cascade (exact rule, therapeutic-class
//! fallback, embedding similarity), renal and hepatic dose adjustment,
//! and condition contraindications. Everything folds into one
//! deterministic [`models::ValidationResult`].
//!
//! ```no_run
//! use veridose::engine::ClinicalEngine;
//! use veridose::models::{PatientContext, PrescriptionItem, Sex};
//!
//! let engine = ClinicalEngine::builtin();
//! let mut patient = PatientContext::new(72, 68.0, Sex::Female);
//! patient.serum_creatinine = Some(1.4);
//!
//! let items = vec![
//!     PrescriptionItem {
//!         medication_id: "med-warfarin".into(),
//!         dose: "5mg".into(),
//!         frequency: "daily".into(),
//!     },
//!     PrescriptionItem {
//!         medication_id: "med-aspirin".into(),
//!         dose: "81mg".into(),
//!         frequency: "daily".into(),
//!     },
//! ];
//!
//! let result = engine.validate(&patient, &items)?;
//! assert!(!result.is_valid);
//! # Ok::<(), veridose::error::EngineError>(())
//! ```
//!
//! Rule tables live in an immutable [`rules::RuleSnapshot`] behind a
//! [`rules::RuleStore`]; reloads swap the whole snapshot atomically, so
//! `validate` can run from many threads while an update lands.

pub mod config;
pub mod dosing;
pub mod engine;
pub mod error;
pub mod interaction;
pub mod models;
pub mod registry;
pub mod renal;
pub mod rules;

pub use engine::ClinicalEngine;
pub use error::EngineError;
pub use models::{
    InteractionFinding, PatientContext, PrescriptionItem, Severity, ValidationResult,
};
