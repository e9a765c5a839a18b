//! Renal function estimation.
//!
//! Creatinine clearance by Cockcroft-Gault, used as the GFR estimate
//! that drives renal dose adjustment. An explicit GFR on the patient
//! record (e.g. a lab-reported eGFR) always takes precedence over the
//! estimate.

use crate::error::EngineError;
use crate::models::{PatientContext, Sex};

/// Creatinine clearance in mL/min by Cockcroft-Gault, rounded to one
/// decimal place.
///
/// `((140 - age) * weight_kg) / (72 * scr)`, times 0.85 for females.
pub fn cockcroft_gault(
    age: u32,
    weight_kg: f64,
    serum_creatinine: f64,
    sex: Sex,
) -> Result<f64, EngineError> {
    if age == 0 || age >= 140 {
        return Err(EngineError::InvalidInput(format!(
            "age {age} out of range for Cockcroft-Gault"
        )));
    }
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "weight {weight_kg} must be a positive number of kilograms"
        )));
    }
    if !serum_creatinine.is_finite() || serum_creatinine <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "serum creatinine {serum_creatinine} must be a positive mg/dL value"
        )));
    }

    let sex_factor = match sex {
        Sex::Male => 1.0,
        Sex::Female => 0.85,
    };
    let crcl = ((140 - age) as f64 * weight_kg * sex_factor) / (72.0 * serum_creatinine);
    Ok((crcl * 10.0).round() / 10.0)
}

/// GFR for dosing decisions: the explicit value when the record has
/// one, otherwise Cockcroft-Gault from age, weight and creatinine.
pub fn estimate_gfr(patient: &PatientContext) -> Result<f64, EngineError> {
    if let Some(gfr) = patient.gfr {
        if !gfr.is_finite() || gfr < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "explicit GFR {gfr} must be a non-negative number"
            )));
        }
        return Ok(gfr);
    }

    let scr = patient.serum_creatinine.ok_or_else(|| {
        EngineError::InvalidInput(
            "renal assessment needs either an explicit GFR or a serum creatinine".into(),
        )
    })?;
    cockcroft_gault(patient.age, patient.weight_kg, scr, patient.sex)
}
