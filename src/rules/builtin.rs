//! Curated seed rule tables.
//!
//! A starter snapshot for deployments that have no external catalog
//! loaded yet, and the fixture set for the clinical test suite. Exact
//! rules come from the DDInter-derived knowledge base; class rules and
//! the class map from the critical-interaction formulary; renal rules
//! from the renal drug handbook extract; embeddings are the fixed
//! 8-dimension similarity vectors shipped with the model artifacts.

use crate::models::{ChildPugh, ContraSeverity, DosageForm, Medication, Severity};
use crate::rules::{
    ContraindicationRule, HepaticRule, InteractionRule, PairKey, RenalRule, RuleSnapshot,
};

const KB_SOURCE: &str = "ddinter-kb-2.1";
const FORMULARY_SOURCE: &str = "formulary-critical-ddi-1.0";
const RENAL_SOURCE: &str = "renal-drug-handbook-2024";
const HEPATIC_SOURCE: &str = "hepatic-dosing-guide-2024";

fn ddi(
    a: &str,
    b: &str,
    severity: Severity,
    mechanism: &str,
    effect: &str,
    management: &str,
    evidence_level: u8,
    source: &str,
) -> InteractionRule {
    InteractionRule {
        pair: PairKey::new(a, b),
        severity,
        mechanism: mechanism.into(),
        clinical_effect: effect.into(),
        management: management.into(),
        evidence_level,
        source: source.into(),
    }
}

fn renal(
    generic_name: &str,
    gfr_min: f64,
    gfr_max: f64,
    adjusted_dose: &str,
    reason: &str,
    monitoring: &[&str],
    contraindicated: bool,
) -> RenalRule {
    RenalRule {
        generic_name: generic_name.into(),
        gfr_min,
        gfr_max,
        adjusted_dose: adjusted_dose.into(),
        reason: reason.into(),
        monitoring_required: !monitoring.is_empty(),
        monitoring_parameters: monitoring.iter().map(|s| s.to_string()).collect(),
        contraindicated,
        source: RENAL_SOURCE.into(),
    }
}

fn hepatic(
    generic_name: &str,
    child_pugh: ChildPugh,
    adjusted_dose: &str,
    reason: &str,
    monitoring: &[&str],
    contraindicated: bool,
) -> HepaticRule {
    HepaticRule {
        generic_name: generic_name.into(),
        child_pugh,
        adjusted_dose: adjusted_dose.into(),
        reason: reason.into(),
        monitoring_required: !monitoring.is_empty(),
        monitoring_parameters: monitoring.iter().map(|s| s.to_string()).collect(),
        contraindicated,
        source: HEPATIC_SOURCE.into(),
    }
}

fn contra(
    generic_name: &str,
    condition: &str,
    severity: ContraSeverity,
    reason: &str,
    alternatives: &[&str],
) -> ContraindicationRule {
    ContraindicationRule {
        generic_name: generic_name.into(),
        condition: condition.into(),
        severity,
        reason: reason.into(),
        alternatives: alternatives.iter().map(|s| s.to_string()).collect(),
    }
}

/// Build the curated seed snapshot.
pub fn snapshot() -> RuleSnapshot {
    let mut b = RuleSnapshot::builder("builtin-seed");

    // ── Exact ingredient-pair rules ─────────────────────────────────
    for rule in exact_rules() {
        b = b.exact_rule(rule);
    }

    // ── Class-level fallback rules ──────────────────────────────────
    for rule in class_rules() {
        b = b.class_rule(rule);
    }

    // ── Ingredient → class map ──────────────────────────────────────
    for (class, members) in DRUG_CLASSES {
        for member in *members {
            b = b.ingredient_class(member, class);
        }
    }

    // ── Renal dosing table ──────────────────────────────────────────
    for rule in renal_rules() {
        b = b.renal_rule(rule);
    }

    // ── Hepatic dosing table ────────────────────────────────────────
    for rule in hepatic_rules() {
        b = b.hepatic_rule(rule);
    }

    // ── Condition contraindications ─────────────────────────────────
    for rule in contraindication_rules() {
        b = b.contraindication(rule);
    }

    // ── Similarity vectors ──────────────────────────────────────────
    for (name, vector) in EMBEDDINGS {
        b = b.embedding(name, vector.to_vec());
    }

    b.build()
}

fn exact_rules() -> Vec<InteractionRule> {
    vec![
        ddi(
            "warfarin", "aspirin", Severity::Major,
            "Additive anticoagulant effects plus GI mucosal damage",
            "Increased bleeding risk, especially GI hemorrhage",
            "Avoid combination if possible. If necessary, use lowest aspirin dose, monitor INR closely, consider PPI.",
            1, KB_SOURCE,
        ),
        ddi(
            "warfarin", "ibuprofen", Severity::Major,
            "NSAID platelet inhibition and GI mucosal damage; protein-binding displacement",
            "2-3x increased risk of GI bleeding",
            "Avoid NSAIDs; use paracetamol for pain. If unavoidable, shortest duration with PPI.",
            1, KB_SOURCE,
        ),
        ddi(
            "warfarin", "metronidazole", Severity::Major,
            "Metronidazole inhibits CYP2C9-mediated warfarin metabolism",
            "INR increase of 50-100%, bleeding risk",
            "Reduce warfarin dose by 25-50%; monitor INR every 2-3 days during treatment.",
            1, KB_SOURCE,
        ),
        ddi(
            "warfarin", "fluconazole", Severity::Major,
            "Fluconazole is a potent CYP2C9 inhibitor",
            "INR may increase 2-3 fold",
            "Reduce warfarin by 50% when starting fluconazole; monitor INR frequently.",
            1, KB_SOURCE,
        ),
        ddi(
            "warfarin", "amiodarone", Severity::Major,
            "Amiodarone inhibits CYP2C9, CYP3A4 and P-glycoprotein",
            "INR increase 30-50%; effect persists weeks after discontinuation",
            "Reduce warfarin by 30-50%; monitor INR weekly for 6-8 weeks.",
            1, KB_SOURCE,
        ),
        ddi(
            "digoxin", "amiodarone", Severity::Major,
            "Amiodarone inhibits P-glycoprotein efflux, reducing digoxin clearance",
            "Digoxin levels increase 70-100%",
            "Reduce digoxin dose by 50% when starting amiodarone; monitor levels.",
            1, KB_SOURCE,
        ),
        ddi(
            "digoxin", "verapamil", Severity::Major,
            "Verapamil inhibits P-glycoprotein and reduces digoxin renal clearance",
            "Digoxin levels increase 50-75%; additive AV node depression",
            "Reduce digoxin dose by 33-50%; monitor levels and for bradycardia.",
            1, KB_SOURCE,
        ),
        ddi(
            "digoxin", "clarithromycin", Severity::Moderate,
            "Clarithromycin inhibits P-glycoprotein and gut flora that inactivate digoxin",
            "Digoxin levels may double",
            "Use azithromycin as alternative, or reduce digoxin and monitor levels.",
            2, KB_SOURCE,
        ),
        ddi(
            "amiodarone", "ciprofloxacin", Severity::Major,
            "Additive QT prolongation",
            "Increased risk of torsades de pointes",
            "Avoid combination; use a non-fluoroquinolone antibiotic. If unavoidable, monitor ECG and electrolytes.",
            2, KB_SOURCE,
        ),
        ddi(
            "clarithromycin", "domperidone", Severity::Major,
            "Both prolong QT; clarithromycin raises domperidone levels via CYP3A4 inhibition",
            "Significant QT prolongation, arrhythmia risk",
            "Contraindicated combination. Use metoclopramide or an alternative antibiotic.",
            2, KB_SOURCE,
        ),
        ddi(
            "escitalopram", "tramadol", Severity::Major,
            "Combined serotonergic activity",
            "Serotonin syndrome: hyperthermia, rigidity, myoclonus, autonomic instability",
            "Use an alternative analgesic. If necessary, lowest doses and monitor for serotonin syndrome.",
            2, KB_SOURCE,
        ),
        ddi(
            "fluoxetine", "tramadol", Severity::Major,
            "Serotonergic synergism; fluoxetine also inhibits tramadol metabolism",
            "Serotonin syndrome; increased seizure risk",
            "Avoid combination; use non-serotonergic analgesics.",
            2, KB_SOURCE,
        ),
        ddi(
            "sertraline", "linezolid", Severity::Major,
            "Linezolid is a reversible MAO inhibitor",
            "Severe serotonin syndrome",
            "Contraindicated. Stop SSRI 2 weeks before linezolid or use an alternative antibiotic.",
            1, KB_SOURCE,
        ),
        ddi(
            "simvastatin", "clarithromycin", Severity::Major,
            "Clarithromycin inhibits CYP3A4, dramatically increasing statin exposure",
            "10-fold increase in simvastatin levels; rhabdomyolysis risk",
            "Contraindicated. Hold simvastatin during the clarithromycin course, or use pravastatin/rosuvastatin.",
            1, KB_SOURCE,
        ),
        ddi(
            "simvastatin", "itraconazole", Severity::Major,
            "Itraconazole is a potent CYP3A4 inhibitor",
            "Massive increase in statin levels; rhabdomyolysis",
            "Contraindicated combination.",
            1, KB_SOURCE,
        ),
        ddi(
            "atorvastatin", "clarithromycin", Severity::Moderate,
            "CYP3A4 inhibition",
            "Increased atorvastatin exposure; myopathy risk",
            "Limit atorvastatin to 20mg during clarithromycin, or use azithromycin.",
            2, KB_SOURCE,
        ),
        ddi(
            "lisinopril", "spironolactone", Severity::Major,
            "Both promote potassium retention",
            "Hyperkalemia, especially in renal impairment or diabetes",
            "Monitor potassium within 1 week of starting, then regularly. Avoid in CKD stage 4-5.",
            1, KB_SOURCE,
        ),
        ddi(
            "lisinopril", "potassium chloride", Severity::Major,
            "ACE inhibition reduces aldosterone, decreasing potassium excretion",
            "Hyperkalemia",
            "Avoid potassium supplements unless documented hypokalemia; monitor closely.",
            1, KB_SOURCE,
        ),
        ddi(
            "lithium", "ibuprofen", Severity::Major,
            "NSAIDs reduce lithium renal clearance via prostaglandin inhibition",
            "Lithium levels increase 15-50%; toxicity risk",
            "Avoid NSAIDs; use paracetamol. If unavoidable, reduce lithium dose and monitor levels.",
            1, KB_SOURCE,
        ),
        ddi(
            "lithium", "lisinopril", Severity::Major,
            "ACE inhibitors reduce lithium clearance",
            "Lithium toxicity",
            "Monitor lithium levels closely when starting or stopping the ACE inhibitor.",
            2, KB_SOURCE,
        ),
        ddi(
            "theophylline", "ciprofloxacin", Severity::Major,
            "Ciprofloxacin inhibits CYP1A2, the main theophylline-metabolizing enzyme",
            "Theophylline levels increase 15-90%; seizures and arrhythmias",
            "Reduce theophylline by 30-50% and monitor levels, or use an alternative antibiotic.",
            1, KB_SOURCE,
        ),
        ddi(
            "theophylline", "erythromycin", Severity::Moderate,
            "Erythromycin inhibits CYP3A4 and CYP1A2",
            "Theophylline levels increase 25-50%",
            "Monitor theophylline levels; consider azithromycin as alternative.",
            2, KB_SOURCE,
        ),
        ddi(
            "morphine", "diazepam", Severity::Major,
            "Additive CNS and respiratory depression",
            "Enhanced sedation, respiratory depression, death",
            "Avoid combination if possible. If necessary, lowest effective doses with close monitoring.",
            1, KB_SOURCE,
        ),
        ddi(
            "fentanyl", "alprazolam", Severity::Major,
            "Additive CNS and respiratory depression",
            "Profound sedation, respiratory depression, coma, death",
            "Boxed-warning combination. Avoid; if necessary, limit doses and duration.",
            1, KB_SOURCE,
        ),
        ddi(
            "glipizide", "fluconazole", Severity::Moderate,
            "Fluconazole inhibits CYP2C9-mediated sulfonylurea metabolism",
            "Prolonged hypoglycemia",
            "Monitor blood glucose closely; consider 50% sulfonylurea dose reduction.",
            2, KB_SOURCE,
        ),
        ddi(
            "metformin", "iodinated contrast", Severity::Major,
            "Contrast-induced kidney injury impairs metformin clearance",
            "Lactic acidosis",
            "Hold metformin the day of and 48h after contrast; resume after confirming stable renal function.",
            1, KB_SOURCE,
        ),
    ]
}

fn class_rules() -> Vec<InteractionRule> {
    vec![
        ddi(
            "warfarin", "nsaid", Severity::Major,
            "NSAIDs inhibit platelet function and damage GI mucosa",
            "GI bleeding on anticoagulation",
            "Avoid NSAIDs if possible; lowest dose for the shortest duration otherwise.",
            1, FORMULARY_SOURCE,
        ),
        ddi(
            "ssri", "tramadol", Severity::Major,
            "Combined serotonergic activity",
            "Serotonin syndrome",
            "Avoid combination or monitor for serotonin syndrome symptoms.",
            2, FORMULARY_SOURCE,
        ),
        ddi(
            "ssri", "maoi", Severity::Major,
            "Combined serotonergic activity with MAO inhibition",
            "Life-threatening serotonin syndrome",
            "Contraindicated. Require a 2-week washout between the medications.",
            1, FORMULARY_SOURCE,
        ),
        ddi(
            "ssri", "linezolid", Severity::Major,
            "Linezolid has MAO-inhibitor activity",
            "Serotonin syndrome",
            "Avoid if possible; if necessary, monitor closely for 2 weeks.",
            2, FORMULARY_SOURCE,
        ),
        ddi(
            "opioid", "benzodiazepine", Severity::Major,
            "Additive CNS and respiratory depression",
            "Respiratory depression, profound sedation",
            "Avoid combination if possible; use lowest effective doses and monitor closely.",
            1, FORMULARY_SOURCE,
        ),
        ddi(
            "opioid", "maoi", Severity::Major,
            "Serotonergic and sympathomimetic potentiation",
            "Serotonin syndrome and respiratory depression",
            "Avoid meperidine entirely; use other opioids with extreme caution.",
            2, FORMULARY_SOURCE,
        ),
        ddi(
            "lithium", "nsaid", Severity::Major,
            "NSAIDs reduce lithium clearance",
            "Lithium toxicity",
            "Avoid if possible; otherwise monitor lithium levels closely.",
            1, FORMULARY_SOURCE,
        ),
        ddi(
            "lithium", "ace_inhibitor", Severity::Major,
            "ACE inhibitors reduce lithium clearance",
            "Lithium toxicity",
            "Monitor lithium levels; dose reduction may be needed.",
            2, FORMULARY_SOURCE,
        ),
        ddi(
            "lithium", "diuretic", Severity::Moderate,
            "Thiazide and loop diuretics increase lithium reabsorption",
            "Raised lithium levels",
            "Monitor lithium levels, especially when initiating the diuretic.",
            2, FORMULARY_SOURCE,
        ),
        ddi(
            "methotrexate", "nsaid", Severity::Major,
            "NSAIDs reduce methotrexate clearance",
            "Methotrexate toxicity: myelosuppression, mucositis",
            "Avoid with high-dose methotrexate; monitor blood counts with low-dose.",
            1, FORMULARY_SOURCE,
        ),
        ddi(
            "methotrexate", "trimethoprim", Severity::Major,
            "Additive antifolate effects and reduced methotrexate clearance",
            "Pancytopenia",
            "Avoid combination if possible; monitor blood counts.",
            2, FORMULARY_SOURCE,
        ),
        ddi(
            "ace_inhibitor", "potassium", Severity::Major,
            "Reduced aldosterone-mediated potassium excretion",
            "Severe hyperkalemia",
            "Monitor serum potassium closely; avoid supplements unless hypokalemic.",
            1, FORMULARY_SOURCE,
        ),
        ddi(
            "ace_inhibitor", "spironolactone", Severity::Moderate,
            "Additive potassium retention",
            "Hyperkalemia risk",
            "Monitor potassium, especially in renal impairment.",
            2, FORMULARY_SOURCE,
        ),
        ddi(
            "amiodarone", "fluoroquinolone", Severity::Major,
            "Additive QT prolongation",
            "Torsades de pointes risk",
            "Avoid combination; if unavoidable, monitor QTc and electrolytes.",
            2, FORMULARY_SOURCE,
        ),
        ddi(
            "sulfonylurea", "fluconazole", Severity::Moderate,
            "Fluconazole inhibits sulfonylurea metabolism",
            "Hypoglycemia risk",
            "Monitor blood glucose closely; sulfonylurea dose reduction may be needed.",
            2, FORMULARY_SOURCE,
        ),
    ]
}

/// Therapeutic class membership, class token first.
const DRUG_CLASSES: &[(&str, &[&str])] = &[
    (
        "ace_inhibitor",
        &["lisinopril", "enalapril", "ramipril", "captopril", "perindopril", "quinapril"],
    ),
    (
        "arb",
        &["losartan", "valsartan", "irbesartan", "candesartan", "telmisartan"],
    ),
    (
        "nsaid",
        &[
            "ibuprofen", "diclofenac", "naproxen", "indomethacin", "piroxicam",
            "meloxicam", "celecoxib", "ketoprofen", "ketorolac", "aspirin",
        ],
    ),
    (
        "ssri",
        &["fluoxetine", "sertraline", "paroxetine", "citalopram", "escitalopram", "fluvoxamine"],
    ),
    (
        "opioid",
        &["morphine", "codeine", "tramadol", "fentanyl", "oxycodone", "methadone", "meperidine"],
    ),
    (
        "benzodiazepine",
        &["diazepam", "lorazepam", "alprazolam", "clonazepam", "midazolam", "temazepam"],
    ),
    (
        "statin",
        &["simvastatin", "atorvastatin", "rosuvastatin", "pravastatin", "fluvastatin"],
    ),
    (
        "fluoroquinolone",
        &["ciprofloxacin", "levofloxacin", "moxifloxacin", "ofloxacin", "norfloxacin"],
    ),
    (
        "maoi",
        &["phenelzine", "tranylcypromine", "isocarboxazid", "selegiline", "rasagiline"],
    ),
    (
        "sulfonylurea",
        &["glipizide", "glyburide", "glimepiride", "glibenclamide", "gliclazide"],
    ),
    (
        "potassium",
        &["potassium chloride", "potassium citrate"],
    ),
    (
        "diuretic",
        &["furosemide", "hydrochlorothiazide", "chlorthalidone", "bumetanide", "torsemide"],
    ),
];

fn renal_rules() -> Vec<RenalRule> {
    vec![
        // Metformin: do-not-initiate guidance applies below GFR 45.
        renal(
            "metformin", 45.0, 60.0,
            "Continue with caution; reassess renal function every 3-6 months",
            "Reduced clearance at moderate impairment",
            &["Serum creatinine", "B12 annually"],
            false,
        ),
        renal(
            "metformin", 30.0, 45.0,
            "Do not initiate; max 1000mg daily if already established",
            "Lactic acidosis risk below GFR 45",
            &["Serum creatinine", "Lactic acid if symptomatic"],
            true,
        ),
        renal(
            "metformin", 0.0, 30.0,
            "Contraindicated",
            "Lactic acidosis risk",
            &["Serum creatinine"],
            true,
        ),
        renal(
            "ciprofloxacin", 30.0, 60.0,
            "250-500mg q12h",
            "Reduce dose or extend interval",
            &[],
            false,
        ),
        renal(
            "ciprofloxacin", 15.0, 30.0,
            "250-500mg q18-24h",
            "Significant reduction needed",
            &[],
            false,
        ),
        renal(
            "ciprofloxacin", 0.0, 15.0,
            "250-500mg q24h, give after dialysis",
            "Renally cleared",
            &[],
            false,
        ),
        renal(
            "digoxin", 60.0, 90.0,
            "0.125-0.25mg daily",
            "Monitor levels at mild impairment",
            &["Digoxin level", "Potassium", "ECG"],
            false,
        ),
        renal(
            "digoxin", 30.0, 60.0,
            "0.0625-0.125mg daily",
            "Reduce dose significantly",
            &["Digoxin level", "Potassium", "ECG"],
            false,
        ),
        renal(
            "digoxin", 0.0, 30.0,
            "0.0625mg daily or every other day",
            "High toxicity risk; not dialyzable",
            &["Digoxin level", "Potassium", "ECG"],
            false,
        ),
        renal(
            "gabapentin", 60.0, 90.0,
            "300-600mg three times daily",
            "May need adjustment",
            &[],
            false,
        ),
        renal(
            "gabapentin", 30.0, 60.0,
            "200-300mg twice daily",
            "Reduce dose",
            &[],
            false,
        ),
        renal(
            "gabapentin", 0.0, 30.0,
            "100-300mg daily; give after dialysis in ESRD",
            "Significant reduction",
            &[],
            false,
        ),
        renal(
            "spironolactone", 30.0, 60.0,
            "Use with caution; monitor potassium",
            "Hyperkalemia risk",
            &["Potassium", "Sodium", "Serum creatinine"],
            false,
        ),
        renal(
            "spironolactone", 0.0, 30.0,
            "Contraindicated",
            "Severe hyperkalemia risk",
            &["Potassium"],
            true,
        ),
        renal(
            "enoxaparin", 15.0, 30.0,
            "1mg/kg once daily (treatment); 30mg daily (prophylaxis)",
            "Reduced clearance",
            &["Anti-Xa levels", "Platelets", "Signs of bleeding"],
            false,
        ),
        renal(
            "enoxaparin", 0.0, 15.0,
            "Avoid; use unfractionated heparin",
            "Unpredictable accumulation",
            &["Platelets"],
            true,
        ),
        renal(
            "glyburide", 30.0, 60.0,
            "Avoid; switch to glipizide",
            "Active metabolites accumulate",
            &[],
            true,
        ),
        renal(
            "glyburide", 0.0, 30.0,
            "Contraindicated",
            "Prolonged hypoglycemia risk",
            &[],
            true,
        ),
        renal(
            "lisinopril", 30.0, 60.0,
            "Start 2.5-5mg daily; titrate carefully",
            "Accumulation and hyperkalemia risk",
            &["Potassium", "Serum creatinine", "Blood pressure"],
            false,
        ),
        renal(
            "lisinopril", 0.0, 30.0,
            "Start 2.5mg daily",
            "May accumulate; watch potassium",
            &["Potassium", "Serum creatinine", "Blood pressure"],
            false,
        ),
        renal(
            "morphine", 30.0, 60.0,
            "Reduce dose by 25-50%",
            "Active metabolite accumulates",
            &[],
            false,
        ),
        renal(
            "morphine", 15.0, 30.0,
            "Reduce dose by 50-75%",
            "Use with extreme caution",
            &[],
            false,
        ),
        renal(
            "morphine", 0.0, 15.0,
            "Avoid; use fentanyl or hydromorphone",
            "Metabolite causes toxicity",
            &[],
            true,
        ),
        renal(
            "vancomycin", 60.0, 90.0,
            "15-20mg/kg q12h",
            "Monitor trough levels",
            &["Trough levels", "Serum creatinine", "CBC"],
            false,
        ),
        renal(
            "vancomycin", 30.0, 60.0,
            "15-20mg/kg q24-48h",
            "Therapeutic drug monitoring required",
            &["Trough levels", "Serum creatinine", "CBC"],
            false,
        ),
        renal(
            "vancomycin", 0.0, 30.0,
            "Loading dose, then redose by levels",
            "Therapeutic drug monitoring required",
            &["Trough levels", "Serum creatinine", "CBC"],
            false,
        ),
        renal(
            "ibuprofen", 60.0, 90.0,
            "Lowest effective dose for the shortest duration",
            "Monitor renal function",
            &["Serum creatinine"],
            false,
        ),
        renal(
            "ibuprofen", 30.0, 60.0,
            "Avoid if possible",
            "May worsen renal function",
            &["Serum creatinine"],
            true,
        ),
        renal(
            "ibuprofen", 0.0, 30.0,
            "Contraindicated",
            "High risk of acute kidney injury",
            &[],
            true,
        ),
    ]
}

fn hepatic_rules() -> Vec<HepaticRule> {
    vec![
        hepatic(
            "simvastatin", ChildPugh::B,
            "Max 20mg daily",
            "Reduced hepatic clearance",
            &["LFTs"],
            false,
        ),
        hepatic(
            "simvastatin", ChildPugh::C,
            "Contraindicated",
            "Active or severe liver disease",
            &[],
            true,
        ),
        hepatic(
            "warfarin", ChildPugh::B,
            "Reduce initial dose; INR weekly",
            "Impaired synthesis of clotting factors amplifies effect",
            &["INR", "LFTs"],
            false,
        ),
        hepatic(
            "warfarin", ChildPugh::C,
            "Use with extreme caution; consider alternatives",
            "Baseline coagulopathy",
            &["INR", "LFTs"],
            false,
        ),
        hepatic(
            "paracetamol", ChildPugh::B,
            "Max 2g daily",
            "Reduced glutathione reserve",
            &[],
            false,
        ),
        hepatic(
            "paracetamol", ChildPugh::C,
            "Max 2g daily; avoid sustained use",
            "Hepatotoxicity risk",
            &["LFTs"],
            false,
        ),
        hepatic(
            "morphine", ChildPugh::B,
            "Reduce dose by 50%; extend interval",
            "Reduced first-pass metabolism",
            &[],
            false,
        ),
        hepatic(
            "morphine", ChildPugh::C,
            "Avoid",
            "Accumulation and encephalopathy risk",
            &[],
            true,
        ),
        hepatic(
            "metformin", ChildPugh::C,
            "Contraindicated",
            "Lactic acidosis risk in advanced cirrhosis",
            &[],
            true,
        ),
    ]
}

fn contraindication_rules() -> Vec<ContraindicationRule> {
    vec![
        contra(
            "warfarin", "pregnancy", ContraSeverity::Absolute,
            "Crosses the placenta; teratogenic and causes fetal bleeding",
            &["heparin", "enoxaparin"],
        ),
        contra(
            "methotrexate", "pregnancy", ContraSeverity::Absolute,
            "Abortifacient and teratogenic",
            &[],
        ),
        contra(
            "isotretinoin", "pregnancy", ContraSeverity::Absolute,
            "Severe teratogenicity",
            &[],
        ),
        contra(
            "lisinopril", "pregnancy", ContraSeverity::Absolute,
            "Fetal renal toxicity in second and third trimesters",
            &["labetalol", "methyldopa"],
        ),
        contra(
            "atorvastatin", "pregnancy", ContraSeverity::Absolute,
            "Cholesterol synthesis required for fetal development",
            &[],
        ),
        contra(
            "ibuprofen", "pregnancy", ContraSeverity::Relative,
            "Avoid in third trimester; premature ductus arteriosus closure",
            &["paracetamol"],
        ),
        contra(
            "aspirin", "asthma", ContraSeverity::Relative,
            "Bronchospasm risk in aspirin-sensitive asthma",
            &["paracetamol"],
        ),
        contra(
            "propranolol", "asthma", ContraSeverity::Absolute,
            "Non-selective beta-blockade provokes bronchospasm",
            &["bisoprolol"],
        ),
        contra(
            "pioglitazone", "heart_failure", ContraSeverity::Absolute,
            "Fluid retention worsens heart failure",
            &["metformin", "sitagliptin"],
        ),
        contra(
            "ibuprofen", "heart_failure", ContraSeverity::Relative,
            "Fluid retention and reduced diuretic response",
            &["paracetamol"],
        ),
        contra(
            "verapamil", "heart_failure", ContraSeverity::Relative,
            "Negative inotropy in reduced ejection fraction",
            &[],
        ),
        contra(
            "ibuprofen", "peptic_ulcer", ContraSeverity::Relative,
            "GI bleeding risk",
            &["paracetamol"],
        ),
        contra(
            "aspirin", "peptic_ulcer", ContraSeverity::Relative,
            "GI bleeding risk",
            &[],
        ),
        contra(
            "hydrochlorothiazide", "gout", ContraSeverity::Relative,
            "Reduced urate excretion precipitates flares",
            &[],
        ),
        contra(
            "ciprofloxacin", "myasthenia_gravis", ContraSeverity::Relative,
            "May exacerbate muscle weakness",
            &[],
        ),
    ]
}

/// Fixed 8-dimension similarity vectors from the model artifacts.
/// Consumed only when neither the exact nor the class tier matches.
const EMBEDDINGS: &[(&str, [f64; 8])] = &[
    // Anticoagulants
    ("warfarin", [0.9, 0.1, 0.2, 0.1, 0.8, 0.1, 0.1, 0.9]),
    ("heparin", [0.85, 0.15, 0.25, 0.1, 0.75, 0.1, 0.15, 0.85]),
    ("rivaroxaban", [0.88, 0.12, 0.22, 0.1, 0.78, 0.1, 0.12, 0.87]),
    // NSAIDs
    ("ibuprofen", [0.1, 0.9, 0.8, 0.1, 0.3, 0.2, 0.7, 0.2]),
    ("aspirin", [0.3, 0.85, 0.75, 0.1, 0.5, 0.2, 0.65, 0.3]),
    ("diclofenac", [0.1, 0.88, 0.82, 0.1, 0.28, 0.2, 0.72, 0.18]),
    // Fluoroquinolones
    ("ciprofloxacin", [0.2, 0.3, 0.1, 0.9, 0.2, 0.8, 0.3, 0.4]),
    ("levofloxacin", [0.22, 0.28, 0.12, 0.88, 0.22, 0.78, 0.32, 0.38]),
    // Macrolides
    ("clarithromycin", [0.15, 0.25, 0.15, 0.85, 0.15, 0.7, 0.4, 0.5]),
    ("erythromycin", [0.17, 0.27, 0.17, 0.83, 0.17, 0.68, 0.42, 0.48]),
    ("azithromycin", [0.14, 0.24, 0.14, 0.8, 0.14, 0.65, 0.38, 0.45]),
    // Antiarrhythmics
    ("amiodarone", [0.7, 0.2, 0.1, 0.3, 0.9, 0.4, 0.2, 0.8]),
    ("digoxin", [0.65, 0.15, 0.15, 0.25, 0.85, 0.35, 0.25, 0.75]),
    // SSRIs
    ("escitalopram", [0.1, 0.1, 0.2, 0.2, 0.1, 0.3, 0.9, 0.3]),
    ("fluoxetine", [0.12, 0.12, 0.22, 0.22, 0.12, 0.32, 0.88, 0.32]),
    ("sertraline", [0.11, 0.11, 0.21, 0.21, 0.11, 0.31, 0.89, 0.31]),
    // Opioids
    ("tramadol", [0.15, 0.2, 0.3, 0.1, 0.15, 0.2, 0.7, 0.6]),
    ("morphine", [0.1, 0.15, 0.25, 0.1, 0.1, 0.15, 0.5, 0.85]),
    ("fentanyl", [0.08, 0.12, 0.22, 0.08, 0.08, 0.12, 0.45, 0.9]),
    // Statins
    ("simvastatin", [0.3, 0.4, 0.5, 0.6, 0.3, 0.5, 0.2, 0.3]),
    ("atorvastatin", [0.32, 0.42, 0.48, 0.58, 0.32, 0.48, 0.22, 0.28]),
    // Benzodiazepines
    ("diazepam", [0.1, 0.15, 0.2, 0.1, 0.1, 0.15, 0.6, 0.7]),
    ("alprazolam", [0.12, 0.17, 0.22, 0.12, 0.12, 0.17, 0.62, 0.72]),
];

fn med(id: &str, generic: &str, ingredients: &[&str], form: DosageForm) -> Medication {
    Medication {
        id: id.into(),
        generic_name: generic.into(),
        active_ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        dosage_form: form,
        is_otc: false,
        is_controlled: false,
        is_high_alert: false,
    }
}

/// Demo medication catalog for the in-memory registry and test suites.
pub fn medications() -> Vec<Medication> {
    let mut meds = vec![
        med("med-warfarin", "warfarin", &["warfarin"], DosageForm::Tablet),
        med("med-aspirin", "aspirin", &["aspirin"], DosageForm::Tablet),
        med("med-metformin", "metformin", &["metformin"], DosageForm::Tablet),
        med("med-lisinopril", "lisinopril", &["lisinopril"], DosageForm::Tablet),
        med("med-spironolactone", "spironolactone", &["spironolactone"], DosageForm::Tablet),
        med("med-simvastatin", "simvastatin", &["simvastatin"], DosageForm::Tablet),
        med("med-clarithromycin", "clarithromycin", &["clarithromycin"], DosageForm::Tablet),
        med("med-ciprofloxacin", "ciprofloxacin", &["ciprofloxacin"], DosageForm::Tablet),
        med("med-ibuprofen", "ibuprofen", &["ibuprofen"], DosageForm::Tablet),
        med("med-digoxin", "digoxin", &["digoxin"], DosageForm::Tablet),
        med("med-amiodarone", "amiodarone", &["amiodarone"], DosageForm::Tablet),
        med("med-tramadol", "tramadol", &["tramadol"], DosageForm::Capsule),
        med("med-sertraline", "sertraline", &["sertraline"], DosageForm::Tablet),
        med("med-fluoxetine", "fluoxetine", &["fluoxetine"], DosageForm::Capsule),
        med("med-morphine", "morphine", &["morphine"], DosageForm::Ampoule),
        med("med-diazepam", "diazepam", &["diazepam"], DosageForm::Tablet),
        med("med-paracetamol", "paracetamol", &["paracetamol"], DosageForm::Tablet),
        med("med-fluconazole", "fluconazole", &["fluconazole"], DosageForm::Capsule),
        med("med-lithium", "lithium", &["lithium"], DosageForm::Tablet),
        med("med-methotrexate", "methotrexate", &["methotrexate"], DosageForm::Tablet),
        // Combination products
        med(
            "med-co-amoxiclav",
            "co-amoxiclav",
            &["amoxicillin", "clavulanic acid"],
            DosageForm::Tablet,
        ),
        med(
            "med-cotrimoxazole",
            "co-trimoxazole",
            &["sulfamethoxazole", "trimethoprim"],
            DosageForm::Tablet,
        ),
    ];

    for m in &mut meds {
        match m.generic_name.as_str() {
            "warfarin" | "morphine" | "methotrexate" | "digoxin" => m.is_high_alert = true,
            "aspirin" | "ibuprofen" | "paracetamol" => m.is_otc = true,
            _ => {}
        }
        if matches!(m.generic_name.as_str(), "morphine" | "diazepam" | "tramadol") {
            m.is_controlled = true;
        }
    }
    meds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_snapshot_builds_with_all_tables() {
        let snapshot = snapshot();
        let (exact, class, renal, hepatic, contra) = snapshot.rule_counts();
        assert!(exact >= 20, "exact rules: {exact}");
        assert!(class >= 10, "class rules: {class}");
        assert!(renal >= 20, "renal rules: {renal}");
        assert!(hepatic >= 8, "hepatic rules: {hepatic}");
        assert!(contra >= 10, "contraindication rules: {contra}");
    }

    #[test]
    fn warfarin_aspirin_is_exact_major() {
        let snapshot = snapshot();
        let rule = snapshot
            .exact_rule(&PairKey::new("aspirin", "warfarin"))
            .unwrap();
        assert_eq!(rule.severity, Severity::Major);
        assert_eq!(rule.evidence_level, 1);
    }

    #[test]
    fn aspirin_is_classed_as_nsaid() {
        let snapshot = snapshot();
        assert!(snapshot.classes_of("aspirin").contains(&"nsaid".to_string()));
    }

    #[test]
    fn metformin_renal_rules_cover_low_gfr_contiguously() {
        let snapshot = snapshot();
        for gfr in [0.0, 15.0, 29.9, 30.0, 35.0, 44.9, 45.0, 59.9] {
            let matched: Vec<_> = snapshot
                .renal_rules("metformin")
                .iter()
                .filter(|r| r.applies_to(gfr))
                .collect();
            assert_eq!(matched.len(), 1, "GFR {gfr} should match exactly one rule");
        }
        // Contraindicated everywhere below 45.
        for gfr in [10.0, 29.9, 30.0, 44.0] {
            let rule = snapshot
                .renal_rules("metformin")
                .iter()
                .find(|r| r.applies_to(gfr))
                .unwrap();
            assert!(rule.contraindicated, "GFR {gfr} should be contraindicated");
        }
    }

    #[test]
    fn demo_catalog_has_combination_product() {
        let meds = medications();
        let combo = meds
            .iter()
            .find(|m| m.generic_name == "co-amoxiclav")
            .unwrap();
        assert_eq!(combo.active_ingredients.len(), 2);
    }

    #[test]
    fn embeddings_share_dimension() {
        for (_, vector) in EMBEDDINGS {
            assert_eq!(vector.len(), 8);
        }
    }
}
