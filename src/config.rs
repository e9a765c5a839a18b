//! Engine-wide constants and logging bootstrap.

use tracing_subscriber::EnvFilter;

/// Crate version, stamped into snapshot load logs.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum cosine similarity for the similarity tier to synthesize a
/// finding. Below this floor a pair produces no finding.
pub const SIMILARITY_FLOOR: f64 = 0.3;

/// Fixed confidence assigned to class-level fallback findings.
pub const CLASS_FALLBACK_CONFIDENCE: f64 = 0.7;

/// Upper bound on distinct active ingredients per validation. C(n,2)
/// pair analysis is unpruned, so the cap keeps a pathological request
/// bounded.
pub const MAX_INGREDIENTS: usize = 256;

/// Evidence level assigned to similarity-synthesized findings
/// (4 = theoretical, the weakest grade).
pub const SIMILARITY_EVIDENCE_LEVEL: u8 = 4;

pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}

/// Initialize tracing for binaries and tests. Safe to call more than
/// once; later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn similarity_floor_below_class_confidence() {
        assert!(SIMILARITY_FLOOR < CLASS_FALLBACK_CONFIDENCE);
    }

    #[test]
    fn ingredient_cap_covers_realistic_prescriptions() {
        // Polypharmacy cases top out around a few dozen ingredients.
        assert!(MAX_INGREDIENTS >= 100);
    }

    #[test]
    fn init_logging_is_idempotent() {
        init_logging();
        init_logging();
    }
}
