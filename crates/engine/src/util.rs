//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every operation enforces the same rules on text and
//! thresholds.

use crate::{EngineError, ResultEngine, TxMeta};

/// Trim a required text field, rejecting empty values.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank becomes `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Normalize ledger metadata: trimmed notes, non-empty author.
pub(crate) fn normalize_tx_meta(meta: TxMeta) -> ResultEngine<TxMeta> {
    Ok(TxMeta {
        notes: normalize_optional_text(meta.notes.as_deref()),
        created_by: normalize_required_text(&meta.created_by, "created_by")?,
        transaction_date: meta.transaction_date,
    })
}

pub(crate) fn validate_reorder_threshold(value: f64) -> ResultEngine<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::InvalidInput(
            "reorder threshold must be >= 0".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn optional_text_drops_blank() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(
            normalize_optional_text(Some(" Food Bank ")),
            Some("Food Bank".to_string())
        );
    }

    #[test]
    fn tx_meta_requires_author() {
        let meta = TxMeta::new(Utc::now()).created_by(" ").notes("x");
        assert!(matches!(
            normalize_tx_meta(meta),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn threshold_must_be_finite_and_non_negative() {
        assert!(validate_reorder_threshold(0.0).is_ok());
        assert!(validate_reorder_threshold(-1.0).is_err());
        assert!(validate_reorder_threshold(f64::NAN).is_err());
    }
}
