use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("{quantity} is not a finite amount for these inputs")]
    NonFiniteResult { quantity: &'static str },
}

pub type CalcResult<T> = Result<T, CalcError>;

impl CalcError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub(crate) const MAX_YEARS: u32 = 50;

pub(crate) fn require_finite(field: &'static str, value: f64) -> CalcResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CalcError::invalid(field, "must be a finite number"))
    }
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> CalcResult<()> {
    require_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(CalcError::invalid(field, format!("must be > 0, got {value}")))
    }
}

pub(crate) fn require_non_negative(field: &'static str, value: f64) -> CalcResult<()> {
    require_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(CalcError::invalid(field, format!("must be >= 0, got {value}")))
    }
}

pub(crate) fn require_years(field: &'static str, years: u32) -> CalcResult<()> {
    if (1..=MAX_YEARS).contains(&years) {
        Ok(())
    } else {
        Err(CalcError::invalid(
            field,
            format!("must be between 1 and {MAX_YEARS}, got {years}"),
        ))
    }
}

pub(crate) fn ensure_finite(quantity: &'static str, value: f64) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NonFiniteResult { quantity })
    }
}
