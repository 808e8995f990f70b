//! Tagged result of an external call.
//!
//! Adapters never surface errors upward: a transport or parse failure becomes
//! `Failed(reason)`, a clean "nothing there" becomes `Absent`. Callers
//! pattern-match and decide whether that means "skip" or "signal false".

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ok(T),
    Absent,
    Failed(String),
}

impl<T> Outcome<T> {
    /// Wraps an `anyhow` result; the error chain becomes the failure reason.
    pub fn from_result(res: anyhow::Result<T>) -> Self {
        match res {
            Ok(v) => Outcome::Ok(v),
            Err(e) => Outcome::Failed(format!("{e:#}")),
        }
    }

    /// Same as [`from_result`](Self::from_result) but `Ok(None)` maps to `Absent`.
    pub fn from_optional(res: anyhow::Result<Option<T>>) -> Self {
        match res {
            Ok(Some(v)) => Outcome::Ok(v),
            Ok(None) => Outcome::Absent,
            Err(e) => Outcome::Failed(format!("{e:#}")),
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Ok(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ok(v) => Outcome::Ok(f(v)),
            Outcome::Absent => Outcome::Absent,
            Outcome::Failed(r) => Outcome::Failed(r),
        }
    }
}

impl Outcome<bool> {
    /// Corroboration semantics: anything but a confirmed `true` is `false`.
    pub fn as_signal(&self) -> bool {
        matches!(self, Outcome::Ok(true))
    }
}

impl<T> fmt::Display for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ok(_) => f.write_str("ok"),
            Outcome::Absent => f.write_str("absent"),
            Outcome::Failed(r) => write!(f, "failed: {r}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn failures_and_absence_are_false_signals() {
        assert!(Outcome::Ok(true).as_signal());
        assert!(!Outcome::Ok(false).as_signal());
        assert!(!Outcome::<bool>::Absent.as_signal());
        assert!(!Outcome::<bool>::Failed("timeout".into()).as_signal());
    }

    #[test]
    fn from_optional_maps_none_to_absent() {
        assert_eq!(Outcome::<u8>::from_optional(Ok(None)), Outcome::Absent);
        assert_eq!(Outcome::from_optional(Ok(Some(3u8))), Outcome::Ok(3));
        let failed = Outcome::<u8>::from_optional(Err(anyhow!("boom")));
        assert!(failed.is_failed());
        assert_eq!(failed.to_string(), "failed: boom");
    }
}
