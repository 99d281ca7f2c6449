//!
//! # Error-Helper Utilities
//!
//! Defines the [ErrorHelper] trait, shared among the workspace's tree-walking
//! types (projectors, patchers, parsers). Each implementer generally carries
//! some internal state worth reporting upon failure, such as a context stack
//! or source location, which it injects in the implementation-required `err`
//! method.
//!

///
/// # ErrorHelper
///
/// Helper trait for re-use among the many conversion tree-walkers.
/// The `fail` method, provided by default, simply returns the `err` value,
/// and `unwrap`/`assert` route [Option]s and boolean conditions through it.
///
pub trait ErrorHelper {
    type Error;

    /// Create and return a [Self::Error] value.
    fn err(&self, msg: impl Into<String>) -> Self::Error;
    /// Return failure
    fn fail<T>(&self, msg: impl Into<String>) -> Result<T, Self::Error> {
        Err(self.err(msg))
    }
    /// Unwrap the [Option] `opt` if it is [Some], and return our error if not.
    fn unwrap<T>(&self, opt: Option<T>, msg: impl Into<String>) -> Result<T, Self::Error> {
        match opt {
            Some(val) => Ok(val),
            None => self.fail(msg),
        }
    }
    /// Assert a boolean condition. Returns through `self.fail` if it is not satisfied.
    fn assert(&self, b: bool, msg: impl Into<String>) -> Result<(), Self::Error> {
        match b {
            true => Ok(()),
            false => self.fail(msg),
        }
    }
}
