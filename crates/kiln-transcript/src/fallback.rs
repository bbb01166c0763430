use std::fmt::Display;

/// Replace an error with the type's default, leaving a debug trace behind.
///
/// Telemetry lookups must always produce *something*; this keeps the
/// fallback visible at each call site instead of inside a catch-all.
pub trait OrDefault<T> {
    fn or_default_logged(self, what: &str) -> T;
}

impl<T: Default, E: Display> OrDefault<T> for Result<T, E> {
    fn or_default_logged(self, what: &str) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(error = %e, "{what}: using default");
                T::default()
            }
        }
    }
}
