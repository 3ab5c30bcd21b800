//! Internal logging macros.
//!
//! Forward to `tracing` when the `tracing` feature is enabled and compile to
//! nothing otherwise, so call sites never need their own `#[cfg]`.

macro_rules! bond_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::trace!($($arg)*);
    }};
}

macro_rules! bond_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    }};
}

macro_rules! bond_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::warn!($($arg)*);
    }};
}
