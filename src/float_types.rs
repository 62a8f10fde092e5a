//! Scalar type and the geometric tolerance used when cutting meshes.
//!
//! `Real` is `f64` unless the `f32` feature is on; the matching parry crate
//! is re-exported as `parry3d` so the rest of the crate names one path.

use std::sync::OnceLock;

#[cfg(feature = "f64")]
pub use parry3d_f64 as parry3d;

#[cfg(feature = "f32")]
pub use parry3d;

#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

/// The full circle constant (τ)
#[cfg(feature = "f32")]
pub const TAU: Real = core::f32::consts::TAU;
/// The full circle constant (τ)
#[cfg(feature = "f64")]
pub const TAU: Real = core::f64::consts::TAU;

/// Tolerance used when no override is given.
pub const DEFAULT_TOLERANCE: Real = if cfg!(feature = "f32") { 1e-5 } else { 1e-9 };

/// Environment variable read on first use of [`tolerance`].
pub const TOLERANCE_ENV: &str = "LAYERSTACK_TOLERANCE";

static TOLERANCE: OnceLock<Real> = OnceLock::new();

fn usable(value: Real) -> Option<Real> {
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Distance below which a vertex counts as lying on a slicing plane and two
/// contour points count as one.
///
/// Fixed on first use: a value passed to [`set_tolerance`] beforehand wins,
/// then a positive number in `LAYERSTACK_TOLERANCE`, then [`DEFAULT_TOLERANCE`].
pub fn tolerance() -> Real {
    *TOLERANCE.get_or_init(|| {
        std::env::var(TOLERANCE_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse::<Real>().ok())
            .and_then(usable)
            .unwrap_or(DEFAULT_TOLERANCE)
    })
}

/// Fix the tolerance before anything is sliced.
///
/// Returns `false` if the tolerance is already in use or `value` is not a
/// positive finite number; the current tolerance is then left unchanged.
pub fn set_tolerance(value: Real) -> bool {
    usable(value).is_some_and(|v| TOLERANCE.set(v).is_ok())
}
