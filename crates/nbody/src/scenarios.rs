//! Ready-made systems with well-known behavior.
//!
//! All scenarios use `G = 1`.

use crate::{Body, Error, System};

/// Mass of the Sun in Earth masses.
pub const SUN_MASS: f64 = 333_000.0;

/// First velocity parameter of the Yin-Yang 1a three-body orbit.
pub const YIN_YANG_1A_V1: f64 = 0.513_938;

/// Second velocity parameter of the Yin-Yang 1a three-body orbit.
pub const YIN_YANG_1A_V2: f64 = 0.304_736;

/// Earth (mass 1) at `(1, 0)` and the Sun (mass [`SUN_MASS`]) at rest at the
/// origin.
///
/// The Earth starts with the circular-orbit speed `sqrt(SUN_MASS)`, so its
/// orbit around the Sun is very nearly a unit circle with period
/// `2 pi / sqrt(SUN_MASS + 1)`.
#[must_use]
pub fn earth_sun() -> System {
    // Known-good values, unwrap is safe
    System::new([
        known(1.0, [1.0, 0.0], [0.0, SUN_MASS.sqrt()], "earth"),
        known(SUN_MASS, [0.0, 0.0], [0.0, 0.0], "sun"),
    ])
    .unwrap()
}

/// The symmetric Yin-Yang 1a periodic three-body orbit.
///
/// Three unit masses start on a line at `x = -1, 1, 0`. The outer bodies share
/// the velocity `(v1, v2)` and the middle body carries `-2 (v1, v2)`, so the
/// total momentum is zero.
#[must_use]
pub fn yin_yang_1a() -> System {
    // Known-good values, unwrap is safe
    yin_yang_1a_perturbed(1.0).unwrap()
}

/// Yin-Yang 1a with the first body's x-velocity scaled by `v1_scale`.
///
/// Any scale other than 1 breaks the symmetry of the orbit; with
/// `v1_scale = 1.1` the bodies visibly depart from the periodic solution.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if the scaled velocity is not finite.
pub fn yin_yang_1a_perturbed(v1_scale: f64) -> Result<System, Error> {
    let (v1, v2) = (YIN_YANG_1A_V1, YIN_YANG_1A_V2);

    let system = System::new([
        Body::new(1.0, [-1.0, 0.0], [v1 * v1_scale, v2])?.named("b1"),
        Body::new(1.0, [1.0, 0.0], [v1, v2])?.named("b2"),
        Body::new(1.0, [0.0, 0.0], [-2.0 * v1, -2.0 * v2])?.named("b3"),
    ])?;

    Ok(system.labeled("Yin-Yang-1a"))
}

fn known(mass: f64, position: [f64; 2], velocity: [f64; 2], name: &str) -> Body {
    Body::new(mass, position, velocity).unwrap().named(name)
}
