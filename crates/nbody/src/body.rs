use crate::{Error, ParameterError, Vec2};

/// Name given to bodies that are never explicitly named.
pub const DEFAULT_NAME: &str = "body";

/// A point mass with an initial position and velocity.
///
/// Bodies are immutable. Integration never changes them; evolving positions
/// and velocities live only in state vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    mass: f64,
    position: Vec2,
    velocity: Vec2,
    name: String,
}

impl Body {
    /// Creates a body named [`DEFAULT_NAME`].
    ///
    /// Bodies that share a [`System`](crate::System) need distinct names; use
    /// [`named`](Self::named) to set one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `mass` is not finite and
    /// positive, or if either vector has a non-finite component.
    pub fn new(
        mass: f64,
        position: impl Into<Vec2>,
        velocity: impl Into<Vec2>,
    ) -> Result<Self, Error> {
        let position = position.into();
        let velocity = velocity.into();

        if !mass.is_finite() || mass <= 0.0 {
            return Err(ParameterError::Mass(mass).into());
        }
        if !position.is_finite() {
            return Err(ParameterError::Position.into());
        }
        if !velocity.is_finite() {
            return Err(ParameterError::Velocity.into());
        }

        Ok(Self {
            mass,
            position,
            velocity,
            name: DEFAULT_NAME.to_owned(),
        })
    }

    /// Returns the body with its name replaced.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    #[must_use]
    pub fn initial_position(&self) -> Vec2 {
        self.position
    }

    #[must_use]
    pub fn initial_velocity(&self) -> Vec2 {
        self.velocity
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the distance between the initial positions of two bodies.
    #[must_use]
    pub fn distance_to(&self, other: &Body) -> f64 {
        (other.position - self.position).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn defaults_to_generic_name() {
        let body = Body::new(1.0, [0.0, 0.0], [0.0, 0.0]).unwrap();

        assert_eq!(body.name(), DEFAULT_NAME);
        assert_eq!(body.named("earth").name(), "earth");
    }

    #[test]
    fn keeps_initial_conditions() {
        let body = Body::new(2.5, (1.0, -2.0), [0.5, 0.25]).unwrap();

        assert_relative_eq!(body.mass(), 2.5);
        assert_eq!(body.initial_position(), Vec2::new(1.0, -2.0));
        assert_eq!(body.initial_velocity(), Vec2::new(0.5, 0.25));
    }

    #[test]
    fn distance_to_self_is_zero() {
        let body = Body::new(1.0, [3.0, -7.0], [1.0, 0.0]).unwrap();

        assert_relative_eq!(body.distance_to(&body), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Body::new(1.0, [0.0, 0.0], [0.0, 0.0]).unwrap();
        let b = Body::new(1.0, [3.0, 4.0], [0.0, 0.0]).unwrap();

        assert_relative_eq!(a.distance_to(&b), 5.0);
        assert_relative_eq!(b.distance_to(&a), 5.0);
    }

    #[test]
    fn rejects_non_positive_mass() {
        for mass in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = Body::new(mass, [0.0, 0.0], [0.0, 0.0]);
            assert!(
                matches!(result, Err(Error::InvalidParameter(ParameterError::Mass(_)))),
                "mass {mass} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_non_finite_vectors() {
        assert!(matches!(
            Body::new(1.0, [f64::NAN, 0.0], [0.0, 0.0]),
            Err(Error::InvalidParameter(ParameterError::Position))
        ));
        assert!(matches!(
            Body::new(1.0, [0.0, 0.0], [0.0, f64::INFINITY]),
            Err(Error::InvalidParameter(ParameterError::Velocity))
        ));
    }
}
