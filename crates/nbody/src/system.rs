use std::collections::{HashMap, hash_map::Entry};
use std::convert::Infallible;

use log::debug;
use nbody_core::{Integrator, OdeProblem, TimeGrid, Trajectory};
use nbody_solvers::transient::dopri5::Dopri5;

use crate::{Body, Error, GravityConfig, ParameterError, StateLayout, Vec2};

/// A closed set of bodies coupled by Newtonian gravity.
///
/// The order of bodies is fixed at construction and defines their slots in
/// every state vector (see [`StateLayout`]). The body set never changes
/// afterwards, so one system can serve concurrent [`solve`](Self::solve)
/// calls.
#[derive(Debug, Clone)]
pub struct System {
    label: Option<String>,
    bodies: Vec<Body>,
    index: HashMap<String, usize>,
    gravity: GravityConfig,
    layout: StateLayout,
    interactions: Vec<Vec2>,
}

impl System {
    /// Creates a system with the default [`GravityConfig`].
    ///
    /// # Errors
    ///
    /// See [`with_gravity`](Self::with_gravity).
    pub fn new(bodies: impl IntoIterator<Item = Body>) -> Result<Self, Error> {
        Self::with_gravity(bodies, GravityConfig::default())
    }

    /// Creates a system with explicit gravity constants.
    ///
    /// Computes and caches the net initial acceleration of every body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if there are no bodies, or
    /// [`Error::DuplicateName`] if two bodies share a name.
    pub fn with_gravity(
        bodies: impl IntoIterator<Item = Body>,
        gravity: GravityConfig,
    ) -> Result<Self, Error> {
        let bodies: Vec<Body> = bodies.into_iter().collect();
        if bodies.is_empty() {
            return Err(ParameterError::NoBodies.into());
        }

        let mut index = HashMap::with_capacity(bodies.len());
        for (position, body) in bodies.iter().enumerate() {
            match index.entry(body.name().to_owned()) {
                Entry::Occupied(entry) => {
                    return Err(Error::DuplicateName {
                        name: body.name().to_owned(),
                        first: *entry.get(),
                        second: position,
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(position);
                }
            }
        }

        let layout = StateLayout::new(bodies.len());
        let mut system = Self {
            label: None,
            bodies,
            index,
            gravity,
            layout,
            interactions: Vec::new(),
        };
        system.interactions = system.calculate_interactions();

        debug!("built system of {} bodies", system.bodies.len());

        Ok(system)
    }

    /// Returns the system with a descriptive label.
    #[must_use]
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the bodies in state-vector order.
    #[must_use]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Always `false`; a system holds at least one body.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Looks up a body by name.
    #[must_use]
    pub fn body(&self, name: &str) -> Option<&Body> {
        self.index_of(name).map(|i| &self.bodies[i])
    }

    /// Returns the position of the named body in state-vector order.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn gravity(&self) -> &GravityConfig {
        &self.gravity
    }

    #[must_use]
    pub fn layout(&self) -> StateLayout {
        self.layout
    }

    /// Iterates over every unordered pair of body indices `(i, j)` with `i < j`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.bodies.len();
        (0..n).flat_map(move |i| (i + 1..n).map(move |j| (i, j)))
    }

    /// Returns the net initial acceleration of each body, cached at
    /// construction.
    ///
    /// These values are diagnostic only; integration recomputes accelerations
    /// from the evolving state.
    #[must_use]
    pub fn interactions(&self) -> &[Vec2] {
        &self.interactions
    }

    /// Returns the cached initial acceleration of the named body.
    #[must_use]
    pub fn interaction(&self, name: &str) -> Option<Vec2> {
        self.index_of(name).map(|i| self.interactions[i])
    }

    /// Computes the net acceleration of each body at its initial position.
    ///
    /// Visits each unordered pair once and applies equal and opposite
    /// contributions. Pairs closer than the coincidence threshold contribute
    /// nothing.
    #[must_use]
    pub fn calculate_interactions(&self) -> Vec<Vec2> {
        let g = self.gravity.gravitational_constant();
        let threshold = self.gravity.coincidence_threshold();
        let mut accelerations = vec![Vec2::ZERO; self.bodies.len()];

        for (i, j) in self.pairs() {
            let (a, b) = (&self.bodies[i], &self.bodies[j]);
            let d = a.distance_to(b);
            if d < threshold {
                debug!(
                    "bodies `{}` and `{}` are closer than {threshold}; skipping their interaction",
                    a.name(),
                    b.name(),
                );
                continue;
            }

            let r = (b.initial_position() - a.initial_position()) * (g / (d * d * d));
            accelerations[i] += r * b.mass();
            accelerations[j] -= r * a.mass();
        }

        accelerations
    }

    /// Returns all initial positions followed by all initial velocities.
    #[must_use]
    pub fn initial_state_vector(&self) -> Vec<f64> {
        let positions: Vec<Vec2> = self.bodies.iter().map(Body::initial_position).collect();
        let velocities: Vec<Vec2> = self.bodies.iter().map(Body::initial_velocity).collect();
        self.layout.encode(&positions, &velocities)
    }

    /// Splits a state vector into per-body positions and velocities.
    ///
    /// # Panics
    ///
    /// Panics if `state` does not have four entries per body.
    #[must_use]
    pub fn decode_state(&self, state: &[f64]) -> (Vec<Vec2>, Vec<Vec2>) {
        self.layout.decode(state)
    }

    /// Flattens per-body positions and velocities into a state vector.
    ///
    /// # Panics
    ///
    /// Panics unless both slices hold one entry per body.
    #[must_use]
    pub fn encode_state(&self, positions: &[Vec2], velocities: &[Vec2]) -> Vec<f64> {
        self.layout.encode(positions, velocities)
    }

    /// Returns `d(state)/dt`: the velocities followed by the accelerations.
    ///
    /// The time `t` is accepted for the integrator's benefit; gravity here does
    /// not depend on it.
    ///
    /// # Panics
    ///
    /// Panics if `state` does not have four entries per body.
    #[must_use]
    pub fn derivatives(&self, state: &[f64], t: f64) -> Vec<f64> {
        let mut out = vec![0.0; self.layout.len()];
        self.derivatives_into(state, t, &mut out);
        out
    }

    /// Writes `d(state)/dt` into `out`.
    ///
    /// For every ordered pair `(i, j)` with `i != j`, body `i` is accelerated
    /// by `G m_j (r_j - r_i) / |r_j - r_i|^3`, unless the pair is closer than
    /// the coincidence threshold.
    ///
    /// # Panics
    ///
    /// Panics if `state` or `out` does not have four entries per body.
    pub fn derivatives_into(&self, state: &[f64], _t: f64, out: &mut [f64]) {
        let layout = self.layout;
        assert_eq!(
            state.len(),
            layout.len(),
            "state vector must have 4 entries per body"
        );
        assert_eq!(
            out.len(),
            layout.len(),
            "derivative buffer must have 4 entries per body"
        );

        let split = layout.velocity_block();
        let (velocity_out, acceleration_out) = out.split_at_mut(split);
        velocity_out.copy_from_slice(&state[split..]);

        for (i, slot) in acceleration_out
            .chunks_exact_mut(StateLayout::STRIDE)
            .enumerate()
        {
            let at = layout.position(state, i);
            let mut acceleration = Vec2::ZERO;

            for (j, source) in self.bodies.iter().enumerate() {
                if i == j {
                    continue;
                }
                let from = layout.position(state, j);
                if let Some(a) = self.gravity.acceleration(at, from, source.mass()) {
                    acceleration += a;
                }
            }

            slot[0] = acceleration.x;
            slot[1] = acceleration.y;
        }
    }

    /// Integrates the system over `times` with the default adaptive integrator.
    ///
    /// Returns one row per time in the layout described by [`StateLayout`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `times` has fewer than two
    /// entries, is not finite, or is not strictly increasing, and
    /// [`Error::Integration`] if the integrator fails.
    pub fn solve(&self, times: &[f64]) -> Result<Trajectory, Error> {
        let grid = TimeGrid::try_from(times)?;
        self.solve_with(&Dopri5::default(), &grid)
    }

    /// Integrates the system over `grid` with a caller-chosen integrator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Integration`] if the integrator fails.
    pub fn solve_with<I: Integrator>(
        &self,
        integrator: &I,
        grid: &TimeGrid,
    ) -> Result<Trajectory, Error> {
        debug!(
            "integrating {} bodies over {} samples from t = {} to t = {}",
            self.bodies.len(),
            grid.len(),
            grid.start(),
            grid.end()
        );

        let initial = self.initial_state_vector();
        integrator
            .integrate(self, &initial, grid)
            .map_err(Error::integration)
    }

    /// Extracts the position of the named body from every trajectory row.
    ///
    /// # Panics
    ///
    /// Panics if the trajectory was not produced from a state of this system's
    /// dimension.
    #[must_use]
    pub fn positions_of(&self, trajectory: &Trajectory, name: &str) -> Option<Vec<Vec2>> {
        let body = self.index_of(name)?;
        Some(
            self.rows(trajectory)
                .map(|row| self.layout.position(row, body))
                .collect(),
        )
    }

    /// Extracts the velocity of the named body from every trajectory row.
    ///
    /// # Panics
    ///
    /// Panics if the trajectory was not produced from a state of this system's
    /// dimension.
    #[must_use]
    pub fn velocities_of(&self, trajectory: &Trajectory, name: &str) -> Option<Vec<Vec2>> {
        let body = self.index_of(name)?;
        Some(
            self.rows(trajectory)
                .map(|row| self.layout.velocity(row, body))
                .collect(),
        )
    }

    fn rows<'t>(&self, trajectory: &'t Trajectory) -> impl Iterator<Item = &'t [f64]> {
        assert_eq!(
            trajectory.dimension(),
            self.layout.len(),
            "trajectory dimension does not match this system"
        );
        trajectory.rows()
    }
}

impl OdeProblem for System {
    type Error = Infallible;

    fn dimension(&self) -> usize {
        self.layout.len()
    }

    fn derivative(&self, state: &[f64], t: f64, out: &mut [f64]) -> Result<(), Infallible> {
        self.derivatives_into(state, t, out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nbody_solvers::transient::rk4::{self, Rk4};

    fn body(mass: f64, position: [f64; 2], velocity: [f64; 2], name: &str) -> Body {
        Body::new(mass, position, velocity).unwrap().named(name)
    }

    fn pair(m1: f64, m2: f64) -> System {
        System::new([
            body(m1, [-0.5, 0.0], [0.0, -0.3], "left"),
            body(m2, [0.5, 0.0], [0.0, 0.3], "right"),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_empty_system() {
        let result = System::new(Vec::new());

        assert!(matches!(
            result,
            Err(Error::InvalidParameter(ParameterError::NoBodies))
        ));
    }

    #[test]
    fn rejects_duplicate_names() {
        let result = System::new([
            body(1.0, [0.0, 0.0], [0.0, 0.0], "a"),
            body(1.0, [1.0, 0.0], [0.0, 0.0], "b"),
            body(1.0, [2.0, 0.0], [0.0, 0.0], "a"),
        ]);

        match result {
            Err(Error::DuplicateName {
                name,
                first,
                second,
            }) => {
                assert_eq!(name, "a");
                assert_eq!((first, second), (0, 2));
            }
            other => panic!("expected duplicate name error, got {other:?}"),
        }
    }

    #[test]
    fn unnamed_bodies_collide_on_default_name() {
        let result = System::new([
            Body::new(1.0, [0.0, 0.0], [0.0, 0.0]).unwrap(),
            Body::new(1.0, [1.0, 0.0], [0.0, 0.0]).unwrap(),
        ]);

        assert!(matches!(result, Err(Error::DuplicateName { .. })));
    }

    #[test]
    fn looks_up_bodies_by_name() {
        let system = pair(1.0, 2.0).labeled("binary");

        assert_eq!(system.label(), Some("binary"));
        assert_eq!(system.index_of("right"), Some(1));
        assert_relative_eq!(system.body("right").unwrap().mass(), 2.0);
        assert!(system.body("missing").is_none());
    }

    #[test]
    fn pairs_visit_each_unordered_pair_once() {
        let system = System::new((0..4).map(|i| {
            body(1.0, [f64::from(i), 0.0], [0.0, 0.0], &format!("b{i}"))
        }))
        .unwrap();

        let pairs: Vec<_> = system.pairs().collect();

        assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn initial_state_round_trips() {
        let system = pair(1.0, 3.0);
        let state = system.initial_state_vector();

        assert_eq!(state, vec![-0.5, 0.0, 0.5, 0.0, 0.0, -0.3, 0.0, 0.3]);

        let (positions, velocities) = system.decode_state(&state);
        for (i, body) in system.bodies().iter().enumerate() {
            assert_eq!(positions[i], body.initial_position());
            assert_eq!(velocities[i], body.initial_velocity());
        }
        assert_eq!(system.encode_state(&positions, &velocities), state);
    }

    #[test]
    fn interactions_obey_third_law() {
        let system = pair(2.0, 5.0);
        let [a1, a2] = [system.interactions()[0], system.interactions()[1]];

        // m1 a1 + m2 a2 = 0
        let net = a1 * 2.0 + a2 * 5.0;
        assert_abs_diff_eq!(net.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(net.y, 0.0, epsilon = 1e-12);

        // |a1| = G m2 / d^2 with d = 1.
        assert_relative_eq!(a1.x, 5.0);
        assert_relative_eq!(a2.x, -2.0);
    }

    #[test]
    fn interactions_balance_across_many_bodies() {
        let system = System::new([
            body(1.0, [0.0, 0.0], [0.0, 0.0], "a"),
            body(2.0, [1.0, 1.0], [0.0, 0.0], "b"),
            body(3.0, [-2.0, 0.5], [0.0, 0.0], "c"),
            body(4.0, [0.5, -3.0], [0.0, 0.0], "d"),
        ])
        .unwrap();

        let net = system
            .bodies()
            .iter()
            .zip(system.interactions())
            .fold(Vec2::ZERO, |sum, (body, a)| sum + *a * body.mass());

        assert_abs_diff_eq!(net.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(net.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn interactions_skip_only_pairs_below_threshold() {
        let system = System::new([
            body(1.0, [0.0, 0.0], [0.0, 0.0], "a"),
            body(1.0, [5e-7, 0.0], [0.0, 0.0], "b"),
            body(1.0, [1.0, 0.0], [0.0, 0.0], "c"),
        ])
        .unwrap();
        let [a, b, c] = [
            system.interactions()[0],
            system.interactions()[1],
            system.interactions()[2],
        ];

        // a and b only feel c; c feels both.
        assert_relative_eq!(a.x, 1.0, max_relative = 1e-5);
        assert_relative_eq!(b.x, 1.0, max_relative = 1e-5);
        assert_relative_eq!(c.x, -2.0, max_relative = 1e-5);
    }

    #[test]
    fn equal_mass_interactions_cancel() {
        let system = pair(1.0, 1.0);
        let net = system.interactions()[0] + system.interactions()[1];

        assert_abs_diff_eq!(net.x, 0.0);
        assert_abs_diff_eq!(net.y, 0.0);
    }

    #[test]
    fn cached_interactions_match_recomputation() {
        let system = System::new([
            body(1.0, [0.0, 0.0], [0.0, 0.0], "a"),
            body(2.0, [1.0, 1.0], [0.0, 0.0], "b"),
            body(3.0, [-2.0, 0.5], [0.0, 0.0], "c"),
        ])
        .unwrap();

        assert_eq!(system.interactions(), system.calculate_interactions().as_slice());
        assert_eq!(system.interaction("c"), Some(system.interactions()[2]));
    }

    #[test]
    fn derivatives_match_initial_interactions() {
        let system = System::new([
            body(1.0, [0.0, 0.0], [0.1, 0.2], "a"),
            body(2.0, [1.0, 1.0], [0.3, 0.4], "b"),
            body(3.0, [-2.0, 0.5], [0.5, 0.6], "c"),
        ])
        .unwrap();

        let state = system.initial_state_vector();
        let derivative = system.derivatives(&state, 0.0);
        let (velocities, accelerations) = system.decode_state(&derivative);

        for (i, body) in system.bodies().iter().enumerate() {
            assert_eq!(velocities[i], body.initial_velocity());
            assert_relative_eq!(accelerations[i].x, system.interactions()[i].x, epsilon = 1e-12);
            assert_relative_eq!(accelerations[i].y, system.interactions()[i].y, epsilon = 1e-12);
        }
    }

    #[test]
    fn derivatives_ignore_time() {
        let system = pair(1.0, 2.0);
        let state = system.initial_state_vector();

        assert_eq!(system.derivatives(&state, 0.0), system.derivatives(&state, 42.0));
    }

    #[test]
    fn single_body_has_no_acceleration() {
        let system = System::new([body(1.0, [3.0, -1.0], [1.0, 2.0], "solo")]).unwrap();
        let state = [7.0, 8.0, 1.0, 2.0];

        assert_eq!(system.derivatives(&state, 5.0), vec![1.0, 2.0, 0.0, 0.0]);
        assert_eq!(system.interactions(), &[Vec2::ZERO]);
    }

    #[test]
    fn coincident_bodies_contribute_nothing() {
        let system = System::new([
            body(1.0, [0.0, 0.0], [0.0, 0.0], "a"),
            body(1.0, [1e-8, 0.0], [0.0, 0.0], "b"),
        ])
        .unwrap();

        assert_eq!(system.interactions(), &[Vec2::ZERO, Vec2::ZERO]);

        let derivative = system.derivatives(&system.initial_state_vector(), 0.0);
        assert!(derivative.iter().all(|v| v.is_finite()));
        assert_eq!(&derivative[4..], &[0.0, 0.0, 0.0, 0.0]);

        let exact_overlap = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(system.derivatives(&exact_overlap, 0.0), vec![0.0; 8]);
    }

    #[test]
    fn custom_gravity_scales_accelerations() {
        let bodies = [
            body(1.0, [0.0, 0.0], [0.0, 0.0], "a"),
            body(1.0, [2.0, 0.0], [0.0, 0.0], "b"),
        ];
        let gravity = GravityConfig::new(4.0, 1e-6).unwrap();
        let system = System::with_gravity(bodies, gravity).unwrap();

        assert_relative_eq!(system.interactions()[0].x, 1.0);
        assert_relative_eq!(system.interactions()[1].x, -1.0);
    }

    #[test]
    #[should_panic(expected = "state vector must have 4 entries per body")]
    fn derivatives_reject_malformed_state() {
        let _ = pair(1.0, 1.0).derivatives(&[0.0; 6], 0.0);
    }

    #[test]
    fn single_body_moves_in_a_straight_line() {
        let system = System::new([body(1.0, [0.0, 0.0], [1.0, 0.0], "solo")]).unwrap();
        let trajectory = system.solve(&[0.0, 1.0, 2.0]).unwrap();

        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.dimension(), 4);

        let positions = system.positions_of(&trajectory, "solo").unwrap();
        for (position, expected) in positions.iter().zip([0.0, 1.0, 2.0]) {
            assert_relative_eq!(position.x, expected, epsilon = 1e-12);
            assert_abs_diff_eq!(position.y, 0.0, epsilon = 1e-12);
        }

        let velocities = system.velocities_of(&trajectory, "solo").unwrap();
        assert!(velocities.iter().all(|v| *v == Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn solve_rejects_malformed_grids() {
        let system = pair(1.0, 1.0);

        for times in [&[][..], &[0.0][..], &[0.0, 0.0][..], &[1.0, 0.5][..]] {
            assert!(
                matches!(
                    system.solve(times),
                    Err(Error::InvalidParameter(ParameterError::TimeGrid(_)))
                ),
                "grid {times:?} should be rejected"
            );
        }
    }

    #[test]
    fn solve_with_rk4_matches_default() {
        let system = pair(1.0, 1.0);
        let grid = TimeGrid::linspace(0.0, 1.0, 101).unwrap();

        let rk4 = Rk4::new(rk4::Config::new(64).unwrap());
        let fixed = system.solve_with(&rk4, &grid).unwrap();
        let adaptive = system.solve(grid.times()).unwrap();

        for (a, b) in fixed.rows().zip(adaptive.rows()) {
            for (x, y) in a.iter().zip(b) {
                assert_abs_diff_eq!(*x, *y, epsilon = 1e-7);
            }
        }
    }

    #[test]
    fn coarse_rk4_converges_toward_default() {
        let system = pair(1.0, 1.0);
        let grid = TimeGrid::linspace(0.0, 1.0, 101).unwrap();
        let adaptive = system.solve(grid.times()).unwrap();

        let max_error = |substeps| {
            let rk4 = Rk4::new(rk4::Config::new(substeps).unwrap());
            let fixed = system.solve_with(&rk4, &grid).unwrap();
            fixed
                .as_slice()
                .iter()
                .zip(adaptive.as_slice())
                .map(|(x, y)| (x - y).abs())
                .fold(0.0, f64::max)
        };

        let coarse = max_error(4);
        let fine = max_error(16);
        assert!(coarse < 1e-4, "coarse error {coarse}");
        assert!(fine < coarse / 100.0, "fine error {fine}, coarse {coarse}");
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn system_is_send_and_sync() {
        assert_send_sync::<System>();
    }

    #[test]
    fn concurrent_solves_agree() {
        let system = crate::scenarios::yin_yang_1a();
        let grid = TimeGrid::linspace(0.0, 1.0, 50).unwrap();
        let serial = system.solve(grid.times()).unwrap();

        let parallel: Vec<Trajectory> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| system.solve(grid.times()).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for trajectory in parallel {
            assert_eq!(trajectory.times(), serial.times());
            assert_eq!(trajectory.as_slice(), serial.as_slice());
        }
    }

    #[test]
    fn integration_failures_are_reported() {
        let system = pair(1.0, 1.0);
        let grid = TimeGrid::linspace(0.0, 100.0, 2).unwrap();
        let config = nbody_solvers::transient::dopri5::Config::default()
            .with_max_steps(3)
            .unwrap();

        let result = system.solve_with(&Dopri5::new(config), &grid);

        assert!(matches!(result, Err(Error::Integration(_))));
    }

    #[test]
    fn unknown_names_have_no_track() {
        let system = pair(1.0, 1.0);
        let trajectory = system.solve(&[0.0, 0.1]).unwrap();

        assert!(system.positions_of(&trajectory, "nobody").is_none());
    }
}
