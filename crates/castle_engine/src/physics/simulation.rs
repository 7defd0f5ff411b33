//! Box physics simulation
//!
//! Owns dynamic bodies, immutable static geometry and the broad phase over
//! that geometry. Each step integrates gravity and forces with semi-implicit
//! Euler, then resolves translation one axis at a time:
//!
//! 1. Static test: project to the 2D grid, query the spatial index.
//! 2. Dynamic test: brute force against every other dynamic body.
//!
//! A blocked move is reverted; there is no push response between dynamic
//! bodies. Bodies resting on the ground plane with negligible velocity are
//! put to sleep and skipped until woken.

use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU32, Ordering};

use log::{debug, trace};

use super::body::{Body, BodyHandle, SimulationId};
use super::bounding_volume::BoundingVolume;
use crate::core::config::PhysicsConfig;
use crate::foundation::collections::{KeySet, SlotMap};
use crate::foundation::math::{utils::round_to, Axis, Vec3};
use crate::spatial::{Quadtree, Rect, SpatialIndex};

static NEXT_SIMULATION_ID: AtomicU32 = AtomicU32::new(1);

/// Physics world for one level
pub struct Simulation {
    id: SimulationId,
    config: PhysicsConfig,

    /// Dynamic body storage
    bodies: SlotMap<BodyHandle, Body>,

    /// Dynamic bodies in insertion order (resolution order)
    order: Vec<BodyHandle>,

    /// Subset of dynamic bodies skipped by `step`
    sleeping: KeySet<BodyHandle>,

    /// Level geometry, scaled and fixed at construction
    static_bodies: Vec<Body>,

    /// Broad phase over `static_bodies`
    geometry: Box<dyn SpatialIndex>,

    timestep: f32,
    gravity_delta: Vec3,
    ground_friction: f32,
}

impl Simulation {
    /// Create a simulation with a quadtree over `geometry`.
    ///
    /// `bodies` and `geometry` are scaled by `config.scaling` on the way in.
    pub fn new(config: PhysicsConfig, bodies: Vec<Body>, geometry: Vec<BoundingVolume>) -> Self {
        let spatial = config.spatial.clone();
        Self::with_index(config, bodies, geometry, |rects| Box::new(Quadtree::new(rects, &spatial)))
    }

    /// Create a simulation from level rectangles lifted through the projection
    pub fn from_rects(config: PhysicsConfig, bodies: Vec<Body>, rects: &[Rect]) -> Self {
        let projection = config.projection;
        let geometry = rects.iter().map(|rect| projection.volume_from_rect(rect)).collect();
        Self::new(config, bodies, geometry)
    }

    /// Create a simulation with a caller-supplied broad phase
    pub fn with_index<F>(config: PhysicsConfig, bodies: Vec<Body>, geometry: Vec<BoundingVolume>, build_index: F) -> Self
    where
        F: FnOnce(&[Rect]) -> Box<dyn SpatialIndex>,
    {
        let id = SimulationId(NEXT_SIMULATION_ID.fetch_add(1, Ordering::Relaxed));
        let scaling = config.scaling;

        let static_bodies: Vec<Body> = geometry
            .into_iter()
            .map(|mut volume| {
                volume.scale(scaling, scaling, scaling);
                Body::fixed(volume)
            })
            .collect();
        let rects: Vec<Rect> = static_bodies
            .iter()
            .map(|body| config.projection.to_query_rect(&body.volume))
            .collect();
        let geometry = build_index(&rects);

        debug!(
            "Simulation {:?}: {} static bodies, {:?} projection",
            id,
            static_bodies.len(),
            config.projection
        );

        let timestep = config.timestep;
        let mut simulation = Self {
            id,
            config,
            bodies: SlotMap::with_key(),
            order: Vec::new(),
            sleeping: KeySet::new(),
            static_bodies,
            geometry,
            timestep: 0.0,
            gravity_delta: Vec3::zeros(),
            ground_friction: 0.0,
        };
        simulation.set_timestep(timestep);

        for mut body in bodies {
            body.volume.scale(scaling, scaling, scaling);
            simulation.add(body);
        }
        simulation
    }

    /// Identity used as the owner back-reference of added bodies
    pub fn id(&self) -> SimulationId {
        self.id
    }

    /// Physics constants
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Current step length
    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    /// Per-step ground friction factor
    pub fn ground_friction(&self) -> f32 {
        self.ground_friction
    }

    /// Change the step length, recomputing derived per-step constants
    pub fn set_timestep(&mut self, timestep: f32) {
        self.timestep = timestep;
        self.gravity_delta = Vec3::new(0.0, 0.0, self.config.gravity * timestep);
        self.ground_friction = self.config.ground_friction_base.powf(timestep);
    }

    /// Add a dynamic body. Panics if it already belongs to a simulation.
    pub fn add(&mut self, mut body: Body) -> BodyHandle {
        assert!(
            body.owner().is_none(),
            "body already belongs to simulation {:?}",
            body.owner()
        );
        body.set_owner(Some(self.id));
        let handle = self.bodies.insert(body);
        self.order.push(handle);
        debug!("Simulation {:?}: added body {:?}", self.id, handle);
        handle
    }

    /// Remove a dynamic body and return it. Panics if it is not present.
    pub fn remove(&mut self, handle: BodyHandle) -> Body {
        let Some(mut body) = self.bodies.remove(handle) else {
            panic!("body {:?} is not in simulation {:?}", handle, self.id);
        };
        self.order.retain(|&h| h != handle);
        self.sleeping.remove(handle);
        body.set_owner(None);
        debug!("Simulation {:?}: removed body {:?}", self.id, handle);
        body
    }

    /// True if `handle` names a dynamic body in this simulation
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    /// Borrow a dynamic body
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    /// Mutably borrow a dynamic body. Does not wake it.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    /// Dynamic bodies in insertion order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> + '_ {
        self.order.iter().map(move |&handle| (handle, &self.bodies[handle]))
    }

    /// Static geometry bodies
    pub fn static_bodies(&self) -> &[Body] {
        &self.static_bodies
    }

    /// Every body, dynamic first
    pub fn iter(&self) -> impl Iterator<Item = &Body> + '_ {
        self.bodies().map(|(_, body)| body).chain(self.static_bodies.iter())
    }

    /// Number of dynamic bodies
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when there are no dynamic bodies
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// True if the body is skipped by `step`
    pub fn is_sleeping(&self, handle: BodyHandle) -> bool {
        self.sleeping.contains(handle)
    }

    /// Number of sleeping bodies
    pub fn sleeping_count(&self) -> usize {
        self.sleeping.len()
    }

    /// Resume integrating a sleeping body; no-op if awake
    pub fn wake(&mut self, handle: BodyHandle) {
        if self.sleeping.remove(handle) {
            trace!("Simulation {:?}: woke body {:?}", self.id, handle);
        }
    }

    /// Advance every awake body by one step of `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if (dt - self.timestep).abs() > f32::EPSILON {
            self.set_timestep(dt);
        }

        trace!(
            "Simulation {:?}: step dt={} awake={}",
            self.id,
            dt,
            self.order.len() - self.sleeping.len()
        );

        for index in 0..self.order.len() {
            let handle = self.order[index];
            if !self.sleeping.contains(handle) {
                self.step_body(handle);
            }
        }
    }

    #[allow(clippy::float_cmp)]
    fn step_body(&mut self, handle: BodyHandle) {
        let dt = self.timestep;
        let body = &mut self.bodies[handle];

        if !body.gravity {
            self.sleeping.insert(handle);
            return;
        }

        body.acceleration += self.gravity_delta;
        let force_term = body.force() / body.mass;
        body.velocity += (body.acceleration + force_term) * dt;
        let velocity = body.velocity;

        for axis in [Axis::X, Axis::Y] {
            let speed = velocity[axis.index()];
            if speed != 0.0 && !self.move_body(handle, axis.delta(speed * dt)) {
                if speed.abs() > self.config.axis_stop_threshold {
                    trace!("body {:?} hard stop on {:?} at {}", handle, axis, speed);
                }
                let body = &mut self.bodies[handle];
                body.velocity[axis.index()] = 0.0;
                body.acceleration[axis.index()] = 0.0;
            }
        }

        let mut grounded = false;
        if velocity.z > 0.0 {
            let fall = velocity.z * dt;
            let blocked_at = self.bodies[handle].volume.position.z + fall;
            if !self.move_body(handle, Axis::Z.delta(fall)) {
                self.settle(handle, blocked_at);
                let body = &mut self.bodies[handle];
                body.acceleration.z = 0.0;
                body.velocity.z = if body.velocity.z.abs() > self.config.bounce_threshold {
                    -body.velocity.z * self.config.bounce_damping
                } else {
                    0.0
                };
                grounded = true;
            }
        } else if velocity.z < 0.0 {
            self.move_body(handle, Axis::Z.delta(velocity.z * dt));
        }

        let ground_friction = self.ground_friction;
        let body = &mut self.bodies[handle];
        body.record_contact(grounded);

        if body.volume.bottom() == 0.0 {
            body.velocity.x *= ground_friction;
            body.velocity.y *= ground_friction;
        }

        let v = body.velocity;
        let lateral = self.config.lateral_sleep_precision;
        let at_rest = round_to(v.x, lateral) == 0.0
            && round_to(v.y, lateral) == 0.0
            && round_to(v.z, self.config.vertical_sleep_precision) == 0.0;
        if at_rest && body.volume.bottom() == 0.0 {
            self.sleeping.insert(handle);
            trace!("Simulation {:?}: body {:?} asleep", self.id, handle);
        }
    }

    /// Lower a body whose descent was blocked onto whole units below
    /// `blocked_at`, stopping at the last free one.
    fn settle(&mut self, handle: BodyHandle, blocked_at: f32) {
        let mut target = self.bodies[handle].volume.position.z.ceil();
        while target < blocked_at {
            let current = self.bodies[handle].volume.position.z;
            if target > current {
                if !self.move_body(handle, Axis::Z.delta(target - current)) {
                    break;
                }
                self.bodies[handle].volume.position.z = target;
            }
            target += 1.0;
        }
    }

    /// Tentatively translate a body, reverting if the move is blocked.
    ///
    /// Returns true if the move was kept; a blocked move restores the volume
    /// exactly. A body blocked by static geometry while below the floor clamp
    /// depth is snapped to it instead.
    pub fn move_body(&mut self, handle: BodyHandle, delta: Vec3) -> bool {
        assert!(self.bodies.contains_key(handle), "body {handle:?} is not in this simulation");

        let before = self.bodies[handle].volume;
        self.bodies[handle].volume.translate(&delta);
        let volume = self.bodies[handle].volume;

        if self.colliding_with_static(&volume) {
            let floor = self.config.floor_clamp_depth;
            let body = &mut self.bodies[handle];
            let clamped = body.volume.position.z < floor;
            body.volume = before;
            if clamped {
                body.volume.position.z = floor;
            }
            return false;
        }

        if self.bodies_colliding_with(volume, Some(handle)).next().is_some() {
            self.bodies[handle].volume = before;
            return false;
        }

        true
    }

    /// True if `volume` overlaps static geometry on the projection grid
    pub fn colliding_with_static(&self, volume: &BoundingVolume) -> bool {
        let rect = self.config.projection.to_query_rect(volume);
        !self.geometry.query(&rect).is_empty()
    }

    /// Dynamic bodies intersecting `volume`, lazily, skipping `exclude`
    pub fn bodies_colliding_with(
        &self,
        volume: BoundingVolume,
        exclude: Option<BodyHandle>,
    ) -> impl Iterator<Item = BodyHandle> + '_ {
        self.bodies()
            .filter(move |&(handle, body)| Some(handle) != exclude && volume.intersects(&body.volume))
            .map(|(handle, _)| handle)
    }

    /// First other dynamic body intersecting the body's volume
    pub fn test_collision_body(&self, handle: BodyHandle) -> Option<BodyHandle> {
        let volume = self.bodies.get(handle)?.volume;
        self.bodies_colliding_with(volume, Some(handle)).next()
    }
}

impl Index<BodyHandle> for Simulation {
    type Output = Body;

    fn index(&self, handle: BodyHandle) -> &Body {
        &self.bodies[handle]
    }
}

impl IndexMut<BodyHandle> for Simulation {
    fn index_mut(&mut self, handle: BodyHandle) -> &mut Body {
        &mut self.bodies[handle]
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("id", &self.id)
            .field("bodies", &self.order.len())
            .field("sleeping", &self.sleeping.len())
            .field("static_bodies", &self.static_bodies.len())
            .field("timestep", &self.timestep)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Projection;
    use crate::spatial::LinearIndex;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn actor_at(y: f32, z: f32) -> Body {
        Body::new(BoundingVolume::from_components(0.0, y, z, 16.0, 16.0, 32.0))
    }

    /// Floor a 32-high body stands on at z = 0
    fn floor() -> Rect {
        Rect::new(-500, 32, 1000, 16)
    }

    #[test]
    fn test_gravity_free_body_sleeps_untouched() {
        let mut sim = Simulation::new(PhysicsConfig::default(), vec![], vec![]);
        let handle = sim.add(Body::fixed(BoundingVolume::from_components(0.0, 0.0, -50.0, 1.0, 1.0, 1.0)).with_velocity(Vec3::new(1.0, 2.0, 3.0)));

        sim.step(DT);
        let body = sim.body(handle).unwrap();
        assert_eq!(body.velocity, Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(body.volume.bottom(), -50.0);
        assert!(sim.is_sleeping(handle));
    }

    #[test]
    fn test_resting_body_stays_asleep() {
        let mut sim = Simulation::from_rects(PhysicsConfig::default(), vec![], &[floor()]);
        let handle = sim.add(actor_at(0.0, 0.0));

        sim.step(DT);
        assert!(sim.is_sleeping(handle));
        assert!(sim.body(handle).unwrap().grounded());

        for _ in 0..30 {
            sim.step(DT);
        }
        let body = sim.body(handle).unwrap();
        assert!(sim.is_sleeping(handle));
        assert_relative_eq!(body.volume.bottom(), 0.0);

        sim.wake(handle);
        assert!(!sim.is_sleeping(handle));
    }

    #[test]
    fn test_falling_body_lands() {
        let mut sim = Simulation::from_rects(PhysicsConfig::default(), vec![], &[floor()]);
        let handle = sim.add(actor_at(0.0, -40.0));

        let mut landings = 0;
        for _ in 0..240 {
            sim.step(DT);
            if sim.body(handle).is_some_and(Body::landed) {
                landings += 1;
            }
        }
        let body = sim.body(handle).unwrap();
        assert!(body.grounded());
        assert!(landings >= 1);
        assert_eq!(body.volume.bottom(), 0.0);
        assert!(sim.is_sleeping(handle));
    }

    #[test]
    fn test_grounded_body_slides_on_floor() {
        let mut sim = Simulation::from_rects(PhysicsConfig::default(), vec![], &[floor()]);
        let handle = sim.add(actor_at(0.0, 0.0));
        sim.step(DT);
        assert!(sim.is_sleeping(handle));

        sim.wake(handle);
        sim.body_mut(handle).unwrap().velocity.y = 60.0;
        sim.step(DT);

        let body = sim.body(handle).unwrap();
        assert!(body.grounded());
        assert_eq!(body.volume.bottom(), 0.0);
        assert_relative_eq!(body.volume.left(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(body.velocity.y, 60.0 * sim.ground_friction(), epsilon = 1e-3);
    }

    #[test]
    fn test_landed_body_slows_and_sleeps() {
        let mut sim = Simulation::from_rects(PhysicsConfig::default(), vec![], &[floor()]);
        let handle = sim.add(actor_at(0.0, -40.0).with_velocity(Vec3::new(0.0, 60.0, 0.0)));

        let mut steps = 0;
        while !sim.body(handle).is_some_and(Body::landed) {
            sim.step(DT);
            steps += 1;
            assert!(steps < 120, "body never landed");
        }
        let body = sim.body(handle).unwrap();
        assert_eq!(body.volume.bottom(), 0.0);
        let landing_speed = body.velocity.y;

        for _ in 0..30 {
            sim.step(DT);
        }
        assert!(sim.body(handle).unwrap().velocity.y < landing_speed / 2.0);

        for _ in 0..300 {
            sim.step(DT);
        }
        let body = sim.body(handle).unwrap();
        assert!(sim.is_sleeping(handle));
        assert_eq!(body.volume.bottom(), 0.0);
        assert!(body.velocity.y.abs() < 1e-3);
        let resting_y = body.volume.left();

        sim.step(DT);
        assert_relative_eq!(sim.body(handle).unwrap().volume.left(), resting_y);
    }

    #[test]
    fn test_friction_is_frame_rate_independent() {
        let mut sim = Simulation::new(PhysicsConfig::default(), vec![], vec![]);
        sim.set_timestep(DT);
        let per_frame = sim.ground_friction();
        sim.set_timestep(DT * 4.0);
        assert_relative_eq!(per_frame.powi(4), sim.ground_friction(), max_relative = 1e-4);
    }

    #[test]
    fn test_step_adopts_new_timestep() {
        let mut sim = Simulation::new(PhysicsConfig::default(), vec![], vec![]);
        sim.step(0.5);
        assert_relative_eq!(sim.timestep(), 0.5);
    }

    #[test]
    fn test_x_collision_reverts_only_x() {
        let config = PhysicsConfig::default()
            .with_projection(Projection::Adventure)
            .with_gravity(0.0);
        let wall = Rect::new(20, -50, 10, 100);
        let mut sim = Simulation::from_rects(config, vec![], &[wall]);
        let handle = sim.add(
            Body::new(BoundingVolume::from_components(0.0, 0.0, 5.0, 16.0, 16.0, 16.0))
                .with_velocity(Vec3::new(600.0, 60.0, 0.0)),
        );

        sim.step(DT);
        let body = sim.body(handle).unwrap();
        assert_relative_eq!(body.volume.back(), 0.0);
        assert_relative_eq!(body.velocity.x, 0.0);
        assert_relative_eq!(body.volume.left(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(body.velocity.y, 60.0);
    }

    #[test]
    fn test_dynamic_bodies_block_without_push() {
        let config = PhysicsConfig::default().with_gravity(0.0);
        let mut sim = Simulation::new(config, vec![], vec![]);
        let mover = sim.add(actor_at(0.0, -100.0).with_velocity(Vec3::new(0.0, 600.0, 0.0)));
        let target = sim.add(actor_at(20.0, -100.0));

        sim.step(DT);
        assert_relative_eq!(sim.body(mover).unwrap().volume.left(), 0.0);
        assert_relative_eq!(sim.body(mover).unwrap().velocity.y, 0.0);
        assert_relative_eq!(sim.body(target).unwrap().volume.left(), 20.0);
        assert_eq!(sim.test_collision_body(mover), None);
    }

    #[test]
    fn test_floor_clamp_keeps_vertical_move() {
        let wall = Rect::new(20, -60, 10, 120);
        let config = PhysicsConfig::default().with_gravity(0.0);
        let mut sim = Simulation::from_rects(config, vec![], &[wall]);
        let handle = sim.add(actor_at(0.0, -12.0));

        assert!(!sim.move_body(handle, Vec3::new(0.0, 10.0, 0.0)));
        let body = sim.body(handle).unwrap();
        assert_relative_eq!(body.volume.left(), 0.0);
        assert_relative_eq!(body.volume.bottom(), -10.0);
    }

    #[test]
    fn test_force_term_is_integrated() {
        let config = PhysicsConfig::default().with_gravity(0.0);
        let mut sim = Simulation::new(config, vec![], vec![]);
        let handle = sim.add(actor_at(0.0, -100.0).with_mass(2.0));
        sim.body_mut(handle).unwrap().apply_force(Vec3::new(0.0, 120.0, 0.0));

        sim.step(DT);
        assert_relative_eq!(sim.body(handle).unwrap().velocity.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_queries() {
        let config = PhysicsConfig::default().with_gravity(0.0);
        let mut sim = Simulation::with_index(config, vec![], vec![BoundingVolume::from_components(0.0, 100.0, 0.0, 1.0, 10.0, 10.0)], |rects| {
            Box::new(LinearIndex::new(rects.to_vec()))
        });
        let a = sim.add(actor_at(0.0, -100.0));
        let b = sim.add(actor_at(8.0, -100.0));

        let probe = BoundingVolume::from_components(0.0, 10.0, -90.0, 1.0, 1.0, 1.0);
        let hits: Vec<_> = sim.bodies_colliding_with(probe, None).collect();
        assert_eq!(hits, vec![a, b]);
        let hits: Vec<_> = sim.bodies_colliding_with(probe, Some(a)).collect();
        assert_eq!(hits, vec![b]);
        assert_eq!(sim.test_collision_body(a), Some(b));

        assert!(sim.colliding_with_static(&BoundingVolume::from_components(0.0, 105.0, 5.0, 1.0, 1.0, 1.0)));
        assert!(!sim.colliding_with_static(&probe));
        assert_eq!(sim.iter().count(), 3);
    }

    #[test]
    fn test_scaling_applies_on_construction() {
        let config = PhysicsConfig::default().with_scaling(2.0);
        let sim = Simulation::new(config, vec![actor_at(4.0, 0.0)], vec![BoundingVolume::from_components(0.0, 1.0, 2.0, 1.0, 3.0, 4.0)]);
        let (_, body) = sim.bodies().next().unwrap();
        assert_relative_eq!(body.volume.left(), 8.0);
        assert_relative_eq!(body.volume.height(), 64.0);
        assert_relative_eq!(sim.static_bodies()[0].volume.width(), 6.0);
    }

    #[test]
    fn test_add_remove_ownership() {
        let mut sim = Simulation::new(PhysicsConfig::default(), vec![], vec![]);
        let handle = sim.add(actor_at(0.0, 0.0));
        assert_eq!(sim.body(handle).unwrap().owner(), Some(sim.id()));

        let body = sim.remove(handle);
        assert_eq!(body.owner(), None);
        assert!(!sim.contains(handle));
        assert!(sim.is_empty());

        let again = sim.add(body);
        assert_ne!(again, handle);
    }

    #[test]
    #[should_panic(expected = "is not in simulation")]
    fn test_remove_absent_body_panics() {
        let mut sim = Simulation::new(PhysicsConfig::default(), vec![], vec![]);
        let handle = sim.add(actor_at(0.0, 0.0));
        sim.remove(handle);
        sim.remove(handle);
    }

    #[test]
    #[should_panic(expected = "already belongs")]
    fn test_adding_owned_body_panics() {
        let mut first = Simulation::new(PhysicsConfig::default(), vec![], vec![]);
        let mut second = Simulation::new(PhysicsConfig::default(), vec![], vec![]);
        let handle = first.add(actor_at(0.0, 0.0));
        let body = first.body(handle).unwrap().clone();
        second.add(body);
    }
}
