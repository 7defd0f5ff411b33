//! Lock-guarded simulation with deferred mutation
//!
//! Mutations that find the simulation busy are queued instead of blocking and
//! applied at the start of the next [`SharedSimulation::update`].

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use log::{debug, warn};

use super::body::{Body, BodyHandle};
use super::simulation::Simulation;

/// Receipt for a mutation that was queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Outcome of a mutation request
#[derive(Debug)]
pub enum Mutation<T> {
    /// Applied immediately
    Applied(T),
    /// Deferred to the next update
    Queued(Ticket),
}

impl<T> Mutation<T> {
    /// Value of an immediate mutation
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Queued(_) => None,
        }
    }
}

/// Deferred simulation mutation
#[derive(Debug)]
pub enum PendingOp {
    /// Add a body
    Add(Body),
    /// Remove a body
    Remove(BodyHandle),
}

#[derive(Debug, Default)]
struct PendingQueue {
    ops: VecDeque<(Ticket, PendingOp)>,
    added: HashMap<Ticket, BodyHandle>,
    removed: HashMap<Ticket, Body>,
    next_ticket: u64,
}

impl PendingQueue {
    fn push(&mut self, op: PendingOp) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.ops.push_back((ticket, op));
        ticket
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("recovering poisoned lock");
        PoisonError::into_inner(poisoned)
    })
}

/// Shared handle to a simulation
#[derive(Debug, Clone)]
pub struct SharedSimulation {
    simulation: Arc<Mutex<Simulation>>,
    pending: Arc<Mutex<PendingQueue>>,
}

impl SharedSimulation {
    /// Wrap a simulation
    pub fn new(simulation: Simulation) -> Self {
        Self {
            simulation: Arc::new(Mutex::new(simulation)),
            pending: Arc::new(Mutex::new(PendingQueue::default())),
        }
    }

    fn try_simulation(&self) -> Option<MutexGuard<'_, Simulation>> {
        match self.simulation.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    fn defer(&self, op: PendingOp) -> Ticket {
        let ticket = lock(&self.pending).push(op);
        debug!("simulation busy, queued mutation {:?}", ticket);
        ticket
    }

    /// Add a body now, or queue it if the simulation is locked
    pub fn add(&self, body: Body) -> Mutation<BodyHandle> {
        match self.try_simulation() {
            Some(mut simulation) => Mutation::Applied(simulation.add(body)),
            None => Mutation::Queued(self.defer(PendingOp::Add(body))),
        }
    }

    /// Remove a body now, or queue it if the simulation is locked
    pub fn remove(&self, handle: BodyHandle) -> Mutation<Body> {
        match self.try_simulation() {
            Some(mut simulation) => Mutation::Applied(simulation.remove(handle)),
            None => Mutation::Queued(self.defer(PendingOp::Remove(handle))),
        }
    }

    /// Take the handle assigned to a queued add, once applied.
    ///
    /// Each ticket resolves once; later calls return `None`.
    pub fn resolve(&self, ticket: Ticket) -> Option<BodyHandle> {
        lock(&self.pending).added.remove(&ticket)
    }

    /// Take the body taken out by a queued remove, once applied
    pub fn take_removed(&self, ticket: Ticket) -> Option<Body> {
        lock(&self.pending).removed.remove(&ticket)
    }

    /// Number of mutations waiting for the next update
    pub fn pending_len(&self) -> usize {
        lock(&self.pending).ops.len()
    }

    /// Apply queued mutations, then step.
    ///
    /// A queued remove whose body is already gone is skipped with a warning.
    pub fn update(&self, dt: f32) {
        let mut simulation = lock(&self.simulation);
        let ops: Vec<_> = lock(&self.pending).ops.drain(..).collect();

        for (ticket, op) in ops {
            match op {
                PendingOp::Add(body) => {
                    let handle = simulation.add(body);
                    lock(&self.pending).added.insert(ticket, handle);
                }
                PendingOp::Remove(handle) if simulation.contains(handle) => {
                    let body = simulation.remove(handle);
                    lock(&self.pending).removed.insert(ticket, body);
                }
                PendingOp::Remove(handle) => {
                    warn!("queued remove {:?}: body {:?} is already gone", ticket, handle);
                }
            }
        }

        simulation.step(dt);
    }

    /// Run `f` with exclusive access to the simulation
    pub fn with<R>(&self, f: impl FnOnce(&mut Simulation) -> R) -> R {
        f(&mut lock(&self.simulation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PhysicsConfig;
    use crate::physics::BoundingVolume;

    fn body() -> Body {
        Body::new(BoundingVolume::from_components(0.0, 0.0, -100.0, 4.0, 4.0, 4.0))
    }

    fn shared() -> SharedSimulation {
        SharedSimulation::new(Simulation::new(PhysicsConfig::default(), vec![], vec![]))
    }

    #[test]
    fn test_uncontended_add_applies() {
        let shared = shared();
        let handle = shared.add(body()).applied().unwrap();
        assert!(shared.with(|sim| sim.contains(handle)));
        assert!(shared.remove(handle).applied().is_some());
    }

    #[test]
    fn test_contended_add_is_queued_until_update() {
        let shared = shared();
        let other = shared.clone();

        let ticket = shared.with(|_| match other.add(body()) {
            Mutation::Queued(ticket) => ticket,
            Mutation::Applied(_) => panic!("lock was held"),
        });
        assert_eq!(shared.pending_len(), 1);
        assert_eq!(shared.resolve(ticket), None);
        assert_eq!(shared.with(|sim| sim.len()), 0);

        shared.update(1.0 / 60.0);
        let handle = shared.resolve(ticket).unwrap();
        assert!(shared.with(|sim| sim.contains(handle)));
        assert_eq!(shared.pending_len(), 0);
        assert_eq!(shared.resolve(ticket), None);
    }

    #[test]
    fn test_contended_remove_is_queued() {
        let shared = shared();
        let handle = shared.add(body()).applied().unwrap();

        let Mutation::Queued(ticket) = shared.with(|_| shared.remove(handle)) else {
            panic!("lock was held");
        };
        assert!(shared.with(|sim| sim.contains(handle)));
        assert!(shared.take_removed(ticket).is_none());

        shared.update(1.0 / 60.0);
        assert!(!shared.with(|sim| sim.contains(handle)));
        let body = shared.take_removed(ticket).unwrap();
        assert_eq!(body.owner(), None);
        assert!(shared.take_removed(ticket).is_none());
    }

    #[test]
    fn test_queued_remove_of_missing_body_is_skipped() {
        let shared = shared();
        let handle = shared.add(body()).applied().unwrap();

        let (first, second) = shared.with(|_| (shared.remove(handle), shared.remove(handle)));
        let (Mutation::Queued(first), Mutation::Queued(second)) = (first, second) else {
            panic!("lock was held");
        };

        shared.update(1.0 / 60.0);
        assert!(shared.take_removed(first).is_some());
        assert!(shared.take_removed(second).is_none());
        assert!(shared.with(|sim| sim.is_empty()));
        assert_eq!(shared.pending_len(), 0);
    }
}
