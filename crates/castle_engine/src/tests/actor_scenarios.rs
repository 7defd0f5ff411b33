//! Actors walking, jumping and falling through a level
//!
//! Every frame follows the host order: triggers, motor, physics step, state update.

use crate::actions::{Command, StateKind, Trigger};
use crate::actor::{Actor, ActorProfile, EntityId, Environment};
use crate::animation::HeadlessAnimator;
use crate::audio::SoundManager;
use crate::core::config::PhysicsConfig;
use crate::foundation::math::Vec3;
use crate::foundation::time::FrameContext;
use crate::physics::Simulation;
use crate::spatial::Rect;

const DT: f32 = 1.0 / 60.0;

struct Scene {
    simulation: Simulation,
    audio: SoundManager,
    frame: FrameContext,
    hero: Actor,
    visited: Vec<StateKind>,
}

impl Scene {
    /// Hero standing at the origin on `rects`
    fn new(rects: &[Rect]) -> Self {
        let mut simulation = Simulation::from_rects(PhysicsConfig::default(), vec![], rects);
        let profile = ActorProfile::default();
        let handle = simulation.add(profile.spawn_body(Vec3::zeros()));
        let mut audio = SoundManager::new();
        let frame = FrameContext::new((320, 240));

        let hero = {
            let mut env = Environment {
                simulation: &mut simulation,
                audio: &mut audio,
                frame: &frame,
            };
            Actor::new(EntityId(1), handle, profile, Box::new(HeadlessAnimator::new(0.1)), &mut env)
        };

        let mut scene = Self {
            simulation,
            audio,
            frame,
            hero,
            visited: Vec::new(),
        };
        scene.run(1, &[]);
        scene
    }

    fn run(&mut self, frames: usize, triggers: &[Trigger]) {
        for index in 0..frames {
            let mut env = Environment {
                simulation: &mut self.simulation,
                audio: &mut self.audio,
                frame: &self.frame,
            };
            if index == 0 {
                for &trigger in triggers {
                    self.hero.handle_trigger(trigger, &mut env);
                }
            }
            self.hero.drive(env.simulation, DT);
            env.simulation.step(DT);
            self.hero.update(DT, &mut env);

            self.frame = self.frame.next(DT);
            if let Some(kind) = self.hero.active_state() {
                if self.visited.last() != Some(&kind) {
                    self.visited.push(kind);
                }
            }
        }
    }

    fn position(&self) -> Vec3 {
        self.simulation[self.hero.body()].volume.position
    }
}

fn floor() -> Rect {
    Rect::new(-1000, 32, 2000, 16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_walk_brake_and_rest() {
        let mut scene = Scene::new(&[floor()]);
        assert_eq!(scene.hero.active_state(), Some(StateKind::Idle));

        scene.run(30, &[Trigger::pressed(Command::Left)]);
        assert_eq!(scene.hero.active_state(), Some(StateKind::Move));
        assert!(scene.position().y > 20.0);

        scene.run(90, &[Trigger::released(Command::Left)]);
        assert_eq!(
            scene.visited,
            vec![StateKind::Idle, StateKind::Move, StateKind::Brake, StateKind::Unbrake, StateKind::Idle]
        );
        assert!(scene.audio.is_playing("stop.wav"));
        assert!(scene.simulation.is_sleeping(scene.hero.body()));
        assert_relative_eq!(scene.position().z, 0.0);
    }

    #[test]
    fn test_jump_falls_back_to_idle() {
        let mut scene = Scene::new(&[floor()]);
        scene.run(240, &[Trigger::pressed(Command::Up)]);

        assert!(scene.visited.contains(&StateKind::Jump));
        assert!(scene.visited.contains(&StateKind::Fall));
        assert_eq!(scene.hero.active_state(), Some(StateKind::Idle));
        assert_eq!(scene.position().z, 0.0);
        assert!(scene.simulation.is_sleeping(scene.hero.body()));
    }

    #[test]
    fn test_running_off_a_ledge_recovers_on_landing() {
        let ledge = Rect::new(-1000, 32, 1020, 16);
        let pit = Rect::new(-1000, 96, 2000, 16);
        let mut scene = Scene::new(&[ledge, pit]);

        scene.run(300, &[Trigger::pressed(Command::Left)]);

        let fall = scene.visited.iter().position(|&k| k == StateKind::Fall);
        let recover = scene.visited.iter().position(|&k| k == StateKind::FallRecover);
        assert!(fall.is_some() && recover > fall);
        assert_eq!(scene.hero.active_state(), Some(StateKind::Move));
        assert_eq!(scene.position().z, 64.0);
        assert!(scene.position().y > 100.0);
        assert_relative_eq!(scene.hero.motor().rate, scene.hero.profile().max_speed);
    }

    #[test]
    fn test_dead_hero_ignores_input_and_despawns() {
        let mut scene = Scene::new(&[floor()]);
        {
            let mut env = Environment {
                simulation: &mut scene.simulation,
                audio: &mut scene.audio,
                frame: &scene.frame,
            };
            scene.hero.kill(&mut env);
        }
        scene.run(10, &[Trigger::pressed(Command::Left), Trigger::pressed(Command::Up)]);
        assert!(scene.hero.is_dead());
        assert_relative_eq!(scene.position().y, 0.0);

        let Scene {
            mut simulation,
            mut audio,
            frame,
            hero,
            ..
        } = scene;
        let mut env = Environment {
            simulation: &mut simulation,
            audio: &mut audio,
            frame: &frame,
        };
        let body = hero.despawn(&mut env);
        assert!(body.owner().is_none());
        assert!(simulation.is_empty());
    }
}
