//! Deterministic stand-in for the physics layer and the player.
//!
//! Enemies descend at their spawn velocity until they cross the bottom of
//! the field. The autopilot fires whenever an enemy is not yet targeted, and
//! each accepted bullet either strikes its target after a fixed flight time
//! or misses and leaves the field.

use std::time::Duration;

use rand::Rng;
use skyfall_core::{Command, Event};

use crate::config::AutopilotConfig;

/// Time a bullet needs to reach its target or leave the field.
const BULLET_FLIGHT: Duration = Duration::from_millis(250);

#[derive(Debug)]
struct Enemy {
    id: u64,
    depth: f32,
    velocity: f32,
    targeted: bool,
}

#[derive(Debug)]
struct Bullet {
    target: Option<u64>,
    remaining: Duration,
}

/// Simulated play field feeding collision reports to the controller.
#[derive(Debug)]
pub(crate) struct Autopilot<R> {
    rng: R,
    accuracy: f64,
    field_height: f32,
    enemies: Vec<Enemy>,
    bullets: Vec<Bullet>,
    next_id: u64,
}

impl<R: Rng> Autopilot<R> {
    pub(crate) fn new(config: AutopilotConfig, rng: R) -> Self {
        Self {
            rng,
            accuracy: config.accuracy.clamp(0.0, 1.0),
            field_height: config.field_height,
            enemies: Vec::new(),
            bullets: Vec::new(),
            next_id: 0,
        }
    }

    /// Updates the simulated field with the controller's latest events.
    pub(crate) fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::WaveStarted { .. } => {
                    self.enemies.clear();
                    self.bullets.clear();
                }
                Event::EnemySpawned { spawn, .. } => {
                    self.enemies.push(Enemy {
                        id: self.next_id,
                        depth: 0.0,
                        velocity: spawn.velocity,
                        targeted: false,
                    });
                    self.next_id += 1;
                }
                Event::BulletFired { .. } => self.launch_bullet(),
                _ => {}
            }
        }
    }

    /// Advances the field by `dt` and returns the commands for this frame.
    pub(crate) fn plan(&mut self, dt: Duration) -> Vec<Command> {
        let mut commands = Vec::new();

        let mut index = 0;
        while index < self.bullets.len() {
            let bullet = &mut self.bullets[index];
            bullet.remaining = bullet.remaining.saturating_sub(dt);
            if !bullet.remaining.is_zero() {
                index += 1;
                continue;
            }
            let bullet = self.bullets.swap_remove(index);
            let struck = bullet
                .target
                .and_then(|id| self.enemies.iter().position(|enemy| enemy.id == id));
            match struck {
                Some(position) => {
                    let _ = self.enemies.remove(position);
                    commands.push(Command::BulletHitEnemy);
                }
                None => commands.push(Command::BulletExitedField),
            }
        }

        let descent = dt.as_secs_f32();
        let field_height = self.field_height;
        let before = self.enemies.len();
        self.enemies.retain_mut(|enemy| {
            enemy.depth += enemy.velocity * descent;
            enemy.depth < field_height
        });
        for _ in self.enemies.len()..before {
            commands.push(Command::EnemyExitedField);
        }

        if self.enemies.iter().any(|enemy| !enemy.targeted) {
            commands.push(Command::FireRequested);
        }
        commands
    }

    fn launch_bullet(&mut self) {
        let target = self
            .enemies
            .iter_mut()
            .filter(|enemy| !enemy.targeted)
            .max_by(|a, b| a.depth.total_cmp(&b.depth));
        let hits = self.rng.gen_bool(self.accuracy);
        let target = match target {
            Some(enemy) if hits => {
                enemy.targeted = true;
                Some(enemy.id)
            }
            _ => None,
        };
        self.bullets.push(Bullet {
            target,
            remaining: BULLET_FLIGHT,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use skyfall_core::{EnemyVariant, SpawnEvent};

    fn autopilot(accuracy: f64) -> Autopilot<ChaCha8Rng> {
        Autopilot::new(
            AutopilotConfig {
                accuracy,
                field_height: 100.0,
            },
            ChaCha8Rng::seed_from_u64(3),
        )
    }

    fn spawned(velocity: f32) -> Event {
        Event::EnemySpawned {
            spawn: SpawnEvent {
                index: 0,
                x: 400.0,
                velocity,
                variant: EnemyVariant::Red,
            },
            tint: EnemyVariant::Red.tint(),
        }
    }

    fn fired() -> Event {
        Event::BulletFired {
            bullets_used: 1,
            max_bullets: 32,
        }
    }

    #[test]
    fn untargeted_enemy_draws_fire() {
        let mut autopilot = autopilot(1.0);
        assert!(autopilot.plan(Duration::from_millis(16)).is_empty());

        autopilot.observe(&[spawned(10.0)]);
        assert_eq!(
            autopilot.plan(Duration::from_millis(16)),
            vec![Command::FireRequested]
        );
    }

    #[test]
    fn accurate_bullet_hits_after_flight_time() {
        let mut autopilot = autopilot(1.0);
        autopilot.observe(&[spawned(10.0), fired()]);

        assert!(autopilot.plan(Duration::from_millis(100)).is_empty());
        assert_eq!(
            autopilot.plan(Duration::from_millis(150)),
            vec![Command::BulletHitEnemy]
        );
    }

    #[test]
    fn missed_bullet_leaves_field_and_enemy_escapes() {
        let mut autopilot = autopilot(0.0);
        autopilot.observe(&[spawned(200.0), fired()]);

        assert_eq!(
            autopilot.plan(Duration::from_millis(250)),
            vec![Command::BulletExitedField, Command::FireRequested]
        );
        assert_eq!(
            autopilot.plan(Duration::from_millis(300)),
            vec![Command::EnemyExitedField]
        );
    }

    #[test]
    fn wave_start_clears_field() {
        let mut autopilot = autopilot(1.0);
        autopilot.observe(&[spawned(10.0), fired()]);
        autopilot.observe(&[Event::ProgressReset]);
        assert!(!autopilot.enemies.is_empty());

        let parameters = skyfall_system_wave_parameters::compute_parameters(
            skyfall_core::Level::FIRST,
            &skyfall_core::PlatformProfile::desktop(),
        );
        autopilot.observe(&[Event::WaveStarted {
            parameters,
            theme: skyfall_core::BackdropTheme::Space,
            bullet_tint: skyfall_core::BackdropTheme::Space.bullet_tint(),
        }]);
        assert!(autopilot.plan(Duration::from_secs(1)).is_empty());
    }
}
