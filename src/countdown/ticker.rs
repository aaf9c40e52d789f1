//! Periodic task: a repeating timer that emits a `Tick` entity event.
//!
//! The spawned entity is the cancellation handle; despawning it stops the ticks.
//! Tasks fire once on their first update so observers never show stale values.

use bevy::prelude::*;

pub struct TickerPlugin;

impl Plugin for TickerPlugin {
    fn build(&self, app: &mut App) { app.add_systems(Update, tick_periodic_tasks); }
}

#[derive(Component, Debug)]
pub struct PeriodicTask {
    timer:         Timer,
    pending_first: bool,
}

impl PeriodicTask {
    pub fn every(seconds: f32) -> Self {
        Self {
            timer:         Timer::from_seconds(seconds, TimerMode::Repeating),
            pending_first: true,
        }
    }
}

#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct Tick {
    pub entity: Entity,
}

fn tick_periodic_tasks(
    mut commands: Commands,
    time: Res<Time>,
    mut tasks: Query<(Entity, &mut PeriodicTask)>,
) {
    for (entity, mut task) in &mut tasks {
        task.timer.tick(time.delta());
        let first = std::mem::take(&mut task.pending_first);
        if first || task.timer.just_finished() {
            commands.trigger(Tick { entity });
        }
    }
}
