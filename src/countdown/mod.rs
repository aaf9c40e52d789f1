mod config;
mod constants;
mod content;
mod day_page;
mod error;
mod home;
mod storage;
mod ticker;
mod unlock;
mod widgets;

use bevy::prelude::*;
pub use day_page::DayPage;
pub use home::HomeScreen;

use self::config::CountdownConfigPlugin;
use self::constants::TOTAL_DAYS;
use self::content::DayCatalog;
use self::day_page::DayPagePlugin;
use self::error::CountdownError;
use self::home::HomePlugin;
use self::storage::FileStore;
use self::storage::RevealedDays;
use self::ticker::TickerPlugin;
use self::unlock::UnlockSchedule;
use crate::state::Experience;

pub struct CountdownPlugin;

impl Plugin for CountdownPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((TickerPlugin, CountdownConfigPlugin))
            .add_systems(OnEnter(Experience::Countdown), spawn_countdown_camera);

        match load_countdown() {
            Ok((schedule, catalog)) => {
                info!(
                    "countdown ready: {} days, final unlock {}",
                    schedule.total_days(),
                    schedule
                        .final_target()
                        .map(|target| unlock::format_instant(&target))
                        .unwrap_or_default()
                );
                app.insert_resource(schedule)
                    .insert_resource(catalog)
                    .insert_resource(RevealedDays::new(FileStore::in_config_dir()))
                    .add_plugins((HomePlugin, DayPagePlugin));
            },
            Err(e) => {
                error!("Countdown cannot start: {e}");
                app.add_systems(Startup, exit_with_error);
            },
        }
    }
}

/// 2D camera the countdown screens render through
#[derive(Component)]
pub struct CountdownCamera;

fn spawn_countdown_camera(mut commands: Commands) {
    commands.spawn((Name::new("CountdownCamera"), CountdownCamera, Camera2d));
}

fn load_countdown() -> Result<(UnlockSchedule, DayCatalog), CountdownError> {
    let schedule = UnlockSchedule::from_constants()?;
    let catalog = DayCatalog::compiled(TOTAL_DAYS)?;
    Ok((schedule, catalog))
}

fn exit_with_error(mut exit: MessageWriter<AppExit>) { exit.write(AppExit::error()); }
