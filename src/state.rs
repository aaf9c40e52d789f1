#![allow(clippy::used_underscore_binding)] // False positive on Screen::Day fields

use bevy::dev_tools::states::*;
use bevy::input::common_conditions::input_just_pressed;
use bevy::prelude::*;

pub struct StatePlugin;

impl Plugin for StatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<Experience>()
            .add_sub_state::<Screen>()
            .add_computed_state::<OnDayPage>()
            .add_systems(
                Update,
                toggle_experience.run_if(input_just_pressed(KeyCode::Tab)),
            )
            .add_systems(
                Update,
                (log_transitions::<Experience>, log_transitions::<Screen>),
            );
    }
}

/// Which of the two experiences is on screen.
/// `main` may start in `Globe` when launched with the `globe` argument.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Reflect, States)]
pub enum Experience {
    #[default]
    Countdown,
    Globe,
}

impl Experience {
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Self {
        if args.into_iter().any(|arg| arg == "globe") {
            Self::Globe
        } else {
            Self::Countdown
        }
    }
}

/// Countdown screens. Only exists while the countdown experience is active.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Reflect, SubStates)]
#[source(Experience = Experience::Countdown)]
pub enum Screen {
    #[default]
    Home,
    Day {
        number: u32,
    },
}

/// Present whenever any day page is open, regardless of which day.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct OnDayPage;

impl ComputedStates for OnDayPage {
    type SourceStates = Screen;

    const ALLOW_SAME_STATE_TRANSITIONS: bool = false;

    fn compute(sources: Screen) -> Option<Self> {
        match sources {
            Screen::Day { .. } => Some(Self),
            Screen::Home => None,
        }
    }
}

fn toggle_experience(
    state: Res<State<Experience>>,
    mut next_state: ResMut<NextState<Experience>>,
) {
    let next = match state.get() {
        Experience::Countdown => Experience::Globe,
        Experience::Globe => Experience::Countdown,
    };
    debug!("switching experience to {next:?}");
    next_state.set(next);
}
