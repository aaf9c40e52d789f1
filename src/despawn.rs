use bevy::prelude::*;

use crate::countdown::CountdownCamera;
use crate::countdown::DayPage;
use crate::countdown::HomeScreen;
use crate::globe::GlobeScene;
use crate::state::Experience;
use crate::state::OnDayPage;
use crate::state::Screen;

pub struct DespawnPlugin;

impl Plugin for DespawnPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnExit(Screen::Home), despawn_all::<HomeScreen>)
            .add_systems(OnExit(OnDayPage), despawn_all::<DayPage>)
            .add_systems(OnExit(Experience::Countdown), despawn_all::<CountdownCamera>)
            .add_systems(OnExit(Experience::Globe), despawn_all::<GlobeScene>);
    }
}

/// `try_despawn`: a marked entity may already be gone with its parent
pub fn despawn(commands: &mut Commands, entity: Entity) { commands.entity(entity).try_despawn(); }

/// Screen roots own their tickers, so despawning a root also cancels its periodic tasks.
fn despawn_all<T: Component>(mut commands: Commands, query: Query<Entity, With<T>>) {
    for entity in &query {
        despawn(&mut commands, entity);
    }
}

#[cfg(test)]
mod tests {
    use bevy::state::app::StatesPlugin;

    use super::*;
    use crate::state::StatePlugin;

    #[test]
    fn leaving_the_globe_clears_its_scene() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, StatePlugin, DespawnPlugin))
            .init_resource::<ButtonInput<KeyCode>>()
            .insert_state(Experience::Globe);
        app.update();

        let scene = app.world_mut().spawn(GlobeScene).id();
        let child = app.world_mut().spawn(ChildOf(scene)).id();
        let camera = app.world_mut().spawn(CountdownCamera).id();

        app.world_mut()
            .resource_mut::<NextState<Experience>>()
            .set(Experience::Countdown);
        app.update();

        assert!(app.world().get_entity(scene).is_err());
        assert!(app.world().get_entity(child).is_err());
        assert!(app.world().get_entity(camera).is_ok());
    }

    #[test]
    fn closing_a_day_page_clears_it() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, StatePlugin, DespawnPlugin))
            .init_resource::<ButtonInput<KeyCode>>();
        app.update();
        app.world_mut()
            .resource_mut::<NextState<Screen>>()
            .set(Screen::Day { number: 2 });
        app.update();

        let page = app.world_mut().spawn(DayPage).id();
        app.world_mut()
            .resource_mut::<NextState<Screen>>()
            .set(Screen::Home);
        app.update();

        assert!(app.world().get_entity(page).is_err());
    }
}
