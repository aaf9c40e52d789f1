use bevy::prelude::Entity;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GlobeError {
    /// Tracked entity has no resolvable position this frame
    #[error("tracked target {0} has no position")]
    TargetUnresolved(Entity),

    /// Tour stop data failed to parse or is inconsistent
    #[error("invalid tour stop data: {0}")]
    StopData(String),
}
