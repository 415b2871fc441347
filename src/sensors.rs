use bevy::prelude::*;

use crate::math::*;

/// Tags an entity as an obstacle for the steering pass.
#[derive(Debug, Clone, Copy, Default, Component)]
pub struct Obstacle;

/// Positions of every obstacle, rebuilt each frame by
/// [`obstacle_index_butler`]. Steering reads this instead of poking at the
/// world directly.
#[derive(Debug, Default, Resource)]
pub struct ObstacleIndex {
    positions: Vec<TVec3>,
}

impl ObstacleIndex {
    /// Obstacles within `radius` of `point`.
    pub fn within(&self, point: TVec3, radius: TReal) -> impl Iterator<Item = TVec3> + '_ {
        self.positions
            .iter()
            .copied()
            .filter(move |pos| pos.distance_squared(point) < radius * radius)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

pub fn obstacle_index_butler(
    mut index: ResMut<ObstacleIndex>,
    obstacles: Query<&Transform, With<Obstacle>>,
) {
    index.positions.clear();
    index
        .positions
        .extend(obstacles.iter().map(|xform| xform.translation));
}

/// Request to drop an obstacle into the world at a point. The spawned
/// obstacle shows up in the index on the following frame.
#[derive(Debug, Clone, Copy, Event)]
pub struct PlaceObstacleEvent {
    pub point: TVec3,
}

pub fn place_obstacle(mut commands: Commands, mut events: EventReader<PlaceObstacleEvent>) {
    for event in events.read() {
        tracing::debug!(point = ?event.point, "placing obstacle");
        commands.spawn((
            Obstacle,
            Transform::from_translation(event.point),
            Name::new("obstacle"),
        ));
    }
}
