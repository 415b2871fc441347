use bevy::prelude::*;
use educe::Educe;

use crate::boid::{steering::Steering, BoidBundle, BoidConfig};
use crate::math::*;
use crate::ConfigurationError;

/// A fixed offset and settle facing relative to the formation anchor.
#[derive(Debug, Clone, Copy)]
pub struct FormationSlot {
    pub offset: TVec3,
    pub facing: TVec3,
}

/// Slot geometry. Immutable after construction.
#[derive(Debug, Clone, Component)]
pub struct FormationLayout {
    slots: Vec<FormationSlot>,
}

impl FormationLayout {
    pub fn new(offsets: Vec<TVec3>, facings: Vec<TVec3>) -> Result<Self, ConfigurationError> {
        if offsets.len() != facings.len() {
            return Err(ConfigurationError::SlotCountMismatch {
                offsets: offsets.len(),
                facings: facings.len(),
            });
        }
        if offsets.is_empty() {
            return Err(ConfigurationError::NoSlots);
        }
        Ok(Self {
            slots: offsets
                .into_iter()
                .zip(facings)
                .map(|(offset, facing)| FormationSlot { offset, facing })
                .collect(),
        })
    }

    #[inline]
    pub fn slots(&self) -> &[FormationSlot] {
        &self.slots
    }
}

/// Member boids, index-aligned with the layout slots. The mapping never
/// changes after spawn.
#[derive(Debug, Default, Component, Educe)]
#[educe(Deref)]
pub struct FormationMembers {
    #[educe(Deref)]
    members: smallvec::SmallVec<[Entity; 8]>,
}

/// Last commanded formation center.
#[derive(Debug, Default, Component)]
pub struct FormationAnchor {
    pub point: TVec3,
}

#[derive(Bundle)]
pub struct FormationBundle {
    pub layout: FormationLayout,
    pub members: FormationMembers,
    pub anchor: FormationAnchor,
    pub name: Name,
}

/// Command to move the whole formation. Takes effect on the next frame's
/// dispatch pass.
#[derive(Debug, Clone, Copy, Event)]
pub struct SetFormationTarget {
    pub formation: Entity,
    pub point: TVec3,
}

/// Spawns one boid per slot at `spawn_origin + offset` plus the formation
/// entity owning them. The whole setup is validated before anything touches
/// the world.
pub fn spawn_formation(
    commands: &mut Commands,
    layout: FormationLayout,
    config: &BoidConfig,
    spawn_origin: TVec3,
) -> Result<Entity, ConfigurationError> {
    config.validate()?;
    let members = layout
        .slots()
        .iter()
        .map(|slot| {
            commands
                .spawn(BoidBundle::new(
                    spawn_origin + slot.offset,
                    slot.facing,
                    config.clone(),
                ))
                .id()
        })
        .collect();
    let formation = commands
        .spawn(FormationBundle {
            layout,
            members: FormationMembers { members },
            anchor: default(),
            name: Name::new("formation"),
        })
        .id();
    tracing::debug!(?formation, ?spawn_origin, "formation spawned");
    Ok(formation)
}

/// Pushes `point + slot.offset` to every member, in slot order. Clears each
/// member's arrived flag through [`Steering::set_destination`].
pub fn dispatch_target(
    mut events: EventReader<SetFormationTarget>,
    mut formations: Query<(&FormationLayout, &FormationMembers, &mut FormationAnchor)>,
    mut boids: Query<&mut Steering>,
) {
    for event in events.read() {
        let Ok((layout, members, mut anchor)) = formations.get_mut(event.formation) else {
            tracing::error!(?event, "SetFormationTarget for an entity that isn't a formation");
            continue;
        };
        anchor.point = event.point;
        for (slot, member) in layout.slots().iter().zip(members.iter()) {
            match boids.get_mut(*member) {
                Ok(mut steering) => steering.set_destination(event.point + slot.offset),
                Err(err) => {
                    tracing::error!(?member, "formation member lost its steering: {err}");
                }
            }
        }
        tracing::debug!(
            point = ?event.point,
            members = members.len(),
            "formation target dispatched"
        );
    }
}

#[test]
fn layout_rejects_mismatched_slot_config() {
    assert!(matches!(
        FormationLayout::new(vec![TVec3::X], vec![]),
        Err(ConfigurationError::SlotCountMismatch {
            offsets: 1,
            facings: 0
        })
    ));
}

#[test]
fn layout_rejects_zero_slots() {
    assert!(matches!(
        FormationLayout::new(vec![], vec![]),
        Err(ConfigurationError::NoSlots)
    ));
}
