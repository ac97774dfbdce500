//! Edge ghosts: offset copies that make a body straddling an edge appear on
//! the opposite side as well.
//!
//! Each authoritative asteroid owns a [`GhostSet`] with one slot per
//! [`GhostSlot`].  Once per tick [`ghost_sync_system`] compares the body's
//! shape bounds with the arena and creates or destroys ghosts so that:
//!
//! - a cardinal slot is live exactly while its edge test holds, and
//! - the diagonal slot is live exactly while one horizontal **and** one
//!   vertical slot are live, placed at the sum of their offsets.
//!
//! Ghosts copy their parent's transform and velocity once, at creation.  Both
//! are kinematic bodies moving under the same velocity, so the offset stays
//! valid until the ghost is destroyed.  Ghosts are never created anywhere
//! else, and they are always destroyed together with their parent
//! ([`despawn_with_ghosts`]).

use crate::arena::{ArenaRect, ArenaTopology, EdgeDirection, Viewport};
use crate::asteroid::{
    asteroid_body, shape_bounds, Asteroid, AsteroidRole, AsteroidSize, EntryTracker, Vertices,
};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Key of a ghost within its parent's [`GhostSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GhostSlot {
    Top,
    Bottom,
    Left,
    Right,
    Diagonal,
}

impl GhostSlot {
    pub const ALL: [GhostSlot; 5] = [
        GhostSlot::Top,
        GhostSlot::Bottom,
        GhostSlot::Left,
        GhostSlot::Right,
        GhostSlot::Diagonal,
    ];

    pub const CARDINAL: [GhostSlot; 4] = [
        GhostSlot::Top,
        GhostSlot::Bottom,
        GhostSlot::Left,
        GhostSlot::Right,
    ];

    #[inline]
    fn index(self) -> usize {
        match self {
            GhostSlot::Top => 0,
            GhostSlot::Bottom => 1,
            GhostSlot::Left => 2,
            GhostSlot::Right => 3,
            GhostSlot::Diagonal => 4,
        }
    }

    /// Offset direction of a cardinal slot; `None` for the diagonal.
    pub fn direction(self) -> Option<EdgeDirection> {
        match self {
            GhostSlot::Top => Some(EdgeDirection::Top),
            GhostSlot::Bottom => Some(EdgeDirection::Bottom),
            GhostSlot::Left => Some(EdgeDirection::Left),
            GhostSlot::Right => Some(EdgeDirection::Right),
            GhostSlot::Diagonal => None,
        }
    }
}

/// A live ghost and the offset it was placed at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostHandle {
    pub entity: Entity,
    pub offset: Vec2,
}

/// Ghosts owned by one authoritative asteroid.  At most one per slot.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct GhostSet {
    slots: [Option<GhostHandle>; 5],
}

impl GhostSet {
    #[inline]
    pub fn get(&self, slot: GhostSlot) -> Option<GhostHandle> {
        self.slots[slot.index()]
    }

    #[inline]
    pub fn is_live(&self, slot: GhostSlot) -> bool {
        self.slots[slot.index()].is_some()
    }

    pub fn insert(&mut self, slot: GhostSlot, handle: GhostHandle) -> Option<GhostHandle> {
        self.slots[slot.index()].replace(handle)
    }

    pub fn take(&mut self, slot: GhostSlot) -> Option<GhostHandle> {
        self.slots[slot.index()].take()
    }

    /// Number of live ghosts (0–5).
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live ghost entities in slot order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots.iter().flatten().map(|h| h.entity)
    }

    /// Destroy the ghost in `slot`, if any.  Returns whether one was live.
    pub fn despawn_slot(&mut self, slot: GhostSlot, commands: &mut Commands) -> bool {
        match self.take(slot) {
            Some(handle) => {
                commands.entity(handle.entity).try_despawn();
                true
            }
            None => false,
        }
    }

    /// Destroy every ghost and leave the set empty.  Returns how many were live.
    pub fn despawn_all(&mut self, commands: &mut Commands) -> usize {
        GhostSlot::ALL
            .into_iter()
            .filter(|slot| self.despawn_slot(*slot, commands))
            .count()
    }
}

/// Destroy an authoritative asteroid together with every ghost it owns.
///
/// Safe to call for entities that are already gone.
pub fn despawn_with_ghosts(commands: &mut Commands, entity: Entity, ghosts: &GhostSet) {
    for ghost in ghosts.entities() {
        commands.entity(ghost).try_despawn();
    }
    commands.entity(entity).try_despawn();
}

/// Result of the four independent edge tests for one body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GhostNeeds {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl GhostNeeds {
    /// Compare shape bounds against the arena.
    ///
    /// A body poking out of the bottom needs a copy shifted up by one arena
    /// height (`top`); one poking out of the left needs a copy shifted right
    /// (`right`), and so on.
    pub fn evaluate(shape: Rect, arena: &ArenaRect) -> Self {
        Self {
            top: shape.min.y < arena.min_y(),
            bottom: shape.max.y > arena.max_y(),
            right: shape.min.x < arena.min_x(),
            left: shape.max.x > arena.max_x(),
        }
    }

    /// Test result for a cardinal slot.  Always `false` for the diagonal,
    /// which is derived from live ghosts instead.
    pub fn get(&self, slot: GhostSlot) -> bool {
        match slot {
            GhostSlot::Top => self.top,
            GhostSlot::Bottom => self.bottom,
            GhostSlot::Left => self.left,
            GhostSlot::Right => self.right,
            GhostSlot::Diagonal => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.top || self.bottom || self.left || self.right)
    }
}

/// Offset for the diagonal ghost given the currently live cardinal ghosts.
///
/// Requires one horizontal and one vertical ghost.  If both of a pair are
/// live (only possible for a body larger than the arena), Right wins over
/// Left and Top over Bottom.
pub fn diagonal_offset(ghosts: &GhostSet, arena: &ArenaRect) -> Option<Vec2> {
    let horizontal = if ghosts.is_live(GhostSlot::Right) {
        Some(EdgeDirection::Right)
    } else if ghosts.is_live(GhostSlot::Left) {
        Some(EdgeDirection::Left)
    } else {
        None
    }?;
    let vertical = if ghosts.is_live(GhostSlot::Top) {
        Some(EdgeDirection::Top)
    } else if ghosts.is_live(GhostSlot::Bottom) {
        Some(EdgeDirection::Bottom)
    } else {
        None
    }?;
    Some(arena.offset(horizontal) + arena.offset(vertical))
}

/// Snapshot of the parent a ghost is cloned from.
struct GhostSource<'a> {
    parent: Entity,
    transform: &'a Transform,
    velocity: Velocity,
    size: AsteroidSize,
    vertices: &'a Vertices,
}

fn spawn_ghost(
    commands: &mut Commands,
    source: &GhostSource,
    slot: GhostSlot,
    offset: Vec2,
) -> Entity {
    let body = asteroid_body(&source.vertices.0);
    let transform = Transform {
        translation: source.transform.translation + offset.extend(0.0),
        ..*source.transform
    };
    commands
        .spawn((
            (
                transform,
                Visibility::default(),
                Asteroid,
                source.size,
                AsteroidRole::Ghost {
                    parent: source.parent,
                    slot,
                },
                Vertices(source.vertices.0.clone()),
            ),
            body,
            source.velocity,
        ))
        .id()
}

/// Bring one slot in line with the wanted offset: create, destroy, or (for a
/// diagonal whose pairing changed) replace.
fn reconcile_slot(
    commands: &mut Commands,
    ghosts: &mut GhostSet,
    slot: GhostSlot,
    wanted: Option<Vec2>,
    source: &GhostSource,
) {
    match (ghosts.get(slot), wanted) {
        (None, Some(offset)) => {
            let entity = spawn_ghost(commands, source, slot, offset);
            ghosts.insert(slot, GhostHandle { entity, offset });
            debug!("{:?}: {slot:?} ghost created", source.parent);
        }
        (Some(existing), Some(offset)) if existing.offset != offset => {
            ghosts.despawn_slot(slot, commands);
            let entity = spawn_ghost(commands, source, slot, offset);
            ghosts.insert(slot, GhostHandle { entity, offset });
            debug!("{:?}: {slot:?} ghost moved", source.parent);
        }
        (Some(_), None) => {
            ghosts.despawn_slot(slot, commands);
            debug!("{:?}: {slot:?} ghost destroyed", source.parent);
        }
        _ => {}
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Create and destroy ghosts for every entered authoritative asteroid.
///
/// Each body is handled independently: its decisions depend only on its own
/// bounds and the fixed arena, so iteration order does not matter.
pub fn ghost_sync_system(
    mut commands: Commands,
    mut topology: ResMut<ArenaTopology>,
    viewport: Res<Viewport>,
    mut query: Query<
        (
            Entity,
            &Transform,
            &Velocity,
            &AsteroidSize,
            &Vertices,
            &EntryTracker,
            &mut GhostSet,
        ),
        With<Asteroid>,
    >,
) {
    let Ok(arena) = topology.ensure_initialized(&viewport) else {
        return;
    };

    for (entity, transform, velocity, size, vertices, tracker, mut ghosts) in query.iter_mut() {
        if !tracker.has_entered() {
            continue;
        }
        let source = GhostSource {
            parent: entity,
            transform,
            velocity: *velocity,
            size: *size,
            vertices,
        };
        let needs = GhostNeeds::evaluate(shape_bounds(transform, vertices), &arena);

        for slot in GhostSlot::CARDINAL {
            let wanted = slot
                .direction()
                .filter(|_| needs.get(slot))
                .map(|direction| arena.offset(direction));
            reconcile_slot(&mut commands, &mut ghosts, slot, wanted, &source);
        }

        let diagonal = diagonal_offset(&ghosts, &arena);
        reconcile_slot(
            &mut commands,
            &mut ghosts,
            GhostSlot::Diagonal,
            diagonal,
            &source,
        );
    }
}

/// Destroy ghosts that no longer belong to a live parent slot.
///
/// Normal destruction paths remove ghosts together with their parent; this
/// catches parents despawned by code outside the arena systems.
pub fn prune_orphan_ghosts_system(
    mut commands: Commands,
    q_ghosts: Query<(Entity, &AsteroidRole), With<Asteroid>>,
    q_parents: Query<&GhostSet>,
) {
    for (entity, role) in q_ghosts.iter() {
        let AsteroidRole::Ghost { parent, slot } = *role else {
            continue;
        };
        let owned = q_parents
            .get(parent)
            .is_ok_and(|set| set.get(slot).is_some_and(|h| h.entity == entity));
        if !owned {
            debug!("{entity:?}: orphan {slot:?} ghost removed");
            commands.entity(entity).try_despawn();
        }
    }
}
