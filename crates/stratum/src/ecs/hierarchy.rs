//! # Entity Hierarchies — Parent Links and World Transforms
//!
//! [`Parent`] links an entity to another one; [`GlobalTransform`] holds the
//! world-space matrix computed from the chain of local [`Transform`]s.
//!
//! ## Usage
//!
//! ```ignore
//! hierarchy::register(&mut world)?;           // before any render system
//! let ship = world.create_entity("ship", Components::new()
//!     .with(Transform::from_xy(100.0, 50.0))
//!     .with(GlobalTransform::default()));
//! let turret = world.create_entity("turret", Components::new()
//!     .with(Transform::from_xy(10.0, 0.0))
//!     .with(GlobalTransform::default())
//!     .with(Parent(ship)));
//! world.update(16.0);
//! // turret's GlobalTransform is now at (110, 50).
//! ```
//!
//! ## Walking up, not down
//!
//! The "Parent" system runs per entity, so each entity walks up its own
//! parent chain and multiplies the local matrices on the way:
//!
//! ```text
//! global(turret) = local(ship) * local(turret)
//! ```
//!
//! That costs O(depth) per entity but needs no child lists and no ordering
//! between parents and children. A chain longer than
//! [`MAX_HIERARCHY_DEPTH`] is treated as a cycle and reported as an update
//! error for that entity.
//!
//! A parent handle that is no longer alive ends the walk: the entity is
//! treated as a root. Handles are recycled without generations, so a parent
//! that was deleted and whose handle was reused will silently adopt the
//! child; clear or replace `Parent` when deleting parents.

use anyhow::{anyhow, bail};

use crate::ecs::handle::Handle;
use crate::ecs::system::System;
use crate::ecs::world::World;
use crate::error::EcsError;
use crate::math::{Mat4, Transform};

/// Name under which [`ParentSystem`] is registered.
pub const PARENT_SYSTEM: &str = "Parent";

/// Longest parent chain followed before giving up.
pub const MAX_HIERARCHY_DEPTH: usize = 64;

/// Marks an entity as a child of another entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Handle);

/// World-space transform written by the "Parent" system.
///
/// For roots this equals the local [`Transform`]; for children it is
/// `parent_global * child_local`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlobalTransform {
    pub matrix: Mat4,
}

impl GlobalTransform {
    pub fn translation(&self) -> crate::math::Vec3 {
        self.matrix.col(3).truncate()
    }
}

/// Keeps [`GlobalTransform`] in sync with the parent chain.
pub struct ParentSystem;

impl System for ParentSystem {
    fn update(&mut self, world: &mut World, _dt: f32, entity: Handle) -> anyhow::Result<()> {
        let matrix = world_matrix(world, entity)?;
        let global = world
            .get_mut::<GlobalTransform>(entity)
            .ok_or_else(|| anyhow!("{entity} has no GlobalTransform"))?;
        global.matrix = matrix;
        Ok(())
    }
}

/// Register [`ParentSystem`] as "Parent". It updates every drawn entity so
/// overlays still get correct transforms while gameplay is paused.
pub fn register(world: &mut World) -> Result<(), EcsError> {
    world.register_system_for::<(Transform, GlobalTransform)>(PARENT_SYSTEM, ParentSystem, true)
}

/// Compute the world matrix of `entity` by walking its parent chain.
pub fn world_matrix(world: &World, entity: Handle) -> anyhow::Result<Mat4> {
    let mut matrix = local_matrix(world, entity);
    let mut current = entity;

    for _ in 0..MAX_HIERARCHY_DEPTH {
        let Some(Parent(parent)) = world.get::<Parent>(current).copied() else {
            return Ok(matrix);
        };
        if !world.is_alive(parent) {
            log::trace!("{current} points at dead parent {parent}; treating it as a root");
            return Ok(matrix);
        }
        matrix = local_matrix(world, parent) * matrix;
        current = parent;
    }

    bail!("parent chain of {entity} is longer than {MAX_HIERARCHY_DEPTH} (cycle?)")
}

fn local_matrix(world: &World, entity: Handle) -> Mat4 {
    world
        .get::<Transform>(entity)
        .map(Transform::matrix)
        .unwrap_or(Mat4::IDENTITY)
}
