//! Drawable components and the narrow interface to a render backend.
//!
//! stratum doesn't draw anything itself. It decides *what* is drawn (the
//! layer manager's drawn set) and in *which order* (draw priority), then
//! hands each item to a [`RenderBackend`] supplied by the host.
//!
//! Draw priority is a plain `i32` on each drawable. When an entity is
//! created, the world adds `layer index × layer_priority_range` to it once,
//! so everything on Overlay0 sorts above everything on Base without the
//! backend knowing about layers.

use serde::{Deserialize, Serialize};

use crate::ecs::component::Drawable;
use crate::ecs::handle::Handle;
use crate::ecs::world::World;
use crate::ecs::hierarchy::GlobalTransform;
use crate::math::{Mat4, Transform, Vec2, Vec4};

/// A textured quad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Texture handle, issued by the host's texture store.
    pub texture: Handle,
    pub size: Vec2,
    pub tint: Vec4,
    pub priority: i32,
}

impl Sprite {
    pub fn new(texture: Handle, size: Vec2) -> Self {
        Self {
            texture,
            size,
            tint: Vec4::ONE,
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Drawable for Sprite {
    fn draw_priority_mut(&mut self) -> &mut i32 {
        &mut self.priority
    }
}

/// A run of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub content: String,
    pub font_size: f32,
    pub color: Vec4,
    pub priority: i32,
}

impl Text {
    pub fn new(content: impl Into<String>, font_size: f32) -> Self {
        Self {
            content: content.into(),
            font_size,
            color: Vec4::ONE,
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Drawable for Text {
    fn draw_priority_mut(&mut self) -> &mut i32 {
        &mut self.priority
    }
}

/// What a host implements to actually put pixels on screen.
pub trait RenderBackend {
    fn draw_sprite(&mut self, entity: Handle, sprite: &Sprite, transform: Mat4);
    fn draw_text(&mut self, entity: Handle, text: &Text, transform: Mat4);
}

enum DrawItem<'w> {
    Sprite(&'w Sprite),
    Text(&'w Text),
}

/// Draw every active sprite and text of the drawn set, lowest priority
/// first. Ties keep drawn-set order (layer, then creation). Returns the
/// number of items drawn.
pub fn render_frame(world: &World, backend: &mut dyn RenderBackend) -> usize {
    let mut items = Vec::new();
    for entity in world.layers().drawn() {
        if world.is_active::<Sprite>(entity) {
            if let Some(sprite) = world.get::<Sprite>(entity) {
                items.push((sprite.priority, entity, DrawItem::Sprite(sprite)));
            }
        }
        if world.is_active::<Text>(entity) {
            if let Some(text) = world.get::<Text>(entity) {
                items.push((text.priority, entity, DrawItem::Text(text)));
            }
        }
    }

    // Stable sort: equal priorities stay in drawn-set order.
    items.sort_by_key(|(priority, _, _)| *priority);

    for (_, entity, item) in &items {
        let transform = world_transform(world, *entity);
        match item {
            DrawItem::Sprite(sprite) => backend.draw_sprite(*entity, sprite, transform),
            DrawItem::Text(text) => backend.draw_text(*entity, text, transform),
        }
    }
    items.len()
}

/// `GlobalTransform` if present, else the local `Transform`, else identity.
fn world_transform(world: &World, entity: Handle) -> Mat4 {
    if let Some(global) = world.get::<GlobalTransform>(entity) {
        return global.matrix;
    }
    world
        .get::<Transform>(entity)
        .map(Transform::matrix)
        .unwrap_or(Mat4::IDENTITY)
}
