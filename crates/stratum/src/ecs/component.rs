//! # Components — Kinds, Descriptors and Slots
//!
//! Any `'static + Send + Sync` type can be a component. The world doesn't
//! store components by Rust type though. Each type is registered once and
//! gets a small integer tag, a [`ComponentKind`]. Systems declare the kinds
//! they require, entities own a map from kind to instance, and all membership
//! bookkeeping works on tags.
//!
//! ```text
//! ComponentRegistry
//!   kind 0 → KindDescriptor { name: "SceneMeta", .. }
//!   kind 1 → KindDescriptor { name: "Transform", .. }
//!   kind 2 → KindDescriptor { name: "Sprite",    draw_priority: Some(fn) }
//!   kind 3 → KindDescriptor { name: "Counter",   .. }
//! ```
//!
//! ## Capabilities
//!
//! A descriptor can carry optional capabilities as plain function pointers,
//! monomorphized at registration time:
//!
//! - **draw priority**: types implementing [`Drawable`] expose a mutable
//!   priority field. The world offsets it by the creation layer so higher
//!   layers draw on top.
//! - **debug formatting**: types implementing `Debug` can be printed by
//!   tooling without knowing their Rust type.
//!
//! Looking a capability up is a table access, no trait-object downcasting.
//!
//! ## Slots
//!
//! Inside an entity each instance lives in a [`ComponentSlot`] that adds two
//! bits of framework state: the handle of the owning entity (stamped once, at
//! creation) and the `active` flag. Clearing the flag keeps the component on
//! the entity but takes the entity out of every system that requires the
//! kind.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use super::handle::Handle;

/// Stable integer tag for a registered component type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ComponentKind(u16);

impl ComponentKind {
    pub fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kind#{}", self.0)
    }
}

/// Components with a draw priority that the world can offset per layer.
pub trait Drawable {
    fn draw_priority_mut(&mut self) -> &mut i32;
}

/// Type-erased component instance.
pub type AnyComponent = Box<dyn Any + Send + Sync>;

type MatchesFn = fn(&dyn Any) -> bool;
type PriorityFn = fn(&mut dyn Any) -> Option<&mut i32>;
type FormatFn = fn(&dyn Any) -> String;

/// Everything the world knows about one component kind.
pub struct KindDescriptor {
    kind: ComponentKind,
    name: String,
    type_name: &'static str,
    matches: MatchesFn,
    draw_priority: Option<PriorityFn>,
    format: Option<FormatFn>,
}

impl KindDescriptor {
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Short type name, e.g. `Transform`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully-qualified type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is_drawable(&self) -> bool {
        self.draw_priority.is_some()
    }

    /// Whether `value` is an instance of this kind's Rust type.
    pub fn matches(&self, value: &dyn Any) -> bool {
        (self.matches)(value)
    }

    /// The draw-priority field of `value`, if this kind is drawable.
    pub fn draw_priority<'a>(&self, value: &'a mut dyn Any) -> Option<&'a mut i32> {
        self.draw_priority.and_then(|f| f(value))
    }

    /// Debug-format `value`, or `"<opaque>"` without a formatter.
    pub fn format(&self, value: &dyn Any) -> String {
        match self.format {
            Some(f) => f(value),
            None => "<opaque>".to_string(),
        }
    }
}

impl fmt::Debug for KindDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindDescriptor")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("drawable", &self.draw_priority.is_some())
            .field("debug", &self.format.is_some())
            .finish()
    }
}

/// Maps Rust types to [`ComponentKind`] tags and their descriptors.
#[derive(Default)]
pub struct ComponentRegistry {
    descriptors: Vec<KindDescriptor>,
    by_type: HashMap<TypeId, ComponentKind>,
    by_name: HashMap<String, ComponentKind>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` and return its kind. Idempotent.
    pub fn register<T: Any + Send + Sync>(&mut self) -> ComponentKind {
        if let Some(&kind) = self.by_type.get(&TypeId::of::<T>()) {
            return kind;
        }

        let Ok(index) = u16::try_from(self.descriptors.len()) else {
            panic!("component kind space exhausted ({} kinds)", self.descriptors.len());
        };
        let kind = ComponentKind(index);
        let type_name = std::any::type_name::<T>();
        let name = short_type_name(type_name);

        if self.by_name.contains_key(&name) {
            log::debug!("component name '{name}' is shared by several types; lookup by name returns the first");
        } else {
            self.by_name.insert(name.clone(), kind);
        }
        self.by_type.insert(TypeId::of::<T>(), kind);
        self.descriptors.push(KindDescriptor {
            kind,
            name,
            type_name,
            matches: |any| any.is::<T>(),
            draw_priority: None,
            format: None,
        });
        log::trace!("registered component {type_name} as {kind}");
        kind
    }

    /// Register `T` with the draw-priority capability.
    pub fn register_drawable<T: Drawable + Any + Send + Sync>(&mut self) -> ComponentKind {
        let kind = self.register::<T>();
        if let Some(desc) = self.descriptors.get_mut(kind.0 as usize) {
            desc.draw_priority = Some(priority_field::<T> as PriorityFn);
        }
        kind
    }

    /// Register `T` with a debug formatter for tooling.
    pub fn register_debug<T: fmt::Debug + Any + Send + Sync>(&mut self) -> ComponentKind {
        let kind = self.register::<T>();
        if let Some(desc) = self.descriptors.get_mut(kind.0 as usize) {
            desc.format = Some(debug_format::<T> as FormatFn);
        }
        kind
    }

    /// The kind of `T`, if registered.
    pub fn kind_of<T: Any>(&self) -> Option<ComponentKind> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Look a kind up by its short type name.
    pub fn kind_by_name(&self, name: &str) -> Option<ComponentKind> {
        self.by_name.get(name).copied()
    }

    pub fn descriptor(&self, kind: ComponentKind) -> Option<&KindDescriptor> {
        self.descriptors.get(kind.0 as usize)
    }

    /// Short name of a kind, or `"<unknown>"`.
    pub fn name(&self, kind: ComponentKind) -> &str {
        self.descriptor(kind).map_or("<unknown>", |d| d.name())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KindDescriptor> {
        self.descriptors.iter()
    }
}

fn priority_field<T: Drawable + Any>(any: &mut dyn Any) -> Option<&mut i32> {
    any.downcast_mut::<T>().map(|c| c.draw_priority_mut())
}

fn debug_format<T: fmt::Debug + Any>(any: &dyn Any) -> String {
    match any.downcast_ref::<T>() {
        Some(value) => format!("{value:?}"),
        None => "<downcast failed>".to_string(),
    }
}

/// One component instance attached to an entity.
pub(crate) struct ComponentSlot {
    /// Handle of the entity this component was attached to.
    pub(crate) owner: Handle,
    pub(crate) active: bool,
    pub(crate) value: AnyComponent,
}

impl ComponentSlot {
    pub(crate) fn new(value: AnyComponent) -> Self {
        Self {
            owner: Handle::INVALID,
            active: true,
            value,
        }
    }

    pub(crate) fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub(crate) fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }
}

/// Strip the module path and generic arguments' paths from a type name
/// (e.g. `stratum::math::Transform` → `Transform`).
pub(crate) fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    let short = base.rsplit("::").next().unwrap_or(base);
    if base.len() == full.len() {
        short.to_string()
    } else {
        format!("{short}{}", &full[base.len()..])
    }
}
