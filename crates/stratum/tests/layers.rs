//! Layer visibility, editor sessions and draw ordering across layers.

use std::cell::RefCell;
use std::rc::Rc;

use stratum::prelude::*;

struct Ticks(u32);

fn tick(world: &mut World, _dt: f32, entity: Handle) -> anyhow::Result<()> {
    if let Some(ticks) = world.get_mut::<Ticks>(entity) {
        ticks.0 += 1;
    }
    Ok(())
}

fn ticks(world: &World, entity: Handle) -> u32 {
    world.get::<Ticks>(entity).map(|t| t.0).unwrap_or(0)
}

#[test]
fn overlay_then_debug_visibility() {
    let mut world = World::new();
    let e0 = world.create_entity("e0", Components::new());
    world.begin_layer(Layer::OVERLAY_0);
    let e1 = world.create_entity("e1", Components::new());
    world.begin_layer(Layer::OVERLAY_1);
    let e2 = world.create_entity("e2", Components::new());

    world.make_visible(Layer::OVERLAY_0);
    assert_eq!(world.layers().drawn(), vec![e0, e1]);
    assert_eq!(world.layers().update_eligible(), vec![e1]);
    assert!(!world.layers().is_drawn(e2));

    world.begin_layer(Layer::DEBUG);
    let e3 = world.create_entity("e3", Components::new());
    world.make_visible(Layer::DEBUG);
    assert_eq!(world.layers().drawn(), vec![e0, e1, e3]);
    assert_eq!(world.layers().update_eligible(), vec![e3]);
}

#[test]
fn only_running_layer_updates_unless_always_update() {
    let mut world = World::new();
    world
        .register_system_for::<(Ticks,)>("Gameplay", tick, false)
        .unwrap();
    let game = world.create_entity("game", Components::new().with(Ticks(0)));
    world.begin_layer(Layer::OVERLAY_0);
    let menu = world.create_entity("menu", Components::new().with(Ticks(0)));

    world.update(16.0);
    assert_eq!((ticks(&world, game), ticks(&world, menu)), (1, 0));

    // Pause menu: gameplay freezes, the menu runs.
    world.make_visible(Layer::OVERLAY_0);
    world.update(16.0);
    assert_eq!((ticks(&world, game), ticks(&world, menu)), (1, 1));

    let mut animated = World::new();
    animated
        .register_system_for::<(Ticks,)>("Animate", tick, true)
        .unwrap();
    let game = animated.create_entity("game", Components::new().with(Ticks(0)));
    animated.begin_layer(Layer::OVERLAY_0);
    let menu = animated.create_entity("menu", Components::new().with(Ticks(0)));
    animated.make_visible(Layer::OVERLAY_0);
    animated.update(16.0);
    assert_eq!((ticks(&animated, game), ticks(&animated, menu)), (1, 1));
}

#[test]
fn editor_session_round_trip() {
    let mut world = World::new();
    let log = EventLog::new();
    world.add_event_sink(log.clone());

    world.make_visible(Layer::OVERLAY_2);
    world.handle_editor_event(EditorEvent::Start);
    assert_eq!(world.layers().running(), Layer::DEBUG);
    assert_eq!(world.layers().previous(), Layer::OVERLAY_2);

    // A second Start while editing changes nothing.
    world.handle_editor_event(EditorEvent::Start);
    world.handle_editor_event(EditorEvent::Stop);
    assert_eq!(world.layers().running(), Layer::OVERLAY_2);

    assert_eq!(
        log.events(),
        vec![
            WorldEvent::LayerChanged(Layer::OVERLAY_2),
            WorldEvent::LayerChanged(Layer::DEBUG),
            WorldEvent::LayerChanged(Layer::OVERLAY_2),
        ]
    );
}

#[test]
fn debug_entities_are_not_persistent() {
    let mut world = World::new();
    let kept = world.create_entity("player", Components::new());
    world.begin_layer(Layer::DEBUG);
    let gizmo = world.create_entity("gizmo", Components::new());

    assert!(world.get::<SceneMeta>(kept).unwrap().persistent);
    assert!(!world.get::<SceneMeta>(gizmo).unwrap().persistent);
    assert_eq!(world.entity_layer(gizmo), Some(Layer::DEBUG));
}

#[derive(Default)]
struct Recording(Rc<RefCell<Vec<String>>>);

impl RenderBackend for Recording {
    fn draw_sprite(&mut self, _entity: Handle, sprite: &Sprite, _transform: Mat4) {
        self.0
            .borrow_mut()
            .push(format!("sprite{}@{}", sprite.texture.raw(), sprite.priority));
    }

    fn draw_text(&mut self, _entity: Handle, text: &Text, _transform: Mat4) {
        self.0
            .borrow_mut()
            .push(format!("{}@{}", text.content, text.priority));
    }
}

#[test]
fn overlay_draws_above_base_regardless_of_local_priority() {
    let config = WorldConfig::from_json_str(r#"{ "layer_priority_range": 100 }"#).unwrap();
    let mut world = World::with_config(config);

    world.create_entity(
        "background",
        Components::new().with(Sprite::new(Handle::from_raw(1), Vec2::ONE).with_priority(50)),
    );
    world.begin_layer(Layer::OVERLAY_0);
    world.create_entity(
        "title",
        Components::new().with(Text::new("Paused", 24.0).with_priority(-10)),
    );
    world.make_visible(Layer::OVERLAY_0);

    let drawn = Rc::new(RefCell::new(Vec::new()));
    let mut backend = Recording(Rc::clone(&drawn));
    assert_eq!(render_frame(&world, &mut backend), 2);
    assert_eq!(*drawn.borrow(), vec!["sprite1@50", "Paused@90"]);
}

#[test]
fn initial_layer_from_config() {
    let config = WorldConfig::from_json_str(r#"{ "initial_layer": 1 }"#).unwrap();
    let mut world = World::with_config(config);
    assert_eq!(world.layers().running(), Layer::OVERLAY_0);

    let e = world.create_entity("menu", Components::new());
    assert_eq!(world.entity_layer(e), Some(Layer::OVERLAY_0));
    assert_eq!(world.layers().drawn(), vec![e]);
}
