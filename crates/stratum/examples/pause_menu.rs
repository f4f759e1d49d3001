//! Pause-menu walkthrough: gameplay on Base, a menu on Overlay0, editor
//! gizmos on Debug.
//!
//! Run: `cargo run -p stratum --example pause_menu [config.json]`
//!
//! With `stratum-telemetry` running in another terminal the world streams
//! its stats to the dashboard while the demo runs.

use std::time::Duration;

use stratum::prelude::*;

struct Velocity(Vec3);

struct Blink {
    period_ms: f32,
    elapsed_ms: f32,
}

/// Prints draw calls instead of rasterizing them.
struct ConsoleBackend {
    frame: u64,
}

impl RenderBackend for ConsoleBackend {
    fn draw_sprite(&mut self, entity: Handle, sprite: &Sprite, transform: Mat4) {
        let at = transform.col(3).truncate();
        log::info!(
            "[frame {}] sprite {entity} tex {} @ ({:.0}, {:.0}) prio {}",
            self.frame,
            sprite.texture,
            at.x,
            at.y,
            sprite.priority
        );
    }

    fn draw_text(&mut self, entity: Handle, text: &Text, transform: Mat4) {
        let at = transform.col(3).truncate();
        log::info!(
            "[frame {}] text {entity} '{}' @ ({:.0}, {:.0}) prio {}",
            self.frame,
            text.content,
            at.x,
            at.y,
            text.priority
        );
    }
}

fn movement(world: &mut World, dt: f32, entity: Handle) -> anyhow::Result<()> {
    let Some(velocity) = world.get::<Velocity>(entity).map(|v| v.0) else {
        return Ok(());
    };
    let transform = world
        .get_mut::<Transform>(entity)
        .ok_or_else(|| anyhow::anyhow!("{entity} lost its Transform"))?;
    transform.translate(velocity * dt / 1000.0);
    Ok(())
}

/// Toggles the entity's Text on and off. Always updated, so the menu cursor
/// keeps blinking under the Debug layer too.
fn blink(world: &mut World, dt: f32, entity: Handle) -> anyhow::Result<()> {
    let Some(state) = world.get_mut::<Blink>(entity) else {
        return Ok(());
    };
    state.elapsed_ms += dt;
    if state.elapsed_ms < state.period_ms {
        return Ok(());
    }
    state.elapsed_ms = 0.0;
    let visible = world.is_active::<Text>(entity);
    world.set_active::<Text>(entity, !visible);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logger();

    let config = match std::env::args().nth(1) {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };
    let mut world = World::with_config(config);
    world.add_event_sink(|event: &WorldEvent| {
        if let WorldEvent::LayerChanged(layer) = event {
            log::info!("now running {layer}");
        }
    });

    hierarchy::register(&mut world)?;
    world.register_system_for::<(Transform, Velocity)>("Movement", movement, false)?;
    world.register_system_for::<(Blink,)>("Blink", blink, true)?;

    // Gameplay.
    let ship = world.create_entity(
        "ship",
        Components::new()
            .with(Transform::from_xy(0.0, 0.0))
            .with(GlobalTransform::default())
            .with(Velocity(Vec3::new(60.0, 0.0, 0.0)))
            .with(Sprite::new(Handle::from_raw(0), Vec2::splat(32.0)).with_priority(10)),
    );
    world.create_entity(
        "turret",
        Components::new()
            .with(Transform::from_xy(12.0, 4.0))
            .with(GlobalTransform::default())
            .with(Parent(ship))
            .with(Sprite::new(Handle::from_raw(1), Vec2::splat(8.0)).with_priority(11)),
    );

    // Pause menu.
    world.begin_layer(Layer::OVERLAY_0);
    world.create_entity(
        "menu title",
        Components::new()
            .with(Transform::from_xy(0.0, 100.0))
            .with(Text::new("Paused", 32.0)),
    );
    world.create_entity(
        "menu cursor",
        Components::new()
            .with(Transform::from_xy(-40.0, 60.0))
            .with(Text::new(">", 24.0))
            .with(Blink {
                period_ms: 250.0,
                elapsed_ms: 0.0,
            }),
    );

    // Editor gizmos.
    world.begin_layer(Layer::DEBUG);
    world.create_entity(
        "origin gizmo",
        Components::new()
            .with(Transform::default())
            .with(Sprite::new(Handle::from_raw(2), Vec2::splat(4.0))),
    );
    world.begin_layer(Layer::BASE);

    #[cfg(feature = "diagnostics")]
    let mut diag = DiagSender::new();

    let mut backend = ConsoleBackend { frame: 0 };
    for frame in 0..40u64 {
        match frame {
            10 => world.make_visible(Layer::OVERLAY_0),
            20 => world.handle_editor_event(EditorEvent::Start),
            30 => world.handle_editor_event(EditorEvent::Stop),
            _ => {}
        }

        world.update(16.0);
        backend.frame = world.clock().frame_count();
        if frame % 10 == 5 {
            render_frame(&world, &mut backend);
        }

        #[cfg(feature = "diagnostics")]
        if let Some(sender) = diag.as_mut() {
            send_diagnostics(&world, sender);
        }
        std::thread::sleep(Duration::from_millis(16));
    }

    let stats = world.stats();
    log::info!(
        "{} frames, {} entities, ship at {:?}",
        stats.frame_count,
        stats.pool.alive_count,
        world.get::<GlobalTransform>(ship).map(|g| g.translation())
    );

    world.shutdown();
    Ok(())
}
