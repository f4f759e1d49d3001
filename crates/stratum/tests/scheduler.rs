//! End-to-end behavior of the frame loop through the public API.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use stratum::prelude::*;

struct Data {
    count: u32,
}

struct Marker;

fn counter(world: &mut World, _dt: f32, entity: Handle) -> anyhow::Result<()> {
    if let Some(data) = world.get_mut::<Data>(entity) {
        data.count += 1;
    }
    Ok(())
}

#[test]
fn counter_stops_while_component_inactive() {
    let mut world = World::new();
    world
        .register_system_for::<(Data,)>("Counter", counter, false)
        .unwrap();
    let e = world.create_entity("counted", Components::new().with(Data { count: 0 }));

    world.update(16.0);
    world.update(16.0);
    assert_eq!(world.get::<Data>(e).unwrap().count, 2);

    world.set_active::<Data>(e, false);
    world.update(16.0);
    world.update(16.0);
    assert_eq!(world.get::<Data>(e).unwrap().count, 2);
    assert!(world.entities_in_system("Counter").is_empty());

    world.set_active::<Data>(e, true);
    world.update(16.0);
    assert_eq!(world.get::<Data>(e).unwrap().count, 3);
}

#[test]
fn membership_requires_every_kind() {
    let mut world = World::new();
    world
        .register_system_for::<(Data, Marker)>("Both", counter, false)
        .unwrap();
    let only_data = world.create_entity("a", Components::new().with(Data { count: 0 }));
    let both = world.create_entity(
        "b",
        Components::new().with(Data { count: 0 }).with(Marker),
    );

    world.update(16.0);

    assert_eq!(world.entities_in_system("Both"), vec![both]);
    assert_eq!(world.get::<Data>(only_data).unwrap().count, 0);
    assert_eq!(world.get::<Data>(both).unwrap().count, 1);
}

fn members(world: &World, system: &str) -> HashSet<Handle> {
    world.entities_in_system(system).into_iter().collect()
}

#[test]
fn toggling_one_of_two_kinds_restores_membership() {
    let mut world = World::new();
    world
        .register_system_for::<(Data, Marker)>("Both", counter, false)
        .unwrap();
    let kind_data = world.kind_of::<Data>().unwrap();
    let kind_marker = world.kind_of::<Marker>().unwrap();
    let a = world.create_entity("a", Components::new().with(Data { count: 0 }).with(Marker));
    let b = world.create_entity("b", Components::new().with(Data { count: 0 }).with(Marker));
    let before = members(&world, "Both");
    assert_eq!(before, HashSet::from([a, b]));

    world.set_component_active(a, kind_data, false);
    assert_eq!(members(&world, "Both"), HashSet::from([b]));
    world.set_component_active(a, kind_data, true);
    assert_eq!(members(&world, "Both"), before);

    // With Marker off, re-enabling Data alone must not bring `a` back.
    world.set_component_active(a, kind_marker, false);
    world.set_component_active(a, kind_data, false);
    world.set_component_active(a, kind_data, true);
    assert_eq!(members(&world, "Both"), HashSet::from([b]));

    world.set_component_active(a, kind_marker, true);
    assert_eq!(members(&world, "Both"), before);
}

#[derive(Clone, Default)]
struct Teardowns(Rc<RefCell<Vec<Handle>>>);

impl System for Teardowns {
    fn update(&mut self, _world: &mut World, _dt: f32, _entity: Handle) -> anyhow::Result<()> {
        Ok(())
    }

    fn shutdown_entity(&mut self, _world: &mut World, entity: Handle) {
        self.0.borrow_mut().push(entity);
    }
}

#[test]
fn double_delete_tears_down_once() {
    let mut world = World::new();
    let teardowns = Teardowns::default();
    world
        .register_system_for::<(Marker,)>("Watch", teardowns.clone(), false)
        .unwrap();
    let log = EventLog::new();
    world.add_event_sink(log.clone());

    let e = world.create_entity("doomed", Components::new().with(Marker));
    world.delete_entity(e);
    world.delete_entity(e);
    assert!(world.is_alive(e));
    assert!(world.is_pending_deletion(e));

    world.update(16.0);

    assert!(!world.is_alive(e));
    assert_eq!(*teardowns.0.borrow(), vec![e]);
    assert_eq!(log.count(WorldEvent::EntityDestroyed(e)), 1);

    // Already gone: ignored.
    world.delete_entity(e);
    world.update(16.0);
    assert_eq!(teardowns.0.borrow().len(), 1);
}

#[test]
fn systems_run_in_registration_order() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut world = World::new();
    hierarchy::register(&mut world).unwrap();

    let seen = Rc::clone(&order);
    world
        .register_system_for::<(Transform, GlobalTransform)>(
            "Render",
            move |world: &mut World, _: f32, entity: Handle| -> anyhow::Result<()> {
                let global = world.get::<GlobalTransform>(entity).map(|g| g.translation());
                seen.borrow_mut().push(global);
                Ok(())
            },
            true,
        )
        .unwrap();
    assert_eq!(world.system_names(), vec!["Parent".to_string(), "Render".to_string()]);

    let root = world.create_entity(
        "root",
        Components::new()
            .with(Transform::from_xy(100.0, 0.0))
            .with(GlobalTransform::default()),
    );
    world.create_entity(
        "child",
        Components::new()
            .with(Transform::from_xy(5.0, 0.0))
            .with(GlobalTransform::default())
            .with(Parent(root)),
    );

    world.update(16.0);

    // Render saw the transforms Parent computed in the same frame.
    assert_eq!(
        *order.borrow(),
        vec![
            Some(Vec3::new(100.0, 0.0, 0.0)),
            Some(Vec3::new(105.0, 0.0, 0.0)),
        ]
    );
}

#[test]
fn failing_entity_does_not_stop_the_others() {
    let mut world = World::new();
    world
        .register_system_for::<(Data,)>(
            "Picky",
            |world: &mut World, _: f32, entity: Handle| -> anyhow::Result<()> {
                let data = world
                    .get_mut::<Data>(entity)
                    .ok_or_else(|| anyhow::anyhow!("no data"))?;
                if data.count == 99 {
                    anyhow::bail!("refusing 99");
                }
                data.count += 1;
                Ok(())
            },
            false,
        )
        .unwrap();

    let ok_a = world.create_entity("a", Components::new().with(Data { count: 0 }));
    let bad = world.create_entity("b", Components::new().with(Data { count: 99 }));
    let ok_c = world.create_entity("c", Components::new().with(Data { count: 0 }));

    world.update(16.0);

    assert_eq!(world.get::<Data>(ok_a).unwrap().count, 1);
    assert_eq!(world.get::<Data>(bad).unwrap().count, 99);
    assert_eq!(world.get::<Data>(ok_c).unwrap().count, 1);
    assert_eq!(world.system_faults("Picky"), Some(1));
}

#[test]
fn live_handles_are_unique_and_recycled_lowest_first() {
    let mut world = World::new();
    let handles: Vec<Handle> = (0..6)
        .map(|i| world.create_entity(&format!("e{i}"), Components::new()))
        .collect();
    let unique: HashSet<Handle> = handles.iter().copied().collect();
    assert_eq!(unique.len(), handles.len());

    world.delete_entity(handles[4]);
    world.delete_entity(handles[1]);
    world.update(16.0);

    let reused = world.create_entity("again", Components::new());
    assert_eq!(reused, handles[1]);
    let reused = world.create_entity("again", Components::new());
    assert_eq!(reused, handles[4]);
    assert_eq!(world.entity_count(), 6);
}

#[test]
fn shutdown_empties_the_world() {
    let mut world = World::new();
    let teardowns = Teardowns::default();
    world
        .register_system_for::<(Marker,)>("Watch", teardowns.clone(), false)
        .unwrap();
    world.create_entity("a", Components::new().with(Marker));
    world.begin_layer(Layer::DEBUG);
    world.create_entity("b", Components::new().with(Marker));

    world.shutdown();

    assert!(world.is_shut_down());
    assert_eq!(world.entity_count(), 0);
    assert_eq!(teardowns.0.borrow().len(), 2);
    assert!(world.layers().is_empty());
}
