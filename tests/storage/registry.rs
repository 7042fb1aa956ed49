//! Integration tests for the registry
//!
//! Tests registration, entity lifecycle, typed access, and configuration.

use tessera_storage::{Entity, Registry, RegistryConfig};

use crate::common::{Material, Name, Transform, scene};

// =============================================================================
// Registration
// =============================================================================

#[test]
fn registration_order_is_kept() {
    let registry = scene();
    let names: Vec<_> = registry.component_names().collect();
    assert_eq!(names, vec!["name", "transform", "material"]);
}

#[test]
fn is_registered_reports_types() {
    let mut registry = Registry::new();
    assert!(!registry.is_registered::<Name>());
    registry.ensure_exists::<Name>();
    assert!(registry.is_registered::<Name>());
    assert!(!registry.is_registered::<Material>());
}

#[test]
#[should_panic(expected = "not registered")]
fn get_unregistered_panics() {
    let mut registry = Registry::new();
    let e = registry.create();
    let _ = registry.get::<Name>(e);
}

// =============================================================================
// Entity Lifecycle
// =============================================================================

#[test]
fn destroy_removes_from_every_storage() {
    let mut registry = scene();
    let e = registry.create();
    let other = registry.create();
    registry.add(e, Name::new("doomed"));
    registry.add(e, Transform::default());
    registry.add(e, Material::default());
    registry.add(other, Name::new("survivor"));

    registry.destroy(e);

    assert!(!registry.has_all::<(Name,)>(e));
    assert!(!registry.has::<Transform>(e));
    assert!(!registry.has::<Material>(e));
    assert_eq!(registry.get::<Name>(other).name, "survivor");
}

#[test]
#[should_panic(expected = "was not created by this registry")]
fn add_requires_created_entity() {
    let mut registry = scene();
    registry.create();
    registry.add(Entity::from_raw(3), Name::new("stray"));
}

#[test]
fn destroy_twice_is_harmless() {
    let mut registry = scene();
    let e = registry.create();
    registry.add(e, Name::new("x"));
    registry.destroy(e);
    registry.destroy(e);
    assert_eq!(registry.count::<Name>(), 0);
}

#[test]
fn clone_entity_is_independent() {
    let mut registry = scene();
    let source = registry.create();
    registry.add(source, Name::new("template"));
    registry.add(
        source,
        Transform {
            scale: [2.0; 3],
            ..Transform::default()
        },
    );

    let copy = registry.clone_entity(source);
    registry.get_mut::<Name>(copy).name = "instance".to_string();

    assert_eq!(registry.get::<Name>(source).name, "template");
    assert_eq!(registry.get::<Transform>(copy).scale, [2.0; 3]);
    assert!(!registry.has::<Material>(copy));
}

// =============================================================================
// Typed Access
// =============================================================================

#[test]
fn get_many_and_has_all() {
    let mut registry = scene();
    let e = registry.create();
    registry.add(e, Name::new("lamp"));
    registry.add_default::<Material>(e);

    assert!(registry.has_all::<(Name, Material)>(e));
    assert!(!registry.has_all::<(Name, Transform)>(e));
    assert!(!registry.has_all::<(Name,)>(Entity::NULL));

    let (name, material) = registry.get_many::<(Name, Material)>(e);
    assert_eq!(name.name, "lamp");
    assert_eq!(material, &Material::default());
}

#[test]
fn each_visits_dense_order() {
    let mut registry = scene();
    let ids: Vec<_> = (0..4).map(|_| registry.create()).collect();
    for (i, &e) in ids.iter().enumerate() {
        registry.add(e, Name::new(&format!("n{i}")));
    }
    registry.remove::<Name>(ids[0]);

    let visited: Vec<_> = registry.each::<Name>().map(|(e, _)| e).collect();
    assert_eq!(visited, vec![ids[3], ids[1], ids[2]]);
}

#[test]
fn storage_exposes_dense_arrays() {
    let mut registry = scene();
    let e = registry.create();
    registry.add(e, Name::new("solo"));

    let storage = registry.storage::<Name>();
    assert_eq!(storage.entities(), &[e]);
    assert_eq!(storage.components()[0].name, "solo");
    assert!(registry.try_storage::<Name>().is_some());
}

#[test]
fn copy_overwrites_target() {
    let mut registry = scene();
    let a = registry.create();
    let b = registry.create();
    registry.add(a, Name::new("a"));
    registry.add(b, Name::new("b"));

    assert!(registry.copy::<Name>(a, b));
    assert_eq!(registry.get::<Name>(b).name, "a");
    assert_eq!(registry.count::<Name>(), 2);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn config_is_retained() {
    let config = RegistryConfig::large_scene();
    let registry = Registry::with_config(config);
    assert_eq!(registry.config(), &config);
}

#[test]
fn clear_resets_entities_and_storages() {
    let mut registry = scene();
    for _ in 0..3 {
        let e = registry.create();
        registry.add(e, Name::default());
    }

    registry.clear();

    assert!(registry.entities().is_empty());
    assert!(!registry.any::<Name>());
    assert_eq!(registry.component_names().count(), 3);
}
