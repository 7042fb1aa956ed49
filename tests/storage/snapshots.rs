//! Integration tests for registry snapshots
//!
//! Tests binary and JSON scene archives, file round-trips, and rejection of
//! malformed input.

use tessera_storage::snapshot::{
    from_bytes, from_json_str, load_from_file, save_to_file, to_bytes, to_json_string,
};
use tessera_storage::{ErrorKind, Registry, RegistryConfig};

use crate::common::{Material, Name, Transform, scene};

fn build_scene() -> Registry {
    let mut registry = scene();
    let camera = registry.create();
    registry.add(camera, Name::new("camera"));
    registry.add(
        camera,
        Transform {
            position: [0.0, 2.0, -5.0],
            ..Transform::default()
        },
    );

    let floor = registry.create();
    registry.add(floor, Name::new("floor"));
    registry.add(floor, Transform::default());
    registry.add(
        floor,
        Material {
            albedo: [128, 128, 128, 255],
            roughness: 0.8,
            texture: Some("tiles.png".to_string()),
        },
    );

    let removed = registry.create();
    registry.add(removed, Name::new("temporary"));
    registry.destroy(removed);

    let light = registry.create();
    registry.add(light, Name::new("light"));
    registry
}

fn assert_scene_eq(a: &Registry, b: &Registry) {
    assert_eq!(a.entities(), b.entities());
    assert_eq!(
        a.storage::<Name>().components(),
        b.storage::<Name>().components()
    );
    assert_eq!(a.storage::<Name>().entities(), b.storage::<Name>().entities());
    assert_eq!(
        a.storage::<Transform>().components(),
        b.storage::<Transform>().components()
    );
    assert_eq!(
        a.storage::<Material>().components(),
        b.storage::<Material>().components()
    );
}

#[test]
fn binary_scene_roundtrip() {
    let original = build_scene();
    let bytes = to_bytes(&original).unwrap();

    let mut restored = scene();
    from_bytes(&mut restored, &bytes).unwrap();

    assert_scene_eq(&original, &restored);
    assert_eq!(
        original.storage::<Name>().sparse(),
        restored.storage::<Name>().sparse()
    );

    // Ids continue after the archived list.
    assert_eq!(restored.create().raw(), 4);
}

#[test]
fn binary_archive_is_deterministic() {
    let scene = build_scene();
    assert_eq!(to_bytes(&scene).unwrap(), to_bytes(&scene).unwrap());
}

#[test]
fn json_scene_roundtrip() {
    let original = build_scene();
    let text = to_json_string(&original).unwrap();
    assert!(text.contains("\"tiles.png\""));

    let mut restored = scene();
    from_json_str(&mut restored, &text).unwrap();

    assert_scene_eq(&original, &restored);
}

#[test]
fn file_scene_roundtrip() {
    let original = build_scene();
    let path = std::env::temp_dir().join(format!("tessera_scene_{}.bin", std::process::id()));

    save_to_file(&original, &path).unwrap();
    let mut restored = scene();
    let loaded = load_from_file(&mut restored, &path);
    let _ = std::fs::remove_file(&path);

    loaded.unwrap();
    assert_scene_eq(&original, &restored);
}

#[test]
fn sequence_limit_is_enforced() {
    let bytes = to_bytes(&build_scene()).unwrap();

    let mut strict = Registry::with_config(RegistryConfig::default().with_max_sequence_len(2));
    strict.register_set::<(Name, Transform, Material)>();
    let err = from_bytes(&mut strict, &bytes).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::SequenceTooLong { .. }));
    assert!(strict.entities().is_empty());
}

#[test]
fn garbage_is_rejected_without_changes() {
    let mut registry = build_scene();
    let before = to_bytes(&registry).unwrap();

    assert!(from_bytes(&mut registry, &[1, 2, 3]).is_err());
    assert!(from_json_str(&mut registry, "{ not json").is_err());

    assert_eq!(to_bytes(&registry).unwrap(), before);
}
