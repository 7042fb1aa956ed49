//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use tessera_foundation::{Entity, Error, ErrorKind};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_truncated() {
    let err = Error::truncated(8, 3);
    assert!(matches!(
        err.kind,
        ErrorKind::Truncated {
            expected: 8,
            available: 3
        }
    ));
    let msg = format!("{err}");
    assert!(msg.contains('8'));
    assert!(msg.contains('3'));
}

#[test]
fn error_unknown_component() {
    let err = Error::unknown_component("velocity");
    assert!(matches!(err.kind, ErrorKind::UnknownComponent(_)));
    assert!(format!("{err}").contains("velocity"));
}

#[test]
fn error_inconsistent_sparse() {
    let err = Error::inconsistent_sparse(Entity::from_raw(12));
    assert!(matches!(err.kind, ErrorKind::InconsistentSparse { .. }));
    assert!(format!("{err}").contains("12"));
}

#[test]
fn error_entity_out_of_sequence() {
    let err = Error::new(ErrorKind::EntityOutOfSequence {
        position: 2,
        entity: Entity::from_raw(5),
    });
    let msg = format!("{err}");
    assert!(msg.contains("position 2"));
    assert!(msg.contains("#5"));
}

#[test]
fn error_io() {
    let err = Error::io("disk full");
    assert!(matches!(err.kind, ErrorKind::Io(_)));
    assert!(format!("{err}").contains("disk full"));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn error_context_is_kept_separately() {
    let err = Error::codec("bad marker").with_context("component speed");
    assert_eq!(err.context.as_deref(), Some("component speed"));
    assert!(!format!("{err}").contains("component speed"));
}

#[test]
fn error_is_std_error() {
    fn takes_error(_: &dyn std::error::Error) {}
    takes_error(&Error::new(ErrorKind::NullEntity));
}
