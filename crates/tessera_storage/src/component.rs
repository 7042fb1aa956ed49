//! The component marker trait.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A plain data value that can be attached to an entity.
///
/// Components are value-copied on insert and copy, default-constructed by
/// `add_default`, and carry their own binary and JSON contract through
/// serde.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use tessera_storage::Component;
///
/// #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// struct Name {
///     name: String,
/// }
///
/// impl Component for Name {}
/// ```
pub trait Component: Clone + Default + Serialize + DeserializeOwned + 'static {
    /// Stable name used to key this component type in archives.
    ///
    /// Defaults to the Rust type name. Override it to keep archives
    /// readable after a type is moved or renamed.
    #[must_use]
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }
}
