//! Registry-wide archives.
//!
//! A binary archive holds the entity list, the number of storages, then one
//! block per storage: its component name followed by the storage layout
//! written by [`ComponentStorage::write_binary`](crate::ComponentStorage::write_binary).
//! Dense order and sparse indices are restored exactly.
//!
//! The JSON document has the shape
//! `{"entities": [..], "components": {"<name>": [{"entity": .., "value": ..}]}}`
//! and is meant for diffable scene files. Binary is the bulk format.
//!
//! Loading never leaves a registry half-written: every block is decoded and
//! validated into fresh storages first, and the registry is only replaced
//! once the whole archive has been accepted.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::Deserialize;
use tessera_foundation::{BinaryReader, BinaryWriter, Entity, Error, ErrorKind, Result};
use tracing::{debug, warn};

use crate::erased::ErasedStorage;
use crate::registry::Registry;

impl Registry {
    /// Writes a binary archive of every entity and storage.
    ///
    /// Returns the number of bytes written. Nothing is written if a storage
    /// holds an entity this registry never created.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnknownEntity`] for such a storage, or an error
    /// if the writer fails or a component cannot be encoded.
    pub fn write_binary<W: Write>(&self, mut out: W) -> Result<usize> {
        self.check_owners()?;
        let sink: &mut dyn Write = &mut out;
        let mut writer = BinaryWriter::new(sink);

        writer.write_entities(&self.entities)?;
        writer.write_len("storage", self.storages.len())?;
        for storage in &self.storages {
            writer.write_str(storage.component_name())?;
            storage
                .write_binary(&mut writer)
                .map_err(|e| e.with_context(format!("component {}", storage.component_name())))?;
        }
        writer.flush()?;

        let written = writer.bytes_written();
        debug!(
            entities = self.entities.len(),
            storages = self.storages.len(),
            bytes = written,
            "wrote binary archive"
        );
        Ok(written)
    }

    /// Replaces the registry contents with a binary archive.
    ///
    /// Every component named in the archive must be registered. Registered
    /// storages the archive does not mention end up empty. On error the
    /// registry is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive is truncated, names an unknown or
    /// duplicate component, or fails validation.
    pub fn read_binary<R: Read>(&mut self, mut input: R) -> Result<()> {
        let source: &mut dyn Read = &mut input;
        let mut reader =
            BinaryReader::new(source).with_max_sequence_len(self.config().max_sequence_len);

        let result = self.decode_binary(&mut reader);
        match result {
            Ok((entities, restored)) => {
                self.commit(entities, restored);
                debug!(
                    entities = self.entities.len(),
                    storages = self.storages.len(),
                    "loaded binary archive"
                );
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, context = ?err.context, "rejected binary archive");
                Err(err)
            }
        }
    }

    fn decode_binary(
        &self,
        reader: &mut BinaryReader<&mut dyn Read>,
    ) -> Result<(Vec<Entity>, Vec<Option<Box<dyn ErasedStorage>>>)> {
        let entities = reader.read_entities()?;
        check_sequential(&entities)?;

        let count = reader.read_len("storage")?;
        let mut restored = self.empty_slots();
        for _ in 0..count {
            let name = reader.read_string()?;
            let index = self.slot_for(&name, &restored)?;

            let mut storage = self.storages[index].fresh();
            storage
                .read_binary(reader)
                .map_err(|e| e.with_context(format!("component {name}")))?;
            check_known(storage.entities(), entities.len())?;
            restored[index] = Some(storage);
        }

        Ok((entities, restored))
    }

    /// Encodes the registry as a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnknownEntity`] if a storage holds an entity this
    /// registry never created, or an error if a component cannot be
    /// represented as JSON.
    pub fn write_json(&self) -> Result<serde_json::Value> {
        self.check_owners()?;
        let mut components = serde_json::Map::new();
        for storage in &self.storages {
            let block = storage
                .write_json()
                .map_err(|e| e.with_context(format!("component {}", storage.component_name())))?;
            components.insert(storage.component_name().to_owned(), block);
        }

        let entities =
            serde_json::to_value(&self.entities).map_err(|e| Error::codec(e.to_string()))?;
        Ok(serde_json::json!({
            "entities": entities,
            "components": components,
        }))
    }

    /// Replaces the registry contents with a document from
    /// [`write_json`](Self::write_json).
    ///
    /// Same acceptance rules as [`read_binary`](Self::read_binary). On error
    /// the registry is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not decode, names an unknown
    /// component, or fails validation.
    pub fn read_json(&mut self, json: &serde_json::Value) -> Result<()> {
        match self.decode_json(json) {
            Ok((entities, restored)) => {
                self.commit(entities, restored);
                debug!(
                    entities = self.entities.len(),
                    storages = self.storages.len(),
                    "loaded json document"
                );
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, context = ?err.context, "rejected json document");
                Err(err)
            }
        }
    }

    fn decode_json(
        &self,
        json: &serde_json::Value,
    ) -> Result<(Vec<Entity>, Vec<Option<Box<dyn ErasedStorage>>>)> {
        let document = JsonDocument::deserialize(json).map_err(|e| Error::codec(e.to_string()))?;
        check_sequential(&document.entities)?;

        let mut restored = self.empty_slots();
        for (name, block) in &document.components {
            let index = self.slot_for(name, &restored)?;

            let mut storage = self.storages[index].fresh();
            storage
                .read_json(block)
                .map_err(|e| e.with_context(format!("component {name}")))?;
            check_known(storage.entities(), document.entities.len())?;
            restored[index] = Some(storage);
        }

        Ok((document.entities, restored))
    }

    fn check_owners(&self) -> Result<()> {
        for storage in &self.storages {
            check_known(storage.entities(), self.entities.len()).map_err(|e| {
                warn!(error = %e, component = storage.component_name(), "refusing to archive");
                e.with_context(format!("component {}", storage.component_name()))
            })?;
        }
        Ok(())
    }

    fn empty_slots(&self) -> Vec<Option<Box<dyn ErasedStorage>>> {
        self.storages.iter().map(|_| None).collect()
    }

    fn slot_for(&self, name: &str, restored: &[Option<Box<dyn ErasedStorage>>]) -> Result<usize> {
        let index = *self
            .by_name
            .get(name)
            .ok_or_else(|| Error::unknown_component(name))?;
        if restored[index].is_some() {
            return Err(Error::new(ErrorKind::DuplicateComponent(name.to_owned())));
        }
        Ok(index)
    }

    fn commit(&mut self, entities: Vec<Entity>, restored: Vec<Option<Box<dyn ErasedStorage>>>) {
        for (slot, storage) in self.storages.iter_mut().zip(restored) {
            match storage {
                Some(storage) => *slot = storage,
                None => slot.clear(),
            }
        }
        self.entities = entities;
    }
}

#[derive(Deserialize)]
struct JsonDocument {
    entities: Vec<Entity>,
    #[serde(default)]
    components: serde_json::Map<String, serde_json::Value>,
}

/// Entity lists are always `0, 1, 2, ...` since ids come from `create`.
fn check_sequential(entities: &[Entity]) -> Result<()> {
    for (position, &entity) in entities.iter().enumerate() {
        if entity.index() != position {
            return Err(Error::new(ErrorKind::EntityOutOfSequence { position, entity }));
        }
    }
    Ok(())
}

fn check_known(owners: &[Entity], entity_count: usize) -> Result<()> {
    match owners.iter().find(|e| e.index() >= entity_count) {
        Some(&entity) => Err(Error::new(ErrorKind::UnknownEntity(entity))),
        None => Ok(()),
    }
}

/// Serializes a registry to a binary archive in memory.
///
/// # Errors
///
/// Returns an error if a component cannot be encoded.
pub fn to_bytes(registry: &Registry) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    registry.write_binary(&mut bytes)?;
    Ok(bytes)
}

/// Loads a binary archive into a registry whose types are already registered.
///
/// # Errors
///
/// Returns an error if the archive is rejected; the registry is unchanged.
pub fn from_bytes(registry: &mut Registry, bytes: &[u8]) -> Result<()> {
    registry.read_binary(bytes)
}

/// Saves a registry to a binary archive file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to, or if a
/// component cannot be encoded.
pub fn save_to_file<P: AsRef<Path>>(registry: &Registry, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        Error::io(format!("failed to create file '{}': {e}", path.display()))
    })?;

    let mut writer = BufWriter::new(file);
    registry
        .write_binary(&mut writer)
        .map_err(|e| e.with_context(format!("file '{}'", path.display())))?;
    writer.flush().map_err(|e| {
        Error::io(format!("failed to flush file '{}': {e}", path.display()))
    })?;

    Ok(())
}

/// Loads a binary archive file into a registry.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or the archive is rejected.
pub fn load_from_file<P: AsRef<Path>>(registry: &mut Registry, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| Error::io(format!("failed to open file '{}': {e}", path.display())))?;

    registry
        .read_binary(BufReader::new(file))
        .map_err(|e| e.with_context(format!("file '{}'", path.display())))
}

/// Serializes a registry to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if a component cannot be represented as JSON.
pub fn to_json_string(registry: &Registry) -> Result<String> {
    let document = registry.write_json()?;
    serde_json::to_string_pretty(&document).map_err(|e| Error::codec(e.to_string()))
}

/// Loads a JSON document into a registry whose types are already registered.
///
/// # Errors
///
/// Returns an error if the text is not JSON or the document is rejected.
pub fn from_json_str(registry: &mut Registry, text: &str) -> Result<()> {
    let document: serde_json::Value =
        serde_json::from_str(text).map_err(|e| Error::codec(e.to_string()))?;
    registry.read_json(&document)
}
