//! Run-scoped entity store
//!
//! Entities live in an arena and are addressed by [`EntityId`]. A reference
//! id seen before its definition gets a placeholder slot; the definition
//! later overwrites that slot in place, so every [`Type::Entity`] created
//! against the placeholder observes the full definition.
//!
//! [`Type::Entity`]: crate::types::Type::Entity

use crate::entity::{BaseNode, Function, StructType, TypeDefinition};
use crate::error::CoreError;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::trace;

/// Stable handle to an entity slot
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(usize);

impl EntityId {
    pub const fn to_raw(self) -> usize {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct EntityStore {
    entities: Vec<Box<dyn TypeDefinition>>,
    defined: Vec<bool>,
    by_refid: HashMap<String, EntityId>,
    by_name: HashMap<String, EntityId>,
    functions: Vec<Function>,
    files: BTreeMap<String, BaseNode>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for `refid`, creating a placeholder struct the first time.
    pub fn get_or_create(&mut self, refid: &str) -> EntityId {
        if let Some(id) = self.by_refid.get(refid) {
            return *id;
        }
        let id = EntityId(self.entities.len());
        trace!("forward reference {} -> {}", refid, id);
        self.entities.push(Box::new(StructType::placeholder(refid)));
        self.defined.push(false);
        self.by_refid.insert(refid.to_string(), id);
        id
    }

    /// Install the full definition for `refid` in its slot.
    pub fn define(
        &mut self,
        refid: &str,
        definition: Box<dyn TypeDefinition>,
    ) -> Result<EntityId, CoreError> {
        let id = self.get_or_create(refid);
        if self.defined[id.0] {
            return Err(CoreError::DuplicateDefinition(refid.to_string()));
        }
        let name = definition.base().name.clone();
        self.entities[id.0] = definition;
        self.defined[id.0] = true;
        if !name.is_empty() {
            self.by_name.entry(name).or_insert(id);
        }
        Ok(id)
    }

    pub fn lookup(&self, refid: &str) -> Option<EntityId> {
        self.by_refid.get(refid).copied()
    }

    pub fn get(&self, id: EntityId) -> Option<&dyn TypeDefinition> {
        self.entities.get(id.0).map(|e| e.as_ref())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut dyn TypeDefinition> {
        match self.entities.get_mut(id.0) {
            Some(e) => Some(e.as_mut()),
            None => None,
        }
    }

    pub fn is_defined(&self, id: EntityId) -> bool {
        self.defined.get(id.0).copied().unwrap_or(false)
    }

    /// First defined entity with this source name.
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Reference ids that were referenced but never defined.
    pub fn unresolved(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = self
            .by_refid
            .iter()
            .filter(|(_, id)| !self.defined[id.0])
            .map(|(refid, _)| refid.as_str())
            .collect();
        refs.sort_unstable();
        refs
    }

    /// Defined entities ordered by host name, then reference id.
    pub fn iter_sorted(&self) -> Vec<(EntityId, &dyn TypeDefinition)> {
        let mut out: Vec<(EntityId, &dyn TypeDefinition)> = self
            .entities
            .iter()
            .enumerate()
            .filter(|(i, _)| self.defined[*i])
            .map(|(i, e)| (EntityId(i), e.as_ref()))
            .collect();
        out.sort_by(|(_, a), (_, b)| {
            let key_a = (a.base().host_name().unwrap_or(""), a.base().refid.as_str());
            let key_b = (b.base().host_name().unwrap_or(""), b.base().refid.as_str());
            key_a.cmp(&key_b)
        });
        out
    }

    pub fn add_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn add_file(&mut self, file: BaseNode) -> Result<(), CoreError> {
        if self.files.contains_key(&file.refid) {
            return Err(CoreError::DuplicateFile(file.refid));
        }
        self.files.insert(file.refid.clone(), file);
        Ok(())
    }

    pub fn files(&self) -> impl Iterator<Item = &BaseNode> {
        self.files.values()
    }
}
