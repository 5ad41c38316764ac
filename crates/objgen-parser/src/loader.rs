//! Entity loader
//!
//! Consumes documentation entries and fills the [`EntityStore`]. Loading is
//! two-pass: [`Loader::load_index`] runs once per index, then
//! [`Loader::finish`] attaches methods whose receiver was declared outside
//! the entry that owns it.

use crate::doc::{
    location_of, CompoundDef, CompoundKind, DocIndex, IndexEntry, MemberDef, SectionDef,
    SectionKind,
};
use crate::error::{Capability, ParserError};
use crate::signature::SignatureResolver;
use objgen_core::{
    Attribute, BaseNode, EntityStore, FuncArg, Function, Property, ProtocolType, StructType, Type,
    TypeDefinition, UnionType,
};
use serde::Serialize;
use tracing::{debug, info, instrument, trace, warn};

/// Marker the extractor appends to protocol names.
const PROTOCOL_MARKER: &str = " -p";

/// Counters for one load run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub entries: usize,
    pub structs: usize,
    pub protocols: usize,
    pub unions: usize,
    pub files: usize,
    pub ignored: usize,
    /// Methods attached while their owner was loaded
    pub methods: usize,
    /// Methods queued for the second pass
    pub deferred: usize,
    /// Queued methods attached by `finish`
    pub attached: usize,
    /// Queued methods whose receiver never appeared
    pub unattached: usize,
    pub free_functions: usize,
    pub duplicate_methods: usize,
    /// Signatures kept as unknown types because they did not parse
    pub malformed: usize,
}

pub struct Loader<'s> {
    store: &'s mut EntityStore,
    pending: Vec<Function>,
    stats: LoadStats,
}

impl<'s> Loader<'s> {
    pub fn new(store: &'s mut EntityStore) -> Self {
        Self {
            store,
            pending: Vec::new(),
            stats: LoadStats::default(),
        }
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    /// Methods still waiting for their receiver.
    pub fn pending(&self) -> &[Function] {
        &self.pending
    }

    fn resolver(&mut self) -> SignatureResolver<'_> {
        SignatureResolver::new(self.store)
    }

    /// Load every entry of `index` in order.
    pub fn load_index(&mut self, index: &dyn DocIndex) -> Result<(), ParserError> {
        for entry in index.entries() {
            let def = index.decode(entry)?;
            self.load_entry(entry, &def)?;
        }
        Ok(())
    }

    #[instrument(skip(self, def), fields(refid = %entry.refid, name = %entry.name), level = "debug")]
    pub fn load_entry(&mut self, entry: &IndexEntry, def: &CompoundDef) -> Result<(), ParserError> {
        self.stats.entries += 1;
        let kind = entry.compound_kind();
        match kind {
            CompoundKind::Struct | CompoundKind::Class | CompoundKind::Interface => {
                let base = base_node(entry, def, &entry.name);
                let t = StructType::new(base, kind == CompoundKind::Class);
                self.stats.structs += 1;
                self.load_object(entry, def, Box::new(t))
            }
            CompoundKind::Protocol => {
                let name = entry
                    .name
                    .strip_suffix(PROTOCOL_MARKER)
                    .unwrap_or(&entry.name);
                let t = ProtocolType::new(base_node(entry, def, name));
                self.stats.protocols += 1;
                self.load_object(entry, def, Box::new(t))
            }
            CompoundKind::Union => {
                let t = UnionType::new(base_node(entry, def, &entry.name));
                self.stats.unions += 1;
                self.load_object(entry, def, Box::new(t))
            }
            CompoundKind::File => self.load_file(entry, def),
            CompoundKind::Other => {
                trace!("ignoring {} entry {:?}", entry.kind, entry.name);
                self.stats.ignored += 1;
                Ok(())
            }
        }
    }

    fn load_object(
        &mut self,
        entry: &IndexEntry,
        def: &CompoundDef,
        mut object: Box<dyn TypeDefinition>,
    ) -> Result<(), ParserError> {
        debug!("loading {} {:?}", object.kind(), object.base().name);
        for section in &def.sections {
            match section.section_kind() {
                SectionKind::Attributes { prot, is_static } => {
                    require(object.as_mut(), Capability::Attributes, section)?;
                    for member in &section.members {
                        if member.kind != "variable" {
                            warn!(
                                "unexpected attribute kind {:?} for {:?}",
                                member.kind, member.name
                            );
                        }
                        let ty = self.member_type(member)?;
                        let (location, range) = location_of(member.location.as_ref());
                        let attr = Attribute {
                            name: member.name.clone(),
                            ty,
                            prot,
                            is_static,
                            location,
                            range,
                        };
                        if let Some(host) = object.attribute_host() {
                            host.add_attribute(attr);
                        }
                    }
                }
                SectionKind::Properties => {
                    require(object.as_mut(), Capability::Properties, section)?;
                    for member in &section.members {
                        if member.kind != "property" {
                            warn!(
                                "unexpected property kind {:?} for {:?}",
                                member.kind, member.name
                            );
                        }
                        let ty = self.member_type(member)?;
                        let (location, range) = location_of(member.location.as_ref());
                        let prop = Property {
                            name: member.name.clone(),
                            ty,
                            readable: member.readable,
                            writable: member.writable,
                            location,
                            range,
                        };
                        if let Some(host) = object.property_host() {
                            host.add_property(prop);
                        }
                    }
                }
                SectionKind::Functions { is_static } => {
                    require(object.as_mut(), Capability::Methods, section)?;
                    let owner: &mut dyn TypeDefinition = object.as_mut();
                    self.load_functions(Some(owner), &section.members, is_static)?;
                }
                SectionKind::Other => {
                    trace!("ignoring section {:?}", section.kind);
                }
            }
        }
        self.store.define(&entry.refid, object)?;
        Ok(())
    }

    fn load_file(&mut self, entry: &IndexEntry, def: &CompoundDef) -> Result<(), ParserError> {
        debug!("loading file {:?}", entry.name);
        self.store.add_file(base_node(entry, def, &entry.name))?;
        self.stats.files += 1;
        for section in &def.sections {
            match section.section_kind() {
                SectionKind::Functions { is_static } => {
                    self.load_functions(None, &section.members, is_static)?;
                }
                _ => trace!("ignoring file section {:?}", section.kind),
            }
        }
        Ok(())
    }

    fn load_functions(
        &mut self,
        mut owner: Option<&mut dyn TypeDefinition>,
        members: &[MemberDef],
        is_static: bool,
    ) -> Result<(), ParserError> {
        for member in members {
            if member.kind != "function" {
                warn!(
                    "skipping member {:?} of kind {:?} in a function section",
                    member.name, member.kind
                );
                continue;
            }
            let func = self.build_function(member, is_static || member.is_static)?;
            if func.is_free() {
                trace!("free function {:?}", func.name());
                self.stats.free_functions += 1;
                self.store.add_function(func);
                continue;
            }
            match owner.as_deref_mut() {
                Some(o) if o.base().name == func.receiver => {
                    if let Some(host) = o.method_host() {
                        if host.add_method(func) {
                            self.stats.methods += 1;
                        } else {
                            self.stats.duplicate_methods += 1;
                        }
                    }
                }
                _ => {
                    trace!("deferring {}::{}", func.receiver, func.name());
                    self.stats.deferred += 1;
                    self.pending.push(func);
                }
            }
        }
        Ok(())
    }

    fn build_function(&mut self, member: &MemberDef, is_static: bool) -> Result<Function, ParserError> {
        let (location, range) = location_of(member.location.as_ref());
        let base = BaseNode::new(member.id.clone(), member.name.clone())
            .with_protection(member.prot)
            .with_location(location)
            .with_range(range);
        let mut func = Function::new(base);
        func.receiver = receiver_name(&member.definition);
        func.is_static = is_static;

        let ret = self.resolver().resolve_linked(member.ty.as_ref());
        func.ty.ret = match self.recover(ret, member)? {
            Some(Type::Extern(inner)) => {
                func.is_extern = true;
                if *inner == Type::unknown("void") {
                    None
                } else {
                    Some(inner)
                }
            }
            other => other.map(Box::new),
        };

        for param in &member.params {
            let ty = self.resolver().resolve_linked(param.ty.as_ref());
            let ty = self
                .recover(ty, member)?
                .unwrap_or_else(|| Type::unknown("void"));
            let ty = if param.array.is_empty() {
                ty
            } else {
                Type::array(ty, array_size(&param.array))
            };
            func.ty.args.push(FuncArg {
                name: param.declname.clone(),
                ty,
            });
        }
        Ok(func)
    }

    fn member_type(&mut self, member: &MemberDef) -> Result<Type, ParserError> {
        let ty = self.resolver().resolve_member(member);
        Ok(self
            .recover(ty, member)?
            .unwrap_or_else(|| Type::unknown("void")))
    }

    /// A signature that does not parse degrades to an unknown type.
    fn recover(
        &mut self,
        resolved: Result<Option<Type>, ParserError>,
        member: &MemberDef,
    ) -> Result<Option<Type>, ParserError> {
        match resolved {
            Err(ParserError::MalformedSignature { signature, reason }) => {
                warn!(
                    "malformed signature {:?} on {:?}: {}",
                    signature, member.name, reason
                );
                self.stats.malformed += 1;
                Ok(Some(Type::unknown_with_comment(signature, "malformed")))
            }
            other => other,
        }
    }

    /// Attach deferred methods to their receivers and return the run totals.
    pub fn finish(mut self) -> LoadStats {
        for func in std::mem::take(&mut self.pending) {
            let Some(id) = self.store.find_by_name(&func.receiver) else {
                warn!(
                    "receiver {:?} of method {:?} was never defined",
                    func.receiver,
                    func.name()
                );
                self.stats.unattached += 1;
                continue;
            };
            let Some(host) = self.store.get_mut(id).and_then(|d| d.method_host()) else {
                warn!("{:?} cannot host method {:?}", func.receiver, func.name());
                self.stats.unattached += 1;
                continue;
            };
            if host.add_method(func) {
                self.stats.attached += 1;
            } else {
                self.stats.duplicate_methods += 1;
            }
        }
        let unresolved = self.store.unresolved().len();
        info!(
            "loaded {} entries: {} structs, {} protocols, {} unions, {} free functions, {} unresolved references",
            self.stats.entries,
            self.stats.structs,
            self.stats.protocols,
            self.stats.unions,
            self.stats.free_functions,
            unresolved
        );
        if self.stats.unattached > 0 {
            warn!("{} methods left without a receiver", self.stats.unattached);
        }
        self.stats
    }
}

fn base_node(entry: &IndexEntry, def: &CompoundDef, name: &str) -> BaseNode {
    let (location, range) = location_of(def.location.as_ref());
    BaseNode::new(entry.refid.clone(), name)
        .with_protection(def.prot)
        .with_location(location)
        .with_range(range)
}

fn require(
    object: &mut dyn TypeDefinition,
    capability: Capability,
    section: &SectionDef,
) -> Result<(), ParserError> {
    let supported = match capability {
        Capability::Attributes => object.attribute_host().is_some(),
        Capability::Properties => object.property_host().is_some(),
        Capability::Methods => object.method_host().is_some(),
    };
    if supported {
        return Ok(());
    }
    Err(ParserError::UnsupportedSection {
        entity: object.base().name.clone(),
        kind: object.kind(),
        capability,
        section: section.kind.clone(),
    })
}

/// Owner of a method from its qualified definition.
///
/// `(NSModalResponse) NSAlert::runModal` yields `NSAlert`; definitions
/// without `::` are free functions and yield an empty string.
pub fn receiver_name(definition: &str) -> String {
    let Some((qualifier, _)) = definition.split_once("::") else {
        return String::new();
    };
    let qualifier = qualifier.trim_end();
    let qualifier = qualifier.strip_suffix(PROTOCOL_MARKER).unwrap_or(qualifier);
    qualifier
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .to_string()
}

fn array_size(suffix: &str) -> &str {
    suffix
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
}
