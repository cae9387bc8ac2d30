use std::collections::{BTreeMap, BTreeSet};

use trestle_connectors_base::common::{
    property::{
        user_property, AUTHENTICATION_PROVIDER, REQUIRE_AUTHENTICATION, SQL_AUTHORIZATION,
    },
    ObjectKind, SchemaObject,
};
use trestle_core::data::DataValue;

use crate::parser::Privilege;

/// The schema every database starts with
pub const DEFAULT_SCHEMA: &str = "APP";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<DataValue>>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Relation {
    Table(MemoryTable),
    View { source: (String, String) },
}

impl Relation {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Relation::Table(_) => ObjectKind::Table,
            Relation::View { .. } => ObjectKind::View,
        }
    }
}

/// The contents of a single in-memory database
#[derive(Debug, Clone)]
pub struct MemoryDatabase {
    /// The user which created the database
    pub(crate) owner: String,
    /// Incremented on every boot, connections from earlier boots are stale
    pub(crate) generation: u64,
    pub(crate) booted: bool,
    pub(crate) properties: BTreeMap<String, String>,
    /// Schema name to owner
    pub(crate) schemas: BTreeMap<String, String>,
    pub(crate) relations: BTreeMap<(String, String), Relation>,
    /// (schema, object, privilege, grantee)
    pub(crate) grants: BTreeSet<(String, String, Privilege, String)>,
}

impl MemoryDatabase {
    pub(crate) fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_uppercase(),
            generation: 1,
            booted: true,
            properties: BTreeMap::new(),
            schemas: [(DEFAULT_SCHEMA.to_string(), DEFAULT_SCHEMA.to_string())]
                .into_iter()
                .collect(),
            relations: BTreeMap::new(),
            grants: BTreeSet::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(|s| s.as_str())
    }

    pub fn table(&self, schema: &str, name: &str) -> Option<&MemoryTable> {
        match self.relations.get(&(schema.to_string(), name.to_string())) {
            Some(Relation::Table(table)) => Some(table),
            _ => None,
        }
    }

    pub(crate) fn boot(&mut self) {
        if !self.booted {
            self.booted = true;
            self.generation += 1;
        }
    }

    pub(crate) fn shutdown(&mut self) {
        self.booted = false;
    }

    pub(crate) fn flag(&self, key: &str) -> bool {
        self.property(key)
            .map_or(false, |v| v.eq_ignore_ascii_case("true"))
    }

    pub(crate) fn sql_authorization(&self) -> bool {
        self.flag(SQL_AUTHORIZATION)
    }

    /// Checks the supplied credentials against the builtin users.
    /// Always succeeds when authentication is not required.
    pub(crate) fn authenticate(&self, user: &str, password: &str) -> bool {
        if !self.flag(REQUIRE_AUTHENTICATION) {
            return true;
        }

        let builtin = self
            .property(AUTHENTICATION_PROVIDER)
            .map_or(true, |p| p.eq_ignore_ascii_case("BUILTIN"));
        if !builtin {
            return false;
        }

        [user.to_string(), user.to_uppercase()]
            .iter()
            .filter_map(|u| self.property(&user_property(u)))
            .any(|p| p == password)
    }

    /// Objects created by users, in the order they can be dropped
    pub(crate) fn user_objects(&self) -> Vec<SchemaObject> {
        let mut objects = self
            .relations
            .iter()
            .map(|((schema, name), rel)| SchemaObject::new(rel.kind(), schema, name))
            .chain(
                self.schemas
                    .keys()
                    .filter(|s| s.as_str() != DEFAULT_SCHEMA)
                    .map(|s| SchemaObject::new(ObjectKind::Schema, s, s)),
            )
            .collect::<Vec<_>>();

        objects.sort_by(|a, b| (a.kind, &a.schema, &a.name).cmp(&(b.kind, &b.schema, &b.name)));
        objects
    }
}
