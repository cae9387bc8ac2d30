use std::fmt::{self, Display};

/// Kinds of objects users can create
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    View,
    Table,
    Schema,
}

impl ObjectKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ObjectKind::View => "VIEW",
            ObjectKind::Table => "TABLE",
            ObjectKind::Schema => "SCHEMA",
        }
    }
}

/// A user created object in a database
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct SchemaObject {
    pub kind: ObjectKind,
    pub schema: String,
    pub name: String,
}

impl SchemaObject {
    pub fn new(kind: ObjectKind, schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// The statement which removes this object
    pub fn drop_statement(&self) -> String {
        match self.kind {
            ObjectKind::Schema => format!("DROP SCHEMA {} RESTRICT", self.name),
            kind => format!("DROP {} {}", kind.keyword(), self),
        }
    }
}

impl Display for SchemaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ObjectKind::Schema => write!(f, "{}", self.name),
            _ => write!(f, "{}.{}", self.schema, self.name),
        }
    }
}
