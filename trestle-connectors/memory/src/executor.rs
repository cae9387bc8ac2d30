use trestle_connectors_base::common::{state, ObjectKind, SqlError};
use trestle_core::{
    data::DataValue,
    err::{Error, Result},
};
use trestle_logging::trace;

use crate::{
    database::{MemoryDatabase, MemoryTable, Relation},
    parser::{normalise_ident, ObjectName, Privilege, Statement},
};

const DEPENDENT_OBJECT: &str = "X0Y23";
const SCHEMA_NOT_EMPTY: &str = "X0Y54";
const NOT_UPDATABLE: &str = "42Y62";
const COLUMN_MISMATCH: &str = "42802";
const GRANT_NOT_ALLOWED: &str = "42Z60";

/// The outcome of a statement
#[derive(Debug, PartialEq, Clone)]
pub(crate) enum Outcome {
    Count(u64),
    Rows(Vec<Vec<DataValue>>),
}

fn sql_err(state: &str, message: impl Into<String>) -> Error {
    Error::new(SqlError::new(state, message))
}

/// Runs statements against a database on behalf of a user.
/// This only implements enough to exercise the harness.
pub(crate) struct MemoryQueryExecutor<'a> {
    db: &'a mut MemoryDatabase,
    user: String,
}

impl<'a> MemoryQueryExecutor<'a> {
    pub(crate) fn new(db: &'a mut MemoryDatabase, user: &str) -> Self {
        Self {
            db,
            user: normalise_ident(user),
        }
    }

    pub(crate) fn run(&mut self, stmt: Statement) -> Result<Outcome> {
        trace!("Executing {:?} as {}", stmt, self.user);

        match stmt {
            Statement::CreateSchema(schema) => self.create_schema(schema),
            Statement::CreateTable { name, columns } => self.create_table(name, columns),
            Statement::CreateView { name, source } => self.create_view(name, source),
            Statement::Drop { kind, name } => self.drop(kind, name),
            Statement::Insert { table, rows } => self.insert(table, rows),
            Statement::Delete { table } => self.delete(table),
            Statement::Select { source, count } => self.select(source, count),
            Statement::Values(row) => Ok(Outcome::Rows(vec![row])),
            Statement::Grant {
                privileges,
                object,
                grantees,
                revoke,
            } => self.grant(privileges, object, grantees, revoke),
        }
    }

    fn resolve(&self, name: &ObjectName) -> (String, String) {
        name.resolve(&self.user)
    }

    fn is_privileged(&self, schema: &str) -> bool {
        self.user == self.db.owner
            || self
                .db
                .schemas
                .get(schema)
                .map_or(false, |owner| *owner == self.user)
    }

    /// Checks the current user may modify objects in the supplied schema
    fn check_schema_access(&self, schema: &str) -> Result<()> {
        if !self.db.sql_authorization() || self.is_privileged(schema) || schema == self.user {
            return Ok(());
        }

        Err(sql_err(
            state::ACCESS_DENIED,
            format!(
                "User '{}' can not create objects in schema '{}'",
                self.user, schema
            ),
        ))
    }

    fn check_privilege(&self, schema: &str, name: &str, privilege: Privilege) -> Result<()> {
        if !self.db.sql_authorization() || self.is_privileged(schema) {
            return Ok(());
        }

        let granted = [self.user.as_str(), "PUBLIC"].iter().any(|grantee| {
            self.db.grants.contains(&(
                schema.to_string(),
                name.to_string(),
                privilege,
                grantee.to_string(),
            ))
        });

        if granted {
            return Ok(());
        }

        Err(sql_err(
            state::ACCESS_DENIED,
            format!(
                "User '{}' does not have {:?} permission on table '{}'.'{}'",
                self.user, privilege, schema, name
            ),
        ))
    }

    fn ensure_schema(&mut self, schema: &str) -> Result<()> {
        if !self.db.schemas.contains_key(schema) {
            self.check_schema_access(schema)?;
            self.db
                .schemas
                .insert(schema.to_string(), self.user.clone());
        }

        Ok(())
    }

    fn create_schema(&mut self, schema: String) -> Result<Outcome> {
        if self.db.schemas.contains_key(&schema) {
            return Err(sql_err(
                state::SCHEMA_EXISTS,
                format!("Schema '{}' already exists", schema),
            ));
        }

        self.check_schema_access(&schema)?;
        self.db.schemas.insert(schema, self.user.clone());
        Ok(Outcome::Count(0))
    }

    fn check_not_exists(&self, key: &(String, String), kind: ObjectKind) -> Result<()> {
        if self.db.relations.contains_key(key) {
            return Err(sql_err(
                state::OBJECT_EXISTS,
                format!(
                    "{} '{}' already exists in Schema '{}'",
                    kind.keyword(),
                    key.1,
                    key.0
                ),
            ));
        }

        Ok(())
    }

    fn not_found(&self, key: &(String, String)) -> Error {
        sql_err(
            state::OBJECT_NOT_FOUND,
            format!("Object '{}.{}' does not exist", key.0, key.1),
        )
    }

    fn create_table(&mut self, name: ObjectName, columns: Vec<String>) -> Result<Outcome> {
        let key = self.resolve(&name);
        self.check_not_exists(&key, ObjectKind::Table)?;
        self.ensure_schema(&key.0)?;
        self.check_schema_access(&key.0)?;

        self.db.relations.insert(
            key,
            Relation::Table(MemoryTable {
                columns,
                rows: vec![],
            }),
        );
        Ok(Outcome::Count(0))
    }

    fn create_view(&mut self, name: ObjectName, source: ObjectName) -> Result<Outcome> {
        let key = self.resolve(&name);
        let source = self.resolve(&source);
        self.check_not_exists(&key, ObjectKind::View)?;

        if !self.db.relations.contains_key(&source) {
            return Err(self.not_found(&source));
        }
        self.check_privilege(&source.0, &source.1, Privilege::Select)?;
        self.ensure_schema(&key.0)?;
        self.check_schema_access(&key.0)?;

        self.db.relations.insert(key, Relation::View { source });
        Ok(Outcome::Count(0))
    }

    fn drop(&mut self, kind: ObjectKind, name: ObjectName) -> Result<Outcome> {
        if kind == ObjectKind::Schema {
            return self.drop_schema(name.name);
        }

        let key = self.resolve(&name);
        match self.db.relations.get(&key) {
            Some(rel) if rel.kind() == kind => {}
            _ => return Err(self.not_found(&key)),
        }
        self.check_schema_access(&key.0)?;

        let dependent = self.db.relations.iter().find(|(_, rel)| match rel {
            Relation::View { source } => *source == key,
            _ => false,
        });
        if let Some(((schema, view), _)) = dependent {
            return Err(sql_err(
                DEPENDENT_OBJECT,
                format!(
                    "Operation 'DROP {}' cannot be performed on object '{}' because VIEW '{}.{}' is dependent on that object",
                    kind.keyword(),
                    key.1,
                    schema,
                    view
                ),
            ));
        }

        self.db.relations.remove(&key);
        self.db.grants.retain(|(s, n, _, _)| !(*s == key.0 && *n == key.1));
        Ok(Outcome::Count(0))
    }

    fn drop_schema(&mut self, schema: String) -> Result<Outcome> {
        if !self.db.schemas.contains_key(&schema) {
            return Err(sql_err(
                state::SCHEMA_NOT_FOUND,
                format!("Schema '{}' does not exist", schema),
            ));
        }
        self.check_schema_access(&schema)?;

        if self.db.relations.keys().any(|(s, _)| *s == schema) {
            return Err(sql_err(
                SCHEMA_NOT_EMPTY,
                format!("Schema '{}' is not empty", schema),
            ));
        }

        self.db.schemas.remove(&schema);
        Ok(Outcome::Count(0))
    }

    fn table_mut(&mut self, key: &(String, String)) -> Result<&mut MemoryTable> {
        match self.db.relations.get_mut(key) {
            Some(Relation::Table(table)) => Ok(table),
            Some(Relation::View { .. }) => Err(sql_err(
                NOT_UPDATABLE,
                format!("'{}.{}' is not an updatable view", key.0, key.1),
            )),
            None => Err(sql_err(
                state::OBJECT_NOT_FOUND,
                format!("Table/View '{}.{}' does not exist", key.0, key.1),
            )),
        }
    }

    fn insert(&mut self, table: ObjectName, rows: Vec<Vec<DataValue>>) -> Result<Outcome> {
        let key = self.resolve(&table);
        self.table_mut(&key)?;
        self.check_privilege(&key.0, &key.1, Privilege::Insert)?;

        let table = self.table_mut(&key)?;
        if let Some(row) = rows.iter().find(|r| r.len() != table.columns.len()) {
            return Err(sql_err(
                COLUMN_MISMATCH,
                format!(
                    "The number of values assigned ({}) is not the same as the number of specified or implied columns ({})",
                    row.len(),
                    table.columns.len()
                ),
            ));
        }

        let count = rows.len() as u64;
        table.rows.extend(rows);
        Ok(Outcome::Count(count))
    }

    fn delete(&mut self, table: ObjectName) -> Result<Outcome> {
        let key = self.resolve(&table);
        self.table_mut(&key)?;
        self.check_privilege(&key.0, &key.1, Privilege::Delete)?;

        let table = self.table_mut(&key)?;
        let count = table.rows.len() as u64;
        table.rows.clear();
        Ok(Outcome::Count(count))
    }

    fn select(&mut self, source: ObjectName, count: bool) -> Result<Outcome> {
        let mut key = self.resolve(&source);
        self.check_privilege(&key.0, &key.1, Privilege::Select)?;

        // views read with the rights of their definer
        let rows = loop {
            match self.db.relations.get(&key) {
                Some(Relation::Table(table)) => break table.rows.clone(),
                Some(Relation::View { source }) => key = source.clone(),
                None => {
                    return Err(sql_err(
                        state::OBJECT_NOT_FOUND,
                        format!("Table/View '{}.{}' does not exist", key.0, key.1),
                    ))
                }
            }
        };

        Ok(Outcome::Rows(if count {
            vec![vec![DataValue::Int64(rows.len() as i64)]]
        } else {
            rows
        }))
    }

    fn grant(
        &mut self,
        privileges: Vec<Privilege>,
        object: ObjectName,
        grantees: Vec<String>,
        revoke: bool,
    ) -> Result<Outcome> {
        if !self.db.sql_authorization() {
            return Err(sql_err(
                GRANT_NOT_ALLOWED,
                "GRANT and REVOKE are only allowed when sql authorization is enabled",
            ));
        }

        let key = self.resolve(&object);
        if !self.db.relations.contains_key(&key) {
            return Err(self.not_found(&key));
        }
        if !self.is_privileged(&key.0) {
            return Err(sql_err(
                state::ACCESS_DENIED,
                format!(
                    "User '{}' is not the owner of '{}.{}'",
                    self.user, key.0, key.1
                ),
            ));
        }

        for privilege in privileges {
            for grantee in grantees.iter() {
                let grant = (key.0.clone(), key.1.clone(), privilege, grantee.clone());
                if revoke {
                    self.db.grants.remove(&grant);
                } else {
                    self.db.grants.insert(grant);
                }
            }
        }

        Ok(Outcome::Count(0))
    }
}
