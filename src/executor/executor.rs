//! DDL executor for ShaleDB
//!
//! Translates parsed statements into coordinated catalog and storage
//! mutations and reports their effect as a `QueryResult`. There are no
//! transactions; multi-step statements undo their own catalog writes with
//! compensating deletes on the failure path.

use crate::catalog::schema::COLUMNS_TABLE;
use crate::catalog::{Catalog, DataType};
use crate::error::{DbRelationError, Result, SqlExecError};
use crate::sql::ast::{
    ColumnDef, ColumnType, CreateIndexStatement, CreateStatement, CreateTableStatement,
    DropIndexStatement, DropStatement, DropTableStatement, ShowStatement, Statement,
};
use crate::storage::{Row, SlotId};

/// Tabular response of one statement: optional headers and rows, plus a
/// status message. Owns its contents.
#[derive(Debug)]
pub struct QueryResult {
    /// Column headers, in projection order
    pub column_names: Option<Vec<String>>,
    /// One attribute per header
    pub column_attributes: Option<Vec<DataType>>,
    /// Result rows
    pub rows: Option<Vec<Row>>,
    /// Status message
    pub message: String,
}

impl QueryResult {
    /// Create a result carrying only a message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            column_names: None,
            column_attributes: None,
            rows: None,
            message: message.into(),
        }
    }

    /// Create a tabular result.
    pub fn with_rows(
        column_names: Vec<String>,
        column_attributes: Vec<DataType>,
        rows: Vec<Row>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            column_names: Some(column_names),
            column_attributes: Some(column_attributes),
            rows: Some(rows),
            message: message.into(),
        }
    }
}

/// Best-effort compensation: a failed undo must not mask the original
/// error, so it is logged and swallowed.
fn rollback(result: std::result::Result<(), DbRelationError>, target: &str) {
    if let Err(e) = result {
        log::warn!("rollback delete on {} failed: {}", target, e);
    }
}

/// Executes DDL statements against a catalog.
pub struct ExecutionEngine {
    catalog: Catalog,
}

impl ExecutionEngine {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Borrow the underlying catalog.
    pub fn catalog(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Execute one statement. Unsupported kinds are answered, not errors;
    /// storage failures surface as `SqlExecError::Relation`.
    pub fn execute(&mut self, statement: &Statement) -> Result<QueryResult> {
        match statement {
            Statement::Create(create) => match create {
                CreateStatement::Table(stmt) => self.create_table(stmt),
                CreateStatement::Index(stmt) => self.create_index(stmt),
                CreateStatement::View(_) => Ok(QueryResult::with_message(
                    "Only CREATE TABLE and CREATE INDEX are implemented",
                )),
            },
            Statement::Drop(drop) => match drop {
                DropStatement::Table(stmt) => self.drop_table(stmt),
                DropStatement::Index(stmt) => self.drop_index(stmt),
                DropStatement::View(_) => Ok(QueryResult::with_message(
                    "Only DROP TABLE and CREATE INDEX are implemented",
                )),
            },
            Statement::Show(show) => match show {
                ShowStatement::Tables => self.show_tables(),
                ShowStatement::Columns { table_name } => self.show_columns(table_name),
                ShowStatement::Index { table_name } => self.show_index(table_name),
            },
            Statement::Select(_) | Statement::Insert(_) => {
                Ok(QueryResult::with_message("not implemented"))
            }
        }
    }

    fn create_table(&mut self, stmt: &CreateTableStatement) -> Result<QueryResult> {
        let (column_names, column_attributes) = column_definitions(&stmt.columns)?;

        let mut row = Row::new();
        row.set("table_name", stmt.table_name.as_str());
        let table_handle = self.catalog.tables.insert(&row)?;

        match self.register_columns_and_create(stmt, &column_names, &column_attributes) {
            Ok(()) => Ok(QueryResult::with_message(format!(
                "created {}",
                stmt.table_name
            ))),
            Err(e) => {
                rollback(self.catalog.tables.del(table_handle), "_tables");
                self.catalog.tables.release(&stmt.table_name);
                Err(e)
            }
        }
    }

    /// Record the column list in `_columns`, then create the physical
    /// relation. Undoes its own `_columns` writes on failure; the
    /// `_tables` row belongs to the caller.
    fn register_columns_and_create(
        &mut self,
        stmt: &CreateTableStatement,
        column_names: &[String],
        column_attributes: &[DataType],
    ) -> Result<()> {
        let mut column_handles = Vec::with_capacity(column_names.len());
        match self
            .insert_column_rows(stmt, column_names, column_attributes, &mut column_handles)
            .and_then(|()| self.create_relation(stmt))
        {
            Ok(()) => Ok(()),
            Err(e) => {
                match self.catalog.tables.get_table(COLUMNS_TABLE) {
                    Ok(columns) => {
                        for handle in column_handles {
                            rollback(columns.del(handle), "_columns");
                        }
                    }
                    Err(open_err) => {
                        log::warn!("rollback could not reopen _columns: {}", open_err)
                    }
                }
                Err(e)
            }
        }
    }

    fn insert_column_rows(
        &mut self,
        stmt: &CreateTableStatement,
        column_names: &[String],
        column_attributes: &[DataType],
        column_handles: &mut Vec<SlotId>,
    ) -> Result<()> {
        let columns = self.catalog.tables.get_table(COLUMNS_TABLE)?;
        for (name, data_type) in column_names.iter().zip(column_attributes) {
            let mut row = Row::new();
            row.set("table_name", stmt.table_name.as_str());
            row.set("column_name", name.as_str());
            row.set("data_type", data_type.to_string());
            column_handles.push(columns.insert(&row)?);
        }
        Ok(())
    }

    fn create_relation(&mut self, stmt: &CreateTableStatement) -> Result<()> {
        let table = self.catalog.tables.get_table(&stmt.table_name)?;
        if stmt.if_not_exists {
            table.create_if_not_exists()?;
        } else {
            table.create()?;
        }
        Ok(())
    }

    fn create_index(&mut self, stmt: &CreateIndexStatement) -> Result<QueryResult> {
        let table_name = &stmt.table_name;
        let index_name = &stmt.index_name;

        // the target table must exist before any catalog write
        self.catalog.tables.get_table(table_name)?;

        // validate the referenced columns up front so a failure leaves no
        // trace in the catalog
        for column_name in &stmt.columns {
            let mut filter = Row::new();
            filter.set("table_name", table_name.as_str());
            filter.set("column_name", column_name.as_str());
            let columns = self.catalog.tables.get_table(COLUMNS_TABLE)?;
            if columns.select(Some(&filter))?.is_empty() {
                return Err(SqlExecError::Exec(format!(
                    "Error: there is no {} column in {} table",
                    column_name, table_name
                )));
            }
        }

        let mut index_handles = Vec::with_capacity(stmt.columns.len());
        match self.register_index_and_build(stmt, &mut index_handles) {
            Ok(()) => Ok(QueryResult::with_message(format!(
                "create index {}",
                index_name
            ))),
            Err(e) => {
                for handle in index_handles {
                    rollback(self.catalog.indices.del(handle), "_indices");
                }
                self.catalog.indices.release(table_name, index_name);
                Err(e)
            }
        }
    }

    /// Record one `_indices` row per key column, then create the physical
    /// index and fill it from the table's existing rows.
    fn register_index_and_build(
        &mut self,
        stmt: &CreateIndexStatement,
        index_handles: &mut Vec<SlotId>,
    ) -> Result<()> {
        for (i, column_name) in stmt.columns.iter().enumerate() {
            let mut row = Row::new();
            row.set("table_name", stmt.table_name.as_str());
            row.set("index_name", stmt.index_name.as_str());
            row.set("column_name", column_name.as_str());
            row.set("seq_in_index", i as i32 + 1);
            row.set("index_type", stmt.index_type.as_str());
            row.set("is_unique", stmt.index_type == "BTREE");
            index_handles.push(self.catalog.indices.insert(&row)?);
        }

        let index = self
            .catalog
            .indices
            .get_index(&stmt.table_name, &stmt.index_name)?;
        index.create()?;
        let table = self.catalog.tables.get_table(&stmt.table_name)?;
        if let Err(e) = index.build_from(table) {
            rollback(index.drop(), "physical index");
            return Err(e.into());
        }
        Ok(())
    }

    fn drop_table(&mut self, stmt: &DropTableStatement) -> Result<QueryResult> {
        let table_name = &stmt.table_name;
        if Catalog::is_schema_table(table_name) {
            return Err(SqlExecError::Exec("cannot drop a schema table".to_string()));
        }

        // confirm the relation exists before touching any catalog rows
        self.catalog.tables.get_table(table_name)?;

        for index_name in self.catalog.indices.get_index_names(table_name)? {
            self.drop_index_entries(table_name, &index_name)?;
        }

        let mut filter = Row::new();
        filter.set("table_name", table_name.as_str());

        let columns = self.catalog.tables.get_table(COLUMNS_TABLE)?;
        for handle in columns.select(Some(&filter))? {
            columns.del(handle)?;
        }

        let table = self.catalog.tables.get_table(table_name)?;
        table.drop()?;
        self.catalog.tables.release(table_name);

        for handle in self.catalog.tables.select(Some(&filter))? {
            self.catalog.tables.del(handle)?;
        }

        Ok(QueryResult::with_message(format!("dropped {}", table_name)))
    }

    fn drop_index(&mut self, stmt: &DropIndexStatement) -> Result<QueryResult> {
        self.drop_index_entries(&stmt.table_name, &stmt.index_name)?;
        Ok(QueryResult::with_message(format!(
            "drop index {}",
            stmt.index_name
        )))
    }

    /// Delete the `_indices` rows of one index, then drop its physical
    /// structure. The index is opened first, while its rows still exist.
    fn drop_index_entries(&mut self, table_name: &str, index_name: &str) -> Result<()> {
        self.catalog.indices.get_index(table_name, index_name)?;

        let mut filter = Row::new();
        filter.set("table_name", table_name);
        filter.set("index_name", index_name);
        for handle in self.catalog.indices.select(Some(&filter))? {
            self.catalog.indices.del(handle)?;
        }

        let index = self.catalog.indices.get_index(table_name, index_name)?;
        index.drop()?;
        self.catalog.indices.release(table_name, index_name);
        Ok(())
    }

    fn show_tables(&mut self) -> Result<QueryResult> {
        let column_names = vec!["table_name".to_string()];
        let column_attributes = vec![DataType::Text];

        let handles = self.catalog.tables.select(None)?;
        // the three schema relations are always present and never shown
        let n = handles.len() - 3;

        let mut rows = Vec::new();
        for handle in handles {
            let row = self.catalog.tables.project(handle, &column_names)?;
            let system = Catalog::is_schema_table(row.get("table_name")?.as_text()?);
            if !system {
                rows.push(row);
            }
        }
        Ok(QueryResult::with_rows(
            column_names,
            column_attributes,
            rows,
            format!("successfully returned {} rows", n),
        ))
    }

    fn show_columns(&mut self, table_name: &str) -> Result<QueryResult> {
        let column_names = vec![
            "table_name".to_string(),
            "column_name".to_string(),
            "data_type".to_string(),
        ];
        let column_attributes = vec![DataType::Text, DataType::Text, DataType::Text];

        let mut filter = Row::new();
        filter.set("table_name", table_name);

        let columns = self.catalog.tables.get_table(COLUMNS_TABLE)?;
        let handles = columns.select(Some(&filter))?;
        let n = handles.len();

        let mut rows = Vec::with_capacity(n);
        for handle in handles {
            rows.push(columns.project(handle, &column_names)?);
        }
        Ok(QueryResult::with_rows(
            column_names,
            column_attributes,
            rows,
            format!("successfully returned {} rows", n),
        ))
    }

    fn show_index(&mut self, table_name: &str) -> Result<QueryResult> {
        let column_names = vec![
            "table_name".to_string(),
            "index_name".to_string(),
            "column_name".to_string(),
            "seq_in_index".to_string(),
            "index_type".to_string(),
            "is_unique".to_string(),
        ];
        let column_attributes = vec![
            DataType::Text,
            DataType::Text,
            DataType::Text,
            DataType::Int,
            DataType::Text,
            DataType::Boolean,
        ];

        let mut filter = Row::new();
        filter.set("table_name", table_name);

        let handles = self.catalog.indices.select(Some(&filter))?;
        let n = handles.len();

        let mut rows = Vec::with_capacity(n);
        for handle in handles {
            rows.push(self.catalog.indices.project(handle, &column_names)?);
        }
        Ok(QueryResult::with_rows(
            column_names,
            column_attributes,
            rows,
            format!("successfully returned {} rows", n),
        ))
    }
}

/// Split parsed column definitions into names and storable attributes.
fn column_definitions(columns: &[ColumnDef]) -> Result<(Vec<String>, Vec<DataType>)> {
    let mut names = Vec::with_capacity(columns.len());
    let mut attributes = Vec::with_capacity(columns.len());
    for column in columns {
        let data_type = match column.data_type {
            ColumnType::Int => DataType::Int,
            ColumnType::Text => DataType::Text,
            ColumnType::Double => {
                return Err(SqlExecError::Exec(
                    "unrecognized data type (column_definition)".to_string(),
                ))
            }
        };
        names.push(column.name.clone());
        attributes.push(data_type);
    }
    Ok((names, attributes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::ast::SelectStatement;
    use tempfile::TempDir;

    fn engine(dir: &TempDir) -> ExecutionEngine {
        ExecutionEngine::new(Catalog::open(dir.path()).unwrap())
    }

    #[test]
    fn test_unsupported_statements_are_answered() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);

        let select = Statement::Select(SelectStatement {
            table_name: "foo".to_string(),
            columns: vec![],
        });
        assert_eq!(engine.execute(&select).unwrap().message, "not implemented");
    }

    #[test]
    fn test_column_definitions_rejects_double() {
        let columns = vec![ColumnDef {
            name: "c".to_string(),
            data_type: ColumnType::Double,
        }];
        let err = column_definitions(&columns).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unrecognized data type (column_definition)"
        );
    }

    #[test]
    fn test_create_index_on_missing_table_is_wrapped() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);

        let stmt = CreateIndexStatement {
            table_name: "ghost".to_string(),
            index_name: "gx".to_string(),
            columns: vec!["id".to_string()],
            index_type: "BTREE".to_string(),
        };
        let err = engine
            .execute(&Statement::Create(CreateStatement::Index(stmt)))
            .unwrap_err();
        assert!(err.to_string().starts_with("DbRelationError: "));
    }
}
