//! End-to-end DDL scenarios against a temporary database directory.

use shaledb::catalog::Catalog;
use shaledb::executor::{ExecutionEngine, QueryResult};
use shaledb::sql::ast::{
    ColumnDef, ColumnType, CreateIndexStatement, CreateStatement, CreateTableStatement,
    CreateViewStatement, DropIndexStatement, DropStatement, DropTableStatement,
    DropViewStatement, SelectStatement, ShowStatement, Statement,
};
use tempfile::TempDir;

fn engine(dir: &TempDir) -> ExecutionEngine {
    ExecutionEngine::new(Catalog::open(dir.path()).unwrap())
}

fn create_table(name: &str, columns: &[(&str, ColumnType)]) -> Statement {
    Statement::Create(CreateStatement::Table(CreateTableStatement {
        table_name: name.to_string(),
        columns: columns
            .iter()
            .map(|(column, data_type)| ColumnDef {
                name: column.to_string(),
                data_type: *data_type,
            })
            .collect(),
        if_not_exists: false,
    }))
}

fn create_foo() -> Statement {
    create_table("foo", &[("id", ColumnType::Int), ("data", ColumnType::Text)])
}

fn create_index(table: &str, index: &str, columns: &[&str]) -> Statement {
    Statement::Create(CreateStatement::Index(CreateIndexStatement {
        table_name: table.to_string(),
        index_name: index.to_string(),
        columns: columns.iter().map(|c| c.to_string()).collect(),
        index_type: "BTREE".to_string(),
    }))
}

fn drop_table(name: &str) -> Statement {
    Statement::Drop(DropStatement::Table(DropTableStatement {
        table_name: name.to_string(),
    }))
}

fn drop_index(table: &str, index: &str) -> Statement {
    Statement::Drop(DropStatement::Index(DropIndexStatement {
        table_name: table.to_string(),
        index_name: index.to_string(),
    }))
}

fn show_tables(engine: &mut ExecutionEngine) -> QueryResult {
    engine.execute(&Statement::Show(ShowStatement::Tables)).unwrap()
}

fn show_columns(engine: &mut ExecutionEngine, table: &str) -> QueryResult {
    engine
        .execute(&Statement::Show(ShowStatement::Columns {
            table_name: table.to_string(),
        }))
        .unwrap()
}

fn show_index(engine: &mut ExecutionEngine, table: &str) -> QueryResult {
    engine
        .execute(&Statement::Show(ShowStatement::Index {
            table_name: table.to_string(),
        }))
        .unwrap()
}

#[test]
fn create_table_lists_it_and_hides_system_tables() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);

    let result = engine.execute(&create_foo()).unwrap();
    assert_eq!(result.message, "created foo");

    let result = show_tables(&mut engine);
    assert_eq!(result.message, "successfully returned 1 rows");
    let rows = result.rows.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("table_name").unwrap().as_text().unwrap(), "foo");
}

#[test]
fn show_columns_preserves_declared_order() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);
    engine.execute(&create_foo()).unwrap();

    let result = show_columns(&mut engine, "foo");
    assert_eq!(result.message, "successfully returned 2 rows");
    assert_eq!(
        result.column_names.as_deref().unwrap(),
        ["table_name", "column_name", "data_type"]
    );

    let rows = result.rows.unwrap();
    let columns: Vec<(&str, &str)> = rows
        .iter()
        .map(|row| {
            (
                row.get("column_name").unwrap().as_text().unwrap(),
                row.get("data_type").unwrap().as_text().unwrap(),
            )
        })
        .collect();
    assert_eq!(columns, [("id", "INT"), ("data", "TEXT")]);
}

#[test]
fn create_index_records_catalog_rows() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);
    engine.execute(&create_foo()).unwrap();

    let result = engine.execute(&create_index("foo", "fx", &["data"])).unwrap();
    assert_eq!(result.message, "create index fx");

    let result = show_index(&mut engine, "foo");
    assert_eq!(result.message, "successfully returned 1 rows");
    let rows = result.rows.unwrap();
    let row = &rows[0];
    assert_eq!(row.get("table_name").unwrap().as_text().unwrap(), "foo");
    assert_eq!(row.get("index_name").unwrap().as_text().unwrap(), "fx");
    assert_eq!(row.get("column_name").unwrap().as_text().unwrap(), "data");
    assert_eq!(row.get("seq_in_index").unwrap().as_int().unwrap(), 1);
    assert_eq!(row.get("index_type").unwrap().as_text().unwrap(), "BTREE");
    assert!(row.get("is_unique").unwrap().as_bool().unwrap());
}

#[test]
fn create_index_numbers_columns_in_declared_order() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);
    engine.execute(&create_foo()).unwrap();

    engine
        .execute(&create_index("foo", "fx", &["data", "id"]))
        .unwrap();

    let result = show_index(&mut engine, "foo");
    let rows = result.rows.unwrap();
    assert_eq!(rows.len(), 2);
    let sequenced: Vec<(i32, &str)> = rows
        .iter()
        .map(|row| {
            (
                row.get("seq_in_index").unwrap().as_int().unwrap(),
                row.get("column_name").unwrap().as_text().unwrap(),
            )
        })
        .collect();
    assert_eq!(sequenced, [(1, "data"), (2, "id")]);
}

#[test]
fn create_index_on_missing_column_leaves_no_trace() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);
    engine.execute(&create_foo()).unwrap();

    let err = engine
        .execute(&create_index("foo", "bad", &["missing"]))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Error: there is no missing column in foo table"
    );

    let result = show_index(&mut engine, "foo");
    assert_eq!(result.message, "successfully returned 0 rows");
    assert!(result.rows.unwrap().is_empty());
}

#[test]
fn drop_index_removes_rows_and_physical_file() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);
    engine.execute(&create_foo()).unwrap();
    engine.execute(&create_index("foo", "fx", &["data"])).unwrap();
    assert!(dir.path().join("foo-fx.idx").exists());

    let result = engine.execute(&drop_index("foo", "fx")).unwrap();
    assert_eq!(result.message, "drop index fx");
    assert!(!dir.path().join("foo-fx.idx").exists());

    let result = show_index(&mut engine, "foo");
    assert_eq!(result.message, "successfully returned 0 rows");
}

#[test]
fn drop_table_scrubs_every_catalog_relation() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);
    engine.execute(&create_foo()).unwrap();
    engine.execute(&create_index("foo", "fx", &["data"])).unwrap();

    let result = engine.execute(&drop_table("foo")).unwrap();
    assert_eq!(result.message, "dropped foo");

    assert_eq!(show_tables(&mut engine).rows.unwrap().len(), 0);
    assert_eq!(show_columns(&mut engine, "foo").rows.unwrap().len(), 0);
    assert_eq!(show_index(&mut engine, "foo").rows.unwrap().len(), 0);
    assert!(!dir.path().join("foo.tbl").exists());
    assert!(!dir.path().join("foo-fx.idx").exists());
}

#[test]
fn schema_tables_cannot_be_dropped() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);
    engine.execute(&create_foo()).unwrap();

    for name in ["_tables", "_columns", "_indices"] {
        let err = engine.execute(&drop_table(name)).unwrap_err();
        assert_eq!(err.to_string(), "cannot drop a schema table");
    }

    // catalog untouched
    assert_eq!(show_tables(&mut engine).rows.unwrap().len(), 1);
    assert_eq!(show_columns(&mut engine, "foo").rows.unwrap().len(), 2);
}

#[test]
fn unsupported_column_type_fails_before_any_catalog_write() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);

    let err = engine
        .execute(&create_table("qux", &[("c", ColumnType::Double)]))
        .unwrap_err();
    assert_eq!(err.to_string(), "unrecognized data type (column_definition)");

    let result = show_tables(&mut engine);
    assert_eq!(result.message, "successfully returned 0 rows");
}

#[test]
fn failed_create_table_rolls_back_catalog_rows() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);
    engine.execute(&create_foo()).unwrap();

    // the physical relation already exists, so the second create fails
    // after its catalog writes and must compensate
    let err = engine.execute(&create_foo()).unwrap_err();
    assert!(err.to_string().starts_with("DbRelationError: "));

    assert_eq!(show_tables(&mut engine).rows.unwrap().len(), 1);
    assert_eq!(show_columns(&mut engine, "foo").rows.unwrap().len(), 2);
}

#[test]
fn failed_create_index_rolls_back_catalog_rows() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);
    engine.execute(&create_foo()).unwrap();
    engine.execute(&create_index("foo", "fx", &["data"])).unwrap();

    let err = engine
        .execute(&create_index("foo", "fx", &["data"]))
        .unwrap_err();
    assert!(err.to_string().starts_with("DbRelationError: "));

    // only the first index's row survives
    assert_eq!(show_index(&mut engine, "foo").rows.unwrap().len(), 1);
}

#[test]
fn create_if_not_exists_accepts_existing_relation() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);
    engine.execute(&create_foo()).unwrap();

    let again = Statement::Create(CreateStatement::Table(CreateTableStatement {
        table_name: "foo".to_string(),
        columns: vec![
            ColumnDef {
                name: "id".to_string(),
                data_type: ColumnType::Int,
            },
            ColumnDef {
                name: "data".to_string(),
                data_type: ColumnType::Text,
            },
        ],
        if_not_exists: true,
    }));
    let result = engine.execute(&again).unwrap();
    assert_eq!(result.message, "created foo");
}

#[test]
fn table_can_be_recreated_after_drop() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);

    engine.execute(&create_foo()).unwrap();
    engine.execute(&drop_table("foo")).unwrap();
    engine
        .execute(&create_table("foo", &[("other", ColumnType::Text)]))
        .unwrap();

    let result = show_columns(&mut engine, "foo");
    let rows = result.rows.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get("column_name").unwrap().as_text().unwrap(),
        "other"
    );
}

#[test]
fn catalog_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut engine = engine(&dir);
        engine.execute(&create_foo()).unwrap();
        engine.execute(&create_index("foo", "fx", &["data"])).unwrap();
    }

    let mut engine = engine(&dir);
    assert_eq!(show_tables(&mut engine).rows.unwrap().len(), 1);
    assert_eq!(show_columns(&mut engine, "foo").rows.unwrap().len(), 2);
    assert_eq!(show_index(&mut engine, "foo").rows.unwrap().len(), 1);

    // and the catalog is still consistent enough to drop everything
    engine.execute(&drop_table("foo")).unwrap();
    assert_eq!(show_tables(&mut engine).rows.unwrap().len(), 0);
}

#[test]
fn unsupported_statement_kinds_are_answered() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);

    let select = Statement::Select(SelectStatement {
        table_name: "foo".to_string(),
        columns: vec![],
    });
    assert_eq!(engine.execute(&select).unwrap().message, "not implemented");

    let view = Statement::Create(CreateStatement::View(CreateViewStatement {
        view_name: "v".to_string(),
        query: SelectStatement {
            table_name: "foo".to_string(),
            columns: vec![],
        },
    }));
    assert_eq!(
        engine.execute(&view).unwrap().message,
        "Only CREATE TABLE and CREATE INDEX are implemented"
    );

    let drop_view = Statement::Drop(DropStatement::View(DropViewStatement {
        view_name: "v".to_string(),
    }));
    assert_eq!(
        engine.execute(&drop_view).unwrap().message,
        "Only DROP TABLE and CREATE INDEX are implemented"
    );
}

#[test]
fn storage_errors_surface_with_relation_prefix() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);

    let err = engine.execute(&drop_table("ghost")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "DbRelationError: table 'ghost' is not in the catalog"
    );

    let err = engine.execute(&drop_index("foo", "fx")).unwrap_err();
    assert!(err.to_string().starts_with("DbRelationError: "));
}

#[test]
fn show_results_render_like_a_table() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine(&dir);
    engine.execute(&create_foo()).unwrap();

    let rendered = show_tables(&mut engine).to_string();
    assert_eq!(
        rendered,
        "table_name \n+----------+\n\"foo\" \nsuccessfully returned 1 rows"
    );
}
