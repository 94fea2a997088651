//! Human-readable rendering of query results.
//!
//! Headers come first, then a dashed separator with one segment per
//! column, then the rows with each value rendered per its tag, then the
//! status message.

use super::executor::QueryResult;
use crate::storage::Value;
use std::fmt;

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(column_names) = &self.column_names {
            for column_name in column_names {
                write!(f, "{} ", column_name)?;
            }
            writeln!(f)?;
            write!(f, "+")?;
            for _ in column_names {
                write!(f, "----------+")?;
            }
            writeln!(f)?;
            for row in self.rows.as_deref().unwrap_or(&[]) {
                for column_name in column_names {
                    match row.get(column_name) {
                        Ok(Value::Int(n)) => write!(f, "{}", n)?,
                        Ok(Value::Text(s)) => write!(f, "\"{}\"", s)?,
                        Ok(Value::Boolean(b)) => write!(f, "{}", b)?,
                        Err(_) => write!(f, "???")?,
                    }
                    write!(f, " ")?;
                }
                writeln!(f)?;
            }
        }
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataType;
    use crate::storage::Row;

    #[test]
    fn test_message_only() {
        let result = QueryResult::with_message("created foo");
        assert_eq!(result.to_string(), "created foo");
    }

    #[test]
    fn test_tabular_layout() {
        let mut row = Row::new();
        row.set("table_name", "foo");
        let result = QueryResult::with_rows(
            vec!["table_name".to_string()],
            vec![DataType::Text],
            vec![row],
            "successfully returned 1 rows",
        );
        assert_eq!(
            result.to_string(),
            "table_name \n+----------+\n\"foo\" \nsuccessfully returned 1 rows"
        );
    }

    #[test]
    fn test_value_rendering_per_tag() {
        let mut row = Row::new();
        row.set("seq_in_index", 2);
        row.set("is_unique", true);
        let result = QueryResult::with_rows(
            vec![
                "seq_in_index".to_string(),
                "is_unique".to_string(),
                "ghost".to_string(),
            ],
            vec![DataType::Int, DataType::Boolean, DataType::Text],
            vec![row],
            "successfully returned 1 rows",
        );
        assert_eq!(
            result.to_string(),
            "seq_in_index is_unique ghost \n+----------+----------+----------+\n2 true ??? \nsuccessfully returned 1 rows"
        );
    }
}
