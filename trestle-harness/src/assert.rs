use std::fmt::Debug;

use trestle_connectors_base::{common::SqlError, interface::Connection};
use trestle_core::{
    data::DataValue,
    err::{bail, Result},
};

/// Fails unless `res` is an error carrying the expected SQL state
pub fn assert_sql_state<T: Debug>(expected: &str, res: Result<T>) -> Result<()> {
    match res {
        Ok(val) => bail!(
            "Expected an error with SQL state {} but the statement succeeded with {:?}",
            expected,
            val
        ),
        Err(err) => match SqlError::state_of(&err) {
            Some(state) if state == expected => Ok(()),
            Some(state) => bail!(
                "Expected SQL state {} but got {}: {:#}",
                expected,
                state,
                err
            ),
            None => bail!("Expected SQL state {} but got: {:#}", expected, err),
        },
    }
}

/// Fails unless the query returns exactly the expected rows
pub fn assert_rows(con: &mut dyn Connection, sql: &str, expected: Vec<Vec<DataValue>>) -> Result<()> {
    let actual = con.query(sql)?;

    if actual != expected {
        bail!(
            "Unexpected rows from \"{}\"\nexpected: {:?}\n  actual: {:?}",
            sql,
            expected,
            actual
        );
    }

    Ok(())
}

/// Fails unless the table holds the expected number of rows
pub fn assert_row_count(con: &mut dyn Connection, table: &str, expected: i64) -> Result<()> {
    assert_rows(
        con,
        &format!("SELECT COUNT(*) FROM {}", table),
        vec![vec![DataValue::Int64(expected)]],
    )
}
