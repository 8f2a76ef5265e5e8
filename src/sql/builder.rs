//! Builds parameterized SELECT, INSERT, UPDATE and DELETE statements from static table
//! descriptions. Identifiers come from `tables`, never from requests; values are parameters.

use super::params::PgBindValue;
use super::tables::{Table, CITIES, TRAVELS};
use crate::service::query::{like_pattern, TravelFilter};

const MAIN_ALIAS: &str = "main";

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: PgBindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// `id` followed by every declared column, optionally prefixed by a table alias.
fn select_column_list(table: &Table, alias: Option<&str>) -> String {
    std::iter::once("id")
        .chain(table.columns.iter().map(|c| c.name))
        .map(|name| match alias {
            Some(a) => format!("{}.{}", a, quoted(name)),
            None => quoted(name),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn select_by_id(schema: &str, table: &Table, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::I64(id));
    q.sql = format!(
        "SELECT {} FROM {} WHERE \"id\" = ${}",
        select_column_list(table, None),
        qualified_table(schema, table.name),
        n
    );
    q
}

pub fn select_all(schema: &str, table: &Table) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY \"id\"",
        select_column_list(table, None),
        qualified_table(schema, table.name)
    );
    q
}

/// Batch fetch for eager loading of relations.
pub fn select_by_ids(schema: &str, table: &Table, ids: &[i64]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::I64Array(ids.to_vec()));
    q.sql = format!(
        "SELECT {} FROM {} WHERE \"id\" = ANY(${}) ORDER BY \"id\"",
        select_column_list(table, None),
        qualified_table(schema, table.name),
        n
    );
    q
}

/// Exact match on one column, ordered by id.
pub fn select_where_eq(schema: &str, table: &Table, column: &str, value: PgBindValue) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = placeholder(&mut q, table, column, value);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {} ORDER BY \"id\"",
        select_column_list(table, None),
        qualified_table(schema, table.name),
        quoted(column),
        ph
    );
    q
}

/// First row (lowest id) whose `column` contains `fragment`, case-insensitively.
pub fn select_first_containing(schema: &str, table: &Table, column: &str, fragment: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::Text(like_pattern(fragment)));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} ILIKE ${} ESCAPE '\\' ORDER BY \"id\" LIMIT 1",
        select_column_list(table, None),
        qualified_table(schema, table.name),
        quoted(column),
        n
    );
    q
}

/// Placeholder with an explicit cast to the column type so NULLs and numerics bind cleanly.
fn placeholder(q: &mut QueryBuf, table: &Table, column: &str, value: PgBindValue) -> String {
    let n = q.push_param(value);
    table
        .column(column)
        .map(|c| format!("${}::{}", n, c.pg_type))
        .unwrap_or_else(|| format!("${}", n))
}

/// INSERT of the given column values; columns unknown to the table are skipped so that
/// omitted columns take their database default.
pub fn insert(schema: &str, table: &Table, values: Vec<(&str, PgBindValue)>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (name, value) in values {
        if table.column(name).is_none() {
            continue;
        }
        placeholders.push(placeholder(&mut q, table, name, value));
        cols.push(quoted(name));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        qualified_table(schema, table.name),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(table, None)
    );
    q
}

/// UPDATE by id: SET only the given columns.
pub fn update(schema: &str, table: &Table, id: i64, values: Vec<(&str, PgBindValue)>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for (name, value) in values {
        if table.column(name).is_none() {
            continue;
        }
        let ph = placeholder(&mut q, table, name, value);
        sets.push(format!("{} = {}", quoted(name), ph));
    }
    if sets.is_empty() {
        return select_by_id(schema, table, id);
    }
    let id_param = q.push_param(PgBindValue::I64(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE \"id\" = ${} RETURNING {}",
        qualified_table(schema, table.name),
        sets.join(", "),
        id_param,
        select_column_list(table, None)
    );
    q
}

/// DELETE by id.
pub fn delete(schema: &str, table: &Table, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::I64(id));
    q.sql = format!(
        "DELETE FROM {} WHERE \"id\" = ${} RETURNING \"id\"",
        qualified_table(schema, table.name),
        n
    );
    q
}

/// Travel search: travels joined with their city, one ANDed condition per present predicate.
pub fn search_travels(schema: &str, filter: &TravelFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    if let Some(city) = filter.city_name() {
        let n = q.push_param(PgBindValue::Text(city.to_string()));
        where_parts.push(format!("lower(c.{}) = lower(${}::text)", quoted("name"), n));
    }
    if let Some(d) = filter.start_date {
        let n = q.push_param(d.into());
        where_parts.push(format!("{}.{} >= ${}::date", MAIN_ALIAS, quoted("start_date"), n));
    }
    if let Some(d) = filter.end_date {
        let n = q.push_param(d.into());
        where_parts.push(format!("{}.{} <= ${}::date", MAIN_ALIAS, quoted("end_date"), n));
    }
    if let Some(p) = filter.min_price {
        let n = q.push_param(p.into());
        where_parts.push(format!("{}.{} >= ${}::double precision", MAIN_ALIAS, quoted("price"), n));
    }
    if let Some(p) = filter.max_price {
        let n = q.push_param(p.into());
        where_parts.push(format!("{}.{} <= ${}::double precision", MAIN_ALIAS, quoted("price"), n));
    }
    if let Some(duration) = &filter.duration {
        let n = q.push_param(PgBindValue::Text(duration.clone()));
        where_parts.push(format!("{}.{} = ${}::text", MAIN_ALIAS, quoted("duration"), n));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    q.sql = format!(
        "SELECT {} FROM {} {} JOIN {} c ON c.\"id\" = {}.\"city_id\"{} ORDER BY {}.\"id\"",
        select_column_list(&TRAVELS, Some(MAIN_ALIAS)),
        qualified_table(schema, TRAVELS.name),
        MAIN_ALIAS,
        qualified_table(schema, CITIES.name),
        MAIN_ALIAS,
        where_clause,
        MAIN_ALIAS
    );
    q
}
