//! Schema bootstrap: schema, tables, foreign keys and indexes, created in dependency order.
//! Idempotent (IF NOT EXISTS everywhere); it never alters or drops existing objects.

use crate::error::AppError;
use crate::sql::qualified_table;
use sqlx::PgPool;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Table DDL in creation order. `{t}` is replaced by the qualified table name and
/// `{users}`, `{cities}`, ... by the qualified names of referenced tables.
const TABLES: &[(&str, &str)] = &[
    (
        "users",
        r#"CREATE TABLE IF NOT EXISTS {t} (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            age INTEGER NOT NULL
        )"#,
    ),
    (
        "cities",
        r#"CREATE TABLE IF NOT EXISTS {t} (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL,
            image_url TEXT
        )"#,
    ),
    (
        "tour_guides",
        r#"CREATE TABLE IF NOT EXISTS {t} (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            experience_years INTEGER NOT NULL,
            bio TEXT,
            contact_info TEXT NOT NULL,
            city_id BIGINT NOT NULL REFERENCES {cities} (id) ON DELETE RESTRICT
        )"#,
    ),
    (
        "travels",
        r#"CREATE TABLE IF NOT EXISTS {t} (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            price DOUBLE PRECISION NOT NULL,
            duration TEXT NOT NULL,
            start_date DATE NOT NULL,
            end_date DATE NOT NULL,
            image_url TEXT,
            city_id BIGINT NOT NULL REFERENCES {cities} (id) ON DELETE RESTRICT,
            guide_id BIGINT REFERENCES {tour_guides} (id) ON DELETE RESTRICT
        )"#,
    ),
    (
        "orders",
        r#"CREATE TABLE IF NOT EXISTS {t} (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES {users} (id) ON DELETE RESTRICT,
            travel_id BIGINT NOT NULL REFERENCES {travels} (id) ON DELETE RESTRICT,
            order_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            status TEXT NOT NULL DEFAULT 'pending'
        )"#,
    ),
    (
        "reviews",
        r#"CREATE TABLE IF NOT EXISTS {t} (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES {users} (id) ON DELETE RESTRICT,
            travel_id BIGINT NOT NULL REFERENCES {travels} (id) ON DELETE RESTRICT,
            rating INTEGER NOT NULL,
            comment TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    ),
    (
        "posts",
        r#"CREATE TABLE IF NOT EXISTS {t} (
            id BIGSERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            text TEXT NOT NULL,
            author_id BIGINT NOT NULL REFERENCES {users} (id) ON DELETE RESTRICT
        )"#,
    ),
    (
        "sessions",
        r#"CREATE TABLE IF NOT EXISTS {t} (
            token TEXT PRIMARY KEY,
            user_id BIGINT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    ),
];

/// Secondary indexes: (table, column).
const INDEXES: &[(&str, &str)] = &[
    ("users", "name"),
    ("tour_guides", "city_id"),
    ("travels", "city_id"),
    ("travels", "guide_id"),
    ("orders", "user_id"),
    ("orders", "travel_id"),
    ("reviews", "user_id"),
    ("reviews", "travel_id"),
    ("posts", "author_id"),
];

/// Render one table's DDL for `schema`.
pub fn table_ddl(schema: &str, table: &str, template: &str) -> String {
    let mut sql = template.replace("{t}", &qualified_table(schema, table));
    for (name, _) in TABLES {
        sql = sql.replace(&format!("{{{}}}", name), &qualified_table(schema, name));
    }
    sql
}

/// Create `schema` if missing, then every table and index.
pub async fn apply_migrations(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote(schema)))
        .execute(pool)
        .await?;

    for (table, template) in TABLES {
        let sql = table_ddl(schema, table, template);
        tracing::debug!(table = %table, "ensuring table");
        sqlx::query(&sql).execute(pool).await?;
    }

    for (table, column) in INDEXES {
        let sql = format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
            quote(&format!("ix_{}_{}", table, column)),
            qualified_table(schema, table),
            quote(column)
        );
        sqlx::query(&sql).execute(pool).await?;
    }

    tracing::info!(schema = %schema, tables = TABLES.len(), "schema ready");
    Ok(())
}
