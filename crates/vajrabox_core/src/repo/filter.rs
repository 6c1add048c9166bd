//! WHERE-clause builder for list queries: exact filters, ranges, free-text
//! search and pagination.

use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value;
use rusqlite::Connection;

/// SQL function that lowercases text with full Unicode rules.
///
/// SQLite's own `LIKE` and `lower()` only fold ASCII, so search compares
/// `casefold(column)` against an already folded pattern.
const CASEFOLD_FN: &str = "casefold";

/// Registers the functions search clauses rely on. Idempotent per connection.
pub(crate) fn register_search_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        CASEFOLD_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text = ctx.get::<Option<String>>(0)?;
            Ok(text.map(|text| text.to_lowercase()))
        },
    )
}

/// Splits search text into terms on whitespace and commas.
pub fn search_terms(text: &str) -> Vec<String> {
    text.split(|ch: char| ch.is_whitespace() || ch == ',')
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// Escapes LIKE wildcards so a term matches literally (`ESCAPE '\'`).
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Accumulates `AND`-joined conditions with their bind values.
#[derive(Debug, Default)]
pub(crate) struct SqlFilter {
    clauses: Vec<String>,
    binds: Vec<Value>,
}

impl SqlFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(&mut self, column: &str, value: Option<impl Into<Value>>) -> &mut Self {
        if let Some(value) = value {
            self.clauses.push(format!("{column} = ?"));
            self.binds.push(value.into());
        }
        self
    }

    pub fn gte(&mut self, column: &str, value: Option<i64>) -> &mut Self {
        if let Some(value) = value {
            self.clauses.push(format!("{column} >= ?"));
            self.binds.push(Value::Integer(value));
        }
        self
    }

    pub fn lte(&mut self, column: &str, value: Option<i64>) -> &mut Self {
        if let Some(value) = value {
            self.clauses.push(format!("{column} <= ?"));
            self.binds.push(Value::Integer(value));
        }
        self
    }

    /// Every term must appear, case-insensitively, in at least one column.
    ///
    /// Needs [`register_search_functions`] on the executing connection.
    pub fn search(&mut self, columns: &[&str], text: Option<&str>) -> &mut Self {
        let Some(text) = text else {
            return self;
        };

        for term in search_terms(text) {
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            let alternatives = columns
                .iter()
                .map(|column| format!("{CASEFOLD_FN}({column}) LIKE ? ESCAPE '\\'"))
                .collect::<Vec<_>>();
            self.clauses.push(format!("({})", alternatives.join(" OR ")));
            for _ in columns {
                self.binds.push(Value::Text(pattern.clone()));
            }
        }
        self
    }

    /// Appends `WHERE`, `ORDER BY` and pagination to `select_sql`.
    pub fn finish(
        mut self,
        select_sql: &str,
        order_by: &str,
        limit: Option<u32>,
        offset: u32,
    ) -> (String, Vec<Value>) {
        let mut sql = String::from(select_sql);
        if !self.clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by);

        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            self.binds.push(Value::Integer(i64::from(limit)));
            if offset > 0 {
                sql.push_str(" OFFSET ?");
                self.binds.push(Value::Integer(i64::from(offset)));
            }
        } else if offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            self.binds.push(Value::Integer(i64::from(offset)));
        }

        (sql, self.binds)
    }
}
