use sqlx::postgres::PgArguments;
use sqlx::{Error as SqlxError, Postgres};

/// Specifies the direction for ordering query results.
#[derive(Debug, Clone, Copy)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

/// Lets `QueryCriteria` hold values of different types and bind them later.
pub trait AsSqlxArg: Send + Sync {
    fn add_to_args(&self, args: &mut PgArguments) -> Result<(), SqlxError>;
}

impl<T> AsSqlxArg for T
where
    T: for<'a> sqlx::Encode<'a, Postgres> + sqlx::Type<Postgres> + Send + Sync + Clone + 'static,
{
    fn add_to_args(&self, args: &mut PgArguments) -> Result<(), SqlxError> {
        use sqlx::Arguments;
        args.add(self.clone()).map_err(SqlxError::Encode)
    }
}

/// One WHERE clause. With several columns the comparisons are OR-ed and share one placeholder.
pub struct FilterCondition {
    pub columns: Vec<&'static str>,
    pub operator: &'static str,
    pub value: Option<Box<dyn AsSqlxArg>>,
}

/// Dynamic SELECT builder: AND-ed filters, ordering and paging over a single table.
#[derive(Default)]
pub struct QueryCriteria {
    pub conditions: Vec<FilterCondition>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order_by: Vec<(&'static str, OrderDirection)>,
}

impl QueryCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter condition that may or may not have a value (`IS NULL` has none).
    pub fn add_filter<V>(mut self, column: &'static str, operator: &'static str, value: Option<V>) -> Self
    where
        V: for<'a> sqlx::Encode<'a, Postgres> + sqlx::Type<Postgres> + Send + Sync + Clone + 'static,
    {
        self.conditions.push(FilterCondition {
            columns: vec![column],
            operator,
            value: value.map(|v| Box::new(v) as Box<dyn AsSqlxArg>),
        });
        self
    }

    pub fn add_valued_filter<V>(self, column: &'static str, operator: &'static str, value: V) -> Self
    where
        V: for<'a> sqlx::Encode<'a, Postgres> + sqlx::Type<Postgres> + Send + Sync + Clone + 'static,
    {
        self.add_filter(column, operator, Some(value))
    }

    /// Matches when any of `columns` satisfies `operator value`.
    pub fn add_any_filter<V>(mut self, columns: &[&'static str], operator: &'static str, value: V) -> Self
    where
        V: for<'a> sqlx::Encode<'a, Postgres> + sqlx::Type<Postgres> + Send + Sync + Clone + 'static,
    {
        self.conditions.push(FilterCondition {
            columns: columns.to_vec(),
            operator,
            value: Some(Box::new(value)),
        });
        self
    }

    pub fn limit(mut self, limit_val: i64) -> Self {
        self.limit = Some(limit_val);
        self
    }

    pub fn offset(mut self, offset_val: i64) -> Self {
        self.offset = Some(offset_val);
        self
    }

    pub fn order_by(mut self, column: &'static str, direction: OrderDirection) -> Self {
        self.order_by.push((column, direction));
        self
    }

    /// Renders `SELECT * FROM {table} ...` with `$n` placeholders and the matching arguments.
    pub fn build_select(&self, table: &str) -> Result<(String, PgArguments), SqlxError> {
        let mut sql = format!("SELECT * FROM {table}");
        let mut args = PgArguments::default();
        let mut placeholders = 0;

        let mut clauses = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            let placeholder = match &condition.value {
                Some(value) => {
                    value.add_to_args(&mut args)?;
                    placeholders += 1;
                    Some(format!("${placeholders}"))
                }
                None => None,
            };

            let comparisons: Vec<String> = condition
                .columns
                .iter()
                .map(|column| match &placeholder {
                    Some(p) => format!("{column} {} {p}", condition.operator),
                    None => format!("{column} {}", condition.operator),
                })
                .collect();

            if comparisons.len() > 1 {
                clauses.push(format!("({})", comparisons.join(" OR ")));
            } else {
                clauses.extend(comparisons);
            }
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if !self.order_by.is_empty() {
            let order: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, direction)| format!("{column} {}", direction.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        Ok((sql, args))
    }
}

/// `%query%` for ILIKE with the LIKE wildcards in `query` escaped.
pub(crate) fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_filters_order_and_paging() {
        let (sql, _) = QueryCriteria::new()
            .add_valued_filter("category_id", "=", 4_i64)
            .add_filter::<i64>("moderator_id", "IS NULL", None)
            .order_by("is_pinned", OrderDirection::Desc)
            .order_by("id", OrderDirection::Asc)
            .limit(1)
            .offset(2)
            .build_select("forum_threads")
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM forum_threads WHERE category_id = $1 AND moderator_id IS NULL \
             ORDER BY is_pinned DESC, id ASC LIMIT 1 OFFSET 2"
        );
    }

    #[test]
    fn any_filter_shares_one_placeholder() {
        let (sql, _) = QueryCriteria::new()
            .add_any_filter(&["title", "content"], "ILIKE", "%x%".to_string())
            .add_valued_filter("user_id", "=", 9_i64)
            .build_select("forum_threads")
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM forum_threads WHERE (title ILIKE $1 OR content ILIKE $1) AND user_id = $2"
        );
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(like_pattern("100%_done"), "%100\\%\\_done%");
    }
}
