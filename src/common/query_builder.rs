// src/common/query_builder.rs

//! Dynamic SQL assembly for list and analytics queries.
//!
//! Conditions are collected as typed variants and rendered into a single
//! statement whose `$N` placeholders line up one-to-one with the returned
//! argument vector. Column names, GROUP BY and ORDER BY expressions are
//! `&'static str` so that only allow-listed identifiers (see
//! [`crate::common::filters`]) can ever be spliced into the SQL text.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::{Query, QueryAs, QueryScalar};

// =============================================================================
//  PARAMETERS
// =============================================================================

/// A value bound to a `$N` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i32),
    BigInt(i64),
    Float(f64),
    Decimal(Decimal),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Int(v)
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::BigInt(v)
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        SqlParam::Float(v)
    }
}

impl From<Decimal> for SqlParam {
    fn from(v: Decimal) -> Self {
        SqlParam::Decimal(v)
    }
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        SqlParam::Bool(v)
    }
}

impl From<NaiveDate> for SqlParam {
    fn from(v: NaiveDate) -> Self {
        SqlParam::Date(v)
    }
}

impl From<DateTime<Utc>> for SqlParam {
    fn from(v: DateTime<Utc>) -> Self {
        SqlParam::Timestamp(v)
    }
}

/// Binds a built argument vector onto any of the sqlx query shapes.
pub trait BindParams: Sized {
    fn bind_param(self, param: SqlParam) -> Self;

    fn bind_params(self, params: Vec<SqlParam>) -> Self {
        params.into_iter().fold(self, Self::bind_param)
    }
}

macro_rules! bind_sql_param {
    ($query:expr, $param:expr) => {
        match $param {
            SqlParam::Text(v) => $query.bind(v),
            SqlParam::Int(v) => $query.bind(v),
            SqlParam::BigInt(v) => $query.bind(v),
            SqlParam::Float(v) => $query.bind(v),
            SqlParam::Decimal(v) => $query.bind(v),
            SqlParam::Bool(v) => $query.bind(v),
            SqlParam::Date(v) => $query.bind(v),
            SqlParam::Timestamp(v) => $query.bind(v),
        }
    };
}

impl<'q> BindParams for Query<'q, Postgres, PgArguments> {
    fn bind_param(self, param: SqlParam) -> Self {
        bind_sql_param!(self, param)
    }
}

impl<'q, O> BindParams for QueryAs<'q, Postgres, O, PgArguments> {
    fn bind_param(self, param: SqlParam) -> Self {
        bind_sql_param!(self, param)
    }
}

impl<'q, O> BindParams for QueryScalar<'q, Postgres, O, PgArguments> {
    fn bind_param(self, param: SqlParam) -> Self {
        bind_sql_param!(self, param)
    }
}

// =============================================================================
//  CONDITIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Equal { field: &'static str, value: SqlParam },
    Like { field: &'static str, pattern: String },
    Range { field: &'static str, min: SqlParam, max: SqlParam },
    Min { field: &'static str, value: SqlParam },
    Max { field: &'static str, value: SqlParam },
}

impl Condition {
    /// Renders the fragment starting at placeholder `next`, returning the
    /// fragment, its arguments and the next free placeholder index.
    pub fn render(&self, next: usize) -> (String, Vec<SqlParam>, usize) {
        match self {
            Condition::Equal { field, value } => {
                (format!("{} = ${}", field, next), vec![value.clone()], next + 1)
            }
            Condition::Like { field, pattern } => (
                format!("{} ILIKE ${}", field, next),
                vec![SqlParam::Text(format!("%{}%", pattern))],
                next + 1,
            ),
            Condition::Range { field, min, max } => (
                format!("{} BETWEEN ${} AND ${}", field, next, next + 1),
                vec![min.clone(), max.clone()],
                next + 2,
            ),
            Condition::Min { field, value } => {
                (format!("{} >= ${}", field, next), vec![value.clone()], next + 1)
            }
            Condition::Max { field, value } => {
                (format!("{} <= ${}", field, next), vec![value.clone()], next + 1)
            }
        }
    }
}

// =============================================================================
//  ORDERING
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything other than a case-insensitive "desc" sorts ascending.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: &'static str,
    pub direction: SortDirection,
    /// Tie-breaker appended after the primary key so pages are stable.
    pub tie_breaker: Option<&'static str>,
}

impl OrderBy {
    fn to_sql(&self) -> String {
        match self.tie_breaker {
            Some(tie) if tie != self.field => {
                format!("{} {}, {}", self.field, self.direction.as_sql(), tie)
            }
            _ => format!("{} {}", self.field, self.direction.as_sql()),
        }
    }
}

// =============================================================================
//  BUILDER
// =============================================================================

/// Output of [`QueryBuilder::build`]: the SQL text plus its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub args: Vec<SqlParam>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    conditions: Vec<Condition>,
    order_by: Option<OrderBy>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_equal(&mut self, field: &'static str, value: impl Into<SqlParam>) -> &mut Self {
        self.conditions.push(Condition::Equal { field, value: value.into() });
        self
    }

    /// Case-insensitive substring match; the value is wrapped in `%…%` here.
    pub fn add_like(&mut self, field: &'static str, value: &str) -> &mut Self {
        self.conditions.push(Condition::Like { field, pattern: value.to_string() });
        self
    }

    pub fn add_range(
        &mut self,
        field: &'static str,
        min: impl Into<SqlParam>,
        max: impl Into<SqlParam>,
    ) -> &mut Self {
        self.conditions.push(Condition::Range { field, min: min.into(), max: max.into() });
        self
    }

    pub fn add_min(&mut self, field: &'static str, value: impl Into<SqlParam>) -> &mut Self {
        self.conditions.push(Condition::Min { field, value: value.into() });
        self
    }

    pub fn add_max(&mut self, field: &'static str, value: impl Into<SqlParam>) -> &mut Self {
        self.conditions.push(Condition::Max { field, value: value.into() });
        self
    }

    /// Picks range, min-only or max-only depending on which bounds are present.
    pub fn add_bounds<T: Into<SqlParam>>(
        &mut self,
        field: &'static str,
        min: Option<T>,
        max: Option<T>,
    ) -> &mut Self {
        match (min, max) {
            (Some(min), Some(max)) => self.add_range(field, min, max),
            (Some(min), None) => self.add_min(field, min),
            (None, Some(max)) => self.add_max(field, max),
            (None, None) => self,
        }
    }

    pub fn set_order_by(&mut self, field: &'static str, direction: &str) -> &mut Self {
        self.order_by = Some(OrderBy {
            field,
            direction: SortDirection::parse(direction),
            tie_breaker: None,
        });
        self
    }

    pub fn set_tie_breaker(&mut self, tie_breaker: &'static str) -> &mut Self {
        if let Some(order) = self.order_by.as_mut() {
            order.tie_breaker = Some(tie_breaker);
        }
        self
    }

    pub fn order_by(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// Assembles `base [WHERE …] [GROUP BY …] [ORDER BY …] [LIMIT $K] [OFFSET $K+1]`.
    ///
    /// Conditions render from `$1` on every call, so a count build and a data
    /// build from the same builder share an identical WHERE clause and the
    /// count arguments are a prefix of the data arguments.
    pub fn build(
        &self,
        base: &str,
        group_by: Option<&'static str>,
        order_by: Option<&'static str>,
        limit: i64,
        offset: i64,
        count_only: bool,
    ) -> BuiltQuery {
        let mut sql = String::from(base);
        let mut args = Vec::new();
        let mut next = 1;

        if !self.conditions.is_empty() {
            let mut fragments = Vec::with_capacity(self.conditions.len());
            for condition in &self.conditions {
                let (fragment, values, after) = condition.render(next);
                fragments.push(fragment);
                args.extend(values);
                next = after;
            }
            sql.push_str(" WHERE ");
            sql.push_str(&fragments.join(" AND "));
        }

        if let Some(group) = group_by.filter(|g| !g.trim().is_empty()) {
            sql.push_str(" GROUP BY ");
            sql.push_str(group);
        }

        if !count_only {
            let order = match &self.order_by {
                Some(order) => Some(order.to_sql()),
                None => order_by.filter(|o| !o.trim().is_empty()).map(str::to_string),
            };
            if let Some(order) = order {
                sql.push_str(" ORDER BY ");
                sql.push_str(&order);
            }
        }

        if limit > 0 {
            sql.push_str(&format!(" LIMIT ${}", next));
            args.push(SqlParam::BigInt(limit));
            next += 1;
        }

        if offset > 0 {
            sql.push_str(&format!(" OFFSET ${}", next));
            args.push(SqlParam::BigInt(offset));
        }

        BuiltQuery { sql, args }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn placeholders(sql: &str) -> Vec<usize> {
        let bytes = sql.as_bytes();
        let mut found = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'$' {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                if end > start {
                    found.push(sql[start..end].parse().unwrap());
                }
                i = end;
            } else {
                i += 1;
            }
        }
        found
    }

    #[test]
    fn empty_builder_returns_base() {
        let built = QueryBuilder::new().build("SELECT * FROM cars.vehicles v", None, None, 0, 0, false);
        assert_eq!(built.sql, "SELECT * FROM cars.vehicles v");
        assert!(built.args.is_empty());
    }

    #[test]
    fn renders_every_condition_kind_in_order() {
        let mut qb = QueryBuilder::new();
        qb.add_equal("v.make", "Toyota")
            .add_like("v.model", "aqua")
            .add_range("v.mileage_km", 10_000, 80_000)
            .add_min("v.year_of_manufacture", 2015)
            .add_max("v.code", 500);

        let built = qb.build("SELECT v.id FROM cars.vehicles v", None, None, 0, 0, false);

        assert_eq!(
            built.sql,
            "SELECT v.id FROM cars.vehicles v WHERE v.make = $1 AND v.model ILIKE $2 \
             AND v.mileage_km BETWEEN $3 AND $4 AND v.year_of_manufacture >= $5 AND v.code <= $6"
        );
        assert_eq!(
            built.args,
            vec![
                SqlParam::Text("Toyota".into()),
                SqlParam::Text("%aqua%".into()),
                SqlParam::Int(10_000),
                SqlParam::Int(80_000),
                SqlParam::Int(2015),
                SqlParam::Int(500),
            ]
        );
    }

    #[test]
    fn limit_and_offset_continue_the_counter() {
        let mut qb = QueryBuilder::new();
        qb.add_equal("v.make", "Honda");
        let built = qb.build("SELECT * FROM cars.vehicles v", None, Some("v.id DESC"), 5, 10, false);
        assert_eq!(
            built.sql,
            "SELECT * FROM cars.vehicles v WHERE v.make = $1 ORDER BY v.id DESC LIMIT $2 OFFSET $3"
        );
        assert_eq!(built.args[1], SqlParam::BigInt(5));
        assert_eq!(built.args[2], SqlParam::BigInt(10));
    }

    #[test]
    fn offset_without_limit_takes_the_next_slot() {
        let built = QueryBuilder::new().build("SELECT 1", None, None, 0, 20, false);
        assert_eq!(built.sql, "SELECT 1 OFFSET $1");
        assert_eq!(built.args, vec![SqlParam::BigInt(20)]);
    }

    #[test]
    fn count_only_drops_order_by_but_keeps_group_and_limit() {
        let mut qb = QueryBuilder::new();
        qb.add_equal("vs.shipping_status", "SHIPPED").set_order_by("v.created_at", "desc");
        let built = qb.build(
            "SELECT v.make, COUNT(*) FROM cars.vehicles v",
            Some("v.make"),
            Some("v.id"),
            3,
            0,
            true,
        );
        assert_eq!(
            built.sql,
            "SELECT v.make, COUNT(*) FROM cars.vehicles v WHERE vs.shipping_status = $1 GROUP BY v.make LIMIT $2"
        );
    }

    #[test]
    fn builder_order_by_wins_over_parameter() {
        let mut qb = QueryBuilder::new();
        qb.set_order_by("v.year_of_manufacture", "DESC").set_tie_breaker("v.id DESC");
        let built = qb.build("SELECT * FROM cars.vehicles v", None, Some("v.id"), 0, 0, false);
        assert_eq!(
            built.sql,
            "SELECT * FROM cars.vehicles v ORDER BY v.year_of_manufacture DESC, v.id DESC"
        );
    }

    #[test]
    fn unknown_direction_normalises_to_asc() {
        let mut qb = QueryBuilder::new();
        qb.set_order_by("v.code", "sideways; DROP TABLE cars.vehicles");
        assert_eq!(qb.order_by().unwrap().direction, SortDirection::Asc);
        let built = qb.build("SELECT * FROM cars.vehicles v", None, None, 0, 0, false);
        assert!(built.sql.ends_with("ORDER BY v.code ASC"));
    }

    #[test]
    fn blank_group_by_is_ignored() {
        let built = QueryBuilder::new().build("SELECT 1", Some("  "), None, 0, 0, false);
        assert_eq!(built.sql, "SELECT 1");
    }

    #[test]
    fn like_wraps_exactly_once() {
        let mut qb = QueryBuilder::new();
        qb.add_like("c.name", "perera");
        let built = qb.build("SELECT * FROM cars.customers c", None, None, 0, 0, false);
        assert_eq!(built.args, vec![SqlParam::Text("%perera%".into())]);
    }

    #[test]
    fn count_and_data_builds_share_where_clause() {
        let mut qb = QueryBuilder::new();
        qb.add_equal("v.make", "Toyota").add_range("v.mileage_km", 10_000, 80_000);
        qb.set_order_by("v.created_at", "desc");

        let count = qb.build("SELECT COUNT(*) FROM cars.vehicles v", None, None, 0, 0, true);
        let data = qb.build("SELECT v.* FROM cars.vehicles v", None, None, 5, 5, false);

        let count_where = count.sql.split(" WHERE ").nth(1).unwrap();
        let data_where = data.sql.split(" WHERE ").nth(1).unwrap();
        assert!(data_where.starts_with(count_where));
        assert!(!count.sql.contains("ORDER BY"));
        assert!(data.sql.contains("ORDER BY"));
        assert_eq!(&data.args[..count.args.len()], &count.args[..]);
        assert_eq!(data.args.len(), count.args.len() + 2);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Eq(i64),
        Like(String),
        Range(i32, i32),
        Min(i32),
        Max(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<i64>().prop_map(Op::Eq),
            "[a-z ]{0,12}".prop_map(Op::Like),
            (any::<i32>(), any::<i32>()).prop_map(|(a, b)| Op::Range(a, b)),
            any::<i32>().prop_map(Op::Min),
            any::<i32>().prop_map(Op::Max),
        ]
    }

    proptest! {
        #[test]
        fn placeholders_are_a_bijection_with_args(
            ops in proptest::collection::vec(op_strategy(), 0..12),
            limit in -3i64..50,
            offset in -3i64..50,
            count_only in any::<bool>(),
            grouped in any::<bool>(),
        ) {
            let mut qb = QueryBuilder::new();
            for op in &ops {
                match op {
                    Op::Eq(v) => { qb.add_equal("t.a", *v); }
                    Op::Like(s) => { qb.add_like("t.b", s); }
                    Op::Range(a, b) => { qb.add_range("t.c", *a, *b); }
                    Op::Min(v) => { qb.add_min("t.d", *v); }
                    Op::Max(v) => { qb.add_max("t.e", *v); }
                }
            }
            let group = if grouped { Some("t.a") } else { None };
            let built = qb.build("SELECT * FROM t", group, Some("t.a"), limit, offset, count_only);

            let seen = placeholders(&built.sql);
            let distinct: BTreeSet<usize> = seen.iter().copied().collect();
            prop_assert_eq!(seen.len(), distinct.len());
            prop_assert_eq!(distinct.len(), built.args.len());
            let expected: BTreeSet<usize> = (1..=built.args.len()).collect();
            prop_assert_eq!(distinct, expected);
            // placeholders appear in ascending order in the text
            prop_assert!(seen.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn like_argument_is_wrapped(input in "[A-Za-z0-9 ]{0,20}") {
            let mut qb = QueryBuilder::new();
            qb.add_like("v.model", &input);
            let built = qb.build("SELECT 1", None, None, 0, 0, false);
            prop_assert_eq!(built.args, vec![SqlParam::Text(format!("%{}%", input))]);
        }
    }
}
