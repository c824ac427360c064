//! `sqlparser`-backed classifier. The only file that touches parser AST types.

use std::ops::ControlFlow;

use sqlparser::ast::{
    visit_expressions, visit_relations, AssignmentTarget, Expr, FromTable, Join, JoinConstraint,
    JoinOperator, ObjectName, Query, Select, SetExpr, Statement, TableFactor, TableObject,
    TableWithJoins,
};
use sqlparser::dialect::{Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;
use travels_core::constants::PSEUDO_TABLES;
use travels_core::types::QueryKind;
use travels_core::FxHashMap;

use super::{ClassifyError, ColumnRef, JoinEdge, StatementClassification, StatementClassifier};

/// Classifier over the `sqlparser` crate, parameterised by dialect.
#[derive(Debug)]
pub struct SqlParserClassifier {
    dialect: Box<dyn Dialect>,
}

impl Default for SqlParserClassifier {
    fn default() -> Self {
        Self {
            dialect: Box::new(GenericDialect {}),
        }
    }
}

impl SqlParserClassifier {
    /// Pick a dialect from a source database name (`postgres`, `mysql`, ...).
    /// Unknown names use the generic dialect.
    pub fn for_source(source_db_type: &str) -> Self {
        let dialect: Box<dyn Dialect> = match source_db_type.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Box::new(PostgreSqlDialect {}),
            "mysql" | "mariadb" => Box::new(MySqlDialect {}),
            "sqlite" => Box::new(SQLiteDialect {}),
            _ => Box::new(GenericDialect {}),
        };
        Self { dialect }
    }
}

impl StatementClassifier for SqlParserClassifier {
    fn classify(&self, sql: &str) -> Result<StatementClassification, ClassifyError> {
        let trimmed = sql.trim();
        if trimmed.is_empty() {
            return Err(ClassifyError::Empty);
        }
        let statements = Parser::parse_sql(self.dialect.as_ref(), trimmed).map_err(|e| {
            ClassifyError::Unparseable {
                message: e.to_string(),
            }
        })?;
        // Multi-statement input: only the first statement is classified.
        let statement = statements.into_iter().next().ok_or(ClassifyError::Empty)?;
        Ok(classify_statement(&statement))
    }
}

// ─── Scope ──────────────────────────────────────────────────────────────────

/// Tables and aliases visible anywhere in one statement.
#[derive(Default)]
struct Scope {
    tables: Vec<String>,
    aliases: FxHashMap<String, String>,
    pending_joins: Vec<PendingJoin>,
}

struct PendingJoin {
    right_table: String,
    join_type: &'static str,
    on_columns: Vec<RawColumn>,
}

struct RawColumn {
    qualifier: Option<String>,
    column: String,
}

impl Scope {
    fn add_table(&mut self, table: String) {
        if !self.tables.contains(&table) {
            self.tables.push(table);
        }
    }

    /// Alias or table name → table name. `None` if out of scope.
    fn resolve(&self, qualifier: &str) -> Option<String> {
        if let Some(table) = self.aliases.get(qualifier) {
            return Some(table.clone());
        }
        self.tables.iter().find(|t| t.as_str() == qualifier).cloned()
    }

    fn column_ref(&self, raw: &RawColumn) -> ColumnRef {
        ColumnRef {
            table: raw.qualifier.as_deref().and_then(|q| self.resolve(q)),
            column: raw.column.clone(),
        }
    }
}

// ─── Statement walk ─────────────────────────────────────────────────────────

fn classify_statement(statement: &Statement) -> StatementClassification {
    let mut scope = Scope::default();
    let _ = visit_relations(statement, |name| {
        if let Some(table) = table_name(name) {
            scope.add_table(table);
        }
        ControlFlow::<()>::Continue(())
    });

    let mut result = StatementClassification::empty(QueryKind::Other);
    match statement {
        Statement::Query(query) => {
            result.kind = QueryKind::Select;
            walk_query(query, &mut scope);
            if let Some(selection) = primary_select(query).and_then(|s| s.selection.as_ref()) {
                result.where_columns = where_columns(selection, &scope);
            }
        }
        Statement::Insert(insert) => {
            result.kind = QueryKind::Insert;
            if let TableObject::TableName(name) = &insert.table {
                result.mutated_table = table_name(name);
            }
            if let Some(source) = &insert.source {
                walk_query(source, &mut scope);
            }
        }
        Statement::Update {
            table,
            assignments,
            selection,
            ..
        } => {
            result.kind = QueryKind::Update;
            walk_table_with_joins(table, &mut scope);
            result.mutated_table = relation_table(&table.relation);
            for assignment in assignments {
                let targets: Vec<&ObjectName> = match &assignment.target {
                    AssignmentTarget::ColumnName(name) => vec![name],
                    AssignmentTarget::Tuple(names) => names.iter().collect(),
                };
                for name in targets {
                    if let Some(column) = set_column(name, &scope, result.mutated_table.as_deref()) {
                        result.set_columns.push(column);
                    }
                }
            }
            if let Some(selection) = selection {
                result.where_columns = where_columns(selection, &scope);
            }
        }
        Statement::Delete(delete) => {
            result.kind = QueryKind::Delete;
            let from = match &delete.from {
                FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
            };
            for twj in from {
                walk_table_with_joins(twj, &mut scope);
            }
            if let Some(using) = &delete.using {
                for twj in using {
                    walk_table_with_joins(twj, &mut scope);
                }
            }
            // `DELETE t1 FROM t1 JOIN t2 ...` names its target explicitly.
            result.mutated_table = match delete.tables.first() {
                Some(target) => table_name(target).map(|t| scope.resolve(&t).unwrap_or(t)),
                None => from.first().and_then(|twj| relation_table(&twj.relation)),
            };
            if let Some(selection) = &delete.selection {
                result.where_columns = where_columns(selection, &scope);
            }
        }
        _ => {}
    }

    if let Some(target) = &result.mutated_table {
        scope.add_table(target.clone());
    }
    result.joins = scope
        .pending_joins
        .iter()
        .filter_map(|pending| resolve_join(pending, &scope))
        .collect();
    result.tables = scope.tables;
    result
}

fn walk_query(query: &Query, scope: &mut Scope) {
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            walk_query(&cte.query, scope);
        }
    }
    walk_set_expr(&query.body, scope);
}

fn walk_set_expr(body: &SetExpr, scope: &mut Scope) {
    match body {
        SetExpr::Select(select) => {
            for twj in &select.from {
                walk_table_with_joins(twj, scope);
            }
        }
        SetExpr::Query(query) => walk_query(query, scope),
        SetExpr::SetOperation { left, right, .. } => {
            walk_set_expr(left, scope);
            walk_set_expr(right, scope);
        }
        _ => {}
    }
}

fn walk_table_with_joins(twj: &TableWithJoins, scope: &mut Scope) {
    walk_table_factor(&twj.relation, scope);
    for join in &twj.joins {
        walk_table_factor(&join.relation, scope);
        record_join(join, scope);
    }
}

fn walk_table_factor(factor: &TableFactor, scope: &mut Scope) {
    match factor {
        TableFactor::Table { name, alias, .. } => {
            if let (Some(table), Some(alias)) = (table_name(name), alias) {
                scope.aliases.insert(alias.name.value.to_lowercase(), table);
            }
        }
        TableFactor::Derived { subquery, .. } => walk_query(subquery, scope),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => walk_table_with_joins(table_with_joins, scope),
        _ => {}
    }
}

/// The leftmost SELECT of the top-level query body.
fn primary_select(query: &Query) -> Option<&Select> {
    let mut body = query.body.as_ref();
    loop {
        match body {
            SetExpr::Select(select) => return Some(select),
            SetExpr::Query(inner) => body = inner.body.as_ref(),
            SetExpr::SetOperation { left, .. } => body = left.as_ref(),
            _ => return None,
        }
    }
}

// ─── Joins ──────────────────────────────────────────────────────────────────

fn record_join(join: &Join, scope: &mut Scope) {
    // Derived tables and table functions on the right have no name to key on.
    let Some(right_table) = relation_table(&join.relation) else {
        return;
    };
    let on_columns = match join_constraint(&join.join_operator) {
        Some(JoinConstraint::On(expr)) => raw_columns(expr),
        _ => Vec::new(),
    };
    scope.pending_joins.push(PendingJoin {
        right_table,
        join_type: join_type_name(&join.join_operator),
        on_columns,
    });
}

/// Left table from the ON columns' qualifiers, else the first other table
/// in the statement. `None` drops the edge.
fn resolve_join(pending: &PendingJoin, scope: &Scope) -> Option<JoinEdge> {
    let right = pending.right_table.as_str();
    let mut left_table = None;
    let mut left_column = String::new();
    let mut right_column = String::new();

    if let [first, second, ..] = pending.on_columns.as_slice() {
        let first_ref = scope.column_ref(first);
        let second_ref = scope.column_ref(second);
        if first_ref.table.as_deref() == Some(right) {
            right_column = first_ref.column;
            left_table = second_ref.table;
            left_column = second_ref.column;
        } else if second_ref.table.as_deref() == Some(right) {
            right_column = second_ref.column;
            left_table = first_ref.table;
            left_column = first_ref.column;
        } else {
            left_table = first_ref.table;
            left_column = first_ref.column;
            right_column = second_ref.column;
        }
    }

    let left_table = left_table.or_else(|| scope.tables.iter().find(|t| *t != right).cloned())?;
    Some(JoinEdge {
        left_table,
        right_table: pending.right_table.clone(),
        join_type: pending.join_type.to_string(),
        left_column,
        right_column,
    })
}

fn join_constraint(op: &JoinOperator) -> Option<&JoinConstraint> {
    match op {
        JoinOperator::Join(c)
        | JoinOperator::Inner(c)
        | JoinOperator::Left(c)
        | JoinOperator::LeftOuter(c)
        | JoinOperator::Right(c)
        | JoinOperator::RightOuter(c)
        | JoinOperator::FullOuter(c) => Some(c),
        _ => None,
    }
}

fn join_type_name(op: &JoinOperator) -> &'static str {
    match op {
        JoinOperator::Left(_) | JoinOperator::LeftOuter(_) => "LEFT",
        JoinOperator::Right(_) | JoinOperator::RightOuter(_) => "RIGHT",
        JoinOperator::FullOuter(_) => "FULL",
        JoinOperator::CrossJoin => "CROSS",
        _ => "INNER",
    }
}

// ─── Names & columns ────────────────────────────────────────────────────────

/// Lower-cased last segment of an object name; `None` for pseudo-tables.
fn table_name(name: &ObjectName) -> Option<String> {
    let full = name.to_string().to_lowercase();
    if PSEUDO_TABLES.contains(&full.as_str()) {
        return None;
    }
    let last = name.0.last()?.as_ident()?.value.to_lowercase();
    if last.is_empty() || PSEUDO_TABLES.contains(&last.as_str()) {
        return None;
    }
    Some(last)
}

fn relation_table(factor: &TableFactor) -> Option<String> {
    match factor {
        TableFactor::Table { name, .. } => table_name(name),
        _ => None,
    }
}

fn raw_columns(expr: &Expr) -> Vec<RawColumn> {
    let mut columns = Vec::new();
    let _ = visit_expressions(expr, |e| {
        match e {
            Expr::Identifier(ident) => columns.push(RawColumn {
                qualifier: None,
                column: ident.value.to_lowercase(),
            }),
            Expr::CompoundIdentifier(parts) if parts.len() >= 2 => {
                let n = parts.len();
                columns.push(RawColumn {
                    qualifier: Some(parts[n - 2].value.to_lowercase()),
                    column: parts[n - 1].value.to_lowercase(),
                });
            }
            _ => {}
        }
        ControlFlow::<()>::Continue(())
    });
    columns
}

/// Qualified columns keep their qualifier even when it names nothing in scope.
fn where_columns(selection: &Expr, scope: &Scope) -> Vec<ColumnRef> {
    raw_columns(selection)
        .into_iter()
        .map(|raw| ColumnRef {
            table: raw
                .qualifier
                .map(|q| scope.resolve(&q).unwrap_or(q)),
            column: raw.column,
        })
        .collect()
}

/// SET target → column owned by its qualifier's table, or the UPDATE target.
fn set_column(name: &ObjectName, scope: &Scope, target: Option<&str>) -> Option<ColumnRef> {
    let parts: Vec<String> = name
        .0
        .iter()
        .filter_map(|part| part.as_ident().map(|ident| ident.value.to_lowercase()))
        .collect();
    let (column, qualifier) = match parts.as_slice() {
        [] => return None,
        [column] => (column.clone(), None),
        [.., qualifier, column] => (column.clone(), Some(qualifier.as_str())),
    };
    let table = qualifier
        .and_then(|q| scope.resolve(q))
        .or_else(|| target.map(str::to_string));
    Some(ColumnRef { table, column })
}
