//! Client-driven WHERE, ORDER BY and pagination for SELECT statements.

use super::select::SelectBuilder;
use crate::allow_list::FieldResolver;
use crate::condition::{DropReason, QueryWhere, translate_as};
use crate::find::{Dropped, FilterLogic, FindManyParams, QueryOrderBy};
use crate::sql::Sql;

fn translate_where(
    condition: &QueryWhere,
    resolver: &impl FieldResolver,
) -> Result<Sql, DropReason> {
    let target = resolver
        .resolve(&condition.field)
        .ok_or(DropReason::UnknownField)?;
    let kind = resolver.kind(&condition.field);
    translate_as(&target, &condition.operator, &condition.value, kind)
}

fn join(parts: Vec<Sql>, separator: &str) -> Sql {
    let mut sql = Sql::new("(");
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            sql.push(separator);
        }
        sql.push_sql(part);
    }
    sql.push(")");
    sql
}

/// Build the client filter clause, or `None` when nothing survives.
///
/// Dropped comparisons leave no trace in the output; a group whose
/// comparisons are all dropped contributes no clause at all.
pub fn filter_clause(
    filters: &[Vec<QueryWhere>],
    resolver: &impl FieldResolver,
    logic: FilterLogic,
    dropped: &mut Dropped,
) -> Option<Sql> {
    let mut translate_group = |group: &[QueryWhere]| -> Vec<Sql> {
        group
            .iter()
            .filter_map(|condition| match translate_where(condition, resolver) {
                Ok(sql) => Some(sql),
                Err(reason) => {
                    dropped.filter(condition, reason);
                    None
                }
            })
            .collect()
    };

    let clause = match logic {
        FilterLogic::Grouped => {
            let groups: Vec<Sql> = filters
                .iter()
                .map(|group| translate_group(group))
                .filter(|group| !group.is_empty())
                .map(|group| join(group, " OR "))
                .collect();
            if groups.is_empty() {
                return None;
            }
            let mut clause = Sql::empty();
            for (i, group) in groups.into_iter().enumerate() {
                if i > 0 {
                    clause.push(" AND ");
                }
                clause.push_sql(group);
            }
            clause
        }
        FilterLogic::All | FilterLogic::Any => {
            let all: Vec<Sql> = filters
                .iter()
                .flat_map(|group| translate_group(group))
                .collect();
            if all.is_empty() {
                return None;
            }
            let separator = if logic == FilterLogic::All { " AND " } else { " OR " };
            join(all, separator)
        }
    };
    Some(clause)
}

/// AND the client filter clause onto `select`.
pub fn apply_filters(
    select: &mut SelectBuilder,
    filters: &[Vec<QueryWhere>],
    resolver: &impl FieldResolver,
    logic: FilterLogic,
) -> Dropped {
    let mut dropped = Dropped::default();
    if let Some(clause) = filter_clause(filters, resolver, logic, &mut dropped) {
        select.and_where(clause);
    }
    dropped
}

/// Append one ORDER BY term per resolvable sorter, in request order.
pub fn apply_sorters(
    select: &mut SelectBuilder,
    sorters: &[QueryOrderBy],
    resolver: &impl FieldResolver,
) -> Dropped {
    let mut dropped = Dropped::default();
    for sorter in sorters {
        match resolver.resolve(&sorter.field) {
            Some(expr) => {
                select.order_by(&expr, sorter.desc);
            }
            None => dropped.sorter(sorter),
        }
    }
    dropped
}

/// Emit LIMIT/OFFSET only for the values that are set.
pub fn apply_limit_offset(select: &mut SelectBuilder, limit: Option<u64>, offset: Option<u64>) {
    if let Some(limit) = limit {
        select.limit(limit);
    }
    if let Some(offset) = offset {
        select.offset(offset);
    }
}

/// Apply filters, sorters and pagination of a find-many request.
pub fn apply_find_many(
    select: &mut SelectBuilder,
    params: &FindManyParams,
    filters: &impl FieldResolver,
    sorters: &impl FieldResolver,
) -> Dropped {
    let mut dropped = apply_filters(select, &params.filters, filters, params.logic());
    dropped.extend(apply_sorters(select, &params.sorters, sorters));
    apply_limit_offset(select, params.limit, params.offset);
    dropped
}
