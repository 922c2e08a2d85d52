use std::sync::Arc;

use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use super::conditionals::ConditionEvaluator;
use super::context::NormalizationContext;
use super::field::DeferExecution;
use crate::ast::{Field, FragmentSpread, InlineFragment, Selection, SelectionSet};

/// A field occurrence found while flattening a selection set.
#[derive(Debug, Clone)]
pub struct CollectedField {
    pub field: Arc<Field>,
    /// Concrete object types the occurrence applies to. Never empty.
    pub object_types: IndexSet<String>,
    /// The type the enclosing selection set was written against: the innermost
    /// type condition, or the output type of the parent field.
    pub ast_type_condition: String,
    pub defer: Option<DeferExecution>,
}

/// Identifies an AST field reached for a set of object types.
type CollectedKey = (usize, Vec<String>);

/// Flattens selection sets through inline fragments and fragment spreads,
/// narrowing the possible object types on the way down.
///
/// Each AST field is collected once per set of object types, however often
/// it is reached. A fragment spread into the same types twice is skipped.
pub struct FieldCollector<'a, 'c> {
    ctx: &'c NormalizationContext<'a>,
    conditions: &'c mut ConditionEvaluator<'a>,
    /// Position in the result of every field collected so far.
    collected: FxHashMap<CollectedKey, usize>,
    visited_spreads: FxHashSet<(String, Vec<String>, Option<DeferExecution>)>,
}

impl<'a, 'c> FieldCollector<'a, 'c> {
    pub(crate) fn new(
        ctx: &'c NormalizationContext<'a>,
        conditions: &'c mut ConditionEvaluator<'a>,
    ) -> Self {
        Self {
            ctx,
            conditions,
            collected: FxHashMap::default(),
            visited_spreads: FxHashSet::default(),
        }
    }

    pub fn collect(
        &mut self,
        selection_set: &SelectionSet,
        possible_types: &IndexSet<String>,
        ast_type_condition: &str,
    ) -> Vec<CollectedField> {
        let mut result = vec![];
        self.collect_into(selection_set, possible_types, ast_type_condition, None, &mut result);
        result
    }

    /// Appends to `result`, which must only ever be filled by this collector.
    pub(crate) fn collect_into(
        &mut self,
        selection_set: &SelectionSet,
        possible_types: &IndexSet<String>,
        ast_type_condition: &str,
        defer: Option<&DeferExecution>,
        result: &mut Vec<CollectedField>,
    ) {
        for selection in &selection_set.items {
            match selection {
                Selection::Field(field) => {
                    self.collect_field(field, possible_types, ast_type_condition, defer, result)
                }
                Selection::InlineFragment(fragment) => self.collect_inline_fragment(
                    fragment,
                    possible_types,
                    ast_type_condition,
                    defer,
                    result,
                ),
                Selection::FragmentSpread(spread) => {
                    self.collect_fragment_spread(spread, possible_types, defer, result)
                }
            }
        }
    }

    fn collect_field(
        &mut self,
        field: &Arc<Field>,
        possible_types: &IndexSet<String>,
        ast_type_condition: &str,
        defer: Option<&DeferExecution>,
        result: &mut Vec<CollectedField>,
    ) {
        if !self.conditions.should_include(&field.directives) {
            return;
        }
        if possible_types.is_empty() {
            return;
        }

        let key: CollectedKey = (
            Arc::as_ptr(field) as usize,
            possible_types.iter().cloned().collect(),
        );
        if let Some(index) = self.collected.get(&key) {
            // a non-deferred occurrence wins over a deferred one
            if defer.is_none() {
                result[*index].defer = None;
            }
            return;
        }
        self.collected.insert(key, result.len());

        result.push(CollectedField {
            field: field.clone(),
            object_types: possible_types.clone(),
            ast_type_condition: ast_type_condition.to_string(),
            defer: defer.cloned(),
        });
    }

    fn collect_inline_fragment(
        &mut self,
        fragment: &InlineFragment,
        possible_types: &IndexSet<String>,
        ast_type_condition: &str,
        defer: Option<&DeferExecution>,
        result: &mut Vec<CollectedField>,
    ) {
        if !self.conditions.should_include(&fragment.directives) {
            return;
        }
        let defer = self.defer_for(&fragment.directives, defer);

        match &fragment.type_condition {
            Some(type_condition) => {
                let Some(narrowed) = self.narrow(possible_types, type_condition) else {
                    return;
                };
                self.collect_into(
                    &fragment.selection_set,
                    &narrowed,
                    type_condition,
                    defer.as_ref(),
                    result,
                );
            }
            None => self.collect_into(
                &fragment.selection_set,
                possible_types,
                ast_type_condition,
                defer.as_ref(),
                result,
            ),
        }
    }

    fn collect_fragment_spread(
        &mut self,
        spread: &FragmentSpread,
        possible_types: &IndexSet<String>,
        defer: Option<&DeferExecution>,
        result: &mut Vec<CollectedField>,
    ) {
        if !self.conditions.should_include(&spread.directives) {
            return;
        }
        let ctx = self.ctx;
        let definition = ctx
            .fragments
            .get(spread.fragment_name.as_str())
            .unwrap_or_else(|| panic!("fragment '{}' is not defined", spread.fragment_name));
        if !self.conditions.should_include(&definition.directives) {
            return;
        }
        let defer = self.defer_for(&spread.directives, defer);

        let Some(narrowed) = self.narrow(possible_types, &definition.type_condition) else {
            return;
        };
        let visit = (
            spread.fragment_name.clone(),
            narrowed.iter().cloned().collect(),
            defer.clone(),
        );
        if !self.visited_spreads.insert(visit) {
            trace!(fragment = %spread.fragment_name, "fragment already collected");
            return;
        }
        self.collect_into(
            &definition.selection_set,
            &narrowed,
            &definition.type_condition,
            defer.as_ref(),
            result,
        );
    }

    fn defer_for(
        &self,
        directives: &[Arc<crate::ast::Directive>],
        outer: Option<&DeferExecution>,
    ) -> Option<DeferExecution> {
        if !self.ctx.config.defer_support {
            return None;
        }
        self.conditions
            .defer_execution(directives)
            .or_else(|| outer.cloned())
    }

    /// `None` when no object type survives the type condition.
    fn narrow(
        &self,
        current: &IndexSet<String>,
        type_condition: &str,
    ) -> Option<IndexSet<String>> {
        let resolved = self.ctx.schema.possible_object_types(type_condition);
        let narrowed = if current.is_empty() {
            resolved
        } else {
            current
                .iter()
                .filter(|t| resolved.contains(*t))
                .cloned()
                .collect()
        };

        if narrowed.is_empty() {
            trace!(type_condition, "type condition matches no possible type, branch pruned");
            return None;
        }
        Some(narrowed)
    }
}
