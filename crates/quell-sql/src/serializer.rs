//! SQL serialization.
//!
//! [`Serializer`] is a visitor over [`Expression`] trees and
//! [`QueryMetadata`] records, driven by a dialect profile. It owns an
//! output buffer and an ordered binding list for the duration of one
//! serialization; bindings appear in the exact left-to-right order of
//! their placeholders in the final SQL, including constants contributed by
//! nested subqueries.
//!
//! A serializer instance is single-use: construct, call
//! [`serialize`](Serializer::serialize) or [`handle`](Serializer::handle),
//! then take the output with [`finish`](Serializer::finish). A failed call
//! leaves no partial SQL visible to the caller because the buffer is only
//! surfaced through `finish`.

use crate::dialects::{FunctionWrap, LimitStyle, SqlTemplates};
use crate::templates::{precedence, TemplateElement};
use quell_core::expressions::{Constant, Operation, Param, Path};
use quell_core::{
    Error, Expression, ExprType, FlagPosition, Join, JoinType, Op, OrderSpecifier, QueryMetadata,
    QueryModifiers, Result, SetOperation, Value,
};

/// One bound slot of a serialized query, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// A constant value, ready for prepared-statement binding
    Const(Value),
    /// A named marker to be resolved by the caller before execution
    Param(Param),
}

/// The output of one serialization: SQL text plus its ordered bindings.
#[derive(Debug, Clone)]
pub struct Serialized {
    pub sql: String,
    pub bindings: Vec<Binding>,
}

impl Serialized {
    /// The constant values, in placeholder order, skipping named markers.
    pub fn constants(&self) -> Vec<&Value> {
        self.bindings
            .iter()
            .filter_map(|b| match b {
                Binding::Const(v) => Some(v),
                Binding::Param(_) => None,
            })
            .collect()
    }

    /// Resolve every binding to a value, looking named markers up in
    /// `params`. An unresolved marker is a malformed query.
    pub fn bind(&self, params: &[(Param, Value)]) -> Result<Vec<Value>> {
        self.bindings
            .iter()
            .map(|binding| match binding {
                Binding::Const(v) => Ok(v.clone()),
                Binding::Param(p) => params
                    .iter()
                    .find(|(candidate, _)| candidate == p)
                    .map(|(_, v)| v.clone())
                    .ok_or_else(|| {
                        Error::malformed(format!("no value bound for param {}", p.name))
                    }),
            })
            .collect()
    }
}

/// Serializes expression trees and query metadata to SQL for one dialect.
pub struct Serializer<'a> {
    templates: &'a SqlTemplates,
    buffer: String,
    bindings: Vec<Binding>,
    in_aggregate: bool,
}

impl<'a> Serializer<'a> {
    pub fn new(templates: &'a SqlTemplates) -> Self {
        Serializer {
            templates,
            buffer: String::new(),
            bindings: Vec::new(),
            in_aggregate: false,
        }
    }

    /// Take the serialized output.
    pub fn finish(self) -> Serialized {
        Serialized {
            sql: self.buffer,
            bindings: self.bindings,
        }
    }

    /// Serialize a whole query.
    ///
    /// With `for_count_row`, the projection is replaced by a count form and
    /// paging modifiers are dropped. An empty projection serializes without
    /// a SELECT clause; callers that require a projection enforce that
    /// before invoking.
    pub fn serialize(&mut self, metadata: &QueryMetadata, for_count_row: bool) -> Result<()> {
        if let Some(set_op) = metadata.set_op() {
            return self.serialize_set_op(set_op, metadata);
        }

        // Clause separators are only emitted after this query has produced
        // output of its own, so a nested subquery never leads with one.
        let clause_start = self.buffer.len();
        self.serialize_with_prelude(metadata)?;
        for flag in metadata.flags_at(FlagPosition::Start) {
            self.handle(&flag.flag)?;
        }

        if for_count_row {
            self.serialize_count_projection(metadata)?;
        } else if !metadata.projection().is_empty() {
            self.append("select ");
            if metadata.is_distinct() {
                self.append("distinct ");
            }
            if self.templates.limit_style == LimitStyle::Top {
                if let Some(limit) = metadata.modifiers().limit {
                    self.append(&format!("top {} ", limit));
                }
            }
            for (i, expr) in metadata.projection().iter().enumerate() {
                if i > 0 {
                    self.append(", ");
                }
                self.serialize_projection_item(expr)?;
            }
        }
        for flag in metadata.flags_at(FlagPosition::AfterProjection) {
            self.handle(&flag.flag)?;
        }

        self.serialize_sources(metadata.joins(), clause_start)?;

        for flag in metadata.flags_at(FlagPosition::BeforeFilters) {
            self.handle(&flag.flag)?;
        }
        if let Some(predicate) = metadata.where_clause() {
            self.separator();
            self.append("where ");
            self.handle(predicate)?;
        }
        for flag in metadata.flags_at(FlagPosition::AfterFilters) {
            self.handle(&flag.flag)?;
        }

        if !metadata.group_by().is_empty() {
            self.separator();
            self.append("group by ");
            for (i, expr) in metadata.group_by().iter().enumerate() {
                if i > 0 {
                    self.append(", ");
                }
                self.handle(expr)?;
            }
        }
        if let Some(predicate) = metadata.having() {
            if metadata.group_by().is_empty() {
                return Err(Error::malformed("having without group by"));
            }
            self.separator();
            self.append("having ");
            self.handle(predicate)?;
        }

        for flag in metadata.flags_at(FlagPosition::BeforeOrder) {
            self.handle(&flag.flag)?;
        }
        self.serialize_order_by(metadata.order_by())?;

        if !for_count_row && metadata.modifiers().is_restricting() {
            self.serialize_modifiers(metadata.modifiers())?;
        }

        for flag in metadata.flags_at(FlagPosition::End) {
            self.handle(&flag.flag)?;
        }
        Ok(())
    }

    /// Serialize one standalone expression.
    pub fn handle(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Path(p) => {
                self.visit_path(p);
                Ok(())
            }
            Expression::Constant(c) => self.visit_constant(c),
            Expression::Param(p) => {
                self.placeholder();
                self.bindings.push(Binding::Param(p.clone()));
                Ok(())
            }
            Expression::Operation(o) => self.visit_operation(o),
            Expression::Template(t) => {
                for part in &t.parts {
                    match part {
                        quell_core::TemplatePart::Static(s) => self.append(s),
                        quell_core::TemplatePart::Arg(i) => {
                            if let Some(arg) = t.args.get(*i) {
                                self.handle(arg)?;
                            }
                        }
                    }
                }
                Ok(())
            }
            Expression::SubQuery(s) => {
                self.append("(");
                self.serialize(&s.metadata, false)?;
                self.append(")");
                Ok(())
            }
            Expression::Alias(a) => {
                self.handle(&a.this)?;
                self.append(" as ");
                let alias = self.templates.quote(&a.alias);
                self.append(&alias);
                Ok(())
            }
        }
    }

    // -- clause helpers -----------------------------------------------------

    fn serialize_with_prelude(&mut self, metadata: &QueryMetadata) -> Result<()> {
        let with_flags: Vec<_> = metadata.flags_at(FlagPosition::With).collect();
        if with_flags.is_empty() {
            return Ok(());
        }
        self.append("with ");
        for (i, flag) in with_flags.iter().enumerate() {
            if i > 0 {
                self.append(", ");
            }
            self.handle(&flag.flag)?;
        }
        self.separator();
        Ok(())
    }

    fn serialize_count_projection(&mut self, metadata: &QueryMetadata) -> Result<()> {
        let projection = metadata.projection();
        let plain_multi_column =
            projection.len() > 1 && !projection.iter().any(Expression::is_aggregate);
        let wrap = plain_multi_column
            || (self.templates.count_via_subquery
                && (metadata.is_distinct() || projection.len() > 1));
        if wrap {
            self.append("select count(*) from (");
            let mut inner = metadata.clone();
            inner.clear_order_by();
            inner.clear_modifiers();
            self.serialize(&inner, false)?;
            self.append(")");
            return Ok(());
        }

        self.append("select ");
        match projection {
            [] => self.append("count(*)"),
            [single] if single.is_star() => self.append("count(*)"),
            [single] => {
                if metadata.is_distinct() {
                    self.append("count(distinct ");
                } else {
                    self.append("count(");
                }
                self.handle(single)?;
                self.append(")");
            }
            _ => self.append("count(*)"),
        }
        Ok(())
    }

    fn serialize_projection_item(&mut self, expr: &Expression) -> Result<()> {
        let needs_case_wrap = !self.templates.select_boolean_literals
            && expr.ty() == ExprType::Bool
            && matches!(expr, Expression::Operation(_));
        if needs_case_wrap {
            self.append("case when ");
            self.handle(expr)?;
            self.append(" then 1 else 0 end");
        } else {
            self.handle(expr)?;
        }
        Ok(())
    }

    fn serialize_sources(&mut self, joins: &[Join], clause_start: usize) -> Result<()> {
        for (i, join) in joins.iter().enumerate() {
            if i == 0 {
                if self.buffer.len() > clause_start {
                    self.separator();
                }
                self.append("from ");
            } else if join.kind == JoinType::Default {
                self.append(", ");
            } else {
                self.separator();
                self.append(SqlTemplates::join_keyword(join.kind));
                self.append(" ");
            }
            self.serialize_join_target(&join.target)?;
            if let Some(condition) = &join.condition {
                self.separator();
                self.append("on ");
                self.handle(condition)?;
            }
        }
        Ok(())
    }

    fn serialize_join_target(&mut self, target: &Expression) -> Result<()> {
        match target {
            Expression::Path(p) if p.relation.is_some() => {
                self.visit_entity_root(p, p.root());
                Ok(())
            }
            Expression::Alias(a) => match &a.this {
                Expression::Path(p) if p.relation.is_some() => {
                    self.visit_entity_root(p, &a.alias);
                    Ok(())
                }
                inner @ Expression::Template(_) => {
                    self.serialize_function_target(inner)?;
                    self.append(" as ");
                    let alias = self.templates.quote(&a.alias);
                    self.append(&alias);
                    Ok(())
                }
                inner => {
                    self.handle(inner)?;
                    self.append(" as ");
                    let alias = self.templates.quote(&a.alias);
                    self.append(&alias);
                    Ok(())
                }
            },
            target @ Expression::Template(_) => self.serialize_function_target(target),
            other => self.handle(other),
        }
    }

    fn visit_entity_root(&mut self, path: &Path, variable: &str) {
        // relation presence is guaranteed by the caller's match
        let relation = path.relation.as_deref().unwrap_or_else(|| path.root());
        let quoted = self.templates.quote(relation);
        self.append(&quoted);
        self.append(" ");
        let variable = self.templates.quote(variable);
        self.append(&variable);
    }

    fn serialize_function_target(&mut self, target: &Expression) -> Result<()> {
        if self.templates.function_wrap == FunctionWrap::Table {
            self.append("table(");
            self.handle(target)?;
            self.append(")");
        } else {
            self.handle(target)?;
        }
        Ok(())
    }

    fn serialize_order_by(&mut self, specs: &[OrderSpecifier]) -> Result<()> {
        if specs.is_empty() {
            return Ok(());
        }
        self.separator();
        self.append("order by ");
        for (i, spec) in specs.iter().enumerate() {
            if i > 0 {
                self.append(", ");
            }
            self.handle(&spec.target)?;
            self.append(match spec.order {
                quell_core::Order::Asc => " asc",
                quell_core::Order::Desc => " desc",
            });
            if let Some(nulls) = spec.nulls {
                if self.templates.nulls_ordering {
                    self.append(match nulls {
                        quell_core::NullHandling::NullsFirst => " nulls first",
                        quell_core::NullHandling::NullsLast => " nulls last",
                    });
                } else {
                    tracing::debug!("null ordering not supported by dialect, omitted");
                }
            }
        }
        Ok(())
    }

    fn serialize_modifiers(&mut self, modifiers: QueryModifiers) -> Result<()> {
        match self.templates.limit_style {
            LimitStyle::LimitOffset => {
                if let Some(limit) = modifiers.limit {
                    self.separator();
                    self.append(&format!("limit {}", limit));
                }
                if let Some(offset) = modifiers.offset {
                    self.separator();
                    self.append(&format!("offset {}", offset));
                }
            }
            LimitStyle::OffsetFetch => {
                self.separator();
                match (modifiers.offset, modifiers.limit) {
                    (Some(offset), Some(limit)) => self.append(&format!(
                        "offset {} rows fetch next {} rows only",
                        offset, limit
                    )),
                    (Some(offset), None) => self.append(&format!("offset {} rows", offset)),
                    (None, Some(limit)) => {
                        self.append(&format!("fetch first {} rows only", limit))
                    }
                    (None, None) => {}
                }
            }
            LimitStyle::Top => {
                // the limit was already emitted as a top prefix
                if modifiers.offset.is_some() {
                    return Err(Error::malformed(
                        "offset is not supported with top-style paging",
                    ));
                }
            }
        }
        Ok(())
    }

    fn serialize_set_op(&mut self, set_op: &SetOperation, outer: &QueryMetadata) -> Result<()> {
        let keyword = SqlTemplates::set_op_keyword(set_op.kind);
        for (i, child) in set_op.operands.iter().enumerate() {
            if i > 0 {
                self.separator();
                self.append(keyword);
                self.separator();
            }
            if self.templates.parenthesize_set_operands {
                self.append("(");
                self.serialize(child, false)?;
                self.append(")");
            } else {
                self.serialize(child, false)?;
            }
        }
        self.serialize_order_by(outer.order_by())?;
        if outer.modifiers().is_restricting() {
            self.serialize_modifiers(outer.modifiers())?;
        }
        Ok(())
    }

    // -- expression visitors ------------------------------------------------

    fn visit_path(&mut self, path: &Path) {
        for (i, segment) in path.segments.iter().enumerate() {
            if i > 0 {
                self.append(".");
            }
            let quoted = self.templates.quote(segment);
            self.append(&quoted);
        }
    }

    fn visit_constant(&mut self, constant: &Constant) -> Result<()> {
        match &constant.value {
            Value::List(items) => {
                if items.is_empty() {
                    return Err(Error::unsupported_constant("empty collection"));
                }
                if let Some(max) = self.templates.max_in_list {
                    if items.len() > max {
                        return Err(Error::unsupported_constant(format!(
                            "collection of {} items exceeds the in-list limit of {}",
                            items.len(),
                            max
                        )));
                    }
                }
                self.append("(");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.append(", ");
                    }
                    self.placeholder();
                    self.bindings.push(Binding::Const(item.clone()));
                }
                self.append(")");
                Ok(())
            }
            value => {
                self.placeholder();
                self.bindings.push(Binding::Const(value.clone()));
                Ok(())
            }
        }
    }

    fn visit_operation(&mut self, operation: &Operation) -> Result<()> {
        let op = operation.op;
        if matches!(
            op,
            Op::StartsWith
                | Op::StartsWithIc
                | Op::EndsWith
                | Op::EndsWithIc
                | Op::StringContains
                | Op::StringContainsIc
        ) {
            return self.serialize_like(op, &operation.args);
        }
        if op == Op::List {
            for (i, arg) in operation.args.iter().enumerate() {
                if i > 0 {
                    self.append(", ");
                }
                self.handle(arg)?;
            }
            return Ok(());
        }

        if op.is_aggregate() && self.in_aggregate {
            return Err(Error::malformed("aggregate functions cannot be nested"));
        }
        // Tie the template borrow to the profile, not to &mut self
        let templates: &'a SqlTemplates = self.templates;
        let template = templates.template(op)?;
        let outer_precedence = precedence(op);

        let was_in_aggregate = self.in_aggregate;
        if op.is_aggregate() {
            self.in_aggregate = true;
        }
        for element in template.elements() {
            match element {
                TemplateElement::Static(text) => self.append(text),
                TemplateElement::Arg(i) => {
                    let arg = operation.args.get(*i).ok_or_else(|| {
                        Error::malformed(format!(
                            "template for {} references missing argument {}",
                            op.name(),
                            i
                        ))
                    })?;
                    self.handle_with_precedence(arg, outer_precedence)?;
                }
                TemplateElement::AsString(i) => {
                    let arg = operation.args.get(*i).ok_or_else(|| {
                        Error::malformed(format!(
                            "template for {} references missing argument {}",
                            op.name(),
                            i
                        ))
                    })?;
                    self.append_as_string(arg)?;
                }
            }
        }
        self.in_aggregate = was_in_aggregate;
        Ok(())
    }

    fn handle_with_precedence(&mut self, arg: &Expression, outer: i32) -> Result<()> {
        let needs_parens = outer > -1
            && matches!(arg, Expression::Operation(o) if precedence(o.op) > outer);
        if needs_parens {
            self.append("(");
            self.handle(arg)?;
            self.append(")");
            Ok(())
        } else {
            self.handle(arg)
        }
    }

    /// Render a constant argument inline as literal text (`{0s}` holes).
    fn append_as_string(&mut self, arg: &Expression) -> Result<()> {
        match arg {
            Expression::Constant(c) => {
                self.append(&c.value.to_string());
                Ok(())
            }
            other => self.handle(other),
        }
    }

    /// Rewrite the starts-with family to a LIKE with an escaped pattern.
    fn serialize_like(&mut self, op: Op, args: &[Expression]) -> Result<()> {
        let (lhs, rhs) = match args {
            [lhs, rhs] => (lhs, rhs),
            _ => {
                return Err(Error::malformed(format!(
                    "{} takes 2 arguments, got {}",
                    op.name(),
                    args.len()
                )))
            }
        };
        let ignore_case = matches!(
            op,
            Op::StartsWithIc | Op::EndsWithIc | Op::StringContainsIc
        );
        let lhs = if ignore_case { lhs.lower() } else { lhs.clone() };
        let rhs = match rhs {
            Expression::Constant(c) => {
                let text = match &c.value {
                    Value::Str(s) => s,
                    other => {
                        return Err(Error::unsupported_constant(format!(
                            "like pattern must be a string, got {}",
                            other
                        )))
                    }
                };
                let escaped = escape_like(text, self.templates.like_escape());
                let pattern = match op {
                    Op::StartsWith | Op::StartsWithIc => format!("{}%", escaped),
                    Op::EndsWith | Op::EndsWithIc => format!("%{}", escaped),
                    _ => format!("%{}%", escaped),
                };
                let pattern = if ignore_case {
                    pattern.to_lowercase()
                } else {
                    pattern
                };
                Expression::string(pattern)
            }
            dynamic => {
                // No escaping is possible for a dynamic pattern; wildcards
                // are concatenated around it.
                let base = if ignore_case {
                    dynamic.lower()
                } else {
                    dynamic.clone()
                };
                let percent = Expression::string("%");
                match op {
                    Op::StartsWith | Op::StartsWithIc => base.concat(percent),
                    Op::EndsWith | Op::EndsWithIc => percent.concat(base),
                    _ => Expression::string("%").concat(base).concat(percent),
                }
            }
        };
        let like = Operation {
            op: Op::Like,
            ty: ExprType::Bool,
            args: vec![lhs, rhs],
        };
        self.visit_operation(&like)
    }

    // -- buffer helpers -----------------------------------------------------

    fn append(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn placeholder(&mut self) {
        let templates = self.templates;
        self.buffer.push_str(&templates.placeholder);
    }

    fn separator(&mut self) {
        let templates = self.templates;
        self.buffer.push_str(templates.separator());
    }

}

/// Escape LIKE wildcards (`%`, `_`) and the escape character itself in a
/// user-supplied fragment.
fn escape_like(text: &str, escape: char) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '%' || c == '_' || c == escape {
            out.push(escape);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_prefixes_wildcards() {
        assert_eq!(escape_like("a%b_c", '\\'), "a\\%b\\_c");
        assert_eq!(escape_like("a\\b", '\\'), "a\\\\b");
        assert_eq!(escape_like("plain", '\\'), "plain");
    }
}
