use std::{fmt::Display, sync::Arc};

use super::node::{
    Argument, Definition, Directive, Document, Field, FragmentDefinition, FragmentSpread,
    InlineFragment, Node, OperationDefinition, Selection, SelectionSet, VariableDefinition,
};
use super::type_node::TypeNode;
use super::value::{ObjectField, Value};
use super::visitor::NodeVisitor;
use crate::utils::pretty_display::get_indent;

#[derive(Default)]
pub struct PrintContext {
    pub out: String,
    pub depth: usize,
}

/// Renders nodes as GraphQL text, two spaces per nesting level.
pub struct Printer;

impl Printer {
    pub fn print(node: &Node) -> String {
        let mut ctx = PrintContext::default();
        node.accept(&mut Printer, &mut ctx);
        ctx.out
    }

    fn directives(&mut self, directives: &[Arc<Directive>], ctx: &mut PrintContext) {
        for directive in directives {
            ctx.out.push(' ');
            self.visit_directive(directive, ctx);
        }
    }

    fn arguments(&mut self, arguments: &[Arc<Argument>], ctx: &mut PrintContext) {
        if arguments.is_empty() {
            return;
        }
        ctx.out.push('(');
        for (i, argument) in arguments.iter().enumerate() {
            if i > 0 {
                ctx.out.push_str(", ");
            }
            self.visit_argument(argument, ctx);
        }
        ctx.out.push(')');
    }
}

impl NodeVisitor<PrintContext> for Printer {
    type Output = ();

    fn visit_node(&mut self, node: &Node, _ctx: &mut PrintContext) {
        unreachable!("printer has no case for node kind '{}'", node.kind_name())
    }

    fn visit_document(&mut self, node: &Arc<Document>, ctx: &mut PrintContext) {
        for (i, definition) in node.definitions.iter().enumerate() {
            if i > 0 {
                ctx.out.push('\n');
            }
            match definition {
                Definition::Operation(op) => self.visit_operation_definition(op, ctx),
                Definition::Fragment(f) => self.visit_fragment_definition(f, ctx),
            }
            ctx.out.push('\n');
        }
    }

    fn visit_operation_definition(
        &mut self,
        node: &Arc<OperationDefinition>,
        ctx: &mut PrintContext,
    ) {
        ctx.out.push_str(&node.kind.to_string());
        if let Some(name) = &node.name {
            ctx.out.push(' ');
            ctx.out.push_str(name);
        }
        if !node.variable_definitions.is_empty() {
            ctx.out.push('(');
            for (i, var) in node.variable_definitions.iter().enumerate() {
                if i > 0 {
                    ctx.out.push_str(", ");
                }
                self.visit_variable_definition(var, ctx);
            }
            ctx.out.push(')');
        }
        self.directives(&node.directives, ctx);
        ctx.out.push(' ');
        self.visit_selection_set(&node.selection_set, ctx);
    }

    fn visit_fragment_definition(
        &mut self,
        node: &Arc<FragmentDefinition>,
        ctx: &mut PrintContext,
    ) {
        ctx.out.push_str("fragment ");
        ctx.out.push_str(&node.name);
        ctx.out.push_str(" on ");
        ctx.out.push_str(&node.type_condition);
        self.directives(&node.directives, ctx);
        ctx.out.push(' ');
        self.visit_selection_set(&node.selection_set, ctx);
    }

    fn visit_variable_definition(
        &mut self,
        node: &Arc<VariableDefinition>,
        ctx: &mut PrintContext,
    ) {
        ctx.out.push('$');
        ctx.out.push_str(&node.name);
        ctx.out.push_str(": ");
        self.visit_type(&Arc::new(node.var_type.clone()), ctx);
        if let Some(default_value) = &node.default_value {
            ctx.out.push_str(" = ");
            self.visit_value(&Arc::new(default_value.clone()), ctx);
        }
        self.directives(&node.directives, ctx);
    }

    fn visit_selection_set(&mut self, node: &Arc<SelectionSet>, ctx: &mut PrintContext) {
        if node.items.is_empty() {
            ctx.out.push_str("{}");
            return;
        }
        ctx.out.push_str("{\n");
        ctx.depth += 1;
        for item in &node.items {
            ctx.out.push_str(&get_indent(ctx.depth));
            match item {
                Selection::Field(f) => self.visit_field(f, ctx),
                Selection::FragmentSpread(s) => self.visit_fragment_spread(s, ctx),
                Selection::InlineFragment(i) => self.visit_inline_fragment(i, ctx),
            }
            ctx.out.push('\n');
        }
        ctx.depth -= 1;
        ctx.out.push_str(&get_indent(ctx.depth));
        ctx.out.push('}');
    }

    fn visit_field(&mut self, node: &Arc<Field>, ctx: &mut PrintContext) {
        if let Some(alias) = &node.alias {
            ctx.out.push_str(alias);
            ctx.out.push_str(": ");
        }
        ctx.out.push_str(&node.name);
        self.arguments(&node.arguments, ctx);
        self.directives(&node.directives, ctx);
        if let Some(selection_set) = &node.selection_set {
            ctx.out.push(' ');
            self.visit_selection_set(selection_set, ctx);
        }
    }

    fn visit_fragment_spread(&mut self, node: &Arc<FragmentSpread>, ctx: &mut PrintContext) {
        ctx.out.push_str("...");
        ctx.out.push_str(&node.fragment_name);
        self.directives(&node.directives, ctx);
    }

    fn visit_inline_fragment(&mut self, node: &Arc<InlineFragment>, ctx: &mut PrintContext) {
        ctx.out.push_str("...");
        if let Some(type_condition) = &node.type_condition {
            ctx.out.push_str(" on ");
            ctx.out.push_str(type_condition);
        }
        self.directives(&node.directives, ctx);
        ctx.out.push(' ');
        self.visit_selection_set(&node.selection_set, ctx);
    }

    fn visit_argument(&mut self, node: &Arc<Argument>, ctx: &mut PrintContext) {
        ctx.out.push_str(&node.name);
        ctx.out.push_str(": ");
        ctx.out.push_str(&node.value.to_string());
    }

    fn visit_directive(&mut self, node: &Arc<Directive>, ctx: &mut PrintContext) {
        ctx.out.push('@');
        ctx.out.push_str(&node.name);
        self.arguments(&node.arguments, ctx);
    }

    fn visit_type(&mut self, node: &Arc<TypeNode>, ctx: &mut PrintContext) {
        ctx.out.push_str(&node.to_string());
    }

    fn visit_value(&mut self, node: &Arc<Value>, ctx: &mut PrintContext) {
        ctx.out.push_str(&node.to_string());
    }

    fn visit_object_field(&mut self, node: &Arc<ObjectField>, ctx: &mut PrintContext) {
        ctx.out.push_str(&node.name);
        ctx.out.push_str(": ");
        ctx.out.push_str(&node.value.to_string());
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Printer::print(self))
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ctx = PrintContext::default();
        Printer.visit_document(&Arc::new(self.clone()), &mut ctx);
        write!(f, "{}", ctx.out)
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::parsing::parse_operation;

    #[test]
    fn prints_documents() {
        let document = parse_operation(
            r#"
            query Q($id: ID! = "a", $n: [Int]) @live { a: node(id: $id, n: [1, 2]) @include(if: true) { id ... on Dog @defer(label: "d") { barks } ...F } }
            fragment F on Node { id }
            "#,
        );

        insta::assert_snapshot!(document.to_string(), @r#"
        query Q($id: ID! = "a", $n: [Int]) @live {
          a: node(id: $id, n: [1, 2]) @include(if: true) {
            id
            ... on Dog @defer(label: "d") {
              barks
            }
            ...F
          }
        }

        fragment F on Node {
          id
        }
        "#);
    }
}
