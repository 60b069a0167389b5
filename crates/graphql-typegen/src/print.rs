//! Canonical, whitespace-free printing of executable definitions.
//!
//! Two definitions with the same name are considered duplicates of each
//! other exactly when their canonical prints match, so the printer keeps
//! argument and selection order from the source and normalizes nothing but
//! whitespace.

use async_graphql_parser::{types as ast, Positioned};
use async_graphql_value::{Name, Value};
use std::fmt::Write;

pub(crate) fn print_fragment(name: &str, fragment: &ast::FragmentDefinition) -> String {
    let mut out = String::new();
    write!(out, "fragment {name} on {}", fragment.type_condition.node.on.node).unwrap();
    write_directives(&mut out, &fragment.directives);
    write_selection_set(&mut out, &fragment.selection_set.node);
    out
}

pub(crate) fn print_operation(name: Option<&str>, operation: &ast::OperationDefinition) -> String {
    let mut out = String::new();
    let ty = match operation.ty {
        ast::OperationType::Query => "query",
        ast::OperationType::Mutation => "mutation",
        ast::OperationType::Subscription => "subscription",
    };
    out.push_str(ty);
    if let Some(name) = name {
        write!(out, " {name}").unwrap();
    }
    if !operation.variable_definitions.is_empty() {
        out.push('(');
        for (idx, variable) in operation.variable_definitions.iter().enumerate() {
            if idx > 0 {
                out.push(',');
            }
            write!(out, "${}:{}", variable.node.name.node, variable.node.var_type.node).unwrap();
            if let Some(default) = &variable.node.default_value {
                write!(out, "={}", default.node).unwrap();
            }
        }
        out.push(')');
    }
    write_directives(&mut out, &operation.directives);
    write_selection_set(&mut out, &operation.selection_set.node);
    out
}

fn write_selection_set(out: &mut String, selection_set: &ast::SelectionSet) {
    out.push('{');
    for (idx, selection) in selection_set.items.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        match &selection.node {
            ast::Selection::Field(field) => {
                let field = &field.node;
                if let Some(alias) = &field.alias {
                    write!(out, "{}:", alias.node).unwrap();
                }
                out.push_str(field.name.node.as_str());
                write_arguments(out, &field.arguments);
                write_directives(out, &field.directives);
                if !field.selection_set.node.items.is_empty() {
                    write_selection_set(out, &field.selection_set.node);
                }
            }
            ast::Selection::FragmentSpread(spread) => {
                write!(out, "...{}", spread.node.fragment_name.node).unwrap();
                write_directives(out, &spread.node.directives);
            }
            ast::Selection::InlineFragment(inline) => {
                out.push_str("...");
                if let Some(condition) = &inline.node.type_condition {
                    write!(out, "on {}", condition.node.on.node).unwrap();
                }
                write_directives(out, &inline.node.directives);
                write_selection_set(out, &inline.node.selection_set.node);
            }
        }
    }
    out.push('}');
}

fn write_directives(out: &mut String, directives: &[Positioned<ast::Directive>]) {
    for directive in directives {
        write!(out, "@{}", directive.node.name.node).unwrap();
        write_arguments(out, &directive.node.arguments);
    }
}

/// Values render through their GraphQL `Display`, so string escaping and
/// nested lists/objects come out exactly as a parser would re-read them.
fn write_arguments(out: &mut String, arguments: &[(Positioned<Name>, Positioned<Value>)]) {
    if arguments.is_empty() {
        return;
    }
    out.push('(');
    for (idx, (name, value)) in arguments.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        write!(out, "{}:{}", name.node, value.node).unwrap();
    }
    out.push(')');
}
