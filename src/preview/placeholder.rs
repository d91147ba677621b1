//! Placeholder context for previews
//!
//! Every variable a template reads is bound to its own name, written as
//! `${name}`, so a preview shows which fields the template expects.

use std::collections::BTreeSet;

use tera::ast::{Expr, ExprVal, Node};
use tera::{Context, Template};

/// Parse `source` and bind each top-level variable it reads to `${name}`
pub fn placeholder_context(source: &str) -> tera::Result<Context> {
    let template = Template::new("preview", None, source)?;
    let mut names = BTreeSet::new();
    collect_nodes(&template.ast, &mut names);

    let mut context = Context::new();
    for name in names {
        let placeholder = format!("${{{name}}}");
        context.insert(name, &placeholder);
    }
    Ok(context)
}

fn collect_nodes(nodes: &[Node], names: &mut BTreeSet<String>) {
    for node in nodes {
        match node {
            Node::VariableBlock(_, expr) => collect_expr(expr, names),
            Node::If(branches, _) => {
                for (_, condition, body) in &branches.conditions {
                    collect_expr(condition, names);
                    collect_nodes(body, names);
                }
                if let Some((_, body)) = &branches.otherwise {
                    collect_nodes(body, names);
                }
            }
            _ => {}
        }
    }
}

fn collect_expr(expr: &Expr, names: &mut BTreeSet<String>) {
    match &expr.val {
        ExprVal::Ident(ident) => {
            // `user.name` and `items[0]` read the root variable
            let root = ident.split(['.', '[']).next().unwrap_or_default();
            if !root.is_empty() {
                names.insert(root.to_string());
            }
        }
        ExprVal::Logic(logic) => {
            collect_expr(&logic.lhs, names);
            collect_expr(&logic.rhs, names);
        }
        _ => {}
    }
}
