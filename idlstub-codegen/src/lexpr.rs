// Dependency expressions: occurrence queries and rendering to C.

use std::collections::HashMap;

use crate::schema::{BinOp, LExpr, ParamDecl};
use crate::type_map;

impl LExpr {
    /// Whether `name` occurs as a variable anywhere in this expression.
    pub fn mentions(&self, name: &str) -> bool {
        match self {
            LExpr::Var { name: v } => v == name,
            LExpr::Deref { expr } | LExpr::Neg { expr } => expr.mentions(name),
            LExpr::Binary { lhs, rhs, .. } => lhs.mentions(name) || rhs.mentions(name),
            LExpr::Int { .. } | LExpr::Sizeof { .. } => false,
        }
    }

    /// Collect every variable this expression reads, in order of appearance.
    pub fn variables<'a>(&'a self, acc: &mut Vec<&'a str>) {
        match self {
            LExpr::Var { name } => acc.push(name),
            LExpr::Deref { expr } | LExpr::Neg { expr } => expr.variables(acc),
            LExpr::Binary { lhs, rhs, .. } => {
                lhs.variables(acc);
                rhs.variables(acc);
            }
            LExpr::Int { .. } | LExpr::Sizeof { .. } => {}
        }
    }

    /// Whether a length can be stored back into this expression
    /// (`n`, `*n`, `**n`, ...).
    pub fn is_assignable(&self) -> bool {
        match self {
            LExpr::Var { .. } => true,
            LExpr::Deref { expr } => expr.is_assignable(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Name scopes
// ---------------------------------------------------------------------------

/// Maps IDL-level names to the C expressions holding them inside one wrapper.
///
/// Each wrapper enters a fresh function scope so that a parameter named like
/// a parameter of another function never resolves to the wrong storage.
#[derive(Debug, Clone, Default)]
pub struct NameScope {
    bindings: HashMap<String, String>,
}

impl NameScope {
    /// Scope for a function body: every parameter is held in a local of the same name.
    pub fn enter_function(params: &[ParamDecl]) -> Self {
        let bindings = params
            .iter()
            .map(|p| (p.name.clone(), p.name.clone()))
            .collect();
        NameScope { bindings }
    }

    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(|s| s.as_str())
    }

    /// Render an expression as C source. Unbound variables render verbatim;
    /// descriptor validation rejects them before any wrapper is emitted.
    pub fn render(&self, expr: &LExpr) -> String {
        match expr {
            LExpr::Var { name } => self.resolve(name).unwrap_or(name).to_string(),
            LExpr::Deref { expr } => format!("*{}", self.render_atom(expr)),
            LExpr::Int { value } => value.to_string(),
            LExpr::Neg { expr } => format!("-{}", self.render_atom(expr)),
            LExpr::Binary { bin, lhs, rhs } => format!(
                "{} {} {}",
                self.render_atom(lhs),
                bin_op_str(*bin),
                self.render_atom(rhs)
            ),
            LExpr::Sizeof { ty } => format!("sizeof({})", type_map::c_type_name(ty)),
        }
    }

    fn render_atom(&self, expr: &LExpr) -> String {
        match expr {
            LExpr::Binary { .. } => format!("({})", self.render(expr)),
            _ => self.render(expr),
        }
    }
}

fn bin_op_str(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
    }
}
