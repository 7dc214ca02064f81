// Wrapper emitter: the native function a managed caller enters.
//
// The body is built first as a statement list while declarations and the
// transient-context requirement are collected on the side; the final text is
// then assembled header, context setup, declarations, body, teardown.

use crate::context::WrapperCx;
use crate::error::GenResult;
use crate::lexpr::NameScope;
use crate::naming;
use crate::schema::{Direction, FunctionDecl, IdlType, ParamDecl};
use crate::type_map::{self, TypeCapabilities};
use crate::validate;
use crate::view::{ManagedView, RESULT_NAME};

use super::body::CBody;
use super::call::CallStrategy;
use super::error_check::emit_error_check;
use super::marshal::Marshaller;

/// Name of the managed result variable (single output) or root block (several).
const VRES: &str = "_vres";
/// Aggregate returned when there are several outputs.
const VRESULT: &str = "_vresult";

/// Emit the complete wrapper for `fun`.
///
/// `locals` is the full parameter list before reduction (plus the receiver of
/// a method); `view` is the managed-side projection of the same function.
pub fn emit_wrapper(
    fun: &FunctionDecl,
    view: &ManagedView,
    locals: &[ParamDecl],
    strategy: &CallStrategy,
    marshaller: &dyn Marshaller,
    cx: &mut WrapperCx<'_>,
) -> GenResult<String> {
    validate::check_function(fun)?;

    let entry = cx.target.entry_point(&fun.module, &fun.name);
    log::debug!(
        "wrapper {} -> {entry}: {} input(s), {} output(s), {:?}",
        cx.function,
        view.inputs.len(),
        view.outputs.len(),
        strategy
    );

    let scope = NameScope::enter_function(locals);
    let mut body = CBody::new();

    strategy.emit_prologue(cx, &mut body);

    // Phase 3: pointers an input conversion writes through need backing
    // storage, whatever their own direction. Parameters bound here are not
    // touched again in phase 5.
    let mut bound: Vec<&str> = Vec::new();
    for param in locals {
        let written_by_input = locals
            .iter()
            .any(|c| c.direction.is_input() && c.ty.depends_on(&param.name));
        match param.ty.scrape_const() {
            IdlType::Pointer { target, .. } if written_by_input && type_map::open_array(&param.ty).is_none() => {
                let storage = cx.fresh_c_var(target);
                body.line(format!("{} = &{storage};", param.name));
            }
            _ if param.ty.is_ignorable() => body.line(format!("{} = NULL;", param.name)),
            _ => continue,
        }
        bound.push(&param.name);
    }

    // Phase 4: managed inputs.
    for input in &view.inputs {
        if strategy.receiver() == Some(input.name.as_str()) {
            continue;
        }
        let formal = naming::managed_formal(&input.name);
        marshaller.ml_to_c(cx, &scope, &mut body, &input.ty, &formal, &input.name);
    }

    // Phase 5: storage for outputs.
    for param in locals
        .iter()
        .filter(|p| p.direction == Direction::Out && !bound.contains(&p.name.as_str()))
    {
        marshaller.allocate_output(cx, &scope, &mut body, &param.name, &param.ty);
    }

    // Phase 6.
    strategy.emit_call(fun, locals, cx, &mut body);

    // Phase 7: result first, then outputs in declaration order.
    let typedefs = cx.typedefs;
    if !fun.result.is_void() {
        emit_error_check(typedefs, &mut body, RESULT_NAME, &fun.result);
    }
    for param in locals.iter().filter(|p| p.direction.is_output()) {
        emit_error_check(typedefs, &mut body, &param.name, &param.ty);
    }

    // Phases 8 and 9.
    let (result_decls, returned) = emit_outputs(view, marshaller, cx, &scope, &mut body);

    // Phase 11.
    if let Some(dealloc) = &fun.dealloc {
        body.line("/* begin user-supplied deallocation sequence */");
        body.verbatim(dealloc);
        body.line("/* end user-supplied deallocation sequence */");
    }

    // Phase 10: release follows everything that may still use the context.
    if cx.needs_context() {
        body.line(&cx.target.context_release);
    }
    body.line(format!("return {returned};"));

    Ok(assemble(fun, view, locals, &entry, &result_decls, &body, cx))
}

/// Convert outputs back and pack them. Returns the declarations of the
/// managed result variables and the expression to return.
fn emit_outputs(
    view: &ManagedView,
    marshaller: &dyn Marshaller,
    cx: &mut WrapperCx<'_>,
    scope: &NameScope,
    body: &mut CBody,
) -> (Vec<String>, String) {
    let value = cx.target.value_type.clone();
    match view.outputs.as_slice() {
        [] => (Vec::new(), cx.target.unit.clone()),
        [only] => {
            marshaller.c_to_ml(cx, scope, body, &only.ty, &only.name, VRES);
            (vec![format!("{value} {VRES}")], VRES.to_string())
        }
        outputs => {
            let n = outputs.len();
            let zeros = vec!["0"; n].join(", ");
            let decls = vec![
                format!("{value} {VRES}[{n}] = {{ {zeros} }}"),
                format!("{value} {VRESULT}"),
            ];

            // Converted values stay rooted until the aggregate holds them.
            body.line(format!("{}({VRES}, {n})", cx.target.roots_begin));
            body.indent();
            for (i, out) in outputs.iter().enumerate() {
                marshaller.c_to_ml(cx, scope, body, &out.ty, &out.name, &format!("{VRES}[{i}]"));
            }
            body.line(format!("{VRESULT} = {}({n}, 0);", cx.target.alloc_small));
            for i in 0..n {
                body.line(format!("{}({VRESULT}, {i}) = {VRES}[{i}];", cx.target.field));
            }
            body.dedent();
            body.line(&cx.target.roots_end);
            (decls, VRESULT.to_string())
        }
    }
}

fn assemble(
    fun: &FunctionDecl,
    view: &ManagedView,
    locals: &[ParamDecl],
    entry: &str,
    result_decls: &[String],
    body: &CBody,
    cx: &WrapperCx<'_>,
) -> String {
    let value = &cx.target.value_type;
    let mut out = String::new();

    // Phase 1: header.
    out.push_str(&format!("{value} {entry}("));
    if view.inputs.is_empty() {
        out.push_str(&format!("{value} _unit)\n"));
    } else {
        let formals: Vec<String> = view
            .inputs
            .iter()
            .map(|i| format!("\n\t{value} {}", naming::managed_formal(&i.name)))
            .collect();
        out.push_str(&formals.join(","));
        out.push_str(")\n");
    }
    out.push_str("{\n");

    if cx.needs_context() {
        for line in &cx.target.context_setup {
            out.push_str(&format!("  {line}\n"));
        }
    }

    // Phase 2: one native local per parameter, then the result.
    for param in locals {
        out.push_str(&format!(
            "  {}; /*{}*/\n",
            type_map::c_declaration(&param.name, param.ty.scrape_const()),
            param.direction
        ));
    }
    if !fun.result.is_void() {
        out.push_str(&format!(
            "  {};\n",
            type_map::c_declaration(RESULT_NAME, fun.result.scrape_const())
        ));
    }
    for decl in cx.declarations().iter().chain(result_decls) {
        out.push_str(&format!("  {decl};\n"));
    }

    body.render_into(&mut out);
    out.push_str("}\n");
    out
}
