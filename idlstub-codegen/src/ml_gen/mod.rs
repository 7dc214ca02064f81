// Managed-side declarations binding each wrapper to its native symbol.

use crate::c_gen::{Wrapper, bytecode};
use crate::config::TargetNames;
use crate::naming;
use crate::schema::{FunctionDecl, IdlType, IntKind, PointerKind};
use crate::view::ManagedView;

/// Managed spelling of an IDL type.
pub fn ml_type(ty: &IdlType) -> String {
    match ty {
        IdlType::Void => "unit".into(),
        IdlType::Const { inner } => ml_type(inner),
        IdlType::Int { int } => match int {
            IntKind::Hyper | IntKind::UHyper => "int64".into(),
            IntKind::Boolean => "bool".into(),
            IntKind::Char | IntKind::UChar => "char".into(),
            _ => "int".into(),
        },
        IdlType::Float | IdlType::Double => "float".into(),
        IdlType::Named { name, .. }
        | IdlType::Struct { name, .. }
        | IdlType::Union { name, .. }
        | IdlType::Enum { name, .. } => naming::escape_reserved(&naming::uncapitalize(name)),
        IdlType::Pointer { pointer, target } => match pointer {
            PointerKind::Ref => ml_type(target),
            PointerKind::Unique | PointerKind::Ptr => format!("{} option", ml_type(target)),
            PointerKind::Ignore => "unit".into(),
        },
        IdlType::Array { attrs, elem } => {
            if attrs.is_string || attrs.is_bytes {
                "string".into()
            } else {
                format!("{} array", ml_type(elem))
            }
        }
        IdlType::Bigarray { elem, .. } => {
            let (ml, kind) = bigarray_element(elem);
            format!("({ml}, Bigarray.{kind}, Bigarray.c_layout) Bigarray.Genarray.t")
        }
        IdlType::Interface { name } => format!("{} Com.interface", naming::uncapitalize(name)),
    }
}

fn bigarray_element(elem: &IdlType) -> (&'static str, &'static str) {
    match elem.scrape_const() {
        IdlType::Float => ("float", "float32_elt"),
        IdlType::Double => ("float", "float64_elt"),
        IdlType::Int { int } => match int {
            IntKind::Small => ("int", "int8_signed_elt"),
            IntKind::USmall | IntKind::Char | IntKind::UChar | IntKind::Byte => ("int", "int8_unsigned_elt"),
            IntKind::Short => ("int", "int16_signed_elt"),
            IntKind::UShort => ("int", "int16_unsigned_elt"),
            IntKind::Long | IntKind::ULong => ("nativeint", "nativeint_elt"),
            IntKind::Hyper | IntKind::UHyper => ("int64", "int64_elt"),
            IntKind::Int | IntKind::UInt | IntKind::Boolean => ("int32", "int32_elt"),
        },
        _ => ("int", "int_elt"),
    }
}

fn join_or_unit<'a>(types: impl Iterator<Item = &'a IdlType>, sep: &str) -> String {
    let parts: Vec<String> = types.map(ml_type).collect();
    if parts.is_empty() {
        "unit".to_string()
    } else {
        parts.join(sep)
    }
}

/// `external name : a -> b -> r1 * r2\n\t= "symbol"`; wrappers past the fast-path
/// arity bind the adapter first, then the primary entry point.
pub fn emit_external(target: &TargetNames, fun: &FunctionDecl, view: &ManagedView) -> String {
    let arrow = format!(" {} ", target.arrow);
    let product = format!(" {} ", target.product);
    let ins = join_or_unit(view.inputs.iter().map(|e| &e.ty), &arrow);
    let outs = join_or_unit(view.outputs.iter().map(|e| &e.ty), &product);

    let primary = target.entry_point(&fun.module, &fun.name);
    let symbols = if bytecode::needs_adapter(view) {
        format!(
            "\"{}\" \"{primary}\"",
            target.bytecode_entry_point(&fun.module, &fun.name)
        )
    } else {
        format!("\"{primary}\"")
    };

    format!(
        "external {} : {ins}{arrow}{outs}\n\t= {symbols}\n",
        naming::ml_value_name(fun.ml_name())
    )
}

/// `<module>.ml`: one declaration per wrapper, in wrapper order.
pub fn ml_file(module: &str, wrappers: &[Wrapper]) -> String {
    let mut out = format!("(* File generated from {module}.idl *)\n");
    for w in wrappers {
        out.push('\n');
        out.push_str(&w.ml);
    }
    out
}
