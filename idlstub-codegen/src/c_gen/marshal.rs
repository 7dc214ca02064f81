// Per-type conversion between managed values and native storage.
//
// The wrapper emitter only decides *when* a value is converted; this module
// decides *how*. Compound types (structs, unions, named typedefs) are handed
// to per-type converter functions generated alongside their definitions.

use crate::context::WrapperCx;
use crate::lexpr::NameScope;
use crate::schema::{ArrayAttrs, BigarrayDim, IdlType, IntKind, LExpr, PointerKind};
use crate::type_map;

use super::body::CBody;

/// Conversion collaborator used by the wrapper emitter.
pub trait Marshaller {
    /// Convert managed `src` into native lvalue `dst`.
    fn ml_to_c(&self, cx: &mut WrapperCx<'_>, scope: &NameScope, body: &mut CBody, ty: &IdlType, src: &str, dst: &str);

    /// Convert native `src` into managed lvalue `dst`.
    fn c_to_ml(&self, cx: &mut WrapperCx<'_>, scope: &NameScope, body: &mut CBody, ty: &IdlType, src: &str, dst: &str);

    /// Point out-parameter `name` at storage the callee can write into.
    fn allocate_output(&self, cx: &mut WrapperCx<'_>, scope: &NameScope, body: &mut CBody, name: &str, ty: &IdlType);
}

/// Marshaller for the camlidl runtime library.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicMarshaller;

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

fn int_from_ml(kind: IntKind) -> &'static str {
    match kind {
        IntKind::Long | IntKind::ULong => "Long_val",
        IntKind::Hyper | IntKind::UHyper => "Int64_val",
        IntKind::Boolean => "Bool_val",
        _ => "Int_val",
    }
}

fn int_to_ml(kind: IntKind) -> &'static str {
    match kind {
        IntKind::Long | IntKind::ULong => "Val_long",
        IntKind::Hyper | IntKind::UHyper => "copy_int64",
        IntKind::Boolean => "Val_bool",
        _ => "Val_int",
    }
}

fn is_float(ty: &IdlType) -> bool {
    matches!(ty.scrape_const(), IdlType::Float | IdlType::Double)
}

fn interface_target(ty: &IdlType) -> Option<&str> {
    match ty.scrape_const() {
        IdlType::Interface { name } => Some(name),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Array sizes
// ---------------------------------------------------------------------------

/// Expression giving the number of valid elements of an array.
fn array_length(scope: &NameScope, attrs: &ArrayAttrs) -> Option<String> {
    attrs
        .length
        .as_ref()
        .or(attrs.size.as_ref())
        .or(attrs.bound.as_ref())
        .map(|e| scope.render(e))
}

/// Expression that receives the length of an incoming array, if any.
fn length_target<'e>(attrs: &'e ArrayAttrs) -> Option<&'e LExpr> {
    attrs
        .length
        .as_ref()
        .filter(|e| e.is_assignable())
        .or(attrs.size.as_ref().filter(|e| e.is_assignable()))
}

fn bigarray_kind(elem: &IdlType) -> &'static str {
    match elem.scrape_const() {
        IdlType::Float => "CAML_BA_FLOAT32",
        IdlType::Double => "CAML_BA_FLOAT64",
        IdlType::Int { int } => match int {
            IntKind::Small => "CAML_BA_SINT8",
            IntKind::USmall | IntKind::Char | IntKind::UChar | IntKind::Byte => "CAML_BA_UINT8",
            IntKind::Short => "CAML_BA_SINT16",
            IntKind::UShort => "CAML_BA_UINT16",
            IntKind::Long | IntKind::ULong => "CAML_BA_NATIVE_INT",
            IntKind::Hyper | IntKind::UHyper => "CAML_BA_INT64",
            IntKind::Int | IntKind::UInt | IntKind::Boolean => "CAML_BA_INT32",
        },
        _ => "CAML_BA_CAML_INT",
    }
}

fn bigarray_dim_exprs(scope: &NameScope, dims: &[BigarrayDim]) -> Vec<String> {
    dims.iter()
        .map(|d| {
            d.length
                .as_ref()
                .or(d.size.as_ref())
                .map(|e| scope.render(e))
                .unwrap_or_else(|| "0".to_string())
        })
        .collect()
}

impl BasicMarshaller {
    fn array_ml_to_c(
        &self,
        cx: &mut WrapperCx<'_>,
        scope: &NameScope,
        body: &mut CBody,
        attrs: &ArrayAttrs,
        elem: &IdlType,
        src: &str,
        dst: &str,
    ) {
        if attrs.is_string {
            cx.require_context();
            body.line(format!("{dst} = camlidl_malloc_string({src}, _ctx);"));
            return;
        }
        if attrs.is_bytes {
            body.line(format!("{dst} = ({} *) Bytes_val({src});", type_map::c_type_name(elem)));
            if let Some(target) = length_target(attrs) {
                body.line(format!("{} = caml_string_length({src});", scope.render(target)));
            }
            return;
        }

        let len = cx.fresh_raw_var("mlsize_t");
        let idx = cx.fresh_raw_var("mlsize_t");
        if is_float(elem) {
            body.line(format!("{len} = Wosize_val({src}) / Double_wosize;"));
        } else {
            body.line(format!("{len} = Wosize_val({src});"));
        }
        if attrs.bound.is_none() {
            cx.require_context();
            body.line(format!(
                "{dst} = camlidl_malloc({len} * sizeof({}), _ctx);",
                type_map::c_type_name(elem)
            ));
        }
        body.open(format!("for ({idx} = 0; {idx} < {len}; {idx}++)"));
        let slot = format!("{dst}[{idx}]");
        if is_float(elem) {
            body.line(format!("{slot} = Double_field({src}, {idx});"));
        } else {
            let item = cx.fresh_value_var();
            body.line(format!("{item} = {}({src}, {idx});", cx.target.field));
            self.ml_to_c(cx, scope, body, elem, &item, &slot);
        }
        body.close();
        if let Some(target) = length_target(attrs) {
            body.line(format!("{} = {len};", scope.render(target)));
        }
    }

    fn array_c_to_ml(
        &self,
        cx: &mut WrapperCx<'_>,
        scope: &NameScope,
        body: &mut CBody,
        attrs: &ArrayAttrs,
        elem: &IdlType,
        src: &str,
        dst: &str,
    ) {
        if attrs.is_string {
            body.line(format!("{dst} = copy_string({src});"));
            return;
        }
        let len = array_length(scope, attrs).unwrap_or_else(|| "0".to_string());
        if attrs.is_bytes {
            body.line(format!("{dst} = caml_alloc_string({len});"));
            body.line(format!("memcpy(Bytes_val({dst}), {src}, {len});"));
            return;
        }

        let idx = cx.fresh_raw_var("mlsize_t");
        if is_float(elem) {
            body.line(format!("{dst} = caml_alloc({len} * Double_wosize, Double_array_tag);"));
            body.open(format!("for ({idx} = 0; {idx} < {len}; {idx}++)"));
            body.line(format!("Store_double_field({dst}, {idx}, {src}[{idx}]);"));
            body.close();
            return;
        }

        let item = cx.fresh_value_var();
        body.line(format!("{dst} = camlidl_alloc({len}, 0);"));
        body.line(format!("Begin_root({dst})"));
        body.indent();
        body.open(format!("for ({idx} = 0; {idx} < {len}; {idx}++)"));
        self.c_to_ml(cx, scope, body, elem, &format!("{src}[{idx}]"), &item);
        body.line(format!("modify(&{}({dst}, {idx}), {item});", cx.target.field));
        body.close();
        body.dedent();
        body.line(&cx.target.roots_end);
    }

    /// A pointer to an unbounded array is the array itself; nullable kinds
    /// travel as an option of the array.
    fn open_array_ml_to_c(
        &self,
        cx: &mut WrapperCx<'_>,
        scope: &NameScope,
        body: &mut CBody,
        pointer: PointerKind,
        arr: &IdlType,
        src: &str,
        dst: &str,
    ) {
        match pointer {
            PointerKind::Ignore => body.line(format!("{dst} = NULL;")),
            PointerKind::Ref => self.ml_to_c(cx, scope, body, arr, src, dst),
            PointerKind::Unique | PointerKind::Ptr => {
                body.open(format!("if ({src} == Val_int(0))"));
                body.line(format!("{dst} = NULL;"));
                if let IdlType::Array { attrs, .. } = arr {
                    if let Some(target) = length_target(attrs) {
                        body.line(format!("{} = 0;", scope.render(target)));
                    }
                }
                body.close_with(" else {");
                body.indent();
                let some = cx.fresh_value_var();
                body.line(format!("{some} = {}({src}, 0);", cx.target.field));
                self.ml_to_c(cx, scope, body, arr, &some, dst);
                body.close();
            }
        }
    }

    fn open_array_c_to_ml(
        &self,
        cx: &mut WrapperCx<'_>,
        scope: &NameScope,
        body: &mut CBody,
        pointer: PointerKind,
        arr: &IdlType,
        src: &str,
        dst: &str,
    ) {
        match pointer {
            PointerKind::Ignore => body.line(format!("{dst} = {};", cx.target.unit)),
            PointerKind::Ref => self.c_to_ml(cx, scope, body, arr, src, dst),
            PointerKind::Unique | PointerKind::Ptr => {
                body.open(format!("if ({src} == NULL)"));
                body.line(format!("{dst} = Val_int(0);"));
                body.close_with(" else {");
                body.indent();
                let some = cx.fresh_value_var();
                self.c_to_ml(cx, scope, body, arr, src, &some);
                body.line(format!("Begin_root({some})"));
                body.indent();
                body.line(format!("{dst} = {}(1, 0);", cx.target.alloc_small));
                body.line(format!("{}({dst}, 0) = {some};", cx.target.field));
                body.dedent();
                body.line(&cx.target.roots_end);
                body.close();
            }
        }
    }
}

impl Marshaller for BasicMarshaller {
    fn ml_to_c(&self, cx: &mut WrapperCx<'_>, scope: &NameScope, body: &mut CBody, ty: &IdlType, src: &str, dst: &str) {
        match ty {
            IdlType::Void => {}
            IdlType::Const { inner } => self.ml_to_c(cx, scope, body, inner, src, dst),
            IdlType::Int { int } => body.line(format!("{dst} = {}({src});", int_from_ml(*int))),
            IdlType::Float | IdlType::Double => body.line(format!("{dst} = Double_val({src});")),
            IdlType::Named { module, name } => {
                cx.require_context();
                body.line(format!("camlidl_ml2c_{module}_{name}({src}, &{dst}, _ctx);"));
            }
            IdlType::Struct { module, name } => {
                cx.require_context();
                body.line(format!("camlidl_ml2c_{module}_struct_{name}({src}, &{dst}, _ctx);"));
            }
            IdlType::Enum { module, name } => {
                body.line(format!("{dst} = camlidl_ml2c_{module}_enum_{name}({src});"));
            }
            IdlType::Union { module, name, discriminant } => {
                cx.require_context();
                let call = format!("camlidl_ml2c_{module}_union_{name}({src}, &{dst}, _ctx);");
                match discriminant.as_ref().filter(|d| d.is_assignable()) {
                    Some(d) => body.line(format!("{} = {call}", scope.render(d))),
                    None => body.line(call),
                }
            }
            IdlType::Interface { name } => {
                cx.require_context();
                body.line(format!(
                    "{dst} = (struct {name} *) {}({src}, _ctx);",
                    cx.target.unpack_interface
                ));
            }
            IdlType::Pointer { pointer, target } => {
                if interface_target(target).is_some() {
                    return self.ml_to_c(cx, scope, body, target.scrape_const(), src, dst);
                }
                if let Some(arr) = type_map::open_array(ty) {
                    return self.open_array_ml_to_c(cx, scope, body, *pointer, arr, src, dst);
                }
                match pointer {
                    PointerKind::Ignore => body.line(format!("{dst} = NULL;")),
                    PointerKind::Ref => {
                        let storage = cx.fresh_c_var(target);
                        body.line(format!("{dst} = &{storage};"));
                        self.ml_to_c(cx, scope, body, target, src, &storage);
                    }
                    PointerKind::Unique | PointerKind::Ptr => {
                        body.open(format!("if ({src} == Val_int(0))"));
                        body.line(format!("{dst} = NULL;"));
                        body.close_with(" else {");
                        body.indent();
                        let some = cx.fresh_value_var();
                        let storage = cx.fresh_c_var(target);
                        body.line(format!("{some} = {}({src}, 0);", cx.target.field));
                        body.line(format!("{dst} = &{storage};"));
                        self.ml_to_c(cx, scope, body, target, &some, &storage);
                        body.close();
                    }
                }
            }
            IdlType::Array { attrs, elem } => self.array_ml_to_c(cx, scope, body, attrs, elem, src, dst),
            IdlType::Bigarray { dims, elem } => {
                body.line(format!(
                    "{dst} = ({} *) Caml_ba_data_val({src});",
                    type_map::c_type_name(elem)
                ));
                for (i, d) in dims.iter().enumerate() {
                    if let Some(target) = d.length.as_ref().or(d.size.as_ref()).filter(|e| e.is_assignable()) {
                        body.line(format!("{} = Caml_ba_array_val({src})->dim[{i}];", scope.render(target)));
                    }
                }
            }
        }
    }

    fn c_to_ml(&self, cx: &mut WrapperCx<'_>, scope: &NameScope, body: &mut CBody, ty: &IdlType, src: &str, dst: &str) {
        match ty {
            IdlType::Void => body.line(format!("{dst} = {};", cx.target.unit)),
            IdlType::Const { inner } => self.c_to_ml(cx, scope, body, inner, src, dst),
            IdlType::Int { int } => body.line(format!("{dst} = {}({src});", int_to_ml(*int))),
            IdlType::Float | IdlType::Double => body.line(format!("{dst} = copy_double({src});")),
            IdlType::Named { module, name } => {
                cx.require_context();
                body.line(format!("{dst} = camlidl_c2ml_{module}_{name}(&{src}, _ctx);"));
            }
            IdlType::Struct { module, name } => {
                cx.require_context();
                body.line(format!("{dst} = camlidl_c2ml_{module}_struct_{name}(&{src}, _ctx);"));
            }
            IdlType::Enum { module, name } => {
                body.line(format!("{dst} = camlidl_c2ml_{module}_enum_{name}({src});"));
            }
            IdlType::Union { module, name, discriminant } => {
                cx.require_context();
                let discr = discriminant
                    .as_ref()
                    .map(|d| scope.render(d))
                    .unwrap_or_else(|| "0".to_string());
                body.line(format!(
                    "{dst} = camlidl_c2ml_{module}_union_{name}({discr}, &{src}, _ctx);"
                ));
            }
            IdlType::Interface { .. } => {
                cx.require_context();
                body.line(format!("{dst} = camlidl_pack_interface({src}, _ctx);"));
            }
            IdlType::Pointer { pointer, target } => {
                if interface_target(target).is_some() {
                    return self.c_to_ml(cx, scope, body, target.scrape_const(), src, dst);
                }
                if let Some(arr) = type_map::open_array(ty) {
                    return self.open_array_c_to_ml(cx, scope, body, *pointer, arr, src, dst);
                }
                match pointer {
                    PointerKind::Ignore => body.line(format!("{dst} = {};", cx.target.unit)),
                    PointerKind::Ref => self.c_to_ml(cx, scope, body, target, &format!("*{src}"), dst),
                    PointerKind::Unique | PointerKind::Ptr => {
                        body.open(format!("if ({src} == NULL)"));
                        body.line(format!("{dst} = Val_int(0);"));
                        body.close_with(" else {");
                        body.indent();
                        let some = cx.fresh_value_var();
                        self.c_to_ml(cx, scope, body, target, &format!("*{src}"), &some);
                        body.line(format!("Begin_root({some})"));
                        body.indent();
                        body.line(format!("{dst} = {}(1, 0);", cx.target.alloc_small));
                        body.line(format!("{}({dst}, 0) = {some};", cx.target.field));
                        body.dedent();
                        body.line(&cx.target.roots_end);
                        body.close();
                    }
                }
            }
            IdlType::Array { attrs, elem } => self.array_c_to_ml(cx, scope, body, attrs, elem, src, dst),
            IdlType::Bigarray { dims, elem } => {
                let extents = bigarray_dim_exprs(scope, dims);
                let mut args = vec![
                    format!("{} | CAML_BA_C_LAYOUT", bigarray_kind(elem)),
                    dims.len().to_string(),
                    src.to_string(),
                ];
                args.extend(extents);
                body.line(format!("{dst} = caml_ba_alloc_dims({});", args.join(", ")));
            }
        }
    }

    fn allocate_output(&self, cx: &mut WrapperCx<'_>, scope: &NameScope, body: &mut CBody, name: &str, ty: &IdlType) {
        if let Some(arr) = type_map::open_array(ty) {
            return self.allocate_output(cx, scope, body, name, arr);
        }
        match ty.scrape_const() {
            IdlType::Pointer { pointer: PointerKind::Ignore, .. } => {
                body.line(format!("{name} = NULL;"));
            }
            IdlType::Pointer { target, .. } => {
                let storage = cx.fresh_c_var(target);
                body.line(format!("{name} = &{storage};"));
            }
            IdlType::Array { attrs, elem } if attrs.bound.is_none() && !attrs.is_string => {
                // Out arrays are allocated at their maximal size.
                if let Some(size) = attrs.size.as_ref().or(attrs.length.as_ref()) {
                    cx.require_context();
                    body.line(format!(
                        "{name} = camlidl_malloc(({}) * sizeof({}), _ctx);",
                        scope.render(size),
                        type_map::c_type_name(elem)
                    ));
                }
            }
            IdlType::Bigarray { dims, elem } => {
                let extents = bigarray_dim_exprs(scope, dims);
                let count = if extents.is_empty() {
                    "1".to_string()
                } else {
                    extents.iter().map(|e| format!("({e})")).collect::<Vec<_>>().join(" * ")
                };
                body.line(format!(
                    "{name} = camlidl_malloc({count} * sizeof({}), NULL);",
                    type_map::c_type_name(elem)
                ));
            }
            _ => {}
        }
    }
}
