// C code generation: wrappers, adapters and the stub/header files of a module.

pub mod body;
pub mod bytecode;
pub mod call;
pub mod error_check;
pub mod marshal;
pub mod prototype;
pub mod wrapper;

use crate::context::CodegenContext;
use crate::error::GenResult;
use crate::method;
use crate::ml_gen;
use crate::schema::FunctionDecl;
use crate::view;

use self::call::CallStrategy;
use self::marshal::Marshaller;

/// Generated text for one function or method.
#[derive(Debug, Clone)]
pub struct Wrapper {
    /// Function name as emitted (`Intf_Method` for methods).
    pub name: String,
    /// Primary wrapper, followed by its arity adapter when there is one.
    pub c: String,
    pub ml: String,
}

/// Wrapper, adapter and managed declaration for `fun` called through `strategy`.
pub fn generate_wrapper(
    ctx: &CodegenContext,
    fun: &FunctionDecl,
    strategy: &CallStrategy,
    marshaller: &dyn Marshaller,
) -> GenResult<Wrapper> {
    let view = view::ml_view(fun, &ctx.typedefs);
    let mut cx = ctx.wrapper_cx(&fun.name);
    let mut c = wrapper::emit_wrapper(fun, &view, &fun.params, strategy, marshaller, &mut cx)?;

    if bytecode::needs_adapter(&view) {
        c.push('\n');
        c.push_str(&bytecode::emit_adapter(&ctx.target, &fun.module, &fun.name, view.inputs.len()));
    }

    Ok(Wrapper {
        name: fun.name.clone(),
        c,
        ml: ml_gen::emit_external(&ctx.target, fun, &view),
    })
}

/// Every wrapper of the module: plain functions first, then interface methods.
pub fn generate_wrappers(ctx: &CodegenContext, marshaller: &dyn Marshaller) -> GenResult<Vec<Wrapper>> {
    let mut wrappers = Vec::with_capacity(ctx.wrapper_count());

    for fun in &ctx.functions {
        let strategy = CallStrategy::for_function(fun);
        wrappers.push(generate_wrapper(ctx, fun, &strategy, marshaller)?);
    }

    for intf in &ctx.interfaces {
        for m in &intf.methods {
            let derived = method::derive_method(intf, m);
            let strategy = method::method_strategy(intf, m);
            wrappers.push(generate_wrapper(ctx, &derived, &strategy, marshaller)?);
        }
    }

    Ok(wrappers)
}

/// `<module>_stubs.c`
pub fn stub_file(ctx: &CodegenContext, wrappers: &[Wrapper]) -> String {
    let mut out = String::new();
    out.push_str(&format!("/* File generated from {}.idl */\n\n", ctx.module));
    for include in &ctx.target.includes {
        out.push_str(&format!("#include {include}\n"));
    }
    out.push_str(&format!("#include \"{}.h\"\n", ctx.module));

    for w in wrappers {
        out.push('\n');
        out.push_str(&w.c);
    }
    out
}

/// `<module>.h`: prototypes of the plain functions the stubs call.
pub fn header_file(ctx: &CodegenContext) -> String {
    let guard = format!("_CAMLIDL_{}_H", ctx.module.to_uppercase());
    let mut out = String::new();
    out.push_str(&format!("/* File generated from {}.idl */\n\n", ctx.module));
    out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));

    // Interfaces are reached through their dispatch tables only.
    for intf in &ctx.interfaces {
        out.push_str(&format!("struct {};\n", intf.name));
    }
    if !ctx.interfaces.is_empty() {
        out.push('\n');
    }

    for fun in ctx.functions.iter().filter(|f| f.call.is_none()) {
        out.push_str(&prototype::emit_prototype(&ctx.target, fun));
        out.push('\n');
    }

    out.push_str(&format!("#endif /* !{guard} */\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetNames;
    use crate::schema::ModuleFile;

    fn ctx() -> CodegenContext {
        let file: ModuleFile = serde_json::from_str(
            r#"{
                "module": "vec",
                "functions": [
                    { "name": "clear", "mod": "vec" },
                    { "name": "custom", "mod": "vec", "call": "do_custom();" }
                ],
                "interfaces": [ { "name": "IFoo", "mod": "vec", "super": "IUnknown",
                    "methods": [ { "name": "Bar", "mod": "vec" } ] } ]
            }"#,
        )
        .unwrap();
        CodegenContext::new(file, TargetNames::default())
    }

    #[test]
    fn test_wrappers_in_declaration_order() {
        let ctx = ctx();
        let wrappers = generate_wrappers(&ctx, &marshal::BasicMarshaller).unwrap();
        let names: Vec<&str> = wrappers.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["clear", "custom", "IFoo_Bar"]);
        assert!(wrappers[2].c.contains("this->lpVtbl->Bar(this);"));
    }

    #[test]
    fn test_stub_file_layout() {
        let ctx = ctx();
        let wrappers = generate_wrappers(&ctx, &marshal::BasicMarshaller).unwrap();
        let text = stub_file(&ctx, &wrappers);
        assert!(text.starts_with("/* File generated from vec.idl */\n\n#include <stddef.h>\n"));
        assert!(text.contains("#include \"vec.h\"\n\nvalue camlidl_vec_clear(value _unit)\n"));
    }

    #[test]
    fn test_header_skips_overridden_calls() {
        let text = header_file(&ctx());
        assert!(text.contains("struct IFoo;\n"));
        assert!(text.contains("_CAMLIDL_EXTERN_C void clear(void);\n"));
        assert!(!text.contains("custom"));
        assert!(text.ends_with("#endif /* !_CAMLIDL_VEC_H */\n"));
    }
}
