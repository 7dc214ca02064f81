// End-to-end checks of the marshaling core on small descriptor sets.

use idlstub_codegen::c_gen::{self, call::CallStrategy, marshal::BasicMarshaller};
use idlstub_codegen::config::TargetNames;
use idlstub_codegen::context::CodegenContext;
use idlstub_codegen::dependency;
use idlstub_codegen::method;
use idlstub_codegen::schema::{
    ArrayAttrs, Direction, FunctionDecl, IdlType, InterfaceDecl, IntKind, LExpr, ModuleFile, ParamDecl,
    PointerKind,
};
use idlstub_codegen::typedefs::TypedefTable;
use idlstub_codegen::view::{self, RESULT_NAME};

fn module(functions: Vec<FunctionDecl>, interfaces: Vec<InterfaceDecl>) -> CodegenContext {
    let file = ModuleFile { module: "m".into(), typedefs: Vec::new(), functions, interfaces };
    CodegenContext::new(file, TargetNames::default())
}

fn sized_by(n: &str) -> IdlType {
    IdlType::pointer(PointerKind::Ref, IdlType::sized_array(IdlType::int(), LExpr::var(n)))
}

fn bytes() -> IdlType {
    IdlType::Array {
        attrs: ArrayAttrs { is_bytes: true, ..ArrayAttrs::default() },
        elem: Box::new(IdlType::Int { int: IntKind::UChar }),
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[test]
fn scenario_a_size_of_input_is_hidden() {
    let fun = FunctionDecl::new("sum", "m", IdlType::int())
        .with_param("n", Direction::In, IdlType::int())
        .with_param("buf", Direction::In, sized_by("n"));
    let v = view::ml_view(&fun, &TypedefTable::new());
    assert_eq!(v.input_names(), vec!["buf"]);
    assert_eq!(v.output_names(), vec![RESULT_NAME]);
    assert_eq!(v.outputs[0].ty, IdlType::int());
}

#[test]
fn scenario_b_size_of_output_stays_an_input() {
    let fun = FunctionDecl::new("fill", "m", IdlType::Void)
        .with_param("n", Direction::In, IdlType::int())
        .with_param("buf", Direction::Out, sized_by("n"));
    let v = view::ml_view(&fun, &TypedefTable::new());
    assert_eq!(v.input_names(), vec!["n"]);
    assert_eq!(v.output_names(), vec!["buf"]);
}

#[test]
fn reduction_is_idempotent() {
    let params = vec![
        ParamDecl::new("n", Direction::In, IdlType::int()),
        ParamDecl::new("len", Direction::Out, IdlType::pointer(PointerKind::Ref, IdlType::int())),
        ParamDecl::new("src", Direction::In, sized_by("n")),
        ParamDecl::new("dst", Direction::Out, sized_by("len")),
        ParamDecl::new("skip", Direction::In, IdlType::pointer(PointerKind::Ignore, IdlType::int())),
    ];
    let once = dependency::reduce(&params);
    let twice = dependency::reduce(&once);
    assert_eq!(once, twice);
    let names: Vec<&str> = once.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["src", "dst"]);
}

#[test]
fn in_out_fixed_buffer_is_input_only() {
    let fun = FunctionDecl::new("scramble", "m", IdlType::Void)
        .with_param("data", Direction::InOut, bytes())
        .with_param("count", Direction::InOut, IdlType::pointer(PointerKind::Ref, IdlType::int()));
    let v = view::ml_view(&fun, &TypedefTable::new());
    assert_eq!(v.input_names(), vec!["data", "count"]);
    assert_eq!(v.output_names(), vec!["count"]);
}

// ---------------------------------------------------------------------------
// Wrappers
// ---------------------------------------------------------------------------

#[test]
fn scenario_c_six_inputs_get_an_adapter() {
    let mut fun = FunctionDecl::new("six", "m", IdlType::Void);
    for name in ["a", "b", "c", "d", "e", "f"] {
        fun = fun.with_param(name, Direction::In, IdlType::int());
    }
    let ctx = module(vec![fun.clone()], Vec::new());
    let w = c_gen::generate_wrapper(&ctx, &fun, &CallStrategy::Plain, &BasicMarshaller).unwrap();
    assert!(w.c.contains(
        "value camlidl_m_six_bytecode(value * argv, int argn)\n{\n  \
         return camlidl_m_six(argv[0], argv[1], argv[2], argv[3], argv[4], argv[5]);\n}\n"
    ));
    assert!(w.ml.ends_with("= \"camlidl_m_six_bytecode\" \"camlidl_m_six\"\n"));
}

#[test]
fn five_inputs_bind_directly() {
    let mut fun = FunctionDecl::new("five", "m", IdlType::Void);
    for name in ["a", "b", "c", "d", "e"] {
        fun = fun.with_param(name, Direction::In, IdlType::int());
    }
    let ctx = module(vec![fun.clone()], Vec::new());
    let w = c_gen::generate_wrapper(&ctx, &fun, &CallStrategy::Plain, &BasicMarshaller).unwrap();
    assert!(!w.c.contains("_bytecode"));
    assert!(w.ml.ends_with("= \"camlidl_m_five\"\n"));
}

#[test]
fn scenario_d_method_dispatch() {
    let intf = InterfaceDecl {
        name: "IFoo".into(),
        module: "m".into(),
        super_interface: Some("IUnknown".into()),
        methods: vec![FunctionDecl::new("Bar", "m", IdlType::int()).with_param("x", Direction::In, IdlType::int())],
    };
    let ctx = module(Vec::new(), vec![intf.clone()]);
    let derived = method::derive_method(&intf, &intf.methods[0]);
    let v = view::ml_view(&derived, &ctx.typedefs);
    assert_eq!(v.input_names(), vec!["this", "x"]);
    assert_eq!(v.output_names(), vec![RESULT_NAME]);

    let strategy = method::method_strategy(&intf, &intf.methods[0]);
    let w = c_gen::generate_wrapper(&ctx, &derived, &strategy, &BasicMarshaller).unwrap();
    assert_eq!(w.name, "IFoo_Bar");
    let expected = "\
value camlidl_m_IFoo_Bar(
\tvalue _v_this,
\tvalue _v_x)
{
  struct IFoo *this; /*in*/
  int x; /*in*/
  int _res;
  value _vres;
  this = (struct IFoo *) camlidl_unpack_interface(_v_this, NULL);
  camlidl_reset_errinfo();
  x = Int_val(_v_x);
  _res = this->lpVtbl->Bar(this, x);
  _vres = Val_int(_res);
  return _vres;
}
";
    assert_eq!(w.c, expected);
    assert_eq!(w.ml, "external iFoo_Bar : iFoo Com.interface -> int -> int\n\t= \"camlidl_m_IFoo_Bar\"\n");
}

#[test]
fn duplicate_receiver_name_is_rejected() {
    let intf = InterfaceDecl {
        name: "IFoo".into(),
        module: "m".into(),
        super_interface: None,
        methods: vec![FunctionDecl::new("Bad", "m", IdlType::Void).with_param("this", Direction::In, IdlType::int())],
    };
    let ctx = module(Vec::new(), vec![intf]);
    let err = c_gen::generate_wrappers(&ctx, &BasicMarshaller).unwrap_err();
    assert_eq!(err.to_string(), "function IFoo_Bad: duplicate parameter `this`");
}

#[test]
fn output_array_sized_by_input_is_allocated_in_context() {
    let fun = FunctionDecl::new("fill", "m", IdlType::Void)
        .with_param("n", Direction::In, IdlType::int())
        .with_param("buf", Direction::Out, sized_by("n"));
    let ctx = module(vec![fun.clone()], Vec::new());
    let w = c_gen::generate_wrapper(&ctx, &fun, &CallStrategy::Plain, &BasicMarshaller).unwrap();
    let alloc = w.c.find("buf = camlidl_malloc((n) * sizeof(int), _ctx);").unwrap();
    let call = w.c.find("fill(n, buf);").unwrap();
    let convert = w.c.find("_vres = camlidl_alloc(n, 0);").unwrap();
    let release = w.c.find("camlidl_free(_ctx);").unwrap();
    assert!(alloc < call && call < convert && convert < release);
    assert!(w.c.contains("  struct camlidl_ctx_s _ctxs = { CAMLIDL_TRANSIENT, NULL };\n"));
}
