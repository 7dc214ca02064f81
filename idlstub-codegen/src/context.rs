// Build context for one IDL module, and per-wrapper generation scratch state.

use crate::config::TargetNames;
use crate::schema::{FunctionDecl, IdlType, InterfaceDecl, ModuleFile};
use crate::type_map;
use crate::typedefs::{TypedefRegistry, TypedefTable};

/// Central build context for one module's codegen.
pub struct CodegenContext {
    pub module: String,
    pub target: TargetNames,
    pub typedefs: TypedefTable,
    /// Plain functions in declaration order.
    pub functions: Vec<FunctionDecl>,
    /// Interfaces in declaration order.
    pub interfaces: Vec<InterfaceDecl>,
}

impl CodegenContext {
    pub fn new(file: ModuleFile, target: TargetNames) -> Self {
        let typedefs = TypedefTable::from_decls(&file.typedefs);
        CodegenContext {
            module: file.module,
            target,
            typedefs,
            functions: file.functions,
            interfaces: file.interfaces,
        }
    }

    /// Fresh scratch state for emitting the wrapper of `function`.
    pub fn wrapper_cx(&self, function: &str) -> WrapperCx<'_> {
        WrapperCx::new(function, &self.target, &self.typedefs)
    }

    /// Number of wrappers this module produces (functions + own interface methods).
    pub fn wrapper_count(&self) -> usize {
        self.functions.len() + self.interfaces.iter().map(|i| i.methods.len()).sum::<usize>()
    }
}

/// Scratch state for one wrapper.
///
/// Created at the start of each wrapper and dropped at its end; never shared
/// between two wrappers. Declarations requested while the body is being built
/// are collected here and rendered ahead of the body.
pub struct WrapperCx<'a> {
    /// Function being emitted, named in debug output.
    pub function: String,
    pub target: &'a TargetNames,
    pub typedefs: &'a dyn TypedefRegistry,
    need_context: bool,
    counter: u32,
    decls: Vec<String>,
}

impl<'a> WrapperCx<'a> {
    pub fn new(function: &str, target: &'a TargetNames, typedefs: &'a dyn TypedefRegistry) -> Self {
        WrapperCx {
            function: function.to_string(),
            target,
            typedefs,
            need_context: false,
            counter: 0,
            decls: Vec::new(),
        }
    }

    /// Record that some conversion allocates in the transient context.
    pub fn require_context(&mut self) {
        self.need_context = true;
    }

    pub fn needs_context(&self) -> bool {
        self.need_context
    }

    /// Add a local declaration (without the trailing `;`).
    pub fn declare(&mut self, decl: impl Into<String>) {
        self.decls.push(decl.into());
    }

    pub fn declarations(&self) -> &[String] {
        &self.decls
    }

    fn next_id(&mut self) -> u32 {
        self.counter += 1;
        self.counter
    }

    /// Declare a fresh native variable of type `ty` and return its name.
    pub fn fresh_c_var(&mut self, ty: &IdlType) -> String {
        let name = format!("_c{}", self.next_id());
        self.declare(type_map::c_declaration(&name, ty.scrape_const()));
        name
    }

    /// Declare a fresh native variable spelled with a raw C type.
    pub fn fresh_raw_var(&mut self, c_type: &str) -> String {
        let name = format!("_c{}", self.next_id());
        self.declare(format!("{c_type} {name}"));
        name
    }

    /// Declare a fresh managed temporary and return its name.
    pub fn fresh_value_var(&mut self) -> String {
        let name = format!("_v{}", self.next_id());
        self.declare(format!("{} {name}", self.target.value_type));
        name
    }
}
