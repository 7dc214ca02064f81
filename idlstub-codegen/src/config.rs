// Configuration types for idlstub-codegen, deserialized from idlstub.toml.

use serde::Deserialize;

/// Top-level config file.
#[derive(Deserialize, Debug, Clone)]
pub struct IdlstubConfig {
    pub codegen: CodegenConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CodegenConfig {
    pub paths: CodegenPaths,
    #[serde(default)]
    pub target: TargetNames,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CodegenPaths {
    /// Resolved descriptor JSON for one IDL module.
    pub input: String,
    /// Directory receiving the stub source, prototypes and managed declarations.
    pub out: String,
}

/// Spelling of the host runtime's C API inside generated wrappers.
///
/// Defaults target the OCaml native interface with the camlidl support
/// library; every field can be overridden from `[codegen.target]`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TargetNames {
    /// Leading component of every generated entry point.
    pub prefix: String,
    /// Type of a managed value in C.
    pub value_type: String,
    /// Managed "no value" result.
    pub unit: String,
    /// Opens a rooted block of N managed slots: `{begin}(_vres, N)`.
    pub roots_begin: String,
    pub roots_end: String,
    /// Allocates an N-field aggregate: `{alloc}(N, 0)`.
    pub alloc_small: String,
    /// Field accessor of an aggregate.
    pub field: String,
    pub enter_blocking: String,
    pub leave_blocking: String,
    /// Declarations bringing the transient context `_ctx` into scope.
    pub context_setup: Vec<String>,
    /// Statement releasing the transient context.
    pub context_release: String,
    /// Statement clearing the process-wide error slot before a method call.
    pub error_reset: String,
    /// Extracts the native interface pointer from a managed receiver.
    pub unpack_interface: String,
    /// Headers included at the top of the stub file.
    pub includes: Vec<String>,
    /// Storage-class marker in front of native prototypes.
    pub extern_marker: String,
    pub arrow: String,
    pub product: String,
}

impl Default for TargetNames {
    fn default() -> Self {
        TargetNames {
            prefix: "camlidl".into(),
            value_type: "value".into(),
            unit: "Val_unit".into(),
            roots_begin: "Begin_roots_block".into(),
            roots_end: "End_roots()".into(),
            alloc_small: "camlidl_alloc_small".into(),
            field: "Field".into(),
            enter_blocking: "enter_blocking_section();".into(),
            leave_blocking: "leave_blocking_section();".into(),
            context_setup: vec![
                "struct camlidl_ctx_s _ctxs = { CAMLIDL_TRANSIENT, NULL };".into(),
                "camlidl_ctx _ctx = &_ctxs;".into(),
            ],
            context_release: "camlidl_free(_ctx);".into(),
            error_reset: "camlidl_reset_errinfo();".into(),
            unpack_interface: "camlidl_unpack_interface".into(),
            includes: vec![
                "<stddef.h>".into(),
                "<string.h>".into(),
                "<caml/mlvalues.h>".into(),
                "<caml/memory.h>".into(),
                "<caml/alloc.h>".into(),
                "<caml/fail.h>".into(),
                "<caml/signals.h>".into(),
                "<caml/bigarray.h>".into(),
                "<camlidlruntime.h>".into(),
            ],
            extern_marker: "_CAMLIDL_EXTERN_C".into(),
            arrow: "->".into(),
            product: "*".into(),
        }
    }
}

impl TargetNames {
    /// Entry point of the wrapper for `function` in `module`.
    pub fn entry_point(&self, module: &str, function: &str) -> String {
        format!("{}_{}_{}", self.prefix, module, function)
    }

    /// Entry point of the argument-array adapter for the same wrapper.
    pub fn bytecode_entry_point(&self, module: &str, function: &str) -> String {
        format!("{}_bytecode", self.entry_point(module, function))
    }
}
