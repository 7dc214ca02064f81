// Arity adapter for wrappers with too many managed arguments.
//
// Past the fast-path limit the managed runtime passes arguments as an array
// to a separate entry point, which forwards them to the primary wrapper.

use crate::config::TargetNames;
use crate::view::ManagedView;

/// Largest input count the managed calling convention passes directly.
pub const FAST_PATH_ARITY: usize = 5;

pub fn needs_adapter(view: &ManagedView) -> bool {
    view.inputs.len() > FAST_PATH_ARITY
}

/// `value <primary>_bytecode(value * argv, int argn)` forwarding `argv[0..n]`.
pub fn emit_adapter(target: &TargetNames, module: &str, function: &str, arity: usize) -> String {
    let value = &target.value_type;
    let primary = target.entry_point(module, function);
    let adapter = target.bytecode_entry_point(module, function);
    let args: Vec<String> = (0..arity).map(|i| format!("argv[{i}]")).collect();

    let mut out = String::new();
    out.push_str(&format!("{value} {adapter}({value} * argv, int argn)\n"));
    out.push_str("{\n");
    out.push_str(&format!("  return {primary}({});\n", args.join(", ")));
    out.push_str("}\n");
    out
}
