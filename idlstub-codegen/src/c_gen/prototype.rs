// Native forward declarations for the header file.

use crate::config::TargetNames;
use crate::schema::FunctionDecl;
use crate::type_map;

/// `<extern> int sum(/*in*/ int n,\n\t/*in*/ int *buf);`
pub fn emit_prototype(target: &TargetNames, fun: &FunctionDecl) -> String {
    let formals = if fun.params.is_empty() {
        "void".to_string()
    } else {
        fun.params
            .iter()
            .map(|p| format!("/*{}*/ {}", p.direction, type_map::c_declaration(&p.name, &p.ty)))
            .collect::<Vec<_>>()
            .join(",\n\t")
    };
    let head = type_map::c_declaration(&fun.name, &fun.result);
    if target.extern_marker.is_empty() {
        format!("{head}({formals});\n")
    } else {
        format!("{} {head}({formals});\n", target.extern_marker)
    }
}
