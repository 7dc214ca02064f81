// Descriptor sanity checks run before any text is emitted.

use std::collections::HashSet;

use crate::error::{GenError, GenResult};
use crate::schema::{FunctionDecl, IdlType, InterfaceDecl, LExpr};

/// Reject duplicate parameter names and dependency expressions naming no parameter.
pub fn check_function(fun: &FunctionDecl) -> GenResult<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    for param in &fun.params {
        if !seen.insert(param.name.as_str()) {
            return Err(GenError::DuplicateParameter {
                function: fun.name.clone(),
                name: param.name.clone(),
            });
        }
    }

    for param in &fun.params {
        let mut referenced = Vec::new();
        collect_dependency_vars(&param.ty, &mut referenced);
        if let Some(missing) = referenced.into_iter().find(|v| !seen.contains(v)) {
            return Err(GenError::UnresolvedDependency {
                function: fun.name.clone(),
                param: param.name.clone(),
                name: missing.to_string(),
            });
        }
    }

    Ok(())
}

/// Every interface's super interface must be declared in the same module.
pub fn check_interfaces(interfaces: &[InterfaceDecl]) -> GenResult<()> {
    let known: HashSet<&str> = interfaces.iter().map(|i| i.name.as_str()).collect();
    for intf in interfaces {
        if let Some(sup) = &intf.super_interface {
            // IUnknown is provided by the runtime.
            if sup != "IUnknown" && !known.contains(sup.as_str()) {
                return Err(GenError::UnknownInterface {
                    interface: intf.name.clone(),
                    super_interface: sup.clone(),
                });
            }
        }
    }
    Ok(())
}

fn visit<'a>(expr: &'a Option<LExpr>, acc: &mut Vec<&'a str>) {
    if let Some(e) = expr {
        e.variables(acc);
    }
}

fn collect_dependency_vars<'a>(ty: &'a IdlType, acc: &mut Vec<&'a str>) {
    match ty {
        IdlType::Array { attrs, elem } => {
            visit(&attrs.size, acc);
            visit(&attrs.length, acc);
            collect_dependency_vars(elem, acc);
        }
        IdlType::Bigarray { dims, elem } => {
            for d in dims {
                visit(&d.size, acc);
                visit(&d.length, acc);
            }
            collect_dependency_vars(elem, acc);
        }
        IdlType::Union { discriminant, .. } => visit(discriminant, acc),
        IdlType::Pointer { target, .. } => collect_dependency_vars(target, acc),
        IdlType::Const { inner } => collect_dependency_vars(inner, acc),
        _ => {}
    }
}
