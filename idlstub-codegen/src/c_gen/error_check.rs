// Post-call invocation of registered error-check functions.

use crate::schema::{IdlType, PointerKind};
use crate::typedefs::TypedefRegistry;

use super::body::CBody;

/// Emit `check(expr);` if `ty`, seen through pointers and qualifiers, is a
/// typedef with a registered checker. Each pointer level dereferences the
/// expression once; nullable pointers are tested first.
pub fn emit_error_check(typedefs: &dyn TypedefRegistry, body: &mut CBody, expr: &str, ty: &IdlType) {
    match ty {
        IdlType::Const { inner } => emit_error_check(typedefs, body, expr, inner),
        IdlType::Named { name, .. } => {
            if let Some(check) = typedefs.find(name).and_then(|td| td.errorcheck.as_deref()) {
                body.line(format!("{check}({expr});"));
            }
        }
        IdlType::Pointer { pointer: PointerKind::Ref, target } => {
            if has_checker(typedefs, target) {
                emit_error_check(typedefs, body, &format!("*{expr}"), target);
            }
        }
        IdlType::Pointer { pointer: PointerKind::Unique | PointerKind::Ptr, target } => {
            if has_checker(typedefs, target) {
                body.open(format!("if ({expr} != NULL)"));
                emit_error_check(typedefs, body, &format!("*{expr}"), target);
                body.close();
            }
        }
        _ => {}
    }
}

fn has_checker(typedefs: &dyn TypedefRegistry, ty: &IdlType) -> bool {
    match ty {
        IdlType::Const { inner } => has_checker(typedefs, inner),
        IdlType::Named { name, .. } => typedefs.find(name).is_some_and(|td| td.errorcheck.is_some()),
        IdlType::Pointer { pointer: PointerKind::Ignore, .. } => false,
        IdlType::Pointer { target, .. } => has_checker(typedefs, target),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typedefs::{TypedefInfo, TypedefTable};

    fn table() -> TypedefTable {
        let mut t = TypedefTable::new();
        t.insert(
            "HRESULT",
            TypedefInfo { errorcode: true, errorcheck: Some("camlidl_check_hresult".into()) },
        );
        t.insert("status", TypedefInfo { errorcode: false, errorcheck: None });
        t
    }

    fn run(expr: &str, ty: &IdlType) -> Vec<String> {
        let mut body = CBody::new();
        emit_error_check(&table(), &mut body, expr, ty);
        body.lines().iter().map(|l| l.trim().to_string()).collect()
    }

    #[test]
    fn test_named_checker() {
        assert_eq!(run("_res", &IdlType::named("m", "HRESULT")), vec!["camlidl_check_hresult(_res);"]);
    }

    #[test]
    fn test_unregistered_or_plain_types_emit_nothing() {
        assert!(run("_res", &IdlType::named("m", "status")).is_empty());
        assert!(run("_res", &IdlType::int()).is_empty());
        assert!(run("p", &IdlType::pointer(PointerKind::Ref, IdlType::int())).is_empty());
    }

    #[test]
    fn test_pointer_levels_dereference() {
        let hr = IdlType::named("m", "HRESULT");
        let ty = IdlType::Const { inner: Box::new(IdlType::pointer(PointerKind::Ref, hr)) };
        assert_eq!(run("p", &ty), vec!["camlidl_check_hresult(*p);"]);
    }

    #[test]
    fn test_unique_pointer_is_guarded() {
        let ty = IdlType::pointer(PointerKind::Unique, IdlType::named("m", "HRESULT"));
        assert_eq!(run("p", &ty), vec!["if (p != NULL) {", "camlidl_check_hresult(*p);", "}"]);
    }
}
