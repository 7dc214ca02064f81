// IDL type queries used by the marshaling core, and C declarator rendering.

use crate::schema::{IdlType, IntKind, PointerKind};
use crate::typedefs::TypedefRegistry;

/// The questions the function-marshaling core asks about a parameter type.
///
/// Everything else about a type (layout, element conversion) belongs to the
/// marshaller; the core only needs these four answers.
pub trait TypeCapabilities {
    /// Whether `name` appears in a size, length or discriminant expression of this type.
    fn depends_on(&self, name: &str) -> bool;
    /// Whether a parameter of this type is hidden from the managed side.
    fn is_ignorable(&self) -> bool;
    /// Caller-owned storage that the callee mutates in place (byte arrays, bigarrays).
    fn is_fixed_external_buffer(&self) -> bool;
    /// Whether this type, looking through pointers and qualifiers, is an error-code typedef.
    fn is_error_code(&self, typedefs: &dyn TypedefRegistry) -> bool;
}

impl TypeCapabilities for IdlType {
    fn depends_on(&self, name: &str) -> bool {
        match self {
            IdlType::Array { attrs, elem } => {
                attrs.size.as_ref().is_some_and(|e| e.mentions(name))
                    || attrs.length.as_ref().is_some_and(|e| e.mentions(name))
                    || elem.depends_on(name)
            }
            IdlType::Bigarray { dims, elem } => {
                dims.iter().any(|d| {
                    d.size.as_ref().is_some_and(|e| e.mentions(name))
                        || d.length.as_ref().is_some_and(|e| e.mentions(name))
                }) || elem.depends_on(name)
            }
            IdlType::Union { discriminant, .. } => {
                discriminant.as_ref().is_some_and(|e| e.mentions(name))
            }
            IdlType::Pointer { target, .. } => target.depends_on(name),
            IdlType::Const { inner } => inner.depends_on(name),
            _ => false,
        }
    }

    fn is_ignorable(&self) -> bool {
        matches!(self, IdlType::Pointer { pointer: PointerKind::Ignore, .. })
    }

    fn is_fixed_external_buffer(&self) -> bool {
        match self.scrape_const() {
            IdlType::Array { attrs, .. } => attrs.is_bytes,
            IdlType::Bigarray { .. } => true,
            _ => false,
        }
    }

    fn is_error_code(&self, typedefs: &dyn TypedefRegistry) -> bool {
        match self {
            IdlType::Named { name, .. } => typedefs.find(name).is_some_and(|td| td.errorcode),
            IdlType::Pointer { target, .. } => target.is_error_code(typedefs),
            IdlType::Const { inner } => inner.is_error_code(typedefs),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// C declarators
// ---------------------------------------------------------------------------

/// Unbounded array behind a pointer, which C spells as the pointer itself.
pub fn open_array(ty: &IdlType) -> Option<&IdlType> {
    match ty.scrape_const() {
        IdlType::Pointer { target, .. } => match target.scrape_const() {
            arr @ IdlType::Array { attrs, .. } if attrs.bound.is_none() => Some(arr),
            _ => None,
        },
        _ => None,
    }
}

/// C spelling of an integer kind.
pub fn c_int_name(kind: IntKind) -> &'static str {
    match kind {
        IntKind::Int => "int",
        IntKind::UInt => "unsigned int",
        IntKind::Long => "long",
        IntKind::ULong => "unsigned long",
        IntKind::Hyper => "long long",
        IntKind::UHyper => "unsigned long long",
        IntKind::Small => "signed char",
        IntKind::USmall => "unsigned char",
        IntKind::Short => "short",
        IntKind::UShort => "unsigned short",
        IntKind::Char => "char",
        IntKind::UChar => "unsigned char",
        IntKind::Byte => "unsigned char",
        IntKind::Boolean => "int",
    }
}

/// Declare `name` with type `ty`, e.g. `int *buf` or `double m[4]`.
pub fn c_declaration(name: &str, ty: &IdlType) -> String {
    declarator(ty, name.to_string())
}

/// Abstract declarator for `ty` (no variable name), e.g. `int *`.
pub fn c_type_name(ty: &IdlType) -> String {
    declarator(ty, String::new()).trim_end().to_string()
}

fn declarator(ty: &IdlType, inner: String) -> String {
    match ty {
        IdlType::Pointer { target, .. } => match target.scrape_const() {
            IdlType::Array { attrs, .. } if attrs.bound.is_some() => {
                declarator(target, format!("(*{inner})"))
            }
            // `[size_is(n)] int *p` is the open array itself.
            target @ IdlType::Array { .. } => declarator(target, inner),
            _ => declarator(target, format!("*{inner}")),
        },
        IdlType::Array { attrs, elem } => match &attrs.bound {
            Some(bound) => {
                let scope = crate::lexpr::NameScope::default();
                declarator(elem, format!("{inner}[{}]", scope.render(bound)))
            }
            None => declarator(elem, format!("*{inner}")),
        },
        IdlType::Bigarray { elem, .. } => declarator(elem, format!("*{inner}")),
        IdlType::Const { inner: base } => format!("const {}", declarator(base, inner)),
        base => {
            let spelled = base_type_name(base);
            if inner.is_empty() {
                format!("{spelled} ")
            } else {
                format!("{spelled} {inner}")
            }
        }
    }
}

fn base_type_name(ty: &IdlType) -> String {
    match ty {
        IdlType::Void => "void".into(),
        IdlType::Int { int } => c_int_name(*int).into(),
        IdlType::Float => "float".into(),
        IdlType::Double => "double".into(),
        IdlType::Named { name, .. } => name.clone(),
        IdlType::Struct { name, .. } => format!("struct {name}"),
        IdlType::Union { name, .. } => format!("union {name}"),
        IdlType::Enum { name, .. } => format!("enum {name}"),
        IdlType::Interface { name } => format!("struct {name}"),
        // Composite shapes are handled by `declarator`.
        IdlType::Pointer { .. } | IdlType::Array { .. } | IdlType::Bigarray { .. } | IdlType::Const { .. } => {
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ArrayAttrs, BigarrayDim, LExpr};
    use crate::typedefs::{TypedefInfo, TypedefTable};

    fn hresult_table() -> TypedefTable {
        let mut t = TypedefTable::new();
        t.insert("HRESULT", TypedefInfo { errorcode: true, errorcheck: None });
        t.insert("DWORD", TypedefInfo::default());
        t
    }

    #[test]
    fn test_depends_on_through_pointer_and_const() {
        let arr = IdlType::sized_array(IdlType::int(), LExpr::var("n"));
        let ty = IdlType::Const { inner: Box::new(IdlType::pointer(PointerKind::Ref, arr)) };
        assert!(ty.depends_on("n"));
        assert!(!ty.depends_on("m"));
    }

    #[test]
    fn test_depends_on_length_and_discriminant() {
        let arr = IdlType::Array {
            attrs: ArrayAttrs {
                size: Some(LExpr::var("max")),
                length: Some(LExpr::deref(LExpr::var("len"))),
                ..ArrayAttrs::default()
            },
            elem: Box::new(IdlType::Double),
        };
        assert!(arr.depends_on("max"));
        assert!(arr.depends_on("len"));

        let u = IdlType::Union {
            module: "m".into(),
            name: "U".into(),
            discriminant: Some(LExpr::var("kind")),
        };
        assert!(u.depends_on("kind"));

        let ba = IdlType::Bigarray {
            dims: vec![BigarrayDim { size: Some(LExpr::var("rows")), length: None }],
            elem: Box::new(IdlType::Float),
        };
        assert!(ba.depends_on("rows"));
    }

    #[test]
    fn test_ignorable() {
        assert!(IdlType::pointer(PointerKind::Ignore, IdlType::int()).is_ignorable());
        assert!(!IdlType::pointer(PointerKind::Ref, IdlType::int()).is_ignorable());
    }

    #[test]
    fn test_fixed_external_buffer() {
        let bytes = IdlType::Array {
            attrs: ArrayAttrs { is_bytes: true, ..ArrayAttrs::default() },
            elem: Box::new(IdlType::Int { int: IntKind::UChar }),
        };
        assert!(bytes.is_fixed_external_buffer());
        assert!(IdlType::Const { inner: Box::new(bytes) }.is_fixed_external_buffer());
        assert!(!IdlType::string().is_fixed_external_buffer());
        let ba = IdlType::Bigarray { dims: vec![], elem: Box::new(IdlType::Double) };
        assert!(ba.is_fixed_external_buffer());
    }

    #[test]
    fn test_error_code_unwraps_pointers() {
        let t = hresult_table();
        let hr = IdlType::named("m", "HRESULT");
        assert!(hr.is_error_code(&t));
        assert!(IdlType::pointer(PointerKind::Ref, hr).is_error_code(&t));
        assert!(!IdlType::named("m", "DWORD").is_error_code(&t));
        assert!(!IdlType::int().is_error_code(&t));
    }

    #[test]
    fn test_c_declarations() {
        assert_eq!(c_declaration("x", &IdlType::int()), "int x");
        assert_eq!(
            c_declaration("buf", &IdlType::sized_array(IdlType::Double, LExpr::var("n"))),
            "double *buf"
        );
        assert_eq!(
            c_declaration("p", &IdlType::pointer(PointerKind::Ref, IdlType::int())),
            "int *p"
        );
        let fixed = IdlType::Array {
            attrs: ArrayAttrs { bound: Some(LExpr::Int { value: 4 }), ..ArrayAttrs::default() },
            elem: Box::new(IdlType::Float),
        };
        assert_eq!(c_declaration("m", &fixed), "float m[4]");
        assert_eq!(
            c_declaration("pm", &IdlType::pointer(PointerKind::Ref, fixed)),
            "float (*pm)[4]"
        );
        assert_eq!(
            c_declaration(
                "this",
                &IdlType::pointer(PointerKind::Ref, IdlType::Interface { name: "IFoo".into() })
            ),
            "struct IFoo *this"
        );
        assert_eq!(
            c_declaration(
                "buf",
                &IdlType::pointer(PointerKind::Ref, IdlType::sized_array(IdlType::int(), LExpr::var("n")))
            ),
            "int *buf"
        );
        assert_eq!(c_type_name(&IdlType::pointer(PointerKind::Ref, IdlType::int())), "int *");
        assert_eq!(c_type_name(&IdlType::Int { int: IntKind::UShort }), "unsigned short");
    }
}
