// Typedef registry: per-type error-code flag and error-check function.

use std::collections::HashMap;

use crate::schema::TypedefDecl;

/// Metadata the marshaling core needs about a named type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedefInfo {
    pub errorcode: bool,
    pub errorcheck: Option<String>,
}

/// Lookup of typedef metadata by type name.
pub trait TypedefRegistry {
    fn find(&self, name: &str) -> Option<&TypedefInfo>;
}

/// Registry built from the typedefs of the module being compiled.
#[derive(Debug, Clone, Default)]
pub struct TypedefTable {
    entries: HashMap<String, TypedefInfo>,
}

impl TypedefTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_decls(decls: &[TypedefDecl]) -> Self {
        let mut table = TypedefTable::new();
        for td in decls {
            table.insert(
                &td.name,
                TypedefInfo { errorcode: td.errorcode, errorcheck: td.errorcheck.clone() },
            );
        }
        table
    }

    pub fn insert(&mut self, name: &str, info: TypedefInfo) {
        self.entries.insert(name.to_string(), info);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TypedefRegistry for TypedefTable {
    fn find(&self, name: &str) -> Option<&TypedefInfo> {
        self.entries.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::IdlType;

    #[test]
    fn test_from_decls() {
        let decls = vec![TypedefDecl {
            name: "HRESULT".into(),
            ty: IdlType::Int { int: crate::schema::IntKind::Long },
            errorcode: true,
            errorcheck: Some("check_hresult".into()),
        }];
        let table = TypedefTable::from_decls(&decls);
        let info = table.find("HRESULT").unwrap();
        assert!(info.errorcode);
        assert_eq!(info.errorcheck.as_deref(), Some("check_hresult"));
        assert!(table.find("DWORD").is_none());
        assert_eq!(table.len(), 1);
    }
}
