// JSON schema types matching the resolved-descriptor dump of the IDL front end.

use std::fmt;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Top-level file wrapper
// ---------------------------------------------------------------------------

/// One resolved IDL module, as produced by the parser/type resolver.
#[derive(Deserialize, Clone, Debug)]
pub struct ModuleFile {
    pub module: String,
    #[serde(default)]
    pub typedefs: Vec<TypedefDecl>,
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceDecl>,
}

// ---------------------------------------------------------------------------
// Functions and parameters
// ---------------------------------------------------------------------------

/// Parameter passing direction.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    In,
    Out,
    InOut,
}

impl Direction {
    /// Whether the caller supplies a value for this parameter.
    pub fn is_input(self) -> bool {
        matches!(self, Direction::In | Direction::InOut)
    }

    /// Whether the callee writes a value through this parameter.
    pub fn is_output(self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
            Direction::InOut => write!(f, "in,out"),
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "dir")]
    pub direction: Direction,
    #[serde(rename = "type")]
    pub ty: IdlType,
}

impl ParamDecl {
    pub fn new(name: impl Into<String>, direction: Direction, ty: IdlType) -> Self {
        ParamDecl { name: name.into(), direction, ty }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(rename = "mod")]
    pub module: String,
    #[serde(default = "void_type")]
    pub result: IdlType,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    /// Name of the managed-side binding. Falls back to `name`.
    #[serde(default)]
    pub ml_name: Option<String>,
    /// User-supplied calling sequence, emitted verbatim.
    #[serde(default)]
    pub call: Option<String>,
    /// User-supplied deallocation sequence, emitted verbatim before returning.
    #[serde(default)]
    pub dealloc: Option<String>,
    #[serde(default)]
    pub blocking: bool,
}

fn void_type() -> IdlType {
    IdlType::Void
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>, module: impl Into<String>, result: IdlType) -> Self {
        FunctionDecl {
            name: name.into(),
            module: module.into(),
            result,
            params: Vec::new(),
            ml_name: None,
            call: None,
            dealloc: None,
            blocking: false,
        }
    }

    pub fn with_param(mut self, name: &str, direction: Direction, ty: IdlType) -> Self {
        self.params.push(ParamDecl::new(name, direction, ty));
        self
    }

    pub fn ml_name(&self) -> &str {
        self.ml_name.as_deref().unwrap_or(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Interfaces
// ---------------------------------------------------------------------------

#[derive(Deserialize, Clone, Debug)]
pub struct InterfaceDecl {
    pub name: String,
    #[serde(rename = "mod")]
    pub module: String,
    #[serde(rename = "super", default)]
    pub super_interface: Option<String>,
    /// Methods declared on this interface (inherited ones are wrapped on the parent).
    #[serde(default)]
    pub methods: Vec<FunctionDecl>,
}

// ---------------------------------------------------------------------------
// Typedefs
// ---------------------------------------------------------------------------

#[derive(Deserialize, Clone, Debug)]
pub struct TypedefDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: IdlType,
    /// Values of this type report failure status instead of a result.
    #[serde(default)]
    pub errorcode: bool,
    /// Native function called on every value of this type after a call.
    #[serde(default)]
    pub errorcheck: Option<String>,
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntKind {
    Int,
    UInt,
    Long,
    ULong,
    Hyper,
    UHyper,
    Small,
    USmall,
    Short,
    UShort,
    Char,
    UChar,
    Byte,
    Boolean,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    /// Never NULL.
    Ref,
    /// May be NULL; maps to an option on the managed side.
    Unique,
    /// Full pointer; treated like `Unique`.
    Ptr,
    /// Parameter is not exposed to the managed side at all.
    Ignore,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ArrayAttrs {
    /// Fixed bound, as in `int x[10]`.
    #[serde(default)]
    pub bound: Option<LExpr>,
    #[serde(default)]
    pub size: Option<LExpr>,
    #[serde(default)]
    pub length: Option<LExpr>,
    #[serde(default)]
    pub is_string: bool,
    #[serde(default)]
    pub is_bytes: bool,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct BigarrayDim {
    #[serde(default)]
    pub size: Option<LExpr>,
    #[serde(default)]
    pub length: Option<LExpr>,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdlType {
    Void,
    Int { int: IntKind },
    Float,
    Double,
    Named {
        #[serde(rename = "mod")]
        module: String,
        name: String,
    },
    Struct {
        #[serde(rename = "mod")]
        module: String,
        name: String,
    },
    Union {
        #[serde(rename = "mod")]
        module: String,
        name: String,
        #[serde(default)]
        discriminant: Option<LExpr>,
    },
    Enum {
        #[serde(rename = "mod")]
        module: String,
        name: String,
    },
    Pointer {
        pointer: PointerKind,
        target: Box<IdlType>,
    },
    Array {
        #[serde(default)]
        attrs: ArrayAttrs,
        elem: Box<IdlType>,
    },
    Bigarray {
        dims: Vec<BigarrayDim>,
        elem: Box<IdlType>,
    },
    Interface { name: String },
    Const { inner: Box<IdlType> },
}

impl IdlType {
    pub fn int() -> Self {
        IdlType::Int { int: IntKind::Int }
    }

    pub fn named(module: &str, name: &str) -> Self {
        IdlType::Named { module: module.to_string(), name: name.to_string() }
    }

    pub fn pointer(kind: PointerKind, target: IdlType) -> Self {
        IdlType::Pointer { pointer: kind, target: Box::new(target) }
    }

    /// Array whose element count is given by `size_is(size)`.
    pub fn sized_array(elem: IdlType, size: LExpr) -> Self {
        IdlType::Array {
            attrs: ArrayAttrs { size: Some(size), ..ArrayAttrs::default() },
            elem: Box::new(elem),
        }
    }

    /// Null-terminated `char` string.
    pub fn string() -> Self {
        IdlType::Array {
            attrs: ArrayAttrs { is_string: true, ..ArrayAttrs::default() },
            elem: Box::new(IdlType::Int { int: IntKind::Char }),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, IdlType::Void)
    }

    /// Strip `const` qualifiers.
    pub fn scrape_const(&self) -> &IdlType {
        match self {
            IdlType::Const { inner } => inner.scrape_const(),
            ty => ty,
        }
    }
}

// ---------------------------------------------------------------------------
// Dependency expressions (size_is / length_is / switch_is)
// ---------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LExpr {
    Var { name: String },
    Deref { expr: Box<LExpr> },
    Int { value: i64 },
    Neg { expr: Box<LExpr> },
    Binary { bin: BinOp, lhs: Box<LExpr>, rhs: Box<LExpr> },
    Sizeof { ty: Box<IdlType> },
}

impl LExpr {
    pub fn var(name: &str) -> Self {
        LExpr::Var { name: name.to_string() }
    }

    pub fn deref(expr: LExpr) -> Self {
        LExpr::Deref { expr: Box::new(expr) }
    }
}
