// Name conversion utilities for codegen.

/// Lower-case the first character (managed value names must start lower-case).
pub fn uncapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Name of the managed formal carrying parameter `name` into a wrapper.
pub fn managed_formal(name: &str) -> String {
    format!("_v_{name}")
}

/// Composed name of the wrapper for method `method` of interface `interface`.
pub fn method_wrapper_name(interface: &str, method: &str) -> String {
    format!("{interface}_{method}")
}

const RESERVED_WORDS: &[&str] = &[
    "and", "as", "assert", "begin", "class", "constraint", "do", "done", "downto",
    "else", "end", "exception", "external", "false", "for", "fun", "function",
    "functor", "if", "in", "include", "inherit", "initializer", "lazy", "let",
    "match", "method", "module", "mutable", "new", "object", "of", "open", "or",
    "private", "rec", "sig", "struct", "then", "to", "true", "try", "type", "val",
    "virtual", "when", "while", "with",
];

/// Check if a name is reserved on the managed side.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Escape reserved words by appending `_`.
pub fn escape_reserved(name: &str) -> String {
    if is_reserved(name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Managed binding name for a function's `ml_name`.
pub fn ml_value_name(name: &str) -> String {
    escape_reserved(&uncapitalize(name))
}
