// Managed-side view of a function: what the caller passes and what it gets back.

use crate::dependency;
use crate::schema::{Direction, FunctionDecl, IdlType, ParamDecl};
use crate::type_map::TypeCapabilities;
use crate::typedefs::TypedefRegistry;

/// Name under which the native result travels in the output list.
pub const RESULT_NAME: &str = "_res";

/// One managed-visible slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewEntry {
    pub name: String,
    pub ty: IdlType,
}

impl ViewEntry {
    fn of(param: &ParamDecl) -> Self {
        ViewEntry { name: param.name.clone(), ty: param.ty.clone() }
    }
}

/// Managed inputs and outputs, recomputed for every emission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManagedView {
    pub inputs: Vec<ViewEntry>,
    pub outputs: Vec<ViewEntry>,
}

impl ManagedView {
    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.iter().map(|e| e.name.as_str()).collect()
    }
}

/// Split already-reduced parameters into managed inputs and outputs.
pub fn project(fun: &FunctionDecl, reduced: &[ParamDecl], typedefs: &dyn TypedefRegistry) -> ManagedView {
    let mut view = ManagedView::default();

    for param in reduced {
        match param.direction {
            Direction::In => view.inputs.push(ViewEntry::of(param)),
            Direction::Out => view.outputs.push(ViewEntry::of(param)),
            Direction::InOut => {
                view.inputs.push(ViewEntry::of(param));
                // In-place buffers are observed through the input value itself.
                if !param.ty.is_fixed_external_buffer() {
                    view.outputs.push(ViewEntry::of(param));
                }
            }
        }
    }

    if !fun.result.is_void() && !fun.result.is_error_code(typedefs) {
        view.outputs.push(ViewEntry { name: RESULT_NAME.to_string(), ty: fun.result.clone() });
    }

    view
}

/// Reduce then project.
pub fn ml_view(fun: &FunctionDecl, typedefs: &dyn TypedefRegistry) -> ManagedView {
    let reduced = dependency::reduce(&fun.params);
    project(fun, &reduced, typedefs)
}
