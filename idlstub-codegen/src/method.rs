// Interface methods as standalone functions with an explicit receiver.

use crate::c_gen::call::CallStrategy;
use crate::naming;
use crate::schema::{Direction, FunctionDecl, IdlType, InterfaceDecl, ParamDecl, PointerKind};

/// Name of the receiver parameter added to every method.
pub const RECEIVER_NAME: &str = "this";

/// Native type of the receiver of `interface`'s methods.
pub fn receiver_type(interface: &str) -> IdlType {
    IdlType::pointer(PointerKind::Ref, IdlType::Interface { name: interface.to_string() })
}

/// Function descriptor for `method` of `intf`: composed name, the interface's
/// module, and the receiver prepended to the parameter list. The method
/// declaration itself is left untouched.
pub fn derive_method(intf: &InterfaceDecl, method: &FunctionDecl) -> FunctionDecl {
    let mut params = Vec::with_capacity(method.params.len() + 1);
    params.push(ParamDecl::new(RECEIVER_NAME, Direction::In, receiver_type(&intf.name)));
    params.extend(method.params.iter().cloned());

    FunctionDecl {
        name: naming::method_wrapper_name(&intf.name, &method.name),
        module: intf.module.clone(),
        result: method.result.clone(),
        params,
        ml_name: Some(naming::method_wrapper_name(&intf.name, method.ml_name())),
        call: method.call.clone(),
        dealloc: method.dealloc.clone(),
        blocking: method.blocking,
    }
}

/// A method is dispatched through the table unless its call is overridden.
pub fn method_strategy(intf: &InterfaceDecl, method: &FunctionDecl) -> CallStrategy {
    match &method.call {
        Some(text) => CallStrategy::UserOverride(text.clone()),
        None => CallStrategy::VirtualDispatch {
            interface: intf.name.clone(),
            method: method.name.clone(),
        },
    }
}
