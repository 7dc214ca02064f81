// Call strategies: the invocation step of a wrapper.
//
// Every strategy shares the surrounding wrapper phases; only the text of the
// call itself (and, for methods, a short prologue) differs.

use crate::context::WrapperCx;
use crate::method::RECEIVER_NAME;
use crate::naming;
use crate::schema::{FunctionDecl, ParamDecl};
use crate::view::RESULT_NAME;

use super::body::CBody;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStrategy {
    /// Ordinary native function, called by name.
    Plain,
    /// Method looked up in the receiver's dispatch table.
    VirtualDispatch { interface: String, method: String },
    /// Caller-supplied calling sequence, emitted verbatim.
    UserOverride(String),
}

impl CallStrategy {
    /// Strategy for a plain function: its `call` override if any, else a direct call.
    pub fn for_function(fun: &FunctionDecl) -> Self {
        match &fun.call {
            Some(text) => CallStrategy::UserOverride(text.clone()),
            None => CallStrategy::Plain,
        }
    }

    /// Name of the parameter this strategy extracts itself, if any.
    pub fn receiver(&self) -> Option<&str> {
        match self {
            CallStrategy::VirtualDispatch { .. } => Some(RECEIVER_NAME),
            _ => None,
        }
    }

    /// Statements that must open the wrapper body, ahead of every other phase.
    pub fn emit_prologue(&self, cx: &mut WrapperCx<'_>, body: &mut CBody) {
        if let CallStrategy::VirtualDispatch { interface, .. } = self {
            body.line(format!(
                "{RECEIVER_NAME} = (struct {interface} *) {}({}, NULL);",
                cx.target.unpack_interface,
                naming::managed_formal(RECEIVER_NAME)
            ));
            body.line(&cx.target.error_reset);
        }
    }

    /// The native invocation, bracketed by the blocking markers when requested.
    pub fn emit_call(&self, fun: &FunctionDecl, locals: &[ParamDecl], cx: &mut WrapperCx<'_>, body: &mut CBody) {
        if fun.blocking {
            body.line(&cx.target.enter_blocking);
        }
        let assign = if fun.result.is_void() {
            String::new()
        } else {
            format!("{RESULT_NAME} = ")
        };
        match self {
            CallStrategy::Plain => {
                let args: Vec<&str> = locals.iter().map(|p| p.name.as_str()).collect();
                body.line(format!("{assign}{}({});", fun.name, args.join(", ")));
            }
            CallStrategy::VirtualDispatch { method, .. } => {
                let mut args = vec![RECEIVER_NAME];
                args.extend(
                    locals
                        .iter()
                        .map(|p| p.name.as_str())
                        .filter(|n| *n != RECEIVER_NAME),
                );
                body.line(format!(
                    "{assign}{RECEIVER_NAME}->lpVtbl->{method}({});",
                    args.join(", ")
                ));
            }
            CallStrategy::UserOverride(text) => {
                body.line("/* begin user-supplied calling sequence */");
                body.verbatim(text);
                body.line("/* end user-supplied calling sequence */");
            }
        }
        if fun.blocking {
            body.line(&cx.target.leave_blocking);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetNames;
    use crate::schema::{Direction, IdlType};
    use crate::typedefs::TypedefTable;

    fn emit(strategy: &CallStrategy, fun: &FunctionDecl) -> Vec<String> {
        let target = TargetNames::default();
        let typedefs = TypedefTable::new();
        let mut cx = WrapperCx::new(&fun.name, &target, &typedefs);
        let mut body = CBody::new();
        strategy.emit_prologue(&mut cx, &mut body);
        strategy.emit_call(fun, &fun.params, &mut cx, &mut body);
        body.lines().iter().map(|l| l.trim().to_string()).collect()
    }

    #[test]
    fn test_plain_call() {
        let fun = FunctionDecl::new("sum", "vec", IdlType::int())
            .with_param("n", Direction::In, IdlType::int())
            .with_param("buf", Direction::In, IdlType::int());
        assert_eq!(emit(&CallStrategy::Plain, &fun), vec!["_res = sum(n, buf);"]);
    }

    #[test]
    fn test_void_blocking_call() {
        let mut fun = FunctionDecl::new("sleep_for", "sys", IdlType::Void)
            .with_param("ms", Direction::In, IdlType::int());
        fun.blocking = true;
        assert_eq!(
            emit(&CallStrategy::Plain, &fun),
            vec!["enter_blocking_section();", "sleep_for(ms);", "leave_blocking_section();"]
        );
    }

    #[test]
    fn test_virtual_dispatch() {
        let fun = FunctionDecl::new("IFoo_Bar", "m", IdlType::Void)
            .with_param("this", Direction::In, IdlType::Interface { name: "IFoo".into() })
            .with_param("x", Direction::In, IdlType::int());
        let strategy = CallStrategy::VirtualDispatch { interface: "IFoo".into(), method: "Bar".into() };
        assert_eq!(strategy.receiver(), Some("this"));
        assert_eq!(
            emit(&strategy, &fun),
            vec![
                "this = (struct IFoo *) camlidl_unpack_interface(_v_this, NULL);",
                "camlidl_reset_errinfo();",
                "this->lpVtbl->Bar(this, x);",
            ]
        );
    }

    #[test]
    fn test_user_override() {
        let mut fun = FunctionDecl::new("f", "m", IdlType::int());
        fun.call = Some("_res = f_impl(42);".into());
        let strategy = CallStrategy::for_function(&fun);
        assert_eq!(strategy.receiver(), None);
        assert_eq!(
            emit(&strategy, &fun),
            vec![
                "/* begin user-supplied calling sequence */",
                "_res = f_impl(42);",
                "/* end user-supplied calling sequence */",
            ]
        );
    }
}
