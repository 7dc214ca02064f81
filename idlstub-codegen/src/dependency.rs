// Dependent-parameter analysis: which parameters the managed caller never sees.

use crate::schema::{Direction, ParamDecl};
use crate::type_map::TypeCapabilities;

/// Whether a parameter `name` with direction `dir` is derived from its siblings.
///
/// A size/length/discriminant reference from an In or InOut parameter always
/// makes the target dependent. A reference from an Out parameter only does
/// so when the target is itself Out: an input that sizes an output buffer
/// must still be passed so the buffer can be allocated.
pub fn is_dependent_parameter(name: &str, dir: Direction, params: &[ParamDecl]) -> bool {
    params.iter().any(|consumer| match (dir, consumer.direction) {
        (_, Direction::In | Direction::InOut) => consumer.ty.depends_on(name),
        (Direction::Out, Direction::Out) => consumer.ty.depends_on(name),
        _ => false,
    })
}

/// Drop ignorable and dependent parameters, keeping survivors in declaration order.
pub fn reduce(params: &[ParamDecl]) -> Vec<ParamDecl> {
    params
        .iter()
        .filter(|p| !p.ty.is_ignorable() && !is_dependent_parameter(&p.name, p.direction, params))
        .cloned()
        .collect()
}
