use crate::value::Value;

/// Outcome of executing a single statement. `Return` carries the value
/// of a `return` upward until a call site unwraps it; past the
/// outermost statement it simply ends the program.
#[derive(Debug, Clone)]
pub enum ControlFlow {
    Next,
    Return(Value),
}
