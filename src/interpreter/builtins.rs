use std::time::{SystemTime, UNIX_EPOCH};

use super::error::RuntimeError;
use crate::value::{NativeFunction, Value};

/// Resolves a native function by name. Consulted only after a name
/// misses the whole environment chain, so scripts may shadow natives.
pub fn lookup(name: &str) -> Option<NativeFunction> {
    match name {
        "clock" => Some(NativeFunction {
            name: "clock",
            func: native_clock,
        }),
        _ => None,
    }
}

fn native_clock(args: &[Value]) -> Result<Value, RuntimeError> {
    if !args.is_empty() {
        return Err(RuntimeError::arity_mismatch(0, args.len()));
    }
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    Ok(Value::Number(seconds.trunc()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_returns_a_number() {
        let value = native_clock(&[]).unwrap();
        assert!(matches!(value, Value::Number(n) if n > 0.0));
    }

    #[test]
    fn clock_rejects_arguments() {
        assert_eq!(
            native_clock(&[Value::Nil]),
            Err(RuntimeError::arity_mismatch(0, 1))
        );
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        assert!(lookup("clock").is_some());
        assert!(lookup("sleep").is_none());
    }
}
