use std::io::Write;
use std::rc::Rc;

use super::builtins;
use super::control_flow::ControlFlow;
use super::environment::Environment;
use super::error::RuntimeError;
use crate::ast::{Expr, ExprKind, InfixOp, PrefixOp, Program, Stmt};
use crate::value::{Function, Value};

/// Tree-walking evaluator. Generic over its output sink so tests can
/// run programs against an in-memory buffer.
pub struct Interpreter<W: Write> {
    globals: Environment,
    out: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        Self {
            globals: Environment::new(),
            out,
        }
    }

    /// Executes the program against a fresh global scope. The first
    /// runtime error stops execution; a top-level `return` merely ends
    /// the program.
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        let env = self.globals.clone();
        for stmt in &program.statements {
            if let ControlFlow::Return(_) = self.execute(stmt, &env)? {
                break;
            }
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt, env: &Environment) -> Result<ControlFlow, RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr, env)?;
                Ok(ControlFlow::Next)
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr, env)?;
                writeln!(self.out, "{}", value).ok();
                Ok(ControlFlow::Next)
            }
            Stmt::Block(stmts) => self.execute_block(stmts, &env.enclosed()),
            Stmt::Var {
                name, initializer, ..
            } => {
                let value = self.evaluate(initializer, env)?;
                env.define(name.clone(), value);
                Ok(ControlFlow::Next)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.evaluate(condition, env)?.is_truthy() {
                    self.execute(then_branch, env)
                } else if let Some(alt) = else_branch {
                    self.execute(alt, env)
                } else {
                    Ok(ControlFlow::Next)
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                while self.evaluate(condition, env)?.is_truthy() {
                    if let ControlFlow::Return(value) = self.execute(body, env)? {
                        return Ok(ControlFlow::Return(value));
                    }
                }
                Ok(ControlFlow::Next)
            }
            // The whole header and every iteration share one scope
            // enclosing the surrounding one, so loop variables do not
            // leak out.
            Stmt::For {
                init,
                condition,
                step,
                body,
                ..
            } => {
                let scope = env.enclosed();
                if let Some(init) = init {
                    self.execute(init, &scope)?;
                }
                loop {
                    let keep_going = match condition {
                        Some(cond) => self.evaluate(cond, &scope)?.is_truthy(),
                        None => true,
                    };
                    if !keep_going {
                        break;
                    }
                    if let ControlFlow::Return(value) = self.execute(body, &scope)? {
                        return Ok(ControlFlow::Return(value));
                    }
                    if let Some(step) = step {
                        self.execute(step, &scope)?;
                    }
                }
                Ok(ControlFlow::Next)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr, env)?,
                    None => Value::Nil,
                };
                Ok(ControlFlow::Return(value))
            }
            Stmt::Function {
                name, params, body, ..
            } => {
                let function = Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                    env: env.clone(),
                };
                env.define(name.clone(), Value::Function(Rc::new(function)));
                Ok(ControlFlow::Next)
            }
        }
    }

    fn execute_block(
        &mut self,
        stmts: &[Stmt],
        env: &Environment,
    ) -> Result<ControlFlow, RuntimeError> {
        for stmt in stmts {
            if let ControlFlow::Return(value) = self.execute(stmt, env)? {
                return Ok(ControlFlow::Return(value));
            }
        }
        Ok(ControlFlow::Next)
    }

    fn evaluate(&mut self, expr: &Expr, env: &Environment) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::Nil => Ok(Value::Nil),
            ExprKind::Boolean(b) => Ok(Value::Bool(*b)),
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::String(s) => Ok(Value::String(s.clone())),
            ExprKind::Identifier(name) => resolve(name, env),
            ExprKind::Group(inner) => self.evaluate(inner, env),
            ExprKind::Prefix { op, right } => {
                let right = self.evaluate(right, env)?;
                eval_prefix(*op, right)
            }
            // `and`/`or` skip the generic operand path: the right side
            // is only touched when the left side did not decide, and
            // the deciding operand is returned as-is.
            ExprKind::Infix {
                op: InfixOp::And,
                left,
                right,
            } => {
                let left = self.evaluate(left, env)?;
                if left.is_truthy() {
                    self.evaluate(right, env)
                } else {
                    Ok(left)
                }
            }
            ExprKind::Infix {
                op: InfixOp::Or,
                left,
                right,
            } => {
                let left = self.evaluate(left, env)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate(right, env)
                }
            }
            ExprKind::Infix { op, left, right } => {
                let left = self.evaluate(left, env)?;
                let right = self.evaluate(right, env)?;
                eval_infix(*op, left, right)
            }
            ExprKind::Assign { name, value } => {
                let value = self.evaluate(value, env)?;
                if env.assign(name, value.clone()) {
                    Ok(value)
                } else {
                    Err(RuntimeError::undefined_variable(name.as_ref()))
                }
            }
            ExprKind::Call { callee, args } => {
                let callee = self.evaluate(callee, env)?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.evaluate(arg, env)?);
                }
                match callee {
                    Value::Function(function) => self.call_function(&function, arg_values),
                    Value::Native(native) => (native.func)(&arg_values),
                    other => Err(RuntimeError::not_callable(other.type_name())),
                }
            }
        }
    }

    fn call_function(
        &mut self,
        function: &Function,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        if args.len() != function.params.len() {
            return Err(RuntimeError::arity_mismatch(
                function.params.len(),
                args.len(),
            ));
        }
        let scope = function.env.enclosed();
        for (param, arg) in function.params.iter().zip(args) {
            scope.define(param.clone(), arg);
        }
        match self.execute_block(&function.body, &scope)? {
            ControlFlow::Return(value) => Ok(value),
            ControlFlow::Next => Ok(Value::Nil),
        }
    }
}

// The native registry is a fallback: any binding in the chain wins.
fn resolve(name: &str, env: &Environment) -> Result<Value, RuntimeError> {
    if let Some(value) = env.get(name) {
        return Ok(value);
    }
    builtins::lookup(name)
        .map(Value::Native)
        .ok_or_else(|| RuntimeError::undefined_variable(name))
}

fn eval_prefix(op: PrefixOp, right: Value) -> Result<Value, RuntimeError> {
    match op {
        PrefixOp::Not => Ok(Value::Bool(!right.is_truthy())),
        PrefixOp::Neg => right
            .as_number()
            .map(|n| Value::Number(-n))
            .ok_or(RuntimeError::OperandMustBeNumber),
    }
}

fn eval_infix(op: InfixOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    if let (Some(l), Some(r)) = (left.as_number(), right.as_number()) {
        return eval_number_infix(op, l, r);
    }
    if let (Some(l), Some(r)) = (left.as_string(), right.as_string()) {
        return eval_string_infix(op, l, r);
    }
    match op {
        InfixOp::Equal => Ok(Value::Bool(left == right)),
        InfixOp::NotEqual => Ok(Value::Bool(left != right)),
        _ => Err(RuntimeError::OperandsMustBeNumbers),
    }
}

fn eval_number_infix(op: InfixOp, left: f64, right: f64) -> Result<Value, RuntimeError> {
    let value = match op {
        InfixOp::Add => Value::Number(left + right),
        InfixOp::Sub => Value::Number(left - right),
        InfixOp::Mul => Value::Number(left * right),
        InfixOp::Div => Value::Number(left / right),
        InfixOp::Less => Value::Bool(left < right),
        InfixOp::LessEqual => Value::Bool(left <= right),
        InfixOp::Greater => Value::Bool(left > right),
        InfixOp::GreaterEqual => Value::Bool(left >= right),
        InfixOp::Equal => Value::Bool(left == right),
        InfixOp::NotEqual => Value::Bool(left != right),
        InfixOp::And | InfixOp::Or => unreachable!("short-circuited before operand evaluation"),
    };
    Ok(value)
}

fn eval_string_infix(op: InfixOp, left: &str, right: &str) -> Result<Value, RuntimeError> {
    match op {
        InfixOp::Add => Ok(Value::String(Rc::from(format!("{}{}", left, right)))),
        InfixOp::Equal => Ok(Value::Bool(left == right)),
        InfixOp::NotEqual => Ok(Value::Bool(left != right)),
        InfixOp::And | InfixOp::Or => unreachable!("short-circuited before operand evaluation"),
        _ => Err(RuntimeError::OperandsMustBeNumbers),
    }
}
