//! Tree-walking interpreter
//!
//! Everything one top-level call needs travels in an [`ExecutionContext`]:
//! the library, the function table, the register, the static-result cache,
//! the notifier, the host, and the current invocation depth. There is no
//! process-wide state; two engines never observe each other.
//!
//! Statements return `Result<Signal, ExecutionFault>`. Faults unwind to the
//! nearest prog boundary: a nested `@prog(...)` call that faults is reported
//! there and yields a typed null, except for recursion-limit faults, which
//! unwind all the way to the root so the chain is reported exactly once.

use std::cmp::Ordering;

use tracing::{trace, warn};

use prog_compiler::{
    BinaryOp, Expr, ExprKind, FunctionId, ProgId, RETURN_SLOT, Statement, StatementKind, UnaryOp,
};
use prog_types::{Payload, TimeSpan, Value};

use crate::cache::StaticResultCache;
use crate::error::ExecutionFault;
use crate::functions::FunctionRegistry;
use crate::host::Host;
use crate::notify::{Incident, IncidentKind, Notifier};
use crate::prog::{ProgLibrary, StaticKind};
use crate::register::VariableRegister;
use crate::scope::{FrameId, ScopeArena};

type Exec<T> = Result<T, ExecutionFault>;

/// Grow the native stack when less than this much is left before a prog call.
const STACK_RED_ZONE: usize = 128 * 1024;
/// Size of each extra stack segment.
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Control signal produced by a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Normal,
    Break,
    Continue,
    Return,
}

pub struct ExecutionContext<'a> {
    pub library: &'a ProgLibrary,
    pub functions: &'a FunctionRegistry,
    pub register: &'a mut VariableRegister,
    pub cache: &'a mut StaticResultCache,
    pub notifier: &'a dyn Notifier,
    pub host: &'a mut dyn Host,
    /// Number of prog invocations currently on the stack.
    pub depth: usize,
    pub max_depth: usize,
}

/// Incident category for a fault.
pub(crate) fn incident_kind(fault: &ExecutionFault) -> IncidentKind {
    match fault.root() {
        ExecutionFault::RecursionLimit { .. } => IncidentKind::RecursionLimit,
        ExecutionFault::NotCompiled(_) => IncidentKind::NotCompiled,
        ExecutionFault::UnknownProg(_) => IncidentKind::UnknownProg,
        _ => IncidentKind::Fault,
    }
}

pub(crate) fn render_arguments(args: &[Value]) -> Vec<String> {
    args.iter().map(Value::display_text).collect()
}

impl<'a> ExecutionContext<'a> {
    /// Run prog `id` with already-typed arguments.
    pub fn invoke(&mut self, id: ProgId, args: Vec<Value>) -> Exec<Value> {
        self.depth += 1;
        let result = if self.depth > self.max_depth {
            Err(ExecutionFault::RecursionLimit {
                depth: self.max_depth,
            })
        } else {
            // Nested calls recurse natively; keep the ceiling reachable on
            // small thread stacks.
            stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || self.run(id, args))
        };
        self.depth -= 1;
        result
    }

    fn run(&mut self, id: ProgId, args: Vec<Value>) -> Exec<Value> {
        let library = self.library;
        let prog = library.get(id).ok_or(ExecutionFault::UnknownProg(id))?;
        trace!(prog = %id, name = %prog.name, depth = self.depth, "invoke");

        let fully_static = prog.static_kind == StaticKind::FullyStatic;
        if fully_static {
            if let Some(value) = self.cache.get(id) {
                return Ok(value.clone());
            }
        }
        let statements = prog
            .statements()
            .ok_or_else(|| ExecutionFault::NotCompiled(prog.name.clone()))?;

        let mut arena = ScopeArena::new();
        let root = arena.root();
        let mut args = args.into_iter();
        for parameter in &prog.parameters {
            let value = args.next().unwrap_or_else(|| Value::null(parameter.ty));
            if !value.is_null() && !value.ty().compatible_with(&parameter.ty) {
                return Err(ExecutionFault::ArgumentType {
                    parameter: parameter.name.clone(),
                    expected: parameter.ty,
                    found: value.ty().without_literal(),
                });
            }
            arena.declare(root, &parameter.name, value);
        }
        let returns = !prog.return_type.is_void();
        if returns {
            arena.declare(root, RETURN_SLOT, Value::null(prog.return_type));
        }

        self.exec_statements(&mut arena, root, statements)?;

        let value = if returns {
            arena
                .get(root, RETURN_SLOT)
                .cloned()
                .unwrap_or_else(|| Value::null(prog.return_type))
        } else {
            Value::void()
        };
        if fully_static {
            self.cache.store(id, value.clone());
        }
        Ok(value)
    }

    fn exec_statements(&mut self, arena: &mut ScopeArena, frame: FrameId, statements: &[Statement]) -> Exec<Signal> {
        for statement in statements {
            let signal = self
                .exec(arena, frame, statement)
                .map_err(|fault| fault.at_line(statement.line))?;
            if signal != Signal::Normal {
                return Ok(signal);
            }
        }
        Ok(Signal::Normal)
    }

    /// Run `statements` in a fresh frame chained to `parent`.
    fn exec_block(&mut self, arena: &mut ScopeArena, parent: FrameId, statements: &[Statement]) -> Exec<Signal> {
        let frame = arena.push(parent);
        let signal = self.exec_statements(arena, frame, statements);
        arena.pop(frame);
        signal
    }

    fn exec(&mut self, arena: &mut ScopeArena, frame: FrameId, statement: &Statement) -> Exec<Signal> {
        match &statement.kind {
            StatementKind::Declare { name, ty, init } => {
                let value = match init {
                    Some(init) => self.eval(arena, frame, init)?,
                    None => Value::empty(*ty),
                };
                arena.declare(frame, name, value);
                Ok(Signal::Normal)
            }
            StatementKind::Assign { name, value } => {
                let value = self.eval(arena, frame, value)?;
                arena.assign(frame, name, value)?;
                Ok(Signal::Normal)
            }
            StatementKind::Conditional { branches, otherwise } => {
                for branch in branches {
                    if self.condition(arena, frame, &branch.test)? {
                        return self.exec_block(arena, frame, &branch.body);
                    }
                }
                match otherwise {
                    Some(body) => self.exec_block(arena, frame, body),
                    None => Ok(Signal::Normal),
                }
            }
            StatementKind::While { condition, body } => {
                while self.condition(arena, frame, condition)? {
                    match self.exec_block(arena, frame, body)? {
                        Signal::Break => break,
                        Signal::Return => return Ok(Signal::Return),
                        Signal::Normal | Signal::Continue => {}
                    }
                }
                Ok(Signal::Normal)
            }
            StatementKind::For {
                variable,
                from,
                to,
                body,
            } => {
                let from = self.number(arena, frame, from, "for")?;
                let to = self.number(arena, frame, to, "for")?;
                let mut i = from;
                while i <= to {
                    let inner = arena.push(frame);
                    arena.declare(inner, variable, Value::number(i));
                    let signal = self.exec_statements(arena, inner, body);
                    arena.pop(inner);
                    match signal? {
                        Signal::Break => break,
                        Signal::Return => return Ok(Signal::Return),
                        Signal::Normal | Signal::Continue => {}
                    }
                    i += 1.0;
                }
                Ok(Signal::Normal)
            }
            StatementKind::Foreach {
                variable,
                collection,
                body,
            } => {
                let items = match self.eval(arena, frame, collection)?.into_payload() {
                    Payload::Sequence(items) => items,
                    Payload::Null => return Err(ExecutionFault::NullOperand { operation: "foreach" }),
                    _ => return Err(ExecutionFault::Invalid("foreach over a non-sequence".into())),
                };
                for item in items {
                    let inner = arena.push(frame);
                    arena.declare(inner, variable, item);
                    let signal = self.exec_statements(arena, inner, body);
                    arena.pop(inner);
                    match signal? {
                        Signal::Break => break,
                        Signal::Return => return Ok(Signal::Return),
                        Signal::Normal | Signal::Continue => {}
                    }
                }
                Ok(Signal::Normal)
            }
            StatementKind::Switch {
                subject,
                cases,
                default,
            } => {
                let subject = self.eval(arena, frame, subject)?;
                for case in cases {
                    let test = self.eval(arena, frame, &case.test)?;
                    if subject.same_value(&test) {
                        return self.exec_block(arena, frame, &case.body);
                    }
                }
                match default {
                    Some(body) => self.exec_block(arena, frame, body),
                    None => Ok(Signal::Normal),
                }
            }
            StatementKind::Call(expr) => {
                self.eval(arena, frame, expr)?;
                Ok(Signal::Normal)
            }
            StatementKind::Return(value) => {
                if let Some(value) = value {
                    let value = self.eval(arena, frame, value)?;
                    arena.assign(frame, RETURN_SLOT, value)?;
                }
                Ok(Signal::Return)
            }
            StatementKind::Break => Ok(Signal::Break),
            StatementKind::Continue => Ok(Signal::Continue),
            StatementKind::Comment(_) => Ok(Signal::Normal),
        }
    }

    /// Evaluate a test. A null boolean counts as false.
    fn condition(&mut self, arena: &ScopeArena, frame: FrameId, expr: &Expr) -> Exec<bool> {
        let value = self.eval(arena, frame, expr)?;
        truthy(&value)
    }

    fn number(&mut self, arena: &ScopeArena, frame: FrameId, expr: &Expr, operation: &'static str) -> Exec<f64> {
        match self.eval(arena, frame, expr)?.payload() {
            Payload::Number(n) => Ok(*n),
            Payload::Null => Err(ExecutionFault::NullOperand { operation }),
            _ => Err(ExecutionFault::Invalid(format!("{} bound is not a number", operation))),
        }
    }

    fn eval(&mut self, arena: &ScopeArena, frame: FrameId, expr: &Expr) -> Exec<Value> {
        match &expr.kind {
            ExprKind::Literal(value) => Ok(value.clone()),
            ExprKind::Variable(name) => arena
                .get(frame, name)
                .cloned()
                .ok_or_else(|| ExecutionFault::UndefinedVariable(name.clone())),
            ExprKind::Binary { op: BinaryOp::And, left, right } => {
                let left = self.eval(arena, frame, left)?;
                if !truthy(&left)? {
                    return Ok(Value::boolean(false));
                }
                let right = self.eval(arena, frame, right)?;
                Ok(Value::boolean(truthy(&right)?))
            }
            ExprKind::Binary { op: BinaryOp::Or, left, right } => {
                let left = self.eval(arena, frame, left)?;
                if truthy(&left)? {
                    return Ok(Value::boolean(true));
                }
                let right = self.eval(arena, frame, right)?;
                Ok(Value::boolean(truthy(&right)?))
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval(arena, frame, left)?;
                let right = self.eval(arena, frame, right)?;
                binary(*op, &left, &right)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval(arena, frame, operand)?;
                unary(*op, &operand)
            }
            ExprKind::Call { function, args, .. } => {
                let args = self.eval_all(arena, frame, args)?;
                self.call_function(*function, &args)
            }
            ExprKind::ProgCall { prog, name, args } => {
                let args = self.eval_all(arena, frame, args)?;
                self.call_prog(*prog, name, args, expr)
            }
            ExprKind::Index { target, index } => {
                let target = self.eval(arena, frame, target)?;
                let index = self.eval(arena, frame, index)?;
                index_into(&target, &index)
            }
        }
    }

    fn eval_all(&mut self, arena: &ScopeArena, frame: FrameId, exprs: &[Expr]) -> Exec<Vec<Value>> {
        exprs.iter().map(|e| self.eval(arena, frame, e)).collect()
    }

    fn call_function(&mut self, id: FunctionId, args: &[Value]) -> Exec<Value> {
        self.functions.invoke(id, self.register, self.host, args)
    }

    /// Call another prog. Its faults are reported here and become a typed
    /// null, apart from recursion-limit faults.
    fn call_prog(&mut self, id: ProgId, name: &str, args: Vec<Value>, expr: &Expr) -> Exec<Value> {
        let arguments = render_arguments(&args);
        match self.invoke(id, args) {
            Ok(value) => Ok(value),
            Err(fault) if fault.is_recursion_limit() => Err(fault),
            Err(fault) => {
                warn!(prog = %id, name, %fault, "nested prog call failed");
                self.notifier.report(Incident {
                    prog: id,
                    prog_name: name.to_string(),
                    kind: incident_kind(&fault),
                    message: fault.to_string(),
                    arguments,
                });
                Ok(Value::null(expr.ty))
            }
        }
    }
}

fn truthy(value: &Value) -> Exec<bool> {
    match value.payload() {
        Payload::Boolean(b) => Ok(*b),
        Payload::Null => Ok(false),
        _ => Err(ExecutionFault::Invalid(format!("{} is not a boolean", value.ty()))),
    }
}

fn op_name(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "addition",
        BinaryOp::Concat => "concatenation",
        BinaryOp::Sub => "subtraction",
        BinaryOp::Mul => "multiplication",
        BinaryOp::Div => "division",
        BinaryOp::Mod => "modulo",
        BinaryOp::Eq | BinaryOp::Ne => "equality",
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => "comparison",
        BinaryOp::And | BinaryOp::Or => "logic",
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Exec<Value> {
    use Payload as P;

    match op {
        BinaryOp::Eq => return Ok(Value::boolean(left.same_value(right))),
        BinaryOp::Ne => return Ok(Value::boolean(!left.same_value(right))),
        BinaryOp::Concat => {
            return Ok(Value::text(format!("{}{}", left.display_text(), right.display_text())));
        }
        _ => {}
    }
    if left.is_null() || right.is_null() {
        return Err(ExecutionFault::NullOperand {
            operation: op_name(op),
        });
    }

    let value = match (op, left.payload(), right.payload()) {
        (BinaryOp::Add, P::Number(a), P::Number(b)) => Value::number(a + b),
        (BinaryOp::Add, P::DateTime(t), P::TimeSpan(s)) | (BinaryOp::Add, P::TimeSpan(s), P::DateTime(t)) => {
            Value::datetime(*t + *s)
        }
        (BinaryOp::Add, P::TimeSpan(a), P::TimeSpan(b)) => Value::timespan(*a + *b),

        (BinaryOp::Sub, P::Number(a), P::Number(b)) => Value::number(a - b),
        (BinaryOp::Sub, P::DateTime(t), P::TimeSpan(s)) => Value::datetime(*t - *s),
        (BinaryOp::Sub, P::DateTime(a), P::DateTime(b)) => Value::timespan(*a - *b),
        (BinaryOp::Sub, P::TimeSpan(a), P::TimeSpan(b)) => Value::timespan(*a - *b),

        (BinaryOp::Mul, P::Number(a), P::Number(b)) => Value::number(a * b),
        (BinaryOp::Mul, P::TimeSpan(s), P::Number(n)) | (BinaryOp::Mul, P::Number(n), P::TimeSpan(s)) => {
            Value::timespan(s.scale(*n))
        }

        (BinaryOp::Div, P::Number(a), P::Number(b)) => {
            if *b == 0.0 {
                return Err(ExecutionFault::DivisionByZero);
            }
            Value::number(a / b)
        }
        (BinaryOp::Div, P::TimeSpan(s), P::Number(n)) => {
            if *n == 0.0 {
                return Err(ExecutionFault::DivisionByZero);
            }
            Value::timespan(s.scale(1.0 / n))
        }
        (BinaryOp::Div, P::TimeSpan(a), P::TimeSpan(b)) => {
            if b.seconds() == 0 {
                return Err(ExecutionFault::DivisionByZero);
            }
            Value::number(a.seconds() as f64 / b.seconds() as f64)
        }

        (BinaryOp::Mod, P::Number(a), P::Number(b)) => {
            if *b == 0.0 {
                return Err(ExecutionFault::DivisionByZero);
            }
            Value::number(a % b)
        }

        (BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge, a, b) => {
            let ordering = match (a, b) {
                (P::Number(a), P::Number(b)) => a.partial_cmp(b),
                (P::Text(a), P::Text(b)) => Some(a.cmp(b)),
                (P::DateTime(a), P::DateTime(b)) => Some(a.cmp(b)),
                (P::TimeSpan(a), P::TimeSpan(b)) => Some(a.cmp(b)),
                _ => return Err(mismatch(op, left, right)),
            };
            let result = match ordering {
                None => false,
                Some(ordering) => match op {
                    BinaryOp::Lt => ordering == Ordering::Less,
                    BinaryOp::Le => ordering != Ordering::Greater,
                    BinaryOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                },
            };
            Value::boolean(result)
        }

        _ => return Err(mismatch(op, left, right)),
    };
    Ok(value)
}

fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> ExecutionFault {
    ExecutionFault::Invalid(format!(
        "{} of {} and {}",
        op_name(op),
        left.ty(),
        right.ty()
    ))
}

fn unary(op: UnaryOp, operand: &Value) -> Exec<Value> {
    match (op, operand.payload()) {
        (UnaryOp::Not, Payload::Boolean(b)) => Ok(Value::boolean(!b)),
        (UnaryOp::Neg, Payload::Number(n)) => Ok(Value::number(-n)),
        (UnaryOp::Neg, Payload::TimeSpan(s)) => Ok(Value::timespan(TimeSpan(s.seconds().saturating_neg()))),
        (UnaryOp::Not, Payload::Null) => Err(ExecutionFault::NullOperand { operation: "not" }),
        (UnaryOp::Neg, Payload::Null) => Err(ExecutionFault::NullOperand { operation: "negation" }),
        _ => Err(ExecutionFault::Invalid(format!("{:?} of {}", op, operand.ty()))),
    }
}

fn index_into(target: &Value, index: &Value) -> Exec<Value> {
    if target.is_null() || index.is_null() {
        return Err(ExecutionFault::NullOperand { operation: "indexing" });
    }
    match (target.payload(), index.payload()) {
        (Payload::Sequence(items), Payload::Number(n)) => {
            let position = *n;
            if position < 0.0 || position.fract() != 0.0 || position as usize >= items.len() {
                return Err(ExecutionFault::IndexOutOfRange {
                    index: position,
                    len: items.len(),
                });
            }
            Ok(items[position as usize].clone())
        }
        (Payload::Mapping(entries), Payload::Text(key)) => entries
            .get(key)
            .cloned()
            .ok_or_else(|| ExecutionFault::KeyNotFound(key.clone())),
        (Payload::MultiMapping(entries), Payload::Text(key)) => Ok(Value::sequence(
            target.ty().base(),
            entries.get(key).cloned().unwrap_or_default(),
        )),
        _ => Err(ExecutionFault::Invalid(format!(
            "cannot index {} with {}",
            target.ty(),
            index.ty()
        ))),
    }
}
