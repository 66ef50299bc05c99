//! Evaluator for the built-in s-expression language.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::parser::{self, Expr, Program};
use super::{EvalError, Language, ParseError};

/// Deepest evaluation nesting before a run is aborted.
pub const MAX_DEPTH: usize = 200;

const BUILTINS: &[&str] = &[
    "+", "-", "*", "/", "=", "<", ">", "<=", ">=", "not", "list", "len", "str",
];

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Nil,
    Symbol(String),
    List(Vec<Value>),
    Lambda(Arc<Lambda>),
    Builtin(&'static str),
}

/// A user-defined function with the local bindings it closed over.
#[derive(Debug)]
pub struct Lambda {
    params: Vec<String>,
    body: Vec<Expr>,
    captured: Scope,
}

type Scope = HashMap<String, Value>;

impl Value {
    fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Nil => "nil",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Lambda(_) | Value::Builtin(_) => "function",
        }
    }

    fn from_quoted(expr: &Expr) -> Value {
        match expr {
            Expr::Int(n) => Value::Int(*n),
            Expr::Float(n) => Value::Float(*n),
            Expr::Str(s) => Value::Str(s.clone()),
            Expr::Bool(b) => Value::Bool(*b),
            Expr::Nil => Value::Nil,
            Expr::Symbol(s) => Value::Symbol(s.clone()),
            Expr::List(items) => Value::List(items.iter().map(Value::from_quoted).collect()),
        }
    }

    /// Text used by `str`: strings without quotes, everything else displayed.
    fn to_plain(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Lambda(a), Value::Lambda(b)) => Arc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n:?}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Nil => f.write_str("nil"),
            Value::Symbol(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Value::Lambda(lambda) => write!(f, "<fn/{}>", lambda.params.len()),
            Value::Builtin(name) => write!(f, "<builtin {name}>"),
        }
    }
}

/// Global definitions of one session.
#[derive(Debug, Default, Clone)]
pub struct Environment {
    globals: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn len(&self) -> usize {
        self.globals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
    }
}

/// Built-in s-expression language.
#[derive(Debug, Default, Clone, Copy)]
pub struct Lisp;

impl Language for Lisp {
    type Ast = Program;
    type Value = Value;
    type Context = Environment;

    fn name(&self) -> &str {
        "lisp"
    }

    fn new_context(&self) -> Environment {
        Environment::new()
    }

    fn parse(&self, source: &str) -> Result<Program, ParseError> {
        parser::parse(source)
    }

    fn evaluate(&self, ast: &Program, context: &mut Environment) -> Result<Value, EvalError> {
        let mut machine = Machine {
            env: context,
            depth: 0,
        };
        let scope = Scope::new();
        let mut last = Value::Nil;
        for form in ast {
            last = machine.eval(form, &scope)?;
        }
        Ok(last)
    }
}

struct Machine<'a> {
    env: &'a mut Environment,
    depth: usize,
}

impl Machine<'_> {
    fn eval(&mut self, expr: &Expr, scope: &Scope) -> Result<Value, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::new("maximum recursion depth exceeded"));
        }
        self.depth += 1;
        let result = self.eval_inner(expr, scope);
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, expr: &Expr, scope: &Scope) -> Result<Value, EvalError> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Float(n) => Ok(Value::Float(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Nil => Ok(Value::Nil),
            Expr::Symbol(name) => self.lookup(name, scope),
            Expr::List(items) => self.eval_list(items, scope),
        }
    }

    fn lookup(&self, name: &str, scope: &Scope) -> Result<Value, EvalError> {
        if let Some(value) = scope.get(name).or_else(|| self.env.globals.get(name)) {
            return Ok(value.clone());
        }
        BUILTINS
            .iter()
            .find(|b| **b == name)
            .map(|b| Value::Builtin(*b))
            .ok_or_else(|| EvalError::new(format!("undefined symbol: {name}")))
    }

    fn eval_list(&mut self, items: &[Expr], scope: &Scope) -> Result<Value, EvalError> {
        let Some((head, rest)) = items.split_first() else {
            return Ok(Value::List(Vec::new()));
        };

        if let Expr::Symbol(name) = head {
            match name.as_str() {
                "quote" => {
                    let [quoted] = rest else {
                        return Err(EvalError::new("quote expects 1 argument"));
                    };
                    return Ok(Value::from_quoted(quoted));
                }
                "def" => {
                    let [Expr::Symbol(target), value] = rest else {
                        return Err(EvalError::new("def expects a name and a value"));
                    };
                    let value = self.eval(value, scope)?;
                    self.env.globals.insert(target.clone(), value.clone());
                    return Ok(value);
                }
                "if" => {
                    let (cond, then, otherwise) = match rest {
                        [c, t] => (c, t, None),
                        [c, t, e] => (c, t, Some(e)),
                        _ => return Err(EvalError::new("if expects 2 or 3 arguments")),
                    };
                    return if self.eval(cond, scope)?.is_truthy() {
                        self.eval(then, scope)
                    } else {
                        match otherwise {
                            Some(e) => self.eval(e, scope),
                            None => Ok(Value::Nil),
                        }
                    };
                }
                "do" => return self.eval_body(rest, scope),
                "fn" => {
                    let Some((Expr::List(params), body)) = rest.split_first() else {
                        return Err(EvalError::new("fn expects a parameter list"));
                    };
                    let params = params
                        .iter()
                        .map(|p| match p {
                            Expr::Symbol(s) => Ok(s.clone()),
                            other => Err(EvalError::new(format!("invalid parameter: {other}"))),
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    return Ok(Value::Lambda(Arc::new(Lambda {
                        params,
                        body: body.to_vec(),
                        captured: scope.clone(),
                    })));
                }
                "let" => {
                    let Some((Expr::List(bindings), body)) = rest.split_first() else {
                        return Err(EvalError::new("let expects a binding list"));
                    };
                    let mut inner = scope.clone();
                    for binding in bindings {
                        let Expr::List(pair) = binding else {
                            return Err(EvalError::new("let binding must be (name value)"));
                        };
                        let [Expr::Symbol(name), value] = pair.as_slice() else {
                            return Err(EvalError::new("let binding must be (name value)"));
                        };
                        let value = self.eval(value, &inner)?;
                        inner.insert(name.clone(), value);
                    }
                    return self.eval_body(body, &inner);
                }
                _ => {}
            }
        }

        let callee = self.eval(head, scope)?;
        let args = rest
            .iter()
            .map(|arg| self.eval(arg, scope))
            .collect::<Result<Vec<_>, _>>()?;
        self.apply(callee, args)
    }

    fn eval_body(&mut self, body: &[Expr], scope: &Scope) -> Result<Value, EvalError> {
        let mut last = Value::Nil;
        for expr in body {
            last = self.eval(expr, scope)?;
        }
        Ok(last)
    }

    fn apply(&mut self, callee: Value, args: Vec<Value>) -> Result<Value, EvalError> {
        match callee {
            Value::Builtin(name) => call_builtin(name, args),
            Value::Lambda(lambda) => {
                if lambda.params.len() != args.len() {
                    return Err(EvalError::new(format!(
                        "expected {} arguments, got {}",
                        lambda.params.len(),
                        args.len()
                    )));
                }
                let mut scope = lambda.captured.clone();
                scope.extend(lambda.params.iter().cloned().zip(args));
                self.eval_body(&lambda.body, &scope)
            }
            other => Err(EvalError::new(format!(
                "{} is not callable",
                other.type_name()
            ))),
        }
    }
}

fn call_builtin(name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
    match name {
        "+" => args.into_iter().try_fold(Value::Int(0), |acc, v| arith(name, acc, v)),
        "*" => args.into_iter().try_fold(Value::Int(1), |acc, v| arith(name, acc, v)),
        "-" | "/" => {
            let mut args = args.into_iter();
            let Some(first) = args.next() else {
                return Err(EvalError::new(format!("{name} expects at least 1 argument")));
            };
            let rest: Vec<Value> = args.collect();
            if rest.is_empty() {
                let identity = if name == "-" { Value::Int(0) } else { Value::Int(1) };
                return arith(name, identity, first);
            }
            rest.into_iter().try_fold(first, |acc, v| arith(name, acc, v))
        }
        "=" => Ok(Value::Bool(args.windows(2).all(|w| w[0] == w[1]))),
        "<" | ">" | "<=" | ">=" => {
            let mut ok = true;
            for pair in args.windows(2) {
                let (a, b) = (as_float(&pair[0])?, as_float(&pair[1])?);
                ok &= match name {
                    "<" => a < b,
                    ">" => a > b,
                    "<=" => a <= b,
                    _ => a >= b,
                };
            }
            Ok(Value::Bool(ok))
        }
        "not" => match args.as_slice() {
            [v] => Ok(Value::Bool(!v.is_truthy())),
            _ => Err(EvalError::new("not expects 1 argument")),
        },
        "list" => Ok(Value::List(args)),
        "len" => match args.as_slice() {
            [Value::List(items)] => Ok(Value::Int(items.len() as i64)),
            [Value::Str(s)] => Ok(Value::Int(s.chars().count() as i64)),
            [other] => Err(EvalError::new(format!(
                "len expects a list or string, got {}",
                other.type_name()
            ))),
            _ => Err(EvalError::new("len expects 1 argument")),
        },
        "str" => Ok(Value::Str(args.iter().map(Value::to_plain).collect())),
        _ => Err(EvalError::new(format!("unknown builtin: {name}"))),
    }
}

fn as_float(v: &Value) -> Result<f64, EvalError> {
    match v {
        Value::Int(n) => Ok(*n as f64),
        Value::Float(n) => Ok(*n),
        other => Err(EvalError::new(format!(
            "expected a number, got {}",
            other.type_name()
        ))),
    }
}

fn arith(op: &str, a: Value, b: Value) -> Result<Value, EvalError> {
    match (&a, &b) {
        (Value::Int(x), Value::Int(y)) => {
            let result = match op {
                "+" => x.checked_add(*y),
                "-" => x.checked_sub(*y),
                "*" => x.checked_mul(*y),
                _ => {
                    if *y == 0 {
                        return Err(EvalError::new("division by zero"));
                    }
                    x.checked_div(*y)
                }
            };
            result
                .map(Value::Int)
                .ok_or_else(|| EvalError::new("integer overflow"))
        }
        _ => {
            let (x, y) = (as_float(&a)?, as_float(&b)?);
            match op {
                "+" => Ok(Value::Float(x + y)),
                "-" => Ok(Value::Float(x - y)),
                "*" => Ok(Value::Float(x * y)),
                _ if y == 0.0 => Err(EvalError::new("division by zero")),
                _ => Ok(Value::Float(x / y)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str, env: &mut Environment) -> Result<Value, String> {
        Lisp.run(src, env).map_err(|e| e.to_string())
    }

    fn eval(src: &str) -> Result<Value, String> {
        run(src, &mut Environment::new())
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("(+ 1 2 3)").unwrap(), Value::Int(6));
        assert_eq!(eval("(- 10 4 1)").unwrap(), Value::Int(5));
        assert_eq!(eval("(- 3)").unwrap(), Value::Int(-3));
        assert_eq!(eval("(* 2 2.5)").unwrap(), Value::Float(5.0));
        assert_eq!(eval("(/ 7 2)").unwrap(), Value::Int(3));
        assert_eq!(eval("(/ 7.0 2)").unwrap(), Value::Float(3.5));
    }

    #[test]
    fn test_arithmetic_errors() {
        assert_eq!(eval("(/ 1 0)").unwrap_err(), "division by zero");
        assert_eq!(eval("(/ 1.0 0)").unwrap_err(), "division by zero");
        assert_eq!(eval("(+ 9223372036854775807 1)").unwrap_err(), "integer overflow");
        assert!(eval("(+ 1 \"a\")").unwrap_err().contains("expected a number"));
    }

    #[test]
    fn test_definitions_persist_in_environment() {
        let mut env = Environment::new();
        run("(def x 40)", &mut env).unwrap();
        assert_eq!(run("(+ x 2)", &mut env).unwrap(), Value::Int(42));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_failed_run_keeps_prior_definitions() {
        let mut env = Environment::new();
        run("(def x 1)", &mut env).unwrap();
        assert!(run("(def x (/ 1 0))", &mut env).is_err());
        assert!(run("(undefined-thing)", &mut env).is_err());
        assert_eq!(env.get("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_functions_and_closures() {
        let mut env = Environment::new();
        run("(def make-adder (fn (n) (fn (x) (+ x n))))", &mut env).unwrap();
        run("(def add5 (make-adder 5))", &mut env).unwrap();
        assert_eq!(run("(add5 10)", &mut env).unwrap(), Value::Int(15));
        assert!(run("(add5 1 2)", &mut env)
            .unwrap_err()
            .contains("expected 1 arguments"));
    }

    #[test]
    fn test_recursion() {
        let mut env = Environment::new();
        run(
            "(def fact (fn (n) (if (<= n 1) 1 (* n (fact (- n 1))))))",
            &mut env,
        )
        .unwrap();
        assert_eq!(run("(fact 10)", &mut env).unwrap(), Value::Int(3_628_800));
    }

    #[test]
    fn test_recursion_limit() {
        let mut env = Environment::new();
        run("(def loop (fn (n) (loop (+ n 1))))", &mut env).unwrap();
        assert_eq!(
            run("(loop 0)", &mut env).unwrap_err(),
            "maximum recursion depth exceeded"
        );
        // The environment is still usable afterwards.
        assert_eq!(run("(+ 1 1)", &mut env).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_let_if_do() {
        assert_eq!(eval("(let ((a 2) (b (* a 3))) (+ a b))").unwrap(), Value::Int(8));
        assert_eq!(eval("(if nil 1 2)").unwrap(), Value::Int(2));
        assert_eq!(eval("(if false 1)").unwrap(), Value::Nil);
        assert_eq!(eval("(do 1 2 3)").unwrap(), Value::Int(3));
    }

    #[test]
    fn test_lists_strings_quote() {
        assert_eq!(eval("(len (list 1 2 3))").unwrap(), Value::Int(3));
        assert_eq!(eval("(len \"héllo\")").unwrap(), Value::Int(5));
        assert_eq!(eval("(str \"a\" 1 nil)").unwrap(), Value::Str("a1nil".into()));
        assert_eq!(eval("'(a 1)").unwrap().to_string(), "(a 1)");
        assert_eq!(eval("(= 1 1.0)").unwrap(), Value::Bool(true));
        assert_eq!(eval("(< 1 2 3)").unwrap(), Value::Bool(true));
        assert_eq!(eval("(not nil)").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_display() {
        assert_eq!(eval("\"hi\"").unwrap().to_string(), "\"hi\"");
        assert_eq!(eval("2.0").unwrap().to_string(), "2.0");
        assert_eq!(eval("+").unwrap().to_string(), "<builtin +>");
        assert_eq!(eval("(fn (a b) a)").unwrap().to_string(), "<fn/2>");
    }

    #[test]
    fn test_multiple_forms_return_last() {
        assert_eq!(eval("(def a 1) (def b 2) (+ a b)").unwrap(), Value::Int(3));
    }

    #[test]
    fn test_not_callable() {
        assert_eq!(eval("(1 2)").unwrap_err(), "int is not callable");
    }
}
