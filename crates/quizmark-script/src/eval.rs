//! Gas-metered tree-walking evaluator for scoring scripts.

use crate::ast::{BinOp, ElseBranch, Expr, IfStmt, Program, Stmt, UnaryOp};
use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::value::Value;

/// The scoring-script evaluator — walks AST nodes and produces Values.
pub struct Evaluator {
    /// Binding environment (scoped).
    pub env: Environment,
    /// Gas counter — limits total steps to prevent infinite loops.
    pub gas: u64,
    /// Gas limit.
    pub gas_limit: u64,
}

impl Evaluator {
    /// Create a new evaluator with the given gas limit.
    pub fn new(gas_limit: u64) -> Self {
        Self {
            env: Environment::new(),
            gas: 0,
            gas_limit,
        }
    }

    /// Consume one unit of gas. Returns error if exhausted.
    fn tick(&mut self) -> EvalResult<()> {
        self.gas += 1;
        if self.gas > self.gas_limit {
            Err(EvalError::GasExhausted)
        } else {
            Ok(())
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statement evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Execute a complete script against the current environment.
    pub fn run(&mut self, program: &Program) -> EvalResult<()> {
        for stmt in &program.stmts {
            self.eval_stmt(stmt)?;
        }
        Ok(())
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> EvalResult<()> {
        self.tick()?;
        match stmt {
            Stmt::Assign { name, value } => {
                let value = self.eval_expr(value)?;
                // Update an existing binding wherever it lives, or define
                // a new one in the current scope.
                if !self.env.set(name, value.clone()) {
                    self.env.define(name, value);
                }
                Ok(())
            }
            Stmt::Let { name, value } => {
                let value = self.eval_expr(value)?;
                self.env.define(name, value);
                Ok(())
            }
            Stmt::If(if_stmt) => self.eval_if(if_stmt),
            Stmt::Expr(expr) => {
                self.eval_expr(expr)?;
                Ok(())
            }
        }
    }

    fn eval_if(&mut self, if_stmt: &IfStmt) -> EvalResult<()> {
        let condition = self.eval_expr(&if_stmt.condition)?;
        let Value::Bool(condition) = condition else {
            return Err(EvalError::TypeMismatch(format!(
                "if condition must be bool, got {}",
                condition.type_name()
            )));
        };
        if condition {
            self.eval_block(&if_stmt.then_block)
        } else {
            match &if_stmt.else_branch {
                Some(ElseBranch::ElseIf(nested)) => self.eval_if(nested),
                Some(ElseBranch::Block(block)) => self.eval_block(block),
                None => Ok(()),
            }
        }
    }

    fn eval_block(&mut self, block: &[Stmt]) -> EvalResult<()> {
        self.env.push_scope();
        let result = block.iter().try_for_each(|stmt| self.eval_stmt(stmt));
        self.env.pop_scope();
        result
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate an expression to a Value.
    pub fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        self.tick()?;
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Text(s) => Ok(Value::Text(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Nil => Ok(Value::Nil),
            Expr::Identifier(name) => self
                .env
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),
            Expr::Field { object, field } => self.eval_field(object, field),
            Expr::Call { name, args } => self.eval_call(name, args),
            Expr::Unary { op, operand } => self.eval_unary(*op, operand),
            Expr::Binary { left, op, right } => self.eval_binary(left, *op, right),
        }
    }

    fn eval_field(&mut self, object: &Expr, field: &str) -> EvalResult<Value> {
        let object = self.eval_expr(object)?;
        match &object {
            Value::Record(fields) => fields.get(field).cloned().ok_or_else(|| {
                EvalError::UnknownField(format!("record has no field '{field}'"))
            }),
            Value::Nil => Err(EvalError::TypeMismatch(format!(
                "cannot access field '{field}' on nil"
            ))),
            other => Err(EvalError::TypeMismatch(format!(
                "cannot access field '{field}' on {}",
                other.type_name()
            ))),
        }
    }

    // ── Operators ────────────────────────────────────────────────────────

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr) -> EvalResult<Value> {
        let value = self.eval_expr(operand)?;
        match (op, value) {
            (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
            (UnaryOp::Neg, other) => Err(EvalError::TypeMismatch(format!(
                "cannot negate {}",
                other.type_name()
            ))),
            (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            (UnaryOp::Not, other) => Err(EvalError::TypeMismatch(format!(
                "'not' requires bool, got {}",
                other.type_name()
            ))),
        }
    }

    fn eval_binary(&mut self, left: &Expr, op: BinOp, right: &Expr) -> EvalResult<Value> {
        // Short-circuit logical operators.
        if op == BinOp::And || op == BinOp::Or {
            let lhs = self.eval_bool_operand(left, op)?;
            return match (op, lhs) {
                (BinOp::And, false) => Ok(Value::Bool(false)),
                (BinOp::Or, true) => Ok(Value::Bool(true)),
                _ => Ok(Value::Bool(self.eval_bool_operand(right, op)?)),
            };
        }

        let lhs = self.eval_expr(left)?;
        let rhs = self.eval_expr(right)?;
        match op {
            BinOp::Eq => Ok(Value::Bool(lhs.loosely_equals(&rhs))),
            BinOp::NotEq => Ok(Value::Bool(!lhs.loosely_equals(&rhs))),
            BinOp::Less | BinOp::Greater | BinOp::LessEq | BinOp::GreaterEq => {
                let (a, b) = self.numeric_operands(lhs, rhs, op)?;
                let result = match op {
                    BinOp::Less => a < b,
                    BinOp::Greater => a > b,
                    BinOp::LessEq => a <= b,
                    _ => a >= b,
                };
                Ok(Value::Bool(result))
            }
            BinOp::Add => self.eval_add(lhs, rhs),
            BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                let (a, b) = self.numeric_operands(lhs, rhs, op)?;
                match op {
                    BinOp::Sub => Ok(Value::Number(a - b)),
                    BinOp::Mul => Ok(Value::Number(a * b)),
                    BinOp::Div if b == 0.0 => Err(EvalError::DivisionByZero),
                    BinOp::Div => Ok(Value::Number(a / b)),
                    _ if b == 0.0 => Err(EvalError::DivisionByZero),
                    _ => Ok(Value::Number(a % b)),
                }
            }
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }

    fn eval_bool_operand(&mut self, expr: &Expr, op: BinOp) -> EvalResult<bool> {
        match self.eval_expr(expr)? {
            Value::Bool(b) => Ok(b),
            other => Err(EvalError::TypeMismatch(format!(
                "'{}' requires bool operands, got {}",
                op.as_str(),
                other.type_name()
            ))),
        }
    }

    /// `+` adds numbers and concatenates when either operand is text.
    fn eval_add(&mut self, lhs: Value, rhs: Value) -> EvalResult<Value> {
        match (lhs, rhs) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::Text(a), b) => Ok(Value::Text(format!("{a}{b}"))),
            (a, Value::Text(b)) => Ok(Value::Text(format!("{a}{b}"))),
            (a, b) => Err(EvalError::TypeMismatch(format!(
                "cannot add {} and {}",
                a.type_name(),
                b.type_name()
            ))),
        }
    }

    fn numeric_operands(&self, lhs: Value, rhs: Value, op: BinOp) -> EvalResult<(f64, f64)> {
        match (lhs, rhs) {
            (Value::Number(a), Value::Number(b)) => Ok((a, b)),
            (a, b) => Err(EvalError::TypeMismatch(format!(
                "'{}' requires numbers, got {} and {}",
                op.as_str(),
                a.type_name(),
                b.type_name()
            ))),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Builtins
    // ══════════════════════════════════════════════════════════════════════

    fn eval_call(&mut self, name: &str, args: &[Expr]) -> EvalResult<Value> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }
        match name {
            "number" => self.builtin_number(values),
            "text" => self.builtin_text(values),
            "len" => self.builtin_len(values),
            "abs" => self.builtin_numeric(name, values, f64::abs),
            "floor" => self.builtin_numeric(name, values, f64::floor),
            "round" => self.builtin_numeric(name, values, f64::round),
            "min" => self.builtin_numeric_pair(name, values, f64::min),
            "max" => self.builtin_numeric_pair(name, values, f64::max),
            "contains" => self.builtin_contains(values),
            other => Err(EvalError::UnknownFunction(other.to_string())),
        }
    }

    fn expect_args(name: &str, values: &[Value], count: usize) -> EvalResult<()> {
        if values.len() == count {
            Ok(())
        } else {
            Err(EvalError::WrongArgCount(format!(
                "{name} expects {count} argument{}, got {}",
                if count == 1 { "" } else { "s" },
                values.len()
            )))
        }
    }

    /// `number(text)` — parse text to a number; `nil` when unparseable.
    ///
    /// Returning nil instead of trapping keeps learner typos in the
    /// Incorrect channel rather than the ScriptError channel.
    fn builtin_number(&self, mut values: Vec<Value>) -> EvalResult<Value> {
        Self::expect_args("number", &values, 1)?;
        match values.remove(0) {
            Value::Number(n) => Ok(Value::Number(n)),
            Value::Text(s) => Ok(s
                .trim()
                .parse::<f64>()
                .map(Value::Number)
                .unwrap_or(Value::Nil)),
            other => Err(EvalError::TypeMismatch(format!(
                "number() expects text or number, got {}",
                other.type_name()
            ))),
        }
    }

    fn builtin_text(&self, mut values: Vec<Value>) -> EvalResult<Value> {
        Self::expect_args("text", &values, 1)?;
        Ok(Value::Text(values.remove(0).to_string()))
    }

    fn builtin_len(&self, mut values: Vec<Value>) -> EvalResult<Value> {
        Self::expect_args("len", &values, 1)?;
        match values.remove(0) {
            Value::Text(s) => Ok(Value::Number(s.chars().count() as f64)),
            Value::List(items) => Ok(Value::Number(items.len() as f64)),
            other => Err(EvalError::TypeMismatch(format!(
                "len() expects text or list, got {}",
                other.type_name()
            ))),
        }
    }

    fn builtin_numeric(
        &self,
        name: &str,
        mut values: Vec<Value>,
        apply: fn(f64) -> f64,
    ) -> EvalResult<Value> {
        Self::expect_args(name, &values, 1)?;
        match values.remove(0) {
            Value::Number(n) => Ok(Value::Number(apply(n))),
            other => Err(EvalError::TypeMismatch(format!(
                "{name}() expects a number, got {}",
                other.type_name()
            ))),
        }
    }

    fn builtin_numeric_pair(
        &self,
        name: &str,
        mut values: Vec<Value>,
        apply: fn(f64, f64) -> f64,
    ) -> EvalResult<Value> {
        Self::expect_args(name, &values, 2)?;
        let b = values.pop().unwrap_or(Value::Nil);
        let a = values.pop().unwrap_or(Value::Nil);
        match (a, b) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(apply(a, b))),
            (a, b) => Err(EvalError::TypeMismatch(format!(
                "{name}() expects numbers, got {} and {}",
                a.type_name(),
                b.type_name()
            ))),
        }
    }

    /// `contains(haystack, needle)` — substring test on text, membership
    /// test on lists.
    fn builtin_contains(&self, mut values: Vec<Value>) -> EvalResult<Value> {
        Self::expect_args("contains", &values, 2)?;
        let needle = values.pop().unwrap_or(Value::Nil);
        let haystack = values.pop().unwrap_or(Value::Nil);
        match (&haystack, &needle) {
            (Value::Text(h), Value::Text(n)) => Ok(Value::Bool(h.contains(n.as_str()))),
            (Value::List(items), n) => {
                Ok(Value::Bool(items.iter().any(|item| item.loosely_equals(n))))
            }
            (h, n) => Err(EvalError::TypeMismatch(format!(
                "contains() expects (text, text) or (list, value), got {} and {}",
                h.type_name(),
                n.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn run(source: &str) -> EvalResult<Value> {
        crate::evaluate(source, Default::default(), 10_000)
    }

    #[test]
    fn answer_defaults_to_nil() {
        assert_eq!(run("").unwrap(), Value::Nil);
    }

    #[test]
    fn assignment_sets_answer() {
        assert_eq!(run("answer = true").unwrap(), Value::Bool(true));
    }

    #[test]
    fn assignment_inside_if_reaches_answer() {
        assert_eq!(
            run("if 1 < 2 { answer = true } else { answer = false }").unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn let_binding_is_block_scoped() {
        // `let` inside the block must not leak; the later reference traps.
        let err = run("if true { let tmp = 1 }\nanswer = tmp").unwrap_err();
        assert_eq!(err, EvalError::UndefinedVariable("tmp".into()));
    }

    #[test]
    fn undefined_variable_names_the_reference() {
        let err = run("answer = missing_binding").unwrap_err();
        assert_eq!(
            err.to_string(),
            "undefined variable: missing_binding"
        );
    }

    #[test]
    fn cross_type_equality_is_incorrect_not_error() {
        assert_eq!(run("answer = \"4\" == 4").unwrap(), Value::Bool(false));
    }

    #[test]
    fn arithmetic_and_comparison() {
        assert_eq!(run("answer = 2 + 3 * 4 == 14").unwrap(), Value::Bool(true));
        assert_eq!(run("answer = (2 + 3) * 4").unwrap(), Value::Number(20.0));
        assert_eq!(run("answer = 7 % 4 == 3").unwrap(), Value::Bool(true));
    }

    #[test]
    fn division_by_zero_traps() {
        assert_eq!(run("answer = 1 / 0").unwrap_err(), EvalError::DivisionByZero);
    }

    #[test]
    fn comparison_on_text_traps() {
        let err = run("answer = \"a\" < \"b\"").unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch(_)));
    }

    #[test]
    fn text_concatenation() {
        assert_eq!(
            run("answer = \"score: \" + 10").unwrap(),
            Value::Text("score: 10".into())
        );
    }

    #[test]
    fn short_circuit_skips_right_operand() {
        // The undefined reference on the right is never evaluated.
        assert_eq!(
            run("answer = false and missing_binding").unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            run("answer = true or missing_binding").unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn number_builtin_parses_and_declines() {
        assert_eq!(run("answer = number(\" 4 \")").unwrap(), Value::Number(4.0));
        assert_eq!(run("answer = number(\"abc\")").unwrap(), Value::Nil);
        assert_eq!(
            run("answer = number(\"4\") == 4").unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn unknown_function_traps() {
        assert_eq!(
            run("answer = fetch(\"url\")").unwrap_err(),
            EvalError::UnknownFunction("fetch".into())
        );
    }

    #[test]
    fn builtin_arity_is_checked() {
        let err = run("answer = len()").unwrap_err();
        assert!(matches!(err, EvalError::WrongArgCount(_)));
    }

    #[test]
    fn gas_limit_stops_heavy_scripts() {
        let mut program = String::from("answer = 0\n");
        for _ in 0..200 {
            program.push_str("answer = answer + 1\n");
        }
        let err = crate::evaluate(&program, Default::default(), 50).unwrap_err();
        assert_eq!(err, EvalError::GasExhausted);
    }

    #[test]
    fn gas_is_consumed_per_step() {
        let program = parse("answer = 1 + 2").unwrap();
        let mut evaluator = Evaluator::new(1_000);
        evaluator.env.define(crate::ANSWER_BINDING, Value::Nil);
        evaluator.run(&program).unwrap();
        assert!(evaluator.gas > 0);
    }
}
