//! Formula evaluation.
//!
//! Component values are produced by one of four calc types. FORMULA components
//! carry a small arithmetic language:
//!
//! ```text
//! expression := term (("+" | "-") term)*
//! term       := unary (("*" | "/") unary)*
//! unary      := ("-" | "+") unary | primary
//! primary    := NUMBER | IDENT | IDENT "(" args ")" | "(" expression ")"
//! args       := expression ("," expression)*
//! ```
//!
//! Functions: `min(a, b, ...)`, `max(a, b, ...)`, `abs(x)`, `round(x)` and
//! `round(x, dp)` (half away from zero). Formulas are parsed once into a
//! [`Formula`] and evaluated against an immutable [`VariableScope`].

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult, EvaluationError};
use crate::models::{BaseVariable, CalcType, SalaryComponentDefinition};

use super::proration::ProrationFactor;
use super::rounding::MAX_ROUNDING_DECIMALS;

/// The employee's nominal gross salary.
pub const VAR_GROSS_SALARY: &str = "grossSalary";
/// Running earnings total.
pub const VAR_GROSS: &str = "gross";
/// Running taxable earnings total.
pub const VAR_BASE: &str = "base";
/// Running earnings minus deductions.
pub const VAR_NET: &str = "net";
/// The value of the component's own base variable.
pub const VAR_BASE_VALUE: &str = "baseValue";
/// Days the employee was active in the period.
pub const VAR_ACTIVE_DAYS: &str = "activeDays";
/// Calendar days in the period.
pub const VAR_PERIOD_DAYS: &str = "periodDays";
/// Business days in the period.
pub const VAR_BUSINESS_DAYS: &str = "businessDays";

/// Names bound by the engine; component codes may not reuse them.
pub const RESERVED_VARIABLES: &[&str] = &[
    VAR_GROSS_SALARY,
    VAR_GROSS,
    VAR_BASE,
    VAR_NET,
    VAR_BASE_VALUE,
    VAR_ACTIVE_DAYS,
    VAR_PERIOD_DAYS,
    VAR_BUSINESS_DAYS,
];

/// Named decimal values visible to a formula.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::VariableScope;
/// use rust_decimal::Decimal;
///
/// let scope = VariableScope::new().with("gross", Decimal::new(50000, 0));
/// assert_eq!(scope.get("gross").unwrap(), Decimal::new(50000, 0));
/// assert!(scope.get("bonus").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableScope {
    values: BTreeMap<String, Decimal>,
}

impl VariableScope {
    /// An empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the scope with `name` bound to `value`.
    pub fn with(mut self, name: impl Into<String>, value: Decimal) -> Self {
        self.set(name, value);
        self
    }

    /// Binds `name` to `value`, replacing any previous binding.
    pub fn set(&mut self, name: impl Into<String>, value: Decimal) {
        self.values.insert(name.into(), value);
    }

    /// Looks up a variable.
    pub fn get(&self, name: &str) -> Result<Decimal, EvaluationError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| EvaluationError::UnknownVariable {
                name: name.to_string(),
            })
    }

    /// Iterates bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
}

/// Built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    /// Smallest argument.
    Min,
    /// Largest argument.
    Max,
    /// Absolute value.
    Abs,
    /// Round half away from zero to `dp` decimals (default 0).
    Round,
}

impl Function {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "min" => Some(Function::Min),
            "max" => Some(Function::Max),
            "abs" => Some(Function::Abs),
            "round" => Some(Function::Round),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Function::Min => "min",
            Function::Max => "max",
            Function::Abs => "abs",
            Function::Round => "round",
        }
    }

    fn accepts(&self, arity: usize) -> bool {
        match self {
            Function::Min | Function::Max => arity >= 1,
            Function::Abs => arity == 1,
            Function::Round => arity == 1 || arity == 2,
        }
    }
}

/// Parsed formula syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Decimal literal.
    Number(Decimal),
    /// Variable reference.
    Variable(String),
    /// Unary minus.
    Negate(Box<Expr>),
    /// Binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Function call.
    Call {
        /// The function.
        function: Function,
        /// Arguments in order.
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Decimal),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
    Comma,
    Eof,
}

struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn tokenize(mut self) -> Result<Vec<(Token, usize)>, EvaluationError> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.current() {
            let start = self.position;
            let token = match ch {
                c if c.is_whitespace() => {
                    self.position += 1;
                    continue;
                }
                '+' => Token::Plus,
                '-' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,
                '(' => Token::LeftParen,
                ')' => Token::RightParen,
                ',' => Token::Comma,
                c if c.is_ascii_digit() || c == '.' => {
                    tokens.push((self.read_number()?, start));
                    continue;
                }
                c if c.is_alphabetic() || c == '_' => {
                    tokens.push((self.read_identifier(), start));
                    continue;
                }
                other => {
                    return Err(EvaluationError::Syntax {
                        position: start,
                        message: format!("unexpected character '{}'", other),
                    });
                }
            };
            self.position += 1;
            tokens.push((token, start));
        }

        tokens.push((Token::Eof, self.position));
        Ok(tokens)
    }

    fn read_number(&mut self) -> Result<Token, EvaluationError> {
        let start = self.position;
        let mut seen_dot = false;
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                self.position += 1;
            } else if ch == '.' && !seen_dot {
                seen_dot = true;
                self.position += 1;
            } else {
                break;
            }
        }

        let text: String = self.input[start..self.position].iter().collect();
        Decimal::from_str(&text)
            .map(Token::Number)
            .map_err(|_| EvaluationError::Syntax {
                position: start,
                message: format!("invalid number '{}'", text),
            })
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.position;
        while let Some(ch) = self.current() {
            if ch.is_alphanumeric() || ch == '_' {
                self.position += 1;
            } else {
                break;
            }
        }
        Token::Identifier(self.input[start..self.position].iter().collect())
    }
}

/// Deepest nesting of parentheses, calls and signs a formula may use.
pub const MAX_NESTING_DEPTH: usize = 64;
/// Longest formula, in tokens.
pub const MAX_FORMULA_TOKENS: usize = 1024;

struct Parser {
    tokens: Vec<(Token, usize)>,
    index: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.index.min(self.tokens.len() - 1)].0
    }

    fn position(&self) -> usize {
        self.tokens[self.index.min(self.tokens.len() - 1)].1
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> EvaluationError {
        EvaluationError::Syntax {
            position: self.position(),
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), EvaluationError> {
        if *self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected {}", what)))
        }
    }

    fn parse(mut self) -> Result<Expr, EvaluationError> {
        if *self.peek() == Token::Eof {
            return Err(self.error("empty formula"));
        }
        let expr = self.parse_expression()?;
        if *self.peek() != Token::Eof {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(expr)
    }

    fn parse_expression(&mut self) -> Result<Expr, EvaluationError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_term(&mut self) -> Result<Expr, EvaluationError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Star => BinaryOp::Multiply,
                Token::Slash => BinaryOp::Divide,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, EvaluationError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error(format!(
                "nesting deeper than {} levels",
                MAX_NESTING_DEPTH
            )));
        }
        self.depth += 1;
        let expr = self.parse_signed();
        self.depth -= 1;
        expr
    }

    fn parse_signed(&mut self) -> Result<Expr, EvaluationError> {
        match self.peek() {
            Token::Minus => {
                self.advance();
                Ok(Expr::Negate(Box::new(self.parse_unary()?)))
            }
            Token::Plus => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, EvaluationError> {
        let position = self.position();
        match self.advance() {
            Token::Number(value) => Ok(Expr::Number(value)),
            Token::Identifier(name) => {
                if *self.peek() != Token::LeftParen {
                    return Ok(Expr::Variable(name));
                }
                let function =
                    Function::lookup(&name).ok_or(EvaluationError::UnknownFunction { name })?;
                self.advance();
                let args = self.parse_arguments()?;
                if !function.accepts(args.len()) {
                    return Err(EvaluationError::Syntax {
                        position,
                        message: format!(
                            "{} does not take {} argument(s)",
                            function.name(),
                            args.len()
                        ),
                    });
                }
                Ok(Expr::Call { function, args })
            }
            Token::LeftParen => {
                let inner = self.parse_expression()?;
                self.expect(Token::RightParen, "')'")?;
                Ok(inner)
            }
            Token::Eof => Err(EvaluationError::Syntax {
                position,
                message: "unexpected end of formula".to_string(),
            }),
            other => Err(EvaluationError::Syntax {
                position,
                message: format!("unexpected token {:?}", other),
            }),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, EvaluationError> {
        let mut args = Vec::new();
        if *self.peek() == Token::RightParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            match self.advance() {
                Token::Comma => continue,
                Token::RightParen => return Ok(args),
                _ => return Err(self.error("expected ',' or ')'")),
            }
        }
    }
}

/// A parsed formula.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{Formula, VariableScope};
/// use rust_decimal::Decimal;
///
/// let formula = Formula::parse("min(BASICO * 0.1, 8000) + 500").unwrap();
/// let scope = VariableScope::new().with("BASICO", Decimal::new(50000, 0));
/// assert_eq!(formula.evaluate(&scope).unwrap(), Decimal::new(5500, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    source: String,
    ast: Expr,
}

impl Formula {
    /// Parses formula text.
    pub fn parse(source: &str) -> Result<Self, EvaluationError> {
        let tokens = Lexer::new(source).tokenize()?;
        // the trailing end-of-input token does not count
        if tokens.len() > MAX_FORMULA_TOKENS + 1 {
            return Err(EvaluationError::Syntax {
                position: tokens[MAX_FORMULA_TOKENS].1,
                message: format!("formula longer than {} tokens", MAX_FORMULA_TOKENS),
            });
        }
        let ast = Parser {
            tokens,
            index: 0,
            depth: 0,
        }
        .parse()?;
        Ok(Self {
            source: source.to_string(),
            ast,
        })
    }

    /// The original formula text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed syntax tree.
    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    /// Names of all variables the formula references.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        collect_variables(&self.ast, &mut names);
        names
    }

    /// Evaluates the formula against a scope.
    pub fn evaluate(&self, scope: &VariableScope) -> Result<Decimal, EvaluationError> {
        eval(&self.ast, scope)
    }
}

fn collect_variables<'a>(expr: &'a Expr, names: &mut BTreeSet<&'a str>) {
    match expr {
        Expr::Number(_) => {}
        Expr::Variable(name) => {
            names.insert(name.as_str());
        }
        Expr::Negate(inner) => collect_variables(inner, names),
        Expr::Binary { left, right, .. } => {
            collect_variables(left, names);
            collect_variables(right, names);
        }
        Expr::Call { args, .. } => {
            for arg in args {
                collect_variables(arg, names);
            }
        }
    }
}

fn overflow(operation: &str) -> EvaluationError {
    EvaluationError::Overflow {
        operation: operation.to_string(),
    }
}

fn eval(expr: &Expr, scope: &VariableScope) -> Result<Decimal, EvaluationError> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Variable(name) => scope.get(name),
        Expr::Negate(inner) => Ok(-eval(inner, scope)?),
        Expr::Binary { op, left, right } => {
            let l = eval(left, scope)?;
            let r = eval(right, scope)?;
            match op {
                BinaryOp::Add => l.checked_add(r).ok_or_else(|| overflow("addition")),
                BinaryOp::Subtract => l.checked_sub(r).ok_or_else(|| overflow("subtraction")),
                BinaryOp::Multiply => l.checked_mul(r).ok_or_else(|| overflow("multiplication")),
                BinaryOp::Divide => {
                    if r.is_zero() {
                        return Err(EvaluationError::DivisionByZero);
                    }
                    l.checked_div(r).ok_or_else(|| overflow("division"))
                }
            }
        }
        Expr::Call { function, args } => {
            let values = args
                .iter()
                .map(|arg| eval(arg, scope))
                .collect::<Result<Vec<_>, _>>()?;
            call(*function, &values)
        }
    }
}

fn call(function: Function, args: &[Decimal]) -> Result<Decimal, EvaluationError> {
    let invalid = |message: String| EvaluationError::InvalidArgument {
        function: function.name().to_string(),
        message,
    };

    match function {
        Function::Min => args
            .iter()
            .copied()
            .min()
            .ok_or_else(|| invalid("no arguments".to_string())),
        Function::Max => args
            .iter()
            .copied()
            .max()
            .ok_or_else(|| invalid("no arguments".to_string())),
        Function::Abs => args
            .first()
            .map(|v| v.abs())
            .ok_or_else(|| invalid("no arguments".to_string())),
        Function::Round => {
            let value = *args
                .first()
                .ok_or_else(|| invalid("no arguments".to_string()))?;
            let dp = match args.get(1) {
                None => 0,
                Some(dp) => dp
                    .fract()
                    .is_zero()
                    .then(|| dp.to_u32())
                    .flatten()
                    .filter(|dp| *dp <= MAX_ROUNDING_DECIMALS)
                    .ok_or_else(|| {
                        invalid(format!(
                            "decimals must be a whole number between 0 and {}, got {}",
                            MAX_ROUNDING_DECIMALS, dp
                        ))
                    })?,
            };
            Ok(value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
        }
    }
}

/// A component's calc type with its inputs checked and its formula parsed.
///
/// Built once per configuration version. A formula that fails to parse is kept
/// as an error so every run reports it against the component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledCalc {
    /// Fixed amount.
    Fixed {
        /// The amount.
        amount: Decimal,
    },
    /// Percentage of a base variable.
    Percentage {
        /// The percentage (10 means 10%).
        rate: Decimal,
        /// The accumulator measured against.
        base_variable: BaseVariable,
    },
    /// Parsed formula.
    Formula {
        /// The formula, or the syntax error found when parsing it.
        formula: Result<Formula, EvaluationError>,
    },
    /// Amount scaled by active days.
    DaysBased {
        /// The amount for a full period.
        amount: Decimal,
    },
}

impl CompiledCalc {
    /// Checks a definition's calc inputs and parses its formula.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingCalcValue`] or [`EngineError::MissingFormula`]
    /// when the input its calc type needs is absent.
    pub fn compile(definition: &SalaryComponentDefinition) -> EngineResult<Self> {
        let value = || {
            definition
                .calc_value
                .ok_or_else(|| EngineError::MissingCalcValue {
                    component: definition.code.clone(),
                })
        };

        Ok(match definition.calc_type {
            CalcType::Fixed => CompiledCalc::Fixed { amount: value()? },
            CalcType::Percentage => CompiledCalc::Percentage {
                rate: value()?,
                base_variable: definition.base_variable,
            },
            CalcType::DaysBased => CompiledCalc::DaysBased { amount: value()? },
            CalcType::Formula => {
                let source = definition
                    .calc_formula
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .ok_or_else(|| EngineError::MissingFormula {
                        component: definition.code.clone(),
                    })?;
                CompiledCalc::Formula {
                    formula: Formula::parse(source),
                }
            }
        })
    }
}

/// Produces a component's raw value.
///
/// - FIXED returns the amount verbatim.
/// - PERCENTAGE returns `rate / 100 * scope[base_variable]`.
/// - FORMULA evaluates the parsed formula against the scope.
/// - DAYS_BASED returns `amount * active_days / period_days`.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{evaluate, CompiledCalc, ProrationFactor, VariableScope};
/// use payroll_engine::models::BaseVariable;
/// use rust_decimal::Decimal;
///
/// let calc = CompiledCalc::Percentage { rate: Decimal::new(10, 0), base_variable: BaseVariable::Gross };
/// let scope = VariableScope::new().with("gross", Decimal::new(50000, 0));
/// let raw = evaluate(&calc, &scope, ProrationFactor::full(30)).unwrap();
/// assert_eq!(raw, Decimal::new(5000, 0));
/// ```
pub fn evaluate(
    calc: &CompiledCalc,
    scope: &VariableScope,
    factor: ProrationFactor,
) -> Result<Decimal, EvaluationError> {
    match calc {
        CompiledCalc::Fixed { amount } => Ok(*amount),
        CompiledCalc::Percentage {
            rate,
            base_variable,
        } => {
            let base = scope.get(base_variable.variable_name())?;
            (rate / Decimal::ONE_HUNDRED)
                .checked_mul(base)
                .ok_or_else(|| overflow("percentage"))
        }
        CompiledCalc::Formula { formula } => match formula {
            Ok(formula) => formula.evaluate(scope),
            Err(err) => Err(err.clone()),
        },
        CompiledCalc::DaysBased { amount } => amount
            .checked_mul(factor.fraction())
            .ok_or_else(|| overflow("days-based proration")),
    }
}
