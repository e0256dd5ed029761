//! Built-in scratch interpreter: a line calculator
//!
//! The reference [`Interpreter`] implementation. Each worker gets its own
//! variable store, so state never crosses workers; `eval` runs one source
//! chunk, line by line, and reports through the worker's diagnostics sink:
//! `print` goes to `output`, parse failures become compile reports with
//! line and column, evaluation failures (unknown variable, division by
//! zero, stack overflow) go to `error`.
//!
//! Grammar, one statement per line, `#` starts a comment:
//!
//! ```text
//! stmt   := "print" expr | ident "=" expr | expr
//! expr   := term (("+" | "-") term)*
//! term   := factor (("*" | "/" | "%") factor)*
//! factor := number | ident | "(" expr ")" | "-" factor
//! ```
//!
//! `print` is reserved. The interpreter stack size requested at worker
//! creation bounds expression nesting depth.

use std::collections::HashMap;

use vmpool_core::diag::{CompileReport, DiagnosticSink};
use vmpool_core::error::InterpreterError;

use crate::interp::{Interpreter, InterpreterSpec};

/// Per-worker calculator state
pub struct ScratchInterpreter {
    name: String,
    vars: HashMap<String, f64>,
    max_depth: usize,
    diag: DiagnosticSink,
}

impl Interpreter for ScratchInterpreter {
    fn open(spec: &InterpreterSpec, diag: DiagnosticSink) -> Result<Self, InterpreterError> {
        Ok(Self {
            name: spec.name.clone(),
            vars: HashMap::new(),
            max_depth: spec.stack_size,
            diag,
        })
    }
}

impl ScratchInterpreter {
    /// Name this interpreter was opened under (the worker name)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value of a variable
    pub fn var(&self, name: &str) -> Option<f64> {
        self.vars.get(name).copied()
    }

    /// Evaluate a chunk, returning the value of the last statement
    ///
    /// Variables persist across calls. Stops at the first failing line;
    /// lines before it have already taken effect.
    pub fn eval(&mut self, source: &str) -> Result<Option<f64>, InterpreterError> {
        let mut last = None;
        for (idx, raw) in source.lines().enumerate() {
            let line_no = (idx + 1) as u32;
            let code = match raw.find('#') {
                Some(at) => &raw[..at],
                None => raw,
            };
            if code.trim().is_empty() {
                continue;
            }

            let mut line = LineEval::new(code, &mut self.vars, self.max_depth);
            match line.statement() {
                Ok(LineOutcome::Value(v)) => last = Some(v),
                Ok(LineOutcome::Print(v)) => {
                    self.diag.output(&self.name, &format_value(v));
                    last = Some(v);
                }
                Err(LineError::Syntax { message, column }) => {
                    let report = CompileReport {
                        message: message.clone(),
                        source: self.name.clone(),
                        line: line_no,
                        column,
                    };
                    self.diag.compile_error(&self.name, &report);
                    return Err(InterpreterError::new(format!(
                        "{} at line {} column {}",
                        message, line_no, column
                    )));
                }
                Err(LineError::Runtime { message }) => {
                    self.diag.error(&self.name, &message);
                    return Err(InterpreterError::new(message));
                }
            }
        }
        Ok(last)
    }
}

/// Whole numbers print without a trailing `.0`
fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

enum LineOutcome {
    Value(f64),
    Print(f64),
}

enum LineError {
    Syntax { message: String, column: u32 },
    Runtime { message: String },
}

/// Recursive-descent evaluator over one line
struct LineEval<'a> {
    chars: Vec<char>,
    pos: usize,
    vars: &'a mut HashMap<String, f64>,
    depth: usize,
    max_depth: usize,
}

impl<'a> LineEval<'a> {
    fn new(code: &str, vars: &'a mut HashMap<String, f64>, max_depth: usize) -> Self {
        Self {
            chars: code.chars().collect(),
            pos: 0,
            vars,
            depth: 0,
            max_depth,
        }
    }

    fn statement(&mut self) -> Result<LineOutcome, LineError> {
        self.skip_ws();
        let start = self.pos;
        if let Some(ident) = self.try_ident() {
            if ident == "print" {
                let v = self.expr()?;
                self.expect_end()?;
                return Ok(LineOutcome::Print(v));
            }
            self.skip_ws();
            if self.peek() == Some('=') {
                self.bump();
                let v = self.expr()?;
                self.expect_end()?;
                self.vars.insert(ident, v);
                return Ok(LineOutcome::Value(v));
            }
            // Not an assignment; the ident was the start of an expression
            self.pos = start;
        }
        let v = self.expr()?;
        self.expect_end()?;
        Ok(LineOutcome::Value(v))
    }

    fn expr(&mut self) -> Result<f64, LineError> {
        let mut value = self.term()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('+') => {
                    self.bump();
                    value += self.term()?;
                }
                Some('-') => {
                    self.bump();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, LineError> {
        let mut value = self.factor()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('*') => {
                    self.bump();
                    value *= self.factor()?;
                }
                Some('/') => {
                    self.bump();
                    let rhs = self.factor()?;
                    if rhs == 0.0 {
                        return Err(LineError::Runtime {
                            message: "division by zero".to_string(),
                        });
                    }
                    value /= rhs;
                }
                Some('%') => {
                    self.bump();
                    let rhs = self.factor()?;
                    if rhs == 0.0 {
                        return Err(LineError::Runtime {
                            message: "division by zero".to_string(),
                        });
                    }
                    value %= rhs;
                }
                _ => return Ok(value),
            }
        }
    }

    fn factor(&mut self) -> Result<f64, LineError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(LineError::Runtime {
                message: format!("stack overflow (depth limit {})", self.max_depth),
            });
        }
        self.skip_ws();
        let value = match self.peek() {
            Some('(') => {
                self.bump();
                let v = self.expr()?;
                self.skip_ws();
                if self.peek() != Some(')') {
                    return Err(self.syntax("expected ')'"));
                }
                self.bump();
                v
            }
            Some('-') => {
                self.bump();
                -self.factor()?
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number()?,
            Some(c) if c.is_alphabetic() || c == '_' => {
                let ident = self.ident();
                match self.vars.get(&ident) {
                    Some(v) => *v,
                    None => {
                        return Err(LineError::Runtime {
                            message: format!("unknown variable '{}'", ident),
                        })
                    }
                }
            }
            Some(c) => return Err(self.syntax(&format!("unexpected character '{}'", c))),
            None => return Err(self.syntax("unexpected end of line")),
        };
        self.depth -= 1;
        Ok(value)
    }

    fn number(&mut self) -> Result<f64, LineError> {
        let start_col = self.column();
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        text.parse::<f64>().map_err(|_| LineError::Syntax {
            message: format!("bad number '{}'", text),
            column: start_col,
        })
    }

    fn try_ident(&mut self) -> Option<String> {
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => Some(self.ident()),
            _ => None,
        }
    }

    fn ident(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        text
    }

    fn expect_end(&mut self) -> Result<(), LineError> {
        self.skip_ws();
        match self.peek() {
            None => Ok(()),
            Some(c) => Err(self.syntax(&format!("unexpected trailing '{}'", c))),
        }
    }

    fn skip_ws(&mut self) {
        while self.peek() == Some(' ') || self.peek() == Some('\t') {
            self.bump();
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    /// 1-based column of the current position
    fn column(&self) -> u32 {
        (self.pos + 1) as u32
    }

    fn syntax(&self, message: &str) -> LineError {
        LineError::Syntax {
            message: message.to_string(),
            column: self.column(),
        }
    }
}
