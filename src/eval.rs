use std::{iter::Enumerate, ops::Range, str::Lines};

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::{
    lex::{self, Number, Tokens},
    ops::{self, ErrorCode, Operator},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    #[error(transparent)]
    Domain(#[from] ErrorCode),

    #[error("operator '{0}' is missing an operand")]
    MissingOperand(char),

    #[error("operand is not consumed by any operator")]
    UnusedOperand,

    #[error("unknown operator '{0}'")]
    UnknownOperator(char),

    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error("empty expression")]
    EmptyExpression,
}

#[derive(Error, Debug, Diagnostic)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: ErrorKind,

    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: Option<SourceSpan>,

    #[help]
    help: Option<String>,
}

/// Evaluates one expression strictly left to right: the first number is the
/// running value, unary operators apply to it, binary operators combine it
/// with the next number. There is no precedence, `2+3*4` is 20.
pub struct Calculator<'de> {
    name: String,
    whole: &'de str,
}

impl<'de> Calculator<'de> {
    pub fn new(filename: Option<&str>, whole: &'de str) -> Self {
        Calculator {
            name: filename.unwrap_or("<input>").to_string(),
            whole,
        }
    }

    pub fn tokens(&self) -> Tokens {
        lex::tokenize(self.whole)
    }

    pub fn evaluate(&self) -> Result<f64, EvalError> {
        let tokens = self.tokens();
        let mut numbers = tokens.numbers.iter();

        let mut value = match (numbers.next(), tokens.operators.first()) {
            (Some(number), _) => self.number(number)?,
            (None, Some(op)) => {
                return Err(self.error(
                    ErrorKind::MissingOperand(op.symbol),
                    Some(op.span()),
                    Some("put a number in front of the operator".to_string()),
                ));
            }
            (None, None) => return Err(self.error(ErrorKind::EmptyExpression, None, None)),
        };

        for op in &tokens.operators {
            let Some(operator) = ops::lookup(op.symbol) else {
                let known: String = ops::OPERATORS.iter().map(|(symbol, _)| *symbol).collect();
                return Err(self.error(
                    ErrorKind::UnknownOperator(op.symbol),
                    Some(op.span()),
                    Some(format!("supported operators are `{known}`")),
                ));
            };

            let outcome = match operator {
                Operator::Unary(apply) => apply(value),
                Operator::Binary(apply) => {
                    let Some(rhs) = numbers.next() else {
                        return Err(self.error(
                            ErrorKind::MissingOperand(op.symbol),
                            Some(op.span()),
                            Some(format!("'{}' needs a number on its right", op.symbol)),
                        ));
                    };
                    apply(value, self.number(rhs)?)
                }
            };

            let result = outcome.map_err(|code| self.error(code.into(), Some(op.span()), None))?;
            log::debug!("{value} {} -> {result}", op.symbol);
            value = result;
        }

        if let Some(extra) = numbers.next() {
            return Err(self.error(
                ErrorKind::UnusedOperand,
                Some(extra.span.clone()),
                Some("add an operator between the numbers".to_string()),
            ));
        }

        Ok(value)
    }

    fn number(&self, number: &Number) -> Result<f64, EvalError> {
        number.literal.parse().map_err(|_| {
            self.error(
                ErrorKind::InvalidNumber(number.literal.clone()),
                Some(number.span.clone()),
                None,
            )
        })
    }

    fn error(&self, kind: ErrorKind, span: Option<Range<usize>>, help: Option<String>) -> EvalError {
        EvalError {
            kind,
            src: NamedSource::new(&self.name, self.whole.to_string()),
            span: span.map(SourceSpan::from),
            help,
        }
    }
}

pub fn evaluate(input: &str) -> Result<f64, EvalError> {
    Calculator::new(None, input).evaluate()
}

/// Evaluates every non-blank line of a text as its own expression.
pub struct Session<'de> {
    filename: &'de str,
    lines: Enumerate<Lines<'de>>,
}

impl<'de> Session<'de> {
    pub fn new(filename: Option<&'de str>, whole: &'de str) -> Self {
        Session {
            filename: filename.unwrap_or("<input>"),
            lines: whole.lines().enumerate(),
        }
    }
}

impl<'de> Iterator for Session<'de> {
    type Item = (usize, Result<f64, EvalError>);

    fn next(&mut self) -> Option<Self::Item> {
        let (index, line) = self.lines.find(|(_, line)| !line.trim().is_empty())?;
        let name = format!("{}:{}", self.filename, index + 1);
        Some((index + 1, Calculator::new(Some(&name), line).evaluate()))
    }
}
