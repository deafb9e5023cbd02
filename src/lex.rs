use std::{fmt::Display, ops::Range};

/// The sign character. Depending on the state it either starts a negative
/// number or is the binary subtraction operator.
pub const NEGATIVE: char = '-';

/// The only non-digit character allowed inside a number literal.
pub const DECIMAL_POINT: char = '.';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Number,
    Operator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Skip,
    StartNumber,
    ExtendNumber,
    PushOperator,
}

impl State {
    /// The whole transition table of the tokenizer.
    pub fn step(self, c: char) -> (Action, State) {
        match (self, c) {
            (state, c) if c.is_whitespace() => (Action::Skip, state),
            (State::Operator, NEGATIVE) => (Action::StartNumber, State::Number),
            (State::Number, NEGATIVE) => (Action::PushOperator, State::Operator),
            (_, c) if !c.is_ascii_digit() && c != DECIMAL_POINT => {
                (Action::PushOperator, State::Operator)
            }
            (State::Operator, _) => (Action::StartNumber, State::Number),
            (State::Number, _) => (Action::ExtendNumber, State::Number),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    pub literal: String,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operator {
    pub symbol: char,
    pub offset: usize,
}

impl Operator {
    pub fn span(&self) -> Range<usize> {
        self.offset..self.offset + self.symbol.len_utf8()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tokens {
    pub numbers: Vec<Number>,
    pub operators: Vec<Operator>,
}

impl Tokens {
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty() && self.operators.is_empty()
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = &self.literal;
        match lit.parse::<f64>() {
            Ok(n) if n == n.trunc() => write!(f, "NUMBER {lit} {n}.0"),
            Ok(n) => write!(f, "NUMBER {lit} {n}"),
            Err(_) => write!(f, "NUMBER {lit} null"),
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OPERATOR {} null", self.symbol)
    }
}

pub struct Lexer<'de> {
    whole: &'de str,
    byte: usize,
    state: State,
    tokens: Tokens,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            whole: input,
            byte: 0,
            state: State::Operator,
            tokens: Tokens::default(),
        }
    }

    pub fn tokenize(mut self) -> Tokens {
        let whole = self.whole;
        for c in whole.chars() {
            self.feed(c);
            self.byte += c.len_utf8();
        }
        self.tokens
    }

    fn feed(&mut self, c: char) {
        let (action, next) = self.state.step(c);
        log::trace!("{:?} --{c:?}--> {next:?} ({action:?})", self.state);
        let end = self.byte + c.len_utf8();

        match action {
            Action::Skip => {}
            Action::StartNumber => self.tokens.numbers.push(Number {
                literal: c.to_string(),
                span: self.byte..end,
            }),
            Action::ExtendNumber => {
                // `ExtendNumber` is only reachable from `State::Number`, which is
                // only entered by pushing a number.
                if let Some(number) = self.tokens.numbers.last_mut() {
                    number.literal.push(c);
                    number.span.end = end;
                }
            }
            Action::PushOperator => self.tokens.operators.push(Operator {
                symbol: c,
                offset: self.byte,
            }),
        }
        self.state = next;
    }
}

pub fn tokenize(input: &str) -> Tokens {
    Lexer::new(input).tokenize()
}
