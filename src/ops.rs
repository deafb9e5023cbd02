use std::f64::consts::{PI, TAU};

use thiserror::Error;

/// Domain errors an operator can report instead of a number.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    #[error("division by zero")]
    DivideBy0,

    #[error("modulo needs a non-zero integer divisor")]
    ModuleOfNonIntegerValue,

    #[error("root of a negative number")]
    SqrtOfNegativeNumber,
}

pub type Outcome = Result<f64, ErrorCode>;

#[derive(Debug, Clone, Copy)]
pub enum Operator {
    Unary(fn(f64) -> Outcome),
    Binary(fn(f64, f64) -> Outcome),
}

impl Operator {
    pub fn arity(&self) -> usize {
        match self {
            Operator::Unary(_) => 1,
            Operator::Binary(_) => 2,
        }
    }
}

pub const OPERATORS: [(char, Operator); 8] = [
    ('+', Operator::Binary(add)),
    ('-', Operator::Binary(subtract)),
    ('*', Operator::Binary(multiply)),
    ('/', Operator::Binary(divide)),
    ('%', Operator::Binary(modulo)),
    ('!', Operator::Unary(factorial)),
    ('^', Operator::Binary(power)),
    ('$', Operator::Binary(root)),
];

pub fn lookup(symbol: char) -> Option<Operator> {
    OPERATORS
        .iter()
        .find(|(candidate, _)| *candidate == symbol)
        .map(|(_, op)| *op)
}

pub fn add(lhs: f64, rhs: f64) -> Outcome {
    Ok(lhs + rhs)
}

pub fn subtract(lhs: f64, rhs: f64) -> Outcome {
    Ok(lhs - rhs)
}

pub fn multiply(lhs: f64, rhs: f64) -> Outcome {
    Ok(lhs * rhs)
}

pub fn divide(lhs: f64, rhs: f64) -> Outcome {
    if rhs == 0.0 {
        return Err(ErrorCode::DivideBy0);
    }
    Ok(lhs / rhs)
}

/// Floating remainder with the sign of `lhs`, like C's `fmod`.
pub fn modulo(lhs: f64, rhs: f64) -> Outcome {
    if rhs == 0.0 || rhs.fract() != 0.0 {
        return Err(ErrorCode::ModuleOfNonIntegerValue);
    }
    Ok(lhs % rhs)
}

/// `x!` extended to the reals through Γ. Negative operands mirror the
/// positive side: `(-x)! = -(x!)`.
pub fn factorial(x: f64) -> Outcome {
    if x >= 0.0 {
        Ok(gamma(x + 1.0))
    } else {
        Ok(-gamma(-x + 1.0))
    }
}

pub fn power(lhs: f64, rhs: f64) -> Outcome {
    Ok(lhs.powf(rhs))
}

/// `rhs`-th root of `lhs`.
pub fn root(lhs: f64, rhs: f64) -> Outcome {
    if rhs == 0.0 {
        return Err(ErrorCode::DivideBy0);
    }
    if lhs < 0.0 {
        return Err(ErrorCode::SqrtOfNegativeNumber);
    }
    Ok(lhs.powf(1.0 / rhs))
}

/// Computes Γ(z).
///
/// Positive integers up to 171 are computed exactly as `(z - 1)!`, everything
/// else with the 9-term Lanczos approximation (`g = 7`), using the reflection
/// formula `Γ(z) = π / (sin(πz) Γ(1 − z))` below 0.5. Poles (zero and the
/// negative integers) yield NaN, arguments too large for an f64 result yield
/// infinity.
pub fn gamma(z: f64) -> f64 {
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];
    const G: f64 = 7.0;
    // Γ(z) exceeds f64::MAX past this point.
    const OVERFLOW: f64 = 171.624_376_956_302_7;

    if z.fract() == 0.0 {
        if z <= 0.0 {
            return f64::NAN;
        }
        if z <= 171.0 {
            return (1..z as u64).fold(1.0, |acc, k| acc * k as f64);
        }
    }

    if z > OVERFLOW {
        return f64::INFINITY;
    }
    if z < 0.5 {
        return PI / ((PI * z).sin() * gamma(1.0 - z));
    }

    let z = z - 1.0;
    let x = COEFFS
        .iter()
        .enumerate()
        .skip(1)
        .fold(COEFFS[0], |x, (i, c)| x + c / (z + i as f64));
    let t = z + G + 0.5;

    TAU.sqrt() * t.powf(z + 0.5) * (-t).exp() * x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn table_has_every_symbol_once() {
        for (i, (symbol, _)) in OPERATORS.iter().enumerate() {
            assert!(
                OPERATORS[i + 1..].iter().all(|(other, _)| other != symbol),
                "duplicate operator {symbol}"
            );
        }
        assert!(lookup('x').is_none());
    }

    #[test]
    fn arities() {
        for symbol in ['+', '-', '*', '/', '%', '^', '$'] {
            assert_eq!(lookup(symbol).map(|op| op.arity()), Some(2), "{symbol}");
        }
        assert_eq!(lookup('!').map(|op| op.arity()), Some(1));
    }

    #[test]
    fn division() {
        assert_eq!(divide(10.0, 4.0), Ok(2.5));
        assert_eq!(divide(10.0, 0.0), Err(ErrorCode::DivideBy0));
    }

    #[test]
    fn remainder() {
        assert_eq!(modulo(7.5, 2.0), Ok(1.5));
        assert_eq!(modulo(-7.0, 3.0), Ok(-1.0));
        assert_eq!(modulo(7.0, 0.0), Err(ErrorCode::ModuleOfNonIntegerValue));
        assert_eq!(modulo(7.0, 2.5), Err(ErrorCode::ModuleOfNonIntegerValue));
    }

    #[test]
    fn factorials() {
        assert_eq!(factorial(0.0), Ok(1.0));
        assert_eq!(factorial(4.0), Ok(24.0));
        assert_eq!(factorial(-3.0), Ok(-6.0));
        assert_eq!(factorial(1000.5), Ok(f64::INFINITY));
        assert_eq!(factorial(-1000.5), Ok(f64::NEG_INFINITY));
        let half = factorial(0.5).unwrap();
        assert!(close(half, PI.sqrt() / 2.0), "0.5! = {half}");
    }

    #[test]
    fn gamma_matches_known_values() {
        assert!(close(gamma(0.5), PI.sqrt()));
        assert!(close(gamma(-0.5), -2.0 * PI.sqrt()));
        assert!(close(gamma(5.5), 52.342_777_784_553_52));
        assert_eq!(gamma(171.0), (1..171).fold(1.0, |acc, k| acc * k as f64));
        assert_eq!(gamma(172.0), f64::INFINITY);
        assert_eq!(gamma(800.5), f64::INFINITY);
        assert!(gamma(0.0).is_nan());
        assert!(gamma(-2.0).is_nan());
    }

    #[test]
    fn roots() {
        assert!(close(root(9.0, 2.0).unwrap(), 3.0));
        assert!(close(root(27.0, 3.0).unwrap(), 3.0));
        assert_eq!(root(9.0, 0.0), Err(ErrorCode::DivideBy0));
        assert_eq!(root(-1.0, 2.0), Err(ErrorCode::SqrtOfNegativeNumber));
    }

    #[test]
    fn power_may_be_nan() {
        assert_eq!(power(2.0, 10.0), Ok(1024.0));
        assert!(power(-8.0, 0.5).unwrap().is_nan());
    }
}
