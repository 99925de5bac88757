use crate::Number;
use std::f64::consts::FRAC_PI_2;

/// A built-in of fixed arity: `cast` takes one operand, `tie` takes two.
#[derive(Clone, Copy)]
pub enum Function {
    cast(fn(Number) -> Number),
    tie(fn(Number, Number) -> Number),
}

impl Function {
    pub fn arity(&self) -> usize {
        match self {
            Function::cast(_) => 1,
            Function::tie(_) => 2,
        }
    }
}

fn integer(value: Number) -> i64 {
    value.trunc() as i64
}

fn gcd(left: i64, right: i64) -> u64 {
    let (mut a, mut b) = (left.unsigned_abs(), right.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn lcm(left: i64, right: i64) -> Number {
    match gcd(left, right) {
        0 => 0.0,
        divisor => (left.unsigned_abs() / divisor) as Number * right.unsigned_abs() as Number,
    }
}

/// Comparison and logic results: 1 for true, 0 for false.
pub fn truth(condition: bool) -> Number {
    Number::from(u8::from(condition))
}

pub fn lookup(name: &str) -> Option<Function> {
    use Function::*;
    let function = match name {
        "sqrt" => cast(Number::sqrt),
        "cbrt" => cast(Number::cbrt),
        "abs" => cast(Number::abs),
        "ln" => cast(Number::ln),
        "lg" => cast(Number::log10),
        "exp" => cast(Number::exp),

        "ceil" => cast(Number::ceil),
        "floor" => cast(Number::floor),
        "round" => cast(Number::round),
        "trunc" => cast(Number::trunc),

        "sin" => cast(Number::sin),
        "asin" => cast(Number::asin),
        "sinh" => cast(Number::sinh),
        "asinh" => cast(Number::asinh),
        "cos" => cast(Number::cos),
        "acos" => cast(Number::acos),
        "cosh" => cast(Number::cosh),
        "acosh" => cast(Number::acosh),
        "tan" => cast(Number::tan),
        "atan" => cast(Number::atan),
        "tanh" => cast(Number::tanh),
        "atanh" => cast(Number::atanh),

        // complements: the function applied to half_pi minus the operand
        "ctan" => cast(|x| (FRAC_PI_2 - x).tan()),
        "actan" => cast(|x| (FRAC_PI_2 - x).atan()),
        "ctanh" => cast(|x| (FRAC_PI_2 - x).tanh()),
        "actanh" => cast(|x| (FRAC_PI_2 - x).atanh()),

        "add" => tie(|l, r| l + r),
        "sub" => tie(|l, r| l - r),
        "mul" => tie(|l, r| l * r),
        "div" => tie(|l, r| l / r),
        "mod" => tie(|l, r| l % r),
        "pow" => tie(Number::powf),

        "min" => tie(Number::min),
        "max" => tie(Number::max),
        "log" => tie(|base, x| x.ln() / base.ln()),
        "gcd" => tie(|l, r| gcd(integer(l), integer(r)) as Number),
        "lcm" => tie(|l, r| lcm(integer(l), integer(r))),

        "or" => tie(|l, r| truth(integer(l) != 0 || integer(r) != 0)),
        "and" => tie(|l, r| truth(integer(l) != 0 && integer(r) != 0)),
        "xor" => tie(|l, r| (integer(l) ^ integer(r)) as Number),

        _ => return None,
    };
    Some(function)
}

pub fn is_function(name: &str) -> bool {
    lookup(name).is_some()
}
