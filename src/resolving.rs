use crate::error_handling::*;
use crate::settings::Settings;
use crate::Number;
use std::collections::HashMap;
use std::f64::consts;

/// Variable storage the evaluator reads from and assigns into.
///
/// Built-in constants are answered by `get` before any user entry, and an
/// implementation that refuses a `set` reports `invalid_assignment_target`.
pub trait Resolver {
    fn get(&self, name: &str) -> Option<Number>;
    fn set(&mut self, name: &str, value: Number) -> Result<()>;
}

pub fn constant(name: &str, extended: bool) -> Option<Number> {
    let value = match name {
        "pi" => consts::PI,
        "e" => consts::E,
        "tau" => consts::TAU,
        "phi" => 1.618_033_988_749_895,
        "e_gamma" => 0.577_215_664_901_532_9,
        "quarter_pi" => consts::FRAC_PI_4,
        "half_pi" => consts::FRAC_PI_2,
        "two_pi" => consts::TAU,
        "inv_pi" => consts::FRAC_1_PI,
        "inv_sqrt_pi" => consts::FRAC_2_SQRT_PI / 2.0,
        "inv_two_pi" => consts::FRAC_1_PI / 2.0,
        _ if extended => return extended_constant(name),
        _ => return None,
    };
    Some(value)
}

fn extended_constant(name: &str) -> Option<Number> {
    let value = match name {
        "log2e" => consts::LOG2_E,
        "log10e" => consts::LOG10_E,
        "ln2" => consts::LN_2,
        "ln10" => consts::LN_10,
        "sqrt2" => consts::SQRT_2,
        "sqrt3" => 1.732_050_807_568_877_2,
        "inv_sqrt2" => consts::FRAC_1_SQRT_2,
        "inv_sqrt3" => 0.577_350_269_189_625_7,
        _ => return None,
    };
    Some(value)
}

impl Resolver for HashMap<String, Number> {
    fn get(&self, name: &str) -> Option<Number> {
        constant(name, false).or_else(|| HashMap::get(self, name).copied())
    }

    fn set(&mut self, name: &str, value: Number) -> Result<()> {
        if constant(name, false).is_some() {
            return Err(CalcError::invalid_assignment_target);
        }
        self.insert(name.to_owned(), value);
        Ok(())
    }
}

/// A session's variables, with the constant set chosen by [`Settings`].
#[derive(Debug, Default, Clone)]
pub struct Variables {
    values: HashMap<String, Number>,
    extended: bool,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: &Settings) -> Self {
        Self{values: HashMap::new(), extended: settings.extended_constants}
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl Resolver for Variables {
    fn get(&self, name: &str) -> Option<Number> {
        constant(name, self.extended).or_else(|| self.values.get(name).copied())
    }

    fn set(&mut self, name: &str, value: Number) -> Result<()> {
        if constant(name, self.extended).is_some() {
            return Err(CalcError::invalid_assignment_target);
        }
        self.values.insert(name.to_owned(), value);
        Ok(())
    }
}
