use crate::builtins::{self, Function};
use crate::error_handling::*;
use crate::parsing::*;
use crate::resolving::Resolver;
use crate::settings::Settings;
use crate::Number;
use log::debug;

/// Runs postfix expressions against a caller-owned [`Resolver`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator {
    settings: Settings,
}

/// Per-expression state: the value stack plus identifiers not yet resolved.
struct Machine<'src, 'r, R: ?Sized> {
    slots: Vec<Number>,
    pending: Vec<&'src str>,
    targets: Vec<&'src str>,
    undefined: Vec<&'src str>,
    resolver: &'r mut R,
    epsilon: Number,
}

impl<'src, 'r, R: Resolver + ?Sized> Machine<'src, 'r, R> {
    /// Pops `count` operands, oldest first. Pending names standing where
    /// operands should be are recorded as undefined and replaced by NaN.
    fn take(&mut self, count: usize, name: &str) -> Result<Vec<Number>> {
        let missing = count.saturating_sub(self.slots.len());
        if missing > 0 {
            if self.pending.len() < missing {
                return Err(CalcError::insufficient_operands(name.to_owned()));
            }
            let holes = self.pending.split_off(self.pending.len() - missing);
            self.undefined.extend(holes);
            self.slots.extend(std::iter::repeat(Number::NAN).take(missing));
        }
        Ok(self.slots.split_off(self.slots.len() - count))
    }

    fn apply(&mut self, function: Function, name: &str) -> Result<()> {
        let operands = self.take(function.arity(), name)?;
        let value = match function {
            Function::cast(action) => action(operands[0]),
            Function::tie(action) => action(operands[0], operands[1]),
        };
        self.slots.push(value);
        Ok(())
    }

    /// Identifiers resolve as a variable or constant first, then as a
    /// built-in function, and otherwise wait on the pending stack.
    fn identifier(&mut self, name: &'src str) -> Result<()> {
        if let Some(value) = self.resolver.get(name) {
            self.slots.push(value);
            Ok(())
        } else if let Some(function) = builtins::lookup(name) {
            self.apply(function, name)
        } else {
            self.pending.push(name);
            Ok(())
        }
    }

    fn call(&mut self, name: &'src str) -> Result<()> {
        if let Some(value) = self.resolver.get(name) {
            self.slots.push(value);
            Ok(())
        } else if let Some(function) = builtins::lookup(name) {
            self.apply(function, name)
        } else {
            Err(CalcError::unknown_function(name.to_owned()))
        }
    }

    fn target(&mut self, name: &'src str) -> Result<()> {
        if builtins::is_function(name) {
            return Err(CalcError::invalid_assignment_target);
        }
        self.targets.push(name);
        Ok(())
    }

    /// Pops the latest target, falling back to the latest pending name.
    fn assign(&mut self) -> Result<()> {
        let target = match self.targets.pop() {
            Some(target) => target,
            None => self.pending.pop().ok_or(CalcError::invalid_assignment_target)?,
        };
        if self.slots.is_empty() && self.pending.is_empty() {
            return Err(CalcError::empty_assignment_value);
        }
        let value = self.take(1, "=")?[0];
        // a value built from undefined names never reaches the resolver
        if self.undefined.is_empty() {
            self.resolver.set(target, value)?;
            debug!("assigned {} = {}", target, value);
        }
        self.slots.push(value);
        Ok(())
    }

    fn operator(&mut self, operator: Operator) -> Result<()> {
        match operator {
            Operator::unary(unary) => {
                let operands = self.take(1, &operator.to_string())?;
                self.slots.push(unary.call(operands[0]));
            },
            Operator::binary(binary) => {
                let operands = self.take(2, binary.symbol())?;
                self.slots.push(binary.call(operands[0], operands[1], self.epsilon));
            },
            Operator::assignment => self.assign()?,
        }
        Ok(())
    }

    fn perform(&mut self, node: ExprNode<'src>) -> Result<()> {
        match node {
            ExprNode::number(value) => {
                self.slots.push(value);
                Ok(())
            },
            ExprNode::name(name) => self.identifier(name),
            ExprNode::call(name) => self.call(name),
            ExprNode::target(name) => self.target(name),
            ExprNode::operator(operator) => self.operator(operator),
        }
    }

    fn finish(mut self) -> Result<Number> {
        self.undefined.append(&mut self.pending);
        self.undefined.append(&mut self.targets);
        if !self.undefined.is_empty() {
            debug!("undefined: {:?}", self.undefined);
            let mut names: Vec<String> = Vec::new();
            for name in self.undefined {
                if !names.iter().any(|known| known == name) {
                    names.push(name.to_owned());
                }
            }
            return Err(CalcError::undefined_variable(names));
        }
        match self.slots.len() {
            0 => Err(CalcError::empty_statement),
            1 => Ok(self.slots[0]),
            count => Err(CalcError::redundant_values(count - 1)),
        }
    }
}

impl Evaluator {
    pub fn new(settings: Settings) -> Self {
        Self{settings}
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Evaluates an already converted postfix sequence, left to right.
    pub fn evaluate_rpn<R>(&self, expression: &[ExprNode], resolver: &mut R) -> Result<Number>
    where
        R: Resolver + ?Sized,
    {
        let mut machine = Machine {
            slots: Vec::new(),
            pending: Vec::new(),
            targets: Vec::new(),
            undefined: Vec::new(),
            resolver,
            epsilon: self.settings.equality_epsilon,
        };
        for node in expression {
            machine.perform(*node)?;
        }
        machine.finish()
    }

    pub fn evaluate<R>(&self, expression_string: &str, resolver: &mut R) -> Result<Number>
    where
        R: Resolver + ?Sized,
    {
        let expression = parse_with(expression_string, &self.settings)?;
        self.evaluate_rpn(&expression, resolver)
    }
}

/// Evaluates `expression_string` with default [`Settings`].
pub fn evaluate<R>(expression_string: &str, resolver: &mut R) -> Result<Number>
where
    R: Resolver + ?Sized,
{
    Evaluator::default().evaluate(expression_string, resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolving::Variables;
    use pretty_assertions::assert_eq;

    fn eval(source: &str) -> Result<Number> {
        evaluate(source, &mut Variables::new())
    }

    #[test]
    fn evaluates_in_precedence_order() {
        assert_eq!(eval("2 + 3 * 4"), Ok(14.0));
        assert_eq!(eval("(2 + 3) * 4"), Ok(20.0));
        assert_eq!(eval("10 - 4 - 3"), Ok(3.0));
        assert_eq!(eval("2 ^ 3 ^ 2"), Ok(64.0));
        assert_eq!(eval("7 % 4 * 2"), Ok(6.0));
    }

    #[test]
    fn earlier_operand_is_left() {
        assert_eq!(eval("8 / 2"), Ok(4.0));
        assert_eq!(eval("2 ^ 10"), Ok(1024.0));
        assert_eq!(eval("1 < 2"), Ok(1.0));
        assert_eq!(eval("2 <= 1"), Ok(0.0));
        assert_eq!(eval("3 > 2"), Ok(1.0));
        assert_eq!(eval("3 >= 4"), Ok(0.0));
        assert_eq!(eval("sub(10, 3)"), Ok(7.0));
    }

    #[test]
    fn evaluates_functions() {
        assert_eq!(eval("sqrt 16"), Ok(4.0));
        assert_eq!(eval("sqrt(16)"), Ok(4.0));
        assert_eq!(eval("min(3, 5)"), Ok(3.0));
        assert_eq!(eval("max(3, 5)"), Ok(5.0));
        assert_eq!(eval("gcd(12, 18)"), Ok(6.0));
        assert_eq!(eval("abs(-3) + floor 2.7"), Ok(5.0));
        assert_eq!(eval("max(1, min(4, 2 * 3))"), Ok(4.0));
    }

    #[test]
    fn evaluates_unary_signs() {
        assert_eq!(eval("-2 ^ 2"), Ok(-4.0));
        assert_eq!(eval("2 * -3"), Ok(-6.0));
        assert_eq!(eval("+4 - -1"), Ok(5.0));
    }

    #[test]
    fn constants_resolve() {
        assert_eq!(eval("pi"), Ok(std::f64::consts::PI));
        assert_eq!(eval("cos(two_pi)"), Ok(1.0));
    }

    #[test]
    fn equality_uses_absolute_epsilon() {
        assert_eq!(eval("1 / 3 * 3 == 1"), Ok(1.0));
        assert_eq!(eval("0.1 * 3 == 0.3"), Ok(0.0));

        let loose = Evaluator::new(Settings{equality_epsilon: 1e-9, ..Settings::default()});
        assert_eq!(loose.evaluate("0.1 * 3 == 0.3", &mut Variables::new()), Ok(1.0));
    }

    #[test]
    fn assignment_stores_and_yields_the_value() {
        let mut variables = Variables::new();
        assert_eq!(evaluate("x = 5", &mut variables), Ok(5.0));
        assert_eq!(evaluate("x * 2", &mut variables), Ok(10.0));
        assert_eq!(evaluate("x = x + 1", &mut variables), Ok(6.0));
        assert_eq!(evaluate("a = b = 2", &mut variables), Ok(2.0));
        assert_eq!(variables.get("a"), Some(2.0));
        assert_eq!(variables.get("b"), Some(2.0));
    }

    #[test]
    fn constants_and_functions_are_not_targets() {
        let mut variables = Variables::new();
        assert_eq!(evaluate("pi = 3", &mut variables), Err(CalcError::invalid_assignment_target));
        assert_eq!(evaluate("sqrt = 3", &mut variables), Err(CalcError::invalid_assignment_target));
        assert!(variables.is_empty());
    }

    #[test]
    fn assignment_needs_a_target_and_a_value() {
        assert_eq!(eval("= 5"), Err(CalcError::invalid_assignment_target));
        assert_eq!(eval("x ="), Err(CalcError::empty_assignment_value));
    }

    #[test]
    fn undefined_names_are_collected() {
        assert_eq!(eval("undefined_name + 1"), Err(CalcError::undefined_variable(vec!["undefined_name".into()])));
        assert_eq!(eval("a + b * c"), Err(CalcError::undefined_variable(vec!["b".into(), "c".into(), "a".into()])));
        assert_eq!(eval("sqrt y"), Err(CalcError::undefined_variable(vec!["y".into()])));
        assert_eq!(eval("q"), Err(CalcError::undefined_variable(vec!["q".into()])));
    }

    #[test]
    fn undefined_names_are_reported_once() {
        assert_eq!(eval("x + x"), Err(CalcError::undefined_variable(vec!["x".into()])));
        assert_eq!(eval("y * z - y"), Err(CalcError::undefined_variable(vec!["y".into(), "z".into()])));
    }

    #[test]
    fn assignment_from_an_undefined_name() {
        let mut variables = Variables::new();
        assert_eq!(evaluate("x = y", &mut variables), Err(CalcError::undefined_variable(vec!["y".into()])));
        assert_eq!(evaluate("x = y = z", &mut variables), Err(CalcError::undefined_variable(vec!["z".into()])));
        assert!(variables.is_empty());
    }

    #[test]
    fn undefined_names_never_reach_the_resolver() {
        let mut variables = Variables::new();
        assert!(evaluate("x = y + 1", &mut variables).is_err());
        assert_eq!(variables.get("x"), None);
    }

    #[test]
    fn oversized_literal_fails_before_any_assignment() {
        let mut variables = Variables::new();
        let source = format!("(x = 5) + 0x{}", "f".repeat(33));
        assert!(matches!(evaluate(&source, &mut variables), Err(CalcError::invalid_number(_))));
        assert!(variables.is_empty());
    }

    #[test]
    fn unknown_function_call_fails() {
        assert_eq!(eval("frob(2)"), Err(CalcError::unknown_function("frob".into())));
    }

    #[test]
    fn operand_shortage_fails() {
        assert_eq!(eval("2 +"), Err(CalcError::insufficient_operands("+".into())));
        assert_eq!(eval("max(1)"), Err(CalcError::insufficient_operands("max".into())));
        assert_eq!(eval("-"), Err(CalcError::insufficient_operands("neg".into())));
    }

    #[test]
    fn stack_must_end_with_one_value() {
        assert_eq!(eval(""), Err(CalcError::empty_statement));
        assert_eq!(eval("   "), Err(CalcError::empty_statement));
        assert_eq!(eval("1 2 3"), Err(CalcError::redundant_values(2)));
    }

    #[test]
    fn evaluates_pre_parsed_sequences() {
        let expression = parse("x * 3").unwrap();
        let mut variables = Variables::new();
        variables.set("x", 2.0).unwrap();
        let evaluator = Evaluator::default();
        assert_eq!(evaluator.evaluate_rpn(&expression, &mut variables), Ok(6.0));
        variables.set("x", 5.0).unwrap();
        assert_eq!(evaluator.evaluate_rpn(&expression, &mut variables), Ok(15.0));
    }
}
