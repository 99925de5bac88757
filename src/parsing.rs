use crate::builtins::truth;
use crate::error_handling::*;
use crate::scanning::*;
use crate::settings::Settings;
use crate::Number;
use log::debug;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    negative,
    positive,
}

impl UnaryOperator {
    pub fn call(&self, value: Number) -> Number {
        use UnaryOperator::*;
        match self {
            positive => value,
            negative => -value,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct InvalidOperator;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    addition,
    subtraction,
    multiplication,
    division,
    remainder,
    exponentiation,
    less_than,
    less_equals,
    greater_than,
    greater_equals,
    equality,
}

impl BinaryOperator {
    /// Applies the operator; `left` is the operand pushed first.
    pub fn call(&self, left: Number, right: Number, epsilon: Number) -> Number {
        use BinaryOperator::*;
        match self {
            addition => left + right,
            subtraction => left - right,
            multiplication => left * right,
            division => left / right,
            remainder => left % right,
            exponentiation => left.powf(right),
            less_than => truth(left < right),
            less_equals => truth(left <= right),
            greater_than => truth(left > right),
            greater_equals => truth(left >= right),
            equality => truth((left - right).abs() <= epsilon),
        }
    }

    pub fn symbol(&self) -> &'static str {
        use BinaryOperator::*;
        match self {
            addition => "+",
            subtraction => "-",
            multiplication => "*",
            division => "/",
            remainder => "%",
            exponentiation => "^",
            less_than => "<",
            less_equals => "<=",
            greater_than => ">",
            greater_equals => ">=",
            equality => "==",
        }
    }
}

impl TryFrom<TokenKind> for BinaryOperator {
    type Error = InvalidOperator;

    fn try_from(kind: TokenKind) -> std::result::Result<Self, Self::Error> {
        use BinaryOperator::*;
        match kind {
            TokenKind::add => Ok(addition),
            TokenKind::sub => Ok(subtraction),
            TokenKind::mul => Ok(multiplication),
            TokenKind::div => Ok(division),
            TokenKind::modulo => Ok(remainder),
            TokenKind::pow => Ok(exponentiation),
            TokenKind::less_than => Ok(less_than),
            TokenKind::less_equals => Ok(less_equals),
            TokenKind::greater_than => Ok(greater_than),
            TokenKind::greater_equals => Ok(greater_equals),
            TokenKind::equals => Ok(equality),
            _ => Err(InvalidOperator),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    unary(UnaryOperator),
    binary(BinaryOperator),
    assignment,
}

impl TryFrom<TokenKind> for Operator {
    type Error = InvalidOperator;

    fn try_from(kind: TokenKind) -> std::result::Result<Self, Self::Error> {
        match kind {
            TokenKind::assign => Ok(Operator::assignment),
            kind => BinaryOperator::try_from(kind).map(Operator::binary),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::unary(UnaryOperator::negative) => f.write_str("neg"),
            Operator::unary(UnaryOperator::positive) => f.write_str("pos"),
            Operator::binary(operator) => f.write_str(operator.symbol()),
            Operator::assignment => f.write_str("="),
        }
    }
}

/// A number literal, its base fixed by the scanner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Literal<'src> {
    pub radix: Radix,
    pub lexeme: &'src str,
}

impl<'src> Literal<'src> {
    pub fn digits(&self) -> &'src str {
        &self.lexeme[self.radix.prefix_len()..]
    }

    /// Prefixed literals are unsigned integer magnitudes widened to a
    /// `Number`, losing precision past its exact-integer range.
    pub fn value(&self) -> Result<Number> {
        let invalid = || CalcError::invalid_number(self.lexeme.to_owned());
        match self.radix {
            Radix::decimal => self.digits().parse().map_err(|_| invalid()),
            radix => u128::from_str_radix(self.digits(), radix.base())
                .map(|magnitude| magnitude as Number)
                .map_err(|_| invalid()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExprNode<'src> {
    /// A literal, valued while parsing.
    number(Number),
    /// An identifier left for the evaluator to classify.
    name(&'src str),
    /// A function marker, emitted once its arguments are in place.
    call(&'src str),
    /// An identifier directly followed by `=`.
    target(&'src str),
    operator(Operator),
}

impl fmt::Display for ExprNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprNode::number(value) => write!(f, "{value}"),
            ExprNode::name(name) | ExprNode::call(name) | ExprNode::target(name) => f.write_str(name),
            ExprNode::operator(operator) => write!(f, "{operator}"),
        }
    }
}

/// Space separated postfix rendering, e.g. `2 3 4 * +`.
pub fn render(expression: &[ExprNode]) -> String {
    expression.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

pub enum StackNode<'src> {
    operator(Operator),
    call(&'src str),
    paren,
}

impl StackNode<'_> {
    fn precedence(&self) -> i32 {
        use BinaryOperator::*;
        use Operator::*;
        match self {
            Self::paren => 0,
            Self::operator(assignment) => 1,
            Self::operator(binary(operator)) =>
                match operator {
                    less_than | less_equals | greater_than | greater_equals | equality => 2,
                    addition | subtraction => 3,
                    multiplication | division | remainder => 4,
                    exponentiation => 5,
                },
            Self::operator(unary(_)) => 3,
            Self::call(_) => 6,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct InvalidNode;

impl<'src> TryFrom<StackNode<'src>> for ExprNode<'src> {
    type Error = InvalidNode;

    fn try_from(node: StackNode<'src>) -> std::result::Result<Self, Self::Error> {
        match node {
            StackNode::operator(operator) => Ok(ExprNode::operator(operator)),
            StackNode::call(name) => Ok(ExprNode::call(name)),
            StackNode::paren => Err(InvalidNode),
        }
    }
}

pub struct Yard<'src> {
    expression: Vec<ExprNode<'src>>,
    stack: Vec<StackNode<'src>>,
}

impl<'src> Default for Yard<'src> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'src> Yard<'src> {
    pub fn new() -> Self {
        Self{expression: Vec::new(), stack: Vec::new()}
    }

    fn pop_higher_operator(&mut self, precedence: i32, inclusive: bool) -> Option<ExprNode<'src>> {
        let top = self.stack.last()?.precedence();
        let higher = if inclusive { top >= precedence } else { top > precedence };
        if higher {
            ExprNode::try_from(self.stack.pop()?).ok()
        } else {
            None
        }
    }

    fn add_operand(&mut self, node: ExprNode<'src>) {
        self.expression.push(node);
    }

    fn add_call(&mut self, name: &'src str) {
        self.stack.push(StackNode::call(name));
    }

    fn add_unary(&mut self, operator: UnaryOperator) {
        self.stack.push(StackNode::operator(Operator::unary(operator)));
    }

    fn add_operator(&mut self, operator: Operator) {
        let node = StackNode::operator(operator);
        let precedence = node.precedence();
        // every binary operator groups left to right, assignment right to left
        let inclusive = operator != Operator::assignment;
        while let Some(higher) = self.pop_higher_operator(precedence, inclusive) {
            self.expression.push(higher);
        }
        self.stack.push(node);
    }

    fn add_left_paren(&mut self) {
        self.stack.push(StackNode::paren);
    }

    fn add_comma(&mut self) -> Result<()> {
        loop {
            match self.stack.last() {
                Some(StackNode::paren) => return Ok(()),
                Some(_) => self.move_top(),
                None => return Err(CalcError::mismatched_argument_separator),
            }
        }
    }

    fn add_right_paren(&mut self) -> Result<()> {
        while let Some(stack_node) = self.stack.pop() {
            match ExprNode::try_from(stack_node) {
                Ok(node) => self.expression.push(node),
                Err(InvalidNode) => {
                    if let Some(StackNode::call(_)) = self.stack.last() {
                        self.move_top();
                    }
                    return Ok(());
                },
            }
        }
        Err(CalcError::mismatched_parenthesis)
    }

    fn move_top(&mut self) {
        if let Some(node) = self.stack.pop().and_then(|node| ExprNode::try_from(node).ok()) {
            self.expression.push(node);
        }
    }

    /// Handles one token and reports whether an operand is expected next.
    fn handle(&mut self, token: Token<'src>, next: TokenKind, is_edge: bool) -> Result<bool> {
        use TokenKind::*;
        let unexpected = || CalcError::invalid_character(token.lexeme.to_owned(), token.offset);
        match token.kind {
            error => Err(unexpected()),
            number(radix) => {
                let value = Literal{radix, lexeme: token.lexeme}.value()?;
                self.add_operand(ExprNode::number(value));
                Ok(false)
            },
            identifier => match next {
                open_paren | identifier | number(_) => {
                    self.add_call(token.lexeme);
                    Ok(true)
                },
                assign => {
                    self.add_operand(ExprNode::target(token.lexeme));
                    Ok(false)
                },
                _ => {
                    self.add_operand(ExprNode::name(token.lexeme));
                    Ok(false)
                },
            },
            add if is_edge => {
                self.add_unary(UnaryOperator::positive);
                Ok(true)
            },
            sub if is_edge => {
                self.add_unary(UnaryOperator::negative);
                Ok(true)
            },
            open_paren => {
                self.add_left_paren();
                Ok(true)
            },
            comma => {
                self.add_comma()?;
                Ok(true)
            },
            close_paren => {
                self.add_right_paren()?;
                Ok(false)
            },
            kind => {
                let operator = Operator::try_from(kind).map_err(|InvalidOperator| unexpected())?;
                self.add_operator(operator);
                Ok(true)
            },
        }
    }

    pub fn finish(mut self) -> Result<Vec<ExprNode<'src>>> {
        while let Some(stack_node) = self.stack.pop() {
            match ExprNode::try_from(stack_node) {
                Ok(node) => self.expression.push(node),
                Err(InvalidNode) => return Err(CalcError::mismatched_parenthesis),
            }
        }
        Ok(self.expression)
    }
}

/// Converts whatever the scanner yields into postfix order.
pub fn parse_tokens<'src, S: Scanner<'src>>(source: &mut S) -> Result<Vec<ExprNode<'src>>> {
    let mut is_edge = true;
    let mut yard = Yard::new();

    while source.is_valid() {
        let token = source.get_current();
        if token.kind == TokenKind::end_of_file {
            break;
        }
        is_edge = yard.handle(token, source.peek().kind, is_edge)?;
        source.advance();
    }

    let expression = yard.finish()?;
    debug!("rpn: {}", render(&expression));
    Ok(expression)
}

pub fn parse(expression_string: &str) -> Result<Vec<ExprNode<'_>>> {
    parse_with(expression_string, &Settings::default())
}

pub fn parse_with<'src>(expression_string: &'src str, settings: &Settings) -> Result<Vec<ExprNode<'src>>> {
    let mut source = StringScanner::with_settings(expression_string, settings);
    parse_tokens(&mut source)
}
