use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("invalid character encountered at {1}, '{0}'")]
    invalid_character(String, usize),

    #[error("'{0}' is not a valid number")]
    invalid_number(String),

    #[error("mismatched parenthesis")]
    mismatched_parenthesis,

    #[error("mismatched parenthesis or argument separator")]
    mismatched_argument_separator,

    #[error("'{0}' is not a known function")]
    unknown_function(String),

    #[error("not enough operands for '{0}'")]
    insufficient_operands(String),

    #[error("undefined variable(s): {}", .0.join(", "))]
    undefined_variable(Vec<String>),

    #[error("invalid assignment target")]
    invalid_assignment_target,

    #[error("nothing to assign")]
    empty_assignment_value,

    #[error("empty statement")]
    empty_statement,

    #[error("{0} redundant values left over")]
    redundant_values(usize),
}

pub type Result<T> = std::result::Result<T, CalcError>;
