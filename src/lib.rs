//! Arithmetic expression evaluation: text is scanned into tokens, converted
//! to postfix order with the shunting-yard algorithm and run on a value
//! stack against a caller supplied [`Resolver`].
//!
//! ```
//! use calc_rs::{evaluate, Variables};
//!
//! let mut variables = Variables::new();
//! assert_eq!(evaluate("x = 0x1A", &mut variables).unwrap(), 26.0);
//! assert_eq!(evaluate("sqrt(x - 10) * 2", &mut variables).unwrap(), 8.0);
//! ```
#![allow(nonstandard_style)]

pub mod builtins;
pub mod error_handling;
pub mod evaluating;
pub mod parsing;
pub mod resolving;
pub mod scanning;
pub mod settings;

pub type Number = f64;

pub use error_handling::{CalcError, Result};
pub use evaluating::{evaluate, Evaluator};
pub use parsing::{parse, parse_with, render, ExprNode};
pub use resolving::{Resolver, Variables};
pub use scanning::{next_token, tokenize, Token, TokenKind};
pub use settings::Settings;
