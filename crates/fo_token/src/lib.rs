pub mod token;
pub mod token_types;

pub use token::Token;
pub use token_types::TokenType;
