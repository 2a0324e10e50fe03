//! Query parser and language utilities

mod document;
mod lexer;
#[expect(clippy::module_inception, reason = "false positive")]
mod parser;
mod utils;
mod value;


pub use self::{
    document::{parse_document_source, parse_type},
    lexer::{Lexer, LexerError, ScalarToken, Token},
    parser::{OptionParseResult, ParseError, ParseResult, Parser, UnlocatedParseResult},
    utils::{SourcePosition, Span, Spanning},
};
