//! Typed decoding of an A2L block tree into a [`Document`].

pub mod assembler;
pub mod conversion;
pub mod cursor;
pub mod document;
pub mod grouping;
pub mod layout;
pub mod memory;
pub mod quantity;
pub mod transport;
pub mod xcp;

pub use assembler::{decode_program, decode_tree};
pub use document::Document;

/// Parse and decode A2L text in one step, discarding structural warnings.
pub fn parse_document(source: &str) -> Document {
    let program = a2l::parser::Parser::new(source.to_string(), 0).parse();
    decode_program(&program)
}
