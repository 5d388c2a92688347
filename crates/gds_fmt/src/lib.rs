//! GDScript auto-formatter.
//!
//! The core pipeline: lex (`gds_lexer`), parse (`gds_parse`), normalize,
//! lay out into document primitives, print. The only public entry point
//! is [`format`], a pure function from source text and a [`FormatConfig`]
//! to formatted text or a [`ParseError`].
//!
//! # Output contract
//!
//! - semantically equivalent to the input, modulo trailing commas,
//!   canonical property-accessor order, and redundant grouping parens;
//! - `\n` line endings, tabs for indentation, exactly one trailing
//!   newline, never two consecutive blank lines;
//! - string literals byte-identical, quote style included;
//! - idempotent: `format(format(x)) == format(x)`.
//!
//! # Example
//!
//! ```
//! use gds_fmt::{format, FormatConfig};
//!
//! let config = FormatConfig::default();
//! let output = format("var x=0+1", &config).unwrap();
//! assert_eq!(output, "var x = 0 + 1\n");
//! ```

mod config;
mod doc;
mod layout;
mod normalize;
mod printer;

pub use config::FormatConfig;
pub use gds_ir::{ParseError, ParseErrorKind};

use tracing::debug;

/// Format GDScript source text.
///
/// On success the result is the whole formatted file. Recoverable
/// truncations (a malformed match arm or property accessor) produce the
/// formatted prefix with the unparseable tail passed through verbatim.
/// Any other lex or parse error is returned without emitting output.
pub fn format(source: &str, config: &FormatConfig) -> Result<String, ParseError> {
    debug!(len = source.len(), "format");
    let tokens = gds_lexer::lex(source)?;
    let output = gds_parse::parse(source, &tokens)?;
    let mut class = output.class;
    normalize::normalize(&mut class);

    let mut printer = printer::Printer::new(config);
    printer.print_class(&class, 0);

    if let Some(tail) = output.tail {
        // Formatted prefix, then the unparseable region byte for byte.
        let mut result = printer.into_raw().trim_end().to_string();
        result.push_str(&source[tail as usize..]);
        return Ok(result);
    }

    Ok(printer.finish())
}
