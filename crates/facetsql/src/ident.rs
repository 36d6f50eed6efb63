//! Safe SQL identifier quoting.
//!
//! Identifiers cannot be bound as parameters, so any client-influenced column or
//! table name that ends up in statement text goes through [`quote_ident`] first.
//!
//! - Everything from the first NUL onwards is discarded (some drivers truncate
//!   strings at NUL, which would otherwise let a payload hide behind it).
//! - The remainder is wrapped in `"` with embedded `"` doubled.
//!
//! # Example
//! ```ignore
//! use facetsql::quote_ident;
//!
//! assert_eq!(quote_ident("price"), r#""price""#);
//! assert_eq!(quote_ident(r#"a"b"#), r#""a""b""#);
//! ```

/// Quote an identifier for interpolation into statement text.
///
/// Never fails: the result is always a single syntactically valid quoted
/// identifier, even if it names nothing.
pub fn quote_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    write_quoted(name, &mut out);
    out
}

pub(crate) fn write_quoted(name: &str, out: &mut String) {
    let name = match name.find('\0') {
        Some(end) => &name[..end],
        None => name,
    };
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
            out.push('"');
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}
