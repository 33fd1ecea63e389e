//! Struct tags: per-field annotation strings of `key:"value"` pairs.
//!
//! A tag is written once at the type's declaration, e.g.
//! `json:"name,omitempty" structs:"-"`, and queried by key at runtime. Pairs
//! are separated by spaces, keys may not contain spaces, colons, quotes or
//! control characters, and values are double-quoted with backslash escapes.
//! Lookup scans pairs left to right and stops at the first malformed one, so
//! a pair after a syntax error is never found.

use std::borrow::Cow;
use std::fmt;

/// The raw annotation attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StructTag(&'static str);

impl StructTag {
    pub const EMPTY: Self = Self("");

    pub const fn new(raw: &'static str) -> Self {
        Self(raw)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the value for `key`, or an empty string when absent.
    pub fn get(&self, key: &str) -> Cow<'static, str> {
        self.lookup(key).unwrap_or(Cow::Borrowed(""))
    }

    /// Returns the value for `key`, distinguishing an absent key from an
    /// explicitly empty value.
    pub fn lookup(&self, key: &str) -> Option<Cow<'static, str>> {
        self.pairs()
            .find(|(name, _)| *name == key)
            .and_then(|(_, quoted)| unquote(quoted))
    }

    /// The keys of every well-formed pair, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        self.pairs().map(|(name, _)| name)
    }

    fn pairs(&self) -> Pairs {
        Pairs { rest: self.0 }
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl From<&'static str> for StructTag {
    fn from(raw: &'static str) -> Self {
        Self(raw)
    }
}

/// Yields `(key, quoted value)` pairs until the tag ends or a pair is malformed.
///
/// `#[derive(Struct)]` validates raw tags with a copy of this scanner
/// (`scan_raw_tag` in structs-derive's `attrs.rs`); keep the two in step.
struct Pairs {
    rest: &'static str,
}

impl Iterator for Pairs {
    type Item = (&'static str, &'static str);

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.rest.trim_start_matches(' ');
        let bytes = tag.as_bytes();

        let mut i = 0;
        while i < bytes.len() && is_key_byte(bytes[i]) {
            i += 1;
        }
        if i == 0 || i + 1 >= bytes.len() || bytes[i] != b':' || bytes[i + 1] != b'"' {
            self.rest = "";
            return None;
        }
        let name = &tag[..i];
        let tag = &tag[i + 1..];
        let bytes = tag.as_bytes();

        let mut j = 1;
        while j < bytes.len() && bytes[j] != b'"' {
            if bytes[j] == b'\\' {
                j += 1;
            }
            j += 1;
        }
        if j >= bytes.len() {
            self.rest = "";
            return None;
        }
        self.rest = &tag[j + 1..];
        Some((name, &tag[..=j]))
    }
}

/// Keys are runs of printable non-space bytes other than `:` and `"`.
fn is_key_byte(b: u8) -> bool {
    b > b' ' && b != b':' && b != b'"' && b != 0x7f
}

/// Decodes a double-quoted value. Returns `None` on an invalid escape.
fn unquote(quoted: &'static str) -> Option<Cow<'static, str>> {
    let inner = quoted.strip_prefix('"')?.strip_suffix('"')?;
    if inner.contains('\n') {
        return None;
    }
    if !inner.contains('\\') {
        return Some(Cow::Borrowed(inner));
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let decoded = match chars.next()? {
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0c',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\x0b',
            '\\' => '\\',
            '"' => '"',
            'x' => hex_escape(&mut chars, 2).filter(char::is_ascii)?,
            'u' => hex_escape(&mut chars, 4)?,
            'U' => hex_escape(&mut chars, 8)?,
            _ => return None,
        };
        out.push(decoded);
    }
    Some(Cow::Owned(out))
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let mut code = 0_u32;
    for _ in 0..digits {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(r#"structs:"-""#, "structs", Some("-"))]
    #[case(r#"json:"name,omitempty" structs:"x""#, "json", Some("name,omitempty"))]
    #[case(r#"json:"name,omitempty" structs:"x""#, "structs", Some("x"))]
    #[case(r#"json:"" structs:"x""#, "json", Some(""))]
    #[case(r#"json:"a" json:"b""#, "json", Some("a"))]
    #[case(r#"   spaced:"ok"   "#, "spaced", Some("ok"))]
    #[case(r#"json:"a""#, "xml", None)]
    #[case("", "json", None)]
    fn lookup_finds_well_formed_pairs(
        #[case] raw: &'static str,
        #[case] key: &str,
        #[case] expected: Option<&str>,
    ) {
        let tag = StructTag::new(raw);
        assert_eq!(tag.lookup(key).as_deref(), expected);
    }

    #[rstest]
    #[case(r#"json:name structs:"x""#)]
    #[case(r#"json :"a" structs:"x""#)]
    #[case(r#"json:"unterminated structs:"x"#)]
    #[case(r#""json":"a" structs:"x""#)]
    fn malformed_pair_stops_the_scan(#[case] raw: &'static str) {
        assert_eq!(StructTag::new(raw).lookup("structs"), None);
    }

    #[test]
    fn get_defaults_to_empty() {
        let tag = StructTag::new(r#"json:"a""#);
        assert_eq!(tag.get("json"), "a");
        assert_eq!(tag.get("yaml"), "");
        assert_eq!(StructTag::EMPTY.get("json"), "");
    }

    #[test]
    fn escapes_are_decoded() {
        let tag = StructTag::new(r#"a:"say \"hi\"" b:"tab\there" c:"é\x41" d:"\q""#);
        assert_eq!(tag.get("a"), r#"say "hi""#);
        assert_eq!(tag.get("b"), "tab\there");
        assert_eq!(tag.get("c"), "éA");
        assert_eq!(tag.lookup("d"), None);
    }

    #[test]
    fn plain_values_borrow_from_the_tag() {
        let tag = StructTag::new(r#"json:"plain""#);
        assert!(matches!(tag.lookup("json"), Some(Cow::Borrowed("plain"))));
    }

    #[test]
    fn keys_are_listed_in_order() {
        let tag = StructTag::new(r#"json:"a" structs:"-" db:"col""#);
        assert_eq!(tag.keys().collect::<Vec<_>>(), ["json", "structs", "db"]);
    }
}
