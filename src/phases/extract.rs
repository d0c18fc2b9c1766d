//! # Definition Extraction
//!
//! Scans an upstream checkout for type definitions of a fixed shape:
//!
//! ```text
//! [pub[(..)]] struct <Base><Suffix> [<generics>] [where ..] { .. <Marker> .. }
//! ```
//!
//! Each source file is split into a flat token stream (identifiers,
//! punctuation and literals, with comments dropped) and definitions are
//! recognized by keyword position and brace depth rather than by a character
//! allow-list. A body must mention the container marker as a whole identifier
//! at least once. Tuple and unit structs never match.
//!
//! Files are visited in lexicographic path order and definitions are returned
//! in file order, then source order. Duplicates are kept.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What to look for in the upstream tree
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Source file extension, without the dot
    pub extension: String,
    /// Item keywords that introduce a definition
    pub keywords: Vec<String>,
    /// Identifier suffix selecting the definitions to mirror
    pub suffix: String,
    /// Container type that must appear in the body
    pub marker: String,
}

/// A definition fragment as found upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDefinition {
    /// File the fragment came from, relative to the checkout root
    pub path: PathBuf,
    /// Visibility and keyword, e.g. `pub struct`
    pub header: String,
    /// Full upstream identifier, e.g. `FooInput`
    pub identifier: String,
    /// Identifier without the suffix, e.g. `Foo`
    pub base_identifier: String,
    /// Source text between the identifier and the opening brace
    pub generics: String,
    /// Source text between the braces
    pub body: String,
}

/// Collects every matching definition under `root`.
pub fn extract_definitions(root: &Path, options: &ExtractOptions) -> Result<Vec<RawDefinition>> {
    let mut definitions = Vec::new();

    for path in source_files(root, &options.extension)? {
        let bytes = fs::read(&path)?;
        let Ok(source) = String::from_utf8(bytes) else {
            log::warn!("Skipping non UTF-8 source file {}", path.display());
            continue;
        };
        let relative = path.strip_prefix(root).unwrap_or(&path);
        let found = extract_from_source(relative, &source, options);
        if !found.is_empty() {
            log::debug!("{}: {} definition(s)", relative.display(), found.len());
        }
        definitions.extend(found);
    }

    log::info!(
        "Extracted {} definition(s) from {}",
        definitions.len(),
        root.display()
    );
    Ok(definitions)
}

/// Lists files with `extension` under `root` in lexicographic order, skipping `.git`.
pub(crate) fn source_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != ".git");

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == extension)
        {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Extracts matching definitions from a single source file.
pub fn extract_from_source(path: &Path, source: &str, options: &ExtractOptions) -> Vec<RawDefinition> {
    let tokens = tokenize(source);
    let mut definitions = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];
        let is_keyword = token.kind == TokenKind::Ident
            && options.keywords.iter().any(|k| k == token.text(source));

        if is_keyword {
            if let Some((definition, end)) = match_definition(path, source, &tokens, i, options) {
                definitions.push(definition);
                i = end + 1;
                continue;
            }
        }
        i += 1;
    }

    definitions
}

/// Tries to match a definition whose keyword is `tokens[keyword]`.
///
/// Returns the definition and the index of its closing brace.
fn match_definition(
    path: &Path,
    source: &str,
    tokens: &[Token],
    keyword: usize,
    options: &ExtractOptions,
) -> Option<(RawDefinition, usize)> {
    let start = header_start(source, tokens, keyword)?;

    let name = tokens.get(keyword + 1)?;
    if name.kind != TokenKind::Ident {
        return None;
    }
    let identifier = name.text(source);
    let base_identifier = identifier.strip_suffix(options.suffix.as_str())?;
    if base_identifier.is_empty() {
        return None;
    }

    // Generics and where clauses run until the body at angle depth zero.
    let mut angle_depth = 0usize;
    let mut in_where = false;
    let mut open = None;
    for (offset, token) in tokens[keyword + 2..].iter().enumerate() {
        match token.kind {
            TokenKind::Ident if angle_depth == 0 && token.text(source) == "where" => in_where = true,
            TokenKind::Punct('<') => angle_depth += 1,
            TokenKind::Punct('>') if !token.follows_arrow(source) => {
                angle_depth = angle_depth.saturating_sub(1)
            }
            TokenKind::Punct('{') if angle_depth == 0 => {
                open = Some(keyword + 2 + offset);
                break;
            }
            TokenKind::Punct(';') if angle_depth == 0 => return None,
            TokenKind::Punct('(') if angle_depth == 0 && !in_where => return None,
            TokenKind::Punct('}') => return None,
            _ => {}
        }
    }
    let open = open?;
    let close = matching_brace(tokens, open)?;

    let mentions_marker = tokens[open + 1..close]
        .iter()
        .any(|t| t.kind == TokenKind::Ident && t.text(source) == options.marker);
    if !mentions_marker {
        return None;
    }

    let definition = RawDefinition {
        path: path.to_path_buf(),
        header: source[start..tokens[keyword].end].to_string(),
        identifier: identifier.to_string(),
        base_identifier: base_identifier.to_string(),
        generics: source[name.end..tokens[open].start].to_string(),
        body: source[tokens[open].end..tokens[close].start].to_string(),
    };
    Some((definition, close))
}

/// Finds where the item starting at `tokens[keyword]` begins, including its
/// visibility. Returns `None` when the keyword is not in item position.
fn header_start(source: &str, tokens: &[Token], keyword: usize) -> Option<usize> {
    let mut first = keyword;

    if keyword > 0 {
        let prev = &tokens[keyword - 1];
        if prev.is_ident(source, "pub") {
            first = keyword - 1;
        } else if prev.kind == TokenKind::Punct(')') {
            // pub(crate), pub(super), pub(in path)
            let open = tokens[..keyword - 1]
                .iter()
                .rposition(|t| t.kind == TokenKind::Punct('('))?;
            if open > 0 && tokens[open - 1].is_ident(source, "pub") {
                first = open - 1;
            } else {
                return None;
            }
        }
    }

    let in_item_position = first == 0
        || matches!(
            tokens[first - 1].kind,
            TokenKind::Punct(';') | TokenKind::Punct('{') | TokenKind::Punct('}') | TokenKind::Punct(']')
        );
    in_item_position.then(|| tokens[first].start)
}

fn matching_brace(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::Punct('{') => depth += 1,
            TokenKind::Punct('}') => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Ident,
    Punct(char),
    Literal,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

impl Token {
    fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    fn is_ident(&self, source: &str, name: &str) -> bool {
        self.kind == TokenKind::Ident && self.text(source) == name
    }

    /// `>` that is the second half of `->`
    fn follows_arrow(&self, source: &str) -> bool {
        self.start > 0 && source.as_bytes()[self.start - 1] == b'-'
    }
}

/// Splits Rust-like source into identifiers, punctuation and literals.
///
/// Comments and whitespace produce no tokens. String, raw string and char
/// literals become a single `Literal` token so braces inside them are inert.
fn tokenize(source: &str) -> Vec<Token> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;

        if c.is_ascii_whitespace() {
            i += 1;
        } else if c == b'/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
        } else if c == b'/' && bytes.get(i + 1) == Some(&b'*') {
            i = skip_block_comment(bytes, i);
        } else if c == b'"' {
            i = skip_string(bytes, i + 1);
            tokens.push(Token { kind: TokenKind::Literal, start, end: i });
        } else if c == b'r' && raw_string_hashes(bytes, i).is_some() {
            i = skip_raw_string(bytes, i);
            tokens.push(Token { kind: TokenKind::Literal, start, end: i });
        } else if c == b'\'' {
            match char_literal_end(bytes, i) {
                Some(end) => {
                    i = end;
                    tokens.push(Token { kind: TokenKind::Literal, start, end: i });
                }
                None => {
                    // Lifetime: the quote is punctuation, the name an identifier.
                    i += 1;
                    tokens.push(Token { kind: TokenKind::Punct('\''), start, end: i });
                }
            }
        } else if c == b'_' || c.is_ascii_alphabetic() || c >= 0x80 {
            while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric() || bytes[i] >= 0x80) {
                i += 1;
            }
            tokens.push(Token { kind: TokenKind::Ident, start, end: i });
        } else if c.is_ascii_digit() {
            while i < bytes.len() && (bytes[i] == b'_' || bytes[i] == b'.' || bytes[i].is_ascii_alphanumeric()) {
                i += 1;
            }
            tokens.push(Token { kind: TokenKind::Literal, start, end: i });
        } else {
            i += 1;
            tokens.push(Token { kind: TokenKind::Punct(c as char), start, end: i });
        }
    }

    tokens
}

fn skip_block_comment(bytes: &[u8], mut i: usize) -> usize {
    let mut depth = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
            depth += 1;
            i += 2;
        } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return i;
            }
        } else {
            i += 1;
        }
    }
    i
}

/// Skips past the closing quote of a string whose body starts at `i`.
fn skip_string(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Number of `#` in a raw string opener at `i` (`r"`, `r#"`, ...).
fn raw_string_hashes(bytes: &[u8], i: usize) -> Option<usize> {
    if i > 0 && (bytes[i - 1] == b'_' || bytes[i - 1].is_ascii_alphanumeric()) {
        return None;
    }
    let mut j = i + 1;
    while bytes.get(j) == Some(&b'#') {
        j += 1;
    }
    (bytes.get(j) == Some(&b'"')).then_some(j - i - 1)
}

fn skip_raw_string(bytes: &[u8], i: usize) -> usize {
    let hashes = raw_string_hashes(bytes, i).unwrap_or(0);
    let mut j = i + 2 + hashes;
    while j < bytes.len() {
        if bytes[j] == b'"' && bytes[j + 1..].iter().take(hashes).filter(|&&b| b == b'#').count() == hashes {
            return j + 1 + hashes;
        }
        j += 1;
    }
    bytes.len()
}

/// End of a char literal starting at `i`, or `None` for a lifetime.
fn char_literal_end(bytes: &[u8], i: usize) -> Option<usize> {
    match bytes.get(i + 1)? {
        b'\\' => {
            // Skip the escaped character itself, which may be a quote.
            let mut j = i + 3;
            while j < bytes.len() && bytes[j] != b'\'' {
                j += 1;
            }
            Some((j + 1).min(bytes.len()))
        }
        _ => {
            // One (possibly multi-byte) character followed by a closing quote.
            let rest = std::str::from_utf8(&bytes[i + 1..]).ok()?;
            let ch = rest.chars().next()?;
            let close = i + 1 + ch.len_utf8();
            (bytes.get(close) == Some(&b'\'')).then_some(close + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options() -> ExtractOptions {
        ExtractOptions {
            extension: "rs".to_string(),
            keywords: vec!["struct".to_string()],
            suffix: "Input".to_string(),
            marker: "BTreeMap".to_string(),
        }
    }

    fn extract(source: &str) -> Vec<RawDefinition> {
        extract_from_source(Path::new("lib.rs"), source, &options())
    }

    #[test]
    fn test_extract_simple_definition() {
        let defs = extract("struct FooInput { a: BTreeMap<K,V> }");
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].identifier, "FooInput");
        assert_eq!(defs[0].base_identifier, "Foo");
        assert_eq!(defs[0].header, "struct");
        assert_eq!(defs[0].generics, " ");
        assert_eq!(defs[0].body, " a: BTreeMap<K,V> ");
    }

    #[test]
    fn test_extract_keeps_visibility_and_skips_attributes() {
        let source = r#"
#[derive(Debug, Clone, ScryptoSbor)]
pub struct AccessControllerCreateInput {
    pub controlled_asset: Bucket,
    #[serde(default)]
    pub rule_set: BTreeMap<String, AccessRule>,
}

pub(crate) struct OtherInput { x: BTreeMap<u8, u8> }
"#;
        let defs = extract(source);
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].header, "pub struct");
        assert_eq!(defs[0].identifier, "AccessControllerCreateInput");
        assert!(defs[0].body.contains("#[serde(default)]"));
        assert_eq!(defs[1].header, "pub(crate) struct");
    }

    #[test]
    fn test_extract_requires_marker_token() {
        let source = r#"
pub struct NoMapInput { a: Vec<u8> }
pub struct PrefixedInput { a: MyBTreeMap<u8, u8> }
pub struct CommentedInput {
    // BTreeMap in a comment does not count
    a: Vec<u8>,
}
"#;
        assert!(extract(source).is_empty());
    }

    #[test]
    fn test_extract_requires_suffix() {
        let source = "pub struct FooOutput { a: BTreeMap<u8, u8> }\npub struct Input { a: BTreeMap<u8, u8> }";
        assert!(extract(source).is_empty());
    }

    #[test]
    fn test_extract_ignores_tuple_and_unit_structs() {
        let source = r#"
pub struct TupleInput(BTreeMap<u8, u8>);
pub struct UnitInput;
fn f() -> BTreeMap<u8, u8> { BTreeMap::new() }
"#;
        assert!(extract(source).is_empty());
    }

    #[test]
    fn test_extract_generics_and_where_clause() {
        let source = "pub struct GenericInput<K: Ord, V> where V: Fn() -> u8 { a: BTreeMap<K, V> }";
        let defs = extract(source);
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].generics, "<K: Ord, V> where V: Fn() -> u8 ");
        assert_eq!(defs[0].body, " a: BTreeMap<K, V> ");
    }

    #[test]
    fn test_extract_braces_inside_literals_are_inert() {
        let source = r##"
pub struct LiteralInput {
    #[doc = "a } brace"]
    #[serde(rename = r#"}"#)]
    a: BTreeMap<char, &'static str>,
}
pub struct NextInput { b: BTreeMap<u8, u8> }
"##;
        let defs = extract(source);
        assert_eq!(defs.len(), 2);
        assert!(defs[0].body.contains("&'static str"));
        assert_eq!(defs[1].identifier, "NextInput");
    }

    #[test]
    fn test_tokenize_escaped_quote_char_literal() {
        let source = r"'\'' '\\' '\n'";
        let tokens = tokenize(source);
        let texts: Vec<&str> = tokens.iter().map(|t| t.text(source)).collect();
        assert_eq!(texts, vec![r"'\''", r"'\\'", r"'\n'"]);
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Literal));
    }

    #[test]
    fn test_extract_escaped_quote_does_not_leak_braces() {
        let source = r"
pub struct QuoteInput {
    #[delims('\'', '}')]
    a: BTreeMap<u8, u8>,
}
";
        let defs = extract(source);
        assert_eq!(defs.len(), 1);
        assert!(defs[0].body.contains("a: BTreeMap<u8, u8>,"));
    }

    #[test]
    fn test_extract_skips_keyword_outside_item_position() {
        let source = "let x = struct FooInput { a: BTreeMap<u8, u8> };";
        assert!(extract(source).is_empty());
    }

    #[test]
    fn test_extract_definitions_visits_files_in_order_and_keeps_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("b/z.rs"), "pub struct ZInput { a: BTreeMap<u8, u8> }").unwrap();
        fs::write(root.join("a.rs"), "pub struct AInput { a: BTreeMap<u8, u8> }\npub struct ZInput { b: BTreeMap<u8, u8> }").unwrap();
        fs::write(root.join("notes.md"), "pub struct MdInput { a: BTreeMap<u8, u8> }").unwrap();
        fs::write(root.join(".git/hook.rs"), "pub struct GitInput { a: BTreeMap<u8, u8> }").unwrap();

        let defs = extract_definitions(root, &options()).unwrap();
        let names: Vec<_> = defs.iter().map(|d| d.identifier.as_str()).collect();
        assert_eq!(names, vec!["AInput", "ZInput", "ZInput"]);
        assert_eq!(defs[2].path, PathBuf::from("b/z.rs"));
    }

    #[test]
    fn test_extract_definitions_empty_tree() {
        let temp_dir = TempDir::new().unwrap();
        let defs = extract_definitions(temp_dir.path(), &options()).unwrap();
        assert!(defs.is_empty());
    }
}
