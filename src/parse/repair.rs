//! Closing a truncated JSON document.
//!
//! # Precondition
//!
//! [`repair`] assumes its input is a *prefix* of a valid JSON object or
//! array: the stream was cut off mid-token or mid-structure, nothing else
//! went wrong. It is not a general JSON fixer and makes no attempt to
//! recover from arbitrary corruption; such input is passed through and the
//! subsequent parse simply fails.
//!
//! # Strategy
//!
//! The scanner walks the text once, keeping a stack of open containers
//! (each mapped to its closer) and a lexer state that honors `\` escapes so
//! an escaped quote never toggles string mode. For every container it also
//! tracks what the grammar expects next, which gives it the last *safe
//! cut*: the longest prefix after which appending the pending closers yields
//! valid JSON. Every bracket sets a safe cut, so the stack at the last safe
//! cut is always the current stack.
//!
//! At end of input:
//! - inside a string *value*: the partial text is kept and one closing
//!   quote is appended (a dangling escape is dropped first, and so is a
//!   `\uD800`-`\uDBFF` high surrogate whose low half has not fully arrived);
//! - inside a complete scalar (`12`, `true`): kept as is;
//! - inside a partial number (`12.`, `1e+`): cut back to its longest complete
//!   numeric prefix;
//! - anywhere else (trailing comma, half-written key, key without a value,
//!   partial literal such as `tru` or `-`): cut back to the safe cut;
//! - then the open containers are closed innermost first.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

impl Container {
    const fn closer(self) -> char {
        match self {
            Self::Object => '}',
            Self::Array => ']',
        }
    }
}

/// What a container accepts at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Just opened: first member or the closer.
    First,
    /// After a comma: a member is required.
    Next,
    /// Object key read, `:` pending.
    Colon,
    /// `:` read, value pending.
    Value,
    /// A complete member: `,` or the closer.
    Separator,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    container: Container,
    expect: Expect,
}

/// Escape state inside a string.
///
/// `at` is where the string is cut if the input ends here: the backslash
/// that started the sequence, or the one of the high surrogate it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    Pending(usize),
    /// Inside `\uXXXX`: hex digits still to read and the code so far.
    Unicode { at: usize, left: u8, code: u32 },
    /// A high surrogate escape, waiting for its low half.
    Surrogate(usize),
}

const HIGH_SURROGATES: std::ops::RangeInclusive<u32> = 0xD800..=0xDBFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lex {
    Structural,
    Str { key: bool, escape: Escape },
    Scalar { start: usize },
}

struct Scanner {
    stack: Vec<Frame>,
    lex: Lex,
    safe: Option<usize>,
    root_end: Option<usize>,
}

impl Scanner {
    const fn new() -> Self {
        Self {
            stack: Vec::new(),
            lex: Lex::Structural,
            safe: None,
            root_end: None,
        }
    }

    fn set_expect(&mut self, expect: Expect) {
        if let Some(top) = self.stack.last_mut() {
            top.expect = expect;
        }
    }

    fn expects_key(&self) -> bool {
        self.stack.last().is_some_and(|f| {
            f.container == Container::Object && matches!(f.expect, Expect::First | Expect::Next)
        })
    }

    /// Handles one character outside strings and scalars.
    ///
    /// Returns `false` when the input breaks the precondition.
    fn structural(&mut self, i: usize, c: char) -> bool {
        match c {
            c if c.is_whitespace() => {}
            '{' | '[' => {
                if self.stack.is_empty() && self.safe.is_some() {
                    return false;
                }
                self.set_expect(Expect::Separator);
                let container = if c == '{' {
                    Container::Object
                } else {
                    Container::Array
                };
                self.stack.push(Frame {
                    container,
                    expect: Expect::First,
                });
                self.safe = Some(i + 1);
            }
            '}' | ']' => {
                if self.stack.last().map(|f| f.container.closer()) != Some(c) {
                    return false;
                }
                self.stack.pop();
                self.set_expect(Expect::Separator);
                self.safe = Some(i + 1);
                if self.stack.is_empty() {
                    self.root_end = Some(i + 1);
                }
            }
            _ if self.stack.is_empty() => return false,
            '"' => {
                self.lex = Lex::Str {
                    key: self.expects_key(),
                    escape: Escape::None,
                };
            }
            ':' => self.set_expect(Expect::Value),
            ',' => self.set_expect(Expect::Next),
            _ => self.lex = Lex::Scalar { start: i },
        }
        true
    }

    fn string_char(&mut self, i: usize, c: char, key: bool, escape: Escape) {
        let escape = match (escape, c) {
            (Escape::Pending(at), 'u') => Escape::Unicode {
                at,
                left: 4,
                code: 0,
            },
            (Escape::Pending(_), _) => Escape::None,
            (Escape::Unicode { at, left, code }, _) => {
                let code = code * 16 + c.to_digit(16).unwrap_or(0);
                match left {
                    1 if HIGH_SURROGATES.contains(&code) => Escape::Surrogate(at),
                    1 => Escape::None,
                    _ => Escape::Unicode {
                        at,
                        left: left - 1,
                        code,
                    },
                }
            }
            (Escape::Surrogate(at), '\\') => Escape::Pending(at),
            (Escape::None, '\\') => Escape::Pending(i),
            (Escape::None | Escape::Surrogate(_), '"') => {
                self.lex = Lex::Structural;
                if key {
                    self.set_expect(Expect::Colon);
                } else {
                    self.set_expect(Expect::Separator);
                    self.safe = Some(i + 1);
                }
                return;
            }
            (Escape::None | Escape::Surrogate(_), _) => Escape::None,
        };
        self.lex = Lex::Str { key, escape };
    }

    /// Ends the scalar that started at `start` and ran up to `end`.
    fn end_scalar(&mut self, text: &str, start: usize, end: usize) {
        self.lex = Lex::Structural;
        if is_complete_scalar(&text[start..end]) {
            self.set_expect(Expect::Separator);
            self.safe = Some(end);
        }
    }

    fn closers(&self) -> impl Iterator<Item = char> + '_ {
        self.stack.iter().rev().map(|f| f.container.closer())
    }
}

fn number_pattern() -> Option<&'static Regex> {
    static NUMBER: OnceLock<Option<Regex>> = OnceLock::new();
    NUMBER
        .get_or_init(|| Regex::new(r"^-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?").ok())
        .as_ref()
}

/// Length of the longest prefix of `token` that is a complete scalar.
fn complete_scalar_len(token: &str) -> Option<usize> {
    if matches!(token, "true" | "false" | "null") {
        return Some(token.len());
    }
    number_pattern()?.find(token).map(|m| m.end())
}

fn is_complete_scalar(token: &str) -> bool {
    complete_scalar_len(token) == Some(token.len())
}

const fn ends_scalar(c: char) -> bool {
    matches!(c, ',' | '}' | ']' | ':') || c.is_ascii_whitespace()
}

/// Produces the most complete parseable text for a truncated JSON prefix.
///
/// Returns `None` only for empty or whitespace-only input. Input that does
/// not look like a truncated object/array is returned trimmed but otherwise
/// untouched; see the module docs for the precondition.
///
/// # Examples
///
/// ```
/// use pointstream::parse::repair;
///
/// let repaired = repair(r#"{"points":[{"content":"Do X","category":"action","time"#);
/// assert_eq!(
///     repaired.as_deref(),
///     Some(r#"{"points":[{"content":"Do X","category":"action"}]}"#)
/// );
/// assert_eq!(repair("   "), None);
/// ```
#[must_use]
pub fn repair(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let mut scanner = Scanner::new();
    for (i, c) in text.char_indices() {
        match scanner.lex {
            Lex::Str { key, escape } => scanner.string_char(i, c, key, escape),
            Lex::Scalar { start } => {
                if ends_scalar(c) {
                    scanner.end_scalar(text, start, i);
                    if !scanner.structural(i, c) {
                        return Some(text.to_string());
                    }
                }
            }
            Lex::Structural => {
                if !scanner.structural(i, c) {
                    return Some(text.to_string());
                }
            }
        }
        if let Some(end) = scanner.root_end {
            return Some(text[..end].to_string());
        }
    }

    let mut repaired = match scanner.lex {
        Lex::Str { key: false, escape } => {
            let cut = match escape {
                Escape::None => text.len(),
                Escape::Pending(at) | Escape::Unicode { at, .. } | Escape::Surrogate(at) => at,
            };
            let mut s = String::with_capacity(cut + scanner.stack.len() + 1);
            s.push_str(&text[..cut]);
            s.push('"');
            s
        }
        lex => {
            let scalar_end = match lex {
                Lex::Scalar { start } => complete_scalar_len(&text[start..]).map(|len| start + len),
                _ => None,
            };
            match scalar_end.or(scanner.safe) {
                Some(cut) => text[..cut].to_string(),
                None => return Some(text.to_string()),
            }
        }
    };
    repaired.extend(scanner.closers());
    Some(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn parses(text: &str) -> bool {
        serde_json::from_str::<serde_json::Value>(text).is_ok()
    }

    #[test_case("" ; "empty")]
    #[test_case("   \n\t" ; "whitespace")]
    fn test_repair_empty(input: &str) {
        assert_eq!(repair(input), None);
    }

    #[test_case(r#"{"points":[]}"#, r#"{"points":[]}"# ; "already complete")]
    #[test_case("{", "{}" ; "open brace")]
    #[test_case(r#"{"poi"#, "{}" ; "partial first key")]
    #[test_case(r#"{"points""#, "{}" ; "key without colon")]
    #[test_case(r#"{"points":"#, "{}" ; "key without value")]
    #[test_case(r#"{"points":["#, r#"{"points":[]}"# ; "open array")]
    #[test_case(r#"{"points":[{"content":"Do"#, r#"{"points":[{"content":"Do"}]}"# ; "mid string value")]
    #[test_case(r#"{"points":[{"content":"Do X"},"#, r#"{"points":[{"content":"Do X"}]}"# ; "trailing comma")]
    #[test_case(r#"{"points":[{"content":"Do X"},  "#, r#"{"points":[{"content":"Do X"}]}"# ; "trailing comma and whitespace")]
    #[test_case(r#"{"points":[{"content":"Do X","#, r#"{"points":[{"content":"Do X"}]}"# ; "trailing comma in object")]
    #[test_case(r#"{"a":[1,2"#, r#"{"a":[1,2]}"# ; "complete number")]
    #[test_case(r#"{"a":[1,2."#, r#"{"a":[1,2]}"# ; "partial fraction")]
    #[test_case(r#"{"a":1.5e"#, r#"{"a":1.5}"# ; "partial exponent")]
    #[test_case(r#"{"a":12e+"#, r#"{"a":12}"# ; "signed exponent without digits")]
    #[test_case(r#"{"a":-"#, "{}" ; "lone minus")]
    #[test_case(r#"{"a":0,"b":-"#, r#"{"a":0}"# ; "lone minus after member")]
    #[test_case(r#"{"a":tru"#, "{}" ; "partial literal")]
    #[test_case(r#"{"a":true"#, r#"{"a":true}"# ; "complete literal")]
    #[test_case(r#"{"a":null,"b":fa"#, r#"{"a":null}"# ; "partial literal after member")]
    #[test_case(r#"[[["#, "[[[]]]" ; "nested arrays")]
    #[test_case(r#"{"a":{"b":{"c":"#, r#"{"a":{"b":{}}}"# ; "nested objects")]
    fn test_repair(input: &str, expected: &str) {
        let repaired = repair(input).unwrap();
        assert_eq!(repaired, expected);
        assert!(parses(&repaired));
    }

    #[test]
    fn test_repair_truncated_key_after_members() {
        let input = r#"{"points":[{"content":"Do X","category":"action","time"#;
        assert_eq!(
            repair(input).unwrap(),
            r#"{"points":[{"content":"Do X","category":"action"}]}"#
        );
    }

    #[test]
    fn test_repair_escaped_quote_does_not_end_string() {
        let input = r#"{"points":[{"content":"say \"hi"#;
        let repaired = repair(input).unwrap();
        assert_eq!(repaired, r#"{"points":[{"content":"say \"hi"}]}"#);
        let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["points"][0]["content"], "say \"hi");
    }

    #[test]
    fn test_repair_escaped_backslash_before_quote() {
        // `\\` is a complete escape, so the following quote closes the string
        let input = r#"{"a":"x\\","b":"#;
        assert_eq!(repair(input).unwrap(), r#"{"a":"x\\"}"#);
    }

    #[test_case(r#"{"a":"line\"# ; "dangling backslash")]
    #[test_case(r#"{"a":"line\u00"# ; "partial unicode escape")]
    fn test_repair_drops_dangling_escape(input: &str) {
        assert_eq!(repair(input).unwrap(), r#"{"a":"line"}"#);
    }

    const SURROGATE_DOC: &str = r#"{"points":[{"content":"ok","category":"action"},{"content":"Smile \ud83d\ude00 daily","category":"insight"}]}"#;

    #[test_case(r"\ud83d" ; "complete high surrogate")]
    #[test_case(r"\ud83d\" ; "backslash after high surrogate")]
    #[test_case(r"\ud83d\u" ; "low surrogate marker")]
    #[test_case(r"\ud83d\ud" ; "one low digit")]
    #[test_case(r"\ud83d\ude" ; "two low digits")]
    #[test_case(r"\ud83d\ude0" ; "three low digits")]
    fn test_repair_cuts_unpaired_high_surrogate(ending: &str) {
        let end = SURROGATE_DOC.find(ending).unwrap() + ending.len();
        let repaired = repair(&SURROGATE_DOC[..end]).unwrap();
        assert!(repaired.ends_with(r#""content":"Smile "}]}"#), "{repaired}");
        let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["points"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_repair_keeps_complete_surrogate_pair() {
        let end = SURROGATE_DOC.find(" daily").unwrap();
        let repaired = repair(&SURROGATE_DOC[..end]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["points"][1]["content"], "Smile \u{1F600}");
    }

    #[test]
    fn test_repair_bmp_escape_is_not_held_back() {
        let input = r#"{"a":"caf\u00e9"#;
        assert_eq!(repair(input).unwrap(), r#"{"a":"caf\u00e9"}"#);
    }

    #[test]
    fn test_repair_brackets_inside_strings_ignored() {
        let input = r#"{"points":[{"content":"use [x] and {y"#;
        let repaired = repair(input).unwrap();
        assert_eq!(repaired, r#"{"points":[{"content":"use [x] and {y"}]}"#);
    }

    #[test]
    fn test_repair_multibyte_content() {
        let input = r#"{"points":[{"content":"世界 ✨"#;
        let repaired = repair(input).unwrap();
        assert!(parses(&repaired));
        assert!(repaired.contains("世界 ✨"));
    }

    #[test]
    fn test_repair_drops_text_after_root() {
        let input = r#"{"points":[]} trailing words"#;
        assert_eq!(repair(input).unwrap(), r#"{"points":[]}"#);
    }

    #[test]
    fn test_repair_passes_through_non_json() {
        assert_eq!(repair("hello").unwrap(), "hello");
        assert!(!parses(&repair("hello").unwrap()));
    }

    #[test_case(r#"{"points":[{"content":"Write \"goals\" daily","category":"action","timestamp":12},{"content":"Compound interest","category":"remember"},{"content":"Consistency > intensity","category":"insight","timestamp":305.5}]}"# ; "plain")]
    #[test_case(SURROGATE_DOC ; "surrogate pair")]
    #[test_case(r#"{"a":["\ud83d\ude00\ud83c\udf89",-1.25e-3,"\u00e9\n"]}"# ; "mixed escapes and numbers")]
    fn test_repair_every_prefix_parses(doc: &str) {
        for (end, _) in doc.char_indices().skip(1) {
            let prefix = &doc[..end];
            let repaired = repair(prefix).unwrap();
            assert!(parses(&repaired), "prefix {prefix:?} repaired to {repaired:?}");
        }
    }
}
