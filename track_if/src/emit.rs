//! # Track file writer
//!
//! A small YAML emitter for track documents. The layout is controlled by an
//! explicit [`EmitterConfig`] passed to every call, there is no global
//! formatter state.
//!
//! The default configuration gives the historical track file layout:
//!
//! ```yaml
//! initState:
//!   pos: [0.0, 0.0, 0.0]
//!   cthrustmass: 9.8066
//! ```
//!
//! with `type` and `name` values quoted and every sequence in flow style.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde_yaml::{Mapping, Number, Value};
use std::collections::BTreeSet;
use std::fmt::Write;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Layout options for the track writer.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterConfig {
    /// Indentation of nested mappings
    pub mapping_indent: usize,

    /// Indentation of block sequence contents. The dash sits two columns
    /// before the contents.
    pub sequence_indent: usize,

    /// Write sequences inline (`[a, b]`) rather than as blocks
    pub flow_style_sequences: bool,

    /// Keys whose values are always written as quoted scalars
    pub quoted_keys: BTreeSet<String>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            mapping_indent: 2,
            sequence_indent: 4,
            flow_style_sequences: true,
            quoted_keys: ["type", "name"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl EmitterConfig {
    fn sequence_offset(&self) -> usize {
        self.sequence_indent.saturating_sub(2)
    }

    fn is_quoted(&self, key: &Value) -> bool {
        match key.as_str() {
            Some(k) => self.quoted_keys.contains(k),
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Write a YAML document.
pub fn to_string(doc: &Value, cfg: &EmitterConfig) -> String {
    let mut out = String::new();

    match doc {
        Value::Mapping(m) if !m.is_empty() => write_mapping(&mut out, m, 0, cfg),
        Value::Sequence(s) if !s.is_empty() && !cfg.flow_style_sequences => {
            write_block_sequence(&mut out, s, 0, cfg)
        }
        _ => {
            out.push_str(&inline(doc, false, cfg).unwrap_or_else(|| flow(doc, false)));
            out.push('\n');
        }
    }

    out
}

/// Write a single float in a form every YAML reader resolves to a float.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return ".nan".into();
    }
    if v.is_infinite() {
        return if v > 0.0 { ".inf".into() } else { "-.inf".into() };
    }

    let s = format!("{:?}", v);

    // Exponent forms need a decimal point and a signed exponent
    match s.find('e') {
        Some(i) => {
            let (mantissa, exp) = (&s[..i], &s[i + 1..]);
            let mantissa = if mantissa.contains('.') {
                mantissa.to_string()
            } else {
                format!("{}.0", mantissa)
            };
            let exp = if exp.starts_with('-') {
                exp.to_string()
            } else {
                format!("+{}", exp)
            };
            format!("{}e{}", mantissa, exp)
        }
        None => s,
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn write_mapping(out: &mut String, m: &Mapping, indent: usize, cfg: &EmitterConfig) {
    let pad = " ".repeat(indent);

    for (k, v) in m {
        let key = key_text(k);
        let quote = cfg.is_quoted(k);

        if let Some(s) = inline(v, quote, cfg) {
            let _ = writeln!(out, "{}{}: {}", pad, key, s);
            continue;
        }

        let _ = writeln!(out, "{}{}:", pad, key);
        match v {
            Value::Mapping(child) => write_mapping(out, child, indent + cfg.mapping_indent, cfg),
            Value::Sequence(child) => {
                write_block_sequence(out, child, indent + cfg.sequence_offset(), cfg)
            }
            Value::Tagged(t) => {
                let _ = writeln!(out, "{}{}", " ".repeat(indent + cfg.mapping_indent), t.tag);
                match &t.value {
                    Value::Mapping(child) => {
                        write_mapping(out, child, indent + cfg.mapping_indent, cfg)
                    }
                    other => {
                        let _ = writeln!(
                            out,
                            "{}{}",
                            " ".repeat(indent + cfg.mapping_indent),
                            flow(other, quote)
                        );
                    }
                }
            }
            _ => {}
        }
    }
}

fn write_block_sequence(out: &mut String, s: &[Value], dash_col: usize, cfg: &EmitterConfig) {
    let pad = " ".repeat(dash_col);

    for item in s {
        // Strings in sequences are always quoted
        if let Some(text) = inline(item, true, cfg) {
            let _ = writeln!(out, "{}- {}", pad, text);
            continue;
        }

        match item {
            Value::Mapping(child) => {
                // The first key goes on the dash line
                let mut nested = String::new();
                write_mapping(&mut nested, child, dash_col + 2, cfg);
                out.push_str(&pad);
                out.push_str("- ");
                out.push_str(&nested[dash_col + 2..]);
            }
            Value::Sequence(child) => {
                let _ = writeln!(out, "{}-", pad);
                write_block_sequence(out, child, dash_col + 2, cfg);
            }
            other => {
                let _ = writeln!(out, "{}- {}", pad, flow(other, true));
            }
        }
    }
}

/// Inline form of a value, or `None` if it must be written as a block.
fn inline(v: &Value, quote: bool, cfg: &EmitterConfig) -> Option<String> {
    match v {
        Value::Sequence(s) if s.is_empty() => Some("[]".into()),
        Value::Mapping(m) if m.is_empty() => Some("{}".into()),
        Value::Sequence(_) if cfg.flow_style_sequences => Some(flow(v, quote)),
        Value::Sequence(_) | Value::Mapping(_) => None,
        Value::Tagged(t) => inline(&t.value, quote, cfg).map(|s| format!("{} {}", t.tag, s)),
        _ => Some(scalar(v, quote)),
    }
}

/// Flow form of any value.
fn flow(v: &Value, quote: bool) -> String {
    match v {
        Value::Sequence(s) => {
            let items: Vec<String> = s.iter().map(|i| flow(i, true)).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Mapping(m) => {
            let items: Vec<String> = m
                .iter()
                .map(|(k, v)| format!("{}: {}", key_text(k), flow(v, quote)))
                .collect();
            format!("{{{}}}", items.join(", "))
        }
        Value::Tagged(t) => format!("{} {}", t.tag, flow(&t.value, quote)),
        _ => scalar(v, quote),
    }
}

fn key_text(k: &Value) -> String {
    match k {
        Value::String(s) => string_scalar(s, false),
        other => flow(other, false),
    }
}

fn scalar(v: &Value, quote: bool) -> String {
    match v {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number(n),
        Value::String(s) => string_scalar(s, quote),
        other => flow(other, quote),
    }
}

fn number(n: &Number) -> String {
    if let Some(i) = n.as_i64().filter(|_| !n.is_f64()) {
        i.to_string()
    } else if let Some(u) = n.as_u64().filter(|_| !n.is_f64()) {
        u.to_string()
    } else {
        format_float(n.as_f64().unwrap_or(std::f64::NAN))
    }
}

fn string_scalar(s: &str, quote: bool) -> String {
    if s.chars().any(|c| c.is_control()) {
        return double_quoted(s);
    }

    if quote || !is_plain_safe(s) {
        format!("'{}'", s.replace('\'', "''"))
    } else {
        s.to_string()
    }
}

fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Whether a string can be written without quotes and still read back as
/// the same string.
fn is_plain_safe(s: &str) -> bool {
    let first = match s.chars().next() {
        Some(c) => c,
        None => return false,
    };

    if s.trim() != s {
        return false;
    }
    if "-?:,[]{}#&*!|>'\"%@`+.".contains(first) || first.is_ascii_digit() {
        return false;
    }
    if s.contains(": ") || s.contains(" #") || s.ends_with(':') {
        return false;
    }
    if s.chars().any(|c| ",[]{}".contains(c)) {
        return false;
    }

    // YAML 1.1 readers still take yes/no/on/off as booleans
    const RESERVED: [&str; 9] = ["~", "null", "true", "false", "yes", "no", "on", "off", "="];
    let lower = s.to_ascii_lowercase();
    if RESERVED.contains(&lower.as_str()) || s.parse::<f64>().is_ok() {
        return false;
    }

    true
}

#[cfg(test)]
mod test {
    use super::*;

    fn doc(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_default_layout() {
        let v = doc("a:\n  pos: [0.0, 1.5, -2.0]\n  n: 3\n  type: SingleBall\n  flag: true\n");

        assert_eq!(
            to_string(&v, &EmitterConfig::default()),
            "a:\n  pos: [0.0, 1.5, -2.0]\n  n: 3\n  type: 'SingleBall'\n  flag: true\n"
        );
    }

    #[test]
    fn test_boolean_like_strings_are_quoted() {
        let v = doc("y: 'n'\nlabel: 'on'\nmode: 'No'\n");

        assert_eq!(
            to_string(&v, &EmitterConfig::default()),
            "y: n\nlabel: 'on'\nmode: 'No'\n"
        );
    }

    #[test]
    fn test_string_lists_are_quoted() {
        let v = doc("orders: [Gate1, Gate2]\n");

        assert_eq!(
            to_string(&v, &EmitterConfig::default()),
            "orders: ['Gate1', 'Gate2']\n"
        );
    }

    #[test]
    fn test_block_sequences() {
        let cfg = EmitterConfig {
            flow_style_sequences: false,
            ..Default::default()
        };
        let v = doc("top:\n  list: [1, 2]\n  empty: []\n");

        assert_eq!(
            to_string(&v, &cfg),
            "top:\n  list:\n    - 1\n    - 2\n  empty: []\n"
        );
    }

    #[test]
    fn test_mapping_indent() {
        let cfg = EmitterConfig {
            mapping_indent: 4,
            quoted_keys: BTreeSet::new(),
            ..Default::default()
        };
        let v = doc("a:\n  b:\n    name: x\n");

        assert_eq!(to_string(&v, &cfg), "a:\n    b:\n        name: x\n");
    }

    #[test]
    fn test_scalar_quoting() {
        assert_eq!(string_scalar("Gate1", false), "Gate1");
        assert_eq!(string_scalar("true", false), "'true'");
        assert_eq!(string_scalar("1.5", false), "'1.5'");
        assert_eq!(string_scalar("a: b", false), "'a: b'");
        assert_eq!(string_scalar("it's", true), "'it''s'");
        assert_eq!(string_scalar("", false), "''");
        assert_eq!(string_scalar("a\nb", false), "\"a\\nb\"");
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(3.0), "3.0");
        assert_eq!(format_float(-0.25), "-0.25");
        assert_eq!(format_float(9.8066), "9.8066");
        assert_eq!(format_float(f64::INFINITY), ".inf");

        for v in [1e-7, 2.5e20, -1.0e-300].iter() {
            let back: f64 = serde_yaml::from_str(&format_float(*v)).unwrap();
            assert_eq!(back, *v);
        }
    }

    #[test]
    fn test_reparses_identically() {
        let v = doc(
            "initState:\n  pos: [0.0, 0.0, 0.0]\n  cthrustmass: 9.8066\n\
             g:\n  type: 'SingleBall'\n  name: 'odd: name'\n  stationary: false\n",
        );
        let text = to_string(&v, &EmitterConfig::default());

        assert_eq!(doc(&text), v);
    }
}
