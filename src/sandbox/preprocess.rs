//! Bundle preprocessing
//!
//! The spec bundle is built for browser module loading. Module syntax is
//! stripped so it evaluates as a plain script with the same top-level
//! bindings and initializers.

use regex::Regex;

lazy_static::lazy_static! {
    /// `export{a as b,c as d};` at the very end, optionally followed by line
    /// comments such as a source map annotation.
    static ref TRAILING_EXPORT: Regex =
        Regex::new(r"\bexport\s*\{([^{}]*)\}\s*;?((?:\s*//[^\n]*)*)\s*\z").unwrap();
    /// `export default`, keeping a following function or class keyword.
    static ref DEFAULT_EXPORT: Regex =
        Regex::new(r"\bexport\s+default\b\s*((?:async\s+)?function\b|class\b)?").unwrap();
    static ref LEXICAL_DECLARATION: Regex =
        Regex::new(r"(?:^|[\s;{}()])(const|let|class)\s+([A-Za-z_$][\w$]*)").unwrap();
    static ref LEADING_IDENTIFIER: Regex = Regex::new(r"^\s*([A-Za-z_$][\w$]*)").unwrap();
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_$][\w$]*$").unwrap();
}

/// Global the value of an `export default <expression>` is bound to.
pub const DEFAULT_EXPORT_BINDING: &str = "__default_export__";

/// Script ready for evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedScript {
    pub source: String,
    /// Candidate names of `const`/`let`/`class` bindings. These live in the
    /// global lexical scope and never show up as global object properties.
    pub lexical_names: Vec<String>,
}

pub fn prepare_script(source: &str) -> PreparedScript {
    let mut lexical_names = Vec::new();

    let without_exports = match TRAILING_EXPORT.captures(source) {
        Some(caps) => {
            let whole = caps.get(0).map(|m| m.start()).unwrap_or(source.len());
            let specifiers = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let tail = caps.get(2).map(|m| m.as_str()).unwrap_or("");

            // `local as exported`: only the local half is a binding.
            for specifier in specifiers.split(',') {
                if let Some(local) = specifier.split_whitespace().next() {
                    push_unique(&mut lexical_names, local);
                }
            }

            format!("{}{}", &source[..whole], tail)
        }
        None => source.to_string(),
    };

    // Declarations keep their own name. A bare expression such as
    // `export default{...}` would otherwise parse as a block, so it is bound
    // to a global instead.
    let source = DEFAULT_EXPORT
        .replace_all(&without_exports, |caps: &regex::Captures| match caps.get(1) {
            Some(keyword) => keyword.as_str().to_string(),
            None => format!("var {DEFAULT_EXPORT_BINDING}="),
        })
        .into_owned();

    for caps in LEXICAL_DECLARATION.captures_iter(&source) {
        let (Some(keyword), Some(name)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        push_unique(&mut lexical_names, name.as_str());
        if keyword.as_str() != "class" {
            for later in later_declarators(&source, name.end()) {
                push_unique(&mut lexical_names, later);
            }
        }
    }

    PreparedScript {
        source,
        lexical_names,
    }
}

/// Names bound after the first declarator of a `const`/`let` statement.
///
/// Walks from `from` to the end of the statement. Outside brackets and string
/// literals every comma separates two declarators.
fn later_declarators(source: &str, from: usize) -> Vec<&str> {
    let bytes = source.as_bytes();
    let mut names = Vec::new();
    let mut depth = 0usize;
    let mut i = from;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'' | b'`') => i = closing_quote(bytes, i + 1, quote),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' if depth == 0 => break,
            b')' | b']' | b'}' => depth -= 1,
            b';' if depth == 0 => break,
            b',' if depth == 0 => {
                if let Some(name) = LEADING_IDENTIFIER
                    .captures(&source[i + 1..])
                    .and_then(|c| c.get(1))
                {
                    names.push(name.as_str());
                }
            }
            _ => {}
        }
        i += 1;
    }

    names
}

fn closing_quote(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if IDENTIFIER.is_match(name) && !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_trailing_export_block() {
        let script = prepare_script("const a={x:1},b=2;export{a as s,b as t};\n");
        assert_eq!(script.source, "const a={x:1},b=2;");
        assert_eq!(script.lexical_names, vec!["a", "b"]);
    }

    #[test]
    fn test_keeps_source_map_comment() {
        let script = prepare_script("var a=1;export { a };\n//# sourceMappingURL=openapi-x.js.map\n");
        assert_eq!(script.source, "var a=1;\n//# sourceMappingURL=openapi-x.js.map");
    }

    #[test]
    fn test_only_trailing_export_block_removed() {
        let src = "var s='export{x}';var y=1;";
        assert_eq!(prepare_script(src).source, src);
    }

    #[test]
    fn test_default_export_expression_bound() {
        let script = prepare_script("var d;export default d={openapi:'3.0.0'};");
        assert_eq!(script.source, "var d;var __default_export__=d={openapi:'3.0.0'};");

        let script = prepare_script("var x;export default{openapi:'3.0.0'};");
        assert_eq!(script.source, "var x;var __default_export__={openapi:'3.0.0'};");

        let script = prepare_script("export default(1+2);");
        assert_eq!(script.source, "var __default_export__=(1+2);");
    }

    #[test]
    fn test_default_export_declaration_keeps_name() {
        let script = prepare_script("export default function f(){}export default class K{}");
        assert_eq!(script.source, "function f(){}class K{}");
        assert_eq!(script.lexical_names, vec!["K"]);
    }

    #[test]
    fn test_collects_every_declarator() {
        let script = prepare_script(
            "const a={s:'x,y',n:[1,2]},b={f:g(1,2)},c=`t,${d}`;let p=1,q;var v=1,w=2;",
        );
        assert_eq!(script.lexical_names, vec!["a", "b", "c", "p", "q"]);
    }

    #[test]
    fn test_declarator_scan_stops_at_block_end() {
        let script = prepare_script("{const inner=1}f(x,y);");
        assert_eq!(script.lexical_names, vec!["inner"]);
    }

    #[test]
    fn test_collects_lexical_declarations() {
        let script = prepare_script("let x=1;{const inner=2}class Spec{}");
        assert_eq!(script.lexical_names, vec!["x", "inner", "Spec"]);
    }
}
