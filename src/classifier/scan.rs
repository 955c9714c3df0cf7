//! Deterministic structural scan of an artifact snapshot.
//!
//! The classifier never reads the snapshot directly; every boundary test is
//! phrased over this scan. The pass is line- and token-level, tolerant of
//! mainstream languages, and a pure function of the input text — identical
//! snapshots always produce identical scans.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

static DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:pub(?:\([a-z]+\))?\s+)?(?:async\s+)?(?:unsafe\s+)?(?:fn|def|func|function|class|struct|enum|trait|interface|mod|module)\s+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .expect("declaration regex")
});

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("identifier regex"));

static STATIC_GLOBAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:pub\s+)?static(?:\s+mut)?\s+([A-Za-z_][A-Za-z0-9_]*)")
        .expect("static global regex")
});

static CONST_GLOBAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][A-Z0-9_]{2,})\s*[:=]").expect("const global regex"));

static EMPTY_CATCH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"catch\s*(?:\([^)]*\))?\s*\{\s*\}").expect("empty catch regex"));

static EXCEPT_PASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"except[^:\n]*:\s*pass\b").expect("except-pass regex"));

static RAISE_TYPED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:raise|throw)\s+(?:new\s+)?[A-Z][A-Za-z0-9_]*(?:Error|Exception)")
        .expect("typed raise regex")
});

static ERR_WITH_MESSAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"Err\([^)\n]*""#).expect("err-with-message regex"));

/// Keywords and primitive names excluded from identifier statistics; they
/// would otherwise drown the signal in every language.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "fn", "def", "func", "function", "class", "struct", "enum", "trait", "interface", "mod",
        "module", "impl", "let", "mut", "pub", "use", "using", "import", "from", "package", "for",
        "in", "of", "if", "elif", "else", "while", "loop", "match", "switch", "case", "break",
        "continue", "return", "yield", "const", "static", "var", "val", "public", "private",
        "protected", "internal", "void", "int", "i32", "i64", "u8", "u32", "u64", "f32", "f64",
        "usize", "isize", "bool", "str", "string", "String", "char", "float", "double", "long",
        "self", "Self", "this", "super", "new", "try", "catch", "except", "finally", "raise",
        "throw", "throws", "async", "await", "type", "typedef", "where", "dyn", "ref", "as", "is",
        "not", "and", "or", "None", "Some", "Ok", "True", "False", "true", "false", "null", "nil",
        "pass", "print", "println", "assert", "do", "end", "then", "extern", "crate", "default",
        "override", "virtual", "with", "lambda", "global", "unsafe", "move",
    ]
    .into_iter()
    .collect()
});

// =============================================================================
// Scan output
// =============================================================================

/// A named declaration found in the snapshot, with its flat line range.
#[derive(Debug, Clone)]
pub struct UnitDecl {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// Structural metrics extracted from one snapshot.
#[derive(Debug, Clone)]
pub struct ContentScan {
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,

    /// Identifier tokens after stopword removal.
    pub identifiers: usize,
    /// Identifiers of one or two characters.
    pub short_identifiers: usize,
    /// Identifiers that are long or multi-word (snake_case / camelCase).
    pub descriptive_identifiers: usize,

    pub max_nesting: usize,

    pub units: Vec<UnitDecl>,
    /// Deduplicated unit-reference edges: `(i, j)` means unit `i`'s body
    /// mentions unit `j` by name.
    pub edges: Vec<(usize, usize)>,
    /// Globals referenced from two or more distinct units.
    pub shared_globals: usize,

    /// Swallowed failures: empty catches, `except: pass`, discarded results.
    pub silent_failures: usize,
    /// World-stopping failures: unwraps, panics, exits.
    pub abrupt_failures: usize,
    /// Typed failure values and propagation markers.
    pub typed_failures: usize,
    /// Failure constructions that carry a message or operation name.
    pub contextual_failures: usize,
}

impl ContentScan {
    /// Run the structural pass over `content`.
    pub fn analyze(content: &str) -> ContentScan {
        let lines: Vec<&str> = content.lines().collect();

        let mut code_lines = 0usize;
        let mut comment_lines = 0usize;
        let mut max_nesting = 0usize;
        let mut brace_depth = 0i64;
        let mut decl_lines: Vec<(usize, String)> = Vec::new();
        let mut global_names: HashSet<String> = HashSet::new();

        for (line_no, raw) in lines.iter().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            if is_comment_line(trimmed) {
                comment_lines += 1;
                continue;
            }
            code_lines += 1;

            let indent_depth = indent_width(raw) / 4;
            for ch in raw.chars() {
                match ch {
                    '{' => {
                        brace_depth += 1;
                        max_nesting = max_nesting.max(brace_depth.max(0) as usize);
                    }
                    '}' => brace_depth = (brace_depth - 1).max(0),
                    _ => {}
                }
            }
            max_nesting = max_nesting.max(indent_depth);

            if let Some(caps) = DECL_RE.captures(raw) {
                decl_lines.push((line_no, caps[1].to_string()));
            }
            if let Some(caps) = STATIC_GLOBAL_RE.captures(raw) {
                global_names.insert(caps[1].to_string());
            }
            if let Some(caps) = CONST_GLOBAL_RE.captures(raw) {
                global_names.insert(caps[1].to_string());
            }
        }

        // Identifier statistics over the whole snapshot.
        let mut identifiers = 0usize;
        let mut short_identifiers = 0usize;
        let mut descriptive_identifiers = 0usize;
        for token in IDENT_RE.find_iter(content) {
            let word = token.as_str();
            if STOPWORDS.contains(word) {
                continue;
            }
            identifiers += 1;
            if word.len() <= 2 {
                short_identifiers += 1;
            }
            if is_descriptive(word) {
                descriptive_identifiers += 1;
            }
        }

        // Flat unit segmentation: each declaration owns the lines up to the
        // next declaration.
        let mut units: Vec<UnitDecl> = Vec::with_capacity(decl_lines.len());
        for (idx, (start, name)) in decl_lines.iter().enumerate() {
            let end = decl_lines
                .get(idx + 1)
                .map(|(next, _)| *next)
                .unwrap_or(lines.len());
            units.push(UnitDecl {
                name: name.clone(),
                start_line: *start,
                end_line: end,
            });
        }

        // Per-unit token sets drive both the reference graph and the
        // shared-global count.
        let unit_tokens: Vec<HashSet<&str>> = units
            .iter()
            .map(|unit| {
                lines[unit.start_line..unit.end_line]
                    .iter()
                    .flat_map(|line| IDENT_RE.find_iter(line).map(|m| m.as_str()))
                    .collect()
            })
            .collect();

        let name_to_unit: HashMap<&str, usize> = units
            .iter()
            .enumerate()
            .map(|(i, unit)| (unit.name.as_str(), i))
            .collect();

        let mut edge_set: HashSet<(usize, usize)> = HashSet::new();
        for (i, tokens) in unit_tokens.iter().enumerate() {
            for token in tokens {
                if let Some(&j) = name_to_unit.get(token) {
                    if j != i {
                        edge_set.insert((i, j));
                    }
                }
            }
        }
        let mut edges: Vec<(usize, usize)> = edge_set.into_iter().collect();
        edges.sort_unstable();

        let shared_globals = global_names
            .iter()
            .filter(|name| {
                unit_tokens
                    .iter()
                    .filter(|tokens| tokens.contains(name.as_str()))
                    .count()
                    >= 2
            })
            .count();

        let silent_failures = EMPTY_CATCH_RE.find_iter(content).count()
            + EXCEPT_PASS_RE.find_iter(content).count()
            + content.matches(".ok();").count()
            + content.matches("_ => {}").count();

        let abrupt_failures = content.matches(".unwrap()").count()
            + content.matches(".expect(").count()
            + content.matches("panic!(").count()
            + content.matches("exit(").count()
            + content.matches("abort(").count();

        let typed_failures = content.matches("Result<").count()
            + content.matches("Err(").count()
            + content.matches("?;").count()
            + content.matches("Either<").count()
            + RAISE_TYPED_RE.find_iter(content).count();

        let contextual_failures = content.matches(".context(").count()
            + content.matches(".with_context(").count()
            + content.matches("bail!(").count()
            + content.matches("anyhow!(").count()
            + content.matches("#[error(").count()
            + ERR_WITH_MESSAGE_RE.find_iter(content).count();

        ContentScan {
            total_lines: lines.len(),
            code_lines,
            comment_lines,
            identifiers,
            short_identifiers,
            descriptive_identifiers,
            max_nesting,
            units,
            edges,
            shared_globals,
            silent_failures,
            abrupt_failures,
            typed_failures,
            contextual_failures,
        }
    }

    /// No classifiable structure at all.
    pub fn is_empty(&self) -> bool {
        self.code_lines == 0 || self.identifiers == 0
    }

    pub fn comment_ratio(&self) -> f64 {
        ratio(self.comment_lines, self.code_lines + self.comment_lines)
    }

    pub fn short_ident_fraction(&self) -> f64 {
        ratio(self.short_identifiers, self.identifiers)
    }

    pub fn descriptive_fraction(&self) -> f64 {
        ratio(self.descriptive_identifiers, self.identifiers)
    }

    /// Total failure-handling markers of any kind.
    pub fn failure_signal(&self) -> usize {
        self.silent_failures + self.abrupt_failures + self.typed_failures + self.contextual_failures
    }

    /// Does the unit-reference graph contain a cycle?
    pub fn has_reference_cycle(&self) -> bool {
        let n = self.units.len();
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
        for &(i, j) in &self.edges {
            adjacency[i].push(j);
        }

        // 0 = unvisited, 1 = on stack, 2 = done.
        let mut color = vec![0u8; n];
        for start in 0..n {
            if color[start] != 0 {
                continue;
            }
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
            color[start] = 1;
            while let Some(frame) = stack.last_mut() {
                let (node, next) = *frame;
                if next < adjacency[node].len() {
                    frame.1 += 1;
                    let child = adjacency[node][next];
                    match color[child] {
                        0 => {
                            color[child] = 1;
                            stack.push((child, 0));
                        }
                        1 => return true,
                        _ => {}
                    }
                } else {
                    color[node] = 2;
                    stack.pop();
                }
            }
        }
        false
    }

    /// Do the reference edges form exactly one linear chain?
    ///
    /// True when every referencing unit points at exactly one other, nothing
    /// is referenced twice, and the edges connect into a single path.
    pub fn is_linear_chain(&self) -> bool {
        if self.edges.is_empty() || self.has_reference_cycle() {
            return false;
        }
        let mut out_degree: HashMap<usize, usize> = HashMap::new();
        let mut in_degree: HashMap<usize, usize> = HashMap::new();
        let mut touched: HashSet<usize> = HashSet::new();
        for &(i, j) in &self.edges {
            *out_degree.entry(i).or_default() += 1;
            *in_degree.entry(j).or_default() += 1;
            touched.insert(i);
            touched.insert(j);
        }
        if out_degree.values().any(|&d| d > 1) || in_degree.values().any(|&d| d > 1) {
            return false;
        }
        // Disjoint acyclic paths with k edges touch k + c nodes for c paths.
        touched.len() == self.edges.len() + 1
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn is_comment_line(trimmed: &str) -> bool {
    trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || trimmed.starts_with("--")
        || (trimmed.starts_with('#') && !trimmed.starts_with("#["))
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn is_descriptive(word: &str) -> bool {
    if word.len() >= 8 {
        return true;
    }
    if word.len() > 2 && word[1..word.len() - 1].contains('_') {
        return true;
    }
    // camelCase hump
    word.as_bytes()
        .windows(2)
        .any(|w| w[0].is_ascii_lowercase() && w[1].is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_content_scan_as_empty() {
        assert!(ContentScan::analyze("").is_empty());
        assert!(ContentScan::analyze("   \n\t\n").is_empty());
        assert!(ContentScan::analyze("// only a comment\n").is_empty());
    }

    #[test]
    fn declarations_become_units_with_flat_ranges() {
        let scan = ContentScan::analyze(
            "fn parse_input() {\n    read_file();\n}\n\nfn read_file() {\n    1\n}\n",
        );
        assert_eq!(scan.units.len(), 2);
        assert_eq!(scan.units[0].name, "parse_input");
        assert_eq!(scan.units[1].name, "read_file");
        assert_eq!(scan.edges, vec![(0, 1)]);
    }

    #[test]
    fn mutual_references_form_a_cycle() {
        let scan = ContentScan::analyze(
            "fn ping() {\n    pong();\n}\nfn pong() {\n    ping();\n}\n",
        );
        assert!(scan.has_reference_cycle());
        assert!(!scan.is_linear_chain());
    }

    #[test]
    fn a_three_unit_chain_is_linear() {
        let scan = ContentScan::analyze(
            "fn stage_one() {\n    stage_two();\n}\nfn stage_two() {\n    stage_three();\n}\nfn stage_three() {\n    1\n}\n",
        );
        assert!(!scan.has_reference_cycle());
        assert!(scan.is_linear_chain());
    }

    #[test]
    fn fan_out_is_not_linear() {
        let scan = ContentScan::analyze(
            "fn dispatch() {\n    handle_read();\n    handle_write();\n}\nfn handle_read() {\n    1\n}\nfn handle_write() {\n    2\n}\n",
        );
        assert!(!scan.has_reference_cycle());
        assert!(!scan.is_linear_chain());
    }

    #[test]
    fn shared_globals_require_two_referencing_units() {
        let scan = ContentScan::analyze(
            "static mut REGISTRY: usize = 0;\nfn writer_task() {\n    REGISTRY\n}\nfn reader_task() {\n    REGISTRY\n}\n",
        );
        assert_eq!(scan.shared_globals, 1);

        let lone = ContentScan::analyze(
            "static mut REGISTRY: usize = 0;\nfn writer_task() {\n    REGISTRY\n}\nfn reader_task() {\n    1\n}\n",
        );
        assert_eq!(lone.shared_globals, 0);
    }

    #[test]
    fn failure_markers_are_counted_by_kind() {
        let scan = ContentScan::analyze(
            "fn load() -> Result<u8, Error> {\n    let data = read().context(\"reading input\")?;\n    fallback().ok();\n    other.unwrap()\n}\n",
        );
        assert!(scan.typed_failures >= 1);
        assert!(scan.contextual_failures >= 1);
        assert_eq!(scan.silent_failures, 1);
        assert_eq!(scan.abrupt_failures, 1);
    }

    #[test]
    fn stopwords_do_not_count_as_identifiers() {
        let scan = ContentScan::analyze("fn f() { let x = 1; }\n");
        // Only `f` and `x` survive the stoplist.
        assert_eq!(scan.identifiers, 2);
        assert_eq!(scan.short_identifiers, 2);
    }

    #[test]
    fn descriptive_identifiers_cover_snake_and_camel_case() {
        assert!(is_descriptive("parse_input"));
        assert!(is_descriptive("readFile"));
        assert!(is_descriptive("consensus"));
        assert!(!is_descriptive("tmp"));
        assert!(!is_descriptive("x"));
    }
}
