//! URI template compilation.
//!
//! A template such as `/users/:id(\d+)?/posts/:slug?` (optionally preceded
//! by a domain template like `:sub.example.com`) is tokenized left-to-right
//! into an ordered list of [`Constraint`]s, which then emit a single
//! anchored matching regex. Parameters become named capture groups in
//! declaration order; domain parameters are flagged as host constraints and
//! compiled case-insensitively. `{name}` is accepted as a synonym for
//! `:name`.

use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;

use crate::error::RouterError;

/// Repetition suffix on a parameter: `?`, `+` or `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// `?`: at most one segment.
    Optional,
    /// `+`: one or more segments.
    OneOrMore,
    /// `*`: zero or more segments.
    ZeroOrMore,
}

/// One element of a compiled template: either a literal run or a parameter
/// with its surrounding text.
#[derive(Debug, Clone, Default)]
pub struct Constraint {
    /// Literal text, separators included. `None` for parameters.
    pub literal: Option<String>,
    /// Parameter name. `None` for literals.
    pub param: Option<String>,
    /// Text between the previous delimiter and the parameter, leading
    /// separator included.
    pub prefix: String,
    /// Text from after the parameter up to the next delimiter.
    pub suffix: String,
    pub quantifier: Option<Quantifier>,
    /// Set for `?` and `*` quantifiers.
    pub optional: bool,
    pub default: Option<Value>,
    /// Alias declared by a binding; bound values are stored under both
    /// names.
    pub alias: Option<String>,
    /// Effective rule fragment. `None` means the `[^/]+` default.
    pub rule: Option<String>,
    /// True when the constraint came from the domain template.
    pub host: bool,
}

impl Constraint {
    pub fn is_param(&self) -> bool {
        self.param.is_some()
    }

    /// A parameter is optional iff it is flagged optional, carries a
    /// default, or its quantifier is `?` or `*`.
    pub fn is_optional(&self) -> bool {
        self.optional
            || self.default.is_some()
            || matches!(
                self.quantifier,
                Some(Quantifier::Optional) | Some(Quantifier::ZeroOrMore)
            )
    }
}

/// Per-route inputs the compiler folds into the constraints.
pub struct CompileOptions<'a> {
    pub rules: &'a HashMap<String, String>,
    pub defaults: &'a HashMap<String, Value>,
    /// Parameter name → alias, derived from alias bindings.
    pub aliases: &'a HashMap<String, String>,
    pub strict: bool,
}

/// The compiled form of a path (and optional domain) template.
#[derive(Debug)]
pub struct CompiledPattern {
    pub constraints: Vec<Constraint>,
    /// Anchored whole-URI regex. When a domain template is present the host
    /// portion is prepended, case-insensitive, and the match target is
    /// `host + path`.
    pub regex: Regex,
    /// Anchored host-only regex, present when a domain template was given.
    pub host_regex: Option<Regex>,
}

impl CompiledPattern {
    pub fn has_host(&self) -> bool {
        self.host_regex.is_some()
    }

    pub fn params(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.is_param())
    }

    pub fn param(&self, name: &str) -> Option<&Constraint> {
        self.params().find(|c| c.param.as_deref() == Some(name))
    }
}

/// Compile a path template and optional domain template.
pub fn compile(
    path: &str,
    domain: Option<&str>,
    opts: &CompileOptions<'_>,
) -> Result<CompiledPattern, RouterError> {
    let mut constraints = Vec::new();
    if let Some(domain) = domain {
        tokenize(domain, true, opts, &mut constraints)?;
    }
    tokenize(path, false, opts, &mut constraints)?;

    let host_fragment: String = constraints
        .iter()
        .filter(|c| c.host)
        .map(|c| fragment(c, '.'))
        .collect();
    let path_fragment: String = constraints
        .iter()
        .filter(|c| !c.host)
        .map(|c| fragment(c, '/'))
        .collect();

    let mut pattern = String::from("^");
    if !host_fragment.is_empty() {
        pattern.push_str(&format!("(?i:{host_fragment})"));
    }
    pattern.push_str(&path_fragment);
    if !opts.strict {
        pattern.push_str("/?");
    }
    pattern.push('$');

    let regex = Regex::new(&pattern)?;
    let host_regex = if host_fragment.is_empty() {
        None
    } else {
        Some(Regex::new(&format!("^(?i:{host_fragment})$"))?)
    };

    Ok(CompiledPattern {
        constraints,
        regex,
        host_regex,
    })
}

/// Tokenize one template portion. Paths split on `/`, domains on `.`.
fn tokenize(
    template: &str,
    host: bool,
    opts: &CompileOptions<'_>,
    out: &mut Vec<Constraint>,
) -> Result<(), RouterError> {
    let sep = if host { '.' } else { '/' };
    let segments: Vec<&str> = template.split(sep).filter(|s| !s.is_empty()).collect();

    if !host && segments.is_empty() {
        out.push(Constraint {
            literal: Some("/".to_string()),
            host,
            ..Constraint::default()
        });
        return Ok(());
    }

    let mut literal = String::new();
    let mut first = true;
    for segment in segments {
        let lead = if host && first { String::new() } else { sep.to_string() };
        first = false;

        if !segment.contains(':') && !segment.contains('{') {
            literal.push_str(&lead);
            literal.push_str(segment);
            continue;
        }

        if !literal.is_empty() {
            out.push(Constraint {
                literal: Some(std::mem::take(&mut literal)),
                host,
                ..Constraint::default()
            });
        }
        parse_segment(segment, &lead, host, opts, out)
            .map_err(|_| RouterError::InvalidPattern(template.to_string()))?;
    }
    if !literal.is_empty() {
        out.push(Constraint {
            literal: Some(literal),
            host,
            ..Constraint::default()
        });
    }
    // In strict mode a trailing slash in the template is significant.
    if !host && opts.strict && template.len() > 1 && template.ends_with('/') {
        out.push(Constraint {
            literal: Some("/".to_string()),
            host,
            ..Constraint::default()
        });
    }
    Ok(())
}

/// Parse one segment containing at least one parameter. Text before the
/// first parameter becomes its prefix (leading separator included), text
/// between parameters becomes the next parameter's prefix, and text after
/// the last parameter becomes its suffix.
fn parse_segment(
    segment: &str,
    lead: &str,
    host: bool,
    opts: &CompileOptions<'_>,
    out: &mut Vec<Constraint>,
) -> Result<(), ()> {
    let chars: Vec<char> = segment.chars().collect();
    let mut pending = String::new();
    let mut i = 0;
    let mut first_param = true;
    let mut last_param: Option<usize> = None;

    while i < chars.len() {
        let c = chars[i];
        if c != ':' && c != '{' {
            pending.push(c);
            i += 1;
            continue;
        }

        let brace = c == '{';
        i += 1;
        let mut name = String::new();
        while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
            name.push(chars[i]);
            i += 1;
        }
        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(());
        }
        if brace {
            if i < chars.len() && chars[i] == '}' {
                i += 1;
            } else {
                return Err(());
            }
        }

        let mut rule = None;
        if i < chars.len() && chars[i] == '(' {
            let (inner, next) = balanced_parens(&chars, i)?;
            rule = Some(inner);
            i = next;
        }

        let mut quantifier = None;
        if i < chars.len() {
            quantifier = match chars[i] {
                '?' => Some(Quantifier::Optional),
                '+' => Some(Quantifier::OneOrMore),
                '*' => Some(Quantifier::ZeroOrMore),
                _ => None,
            };
            if quantifier.is_some() {
                i += 1;
            }
        }

        let prefix = if first_param {
            format!("{lead}{pending}")
        } else {
            std::mem::take(&mut pending)
        };
        pending.clear();
        first_param = false;

        out.push(Constraint {
            literal: None,
            prefix,
            suffix: String::new(),
            quantifier,
            optional: matches!(
                quantifier,
                Some(Quantifier::Optional) | Some(Quantifier::ZeroOrMore)
            ),
            default: opts.defaults.get(&name).cloned(),
            alias: opts.aliases.get(&name).cloned(),
            rule: rule.or_else(|| opts.rules.get(&name).cloned()),
            param: Some(name),
            host,
        });
        last_param = Some(out.len() - 1);
    }

    if !pending.is_empty() {
        if let Some(idx) = last_param {
            out[idx].suffix = pending;
        }
    }
    Ok(())
}

/// Extract the contents of a balanced parenthesized rule starting at the
/// opening paren. Returns the inner text and the index just past `)`.
fn balanced_parens(chars: &[char], open: usize) -> Result<(String, usize), ()> {
    let mut depth = 0usize;
    let mut inner = String::new();
    let mut i = open;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() {
            if depth > 0 {
                inner.push(c);
                inner.push(chars[i + 1]);
            }
            i += 2;
            continue;
        }
        match c {
            '(' => {
                if depth > 0 {
                    inner.push(c);
                }
                depth += 1;
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((inner, i + 1));
                }
                inner.push(c);
            }
            _ => inner.push(c),
        }
        i += 1;
    }
    Err(())
}

/// Emit the regex fragment for one constraint. Parameters become named
/// capture groups; the rule itself is wrapped non-capturing so user rules
/// with groups cannot shift extraction.
fn fragment(c: &Constraint, sep: char) -> String {
    if let Some(literal) = &c.literal {
        return regex::escape(literal);
    }

    let name = c.param.as_deref().unwrap_or_default();
    let rule = c.rule.as_deref().unwrap_or("[^/]+");
    let prefix = regex::escape(&c.prefix);
    let suffix = regex::escape(&c.suffix);
    let sep_escaped = regex::escape(&sep.to_string());

    let core = match c.quantifier {
        Some(Quantifier::OneOrMore) | Some(Quantifier::ZeroOrMore) => format!(
            "{prefix}(?P<{name}>(?:{rule})(?:{sep_escaped}(?:{rule}))*){suffix}"
        ),
        _ => format!("{prefix}(?P<{name}>(?:{rule})){suffix}"),
    };

    if c.is_optional() {
        format!("(?:{core})?")
    } else {
        core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opts<'a>(
        rules: &'a HashMap<String, String>,
        defaults: &'a HashMap<String, Value>,
        aliases: &'a HashMap<String, String>,
    ) -> CompileOptions<'a> {
        CompileOptions {
            rules,
            defaults,
            aliases,
            strict: false,
        }
    }

    fn plain(path: &str) -> CompiledPattern {
        let rules = HashMap::new();
        let defaults = HashMap::new();
        let aliases = HashMap::new();
        compile(path, None, &opts(&rules, &defaults, &aliases)).unwrap()
    }

    #[test]
    fn literal_runs_collapse_into_one_constraint() {
        let compiled = plain("/users/all");
        assert_eq!(compiled.constraints.len(), 1);
        assert_eq!(compiled.constraints[0].literal.as_deref(), Some("/users/all"));
        assert!(compiled.regex.is_match("/users/all"));
        assert!(compiled.regex.is_match("/users/all/"));
        assert!(!compiled.regex.is_match("/users/all/x"));
    }

    #[test]
    fn params_capture_in_declaration_order() {
        let compiled = plain("/blog/:category/:post");
        let names: Vec<_> = compiled.params().map(|c| c.param.clone().unwrap()).collect();
        assert_eq!(names, ["category", "post"]);

        let caps = compiled.regex.captures("/blog/rust/routers").unwrap();
        assert_eq!(&caps["category"], "rust");
        assert_eq!(&caps["post"], "routers");
    }

    #[test]
    fn inline_rule_and_optional_quantifier() {
        let compiled = plain(r"/users/:id(\d+)?/posts");
        assert!(compiled.regex.is_match("/users/7/posts"));
        assert!(compiled.regex.is_match("/users/posts"));
        assert!(!compiled.regex.is_match("/users/abc/posts"));

        let id = compiled.param("id").unwrap();
        assert_eq!(id.rule.as_deref(), Some(r"\d+"));
        assert!(id.is_optional());
    }

    #[test]
    fn rules_from_options_apply_when_not_inline() {
        let mut rules = HashMap::new();
        rules.insert("id".to_string(), r"\d+".to_string());
        let defaults = HashMap::new();
        let aliases = HashMap::new();
        let compiled = compile("/users/:id", None, &opts(&rules, &defaults, &aliases)).unwrap();
        assert!(compiled.regex.is_match("/users/42"));
        assert!(!compiled.regex.is_match("/users/abc"));
    }

    #[test]
    fn prefix_and_suffix_in_mixed_segment() {
        let compiled = plain("/user-:id.html");
        let id = compiled.param("id").unwrap();
        assert_eq!(id.prefix, "/user-");
        assert_eq!(id.suffix, ".html");
        let caps = compiled.regex.captures("/user-7.html").unwrap();
        assert_eq!(&caps["id"], "7");
    }

    #[test]
    fn default_makes_the_group_optional() {
        let rules = HashMap::new();
        let mut defaults = HashMap::new();
        defaults.insert("page".to_string(), json!(1));
        let aliases = HashMap::new();
        let compiled = compile("/list/:page", None, &opts(&rules, &defaults, &aliases)).unwrap();
        assert!(compiled.regex.is_match("/list"));
        assert!(compiled.regex.is_match("/list/3"));
        let page = compiled.param("page").unwrap();
        assert!(page.is_optional());
        assert!(!page.optional);
    }

    #[test]
    fn catch_all_spans_segments() {
        let compiled = plain("/:__fallback__(.*)*");
        assert!(compiled.regex.is_match("/"));
        assert!(compiled.regex.is_match("/a/b/c"));
        let caps = compiled.regex.captures("/a/b/c").unwrap();
        assert_eq!(&caps["__fallback__"], "a/b/c");
    }

    #[test]
    fn one_or_more_requires_a_segment() {
        let compiled = plain("/files/:path+");
        assert!(!compiled.regex.is_match("/files"));
        assert!(compiled.regex.is_match("/files/a"));
        assert!(compiled.regex.is_match("/files/a/b"));
        let caps = compiled.regex.captures("/files/a/b").unwrap();
        assert_eq!(&caps["path"], "a/b");
    }

    #[test]
    fn strict_mode_keeps_trailing_slash_significant() {
        let rules = HashMap::new();
        let defaults = HashMap::new();
        let aliases = HashMap::new();
        let compiled = compile(
            "/exact",
            None,
            &CompileOptions {
                rules: &rules,
                defaults: &defaults,
                aliases: &aliases,
                strict: true,
            },
        )
        .unwrap();
        assert!(compiled.regex.is_match("/exact"));
        assert!(!compiled.regex.is_match("/exact/"));
    }

    #[test]
    fn domain_params_are_host_constraints() {
        let rules = HashMap::new();
        let defaults = HashMap::new();
        let aliases = HashMap::new();
        let compiled = compile(
            "/dash",
            Some(":sub.example.com"),
            &opts(&rules, &defaults, &aliases),
        )
        .unwrap();
        assert!(compiled.has_host());
        let sub = compiled.param("sub").unwrap();
        assert!(sub.host);

        // host participates in the whole-URI match, case-insensitively
        assert!(compiled.regex.is_match("Admin.Example.COM/dash"));
        let caps = compiled.regex.captures("admin.example.com/dash").unwrap();
        assert_eq!(&caps["sub"], "admin");
        assert!(compiled.host_regex.unwrap().is_match("admin.example.com"));
    }

    #[test]
    fn brace_syntax_is_a_synonym() {
        let compiled = plain("/users/{id}");
        assert!(compiled.param("id").is_some());
        assert!(compiled.regex.is_match("/users/9"));
    }

    #[test]
    fn invalid_templates_are_rejected() {
        let rules = HashMap::new();
        let defaults = HashMap::new();
        let aliases = HashMap::new();
        let o = opts(&rules, &defaults, &aliases);
        assert!(matches!(
            compile("/users/{id", None, &o),
            Err(RouterError::InvalidPattern(_))
        ));
        assert!(matches!(
            compile("/users/:", None, &o),
            Err(RouterError::InvalidPattern(_))
        ));
        assert!(matches!(
            compile(r"/users/:id(\d+", None, &o),
            Err(RouterError::InvalidPattern(_))
        ));
    }

    #[test]
    fn root_template_matches_root_only() {
        let compiled = plain("/");
        assert!(compiled.regex.is_match("/"));
        assert!(!compiled.regex.is_match("/x"));
    }
}
