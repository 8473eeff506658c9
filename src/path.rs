//! URL path cleaning and joining.
//!
//! `clean` returns the shortest equivalent path: it ensures a leading `/`,
//! collapses doubled slashes and resolves `.` and `..` elements. A trailing
//! slash is preserved (a path ending in `/.` counts as a directory).

/// Clean a URL path.
pub(crate) fn clean(p: &str) -> String {
    if p.is_empty() {
        return "/".to_string();
    }

    let trailing = p.ends_with('/') || p.ends_with("/.") || p == ".";
    let mut stack: Vec<&str> = Vec::new();
    for segment in p.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }

    let mut out = String::with_capacity(p.len());
    for segment in &stack {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    if trailing && out != "/" {
        out.push('/');
    }
    out
}

/// Join a prefix and a path template, collapsing repeated slashes and
/// trimming the trailing slash unless the result is the root.
pub(crate) fn join_paths(prefix: &str, path: &str) -> String {
    let joined = clean(&format!("{prefix}/{path}"));
    if joined.len() > 1 && joined.ends_with('/') {
        joined[..joined.len() - 1].to_string()
    } else {
        joined
    }
}

/// Join dotted route names, collapsing repeated dots and stripping leading
/// and trailing ones.
pub(crate) fn join_names(parent: &str, child: &str) -> String {
    format!("{parent}.{child}")
        .split('.')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Collapse runs of slashes without touching `.`/`..` elements. Used on
/// generated URLs, where a parameter value must survive verbatim.
pub(crate) fn collapse_slashes(p: &str) -> String {
    let mut out = String::with_capacity(p.len());
    let mut last_slash = false;
    for c in p.chars() {
        if c == '/' {
            if !last_slash {
                out.push(c);
            }
            last_slash = true;
        } else {
            out.push(c);
            last_slash = false;
        }
    }
    out
}
