//! IRI resolution under a stacked base
//!
//! The parser pushes a `(base, lang)` frame whenever `xml:base` or
//! `xml:lang` appears on an element and pops it at the closing tag. Each
//! base owns a resolution cache; the cache for the absent base is shared
//! across frames.
//!
//! Reference resolution follows RFC 3986 section 5: scheme/authority/path
//! merge plus dot-segment removal.

use rustc_hash::FxHashMap;
use std::sync::Arc;

/// A resolved reference plus whether it is still relative (no scheme).
#[derive(Clone, Debug)]
pub struct ResolvedIri {
    /// The resolution result.
    pub iri: Arc<str>,
    /// True when the result carries no scheme.
    pub is_relative: bool,
}

/// True if the string starts with an RFC 3986 scheme
/// (`ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`).
pub fn has_scheme(iri: &str) -> bool {
    match iri.find(':') {
        Some(pos) => {
            let scheme = &iri[..pos];
            !scheme.is_empty()
                && scheme.as_bytes()[0].is_ascii_alphabetic()
                && scheme
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
        }
        None => false,
    }
}

struct Components<'a> {
    scheme: Option<&'a str>,
    authority: Option<&'a str>,
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

fn split_iri(iri: &str) -> Components<'_> {
    let (rest, fragment) = match iri.split_once('#') {
        Some((r, f)) => (r, Some(f)),
        None => (iri, None),
    };
    let (rest, query) = match rest.split_once('?') {
        Some((r, q)) => (r, Some(q)),
        None => (rest, None),
    };
    let (scheme, rest) = if has_scheme(rest) {
        match rest.split_once(':') {
            Some((s, r)) => (Some(s), r),
            None => (None, rest),
        }
    } else {
        (None, rest)
    };
    let (authority, path) = match rest.strip_prefix("//") {
        Some(after) => match after.find('/') {
            Some(pos) => (Some(&after[..pos]), &after[pos..]),
            None => (Some(after), ""),
        },
        None => (None, rest),
    };
    Components {
        scheme,
        authority,
        path,
        query,
        fragment,
    }
}

/// RFC 3986 section 5.2.4.
fn remove_dot_segments(path: &str) -> String {
    let mut input = path.to_string();
    let mut output = String::with_capacity(path.len());
    while !input.is_empty() {
        if input.starts_with("../") {
            input.drain(..3);
        } else if input.starts_with("./") {
            input.drain(..2);
        } else if input.starts_with("/./") {
            input.replace_range(..3, "/");
        } else if input == "/." {
            input.replace_range(.., "/");
        } else if input.starts_with("/../") {
            input.replace_range(..4, "/");
            pop_segment(&mut output);
        } else if input == "/.." {
            input.replace_range(.., "/");
            pop_segment(&mut output);
        } else if input == "." || input == ".." {
            input.clear();
        } else {
            let start = usize::from(input.starts_with('/'));
            let end = match input[start..].find('/') {
                Some(pos) => start + pos,
                None => input.len(),
            };
            output.push_str(&input[..end]);
            input.drain(..end);
        }
    }
    output
}

fn pop_segment(output: &mut String) {
    if let Some(pos) = output.rfind('/') {
        output.truncate(pos);
    } else {
        output.clear();
    }
}

/// RFC 3986 section 5.2.3.
fn merge_paths(base: &Components<'_>, reference_path: &str) -> String {
    if base.authority.is_some() && base.path.is_empty() {
        return format!("/{reference_path}");
    }
    match base.path.rfind('/') {
        Some(pos) => format!("{}{}", &base.path[..=pos], reference_path),
        None => reference_path.to_string(),
    }
}

/// Resolve a reference against a base IRI, RFC 3986 section 5.2.2.
pub fn resolve(base: &str, reference: &str) -> String {
    let b = split_iri(base);
    let r = split_iri(reference);

    let (scheme, authority, path, query);
    if r.scheme.is_some() {
        scheme = r.scheme;
        authority = r.authority;
        path = remove_dot_segments(r.path);
        query = r.query;
    } else if r.authority.is_some() {
        scheme = b.scheme;
        authority = r.authority;
        path = remove_dot_segments(r.path);
        query = r.query;
    } else if r.path.is_empty() {
        scheme = b.scheme;
        authority = b.authority;
        path = b.path.to_string();
        query = r.query.or(b.query);
    } else {
        scheme = b.scheme;
        authority = b.authority;
        path = if r.path.starts_with('/') {
            remove_dot_segments(r.path)
        } else {
            remove_dot_segments(&merge_paths(&b, r.path))
        };
        query = r.query;
    }

    let mut result = String::new();
    if let Some(s) = scheme {
        result.push_str(s);
        result.push(':');
    }
    if let Some(a) = authority {
        result.push_str("//");
        result.push_str(a);
    }
    result.push_str(&path);
    if let Some(q) = query {
        result.push('?');
        result.push_str(q);
    }
    if let Some(f) = r.fragment {
        result.push('#');
        result.push_str(f);
    }
    result
}

struct Frame {
    base: Option<Arc<str>>,
    lang: Option<Arc<str>>,
}

/// Stacked `(base, lang)` state with per-base resolution caches.
pub struct IriResolver {
    base: Option<Arc<str>>,
    lang: Option<Arc<str>>,
    stack: Vec<Frame>,
    caches: FxHashMap<Arc<str>, FxHashMap<String, Arc<str>>>,
    null_base_cache: FxHashMap<String, Arc<str>>,
}

impl IriResolver {
    /// Create a resolver with an optional initial base.
    pub fn new(base: Option<&str>) -> Self {
        Self {
            base: base.map(Arc::from),
            lang: None,
            stack: Vec::new(),
            caches: FxHashMap::default(),
            null_base_cache: FxHashMap::default(),
        }
    }

    /// The current base, if any.
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Replace the current base without pushing a frame (used for the
    /// implicit CIMXML base on the root element).
    pub fn set_base(&mut self, base: &str) {
        self.base = Some(Arc::from(base));
    }

    /// The in-scope language, None when unset or empty.
    pub fn current_lang(&self) -> Option<&str> {
        match self.lang.as_deref() {
            Some("") | None => None,
            Some(lang) => Some(lang),
        }
    }

    /// Push a frame; `base`/`lang` of `None` keep the current value.
    pub fn push_frame(&mut self, base: Option<&str>, lang: Option<&str>) {
        self.stack.push(Frame {
            base: self.base.clone(),
            lang: self.lang.clone(),
        });
        if let Some(base) = base {
            if self.base.as_deref() != Some(base) {
                self.base = Some(Arc::from(base));
            }
        }
        if let Some(lang) = lang {
            self.lang = Some(Arc::from(lang));
        }
    }

    /// Pop the most recent frame.
    pub fn pop_frame(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.base = frame.base;
            self.lang = frame.lang;
        }
    }

    /// Resolve a reference against the current base, caching by base.
    ///
    /// With no base in scope, the reference is returned as-is (possibly
    /// still relative; the caller decides whether that is a warning or an
    /// error).
    pub fn resolve(&mut self, reference: &str) -> ResolvedIri {
        let cache = match &self.base {
            Some(base) => self.caches.entry(base.clone()).or_default(),
            None => &mut self.null_base_cache,
        };
        if let Some(hit) = cache.get(reference) {
            return ResolvedIri {
                iri: hit.clone(),
                is_relative: !has_scheme(hit),
            };
        }
        let resolved: Arc<str> = match &self.base {
            Some(base) => Arc::from(resolve(base, reference)),
            None => Arc::from(reference),
        };
        cache.insert(reference.to_string(), resolved.clone());
        ResolvedIri {
            is_relative: !has_scheme(&resolved),
            iri: resolved,
        }
    }
}
