// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expression evaluator for `${...}` placeholders.
//!
//! Values may embed `${key}` or `${key:default}` spans. Each span is resolved
//! against the system-property table, the process environment, the local
//! source map the evaluator is bound to, and a small set of built-in dynamic
//! fallbacks. Unresolvable spans without a default are left in the output
//! verbatim so a later pass can still resolve them and unresolved markers stay
//! visible.

use crate::domain::system_props;
use std::env;

/// Upper bound on full-value re-evaluation passes.
///
/// Values that reference other not-yet-resolved keys converge within a few
/// passes; a value that never stabilizes (self-reference) stops here with the
/// best-effort partially-resolved text.
pub const MAX_PASSES: usize = 10;

/// Resolves `${...}` placeholder spans in configuration values.
///
/// The evaluator is bound to a local source map lookup, normally the raw
/// in-progress map during initial load or the live entry store afterwards.
/// Local lookups return the *raw* stored text and are not re-evaluated within
/// a single pass, which keeps one `eval` call free of recursion.
///
/// Per-span lookup order: system property, environment variable (exact key),
/// local source map, built-in fallback, then the literal default if one was
/// given with `${key:default}`. The first colon splits key from default, so
/// defaults may themselves contain colons
/// (`${db.url:jdbc:postgresql://host:5432/db}`).
///
/// # Examples
///
/// ```
/// use layercfg::domain::expr::Evaluator;
///
/// let eval = Evaluator::new(|key| {
///     (key == "app.name").then(|| "shop".to_string())
/// });
/// assert_eq!(eval.eval_str("svc-${app.name}-${zone:eu}"), "svc-shop-eu");
/// ```
pub struct Evaluator<'a> {
    local: Box<dyn Fn(&str) -> Option<String> + 'a>,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator bound to a local source map lookup.
    pub fn new(local: impl Fn(&str) -> Option<String> + 'a) -> Self {
        Evaluator {
            local: Box::new(local),
        }
    }

    /// Creates an evaluator with no local source map.
    pub fn without_source() -> Self {
        Evaluator::new(|_| None)
    }

    /// Evaluates an optional raw value; `None` passes through as `None`.
    pub fn eval(&self, raw: Option<&str>) -> Option<String> {
        raw.map(|s| self.eval_str(s))
    }

    /// Performs one left-to-right substitution pass over `raw`.
    ///
    /// An unmatched `${` with no closing brace is treated as plain text. A
    /// span that resolves to nothing and carries no default is copied through
    /// unchanged.
    pub fn eval_str(&self, raw: &str) -> String {
        if !raw.contains("${") {
            return raw.to_string();
        }
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                None => {
                    // no closing brace: the remainder is plain text
                    out.push_str(&rest[start..]);
                    return out;
                }
                Some(end) => {
                    let expr = &after[..end];
                    self.substitute(expr, &mut out);
                    rest = &after[end + 1..];
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Re-evaluates `raw` until a pass produces no further change, no `${`
    /// remains, or [`MAX_PASSES`] is reached.
    pub fn eval_stable(&self, raw: &str) -> String {
        let mut current = raw.to_string();
        for _ in 0..MAX_PASSES {
            if !current.contains("${") {
                break;
            }
            let next = self.eval_str(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn substitute(&self, expr: &str, out: &mut String) {
        // first colon splits key from default; later colons belong to the default
        let (key, default) = match expr.find(':') {
            Some(i) => (&expr[..i], Some(&expr[i + 1..])),
            None => (expr, None),
        };
        match self.resolve(key) {
            Some(value) => out.push_str(&value),
            None => match default {
                // defaults are substituted verbatim, not recursively evaluated
                Some(d) => out.push_str(d),
                None => {
                    out.push_str("${");
                    out.push_str(expr);
                    out.push('}');
                }
            },
        }
    }

    fn resolve(&self, key: &str) -> Option<String> {
        if let Some(value) = system_props::get(key) {
            return Some(value);
        }
        if let Ok(value) = env::var(key) {
            return Some(value);
        }
        if let Some(value) = (self.local)(key) {
            return Some(value);
        }
        builtin_fallback(key)
    }
}

/// Built-in dynamic fallbacks for conventional keys.
fn builtin_fallback(key: &str) -> Option<String> {
    if key == "docker.host" {
        return Some(env::var("DOCKER_HOST").unwrap_or_else(|_| "host.docker.internal".to_string()));
    }
    None
}
