//! Route policy: a single declarative table of `(methods, pattern) → access`.
//!
//! Rules are evaluated in table order and the first match wins. Anything that
//! matches no rule requires authentication.

use std::fmt;

use axum::http::Method;
use thiserror::Error;

use super::pattern::{AntPattern, PatternError};

/// How the gate treats a matched route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The gate does not look at the request at all; forwarded as anonymous.
    Ignore,
    /// A credential is optional. A valid one attaches the identity.
    Permit,
    /// A valid credential is required.
    Authenticate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodMatch {
    Any,
    Only(Vec<Method>),
}

impl MethodMatch {
    pub fn only(methods: impl IntoIterator<Item = Method>) -> Self {
        Self::Only(methods.into_iter().collect())
    }

    fn contains(&self, method: &Method) -> bool {
        match self {
            MethodMatch::Any => true,
            MethodMatch::Only(list) => list.contains(method),
        }
    }

    fn overlaps(&self, other: &MethodMatch) -> bool {
        match (self, other) {
            (MethodMatch::Any, _) | (_, MethodMatch::Any) => true,
            (MethodMatch::Only(a), MethodMatch::Only(b)) => a.iter().any(|m| b.contains(m)),
        }
    }
}

impl fmt::Display for MethodMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodMatch::Any => f.write_str("*"),
            MethodMatch::Only(list) => {
                let names: Vec<&str> = list.iter().map(Method::as_str).collect();
                f.write_str(&names.join(","))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pub methods: MethodMatch,
    pub pattern: AntPattern,
    pub access: Access,
    /// Reason this exemption is considered a security defect, if any.
    pub flag: Option<&'static str>,
}

impl RouteRule {
    fn applies_to(&self, method: &Method, path: &str) -> bool {
        self.methods.contains(method) && self.pattern.matches(path)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("duplicate route rule: {methods} {pattern}")]
    Duplicate { methods: String, pattern: String },
}

/// Compiled, read-only route policy.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    rules: Vec<RouteRule>,
}

impl RoutePolicy {
    pub fn builder() -> RoutePolicyBuilder {
        RoutePolicyBuilder::default()
    }

    /// Access level for `(method, path)`; `Authenticate` when nothing matches.
    pub fn resolve(&self, method: &Method, path: &str) -> Access {
        self.matching_rule(method, path)
            .map(|rule| rule.access)
            .unwrap_or(Access::Authenticate)
    }

    pub fn matching_rule(&self, method: &Method, path: &str) -> Option<&RouteRule> {
        self.candidates(method, path).next()
    }

    /// All rules that match `(method, path)`, in evaluation order.
    ///
    /// More than one entry means the table relies on ordering for this route.
    pub fn overlapping_rules(&self, method: &Method, path: &str) -> Vec<&RouteRule> {
        self.candidates(method, path).collect()
    }

    fn candidates<'a, 'q>(
        &'a self,
        method: &'q Method,
        path: &'q str,
    ) -> impl Iterator<Item = &'a RouteRule> {
        // `.`/`..` or empty inner segments are never exempted
        let rules: &[RouteRule] = if is_canonical(path) {
            &self.rules
        } else {
            &[]
        };
        rules.iter().filter(move |rule| rule.applies_to(method, path))
    }

    pub fn flagged(&self) -> impl Iterator<Item = &RouteRule> {
        self.rules.iter().filter(|rule| rule.flag.is_some())
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Drop every flagged rule so those routes fall back to `Authenticate`.
    pub fn without_flagged(mut self) -> Self {
        self.rules.retain(|rule| rule.flag.is_none());
        self
    }
}

fn is_canonical(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    let parts: Vec<&str> = rest.split('/').collect();
    let last = parts.len().saturating_sub(1);
    parts.iter().enumerate().all(|(i, seg)| {
        // an empty segment is only allowed as the final one ("/" or "/a/")
        (!seg.is_empty() || i == last) && *seg != "." && *seg != ".."
    })
}

#[derive(Debug, Default)]
pub struct RoutePolicyBuilder {
    pending: Vec<(MethodMatch, String, Access, Option<&'static str>)>,
}

impl RoutePolicyBuilder {
    pub fn rule(mut self, methods: MethodMatch, pattern: &str, access: Access) -> Self {
        self.pending.push((methods, pattern.to_string(), access, None));
        self
    }

    /// Same as [`rule`](Self::rule), but records why the entry is a security defect.
    pub fn flagged_rule(
        mut self,
        methods: MethodMatch,
        pattern: &str,
        access: Access,
        reason: &'static str,
    ) -> Self {
        self.pending
            .push((methods, pattern.to_string(), access, Some(reason)));
        self
    }

    pub fn build(self) -> Result<RoutePolicy, PolicyError> {
        let mut rules: Vec<RouteRule> = Vec::with_capacity(self.pending.len());

        for (methods, pattern, access, flag) in self.pending {
            let pattern = AntPattern::parse(&pattern)?;

            if let Some(prev) = rules
                .iter()
                .find(|r| r.pattern == pattern && r.methods.overlaps(&methods))
            {
                return Err(PolicyError::Duplicate {
                    methods: prev.methods.to_string(),
                    pattern: pattern.to_string(),
                });
            }

            rules.push(RouteRule {
                methods,
                pattern,
                access,
                flag,
            });
        }

        Ok(RoutePolicy { rules })
    }
}
