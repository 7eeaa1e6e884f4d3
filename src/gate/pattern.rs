//! Ant-style path patterns.
//!
//! Supported syntax:
//! - literal segments: `/clinic/getClinic`
//! - `*` inside a segment: `/clinic/getDetails/*`, `/*.html` (never crosses `/`)
//! - `?` inside a segment: exactly one character
//! - `**` as a whole segment: zero or more segments, anywhere in the pattern
//!
//! Trailing slashes are significant: `/login` does not match `/login/`.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern must start with '/': {0}")]
    NotAbsolute(String),
    #[error("'**' must be a whole segment: {0}")]
    MisplacedDoubleStar(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Glob(String),
    AnyDepth,
}

/// A compiled path pattern.
#[derive(Clone, PartialEq, Eq)]
pub struct AntPattern {
    source: String,
    segments: Vec<Segment>,
}

impl AntPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let rest = pattern
            .strip_prefix('/')
            .ok_or_else(|| PatternError::NotAbsolute(pattern.to_string()))?;

        let segments = rest
            .split('/')
            .map(|seg| {
                if seg == "**" {
                    Ok(Segment::AnyDepth)
                } else if seg.contains("**") {
                    Err(PatternError::MisplacedDoubleStar(pattern.to_string()))
                } else if seg.contains(['*', '?']) {
                    Ok(Segment::Glob(seg.to_string()))
                } else {
                    Ok(Segment::Literal(seg.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, path: &str) -> bool {
        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };
        let parts: Vec<&str> = rest.split('/').collect();
        match_segments(&self.segments, &parts)
    }
}

impl fmt::Debug for AntPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AntPattern({})", self.source)
    }
}

impl fmt::Display for AntPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            // zero segments, then progressively more
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((seg, rest)) => match path.split_first() {
            Some((head, tail)) => match_one(seg, head) && match_segments(rest, tail),
            None => false,
        },
    }
}

fn match_one(segment: &Segment, part: &str) -> bool {
    match segment {
        Segment::Literal(lit) => lit == part,
        // a bare `*` stands for one real segment, not an empty one
        Segment::Glob(glob) if glob == "*" => !part.is_empty(),
        Segment::Glob(glob) => glob_match(glob.as_bytes(), part.as_bytes()),
        Segment::AnyDepth => true,
    }
}

/// Single-segment glob with `*` and `?`.
fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some(b'*') => {
                star = Some((p, t));
                p += 1;
            }
            Some(&c) if c == b'?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                Some((sp, st)) => {
                    p = sp + 1;
                    t = st + 1;
                    star = Some((sp, st + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pat(s: &str) -> AntPattern {
        AntPattern::parse(s).unwrap()
    }

    #[test]
    fn literal_paths_match_exactly() {
        let p = pat("/clinic/getClinic");
        assert!(p.matches("/clinic/getClinic"));
        assert!(!p.matches("/clinic/getClinic/"));
        assert!(!p.matches("/clinic/getClinics"));
        assert!(!p.matches("/clinic"));
    }

    #[test]
    fn root_only_matches_root() {
        let p = pat("/");
        assert!(p.matches("/"));
        assert!(!p.matches("/index.html"));
    }

    #[test]
    fn single_star_spans_exactly_one_segment() {
        let p = pat("/clinic/getDetails/*");
        assert!(p.matches("/clinic/getDetails/42"));
        assert!(!p.matches("/clinic/getDetails/"));
        assert!(!p.matches("/clinic/getDetails"));
        assert!(!p.matches("/clinic/getDetails/42/rooms"));
    }

    #[test]
    fn multiple_single_stars() {
        let p = pat("/getAllAvailable/*/*/*");
        assert!(p.matches("/getAllAvailable/1/2/3"));
        assert!(!p.matches("/getAllAvailable/1/2"));
    }

    #[test]
    fn star_inside_segment() {
        let p = pat("/*.html");
        assert!(p.matches("/index.html"));
        assert!(p.matches("/.html"));
        assert!(!p.matches("/pages/index.html"));
        assert!(!p.matches("/index.htm"));
    }

    #[test]
    fn question_mark_is_one_char() {
        let p = pat("/v?/ping");
        assert!(p.matches("/v1/ping"));
        assert!(!p.matches("/v10/ping"));
    }

    #[test]
    fn trailing_double_star_matches_any_depth() {
        let p = pat("/webjars/**");
        assert!(p.matches("/webjars"));
        assert!(p.matches("/webjars/"));
        assert!(p.matches("/webjars/jquery/3.1/jquery.min.js"));
        assert!(!p.matches("/webjarsx/a"));
    }

    #[test]
    fn leading_double_star_with_suffix_glob() {
        let p = pat("/**/*.css");
        assert!(p.matches("/site.css"));
        assert!(p.matches("/static/css/site.css"));
        assert!(!p.matches("/static/css/site.css.map"));
        assert!(!p.matches("/"));
    }

    #[test]
    fn double_star_in_the_middle() {
        let p = pat("/clinic/**/rooms");
        assert!(p.matches("/clinic/rooms"));
        assert!(p.matches("/clinic/1/2/rooms"));
        assert!(!p.matches("/clinic/1/2/room"));
    }

    #[test]
    fn glob_backtracks() {
        assert!(glob_match(b"a*b*c", b"aXbYbZc"));
        assert!(glob_match(b"*", b""));
        assert!(!glob_match(b"a*b", b"aXc"));
    }

    #[test]
    fn rejects_malformed_patterns() {
        assert_eq!(
            AntPattern::parse("login"),
            Err(PatternError::NotAbsolute("login".into()))
        );
        assert!(matches!(
            AntPattern::parse("/a/**b"),
            Err(PatternError::MisplacedDoubleStar(_))
        ));
    }

    #[test]
    fn relative_request_paths_never_match() {
        assert!(!pat("/**").matches("login"));
    }
}
