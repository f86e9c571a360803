//! Method + path-pattern routing table.
//!
//! Patterns support static segments (`/api/league`) and named parameters
//! (`/api/player/{gameName}/{tagLine}`). Parameter values are percent-decoded
//! before they are handed to the action.

use http::Method;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;

#[derive(Debug)]
enum PathSegment {
    Static(String),
    Param(String),
}

#[derive(Debug)]
struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Parses a path pattern string into a Path struct.
    /// Leading and trailing slashes are ignored.
    fn parse(path_str: &str) -> Self {
        let normalized_path = path_str.trim().trim_matches('/');

        let segments = if normalized_path.is_empty() {
            vec![]
        } else {
            normalized_path
                .split('/')
                .map(|s| {
                    if let Some(stripped) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                        PathSegment::Param(stripped.to_string())
                    } else {
                        PathSegment::Static(s.to_string())
                    }
                })
                .collect()
        };

        Path { segments }
    }

    /// Matches a request path against this pattern.
    /// Returns the decoded parameters on success.
    fn matches(&self, request_path: &str) -> Option<HashMap<String, String>> {
        let normalized_path = request_path.trim().trim_matches('/');
        let request_segments: Vec<&str> = if normalized_path.is_empty() {
            vec![]
        } else {
            normalized_path.split('/').collect()
        };

        if request_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (seg, req_segment) in self.segments.iter().zip(request_segments) {
            match seg {
                PathSegment::Static(s) if s == req_segment => {}
                PathSegment::Static(_) => return None,
                PathSegment::Param(name) => {
                    let decoded = percent_decode_str(req_segment).decode_utf8_lossy();
                    params.insert(name.clone(), decoded.into_owned());
                }
            }
        }

        Some(params)
    }
}

#[derive(Debug, PartialEq)]
pub struct RouteMatch<'a, A> {
    pub params: HashMap<String, String>,
    pub action: &'a A,
}

#[derive(Debug, PartialEq)]
pub enum Resolution<'a, A> {
    Matched(RouteMatch<'a, A>),
    /// The path exists but not for this method.
    MethodNotAllowed,
    NotFound,
}

#[derive(Debug)]
pub struct Route<A> {
    method: Method,
    path: Path,
    action: A,
}

impl<A> Route<A> {
    pub fn new(method: Method, path: &str, action: A) -> Self {
        Self {
            method,
            path: Path::parse(path),
            action,
        }
    }
}

#[derive(Debug)]
pub struct RouteTable<A> {
    routes: Vec<Route<A>>,
}

impl<A> RouteTable<A> {
    pub fn new(routes: Vec<Route<A>>) -> Self {
        Self { routes }
    }

    /// Returns the first route matching both method and path.
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_, A> {
        let mut path_matched = false;

        for route in &self.routes {
            let Some(params) = route.path.matches(path) else {
                continue;
            };
            if route.method == *method {
                return Resolution::Matched(RouteMatch {
                    params,
                    action: &route.action,
                });
            }
            path_matched = true;
        }

        if path_matched {
            Resolution::MethodNotAllowed
        } else {
            Resolution::NotFound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable<&'static str> {
        RouteTable::new(vec![
            Route::new(Method::GET, "/api/player/{gameName}/{tagLine}", "profile"),
            Route::new(
                Method::GET,
                "/api/player/{gameName}/{tagLine}/matches",
                "matches",
            ),
            Route::new(Method::GET, "/api/league", "league"),
            Route::new(Method::POST, "/api/ai/chat", "chat"),
        ])
    }

    #[test]
    fn test_static_path() {
        let table = table();
        let Resolution::Matched(m) = table.resolve(&Method::GET, "/api/league/") else {
            panic!("expected a match");
        };
        assert_eq!(m.action, &"league");
        assert!(m.params.is_empty());
        assert_eq!(
            table.resolve(&Method::GET, "/api/league/extra"),
            Resolution::NotFound
        );
    }

    #[test]
    fn test_dynamic_path_is_decoded() {
        let table = table();
        let Resolution::Matched(m) = table.resolve(&Method::GET, "/api/player/Hide%20on%20bush/KR1")
        else {
            panic!("expected a match");
        };
        assert_eq!(m.action, &"profile");
        assert_eq!(m.params["gameName"], "Hide on bush");
        assert_eq!(m.params["tagLine"], "KR1");
    }

    #[test]
    fn test_longer_pattern_does_not_shadow() {
        let table = table();
        let Resolution::Matched(m) = table.resolve(&Method::GET, "/api/player/a/b/matches") else {
            panic!("expected a match");
        };
        assert_eq!(m.action, &"matches");
    }

    #[test]
    fn test_method_not_allowed() {
        let table = table();
        assert_eq!(
            table.resolve(&Method::GET, "/api/ai/chat"),
            Resolution::MethodNotAllowed
        );
        assert_eq!(table.resolve(&Method::GET, "/"), Resolution::NotFound);
    }

    #[test]
    fn test_path_parsing() {
        assert_eq!(Path::parse("").segments.len(), 0);
        assert_eq!(Path::parse("/api/league").segments.len(), 2);
        let path = Path::parse("/api/player/{gameName}");
        assert!(matches!(&path.segments[2], PathSegment::Param(name) if name == "gameName"));
    }
}
