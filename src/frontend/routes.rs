// SPDX-FileCopyrightText: 2025 Fredrik Lanker <fredrik@lanker.se>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use percent_encoding::percent_decode_str;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Home,
    TestStart,
    Test,
    TestResult,
    SearchPlant,
    SearchResult,
    PlantsDetail,
    Subscription,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pattern {
    /// Exact match; `:name` segments capture one non-empty segment.
    Path(&'static str),
    /// Matches anything.
    CatchAll,
}

#[derive(Debug)]
pub struct Route {
    pub pattern: Pattern,
    pub view: ViewKind,
}

/// Client routes, first match wins. The catch-all must stay last.
pub const ROUTES: &[Route] = &[
    Route {
        pattern: Pattern::Path("/"),
        view: ViewKind::Home,
    },
    Route {
        pattern: Pattern::Path("/test-start"),
        view: ViewKind::TestStart,
    },
    Route {
        pattern: Pattern::Path("/test"),
        view: ViewKind::Test,
    },
    Route {
        pattern: Pattern::Path("/test/result/:id"),
        view: ViewKind::TestResult,
    },
    Route {
        pattern: Pattern::Path("/plants"),
        view: ViewKind::SearchPlant,
    },
    Route {
        pattern: Pattern::Path("/search"),
        view: ViewKind::SearchResult,
    },
    Route {
        pattern: Pattern::Path("/plants/detail/:id"),
        view: ViewKind::PlantsDetail,
    },
    Route {
        pattern: Pattern::Path("/subscription"),
        view: ViewKind::Subscription,
    },
    Route {
        pattern: Pattern::CatchAll,
        view: ViewKind::Error,
    },
];

/// Values captured by `:name` segments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    pub view: ViewKind,
    pub params: Params,
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() && !trimmed.ends_with('/') => trimmed,
        _ => path,
    };
    path.split('/').skip(1)
}

/// Matches `pathname` against a `/plants/detail/:id` style pattern.
/// Literal segments compare case-insensitively and one trailing slash is
/// ignored. Captured values are percent-decoded.
pub fn match_path(pattern: &str, pathname: &str) -> Option<Params> {
    let expected: Vec<&str> = segments(pattern).collect();
    let actual: Vec<&str> = segments(pathname).collect();
    if expected.len() != actual.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (expected, actual) in expected.iter().zip(actual.iter()) {
        match expected.strip_prefix(':') {
            Some(name) => {
                if actual.is_empty() {
                    return None;
                }
                let value = percent_decode_str(actual).decode_utf8_lossy();
                params.insert(name.to_owned(), value.into_owned());
            }
            None => {
                if !expected.eq_ignore_ascii_case(actual) {
                    return None;
                }
            }
        }
    }

    Some(Params(params))
}

/// Picks the view for a pathname (no query string or fragment).
pub fn resolve(pathname: &str) -> RouteMatch {
    ROUTES
        .iter()
        .find_map(|route| {
            let params = match route.pattern {
                Pattern::Path(pattern) => match_path(pattern, pathname)?,
                Pattern::CatchAll => Params::default(),
            };
            Some(RouteMatch {
                view: route.view,
                params,
            })
        })
        .unwrap_or(RouteMatch {
            view: ViewKind::Error,
            params: Params::default(),
        })
}
