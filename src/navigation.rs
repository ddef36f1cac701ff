use crate::{
    error::NavigationError,
    guard::{NavigationDecision, RouteGuard},
    routes::{RouteMatch, RouteTable},
};

/// Longest redirect chain a single navigation may follow.
pub const MAX_REDIRECTS: usize = 8;

/// Resolved
///
/// Where a navigation finally landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub path: String,
    /// `None` for paths no route declares.
    pub route: Option<RouteMatch>,
    /// Every path the guard redirected to, in order. Empty when allowed directly.
    pub redirects: Vec<String>,
}

impl Resolved {
    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

/// Navigator
///
/// Looks up the target route's meta, asks the guard, and re-guards every
/// redirect target until a page is allowed. One navigation resolves fully
/// before returning; nothing is committed on the way.
#[derive(Clone)]
pub struct Navigator {
    table: RouteTable,
    guard: RouteGuard,
}

impl Navigator {
    pub fn new(table: RouteTable, guard: RouteGuard) -> Self {
        Self { table, guard }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn navigate(&self, target: &str) -> Result<Resolved, NavigationError> {
        let mut visited = vec![target.to_string()];
        let mut path = target.to_string();

        loop {
            let route = self.table.resolve(&path);
            let meta = route
                .as_ref()
                .map(|found| found.route.meta)
                .unwrap_or_default();

            match self.guard.decide(&path, meta) {
                NavigationDecision::Allow => {
                    return Ok(Resolved {
                        path,
                        route,
                        redirects: visited.split_off(1),
                    });
                }
                NavigationDecision::Redirect(next) => {
                    let looped = visited.contains(&next);
                    visited.push(next.clone());
                    if looped || visited.len() > MAX_REDIRECTS + 1 {
                        tracing::warn!(destination = %target, chain = ?visited, "Navigation redirect loop");
                        return Err(NavigationError::RedirectLoop {
                            target: target.to_string(),
                            chain: visited,
                        });
                    }
                    tracing::debug!(from = %path, to = %next, "Guard redirected navigation");
                    path = next;
                }
            }
        }
    }
}
