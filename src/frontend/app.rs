// SPDX-FileCopyrightText: 2025 Fredrik Lanker <fredrik@lanker.se>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::routes::{resolve, Params, ViewKind};
use std::collections::HashMap;
use tracing::debug;
use url::Url;

const ORIGIN: &str = "http://localhost/";

/// Parts of the page rendered outside the route switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShellPart {
    Nav,
    ScrollRestoration,
}

pub const SHELL: [ShellPart; 2] = [ShellPart::Nav, ShellPart::ScrollRestoration];

/// A node of the rendered page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component {
    Shell(ShellPart),
    View(ViewKind),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    pub search: Option<String>,
    pub hash: Option<String>,
}

impl From<&Url> for Location {
    fn from(url: &Url) -> Self {
        Location {
            pathname: url.path().to_owned(),
            search: url.query().map(String::from),
            hash: url.fragment().map(String::from),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveView {
    pub kind: ViewKind,
    pub params: Params,
}

impl ActiveView {
    fn at(url: &Url) -> Self {
        let matched = resolve(url.path());
        ActiveView {
            kind: matched.view,
            params: matched.params,
        }
    }
}

/// The page for a view: the shell first, then the switch's single child.
fn render(view: &ActiveView) -> Vec<Component> {
    SHELL
        .iter()
        .copied()
        .map(Component::Shell)
        .chain(std::iter::once(Component::View(view.kind)))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: ActiveView,
    pub to: ActiveView,
    pub mounted: Vec<Component>,
    pub unmounted: Vec<Component>,
}

impl Transition {
    /// A different view component replaced the old one. Moving between two
    /// ids of the same view only updates its params.
    pub fn swapped(&self) -> bool {
        !self.unmounted.is_empty()
    }
}

#[derive(Debug)]
struct Entry {
    url: Url,
    scroll_y: u32,
}

/// Browser-router state: history, the view for the current entry and the
/// shell that stays mounted around it.
///
/// Scroll restoration resets to the top whenever a push or replace changes
/// the pathname, and brings back the saved offset on `back`/`forward`.
#[derive(Debug)]
pub struct App {
    entries: Vec<Entry>,
    index: usize,
    view: ActiveView,
    scroll_y: u32,
    tree: Vec<Component>,
    mounts: HashMap<Component, usize>,
}

impl App {
    pub fn new(href: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(ORIGIN)?.join(href)?;
        let view = ActiveView::at(&url);
        let tree = render(&view);
        let mounts = tree.iter().map(|component| (*component, 1)).collect();
        Ok(App {
            entries: vec![Entry { url, scroll_y: 0 }],
            index: 0,
            view,
            scroll_y: 0,
            tree,
            mounts,
        })
    }

    pub fn view(&self) -> &ActiveView {
        &self.view
    }

    pub fn location(&self) -> Location {
        Location::from(&self.entries[self.index].url)
    }

    /// Components currently on the page.
    pub fn mounted(&self) -> &[Component] {
        &self.tree
    }

    /// How many times `component` has been mounted since the app started.
    pub fn mount_count(&self, component: Component) -> usize {
        self.mounts.get(&component).copied().unwrap_or_default()
    }

    pub fn scroll_y(&self) -> u32 {
        self.scroll_y
    }

    pub fn scroll_to(&mut self, y: u32) {
        self.scroll_y = y;
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Follows a link: pushes a history entry. Relative hrefs resolve
    /// against the current location.
    pub fn navigate(&mut self, href: &str) -> Result<Transition, url::ParseError> {
        let current = &self.entries[self.index].url;
        let url = current.join(href)?;
        let previous = current.path().to_owned();
        self.entries[self.index].scroll_y = self.scroll_y;
        self.entries.truncate(self.index + 1);
        self.entries.push(Entry { url, scroll_y: 0 });
        self.index += 1;
        Ok(self.enter(Some(previous)))
    }

    /// Programmatic redirect: replaces the current history entry.
    pub fn replace(&mut self, href: &str) -> Result<Transition, url::ParseError> {
        let current = &self.entries[self.index].url;
        let url = current.join(href)?;
        let previous = current.path().to_owned();
        self.entries[self.index] = Entry { url, scroll_y: 0 };
        Ok(self.enter(Some(previous)))
    }

    pub fn back(&mut self) -> Option<Transition> {
        if !self.can_go_back() {
            return None;
        }
        self.entries[self.index].scroll_y = self.scroll_y;
        self.index -= 1;
        Some(self.enter(None))
    }

    pub fn forward(&mut self) -> Option<Transition> {
        if !self.can_go_forward() {
            return None;
        }
        self.entries[self.index].scroll_y = self.scroll_y;
        self.index += 1;
        Some(self.enter(None))
    }

    /// `previous_path` is set for push/replace and `None` for history moves,
    /// which restore the entry's saved offset.
    fn enter(&mut self, previous_path: Option<String>) -> Transition {
        let entry = &self.entries[self.index];
        let to = ActiveView::at(&entry.url);
        let from = std::mem::replace(&mut self.view, to.clone());

        match previous_path {
            None => self.scroll_y = entry.scroll_y,
            Some(previous) if previous != entry.url.path() => self.scroll_y = 0,
            Some(_) => {}
        }

        let next = render(&to);
        let unmounted: Vec<Component> = self
            .tree
            .iter()
            .filter(|component| !next.contains(component))
            .copied()
            .collect();
        let mounted: Vec<Component> = next
            .iter()
            .filter(|component| !self.tree.contains(component))
            .copied()
            .collect();
        for component in &mounted {
            *self.mounts.entry(*component).or_default() += 1;
        }
        self.tree = next;

        debug!("navigated to {} ({:?})", entry.url.path(), to.kind);
        Transition {
            from,
            to,
            mounted,
            unmounted,
        }
    }
}
