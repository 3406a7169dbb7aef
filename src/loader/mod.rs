//! Reference lists that feed the searchable selectors.
//!
//! A list moves `Idle -> Loading -> Ready` and back to `Idle` when its scope is
//! cleared. Every fetch is issued against a ticket; only the completion that
//! carries the most recent ticket is applied, so a slow response for an old
//! scope can never overwrite the list for the current one.

use crate::api::ApiClient;
use crate::core::AppError;
use crate::forms::schema::ListSource;
use crate::models::pagination::{PageQuery, Pager};
use crate::models::Choice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
}

pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Choice {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Permission to apply one fetch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    token: u64,
    pub scope: Option<String>,
    pub page: PageQuery,
}

/// One page as delivered by the backend. `received` counts rows before any
/// client-side filtering, which is what decides whether more pages exist.
#[derive(Debug, Clone)]
pub struct FetchedPage<T> {
    pub items: Vec<T>,
    pub received: usize,
}

impl<T> FetchedPage<T> {
    pub fn complete(items: Vec<T>) -> Self {
        let received = items.len();
        Self { items, received }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorView<'a, T> {
    /// No scope chosen yet.
    Idle,
    Loading,
    /// Loaded, nothing to pick. Carries the explanation to render.
    Empty(&'a str),
    Options(&'a [T]),
}

#[derive(Debug)]
pub struct ReferenceList<T> {
    state: LoadState,
    scope: Option<String>,
    items: Vec<T>,
    last_token: u64,
    in_flight: Option<u64>,
    pager: Pager,
    paged: bool,
    empty_message: String,
}

impl<T: Identified> ReferenceList<T> {
    pub fn paged(page_size: u32, empty_message: impl Into<String>) -> Self {
        Self::build(page_size, true, empty_message.into())
    }

    /// For endpoints that answer with the whole list at once.
    pub fn unpaged(page_size: u32, empty_message: impl Into<String>) -> Self {
        Self::build(page_size, false, empty_message.into())
    }

    fn build(page_size: u32, paged: bool, empty_message: String) -> Self {
        Self {
            state: LoadState::Idle,
            scope: None,
            items: Vec::new(),
            last_token: 0,
            in_flight: None,
            pager: Pager::new(page_size),
            paged,
            empty_message,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    pub fn has_more(&self) -> bool {
        self.state == LoadState::Ready && !self.pager.is_exhausted()
    }

    /// Scope-independent lists load once per activation: only when empty and idle.
    pub fn activate(&mut self) -> Option<LoadTicket> {
        if !self.items.is_empty() || self.state == LoadState::Loading {
            return None;
        }
        self.pager.reset();
        self.issue()
    }

    /// Reloads from the first page. Current items stay visible until it lands.
    pub fn refresh(&mut self) -> Option<LoadTicket> {
        self.pager.reset();
        self.issue()
    }

    /// Points the list at a new scope. Blank clears it back to idle.
    pub fn rescope(&mut self, scope: &str) -> Option<LoadTicket> {
        let scope = scope.trim();
        if scope.is_empty() {
            self.clear();
            return None;
        }
        if self.scope.as_deref() == Some(scope) && self.state != LoadState::Idle {
            return None;
        }
        self.scope = Some(scope.to_string());
        self.items.clear();
        self.pager.reset();
        self.issue()
    }

    pub fn clear(&mut self) {
        self.state = LoadState::Idle;
        self.scope = None;
        self.items.clear();
        self.in_flight = None;
        self.pager.reset();
    }

    pub fn load_more(&mut self) -> Option<LoadTicket> {
        if !self.has_more() {
            return None;
        }
        self.issue()
    }

    fn issue(&mut self) -> Option<LoadTicket> {
        let page = self.pager.next_query()?;
        self.last_token += 1;
        self.in_flight = Some(self.last_token);
        self.state = LoadState::Loading;
        Some(LoadTicket {
            token: self.last_token,
            scope: self.scope.clone(),
            page,
        })
    }

    /// Applies a fetch result. Returns `false` when the ticket is stale and the
    /// result was dropped. Failures land as an empty ready list.
    pub fn complete(&mut self, ticket: &LoadTicket, result: Result<FetchedPage<T>, AppError>) -> bool {
        if self.in_flight != Some(ticket.token) {
            tracing::debug!(
                scope = ?ticket.scope,
                page = ticket.page.page,
                "discarding stale reference list response"
            );
            return false;
        }
        self.in_flight = None;
        self.state = LoadState::Ready;

        match result {
            Ok(page) => {
                if ticket.page.page <= 1 {
                    self.items = page.items;
                } else {
                    self.items.extend(page.items);
                }
                if self.paged {
                    self.pager.advance(page.received);
                } else {
                    self.pager.finish();
                }
            }
            Err(e) => {
                tracing::warn!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    scope = ?ticket.scope,
                    "reference list fetch failed, showing empty list"
                );
                if ticket.page.page <= 1 {
                    self.items.clear();
                }
                self.pager.finish();
            }
        }
        true
    }

    pub fn view(&self) -> SelectorView<'_, T> {
        match self.state {
            LoadState::Idle => SelectorView::Idle,
            LoadState::Loading if self.items.is_empty() => SelectorView::Loading,
            _ if self.items.is_empty() => SelectorView::Empty(&self.empty_message),
            _ => SelectorView::Options(&self.items),
        }
    }
}

/// Loads one page of selector options for `source`.
#[tracing::instrument(name = "Fetch selector options", skip(api))]
pub async fn fetch_choices(
    api: &ApiClient,
    source: ListSource,
    scope: Option<&str>,
    page: PageQuery,
) -> Result<FetchedPage<Choice>, AppError> {
    match source {
        ListSource::Schools => {
            let schools = api.list_schools(page).await?;
            let choices = schools.iter().map(|school| school.choice()).collect();
            Ok(FetchedPage {
                items: choices,
                received: schools.len(),
            })
        }
        ListSource::BranchesOfSchool => {
            let branches = api.list_branches(page).await?;
            let choices = branches
                .iter()
                .filter(|branch| scope.map_or(true, |school_id| branch.belongs_to(school_id)))
                .map(|branch| branch.choice())
                .collect();
            Ok(FetchedPage {
                items: choices,
                received: branches.len(),
            })
        }
        ListSource::UsersOfSchool(role) => {
            let school_id = scope.ok_or_else(|| {
                AppError::validation_error("A school must be selected before loading users")
            })?;
            let users = api.users_by_school(school_id, role).await?;
            Ok(FetchedPage::complete(
                users.iter().map(|user| user.choice()).collect(),
            ))
        }
    }
}
