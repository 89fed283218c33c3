// Ordered before-action guards. The first guard that fails stops the chain
// and the action never runs.

use std::fmt;

use super::context::RequestContext;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Index,
    Show,
    New,
    Edit,
    Create,
    Update,
    Destroy,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Index,
        Action::Show,
        Action::New,
        Action::Edit,
        Action::Create,
        Action::Update,
        Action::Destroy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Index => "index",
            Action::Show => "show",
            Action::New => "new",
            Action::Edit => "edit",
            Action::Create => "create",
            Action::Update => "update",
            Action::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Guard: Send + Sync {
    fn name(&self) -> &'static str;

    fn call(&self, ctx: &mut RequestContext) -> Result<(), ApiError>;
}

/// Resolves the requested representation from the client hints
pub struct LoadClient;

impl Guard for LoadClient {
    fn name(&self) -> &'static str {
        "load_client"
    }

    fn call(&self, ctx: &mut RequestContext) -> Result<(), ApiError> {
        ctx.format = Some(ctx.client.resolve_format());
        Ok(())
    }
}

/// Halts with 401 unless the request carries an authenticated user
pub struct RequireLogin;

impl Guard for RequireLogin {
    fn name(&self) -> &'static str {
        "require_login"
    }

    fn call(&self, ctx: &mut RequestContext) -> Result<(), ApiError> {
        ctx.current_user().map(|_| ())
    }
}

struct Filter {
    guard: Box<dyn Guard>,
    only: Option<Vec<Action>>,
}

impl Filter {
    fn applies_to(&self, action: Action) -> bool {
        self.only.as_ref().map_or(true, |only| only.contains(&action))
    }
}

#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The chain every projects request runs through
    pub fn standard() -> Self {
        Self::new()
            .before_action(LoadClient)
            .before_action(RequireLogin)
    }

    pub fn before_action(mut self, guard: impl Guard + 'static) -> Self {
        self.filters.push(Filter {
            guard: Box::new(guard),
            only: None,
        });
        self
    }

    pub fn before_action_only(mut self, guard: impl Guard + 'static, only: &[Action]) -> Self {
        self.filters.push(Filter {
            guard: Box::new(guard),
            only: Some(only.to_vec()),
        });
        self
    }

    /// Guard names in declaration order
    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.guard.name()).collect()
    }

    pub fn run(&self, action: Action, ctx: &mut RequestContext) -> Result<(), ApiError> {
        for filter in self.filters.iter().filter(|f| f.applies_to(action)) {
            if let Err(e) = filter.guard.call(ctx) {
                tracing::info!("Filter chain halted by {} on #{}: {}", filter.guard.name(), action, e);
                return Err(e);
            }
        }
        Ok(())
    }
}
