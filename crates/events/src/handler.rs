use std::marker::PhantomData;

use cqrskit_core::{CommandOutcome, HandlerError, KindId};

/// Executes one or more kinds of command (command handler abstraction).
///
/// An executor declares the kinds it accepts through `kinds()`; a
/// [`CommandRouter`](crate::CommandRouter) uses that declaration to send it
/// exactly the commands it owns.
///
/// ## Generic Parameters
///
/// - `Ctx`: context of the execution (caller identity, clock, unit of work, ...)
/// - `C`: command type (usually an enum per module, or `dyn Command`)
/// - `R`: result of a successful execution
///
/// ## Errors
///
/// The aggregate-related failures are modelled as variants of
/// [`CommandError`](cqrskit_core::CommandError). Anything else must be wrapped by
/// the executor itself into `CommandError::ExecutionFailed`; routers pass errors
/// through untouched.
pub trait CommandExecutor<Ctx: ?Sized, C: ?Sized, R>: Send + Sync {
    /// Kinds of command this executor handles.
    fn kinds(&self) -> Vec<KindId>;

    /// Execute the command.
    fn execute(&self, ctx: &Ctx, command: &C) -> CommandOutcome<R>;
}

/// Updates a view from events of exactly one kind (event handler abstraction).
///
/// Handlers are side-effecting. Because projections replay with at-least-once
/// delivery, `handle` must tolerate seeing the same event more than once.
pub trait EventHandler<E: ?Sized>: Send + Sync {
    /// The single kind of event this handler operates on.
    fn kind(&self) -> KindId;

    /// Apply the event to the view.
    fn handle(&self, event: &E) -> Result<(), HandlerError>;
}

/// Executor backed by a closure.
pub struct FnExecutor<Ctx: ?Sized, C: ?Sized, R, F> {
    kinds: Vec<KindId>,
    f: F,
    marker: PhantomData<fn(&Ctx, &C) -> R>,
}

impl<Ctx: ?Sized, C: ?Sized, R, F> FnExecutor<Ctx, C, R, F>
where
    F: Fn(&Ctx, &C) -> CommandOutcome<R> + Send + Sync,
{
    pub fn new(kinds: impl IntoIterator<Item = KindId>, f: F) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            f,
            marker: PhantomData,
        }
    }
}

impl<Ctx: ?Sized, C: ?Sized, R, F> CommandExecutor<Ctx, C, R> for FnExecutor<Ctx, C, R, F>
where
    F: Fn(&Ctx, &C) -> CommandOutcome<R> + Send + Sync,
{
    fn kinds(&self) -> Vec<KindId> {
        self.kinds.clone()
    }

    fn execute(&self, ctx: &Ctx, command: &C) -> CommandOutcome<R> {
        (self.f)(ctx, command)
    }
}

/// Event handler backed by a closure.
pub struct FnEventHandler<E: ?Sized, F> {
    kind: KindId,
    f: F,
    marker: PhantomData<fn(&E)>,
}

impl<E: ?Sized, F> FnEventHandler<E, F>
where
    F: Fn(&E) -> Result<(), HandlerError> + Send + Sync,
{
    pub fn new(kind: KindId, f: F) -> Self {
        Self {
            kind,
            f,
            marker: PhantomData,
        }
    }
}

impl<E: ?Sized, F> EventHandler<E> for FnEventHandler<E, F>
where
    F: Fn(&E) -> Result<(), HandlerError> + Send + Sync,
{
    fn kind(&self) -> KindId {
        self.kind.clone()
    }

    fn handle(&self, event: &E) -> Result<(), HandlerError> {
        (self.f)(event)
    }
}
