//! Command routing: one command, one executor.
//!
//! A [`CommandRouter`] owns a [`CommandRegistry`] of executors and forwards each
//! command to the executor that declared its kind:
//!
//! ```text
//! Command ──kind()──▶ registry ──▶ executor.execute(ctx, command) ──▶ result / error
//! ```
//!
//! The router is stateless. It calls the executor exactly once, synchronously,
//! and hands back whatever it returned: no validation, no retry, no wrapping.
//! The only failure it produces itself is `CommandError::Unroutable`.

use std::sync::Arc;

use tracing::debug;

use cqrskit_core::{CommandError, CommandOutcome, KindId, RegistryError};

use crate::registry::CommandRegistry;
use crate::{Command, CommandExecutor};

/// Executor shared behind a trait object.
pub type SharedExecutor<Ctx, C, R> = Arc<dyn CommandExecutor<Ctx, C, R>>;

/// Dispatches commands to the executor registered for their kind.
pub struct CommandRouter<Ctx: ?Sized, C: ?Sized, R> {
    registry: CommandRegistry<SharedExecutor<Ctx, C, R>>,
}

impl<Ctx: ?Sized, C: ?Sized, R> CommandRouter<Ctx, C, R> {
    /// Build a router from a non-empty list of executors with disjoint kinds.
    pub fn new(
        executors: impl IntoIterator<Item = SharedExecutor<Ctx, C, R>>,
    ) -> Result<Self, RegistryError> {
        Self::from_slots(executors.into_iter().map(Some))
    }

    /// Build a router from executor slots, some of which may be unset.
    ///
    /// Fails with `NullEntry` on the first unset slot.
    pub fn from_slots(
        executors: impl IntoIterator<Item = Option<SharedExecutor<Ctx, C, R>>>,
    ) -> Result<Self, RegistryError> {
        let registry = CommandRegistry::build("executors", executors, |e: &SharedExecutor<Ctx, C, R>| e.kinds())?;
        Ok(Self { registry })
    }

    /// Kinds this router covers, sorted.
    pub fn kinds(&self) -> Vec<KindId> {
        self.registry.kinds()
    }

    pub fn covers(&self, kind: &KindId) -> bool {
        self.registry.contains(kind)
    }
}

impl<Ctx: ?Sized, C: Command + ?Sized, R> CommandRouter<Ctx, C, R> {
    /// Execute `command` with the executor registered for its kind.
    pub fn dispatch(&self, ctx: &Ctx, command: &C) -> CommandOutcome<R> {
        let kind = command.kind();
        let executor = match self.registry.resolve(&kind) {
            Ok(executor) => executor,
            Err(_) => {
                debug!(kind = %kind, "no executor for command");
                return Err(CommandError::unroutable(kind));
            }
        };

        executor.execute(ctx, command)
    }
}

/// A router is itself an executor for the union of its kinds, so routers nest.
impl<Ctx: ?Sized, C: Command + ?Sized, R> CommandExecutor<Ctx, C, R> for CommandRouter<Ctx, C, R> {
    fn kinds(&self) -> Vec<KindId> {
        CommandRouter::kinds(self)
    }

    fn execute(&self, ctx: &Ctx, command: &C) -> CommandOutcome<R> {
        self.dispatch(ctx, command)
    }
}

impl<Ctx: ?Sized, C: ?Sized, R> core::fmt::Debug for CommandRouter<Ctx, C, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandRouter")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::FnExecutor;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct TestCommand {
        kind: &'static str,
        amount: i64,
    }

    impl Command for TestCommand {
        fn kind(&self) -> KindId {
            KindId::from_static(self.kind)
        }
    }

    fn cmd(kind: &'static str) -> TestCommand {
        TestCommand { kind, amount: 1 }
    }

    type Router = CommandRouter<String, TestCommand, String>;

    fn fixed(kinds: &[&'static str], answer: &'static str) -> SharedExecutor<String, TestCommand, String> {
        Arc::new(FnExecutor::new(
            kinds.iter().copied().map(KindId::from_static),
            move |_ctx: &String, _cmd: &TestCommand| Ok(answer.to_string()),
        ))
    }

    #[test]
    fn dispatches_to_the_registered_executor() {
        let router = Router::new(vec![fixed(&["Open"], "opened"), fixed(&["Close"], "closed")]).unwrap();

        assert_eq!(router.dispatch(&"ctx".to_string(), &cmd("Open")).unwrap(), "opened");
        assert_eq!(router.dispatch(&"ctx".to_string(), &cmd("Close")).unwrap(), "closed");
    }

    #[test]
    fn unknown_kind_is_unroutable_and_named() {
        let router = Router::new(vec![fixed(&["Open"], "opened"), fixed(&["Close"], "closed")]).unwrap();

        let err = router.dispatch(&"ctx".to_string(), &cmd("Cancel")).unwrap_err();
        assert!(matches!(&err, CommandError::Unroutable { kind } if kind.as_str() == "Cancel"));
    }

    #[test]
    fn executor_runs_exactly_once_with_context_and_command() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let calls_c = calls.clone();
        let seen_c = seen.clone();
        let exec: SharedExecutor<String, TestCommand, String> = Arc::new(FnExecutor::new(
            [KindId::from_static("Deposit")],
            move |ctx: &String, c: &TestCommand| {
                calls_c.fetch_add(1, Ordering::SeqCst);
                seen_c.lock().unwrap().push((ctx.clone(), c.clone()));
                Ok(format!("{}:{}", ctx, c.amount))
            },
        ));
        let router = Router::new(vec![exec]).unwrap();

        let command = TestCommand { kind: "Deposit", amount: 7 };
        let out = router.dispatch(&"alice".to_string(), &command).unwrap();

        assert_eq!(out, "alice:7");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*seen.lock().unwrap(), vec![("alice".to_string(), command)]);
    }

    #[test]
    fn executor_errors_pass_through_unchanged() {
        let exec: SharedExecutor<String, TestCommand, String> = Arc::new(FnExecutor::new(
            [KindId::from_static("Withdraw")],
            |_ctx: &String, _c: &TestCommand| Err(CommandError::VersionConflict { expected: 3, actual: 4 }),
        ));
        let router = Router::new(vec![exec]).unwrap();

        let err = router.dispatch(&"ctx".to_string(), &cmd("Withdraw")).unwrap_err();
        assert!(matches!(err, CommandError::VersionConflict { expected: 3, actual: 4 }));
    }

    #[test]
    fn construction_failures() {
        assert_eq!(
            Router::new(Vec::new()).unwrap_err(),
            RegistryError::EmptyRegistration { what: "executors" }
        );
        assert_eq!(
            Router::new(vec![fixed(&["Open"], "a"), fixed(&["Open"], "b")]).unwrap_err(),
            RegistryError::DuplicateHandler { kind: KindId::from_static("Open") }
        );
        assert_eq!(
            Router::from_slots(vec![Some(fixed(&["Open"], "a")), None]).unwrap_err(),
            RegistryError::NullEntry { what: "executors", index: 1 }
        );
    }

    #[test]
    fn routers_nest_as_executors() {
        let inner: SharedExecutor<String, TestCommand, String> =
            Arc::new(Router::new(vec![fixed(&["Open", "Close"], "inner")]).unwrap());
        let outer = Router::new(vec![inner, fixed(&["Charge"], "outer")]).unwrap();

        assert_eq!(outer.dispatch(&"ctx".to_string(), &cmd("Close")).unwrap(), "inner");
        assert_eq!(outer.dispatch(&"ctx".to_string(), &cmd("Charge")).unwrap(), "outer");
        assert_eq!(
            outer.kinds(),
            vec![
                KindId::from_static("Charge"),
                KindId::from_static("Close"),
                KindId::from_static("Open"),
            ]
        );
    }

    #[test]
    fn works_with_boxed_trait_object_commands() {
        let exec: SharedExecutor<(), dyn Command, &'static str> = Arc::new(FnExecutor::<(), dyn Command, _, _>::new(
            [KindId::from_static("Open")],
            |_ctx, c| {
                assert_eq!(c.kind().as_str(), "Open");
                Ok("ok")
            },
        ));
        let router: CommandRouter<(), dyn Command, &'static str> = CommandRouter::new(vec![exec]).unwrap();

        let boxed: Box<dyn Command> = Box::new(cmd("Open"));
        assert_eq!(router.dispatch(&(), boxed.as_ref()).unwrap(), "ok");
    }
}
