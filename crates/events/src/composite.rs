//! Several command routers presented as one.
//!
//! Modules each build their own [`CommandRouter`]; the application glues them
//! together here. Coverage must stay disjoint: a kind owned by two members is a
//! construction error, never a silent override.

use std::collections::HashMap;

use cqrskit_core::{CommandError, CommandOutcome, KindId, RegistryError};

use crate::{Command, CommandExecutor, CommandRouter};

pub struct CompositeCommandRouter<Ctx: ?Sized, C: ?Sized, R> {
    members: Vec<CommandRouter<Ctx, C, R>>,
    owners: HashMap<KindId, usize>,
}

impl<Ctx: ?Sized, C: ?Sized, R> CompositeCommandRouter<Ctx, C, R> {
    pub fn new(routers: impl IntoIterator<Item = CommandRouter<Ctx, C, R>>) -> Result<Self, RegistryError> {
        Self::from_slots(routers.into_iter().map(Some))
    }

    /// Merge router slots; an unset slot fails with `NullEntry`.
    pub fn from_slots(
        routers: impl IntoIterator<Item = Option<CommandRouter<Ctx, C, R>>>,
    ) -> Result<Self, RegistryError> {
        const WHAT: &str = "routers";

        let mut members = Vec::new();
        let mut owners = HashMap::new();

        for (index, slot) in routers.into_iter().enumerate() {
            let router = slot.ok_or(RegistryError::NullEntry { what: WHAT, index })?;
            for kind in router.kinds() {
                if owners.contains_key(&kind) {
                    return Err(RegistryError::KindCollision { kind });
                }
                owners.insert(kind, index);
            }
            members.push(router);
        }

        if members.is_empty() {
            return Err(RegistryError::EmptyRegistration { what: WHAT });
        }

        Ok(Self { members, owners })
    }

    /// Union of the members' kinds, sorted.
    pub fn kinds(&self) -> Vec<KindId> {
        let mut kinds: Vec<KindId> = self.owners.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

impl<Ctx: ?Sized, C: Command + ?Sized, R> CompositeCommandRouter<Ctx, C, R> {
    /// Forward `command` to the member router that owns its kind.
    pub fn dispatch(&self, ctx: &Ctx, command: &C) -> CommandOutcome<R> {
        let kind = command.kind();
        match self.owners.get(&kind) {
            Some(&index) => self.members[index].dispatch(ctx, command),
            None => Err(CommandError::unroutable(kind)),
        }
    }
}

impl<Ctx: ?Sized, C: Command + ?Sized, R> CommandExecutor<Ctx, C, R> for CompositeCommandRouter<Ctx, C, R> {
    fn kinds(&self) -> Vec<KindId> {
        CompositeCommandRouter::kinds(self)
    }

    fn execute(&self, ctx: &Ctx, command: &C) -> CommandOutcome<R> {
        self.dispatch(ctx, command)
    }
}

impl<Ctx: ?Sized, C: ?Sized, R> core::fmt::Debug for CompositeCommandRouter<Ctx, C, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompositeCommandRouter")
            .field("members", &self.members)
            .finish()
    }
}
