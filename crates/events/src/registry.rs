//! Immutable kind → handler lookup tables.
//!
//! Registries are built once from an ordered handler collection and are
//! read-only afterwards: there is no way to add or remove an entry after
//! construction. Lookups are pure, so a registry can be shared freely between
//! threads.
//!
//! Two flavours exist:
//!
//! - [`CommandRegistry`]: exactly one handler per kind; duplicates are rejected.
//! - [`EventRegistry`]: an ordered list of handlers per kind; duplicates are
//!   grouped, keeping registration order (fan-out).
//!
//! Both take their input as slots (`Option<H>`). A `None` slot models an unset
//! entry handed over by whatever discovered the handlers, and fails
//! construction with [`RegistryError::NullEntry`].

use std::collections::{BTreeSet, HashMap};

use cqrskit_core::{KindId, RegistryError};

/// Kind → single handler.
#[derive(Debug, Clone)]
pub struct CommandRegistry<H> {
    handlers: HashMap<KindId, H>,
}

impl<H: Clone> CommandRegistry<H> {
    /// Build the registry.
    ///
    /// - `what`: name of the input collection, used in error messages
    /// - `kinds_of`: the kinds a handler declares (may be several)
    pub fn build<I, F>(what: &'static str, entries: I, kinds_of: F) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Option<H>>,
        F: Fn(&H) -> Vec<KindId>,
    {
        let mut handlers = HashMap::new();
        let mut seen = 0usize;

        for (index, entry) in entries.into_iter().enumerate() {
            seen += 1;
            let handler = entry.ok_or(RegistryError::NullEntry { what, index })?;

            // A handler listing the same kind twice still owns it only once.
            let kinds: BTreeSet<KindId> = kinds_of(&handler).into_iter().collect();
            if kinds.is_empty() {
                return Err(RegistryError::NoDeclaredKinds { what, index });
            }

            for kind in kinds {
                if handlers.contains_key(&kind) {
                    return Err(RegistryError::DuplicateHandler { kind });
                }
                handlers.insert(kind, handler.clone());
            }
        }

        if seen == 0 {
            return Err(RegistryError::EmptyRegistration { what });
        }

        Ok(Self { handlers })
    }
}

impl<H> CommandRegistry<H> {
    /// The handler registered for `kind`.
    pub fn resolve(&self, kind: &KindId) -> Result<&H, RegistryError> {
        self.handlers
            .get(kind)
            .ok_or_else(|| RegistryError::NotFound { kind: kind.clone() })
    }

    pub fn contains(&self, kind: &KindId) -> bool {
        self.handlers.contains_key(kind)
    }

    /// All registered kinds, sorted.
    pub fn kinds(&self) -> Vec<KindId> {
        let mut kinds: Vec<KindId> = self.handlers.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Kind → ordered list of handlers.
#[derive(Debug, Clone)]
pub struct EventRegistry<H> {
    handlers: HashMap<KindId, Vec<H>>,
}

impl<H> EventRegistry<H> {
    /// Build the registry, grouping handlers by the kind each one declares.
    ///
    /// Within a group, handlers keep the order in which they were supplied.
    pub fn build<I, F>(what: &'static str, entries: I, kind_of: F) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Option<H>>,
        F: Fn(&H) -> KindId,
    {
        let mut handlers: HashMap<KindId, Vec<H>> = HashMap::new();
        let mut seen = 0usize;

        for (index, entry) in entries.into_iter().enumerate() {
            seen += 1;
            let handler = entry.ok_or(RegistryError::NullEntry { what, index })?;
            handlers.entry(kind_of(&handler)).or_default().push(handler);
        }

        if seen == 0 {
            return Err(RegistryError::EmptyRegistration { what });
        }

        Ok(Self { handlers })
    }

    /// Handlers registered for `kind` in registration order; empty if none.
    pub fn resolve(&self, kind: &KindId) -> &[H] {
        self.handlers.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All kinds with at least one handler, sorted.
    pub fn kinds(&self) -> Vec<KindId> {
        let mut kinds: Vec<KindId> = self.handlers.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    /// Total number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(name: &str) -> KindId {
        KindId::new(name).unwrap()
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Fake {
        name: &'static str,
        kinds: Vec<&'static str>,
    }

    fn fake(name: &'static str, kinds: &[&'static str]) -> Option<Fake> {
        Some(Fake {
            name,
            kinds: kinds.to_vec(),
        })
    }

    fn kinds_of(f: &Fake) -> Vec<KindId> {
        f.kinds.iter().map(|k| kind(k)).collect()
    }

    #[test]
    fn command_registry_resolves_each_declared_kind() {
        let reg = CommandRegistry::build(
            "executors",
            vec![fake("accounts", &["Open", "Close"]), fake("billing", &["Charge"])],
            kinds_of,
        )
        .unwrap();

        assert_eq!(reg.resolve(&kind("Open")).unwrap().name, "accounts");
        assert_eq!(reg.resolve(&kind("Close")).unwrap().name, "accounts");
        assert_eq!(reg.resolve(&kind("Charge")).unwrap().name, "billing");
        assert_eq!(reg.kinds(), vec![kind("Charge"), kind("Close"), kind("Open")]);
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn command_registry_reports_missing_kind() {
        let reg = CommandRegistry::build("executors", vec![fake("a", &["Open"])], kinds_of).unwrap();

        assert_eq!(
            reg.resolve(&kind("Cancel")),
            Err(RegistryError::NotFound { kind: kind("Cancel") })
        );
    }

    #[test]
    fn command_registry_rejects_duplicates() {
        let err = CommandRegistry::build(
            "executors",
            vec![fake("a", &["Open"]), fake("b", &["Close", "Open"])],
            kinds_of,
        )
        .unwrap_err();

        assert_eq!(err, RegistryError::DuplicateHandler { kind: kind("Open") });
    }

    #[test]
    fn handler_repeating_its_own_kind_is_not_a_duplicate() {
        let reg = CommandRegistry::build("executors", vec![fake("a", &["Open", "Open"])], kinds_of).unwrap();
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn command_registry_rejects_empty_input() {
        let err = CommandRegistry::<Fake>::build("executors", Vec::new(), kinds_of).unwrap_err();
        assert_eq!(err, RegistryError::EmptyRegistration { what: "executors" });
    }

    #[test]
    fn command_registry_rejects_unset_entry() {
        let err = CommandRegistry::build("executors", vec![fake("a", &["Open"]), None], kinds_of)
            .unwrap_err();
        assert_eq!(err, RegistryError::NullEntry { what: "executors", index: 1 });
    }

    #[test]
    fn command_registry_rejects_handler_without_kinds() {
        let err = CommandRegistry::build("executors", vec![fake("a", &[])], kinds_of).unwrap_err();
        assert_eq!(err, RegistryError::NoDeclaredKinds { what: "executors", index: 0 });
    }

    #[test]
    fn event_registry_groups_in_registration_order() {
        let reg = EventRegistry::build(
            "handlers",
            vec![
                fake("first", &["Opened"]),
                fake("other", &["Closed"]),
                fake("second", &["Opened"]),
            ],
            |f| kind(f.kinds[0]),
        )
        .unwrap();

        let names: Vec<_> = reg.resolve(&kind("Opened")).iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(reg.handler_count(), 3);
        assert_eq!(reg.kinds(), vec![kind("Closed"), kind("Opened")]);
    }

    #[test]
    fn event_registry_resolves_unknown_kind_to_empty() {
        let reg = EventRegistry::build("handlers", vec![fake("a", &["Opened"])], |f| kind(f.kinds[0]))
            .unwrap();
        assert!(reg.resolve(&kind("Unknown")).is_empty());
    }

    #[test]
    fn event_registry_rejects_empty_and_unset_input() {
        let err = EventRegistry::<Fake>::build("handlers", Vec::new(), |f| kind(f.kinds[0])).unwrap_err();
        assert_eq!(err, RegistryError::EmptyRegistration { what: "handlers" });

        let err = EventRegistry::build("handlers", vec![None, fake("a", &["Opened"])], |f: &Fake| {
            kind(f.kinds[0])
        })
        .unwrap_err();
        assert_eq!(err, RegistryError::NullEntry { what: "handlers", index: 0 });
    }

    mod proptest_tests {
        use super::*;
        use proptest::collection::btree_set;
        use proptest::prelude::*;

        proptest! {
            /// Property: with distinct kinds, every kind resolves to the handler that declared it.
            #[test]
            fn distinct_kinds_resolve_to_their_declarer(
                names in btree_set("[A-Z][a-z]{1,12}", 1..24)
            ) {
                let names: Vec<String> = names.into_iter().collect();
                let entries: Vec<Option<(usize, KindId)>> = names
                    .iter()
                    .enumerate()
                    .map(|(i, n)| Some((i, kind(n))))
                    .collect();

                let reg = CommandRegistry::build("executors", entries, |(_, k)| vec![k.clone()]).unwrap();

                for (i, n) in names.iter().enumerate() {
                    let (owner, _) = reg.resolve(&kind(n)).unwrap();
                    prop_assert_eq!(*owner, i);
                }
            }

            /// Property: a shared kind fails construction no matter how many other handlers exist.
            #[test]
            fn any_shared_kind_is_a_duplicate(
                names in btree_set("[A-Z][a-z]{1,12}", 2..24),
                dup_from in any::<prop::sample::Index>(),
                dup_to in any::<prop::sample::Index>(),
            ) {
                let names: Vec<String> = names.into_iter().collect();
                let from = dup_from.index(names.len());
                let mut to = dup_to.index(names.len());
                if to == from {
                    to = (to + 1) % names.len();
                }

                let mut kinds: Vec<KindId> = names.iter().map(|n| kind(n)).collect();
                kinds[to] = kinds[from].clone();
                let shared = kinds[from].clone();

                let err = CommandRegistry::build(
                    "executors",
                    kinds.into_iter().map(Some),
                    |k| vec![k.clone()],
                )
                .unwrap_err();

                prop_assert_eq!(err, RegistryError::DuplicateHandler { kind: shared });
            }
        }
    }
}
