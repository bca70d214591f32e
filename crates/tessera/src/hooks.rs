//! Global lifecycle callbacks.
//!
//! Mutation hooks see every record of a batch before it is committed
//! (`before_*`, which may rewrite or reject the record) and after
//! (`after_*`). Select hooks see the instance list between query stages.

use crate::Instance;
use tessera_core::record::Record;

/// Returned by `before_*` hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Drop this record from the batch. The rest of the batch proceeds.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    BeforeCreate,
    AfterCreate,
    BeforeUpdate,
    AfterUpdate,
    BeforeDelete,
    AfterDelete,
    BeforeSelect,
    AfterWhere,
    AfterOrderBy,
    AfterLimit,
}

/// Handle used to unregister a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

type BeforeFn = Box<dyn Fn(&str, &mut Record) -> Flow>;
type AfterFn = Box<dyn Fn(&str, &Record)>;
type SelectFn = Box<dyn Fn(&str, Vec<Instance>) -> Vec<Instance>>;

enum Callback {
    Before(BeforeFn),
    After(AfterFn),
    Select(SelectFn),
}

struct Entry {
    id: HookId,
    event: Event,
    callback: Callback,
}

#[derive(Default)]
pub struct Hooks {
    next_id: u64,
    entries: Vec<Entry>,
}

impl Hooks {
    pub fn before_create(&mut self, f: impl Fn(&str, &mut Record) -> Flow + 'static) -> HookId {
        self.push(Event::BeforeCreate, Callback::Before(Box::new(f)))
    }

    pub fn after_create(&mut self, f: impl Fn(&str, &Record) + 'static) -> HookId {
        self.push(Event::AfterCreate, Callback::After(Box::new(f)))
    }

    pub fn before_update(&mut self, f: impl Fn(&str, &mut Record) -> Flow + 'static) -> HookId {
        self.push(Event::BeforeUpdate, Callback::Before(Box::new(f)))
    }

    pub fn after_update(&mut self, f: impl Fn(&str, &Record) + 'static) -> HookId {
        self.push(Event::AfterUpdate, Callback::After(Box::new(f)))
    }

    pub fn before_delete(&mut self, f: impl Fn(&str, &mut Record) -> Flow + 'static) -> HookId {
        self.push(Event::BeforeDelete, Callback::Before(Box::new(f)))
    }

    pub fn after_delete(&mut self, f: impl Fn(&str, &Record) + 'static) -> HookId {
        self.push(Event::AfterDelete, Callback::After(Box::new(f)))
    }

    /// Runs on the candidate list before any `where` clause.
    pub fn before_select(
        &mut self,
        f: impl Fn(&str, Vec<Instance>) -> Vec<Instance> + 'static,
    ) -> HookId {
        self.push(Event::BeforeSelect, Callback::Select(Box::new(f)))
    }

    pub fn after_where(
        &mut self,
        f: impl Fn(&str, Vec<Instance>) -> Vec<Instance> + 'static,
    ) -> HookId {
        self.push(Event::AfterWhere, Callback::Select(Box::new(f)))
    }

    pub fn after_order_by(
        &mut self,
        f: impl Fn(&str, Vec<Instance>) -> Vec<Instance> + 'static,
    ) -> HookId {
        self.push(Event::AfterOrderBy, Callback::Select(Box::new(f)))
    }

    pub fn after_limit(
        &mut self,
        f: impl Fn(&str, Vec<Instance>) -> Vec<Instance> + 'static,
    ) -> HookId {
        self.push(Event::AfterLimit, Callback::Select(Box::new(f)))
    }

    /// Unregister a hook. Returns `false` if it was already removed.
    pub fn remove(&mut self, id: HookId) -> bool {
        let len = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != len
    }

    pub fn is_registered(&self, event: Event) -> bool {
        self.entries.iter().any(|entry| entry.event == event)
    }

    fn push(&mut self, event: Event, callback: Callback) -> HookId {
        let id = HookId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            event,
            callback,
        });
        id
    }

    fn callbacks(&self, event: Event) -> impl Iterator<Item = &Callback> {
        self.entries
            .iter()
            .filter(move |entry| entry.event == event)
            .map(|entry| &entry.callback)
    }

    /// Run `before_*` hooks over a batch, in registration order. A record
    /// rejected by any hook is removed and skips the remaining hooks.
    pub(crate) fn run_before(
        &self,
        event: Event,
        entity: &str,
        records: Vec<(String, Record)>,
    ) -> Vec<(String, Record)> {
        if !self.is_registered(event) {
            return records;
        }

        records
            .into_iter()
            .filter_map(|(id, mut record)| {
                for callback in self.callbacks(event) {
                    if let Callback::Before(f) = callback {
                        if f(entity, &mut record) == Flow::Reject {
                            tracing::debug!(entity, %id, ?event, "record rejected by hook");
                            return None;
                        }
                    }
                }
                Some((id, record))
            })
            .collect()
    }

    pub(crate) fn run_after(&self, event: Event, entity: &str, records: &[(String, Record)]) {
        for callback in self.callbacks(event) {
            if let Callback::After(f) = callback {
                for (_, record) in records {
                    f(entity, record);
                }
            }
        }
    }

    pub(crate) fn run_select(
        &self,
        event: Event,
        entity: &str,
        mut instances: Vec<Instance>,
    ) -> Vec<Instance> {
        for callback in self.callbacks(event) {
            if let Callback::Select(f) = callback {
                instances = f(entity, instances);
            }
        }
        instances
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt.debug_list()
            .entries(self.entries.iter().map(|entry| (entry.id, entry.event)))
            .finish()
    }
}
