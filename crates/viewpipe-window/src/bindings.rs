//! Host callbacks exposed to page script under a global name.
//!
//! Each binding gets the next id from a per-window counter starting at 0.
//! Ids are never reused. The native side installs a trampoline under the
//! bound name that reports calls back as `bindCallback` envelopes carrying
//! the id and the call arguments.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::debug;
use viewpipe_common::WindowError;

use crate::channel::CommandSender;
use crate::protocol::Command;

/// Callback invoked with the positional arguments of a page-side call.
pub type BindingCallback = Arc<dyn Fn(&[Value]) + Send + Sync>;

struct Binding {
    name: String,
    callback: BindingCallback,
}

#[derive(Default)]
struct Table {
    next_id: u32,
    bindings: BTreeMap<u32, Binding>,
}

#[derive(Default)]
pub struct BindingRegistry {
    table: Mutex<Table>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `callback` under the next id, then announce it to the native side.
    ///
    /// Names are not checked for uniqueness; binding a name twice installs a
    /// second trampoline that shadows the first in the page.
    pub fn bind<F>(
        &self,
        name: impl Into<String>,
        callback: F,
        commands: &CommandSender,
    ) -> Result<u32, WindowError>
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        let name = name.into();
        let id = self.register(name.clone(), Arc::new(callback));
        commands.send(&Command::Bind { id, name })?;
        Ok(id)
    }

    fn register(&self, name: String, callback: BindingCallback) -> u32 {
        let mut table = self.lock();
        let id = table.next_id;
        table.next_id += 1;
        debug!(binding_id = id, name = %name, "binding registered");
        table.bindings.insert(id, Binding { name, callback });
        id
    }

    /// Call the callback bound under `id` once with `args`.
    pub fn invoke(&self, id: u32, args: &[Value]) -> Result<(), WindowError> {
        let callback = self
            .lock()
            .bindings
            .get(&id)
            .map(|b| Arc::clone(&b.callback))
            .ok_or(WindowError::UnknownBinding(id))?;
        callback(args);
        Ok(())
    }

    /// `(id, name)` pairs in id order.
    pub fn entries(&self) -> Vec<(u32, String)> {
        self.lock()
            .bindings
            .iter()
            .map(|(id, b)| (*id, b.name.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().bindings.is_empty()
    }

    /// Drop every callback. The id counter keeps counting.
    pub fn clear(&self) {
        self.lock().bindings.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::spawn_writer;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncBufReadExt, BufReader};
    use viewpipe_common::WindowId;

    #[tokio::test]
    async fn ids_start_at_zero_and_increase() {
        let (host, native) = tokio::io::duplex(1024);
        let (commands, _task) = spawn_writer(host, WindowId::new());
        let registry = BindingRegistry::new();

        assert_eq!(registry.bind("a", |_| {}, &commands).unwrap(), 0);
        assert_eq!(registry.bind("b", |_| {}, &commands).unwrap(), 1);
        assert_eq!(registry.bind("a", |_| {}, &commands).unwrap(), 2);

        let mut lines = BufReader::new(native).lines();
        for expected in ["0:a", "1:b", "2:a"] {
            let line = lines.next_line().await.unwrap().unwrap();
            assert_eq!(line, format!("{{\"type\":\"bind\",\"data\":\"{expected}\"}}"));
        }
    }

    #[tokio::test]
    async fn registries_count_independently() {
        let (host, _native) = tokio::io::duplex(1024);
        let (commands, _task) = spawn_writer(host, WindowId::new());
        let first = BindingRegistry::new();
        let second = BindingRegistry::new();

        first.bind("x", |_| {}, &commands).unwrap();
        first.bind("y", |_| {}, &commands).unwrap();
        assert_eq!(second.bind("z", |_| {}, &commands).unwrap(), 0);
    }

    #[test]
    fn invoke_passes_args_once() {
        let registry = BindingRegistry::new();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let c = Arc::clone(&calls);
        let id = registry.register(
            "sum".into(),
            Arc::new(move |args: &[Value]| c.lock().unwrap().push(args.to_vec())),
        );

        registry
            .invoke(id, &[json!(1), json!(2), json!(3)])
            .unwrap();
        assert_eq!(
            *calls.lock().unwrap(),
            vec![vec![json!(1), json!(2), json!(3)]]
        );
    }

    #[test]
    fn unknown_id_is_an_error() {
        let registry = BindingRegistry::new();
        registry.register("f".into(), Arc::new(|_: &[Value]| {}));
        let err = registry.invoke(7, &[]).unwrap_err();
        assert!(matches!(err, WindowError::UnknownBinding(7)));
    }

    #[test]
    fn clear_keeps_counter() {
        let registry = BindingRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let id = registry.register(
            "f".into(),
            Arc::new(move |_: &[Value]| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        );
        registry.clear();

        assert!(registry.is_empty());
        assert!(matches!(
            registry.invoke(id, &[]),
            Err(WindowError::UnknownBinding(0))
        ));
        assert_eq!(registry.register("g".into(), Arc::new(|_: &[Value]| {})), 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn entries_are_in_id_order() {
        let registry = BindingRegistry::new();
        registry.register("b".into(), Arc::new(|_: &[Value]| {}));
        registry.register("a".into(), Arc::new(|_: &[Value]| {}));
        assert_eq!(
            registry.entries(),
            vec![(0, "b".to_string()), (1, "a".to_string())]
        );
        assert_eq!(registry.len(), 2);
    }
}
