pub(crate) mod keyboard;
pub(crate) mod listener;
pub(crate) mod watcher;
