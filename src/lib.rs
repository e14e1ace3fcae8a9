pub mod backup;
pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod profile;
pub mod routine;
pub mod session;
pub mod settings;
pub mod store;
pub mod tasks;
pub mod tui;
pub mod utils;
pub mod view;

pub use config::Config;
pub use models::{NewTask, Notification, NotificationKind, Priority, Task, TaskPatch, UserPatch, UserProfile};
pub use routine::Routine;
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
pub use utils::{Clock, FixedClock, Profile, SystemClock};
