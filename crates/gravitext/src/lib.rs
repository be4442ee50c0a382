pub mod achievements;
pub mod api;
pub mod blocks;
pub mod challenges;
pub mod commands;
pub mod core;
pub mod events;
pub mod gravitext;
pub mod input;
pub mod modes;
pub mod relations;
pub mod settings;
pub mod storage;

// Re-export key types at crate root for convenience
pub use achievements::{AchievementId, AchievementProgress, AchievementView, Achievements};
pub use api::game::{GameConfig, GameContext};
pub use api::types::{BlockId, GameEvent, Hsl, Sound, UnknownName};
pub use blocks::{BlockLabel, BlockManager, WordBlock};
pub use challenges::{Challenge, ChallengeCounters, ChallengeKind, ChallengeProgress, Challenges};
pub use commands::{command_words, Command};
pub use core::clock::{Clock, FixedClock, SystemClock};
pub use core::gravity::{GravityControl, GravityDirection};
pub use core::physics::{CollisionPair, PhysicsBody, PhysicsWorld};
pub use core::time::FixedTimestep;
pub use core::timers::{TimerId, TimerTask, Timers};
pub use events::{EventBus, SubscriberId};
pub use gravitext::{GameStats, Gravitext, Submission};
pub use input::queue::{InputEvent, InputQueue};
pub use modes::{Mode, ModeController};
pub use relations::{Relation, WordRelations};
pub use settings::AudioSettings;
pub use storage::{MemoryStorage, PersistError, Storage};
