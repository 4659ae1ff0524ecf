mod coordinator;
mod soundscape;

pub use coordinator::AudioCoordinator;
pub use soundscape::{NullSoundscape, RecordingSoundscape, SoundscapeControl};
