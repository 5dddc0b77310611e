use crate::cycle::CycleEvent;

/// Which pet sits on the desktop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BuddyKind {
    #[default]
    Cat,
    Dog,
    Cow,
}

impl BuddyKind {
    pub const ALL: [BuddyKind; 3] = [BuddyKind::Cat, BuddyKind::Dog, BuddyKind::Cow];

    pub fn label(self) -> &'static str {
        match self {
            BuddyKind::Cat => "Cat",
            BuddyKind::Dog => "Dog",
            BuddyKind::Cow => "Cow",
        }
    }

    /// Fill color of the placeholder picture.
    pub fn color(self) -> [u8; 3] {
        match self {
            BuddyKind::Cat => [150, 150, 150],
            BuddyKind::Dog => [0, 100, 0],
            BuddyKind::Cow => [100, 0, 100],
        }
    }
}

pub const FACE: &str = "^_^";

pub const GREETING: &str = "Hello there! I'm your Desktop Buddy.";
pub const CHECKING: &str = "Checking for old files...";
pub const SETTINGS_UPDATED: &str = "Settings updated!";
pub const KEPT: &str = "Okay, I'll keep them.";

/// What the buddy says after a step of the cycle.
pub fn speech_for(event: &CycleEvent) -> String {
    match event {
        CycleEvent::NoneFound => "All clear! No old files found.".to_string(),
        CycleEvent::AwaitingConfirmation(n) => format!("Hey! I found {n} old files."),
        CycleEvent::AutoDeleting(_) => "Automatically deleting old files...".to_string(),
        CycleEvent::Deleted(result) if result.succeeded > 0 => {
            format!("Deleted {} files for you!", result.succeeded)
        }
        CycleEvent::Deleted(_) => "No files were deleted.".to_string(),
    }
}
