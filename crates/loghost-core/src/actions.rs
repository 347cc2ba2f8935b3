/// The four control-plane actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Spawn,
    Start,
    Status,
    Stop,
}

impl Action {
    pub fn keyword(&self) -> &'static str {
        match self {
            Action::Spawn => "spawn",
            Action::Start => "start",
            Action::Status => "status",
            Action::Stop => "stop",
        }
    }
}

/// Action lookup table, sorted lexicographically by keyword. Sortedness is a
/// build invariant, asserted in debug builds and pinned by a test.
pub const ACTION_TABLE: &[(&str, Action)] = &[
    ("spawn", Action::Spawn),
    ("start", Action::Start),
    ("status", Action::Status),
    ("stop", Action::Stop),
];

/// Resolve an action keyword via binary search over the static table.
pub fn find_action(keyword: &str) -> Option<Action> {
    debug_assert!(ACTION_TABLE.windows(2).all(|pair| pair[0].0 < pair[1].0));
    ACTION_TABLE
        .binary_search_by(|entry| entry.0.cmp(&keyword))
        .ok()
        .map(|index| ACTION_TABLE[index].1)
}
