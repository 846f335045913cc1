use crate::models::sample::BinaryState;

/// Fixed two-slot window over the binary channel, oldest first.
///
/// Pushing a value drops the oldest slot; capacity never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleWindow {
    slots: [BinaryState; 2],
}

impl CycleWindow {
    /// A window whose both slots hold `state`, so it shows no transition.
    pub fn seeded(state: BinaryState) -> Self {
        Self { slots: [state, state] }
    }

    /// Shift left and append `state` as the newest slot.
    pub fn push(&mut self, state: BinaryState) {
        self.slots = [self.slots[1], state];
    }

    pub fn oldest(&self) -> BinaryState {
        self.slots[0]
    }

    pub fn newest(&self) -> BinaryState {
        self.slots[1]
    }

    pub fn has_transition(&self) -> bool {
        self.slots[0] != self.slots[1]
    }
}

/// Counts cycles as transitions on the binary channel.
///
/// The window is seeded from the first real observation, so the initial
/// level never registers as a transition whatever it is.
#[derive(Debug, Clone, Default)]
pub struct CycleDetector {
    window: Option<CycleWindow>,
    count: u64,
}

impl CycleDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one reading. Returns `true` if it differs from the previous one.
    pub fn observe(&mut self, state: BinaryState) -> bool {
        let mut window = match self.window {
            Some(window) => window,
            None => {
                self.window = Some(CycleWindow::seeded(state));
                return false;
            }
        };

        window.push(state);
        self.window = Some(window);
        if window.has_transition() {
            self.count += 1;
            true
        } else {
            false
        }
    }

    /// Transitions counted so far. Never decreases.
    pub fn current_count(&self) -> u64 {
        self.count
    }

    pub fn window(&self) -> Option<CycleWindow> {
        self.window
    }

    pub fn last_state(&self) -> Option<BinaryState> {
        self.window.map(|w| w.newest())
    }
}
