//! Scene navigation state machine
//!
//! Tracks which scene is active. Transitions return `true` only when the
//! active scene actually changed; refused transitions leave the state alone.

use serde::Serialize;
use std::fmt;

/// The active view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "index", rename_all = "snake_case")]
pub enum View {
    Truck(usize),
    Unplaced,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Truck(i) => write!(f, "truck {}", i),
            View::Unplaced => f.write_str("unplaced items"),
        }
    }
}

/// UI controls that should be visible for a given view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Affordances {
    /// Previous/next truck and "view unplaced"
    pub truck_controls: bool,
    /// "Back to trucks"
    pub unplaced_controls: bool,
}

impl Affordances {
    pub fn for_view(view: View) -> Self {
        match view {
            View::Truck(_) => Self {
                truck_controls: true,
                unplaced_controls: false,
            },
            View::Unplaced => Self {
                truck_controls: false,
                unplaced_controls: true,
            },
        }
    }
}

impl Default for Affordances {
    fn default() -> Self {
        Self::for_view(View::Truck(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    truck_count: usize,
    view: View,
}

impl NavigationState {
    /// State right after loading `truck_count` truck scenes
    pub fn new(truck_count: usize) -> Self {
        Self {
            truck_count,
            view: View::Truck(0),
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Number of truck scenes; unchanged while the unplaced view is open
    pub fn truck_count(&self) -> usize {
        self.truck_count
    }

    /// Index into the scene list, with the unplaced scene appended last
    pub fn active_scene_index(&self) -> usize {
        match self.view {
            View::Truck(i) => i,
            View::Unplaced => self.truck_count,
        }
    }

    pub fn next(&mut self) -> bool {
        match self.view {
            View::Truck(i) if i + 1 < self.truck_count => {
                self.view = View::Truck(i + 1);
                true
            }
            _ => false,
        }
    }

    pub fn previous(&mut self) -> bool {
        match self.view {
            View::Truck(i) if i > 0 => {
                self.view = View::Truck(i - 1);
                true
            }
            _ => false,
        }
    }

    /// Switch to the unplaced view; refused if it is already active
    pub fn enter_unplaced(&mut self) -> bool {
        if self.view == View::Unplaced {
            return false;
        }
        self.view = View::Unplaced;
        true
    }

    /// Return to the first truck
    ///
    /// Returns whether the active view changed. Calling this from a truck
    /// view other than the first still rewinds to truck 0.
    pub fn show_trucks(&mut self) -> bool {
        let changed = self.view != View::Truck(0);
        self.view = View::Truck(0);
        changed
    }

    pub fn affordances(&self) -> Affordances {
        Affordances::for_view(self.view)
    }
}
