//! Previous/next file navigation for the viewer

use crate::api::Entry;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// First non-folder index at or after `from` going in `direction`.
/// `from` may already be outside the list (-1 or len), which gives `None`.
pub fn next_available(list: &[Entry], from: isize, direction: Direction) -> Option<usize> {
    let mut i = from;
    while i >= 0 && (i as usize) < list.len() {
        if !list[i as usize].folder {
            return Some(i as usize);
        }
        i += direction.step();
    }
    None
}

/// Selected index plus the nearest file on each side
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ViewerCursor {
    pub selected: usize,
    pub previous: Option<usize>,
    pub next: Option<usize>,
}

impl ViewerCursor {
    pub fn new(list: &[Entry], selected: usize) -> Self {
        let mut cursor = Self { selected, previous: None, next: None };
        cursor.switch_to(list, selected);
        cursor
    }

    /// Select `index` and recompute both neighbours
    pub fn switch_to(&mut self, list: &[Entry], index: usize) {
        let i = index as isize;
        self.selected = index;
        self.next = next_available(list, i + 1, Direction::Forward);
        self.previous = next_available(list, i - 1, Direction::Backward);
    }

    /// Move to the next file, if there is one
    pub fn forward(&mut self, list: &[Entry]) -> bool {
        match self.next {
            Some(i) => {
                self.switch_to(list, i);
                true
            }
            None => false,
        }
    }

    /// Move to the previous file, if there is one
    pub fn backward(&mut self, list: &[Entry]) -> bool {
        match self.previous {
            Some(i) => {
                self.switch_to(list, i);
                true
            }
            None => false,
        }
    }
}
