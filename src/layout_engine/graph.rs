use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Steps `i` one slot with wraparound. `len` must be non-zero.
    pub fn step(&self, i: usize, len: usize) -> usize {
        match *self {
            Direction::Left => (i + len - 1) % len,
            Direction::Right => (i + 1) % len,
        }
    }

    /// Like [`Direction::step`], but from an unset cursor: right lands on the
    /// first slot and left on the last. Returns `None` only when `len == 0`.
    pub fn step_from(&self, cursor: Option<usize>, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(match cursor {
            Some(i) => self.step(i.min(len - 1), len),
            None => match self {
                Direction::Left => len - 1,
                Direction::Right => 0,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_wraps_at_both_ends() {
        assert_eq!(Direction::Left.step(0, 4), 3);
        assert_eq!(Direction::Right.step(3, 4), 0);
        assert_eq!(Direction::Right.step(1, 4), 2);
    }

    #[test]
    fn step_from_unset_cursor() {
        assert_eq!(Direction::Right.step_from(None, 3), Some(0));
        assert_eq!(Direction::Left.step_from(None, 3), Some(2));
        assert_eq!(Direction::Left.step_from(None, 0), None);
    }

    #[test]
    fn single_item_stays_put() {
        assert_eq!(Direction::Left.step_from(Some(0), 1), Some(0));
        assert_eq!(Direction::Right.step_from(Some(0), 1), Some(0));
    }

    #[test]
    fn parses_snake_case() {
        assert_eq!("left".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!(Direction::Right.to_string(), "right");
    }
}
