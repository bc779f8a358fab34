use thiserror::Error;

use crate::model::{Lesson, Question};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderingError {
    #[error("index {index} is out of range for {len} items")]
    OutOfRange { index: usize, len: usize },
}

/// Items with an ordinal position that drag-and-drop can renumber.
pub trait Positioned {
    fn set_position(&mut self, position: u32);
}

impl Positioned for Lesson {
    fn set_position(&mut self, position: u32) {
        Lesson::set_position(self, position);
    }
}

impl Positioned for Question {
    fn set_position(&mut self, position: u32) {
        self.position = position;
    }
}

/// Move the item at `from` to `to` and renumber every position from 0.
///
/// The list is rebuilt and swapped in as a whole; on error it is left untouched.
///
/// # Errors
///
/// Returns `OrderingError::OutOfRange` if either index is past the end.
pub fn reorder<T: Positioned>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), OrderingError> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(OrderingError::OutOfRange { index, len });
        }
    }

    let mut next = std::mem::take(items);
    let moved = next.remove(from);
    next.insert(to, moved);
    renumber(&mut next);
    *items = next;
    Ok(())
}

/// Assign positions `0..n` in list order.
pub fn renumber<T: Positioned>(items: &mut [T]) {
    for (position, item) in (0u32..).zip(items.iter_mut()) {
        item.set_position(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LessonDraft, LessonId, LessonKind, SectionId};
    use crate::time::fixed_now;

    fn lessons(n: u64) -> Vec<Lesson> {
        (0..n)
            .map(|i| {
                LessonDraft::new(SectionId::new(1), format!("L{i}"), LessonKind::Video)
                    .validate(fixed_now())
                    .unwrap()
                    .assign_id(LessonId::new(i + 1), u32::try_from(i).unwrap() * 10)
            })
            .collect()
    }

    #[test]
    fn moving_down_renumbers_positions() {
        let mut items = lessons(4);
        reorder(&mut items, 0, 2).unwrap();

        let titles: Vec<_> = items.iter().map(Lesson::title).collect();
        assert_eq!(titles, ["L1", "L2", "L0", "L3"]);
        let positions: Vec<_> = items.iter().map(Lesson::position).collect();
        assert_eq!(positions, [0, 1, 2, 3]);
    }

    #[test]
    fn moving_up_keeps_other_items_in_order() {
        let mut items = lessons(3);
        reorder(&mut items, 2, 0).unwrap();
        let ids: Vec<_> = items.iter().map(|l| l.id().value()).collect();
        assert_eq!(ids, [3, 1, 2]);
    }

    #[test]
    fn out_of_range_leaves_list_untouched() {
        let mut items = lessons(2);
        let before = items.clone();
        assert_eq!(
            reorder(&mut items, 0, 5),
            Err(OrderingError::OutOfRange { index: 5, len: 2 })
        );
        assert_eq!(items, before);
    }
}
