//! Day-aware effort splitting
//!
//! Every day has the same length. A resource works from the start of each
//! day until `daily_capacity` units into it; the rest of the day is idle.
//! Effort that does not fit in the remaining window of the current day
//! continues at the start of the next day.

use loadsplit_core::Time;

/// One step of splitting a task's effort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    /// Start of the emitted segment
    pub start: Time,
    /// Exclusive end of the emitted segment
    pub end: Time,
    /// Where the resource's timeline continues
    pub next_cursor: Time,
}

impl Split {
    pub fn len(&self) -> Time {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// The complete split of one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLayout {
    /// `(start, end)` pieces in time order
    pub pieces: Vec<(Time, Time)>,
    /// Cursor after the last piece
    pub cursor: Time,
}

impl TaskLayout {
    /// End of the last piece
    pub fn finish(&self) -> Option<Time> {
        self.pieces.last().map(|&(_, end)| end)
    }
}

/// Start of the day containing `time`
pub fn day_start(time: Time, day_length: Time) -> Time {
    time - time.rem_euclid(day_length)
}

/// Working time still available on the day containing `cursor`.
///
/// Zero or negative once the cursor has reached the idle part of the day.
pub fn capacity_left(cursor: Time, daily_capacity: Time, day_length: Time) -> Time {
    daily_capacity - cursor.rem_euclid(day_length)
}

/// Emit the next segment for `remaining` units of effort starting at `cursor`.
///
/// A cursor sitting in the idle part of a day is first moved to the next day
/// start, so a segment is never empty. When the segment uses up the rest of
/// the day and effort remains, the returned cursor jumps to the next day.
///
/// Returns `None` when there is nothing to place or the calendar cannot hold
/// any work (`daily_capacity` not in `1..=day_length`).
pub fn split_next(
    cursor: Time,
    remaining: Time,
    daily_capacity: Time,
    day_length: Time,
) -> Option<Split> {
    if remaining <= 0 || day_length <= 0 || daily_capacity <= 0 || daily_capacity > day_length {
        return None;
    }

    let mut cursor = cursor;
    let mut left = capacity_left(cursor, daily_capacity, day_length);
    if left <= 0 {
        cursor = day_start(cursor, day_length) + day_length;
        left = daily_capacity;
    }

    let len = remaining.min(left);
    let end = cursor + len;
    let next_cursor = if len == left && remaining > len {
        day_start(cursor, day_length) + day_length
    } else {
        end
    };

    Some(Split {
        start: cursor,
        end,
        next_cursor,
    })
}

/// Split a whole task of `effort` units starting at `cursor`.
///
/// Returns an empty layout, with the cursor unchanged, when `split_next`
/// refuses the calendar.
pub fn split_effort(
    cursor: Time,
    effort: Time,
    daily_capacity: Time,
    day_length: Time,
) -> TaskLayout {
    let mut pieces = Vec::new();
    let mut cursor = cursor;
    let mut remaining = effort;

    while remaining > 0 {
        let Some(split) = split_next(cursor, remaining, daily_capacity, day_length) else {
            break;
        };
        pieces.push((split.start, split.end));
        remaining -= split.len();
        cursor = split.next_cursor;
    }

    TaskLayout { pieces, cursor }
}
