//! In-place range shifting, the compactor behind every structural change.
//!
//! Growing a queue opens a gap by sliding every later byte toward the end
//! of the buffer; shrinking or destroying one closes the gap by sliding
//! them back. Source and destination overlap in both cases, so the copy
//! order is fixed by direction:
//!
//! - [`Direction::Right`] (destination above source): far end first.
//! - [`Direction::Left`] (destination below source): near end first.
//!
//! Bytes move a storage word ([`WORD`]) at a time, with a byte-wise
//! remainder at the trailing end of the walk. Each word is read whole before
//! it is written, and the walk never revisits a source byte it has already
//! overwritten, so any shift width is safe.

/// Bytes moved per copy step.
pub const WORD: usize = std::mem::size_of::<u32>();

/// Which way a range moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Toward higher offsets. Copies high-to-low.
    Right,
    /// Toward lower offsets. Copies low-to-high.
    Left,
}

impl Direction {
    /// Direction of a move from `src` to `dst`, or `None` if they coincide.
    pub fn of(src: usize, dst: usize) -> Option<Self> {
        match dst.cmp(&src) {
            std::cmp::Ordering::Greater => Some(Self::Right),
            std::cmp::Ordering::Less => Some(Self::Left),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Move `len` bytes from `src` to `dst` within `buf`.
///
/// Bytes of the source range not covered by the destination keep their old
/// values.
///
/// # Panics
///
/// Panics if either range extends past the end of `buf`.
pub fn shift_range(buf: &mut [u8], src: usize, dst: usize, len: usize) {
    let reach = src.max(dst).checked_add(len);
    assert!(
        reach.is_some_and(|end| end <= buf.len()),
        "shift of {len} bytes from {src} to {dst} exceeds buffer of {}",
        buf.len()
    );
    if len == 0 {
        return;
    }
    match Direction::of(src, dst) {
        Some(Direction::Right) => copy_descending(buf, src, dst, len),
        Some(Direction::Left) => copy_ascending(buf, src, dst, len),
        None => {}
    }
}

/// Open a `width`-byte gap at `at` by moving `[at, end)` right.
///
/// The gap's old contents are left in place; callers overwrite them.
///
/// # Panics
///
/// Panics if `at > end` or `end + width` exceeds the buffer.
pub fn open_gap(buf: &mut [u8], at: usize, end: usize, width: usize) {
    assert!(at <= end, "gap start {at} is past range end {end}");
    shift_range(buf, at, at + width, end - at);
}

/// Close the `width`-byte gap at `at` by moving `[at + width, end)` left.
///
/// # Panics
///
/// Panics if `at + width > end` or `end` exceeds the buffer.
pub fn close_gap(buf: &mut [u8], at: usize, end: usize, width: usize) {
    assert!(
        at + width <= end,
        "gap [{at}, {}) extends past range end {end}",
        at + width
    );
    shift_range(buf, at + width, at, end - at - width);
}

fn copy_word(buf: &mut [u8], src: usize, dst: usize) {
    let mut word = [0u8; WORD];
    word.copy_from_slice(&buf[src..src + WORD]);
    buf[dst..dst + WORD].copy_from_slice(&word);
}

fn copy_descending(buf: &mut [u8], src: usize, dst: usize, len: usize) {
    let mut remaining = len;
    while remaining >= WORD {
        remaining -= WORD;
        copy_word(buf, src + remaining, dst + remaining);
    }
    while remaining > 0 {
        remaining -= 1;
        buf[dst + remaining] = buf[src + remaining];
    }
}

fn copy_ascending(buf: &mut [u8], src: usize, dst: usize, len: usize) {
    let mut done = 0;
    while len - done >= WORD {
        copy_word(buf, src + done, dst + done);
        done += WORD;
    }
    while done < len {
        buf[dst + done] = buf[src + done];
        done += 1;
    }
}
