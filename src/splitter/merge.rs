/*!
Merging pieces back together into the largest chunk that fits.
*/

use std::iter::once;

use crate::TryChunkSizer;

/// Seed for the running ratio between characters and tokens, only used to pick
/// the first prefix to measure. Every measurement replaces it with characters
/// per token.
const INITIAL_AVERAGE: f64 = 0.2;

/// Prefix sums of the character length of each piece, starting at zero. The
/// total is repeated at the end so the search window can reach one past the
/// last piece.
fn cumulative_lengths(pieces: &[&str]) -> Vec<usize> {
    let mut lengths = once(0)
        .chain(pieces.iter().scan(0, |total, piece| {
            *total += piece.chars().count();
            Some(*total)
        }))
        .collect::<Vec<_>>();
    lengths.push(lengths[lengths.len() - 1]);
    lengths
}

/// Merge pieces until the chunk size is reached, returning the index of the
/// last piece included in the merged chunk along with the merged chunk itself.
///
/// Rather than measuring every possible prefix, this keeps a running estimate
/// of characters per token. Each iteration jumps to the prefix whose character
/// length matches the estimated budget, measures it, refines the estimate, and
/// narrows the search window. The number of sizer calls grows logarithmically
/// with the number of pieces.
///
/// At least one piece is always returned, even if it is larger than the chunk
/// size on its own.
///
/// ```
/// use semchunk::{merge_splits, Characters};
///
/// let (last, chunk) = merge_splits(&["ab", "cd", "ef"], 5, " ", &Characters).unwrap();
/// assert_eq!(last, 1);
/// assert_eq!(chunk, "ab cd");
/// ```
///
/// # Errors
///
/// Returns the sizer's error as soon as it fails.
#[allow(clippy::cast_precision_loss)]
pub fn merge_splits<Sizer>(
    pieces: &[&str],
    chunk_size: usize,
    delimiter: &str,
    sizer: &Sizer,
) -> Result<(usize, String), Sizer::Error>
where
    Sizer: TryChunkSizer + ?Sized,
{
    if pieces.is_empty() {
        return Ok((0, String::new()));
    }

    let cumulative_lengths = cumulative_lengths(pieces);
    let mut average = INITIAL_AVERAGE;
    let mut low = 0;
    let mut high = pieces.len() + 1;

    while low < high {
        let target = chunk_size as f64 * average;
        let offset =
            cumulative_lengths[low..=high].partition_point(|&length| (length as f64) < target);
        let midpoint = (low + offset).min(high - 1);

        let tokens = sizer.try_size(&pieces[..midpoint].join(delimiter))?;

        if cumulative_lengths[midpoint] > 0 && tokens > 0 {
            average = cumulative_lengths[midpoint] as f64 / tokens as f64;
        }

        if tokens > chunk_size {
            high = midpoint;
        } else {
            low = midpoint + 1;
        }
    }

    let count = low.saturating_sub(1).max(1);
    Ok((count - 1, pieces[..count].join(delimiter)))
}
