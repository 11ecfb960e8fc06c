use serde::Serialize;

/// One seat parsed out of a window fragment. Rebuilt on every fetch,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Seat {
    pub number: u32,
    pub element_id: String,
    pub available: bool,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("No seats available")]
pub struct NoSeatsAvailable;

/// Picks the seat to submit: the first priority entry that is free, else
/// the first free seat in fragment order. Fragment order is the tie-break
/// and is never re-sorted.
pub fn select_seat<'a>(seats: &'a [Seat], priority: &[u32]) -> Result<&'a Seat, NoSeatsAvailable> {
    let available: Vec<&'a Seat> = seats.iter().filter(|seat| seat.available).collect();
    if available.is_empty() {
        return Err(NoSeatsAvailable);
    }

    for number in priority {
        if let Some(seat) = available.iter().find(|seat| seat.number == *number) {
            return Ok(seat);
        }
    }

    Ok(available[0])
}
