use crate::error::GopError;
use crate::model::transition::TransitionModel;
use crate::types::{PhoneId, Segment, StateId, BOUNDARY_PHONE};

/// Zips phones with their frame counts; edge neighbours are the boundary phone.
pub fn build_segments(phones: &[PhoneId], frame_counts: &[usize]) -> Result<Vec<Segment>, GopError> {
    if phones.len() != frame_counts.len() {
        return Err(GopError::invalid_input(format!(
            "{} phones but {} frame counts",
            phones.len(),
            frame_counts.len()
        )));
    }
    let mut start_frame = 0usize;
    let segments: Vec<Segment> = phones
        .iter()
        .zip(frame_counts)
        .enumerate()
        .map(|(i, (&phone, &frame_count))| {
            let segment = Segment {
                phone,
                left_context: neighbour(phones, i.checked_sub(1)),
                right_context: neighbour(phones, Some(i + 1)),
                start_frame,
                frame_count,
            };
            start_frame += frame_count;
            segment
        })
        .collect();
    Ok(segments)
}

/// Splits a frame-level state path into phone occurrences.
///
/// A new occurrence starts when the phone changes or right after a phone-exit transition,
/// so repeated adjacent phones stay separate.
pub fn segments_from_alignment(alignment: &[StateId], transitions: &TransitionModel) -> Vec<Segment> {
    let mut runs: Vec<(PhoneId, usize, usize)> = Vec::new();
    let mut prev_exited = true;
    for (frame, &tid) in alignment.iter().enumerate() {
        let phone = transitions
            .transition_id_to_phone(tid)
            .unwrap_or(BOUNDARY_PHONE);
        match runs.last_mut() {
            Some((last_phone, _, count)) if *last_phone == phone && !prev_exited => *count += 1,
            _ => runs.push((phone, frame, 1)),
        }
        prev_exited = transitions.is_final(tid);
    }

    let phones: Vec<PhoneId> = runs.iter().map(|&(phone, _, _)| phone).collect();
    runs.iter()
        .enumerate()
        .map(|(i, &(phone, start_frame, frame_count))| Segment {
            phone,
            left_context: neighbour(&phones, i.checked_sub(1)),
            right_context: neighbour(&phones, Some(i + 1)),
            start_frame,
            frame_count,
        })
        .collect()
}

fn neighbour(phones: &[PhoneId], index: Option<usize>) -> PhoneId {
    index
        .and_then(|i| phones.get(i))
        .copied()
        .unwrap_or(BOUNDARY_PHONE)
}
