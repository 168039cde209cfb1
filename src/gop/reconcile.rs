/// What [`reconcile_frame_counts`] did to the segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAdjustment {
    Unchanged,
    /// Surplus frames added to the last segment.
    Appended(usize),
    /// Frames removed walking backwards from the last segment.
    Trimmed { requested: usize, removed: usize },
}

/// Makes per-phone frame counts add up to the observed number of feature frames.
///
/// A surplus goes entirely to the last segment. A deficit is taken from the last segment
/// first, then from earlier ones, never below zero; segments before the one that absorbs
/// the remainder are untouched.
pub fn reconcile_frame_counts(frame_counts: &mut [usize], observed_total: usize) -> FrameAdjustment {
    let total: usize = frame_counts.iter().sum();

    if observed_total > total {
        let surplus = observed_total - total;
        let Some(last) = frame_counts.last_mut() else {
            return FrameAdjustment::Unchanged;
        };
        *last += surplus;
        tracing::info!(frames = surplus, "append frames to the end of the segmentation");
        return FrameAdjustment::Appended(surplus);
    }

    if observed_total < total {
        let requested = total - observed_total;
        tracing::info!(frames = requested, "remove frames from the end of the segmentation");
        let mut deficit = requested;
        for count in frame_counts.iter_mut().rev() {
            if deficit == 0 {
                break;
            }
            let taken = (*count).min(deficit);
            *count -= taken;
            deficit -= taken;
        }
        return FrameAdjustment::Trimmed {
            requested,
            removed: requested - deficit,
        };
    }

    FrameAdjustment::Unchanged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deficit_absorbed_by_last_segment() {
        let mut counts = vec![3, 4, 3];
        let adj = reconcile_frame_counts(&mut counts, 8);
        assert_eq!(counts, vec![3, 4, 1]);
        assert_eq!(
            adj,
            FrameAdjustment::Trimmed {
                requested: 2,
                removed: 2
            }
        );
    }

    #[test]
    fn deficit_spans_multiple_segments() {
        let mut counts = vec![3, 4, 3];
        reconcile_frame_counts(&mut counts, 3);
        assert_eq!(counts, vec![3, 0, 0]);
    }

    #[test]
    fn surplus_appended_to_last_segment() {
        let mut counts = vec![3, 4, 3];
        let adj = reconcile_frame_counts(&mut counts, 12);
        assert_eq!(counts, vec![3, 4, 5]);
        assert_eq!(adj, FrameAdjustment::Appended(2));
    }

    #[test]
    fn matching_total_is_left_alone() {
        let mut counts = vec![2, 0, 5];
        assert_eq!(reconcile_frame_counts(&mut counts, 7), FrameAdjustment::Unchanged);
        assert_eq!(counts, vec![2, 0, 5]);
    }

    #[test]
    fn zero_observed_frames_clears_everything() {
        let mut counts = vec![3, 4, 3];
        reconcile_frame_counts(&mut counts, 0);
        assert_eq!(counts, vec![0, 0, 0]);
    }

    #[test]
    fn trailing_zero_segments_are_skipped_over() {
        let mut counts = vec![5, 3, 0];
        reconcile_frame_counts(&mut counts, 6);
        assert_eq!(counts, vec![5, 1, 0]);
    }

    #[test]
    fn empty_segmentation_has_nowhere_to_put_frames() {
        let mut counts: Vec<usize> = Vec::new();
        assert_eq!(reconcile_frame_counts(&mut counts, 4), FrameAdjustment::Unchanged);
        assert!(counts.is_empty());
    }
}
