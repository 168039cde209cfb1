/// Phonetic unit identifier as used by the acoustic model's phone table.
pub type PhoneId = u32;

/// Acoustic state (pdf) identifier; the index the likelihood matrix is keyed by.
pub type PdfId = u32;

/// Transition-level state identifier. Many of these can share one pdf.
pub type StateId = u32;

/// Index of a sub-state within a phone's topology, in `[0, num_pdf_classes(phone))`.
pub type SubStateClass = usize;

/// Silence phone padded in as left context at utterance start and right context at the end.
pub const BOUNDARY_PHONE: PhoneId = 1;

/// Left/center/right phone window. The scored phone is always the center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhoneContext {
    pub left: PhoneId,
    pub center: PhoneId,
    pub right: PhoneId,
}

impl PhoneContext {
    pub const WIDTH: usize = 3;
    pub const CENTER_POSITION: usize = 1;

    pub fn new(left: PhoneId, center: PhoneId, right: PhoneId) -> Self {
        Self {
            left,
            center,
            right,
        }
    }

    /// Same left/right context with a different center phone.
    pub fn with_center(self, center: PhoneId) -> Self {
        Self { center, ..self }
    }

    pub fn window(&self) -> [PhoneId; 3] {
        [self.left, self.center, self.right]
    }
}

/// Contiguous frame span attributed to one phone occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub phone: PhoneId,
    pub left_context: PhoneId,
    pub right_context: PhoneId,
    pub start_frame: usize,
    pub frame_count: usize,
}

impl Segment {
    pub fn context(&self) -> PhoneContext {
        PhoneContext::new(self.left_context, self.phone, self.right_context)
    }

    /// Frame interval is [start_frame, end_frame), end exclusive.
    pub fn end_frame(&self) -> usize {
        self.start_frame + self.frame_count
    }
}

/// Externally segmented utterance: one frame count per phone occurrence.
#[derive(Debug, Clone, Default)]
pub struct GopInput {
    pub phones: Vec<PhoneId>,
    pub frame_counts: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GopOutput {
    pub phones: Vec<PhoneId>,
    /// One score per phone occurrence, in input order. Bounded above by 0.
    pub scores: Vec<f32>,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignedGopOutput {
    pub gop: GopOutput,
    /// Numerator log-likelihood per phone occurrence (not frame-normalized).
    pub phone_log_likelihoods: Vec<f32>,
    /// Best-path state id per frame.
    pub alignment: Vec<StateId>,
    /// `false` when the search ended without reaching a final graph state.
    pub reached_final: bool,
}
