use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::config::load_json;
use crate::error::GopError;
use crate::types::{PdfId, PhoneId, StateId, SubStateClass};

/// Number of pdf classes (emitting HMM states) for one phone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TopologyEntry {
    pub phone: PhoneId,
    pub num_pdf_classes: usize,
}

/// One transition out of an HMM state. Its index in the table is its `StateId`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TransitionEntry {
    pub phone: PhoneId,
    pub hmm_state: SubStateClass,
    pub pdf: PdfId,
    pub self_loop: bool,
    pub log_prob: f32,
}

#[derive(Debug, Deserialize)]
struct RawTransitionModel {
    phones: Vec<PhoneId>,
    num_pdfs: usize,
    topology: Vec<TopologyEntry>,
    transitions: Vec<TransitionEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TransitionKey {
    phone: PhoneId,
    hmm_state: SubStateClass,
    pdf: PdfId,
    self_loop: bool,
}

/// Phone inventory, HMM topology and transition table of the acoustic model.
#[derive(Debug, Clone)]
pub struct TransitionModel {
    phones: Vec<PhoneId>,
    num_pdfs: usize,
    pdf_classes: HashMap<PhoneId, usize>,
    transitions: Vec<TransitionEntry>,
    index: HashMap<TransitionKey, StateId>,
}

impl TransitionModel {
    pub fn new(
        phones: Vec<PhoneId>,
        num_pdfs: usize,
        topology: Vec<TopologyEntry>,
        transitions: Vec<TransitionEntry>,
    ) -> Result<Self, GopError> {
        if phones.is_empty() {
            return Err(GopError::configuration("phone inventory is empty"));
        }

        let mut pdf_classes = HashMap::with_capacity(topology.len());
        for entry in &topology {
            if entry.num_pdf_classes == 0 {
                return Err(GopError::configuration(format!(
                    "phone {} has no pdf classes",
                    entry.phone
                )));
            }
            if pdf_classes
                .insert(entry.phone, entry.num_pdf_classes)
                .is_some()
            {
                return Err(GopError::configuration(format!(
                    "duplicate topology entry for phone {}",
                    entry.phone
                )));
            }
        }
        if let Some(phone) = phones.iter().find(|p| !pdf_classes.contains_key(p)) {
            return Err(GopError::configuration(format!(
                "phone {phone} has no topology entry"
            )));
        }

        let mut index = HashMap::with_capacity(transitions.len());
        for (tid, t) in transitions.iter().enumerate() {
            let classes = pdf_classes.get(&t.phone).copied().ok_or_else(|| {
                GopError::configuration(format!(
                    "transition {tid} refers to unknown phone {}",
                    t.phone
                ))
            })?;
            if t.hmm_state >= classes {
                return Err(GopError::configuration(format!(
                    "transition {tid}: hmm state {} out of range for phone {} ({classes} classes)",
                    t.hmm_state, t.phone
                )));
            }
            if t.pdf as usize >= num_pdfs {
                return Err(GopError::configuration(format!(
                    "transition {tid}: pdf {} >= num_pdfs {num_pdfs}",
                    t.pdf
                )));
            }
            let key = TransitionKey {
                phone: t.phone,
                hmm_state: t.hmm_state,
                pdf: t.pdf,
                self_loop: t.self_loop,
            };
            index.insert(key, tid as StateId);
        }

        Ok(Self {
            phones,
            num_pdfs,
            pdf_classes,
            transitions,
            index,
        })
    }

    pub fn load(path: &Path) -> Result<Self, GopError> {
        let raw: RawTransitionModel =
            load_json(path, "read transition model", "parse transition model")?;
        Self::new(raw.phones, raw.num_pdfs, raw.topology, raw.transitions)
    }

    /// Phone inventory swept by the GOP denominator.
    pub fn phones(&self) -> &[PhoneId] {
        &self.phones
    }

    pub fn num_pdfs(&self) -> usize {
        self.num_pdfs
    }

    pub fn num_pdf_classes(&self, phone: PhoneId) -> Option<usize> {
        self.pdf_classes.get(&phone).copied()
    }

    pub fn num_transition_ids(&self) -> usize {
        self.transitions.len()
    }

    pub fn entry(&self, tid: StateId) -> Option<&TransitionEntry> {
        self.transitions.get(tid as usize)
    }

    pub fn transition_id_to_pdf(&self, tid: StateId) -> Option<PdfId> {
        self.entry(tid).map(|t| t.pdf)
    }

    pub fn transition_id_to_phone(&self, tid: StateId) -> Option<PhoneId> {
        self.entry(tid).map(|t| t.phone)
    }

    /// True for the forward transition leaving a phone's last HMM state.
    pub fn is_final(&self, tid: StateId) -> bool {
        self.entry(tid).is_some_and(|t| {
            !t.self_loop
                && self
                    .num_pdf_classes(t.phone)
                    .is_some_and(|n| t.hmm_state + 1 == n)
        })
    }

    pub fn transition_id(
        &self,
        phone: PhoneId,
        hmm_state: SubStateClass,
        pdf: PdfId,
        self_loop: bool,
    ) -> Option<StateId> {
        self.index
            .get(&TransitionKey {
                phone,
                hmm_state,
                pdf,
                self_loop,
            })
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(phone: PhoneId, hmm_state: usize, pdf: PdfId, self_loop: bool) -> TransitionEntry {
        TransitionEntry {
            phone,
            hmm_state,
            pdf,
            self_loop,
            log_prob: (0.5f32).ln(),
        }
    }

    fn two_state_model() -> TransitionModel {
        TransitionModel::new(
            vec![1, 2],
            3,
            vec![
                TopologyEntry {
                    phone: 1,
                    num_pdf_classes: 1,
                },
                TopologyEntry {
                    phone: 2,
                    num_pdf_classes: 2,
                },
            ],
            vec![
                entry(1, 0, 0, true),
                entry(1, 0, 0, false),
                entry(2, 0, 1, true),
                entry(2, 0, 1, false),
                entry(2, 1, 2, true),
                entry(2, 1, 2, false),
            ],
        )
        .expect("valid model")
    }

    #[test]
    fn lookups_follow_table_order() {
        let tm = two_state_model();
        assert_eq!(tm.num_transition_ids(), 6);
        assert_eq!(tm.transition_id_to_pdf(4), Some(2));
        assert_eq!(tm.transition_id_to_phone(4), Some(2));
        assert_eq!(tm.transition_id(2, 1, 2, false), Some(5));
        assert_eq!(tm.transition_id(2, 1, 1, false), None);
        assert_eq!(tm.num_pdf_classes(2), Some(2));
        assert_eq!(tm.num_pdf_classes(9), None);
    }

    #[test]
    fn only_exit_of_last_state_is_final() {
        let tm = two_state_model();
        assert!(tm.is_final(1));
        assert!(!tm.is_final(0));
        assert!(!tm.is_final(3));
        assert!(tm.is_final(5));
        assert!(!tm.is_final(99));
    }

    #[test]
    fn rejects_pdf_out_of_range() {
        let result = TransitionModel::new(
            vec![1],
            1,
            vec![TopologyEntry {
                phone: 1,
                num_pdf_classes: 1,
            }],
            vec![entry(1, 0, 4, true)],
        );
        assert!(matches!(result, Err(GopError::Configuration { .. })));
    }

    #[test]
    fn rejects_phone_without_topology() {
        let result = TransitionModel::new(
            vec![1, 2],
            1,
            vec![TopologyEntry {
                phone: 1,
                num_pdf_classes: 1,
            }],
            vec![entry(1, 0, 0, true)],
        );
        assert!(matches!(result, Err(GopError::Configuration { .. })));
    }

    #[test]
    fn load_parses_json_model() {
        let path = std::env::temp_dir().join("dnn_gop_transition_model.json");
        let json = r#"{
            "phones": [1],
            "num_pdfs": 1,
            "topology": [{"phone": 1, "num_pdf_classes": 1}],
            "transitions": [
                {"phone": 1, "hmm_state": 0, "pdf": 0, "self_loop": true, "log_prob": -0.69},
                {"phone": 1, "hmm_state": 0, "pdf": 0, "self_loop": false, "log_prob": -0.69}
            ]
        }"#;
        std::fs::write(&path, json).expect("write model");
        let tm = TransitionModel::load(&path).expect("load model");
        assert_eq!(tm.phones(), &[1]);
        assert_eq!(tm.num_transition_ids(), 2);
        assert!(tm.is_final(1));
        let _ = std::fs::remove_file(&path);
    }
}
