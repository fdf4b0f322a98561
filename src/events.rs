use serde::{Deserialize, Serialize};

/// A horizontal gene transfer between two branches of the tree.
///
/// Produced by external reconciliation/simulation parsers. `from` and
/// `to` are node names resolved against the tree at draw time; records
/// naming unknown nodes are skipped, not errors. `time`, when present,
/// is in the same units as branch lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    #[serde(default)]
    pub family: Option<String>,
    pub from: String,
    pub to: String,
    #[serde(default = "default_freq")]
    pub freq: f64,
    #[serde(default)]
    pub time: Option<f64>,
}

fn default_freq() -> f64 {
    1.0
}

/// A point event (duplication, loss, speciation, ...) on one branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub family: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub node: String,
    #[serde(default)]
    pub time: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_defaults() {
        let record: TransferRecord =
            serde_json::from_str(r#"{"from": "A", "to": "C"}"#).unwrap();
        assert_eq!(record.freq, 1.0);
        assert_eq!(record.time, None);
        assert_eq!(record.family, None);
    }

    #[test]
    fn test_transfer_full() {
        let record: TransferRecord = serde_json::from_str(
            r#"{"family": "fam1", "from": "A", "to": "C", "freq": 0.5, "time": 1.25}"#,
        )
        .unwrap();
        assert_eq!(record.family.as_deref(), Some("fam1"));
        assert_eq!(record.time, Some(1.25));
    }

    #[test]
    fn test_event_kind_field() {
        let record: EventRecord =
            serde_json::from_str(r#"{"type": "D", "node": "n3", "time": 0.8}"#).unwrap();
        assert_eq!(record.kind, "D");
        assert_eq!(record.node, "n3");
    }
}
