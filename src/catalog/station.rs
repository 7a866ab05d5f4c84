use serde::{Deserialize, Serialize};

use crate::catalog::category::{BackendKind, MediaDescriptor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationCandidate {
    #[serde(rename = "stationuuid")]
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "url_resolved", default)]
    pub stream_url: String,
    #[serde(rename = "lastcheckok", default)]
    pub last_check_ok: u8,
    #[serde(default)]
    pub codec: String,
    #[serde(default)]
    pub bitrate: u32,
}

impl StationCandidate {
    pub fn is_usable(&self) -> bool {
        self.last_check_ok == 1 && self.codec != "unknown"
    }

    pub fn descriptor(&self) -> MediaDescriptor {
        MediaDescriptor {
            id: self.stream_url.clone(),
            kind: BackendKind::StreamedAudio,
            title: self.name.clone(),
        }
    }
}

pub fn filter_usable(stations: Vec<StationCandidate>, cap: usize) -> Vec<StationCandidate> {
    stations
        .into_iter()
        .filter(StationCandidate::is_usable)
        .take(cap)
        .collect()
}

#[cfg(test)]
pub(crate) fn station(uuid: &str, codec: &str, ok: u8) -> StationCandidate {
    StationCandidate {
        uuid: uuid.to_string(),
        name: format!("station {uuid}"),
        stream_url: format!("http://streams.example/{uuid}"),
        last_check_ok: ok,
        codec: codec.to_string(),
        bitrate: 128,
    }
}
