use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    EmbeddedVideo,
    StreamedAudio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryId {
    Cafe,
    Cars,
    Radio,
}

impl CategoryId {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryId::Cafe => "cafe",
            CategoryId::Cars => "cars",
            CategoryId::Radio => "radio",
        }
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    pub name: &'static str,
    pub blurb: &'static str,
    pub kind: BackendKind,
    pub channel_id: Option<&'static str>,
}

pub const CATEGORIES: &[Category] = &[
    Category {
        id: CategoryId::Cafe,
        name: "Cafe",
        blurb: "Lofi/chill jazz stream",
        kind: BackendKind::EmbeddedVideo,
        channel_id: Some("UCATyidusLbgd54WOCIryJow"),
    },
    Category {
        id: CategoryId::Cars,
        name: "Cars",
        blurb: "Driving/synthwave stream",
        kind: BackendKind::EmbeddedVideo,
        channel_id: None,
    },
    Category {
        id: CategoryId::Radio,
        name: "Radio",
        blurb: "Random radio stations",
        kind: BackendKind::StreamedAudio,
        channel_id: None,
    },
];

pub fn category(id: CategoryId) -> &'static Category {
    CATEGORIES
        .iter()
        .find(|c| c.id == id)
        .expect("every CategoryId has a table entry")
}

lazy_static! {
    pub static ref VIDEO_IDS: HashMap<CategoryId, Vec<&'static str>> = HashMap::from([
        (
            CategoryId::Cafe,
            vec![
                "jfKfPfyJRdk",
                "1YcnN9C0PCo",
                "nfW6f2gf4g8",
                "wGskLO2ESOI",
                "OpZX51yb23w",
            ],
        ),
        (
            CategoryId::Cars,
            vec![
                "4xDzrJKXOOY",
                "tiyuRJthHwc",
                "R0UYHS8A_A",
                "qzyl0f3mRG0",
                "N0FPLdagb8Q",
            ],
        ),
    ]);
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaDescriptor {
    pub id: String,
    pub kind: BackendKind,
    pub title: String,
}
