use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelVideo {
    pub video_id: String,
    pub title: String,
    pub url: String,
    pub published_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FeedField {
    None,
    VideoId,
    Title,
    Published,
    Updated,
}

/// Parses a channel's Atom feed into its video entries. Shorts are skipped.
pub fn parse_feed(xml: &str) -> Result<Vec<ChannelVideo>, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.config_mut().trim_text(true);

    let mut videos = Vec::new();
    let mut buf = Vec::new();
    let mut in_entry = false;
    let mut field = FeedField::None;
    let mut current: Option<ChannelVideo> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            XmlEvent::Start(ref e) => match e.name().as_ref() {
                b"entry" => {
                    in_entry = true;
                    current = Some(ChannelVideo {
                        video_id: String::new(),
                        title: String::new(),
                        url: String::new(),
                        published_at: String::new(),
                        updated_at: String::new(),
                    });
                }
                b"yt:videoId" if in_entry => field = FeedField::VideoId,
                b"title" if in_entry => field = FeedField::Title,
                b"published" if in_entry => field = FeedField::Published,
                b"updated" if in_entry => field = FeedField::Updated,
                b"link" if in_entry => {
                    if let (Some(video), Some(href)) = (current.as_mut(), get_attribute(e, b"href"))
                    {
                        video.url = href;
                    }
                }
                _ => {}
            },
            XmlEvent::Empty(ref e) if in_entry && e.name().as_ref() == b"link" => {
                if let (Some(video), Some(href)) = (current.as_mut(), get_attribute(e, b"href")) {
                    video.url = href;
                }
            }
            XmlEvent::Text(e) => {
                if let Some(video) = current.as_mut() {
                    let text = decode_entities(&String::from_utf8_lossy(e.as_ref()));
                    match field {
                        FeedField::VideoId => video.video_id = text,
                        FeedField::Title => video.title = text,
                        FeedField::Published => video.published_at = text,
                        FeedField::Updated => video.updated_at = text,
                        FeedField::None => {}
                    }
                }
            }
            XmlEvent::End(ref e) => match e.name().as_ref() {
                b"entry" => {
                    in_entry = false;
                    if let Some(video) = current.take()
                        && !video.video_id.is_empty()
                        && !video.title.is_empty()
                        && !video.url.contains("shorts")
                    {
                        videos.push(video);
                    }
                }
                _ => field = FeedField::None,
            },
            XmlEvent::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(videos)
}

fn get_attribute(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name)
        .and_then(|attr| String::from_utf8(attr.value.into_owned()).ok())
}

fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
}
