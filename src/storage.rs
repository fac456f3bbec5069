use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::{info, warn};

use crate::config::ChannelConfig;
use crate::feed::format_pub_date;
use crate::types::{CandidatePage, FeedItem, FeedState};

const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Load the persisted feed; a missing or unreadable file is an empty feed
pub fn load_feed(path: &Path) -> FeedState {
    if !path.exists() {
        info!("No existing feed at {:?}, starting empty", path);
        return FeedState::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read existing feed {:?}: {}. Starting empty.", path, e);
            return FeedState::default();
        }
    };

    match parse_feed(&content) {
        Ok(state) => state,
        Err(e) => {
            warn!("Failed to parse existing feed {:?}: {:#}. Starting empty.", path, e);
            FeedState::default()
        }
    }
}

#[derive(Default)]
struct ItemFields {
    title: String,
    link: String,
    description: String,
    guid: String,
    pub_date: String,
}

impl ItemFields {
    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "title" => Some(&mut self.title),
            "link" => Some(&mut self.link),
            "description" => Some(&mut self.description),
            "guid" => Some(&mut self.guid),
            "pubDate" => Some(&mut self.pub_date),
            _ => None,
        }
    }

    fn into_item(self) -> FeedItem {
        FeedItem {
            title: self.title.trim().to_string(),
            link: self.link.trim().to_string(),
            description: self.description.trim().to_string(),
            guid: self.guid.trim().to_string(),
            pub_date: self.pub_date.trim().to_string(),
        }
    }
}

fn is_item_path(path: &[String]) -> bool {
    matches!(path, [rss, channel] if rss == "rss" && channel == "channel")
}

fn item_field<'a>(path: &'a [String]) -> Option<&'a str> {
    match path {
        [rss, channel, item, field] if rss == "rss" && channel == "channel" && item == "item" => {
            Some(field.as_str())
        }
        _ => None,
    }
}

/// Parse an RSS 2.0 document into feed items, keeping the first item per link
pub fn parse_feed(content: &str) -> Result<FeedState> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut items = Vec::new();

    for item in parse_feed_items(content)? {
        if item.link.is_empty() {
            continue;
        }
        if seen.insert(item.link.clone()) {
            items.push(item);
        } else {
            warn!("Duplicate feed item for {}, keeping the first", item.link);
        }
    }

    Ok(FeedState { items })
}

/// Every `rss/channel/item` in document order, duplicates and linkless
/// items included
pub fn parse_feed_items(content: &str) -> Result<Vec<FeedItem>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut current: Option<ItemFields> = None;
    let mut items = Vec::new();

    loop {
        match reader.read_event().context("Malformed feed XML")? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "item" && is_item_path(&path) {
                    current = Some(ItemFields::default());
                }
                path.push(name);
            }
            Event::End(_) => {
                let closed = path.pop();
                if closed.as_deref() == Some("item") && is_item_path(&path) {
                    if let Some(fields) = current.take() {
                        items.push(fields.into_item());
                    }
                }
            }
            Event::Text(t) => {
                let text = t.unescape().context("Invalid text in feed")?;
                append_field(&mut current, &path, &text);
            }
            Event::CData(c) => {
                let bytes = c.into_inner();
                append_field(&mut current, &path, &String::from_utf8_lossy(&bytes));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !path.is_empty() {
        bail!("Feed XML ended inside <{}>", path.join("/"));
    }

    Ok(items)
}

fn append_field(current: &mut Option<ItemFields>, path: &[String], text: &str) {
    if let (Some(fields), Some(name)) = (current.as_mut(), item_field(path)) {
        if let Some(value) = fields.field_mut(name) {
            value.push_str(text);
        }
    }
}

fn write_text<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer
        .create_element(name)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

/// Write text as CDATA; an embedded `]]>` is split across sections
fn write_cdata<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    let segments: Vec<&str> = text.split("]]>").collect();
    let last = segments.len() - 1;
    for (i, segment) in segments.iter().enumerate() {
        let mut section = String::new();
        if i > 0 {
            section.push('>');
        }
        section.push_str(segment);
        if i < last {
            section.push_str("]]");
        }
        writer.write_event(Event::CData(BytesCData::new(section)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Render the full RSS document for a feed state
pub fn render_feed(state: &FeedState, channel: &ChannelConfig, now: DateTime<Utc>) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:dc", DC_NS));
    rss.push_attribute(("xmlns:atom", ATOM_NS));
    writer.write_event(Event::Start(rss))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text(&mut writer, "title", &channel.title)?;
    write_text(&mut writer, "link", &channel.link)?;
    write_text(&mut writer, "description", &channel.description)?;
    write_text(&mut writer, "language", &channel.language)?;
    writer
        .create_element("atom:link")
        .with_attribute(("href", channel.self_link.as_str()))
        .with_attribute(("rel", "self"))
        .with_attribute(("type", "application/rss+xml"))
        .write_empty()?;
    write_text(&mut writer, "pubDate", &format_pub_date(now))?;

    for item in &state.items {
        writer.write_event(Event::Start(BytesStart::new("item")))?;
        write_text(&mut writer, "title", &item.title)?;
        write_text(&mut writer, "link", &item.link)?;
        write_cdata(&mut writer, "description", &item.description)?;
        writer
            .create_element("guid")
            .with_attribute(("isPermaLink", "false"))
            .write_text_content(BytesText::new(&item.guid))?;
        write_text(&mut writer, "pubDate", &item.pub_date)?;
        writer
            .create_element("source")
            .with_attribute(("url", channel.source_url.as_str()))
            .write_text_content(BytesText::new(&channel.source_label))?;
        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    let mut xml = String::from_utf8(writer.into_inner()).context("Rendered feed is not UTF-8")?;
    xml.push('\n');
    Ok(xml)
}

/// Rewrite the feed file, replacing it only once the new content is on disk
pub fn save_feed(path: &Path, state: &FeedState, channel: &ChannelConfig, now: DateTime<Utc>) -> Result<()> {
    let xml = render_feed(state, channel, now)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create feed directory {:?}", parent))?;
        }
    }

    let tmp = temp_path(path);
    fs::write(&tmp, xml).with_context(|| format!("Failed to write feed to {:?}", tmp))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace feed {:?}", path))?;

    info!("Feed written to {:?} ({} items)", path, state.len());
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "feed.xml".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Load pre-extracted candidate pages from a JSON file
pub fn load_candidate_pages(path: &Path) -> Result<Vec<CandidatePage>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read candidate pages from {:?}", path))?;

    let pages: Vec<CandidatePage> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse candidate pages {:?}", path))?;

    Ok(pages)
}
