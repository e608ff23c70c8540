use std::{
    sync::RwLock,
    time::Duration,
};
use rocket::response::content::Json;
use serde_json::{json, Value as JsonValue};
use chrono::DateTime;
use quick_xml::{
    self as xml,
    events::Event,
};

use crate::util;
use crate::task_scheduler::{Task, TaskSchedulerBuilder};


lazy_static! {
    static ref ALERT_ITEMS: RwLock<Vec<AlertItem>> = {
        RwLock::new(Vec::new())
    };
    static ref ALERT_DATA: RwLock<String> = {
        RwLock::new(String::new())
    };
}

const FEED_URL: &'static str =
    "https://news.google.com/rss/search?q=West%20Bengal%20breaking%20news%20emergency&hl=en-IN&gl=IN&ceid=IN:en";
const REGION: &'static str = "West Bengal";
const MESSAGE_LIMIT: usize = 110;

const CRITICAL_KEYWORDS: [&'static str; 10] = [
    "accident", "death", "fire", "killed", "blast",
    "emergency", "dead", "flood", "cyclone", "collapsed",
];
const WARNING_KEYWORDS: [&'static str; 10] = [
    "alert", "warning", "delay", "protest", "traffic",
    "weather", "rain", "fog", "strike", "intensive revision",
];


/// First-match classifier over the lower-cased headline.
pub fn classify_severity(title: &str) -> &'static str {
    let title = title.to_lowercase();

    if CRITICAL_KEYWORDS.iter().any(|key| title.contains(key)) {
        "critical"
    }
    else if WARNING_KEYWORDS.iter().any(|key| title.contains(key)) {
        "warning"
    }
    else {
        "info"
    }
}

// Google News suffixes headlines with " - <source>".
fn normalize_title(title: &str) -> &str {
    title.split(" - ").next().unwrap_or(title)
}

fn source_of(author: &str, raw_title: &str) -> String {
    if !author.is_empty() {
        author.to_owned()
    }
    else if let Some(suffix) = raw_title.rsplit(" - ").next()
        .filter(|_| raw_title.contains(" - ")) {
        suffix.to_owned()
    }
    else {
        "News Source".to_owned()
    }
}


#[derive(Default, Clone)]
struct NewsItem {
    title: String,
    description: String,
    link: String,
    pub_date: String,
    author: String,
}

impl NewsItem {
    fn is_valid(&self) -> bool {
        !self.title.is_empty() && !self.link.is_empty()
    }
}


#[derive(Clone)]
struct AlertItem {
    severity: &'static str,
    title: String,
    message: String,
    full_details: String,
    link: String,
    time: i64,
    source: String,
}

impl AlertItem {
    fn from_news(item: NewsItem) -> Self {
        let details = util::strip_html(&item.description);
        let time = DateTime::parse_from_rfc2822(&item.pub_date)
            .map(|dt| dt.timestamp())
            .unwrap_or(0);

        AlertItem {
            severity: classify_severity(&item.title),
            title: normalize_title(&item.title).to_owned(),
            message: util::truncate_with_ellipsis(&details, MESSAGE_LIMIT),
            full_details: details,
            source: source_of(&item.author, &item.title),
            link: item.link,
            time,
        }
    }

    fn to_json(&self) -> JsonValue {
        json!({
            "severity": self.severity,
            "title": self.title,
            "message": self.message,
            "full_details": self.full_details,
            "link": self.link,
            "time": self.time,
            "location": REGION,
            "source": self.source,
        })
    }
}


pub fn init_alert_sys(scheduler: &mut TaskSchedulerBuilder) {
    let delay = match fetch_alerts() {
        Ok(items) => {
            update_alert_data(items, true);
            Duration::new(60 * 5, 0)
        },
        Err(err) => {
            warn!("Fail to init alert feed: {}", err);

            update_alert_data(Vec::new(), false);

            Duration::new(60 * 1, 0)
        },
    };

    scheduler.add_task(Task::new("alert-feed", alert_job, delay));
}

#[get("/alert-feed")]
pub fn get_alert_feed() -> Json<String> {
    Json(ALERT_DATA.read().unwrap().clone())
}

fn alert_job() -> Duration {
    match fetch_alerts() {
        Ok(items) => {
            update_alert_data(items, true);
            Duration::new(60 * 5, 0)
        },
        Err(err) => {
            warn!("Fail to get alert feed: {}", err);

            // Keep serving the last good items, marked degraded.
            let last = ALERT_ITEMS.read().unwrap().clone();
            update_alert_data(last, false);

            Duration::new(60 * 1, 0)
        },
    }
}

fn update_alert_data(items: Vec<AlertItem>, fresh: bool) {
    {
        *ALERT_DATA.write().unwrap() = build_alert_data(&items, fresh);
    }
    {
        *ALERT_ITEMS.write().unwrap() = items;
    }
}

fn build_alert_data(items: &[AlertItem], fresh: bool) -> String {
    let parts = items.iter()
        .map(|item| item.to_json())
        .collect::<Vec<_>>();

    json!({
        "alerts": parts,
        "size": parts.len(),
        "status": if fresh { "ok" } else { "degraded" },
    }).to_string()
}

fn fetch_alerts() -> Result<Vec<AlertItem>, String> {
    reqwest::get(FEED_URL)
        .and_then(|mut res| res.text())
        .map_err(|err| err.to_string())
        .and_then(|body| parse_feed(&body))
        .map(|items| {
            items.into_iter()
                .map(AlertItem::from_news)
                .collect()
        })
}

fn parse_feed(xml_str: &str) -> Result<Vec<NewsItem>, String> {
    let mut reader = xml::Reader::from_str(xml_str);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut items = Vec::new();
    let mut tag = Vec::new();
    let mut in_item = false;
    let mut item = NewsItem::default();

    loop {
        match reader.read_event(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if e.name() == b"item" {
                    in_item = true;
                    item = NewsItem::default();
                }

                tag.clear();
                tag.extend_from_slice(e.name());
            },
            Ok(Event::End(ref e)) => {
                if e.name() == b"item" {
                    if item.is_valid() {
                        items.push(item.clone());
                    }
                    in_item = false;
                }
                tag.clear();
            },
            Ok(Event::Text(e)) => {
                if in_item {
                    let text = e.unescape_and_decode(&reader).unwrap_or_default();
                    assign_field(&mut item, &tag, text);
                }
            },
            Ok(Event::CData(e)) => {
                if in_item {
                    let text = e.unescape_and_decode(&reader).unwrap_or_default();
                    assign_field(&mut item, &tag, text);
                }
            },
            Ok(Event::Eof) => break,
            Err(err) => return Err(err.to_string()),
            _ => (),
        }

        buf.clear();
    }

    Ok(items)
}

fn assign_field(item: &mut NewsItem, tag: &[u8], text: String) {
    match tag {
        b"title" => item.title = text,
        b"description" => item.description = text,
        b"link" => item.link = text,
        b"pubDate" => item.pub_date = text,
        b"author" | b"source" => item.author = text,
        _ => (),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_takes_precedence_over_warning() {
        // "fire" (critical) and "alert" (warning) both present.
        assert_eq!(classify_severity("Fire alert issued in Howrah"), "critical");
    }

    #[test]
    fn severity_matches_keyword_lists() {
        assert_eq!(classify_severity("Cyclone nears coastal districts"), "critical");
        assert_eq!(classify_severity("Heavy RAIN expected tomorrow"), "warning");
        assert_eq!(classify_severity("New metro line opens"), "info");
    }

    #[test]
    fn classification_is_idempotent() {
        let title = "Traffic disruption on NH12";
        assert_eq!(classify_severity(title), classify_severity(title));
    }

    #[test]
    fn title_loses_source_suffix() {
        assert_eq!(normalize_title("Flood hits Malda - The Telegraph"),
            "Flood hits Malda");
        assert_eq!(normalize_title("No suffix here"), "No suffix here");
    }

    #[test]
    fn source_falls_back_to_title_suffix() {
        assert_eq!(source_of("PTI", "anything"), "PTI");
        assert_eq!(source_of("", "Flood hits Malda - The Telegraph"),
            "The Telegraph");
        assert_eq!(source_of("", "No suffix"), "News Source");
    }

    #[test]
    fn message_is_stripped_and_truncated() {
        let item = NewsItem {
            title: "Flood hits Malda - The Telegraph".into(),
            description: format!("<a href=\"x\">{}</a>", "y".repeat(200)),
            link: "https://example.com/1".into(),
            pub_date: "Fri, 29 Aug 2025 10:00:00 GMT".into(),
            author: "".into(),
        };

        let alert = AlertItem::from_news(item);

        assert_eq!(alert.severity, "critical");
        assert_eq!(alert.title, "Flood hits Malda");
        assert_eq!(alert.message.chars().count(), MESSAGE_LIMIT + 3);
        assert!(alert.message.ends_with("..."));
        assert_eq!(alert.full_details.chars().count(), 200);
        assert!(alert.time > 0);
    }

    #[test]
    fn feed_items_parsed_from_rss() {
        let rss = r#"<?xml version="1.0"?>
            <rss version="2.0"><channel>
                <title>Search results</title>
                <item>
                    <title>Blast reported in depot - ABP</title>
                    <link>https://example.com/a</link>
                    <pubDate>Fri, 29 Aug 2025 10:00:00 GMT</pubDate>
                    <description>&lt;b&gt;Details&lt;/b&gt; of the incident</description>
                </item>
                <item>
                    <title></title>
                    <link>https://example.com/skip</link>
                </item>
            </channel></rss>"#;

        let items = parse_feed(rss).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].link, "https://example.com/a");
        assert_eq!(items[0].description, "<b>Details</b> of the incident");
    }

    #[test]
    fn degraded_snapshot_is_marked() {
        let ok: JsonValue = serde_json::from_str(&build_alert_data(&[], true)).unwrap();
        let bad: JsonValue = serde_json::from_str(&build_alert_data(&[], false)).unwrap();

        assert_eq!(ok["status"], "ok");
        assert_eq!(bad["status"], "degraded");
        assert_eq!(ok["size"], 0);
    }
}
