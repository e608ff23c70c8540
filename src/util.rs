use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH, Duration};

use rand::{
    thread_rng, Rng,
    distributions,
};
use chrono::Utc;


pub fn generate_rand_id(length: usize) -> String {
    thread_rng()
        .sample_iter(&distributions::Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

pub fn calculate_hash<T: Hash>(t: &T) -> u64 {
    let mut s = DefaultHasher::new();
    t.hash(&mut s);
    s.finish()
}

pub fn system_now() -> SystemTime {
    let utc = Utc::now().timestamp() as u64;
    UNIX_EPOCH + Duration::new(utc, 0)
}

pub fn unix_secs(time: &SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;

    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => (),
        }
    }

    text.trim().to_owned()
}

pub fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    let chars = text.chars().collect::<Vec<_>>();

    if chars.len() > limit {
        chars[..limit].iter().collect::<String>() + "..."
    }
    else {
        text.to_owned()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rand_id_has_requested_length() {
        assert_eq!(generate_rand_id(32).len(), 32);
        assert_ne!(generate_rand_id(16), generate_rand_id(16));
    }

    #[test]
    fn strip_html_removes_tags() {
        let html = "<p>Heavy <a href=\"x\">rain</a> expected</p>";
        assert_eq!(strip_html(html), "Heavy rain expected");
    }

    #[test]
    fn strip_html_keeps_plain_text() {
        assert_eq!(strip_html("no tags here"), "no tags here");
    }

    #[test]
    fn truncate_appends_ellipsis_only_when_needed() {
        assert_eq!(truncate_with_ellipsis("short", 110), "short");
        let long = "x".repeat(120);
        let cut = truncate_with_ellipsis(&long, 110);
        assert_eq!(cut.chars().count(), 113);
        assert!(cut.ends_with("..."));
    }
}
