use std::{env, fs};
use rocket::{
    response::{
        status::BadRequest,
        content::Json,
    },
    request::Form,
};
use serde_json::{json, Value as JsonValue};


type JsonResult = Result<Json<String>, BadRequest<String>>;


lazy_static! {
    static ref GEMINI_KEY: Option<String> = {
        env::var("GEMINI_KEY").ok()
    };
    static ref FIRST_AID_CONTEXT: String = {
        fs::read_to_string("data/first_aid.json")
            .expect("Can't find first_aid.json")
    };
}

const GEMINI_MODEL: &'static str = "gemini-2.5-flash-lite";

const FALLBACK_NO_KEY: &'static str = "API Key missing.";
const FALLBACK_BUSY: &'static str =
    "The AI is currently busy. Please retry in a few seconds or use the manual guides below.";
const FALLBACK_OFFLINE: &'static str = "Connection error. Please call 100/101.";


#[derive(FromForm)]
pub struct ChatForm {
    prompt: String,
}

impl ChatForm {
    fn verify_error(&self) -> Option<&'static str> {
        if self.prompt.is_empty() {
            Some("Prompt must not be empty")
        }
        else if self.prompt.len() > 4096 {
            Some("The maximum length of the prompt is 4096")
        }
        else {
            None
        }
    }
}


// Upstream failures never reach the client as errors; the assistant
// degrades to a fixed message instead.
#[post("/first-aid-chat", format="application/x-www-form-urlencoded", data="<form>")]
pub fn post_first_aid_chat(form: Option<Form<ChatForm>>) -> JsonResult {
    let form = match form {
        Some(form) => form,
        None => return Err(BadRequest(Some("Invalid form".into()))),
    };

    if let Some(err) = form.verify_error() {
        return Err(BadRequest(Some(err.to_string())));
    }

    let reply = match *GEMINI_KEY {
        Some(ref key) => request_completion(key, &form.prompt),
        None => FALLBACK_NO_KEY.to_owned(),
    };

    Ok(Json(json!({
        "reply": reply,
    }).to_string()))
}

fn request_completion(key: &str, prompt: &str) -> String {
    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
        GEMINI_MODEL, key);

    let system_prompt = format!(
        "You are an emergency medical assistant. Use this data: {}",
        *FIRST_AID_CONTEXT);

    let body = json!({
        "contents": [{
            "parts": [
                { "text": system_prompt },
                { "text": prompt },
            ],
        }],
    });

    let client = reqwest::Client::new();
    let result = client.post(&url)
        .json(&body)
        .send();

    match result {
        Ok(mut res) if res.status().is_success() => {
            res.json::<JsonValue>()
                .ok()
                .and_then(|v| extract_reply(&v))
                .unwrap_or_else(|| FALLBACK_OFFLINE.to_owned())
        },
        Ok(ref res) if res.status().as_u16() == 429 => {
            warn!("First aid assistant rate limited");
            FALLBACK_BUSY.to_owned()
        },
        Ok(res) => {
            warn!("First aid assistant upstream error: {}", res.status());
            FALLBACK_OFFLINE.to_owned()
        },
        Err(err) => {
            warn!("Fail to reach first aid assistant: {}", err);
            FALLBACK_OFFLINE.to_owned()
        },
    }
}

fn extract_reply(v: &JsonValue) -> Option<String> {
    v["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(|text| text.to_owned())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_extracted_from_completion() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": "Apply firm pressure to the wound." }],
                },
            }],
        });

        assert_eq!(extract_reply(&body).unwrap(),
            "Apply firm pressure to the wound.");
    }

    #[test]
    fn malformed_completion_yields_none() {
        assert!(extract_reply(&json!({ "candidates": [] })).is_none());
        assert!(extract_reply(&json!({})).is_none());
    }

    #[test]
    fn prompt_bounds_checked() {
        let empty = ChatForm { prompt: "".into() };
        assert!(empty.verify_error().is_some());

        let long = ChatForm { prompt: "x".repeat(5000) };
        assert!(long.verify_error().is_some());

        let ok = ChatForm { prompt: "How to treat a burn?".into() };
        assert!(ok.verify_error().is_none());
    }
}
