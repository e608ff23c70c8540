use std::{
    env,
    sync::Mutex,
    collections::HashMap,
    time::{Instant, Duration},
};
use rocket::response::{
    status::BadRequest,
    content::Json,
};
use serde_json::{json, Value as JsonValue};

use crate::geo::Coord;


type JsonResult = Result<Json<String>, BadRequest<String>>;


lazy_static! {
    static ref AQI_KEY: String = {
        env::var("AQI_KEY")
            .expect("AQI_KEY must be set")
    };
    static ref AQI_CACHE: Mutex<HashMap<String, AqiEntry>> = {
        Mutex::new(HashMap::new())
    };
}

const MAX_CACHE_SIZE: usize = 512;
const VALID_CACHE_DURATION: u64 = 60 * 5;


struct AqiEntry {
    json: String,
    created_time: Instant,
}

impl AqiEntry {
    fn new(json: String) -> Self {
        AqiEntry {
            json,
            created_time: Instant::now(),
        }
    }

    fn is_valid(&self) -> bool {
        Instant::now() - self.created_time <= Duration::new(VALID_CACHE_DURATION, 0)
    }
}


// Upstream calls are bounded by caching per rounded coordinate.
fn cache_key(coord: Coord) -> String {
    format!("{:.2}:{:.2}", coord.latitude, coord.longitude)
}


#[get("/air-quality?<latitude>&<longitude>")]
pub fn get_air_quality(latitude: f64, longitude: f64) -> JsonResult {
    let coord = Coord::new(latitude, longitude);
    if !coord.is_valid() {
        return Err(BadRequest(Some("Coordinate out of range".into())));
    }

    let key = cache_key(coord);

    {
        let cache = AQI_CACHE.lock().unwrap();
        if let Some(entry) = cache.get(&key) {
            if entry.is_valid() {
                return Ok(Json(entry.json.clone()));
            }
        }
    }

    match fetch_air_quality(coord) {
        Ok(data) => {
            let mut cache = AQI_CACHE.lock().unwrap();

            if cache.len() > MAX_CACHE_SIZE {
                cache.retain(|_, v| v.is_valid());
            }

            cache.insert(key, AqiEntry::new(data.clone()));

            Ok(Json(data))
        },
        Err(err) => {
            warn!("Fail to get air quality: {}", err);
            Err(BadRequest(Some(err)))
        },
    }
}

fn fetch_air_quality(coord: Coord) -> Result<String, String> {
    let url = format!("https://api.waqi.info/feed/geo:{};{}/?token={}",
        coord.latitude, coord.longitude, *AQI_KEY);

    reqwest::get(&url)
        .and_then(|mut res| res.text())
        .map_err(|err| err.to_string())
        .and_then(|body| {
            serde_json::from_str::<JsonValue>(&body)
                .map_err(|err| err.to_string())
        })
        .and_then(|v| extract_aqi_report(&v))
}

fn extract_aqi_report(v: &JsonValue) -> Result<String, String> {
    if v["status"].as_str() != Some("ok") {
        return Err("Upstream AQI error".into());
    }

    let data = &v["data"];
    let aqi = data["aqi"].as_i64()
        .ok_or("Missing aqi value".to_owned())?;

    Ok(json!({
        "aqi": aqi,
        "level": aqi_level(aqi),
        "dominant": data["dominentpol"].as_str().unwrap_or(""),
        "station": data["city"]["name"].as_str().unwrap_or(""),
        "temperature": data["iaqi"]["t"]["v"].as_f64(),
        "humidity": data["iaqi"]["h"]["v"].as_f64(),
    }).to_string())
}

fn aqi_level(aqi: i64) -> &'static str {
    match aqi {
        0..=50 => "good",
        51..=100 => "moderate",
        101..=150 => "unhealthy for sensitive groups",
        151..=200 => "unhealthy",
        201..=300 => "very unhealthy",
        _ => "hazardous",
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_rounds_to_two_decimals() {
        let a = cache_key(Coord::new(22.57261, 88.34391));
        let b = cache_key(Coord::new(22.57294, 88.34355));
        assert_eq!(a, b);
        assert_eq!(a, "22.57:88.34");
    }

    #[test]
    fn aqi_levels_follow_the_scale() {
        assert_eq!(aqi_level(30), "good");
        assert_eq!(aqi_level(75), "moderate");
        assert_eq!(aqi_level(180), "unhealthy");
        assert_eq!(aqi_level(400), "hazardous");
    }

    #[test]
    fn upstream_report_extracted() {
        let body = json!({
            "status": "ok",
            "data": {
                "aqi": 154,
                "dominentpol": "pm25",
                "city": { "name": "Kolkata" },
                "iaqi": { "t": { "v": 31.0 }, "h": { "v": 78.0 } },
            },
        });

        let report: JsonValue =
            serde_json::from_str(&extract_aqi_report(&body).unwrap()).unwrap();

        assert_eq!(report["aqi"], 154);
        assert_eq!(report["level"], "unhealthy");
        assert_eq!(report["station"], "Kolkata");
    }

    #[test]
    fn upstream_error_is_propagated() {
        let body = json!({ "status": "error", "data": "Invalid key" });
        assert!(extract_aqi_report(&body).is_err());
    }
}
