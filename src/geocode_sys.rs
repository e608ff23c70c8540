use rocket::response::{
    status::BadRequest,
    content::Json,
};
use reqwest::header::USER_AGENT;
use serde_json::{json, Value as JsonValue};

use crate::geo::Coord;


type JsonResult = Result<Json<String>, BadRequest<String>>;


const NOMINATIM_AGENT: &'static str = "relief-map-server/0.1";


#[get("/geocode?<query>")]
pub fn get_geocode(query: String) -> JsonResult {
    if query.is_empty() || query.chars().count() > 200 {
        return Err(BadRequest(Some("Invalid query".into())));
    }

    let url = format!(
        "https://nominatim.openstreetmap.org/search?format=json&limit=1&q={}",
        encode_query(&query));

    fetch_json(&url)
        .and_then(|v| {
            let hit = v.as_array()
                .and_then(|arr| arr.get(0))
                .ok_or("No match for the address".to_owned())?;

            let latitude = hit["lat"].as_str()
                .and_then(|s| s.parse::<f64>().ok());
            let longitude = hit["lon"].as_str()
                .and_then(|s| s.parse::<f64>().ok());

            match (latitude, longitude) {
                (Some(lat), Some(lon)) => Ok(json!({
                    "latitude": lat,
                    "longitude": lon,
                    "display_name": hit["display_name"].as_str().unwrap_or(""),
                }).to_string()),
                _ => Err("Invalid geocoding result".into()),
            }
        })
        .map(Json)
        .map_err(|err| BadRequest(Some(err)))
}

#[get("/reverse-geocode?<latitude>&<longitude>")]
pub fn get_reverse_geocode(latitude: f64, longitude: f64) -> JsonResult {
    let coord = Coord::new(latitude, longitude);
    if !coord.is_valid() {
        return Err(BadRequest(Some("Coordinate out of range".into())));
    }

    let url = format!(
        "https://nominatim.openstreetmap.org/reverse?format=json&lat={}&lon={}",
        coord.latitude, coord.longitude);

    fetch_json(&url)
        .and_then(|v| {
            v["display_name"].as_str()
                .map(|name| json!({
                    "latitude": coord.latitude,
                    "longitude": coord.longitude,
                    "display_name": name,
                }).to_string())
                .ok_or("No address at the coordinate".into())
        })
        .map(Json)
        .map_err(|err| BadRequest(Some(err)))
}


fn fetch_json(url: &str) -> Result<JsonValue, String> {
    let client = reqwest::Client::new();

    client.get(url)
        .header(USER_AGENT, NOMINATIM_AGENT)
        .send()
        .and_then(|mut res| res.json::<JsonValue>())
        .map_err(|err| err.to_string())
}

fn encode_query(query: &str) -> String {
    let mut encoded = String::with_capacity(query.len());

    for ch in query.chars() {
        match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '~' => encoded.push(ch),
            ' ' => encoded.push('+'),
            _ => {
                let mut bytes = [0u8; 4];
                for byte in ch.encode_utf8(&mut bytes).as_bytes() {
                    encoded.push_str(&format!("%{:02X}", byte));
                }
            },
        }
    }

    encoded
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_encoding_covers_spaces_and_unicode() {
        assert_eq!(encode_query("BBD Bagh, Kolkata"), "BBD+Bagh%2C+Kolkata");
        assert_eq!(encode_query("safe-chars_1.2~"), "safe-chars_1.2~");
        assert_eq!(encode_query("কলকাতা"),
            "%E0%A6%95%E0%A6%B2%E0%A6%95%E0%A6%BE%E0%A6%A4%E0%A6%BE");
    }
}
