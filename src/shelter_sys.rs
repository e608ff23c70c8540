use std::{
    fs,
    sync::RwLock,
    time::Duration,
    collections::HashMap,
};
use rocket::{
    response::{
        status::BadRequest,
        content::Json,
    },
    request::Form,
    http::Cookies,
};
use serde_json::{json, Value as JsonValue};

use crate::db;
use crate::db::models::{APPROVAL_PENDING, APPROVAL_APPROVED};
use crate::geo::{self, Coord};
use crate::admin::check_admin;
use crate::captcha_sys::{verify_and_remove_captcha, CHANNEL_SHELTER};
use crate::task_scheduler::{Task, TaskSchedulerBuilder};


type JsonResult = Result<Json<String>, BadRequest<String>>;
type StringResult = Result<String, BadRequest<String>>;


lazy_static! {
    static ref SHELTER_DATA: RwLock<String> = {
        RwLock::new(String::new())
    };
    static ref SHELTER_MAP: RwLock<HashMap<i32, Shelter>> = {
        RwLock::new(HashMap::new())
    };
}

pub const STATUS_OPEN: &'static str = "open";
pub const STATUS_LIMITED: &'static str = "limited";
pub const STATUS_FULL: &'static str = "full";


/// Occupancy ratio is the only source of truth for shelter status.
/// A non-positive capacity cannot host anyone, so it reads as full
/// instead of dividing by zero.
pub fn derive_status(current: i32, capacity: i32) -> &'static str {
    if capacity <= 0 {
        return STATUS_FULL;
    }

    let percent = current as f64 * 100.0 / capacity as f64;

    if percent > 90.0 {
        STATUS_FULL
    }
    else if percent > 70.0 {
        STATUS_LIMITED
    }
    else {
        STATUS_OPEN
    }
}

fn occupancy_percent(current: i32, capacity: i32) -> i32 {
    if capacity <= 0 {
        100
    }
    else {
        (current as f64 * 100.0 / capacity as f64).round() as i32
    }
}


struct Shelter {
    id: i32,
    name: String,
    address: String,
    coord: Option<Coord>,
    capacity: i32,
    current: i32,
    amenities: Vec<String>,
    phone: String,
    approval: String,

    json_cache: String,
}

impl Shelter {
    fn from_record(record: db::models::Shelter) -> Self {
        let coord = match (record.latitude, record.longitude) {
            (Some(lat), Some(lon)) => Some(Coord::new(lat, lon)),
            _ => None,
        };

        let mut s = Shelter {
            id: record.id,
            name: record.name,
            address: record.address,
            coord,
            capacity: record.capacity,
            current: record.current,
            amenities: split_amenities(&record.amenities),
            phone: record.phone,
            approval: record.approval,

            json_cache: String::new(),
        };

        s.update_cache();

        s
    }

    fn is_public(&self) -> bool {
        self.approval == APPROVAL_APPROVED
    }

    fn update_cache(&mut self) {
        self.json_cache = self.to_json().to_string();
    }

    fn to_json(&self) -> JsonValue {
        json!({
            "id": self.id,
            "name": self.name,
            "address": self.address,
            "latitude": self.coord.map(|c| c.latitude),
            "longitude": self.coord.map(|c| c.longitude),
            "capacity": self.capacity,
            "current": self.current,
            "occupancy": occupancy_percent(self.current, self.capacity),
            "status": derive_status(self.current, self.capacity),
            "amenities": self.amenities,
            "phone": self.phone,
        })
    }
}

fn split_amenities(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}


#[derive(FromForm)]
pub struct ShelterForm {
    captcha: String,
    name: String,
    address: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    capacity: i32,
    phone: String,
    amenities: String,
}

impl ShelterForm {
    fn verify_error(&self) -> Option<&'static str> {
        let len_name = self.name.chars().count();
        let len_address = self.address.chars().count();

        if len_name < 2 {
            Some("Name must be at least 2 characters")
        }
        else if len_name > 80 {
            Some("Name can not be longer than 80 characters")
        }
        else if len_address > 200 {
            Some("The maximum length of the address is 200")
        }
        else if self.capacity <= 0 {
            Some("Capacity must be positive")
        }
        else if self.phone.len() > 20 {
            Some("Invalid phone number")
        }
        else if self.amenities.len() > 120 {
            Some("Too many amenity tags")
        }
        else if self.latitude.is_some() != self.longitude.is_some() {
            Some("Latitude and longitude must be given together")
        }
        else if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
            if Coord::new(lat, lon).is_valid() {
                None
            }
            else {
                Some("Coordinate out of range")
            }
        }
        else {
            None
        }
    }
}


#[derive(FromForm)]
pub struct OccupancyForm {
    admin_phone: String,
    admin_pwd: String,
    id: i32,
    current: i32,
}


pub fn init_shelter_sys(scheduler: &mut TaskSchedulerBuilder) {
    init_db_and_shelters();
    update_shelter_data(build_shelter_data());

    scheduler.add_task(Task::new("shelter-data", shelter_data_job, Duration::new(60 * 5, 0)));
}

#[get("/shelter-map")]
pub fn get_shelter_map() -> Json<String> {
    Json(SHELTER_DATA.read().unwrap().clone())
}

#[get("/shelter?<id>")]
pub fn get_shelter(id: i32) -> JsonResult {
    let cache_map = SHELTER_MAP.read().unwrap();

    match cache_map.get(&id) {
        Some(shelter) if shelter.is_public() => Ok(Json(shelter.json_cache.clone())),
        _ => Err(BadRequest(Some("Not found".into()))),
    }
}

#[get("/nearby-shelters?<latitude>&<longitude>&<radius>")]
pub fn get_nearby_shelters(latitude: Option<f64>, longitude: Option<f64>,
    radius: Option<f64>) -> JsonResult {

    let user = match (latitude, longitude) {
        (Some(lat), Some(lon)) => {
            let coord = Coord::new(lat, lon);
            if !coord.is_valid() {
                return Err(BadRequest(Some("Coordinate out of range".into())));
            }
            Some(coord)
        },
        (None, None) => None,
        _ => return Err(BadRequest(Some(
            "Latitude and longitude must be given together".into()))),
    };
    let radius_km = geo::clamp_radius(radius);

    let cache_map = SHELTER_MAP.read().unwrap();

    let entries = cache_map.values()
        .filter(|s| s.is_public())
        .map(|s| (s.id, s.coord));
    let view = geo::proximity_view(entries, user, radius_km);

    let shelters = view.into_iter()
        .filter_map(|(id, dist)| {
            cache_map.get(&id).map(|s| {
                let mut part = s.to_json();
                part["distance"] = match dist {
                    Some(d) => json!(geo::format_distance_km(d)),
                    None => json!("-"),
                };
                part
            })
        })
        .collect::<Vec<_>>();

    Ok(Json(json!({
        "shelters": shelters,
        "size": shelters.len(),
        "radius": radius_km,
    }).to_string()))
}

#[post("/shelter", format="application/x-www-form-urlencoded", data="<form>")]
pub fn post_shelter(form: Option<Form<ShelterForm>>, cookies: Cookies) -> StringResult {
    let form = match form {
        Some(form) => form,
        None => return Err(BadRequest(Some("Invalid form".into()))),
    };

    if let Some(err) = form.verify_error() {
        return Err(BadRequest(Some(err.to_string())));
    }

    if !verify_and_remove_captcha(cookies, CHANNEL_SHELTER, &form.captcha) {
        return Err(BadRequest(Some("Wrong captcha".into())));
    }

    let db_result = db::insert_shelter(&db::models::NewShelter {
        name: form.name.clone(),
        address: form.address.clone(),
        latitude: form.latitude,
        longitude: form.longitude,
        capacity: form.capacity,
        current: 0,
        amenities: form.amenities.clone(),
        phone: form.phone.clone(),
        approval: APPROVAL_PENDING.into(),
    });

    match db_result {
        Ok(s) => {
            // Pending records sit in the cache but stay out of
            // public payloads until approved.
            let id = s.id;
            let mut cache_map = SHELTER_MAP.write().unwrap();
            cache_map.insert(id, Shelter::from_record(s));

            Ok(id.to_string())
        },
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[get("/admin/pending-shelters?<admin_phone>&<admin_pwd>")]
pub fn get_pending_shelters(admin_phone: String, admin_pwd: String) -> JsonResult {
    if !check_admin(&admin_phone, &admin_pwd) {
        return Err(BadRequest(Some("Authentication failed!".into())));
    }

    match db::get_pending_shelters() {
        Ok(shelters) => {
            let parts = shelters.into_iter()
                .map(|s| Shelter::from_record(s).to_json())
                .collect::<Vec<_>>();

            Ok(Json(json!({
                "shelters": parts,
                "size": parts.len(),
            }).to_string()))
        },
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[post("/admin/approve-shelter?<id>&<admin_phone>&<admin_pwd>")]
pub fn post_approve_shelter(id: i32, admin_phone: String, admin_pwd: String) -> StringResult {
    if !check_admin(&admin_phone, &admin_pwd) {
        return Err(BadRequest(Some("Authentication failed!".into())));
    }

    match db::approve_shelter(id) {
        Ok(s) => {
            {
                let mut cache_map = SHELTER_MAP.write().unwrap();
                cache_map.insert(s.id, Shelter::from_record(s));
            }
            update_shelter_data(build_shelter_data());

            Ok(id.to_string())
        },
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[delete("/admin/shelter?<id>&<admin_phone>&<admin_pwd>")]
pub fn delete_shelter(id: i32, admin_phone: String, admin_pwd: String) -> StringResult {
    if !check_admin(&admin_phone, &admin_pwd) {
        return Err(BadRequest(Some("Authentication failed!".into())));
    }

    match db::delete_shelter(id) {
        Ok(cnt) => {
            {
                let mut cache_map = SHELTER_MAP.write().unwrap();
                cache_map.remove(&id);
            }
            update_shelter_data(build_shelter_data());

            Ok(cnt.to_string())
        },
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[post("/admin/occupancy", format="application/x-www-form-urlencoded", data="<form>")]
pub fn post_occupancy(form: Form<OccupancyForm>) -> JsonResult {
    if !check_admin(&form.admin_phone, &form.admin_pwd) {
        return Err(BadRequest(Some("Authentication failed!".into())));
    }

    if form.current < 0 {
        return Err(BadRequest(Some("Occupancy can not be negative".into())));
    }

    match db::update_shelter_occupancy(form.id, form.current) {
        Ok(s) => {
            let status = derive_status(s.current, s.capacity);
            let result = json!({
                "id": s.id,
                "current": s.current,
                "capacity": s.capacity,
                "status": status,
            }).to_string();

            {
                let mut cache_map = SHELTER_MAP.write().unwrap();
                if let Some(shelter) = cache_map.get_mut(&s.id) {
                    shelter.current = s.current;
                    shelter.update_cache();
                }
            }
            update_shelter_data(build_shelter_data());

            Ok(Json(result))
        },
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}


fn shelter_data_job() -> Duration {
    update_shelter_data(build_shelter_data());

    Duration::new(60 * 5, 0)
}

fn init_db_and_shelters() {
    match db::get_shelters() {
        Ok(ref shelters) if shelters.len() == 0 => {
            seed_shelters_from_file();
        },
        Ok(shelters) => {
            let mut cache_map = SHELTER_MAP.write().unwrap();

            for s in shelters {
                cache_map.insert(s.id, Shelter::from_record(s));
            }
        },
        Err(err) => panic!("{}", err.to_string()),
    }
}

fn seed_shelters_from_file() {
    let data: JsonValue = serde_json::from_str(&fs::read_to_string("data/shelters.json")
        .expect("Can't find shelters.json"))
        .expect("Can't parse shelters.json");
    let data = data.get("shelters").expect("Can't find shelters property")
        .as_array().unwrap();

    for val in data {
        let amenities = val.get("amenities").and_then(|v| v.as_array())
            .map(|tags| {
                tags.iter()
                    .filter_map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .unwrap_or_default();

        let new_shelter = db::models::NewShelter {
            name: val.get("name").and_then(|v| v.as_str()).unwrap().to_owned(),
            address: val.get("address").and_then(|v| v.as_str()).unwrap_or("").to_owned(),
            latitude: val.get("latitude").and_then(|v| v.as_f64()),
            longitude: val.get("longitude").and_then(|v| v.as_f64()),
            capacity: val.get("capacity").and_then(|v| v.as_i64()).unwrap() as i32,
            current: val.get("current").and_then(|v| v.as_i64()).unwrap_or(0) as i32,
            amenities,
            phone: val.get("phone").and_then(|v| v.as_str()).unwrap_or("").to_owned(),
            approval: APPROVAL_APPROVED.into(),
        };

        match db::insert_shelter(&new_shelter) {
            Ok(s) => {
                let mut cache_map = SHELTER_MAP.write().unwrap();
                cache_map.insert(s.id, Shelter::from_record(s));
            },
            Err(err) => panic!("{}", err.to_string()),
        }
    }
}

fn update_shelter_data(data: String) {
    *SHELTER_DATA.write().unwrap() = data;
}

fn build_shelter_data() -> String {
    let cache_map = SHELTER_MAP.read().unwrap();
    build_public_data(&cache_map)
}

fn build_public_data(cache_map: &HashMap<i32, Shelter>) -> String {
    let shelters = cache_map.values()
        .filter(|s| s.is_public())
        .map(|s| s.to_json())
        .collect::<Vec<_>>();

    json!({
        "shelters": shelters,
        "size": shelters.len(),
    }).to_string()
}


#[cfg(test)]
mod tests {
    use super::*;

    fn make_shelter(id: i32, coord: Option<Coord>, capacity: i32, current: i32,
        approval: &str) -> Shelter {

        Shelter::from_record(db::models::Shelter {
            id,
            name: format!("Shelter {}", id),
            address: "somewhere".into(),
            latitude: coord.map(|c| c.latitude),
            longitude: coord.map(|c| c.longitude),
            capacity,
            current,
            amenities: "wifi, power".into(),
            phone: "033-0000-0000".into(),
            approval: approval.into(),
        })
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(derive_status(0, 100), STATUS_OPEN);
        assert_eq!(derive_status(70, 100), STATUS_OPEN);
        assert_eq!(derive_status(71, 100), STATUS_LIMITED);
        assert_eq!(derive_status(90, 100), STATUS_LIMITED);
        assert_eq!(derive_status(91, 100), STATUS_FULL);
        assert_eq!(derive_status(200, 100), STATUS_FULL);
    }

    #[test]
    fn zero_capacity_reads_full_without_panicking() {
        assert_eq!(derive_status(0, 0), STATUS_FULL);
        assert_eq!(derive_status(10, -5), STATUS_FULL);
        assert_eq!(occupancy_percent(10, 0), 100);
    }

    #[test]
    fn pending_records_never_reach_the_public_payload() {
        let mut map = HashMap::new();
        map.insert(1, make_shelter(1, None, 100, 10, APPROVAL_APPROVED));
        map.insert(2, make_shelter(2, None, 100, 10, APPROVAL_PENDING));

        let data: JsonValue = serde_json::from_str(&build_public_data(&map)).unwrap();

        assert_eq!(data["size"], 1);
        assert_eq!(data["shelters"][0]["id"], 1);
    }

    #[test]
    fn amenity_tags_are_normalized() {
        assert_eq!(split_amenities("WiFi, Power ,, food"),
            vec!["wifi", "power", "food"]);
        assert!(split_amenities("").is_empty());
    }

    #[test]
    fn nearby_scenario_from_reference_data() {
        // A: Netaji Indoor Stadium, B: Salt Lake Stadium.
        let a = make_shelter(1, Some(Coord::new(22.5726, 88.3439)), 2000, 1100,
            APPROVAL_APPROVED);
        let b = make_shelter(2, Some(Coord::new(22.5691, 88.4091)), 5000, 450,
            APPROVAL_APPROVED);

        assert_eq!(derive_status(a.current, a.capacity), STATUS_OPEN); // 55%
        assert_eq!(derive_status(b.current, b.capacity), STATUS_OPEN); // 9%

        let user = Some(Coord::new(22.57, 88.35));
        let entries = vec![(a.id, a.coord), (b.id, b.coord)];
        let view = geo::proximity_view(entries, user, 10.0);

        assert_eq!(view.len(), 2);
        assert_eq!(view[0].0, 1);
    }

    #[test]
    fn cached_json_carries_derived_status() {
        let shelter = make_shelter(7, None, 100, 95, APPROVAL_APPROVED);
        let cached: JsonValue = serde_json::from_str(&shelter.json_cache).unwrap();

        assert_eq!(cached["status"], "full");
        assert_eq!(cached["occupancy"], 95);
        assert!(cached["latitude"].is_null());
    }

    #[test]
    fn form_validation_bounds() {
        let mut form = ShelterForm {
            captcha: "x".into(),
            name: "Netaji Indoor Stadium".into(),
            address: "B.B.D. Bagh, Kolkata".into(),
            latitude: Some(22.5726),
            longitude: Some(88.3439),
            capacity: 2000,
            phone: "033-2248-0001".into(),
            amenities: "wifi,power".into(),
        };
        assert!(form.verify_error().is_none());

        form.capacity = 0;
        assert!(form.verify_error().is_some());
        form.capacity = 2000;

        form.longitude = None;
        assert!(form.verify_error().is_some());
        form.longitude = Some(200.0);
        assert!(form.verify_error().is_some());
    }
}
