use std::{
    sync::RwLock,
    time::Duration,
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
use crate::util;
use crate::photo_sys;
use crate::geo::Coord;
use crate::db::models::User;
use crate::admin::{check_admin, salt_user_pwd};
use crate::captcha_sys::{verify_and_remove_captcha, CHANNEL_SAFETY};
use crate::task_scheduler::{Task, TaskSchedulerBuilder};


type JsonResult = Result<Json<String>, BadRequest<String>>;
type StringResult = Result<String, BadRequest<String>>;


lazy_static! {
    static ref SOS_MAP_CACHE: RwLock<String> = {
        RwLock::new(String::new())
    };
}

pub const SAFETY_STATUSES: [&'static str; 2] = ["SAFE", "EMERGENCY"];

const SOS_ACTIVE_DURATION: u64 = 24 * 60 * 60; // seconds
const SOS_ADMIN_DURATION: u64 = 48 * 60 * 60;


fn authenticate(user_id: &str, user_pwd: &str) -> Result<User, &'static str> {
    let hashed_pwd = salt_user_pwd(user_pwd);

    match db::get_user(user_id) {
        Ok(user) => {
            if user.user_pwd == hashed_pwd {
                Ok(user)
            }
            else {
                Err("Authentication result is incorrect")
            }
        },
        _ => Err("Authentication result is incorrect"),
    }
}


#[derive(FromForm)]
pub struct RegisterForm {
    captcha: String,
    user_id: String,
    user_pwd: String,
    display_name: String,
    phone: String,
}

impl RegisterForm {
    fn verify_error(&self) -> Option<&'static str> {
        if self.user_id.find(char::is_whitespace).is_some() {
            Some("The ID can not contain spaces")
        }
        else if self.user_id.len() < 2 {
            Some("ID must be at least 2 characters")
        }
        else if self.user_id.len() > 24 {
            Some("ID can not be longer than 24 characters")
        }
        else if self.user_pwd.len() < 4 {
            Some("Password must be at least 4 characters")
        }
        else if self.display_name.chars().count() > 80 {
            Some("Display name can not be longer than 80 characters")
        }
        else if self.phone.len() > 20 {
            Some("Invalid phone number")
        }
        else {
            None
        }
    }
}


#[derive(FromForm)]
pub struct ContactForm {
    user_id: String,
    user_pwd: String,
    name: String,
    phone: String,
    relation: String,
}

impl ContactForm {
    fn verify_error(&self) -> Option<&'static str> {
        if self.name.is_empty() || self.name.chars().count() > 80 {
            Some("Invalid contact name")
        }
        else if self.phone.is_empty() || self.phone.len() > 20 {
            Some("Invalid contact phone")
        }
        else if self.relation.chars().count() > 40 {
            Some("Invalid relation")
        }
        else {
            None
        }
    }
}


#[derive(FromForm)]
pub struct StatusForm {
    user_id: String,
    user_pwd: String,
    status: String,
}


#[derive(FromForm)]
pub struct PhotoForm {
    user_id: String,
    user_pwd: String,
    img_key: String,
}


#[derive(FromForm)]
pub struct SosForm {
    user_id: String,
    user_pwd: String,
    kind: String,
    details: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl SosForm {
    fn verify_error(&self) -> Option<&'static str> {
        if self.kind.is_empty() || self.kind.chars().count() > 40 {
            Some("Please select an emergency type")
        }
        else if self.details.len() >= 65536 {
            Some("The maximum length of the details is 65536")
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


pub fn init_safety_sys(scheduler: &mut TaskSchedulerBuilder) {
    update_sos_map(make_sos_map()
        .expect("Fail to make SOS map"));

    scheduler.add_task(Task::new("sos-map", sos_map_job, Duration::new(30, 0)));
}

#[post("/profile", format="application/x-www-form-urlencoded", data="<form>")]
pub fn post_profile(form: Option<Form<RegisterForm>>, cookies: Cookies) -> StringResult {
    let form = match form {
        Some(form) => form,
        None => return Err(BadRequest(Some("Invalid form".into()))),
    };

    if let Some(err) = form.verify_error() {
        return Err(BadRequest(Some(err.to_string())));
    }

    if !verify_and_remove_captcha(cookies, CHANNEL_SAFETY, &form.captcha) {
        return Err(BadRequest(Some("Wrong captcha".into())));
    }

    if db::get_user(&form.user_id).is_ok() {
        return Err(BadRequest(Some("ID already taken".into())));
    }

    let new_user = db::models::NewUser {
        user_id: form.user_id.clone(),
        user_pwd: salt_user_pwd(&form.user_pwd),
        display_name: form.display_name.clone(),
        phone: form.phone.clone(),
        photo_path: "".into(),
        safety_status: "SAFE".into(),
        status_time: util::system_now(),
    };

    match db::insert_user(&new_user) {
        Ok(user) => Ok(user.user_id),
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[get("/profile?<user_id>&<user_pwd>")]
pub fn get_profile(user_id: String, user_pwd: String) -> JsonResult {
    let user = authenticate(&user_id, &user_pwd)
        .map_err(|err| BadRequest(Some(err.to_string())))?;

    let contacts = db::get_emergency_contacts(user.id)
        .map_err(|err| BadRequest(Some(err.to_string())))?;

    let contact_parts = contacts.iter()
        .map(|c| {
            json!({
                "id": c.id,
                "name": c.name,
                "phone": c.phone,
                "relation": c.relation,
            })
        })
        .collect::<Vec<_>>();

    Ok(Json(json!({
        "user_id": user.user_id,
        "display_name": user.display_name,
        "phone": user.phone,
        "photo": user.photo_path,
        "safety_status": user.safety_status,
        "status_time": util::unix_secs(&user.status_time),
        "contacts": contact_parts,
    }).to_string()))
}

#[post("/profile-photo", format="application/x-www-form-urlencoded", data="<form>")]
pub fn post_profile_photo(form: Form<PhotoForm>) -> StringResult {
    let user = authenticate(&form.user_id, &form.user_pwd)
        .map_err(|err| BadRequest(Some(err.to_string())))?;

    if let Some(err) = photo_sys::verify_photo_key(&form.img_key) {
        return Err(BadRequest(Some(err.to_string())));
    }

    let photo_path = photo_sys::publish_photo(&form.img_key)
        .map_err(|err| BadRequest(Some(err)))?;

    match db::update_user_photo(user.id, &photo_path) {
        Ok(_) => {
            photo_sys::remove_published_photo(&user.photo_path);
            Ok(photo_path)
        },
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[post("/safety-status", format="application/x-www-form-urlencoded", data="<form>")]
pub fn post_safety_status(form: Form<StatusForm>) -> JsonResult {
    let user = authenticate(&form.user_id, &form.user_pwd)
        .map_err(|err| BadRequest(Some(err.to_string())))?;

    if !SAFETY_STATUSES.iter().any(|&s| s == form.status) {
        return Err(BadRequest(Some("Invalid status".into())));
    }

    match db::update_safety_status(user.id, &form.status) {
        Ok(updated) => Ok(Json(json!({
            "safety_status": updated.safety_status,
            "status_time": util::unix_secs(&updated.status_time),
        }).to_string())),
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[post("/contact", format="application/x-www-form-urlencoded", data="<form>")]
pub fn post_contact(form: Form<ContactForm>) -> StringResult {
    let user = authenticate(&form.user_id, &form.user_pwd)
        .map_err(|err| BadRequest(Some(err.to_string())))?;

    if let Some(err) = form.verify_error() {
        return Err(BadRequest(Some(err.to_string())));
    }

    let new_contact = db::models::NewEmergencyContact {
        owner_id: user.id,
        name: form.name.clone(),
        phone: form.phone.clone(),
        relation: form.relation.clone(),
    };

    match db::insert_emergency_contact(&new_contact) {
        Ok(contact) => Ok(contact.id.to_string()),
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[delete("/contact?<id>&<user_id>&<user_pwd>")]
pub fn delete_contact(id: i32, user_id: String, user_pwd: String) -> StringResult {
    let user = authenticate(&user_id, &user_pwd)
        .map_err(|err| BadRequest(Some(err.to_string())))?;

    match db::delete_emergency_contact(id, user.id) {
        Ok(cnt) if cnt > 0 => Ok(cnt.to_string()),
        Ok(_) => Err(BadRequest(Some("Not found".into()))),
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[post("/sos", format="application/x-www-form-urlencoded", data="<form>")]
pub fn post_sos(form: Option<Form<SosForm>>) -> StringResult {
    let form = match form {
        Some(form) => form,
        None => return Err(BadRequest(Some("Invalid form".into()))),
    };

    let user = authenticate(&form.user_id, &form.user_pwd)
        .map_err(|err| BadRequest(Some(err.to_string())))?;

    if let Some(err) = form.verify_error() {
        return Err(BadRequest(Some(err.to_string())));
    }

    let user_name: String = if user.display_name.is_empty() {
        "Anonymous User".into()
    }
    else {
        user.display_name.clone()
    };

    let new_signal = db::models::NewSosSignal {
        user_id: user.user_id,
        user_name,
        kind: form.kind.clone(),
        details: form.details.clone(),
        latitude: form.latitude,
        longitude: form.longitude,
        created_time: util::system_now(),
        status: "ACTIVE".into(),
    };

    match db::insert_sos_signal(&new_signal) {
        Ok(signal) => {
            // Broadcasting also flips the sender into emergency state.
            if let Err(err) = db::update_safety_status(user.id, "EMERGENCY") {
                warn!("Fail to update safety status for SOS: {}", err);
            }
            refresh_sos_map();

            Ok(signal.id.to_string())
        },
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[get("/sos-map")]
pub fn get_sos_map() -> Json<String> {
    Json(SOS_MAP_CACHE.read().unwrap().clone())
}

#[get("/admin/sos-list?<admin_phone>&<admin_pwd>")]
pub fn get_sos_list(admin_phone: String, admin_pwd: String) -> JsonResult {
    if !check_admin(&admin_phone, &admin_pwd) {
        return Err(BadRequest(Some("Authentication failed!".into())));
    }

    match db::get_sos_signals_within(Duration::new(SOS_ADMIN_DURATION, 0)) {
        Ok(signals) => {
            let parts = signals.iter()
                .map(signal_json)
                .collect::<Vec<_>>();

            Ok(Json(json!({
                "signals": parts,
                "size": parts.len(),
            }).to_string()))
        },
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[post("/admin/resolve-sos?<id>&<admin_phone>&<admin_pwd>")]
pub fn post_resolve_sos(id: i32, admin_phone: String, admin_pwd: String) -> StringResult {
    if !check_admin(&admin_phone, &admin_pwd) {
        return Err(BadRequest(Some("Authentication failed!".into())));
    }

    match db::resolve_sos_signal(id) {
        Ok(signal) => {
            refresh_sos_map();
            Ok(signal.status)
        },
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}


fn sos_map_job() -> Duration {
    match make_sos_map() {
        Ok(data) => {
            update_sos_map(data);
            Duration::new(30, 0)
        },
        Err(err) => {
            warn!("Fail to make SOS map: {}", err);
            Duration::new(2, 0)
        },
    }
}

fn refresh_sos_map() {
    match make_sos_map() {
        Ok(data) => update_sos_map(data),
        Err(err) => warn!("Fail to refresh SOS map: {}", err),
    }
}

fn signal_json(s: &db::models::SosSignal) -> JsonValue {
    json!({
        "id": s.id,
        "user_name": s.user_name,
        "kind": s.kind,
        "details": s.details,
        "latitude": s.latitude,
        "longitude": s.longitude,
        "created_time": util::unix_secs(&s.created_time),
        "status": s.status,
    })
}

fn make_sos_map() -> Result<String, String> {
    db::get_active_sos_within(Duration::new(SOS_ACTIVE_DURATION, 0))
        .map(|signals| {
            let parts = signals.iter()
                .map(signal_json)
                .collect::<Vec<_>>();

            json!({
                "signals": parts,
                "size": parts.len(),
            }).to_string()
        })
        .map_err(|err| err.to_string())
}

fn update_sos_map(data: String) {
    *SOS_MAP_CACHE.write().unwrap() = data;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_form_bounds() {
        let mut form = RegisterForm {
            captcha: "x".into(),
            user_id: "rahul_das".into(),
            user_pwd: "secret99".into(),
            display_name: "Rahul Das".into(),
            phone: "9830000000".into(),
        };
        assert!(form.verify_error().is_none());

        form.user_id = "a".into();
        assert!(form.verify_error().is_some());
        form.user_id = "has space".into();
        assert!(form.verify_error().is_some());
        form.user_id = "rahul_das".into();

        form.user_pwd = "abc".into();
        assert!(form.verify_error().is_some());
    }

    #[test]
    fn sos_requires_an_emergency_type() {
        let mut form = SosForm {
            user_id: "rahul_das".into(),
            user_pwd: "secret99".into(),
            kind: "".into(),
            details: "trapped on the roof".into(),
            latitude: Some(22.57),
            longitude: Some(88.35),
        };
        assert!(form.verify_error().is_some());

        form.kind = "Flood".into();
        assert!(form.verify_error().is_none());
    }

    #[test]
    fn sos_coordinate_must_be_complete_and_valid() {
        let mut form = SosForm {
            user_id: "rahul_das".into(),
            user_pwd: "secret99".into(),
            kind: "Flood".into(),
            details: "".into(),
            latitude: Some(22.57),
            longitude: None,
        };
        assert!(form.verify_error().is_some());

        form.longitude = Some(190.0);
        assert!(form.verify_error().is_some());

        form.latitude = None;
        form.longitude = None;
        assert!(form.verify_error().is_none());
    }

    #[test]
    fn contact_form_bounds() {
        let mut form = ContactForm {
            user_id: "rahul_das".into(),
            user_pwd: "secret99".into(),
            name: "Mita Das".into(),
            phone: "9830000001".into(),
            relation: "Mother".into(),
        };
        assert!(form.verify_error().is_none());

        form.phone = "".into();
        assert!(form.verify_error().is_some());
    }
}
