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
use crate::db::models::{MissingPerson, APPROVAL_PENDING};
use crate::admin::check_admin;
use crate::captcha_sys::{verify_and_remove_captcha, CHANNEL_MISSING};
use crate::task_scheduler::{Task, TaskSchedulerBuilder};


type JsonResult = Result<Json<String>, BadRequest<String>>;
type StringResult = Result<String, BadRequest<String>>;


lazy_static! {
    static ref BOARD_CACHE: RwLock<String> = {
        RwLock::new(String::new())
    };
}

pub const WORKFLOW_STATUSES: [&'static str; 3] = ["missing", "searching", "found"];


#[derive(FromForm)]
pub struct MissingPersonForm {
    captcha: String,
    name: String,
    age: i32,
    last_location: String,
    district: String,
    description: String,
    contact: String,
    img_key: String,
}

impl MissingPersonForm {
    fn verify_error(&self) -> Option<&'static str> {
        let len_name = self.name.chars().count();

        if len_name < 2 {
            Some("Name must be at least 2 characters")
        }
        else if len_name > 80 {
            Some("Name can not be longer than 80 characters")
        }
        else if self.age <= 0 || self.age > 150 {
            Some("Invalid age")
        }
        else if self.last_location.chars().count() > 200 {
            Some("The maximum length of the location is 200")
        }
        else if self.district.chars().count() > 60 {
            Some("The maximum length of the district is 60")
        }
        else if self.description.len() >= 65536 {
            Some("The maximum length of the description is 65536")
        }
        else if self.contact.is_empty() || self.contact.len() > 20 {
            Some("Invalid contact number")
        }
        else {
            photo_sys::verify_photo_key(&self.img_key)
        }
    }
}


pub fn init_missing_sys(scheduler: &mut TaskSchedulerBuilder) {
    update_board(make_board()
        .expect("Fail to make missing person board"));

    scheduler.add_task(Task::new("missing-board", board_job, Duration::new(60 * 5, 0)));
}

#[get("/missing-person-board")]
pub fn get_missing_person_board() -> Json<String> {
    Json(BOARD_CACHE.read().unwrap().clone())
}

#[get("/missing-person?<id>")]
pub fn get_missing_person(id: i32) -> JsonResult {
    match db::get_missing_person(id) {
        Ok(ref p) if p.approval == db::models::APPROVAL_APPROVED => {
            Ok(Json(person_json(p).to_string()))
        },
        _ => Err(BadRequest(Some("Not found".into()))),
    }
}

#[post("/missing-person", format="application/x-www-form-urlencoded", data="<form>")]
pub fn post_missing_person(form: Option<Form<MissingPersonForm>>, cookies: Cookies)
    -> StringResult {

    let form = match form {
        Some(form) => form,
        None => return Err(BadRequest(Some("Invalid form".into()))),
    };

    if let Some(err) = form.verify_error() {
        return Err(BadRequest(Some(err.to_string())));
    }

    if !verify_and_remove_captcha(cookies, CHANNEL_MISSING, &form.captcha) {
        return Err(BadRequest(Some("Wrong captcha".into())));
    }

    let photo_path = photo_sys::publish_photo(&form.img_key)
        .map_err(|err| BadRequest(Some(err)))?;

    let now = util::system_now();

    let new_person = db::models::NewMissingPerson {
        name: form.name.clone(),
        age: form.age,
        last_location: form.last_location.clone(),
        district: form.district.clone(),
        description: form.description.clone(),
        status: "missing".into(),
        approval: APPROVAL_PENDING.into(),
        contact: form.contact.clone(),
        photo_path,
        reported_time: now,
        last_seen_time: now,
    };

    match db::insert_missing_person(&new_person) {
        Ok(person) => Ok(person.id.to_string()),
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[get("/admin/pending-missing?<admin_phone>&<admin_pwd>")]
pub fn get_pending_missing(admin_phone: String, admin_pwd: String) -> JsonResult {
    if !check_admin(&admin_phone, &admin_pwd) {
        return Err(BadRequest(Some("Authentication failed!".into())));
    }

    match db::get_pending_missing_persons() {
        Ok(persons) => {
            let parts = persons.iter()
                .map(person_json)
                .collect::<Vec<_>>();

            Ok(Json(json!({
                "persons": parts,
                "size": parts.len(),
            }).to_string()))
        },
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[post("/admin/approve-missing-person?<id>&<admin_phone>&<admin_pwd>")]
pub fn post_approve_missing_person(id: i32, admin_phone: String, admin_pwd: String)
    -> StringResult {

    if !check_admin(&admin_phone, &admin_pwd) {
        return Err(BadRequest(Some("Authentication failed!".into())));
    }

    match db::approve_missing_person(id) {
        Ok(_) => {
            refresh_board();
            Ok(id.to_string())
        },
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

// Workflow transitions are admin-gated; the report itself stays
// visible whichever workflow state it is in.
#[post("/admin/missing-person-status?<id>&<status>&<admin_phone>&<admin_pwd>")]
pub fn post_missing_person_status(id: i32, status: String,
    admin_phone: String, admin_pwd: String) -> StringResult {

    if !check_admin(&admin_phone, &admin_pwd) {
        return Err(BadRequest(Some("Authentication failed!".into())));
    }

    if !WORKFLOW_STATUSES.iter().any(|&s| s == status) {
        return Err(BadRequest(Some("Invalid status".into())));
    }

    match db::update_missing_person_status(id, &status) {
        Ok(p) => {
            refresh_board();
            Ok(p.status)
        },
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[delete("/admin/missing-person?<id>&<admin_phone>&<admin_pwd>")]
pub fn delete_missing_person(id: i32, admin_phone: String, admin_pwd: String)
    -> StringResult {

    if !check_admin(&admin_phone, &admin_pwd) {
        return Err(BadRequest(Some("Authentication failed!".into())));
    }

    if let Ok(person) = db::get_missing_person(id) {
        photo_sys::remove_published_photo(&person.photo_path);
    }

    match db::delete_missing_person(id) {
        Ok(cnt) if cnt > 0 => {
            refresh_board();
            Ok(cnt.to_string())
        },
        Ok(_) => Err(BadRequest(Some("Not found".into()))),
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}


fn board_job() -> Duration {
    match make_board() {
        Ok(data) => {
            update_board(data);
            Duration::new(60 * 5, 0)
        },
        Err(err) => {
            warn!("Fail to make missing person board: {}", err);
            Duration::new(30, 0)
        },
    }
}

fn refresh_board() {
    match make_board() {
        Ok(data) => update_board(data),
        Err(err) => warn!("Fail to refresh missing person board: {}", err),
    }
}

fn person_json(p: &MissingPerson) -> JsonValue {
    json!({
        "id": p.id,
        "name": p.name,
        "age": p.age,
        "last_location": p.last_location,
        "district": p.district,
        "description": p.description,
        "status": p.status,
        "contact": p.contact,
        "photo": p.photo_path,
        "reported_time": util::unix_secs(&p.reported_time),
        "last_seen_time": util::unix_secs(&p.last_seen_time),
    })
}

fn make_board() -> Result<String, String> {
    db::get_public_missing_persons()
        .map(|persons| {
            let parts = persons.iter()
                .map(person_json)
                .collect::<Vec<_>>();

            json!({
                "persons": parts,
                "size": parts.len(),
            }).to_string()
        })
        .map_err(|err| err.to_string())
}

fn update_board(data: String) {
    *BOARD_CACHE.write().unwrap() = data;
}


#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> MissingPersonForm {
        MissingPersonForm {
            captcha: "x".into(),
            name: "Rahul Das".into(),
            age: 34,
            last_location: "Near Howrah Bridge".into(),
            district: "Kolkata".into(),
            description: "5'8\", wearing a white kurta.".into(),
            contact: "9830000000".into(),
            img_key: "".into(),
        }
    }

    #[test]
    fn valid_report_passes() {
        assert!(valid_form().verify_error().is_none());
    }

    #[test]
    fn age_must_be_positive() {
        let mut form = valid_form();
        form.age = 0;
        assert!(form.verify_error().is_some());
        form.age = -3;
        assert!(form.verify_error().is_some());
    }

    #[test]
    fn contact_is_mandatory() {
        let mut form = valid_form();
        form.contact = "".into();
        assert!(form.verify_error().is_some());
    }

    #[test]
    fn photo_key_is_checked() {
        let mut form = valid_form();
        form.img_key = "../secret".into();
        assert!(form.verify_error().is_some());
    }

    #[test]
    fn workflow_statuses_cover_the_lifecycle() {
        assert!(WORKFLOW_STATUSES.contains(&"missing"));
        assert!(WORKFLOW_STATUSES.contains(&"searching"));
        assert!(WORKFLOW_STATUSES.contains(&"found"));
        assert!(!WORKFLOW_STATUSES.contains(&"approved"));
    }
}
