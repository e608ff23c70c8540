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
use crate::db::models::{Resource, APPROVAL_PENDING};
use crate::admin::check_admin;
use crate::captcha_sys::{verify_and_remove_captcha, CHANNEL_RESOURCE};
use crate::task_scheduler::{Task, TaskSchedulerBuilder};


type JsonResult = Result<Json<String>, BadRequest<String>>;
type StringResult = Result<String, BadRequest<String>>;


lazy_static! {
    static ref BOARD_CACHE: RwLock<String> = {
        RwLock::new(String::new())
    };
}

pub const MATCH_STATUSES: [&'static str; 3] = ["available", "pending", "matched"];

const CATEGORY_SUGGESTIONS: [&'static str; 6] = [
    "Water", "Food", "Medical", "Shelter", "Clothing", "Transport",
];


#[derive(FromForm)]
pub struct ResourceForm {
    captcha: String,
    kind: String,
    category: String,
    title: String,
    description: String,
    quantity: String,
    location: String,
    contact: String,
    urgent: Option<bool>,
}

impl ResourceForm {
    fn verify_error(&self) -> Option<&'static str> {
        let len_title = self.title.chars().count();

        if self.kind != "offer" && self.kind != "request" {
            Some("Type must be offer or request")
        }
        else if self.category.is_empty() || self.category.chars().count() > 40 {
            Some("Invalid category")
        }
        else if len_title < 2 {
            Some("Title must be at least 2 characters")
        }
        else if len_title > 120 {
            Some("Title can not be longer than 120 characters")
        }
        else if self.description.len() >= 65536 {
            Some("The maximum length of the description is 65536")
        }
        else if self.quantity.chars().count() > 60 {
            Some("The maximum length of the quantity is 60")
        }
        else if self.location.chars().count() > 200 {
            Some("The maximum length of the location is 200")
        }
        else if self.contact.is_empty() || self.contact.len() > 20 {
            Some("Invalid contact number")
        }
        else {
            None
        }
    }
}


pub fn init_resource_sys(scheduler: &mut TaskSchedulerBuilder) {
    update_board(make_board()
        .expect("Fail to make resource board"));

    scheduler.add_task(Task::new("resource-board", board_job, Duration::new(60 * 5, 0)));
}

#[get("/resource-board")]
pub fn get_resource_board() -> Json<String> {
    Json(BOARD_CACHE.read().unwrap().clone())
}

#[post("/resource", format="application/x-www-form-urlencoded", data="<form>")]
pub fn post_resource(form: Option<Form<ResourceForm>>, cookies: Cookies) -> StringResult {
    let form = match form {
        Some(form) => form,
        None => return Err(BadRequest(Some("Invalid form".into()))),
    };

    if let Some(err) = form.verify_error() {
        return Err(BadRequest(Some(err.to_string())));
    }

    if !verify_and_remove_captcha(cookies, CHANNEL_RESOURCE, &form.captcha) {
        return Err(BadRequest(Some("Wrong captcha".into())));
    }

    let quantity: String = if form.quantity.is_empty() {
        "Not specified".into()
    }
    else {
        form.quantity.clone()
    };

    let new_resource = db::models::NewResource {
        kind: form.kind.clone(),
        category: form.category.clone(),
        title: form.title.clone(),
        description: form.description.clone(),
        quantity,
        location: form.location.clone(),
        contact: form.contact.clone(),
        urgent: form.urgent.unwrap_or(false),
        status: "available".into(),
        approval: APPROVAL_PENDING.into(),
        created_time: util::system_now(),
    };

    match db::insert_resource(&new_resource) {
        Ok(resource) => Ok(resource.id.to_string()),
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[get("/admin/pending-resources?<admin_phone>&<admin_pwd>")]
pub fn get_pending_resources(admin_phone: String, admin_pwd: String) -> JsonResult {
    if !check_admin(&admin_phone, &admin_pwd) {
        return Err(BadRequest(Some("Authentication failed!".into())));
    }

    match db::get_pending_resources() {
        Ok(resources) => {
            let parts = resources.iter()
                .map(resource_json)
                .collect::<Vec<_>>();

            Ok(Json(json!({
                "resources": parts,
                "size": parts.len(),
            }).to_string()))
        },
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[post("/admin/approve-resource?<id>&<admin_phone>&<admin_pwd>")]
pub fn post_approve_resource(id: i32, admin_phone: String, admin_pwd: String)
    -> StringResult {

    if !check_admin(&admin_phone, &admin_pwd) {
        return Err(BadRequest(Some("Authentication failed!".into())));
    }

    match db::approve_resource(id) {
        Ok(_) => {
            refresh_board();
            Ok(id.to_string())
        },
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[post("/admin/resource-status?<id>&<status>&<admin_phone>&<admin_pwd>")]
pub fn post_resource_status(id: i32, status: String,
    admin_phone: String, admin_pwd: String) -> StringResult {

    if !check_admin(&admin_phone, &admin_pwd) {
        return Err(BadRequest(Some("Authentication failed!".into())));
    }

    if !MATCH_STATUSES.iter().any(|&s| s == status) {
        return Err(BadRequest(Some("Invalid status".into())));
    }

    match db::update_resource_status(id, &status) {
        Ok(r) => {
            refresh_board();
            Ok(r.status)
        },
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

#[delete("/admin/resource?<id>&<admin_phone>&<admin_pwd>")]
pub fn delete_resource(id: i32, admin_phone: String, admin_pwd: String) -> StringResult {
    if !check_admin(&admin_phone, &admin_pwd) {
        return Err(BadRequest(Some("Authentication failed!".into())));
    }

    match db::delete_resource(id) {
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
            warn!("Fail to make resource board: {}", err);
            Duration::new(30, 0)
        },
    }
}

fn refresh_board() {
    match make_board() {
        Ok(data) => update_board(data),
        Err(err) => warn!("Fail to refresh resource board: {}", err),
    }
}

fn resource_json(r: &Resource) -> JsonValue {
    json!({
        "id": r.id,
        "type": r.kind,
        "category": r.category,
        "title": r.title,
        "description": r.description,
        "quantity": r.quantity,
        "location": r.location,
        "contact": r.contact,
        "urgent": r.urgent,
        "status": r.status,
        "created_time": util::unix_secs(&r.created_time),
    })
}

fn make_board() -> Result<String, String> {
    db::get_public_resources()
        .map(|resources| {
            let parts = resources.iter()
                .map(resource_json)
                .collect::<Vec<_>>();

            json!({
                "resources": parts,
                "size": parts.len(),
                "categories": CATEGORY_SUGGESTIONS,
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

    fn valid_form() -> ResourceForm {
        ResourceForm {
            captcha: "x".into(),
            kind: "offer".into(),
            category: "Water".into(),
            title: "50 cases of bottled water".into(),
            description: "Pickup near Sealdah".into(),
            quantity: "50 cases".into(),
            location: "Sealdah, Kolkata".into(),
            contact: "9830000000".into(),
            urgent: None,
        }
    }

    #[test]
    fn valid_listing_passes() {
        assert!(valid_form().verify_error().is_none());
    }

    #[test]
    fn kind_must_be_offer_or_request() {
        let mut form = valid_form();
        form.kind = "donation".into();
        assert!(form.verify_error().is_some());
        form.kind = "request".into();
        assert!(form.verify_error().is_none());
    }

    #[test]
    fn contact_is_mandatory() {
        let mut form = valid_form();
        form.contact = "".into();
        assert!(form.verify_error().is_some());
    }

    #[test]
    fn category_required() {
        let mut form = valid_form();
        form.category = "".into();
        assert!(form.verify_error().is_some());
    }

    #[test]
    fn match_statuses_are_closed_set() {
        assert!(MATCH_STATUSES.contains(&"matched"));
        assert!(!MATCH_STATUSES.contains(&"resolved"));
    }
}
