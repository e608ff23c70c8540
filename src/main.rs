#![feature(proc_macro_hygiene, decl_macro)]


#[macro_use] extern crate lazy_static;
extern crate rand;
#[macro_use] extern crate rocket;
#[macro_use] extern crate diesel;
#[macro_use] extern crate log;


mod db;
mod util;
mod geo;
mod admin;
mod logger;
mod task_scheduler;
mod captcha_sys;
mod photo_sys;
mod shelter_sys;
mod missing_sys;
mod resource_sys;
mod alert_sys;
mod weather_sys;
mod geocode_sys;
mod firstaid_sys;
mod safety_sys;


use std::{env, env::VarError};
use std::path::{Path, PathBuf};
use rocket::response::NamedFile;

use task_scheduler::TaskSchedulerBuilder;


const STATIC_DIR: &'static str = "static/";
const TEST_DIR: &'static str = "test/";


#[get("/")]
fn index() -> &'static str {
    "Relief Map Server"
}

#[get("/<file..>")]
fn get_static_file(file: PathBuf) -> Option<NamedFile> {
    NamedFile::open(Path::new(STATIC_DIR).join(file)).ok()
}

#[get("/<file..>")]
fn get_test_file(file: PathBuf) -> Option<NamedFile> {
    NamedFile::open(Path::new(TEST_DIR).join(file)).ok()
}


fn init_logger() {
    let logger = sentry_log::SentryLogger::with_dest(logger::Logger);

    log::set_boxed_logger(Box::new(logger))
        .map(|()| log::set_max_level(log::LevelFilter::Info))
        .expect("Fail to init logger");
}

fn main() {
    let rocket_env = env::var("ROCKET_ENV")
        .or_else(|_| -> Result<String, VarError> {
            if cfg!(debug_assertions) {
                Ok("development".into())
            }
            else {
                Ok("production".into())
            }
        }).unwrap();

    init_logger();
    let _sentry = env::var("SENTRY_DSN").ok()
        .map(|dsn| sentry::init(dsn));

    photo_sys::init_photo_sys();

    let mut scheduler = TaskSchedulerBuilder::new();

    shelter_sys::init_shelter_sys(&mut scheduler);
    missing_sys::init_missing_sys(&mut scheduler);
    resource_sys::init_resource_sys(&mut scheduler);
    alert_sys::init_alert_sys(&mut scheduler);
    safety_sys::init_safety_sys(&mut scheduler);

    let _scheduler = scheduler.build();

    let dbg_envs = ["dev", "development", "staging", "stage"];
    if dbg_envs.iter().any(|&v| v == rocket_env) {
        // Debug
        rocket::ignite()
            .mount(&format!("/{}", TEST_DIR), routes![get_test_file])
            .mount("/", routes![captcha_sys::test_captcha])
    }
    else {
        // Release
        rocket::ignite()
    }
    .mount("/", routes![index])
    .mount(&format!("/{}", STATIC_DIR), routes![get_static_file])
    .mount("/", routes![
        captcha_sys::get_captcha,
        photo_sys::post_upload_photo,
    ])
    .mount("/", routes![
        shelter_sys::get_shelter_map,
        shelter_sys::get_shelter,
        shelter_sys::get_nearby_shelters,
        shelter_sys::post_shelter,
        shelter_sys::get_pending_shelters,
        shelter_sys::post_approve_shelter,
        shelter_sys::delete_shelter,
        shelter_sys::post_occupancy,
    ])
    .mount("/", routes![
        missing_sys::get_missing_person_board,
        missing_sys::get_missing_person,
        missing_sys::post_missing_person,
        missing_sys::get_pending_missing,
        missing_sys::post_approve_missing_person,
        missing_sys::post_missing_person_status,
        missing_sys::delete_missing_person,
    ])
    .mount("/", routes![
        resource_sys::get_resource_board,
        resource_sys::post_resource,
        resource_sys::get_pending_resources,
        resource_sys::post_approve_resource,
        resource_sys::post_resource_status,
        resource_sys::delete_resource,
    ])
    .mount("/", routes![
        alert_sys::get_alert_feed,
        weather_sys::get_air_quality,
        geocode_sys::get_geocode,
        geocode_sys::get_reverse_geocode,
        firstaid_sys::post_first_aid_chat,
    ])
    .mount("/", routes![
        safety_sys::post_profile,
        safety_sys::get_profile,
        safety_sys::post_profile_photo,
        safety_sys::post_safety_status,
        safety_sys::post_contact,
        safety_sys::delete_contact,
        safety_sys::post_sos,
        safety_sys::get_sos_map,
        safety_sys::get_sos_list,
        safety_sys::post_resolve_sos,
    ])
    .launch();
}
