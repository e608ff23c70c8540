use std::time::SystemTime;
use super::schema::{shelters, missing_persons, resources, users, emergency_contacts, sos_signals};


pub const APPROVAL_PENDING: &'static str = "pending";
pub const APPROVAL_APPROVED: &'static str = "approved";


#[derive(Queryable)]
pub struct Shelter {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity: i32,
    pub current: i32,
    pub amenities: String,
    pub phone: String,
    pub approval: String,
}

#[derive(Insertable)]
#[table_name="shelters"]
pub struct NewShelter {
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity: i32,
    pub current: i32,
    pub amenities: String,
    pub phone: String,
    pub approval: String,
}

#[derive(Queryable)]
pub struct MissingPerson {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub last_location: String,
    pub district: String,
    pub description: String,
    pub status: String,
    pub approval: String,
    pub contact: String,
    pub photo_path: String,
    pub reported_time: SystemTime,
    pub last_seen_time: SystemTime,
}

#[derive(Insertable)]
#[table_name="missing_persons"]
pub struct NewMissingPerson {
    pub name: String,
    pub age: i32,
    pub last_location: String,
    pub district: String,
    pub description: String,
    pub status: String,
    pub approval: String,
    pub contact: String,
    pub photo_path: String,
    pub reported_time: SystemTime,
    pub last_seen_time: SystemTime,
}

#[derive(Queryable)]
pub struct Resource {
    pub id: i32,
    pub kind: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub quantity: String,
    pub location: String,
    pub contact: String,
    pub urgent: bool,
    pub status: String,
    pub approval: String,
    pub created_time: SystemTime,
}

#[derive(Insertable)]
#[table_name="resources"]
pub struct NewResource {
    pub kind: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub quantity: String,
    pub location: String,
    pub contact: String,
    pub urgent: bool,
    pub status: String,
    pub approval: String,
    pub created_time: SystemTime,
}

#[derive(Queryable)]
pub struct User {
    pub id: i32,
    pub user_id: String,
    pub user_pwd: String,
    pub display_name: String,
    pub phone: String,
    pub photo_path: String,
    pub safety_status: String,
    pub status_time: SystemTime,
}

#[derive(Insertable)]
#[table_name="users"]
pub struct NewUser {
    pub user_id: String,
    pub user_pwd: String,
    pub display_name: String,
    pub phone: String,
    pub photo_path: String,
    pub safety_status: String,
    pub status_time: SystemTime,
}

#[derive(Queryable)]
pub struct EmergencyContact {
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    pub phone: String,
    pub relation: String,
}

#[derive(Insertable)]
#[table_name="emergency_contacts"]
pub struct NewEmergencyContact {
    pub owner_id: i32,
    pub name: String,
    pub phone: String,
    pub relation: String,
}

#[derive(Queryable)]
pub struct SosSignal {
    pub id: i32,
    pub user_id: String,
    pub user_name: String,
    pub kind: String,
    pub details: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_time: SystemTime,
    pub status: String,
}

#[derive(Insertable)]
#[table_name="sos_signals"]
pub struct NewSosSignal {
    pub user_id: String,
    pub user_name: String,
    pub kind: String,
    pub details: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_time: SystemTime,
    pub status: String,
}
