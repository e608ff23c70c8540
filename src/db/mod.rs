pub mod models;
pub mod schema;


use std::env;
use std::time::Duration;

use diesel::prelude::*;
use diesel::pg::PgConnection;
use diesel::result::QueryResult;

use crate::util;
use models::*;
use schema::shelters::dsl as sh_dsl;
use schema::missing_persons::dsl as mp_dsl;
use schema::resources::dsl as rc_dsl;
use schema::users::dsl as u_dsl;
use schema::emergency_contacts::dsl as ec_dsl;
use schema::sos_signals::dsl as sos_dsl;


thread_local! {
    static DB_CONN: PgConnection = establish_connection();
}


fn establish_connection() -> PgConnection {
    let database_url = env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set");
    PgConnection::establish(&database_url)
        .expect(&format!("Error connecting to {}", database_url))
}


// Shelters.

pub fn get_shelters() -> QueryResult<Vec<Shelter>> {
    DB_CONN.with(|conn| {
        sh_dsl::shelters.load::<Shelter>(conn)
    })
}

pub fn get_pending_shelters() -> QueryResult<Vec<Shelter>> {
    DB_CONN.with(|conn| {
        sh_dsl::shelters
            .filter(sh_dsl::approval.eq(APPROVAL_PENDING))
            .load::<Shelter>(conn)
    })
}

pub fn insert_shelter(shelter: &NewShelter) -> QueryResult<Shelter> {
    DB_CONN.with(|conn| {
        diesel::insert_into(schema::shelters::table)
            .values(shelter)
            .get_result::<Shelter>(conn)
    })
}

pub fn approve_shelter(id: i32) -> QueryResult<Shelter> {
    DB_CONN.with(|conn| {
        diesel::update(sh_dsl::shelters.find(id))
            .set(sh_dsl::approval.eq(APPROVAL_APPROVED))
            .get_result::<Shelter>(conn)
    })
}

pub fn delete_shelter(id: i32) -> QueryResult<usize> {
    DB_CONN.with(|conn| {
        diesel::delete(sh_dsl::shelters.find(id))
            .execute(conn)
    })
}

pub fn update_shelter_occupancy(id: i32, occupancy: i32) -> QueryResult<Shelter> {
    DB_CONN.with(|conn| {
        diesel::update(sh_dsl::shelters.find(id))
            .set(sh_dsl::current.eq(occupancy))
            .get_result::<Shelter>(conn)
    })
}


// Missing persons.

pub fn get_public_missing_persons() -> QueryResult<Vec<MissingPerson>> {
    DB_CONN.with(|conn| {
        mp_dsl::missing_persons
            .filter(mp_dsl::approval.eq(APPROVAL_APPROVED))
            .order(mp_dsl::reported_time.desc())
            .load::<MissingPerson>(conn)
    })
}

pub fn get_pending_missing_persons() -> QueryResult<Vec<MissingPerson>> {
    DB_CONN.with(|conn| {
        mp_dsl::missing_persons
            .filter(mp_dsl::approval.eq(APPROVAL_PENDING))
            .load::<MissingPerson>(conn)
    })
}

pub fn get_missing_person(id: i32) -> QueryResult<MissingPerson> {
    DB_CONN.with(|conn| {
        mp_dsl::missing_persons
            .find(id)
            .first(conn)
    })
}

pub fn insert_missing_person(person: &NewMissingPerson) -> QueryResult<MissingPerson> {
    DB_CONN.with(|conn| {
        diesel::insert_into(schema::missing_persons::table)
            .values(person)
            .get_result::<MissingPerson>(conn)
    })
}

pub fn approve_missing_person(id: i32) -> QueryResult<MissingPerson> {
    DB_CONN.with(|conn| {
        diesel::update(mp_dsl::missing_persons.find(id))
            .set(mp_dsl::approval.eq(APPROVAL_APPROVED))
            .get_result::<MissingPerson>(conn)
    })
}

pub fn update_missing_person_status(id: i32, status: &str) -> QueryResult<MissingPerson> {
    DB_CONN.with(|conn| {
        diesel::update(mp_dsl::missing_persons.find(id))
            .set(mp_dsl::status.eq(status))
            .get_result::<MissingPerson>(conn)
    })
}

pub fn delete_missing_person(id: i32) -> QueryResult<usize> {
    DB_CONN.with(|conn| {
        diesel::delete(mp_dsl::missing_persons.find(id))
            .execute(conn)
    })
}


// Resource listings.

pub fn get_public_resources() -> QueryResult<Vec<Resource>> {
    DB_CONN.with(|conn| {
        rc_dsl::resources
            .filter(rc_dsl::approval.eq(APPROVAL_APPROVED))
            .order(rc_dsl::created_time.desc())
            .load::<Resource>(conn)
    })
}

pub fn get_pending_resources() -> QueryResult<Vec<Resource>> {
    DB_CONN.with(|conn| {
        rc_dsl::resources
            .filter(rc_dsl::approval.eq(APPROVAL_PENDING))
            .load::<Resource>(conn)
    })
}

pub fn insert_resource(resource: &NewResource) -> QueryResult<Resource> {
    DB_CONN.with(|conn| {
        diesel::insert_into(schema::resources::table)
            .values(resource)
            .get_result::<Resource>(conn)
    })
}

pub fn approve_resource(id: i32) -> QueryResult<Resource> {
    DB_CONN.with(|conn| {
        diesel::update(rc_dsl::resources.find(id))
            .set(rc_dsl::approval.eq(APPROVAL_APPROVED))
            .get_result::<Resource>(conn)
    })
}

pub fn update_resource_status(id: i32, status: &str) -> QueryResult<Resource> {
    DB_CONN.with(|conn| {
        diesel::update(rc_dsl::resources.find(id))
            .set(rc_dsl::status.eq(status))
            .get_result::<Resource>(conn)
    })
}

pub fn delete_resource(id: i32) -> QueryResult<usize> {
    DB_CONN.with(|conn| {
        diesel::delete(rc_dsl::resources.find(id))
            .execute(conn)
    })
}


// Users and emergency contacts.

pub fn get_user(user_id: &str) -> QueryResult<User> {
    DB_CONN.with(|conn| {
        u_dsl::users
            .filter(u_dsl::user_id.eq(user_id))
            .first(conn)
    })
}

pub fn insert_user(user: &NewUser) -> QueryResult<User> {
    DB_CONN.with(|conn| {
        diesel::insert_into(schema::users::table)
            .values(user)
            .get_result::<User>(conn)
    })
}

pub fn update_safety_status(id: i32, status: &str) -> QueryResult<User> {
    DB_CONN.with(|conn| {
        diesel::update(u_dsl::users.find(id))
            .set((u_dsl::safety_status.eq(status),
                u_dsl::status_time.eq(util::system_now())))
            .get_result::<User>(conn)
    })
}

pub fn update_user_photo(id: i32, photo_path: &str) -> QueryResult<User> {
    DB_CONN.with(|conn| {
        diesel::update(u_dsl::users.find(id))
            .set(u_dsl::photo_path.eq(photo_path))
            .get_result::<User>(conn)
    })
}

pub fn get_emergency_contacts(owner: i32) -> QueryResult<Vec<EmergencyContact>> {
    DB_CONN.with(|conn| {
        ec_dsl::emergency_contacts
            .filter(ec_dsl::owner_id.eq(owner))
            .order(ec_dsl::id.asc())
            .load::<EmergencyContact>(conn)
    })
}

pub fn insert_emergency_contact(contact: &NewEmergencyContact) -> QueryResult<EmergencyContact> {
    DB_CONN.with(|conn| {
        diesel::insert_into(schema::emergency_contacts::table)
            .values(contact)
            .get_result::<EmergencyContact>(conn)
    })
}

pub fn delete_emergency_contact(id: i32, owner: i32) -> QueryResult<usize> {
    DB_CONN.with(|conn| {
        diesel::delete(ec_dsl::emergency_contacts
                .filter(ec_dsl::id.eq(id))
                .filter(ec_dsl::owner_id.eq(owner)))
            .execute(conn)
    })
}


// SOS signals.

pub fn get_active_sos_within(time: Duration) -> QueryResult<Vec<SosSignal>> {
    let filter_time = util::system_now() - time;

    DB_CONN.with(|conn| {
        sos_dsl::sos_signals
            .filter(sos_dsl::created_time.gt(filter_time))
            .filter(sos_dsl::status.eq("ACTIVE"))
            .order(sos_dsl::created_time.desc())
            .load::<SosSignal>(conn)
    })
}

pub fn get_sos_signals_within(time: Duration) -> QueryResult<Vec<SosSignal>> {
    let filter_time = util::system_now() - time;

    DB_CONN.with(|conn| {
        sos_dsl::sos_signals
            .filter(sos_dsl::created_time.gt(filter_time))
            .order(sos_dsl::created_time.desc())
            .load::<SosSignal>(conn)
    })
}

pub fn insert_sos_signal(signal: &NewSosSignal) -> QueryResult<SosSignal> {
    DB_CONN.with(|conn| {
        diesel::insert_into(schema::sos_signals::table)
            .values(signal)
            .get_result::<SosSignal>(conn)
    })
}

pub fn resolve_sos_signal(id: i32) -> QueryResult<SosSignal> {
    DB_CONN.with(|conn| {
        diesel::update(sos_dsl::sos_signals.find(id))
            .set(sos_dsl::status.eq("RESOLVED"))
            .get_result::<SosSignal>(conn)
    })
}
