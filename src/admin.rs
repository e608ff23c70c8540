//! Single-administrator credential check shared by every board.
//!
//! The alternative of trusting a client-supplied phone number is exactly
//! what this replaces: the phone and password land here on every admin
//! request and are compared against the environment configuration.

use std::env;

use crate::util;


const PASSWORD_HASH_SALT: &'static str = "~~ relief-map 108 2263";


lazy_static! {
    static ref ADMIN_PHONE: String = {
        env::var("ADMIN_PHONE").expect("ADMIN_PHONE must be set")
    };
    static ref ADMIN_PWD: u64 = {
        let salted_pwd = env::var("ADMIN_PWD").expect("ADMIN_PWD must be set")
            + PASSWORD_HASH_SALT;
        util::calculate_hash(&salted_pwd)
    };
}


pub fn check_admin(phone: &str, pwd: &str) -> bool {
    let salted_pwd = pwd.to_owned() + PASSWORD_HASH_SALT;
    let hashed_pwd = util::calculate_hash(&salted_pwd);

    *ADMIN_PHONE == phone && *ADMIN_PWD == hashed_pwd
}

pub fn salt_user_pwd(pwd: &str) -> String {
    let salted_pwd = pwd.to_owned() + PASSWORD_HASH_SALT;
    util::calculate_hash(&salted_pwd).to_string()
}
