table! {
    shelters (id) {
        id -> Integer,
        name -> Text,
        address -> Text,
        latitude -> Nullable<Double>,
        longitude -> Nullable<Double>,
        capacity -> Integer,
        current -> Integer,
        amenities -> Text,
        phone -> Text,
        approval -> Text,
    }
}

table! {
    missing_persons (id) {
        id -> Integer,
        name -> Text,
        age -> Integer,
        last_location -> Text,
        district -> Text,
        description -> Text,
        status -> Text,
        approval -> Text,
        contact -> Text,
        photo_path -> Text,
        reported_time -> Timestamp,
        last_seen_time -> Timestamp,
    }
}

table! {
    resources (id) {
        id -> Integer,
        kind -> Text,
        category -> Text,
        title -> Text,
        description -> Text,
        quantity -> Text,
        location -> Text,
        contact -> Text,
        urgent -> Bool,
        status -> Text,
        approval -> Text,
        created_time -> Timestamp,
    }
}

table! {
    users (id) {
        id -> Integer,
        user_id -> Text,
        user_pwd -> Text,
        display_name -> Text,
        phone -> Text,
        photo_path -> Text,
        safety_status -> Text,
        status_time -> Timestamp,
    }
}

table! {
    emergency_contacts (id) {
        id -> Integer,
        owner_id -> Integer,
        name -> Text,
        phone -> Text,
        relation -> Text,
    }
}

table! {
    sos_signals (id) {
        id -> Integer,
        user_id -> Text,
        user_name -> Text,
        kind -> Text,
        details -> Text,
        latitude -> Nullable<Double>,
        longitude -> Nullable<Double>,
        created_time -> Timestamp,
        status -> Text,
    }
}

joinable!(emergency_contacts -> users (owner_id));

allow_tables_to_appear_in_same_query!(
    users,
    emergency_contacts,
);
