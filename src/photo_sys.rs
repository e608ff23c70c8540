use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
};
use rocket::{
    response::status::BadRequest,
    data::Data,
};

use crate::util;


type StringResult = Result<String, BadRequest<String>>;


const FILE_UPLOAD_LIMIT: usize = (8 * 1024 * 1024 / 3) * 4; // chars
pub const PHOTO_UPLOAD_DIR: &'static str = "upload/photos/";
pub const PHOTO_PUBLIC_DIR: &'static str = "photos/";


pub fn init_photo_sys() {
    fs::create_dir_all(Path::new(crate::STATIC_DIR).join(PHOTO_PUBLIC_DIR))
        .and(fs::create_dir_all(PHOTO_UPLOAD_DIR))
        .expect("Initial photo directory creation failed");
}

pub fn verify_photo_key(img_key: &str) -> Option<&'static str> {
    if img_key.find("..").is_some() || img_key.len() > 256 {
        Some("Invalid photo key")
    }
    else {
        None
    }
}

/// Moves a staged upload into the public static tree and returns
/// its public path. Empty key means no photo.
pub fn publish_photo(img_key: &str) -> Result<String, String> {
    if img_key.is_empty() {
        return Ok("".into());
    }

    let uploaded_file = Path::new(PHOTO_UPLOAD_DIR).join(img_key);
    if !uploaded_file.exists() {
        return Err("No photo uploaded".into());
    }

    let public_file = Path::new(PHOTO_PUBLIC_DIR).join(img_key);
    fs::copy(&uploaded_file, Path::new(crate::STATIC_DIR).join(&public_file))
        .and(fs::remove_file(&uploaded_file))
        .map_err(|err| err.to_string())?;

    public_file.to_str()
        .map(|path| path.to_owned())
        .ok_or("Invalid public path".into())
}

pub fn remove_published_photo(photo_path: &str) {
    if photo_path.len() > 0 {
        let path = Path::new(crate::STATIC_DIR).join(photo_path);
        if path.exists() && path.is_file() {
            let _ = fs::remove_file(path);
        }
    }
}

#[post("/upload-photo", format="plain", data="<data>")]
pub fn post_upload_photo(data: Data) -> StringResult {
    // Read base64 encoded data URI.
    let mut file_data = data.open().take(FILE_UPLOAD_LIMIT as u64 + 1);
    let mut data_uri = String::new();
    let read_result = file_data.read_to_string(&mut data_uri);

    match read_result {
        Ok(bytes) if bytes <= FILE_UPLOAD_LIMIT => (),
        Ok(_) => return Err(BadRequest(Some("The file is too large".into()))),
        Err(err) => return Err(BadRequest(Some(err.to_string()))),
    }

    let ext = match photo_extension(&data_uri) {
        Some(ext) => ext,
        None => return Err(BadRequest(Some("Invalid photo".into()))),
    };

    let bytes = data_uri.split(',').nth(1)
        .ok_or(BadRequest(Some("Invalid uri".to_owned())))
        .and_then(|b64| base64::decode(b64)
            .map_err(|err| BadRequest(Some(err.to_string()))))?;

    // Create unique id and file for the photo.
    let (id, mut file) = loop {
        let id = util::generate_rand_id(32) + "." + ext;
        let path = Path::new(PHOTO_UPLOAD_DIR).join(&id);
        let file_result = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path);

        match file_result {
            Ok(file) => break (id, file),
            Err(ref err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(BadRequest(Some(err.to_string()))),
        }
    };

    match file.write_all(&bytes) {
        Ok(_) => Ok(id),
        Err(err) => Err(BadRequest(Some(err.to_string()))),
    }
}

fn photo_extension(data_uri: &str) -> Option<&str> {
    let ext = data_uri.split(',').nth(0)
        .and_then(|x| x.split('/').nth(1))
        .and_then(|x| x.split(';').nth(0))?;

    let allowed_exts = &["jpeg", "jpg", "png", "bmp"];
    if allowed_exts.iter().any(|&x| x == ext) {
        Some(ext)
    }
    else {
        None
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_parsed_from_data_uri() {
        assert_eq!(photo_extension("data:image/png;base64,AAAA"), Some("png"));
        assert_eq!(photo_extension("data:image/jpeg;base64,AAAA"), Some("jpeg"));
    }

    #[test]
    fn disallowed_extension_rejected() {
        assert_eq!(photo_extension("data:image/svg+xml;base64,AAAA"), None);
        assert_eq!(photo_extension("garbage"), None);
    }

    #[test]
    fn photo_key_traversal_rejected() {
        assert!(verify_photo_key("../../etc/passwd").is_some());
        assert!(verify_photo_key(&"x".repeat(300)).is_some());
        assert!(verify_photo_key("abcd1234.png").is_none());
    }
}
