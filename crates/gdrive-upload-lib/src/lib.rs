// gdrive-upload-lib: upload local files to a Google Drive folder with a service account

pub mod action;
pub mod auth;
pub mod cli;
pub mod cloud;
pub mod config;
pub mod errors;
pub mod http_client;
pub mod locator;
pub mod logger;
pub mod output;
pub mod uploader;
